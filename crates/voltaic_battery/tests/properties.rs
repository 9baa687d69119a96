//! Property tests for single-flight acquisition and state monotonicity.

use std::sync::Arc;

use proptest::prelude::*;
use voltaic_battery::testing::{MockBattery, MockPlatform, RecordingSink};
use voltaic_battery::{
    AcquisitionPipeline, BatteryStatus, CacheStatus, PowerPlatform, Reporter, ReporterValue,
};

fn platform(succeeds: bool, battery: Arc<MockBattery>) -> Arc<MockPlatform> {
    let platform = if succeeds {
        MockPlatform::with_battery(battery)
    } else {
        MockPlatform::failing("scripted failure")
    };
    Arc::new(platform.held())
}

fn pipeline_over(platform: &Arc<MockPlatform>) -> AcquisitionPipeline {
    AcquisitionPipeline::new(
        Arc::clone(platform) as Arc<dyn PowerPlatform>,
        Arc::new(RecordingSink::new()),
    )
}

fn rank(status: CacheStatus) -> u8 {
    match status {
        CacheStatus::Empty => 0,
        CacheStatus::Acquiring => 1,
        CacheStatus::Ready | CacheStatus::Failed | CacheStatus::Unsupported => 2,
    }
}

fn arb_status() -> impl Strategy<Value = BatteryStatus> {
    (any::<bool>(), 0u32..=100, 0u32..=36_000).prop_map(|(charging, percent, seconds)| {
        BatteryStatus {
            charging,
            level: f64::from(percent) / 100.0,
            charging_time: f64::from(seconds),
            discharging_time: f64::INFINITY,
        }
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// However many callers race, the platform is asked exactly once and
    /// every caller sees the same outcome.
    #[test]
    fn prop_single_flight(callers in 1usize..64, succeeds in any::<bool>()) {
        let rt = tokio::runtime::Runtime::new().expect("tokio runtime");
        rt.block_on(async {
            let platform = platform(succeeds, Arc::new(MockBattery::default()));
            let pipeline = pipeline_over(&platform);

            let requests: Vec<_> = (0..callers).map(|_| pipeline.request()).collect();
            platform.release();
            let outcomes =
                futures::future::join_all(requests.into_iter().map(IntoFuture::into_future))
                    .await;

            assert_eq!(platform.attempts(), 1);
            assert!(outcomes.iter().all(|handle| handle.is_some() == succeeds));

            let settled = pipeline.request();
            assert!(settled.is_settled());
            assert_eq!(settled.handle().is_some(), succeeds);
        });
    }

    /// Status never moves backwards across an arbitrary sequence of
    /// requests interleaved with the release of the acquisition.
    #[test]
    fn prop_status_is_monotonic(requests in 1usize..32, release_at in 0usize..32, succeeds in any::<bool>()) {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .expect("tokio runtime");
        rt.block_on(async {
            let platform = platform(succeeds, Arc::new(MockBattery::default()));
            let pipeline = pipeline_over(&platform);
            let mut last = rank(pipeline.status());

            for i in 0..requests {
                if i == release_at {
                    platform.release();
                }
                let _ = pipeline.request();
                tokio::task::yield_now().await;

                let current = rank(pipeline.status());
                assert!(current >= last, "status went from rank {last} to {current}");
                last = current;
            }
            assert!(platform.attempts() <= 1);
        });
    }

    /// Reporters read exactly what the handle reports, with the level scaled
    /// to a percentage.
    #[test]
    fn prop_reporters_follow_handle(status in arb_status()) {
        let rt = tokio::runtime::Runtime::new().expect("tokio runtime");
        rt.block_on(async {
            let platform = Arc::new(MockPlatform::with_battery(Arc::new(MockBattery::new(status))));
            let pipeline = pipeline_over(&platform);
            pipeline.request().await;

            let handle = pipeline.request().handle().cloned().expect("ready handle");
            assert_eq!(
                Reporter::Charging.value_of(Some(handle.as_ref())),
                ReporterValue::Bool(status.charging)
            );
            assert_eq!(
                Reporter::Level.value_of(Some(handle.as_ref())),
                ReporterValue::Number(status.level * 100.0)
            );
            assert_eq!(
                Reporter::ChargeTime.value_of(Some(handle.as_ref())),
                ReporterValue::Number(status.charging_time)
            );
            assert_eq!(handle.status(), status);
        });
    }
}
