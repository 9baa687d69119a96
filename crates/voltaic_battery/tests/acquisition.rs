//! Acquisition behavior observed through the public accessors.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use tracing_subscriber::layer::{Context, SubscriberExt};
use voltaic_battery::testing::{MockBattery, MockPlatform, RecordingSink};
use voltaic_battery::{
    Acquisition, AcquisitionPipeline, Battery, BatteryStatus, BatteryTrigger, CacheStatus,
    ChangeChannel, PowerPlatform, Reporter, ReporterValue, TriggerSink,
};

// ─────────────────────────────────────────────────────────────────────────────
// Fixtures
// ─────────────────────────────────────────────────────────────────────────────

struct Fixture {
    battery: Battery,
    platform: Arc<MockPlatform>,
    sink: Arc<RecordingSink>,
}

fn fixture(platform: MockPlatform) -> Fixture {
    let platform = Arc::new(platform);
    let sink = Arc::new(RecordingSink::new());
    let battery = Battery::new(
        Arc::clone(&platform) as Arc<dyn PowerPlatform>,
        Arc::clone(&sink) as Arc<dyn TriggerSink>,
    );
    Fixture {
        battery,
        platform,
        sink,
    }
}

fn discharging_at(level: f64) -> Arc<MockBattery> {
    Arc::new(MockBattery::new(BatteryStatus {
        charging: false,
        level,
        charging_time: 1800.0,
        discharging_time: f64::INFINITY,
    }))
}

/// Counts `ERROR` events seen by the thread's default subscriber.
#[derive(Clone, Default)]
struct ErrorCounter(Arc<AtomicUsize>);

impl ErrorCounter {
    fn count(&self) -> usize {
        self.0.load(Ordering::SeqCst)
    }
}

impl<S: tracing::Subscriber> tracing_subscriber::Layer<S> for ErrorCounter {
    fn on_event(&self, event: &tracing::Event<'_>, _ctx: Context<'_, S>) {
        if *event.metadata().level() == tracing::Level::ERROR {
            self.0.fetch_add(1, Ordering::SeqCst);
        }
    }
}

async fn wait_for_status(battery: &Battery, status: CacheStatus) {
    tokio::time::timeout(Duration::from_secs(5), async {
        while battery.status() != status {
            tokio::task::yield_now().await;
        }
    })
    .await
    .unwrap();
}

// ─────────────────────────────────────────────────────────────────────────────
// Scenarios
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn unsupported_platform_reads_fallback_synchronously() {
    let f = fixture(MockPlatform::unsupported());

    let charging = f.battery.charging();
    assert!(charging.is_ready());
    assert_eq!(charging.ready(), Some(&true));
    assert_eq!(f.battery.level().ready(), Some(&100.0));
    assert_eq!(f.battery.status(), CacheStatus::Unsupported);
    assert_eq!(f.platform.attempts(), 0);
}

#[tokio::test]
async fn first_read_waits_then_later_reads_are_immediate() {
    let f = fixture(MockPlatform::with_battery(discharging_at(0.42)));

    let charging = f.battery.charging();
    assert!(!charging.is_ready());
    assert!(!charging.await);

    let level = f.battery.level();
    assert_eq!(level.ready(), Some(&42.0));
    assert_eq!(f.battery.charge_time().ready(), Some(&1800.0));
    assert_eq!(f.battery.discharge_time().ready(), Some(&f64::INFINITY));
    assert_eq!(f.platform.attempts(), 1);
}

#[tokio::test]
async fn failed_acquisition_serves_fallback_and_logs_once() {
    let errors = ErrorCounter::default();
    let _guard =
        tracing::subscriber::set_default(tracing_subscriber::registry().with(errors.clone()));

    let f = fixture(MockPlatform::failing("battery service unavailable"));

    assert!(f.battery.charging().await);
    let second = f.battery.charging();
    assert_eq!(second.ready(), Some(&true));
    assert_eq!(f.battery.level().ready(), Some(&100.0));

    assert_eq!(f.battery.status(), CacheStatus::Failed);
    assert_eq!(f.platform.attempts(), 1);
    assert_eq!(errors.count(), 1);
}

// ─────────────────────────────────────────────────────────────────────────────
// Single flight
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn concurrent_reads_share_one_acquisition() {
    let f = fixture(MockPlatform::with_battery(discharging_at(0.8)).held());

    let readings: Vec<_> = (0..16).map(|_| f.battery.level()).collect();
    assert!(readings.iter().all(|reading| !reading.is_ready()));
    assert_eq!(f.battery.status(), CacheStatus::Acquiring);

    f.platform.release();
    let levels =
        futures::future::join_all(readings.into_iter().map(IntoFuture::into_future)).await;

    assert!(levels.iter().all(|level| *level == 80.0));
    assert_eq!(f.platform.attempts(), 1);
    assert_eq!(f.battery.pipeline().attempts(), 1);
}

#[tokio::test]
async fn concurrent_callers_receive_the_same_handle() {
    let platform = Arc::new(MockPlatform::with_battery(discharging_at(0.5)).held());
    let pipeline = AcquisitionPipeline::new(
        Arc::clone(&platform) as Arc<dyn PowerPlatform>,
        Arc::new(RecordingSink::new()),
    );

    let requests: Vec<Acquisition> = (0..8).map(|_| pipeline.request()).collect();
    platform.release();
    let handles =
        futures::future::join_all(requests.into_iter().map(IntoFuture::into_future)).await;

    let first = handles[0].as_ref().unwrap();
    for handle in &handles {
        assert!(Arc::ptr_eq(first, handle.as_ref().unwrap()));
    }
    let settled = pipeline.request();
    assert!(Arc::ptr_eq(first, settled.handle().unwrap()));
}

#[tokio::test]
async fn failure_is_never_retried() {
    let f = fixture(MockPlatform::failing("no battery"));
    f.battery.level().await;

    for _ in 0..1000 {
        assert_eq!(f.battery.level().ready(), Some(&100.0));
    }
    assert_eq!(f.platform.attempts(), 1);
}

#[tokio::test]
async fn ready_state_is_terminal() {
    let f = fixture(MockPlatform::with_battery(discharging_at(0.3)));
    f.battery.level().await;

    for _ in 0..100 {
        assert!(f.battery.charging().is_ready());
        assert_eq!(f.battery.status(), CacheStatus::Ready);
    }
    assert_eq!(f.platform.attempts(), 1);
}

#[tokio::test]
async fn acquisition_completes_when_every_reader_gives_up() {
    let f = fixture(MockPlatform::with_battery(discharging_at(0.6)).held());

    drop(f.battery.level());
    f.platform.release();

    wait_for_status(&f.battery, CacheStatus::Ready).await;
    assert_eq!(f.battery.level().ready(), Some(&60.0));
}

#[test]
fn without_a_runtime_the_first_reader_drives_acquisition() {
    let f = fixture(MockPlatform::with_battery(discharging_at(0.25)));

    let level = futures::executor::block_on(f.battery.level().into_future());
    assert_eq!(level, 25.0);
    assert_eq!(f.battery.status(), CacheStatus::Ready);
}

// ─────────────────────────────────────────────────────────────────────────────
// Event wiring
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn native_events_fire_triggers_only_after_wiring() {
    let mock = discharging_at(0.5);
    let f = fixture(MockPlatform::with_battery(Arc::clone(&mock)).held());

    let pending = f.battery.level();
    assert_eq!(mock.emit(ChangeChannel::Level), 0);
    assert!(f.sink.fired().is_empty());

    f.platform.release();
    pending.await;

    for channel in ChangeChannel::ALL {
        assert_eq!(mock.listener_count(channel), 1);
    }

    mock.emit(ChangeChannel::Level);
    assert_eq!(f.sink.fired(), vec!["battery_levelChanged".to_string()]);
}

#[tokio::test]
async fn each_channel_fires_its_own_trigger_once() {
    let mock = discharging_at(0.5);
    let f = fixture(MockPlatform::with_battery(Arc::clone(&mock)));
    f.battery.level().await;

    // Many reads after settling must not wire again.
    for _ in 0..10 {
        let _ = f.battery.charging();
    }

    for channel in ChangeChannel::ALL {
        mock.emit(channel);
    }
    for trigger in BatteryTrigger::ALL {
        assert_eq!(f.sink.count(trigger.event_name()), 1);
    }
}

#[tokio::test]
async fn reading_updates_fire_matching_triggers() {
    let mock = discharging_at(0.5);
    let f = fixture(MockPlatform::with_battery(Arc::clone(&mock)));
    f.battery.level().await;

    mock.set_level(0.45);
    mock.set_charging(true);

    assert_eq!(
        f.sink.fired(),
        vec![
            "battery_levelChanged".to_string(),
            "battery_chargingChanged".to_string()
        ]
    );
    assert_eq!(f.battery.level().ready(), Some(&45.0));
    assert_eq!(f.battery.charging().ready(), Some(&true));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn handles_are_wired_before_they_are_visible() {
    let mock = discharging_at(0.5);
    let f = fixture(MockPlatform::with_battery(Arc::clone(&mock)).held());
    let pipeline = f.battery.pipeline().clone();

    let observers: Vec<_> = (0..4)
        .map(|_| {
            let pipeline = pipeline.clone();
            let mock = Arc::clone(&mock);
            tokio::spawn(async move {
                loop {
                    if pipeline.request().handle().is_some() {
                        return mock.listener_count(ChangeChannel::Level);
                    }
                    tokio::task::yield_now().await;
                }
            })
        })
        .collect();

    f.platform.release();
    for observer in observers {
        assert_eq!(observer.await.unwrap(), 1);
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Reporters
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn reporters_match_accessors() {
    let f = fixture(MockPlatform::with_battery(discharging_at(0.42)));
    f.battery.level().await;

    assert_eq!(
        f.battery.report(Reporter::Charging).ready(),
        Some(&ReporterValue::Bool(false))
    );
    assert_eq!(
        f.battery.report(Reporter::Level).ready(),
        Some(&ReporterValue::Number(42.0))
    );
    assert_eq!(
        f.battery.report(Reporter::ChargeTime).ready(),
        Some(&ReporterValue::Number(1800.0))
    );
}

#[tokio::test]
async fn reporters_fall_back_after_failure() {
    let f = fixture(MockPlatform::failing("denied"));

    let first = f.battery.report(Reporter::DischargeTime).await;
    assert_eq!(first, ReporterValue::Number(f64::INFINITY));

    for reporter in Reporter::ALL {
        assert_eq!(f.battery.report(reporter).ready(), Some(&reporter.fallback()));
    }
    assert_eq!(f.battery.snapshot().ready(), Some(&BatteryStatus::ABSENT));
}
