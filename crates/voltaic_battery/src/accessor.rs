//! The battery readings exposed to callers.

use std::sync::Arc;

use voltaic_system::resource::GlobalResource;

use crate::bridge::TriggerSink;
use crate::cache::CacheStatus;
use crate::pipeline::AcquisitionPipeline;
use crate::platform::{BatteryManager, BatteryStatus, PowerPlatform};
use crate::reading::Reading;
use crate::reporter::{Reporter, ReporterValue};

pub(crate) fn charging_of(battery: Option<&dyn BatteryManager>) -> bool {
    battery.map_or(BatteryStatus::ABSENT.charging, |b| b.charging())
}

pub(crate) fn level_of(battery: Option<&dyn BatteryManager>) -> f64 {
    battery.map_or(BatteryStatus::ABSENT.level, |b| b.level()) * 100.0
}

pub(crate) fn charge_time_of(battery: Option<&dyn BatteryManager>) -> f64 {
    battery.map_or(BatteryStatus::ABSENT.charging_time, |b| b.charging_time())
}

pub(crate) fn discharge_time_of(battery: Option<&dyn BatteryManager>) -> f64 {
    battery.map_or(BatteryStatus::ABSENT.discharging_time, |b| {
        b.discharging_time()
    })
}

/// Battery status with fallbacks.
///
/// Every reading succeeds. Without a battery (unsupported platform or failed
/// acquisition) the accessors report a charging, full battery:
///
/// | Accessor | Fallback |
/// |----------|----------|
/// | [`charging`](Self::charging) | `true` |
/// | [`level`](Self::level) | `100.0` |
/// | [`charge_time`](Self::charge_time) | `0.0` |
/// | [`discharge_time`](Self::discharge_time) | `f64::INFINITY` |
///
/// Readings are [`Ready`](Reading::Ready) once acquisition has settled;
/// reads issued while it is in flight are [`Pending`](Reading::Pending) and
/// resolve when it completes.
#[derive(Clone, Debug)]
pub struct Battery {
    pipeline: AcquisitionPipeline,
}

impl GlobalResource for Battery {}

impl Battery {
    /// Creates accessors over a fresh pipeline.
    pub fn new(platform: Arc<dyn PowerPlatform>, sink: Arc<dyn TriggerSink>) -> Self {
        Self::from_pipeline(AcquisitionPipeline::new(platform, sink))
    }

    /// Creates accessors sharing an existing pipeline.
    #[must_use]
    pub fn from_pipeline(pipeline: AcquisitionPipeline) -> Self {
        Self { pipeline }
    }

    /// The underlying pipeline.
    #[must_use]
    pub fn pipeline(&self) -> &AcquisitionPipeline {
        &self.pipeline
    }

    /// Current acquisition status.
    #[must_use]
    pub fn status(&self) -> CacheStatus {
        self.pipeline.status()
    }

    /// Starts acquisition ahead of the first read.
    ///
    /// Inside a Tokio runtime the acquisition proceeds in the background;
    /// otherwise it waits for the first read to drive it.
    pub fn warm_up(&self) {
        let acquisition = self.pipeline.request();
        if !acquisition.is_settled() && tokio::runtime::Handle::try_current().is_err() {
            tracing::debug!("no async runtime, battery acquisition deferred to first read");
        }
    }

    /// Whether the battery is charging.
    pub fn charging(&self) -> Reading<bool> {
        self.pipeline.request().read(charging_of)
    }

    /// Charge level as a percentage in `[0, 100]`.
    pub fn level(&self) -> Reading<f64> {
        self.pipeline.request().read(level_of)
    }

    /// Seconds until full.
    pub fn charge_time(&self) -> Reading<f64> {
        self.pipeline.request().read(charge_time_of)
    }

    /// Seconds until empty.
    pub fn discharge_time(&self) -> Reading<f64> {
        self.pipeline.request().read(discharge_time_of)
    }

    /// All four readings in native units, with [`BatteryStatus::ABSENT`] as
    /// the fallback.
    pub fn snapshot(&self) -> Reading<BatteryStatus> {
        self.pipeline
            .request()
            .read(|battery| battery.map_or(BatteryStatus::ABSENT, |b| b.status()))
    }

    /// The value of a reporter block.
    pub fn report(&self, reporter: Reporter) -> Reading<ReporterValue> {
        self.pipeline
            .request()
            .read(move |battery| reporter.value_of(battery))
    }
}
