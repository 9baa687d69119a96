//! SysfsPlatform against a fake power_supply tree.

use std::fs;
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use tempfile::TempDir;
use voltaic_battery::{
    AcquireError, AcquisitionPipeline, BatteryManager, ChangeChannel, PowerPlatform, TriggerSink,
};
use voltaic_sysfs::{SysfsConfig, SysfsPlatform};

fn supply(root: &Path, name: &str, attributes: &[(&str, &str)]) {
    let dir = root.join(name);
    fs::create_dir_all(&dir).unwrap();
    for (attribute, value) in attributes {
        fs::write(dir.join(attribute), format!("{value}\n")).unwrap();
    }
}

fn laptop() -> TempDir {
    let root = tempfile::tempdir().unwrap();
    supply(root.path(), "AC", &[("type", "Mains"), ("online", "0")]);
    supply(
        root.path(),
        "BAT0",
        &[
            ("type", "Battery"),
            ("present", "1"),
            ("status", "Discharging"),
            ("capacity", "42"),
            ("energy_now", "21000000"),
            ("energy_full", "50000000"),
            ("power_now", "10500000"),
        ],
    );
    root
}

fn platform_over(root: &Path) -> SysfsPlatform {
    SysfsPlatform::new(
        SysfsConfig::new()
            .with_root(root)
            .with_poll_interval(Duration::from_millis(10)),
    )
}

struct CountingSink(AtomicUsize);

impl TriggerSink for CountingSink {
    fn fire(&self, _event: &str) {
        self.0.fetch_add(1, Ordering::SeqCst);
    }
}

#[test]
fn empty_or_missing_directory_is_unsupported() {
    let root = tempfile::tempdir().unwrap();
    assert!(!platform_over(root.path()).is_supported());
    assert!(!platform_over(&root.path().join("missing")).is_supported());
}

#[test]
fn peripheral_batteries_are_ignored() {
    let root = tempfile::tempdir().unwrap();
    supply(
        root.path(),
        "hid-mouse-battery",
        &[("type", "Battery"), ("scope", "Device"), ("capacity", "80")],
    );
    assert!(!platform_over(root.path()).is_supported());

    supply(root.path(), "BAT1", &[("type", "Battery"), ("status", "Full")]);
    let platform = platform_over(root.path());
    assert!(platform.is_supported());
    assert_eq!(platform.battery_dir(), Some(root.path().join("BAT1").as_path()));
}

#[tokio::test]
async fn acquire_reads_the_battery() {
    let root = laptop();
    let platform = platform_over(root.path());
    assert!(platform.is_supported());

    let battery = platform.acquire().await.unwrap();
    assert!(!battery.charging());
    assert_eq!(battery.level(), 0.42);
    assert_eq!(battery.discharging_time(), 7200.0);
    assert_eq!(battery.charging_time(), f64::INFINITY);
}

#[tokio::test]
async fn acquire_without_battery_fails() {
    let root = tempfile::tempdir().unwrap();
    let result = platform_over(root.path()).acquire().await;
    assert!(matches!(result, Err(AcquireError::NoBattery)));
}

#[test]
fn acquire_outside_a_runtime_fails() {
    let root = laptop();
    let platform = platform_over(root.path());
    let result = futures::executor::block_on(platform.acquire());
    assert!(matches!(result, Err(AcquireError::Platform(_))));
}

#[tokio::test]
async fn malformed_attribute_fails_acquisition() {
    let root = laptop();
    fs::write(root.path().join("BAT0/capacity"), "lots\n").unwrap();

    let result = platform_over(root.path()).acquire().await;
    assert!(matches!(result, Err(AcquireError::Platform(message)) if message.contains("lots")));
}

#[tokio::test]
async fn polling_emits_changed_channels() {
    let root = laptop();
    let battery = platform_over(root.path()).acquire().await.unwrap();

    let level_changes = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&level_changes);
    battery.subscribe(
        ChangeChannel::Level,
        Arc::new(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        }),
    );

    fs::write(root.path().join("BAT0/capacity"), "41\n").unwrap();

    tokio::time::timeout(Duration::from_secs(5), async {
        while level_changes.load(Ordering::SeqCst) == 0 {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .unwrap();

    assert_eq!(battery.level(), 0.41);
}

#[tokio::test]
async fn pipeline_bridges_polled_changes() {
    let root = laptop();
    let sink = Arc::new(CountingSink(AtomicUsize::new(0)));
    let pipeline = AcquisitionPipeline::new(
        Arc::new(platform_over(root.path())),
        Arc::clone(&sink) as Arc<dyn TriggerSink>,
    );

    let handle = pipeline.request().await.unwrap();
    assert!(!handle.charging());

    fs::write(root.path().join("BAT0/status"), "Charging\n").unwrap();

    tokio::time::timeout(Duration::from_secs(5), async {
        while sink.0.load(Ordering::SeqCst) == 0 {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .unwrap();

    assert!(handle.charging());
}

#[tokio::test]
async fn zero_poll_interval_still_bridges_changes() {
    let root = laptop();
    let config = SysfsConfig {
        root: root.path().to_path_buf(),
        poll_interval: Duration::ZERO,
    };
    let sink = Arc::new(CountingSink(AtomicUsize::new(0)));
    let pipeline = AcquisitionPipeline::new(
        Arc::new(SysfsPlatform::new(config)),
        Arc::clone(&sink) as Arc<dyn TriggerSink>,
    );

    let handle = pipeline.request().await.unwrap();
    assert_eq!(handle.level(), 0.42);

    fs::write(root.path().join("BAT0/capacity"), "41\n").unwrap();

    tokio::time::timeout(Duration::from_secs(5), async {
        while sink.0.load(Ordering::SeqCst) == 0 {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .unwrap();

    assert_eq!(handle.level(), 0.41);
}
