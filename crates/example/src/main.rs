//! Battery monitor CLI.
//!
//! Reads the system battery through sysfs, logs every reporter once, then
//! logs each change trigger for a while.
//!
//! # Usage
//!
//! ```bash
//! battery_monitor [watch_seconds]
//! ```
//!
//! # Example
//!
//! ```bash
//! VOLTAIC_LOG=info,voltaic_battery=debug VOLTAIC_POLL_INTERVAL_MS=1000 battery_monitor 60
//! ```

use std::time::Duration;

use voltaic_battery::{Battery, BatteryPlugin, BatteryTrigger, HatsAPI, HatsPlugin, Reporter};
use voltaic_core_plugins::TracingPlugin;
use voltaic_sysfs::SysfsPlatform;
use voltaic_system::server::Server;

const DEFAULT_WATCH: Duration = Duration::from_secs(30);

fn reporter_for(trigger: BatteryTrigger) -> Reporter {
    match trigger {
        BatteryTrigger::ChargingChanged => Reporter::Charging,
        BatteryTrigger::LevelChanged => Reporter::Level,
        BatteryTrigger::ChargeTimeChanged => Reporter::ChargeTime,
        BatteryTrigger::DischargeTimeChanged => Reporter::DischargeTime,
    }
}

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();

    let watch = match std::env::args().nth(1) {
        None => DEFAULT_WATCH,
        Some(raw) => match raw.parse::<u64>() {
            Ok(seconds) => Duration::from_secs(seconds),
            Err(_) => {
                eprintln!("Usage: battery_monitor [watch_seconds]");
                std::process::exit(1);
            }
        },
    };

    let platform = SysfsPlatform::from_env().unwrap_or_else(|e| {
        eprintln!("Error: {e}");
        std::process::exit(1);
    });

    // Initialize server with plugins
    let mut server = Server::new();
    server.add_plugins(TracingPlugin::from_env("VOLTAIC_LOG"));
    server.add_plugins(HatsPlugin);
    server.add_plugins(BatteryPlugin::new(platform));
    server.finish();

    let Some(battery) = server.get_global::<Battery>().map(|battery| battery.clone()) else {
        eprintln!("Error: battery plugin did not register");
        std::process::exit(1);
    };

    if let Some(hats) = server.api::<HatsAPI>() {
        for trigger in BatteryTrigger::ALL {
            let reporter = reporter_for(trigger);
            let battery = battery.clone();
            let registered = hats.register_trigger(trigger, "log_change", move || {
                if let Some(value) = battery.report(reporter).ready() {
                    tracing::info!(%trigger, %value, "battery changed");
                }
            });
            if let Err(e) = registered {
                tracing::warn!(error = %e, "hat not registered");
            }
        }
    }

    let status = battery.snapshot().await;
    tracing::info!(source = ?battery.status(), ?status, "battery snapshot");
    for reporter in Reporter::ALL {
        let value = battery.report(reporter).await;
        tracing::info!(reporter = reporter.opcode(), %value, "reporter");
    }

    tracing::info!(seconds = watch.as_secs(), "watching for changes");
    tokio::time::sleep(watch).await;

    server.cleanup();
}
