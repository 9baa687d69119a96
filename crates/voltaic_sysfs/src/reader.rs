//! Reading `power_supply` attributes.
//!
//! Each supply is a directory of one-value files. Energy figures are in µWh
//! and µW, charge figures in µAh and µA; only ratios are used, so the units
//! cancel.

use std::io;
use std::path::{Path, PathBuf};

use voltaic_battery::BatteryStatus;

use crate::error::SysfsError;

const SECONDS_PER_HOUR: f64 = 3600.0;

/// Raw attributes of one battery supply.
#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct SupplyReadings {
    pub(crate) status: String,
    pub(crate) capacity: Option<f64>,
    pub(crate) energy_now: Option<f64>,
    pub(crate) energy_full: Option<f64>,
    pub(crate) power_now: Option<f64>,
    pub(crate) charge_now: Option<f64>,
    pub(crate) charge_full: Option<f64>,
    pub(crate) current_now: Option<f64>,
}

impl SupplyReadings {
    /// Converts raw attributes to native readings.
    pub(crate) fn to_status(&self) -> BatteryStatus {
        let full_status = self.status.eq_ignore_ascii_case("Full");
        let charging = !self.status.eq_ignore_ascii_case("Discharging");

        let (now, full, rate) = match self.energy_now {
            Some(_) => (self.energy_now, self.energy_full, self.power_now),
            None => (self.charge_now, self.charge_full, self.current_now),
        };
        let rate = rate.map(f64::abs).filter(|rate| *rate > 0.0);

        let level = match (self.capacity, now, full) {
            (Some(capacity), _, _) => capacity / 100.0,
            (None, Some(now), Some(full)) if full > 0.0 => now / full,
            _ => 1.0,
        }
        .clamp(0.0, 1.0);

        let charging_time = if full_status {
            0.0
        } else {
            match (charging, now, full, rate) {
                (true, Some(now), Some(full), Some(rate)) if full >= now => {
                    ((full - now) / rate * SECONDS_PER_HOUR).round()
                }
                _ => f64::INFINITY,
            }
        };

        let discharging_time = match (charging, now, rate) {
            (false, Some(now), Some(rate)) => (now / rate * SECONDS_PER_HOUR).round(),
            _ => f64::INFINITY,
        };

        BatteryStatus {
            charging,
            level,
            charging_time,
            discharging_time,
        }
    }
}

/// Finds the first system battery under `root`, in name order.
///
/// Peripheral batteries (`scope` = `Device`) and absent batteries
/// (`present` = `0`) are skipped.
pub(crate) fn find_battery(root: &Path) -> Result<PathBuf, SysfsError> {
    let entries = std::fs::read_dir(root).map_err(|source| SysfsError::Read {
        path: root.to_path_buf(),
        source,
    })?;

    let mut supplies: Vec<PathBuf> = entries
        .filter_map(Result::ok)
        .map(|entry| entry.path())
        .collect();
    supplies.sort();

    supplies
        .into_iter()
        .find(|dir| is_system_battery(dir))
        .ok_or_else(|| SysfsError::NoBattery(root.to_path_buf()))
}

fn is_system_battery(dir: &Path) -> bool {
    let attribute = |name: &str| {
        std::fs::read_to_string(dir.join(name))
            .ok()
            .map(|value| value.trim().to_string())
    };

    attribute("type").as_deref() == Some("Battery")
        && attribute("scope").as_deref() != Some("Device")
        && attribute("present").as_deref() != Some("0")
}

/// Reads the current status of the battery at `dir`.
pub(crate) async fn read_status(dir: &Path) -> Result<BatteryStatus, SysfsError> {
    Ok(read_supply(dir).await?.to_status())
}

pub(crate) async fn read_supply(dir: &Path) -> Result<SupplyReadings, SysfsError> {
    let status = read_attribute(dir, "status")
        .await?
        .unwrap_or_else(|| "Unknown".to_string());

    Ok(SupplyReadings {
        status,
        capacity: read_number(dir, "capacity").await?,
        energy_now: read_number(dir, "energy_now").await?,
        energy_full: read_number(dir, "energy_full").await?,
        power_now: read_number(dir, "power_now").await?,
        charge_now: read_number(dir, "charge_now").await?,
        charge_full: read_number(dir, "charge_full").await?,
        current_now: read_number(dir, "current_now").await?,
    })
}

/// Reads a trimmed attribute; `None` if the file does not exist.
async fn read_attribute(dir: &Path, name: &str) -> Result<Option<String>, SysfsError> {
    let path = dir.join(name);
    match tokio::fs::read_to_string(&path).await {
        Ok(value) => Ok(Some(value.trim().to_string())),
        Err(source) if source.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(source) => Err(SysfsError::Read { path, source }),
    }
}

async fn read_number(dir: &Path, name: &str) -> Result<Option<f64>, SysfsError> {
    match read_attribute(dir, name).await? {
        None => Ok(None),
        Some(value) => value
            .parse::<f64>()
            .map(Some)
            .map_err(|_| SysfsError::Parse {
                path: dir.join(name),
                value,
            }),
    }
}
