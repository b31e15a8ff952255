//! Alerts — read-only records of sensor channels currently in their active state.
//!
//! Alerts are never stored. They are materialized from the sensor tables on
//! every read and merged across the four [`SensorKind`]s.

use serde::{Deserialize, Serialize};

use crate::id::{ChannelId, DeviceId, UserId};
use crate::sensor::{SensorKind, SensorState};
use crate::time::Timestamp;

/// Filter under which alerts are aggregated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AlertScope {
    /// Devices owned by the user.
    User(UserId),
    /// A single device, by id.
    Device(DeviceId),
    /// A single device, by serial number.
    Serial(String),
}

/// One active row of a sensor table joined with its device.
///
/// This is the shape every per-kind query returns; the kind itself is
/// attached by the aggregator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActiveReading {
    pub sensor_id: ChannelId,
    pub state: SensorState,
    pub activated_at: String,
    pub device_id: DeviceId,
    pub device_serial: String,
}

/// An entry of the alert feed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Alert {
    pub sensor_id: ChannelId,
    pub sensor_type: SensorKind,
    pub state: SensorState,
    /// When the sensor last turned active, as stored by the source.
    pub activated_at: String,
    pub device_id: DeviceId,
    pub device_serial: String,
    /// When the feed was read. Not the activation time.
    pub observed_at: Timestamp,
}

impl Alert {
    /// Tag a reading with its sensor kind and the read time.
    #[must_use]
    pub fn from_reading(kind: SensorKind, reading: ActiveReading, observed_at: Timestamp) -> Self {
        Self {
            sensor_id: reading.sensor_id,
            sensor_type: kind,
            state: reading.state,
            activated_at: reading.activated_at,
            device_id: reading.device_id,
            device_serial: reading.device_serial,
            observed_at,
        }
    }
}

/// Order alerts most recent activation first.
///
/// The sort is stable, so alerts sharing an activation time keep their
/// relative order.
pub fn sort_most_recent_first(alerts: &mut [Alert]) {
    alerts.sort_by(|a, b| b.activated_at.cmp(&a.activated_at));
}
