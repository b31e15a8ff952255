//! Sensor kinds and the per-device channel map.
//!
//! Every device carries exactly one channel of each [`SensorKind`]. The set of
//! kinds is closed: adding a sensor means adding a variant here and a table in
//! the storage adapter.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::id::ChannelId;

/// The four sensors mounted on a device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SensorKind {
    /// KY-026 flame / smoke detector.
    #[serde(rename = "KY_026")]
    Ky026,
    /// MQ-2 combustible gas sensor.
    #[serde(rename = "MQ_2")]
    Mq2,
    /// MQ-135 air quality sensor.
    #[serde(rename = "MQ_135")]
    Mq135,
    /// DHT-22 temperature and humidity sensor.
    #[serde(rename = "DHT_22")]
    Dht22,
}

impl SensorKind {
    /// All kinds, in the order alert queries are issued.
    pub const ALL: [Self; 4] = [Self::Ky026, Self::Mq2, Self::Mq135, Self::Dht22];

    /// Wire tag of the kind.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Ky026 => "KY_026",
            Self::Mq2 => "MQ_2",
            Self::Mq135 => "MQ_135",
            Self::Dht22 => "DHT_22",
        }
    }
}

impl fmt::Display for SensorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown sensor tag.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown sensor kind: {0}")]
pub struct UnknownSensorKind(pub String);

impl FromStr for SensorKind {
    type Err = UnknownSensorKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| UnknownSensorKind(s.to_owned()))
    }
}

/// State flag stored in the sensor tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SensorState {
    #[default]
    Inactive,
    Active,
}

impl SensorState {
    /// Raw value the store uses for an active sensor.
    pub const ACTIVE_FLAG: i64 = 1;

    /// Interpret a raw store flag. Anything but [`Self::ACTIVE_FLAG`] is inactive.
    #[must_use]
    pub fn from_flag(flag: i64) -> Self {
        if flag == Self::ACTIVE_FLAG {
            Self::Active
        } else {
            Self::Inactive
        }
    }

    #[must_use]
    pub fn is_active(self) -> bool {
        matches!(self, Self::Active)
    }
}

/// Channel identifiers of one device, one slot per [`SensorKind`].
///
/// Slots are optional because stored rows may leave a channel unset; freshly
/// provisioned devices always fill all four (see
/// [`DeviceBuilder::build`](crate::device::DeviceBuilder::build)).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SensorChannels {
    pub ky026: Option<ChannelId>,
    pub mq2: Option<ChannelId>,
    pub mq135: Option<ChannelId>,
    pub dht22: Option<ChannelId>,
}

impl SensorChannels {
    /// Channel map with every slot filled.
    #[must_use]
    pub fn new(ky026: ChannelId, mq2: ChannelId, mq135: ChannelId, dht22: ChannelId) -> Self {
        Self {
            ky026: Some(ky026),
            mq2: Some(mq2),
            mq135: Some(mq135),
            dht22: Some(dht22),
        }
    }

    #[must_use]
    pub fn get(&self, kind: SensorKind) -> Option<ChannelId> {
        match kind {
            SensorKind::Ky026 => self.ky026,
            SensorKind::Mq2 => self.mq2,
            SensorKind::Mq135 => self.mq135,
            SensorKind::Dht22 => self.dht22,
        }
    }

    pub fn set(&mut self, kind: SensorKind, channel: Option<ChannelId>) {
        let slot = match kind {
            SensorKind::Ky026 => &mut self.ky026,
            SensorKind::Mq2 => &mut self.mq2,
            SensorKind::Mq135 => &mut self.mq135,
            SensorKind::Dht22 => &mut self.dht22,
        };
        *slot = channel;
    }

    /// First kind whose slot is empty, if any.
    #[must_use]
    pub fn first_missing(&self) -> Option<SensorKind> {
        SensorKind::ALL
            .into_iter()
            .find(|kind| self.get(*kind).is_none())
    }

    /// Iterate over the filled slots.
    pub fn iter(&self) -> impl Iterator<Item = (SensorKind, ChannelId)> + '_ {
        SensorKind::ALL
            .into_iter()
            .filter_map(|kind| self.get(kind).map(|id| (kind, id)))
    }
}
