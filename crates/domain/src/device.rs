//! Device — an ESP32 unit exposing four sensor channels, optionally owned by a user.

use serde::{Deserialize, Serialize};

use crate::error::{StopfireError, ValidationError};
use crate::id::{ChannelId, DeviceId, UserId};
use crate::sensor::{SensorChannels, SensorKind};

/// A persisted device.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Device {
    pub id: DeviceId,
    pub serial_number: String,
    pub channels: SensorChannels,
    pub owner_id: Option<UserId>,
}

/// Ownership state of a device.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ownership {
    Unowned,
    OwnedBy(UserId),
}

impl Device {
    /// Create a builder for provisioning a new device.
    #[must_use]
    pub fn builder() -> DeviceBuilder {
        DeviceBuilder::default()
    }

    /// Set the owner. No business rule is checked here.
    pub fn assign_owner(&mut self, user_id: UserId) {
        self.owner_id = Some(user_id);
    }

    /// Clear the owner.
    pub fn unassign_owner(&mut self) {
        self.owner_id = None;
    }

    #[must_use]
    pub fn ownership(&self) -> Ownership {
        match self.owner_id {
            Some(user_id) => Ownership::OwnedBy(user_id),
            None => Ownership::Unowned,
        }
    }

    #[must_use]
    pub fn is_owned_by(&self, user_id: UserId) -> bool {
        self.owner_id == Some(user_id)
    }
}

/// A device that has not been stored yet and so has no id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewDevice {
    pub serial_number: String,
    pub channels: SensorChannels,
    pub owner_id: Option<UserId>,
}

impl NewDevice {
    /// Check provisioning invariants.
    ///
    /// # Errors
    ///
    /// Returns [`StopfireError::Validation`] when the serial is blank or a
    /// channel slot is empty.
    pub fn validate(&self) -> Result<(), StopfireError> {
        if self.serial_number.trim().is_empty() {
            return Err(ValidationError::EmptySerial.into());
        }
        if let Some(kind) = self.channels.first_missing() {
            return Err(ValidationError::MissingChannel(kind).into());
        }
        Ok(())
    }

    /// Attach the registry-assigned id.
    #[must_use]
    pub fn with_id(self, id: DeviceId) -> Device {
        Device {
            id,
            serial_number: self.serial_number,
            channels: self.channels,
            owner_id: self.owner_id,
        }
    }
}

/// Step-by-step builder for [`NewDevice`].
#[derive(Debug, Default)]
pub struct DeviceBuilder {
    serial_number: Option<String>,
    channels: SensorChannels,
    owner_id: Option<UserId>,
}

impl DeviceBuilder {
    #[must_use]
    pub fn serial_number(mut self, serial_number: impl Into<String>) -> Self {
        self.serial_number = Some(serial_number.into());
        self
    }

    #[must_use]
    pub fn channel(mut self, kind: SensorKind, id: ChannelId) -> Self {
        self.channels.set(kind, Some(id));
        self
    }

    #[must_use]
    pub fn channels(mut self, channels: SensorChannels) -> Self {
        self.channels = channels;
        self
    }

    #[must_use]
    pub fn owner_id(mut self, owner_id: UserId) -> Self {
        self.owner_id = Some(owner_id);
        self
    }

    /// Consume the builder, validate, and return a [`NewDevice`].
    ///
    /// All four channels are mandatory at provisioning time.
    ///
    /// # Errors
    ///
    /// Returns [`StopfireError::Validation`] if the serial is missing or empty,
    /// or if any channel is missing.
    pub fn build(self) -> Result<NewDevice, StopfireError> {
        let device = NewDevice {
            serial_number: self.serial_number.unwrap_or_default(),
            channels: self.channels,
            owner_id: self.owner_id,
        };
        device.validate()?;
        Ok(device)
    }
}
