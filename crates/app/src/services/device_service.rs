//! Device service — provisioning and lookup of devices.

use stopfire_domain::device::{Device, NewDevice};
use stopfire_domain::error::{NotFoundError, StopfireError, ValidationError};
use stopfire_domain::id::DeviceId;
use stopfire_domain::sensor::SensorChannels;

use crate::ports::DeviceRepository;

/// Application service for registering and maintaining devices.
pub struct DeviceService<R> {
    repo: R,
}

impl<R: DeviceRepository> DeviceService<R> {
    /// Create a new service backed by the given repository.
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Register a new device after validating domain invariants.
    ///
    /// # Errors
    ///
    /// Returns [`StopfireError::Validation`] if invariants fail,
    /// [`StopfireError::Conflict`] if the serial is taken, or a storage error.
    #[tracing::instrument(skip(self, device), fields(serial_number = %device.serial_number))]
    pub async fn register(&self, device: NewDevice) -> Result<Device, StopfireError> {
        device.validate()?;
        let device = self.repo.create(device).await?;
        tracing::info!(device_id = %device.id, "device registered");
        Ok(device)
    }

    /// Look up a device by id, returning an error if not found.
    ///
    /// # Errors
    ///
    /// Returns [`StopfireError::NotFound`] when no device with `id` exists,
    /// or a storage error from the repository.
    #[tracing::instrument(skip(self))]
    pub async fn get(&self, id: DeviceId) -> Result<Device, StopfireError> {
        self.repo.get_by_id(id).await?.ok_or_else(|| {
            NotFoundError {
                entity: "Device",
                id: id.to_string(),
            }
            .into()
        })
    }

    /// List devices nobody has claimed yet.
    ///
    /// # Errors
    ///
    /// Returns a storage error propagated from the repository.
    pub async fn list_unowned(&self) -> Result<Vec<Device>, StopfireError> {
        self.repo.find_unowned().await
    }

    /// Point a device at a new set of sensor channels.
    ///
    /// Only the channel columns are written, so an assignment racing with
    /// this call is never reverted.
    ///
    /// # Errors
    ///
    /// Returns [`StopfireError::Validation`] if a channel is missing,
    /// [`StopfireError::NotFound`] if the device does not exist, or a storage
    /// error.
    #[tracing::instrument(skip(self))]
    pub async fn rebind_channels(
        &self,
        id: DeviceId,
        channels: SensorChannels,
    ) -> Result<Device, StopfireError> {
        if let Some(kind) = channels.first_missing() {
            return Err(ValidationError::MissingChannel(kind).into());
        }
        if !self.repo.set_channels(id, channels).await? {
            return Err(NotFoundError {
                entity: "Device",
                id: id.to_string(),
            }
            .into());
        }
        tracing::info!(device_id = %id, "channels rebound");
        self.get(id).await
    }

    /// Delete a device by id.
    ///
    /// # Errors
    ///
    /// Returns a storage error propagated from the repository.
    #[tracing::instrument(skip(self))]
    pub async fn remove(&self, id: DeviceId) -> Result<(), StopfireError> {
        self.repo.delete(id).await
    }
}
