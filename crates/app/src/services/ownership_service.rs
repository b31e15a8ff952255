//! Ownership service — claim, release, and list devices per user.
//!
//! Claims and releases go through the registry's conditional writes
//! ([`DeviceRepository::set_owner`] / [`DeviceRepository::clear_owner`]), so
//! two concurrent claims on the same device cannot both succeed.

use stopfire_domain::device::{Device, Ownership};
use stopfire_domain::error::{ConflictError, NotFoundError, StopfireError};
use stopfire_domain::id::{DeviceId, UserId};
use stopfire_domain::user::User;

use crate::ports::{DeviceRepository, UserRepository};

/// Application service enforcing the single-owner rule.
pub struct OwnershipService<D, U> {
    devices: D,
    users: U,
}

impl<D: DeviceRepository, U: UserRepository> OwnershipService<D, U> {
    /// Create a new service backed by the given registry and user lookup.
    pub fn new(devices: D, users: U) -> Self {
        Self { devices, users }
    }

    /// Assign a device to a user.
    ///
    /// Re-assigning a device to its current owner is accepted and re-issues
    /// the write.
    ///
    /// # Errors
    ///
    /// Returns [`StopfireError::NotFound`] when the device or the user does not
    /// exist, [`ConflictError::AlreadyAssigned`] when another user owns the
    /// device, or a storage error from the repositories.
    #[tracing::instrument(skip(self))]
    pub async fn assign(
        &self,
        device_id: DeviceId,
        user_id: UserId,
    ) -> Result<Device, StopfireError> {
        let device = self.require_device(device_id).await?;
        self.claim(device, user_id).await
    }

    /// Assign the device carrying `serial_number` to a user.
    ///
    /// # Errors
    ///
    /// Same as [`Self::assign`]; an unknown serial is reported as
    /// [`StopfireError::NotFound`].
    #[tracing::instrument(skip(self))]
    pub async fn assign_by_serial(
        &self,
        serial_number: &str,
        user_id: UserId,
    ) -> Result<Device, StopfireError> {
        let device = self
            .devices
            .find_by_serial(serial_number)
            .await?
            .ok_or_else(|| NotFoundError {
                entity: "Device",
                id: serial_number.to_owned(),
            })?;
        self.claim(device, user_id).await
    }

    /// Release a device from its owner.
    ///
    /// # Errors
    ///
    /// Returns [`StopfireError::NotFound`] when the device does not exist,
    /// [`ConflictError::NotAssigned`] when it has no owner, or a storage error.
    #[tracing::instrument(skip(self))]
    pub async fn unassign(&self, device_id: DeviceId) -> Result<Device, StopfireError> {
        let mut device = self.require_device(device_id).await?;

        let not_assigned = ConflictError::NotAssigned {
            device_id: device_id.get(),
        };
        if device.ownership() == Ownership::Unowned {
            return Err(not_assigned.into());
        }
        if !self.devices.clear_owner(device_id).await? {
            tracing::warn!(%device_id, "device released concurrently");
            return Err(not_assigned.into());
        }

        device.unassign_owner();
        tracing::info!(%device_id, "device unassigned");
        Ok(device)
    }

    /// List the devices owned by a user.
    ///
    /// # Errors
    ///
    /// Returns [`StopfireError::NotFound`] when the user does not exist, or a
    /// storage error.
    #[tracing::instrument(skip(self))]
    pub async fn list_owned(&self, user_id: UserId) -> Result<Vec<Device>, StopfireError> {
        self.require_user(user_id).await?;
        self.devices.find_by_owner(user_id).await
    }

    async fn claim(&self, mut device: Device, user_id: UserId) -> Result<Device, StopfireError> {
        self.require_user(user_id).await?;

        if !self.devices.set_owner(device.id, user_id).await? {
            tracing::warn!(device_id = %device.id, %user_id, "device owned by another user");
            return Err(ConflictError::AlreadyAssigned {
                device_id: device.id.get(),
            }
            .into());
        }

        device.assign_owner(user_id);
        tracing::info!(device_id = %device.id, %user_id, "device assigned");
        Ok(device)
    }

    async fn require_device(&self, id: DeviceId) -> Result<Device, StopfireError> {
        self.devices.get_by_id(id).await?.ok_or_else(|| {
            NotFoundError {
                entity: "Device",
                id: id.to_string(),
            }
            .into()
        })
    }

    async fn require_user(&self, id: UserId) -> Result<User, StopfireError> {
        self.users.get_by_id(id).await?.ok_or_else(|| {
            NotFoundError {
                entity: "User",
                id: id.to_string(),
            }
            .into()
        })
    }
}
