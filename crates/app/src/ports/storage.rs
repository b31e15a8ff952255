//! Storage port — repository traits for persistence.
//!
//! Every method returns a future; dropping it cancels the underlying query.

use std::future::Future;

use stopfire_domain::device::{Device, NewDevice};
use stopfire_domain::error::StopfireError;
use stopfire_domain::id::{DeviceId, UserId};
use stopfire_domain::sensor::SensorChannels;
use stopfire_domain::user::User;

/// Registry of devices, keyed by id and by serial number.
pub trait DeviceRepository {
    /// Store a new device and return it with its assigned id.
    ///
    /// Fails with [`ConflictError::DuplicateSerial`](stopfire_domain::error::ConflictError::DuplicateSerial)
    /// when the serial number is already registered.
    fn create(
        &self,
        device: NewDevice,
    ) -> impl Future<Output = Result<Device, StopfireError>> + Send;

    fn get_by_id(
        &self,
        id: DeviceId,
    ) -> impl Future<Output = Result<Option<Device>, StopfireError>> + Send;

    /// Absence is a normal outcome, not an error.
    fn find_by_serial(
        &self,
        serial_number: &str,
    ) -> impl Future<Output = Result<Option<Device>, StopfireError>> + Send;

    fn find_by_owner(
        &self,
        owner_id: UserId,
    ) -> impl Future<Output = Result<Vec<Device>, StopfireError>> + Send;

    fn find_unowned(&self) -> impl Future<Output = Result<Vec<Device>, StopfireError>> + Send;

    /// Replace every column of an existing device.
    ///
    /// Fails with [`NotFoundError`](stopfire_domain::error::NotFoundError)
    /// when no device has that id; nothing is written in that case.
    fn update(&self, device: Device)
    -> impl Future<Output = Result<Device, StopfireError>> + Send;

    /// Point the device at new sensor channels in one write. The serial
    /// number and the owner are not touched.
    ///
    /// Returns `false` when the device does not exist.
    fn set_channels(
        &self,
        id: DeviceId,
        channels: SensorChannels,
    ) -> impl Future<Output = Result<bool, StopfireError>> + Send;

    fn delete(&self, id: DeviceId) -> impl Future<Output = Result<(), StopfireError>> + Send;

    /// Claim the device for `owner_id` if it is unowned or already owned by
    /// `owner_id`, as one conditional write.
    ///
    /// Returns `false` when the device is owned by someone else (or does not
    /// exist), in which case nothing was written.
    fn set_owner(
        &self,
        id: DeviceId,
        owner_id: UserId,
    ) -> impl Future<Output = Result<bool, StopfireError>> + Send;

    /// Release the device if it currently has an owner, as one conditional write.
    ///
    /// Returns `false` when there was nothing to release.
    fn clear_owner(&self, id: DeviceId) -> impl Future<Output = Result<bool, StopfireError>> + Send;
}

/// User existence lookup.
pub trait UserRepository {
    fn get_by_id(
        &self,
        id: UserId,
    ) -> impl Future<Output = Result<Option<User>, StopfireError>> + Send;
}
