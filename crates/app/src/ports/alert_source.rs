//! Alert source port — per-kind queries over the sensor tables.

use std::future::Future;

use stopfire_domain::alert::{ActiveReading, AlertScope};
use stopfire_domain::error::StopfireError;
use stopfire_domain::sensor::SensorKind;

/// Reads active rows of one sensor table at a time.
pub trait AlertSource {
    /// Active readings of `kind` joined with their device, restricted to `scope`.
    ///
    /// Inactive rows must never be returned.
    fn find_active(
        &self,
        kind: SensorKind,
        scope: &AlertScope,
    ) -> impl Future<Output = Result<Vec<ActiveReading>, StopfireError>> + Send;
}
