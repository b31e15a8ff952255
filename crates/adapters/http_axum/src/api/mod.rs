//! JSON API handler modules.

#[allow(clippy::missing_errors_doc)]
pub mod alerts;
#[allow(clippy::missing_errors_doc)]
pub mod devices;

use std::str::FromStr;

use axum::Router;
use axum::routing::{delete, get, post, put};

use stopfire_app::ports::{AlertSource, DeviceRepository, UserRepository};
use stopfire_domain::error::{StopfireError, ValidationError};
use stopfire_domain::id::DeviceId;

use crate::error::ApiError;
use crate::state::AppState;

/// Build the `/api` sub-router.
pub fn routes<DR, UR, AS>() -> Router<AppState<DR, UR, AS>>
where
    DR: DeviceRepository + Send + Sync + 'static,
    UR: UserRepository + Send + Sync + 'static,
    AS: AlertSource + Send + Sync + 'static,
{
    Router::new()
        // Ownership
        .route("/devices/assign", post(devices::assign::<DR, UR, AS>))
        .route("/devices/{id}/unassign", delete(devices::unassign::<DR, UR, AS>))
        .route("/devices/mine", get(devices::mine::<DR, UR, AS>))
        // Provisioning
        .route("/devices", post(devices::create::<DR, UR, AS>))
        .route("/devices/unowned", get(devices::unowned::<DR, UR, AS>))
        .route(
            "/devices/{id}",
            get(devices::get::<DR, UR, AS>).delete(devices::delete::<DR, UR, AS>),
        )
        .route(
            "/devices/{id}/channels",
            put(devices::rebind_channels::<DR, UR, AS>),
        )
        // Alerts
        .route("/alerts/mine", get(alerts::mine::<DR, UR, AS>))
        .route("/alerts/device/{id}", get(alerts::by_device::<DR, UR, AS>))
        .route("/alerts/serial/{serial}", get(alerts::by_serial::<DR, UR, AS>))
}

/// Parse a device id taken from the request path.
fn parse_device_id(raw: &str) -> Result<DeviceId, ApiError> {
    DeviceId::from_str(raw)
        .map_err(|_| StopfireError::from(ValidationError::InvalidId(raw.to_string())).into())
}
