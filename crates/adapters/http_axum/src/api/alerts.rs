//! JSON handlers for the active-alert feed.

use axum::Json;
use axum::extract::{Path, State};
use axum::response::{IntoResponse, Response};

use stopfire_app::ports::{AlertSource, DeviceRepository, UserRepository};
use stopfire_domain::alert::Alert;

use super::parse_device_id;
use crate::auth::Principal;
use crate::error::ApiError;
use crate::state::AppState;

/// Possible responses from the alert endpoints.
pub enum FeedResponse {
    Ok(Json<Vec<Alert>>),
}

impl IntoResponse for FeedResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Ok(json) => json.into_response(),
        }
    }
}

/// `GET /api/alerts/mine`
pub async fn mine<DR, UR, AS>(
    State(state): State<AppState<DR, UR, AS>>,
    Principal(user_id): Principal,
) -> Result<FeedResponse, ApiError>
where
    DR: DeviceRepository + Send + Sync + 'static,
    UR: UserRepository + Send + Sync + 'static,
    AS: AlertSource + Send + Sync + 'static,
{
    let alerts = state.alert_service.for_user(user_id).await?;
    Ok(FeedResponse::Ok(Json(alerts)))
}

/// `GET /api/alerts/device/{id}`
pub async fn by_device<DR, UR, AS>(
    State(state): State<AppState<DR, UR, AS>>,
    _principal: Principal,
    Path(id): Path<String>,
) -> Result<FeedResponse, ApiError>
where
    DR: DeviceRepository + Send + Sync + 'static,
    UR: UserRepository + Send + Sync + 'static,
    AS: AlertSource + Send + Sync + 'static,
{
    let device_id = parse_device_id(&id)?;
    let alerts = state.alert_service.for_device(device_id).await?;
    Ok(FeedResponse::Ok(Json(alerts)))
}

/// `GET /api/alerts/serial/{serial}`
pub async fn by_serial<DR, UR, AS>(
    State(state): State<AppState<DR, UR, AS>>,
    _principal: Principal,
    Path(serial): Path<String>,
) -> Result<FeedResponse, ApiError>
where
    DR: DeviceRepository + Send + Sync + 'static,
    UR: UserRepository + Send + Sync + 'static,
    AS: AlertSource + Send + Sync + 'static,
{
    let alerts = state.alert_service.for_serial(serial).await?;
    Ok(FeedResponse::Ok(Json(alerts)))
}
