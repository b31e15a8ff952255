//! JSON handlers for device ownership and provisioning.

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Deserialize;

use stopfire_app::ports::{AlertSource, DeviceRepository, UserRepository};
use stopfire_domain::device::Device;
use stopfire_domain::sensor::SensorChannels;

use super::parse_device_id;
use crate::auth::Principal;
use crate::error::ApiError;
use crate::state::AppState;

/// Request body for claiming a device.
#[derive(Deserialize)]
pub struct AssignRequest {
    pub serial_number: String,
}

/// Request body for provisioning a device.
#[derive(Deserialize)]
pub struct CreateDeviceRequest {
    pub serial_number: String,
    pub channels: SensorChannels,
}

/// Responses carrying a list of devices.
pub enum ListResponse {
    Ok(Json<Vec<Device>>),
}

impl IntoResponse for ListResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Ok(json) => json.into_response(),
        }
    }
}

/// Responses carrying a single device.
pub enum DeviceResponse {
    Ok(Json<Device>),
}

impl IntoResponse for DeviceResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Ok(json) => json.into_response(),
        }
    }
}

/// Possible responses from the create endpoint.
pub enum CreateResponse {
    Created(Json<Device>),
}

impl IntoResponse for CreateResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Created(json) => (StatusCode::CREATED, json).into_response(),
        }
    }
}

/// Possible responses from the delete endpoint.
pub enum DeleteResponse {
    NoContent,
}

impl IntoResponse for DeleteResponse {
    fn into_response(self) -> Response {
        match self {
            Self::NoContent => StatusCode::NO_CONTENT.into_response(),
        }
    }
}

/// `POST /api/devices/assign`
pub async fn assign<DR, UR, AS>(
    State(state): State<AppState<DR, UR, AS>>,
    Principal(user_id): Principal,
    Json(req): Json<AssignRequest>,
) -> Result<DeviceResponse, ApiError>
where
    DR: DeviceRepository + Send + Sync + 'static,
    UR: UserRepository + Send + Sync + 'static,
    AS: AlertSource + Send + Sync + 'static,
{
    let device = state
        .ownership_service
        .assign_by_serial(&req.serial_number, user_id)
        .await?;
    Ok(DeviceResponse::Ok(Json(device)))
}

/// `DELETE /api/devices/{id}/unassign`
pub async fn unassign<DR, UR, AS>(
    State(state): State<AppState<DR, UR, AS>>,
    _principal: Principal,
    Path(id): Path<String>,
) -> Result<DeviceResponse, ApiError>
where
    DR: DeviceRepository + Send + Sync + 'static,
    UR: UserRepository + Send + Sync + 'static,
    AS: AlertSource + Send + Sync + 'static,
{
    let device_id = parse_device_id(&id)?;
    let device = state.ownership_service.unassign(device_id).await?;
    Ok(DeviceResponse::Ok(Json(device)))
}

/// `GET /api/devices/mine`
pub async fn mine<DR, UR, AS>(
    State(state): State<AppState<DR, UR, AS>>,
    Principal(user_id): Principal,
) -> Result<ListResponse, ApiError>
where
    DR: DeviceRepository + Send + Sync + 'static,
    UR: UserRepository + Send + Sync + 'static,
    AS: AlertSource + Send + Sync + 'static,
{
    let devices = state.ownership_service.list_owned(user_id).await?;
    Ok(ListResponse::Ok(Json(devices)))
}

/// `POST /api/devices`
pub async fn create<DR, UR, AS>(
    State(state): State<AppState<DR, UR, AS>>,
    _principal: Principal,
    Json(req): Json<CreateDeviceRequest>,
) -> Result<CreateResponse, ApiError>
where
    DR: DeviceRepository + Send + Sync + 'static,
    UR: UserRepository + Send + Sync + 'static,
    AS: AlertSource + Send + Sync + 'static,
{
    let device = Device::builder()
        .serial_number(req.serial_number)
        .channels(req.channels)
        .build()?;
    let created = state.device_service.register(device).await?;
    Ok(CreateResponse::Created(Json(created)))
}

/// `GET /api/devices/unowned`
pub async fn unowned<DR, UR, AS>(
    State(state): State<AppState<DR, UR, AS>>,
    _principal: Principal,
) -> Result<ListResponse, ApiError>
where
    DR: DeviceRepository + Send + Sync + 'static,
    UR: UserRepository + Send + Sync + 'static,
    AS: AlertSource + Send + Sync + 'static,
{
    let devices = state.device_service.list_unowned().await?;
    Ok(ListResponse::Ok(Json(devices)))
}

/// `GET /api/devices/{id}`
pub async fn get<DR, UR, AS>(
    State(state): State<AppState<DR, UR, AS>>,
    _principal: Principal,
    Path(id): Path<String>,
) -> Result<DeviceResponse, ApiError>
where
    DR: DeviceRepository + Send + Sync + 'static,
    UR: UserRepository + Send + Sync + 'static,
    AS: AlertSource + Send + Sync + 'static,
{
    let device_id = parse_device_id(&id)?;
    let device = state.device_service.get(device_id).await?;
    Ok(DeviceResponse::Ok(Json(device)))
}

/// `DELETE /api/devices/{id}`
pub async fn delete<DR, UR, AS>(
    State(state): State<AppState<DR, UR, AS>>,
    _principal: Principal,
    Path(id): Path<String>,
) -> Result<DeleteResponse, ApiError>
where
    DR: DeviceRepository + Send + Sync + 'static,
    UR: UserRepository + Send + Sync + 'static,
    AS: AlertSource + Send + Sync + 'static,
{
    let device_id = parse_device_id(&id)?;
    state.device_service.remove(device_id).await?;
    Ok(DeleteResponse::NoContent)
}

/// `PUT /api/devices/{id}/channels`
pub async fn rebind_channels<DR, UR, AS>(
    State(state): State<AppState<DR, UR, AS>>,
    _principal: Principal,
    Path(id): Path<String>,
    Json(channels): Json<SensorChannels>,
) -> Result<DeviceResponse, ApiError>
where
    DR: DeviceRepository + Send + Sync + 'static,
    UR: UserRepository + Send + Sync + 'static,
    AS: AlertSource + Send + Sync + 'static,
{
    let device_id = parse_device_id(&id)?;
    let device = state
        .device_service
        .rebind_channels(device_id, channels)
        .await?;
    Ok(DeviceResponse::Ok(Json(device)))
}
