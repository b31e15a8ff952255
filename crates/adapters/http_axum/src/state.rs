//! Shared application state for axum handlers.

use std::sync::Arc;

use axum::extract::FromRef;

use stopfire_app::ports::{AlertSource, DeviceRepository, UserRepository};
use stopfire_app::services::alert_service::AlertService;
use stopfire_app::services::device_service::DeviceService;
use stopfire_app::services::ownership_service::OwnershipService;

use crate::auth::TokenVerifier;

/// Application state shared across all axum handlers.
///
/// Generic over the device repository, user repository, and alert source to
/// avoid dynamic dispatch. `Clone` is implemented manually so the underlying
/// types themselves do not need to be `Clone`; only the `Arc` wrappers are
/// cloned.
pub struct AppState<DR, UR, AS> {
    /// Assign, unassign, and list owned devices.
    pub ownership_service: Arc<OwnershipService<DR, UR>>,
    /// Active-alert feed.
    pub alert_service: Arc<AlertService<AS>>,
    /// Provisioning and lookup.
    pub device_service: Arc<DeviceService<DR>>,
    /// Access token verification.
    pub token_verifier: Arc<TokenVerifier>,
}

impl<DR, UR, AS> Clone for AppState<DR, UR, AS> {
    fn clone(&self) -> Self {
        Self {
            ownership_service: Arc::clone(&self.ownership_service),
            alert_service: Arc::clone(&self.alert_service),
            device_service: Arc::clone(&self.device_service),
            token_verifier: Arc::clone(&self.token_verifier),
        }
    }
}

impl<DR, UR, AS> FromRef<AppState<DR, UR, AS>> for Arc<TokenVerifier> {
    fn from_ref(state: &AppState<DR, UR, AS>) -> Self {
        Arc::clone(&state.token_verifier)
    }
}

impl<DR, UR, AS> AppState<DR, UR, AS>
where
    DR: DeviceRepository + Send + Sync + 'static,
    UR: UserRepository + Send + Sync + 'static,
    AS: AlertSource + Send + Sync + 'static,
{
    /// Create a new application state from service instances.
    pub fn new(
        ownership_service: OwnershipService<DR, UR>,
        alert_service: AlertService<AS>,
        device_service: DeviceService<DR>,
        token_verifier: TokenVerifier,
    ) -> Self {
        Self {
            ownership_service: Arc::new(ownership_service),
            alert_service: Arc::new(alert_service),
            device_service: Arc::new(device_service),
            token_verifier: Arc::new(token_verifier),
        }
    }
}
