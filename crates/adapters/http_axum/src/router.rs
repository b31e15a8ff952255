//! Axum router assembly.

use std::time::Duration;

use axum::Router;
use axum::routing::get;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use stopfire_app::ports::{AlertSource, DeviceRepository, UserRepository};

use crate::state::AppState;

/// Build the top-level axum [`Router`].
///
/// Nests the API routes under `/api`. A [`TimeoutLayer`] drops any request
/// still running after `request_timeout`, which cancels its pending queries.
/// A [`TraceLayer`] logs each HTTP request/response at the `DEBUG` level.
pub fn build<DR, UR, AS>(state: AppState<DR, UR, AS>, request_timeout: Duration) -> Router
where
    DR: DeviceRepository + Send + Sync + 'static,
    UR: UserRepository + Send + Sync + 'static,
    AS: AlertSource + Send + Sync + 'static,
{
    Router::new()
        .route("/health", get(health_check))
        .nest("/api", crate::api::routes())
        .layer(TimeoutLayer::new(request_timeout))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health_check() -> &'static str {
    "OK"
}
