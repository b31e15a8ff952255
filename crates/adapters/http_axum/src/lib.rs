//! # stopfire-adapter-http-axum
//!
//! HTTP adapter built on [axum](https://docs.rs/axum).
//!
//! ## Responsibilities
//! - Serve a **JSON API** under `/api` for device ownership, provisioning,
//!   and the active-alert feed
//! - Authenticate every API request from an `Authorization: Bearer <jwt>`
//!   header (see [`auth::Principal`])
//! - Map HTTP requests into application service calls (driving adapter)
//! - Map application results and errors into HTTP responses
//!
//! ## Dependency rule
//! Depends on `stopfire-app` (for port traits and services) and `stopfire-domain`
//! (for domain types used in request/response mapping). Never leaks axum types
//! into the domain.

pub mod api;
pub mod auth;
pub mod error;
pub mod router;
pub mod state;
