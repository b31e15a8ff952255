//! # stopfire-app
//!
//! Application layer — use-cases and **port definitions** (traits).
//!
//! ## Responsibilities
//! - Define **port traits** that adapters must implement (driven/outbound ports):
//!   - `DeviceRepository` — device registry, including the two ownership
//!     mutation primitives
//!   - `UserRepository` — user existence lookup
//!   - `AlertSource` — one active-reading query per sensor kind
//! - Define **driving/inbound ports** as use-case structs:
//!   - `OwnershipService` — assign, unassign, list owned devices
//!   - `AlertService` — aggregate the active-alert feed for a scope
//!   - `DeviceService` — provisioning and lookup
//! - Orchestrate domain objects without knowing *how* persistence works
//!
//! ## Dependency rule
//! Depends on `stopfire-domain` only.
//! Never imports adapter crates. Adapters depend on *this* crate, not the reverse.

pub mod ports;
pub mod services;
