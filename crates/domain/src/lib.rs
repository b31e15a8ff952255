//! # stopfire-domain
//!
//! Pure domain model for the stopfire sensor fleet.
//!
//! ## Responsibilities
//! - Foundational types: typed identifiers, error conventions, timestamps
//! - Define **Devices** (ESP32 units exposing four sensor channels) and their
//!   ownership state
//! - Define **Sensor kinds** and **channels** (the closed set of four sensors
//!   every device carries)
//! - Define **Alerts** (read-only records of channels in their active state)
//!   and the scopes under which they are aggregated
//! - Define the **User** read model referenced by ownership
//!
//! ## Dependency rule
//! This crate has **no internal dependencies**.
//! It must never import anything from `app`, adapters, or external IO crates.
//! All IO boundaries are expressed as traits in the `app` crate (ports).

pub mod error;
pub mod id;
pub mod time;

pub mod alert;
pub mod device;
pub mod sensor;
pub mod user;
