//! Common error types used across the workspace.
//!
//! Each layer defines its own typed errors and converts into
//! [`StopfireError`] via `#[from]`. Adapters wrap their IO failures into
//! [`StopfireError::Storage`].

use crate::sensor::SensorKind;

/// Top-level error returned by services and ports.
#[derive(Debug, thiserror::Error)]
pub enum StopfireError {
    /// Input rejected by a domain invariant.
    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),

    /// A referenced device or user does not exist.
    #[error(transparent)]
    NotFound(#[from] NotFoundError),

    /// The operation conflicts with the current ownership or uniqueness state.
    #[error(transparent)]
    Conflict(#[from] ConflictError),

    /// The persistence layer failed.
    #[error("storage error")]
    Storage(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// Domain invariant violations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("serial number must not be empty")]
    EmptySerial,

    #[error("channel {0} is required")]
    MissingChannel(SensorKind),

    #[error("invalid identifier: {0}")]
    InvalidId(String),
}

/// A lookup found nothing.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{entity} {id} not found")]
pub struct NotFoundError {
    /// Kind of record that was looked up (`"Device"`, `"User"`).
    pub entity: &'static str,
    /// The key used for the lookup, rendered as text.
    pub id: String,
}

/// Ownership and uniqueness conflicts.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConflictError {
    #[error("device {device_id} is already assigned to another user")]
    AlreadyAssigned { device_id: i64 },

    #[error("device {device_id} is not assigned to any user")]
    NotAssigned { device_id: i64 },

    #[error("a device with serial number {0} already exists")]
    DuplicateSerial(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_render_not_found_with_entity_and_id() {
        let err = NotFoundError {
            entity: "Device",
            id: "ESP-001".to_string(),
        };
        assert_eq!(err.to_string(), "Device ESP-001 not found");
    }

    #[test]
    fn should_convert_conflict_into_top_level_error() {
        let err: StopfireError = ConflictError::NotAssigned { device_id: 3 }.into();
        assert!(matches!(
            err,
            StopfireError::Conflict(ConflictError::NotAssigned { device_id: 3 })
        ));
    }

    #[test]
    fn should_name_missing_channel_kind() {
        let err = ValidationError::MissingChannel(SensorKind::Mq135);
        assert_eq!(err.to_string(), "channel MQ_135 is required");
    }
}
