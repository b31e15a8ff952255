//! # stopfire-adapter-storage-sqlite-sqlx
//!
//! `SQLite` persistence adapter using [sqlx](https://docs.rs/sqlx).
//!
//! ## Responsibilities
//! - Implement the port traits defined in `stopfire-app::ports`
//! - Manage `SQLite` connection pool lifecycle
//! - Run database migrations (using sqlx embedded migrations)
//! - Map between domain types and database rows
//!
//! ## Dependency rule
//! Depends on `stopfire-app` (for port traits) and `stopfire-domain` (for domain types).
//! The `app` and `domain` crates must never reference this adapter.

pub mod alert_repo;
pub mod device_repo;
pub mod error;
pub mod pool;
pub mod user_repo;

pub use alert_repo::SqliteAlertSource;
pub use device_repo::SqliteDeviceRepository;
pub use error::StorageError;
pub use pool::{Config, Database};
pub use user_repo::SqliteUserRepository;
