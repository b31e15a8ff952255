//! User — read model of a registered account.
//!
//! Accounts are created and authenticated elsewhere; ownership rules only
//! need to know that a user exists.

use serde::{Deserialize, Serialize};

use crate::id::UserId;

/// A registered user, without credentials.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub username: String,
    pub email: String,
}
