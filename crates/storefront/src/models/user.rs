//! User domain types.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use lucid_core::{UserId, Username};

/// A registered storefront user.
///
/// Not `Serialize`: respond with [`PublicUser`].
#[derive(Debug, Clone)]
pub struct User {
    pub id: UserId,
    pub username: Username,
    /// Argon2 PHC string.
    pub password_hash: String,
    /// Display name.
    pub name: String,
    pub reward_balance: Decimal,
    pub created_at: DateTime<Utc>,
}

/// Fields needed to create a user.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: Username,
    pub password_hash: String,
    pub name: String,
}

/// The client-facing view of a [`User`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicUser {
    pub id: UserId,
    pub username: Username,
    pub name: String,
    pub reward_balance: Decimal,
    pub created_at: DateTime<Utc>,
}

impl From<&User> for PublicUser {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
            name: user.name.clone(),
            reward_balance: user.reward_balance,
            created_at: user.created_at,
        }
    }
}
