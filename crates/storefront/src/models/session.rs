//! Session-related types.
//!
//! Types stored in the session for cart ownership and authentication state.

use serde::{Deserialize, Serialize};

use lucid_core::{UserId, Username};

/// Session-stored user identity.
///
/// Minimal data stored in the session to identify the logged-in user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrentUser {
    /// User's database ID.
    pub id: UserId,
    /// User's login name.
    pub username: Username,
}

/// Session keys.
pub mod keys {
    /// Key for the [`SessionKey`](lucid_core::SessionKey) that owns cart items.
    pub const CART_OWNER: &str = "cart_owner";

    /// Key for storing the current logged-in user.
    pub const CURRENT_USER: &str = "current_user";
}
