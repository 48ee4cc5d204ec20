//! Core types for Lucid.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod email;
pub mod id;
pub mod price;
pub mod session;
pub mod username;

pub use email::{Email, EmailError};
pub use id::*;
pub use price::Price;
pub use session::SessionKey;
pub use username::{Username, UsernameError};
