//! Business logic services for storefront.
//!
//! # Services
//!
//! - `auth` - Registration and password login
//! - `cart` - Cart lines joined with the catalog, and cart totals

pub mod auth;
pub mod cart;

pub use auth::{AuthError, AuthService};
pub use cart::CartService;
