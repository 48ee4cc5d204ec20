//! Domain models for the storefront.
//!
//! These types are what the stores hand back and what handlers serialize.
//! Row types for `PostgreSQL` live next to the queries in `db::postgres`.

pub mod cart;
pub mod product;
pub mod session;
pub mod user;
pub mod waitlist;

pub use cart::{CartItem, CartLine, CartSummary};
pub use product::Product;
pub use session::{CurrentUser, keys as session_keys};
pub use user::{NewUser, PublicUser, User};
pub use waitlist::WaitlistEntry;
