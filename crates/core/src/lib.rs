//! Lucid Core - Shared types library.
//!
//! This crate provides common types used across all Lucid components:
//! - `storefront` - JSON API serving the catalog, cart, auth and waitlist
//! - `cli` - Command-line tools for migrations and catalog seeding
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no database access,
//! no HTTP handling. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for type-safe IDs, prices, emails, usernames
//!   and session keys

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
