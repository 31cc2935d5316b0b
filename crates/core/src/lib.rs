//! Extra Mile Core - Shared types library.
//!
//! This crate provides common types used across all Extra Mile components:
//! - `storefront` - Headless storefront client (catalog, cart, orders)
//! - `cli` - Command-line harness for browsing and checkout
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no HTTP clients, no storage
//! access. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for type-safe IDs, emails, amounts, and
//!   order statuses

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
