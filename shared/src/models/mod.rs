//! Data models
//!
//! Shared between the storefront engine and its clients.
//! All IDs are `i64` snowflakes (see [`crate::util::snowflake_id`]),
//! timestamps are Unix milliseconds.

pub mod order;
pub mod product;
pub mod user;

// Re-exports
pub use order::*;
pub use product::*;
pub use user::*;
