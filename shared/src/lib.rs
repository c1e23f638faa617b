//! Shared types for the storefront
//!
//! Data model, error taxonomy, pagination envelope and id/time helpers used
//! by the storefront engine and by any transport that embeds it.

pub mod error;
pub mod models;
pub mod types;
pub mod util;

// Re-exports
pub use error::{ApiResponse, AppError, AppResult, ErrorCategory, ErrorCode};
pub use http;
pub use serde::{Deserialize, Serialize};
pub use types::PaginatedResponse;
