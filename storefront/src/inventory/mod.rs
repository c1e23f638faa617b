//! Inventory Module
//!
//! Stock aggregation across color/size variants and per-variant lookup for a
//! shopper's color/size selection.

mod selection;
mod stock;

pub use selection::*;
pub use stock::*;
