//! Pricing Module
//!
//! Price derivation from an original price and a free-text discount label,
//! plus the money arithmetic used for order totals.

mod calculator;

pub use calculator::*;
