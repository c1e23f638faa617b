//! Catalog Module
//!
//! Product administration (create, update, soft delete), shopper listings,
//! reviews and catalog seeding.

mod query;
mod seed;
mod service;

pub use query::{Audience, ProductQuery};
pub use seed::{SeedProduct, load_seed_file};
pub use service::{CatalogService, InventoryReport};
