//! Storefront - product catalog, inventory and order engine
//!
//! # Modules
//!
//! - **pricing** (`pricing`): offer-derived prices and order totals (rust_decimal)
//! - **inventory** (`inventory`): variant stock aggregation and selection checks
//! - **catalog** (`catalog`): product administration, listings, reviews, seeding
//! - **orders** (`orders`): checkout, cancellation, admin status updates
//! - **accounts** (`accounts`): registration, email verification, addresses
//! - **storage** (`storage`): embedded redb store
//!
//! ```text
//! storefront/src/
//! ├── core/          # config, state
//! ├── storage/       # redb tables
//! ├── pricing/       # price derivation
//! ├── inventory/     # stock and selection
//! ├── catalog/       # product service
//! ├── orders/        # order service
//! ├── accounts/      # account service
//! └── utils/         # logger, validation
//! ```

pub mod accounts;
pub mod catalog;
pub mod core;
pub mod inventory;
pub mod orders;
pub mod pricing;
pub mod storage;
pub mod utils;

// Re-export public types
pub use accounts::{AccountService, Registration};
pub use catalog::{Audience, CatalogService, InventoryReport, ProductQuery, SeedProduct};
pub use crate::core::{Config, Storefront};
pub use orders::OrderService;
pub use storage::{Storage, StorageError};
pub use utils::{ApiResponse, AppError, AppResult, ErrorCategory, ErrorCode};

// Re-export logger functions
pub use utils::logger::{cleanup_old_logs, init_logger_with_file};

/// Load `.env`, read the logging settings and start the logger
///
/// Logs go to the console, and to `<work_dir>/logs` when the directory can be
/// created.
pub fn setup_environment() -> anyhow::Result<Config> {
    dotenv::dotenv().ok();

    let config = Config::from_env();
    let log_dir = config.log_dir();
    let file_logging = std::fs::create_dir_all(&log_dir).is_ok();

    init_logger_with_file(
        &config.log_level,
        config.is_production(),
        file_logging.then_some(log_dir.as_path()),
    )?;
    Ok(config)
}

pub fn print_banner() {
    println!(
        r#"
   _____ __                  ____                  __
  / ___// /_____  ________  / __/________  ____  / /_
  \__ \/ __/ __ \/ ___/ _ \/ /_/ ___/ __ \/ __ \/ __/
 ___/ / /_/ /_/ / /  /  __/ __/ /  / /_/ / / / / /_
/____/\__/\____/_/   \___/_/ /_/   \____/_/ /_/\__/
    "#
    );
}
