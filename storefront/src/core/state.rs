use std::path::Path;

use crate::accounts::AccountService;
use crate::catalog::{CatalogService, load_seed_file};
use crate::core::Config;
use crate::orders::OrderService;
use crate::storage::Storage;
use shared::error::AppResult;

/// Storefront state - one handle per service over a shared store
///
/// Cloning is cheap: every service holds the same `Arc<Database>`.
///
/// | Field | Purpose |
/// |-------|---------|
/// | config | Configuration (immutable) |
/// | storage | redb store |
/// | catalog | Products, listings, reviews, seeding |
/// | orders | Checkout and order administration |
/// | accounts | Registration, login, addresses, user administration |
///
/// ```ignore
/// let store = Storefront::initialize(&Config::from_env())?;
/// let page = store.catalog.list_products(&ProductQuery::public())?;
/// ```
#[derive(Clone, Debug)]
pub struct Storefront {
    pub config: Config,
    pub storage: Storage,
    pub catalog: CatalogService,
    pub orders: OrderService,
    pub accounts: AccountService,
}

impl Storefront {
    /// Open `work_dir/database/storefront.redb` and build the services
    pub fn initialize(config: &Config) -> AppResult<Self> {
        let db_path = config.database_path();
        let storage = Storage::open(&db_path)?;
        tracing::info!(path = %db_path.display(), "Storefront database ready");
        Ok(Self::with_storage(config, storage))
    }

    /// Build the services over an already opened store
    pub fn with_storage(config: &Config, storage: Storage) -> Self {
        Self {
            config: config.clone(),
            catalog: CatalogService::new(storage.clone(), config),
            orders: OrderService::new(storage.clone(), config),
            accounts: AccountService::new(storage.clone()),
            storage,
        }
    }

    /// Load the seed file into an empty catalog. Returns the number of
    /// products inserted; 0 when the catalog already has products.
    pub fn seed_if_empty(&self, seed_file: &Path) -> AppResult<usize> {
        if !self.catalog.is_empty()? {
            tracing::debug!("Catalog not empty, skipping seed");
            return Ok(0);
        }
        let entries = load_seed_file(seed_file)?;
        self.catalog.seed(entries)
    }
}
