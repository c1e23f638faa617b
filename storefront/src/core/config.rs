use std::path::PathBuf;

/// Storefront configuration
///
/// # Environment variables
///
/// | Variable | Default | Meaning |
/// |----------|---------|---------|
/// | WORK_DIR | ./storefront_data | Database and log root |
/// | ENVIRONMENT | development | development / staging / production |
/// | LOG_LEVEL | info | Default tracing level (`RUST_LOG` overrides) |
/// | LOG_RETENTION_DAYS | 14 | Age after which app logs are deleted |
/// | PUBLIC_PAGE_SIZE | 10 | Shopper listing page size |
/// | ADMIN_PAGE_SIZE | 20 | Admin listing page size |
/// | RESERVE_STOCK_ON_ORDER | false | Decrement variant stock when an order is placed |
/// | SEED_FILE | (unset) | JSON catalog loaded when the store is empty |
///
/// # Example
///
/// ```ignore
/// WORK_DIR=/data/shop RESERVE_STOCK_ON_ORDER=true cargo run -p storefront
/// ```
#[derive(Debug, Clone)]
pub struct Config {
    /// Working directory holding `database/` and `logs/`
    pub work_dir: String,
    /// development | staging | production
    pub environment: String,
    pub log_level: String,
    pub log_retention_days: i64,
    pub public_page_size: u32,
    pub admin_page_size: u32,
    /// Take ordered quantities out of product stock at checkout
    pub reserve_stock_on_order: bool,
    pub seed_file: Option<String>,
}

impl Config {
    /// Built-in defaults, independent of the process environment
    fn defaults(work_dir: String) -> Self {
        Self {
            work_dir,
            environment: "development".into(),
            log_level: "info".into(),
            log_retention_days: 14,
            public_page_size: 10,
            admin_page_size: 20,
            reserve_stock_on_order: false,
            seed_file: None,
        }
    }

    /// Load configuration from the environment, falling back to defaults
    pub fn from_env() -> Self {
        let mut config =
            Self::defaults(env_var("WORK_DIR").unwrap_or_else(|| "./storefront_data".into()));
        if let Some(environment) = env_var("ENVIRONMENT") {
            config.environment = environment;
        }
        if let Some(level) = env_var("LOG_LEVEL") {
            config.log_level = level;
        }
        if let Some(days) = env_parse::<i64>("LOG_RETENTION_DAYS") {
            config.log_retention_days = days;
        }
        if let Some(size) = env_parse::<u32>("PUBLIC_PAGE_SIZE").filter(|n| *n > 0) {
            config.public_page_size = size;
        }
        if let Some(size) = env_parse::<u32>("ADMIN_PAGE_SIZE").filter(|n| *n > 0) {
            config.admin_page_size = size;
        }
        if let Some(reserve) = env_parse::<bool>("RESERVE_STOCK_ON_ORDER") {
            config.reserve_stock_on_order = reserve;
        }
        config.seed_file = env_var("SEED_FILE");
        config
    }

    /// Defaults rooted at `work_dir`; the environment is not consulted
    ///
    /// Mostly used by tests
    pub fn with_overrides(work_dir: impl Into<String>) -> Self {
        Self::defaults(work_dir.into())
    }

    /// Toggle stock reservation
    pub fn with_stock_reservation(mut self, enabled: bool) -> Self {
        self.reserve_stock_on_order = enabled;
        self
    }

    /// `<work_dir>/database/storefront.redb`
    pub fn database_path(&self) -> PathBuf {
        PathBuf::from(&self.work_dir)
            .join("database")
            .join("storefront.redb")
    }

    /// `<work_dir>/logs`
    pub fn log_dir(&self) -> PathBuf {
        PathBuf::from(&self.work_dir).join("logs")
    }

    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::defaults("./storefront_data".into())
    }
}

/// Non-blank value of an environment variable
fn env_var(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    env_var(key).and_then(|v| v.trim().parse().ok())
}
