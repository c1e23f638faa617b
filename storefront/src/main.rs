use std::path::Path;

use storefront::{Storefront, cleanup_old_logs, print_banner, setup_environment};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 1. Environment (dotenv, config, logging)
    let config = setup_environment()?;

    print_banner();

    tracing::info!(
        work_dir = %config.work_dir,
        environment = %config.environment,
        "Storefront starting..."
    );

    // 2. Log retention
    match cleanup_old_logs(&config.log_dir(), config.log_retention_days) {
        Ok(0) => {}
        Ok(deleted) => tracing::info!(deleted, "Old log files removed"),
        Err(e) => tracing::warn!(error = %e, "Log cleanup failed"),
    }

    // 3. Open the store
    let store = Storefront::initialize(&config)?;
    tracing::info!(
        reserve_stock = store.orders.reserves_stock(),
        "Order stock reservation"
    );

    // 4. Seed an empty catalog
    if let Some(seed_file) = &config.seed_file {
        let inserted = store.seed_if_empty(Path::new(seed_file))?;
        if inserted > 0 {
            tracing::info!(inserted, file = %seed_file, "Seed catalog loaded");
        }
    }

    // 5. Inventory report
    let report = store.catalog.inventory_report()?;
    tracing::info!(
        total_products = report.total_products,
        active_products = report.active_products,
        total_units = report.total_units,
        "Inventory report"
    );
    for (category, count) in &report.per_category {
        tracing::info!(category = %category, products = count, "Category");
    }
    if !report.out_of_stock.is_empty() {
        tracing::warn!(products = ?report.out_of_stock, "Out of stock");
    }

    Ok(())
}
