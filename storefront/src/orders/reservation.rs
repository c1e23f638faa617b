//! Stock movements for orders, scoped to one write transaction

use crate::inventory::{StockSummary, quantity_slot};
use crate::storage::{Storage, StorageResult};
use redb::WriteTransaction;
use shared::error::{AppError, AppResult, ErrorCode};
use shared::models::{ColorVariant, OrderLine, Product};
use std::collections::HashMap;

/// Products touched by one order, loaded once and written back on flush
///
/// Several lines may hit the same product, so quantities are checked against
/// the already-adjusted copy rather than the stored one.
pub(super) struct StockLedger<'a> {
    storage: &'a Storage,
    txn: &'a WriteTransaction,
    products: HashMap<i64, Product>,
}

impl<'a> StockLedger<'a> {
    pub(super) fn new(storage: &'a Storage, txn: &'a WriteTransaction) -> Self {
        Self {
            storage,
            txn,
            products: HashMap::new(),
        }
    }

    /// Product as seen by this transaction, including pending adjustments
    pub(super) fn product(&mut self, id: i64) -> AppResult<Option<&mut Product>> {
        if !self.products.contains_key(&id) {
            match self.storage.get_product_txn(self.txn, id)? {
                Some(product) => {
                    self.products.insert(id, product);
                }
                None => return Ok(None),
            }
        }
        Ok(self.products.get_mut(&id))
    }

    /// Take `line.quantity` out of the matching variant, or the plain counter
    pub(super) fn reserve(&mut self, line: &OrderLine) -> AppResult<()> {
        let product = self
            .product(line.product_id)?
            .ok_or_else(|| AppError::product_not_found(line.product_id))?;

        let Some(slot) = line_slot(&mut product.variants, &mut product.stock, line) else {
            return Err(AppError::new(ErrorCode::VariantNotFound)
                .with_detail("product_id", line.product_id));
        };

        if *slot < line.quantity {
            return Err(AppError::with_message(
                ErrorCode::ProductOutOfStock,
                format!("Only {} left in stock for {}", *slot, product.title),
            )
            .with_detail("product_id", line.product_id)
            .with_detail("available", *slot)
            .with_detail("requested", line.quantity));
        }
        *slot -= line.quantity;
        refresh_stock(product);
        Ok(())
    }

    /// Put `line.quantity` back. Lines whose product or variant no longer
    /// exists are logged and skipped.
    pub(super) fn release(&mut self, line: &OrderLine) -> AppResult<()> {
        let Some(product) = self.product(line.product_id)? else {
            tracing::warn!(
                product_id = line.product_id,
                "Product gone, reserved stock not released"
            );
            return Ok(());
        };

        match line_slot(&mut product.variants, &mut product.stock, line) {
            Some(slot) => {
                *slot = slot.saturating_add(line.quantity);
                refresh_stock(product);
            }
            None => tracing::warn!(
                product_id = line.product_id,
                color = ?line.color,
                size = ?line.size,
                "Line no longer matches a stock slot, reserved stock not released"
            ),
        }
        Ok(())
    }

    /// Write every touched product back into the transaction
    pub(super) fn flush(self) -> StorageResult<()> {
        let now = shared::util::now_millis();
        for mut product in self.products.into_values() {
            product.updated_at = now;
            self.storage.store_product(self.txn, &product)?;
        }
        Ok(())
    }
}

/// Counter a line draws from: the chosen size on variant products, the
/// product counter otherwise. `None` when the line no longer fits the product,
/// including a plain-product line after the product gained variants.
fn line_slot<'p>(
    variants: &'p mut [ColorVariant],
    stock: &'p mut u32,
    line: &OrderLine,
) -> Option<&'p mut u32> {
    if variants.is_empty() {
        return Some(stock);
    }
    match (line.color.as_deref(), line.size.as_deref()) {
        (Some(color), Some(size)) => quantity_slot(variants, color, size),
        _ => None,
    }
}

fn refresh_stock(product: &mut Product) {
    let summary = if product.has_variants() {
        StockSummary::from_variants(&product.variants)
    } else {
        StockSummary::from_count(product.stock)
    };
    product.stock = summary.stock;
    product.in_stock = summary.in_stock;
}
