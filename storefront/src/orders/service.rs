//! Order Service - checkout, history and the admin order board

use super::reservation::StockLedger;
use crate::audit_log;
use crate::core::Config;
use crate::inventory::{Selection, SelectionError};
use crate::pricing::order_total;
use crate::storage::{Storage, StorageError};
use crate::utils::validation::{MAX_SHORT_TEXT_LEN, validate_payload, validate_required_text};
use shared::error::{AppError, AppResult, ErrorCode};
use shared::models::{Order, OrderCreate, OrderLine, OrderStatus};
use shared::util::{now_millis, snowflake_id};

/// Client totals within this distance of the recomputed total are not logged
const TOTAL_TOLERANCE: f64 = 0.005;

#[derive(Debug, Clone)]
pub struct OrderService {
    storage: Storage,
    reserve_stock: bool,
}

impl OrderService {
    pub fn new(storage: Storage, config: &Config) -> Self {
        Self {
            storage,
            reserve_stock: config.reserve_stock_on_order,
        }
    }

    pub fn reserves_stock(&self) -> bool {
        self.reserve_stock
    }

    // ========== Shopper operations ==========

    /// Place an order for `payload.user_id` on behalf of `requester_id`
    pub fn place_order(&self, requester_id: i64, payload: OrderCreate) -> AppResult<Order> {
        // 1. Ownership and payload shape
        if requester_id != payload.user_id {
            tracing::warn!(
                requester_id,
                user_id = payload.user_id,
                "Order placed for another user"
            );
            return Err(AppError::not_owner("Unauthorized: Token mismatch for userId"));
        }
        if payload.products.is_empty() {
            return Err(AppError::new(ErrorCode::OrderEmpty));
        }
        validate_required_text(&payload.payment_method, "payment_method", MAX_SHORT_TEXT_LEN)?;
        validate_payload(&payload.shipping_address)?;
        if payload.products.iter().any(|line| line.quantity == 0) {
            return Err(AppError::with_message(
                ErrorCode::ValueOutOfRange,
                "Quantity must be at least 1",
            ));
        }

        let txn = self.storage.begin_write()?;

        // 2. Buyer must exist
        if self.storage.get_user_txn(&txn, payload.user_id)?.is_none() {
            return Err(AppError::user_not_found(payload.user_id));
        }

        // 3. Snapshot every line from the current catalog
        let mut ledger = StockLedger::new(&self.storage, &txn);
        let mut lines = Vec::with_capacity(payload.products.len());
        for cart_line in &payload.products {
            let product = ledger
                .product(cart_line.product_id)?
                .ok_or_else(|| AppError::product_not_found(cart_line.product_id))?;
            if !product.is_active {
                return Err(AppError::with_message(
                    ErrorCode::ProductNotFound,
                    "Product is no longer available",
                )
                .with_detail("product_id", product.id));
            }

            let selection = Selection::new(cart_line.color.as_deref(), cart_line.size.as_deref());
            let (color, size) = if product.has_variants() {
                let color = selection.color().ok_or(SelectionError::ColorRequired)?;
                let size = selection.size().ok_or(SelectionError::SizeRequired)?;
                let exists = product
                    .variants
                    .iter()
                    .any(|v| v.color == color && v.sizes.iter().any(|s| s.size == size));
                if !exists {
                    return Err(AppError::new(ErrorCode::VariantNotFound)
                        .with_detail("product_id", product.id)
                        .with_detail("color", color)
                        .with_detail("size", size));
                }
                (Some(color.to_string()), Some(size.to_string()))
            } else {
                (None, None)
            };

            lines.push(OrderLine {
                product_id: product.id,
                name: product.title.clone(),
                quantity: cart_line.quantity,
                price: product.price,
                image: product.image.clone(),
                color,
                size,
            });
        }

        // 4. Optional stock reservation
        if self.reserve_stock {
            for line in &lines {
                ledger.reserve(line)?;
            }
            ledger.flush()?;
        }

        // 5. Server-side total
        let total_price = order_total(lines.iter().map(|l| (l.price, l.quantity)));
        if (total_price - payload.total_price).abs() > TOTAL_TOLERANCE {
            tracing::warn!(
                user_id = payload.user_id,
                client_total = payload.total_price,
                total_price,
                "Client order total differs from recomputed total"
            );
        }

        let now = now_millis();
        let order = Order {
            id: snowflake_id(),
            user_id: payload.user_id,
            products: lines,
            total_price,
            shipping_address: payload.shipping_address,
            payment_method: payload.payment_method.trim().to_string(),
            status: OrderStatus::Pending,
            stock_reserved: self.reserve_stock,
            created_at: now,
            updated_at: now,
        };
        self.storage.store_order(&txn, &order)?;
        txn.commit().map_err(StorageError::from)?;

        tracing::info!(
            order_id = order.id,
            user_id = order.user_id,
            lines = order.products.len(),
            total_price = order.total_price,
            "Order placed"
        );
        Ok(order)
    }

    /// Order history of one user, newest first
    pub fn orders_for_user(&self, requester_id: i64, user_id: i64) -> AppResult<Vec<Order>> {
        if requester_id != user_id {
            return Err(AppError::not_owner("Unauthorized: Token mismatch for userId"));
        }

        let mut orders = self.storage.get_orders_for_user(user_id)?;
        if orders.is_empty() {
            return Err(AppError::new(ErrorCode::NoOrdersFound));
        }
        sort_newest_first(&mut orders);
        Ok(orders)
    }

    /// Cancel an order the requester owns, while it is still Pending or Processing
    pub fn cancel_order(&self, order_id: i64, requester_id: i64) -> AppResult<Order> {
        let txn = self.storage.begin_write()?;
        let mut order = self
            .storage
            .get_order_txn(&txn, order_id)?
            .ok_or_else(|| AppError::order_not_found(order_id))?;

        if order.user_id != requester_id {
            tracing::warn!(order_id, requester_id, "Cancel attempt on another user's order");
            return Err(AppError::not_owner("Unauthorized to cancel this order."));
        }
        if !order.status.is_cancellable() {
            return Err(AppError::with_message(
                ErrorCode::OrderNotCancellable,
                format!(
                    "Order cannot be cancelled. Current status: {}.",
                    order.status
                ),
            ));
        }

        self.release_stock(&txn, &mut order)?;
        order.status = OrderStatus::Cancelled;
        order.updated_at = now_millis();
        self.storage.store_order(&txn, &order)?;
        txn.commit().map_err(StorageError::from)?;

        tracing::info!(order_id, user_id = order.user_id, "Order cancelled");
        Ok(order)
    }

    // ========== Admin operations ==========

    /// Every order, newest first
    pub fn all_orders(&self) -> AppResult<Vec<Order>> {
        let mut orders = self.storage.get_all_orders()?;
        sort_newest_first(&mut orders);
        Ok(orders)
    }

    pub fn get_order(&self, order_id: i64) -> AppResult<Order> {
        self.storage
            .get_order(order_id)?
            .ok_or_else(|| AppError::order_not_found(order_id))
    }

    /// Set the status from its label. Moving to Cancelled releases reserved
    /// stock; moving a cancelled order back takes it again and fails with
    /// `ProductOutOfStock` when the units have been sold since.
    pub fn update_status(&self, order_id: i64, status: &str) -> AppResult<Order> {
        let status: OrderStatus = status.trim().parse().map_err(|_| {
            AppError::new(ErrorCode::OrderInvalidStatus).with_detail("status", status)
        })?;

        let txn = self.storage.begin_write()?;
        let mut order = self
            .storage
            .get_order_txn(&txn, order_id)?
            .ok_or_else(|| AppError::order_not_found(order_id))?;

        let previous = order.status;
        if status == OrderStatus::Cancelled {
            self.release_stock(&txn, &mut order)?;
        } else if previous == OrderStatus::Cancelled && self.reserve_stock {
            self.retake_stock(&txn, &mut order)?;
        }
        order.status = status;
        order.updated_at = now_millis();
        self.storage.store_order(&txn, &order)?;
        txn.commit().map_err(StorageError::from)?;

        tracing::info!(order_id, from = %previous, to = %status, "Order status updated");
        audit_log!(
            "admin",
            "update_order_status",
            format!("order:{order_id}"),
            format!("{previous} -> {status}")
        );
        Ok(order)
    }

    /// Hard delete. Stock still held by the order is released first.
    pub fn delete_order(&self, order_id: i64) -> AppResult<()> {
        let txn = self.storage.begin_write()?;
        let mut order = self
            .storage
            .get_order_txn(&txn, order_id)?
            .ok_or_else(|| AppError::order_not_found(order_id))?;

        self.release_stock(&txn, &mut order)?;
        self.storage.remove_order(&txn, &order)?;
        txn.commit().map_err(StorageError::from)?;

        tracing::info!(order_id, "Order deleted");
        audit_log!("admin", "delete_order", format!("order:{order_id}"));
        Ok(())
    }

    /// Take the order's quantities out of product stock again
    fn retake_stock(&self, txn: &redb::WriteTransaction, order: &mut Order) -> AppResult<()> {
        if order.stock_reserved {
            return Ok(());
        }

        let mut ledger = StockLedger::new(&self.storage, txn);
        for line in &order.products {
            ledger.reserve(line)?;
        }
        ledger.flush()?;
        order.stock_reserved = true;

        tracing::debug!(order_id = order.id, "Stock reserved again");
        Ok(())
    }

    /// Return reserved quantities to product stock, at most once per order
    fn release_stock(&self, txn: &redb::WriteTransaction, order: &mut Order) -> AppResult<()> {
        if !order.stock_reserved {
            return Ok(());
        }

        let mut ledger = StockLedger::new(&self.storage, txn);
        for line in &order.products {
            ledger.release(line)?;
        }
        ledger.flush()?;
        order.stock_reserved = false;

        tracing::debug!(order_id = order.id, "Reserved stock released");
        Ok(())
    }
}

fn sort_newest_first(orders: &mut [Order]) {
    orders.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
}
