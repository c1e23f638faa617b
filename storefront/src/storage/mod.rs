//! redb-based storage layer for the storefront
//!
//! # Tables
//!
//! | Table | Key | Value | Purpose |
//! |-------|-----|-------|---------|
//! | `products` | `product_id` | `Product` | Catalog |
//! | `orders` | `order_id` | `Order` | Orders |
//! | `user_orders` | `(user_id, order_id)` | `()` | Orders-by-user index |
//! | `users` | `user_id` | `User` | Accounts |
//! | `user_emails` | `email` | `user_id` | Unique email index |
//! | `verification_tokens` | `token` | `user_id` | Pending email verifications |
//!
//! Values are JSON. Write methods take the caller's `WriteTransaction` so a
//! service can change several records and indexes in one atomic commit.

use redb::{
    Database, ReadableDatabase, ReadableTable, ReadableTableMetadata, TableDefinition,
    WriteTransaction,
};
use shared::error::AppError;
use shared::models::{Order, Product, User};
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;

/// Table for products: key = product_id, value = JSON-serialized Product
const PRODUCTS_TABLE: TableDefinition<i64, &[u8]> = TableDefinition::new("products");

/// Table for orders: key = order_id, value = JSON-serialized Order
const ORDERS_TABLE: TableDefinition<i64, &[u8]> = TableDefinition::new("orders");

/// Index of orders per user: key = (user_id, order_id), value = empty
const USER_ORDERS_TABLE: TableDefinition<(i64, i64), ()> = TableDefinition::new("user_orders");

/// Table for users: key = user_id, value = JSON-serialized User
const USERS_TABLE: TableDefinition<i64, &[u8]> = TableDefinition::new("users");

/// Unique email index: key = lowercase email, value = user_id
const USER_EMAILS_TABLE: TableDefinition<&str, i64> = TableDefinition::new("user_emails");

/// Pending verification tokens: key = token, value = user_id
const VERIFICATION_TOKENS_TABLE: TableDefinition<&str, i64> =
    TableDefinition::new("verification_tokens");

/// Storage errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(#[from] redb::DatabaseError),

    #[error("Transaction error: {0}")]
    Transaction(#[from] redb::TransactionError),

    #[error("Table error: {0}")]
    Table(#[from] redb::TableError),

    #[error("Storage error: {0}")]
    Storage(#[from] redb::StorageError),

    #[error("Commit error: {0}")]
    Commit(#[from] redb::CommitError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type StorageResult<T> = Result<T, StorageError>;

impl From<StorageError> for AppError {
    fn from(err: StorageError) -> Self {
        tracing::error!(error = %err, "Storage operation failed");
        match err {
            StorageError::Serialization(e) => {
                AppError::new(shared::ErrorCode::StorageCorrupted).with_detail("cause", e.to_string())
            }
            other => AppError::database(other.to_string()),
        }
    }
}

/// Storefront storage backed by redb
#[derive(Clone)]
pub struct Storage {
    db: Arc<Database>,
}

impl std::fmt::Debug for Storage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Storage").finish_non_exhaustive()
    }
}

impl Storage {
    /// Open or create the database at the given path
    ///
    /// Parent directories are created when missing. Commits are durable as
    /// soon as `commit()` returns (redb default `Durability::Immediate`).
    pub fn open(path: impl AsRef<Path>) -> StorageResult<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }

        let db = Database::create(path)?;
        Self::init_tables(&db)?;

        tracing::debug!(path = %path.display(), "Storefront database opened");
        Ok(Self { db: Arc::new(db) })
    }

    /// Open an in-memory database (for testing)
    #[cfg(test)]
    pub fn open_in_memory() -> StorageResult<Self> {
        let db = Database::builder().create_with_backend(redb::backends::InMemoryBackend::new())?;
        Self::init_tables(&db)?;
        Ok(Self { db: Arc::new(db) })
    }

    fn init_tables(db: &Database) -> StorageResult<()> {
        let write_txn = db.begin_write()?;
        {
            let _ = write_txn.open_table(PRODUCTS_TABLE)?;
            let _ = write_txn.open_table(ORDERS_TABLE)?;
            let _ = write_txn.open_table(USER_ORDERS_TABLE)?;
            let _ = write_txn.open_table(USERS_TABLE)?;
            let _ = write_txn.open_table(USER_EMAILS_TABLE)?;
            let _ = write_txn.open_table(VERIFICATION_TOKENS_TABLE)?;
        }
        write_txn.commit()?;
        Ok(())
    }

    /// Begin a write transaction
    pub fn begin_write(&self) -> StorageResult<WriteTransaction> {
        Ok(self.db.begin_write()?)
    }

    // ========== Product Operations ==========

    /// Insert or replace a product
    pub fn store_product(&self, txn: &WriteTransaction, product: &Product) -> StorageResult<()> {
        let mut table = txn.open_table(PRODUCTS_TABLE)?;
        let value = serde_json::to_vec(product)?;
        table.insert(product.id, value.as_slice())?;
        Ok(())
    }

    /// Get a product by ID
    pub fn get_product(&self, id: i64) -> StorageResult<Option<Product>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(PRODUCTS_TABLE)?;

        match table.get(id)? {
            Some(value) => Ok(Some(serde_json::from_slice(value.value())?)),
            None => Ok(None),
        }
    }

    /// Get a product by ID (within transaction)
    pub fn get_product_txn(
        &self,
        txn: &WriteTransaction,
        id: i64,
    ) -> StorageResult<Option<Product>> {
        let table = txn.open_table(PRODUCTS_TABLE)?;

        match table.get(id)? {
            Some(value) => Ok(Some(serde_json::from_slice(value.value())?)),
            None => Ok(None),
        }
    }

    /// Get all products, active or not
    pub fn get_all_products(&self) -> StorageResult<Vec<Product>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(PRODUCTS_TABLE)?;

        let mut products = Vec::new();
        for result in table.iter()? {
            let (_key, value) = result?;
            products.push(serde_json::from_slice(value.value())?);
        }
        Ok(products)
    }

    /// Number of stored products
    pub fn product_count(&self) -> StorageResult<u64> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(PRODUCTS_TABLE)?;
        Ok(table.len()?)
    }

    // ========== Order Operations ==========

    /// Insert or replace an order and index it under its user
    pub fn store_order(&self, txn: &WriteTransaction, order: &Order) -> StorageResult<()> {
        let mut table = txn.open_table(ORDERS_TABLE)?;
        let value = serde_json::to_vec(order)?;
        table.insert(order.id, value.as_slice())?;

        let mut index = txn.open_table(USER_ORDERS_TABLE)?;
        index.insert((order.user_id, order.id), ())?;
        Ok(())
    }

    /// Get an order by ID
    pub fn get_order(&self, id: i64) -> StorageResult<Option<Order>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(ORDERS_TABLE)?;

        match table.get(id)? {
            Some(value) => Ok(Some(serde_json::from_slice(value.value())?)),
            None => Ok(None),
        }
    }

    /// Get an order by ID (within transaction)
    pub fn get_order_txn(&self, txn: &WriteTransaction, id: i64) -> StorageResult<Option<Order>> {
        let table = txn.open_table(ORDERS_TABLE)?;

        match table.get(id)? {
            Some(value) => Ok(Some(serde_json::from_slice(value.value())?)),
            None => Ok(None),
        }
    }

    /// Get all orders
    pub fn get_all_orders(&self) -> StorageResult<Vec<Order>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(ORDERS_TABLE)?;

        let mut orders = Vec::new();
        for result in table.iter()? {
            let (_key, value) = result?;
            orders.push(serde_json::from_slice(value.value())?);
        }
        Ok(orders)
    }

    /// Get all orders of one user via the `user_orders` index
    pub fn get_orders_for_user(&self, user_id: i64) -> StorageResult<Vec<Order>> {
        let read_txn = self.db.begin_read()?;
        let index = read_txn.open_table(USER_ORDERS_TABLE)?;
        let table = read_txn.open_table(ORDERS_TABLE)?;

        let mut orders = Vec::new();
        for result in index.range((user_id, i64::MIN)..=(user_id, i64::MAX))? {
            let (key, _value) = result?;
            let (_, order_id) = key.value();
            match table.get(order_id)? {
                Some(value) => orders.push(serde_json::from_slice(value.value())?),
                None => tracing::warn!(user_id, order_id, "Dangling user_orders index entry"),
            }
        }
        Ok(orders)
    }

    /// Remove an order and its index entry
    pub fn remove_order(&self, txn: &WriteTransaction, order: &Order) -> StorageResult<()> {
        let mut table = txn.open_table(ORDERS_TABLE)?;
        table.remove(order.id)?;

        let mut index = txn.open_table(USER_ORDERS_TABLE)?;
        index.remove((order.user_id, order.id))?;
        Ok(())
    }

    // ========== User Operations ==========

    /// Insert or replace a user, keeping the email and token indexes in step
    ///
    /// Uniqueness of the email is the caller's job (see
    /// [`Storage::find_user_id_by_email_txn`]); this only rewrites index rows.
    pub fn store_user(&self, txn: &WriteTransaction, user: &User) -> StorageResult<()> {
        let previous = self.get_user_txn(txn, user.id)?;

        let mut emails = txn.open_table(USER_EMAILS_TABLE)?;
        let mut tokens = txn.open_table(VERIFICATION_TOKENS_TABLE)?;
        if let Some(prev) = &previous {
            if prev.email != user.email {
                emails.remove(prev.email.as_str())?;
            }
            if let Some(token) = &prev.verification_token
                && user.verification_token.as_ref() != Some(token)
            {
                tokens.remove(token.as_str())?;
            }
        }
        emails.insert(user.email.as_str(), user.id)?;
        if let Some(token) = &user.verification_token {
            tokens.insert(token.as_str(), user.id)?;
        }

        let mut table = txn.open_table(USERS_TABLE)?;
        let value = serde_json::to_vec(user)?;
        table.insert(user.id, value.as_slice())?;
        Ok(())
    }

    /// Get a user by ID
    pub fn get_user(&self, id: i64) -> StorageResult<Option<User>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(USERS_TABLE)?;

        match table.get(id)? {
            Some(value) => Ok(Some(serde_json::from_slice(value.value())?)),
            None => Ok(None),
        }
    }

    /// Get a user by ID (within transaction)
    pub fn get_user_txn(&self, txn: &WriteTransaction, id: i64) -> StorageResult<Option<User>> {
        let table = txn.open_table(USERS_TABLE)?;

        match table.get(id)? {
            Some(value) => Ok(Some(serde_json::from_slice(value.value())?)),
            None => Ok(None),
        }
    }

    /// Look up a user by (already normalized) email
    pub fn find_user_by_email(&self, email: &str) -> StorageResult<Option<User>> {
        let read_txn = self.db.begin_read()?;
        let emails = read_txn.open_table(USER_EMAILS_TABLE)?;
        let Some(id) = emails.get(email)?.map(|guard| guard.value()) else {
            return Ok(None);
        };

        let table = read_txn.open_table(USERS_TABLE)?;
        match table.get(id)? {
            Some(value) => Ok(Some(serde_json::from_slice(value.value())?)),
            None => Ok(None),
        }
    }

    /// Email index lookup (within transaction)
    pub fn find_user_id_by_email_txn(
        &self,
        txn: &WriteTransaction,
        email: &str,
    ) -> StorageResult<Option<i64>> {
        let emails = txn.open_table(USER_EMAILS_TABLE)?;
        Ok(emails.get(email)?.map(|guard| guard.value()))
    }

    /// Verification token lookup (within transaction)
    pub fn find_user_id_by_token_txn(
        &self,
        txn: &WriteTransaction,
        token: &str,
    ) -> StorageResult<Option<i64>> {
        let tokens = txn.open_table(VERIFICATION_TOKENS_TABLE)?;
        Ok(tokens.get(token)?.map(|guard| guard.value()))
    }

    /// Get all users
    pub fn get_all_users(&self) -> StorageResult<Vec<User>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(USERS_TABLE)?;

        let mut users = Vec::new();
        for result in table.iter()? {
            let (_key, value) = result?;
            users.push(serde_json::from_slice(value.value())?);
        }
        Ok(users)
    }

    /// Remove a user and its index rows. Orders are kept.
    pub fn remove_user(&self, txn: &WriteTransaction, user: &User) -> StorageResult<()> {
        let mut table = txn.open_table(USERS_TABLE)?;
        table.remove(user.id)?;

        let mut emails = txn.open_table(USER_EMAILS_TABLE)?;
        emails.remove(user.email.as_str())?;

        if let Some(token) = &user.verification_token {
            let mut tokens = txn.open_table(VERIFICATION_TOKENS_TABLE)?;
            tokens.remove(token.as_str())?;
        }
        Ok(())
    }
}
