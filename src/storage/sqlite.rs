//! SQLite storage backend using sqlx.
//!
//! Provides `SqliteStore`, an [`EntityStore`] backed by a `sqlx::SqlitePool`.
//!
//! # Feature flag
//!
//! This module is gated behind the `sqlite` feature flag (enabled by default).
//!
//! # Schema
//!
//! The schema lives in versioned migrations under `migrations/`, embedded at
//! compile time. Call [`SqliteStore::migrate`] once before serving requests.
//!
//! # Consistency
//!
//! - `customers.email` and `orders.order_number` carry `UNIQUE` constraints;
//!   violations are classified as `Conflict` instead of being pre-checked,
//!   so two racing inserts cannot both succeed.
//! - `orders.owner_id` references `customers(id)` with `ON DELETE CASCADE`
//!   and foreign keys are switched on for every connection.
//! - Every operation runs in its own transaction. Errors return before
//!   `commit`, and dropping an uncommitted `sqlx::Transaction` rolls it back.
//! - Write transactions open with their write statement. A deferred
//!   transaction that reads first cannot upgrade to the write lock while
//!   another connection holds it, and fails with `SQLITE_BUSY` instead of
//!   waiting on the busy timeout.

use crate::core::error::{EntityError, ShopError, ShopResult, StorageError};
use crate::core::model::{
    CUSTOMER, Customer, CustomerPatch, NewCustomer, NewOrder, ORDER, Order, OrderWithOwner,
};
use crate::core::service::EntityStore;
use async_trait::async_trait;
use sqlx::migrate::Migrator;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use sqlx::{Sqlite, SqliteConnection, Transaction};
use std::str::FromStr;
use std::time::Duration;

const BACKEND: &str = "SQLite";

/// How long a writer waits for the database lock held by another connection
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

const CUSTOMER_COLUMNS: &str = "id, name, email, customer_since";
const ORDER_COLUMNS: &str = "id, order_number, total_cents, owner_id";

// ---------------------------------------------------------------------------
// Error classification
// ---------------------------------------------------------------------------

fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db) if db.is_unique_violation())
}

fn is_foreign_key_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db) if db.is_foreign_key_violation())
}

fn connection_error(err: impl std::fmt::Display) -> ShopError {
    StorageError::ConnectionError {
        backend: BACKEND.to_string(),
        message: err.to_string(),
    }
    .into()
}

fn transaction_error(err: sqlx::Error) -> ShopError {
    StorageError::TransactionError {
        message: err.to_string(),
    }
    .into()
}

/// Map an error raised while writing a customer row
fn customer_write_error(err: sqlx::Error, email: &str) -> ShopError {
    if is_unique_violation(&err) {
        tracing::warn!(email, "customer email already taken");
        EntityError::conflict(CUSTOMER, "email", email).into()
    } else {
        err.into()
    }
}

// ---------------------------------------------------------------------------
// Row helpers
// ---------------------------------------------------------------------------

/// Flat row of `orders JOIN customers`
#[derive(sqlx::FromRow)]
struct OrderOwnerRow {
    id: i64,
    order_number: String,
    total_cents: i64,
    owner_id: i64,
    owner_name: String,
    owner_email: String,
    owner_customer_since: i32,
}

impl From<OrderOwnerRow> for OrderWithOwner {
    fn from(row: OrderOwnerRow) -> Self {
        OrderWithOwner {
            order: Order {
                id: row.id,
                order_number: row.order_number,
                total_cents: row.total_cents,
                owner_id: row.owner_id,
            },
            owner: Customer {
                id: row.owner_id,
                name: row.owner_name,
                email: row.owner_email,
                customer_since: row.owner_customer_since,
            },
        }
    }
}

async fn fetch_customer(conn: &mut SqliteConnection, id: i64) -> ShopResult<Option<Customer>> {
    let customer = sqlx::query_as::<_, Customer>(&format!(
        "SELECT {CUSTOMER_COLUMNS} FROM customers WHERE id = ?"
    ))
    .bind(id)
    .fetch_optional(conn)
    .await?;
    Ok(customer)
}

async fn customer_exists(conn: &mut SqliteConnection, id: i64) -> ShopResult<bool> {
    let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM customers WHERE id = ?")
        .bind(id)
        .fetch_one(conn)
        .await?;
    Ok(count > 0)
}

/// Overwrite every mutable column of customer `id`
async fn update_customer(
    conn: &mut SqliteConnection,
    id: i64,
    name: &str,
    email: &str,
    customer_since: i32,
) -> ShopResult<Option<Customer>> {
    sqlx::query_as::<_, Customer>(&format!(
        "UPDATE customers SET name = ?, email = ?, customer_since = ? WHERE id = ? \
         RETURNING {CUSTOMER_COLUMNS}"
    ))
    .bind(name)
    .bind(email)
    .bind(customer_since)
    .bind(id)
    .fetch_optional(conn)
    .await
    .map_err(|e| customer_write_error(e, email))
}

// ---------------------------------------------------------------------------
// SqliteStore
// ---------------------------------------------------------------------------

/// Entity store backed by SQLite.
///
/// # Example
///
/// ```rust,ignore
/// use orderdesk::storage::SqliteStore;
///
/// let store = SqliteStore::connect("sqlite://orderdesk.db", 5).await?;
/// store.migrate().await?;
/// let customer = store.create_customer(NewCustomer::new("Jane", "jane@mail.com", 2015)).await?;
/// ```
#[derive(Clone, Debug)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// Wrap an existing pool. Its connections must have foreign keys enabled.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Open (creating if missing) the database at `url`
    ///
    /// In-memory databases exist per connection, so they get a single,
    /// never recycled connection.
    pub async fn connect(url: &str, max_connections: u32) -> ShopResult<Self> {
        let options = SqliteConnectOptions::from_str(url)
            .map_err(connection_error)?
            .create_if_missing(true)
            .foreign_keys(true)
            .busy_timeout(BUSY_TIMEOUT);

        let in_memory = url.contains(":memory:") || url.contains("mode=memory");
        let pool_options = if in_memory {
            SqlitePoolOptions::new()
                .max_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
        } else {
            SqlitePoolOptions::new().max_connections(max_connections.max(1))
        };

        let pool = pool_options
            .connect_with(options)
            .await
            .map_err(connection_error)?;

        tracing::debug!(url, in_memory, "connected to SQLite");
        Ok(Self::new(pool))
    }

    /// Apply pending schema migrations
    pub async fn migrate(&self) -> ShopResult<()> {
        MIGRATOR.run(&self.pool).await?;
        tracing::info!(
            migrations = MIGRATOR.iter().count(),
            "database schema up to date"
        );
        Ok(())
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    async fn begin(&self) -> ShopResult<Transaction<'_, Sqlite>> {
        self.pool.begin().await.map_err(transaction_error)
    }
}

async fn commit(tx: Transaction<'_, Sqlite>) -> ShopResult<()> {
    tx.commit().await.map_err(transaction_error)
}

#[async_trait]
impl EntityStore for SqliteStore {
    async fn create_customer(&self, data: NewCustomer) -> ShopResult<Customer> {
        let mut tx = self.begin().await?;

        let customer = sqlx::query_as::<_, Customer>(&format!(
            "INSERT INTO customers (name, email, customer_since) VALUES (?, ?, ?) \
             RETURNING {CUSTOMER_COLUMNS}"
        ))
        .bind(&data.name)
        .bind(&data.email)
        .bind(data.customer_since)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| customer_write_error(e, &data.email))?;

        commit(tx).await?;
        tracing::debug!(id = customer.id, "customer created");
        Ok(customer)
    }

    async fn get_customer(&self, id: i64) -> ShopResult<Customer> {
        let mut conn = self.pool.acquire().await.map_err(connection_error)?;
        fetch_customer(&mut conn, id)
            .await?
            .ok_or_else(|| EntityError::not_found(CUSTOMER, id).into())
    }

    async fn list_customers(&self) -> ShopResult<Vec<Customer>> {
        let customers = sqlx::query_as::<_, Customer>(&format!(
            "SELECT {CUSTOMER_COLUMNS} FROM customers ORDER BY id"
        ))
        .fetch_all(&self.pool)
        .await?;
        Ok(customers)
    }

    async fn replace_customer(&self, id: i64, data: NewCustomer) -> ShopResult<Customer> {
        let mut tx = self.begin().await?;

        let customer = update_customer(&mut tx, id, &data.name, &data.email, data.customer_since)
            .await?
            .ok_or_else(|| EntityError::not_found(CUSTOMER, id))?;

        commit(tx).await?;
        tracing::debug!(id, "customer replaced");
        Ok(customer)
    }

    async fn patch_customer(&self, id: i64, patch: CustomerPatch) -> ShopResult<Customer> {
        let mut tx = self.begin().await?;

        // NULL binds keep the stored column
        let email = patch.email.as_value().map(String::as_str);
        let customer = sqlx::query_as::<_, Customer>(&format!(
            "UPDATE customers SET name = COALESCE(?, name), email = COALESCE(?, email), \
             customer_since = COALESCE(?, customer_since) WHERE id = ? \
             RETURNING {CUSTOMER_COLUMNS}"
        ))
        .bind(patch.name.as_value().map(String::as_str))
        .bind(email)
        .bind(patch.customer_since.as_value().copied())
        .bind(id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| customer_write_error(e, email.unwrap_or_default()))?
        .ok_or_else(|| EntityError::not_found(CUSTOMER, id))?;

        commit(tx).await?;
        tracing::debug!(id, "customer patched");
        Ok(customer)
    }

    async fn delete_customer(&self, id: i64) -> ShopResult<()> {
        let mut tx = self.begin().await?;

        // Explicit so the cascade holds even on a pool opened without
        // foreign key enforcement.
        let cascaded = sqlx::query("DELETE FROM orders WHERE owner_id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        let deleted = sqlx::query("DELETE FROM customers WHERE id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?
            .rows_affected();
        if deleted == 0 {
            return Err(EntityError::not_found(CUSTOMER, id).into());
        }

        commit(tx).await?;
        tracing::debug!(id, cascaded, "customer deleted");
        Ok(())
    }

    async fn list_customer_orders(&self, customer_id: i64) -> ShopResult<Vec<Order>> {
        let mut tx = self.begin().await?;

        if !customer_exists(&mut tx, customer_id).await? {
            return Err(EntityError::not_found(CUSTOMER, customer_id).into());
        }
        let orders = sqlx::query_as::<_, Order>(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders WHERE owner_id = ? ORDER BY id"
        ))
        .bind(customer_id)
        .fetch_all(&mut *tx)
        .await?;

        commit(tx).await?;
        Ok(orders)
    }

    async fn create_order(&self, data: NewOrder) -> ShopResult<Order> {
        let mut tx = self.begin().await?;

        let order = sqlx::query_as::<_, Order>(&format!(
            "INSERT INTO orders (order_number, total_cents, owner_id) VALUES (?, ?, ?) \
             RETURNING {ORDER_COLUMNS}"
        ))
        .bind(&data.order_number)
        .bind(data.total_cents)
        .bind(data.owner_id)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| -> ShopError {
            if is_unique_violation(&e) {
                tracing::warn!(order_number = %data.order_number, "order number already taken");
                EntityError::conflict(ORDER, "order_number", &data.order_number).into()
            } else if is_foreign_key_violation(&e) {
                tracing::warn!(owner_id = data.owner_id, "order owner does not exist");
                EntityError::not_found(CUSTOMER, data.owner_id).into()
            } else {
                ShopError::from(e)
            }
        })?;

        commit(tx).await?;
        tracing::debug!(id = order.id, owner_id = order.owner_id, "order created");
        Ok(order)
    }

    async fn list_orders(&self) -> ShopResult<Vec<Order>> {
        let orders = sqlx::query_as::<_, Order>(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders ORDER BY id"
        ))
        .fetch_all(&self.pool)
        .await?;
        Ok(orders)
    }

    async fn get_order_with_owner(&self, id: i64) -> ShopResult<OrderWithOwner> {
        let row = sqlx::query_as::<_, OrderOwnerRow>(
            "SELECT o.id, o.order_number, o.total_cents, o.owner_id, \
                    c.name AS owner_name, c.email AS owner_email, \
                    c.customer_since AS owner_customer_since \
             FROM orders o JOIN customers c ON c.id = o.owner_id \
             WHERE o.id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| EntityError::not_found(ORDER, id))?;
        Ok(row.into())
    }

    async fn delete_order(&self, id: i64) -> ShopResult<()> {
        let mut tx = self.begin().await?;

        let deleted = sqlx::query("DELETE FROM orders WHERE id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?
            .rows_affected();
        if deleted == 0 {
            return Err(EntityError::not_found(ORDER, id).into());
        }

        commit(tx).await?;
        tracing::debug!(id, "order deleted");
        Ok(())
    }
}
