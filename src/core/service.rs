//! Store trait for customer and order operations

use crate::core::error::ShopResult;
use crate::core::model::{Customer, CustomerPatch, NewCustomer, NewOrder, Order, OrderWithOwner};
use async_trait::async_trait;

/// Invariant-preserving persistence for customers and their orders
///
/// Implementations are handed to the HTTP layer as `Arc<dyn EntityStore>`;
/// there is no process-wide registry. Every operation is atomic: on error
/// nothing it attempted is observable afterwards.
///
/// Payloads are expected to have passed the validator already.
#[async_trait]
pub trait EntityStore: Send + Sync {
    /// Insert a customer, failing with `Conflict` when the email is taken
    async fn create_customer(&self, data: NewCustomer) -> ShopResult<Customer>;

    /// Fetch a customer or fail with `NotFound`
    async fn get_customer(&self, id: i64) -> ShopResult<Customer>;

    /// All customers by ascending id
    async fn list_customers(&self) -> ShopResult<Vec<Customer>>;

    /// Overwrite every field of an existing customer
    async fn replace_customer(&self, id: i64, data: NewCustomer) -> ShopResult<Customer>;

    /// Overwrite only the fields supplied in `patch`
    async fn patch_customer(&self, id: i64, patch: CustomerPatch) -> ShopResult<Customer>;

    /// Delete a customer together with all of its orders
    async fn delete_customer(&self, id: i64) -> ShopResult<()>;

    /// Orders owned by a customer, by ascending id
    async fn list_customer_orders(&self, customer_id: i64) -> ShopResult<Vec<Order>>;

    /// Insert an order for an existing owner
    ///
    /// Fails with `NotFound` when the owner does not exist and with
    /// `Conflict` when the order number is taken.
    async fn create_order(&self, data: NewOrder) -> ShopResult<Order>;

    /// All orders by ascending id
    async fn list_orders(&self) -> ShopResult<Vec<Order>>;

    /// An order joined with its owning customer
    async fn get_order_with_owner(&self, id: i64) -> ShopResult<OrderWithOwner>;

    /// Delete a single order
    async fn delete_order(&self, id: i64) -> ShopResult<()>;
}
