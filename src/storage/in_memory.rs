//! In-memory implementation of EntityStore for testing and development

use crate::core::error::{EntityError, ShopResult, StorageError};
use crate::core::model::{
    CUSTOMER, Customer, CustomerPatch, NewCustomer, NewOrder, ORDER, Order, OrderWithOwner,
};
use crate::core::service::EntityStore;
use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Rows plus the unique indexes over them
///
/// Ids are handed out from monotonically increasing counters and never
/// reused. `emails` and `order_numbers` always mirror the row maps.
#[derive(Debug)]
struct Tables {
    customers: BTreeMap<i64, Customer>,
    orders: BTreeMap<i64, Order>,
    emails: HashMap<String, i64>,
    order_numbers: HashMap<String, i64>,
    next_customer_id: i64,
    next_order_id: i64,
}

impl Default for Tables {
    fn default() -> Self {
        Self {
            customers: BTreeMap::new(),
            orders: BTreeMap::new(),
            emails: HashMap::new(),
            order_numbers: HashMap::new(),
            next_customer_id: 1,
            next_order_id: 1,
        }
    }
}

impl Tables {
    fn customer(&self, id: i64) -> ShopResult<&Customer> {
        self.customers
            .get(&id)
            .ok_or_else(|| EntityError::not_found(CUSTOMER, id).into())
    }

    /// Fail when `email` belongs to a customer other than `except`
    fn ensure_email_free(&self, email: &str, except: Option<i64>) -> ShopResult<()> {
        match self.emails.get(email) {
            Some(owner) if Some(*owner) != except => {
                tracing::warn!(email, "customer email already taken");
                Err(EntityError::conflict(CUSTOMER, "email", email).into())
            }
            _ => Ok(()),
        }
    }

    /// Store `updated` in place of the existing customer with the same id
    fn rewrite_customer(&mut self, updated: Customer) -> ShopResult<Customer> {
        let previous_email = self.customer(updated.id)?.email.clone();
        self.ensure_email_free(&updated.email, Some(updated.id))?;
        if previous_email != updated.email {
            self.emails.remove(&previous_email);
            self.emails.insert(updated.email.clone(), updated.id);
        }
        self.customers.insert(updated.id, updated.clone());
        Ok(updated)
    }
}

/// In-memory store implementation
///
/// Every operation runs inside one critical section of a single `RwLock`,
/// which serves as its transaction: checks and writes happen under the same
/// guard, so a failing operation has written nothing and concurrent writers
/// racing on a unique key see exactly one winner.
#[derive(Clone, Default)]
pub struct InMemoryStore {
    tables: Arc<RwLock<Tables>>,
}

impl InMemoryStore {
    /// Create a new, empty in-memory store
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> ShopResult<RwLockReadGuard<'_, Tables>> {
        self.tables
            .read()
            .map_err(|_| StorageError::LockPoisoned.into())
    }

    fn write(&self) -> ShopResult<RwLockWriteGuard<'_, Tables>> {
        self.tables
            .write()
            .map_err(|_| StorageError::LockPoisoned.into())
    }
}

#[async_trait]
impl EntityStore for InMemoryStore {
    async fn create_customer(&self, data: NewCustomer) -> ShopResult<Customer> {
        let mut tables = self.write()?;
        tables.ensure_email_free(&data.email, None)?;

        let id = tables.next_customer_id;
        tables.next_customer_id += 1;
        let customer = data.into_customer(id);
        tables.emails.insert(customer.email.clone(), id);
        tables.customers.insert(id, customer.clone());

        tracing::debug!(id, "customer created");
        Ok(customer)
    }

    async fn get_customer(&self, id: i64) -> ShopResult<Customer> {
        self.read()?.customer(id).cloned()
    }

    async fn list_customers(&self) -> ShopResult<Vec<Customer>> {
        Ok(self.read()?.customers.values().cloned().collect())
    }

    async fn replace_customer(&self, id: i64, data: NewCustomer) -> ShopResult<Customer> {
        let mut tables = self.write()?;
        let customer = tables.rewrite_customer(data.into_customer(id))?;

        tracing::debug!(id, "customer replaced");
        Ok(customer)
    }

    async fn patch_customer(&self, id: i64, patch: CustomerPatch) -> ShopResult<Customer> {
        let mut tables = self.write()?;
        let mut customer = tables.customer(id)?.clone();
        patch.apply_to(&mut customer);
        let customer = tables.rewrite_customer(customer)?;

        tracing::debug!(id, "customer patched");
        Ok(customer)
    }

    async fn delete_customer(&self, id: i64) -> ShopResult<()> {
        let mut tables = self.write()?;
        let customer = tables
            .customers
            .remove(&id)
            .ok_or_else(|| EntityError::not_found(CUSTOMER, id))?;
        tables.emails.remove(&customer.email);

        let owned: Vec<Order> = tables
            .orders
            .values()
            .filter(|order| order.owner_id == id)
            .cloned()
            .collect();
        for order in &owned {
            tables.orders.remove(&order.id);
            tables.order_numbers.remove(&order.order_number);
        }

        tracing::debug!(id, cascaded = owned.len(), "customer deleted");
        Ok(())
    }

    async fn list_customer_orders(&self, customer_id: i64) -> ShopResult<Vec<Order>> {
        let tables = self.read()?;
        tables.customer(customer_id)?;
        Ok(tables
            .orders
            .values()
            .filter(|order| order.owner_id == customer_id)
            .cloned()
            .collect())
    }

    async fn create_order(&self, data: NewOrder) -> ShopResult<Order> {
        let mut tables = self.write()?;
        if !tables.customers.contains_key(&data.owner_id) {
            tracing::warn!(owner_id = data.owner_id, "order owner does not exist");
            return Err(EntityError::not_found(CUSTOMER, data.owner_id).into());
        }
        if tables.order_numbers.contains_key(&data.order_number) {
            tracing::warn!(order_number = %data.order_number, "order number already taken");
            return Err(EntityError::conflict(ORDER, "order_number", data.order_number).into());
        }

        let id = tables.next_order_id;
        tables.next_order_id += 1;
        let order = data.into_order(id);
        tables.order_numbers.insert(order.order_number.clone(), id);
        tables.orders.insert(id, order.clone());

        tracing::debug!(id, owner_id = order.owner_id, "order created");
        Ok(order)
    }

    async fn list_orders(&self) -> ShopResult<Vec<Order>> {
        Ok(self.read()?.orders.values().cloned().collect())
    }

    async fn get_order_with_owner(&self, id: i64) -> ShopResult<OrderWithOwner> {
        let tables = self.read()?;
        let order = tables
            .orders
            .get(&id)
            .cloned()
            .ok_or_else(|| EntityError::not_found(ORDER, id))?;
        let owner = tables.customer(order.owner_id)?.clone();
        Ok(OrderWithOwner { order, owner })
    }

    async fn delete_order(&self, id: i64) -> ShopResult<()> {
        let mut tables = self.write()?;
        let order = tables
            .orders
            .remove(&id)
            .ok_or_else(|| EntityError::not_found(ORDER, id))?;
        tables.order_numbers.remove(&order.order_number);

        tracing::debug!(id, "order deleted");
        Ok(())
    }
}
