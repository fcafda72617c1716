//! Customer and order records, their input payloads and patch semantics

use serde::{Deserialize, Deserializer, Serialize};

/// Entity type name used in errors and logs
pub const CUSTOMER: &str = "customer";

/// Entity type name used in errors and logs
pub const ORDER: &str = "order";

/// A persisted customer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlite", derive(sqlx::FromRow))]
pub struct Customer {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub customer_since: i32,
}

/// Payload for creating a customer, and for replacing one wholesale (PUT)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewCustomer {
    pub name: String,
    pub email: String,
    pub customer_since: i32,
}

impl NewCustomer {
    pub fn new(name: impl Into<String>, email: impl Into<String>, customer_since: i32) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
            customer_since,
        }
    }

    /// Attach a store generated id
    pub fn into_customer(self, id: i64) -> Customer {
        Customer {
            id,
            name: self.name,
            email: self.email,
            customer_since: self.customer_since,
        }
    }
}

/// A field of a partial update
///
/// JSON distinguishes a missing key from an explicit `null`; both collapse to
/// `None` in a plain `Option`, so patches carry this three-state value
/// instead. Use it with `#[serde(default)]` so missing keys become `Absent`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PatchField<T> {
    /// Key not present: leave the stored value unchanged
    Absent,
    /// Key present with `null`
    Null,
    /// Key present with a value
    Value(T),
}

impl<T> Default for PatchField<T> {
    fn default() -> Self {
        PatchField::Absent
    }
}

impl<T> PatchField<T> {
    pub fn is_absent(&self) -> bool {
        matches!(self, PatchField::Absent)
    }

    /// The supplied value, if any
    pub fn as_value(&self) -> Option<&T> {
        match self {
            PatchField::Value(v) => Some(v),
            _ => None,
        }
    }
}

impl<T> From<T> for PatchField<T> {
    fn from(value: T) -> Self {
        PatchField::Value(value)
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for PatchField<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(match Option::<T>::deserialize(deserializer)? {
            Some(value) => PatchField::Value(value),
            None => PatchField::Null,
        })
    }
}

/// Partial update of a customer (PATCH)
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct CustomerPatch {
    #[serde(default)]
    pub name: PatchField<String>,
    #[serde(default)]
    pub email: PatchField<String>,
    #[serde(default)]
    pub customer_since: PatchField<i32>,
}

impl CustomerPatch {
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = PatchField::Value(name.into());
        self
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = PatchField::Value(email.into());
        self
    }

    pub fn with_customer_since(mut self, year: i32) -> Self {
        self.customer_since = PatchField::Value(year);
        self
    }

    /// True when no field was supplied
    pub fn is_empty(&self) -> bool {
        self.name.is_absent() && self.email.is_absent() && self.customer_since.is_absent()
    }

    /// Merge the supplied fields into `customer`
    ///
    /// Only `Value` fields are written. `Absent` and `Null` leave the stored
    /// value untouched; the validator rejects `Null` before a patch gets here.
    pub fn apply_to(&self, customer: &mut Customer) {
        if let Some(name) = self.name.as_value() {
            customer.name = name.clone();
        }
        if let Some(email) = self.email.as_value() {
            customer.email = email.clone();
        }
        if let Some(year) = self.customer_since.as_value() {
            customer.customer_since = *year;
        }
    }
}

/// A persisted order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlite", derive(sqlx::FromRow))]
pub struct Order {
    pub id: i64,
    pub order_number: String,
    pub total_cents: i64,
    pub owner_id: i64,
}

/// Payload for creating an order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewOrder {
    pub order_number: String,
    pub total_cents: i64,
    #[serde(alias = "customer_id")]
    pub owner_id: i64,
}

impl NewOrder {
    pub fn new(order_number: impl Into<String>, total_cents: i64, owner_id: i64) -> Self {
        Self {
            order_number: order_number.into(),
            total_cents,
            owner_id,
        }
    }

    /// Attach a store generated id
    pub fn into_order(self, id: i64) -> Order {
        Order {
            id,
            order_number: self.order_number,
            total_cents: self.total_cents,
            owner_id: self.owner_id,
        }
    }
}

/// An order joined with the customer that owns it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderWithOwner {
    #[serde(flatten)]
    pub order: Order,
    pub owner: Customer,
}
