//! Core module containing the data model, validation and store contract

pub mod error;
pub mod model;
pub mod service;
pub mod validation;

pub use error::{ShopError, ShopResult};
pub use model::{Customer, CustomerPatch, NewCustomer, NewOrder, Order, OrderWithOwner, PatchField};
pub use service::EntityStore;
pub use validation::Validated;
