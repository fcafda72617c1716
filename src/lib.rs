//! # Order Desk
//!
//! A small REST service managing customers and the orders they own.
//!
//! ## Features
//!
//! - **Validated Payloads**: every body passes field rules before any store is touched
//! - **Invariant-Preserving Stores**: unique emails and order numbers, owner must exist
//! - **Cascade Delete**: removing a customer removes all of its orders
//! - **Partial Updates**: PATCH distinguishes absent, null and supplied fields
//! - **Pluggable Storage**: in-memory for tests and development, SQLite via sqlx
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use orderdesk::prelude::*;
//!
//! let store = SqliteStore::connect("sqlite://orderdesk.db", 5).await?;
//! store.migrate().await?;
//!
//! ServerBuilder::new()
//!     .with_store(store)
//!     .with_base_path("/api")
//!     .serve("127.0.0.1:3000".parse()?)
//!     .await?;
//! ```

pub mod config;
pub mod core;
pub mod server;
pub mod storage;

/// Re-exports of commonly used types and traits
pub mod prelude {
    // === Core ===
    pub use crate::core::{
        error::{EntityError, ShopError, ShopResult, ValidationError},
        model::{Customer, CustomerPatch, NewCustomer, NewOrder, Order, OrderWithOwner, PatchField},
        service::EntityStore,
        validation::{ValidatePayload, Validated},
    };

    // === Storage ===
    #[cfg(feature = "in-memory")]
    pub use crate::storage::InMemoryStore;
    #[cfg(feature = "sqlite")]
    pub use crate::storage::SqliteStore;

    // === Config ===
    pub use crate::config::{ConfigError, ServiceConfig};

    // === Server ===
    pub use crate::server::{AppState, ServerBuilder};

    // === External dependencies ===
    pub use async_trait::async_trait;
    pub use serde::{Deserialize, Serialize};
}
