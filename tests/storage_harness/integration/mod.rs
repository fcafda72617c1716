//! Integration test infrastructure for storage backends.
//!
//! Validates storage backends through the full REST layer
//! (HTTP → handler → validator → EntityStore → response), using the
//! production router mounted under `/api`.
//!
//! # Architecture
//!
//! ```text
//! axum_test::TestServer
//!     └─ Router (built by build_test_router)
//!         ├─ /api/customers[/{id}[/orders]]
//!         ├─ /api/orders[/{id}]
//!         └─ /health
//! ```


use axum::Router;
use axum_test::TestServer;
use orderdesk::core::service::EntityStore;
use orderdesk::server::ServerBuilder;
use std::sync::Arc;

pub const BASE_PATH: &str = "/api";

/// Build the production router around `store`
pub fn build_test_router(store: Arc<dyn EntityStore>) -> Router {
    ServerBuilder::new()
        .with_shared_store(store)
        .with_base_path(BASE_PATH)
        .build()
        .unwrap()
}

/// Wrap the router in an in-process test server
pub fn test_server(store: Arc<dyn EntityStore>) -> TestServer {
    TestServer::new(build_test_router(store))
}

/// Prefix `path` with the API base path
pub fn api(path: &str) -> String {
    format!("{BASE_PATH}{path}")
}
