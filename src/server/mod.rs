//! HTTP server for the order desk
//!
//! - `handlers`: one axum handler per store operation
//! - `router`: the route table, mounted under a configurable base path
//! - `builder`: `ServerBuilder`, which wires a store into a router and serves it

pub mod builder;
pub mod handlers;
pub mod router;

pub use builder::ServerBuilder;
pub use handlers::AppState;
pub use router::{build_api_routes, build_router};
