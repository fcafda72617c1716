//! Route table for the order desk API

use super::handlers::{
    AppState, create_customer, create_order, delete_customer, delete_order, get_customer,
    get_order, health_check, list_customer_orders, list_customers, list_orders, patch_customer,
    replace_customer,
};
use axum::{Router, routing::get};
use tower_http::trace::TraceLayer;

/// Build the API routes
///
/// Paths are relative; the caller decides where to mount them.
/// - POST   /customers, GET /customers
/// - GET    /customers/{id}, PUT /customers/{id}, PATCH /customers/{id}, DELETE /customers/{id}
/// - GET    /customers/{id}/orders
/// - POST   /orders, GET /orders
/// - GET    /orders/{id}, DELETE /orders/{id}
pub fn build_api_routes(state: AppState) -> Router {
    Router::new()
        .route("/customers", get(list_customers).post(create_customer))
        .route(
            "/customers/{id}",
            get(get_customer)
                .put(replace_customer)
                .patch(patch_customer)
                .delete(delete_customer),
        )
        .route("/customers/{id}/orders", get(list_customer_orders))
        .route("/orders", get(list_orders).post(create_order))
        .route("/orders/{id}", get(get_order).delete(delete_order))
        .with_state(state)
}

/// Mount the API under `base_path` and attach request tracing
///
/// Surrounding slashes are optional; an empty base path (or `/`) serves the
/// routes from the root. `GET /health` is always served from the root.
pub fn build_router(state: AppState, base_path: &str) -> Router {
    let api = build_api_routes(state);
    let base_path = base_path.trim().trim_matches('/');

    let root = Router::new().route("/health", get(health_check));
    let app = if base_path.is_empty() {
        root.merge(api)
    } else {
        root.nest(&format!("/{base_path}"), api)
    };

    app.layer(TraceLayer::new_for_http())
}
