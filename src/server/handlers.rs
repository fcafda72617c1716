//! HTTP handlers for customer and order operations
//!
//! Handlers stay thin: path ids are parsed, bodies go through the
//! [`Validated`] extractor, and the store does the rest. Every error is a
//! [`ShopError`] and renders itself through `IntoResponse`.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde_json::{Value, json};
use std::sync::Arc;

use crate::core::error::{RequestError, ShopError, ShopResult};
use crate::core::model::{Customer, CustomerPatch, NewCustomer, NewOrder, Order, OrderWithOwner};
use crate::core::service::EntityStore;
use crate::core::validation::Validated;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn EntityStore>,
}

impl AppState {
    pub fn new(store: Arc<dyn EntityStore>) -> Self {
        Self { store }
    }
}

/// Parse an integer id out of a path segment
pub fn parse_id(raw: &str) -> ShopResult<i64> {
    raw.parse::<i64>().map_err(|_| {
        ShopError::from(RequestError::InvalidEntityId {
            id: raw.to_string(),
        })
    })
}

// ---------------------------------------------------------------------------
// Customers
// ---------------------------------------------------------------------------

/// POST /customers
pub async fn create_customer(
    State(state): State<AppState>,
    Validated(payload): Validated<NewCustomer>,
) -> ShopResult<(StatusCode, Json<Customer>)> {
    let customer = state.store.create_customer(payload).await?;
    Ok((StatusCode::CREATED, Json(customer)))
}

/// GET /customers
pub async fn list_customers(State(state): State<AppState>) -> ShopResult<Json<Vec<Customer>>> {
    Ok(Json(state.store.list_customers().await?))
}

/// GET /customers/{id}
pub async fn get_customer(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ShopResult<Json<Customer>> {
    let id = parse_id(&id)?;
    Ok(Json(state.store.get_customer(id).await?))
}

/// PUT /customers/{id}
pub async fn replace_customer(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Validated(payload): Validated<NewCustomer>,
) -> ShopResult<(StatusCode, Json<Customer>)> {
    let id = parse_id(&id)?;
    let customer = state.store.replace_customer(id, payload).await?;
    Ok((StatusCode::ACCEPTED, Json(customer)))
}

/// PATCH /customers/{id}
pub async fn patch_customer(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Validated(patch): Validated<CustomerPatch>,
) -> ShopResult<(StatusCode, Json<Customer>)> {
    let id = parse_id(&id)?;
    let customer = state.store.patch_customer(id, patch).await?;
    Ok((StatusCode::ACCEPTED, Json(customer)))
}

/// DELETE /customers/{id}
pub async fn delete_customer(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ShopResult<StatusCode> {
    let id = parse_id(&id)?;
    state.store.delete_customer(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /customers/{id}/orders
pub async fn list_customer_orders(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ShopResult<Json<Vec<Order>>> {
    let id = parse_id(&id)?;
    Ok(Json(state.store.list_customer_orders(id).await?))
}

// ---------------------------------------------------------------------------
// Orders
// ---------------------------------------------------------------------------

/// POST /orders
pub async fn create_order(
    State(state): State<AppState>,
    Validated(payload): Validated<NewOrder>,
) -> ShopResult<(StatusCode, Json<Order>)> {
    let order = state.store.create_order(payload).await?;
    Ok((StatusCode::CREATED, Json(order)))
}

/// GET /orders
pub async fn list_orders(State(state): State<AppState>) -> ShopResult<Json<Vec<Order>>> {
    Ok(Json(state.store.list_orders().await?))
}

/// GET /orders/{id}
pub async fn get_order(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ShopResult<Json<OrderWithOwner>> {
    let id = parse_id(&id)?;
    Ok(Json(state.store.get_order_with_owner(id).await?))
}

/// DELETE /orders/{id}
pub async fn delete_order(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ShopResult<StatusCode> {
    let id = parse_id(&id)?;
    state.store.delete_order(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /health
pub async fn health_check() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}
