//! Axum extractor for validated payloads
//!
//! `Validated<T>` deserializes the JSON body into `T` and runs the matching
//! validator, so handlers only ever see payloads that passed every rule.

use super::rules::ValidatePayload;
use crate::core::error::{ShopError, ValidationError};
use axum::{
    Json,
    extract::{FromRequest, Request},
};
use serde::de::DeserializeOwned;

/// Axum extractor that validates entity payloads
///
/// # Usage
///
/// ```rust,ignore
/// pub async fn create_customer(
///     State(state): State<AppState>,
///     Validated(payload): Validated<NewCustomer>,
/// ) -> ShopResult<(StatusCode, Json<Customer>)> {
///     // payload is already validated
/// }
/// ```
#[derive(Debug, Clone)]
pub struct Validated<T>(pub T);

impl<T> Validated<T> {
    /// Get the inner payload
    pub fn into_inner(self) -> T {
        self.0
    }
}

impl<T> std::ops::Deref for Validated<T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<S, T> FromRequest<S> for Validated<T>
where
    S: Send + Sync,
    T: DeserializeOwned + ValidatePayload + Send,
{
    type Rejection = ShopError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(payload) = Json::<T>::from_request(req, state).await.map_err(|rejection| {
            ShopError::Validation(ValidationError::InvalidJson {
                message: rejection.body_text(),
            })
        })?;

        Ok(Validated(payload.validate()?))
    }
}
