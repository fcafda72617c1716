//! Typed error handling for the order desk
//!
//! Every fallible operation in the crate returns a [`ShopError`], so callers
//! (and the HTTP layer) can match on the precise failure instead of parsing
//! strings out of an `anyhow::Error`.
//!
//! # Error Categories
//!
//! - [`ValidationError`]: malformed input, raised before the store is touched
//! - [`EntityError`]: missing records and uniqueness conflicts
//! - [`RequestError`]: transport level problems (bad path parameters)
//! - [`StorageError`]: failures of the underlying storage backend
//!
//! # Example
//!
//! ```rust,ignore
//! match store.get_customer(42).await {
//!     Ok(customer) => println!("Found: {:?}", customer),
//!     Err(ShopError::Entity(EntityError::NotFound { id, .. })) => {
//!         println!("Customer {} not found", id);
//!     }
//!     Err(e) => eprintln!("Other error: {}", e),
//! }
//! ```

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use std::fmt;

/// The main error type of the crate
#[derive(Debug)]
pub enum ShopError {
    /// Missing records and uniqueness conflicts
    Entity(EntityError),

    /// Payload validation errors
    Validation(ValidationError),

    /// HTTP/Request errors
    Request(RequestError),

    /// Storage backend errors
    Storage(StorageError),
}

impl fmt::Display for ShopError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShopError::Entity(e) => write!(f, "{}", e),
            ShopError::Validation(e) => write!(f, "{}", e),
            ShopError::Request(e) => write!(f, "{}", e),
            ShopError::Storage(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for ShopError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ShopError::Entity(e) => Some(e),
            ShopError::Validation(e) => Some(e),
            ShopError::Request(e) => Some(e),
            ShopError::Storage(e) => Some(e),
        }
    }
}

/// Error response structure for HTTP responses
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Error code for programmatic handling
    pub code: String,
    /// Human-readable error message
    pub message: String,
    /// Optional additional details
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ShopError {
    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            ShopError::Entity(e) => e.status_code(),
            ShopError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ShopError::Request(e) => e.status_code(),
            ShopError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get the error code for this error
    pub fn error_code(&self) -> &'static str {
        match self {
            ShopError::Entity(e) => e.error_code(),
            ShopError::Validation(_) => "VALIDATION_ERROR",
            ShopError::Request(e) => e.error_code(),
            ShopError::Storage(_) => "STORAGE_ERROR",
        }
    }

    /// Whether this error is a `NotFound` entity error
    pub fn is_not_found(&self) -> bool {
        matches!(self, ShopError::Entity(EntityError::NotFound { .. }))
    }

    /// Whether this error is a uniqueness conflict
    pub fn is_conflict(&self) -> bool {
        matches!(self, ShopError::Entity(EntityError::Conflict { .. }))
    }

    /// Whether this error was raised by the validator
    pub fn is_validation(&self) -> bool {
        matches!(self, ShopError::Validation(_))
    }

    /// Convert to an error response
    pub fn to_response(&self) -> ErrorResponse {
        ErrorResponse {
            code: self.error_code().to_string(),
            message: self.to_string(),
            details: self.details(),
        }
    }

    fn details(&self) -> Option<serde_json::Value> {
        match self {
            ShopError::Entity(EntityError::NotFound { entity_type, id }) => {
                Some(serde_json::json!({
                    "entity_type": entity_type,
                    "id": id
                }))
            }
            ShopError::Entity(EntityError::Conflict {
                entity_type,
                field,
                value,
            }) => Some(serde_json::json!({
                "entity_type": entity_type,
                "field": field,
                "value": value
            })),
            ShopError::Validation(ValidationError::FieldErrors(errors)) => {
                Some(serde_json::json!({ "fields": errors }))
            }
            _ => None,
        }
    }
}

impl IntoResponse for ShopError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(code = self.error_code(), error = %self, "request failed");
        } else {
            tracing::warn!(code = self.error_code(), error = %self, "request rejected");
        }
        let body = Json(self.to_response());
        (status, body).into_response()
    }
}

// =============================================================================
// Entity Errors
// =============================================================================

/// Errors related to entity operations
#[derive(Debug)]
pub enum EntityError {
    /// Entity (or a referenced entity) was not found
    NotFound { entity_type: String, id: i64 },

    /// A unique field collides with an existing record
    Conflict {
        entity_type: String,
        field: String,
        value: String,
    },
}

impl EntityError {
    /// Shorthand for a `NotFound` error
    pub fn not_found(entity_type: &str, id: i64) -> Self {
        EntityError::NotFound {
            entity_type: entity_type.to_string(),
            id,
        }
    }

    /// Shorthand for a `Conflict` error
    pub fn conflict(entity_type: &str, field: &str, value: impl Into<String>) -> Self {
        EntityError::Conflict {
            entity_type: entity_type.to_string(),
            field: field.to_string(),
            value: value.into(),
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            EntityError::NotFound { .. } => StatusCode::NOT_FOUND,
            EntityError::Conflict { .. } => StatusCode::CONFLICT,
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            EntityError::NotFound { .. } => "ENTITY_NOT_FOUND",
            EntityError::Conflict { .. } => "ENTITY_CONFLICT",
        }
    }
}

impl fmt::Display for EntityError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityError::NotFound { entity_type, id } => {
                write!(f, "{} with id '{}' not found", entity_type, id)
            }
            EntityError::Conflict {
                entity_type,
                field,
                value,
            } => {
                write!(
                    f,
                    "{} with {} '{}' already exists",
                    entity_type, field, value
                )
            }
        }
    }
}

impl std::error::Error for EntityError {}

impl From<EntityError> for ShopError {
    fn from(err: EntityError) -> Self {
        ShopError::Entity(err)
    }
}

// =============================================================================
// Validation Errors
// =============================================================================

/// Errors related to input validation
#[derive(Debug)]
pub enum ValidationError {
    /// Multiple field validation errors
    FieldErrors(Vec<FieldValidationError>),

    /// Body is not JSON, or does not match the expected shape
    InvalidJson { message: String },
}

/// A single field validation error
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldValidationError {
    pub field: String,
    pub message: String,
}

impl ValidationError {
    /// Names of the offending fields, in report order
    pub fn fields(&self) -> Vec<&str> {
        match self {
            ValidationError::FieldErrors(errors) => {
                errors.iter().map(|e| e.field.as_str()).collect()
            }
            ValidationError::InvalidJson { .. } => Vec::new(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::FieldErrors(errors) => {
                let msgs: Vec<String> = errors
                    .iter()
                    .map(|e| format!("{}: {}", e.field, e.message))
                    .collect();
                write!(f, "Validation errors: {}", msgs.join(", "))
            }
            ValidationError::InvalidJson { message } => {
                write!(f, "Invalid JSON: {}", message)
            }
        }
    }
}

impl std::error::Error for ValidationError {}

impl From<ValidationError> for ShopError {
    fn from(err: ValidationError) -> Self {
        ShopError::Validation(err)
    }
}

// =============================================================================
// Request Errors
// =============================================================================

/// Errors related to HTTP requests
#[derive(Debug)]
pub enum RequestError {
    /// Path id is not an integer
    InvalidEntityId { id: String },
}

impl fmt::Display for RequestError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RequestError::InvalidEntityId { id } => {
                write!(f, "Invalid entity ID format: '{}'", id)
            }
        }
    }
}

impl std::error::Error for RequestError {}

impl RequestError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            RequestError::InvalidEntityId { .. } => StatusCode::BAD_REQUEST,
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            RequestError::InvalidEntityId { .. } => "INVALID_ENTITY_ID",
        }
    }
}

impl From<RequestError> for ShopError {
    fn from(err: RequestError) -> Self {
        ShopError::Request(err)
    }
}

// =============================================================================
// Storage Errors
// =============================================================================

/// Errors related to storage backends
#[derive(Debug)]
pub enum StorageError {
    /// Connection error
    ConnectionError { backend: String, message: String },

    /// Query execution error
    QueryError { backend: String, message: String },

    /// Transaction begin/commit failure
    TransactionError { message: String },

    /// Schema migration failure
    MigrationError { message: String },

    /// Internal lock was poisoned by a panicking writer
    LockPoisoned,
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageError::ConnectionError { backend, message } => {
                write!(f, "Failed to connect to {}: {}", backend, message)
            }
            StorageError::QueryError { backend, message } => {
                write!(f, "{} query error: {}", backend, message)
            }
            StorageError::TransactionError { message } => {
                write!(f, "Transaction error: {}", message)
            }
            StorageError::MigrationError { message } => {
                write!(f, "Migration error: {}", message)
            }
            StorageError::LockPoisoned => write!(f, "Storage lock poisoned"),
        }
    }
}

impl std::error::Error for StorageError {}

impl From<StorageError> for ShopError {
    fn from(err: StorageError) -> Self {
        ShopError::Storage(err)
    }
}

// =============================================================================
// Conversions from external errors
// =============================================================================

impl From<serde_json::Error> for ShopError {
    fn from(err: serde_json::Error) -> Self {
        ShopError::Validation(ValidationError::InvalidJson {
            message: err.to_string(),
        })
    }
}

#[cfg(feature = "sqlite")]
impl From<sqlx::Error> for ShopError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_) => {
                ShopError::Storage(StorageError::ConnectionError {
                    backend: "SQLite".to_string(),
                    message: err.to_string(),
                })
            }
            other => ShopError::Storage(StorageError::QueryError {
                backend: "SQLite".to_string(),
                message: other.to_string(),
            }),
        }
    }
}

#[cfg(feature = "sqlite")]
impl From<sqlx::migrate::MigrateError> for ShopError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        ShopError::Storage(StorageError::MigrationError {
            message: err.to_string(),
        })
    }
}

// =============================================================================
// Result type alias
// =============================================================================

/// A specialized Result type for order desk operations
pub type ShopResult<T> = Result<T, ShopError>;
