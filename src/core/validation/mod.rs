//! Validation of incoming payloads
//!
//! Payloads are checked field by field before they reach a store. Failures
//! never touch storage and are reported all at once.

pub mod extractor;
pub mod rules;
pub mod validators;

pub use extractor::Validated;
pub use rules::{
    ValidatePayload, validate_customer_create, validate_customer_patch, validate_order_create,
};
