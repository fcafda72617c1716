//! Field constraints for customer and order payloads
//!
//! Every entry point is a pure function from a payload to either the same
//! payload or a [`ValidationError`] listing every offending field.

use super::validators::{email, in_range, positive, string_length};
use crate::core::error::{FieldValidationError, ValidationError};
use crate::core::model::{CustomerPatch, NewCustomer, NewOrder, PatchField};

pub const NAME_MIN_LEN: usize = 1;
pub const NAME_MAX_LEN: usize = 100;
pub const CUSTOMER_SINCE_MIN: i64 = 2000;
pub const CUSTOMER_SINCE_MAX: i64 = 2100;
pub const ORDER_NUMBER_MIN_LEN: usize = 3;
pub const ORDER_NUMBER_MAX_LEN: usize = 20;
pub const TOTAL_CENTS_MIN: i64 = 1;
pub const TOTAL_CENTS_MAX: i64 = 1_000_000;

/// Payloads that can be checked before reaching the store
pub trait ValidatePayload: Sized {
    fn validate(self) -> Result<Self, ValidationError>;
}

impl ValidatePayload for NewCustomer {
    fn validate(self) -> Result<Self, ValidationError> {
        validate_customer_create(self)
    }
}

impl ValidatePayload for CustomerPatch {
    fn validate(self) -> Result<Self, ValidationError> {
        validate_customer_patch(self)
    }
}

impl ValidatePayload for NewOrder {
    fn validate(self) -> Result<Self, ValidationError> {
        validate_order_create(self)
    }
}

/// Collects field failures so a single response reports all of them
#[derive(Default)]
struct FieldReport {
    errors: Vec<FieldValidationError>,
}

impl FieldReport {
    fn check(&mut self, field: &str, outcome: Result<(), String>) {
        if let Err(message) = outcome {
            self.errors.push(FieldValidationError {
                field: field.to_string(),
                message,
            });
        }
    }

    fn finish<T>(self, payload: T) -> Result<T, ValidationError> {
        if self.errors.is_empty() {
            Ok(payload)
        } else {
            Err(ValidationError::FieldErrors(self.errors))
        }
    }
}

fn check_name(report: &mut FieldReport, name: &str) {
    report.check("name", string_length(NAME_MIN_LEN, NAME_MAX_LEN)("name", name));
}

fn check_email(report: &mut FieldReport, value: &str) {
    report.check("email", email()("email", value));
}

fn check_customer_since(report: &mut FieldReport, year: i32) {
    report.check(
        "customer_since",
        in_range(CUSTOMER_SINCE_MIN, CUSTOMER_SINCE_MAX)("customer_since", i64::from(year)),
    );
}

/// Check one patch field: absent is skipped, null is rejected
fn check_patch_field<T>(
    report: &mut FieldReport,
    field: &str,
    value: &PatchField<T>,
    check: impl FnOnce(&mut FieldReport, &T),
) {
    match value {
        PatchField::Absent => {}
        PatchField::Null => report.check(
            field,
            Err(format!("'{}' may be omitted but cannot be null", field)),
        ),
        PatchField::Value(v) => check(report, v),
    }
}

/// Validate a full customer payload (create and replace)
pub fn validate_customer_create(payload: NewCustomer) -> Result<NewCustomer, ValidationError> {
    let mut report = FieldReport::default();
    check_name(&mut report, &payload.name);
    check_email(&mut report, &payload.email);
    check_customer_since(&mut report, payload.customer_since);
    report.finish(payload)
}

/// Validate a partial customer payload
pub fn validate_customer_patch(payload: CustomerPatch) -> Result<CustomerPatch, ValidationError> {
    let mut report = FieldReport::default();
    check_patch_field(&mut report, "name", &payload.name, |r, v| check_name(r, v));
    check_patch_field(&mut report, "email", &payload.email, |r, v| check_email(r, v));
    check_patch_field(&mut report, "customer_since", &payload.customer_since, |r, v| {
        check_customer_since(r, *v)
    });
    report.finish(payload)
}

/// Validate an order payload
pub fn validate_order_create(payload: NewOrder) -> Result<NewOrder, ValidationError> {
    let mut report = FieldReport::default();
    report.check(
        "order_number",
        string_length(ORDER_NUMBER_MIN_LEN, ORDER_NUMBER_MAX_LEN)(
            "order_number",
            &payload.order_number,
        ),
    );
    report.check(
        "total_cents",
        in_range(TOTAL_CENTS_MIN, TOTAL_CENTS_MAX)("total_cents", payload.total_cents),
    );
    report.check("owner_id", positive()("owner_id", payload.owner_id));
    report.finish(payload)
}
