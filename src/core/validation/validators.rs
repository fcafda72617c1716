//! Reusable field validators
//!
//! Each factory returns a closure taking the field name and the value and
//! producing a human readable message on failure.

use validator::ValidateEmail;

/// Validator: string length, counted in characters, must be within range
pub fn string_length(
    min: usize,
    max: usize,
) -> impl Fn(&str, &str) -> Result<(), String> + Send + Sync + Clone {
    move |field: &str, value: &str| {
        let len = value.chars().count();
        if len < min {
            Err(format!(
                "'{}' must be at least {} characters (got {})",
                field, min, len
            ))
        } else if len > max {
            Err(format!(
                "'{}' must not exceed {} characters (got {})",
                field, max, len
            ))
        } else {
            Ok(())
        }
    }
}

/// Validator: integer must lie in the inclusive range `[min, max]`
pub fn in_range(min: i64, max: i64) -> impl Fn(&str, i64) -> Result<(), String> + Send + Sync + Clone {
    move |field: &str, value: i64| {
        if value < min || value > max {
            Err(format!(
                "'{}' must be between {} and {} (got {})",
                field, min, max, value
            ))
        } else {
            Ok(())
        }
    }
}

/// Validator: number must be strictly positive
pub fn positive() -> impl Fn(&str, i64) -> Result<(), String> + Send + Sync + Clone {
    |field: &str, value: i64| {
        if value <= 0 {
            Err(format!("'{}' must be positive (got {})", field, value))
        } else {
            Ok(())
        }
    }
}

/// Validator: string must be a syntactically valid email address
pub fn email() -> impl Fn(&str, &str) -> Result<(), String> + Send + Sync + Clone {
    |field: &str, value: &str| {
        if value.to_string().validate_email() {
            Ok(())
        } else {
            Err(format!(
                "'{}' must be a valid email address (got '{}')",
                field, value
            ))
        }
    }
}
