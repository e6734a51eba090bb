//! Assertion helpers. Each returns `AssertionFailure` instead of panicking
//! so the runner can log, capture artifacts, and retry.

use std::fmt::Debug;

use serde_json::Value;

use crate::api::model::has_field;
use crate::error::{SuiteError, SuiteResult};

pub fn expect_true(condition: bool, message: impl Into<String>) -> SuiteResult<()> {
    if condition {
        Ok(())
    } else {
        Err(SuiteError::assertion(message))
    }
}

pub fn expect_eq<T: PartialEq + Debug>(actual: T, expected: T, what: &str) -> SuiteResult<()> {
    if actual == expected {
        Ok(())
    } else {
        Err(SuiteError::assertion(format!(
            "{}: expected {:?}, got {:?}",
            what, expected, actual
        )))
    }
}

pub fn expect_ne<T: PartialEq + Debug>(actual: T, unexpected: T, what: &str) -> SuiteResult<()> {
    if actual != unexpected {
        Ok(())
    } else {
        Err(SuiteError::assertion(format!(
            "{}: expected a value other than {:?}",
            what, unexpected
        )))
    }
}

pub fn expect_gt<T: PartialOrd + Debug>(actual: T, bound: T, what: &str) -> SuiteResult<()> {
    if actual > bound {
        Ok(())
    } else {
        Err(SuiteError::assertion(format!(
            "{}: expected > {:?}, got {:?}",
            what, bound, actual
        )))
    }
}

pub fn expect_ge<T: PartialOrd + Debug>(actual: T, bound: T, what: &str) -> SuiteResult<()> {
    if actual >= bound {
        Ok(())
    } else {
        Err(SuiteError::assertion(format!(
            "{}: expected >= {:?}, got {:?}",
            what, bound, actual
        )))
    }
}

/// `value` is an object carrying `field`, whatever its value.
pub fn expect_field(value: &Value, field: &str) -> SuiteResult<()> {
    match value.as_object() {
        Some(_) if has_field(value, field) => Ok(()),
        Some(_) => Err(SuiteError::assertion(format!(
            "expected property '{}' to be present",
            field
        ))),
        None => Err(SuiteError::assertion(format!(
            "expected an object with property '{}', got {}",
            field, value
        ))),
    }
}
