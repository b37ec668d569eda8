//! Hard and soft assertions.
//!
//! Hard assertions return [`ProbeError::AssertionFailed`] so a scenario
//! stops at the first `?`. Soft assertions (see [`soft`]) record failures
//! and report them together at the end of the scenario.

pub mod soft;

pub use soft::{AssertionFailure, AssertionSummary, SoftAssertionError, SoftAssertions};

use crate::result::{ProbeError, ProbeResult};
use serde_json::Value;
use std::fmt::Debug;

/// Fail unless `condition` holds.
pub fn ensure(condition: bool, message: &str) -> ProbeResult<()> {
    if condition {
        Ok(())
    } else {
        Err(ProbeError::assertion(message))
    }
}

/// Fail unless `actual == expected`.
pub fn ensure_eq<T: PartialEq + Debug + ?Sized>(
    actual: &T,
    expected: &T,
    message: &str,
) -> ProbeResult<()> {
    if actual == expected {
        Ok(())
    } else {
        Err(ProbeError::assertion(format!(
            "{message}: expected {expected:?}, got {actual:?}"
        )))
    }
}

/// Look up a dotted path (`booking.bookingdates.checkin`) in a JSON value.
///
/// Numeric segments index into arrays.
#[must_use]
pub fn json_path<'a>(value: &'a Value, path: &str) -> Option<&'a Value> {
    if path.is_empty() {
        return Some(value);
    }
    path.split('.').try_fold(value, |current, segment| match current {
        Value::Object(map) => map.get(segment),
        Value::Array(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
        _ => None,
    })
}

/// Whether `path` resolves inside `value`.
#[must_use]
pub fn has_property(value: &Value, path: &str) -> bool {
    json_path(value, path).is_some()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_ensure() {
        assert!(ensure(true, "fine").is_ok());
        let err = ensure(false, "schema must validate").unwrap_err();
        assert_eq!(err.to_string(), "Assertion failed: schema must validate");
    }

    #[test]
    fn test_ensure_eq_message() {
        let err = ensure_eq(&404, &200, "status").unwrap_err();
        assert!(err.to_string().contains("expected 200, got 404"));
        assert!(ensure_eq("india", "india", "dropdown").is_ok());
    }

    #[test]
    fn test_json_path_nested_and_indexed() {
        let body = json!({
            "booking": { "bookingdates": { "checkin": "2018-01-01" } },
            "items": [ { "bookingid": 5 } ]
        });
        assert_eq!(
            json_path(&body, "booking.bookingdates.checkin"),
            Some(&json!("2018-01-01"))
        );
        assert_eq!(json_path(&body, "items.0.bookingid"), Some(&json!(5)));
        assert_eq!(json_path(&body, ""), Some(&body));
        assert!(json_path(&body, "items.1").is_none());
        assert!(!has_property(&body, "booking.firstname"));
        assert!(has_property(&body, "booking.bookingdates"));
    }
}
