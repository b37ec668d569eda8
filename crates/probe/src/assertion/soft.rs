//! Soft assertions
//!
//! Collect multiple assertion failures without stopping the scenario, then
//! report them together through [`SoftAssertions::verify`].
//!
//! A collector is a shared handle: clones record into the same list, so the
//! runner can still read failures recorded by a scenario that returned
//! early.

use super::json_path;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt::Debug;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// A single assertion failure
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssertionFailure {
    /// Message describing the failure
    pub message: String,
    /// Index of this assertion in the sequence
    pub index: usize,
}

#[derive(Debug, Default)]
struct Ledger {
    failures: Vec<AssertionFailure>,
    assertion_count: usize,
}

/// Soft assertions collector
///
/// ```ignore
/// let soft = SoftAssertions::new();
/// soft.assert_eq(&response.status, &200, "POST /booking status");
/// soft.assert_has_property(&body, "bookingid", "create response");
/// soft.verify()?;
/// ```
#[derive(Debug, Clone, Default)]
pub struct SoftAssertions {
    ledger: Arc<Mutex<Ledger>>,
}

impl SoftAssertions {
    /// Create a new soft assertions collector
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn ledger(&self) -> MutexGuard<'_, Ledger> {
        self.ledger.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn check(&self, passed: bool, failure: impl FnOnce() -> String) {
        let mut ledger = self.ledger();
        ledger.assertion_count += 1;
        if !passed {
            let message = failure();
            tracing::warn!(%message, "soft assertion failed");
            let index = ledger.failures.len();
            ledger.failures.push(AssertionFailure { message, index });
        }
    }

    /// Assert two values are equal
    pub fn assert_eq<T: PartialEq + Debug + ?Sized>(&self, actual: &T, expected: &T, message: &str) {
        self.check(actual == expected, || {
            format!("{message}: expected {expected:?}, got {actual:?}")
        });
    }

    /// Assert a condition is true
    pub fn assert_true(&self, condition: bool, message: &str) {
        self.check(condition, || format!("{message}: expected true, got false"));
    }

    /// Assert a condition is false
    pub fn assert_false(&self, condition: bool, message: &str) {
        self.check(!condition, || format!("{message}: expected false, got true"));
    }

    /// Assert `actual > bound`
    pub fn assert_gt<T: PartialOrd + Debug>(&self, actual: &T, bound: &T, message: &str) {
        self.check(
            actual.partial_cmp(bound) == Some(std::cmp::Ordering::Greater),
            || format!("{message}: expected a value greater than {bound:?}, got {actual:?}"),
        );
    }

    /// Assert a collection has expected length
    pub fn assert_len<T>(&self, collection: &[T], expected: usize, message: &str) {
        self.check(collection.len() == expected, || {
            format!(
                "{message}: expected length {expected}, got {}",
                collection.len()
            )
        });
    }

    /// Assert a collection is empty
    pub fn assert_empty<T: Debug>(&self, collection: &[T], message: &str) {
        self.check(collection.is_empty(), || {
            format!("{message}: expected empty collection, got {collection:?}")
        });
    }

    /// Assert a dotted path exists in a JSON value
    pub fn assert_has_property(&self, value: &Value, path: &str, message: &str) {
        self.check(json_path(value, path).is_some(), || {
            format!("{message}: missing property '{path}'")
        });
    }

    /// Assert the value at a dotted path equals `expected`
    pub fn assert_json_eq(&self, value: &Value, path: &str, expected: &Value, message: &str) {
        let actual = json_path(value, path);
        self.check(actual == Some(expected), || match actual {
            Some(actual) => format!("{message}: '{path}' expected {expected}, got {actual}"),
            None => format!("{message}: missing property '{path}'"),
        });
    }

    /// Record a custom failure
    pub fn fail(&self, message: impl Into<String>) {
        let message = message.into();
        self.check(false, || message);
    }

    /// Snapshot of all failures so far
    #[must_use]
    pub fn failures(&self) -> Vec<AssertionFailure> {
        self.ledger().failures.clone()
    }

    /// Get the number of failures
    #[must_use]
    pub fn failure_count(&self) -> usize {
        self.ledger().failures.len()
    }

    /// Get the total number of assertions checked
    #[must_use]
    pub fn assertion_count(&self) -> usize {
        self.ledger().assertion_count
    }

    /// Check if all assertions passed
    #[must_use]
    pub fn all_passed(&self) -> bool {
        self.ledger().failures.is_empty()
    }

    /// Verify all assertions passed, returning error if any failed
    pub fn verify(&self) -> Result<(), SoftAssertionError> {
        let ledger = self.ledger();
        if ledger.failures.is_empty() {
            Ok(())
        } else {
            Err(SoftAssertionError::new(&ledger.failures))
        }
    }

    /// Get a summary of the assertions
    #[must_use]
    pub fn summary(&self) -> AssertionSummary {
        let ledger = self.ledger();
        AssertionSummary {
            total: ledger.assertion_count,
            passed: ledger.assertion_count - ledger.failures.len(),
            failed: ledger.failures.len(),
        }
    }
}

/// Summary of assertion results
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AssertionSummary {
    /// Total assertions checked
    pub total: usize,
    /// Assertions that passed
    pub passed: usize,
    /// Assertions that failed
    pub failed: usize,
}

/// Error type for soft assertion failures
#[derive(Debug, Clone)]
pub struct SoftAssertionError {
    /// All failure messages
    pub failures: Vec<String>,
    /// Number of failed assertions
    pub count: usize,
}

impl SoftAssertionError {
    /// Create a new error from failures
    #[must_use]
    pub fn new(failures: &[AssertionFailure]) -> Self {
        Self {
            failures: failures.iter().map(|f| f.message.clone()).collect(),
            count: failures.len(),
        }
    }
}

impl std::fmt::Display for SoftAssertionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "{} soft assertion(s) failed:", self.count)?;
        for (i, failure) in self.failures.iter().enumerate() {
            writeln!(f, "  {}. {failure}", i + 1)?;
        }
        Ok(())
    }
}

impl std::error::Error for SoftAssertionError {}
