//! Test outcome and result collection model

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::error::FailureCause;

/// Why an attempted test method failed.
///
/// A resolution failure means the owning unit never produced an instance,
/// so the method body was never called; an invocation failure means the
/// body ran and raised. Both keep the underlying cause in the chain.
#[derive(Debug, Clone, Error)]
pub enum TestFailure {
    /// The unit's type could not be instantiated through the resolver
    #[error("could not resolve an instance of {type_name}")]
    Resolution {
        type_name: String,
        #[source]
        source: FailureCause,
    },

    /// The test method raised an error or its completion faulted
    #[error("test method raised an error")]
    Invocation {
        #[source]
        source: FailureCause,
    },
}

impl TestFailure {
    /// The underlying cause, unwrapped from the failure kind.
    pub fn cause(&self) -> &FailureCause {
        match self {
            Self::Resolution { source, .. } | Self::Invocation { source } => source,
        }
    }

    /// Whether this failure came from service resolution rather than the
    /// test body itself.
    pub fn is_resolution(&self) -> bool {
        matches!(self, Self::Resolution { .. })
    }
}

/// The result of attempting one test method on one instantiated unit.
#[derive(Debug, Clone)]
pub struct TestOutcome {
    unit_name: String,
    method_name: String,
    failure: Option<TestFailure>,
}

impl TestOutcome {
    /// Record a passing attempt.
    pub fn passed(unit_name: impl Into<String>, method_name: impl Into<String>) -> Self {
        Self {
            unit_name: unit_name.into(),
            method_name: method_name.into(),
            failure: None,
        }
    }

    /// Record a failing attempt.
    pub fn failed(
        unit_name: impl Into<String>,
        method_name: impl Into<String>,
        failure: TestFailure,
    ) -> Self {
        Self {
            unit_name: unit_name.into(),
            method_name: method_name.into(),
            failure: Some(failure),
        }
    }

    /// Name of the type that owns the test method.
    pub fn unit_name(&self) -> &str {
        &self.unit_name
    }

    /// Name of the attempted method.
    pub fn method_name(&self) -> &str {
        &self.method_name
    }

    /// Whether the attempt succeeded.
    pub fn success(&self) -> bool {
        self.failure.is_none()
    }

    /// The captured failure, absent on success.
    pub fn failure(&self) -> Option<&TestFailure> {
        self.failure.as_ref()
    }
}

impl fmt::Display for TestOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.success() {
            write!(
                f,
                "Test {} from {} was successful.",
                self.method_name, self.unit_name
            )
        } else {
            write!(
                f,
                "Test {} from {} has failed.",
                self.method_name, self.unit_name
            )
        }
    }
}

/// Serializable counters for a completed (or in-flight) result set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSummary {
    /// Methods attempted, including those skipped by a resolution failure
    pub total: usize,
    /// Attempts that succeeded
    pub succeeded: usize,
    /// Attempts that failed; always `total - succeeded`
    pub failed: usize,
}

/// Ordered, append-only store of test outcomes with running counters.
#[derive(Debug, Clone, Default)]
pub struct ResultCollection {
    outcomes: Vec<TestOutcome>,
    succeeded: usize,
}

impl ResultCollection {
    /// Create an empty collection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one outcome, updating the counters.
    pub fn push(&mut self, outcome: TestOutcome) {
        if outcome.success() {
            self.succeeded += 1;
        }
        self.outcomes.push(outcome);
    }

    /// Append a batch of outcomes.
    pub fn extend(&mut self, outcomes: impl IntoIterator<Item = TestOutcome>) {
        for outcome in outcomes {
            self.push(outcome);
        }
    }

    /// Number of attempted methods recorded so far.
    pub fn count(&self) -> usize {
        self.outcomes.len()
    }

    /// Number of recorded successes.
    pub fn succeeded(&self) -> usize {
        self.succeeded
    }

    /// Number of recorded failures.
    pub fn failed(&self) -> usize {
        self.outcomes.len() - self.succeeded
    }

    /// Whether no outcome has been recorded.
    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }

    /// Iterate outcomes in the order they were recorded.
    pub fn iter(&self) -> std::slice::Iter<'_, TestOutcome> {
        self.outcomes.iter()
    }

    /// Snapshot the counters.
    pub fn summary(&self) -> RunSummary {
        RunSummary {
            total: self.count(),
            succeeded: self.succeeded(),
            failed: self.failed(),
        }
    }
}

impl<'a> IntoIterator for &'a ResultCollection {
    type Item = &'a TestOutcome;
    type IntoIter = std::slice::Iter<'a, TestOutcome>;

    fn into_iter(self) -> Self::IntoIter {
        self.outcomes.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::cause_from_anyhow;

    fn invocation_failure(msg: &str) -> TestFailure {
        TestFailure::Invocation {
            source: cause_from_anyhow(anyhow::anyhow!("{msg}")),
        }
    }

    #[test]
    fn counters_track_appends() {
        let mut col = ResultCollection::new();
        col.push(TestOutcome::passed("Alpha", "one"));
        col.push(TestOutcome::failed("Alpha", "two", invocation_failure("nope")));
        col.push(TestOutcome::passed("Beta", "three"));

        assert_eq!(col.count(), 3);
        assert_eq!(col.succeeded(), 2);
        assert_eq!(col.failed(), 1);
        assert_eq!(col.count(), col.succeeded() + col.failed());
    }

    #[test]
    fn iteration_preserves_insertion_order() {
        let mut col = ResultCollection::new();
        col.extend([
            TestOutcome::passed("Alpha", "one"),
            TestOutcome::passed("Beta", "two"),
        ]);

        let names: Vec<_> = col.iter().map(|o| o.method_name().to_string()).collect();
        assert_eq!(names, vec!["one", "two"]);
    }

    #[test]
    fn display_reports_pass_and_fail() {
        let pass = TestOutcome::passed("Alpha", "one");
        let fail = TestOutcome::failed("Alpha", "two", invocation_failure("boom"));
        assert_eq!(pass.to_string(), "Test one from Alpha was successful.");
        assert_eq!(fail.to_string(), "Test two from Alpha has failed.");
    }

    #[test]
    fn failure_cause_is_reachable() {
        let outcome = TestOutcome::failed("Alpha", "two", invocation_failure("boom"));
        let failure = outcome.failure().expect("failure captured");
        assert!(!failure.is_resolution());
        assert_eq!(failure.cause().to_string(), "boom");
    }

    #[test]
    fn summary_serializes() {
        let mut col = ResultCollection::new();
        col.push(TestOutcome::passed("Alpha", "one"));
        let json = serde_json::to_string(&col.summary()).expect("serializable");
        assert_eq!(json, r#"{"total":1,"succeeded":1,"failed":0}"#);
    }
}
