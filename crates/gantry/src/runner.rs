//! Runner state machine
//!
//! The runner owns the discovered test units and drives the whole
//! pipeline: resolve an instance per unit, invoke each qualifying method,
//! append every outcome. Units and methods execute strictly sequentially
//! so result order is deterministic; the only suspension points are the
//! awaited asynchronous test bodies inside the invoker.

use std::cmp::Ordering;
use std::sync::Arc;

use gantry_core::{
    FailureCause, ResultCollection, Result, RunnerError, ServiceResolver, TestFailure,
    TestOutcome,
};

use crate::invoker;
use crate::reporter::{RunEvent, TestReporter, TracingReporter};
use crate::suite::TestUnit;

/// Lifecycle of a runner. Transitions are monotonic:
/// `NotStarted → Running → Completed`, never back.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunnerState {
    NotStarted,
    Running,
    Completed,
}

/// Drives test units through resolution, invocation, and aggregation.
pub struct Runner {
    state: RunnerState,
    units: Vec<TestUnit>,
    results: ResultCollection,
    total: usize,
    resolver: Option<Arc<dyn ServiceResolver>>,
    throw_on_fail: bool,
    reporter: Arc<dyn TestReporter>,
}

impl Runner {
    /// Create a runner reporting through tracing.
    ///
    /// With `throw_on_fail` set, the first captured failure aborts the run
    /// after being recorded and is re-raised to the caller.
    pub fn new(throw_on_fail: bool) -> Self {
        Self::with_reporter(throw_on_fail, Arc::new(TracingReporter))
    }

    /// Create a runner with an explicit reporter.
    pub fn with_reporter(throw_on_fail: bool, reporter: Arc<dyn TestReporter>) -> Self {
        Self {
            state: RunnerState::NotStarted,
            units: Vec::new(),
            results: ResultCollection::new(),
            total: 0,
            resolver: None,
            throw_on_fail,
            reporter,
        }
    }

    /// Attach the resolver used to instantiate test units.
    pub fn attach_resolver(&mut self, resolver: Arc<dyn ServiceResolver>) {
        self.resolver = Some(resolver);
    }

    /// Replace the tracked units and recompute the total method count.
    /// An empty input clears tracking. Ignored once a run has begun.
    pub fn add_test_units(&mut self, units: Vec<TestUnit>) {
        if self.state != RunnerState::NotStarted {
            tracing::warn!("test units cannot change once a run has begun");
            return;
        }
        self.total = units.iter().map(TestUnit::method_count).sum();
        self.units = units;
    }

    /// Reorder tracked units by type name. Ignored once a run has begun.
    pub fn sort_test_units<F>(&mut self, compare: F)
    where
        F: Fn(&str, &str) -> Ordering,
    {
        if self.state != RunnerState::NotStarted {
            tracing::warn!("unit order cannot change once a run has begun");
            return;
        }
        self.units
            .sort_by(|a, b| compare(a.type_name(), b.type_name()));
    }

    /// Reorder each unit's methods by name. Ignored once a run has begun.
    pub fn sort_test_methods<F>(&mut self, compare: F)
    where
        F: Fn(&str, &str) -> Ordering,
    {
        if self.state != RunnerState::NotStarted {
            tracing::warn!("method order cannot change once a run has begun");
            return;
        }
        for unit in &mut self.units {
            unit.sort_methods(&compare);
        }
    }

    /// Run every tracked unit, appending one outcome per attempted method.
    ///
    /// Returns immediately without starting when no resolver is attached,
    /// or when a run has already begun: state only ever moves forward and
    /// recorded outcomes are final.
    /// A unit whose type cannot be resolved is skipped as a block: one
    /// failing outcome is synthesized per qualifying method and the run
    /// moves on to the next unit. With `log_each_failure`, each failing
    /// outcome emits one reporter record. In throw-on-fail mode the first
    /// captured failure aborts the run; the state still advances to
    /// `Completed` with the partial results recorded before the failure is
    /// re-raised.
    pub async fn run(&mut self, log_each_failure: bool) -> Result<()> {
        if self.state != RunnerState::NotStarted {
            tracing::warn!("run requested more than once; results are already final");
            return Ok(());
        }
        let Some(resolver) = self.resolver.clone() else {
            tracing::warn!("run requested without an attached resolver; nothing to do");
            return Ok(());
        };

        self.state = RunnerState::Running;
        self.reporter.report(&RunEvent::RunStarted {
            units: self.units.len(),
            total: self.total,
        });

        let units = std::mem::take(&mut self.units);
        let mut abort: Option<RunnerError> = None;

        'units: for unit in &units {
            let mut instance = match unit.instantiate(resolver.as_ref()) {
                Ok(instance) => instance,
                Err(err) => {
                    let cause: FailureCause = Arc::new(err);
                    self.reporter.report(&RunEvent::UnitSkipped {
                        unit: unit.type_name().to_string(),
                        error: cause.to_string(),
                    });
                    // The whole unit is skipped as a block; every method
                    // gets a synthesized outcome before any abort.
                    for method in unit.methods() {
                        if log_each_failure {
                            self.reporter.report(&RunEvent::TestFailed {
                                unit: unit.type_name().to_string(),
                                method: method.name().to_string(),
                                error: cause.to_string(),
                                resolution: true,
                            });
                        }
                        if self.throw_on_fail && abort.is_none() {
                            abort = Some(RunnerError::Aborted {
                                unit: unit.type_name().to_string(),
                                method: method.name().to_string(),
                                source: cause.clone(),
                            });
                        }
                        self.results.push(TestOutcome::failed(
                            unit.type_name(),
                            method.name(),
                            TestFailure::Resolution {
                                type_name: unit.type_name().to_string(),
                                source: cause.clone(),
                            },
                        ));
                    }
                    if abort.is_some() {
                        break 'units;
                    }
                    continue;
                }
            };

            for method in unit.methods() {
                let outcome = invoker::invoke(unit.type_name(), method, instance.as_mut()).await;
                match outcome.failure() {
                    Some(failure) => {
                        if log_each_failure {
                            self.reporter.report(&RunEvent::TestFailed {
                                unit: unit.type_name().to_string(),
                                method: method.name().to_string(),
                                error: failure.cause().to_string(),
                                resolution: false,
                            });
                        }
                        if self.throw_on_fail && abort.is_none() {
                            abort = Some(RunnerError::Aborted {
                                unit: unit.type_name().to_string(),
                                method: method.name().to_string(),
                                source: failure.cause().clone(),
                            });
                        }
                    }
                    None => {
                        self.reporter.report(&RunEvent::TestPassed {
                            unit: unit.type_name().to_string(),
                            method: method.name().to_string(),
                        });
                    }
                }
                self.results.push(outcome);
                if abort.is_some() {
                    break 'units;
                }
            }
        }

        self.units = units;
        self.state = RunnerState::Completed;
        self.reporter.report(&RunEvent::RunCompleted {
            summary: self.results.summary(),
        });

        match abort {
            Some(err) => Err(err.into()),
            None => Ok(()),
        }
    }

    /// Run with per-failure logging enabled.
    pub async fn run_logged(&mut self) -> Result<()> {
        self.run(true).await
    }

    /// The recorded outcomes; available only once the run has completed.
    pub fn results(&self) -> Result<&ResultCollection> {
        if self.state != RunnerState::Completed {
            return Err(RunnerError::ResultsNotReady.into());
        }
        Ok(&self.results)
    }

    /// How many attempts succeeded; gated on completion.
    pub fn successful(&self) -> Result<usize> {
        if self.state != RunnerState::Completed {
            return Err(RunnerError::PropertyNotReady("successful").into());
        }
        Ok(self.results.succeeded())
    }

    /// How many attempts failed (attempted minus successful); gated on
    /// completion.
    pub fn failed(&self) -> Result<usize> {
        if self.state != RunnerState::Completed {
            return Err(RunnerError::PropertyNotReady("failed").into());
        }
        Ok(self.results.count() - self.results.succeeded())
    }

    /// Sum of qualifying method counts across tracked units. Always
    /// readable, before or after the run.
    pub fn total(&self) -> usize {
        self.total
    }

    /// Current lifecycle state.
    pub fn state(&self) -> RunnerState {
        self.state
    }
}
