//! Run progress reporting

use std::sync::Mutex;

use gantry_core::RunSummary;

/// Events emitted while a run executes
#[derive(Debug, Clone)]
pub enum RunEvent {
    /// A run is starting
    RunStarted {
        units: usize,
        total: usize,
    },
    /// A whole unit was skipped because its type could not be resolved
    UnitSkipped {
        unit: String,
        error: String,
    },
    /// A test method passed
    TestPassed {
        unit: String,
        method: String,
    },
    /// A test method failed
    TestFailed {
        unit: String,
        method: String,
        error: String,
        /// True when the failure came from resolution, not the body
        resolution: bool,
    },
    /// Every tracked unit has been attempted
    RunCompleted {
        summary: RunSummary,
    },
}

/// Trait for reporting run progress
///
/// The runner degrades silently when the host installs nothing: the
/// default [`TracingReporter`] emits through `tracing`, which no-ops
/// without a subscriber.
pub trait TestReporter: Send + Sync {
    /// Handle a run event
    fn report(&self, event: &RunEvent);
}

/// Simple reporter that logs to tracing
#[derive(Debug, Default)]
pub struct TracingReporter;

impl TestReporter for TracingReporter {
    fn report(&self, event: &RunEvent) {
        match event {
            RunEvent::RunStarted { units, total } => {
                tracing::info!("Running {} test(s) across {} unit(s)", total, units);
            }
            RunEvent::UnitSkipped { unit, error } => {
                tracing::error!("Skipping {}: {}", unit, error);
            }
            RunEvent::TestPassed { unit, method } => {
                tracing::debug!("Test {} from {} was successful.", method, unit);
            }
            RunEvent::TestFailed {
                unit,
                method,
                error,
                resolution,
            } => {
                if *resolution {
                    tracing::error!("Failed to instantiate {} for test {}: {}", unit, method, error);
                } else {
                    tracing::error!("Test {} from {} threw an error: {}", method, unit, error);
                }
            }
            RunEvent::RunCompleted { summary } => {
                tracing::info!(
                    "Run complete: {}/{} succeeded, {} failed",
                    summary.succeeded,
                    summary.total,
                    summary.failed
                );
            }
        }
    }
}

/// Reporter that collects events for later inspection (useful for testing)
#[derive(Debug, Default)]
pub struct CollectingReporter {
    events: Mutex<Vec<RunEvent>>,
}

impl CollectingReporter {
    /// Get all collected events
    pub fn events(&self) -> Vec<RunEvent> {
        self.events.lock().map(|e| e.clone()).unwrap_or_default()
    }
}

impl TestReporter for CollectingReporter {
    fn report(&self, event: &RunEvent) {
        if let Ok(mut events) = self.events.lock() {
            events.push(event.clone());
        }
    }
}
