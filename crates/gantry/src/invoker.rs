//! Uniform execution of sync and async test callables
//!
//! The invoker makes exactly one call per invocation and never fails
//! itself: every error, fault, or panic is captured into the returned
//! [`TestOutcome`]. It performs no logging; the runner reports, keyed off
//! the outcome.

use std::any::Any;
use std::panic::{catch_unwind, AssertUnwindSafe};

use futures::FutureExt;

use gantry_core::{cause_from_anyhow, TestFailure, TestOutcome};

use crate::suite::{MethodBody, TestMethod};

/// Run one test method against a live instance.
///
/// Synchronous bodies are called directly; asynchronous bodies are awaited
/// to completion — the only suspension point in a run. A faulted completion
/// is unwrapped to its underlying error, and a panic is converted into an
/// error carrying the panic message.
pub async fn invoke(
    unit_name: &str,
    method: &TestMethod,
    instance: &mut (dyn Any + Send),
) -> TestOutcome {
    let called = match &method.body {
        MethodBody::Sync(body) => {
            catch_unwind(AssertUnwindSafe(|| body(instance)))
                .unwrap_or_else(|payload| Err(panic_error(payload)))
        }
        MethodBody::Async(body) => AssertUnwindSafe(body(instance))
            .catch_unwind()
            .await
            .unwrap_or_else(|payload| Err(panic_error(payload))),
    };

    match called {
        Ok(()) => TestOutcome::passed(unit_name, method.name()),
        Err(err) => TestOutcome::failed(
            unit_name,
            method.name(),
            TestFailure::Invocation {
                source: cause_from_anyhow(err),
            },
        ),
    }
}

fn panic_error(payload: Box<dyn Any + Send>) -> anyhow::Error {
    let message = payload
        .downcast_ref::<&str>()
        .map(|s| (*s).to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "opaque panic payload".to_string());
    anyhow::anyhow!("test panicked: {message}")
}
