//! Gantry - Dependency-injection-aware test orchestration
//!
//! This crate provides the orchestration pipeline: hosts register their
//! test-bearing types in a [`TestUniverse`], the [`Discoverer`] qualifies
//! them into test units, and a [`Runner`] resolves each unit through a
//! service resolver and invokes its methods, sync or async alike,
//! aggregating every outcome. The [`Gantry`] facade wires the whole
//! session together for the common case.

pub mod discovery;
pub mod invoker;
pub mod orchestrator;
pub mod reporter;
pub mod runner;
pub mod suite;

pub use discovery::{Discoverer, DiscoveryFilter};
pub use invoker::invoke;
pub use orchestrator::{Gantry, GantryBuilder};
pub use reporter::{CollectingReporter, RunEvent, TestReporter, TracingReporter};
pub use runner::{Runner, RunnerState};
pub use suite::{
    MethodDescriptor, ReturnShape, Suite, SuiteRegistration, TestMethod, TestSuite, TestUnit,
    TestUniverse,
};

pub use gantry_core::{
    DiscoveryError, FailureCause, GantryError, ResolveError, Result, ResultCollection,
    RunSummary, RunnerError, ServiceCollection, ServiceKey, ServiceProvider, ServiceResolver,
    TestFailure, TestOutcome,
};
