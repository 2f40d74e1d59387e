//! Gantry Core - Data model for the Gantry test orchestrator
//!
//! This crate provides the foundational types shared by the orchestration
//! engine and its hosts: the error taxonomy, the test outcome and result
//! collection model, the service resolution contract, and a small type-map
//! service provider for hosts that do not bring their own container.

pub mod error;
pub mod outcome;
pub mod provider;
pub mod resolver;

pub use error::{
    cause_from_anyhow, DiscoveryError, FailureCause, GantryError, ResolveError, Result,
    RunnerError,
};
pub use outcome::{ResultCollection, RunSummary, TestFailure, TestOutcome};
pub use provider::{ServiceCollection, ServiceProvider};
pub use resolver::{ServiceKey, ServiceResolver, SharedService};
