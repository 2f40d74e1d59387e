//! Error types for Gantry

use std::sync::Arc;
use thiserror::Error;

/// Result type alias using GantryError
pub type Result<T> = std::result::Result<T, GantryError>;

/// Shared, cloneable error cause attached to failures and outcomes.
///
/// Causes are reference-counted so a failure can live inside a recorded
/// outcome and still be re-raised to the caller in throw-on-fail mode.
pub type FailureCause = Arc<dyn std::error::Error + Send + Sync + 'static>;

/// Convert an `anyhow::Error` into a shared failure cause.
pub fn cause_from_anyhow(err: anyhow::Error) -> FailureCause {
    Arc::from(Box::<dyn std::error::Error + Send + Sync>::from(err))
}

/// Main error type for Gantry operations
#[derive(Debug, Error)]
pub enum GantryError {
    /// Discovery-related errors
    #[error(transparent)]
    Discovery(#[from] DiscoveryError),

    /// Service-resolution errors
    #[error(transparent)]
    Resolve(#[from] ResolveError),

    /// Runner lifecycle errors
    #[error(transparent)]
    Runner(#[from] RunnerError),
}

/// Errors raised while discovering test units
#[derive(Debug, Error)]
pub enum DiscoveryError {
    /// The host supplied no inspectable universe of test registrations
    #[error("no test universe is available for inspection: {0}")]
    Unavailable(String),
}

/// Errors raised by a service resolver
#[derive(Debug, Error)]
pub enum ResolveError {
    /// No registration exists for the requested service
    #[error("no registration found for service {0}")]
    NotRegistered(String),

    /// A registration exists but constructing the service failed
    #[error("failed to construct service {type_name}")]
    ConstructionFailed {
        type_name: String,
        #[source]
        source: FailureCause,
    },

    /// A registration produced a value of an unexpected type
    #[error("registration for {0} produced a value of the wrong type")]
    TypeMismatch(String),
}

/// Runner and facade lifecycle errors
#[derive(Debug, Error)]
pub enum RunnerError {
    /// Results were requested before the run completed
    #[error("results are not available until the run has completed")]
    ResultsNotReady,

    /// A completion-gated property was read before the run completed
    #[error("property `{0}` is not available until the run has completed")]
    PropertyNotReady(&'static str),

    /// The facade was queried before its start operation ran
    #[error("the orchestrator has not been started")]
    NotStarted,

    /// Throw-on-fail aborted the run; partial results were recorded first
    #[error("test `{method}` from `{unit}` failed")]
    Aborted {
        unit: String,
        method: String,
        #[source]
        source: FailureCause,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_error_preserves_cause_chain() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "socket missing");
        let err = ResolveError::ConstructionFailed {
            type_name: "Database".to_string(),
            source: Arc::new(io),
        };
        let source = std::error::Error::source(&err).expect("cause retained");
        assert!(source.to_string().contains("socket missing"));
    }

    #[test]
    fn cause_from_anyhow_keeps_message() {
        let cause = cause_from_anyhow(anyhow::anyhow!("broken pipe"));
        assert_eq!(cause.to_string(), "broken pipe");
    }

    #[test]
    fn property_not_ready_names_the_property() {
        let err = RunnerError::PropertyNotReady("successful");
        assert!(err.to_string().contains("successful"));
    }
}
