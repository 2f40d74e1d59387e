//! Service resolution contract consumed by the runner.
//!
//! The orchestration core never builds a container of its own; it only
//! queries something that satisfies [`ServiceResolver`]. Hosts may bring
//! any container that can answer by [`ServiceKey`], or use the type-map
//! provider in [`crate::provider`].

use std::any::{Any, TypeId};
use std::fmt;
use std::sync::Arc;

use crate::error::ResolveError;

/// Stable identifier for a resolvable service: a runtime type handle plus
/// the type's name for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ServiceKey {
    type_id: TypeId,
    name: &'static str,
}

impl ServiceKey {
    /// The key for service type `T`.
    pub fn of<T: 'static>() -> Self {
        Self {
            type_id: TypeId::of::<T>(),
            name: std::any::type_name::<T>(),
        }
    }

    /// The underlying type handle.
    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    /// The service's type name.
    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl fmt::Display for ServiceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

/// A type-erased, shared service instance.
pub type SharedService = Arc<dyn Any + Send + Sync>;

/// Read-only service lookup.
///
/// Implementations must be safe to query repeatedly; the runner performs
/// exactly one resolution at a time and never mutates registrations.
pub trait ServiceResolver: Send + Sync {
    /// Resolve the service identified by `key`.
    fn resolve(&self, key: &ServiceKey) -> Result<SharedService, ResolveError>;
}

impl dyn ServiceResolver + '_ {
    /// Typed convenience over [`ServiceResolver::resolve`].
    pub fn request<T: Send + Sync + 'static>(&self) -> Result<Arc<T>, ResolveError> {
        let key = ServiceKey::of::<T>();
        self.resolve(&key)?
            .downcast::<T>()
            .map_err(|_| ResolveError::TypeMismatch(key.name().to_string()))
    }
}
