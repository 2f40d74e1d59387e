//! Discovery of test units from a host-authored universe

use gantry_core::DiscoveryError;

use crate::suite::{MethodDescriptor, TestUnit, TestUniverse};

type TypePredicate = Box<dyn Fn(&str) -> bool + Send + Sync>;
type MethodPredicate = Box<dyn Fn(&MethodDescriptor) -> bool + Send + Sync>;

/// Host-supplied qualification predicates; allow-all by default.
#[derive(Default)]
pub struct DiscoveryFilter {
    type_predicate: Option<TypePredicate>,
    method_predicate: Option<MethodPredicate>,
}

impl DiscoveryFilter {
    /// A filter that admits every registration.
    pub fn allow_all() -> Self {
        Self::default()
    }

    /// Restrict which type names qualify as test types.
    pub fn types<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&str) -> bool + Send + Sync + 'static,
    {
        self.type_predicate = Some(Box::new(predicate));
        self
    }

    /// Restrict which methods qualify as test methods.
    pub fn methods<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&MethodDescriptor) -> bool + Send + Sync + 'static,
    {
        self.method_predicate = Some(Box::new(predicate));
        self
    }

    fn admits_type(&self, type_name: &str) -> bool {
        self.type_predicate.as_ref().map_or(true, |p| p(type_name))
    }

    fn admits_method(&self, descriptor: &MethodDescriptor) -> bool {
        self.method_predicate.as_ref().map_or(true, |p| p(descriptor))
    }
}

/// Selects qualifying test units out of a [`TestUniverse`].
///
/// A registration qualifies as a test type when a factory is present (the
/// type is concretely instantiable) and the host's type predicate admits
/// it; the capability marker holds by construction. Methods are already
/// parameterless and one of the three return shapes, so qualification is
/// the host's method predicate alone. A type whose methods are all
/// filtered out still yields a unit with an empty method list.
#[derive(Default)]
pub struct Discoverer {
    filter: DiscoveryFilter,
}

impl Discoverer {
    /// Create a discoverer with the given filter.
    pub fn new(filter: DiscoveryFilter) -> Self {
        Self { filter }
    }

    /// Inspect the universe and produce the qualifying test units.
    ///
    /// Fails when the host could not supply a universe at all.
    pub fn discover(&self, universe: Option<TestUniverse>) -> Result<Vec<TestUnit>, DiscoveryError> {
        let universe = universe.ok_or_else(|| {
            DiscoveryError::Unavailable("the host supplied no test registrations".to_string())
        })?;

        let mut units = Vec::new();
        for registration in universe.into_registrations() {
            if !self.filter.admits_type(registration.type_name()) {
                tracing::debug!("type {} filtered out", registration.type_name());
                continue;
            }
            let Some(factory) = registration.factory else {
                tracing::debug!(
                    "type {} has no factory and cannot be instantiated",
                    registration.type_name
                );
                continue;
            };

            let methods = registration
                .methods
                .into_iter()
                .filter(|m| self.filter.admits_method(m.descriptor()))
                .collect();

            units.push(TestUnit::new(registration.type_name, factory, methods));
        }

        tracing::debug!("discovered {} test unit(s)", units.len());
        Ok(units)
    }
}
