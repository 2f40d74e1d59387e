//! Type-map service container for hosts without their own.
//!
//! [`ServiceCollection`] is the bootstrap-time registration surface; it
//! builds into a [`ServiceProvider`] that answers [`ServiceResolver`]
//! queries. Instances registered with [`ServiceCollection::insert`] are
//! shared; [`ServiceCollection::provide`] registers a factory that is run
//! on every resolution and may pull its own dependencies back through the
//! resolver.

use std::any::TypeId;
use std::collections::HashMap;
use std::sync::Arc;

use crate::error::ResolveError;
use crate::resolver::{ServiceKey, ServiceResolver, SharedService};

type ServiceFactory =
    Box<dyn Fn(&dyn ServiceResolver) -> Result<SharedService, ResolveError> + Send + Sync>;

enum Registration {
    Instance(SharedService),
    Factory(ServiceFactory),
}

/// Mutable set of service registrations, consumed into a provider.
#[derive(Default)]
pub struct ServiceCollection {
    entries: HashMap<TypeId, Registration>,
}

impl ServiceCollection {
    /// Create an empty collection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a shared instance of `T`.
    pub fn insert<T: Send + Sync + 'static>(&mut self, value: T) -> &mut Self {
        self.entries
            .insert(TypeId::of::<T>(), Registration::Instance(Arc::new(value)));
        self
    }

    /// Register a factory for `T`, run once per resolution.
    pub fn provide<T, F>(&mut self, build: F) -> &mut Self
    where
        T: Send + Sync + 'static,
        F: Fn(&dyn ServiceResolver) -> Result<T, ResolveError> + Send + Sync + 'static,
    {
        let factory: ServiceFactory = Box::new(move |resolver| {
            build(resolver).map(|value| Arc::new(value) as SharedService)
        });
        self.entries
            .insert(TypeId::of::<T>(), Registration::Factory(factory));
        self
    }

    /// Whether a registration exists for `T`.
    pub fn contains<T: 'static>(&self) -> bool {
        self.entries.contains_key(&TypeId::of::<T>())
    }

    /// Number of registrations.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the collection is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Consume the registrations into an immutable provider.
    pub fn build(self) -> ServiceProvider {
        ServiceProvider {
            entries: self.entries,
        }
    }
}

/// Immutable resolver over a built [`ServiceCollection`].
pub struct ServiceProvider {
    entries: HashMap<TypeId, Registration>,
}

impl ServiceResolver for ServiceProvider {
    fn resolve(&self, key: &ServiceKey) -> Result<SharedService, ResolveError> {
        match self.entries.get(&key.type_id()) {
            None => {
                tracing::debug!("no registration for {key}");
                Err(ResolveError::NotRegistered(key.name().to_string()))
            }
            Some(Registration::Instance(service)) => Ok(service.clone()),
            Some(Registration::Factory(build)) => {
                build(self).map_err(|err| ResolveError::ConstructionFailed {
                    type_name: key.name().to_string(),
                    source: Arc::new(err),
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct Greeter {
        greeting: String,
    }

    #[derive(Debug)]
    struct Announcer {
        greeter: Arc<Greeter>,
    }

    #[test]
    fn insert_and_resolve_shared_instance() {
        let mut services = ServiceCollection::new();
        services.insert(Greeter {
            greeting: "hello".to_string(),
        });
        let provider = services.build();
        let resolver: &dyn ServiceResolver = &provider;

        let greeter = resolver.request::<Greeter>().expect("registered");
        assert_eq!(greeter.greeting, "hello");
    }

    #[test]
    fn factories_pull_their_dependencies() {
        let mut services = ServiceCollection::new();
        services.insert(Greeter {
            greeting: "hello".to_string(),
        });
        services.provide(|resolver| {
            Ok(Announcer {
                greeter: resolver.request::<Greeter>()?,
            })
        });
        let provider = services.build();
        let resolver: &dyn ServiceResolver = &provider;

        let announcer = resolver.request::<Announcer>().expect("registered");
        assert_eq!(announcer.greeter.greeting, "hello");
    }

    #[test]
    fn factory_dependency_failure_keeps_the_cause() {
        let mut services = ServiceCollection::new();
        services.provide(|resolver| {
            Ok(Announcer {
                greeter: resolver.request::<Greeter>()?,
            })
        });
        let provider = services.build();
        let resolver: &dyn ServiceResolver = &provider;

        let err = resolver.request::<Announcer>().expect_err("greeter missing");
        match err {
            ResolveError::ConstructionFailed { source, .. } => {
                assert!(source.to_string().contains("Greeter"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn unregistered_type_is_reported_by_name() {
        let provider = ServiceCollection::new().build();
        let resolver: &dyn ServiceResolver = &provider;
        let err = resolver.request::<Greeter>().expect_err("empty provider");
        assert!(err.to_string().contains("Greeter"));
    }

    #[test]
    fn later_registrations_replace_earlier_ones() {
        let mut services = ServiceCollection::new();
        services.insert(Greeter {
            greeting: "first".to_string(),
        });
        services.insert(Greeter {
            greeting: "second".to_string(),
        });
        assert_eq!(services.len(), 1);

        let provider = services.build();
        let resolver: &dyn ServiceResolver = &provider;
        let greeter = resolver.request::<Greeter>().expect("registered");
        assert_eq!(greeter.greeting, "second");
    }
}
