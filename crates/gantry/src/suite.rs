//! Test suite registration model
//!
//! Hosts enumerate their test-bearing types explicitly: each type opts into
//! the [`TestSuite`] capability marker, is described by a [`Suite`] builder
//! (factory plus callables), and lands in a [`TestUniverse`] — the
//! registration list the discoverer inspects in place of runtime type
//! enumeration.

use std::any::Any;
use std::cmp::Ordering;
use std::fmt;
use std::marker::PhantomData;

use futures::future::BoxFuture;
use serde::{Deserialize, Serialize};

use gantry_core::{ResolveError, ServiceResolver};

/// Capability marker a host type opts into to be discoverable.
///
/// Purely a tag; it carries no behavior.
pub trait TestSuite: Any + Send {}

/// Declared return shape of a registered test callable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReturnShape {
    /// Returns no value
    Unit,
    /// Completes synchronously with a result
    Sync,
    /// Completes asynchronously with a result
    Async,
}

/// Identifies one qualifying method on a test-bearing type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodDescriptor {
    name: String,
    shape: ReturnShape,
}

impl MethodDescriptor {
    pub(crate) fn new(name: impl Into<String>, shape: ReturnShape) -> Self {
        Self {
            name: name.into(),
            shape,
        }
    }

    /// Name of the method.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declared return shape.
    pub fn shape(&self) -> ReturnShape {
        self.shape
    }

    /// Number of parameters the callable takes beyond its receiver.
    /// Always zero; only parameterless callables can be registered.
    pub fn arity(&self) -> usize {
        0
    }
}

impl fmt::Display for MethodDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

pub(crate) type SyncBody =
    Box<dyn Fn(&mut (dyn Any + Send)) -> anyhow::Result<()> + Send + Sync>;

pub(crate) type AsyncBody = Box<
    dyn for<'a> Fn(&'a mut (dyn Any + Send)) -> BoxFuture<'a, anyhow::Result<()>> + Send + Sync,
>;

/// Type-erased callable behind a registered method.
pub(crate) enum MethodBody {
    Sync(SyncBody),
    Async(AsyncBody),
}

/// One qualifying method: its descriptor plus the erased callable.
pub struct TestMethod {
    descriptor: MethodDescriptor,
    pub(crate) body: MethodBody,
}

impl TestMethod {
    /// The method's descriptor.
    pub fn descriptor(&self) -> &MethodDescriptor {
        &self.descriptor
    }

    /// The method's name.
    pub fn name(&self) -> &str {
        self.descriptor.name()
    }
}

impl fmt::Debug for TestMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TestMethod")
            .field("descriptor", &self.descriptor)
            .finish_non_exhaustive()
    }
}

pub(crate) type UnitFactory = Box<
    dyn Fn(&dyn ServiceResolver) -> Result<Box<dyn Any + Send>, ResolveError> + Send + Sync,
>;

/// One test-bearing type with its ordered qualifying methods.
///
/// Built by the discoverer, owned by the runner. Method order is the
/// registration order until explicitly re-sorted, and units are sealed
/// once a run begins (the runner guards mutation by state).
pub struct TestUnit {
    type_name: String,
    factory: UnitFactory,
    methods: Vec<TestMethod>,
}

impl TestUnit {
    pub(crate) fn new(type_name: String, factory: UnitFactory, methods: Vec<TestMethod>) -> Self {
        Self {
            type_name,
            factory,
            methods,
        }
    }

    /// Name of the test-bearing type.
    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    /// Qualifying methods in their current order.
    pub fn methods(&self) -> &[TestMethod] {
        &self.methods
    }

    /// Number of qualifying methods.
    pub fn method_count(&self) -> usize {
        self.methods.len()
    }

    /// Produce a live instance through the resolver.
    pub(crate) fn instantiate(
        &self,
        resolver: &dyn ServiceResolver,
    ) -> Result<Box<dyn Any + Send>, ResolveError> {
        (self.factory)(resolver)
    }

    pub(crate) fn sort_methods(&mut self, compare: &dyn Fn(&str, &str) -> Ordering) {
        self.methods
            .sort_by(|a, b| compare(a.name(), b.name()));
    }
}

impl fmt::Debug for TestUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TestUnit")
            .field("type_name", &self.type_name)
            .field("methods", &self.methods)
            .finish_non_exhaustive()
    }
}

/// Builder describing one test-bearing type `T`.
///
/// The factory stands in for "a constructor the resolver can satisfy":
/// it receives the resolver and pulls whatever dependencies `T` needs.
/// Methods collect in declaration order.
pub struct Suite<T: TestSuite> {
    type_name: String,
    factory: Option<UnitFactory>,
    methods: Vec<TestMethod>,
    _marker: PhantomData<fn(T)>,
}

impl<T: TestSuite> Suite<T> {
    /// Start describing test type `T` under the given display name.
    pub fn new(type_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            factory: None,
            methods: Vec::new(),
            _marker: PhantomData,
        }
    }

    /// Register the factory that instantiates `T` through the resolver.
    pub fn factory<F>(mut self, build: F) -> Self
    where
        F: Fn(&dyn ServiceResolver) -> Result<T, ResolveError> + Send + Sync + 'static,
    {
        self.factory = Some(Box::new(move |resolver| {
            build(resolver).map(|unit| Box::new(unit) as Box<dyn Any + Send>)
        }));
        self
    }

    /// Register a callable that returns no value.
    pub fn method<F>(self, name: impl Into<String>, call: F) -> Self
    where
        F: Fn(&mut T) + Send + Sync + 'static,
    {
        self.push_sync(name, ReturnShape::Unit, move |unit| {
            call(unit);
            Ok(())
        })
    }

    /// Register a callable that completes synchronously with a result.
    pub fn try_method<F>(self, name: impl Into<String>, call: F) -> Self
    where
        F: Fn(&mut T) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        self.push_sync(name, ReturnShape::Sync, call)
    }

    /// Register a callable that completes asynchronously.
    pub fn async_method<F>(mut self, name: impl Into<String>, call: F) -> Self
    where
        F: for<'a> Fn(&'a mut T) -> BoxFuture<'a, anyhow::Result<()>> + Send + Sync + 'static,
    {
        let body: AsyncBody = Box::new(
            move |instance: &mut (dyn Any + Send)| -> BoxFuture<'_, anyhow::Result<()>> {
                match instance.downcast_mut::<T>() {
                    Some(unit) => call(unit),
                    None => Box::pin(futures::future::ready(Err(type_mismatch::<T>()))),
                }
            },
        );
        self.methods.push(TestMethod {
            descriptor: MethodDescriptor::new(name, ReturnShape::Async),
            body: MethodBody::Async(body),
        });
        self
    }

    fn push_sync<F>(mut self, name: impl Into<String>, shape: ReturnShape, call: F) -> Self
    where
        F: Fn(&mut T) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        let body: SyncBody = Box::new(move |instance: &mut (dyn Any + Send)| {
            match instance.downcast_mut::<T>() {
                Some(unit) => call(unit),
                None => Err(type_mismatch::<T>()),
            }
        });
        self.methods.push(TestMethod {
            descriptor: MethodDescriptor::new(name, shape),
            body: MethodBody::Sync(body),
        });
        self
    }

    pub(crate) fn into_registration(self) -> SuiteRegistration {
        SuiteRegistration {
            type_name: self.type_name,
            factory: self.factory,
            methods: self.methods,
        }
    }
}

fn type_mismatch<T>() -> anyhow::Error {
    anyhow::anyhow!(
        "resolved instance is not a {}",
        std::any::type_name::<T>()
    )
}

/// A registered suite before discovery has qualified it.
pub struct SuiteRegistration {
    pub(crate) type_name: String,
    pub(crate) factory: Option<UnitFactory>,
    pub(crate) methods: Vec<TestMethod>,
}

impl SuiteRegistration {
    /// Display name of the registered type.
    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    /// Whether a factory was registered for the type.
    pub fn is_instantiable(&self) -> bool {
        self.factory.is_some()
    }
}

/// The host-authored universe of suite registrations.
#[derive(Default)]
pub struct TestUniverse {
    registrations: Vec<SuiteRegistration>,
}

impl TestUniverse {
    /// Create an empty universe.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a suite, builder-style.
    pub fn with<T: TestSuite>(mut self, suite: Suite<T>) -> Self {
        self.add(suite);
        self
    }

    /// Append a suite.
    pub fn add<T: TestSuite>(&mut self, suite: Suite<T>) {
        self.registrations.push(suite.into_registration());
    }

    /// Number of registered suites.
    pub fn len(&self) -> usize {
        self.registrations.len()
    }

    /// Whether no suite has been registered.
    pub fn is_empty(&self) -> bool {
        self.registrations.is_empty()
    }

    pub(crate) fn into_registrations(self) -> Vec<SuiteRegistration> {
        self.registrations
    }
}
