//! Host-facing facade
//!
//! [`Gantry`] wires a host's bootstrap step (service registrations plus a
//! test universe) to a [`Runner`]: starting it performs discovery, builds
//! the service provider, attaches it to a fresh runner, and hands the
//! runner to the host. Resources are released on [`Gantry::dispose`] and,
//! failing that, on drop.

use std::sync::Arc;

use futures::future::BoxFuture;

use gantry_core::{
    ResultCollection, Result, RunnerError, ServiceCollection, ServiceProvider, ServiceResolver,
};

use crate::discovery::{Discoverer, DiscoveryFilter};
use crate::reporter::{TestReporter, TracingReporter};
use crate::runner::Runner;
use crate::suite::TestUniverse;

type ConfigureFn = Box<dyn FnOnce(&mut ServiceCollection) + Send>;

/// Configures and constructs a [`Gantry`].
pub struct GantryBuilder {
    configure: Option<ConfigureFn>,
    universe: Option<TestUniverse>,
    filter: DiscoveryFilter,
    throw_on_fail: bool,
    reporter: Arc<dyn TestReporter>,
}

impl Default for GantryBuilder {
    fn default() -> Self {
        Self {
            configure: None,
            universe: None,
            filter: DiscoveryFilter::allow_all(),
            throw_on_fail: false,
            reporter: Arc::new(TracingReporter),
        }
    }
}

impl GantryBuilder {
    /// Host bootstrap delegate run against the service collection at start.
    pub fn configure<F>(mut self, configure: F) -> Self
    where
        F: FnOnce(&mut ServiceCollection) + Send + 'static,
    {
        self.configure = Some(Box::new(configure));
        self
    }

    /// The universe of test registrations to discover from.
    pub fn universe(mut self, universe: TestUniverse) -> Self {
        self.universe = Some(universe);
        self
    }

    /// Qualification predicates applied during discovery.
    pub fn filter(mut self, filter: DiscoveryFilter) -> Self {
        self.filter = filter;
        self
    }

    /// Re-raise the first captured failure instead of running to the end.
    pub fn throw_on_fail(mut self, throw_on_fail: bool) -> Self {
        self.throw_on_fail = throw_on_fail;
        self
    }

    /// Replace the default tracing reporter.
    pub fn reporter(mut self, reporter: Arc<dyn TestReporter>) -> Self {
        self.reporter = reporter;
        self
    }

    /// Build the facade. Nothing is discovered or resolved until start.
    pub fn build(self) -> Gantry {
        Gantry {
            configure: self.configure,
            universe: self.universe,
            filter: self.filter,
            throw_on_fail: self.throw_on_fail,
            reporter: self.reporter,
            provider: None,
            runner: None,
            started: false,
            disposed: false,
        }
    }
}

/// Facade owning the provider and runner on behalf of the host.
pub struct Gantry {
    configure: Option<ConfigureFn>,
    universe: Option<TestUniverse>,
    filter: DiscoveryFilter,
    throw_on_fail: bool,
    reporter: Arc<dyn TestReporter>,
    provider: Option<Arc<ServiceProvider>>,
    runner: Option<Runner>,
    started: bool,
    disposed: bool,
}

impl Gantry {
    /// Start configuring a new facade.
    pub fn builder() -> GantryBuilder {
        GantryBuilder::default()
    }

    /// Discover, bootstrap, and hand the wired runner to the host.
    ///
    /// Fails with a discovery error when no universe was supplied. The
    /// callback owns the rest of the session; `start_and_run` covers the
    /// common case.
    pub async fn start<F>(&mut self, on_ready: F) -> Result<()>
    where
        F: for<'a> FnOnce(&'a mut Runner) -> BoxFuture<'a, Result<()>>,
    {
        let units = Discoverer::new(std::mem::take(&mut self.filter))
            .discover(self.universe.take())?;

        let mut services = ServiceCollection::new();
        if let Some(configure) = self.configure.take() {
            configure(&mut services);
        }
        let provider = Arc::new(services.build());

        let mut runner = Runner::with_reporter(self.throw_on_fail, self.reporter.clone());
        runner.attach_resolver(provider.clone());
        runner.add_test_units(units);

        self.provider = Some(provider);
        self.started = true;
        let runner = self.runner.insert(runner);

        on_ready(runner).await
    }

    /// Start and immediately run every discovered test with logging.
    pub async fn start_and_run(&mut self) -> Result<()> {
        fn run_all(runner: &mut Runner) -> BoxFuture<'_, Result<()>> {
            Box::pin(runner.run_logged())
        }
        self.start(run_all).await
    }

    /// Results of the completed run.
    ///
    /// Fails when the facade was never started, or when the runner has not
    /// completed yet.
    pub fn results(&self) -> Result<&ResultCollection> {
        if !self.started {
            return Err(RunnerError::NotStarted.into());
        }
        let runner = self
            .runner
            .as_ref()
            .ok_or(RunnerError::NotStarted)?;
        runner.results()
    }

    /// The runner, once started. Useful for counters and sorting between
    /// start and run when driving the session manually.
    pub fn runner(&mut self) -> Option<&mut Runner> {
        self.runner.as_mut()
    }

    /// Resolve a host service for convenience; `None` before start or when
    /// the service is unregistered.
    pub fn request_service<T: Send + Sync + 'static>(&self) -> Option<Arc<T>> {
        let provider = self.provider.as_ref()?;
        let resolver: &dyn ServiceResolver = provider.as_ref();
        resolver.request::<T>().ok()
    }

    /// Release the provider, runner, and any pending registrations.
    /// Safe to call repeatedly; also invoked on drop.
    pub fn dispose(&mut self) {
        if self.disposed {
            return;
        }
        self.runner = None;
        self.provider = None;
        self.configure = None;
        self.universe = None;
        self.disposed = true;
        tracing::debug!("gantry disposed");
    }
}

impl Drop for Gantry {
    fn drop(&mut self) {
        self.dispose();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::suite::{Suite, TestSuite, TestUniverse};
    use gantry_core::{DiscoveryError, GantryError};
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct Clicker;

    impl TestSuite for Clicker {}

    struct ClickCounter {
        clicks: AtomicUsize,
    }

    impl ClickCounter {
        fn click(&self) {
            self.clicks.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn clicker_universe() -> TestUniverse {
        TestUniverse::new().with(
            Suite::<Clicker>::new("Clicker")
                .factory(|r| {
                    r.request::<ClickCounter>()?;
                    Ok(Clicker)
                })
                .try_method("click_once", |_| Ok(()))
                .method("noop", |_| {}),
        )
    }

    #[tokio::test]
    async fn start_and_run_completes_and_exposes_results() {
        let mut gantry = Gantry::builder()
            .configure(|services| {
                services.insert(ClickCounter {
                    clicks: AtomicUsize::new(0),
                });
            })
            .universe(clicker_universe())
            .build();

        gantry.start_and_run().await.expect("run completes");

        let results = gantry.results().expect("completed");
        assert_eq!(results.count(), 2);
        assert_eq!(results.succeeded(), 2);
    }

    #[tokio::test]
    async fn start_hands_the_runner_to_the_host() {
        let mut gantry = Gantry::builder()
            .configure(|services| {
                services.insert(ClickCounter {
                    clicks: AtomicUsize::new(0),
                });
            })
            .universe(clicker_universe())
            .build();

        gantry
            .start(|runner| {
                Box::pin(async move {
                    assert_eq!(runner.total(), 2);
                    runner.sort_test_methods(|a, b| a.cmp(b));
                    runner.run(false).await
                })
            })
            .await
            .expect("run completes");

        let first = gantry
            .results()
            .expect("completed")
            .iter()
            .next()
            .expect("has outcomes")
            .method_name()
            .to_string();
        assert_eq!(first, "click_once");
    }

    #[tokio::test]
    async fn results_before_start_report_not_started() {
        let gantry = Gantry::builder().universe(clicker_universe()).build();
        assert!(matches!(
            gantry.results().expect_err("never started"),
            GantryError::Runner(RunnerError::NotStarted)
        ));
    }

    #[tokio::test]
    async fn missing_universe_fails_discovery_at_start() {
        let mut gantry = Gantry::builder().build();
        let err = gantry.start_and_run().await.expect_err("no universe");
        assert!(matches!(
            err,
            GantryError::Discovery(DiscoveryError::Unavailable(_))
        ));
    }

    #[tokio::test]
    async fn request_service_delegates_to_the_provider() {
        let mut gantry = Gantry::builder()
            .configure(|services| {
                services.insert(ClickCounter {
                    clicks: AtomicUsize::new(0),
                });
            })
            .universe(clicker_universe())
            .build();

        assert!(gantry.request_service::<ClickCounter>().is_none());
        gantry.start_and_run().await.expect("run completes");

        let counter = gantry
            .request_service::<ClickCounter>()
            .expect("registered service");
        counter.click();
        assert_eq!(counter.clicks.load(Ordering::SeqCst), 1);

        assert!(gantry.request_service::<String>().is_none());
    }

    #[tokio::test]
    async fn dispose_is_idempotent_and_releases_everything() {
        let mut gantry = Gantry::builder()
            .configure(|services| {
                services.insert(ClickCounter {
                    clicks: AtomicUsize::new(0),
                });
            })
            .universe(clicker_universe())
            .build();

        gantry.start_and_run().await.expect("run completes");
        gantry.dispose();
        gantry.dispose();

        assert!(gantry.request_service::<ClickCounter>().is_none());
        assert!(gantry.results().is_err());
    }
}
