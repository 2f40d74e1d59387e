//! Woops, the service was never registered with the collection — the
//! whole suite is skipped as a block and every method reports the
//! resolution failure with its nested cause.

use std::error::Error;
use std::sync::Arc;

use gantry::{Gantry, Suite, TestSuite, TestUniverse};

struct NonInjectedService;

impl NonInjectedService {
    fn msg(&self) {
        tracing::info!("message 1");
    }
}

struct TestClass {
    service: Arc<NonInjectedService>,
}

impl TestSuite for TestClass {}

impl TestClass {
    fn test1(&mut self) {
        self.service.msg();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().init();

    let universe = TestUniverse::new().with(
        Suite::<TestClass>::new("TestClass")
            .factory(|resolver| {
                Ok(TestClass {
                    service: resolver.request()?,
                })
            })
            .method("test1", TestClass::test1),
    );

    // NonInjectedService is intentionally left out of the collection.
    let mut gantry = Gantry::builder().universe(universe).build();

    gantry.start_and_run().await?;

    let results = gantry.results()?;
    for outcome in results {
        println!("{outcome}");
        if let Some(failure) = outcome.failure() {
            println!("  failure: {failure}");
            let mut source = failure.source();
            while let Some(err) = source {
                println!("  caused by: {err}");
                source = err.source();
            }
        }
    }

    println!("{}", serde_json::to_string_pretty(&results.summary())?);

    Ok(())
}
