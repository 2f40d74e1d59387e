//! Failures are isolated per method: the run finishes and reports every
//! outcome even though two of the three tests raise.

use std::sync::Arc;

use gantry::{Gantry, Suite, TestSuite, TestUniverse};

struct FlakyService;

impl FlakyService {
    fn send(&self) -> anyhow::Result<()> {
        anyhow::bail!("connection refused")
    }

    fn receive(&self) -> anyhow::Result<()> {
        anyhow::bail!("timed out after 30s")
    }

    fn ping(&self) {
        tracing::info!("No error.");
    }
}

struct FlakyTest {
    service: Arc<FlakyService>,
}

impl TestSuite for FlakyTest {}

impl FlakyTest {
    fn test1(&mut self) -> anyhow::Result<()> {
        self.service.send()
    }

    fn test2(&mut self) -> anyhow::Result<()> {
        self.service.receive()
    }

    fn test3(&mut self) {
        self.service.ping();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().init();

    let universe = TestUniverse::new().with(
        Suite::<FlakyTest>::new("FlakyTest")
            .factory(|resolver| {
                Ok(FlakyTest {
                    service: resolver.request()?,
                })
            })
            .try_method("test1", FlakyTest::test1)
            .try_method("test2", FlakyTest::test2)
            .method("test3", FlakyTest::test3),
    );

    let mut gantry = Gantry::builder()
        .configure(|services| {
            services.insert(FlakyService);
        })
        .universe(universe)
        .build();

    gantry.start_and_run().await?;

    for outcome in gantry.results()? {
        println!("{outcome}");
        if let Some(failure) = outcome.failure() {
            println!("  cause: {}", failure.cause());
        }
    }

    Ok(())
}
