//! A minimal host: one injected service and one suite exercising all
//! three callable shapes.

use std::sync::Arc;
use std::time::Duration;

use gantry::{Gantry, Suite, TestSuite, TestUniverse};

struct PrettyMessageService;

impl PrettyMessageService {
    fn info(&self, msg: &str) {
        tracing::info!("{msg}");
    }

    fn warn(&self, msg: &str) {
        tracing::warn!("{msg}");
    }
}

struct PrettyMessageTest {
    messages: Arc<PrettyMessageService>,
}

impl TestSuite for PrettyMessageTest {}

impl PrettyMessageTest {
    fn test1(&mut self) {
        self.messages.info("This is a pretty message :)");
    }

    fn test2(&mut self) {
        self.messages.warn("This is an uglier message :(");
    }

    fn test3(&mut self) -> anyhow::Result<()> {
        self.messages.info("Message sent from a sync completion.");
        Ok(())
    }

    async fn test4(&mut self) -> anyhow::Result<()> {
        tokio::time::sleep(Duration::from_millis(250)).await;
        self.messages.info("Async test finished successfully.");
        Ok(())
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let universe = TestUniverse::new().with(
        Suite::<PrettyMessageTest>::new("PrettyMessageTest")
            .factory(|resolver| {
                Ok(PrettyMessageTest {
                    messages: resolver.request()?,
                })
            })
            .method("test1", PrettyMessageTest::test1)
            .method("test2", PrettyMessageTest::test2)
            .try_method("test3", PrettyMessageTest::test3)
            .async_method("test4", |suite| Box::pin(suite.test4())),
    );

    let mut gantry = Gantry::builder()
        .configure(|services| {
            services.insert(PrettyMessageService);
        })
        .universe(universe)
        .throw_on_fail(true)
        .build();

    gantry
        .start(|runner| {
            Box::pin(async move {
                tracing::info!("Starting tests...");
                runner.run_logged().await
            })
        })
        .await?;

    for outcome in gantry.results()? {
        println!("{outcome}");
    }

    Ok(())
}
