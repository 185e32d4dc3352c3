//! Async test helpers

use std::future::Future;
use std::time::Duration;

use tokio::time::{sleep, Instant};

pub struct TestEnv;

impl TestEnv {
    /// Poll `condition` until it holds or `timeout` elapses
    ///
    /// Uses tokio's clock, so it also works under `start_paused = true`.
    pub async fn wait_for<F, Fut>(mut condition: F, timeout: Duration) -> bool
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = bool>,
    {
        let start = Instant::now();
        while start.elapsed() < timeout {
            if condition().await {
                return true;
            }
            sleep(Duration::from_millis(10)).await;
        }
        condition().await
    }

    /// Let spawned tasks run without advancing the clock meaningfully
    pub async fn settle() {
        for _ in 0..10 {
            tokio::task::yield_now().await;
        }
    }
}
