use std::time::Duration;

use async_trait::async_trait;

/// Source of scheduler ticks.
#[async_trait]
pub trait Clock: Send {
    /// Block until one tick has elapsed.
    async fn advance(&mut self);
}

/// One tick = one real pause of `tick`.
#[derive(Debug, Clone)]
pub struct WallClock {
    tick: Duration,
}

impl WallClock {
    pub fn new(tick: Duration) -> Self {
        Self { tick }
    }
}

impl Default for WallClock {
    fn default() -> Self {
        Self::new(Duration::from_secs(1))
    }
}

#[async_trait]
impl Clock for WallClock {
    async fn advance(&mut self) {
        tokio::time::sleep(self.tick).await;
    }
}

/// Ticks complete instantly; only counts them.
#[derive(Debug, Clone, Default)]
pub struct VirtualClock {
    elapsed: u64,
}

impl VirtualClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn elapsed(&self) -> u64 {
        self.elapsed
    }
}

#[async_trait]
impl Clock for VirtualClock {
    async fn advance(&mut self) {
        self.elapsed += 1;
    }
}
