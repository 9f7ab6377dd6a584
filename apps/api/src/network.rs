//! Latency and failure injection for the mock REST surface.
//!
//! Every endpoint sleeps for a random interval; write endpoints additionally
//! fail with a fixed probability. The failure is decided before the handler
//! touches the store, so a failed write never leaves a partial change behind.

use std::time::Duration;

use rand::Rng;
use tracing::warn;

use crate::config::Config;
use crate::errors::AppError;

#[derive(Debug, Clone)]
pub struct NetworkSimulator {
    latency_min_ms: u64,
    latency_max_ms: u64,
    failure_rate: f64,
}

impl NetworkSimulator {
    pub fn new(latency_min_ms: u64, latency_max_ms: u64, failure_rate: f64) -> Self {
        Self {
            latency_min_ms: latency_min_ms.min(latency_max_ms),
            latency_max_ms,
            failure_rate: failure_rate.clamp(0.0, 1.0),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            config.latency_min_ms,
            config.latency_max_ms,
            config.write_failure_rate,
        )
    }

    /// No latency and no failures.
    pub fn instant() -> Self {
        Self::new(0, 0, 0.0)
    }

    pub fn with_failure_rate(mut self, failure_rate: f64) -> Self {
        self.failure_rate = failure_rate.clamp(0.0, 1.0);
        self
    }

    pub fn failure_rate(&self) -> f64 {
        self.failure_rate
    }

    /// Delay applied to read endpoints. Reads never fail.
    pub async fn read(&self) {
        self.delay().await;
    }

    /// Delay plus a failure roll, applied to write endpoints.
    pub async fn write(&self) -> Result<(), AppError> {
        self.delay().await;
        let failed = self.failure_rate > 0.0 && rand::thread_rng().gen_bool(self.failure_rate);
        if failed {
            warn!(rate = self.failure_rate, "Failing write request");
            return Err(AppError::Network);
        }
        Ok(())
    }

    async fn delay(&self) {
        if self.latency_max_ms == 0 {
            return;
        }
        let ms = rand::thread_rng().gen_range(self.latency_min_ms..=self.latency_max_ms);
        tokio::time::sleep(Duration::from_millis(ms)).await;
    }
}
