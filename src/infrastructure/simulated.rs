use crate::config::SimulationConfig;
use crate::domain::money::Money;
use crate::domain::ports::{Authorization, ProcessingBackend};
use crate::error::Result;
use async_trait::async_trait;
use rand::Rng;
use tracing::debug;

/// A pretend card network with random latency and a fixed approval rate.
///
/// Holds no mutable state, so one instance can serve concurrent attempts.
#[derive(Debug, Clone)]
pub struct SimulatedBackend {
    config: SimulationConfig,
}

impl SimulatedBackend {
    pub fn new(config: SimulationConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }
}

impl Default for SimulatedBackend {
    fn default() -> Self {
        Self {
            config: SimulationConfig::default(),
        }
    }
}

#[async_trait]
impl ProcessingBackend for SimulatedBackend {
    async fn authorize(&self, amount: Money) -> Authorization {
        let delay = rand::thread_rng().gen_range(self.config.min_delay..=self.config.max_delay);
        debug!(%amount, ?delay, "waiting on simulated card network");
        tokio::time::sleep(delay).await;

        if rand::thread_rng().gen_bool(self.config.success_rate) {
            Authorization::Approved
        } else {
            Authorization::Declined
        }
    }
}
