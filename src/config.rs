use crate::error::{KioskError, Result};
use std::time::Duration;

/// Tuning for the simulated card network.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimulationConfig {
    pub min_delay: Duration,
    pub max_delay: Duration,
    /// Probability in `[0, 1]` that a charge is approved.
    pub success_rate: f64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            min_delay: Duration::from_millis(1500),
            max_delay: Duration::from_millis(2500),
            success_rate: 0.9,
        }
    }
}

impl SimulationConfig {
    pub fn new(min_delay: Duration, max_delay: Duration, success_rate: f64) -> Result<Self> {
        let config = Self {
            min_delay,
            max_delay,
            success_rate,
        };
        config.validate()?;
        Ok(config)
    }

    /// No latency, fixed approval rate. Handy for batch runs and tests.
    pub fn instant(success_rate: f64) -> Result<Self> {
        Self::new(Duration::ZERO, Duration::ZERO, success_rate)
    }

    pub fn validate(&self) -> Result<()> {
        if self.min_delay > self.max_delay {
            return Err(KioskError::InvalidConfig(format!(
                "min delay {:?} exceeds max delay {:?}",
                self.min_delay, self.max_delay
            )));
        }
        if !(0.0..=1.0).contains(&self.success_rate) {
            return Err(KioskError::InvalidConfig(format!(
                "success rate {} is outside [0, 1]",
                self.success_rate
            )));
        }
        Ok(())
    }
}
