use super::money::Money;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// Answer from the card network for one charge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Authorization {
    Approved,
    Declined,
}

/// Stands in for the card network: owns the latency and the approve/decline draw.
#[async_trait]
pub trait ProcessingBackend: Send + Sync {
    async fn authorize(&self, amount: Money) -> Authorization;
}

/// Source of the current time, for expiry checks and receipt stamps.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

pub type ProcessingBackendBox = Box<dyn ProcessingBackend>;
pub type ClockBox = Box<dyn Clock>;
