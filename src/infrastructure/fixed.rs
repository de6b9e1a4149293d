use crate::domain::money::Money;
use crate::domain::ports::{Authorization, ProcessingBackend};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tokio::sync::Mutex;

/// A deterministic backend that replays a scripted list of answers.
///
/// Once the script runs out every call gets `fallback`. Clones share the
/// script and the call counter.
#[derive(Debug, Clone)]
pub struct FixedBackend {
    script: Arc<Mutex<VecDeque<Authorization>>>,
    fallback: Authorization,
    delay: Duration,
    calls: Arc<AtomicUsize>,
}

impl FixedBackend {
    pub fn new(script: impl IntoIterator<Item = Authorization>, fallback: Authorization) -> Self {
        Self {
            script: Arc::new(Mutex::new(script.into_iter().collect())),
            fallback,
            delay: Duration::ZERO,
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn approving() -> Self {
        Self::new(std::iter::empty(), Authorization::Approved)
    }

    pub fn declining() -> Self {
        Self::new(std::iter::empty(), Authorization::Declined)
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// How many times `authorize` has been called.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ProcessingBackend for FixedBackend {
    async fn authorize(&self, _amount: Money) -> Authorization {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        self.script.lock().await.pop_front().unwrap_or(self.fallback)
    }
}
