use crate::domain::money::Money;
use crate::domain::payment::{PaymentData, PaymentFailure, PaymentReceipt, TransactionId, validate_payment_data_at};
use crate::domain::ports::{Authorization, ClockBox, ProcessingBackendBox};
use crate::infrastructure::clock::SystemClock;
use crate::infrastructure::simulated::SimulatedBackend;
use tracing::{info, warn};

/// Runs payment attempts: validation first, then the card network.
///
/// `PaymentProcessor` keeps no per-attempt state. Concurrent calls to
/// [`process_payment`](Self::process_payment) are independent and each
/// resolves to exactly one receipt or one failure.
pub struct PaymentProcessor {
    backend: ProcessingBackendBox,
    clock: ClockBox,
}

impl Default for PaymentProcessor {
    fn default() -> Self {
        Self::new(Box::new(SimulatedBackend::default()), Box::new(SystemClock))
    }
}

impl PaymentProcessor {
    /// Creates a new `PaymentProcessor`.
    ///
    /// # Arguments
    ///
    /// * `backend` - Decides approval and supplies the network latency.
    /// * `clock` - Used for expiry checks and receipt timestamps.
    pub fn new(backend: ProcessingBackendBox, clock: ClockBox) -> Self {
        Self { backend, clock }
    }

    /// Charges `amount` to the card in `data`.
    ///
    /// Field errors are reported together and return immediately without
    /// contacting the backend. Otherwise the backend's answer decides between
    /// a receipt and a decline. Nothing is retried.
    pub async fn process_payment(
        &self,
        data: &PaymentData,
        amount: Money,
    ) -> Result<PaymentReceipt, PaymentFailure> {
        let today = self.clock.now().date_naive();
        if let Err(errors) = validate_payment_data_at(data, today) {
            warn!(%errors, "payment rejected before authorization");
            return Err(PaymentFailure::ValidationFailed(errors));
        }

        match self.backend.authorize(amount).await {
            Authorization::Approved => {
                let timestamp = self.clock.now();
                let transaction_id = TransactionId::generate(timestamp, &mut rand::thread_rng());
                info!(%transaction_id, %amount, "payment approved");
                Ok(PaymentReceipt {
                    transaction_id,
                    amount,
                    timestamp,
                })
            }
            Authorization::Declined => {
                warn!(%amount, "payment declined");
                Err(PaymentFailure::Declined)
            }
        }
    }
}
