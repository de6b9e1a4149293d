use crate::domain::payment::PaymentData;
use crate::domain::pricing::ServiceTier;
use crate::error::{KioskError, Result};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::io::Read;

/// One kiosk checkout from a batch file: the order plus the card to charge.
#[derive(Debug, Deserialize, PartialEq, Clone)]
pub struct PaymentRequest {
    pub order: String,
    pub card_number: String,
    pub expiry: String,
    pub cvv: String,
    pub cardholder: String,
    pub service: ServiceTier,
    /// Kilograms.
    pub weight: Decimal,
}

impl PaymentRequest {
    pub fn payment_data(&self) -> PaymentData {
        PaymentData {
            card_number: self.card_number.clone(),
            expiry: self.expiry.clone(),
            cvv: self.cvv.clone(),
            cardholder: self.cardholder.clone(),
        }
    }
}

/// Reads payment requests from a CSV source.
///
/// Fields are trimmed. Card and CVV columns are kept as text so leading
/// zeros and spacing survive.
pub struct PaymentRequestReader<R: Read> {
    reader: csv::Reader<R>,
}

impl<R: Read> PaymentRequestReader<R> {
    /// Creates a new `PaymentRequestReader` from any `Read` source (e.g., File, Stdin).
    pub fn new(source: R) -> Self {
        let reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(source);
        Self { reader }
    }

    /// Lazily deserializes requests; a bad row yields an error without
    /// ending the stream.
    pub fn requests(self) -> impl Iterator<Item = Result<PaymentRequest>> {
        self.reader
            .into_deserialize()
            .map(|result| result.map_err(KioskError::from))
    }
}
