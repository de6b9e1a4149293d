use crate::domain::payment::{PaymentFailure, PaymentReceipt};
use crate::error::Result;
use serde::Serialize;
use std::io::Write;

/// One output row: either a receipt or a failure for an order.
#[derive(Debug, Serialize, PartialEq, Clone)]
pub struct OutcomeRecord {
    pub order: String,
    pub success: bool,
    pub transaction_id: String,
    pub amount: String,
    pub code: String,
    pub message: String,
}

impl OutcomeRecord {
    pub fn new(order: &str, outcome: &std::result::Result<PaymentReceipt, PaymentFailure>) -> Self {
        match outcome {
            Ok(receipt) => Self {
                order: order.to_string(),
                success: true,
                transaction_id: receipt.transaction_id.to_string(),
                amount: receipt.amount.to_string(),
                code: String::new(),
                message: "Payment processed successfully".to_string(),
            },
            Err(failure) => {
                let message = match failure.errors() {
                    Some(errors) => format!("{failure}: {errors}"),
                    None => failure.to_string(),
                };
                Self {
                    order: order.to_string(),
                    success: false,
                    transaction_id: String::new(),
                    amount: String::new(),
                    code: failure.code().as_str().to_string(),
                    message,
                }
            }
        }
    }
}

/// Writes payment outcomes as CSV with a header row.
pub struct OutcomeWriter<W: Write> {
    writer: csv::Writer<W>,
}

impl<W: Write> OutcomeWriter<W> {
    pub fn new(sink: W) -> Self {
        Self {
            writer: csv::Writer::from_writer(sink),
        }
    }

    pub fn write(&mut self, record: &OutcomeRecord) -> Result<()> {
        self.writer.serialize(record)?;
        Ok(())
    }

    pub fn flush(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }
}
