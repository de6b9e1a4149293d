use crate::domain::payment::PaymentFailure;
use thiserror::Error;

/// Errors raised by the kiosk outside of the payment outcome itself.
///
/// Declines and field validation failures are ordinary values
/// (`PaymentFailure`, `FieldErrors`); this type covers misuse of the library
/// and the batch IO around it.
#[derive(Error, Debug)]
pub enum KioskError {
    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Unknown validation rule: {0}")]
    UnknownRule(String),
    #[error("Invalid parameter for rule '{rule}': {reason}")]
    InvalidRuleParam { rule: String, reason: String },
    #[error("Unknown service tier: {0}")]
    UnknownService(String),
    #[error("Invalid simulation config: {0}")]
    InvalidConfig(String),
    #[error("Navigation error: {0}")]
    Navigation(String),
    #[error("Validation error: {0}")]
    ValidationError(String),
    #[error(transparent)]
    Payment(#[from] PaymentFailure),
}

pub type Result<T> = std::result::Result<T, KioskError>;
