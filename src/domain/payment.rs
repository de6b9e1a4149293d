use crate::domain::card::{detect_card_type, validate_card_number, validate_cvv, validate_expiry_date_at};
use crate::domain::money::Money;
use chrono::{DateTime, NaiveDate, Utc};
use rand::Rng;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::LazyLock;
use thiserror::Error;

static CARDHOLDER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-zA-Z\s'\-]+$").unwrap_or_else(|e| panic!("invalid cardholder pattern: {e}"))
});

/// Card details captured from the payment form.
///
/// Built at submission time and dropped once the attempt resolves.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentData {
    /// Digits, optionally space-grouped.
    pub card_number: String,
    /// `MM/YY`.
    pub expiry: String,
    pub cvv: String,
    pub cardholder: String,
}

/// The payment form fields reported in a [`FieldErrors`] map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PaymentField {
    CardNumber,
    Expiry,
    Cvv,
    Cardholder,
}

impl PaymentField {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::CardNumber => "cardNumber",
            Self::Expiry => "expiry",
            Self::Cvv => "cvv",
            Self::Cardholder => "cardholder",
        }
    }
}

impl fmt::Display for PaymentField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One message per failing field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<PaymentField, String>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, field: PaymentField, message: impl Into<String>) {
        self.0.insert(field, message.into());
    }

    pub fn get(&self, field: PaymentField) -> Option<&str> {
        self.0.get(&field).map(String::as_str)
    }

    pub fn contains(&self, field: PaymentField) -> bool {
        self.0.contains_key(&field)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (PaymentField, &str)> {
        self.0.iter().map(|(field, message)| (*field, message.as_str()))
    }
}

/// `field: message` pairs joined with `; `.
impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (field, message)) in self.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{field}: {message}")?;
        }
        Ok(())
    }
}

/// Validates every payment field and reports all failures together.
pub fn validate_payment_data(data: &PaymentData) -> Result<(), FieldErrors> {
    validate_payment_data_at(data, Utc::now().date_naive())
}

/// Same as [`validate_payment_data`], with expiry checked against `today`.
pub fn validate_payment_data_at(data: &PaymentData, today: NaiveDate) -> Result<(), FieldErrors> {
    let mut errors = FieldErrors::new();
    let card_type = detect_card_type(&data.card_number);

    if data.card_number.trim().is_empty() {
        errors.insert(PaymentField::CardNumber, "Card number is required");
    } else if card_type.is_none() {
        errors.insert(PaymentField::CardNumber, "Unsupported card type");
    } else if !validate_card_number(&data.card_number) {
        errors.insert(PaymentField::CardNumber, "Invalid card number");
    }

    if data.expiry.trim().is_empty() {
        errors.insert(PaymentField::Expiry, "Expiry date is required");
    } else if let Err(e) = validate_expiry_date_at(&data.expiry, today) {
        errors.insert(PaymentField::Expiry, e.to_string());
    }

    if data.cvv.trim().is_empty() {
        errors.insert(PaymentField::Cvv, "CVV is required");
    } else if let Err(e) = validate_cvv(&data.cvv, card_type) {
        errors.insert(PaymentField::Cvv, e.to_string());
    }

    let cardholder = &data.cardholder;
    if cardholder.trim().is_empty() {
        errors.insert(PaymentField::Cardholder, "Cardholder name is required");
    } else if cardholder.chars().count() < 2 {
        errors.insert(PaymentField::Cardholder, "Cardholder name is too short");
    } else if !CARDHOLDER.is_match(cardholder) {
        errors.insert(PaymentField::Cardholder, "Invalid characters in cardholder name");
    }

    if errors.is_empty() { Ok(()) } else { Err(errors) }
}

const BASE36: &[u8; 36] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// Uppercase `TXN` token built from the time in base 36 and five random characters.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TransactionId(String);

impl TransactionId {
    pub fn generate<R: Rng + ?Sized>(at: DateTime<Utc>, rng: &mut R) -> Self {
        let millis = u64::try_from(at.timestamp_millis()).unwrap_or_default();
        let mut id = String::from("TXN");
        id.push_str(&to_base36(millis));
        for _ in 0..5 {
            id.push(char::from(BASE36[rng.gen_range(0..BASE36.len())]));
        }
        Self(id)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TransactionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

fn to_base36(mut value: u64) -> String {
    if value == 0 {
        return "0".to_string();
    }
    let mut digits = Vec::new();
    while value > 0 {
        digits.push(BASE36[(value % 36) as usize]);
        value /= 36;
    }
    digits.iter().rev().map(|&b| char::from(b)).collect()
}

/// Successful outcome of one payment attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentReceipt {
    pub transaction_id: TransactionId,
    pub amount: Money,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FailureCode {
    ValidationFailed,
    Declined,
}

impl FailureCode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::ValidationFailed => "VALIDATION_FAILED",
            Self::Declined => "DECLINED",
        }
    }
}

/// Unsuccessful outcome of one payment attempt. Never retried automatically.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PaymentFailure {
    #[error("Payment validation failed")]
    ValidationFailed(FieldErrors),
    #[error("Payment declined. Please try another card.")]
    Declined,
}

impl PaymentFailure {
    pub fn code(&self) -> FailureCode {
        match self {
            Self::ValidationFailed(_) => FailureCode::ValidationFailed,
            Self::Declined => FailureCode::Declined,
        }
    }

    /// Per-field messages, present only for validation failures.
    pub fn errors(&self) -> Option<&FieldErrors> {
        match self {
            Self::ValidationFailed(errors) => Some(errors),
            Self::Declined => None,
        }
    }
}
