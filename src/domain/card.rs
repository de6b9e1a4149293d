use chrono::{Datelike, NaiveDate, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::LazyLock;
use thiserror::Error;

static VISA: LazyLock<Regex> = LazyLock::new(|| compile(r"^4[0-9]{12}(?:[0-9]{3})?$"));
static MASTERCARD: LazyLock<Regex> = LazyLock::new(|| compile(r"^5[1-5][0-9]{14}$"));
static AMEX: LazyLock<Regex> = LazyLock::new(|| compile(r"^3[47][0-9]{13}$"));
static DISCOVER: LazyLock<Regex> = LazyLock::new(|| compile(r"^6(?:011|5[0-9]{2})[0-9]{12}$"));
static EXPIRY: LazyLock<Regex> = LazyLock::new(|| compile(r"^([0-9]{2})/([0-9]{2})$"));

fn compile(pattern: &str) -> Regex {
    Regex::new(pattern).unwrap_or_else(|e| panic!("invalid built-in pattern {pattern}: {e}"))
}

/// Card networks accepted by the kiosk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CardType {
    Visa,
    MasterCard,
    Amex,
    Discover,
}

impl CardType {
    /// Detection order. The first matching variant wins.
    pub const ALL: [CardType; 4] = [Self::Visa, Self::MasterCard, Self::Amex, Self::Discover];

    /// Whether a whitespace-free digit string has this network's prefix and length.
    pub fn matches(self, digits: &str) -> bool {
        let pattern = match self {
            Self::Visa => &VISA,
            Self::MasterCard => &MASTERCARD,
            Self::Amex => &AMEX,
            Self::Discover => &DISCOVER,
        };
        pattern.is_match(digits)
    }

    pub fn cvv_length(self) -> usize {
        match self {
            Self::Amex => 4,
            Self::Visa | Self::MasterCard | Self::Discover => 3,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Visa => "Visa",
            Self::MasterCard => "MasterCard",
            Self::Amex => "American Express",
            Self::Discover => "Discover",
        }
    }
}

impl fmt::Display for CardType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

pub(crate) fn strip_whitespace(number: &str) -> String {
    number.chars().filter(|c| !c.is_whitespace()).collect()
}

/// Detects the card network from the number's prefix and length.
pub fn detect_card_type(number: &str) -> Option<CardType> {
    let digits = strip_whitespace(number);
    CardType::ALL.into_iter().find(|card| card.matches(&digits))
}

/// Luhn check over a card number. Whitespace is ignored; an empty number or
/// any other non-digit character fails.
pub fn validate_card_number(number: &str) -> bool {
    let digits = strip_whitespace(number);
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return false;
    }
    luhn_sum(&digits) % 10 == 0
}

fn luhn_sum(digits: &str) -> u32 {
    digits
        .bytes()
        .rev()
        .enumerate()
        .map(|(i, b)| {
            let digit = u32::from(b - b'0');
            if i % 2 == 1 {
                let doubled = digit * 2;
                if doubled > 9 { doubled - 9 } else { doubled }
            } else {
                digit
            }
        })
        .sum()
}

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExpiryError {
    #[error("Invalid format")]
    Format,
    #[error("Invalid month")]
    MonthRange,
    #[error("Card has expired")]
    Expired,
    #[error("Invalid year")]
    YearRange,
}

/// How many years ahead of today an expiry year may be.
pub const MAX_EXPIRY_YEARS_AHEAD: i32 = 10;

/// Validates an `MM/YY` expiry against today's date (UTC).
pub fn validate_expiry_date(expiry: &str) -> Result<(), ExpiryError> {
    validate_expiry_date_at(expiry, Utc::now().date_naive())
}

/// Validates an `MM/YY` expiry against `today`.
///
/// A card stays valid through its expiry month. Years are read as `20YY`.
pub fn validate_expiry_date_at(expiry: &str, today: NaiveDate) -> Result<(), ExpiryError> {
    let caps = EXPIRY.captures(expiry).ok_or(ExpiryError::Format)?;
    let month: u32 = caps[1].parse().map_err(|_| ExpiryError::Format)?;
    let year: i32 = 2000 + caps[2].parse::<i32>().map_err(|_| ExpiryError::Format)?;

    if !(1..=12).contains(&month) {
        return Err(ExpiryError::MonthRange);
    }

    let (current_year, current_month) = (today.year(), today.month());
    if year < current_year || (year == current_year && month < current_month) {
        return Err(ExpiryError::Expired);
    }
    if year > current_year + MAX_EXPIRY_YEARS_AHEAD {
        return Err(ExpiryError::YearRange);
    }

    Ok(())
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CvvError {
    #[error("CVV must be numeric")]
    NotNumeric,
    #[error("CVV must be {expected} digits for {}", .card.map_or("this card type", CardType::name))]
    WrongLength {
        expected: usize,
        card: Option<CardType>,
    },
}

/// Checks the CVV length against the card network; 3 digits when unknown.
pub fn validate_cvv(cvv: &str, card: Option<CardType>) -> Result<(), CvvError> {
    if cvv.is_empty() || !cvv.bytes().all(|b| b.is_ascii_digit()) {
        return Err(CvvError::NotNumeric);
    }

    let expected = card.map_or(3, CardType::cvv_length);
    if cvv.len() != expected {
        return Err(CvvError::WrongLength { expected, card });
    }

    Ok(())
}
