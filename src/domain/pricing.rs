use crate::domain::money::Money;
use crate::error::KioskError;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Shipping service level offered at the kiosk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ServiceTier {
    #[serde(rename = "overnight")]
    Overnight,
    #[serde(rename = "2day")]
    TwoDay,
    #[serde(rename = "ground")]
    Ground,
}

/// Flat fee plus a per-kilogram rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rate {
    pub base: Decimal,
    pub per_kg: Decimal,
}

impl ServiceTier {
    /// Every tier, in the order the kiosk lists them.
    pub const ALL: [ServiceTier; 3] = [Self::Overnight, Self::TwoDay, Self::Ground];

    pub fn rate(self) -> Rate {
        match self {
            Self::Overnight => Rate {
                base: dec!(7.50),
                per_kg: dec!(1.50),
            },
            Self::TwoDay => Rate {
                base: dec!(5.00),
                per_kg: dec!(1.00),
            },
            Self::Ground => Rate {
                base: dec!(2.99),
                per_kg: dec!(0.50),
            },
        }
    }

    /// Identifier used in files and on the command line.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Overnight => "overnight",
            Self::TwoDay => "2day",
            Self::Ground => "ground",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            Self::Overnight => "Overnight",
            Self::TwoDay => "2-Day",
            Self::Ground => "Ground",
        }
    }
}

impl fmt::Display for ServiceTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ServiceTier {
    type Err = KioskError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "overnight" => Ok(Self::Overnight),
            "2day" | "2-day" | "two-day" => Ok(Self::TwoDay),
            "ground" => Ok(Self::Ground),
            other => Err(KioskError::UnknownService(other.to_string())),
        }
    }
}

/// Price of shipping `weight` kilograms with `tier`.
///
/// Total for any weight: results past the `Decimal` range saturate at
/// [`Money::MAX`], negative totals price at zero. Range checks on the weight
/// belong to the `package-weight` field rules, not here.
pub fn price(tier: ServiceTier, weight: Decimal) -> Money {
    let rate = tier.rate();
    let total = weight
        .checked_mul(rate.per_kg)
        .and_then(|variable| rate.base.checked_add(variable));
    match total {
        Some(total) => Money::new(total).unwrap_or(Money::ZERO),
        None if weight.is_sign_negative() => Money::ZERO,
        None => Money::MAX,
    }
}

/// Prices every tier for the same weight, in [`ServiceTier::ALL`] order.
pub fn quote_all(weight: Decimal) -> Vec<(ServiceTier, Money)> {
    ServiceTier::ALL
        .iter()
        .map(|&tier| (tier, price(tier, weight)))
        .collect()
}
