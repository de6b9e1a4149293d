use crate::domain::money::Money;
use crate::domain::pricing::{ServiceTier, price};
use chrono::{Days, NaiveDate};
use rand::Rng;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

/// Tracking code printed on the label: `TS` + `YYMMDD` + a 3-digit sequence.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TrackingNumber(String);

impl TrackingNumber {
    pub fn generate<R: Rng + ?Sized>(date: NaiveDate, rng: &mut R) -> Self {
        let sequence: u16 = rng.gen_range(1..=999);
        Self(format!("TS{}{sequence:03}", date.format("%y%m%d")))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for TrackingNumber {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// The order being assembled at the kiosk.
///
/// `price` is kept in sync with `weight` and `service` by the setters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderSnapshot {
    /// Package weight in kilograms.
    pub weight: Decimal,
    pub destination: String,
    pub service: ServiceTier,
    pub price: Money,
    pub tracking_number: TrackingNumber,
}

impl OrderSnapshot {
    /// The kiosk's opening order: 3kg overnight to the sample address.
    pub fn new(tracking_number: TrackingNumber) -> Self {
        let weight = dec!(3.0);
        let service = ServiceTier::Overnight;
        Self {
            weight,
            destination: "100 Main St\nZIP 15213".to_string(),
            service,
            price: price(service, weight),
            tracking_number,
        }
    }

    pub fn set_weight(&mut self, weight: Decimal) {
        self.weight = weight;
        self.reprice();
    }

    pub fn set_service(&mut self, service: ServiceTier) {
        self.service = service;
        self.reprice();
    }

    fn reprice(&mut self) {
        self.price = price(self.service, self.weight);
    }

    /// Every service level ships next day in the demo.
    pub fn estimated_delivery(&self, ordered_on: NaiveDate) -> NaiveDate {
        ordered_on.checked_add_days(Days::new(1)).unwrap_or(ordered_on)
    }
}
