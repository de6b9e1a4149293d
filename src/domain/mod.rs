//! Domain layer: the pure, synchronous building blocks of the kiosk.
//!
//! Nothing in here does IO. Time and randomness come in as parameters; the
//! only exceptions are the `validate_expiry_date` and `validate_payment_data`
//! shorthands, which read `Utc::now()` and forward to their `_at` variants.

pub mod card;
pub mod format;
pub mod money;
pub mod order;
pub mod payment;
pub mod ports;
pub mod pricing;
pub mod rules;
