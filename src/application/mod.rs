//! Application layer: orchestration on top of the domain.
//!
//! `PaymentProcessor` turns form input into a receipt or a typed failure,
//! and `KioskSession` sequences the kiosk screens around it. The session is
//! the only stateful piece and is passed around explicitly.

pub mod kiosk;
pub mod processor;
