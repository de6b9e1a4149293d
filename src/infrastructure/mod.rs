//! Adapters for the domain ports: card network stand-ins and clocks.

pub mod clock;
pub mod fixed;
pub mod simulated;
