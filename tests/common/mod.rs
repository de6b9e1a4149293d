#![allow(dead_code)]

use chrono::{Datelike, Months, Utc};
use std::io::Error;
use std::path::Path;

pub const HEADER: [&str; 7] = [
    "order",
    "card_number",
    "expiry",
    "cvv",
    "cardholder",
    "service",
    "weight",
];

/// An `MM/YY` expiry a year from now, so fixtures never go stale.
pub fn future_expiry() -> String {
    let next_year = Utc::now()
        .date_naive()
        .checked_add_months(Months::new(12))
        .expect("date in range");
    format!("{:02}/{:02}", next_year.month(), next_year.year() % 100)
}

pub fn write_requests(path: &Path, rows: &[[&str; 7]]) -> Result<(), Error> {
    let mut wtr = csv::WriterBuilder::new().from_path(path)?;
    wtr.write_record(HEADER)?;
    for row in rows {
        wtr.write_record(row)?;
    }
    wtr.flush()?;
    Ok(())
}

/// `rows` valid Visa checkouts, ground service, 1kg each.
pub fn generate_requests(path: &Path, rows: usize) -> Result<(), Error> {
    let expiry = future_expiry();
    let mut wtr = csv::WriterBuilder::new().from_path(path)?;
    wtr.write_record(HEADER)?;
    for i in 1..=rows {
        let order = format!("ORD{i}");
        wtr.write_record([
            order.as_str(),
            "4111 1111 1111 1111",
            expiry.as_str(),
            "123",
            "Ada Lovelace",
            "ground",
            "1",
        ])?;
    }
    wtr.flush()?;
    Ok(())
}
