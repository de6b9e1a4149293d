use chrono::{TimeZone, Utc};
use rust_decimal_macros::dec;
use shipkiosk::application::processor::PaymentProcessor;
use shipkiosk::config::SimulationConfig;
use shipkiosk::domain::money::Money;
use shipkiosk::domain::payment::{FailureCode, PaymentData, PaymentField};
use shipkiosk::domain::ports::{Authorization, ClockBox, ProcessingBackendBox};
use shipkiosk::infrastructure::clock::FixedClock;
use shipkiosk::infrastructure::fixed::FixedBackend;
use shipkiosk::infrastructure::simulated::SimulatedBackend;
use std::sync::Arc;
use std::time::Duration;

fn clock() -> ClockBox {
    Box::new(FixedClock(Utc.with_ymd_and_hms(2025, 6, 15, 12, 0, 0).unwrap()))
}

fn valid_card() -> PaymentData {
    PaymentData {
        card_number: "4111 1111 1111 1111".to_string(),
        expiry: "11/27".to_string(),
        cvv: "123".to_string(),
        cardholder: "Ada Lovelace".to_string(),
    }
}

#[tokio::test]
async fn test_concurrent_attempts_are_independent() {
    let backend: ProcessingBackendBox = Box::new(FixedBackend::new(
        [
            Authorization::Approved,
            Authorization::Declined,
            Authorization::Approved,
            Authorization::Declined,
        ],
        Authorization::Approved,
    ));
    let processor = Arc::new(PaymentProcessor::new(backend, clock()));

    let handles: Vec<_> = (1..=4)
        .map(|i| {
            let processor = Arc::clone(&processor);
            tokio::spawn(async move {
                let amount = Money::new(dec!(10) * rust_decimal::Decimal::from(i)).unwrap();
                (amount, processor.process_payment(&valid_card(), amount).await)
            })
        })
        .collect();

    let mut approved = 0;
    let mut declined = 0;
    for handle in handles {
        let (amount, outcome) = handle.await.unwrap();
        match outcome {
            Ok(receipt) => {
                assert_eq!(receipt.amount, amount);
                approved += 1;
            }
            Err(failure) => {
                assert_eq!(failure.code(), FailureCode::Declined);
                declined += 1;
            }
        }
    }
    assert_eq!((approved, declined), (2, 2));
}

#[tokio::test(start_paused = true)]
async fn test_simulated_backend_behind_trait_object() {
    let backend: ProcessingBackendBox = Box::new(SimulatedBackend::default());
    let processor = PaymentProcessor::new(backend, clock());

    let started = tokio::time::Instant::now();
    let outcome = processor
        .process_payment(&valid_card(), Money::new(dec!(12)).unwrap())
        .await;
    let elapsed = started.elapsed();

    assert!(elapsed >= Duration::from_millis(1500) && elapsed <= Duration::from_millis(2500));
    match outcome {
        Ok(receipt) => assert_eq!(receipt.amount, Money::new(dec!(12)).unwrap()),
        Err(failure) => assert_eq!(failure.code(), FailureCode::Declined),
    }
}

#[tokio::test]
async fn test_approval_rate_through_processor() {
    let backend = SimulatedBackend::new(SimulationConfig::instant(0.9).unwrap()).unwrap();
    let processor = PaymentProcessor::new(Box::new(backend), clock());
    let amount = Money::new(dec!(4.49)).unwrap();

    let runs = 3000;
    let mut approved = 0;
    for _ in 0..runs {
        match processor.process_payment(&valid_card(), amount).await {
            Ok(receipt) => {
                assert_eq!(receipt.amount, amount);
                approved += 1;
            }
            Err(failure) => {
                assert_eq!(failure.code(), FailureCode::Declined);
                assert!(failure.errors().is_none());
            }
        }
    }
    let rate = f64::from(approved) / f64::from(runs);
    assert!((0.86..=0.94).contains(&rate), "approval rate {rate}");
}

#[tokio::test]
async fn test_invalid_input_never_reaches_backend() {
    let backend = FixedBackend::approving();
    let processor = PaymentProcessor::new(Box::new(backend.clone()), clock());
    let mut data = valid_card();
    data.cardholder = String::new();

    let failure = processor
        .process_payment(&data, Money::new(dec!(1)).unwrap())
        .await
        .unwrap_err();

    assert_eq!(failure.code(), FailureCode::ValidationFailed);
    assert!(failure.errors().unwrap().contains(PaymentField::Cardholder));
    assert_eq!(backend.calls(), 0);
}
