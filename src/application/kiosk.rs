use crate::application::processor::PaymentProcessor;
use crate::domain::money::Money;
use crate::domain::order::{OrderSnapshot, TrackingNumber};
use crate::domain::payment::{PaymentData, PaymentReceipt};
use crate::domain::pricing::{ServiceTier, quote_all};
use crate::domain::rules::{FormField, validate_field};
use crate::error::{KioskError, Result};
use chrono::NaiveDate;
use rand::Rng;
use regex::Regex;
use rust_decimal::Decimal;
use std::str::FromStr;
use std::sync::LazyLock;
use tracing::{debug, info};

static SAVED_CARD_CVV: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[0-9]{3}$").unwrap_or_else(|e| panic!("invalid saved card CVV pattern: {e}"))
});

/// Kiosk screens, in the order a customer walks through them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Screen {
    Welcome,
    PackageDetails,
    ServiceSelection,
    Payment,
    Confirmation,
}

impl Screen {
    pub const SEQUENCE: [Screen; 5] = [
        Self::Welcome,
        Self::PackageDetails,
        Self::ServiceSelection,
        Self::Payment,
        Self::Confirmation,
    ];

    fn index(self) -> usize {
        Self::SEQUENCE
            .iter()
            .position(|&s| s == self)
            .unwrap_or_default()
    }

    pub fn next(self) -> Option<Screen> {
        Self::SEQUENCE.get(self.index() + 1).copied()
    }

    pub fn previous(self) -> Option<Screen> {
        self.index().checked_sub(1).map(|i| Self::SEQUENCE[i])
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PaymentMethod {
    /// Card on file; only the CVV is asked for.
    #[default]
    SavedCard,
    NewCard,
}

/// What the confirmation screen and printed receipt show.
#[derive(Debug, Clone, PartialEq)]
pub struct Confirmation {
    pub tracking_number: TrackingNumber,
    pub service: ServiceTier,
    pub weight: Decimal,
    pub total: Money,
    pub estimated_delivery: NaiveDate,
    pub receipt: Option<PaymentReceipt>,
}

/// State of one customer's visit to the kiosk.
#[derive(Debug, Clone)]
pub struct KioskSession {
    screen: Screen,
    order: OrderSnapshot,
    payment_method: PaymentMethod,
    receipt: Option<PaymentReceipt>,
    paid: bool,
}

impl KioskSession {
    /// Starts on the welcome screen with the default order.
    pub fn new(today: NaiveDate) -> Self {
        Self::with_rng(today, &mut rand::thread_rng())
    }

    pub fn with_rng<R: Rng + ?Sized>(today: NaiveDate, rng: &mut R) -> Self {
        Self {
            screen: Screen::Welcome,
            order: OrderSnapshot::new(TrackingNumber::generate(today, rng)),
            payment_method: PaymentMethod::default(),
            receipt: None,
            paid: false,
        }
    }

    pub fn screen(&self) -> Screen {
        self.screen
    }

    pub fn order(&self) -> &OrderSnapshot {
        &self.order
    }

    pub fn payment_method(&self) -> PaymentMethod {
        self.payment_method
    }

    pub fn receipt(&self) -> Option<&PaymentReceipt> {
        self.receipt.as_ref()
    }

    /// Moves to the following screen. The payment screen can only be left
    /// forward once the order is paid.
    pub fn next(&mut self) -> Result<Screen> {
        if self.screen == Screen::Payment && !self.paid {
            return Err(KioskError::Navigation(
                "payment is required before confirmation".to_string(),
            ));
        }
        let next = self.screen.next().ok_or_else(|| {
            KioskError::Navigation("already on the last screen; start a new order".to_string())
        })?;
        self.show(next);
        Ok(next)
    }

    /// Goes back one screen; stays put on the welcome screen.
    pub fn back(&mut self) -> Screen {
        if let Some(previous) = self.screen.previous() {
            self.show(previous);
        }
        self.screen
    }

    fn show(&mut self, screen: Screen) {
        debug!(from = ?self.screen, to = ?screen, "changing screen");
        self.screen = screen;
    }

    /// Validates weight input with the package-weight rules, then reprices.
    pub fn enter_weight(&mut self, input: &str) -> std::result::Result<Decimal, String> {
        validate_field(FormField::PackageWeight, input)?;
        let weight = Decimal::from_str(input.trim())
            .map_err(|_| "Please enter a valid number".to_string())?;
        self.order.set_weight(weight);
        Ok(weight)
    }

    pub fn set_destination(&mut self, input: &str) -> std::result::Result<(), String> {
        validate_field(FormField::DestinationAddress, input)?;
        self.order.destination = input.trim().to_string();
        Ok(())
    }

    pub fn select_service(&mut self, service: ServiceTier) {
        self.order.set_service(service);
    }

    /// Current price of every tier, for the service selection screen.
    pub fn quotes(&self) -> Vec<(ServiceTier, Money)> {
        quote_all(self.order.weight)
    }

    pub fn select_payment_method(&mut self, method: PaymentMethod) {
        self.payment_method = method;
    }

    /// Pays with the card on file. Only the 3-digit CVV is checked.
    pub fn pay_with_saved_card(&mut self, cvv: &str) -> Result<()> {
        self.require_payment_screen()?;
        let cvv = cvv.trim();
        if cvv.is_empty() {
            return Err(KioskError::ValidationError("CVV is required".to_string()));
        }
        if !SAVED_CARD_CVV.is_match(cvv) {
            return Err(KioskError::ValidationError("CVV must be 3 digits".to_string()));
        }
        self.payment_method = PaymentMethod::SavedCard;
        self.mark_paid(None);
        Ok(())
    }

    /// Charges the order price to a new card.
    ///
    /// On success the session moves to the confirmation screen. A declined or
    /// invalid card comes back as [`KioskError::Payment`] and the session
    /// stays on the payment screen so the customer can correct or swap cards.
    pub async fn pay_with_new_card(
        &mut self,
        processor: &PaymentProcessor,
        data: &PaymentData,
    ) -> Result<PaymentReceipt> {
        self.require_payment_screen()?;
        self.payment_method = PaymentMethod::NewCard;
        let receipt = processor.process_payment(data, self.order.price).await?;
        self.mark_paid(Some(receipt.clone()));
        Ok(receipt)
    }

    fn require_payment_screen(&self) -> Result<()> {
        if self.screen == Screen::Payment {
            Ok(())
        } else {
            Err(KioskError::Navigation(format!(
                "payment is only taken on the payment screen, not {:?}",
                self.screen
            )))
        }
    }

    fn mark_paid(&mut self, receipt: Option<PaymentReceipt>) {
        info!(tracking_number = %self.order.tracking_number, total = %self.order.price, "order paid");
        self.paid = true;
        self.receipt = receipt;
        self.show(Screen::Confirmation);
    }

    pub fn confirmation(&self, today: NaiveDate) -> Confirmation {
        Confirmation {
            tracking_number: self.order.tracking_number.clone(),
            service: self.order.service,
            weight: self.order.weight,
            total: self.order.price,
            estimated_delivery: self.order.estimated_delivery(today),
            receipt: self.receipt.clone(),
        }
    }

    /// Resets for the next customer. Weight, destination and service carry
    /// over; payment details do not.
    pub fn start_new(&mut self, today: NaiveDate) {
        self.order.tracking_number = TrackingNumber::generate(today, &mut rand::thread_rng());
        self.payment_method = PaymentMethod::SavedCard;
        self.receipt = None;
        self.paid = false;
        self.show(Screen::Welcome);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::payment::PaymentFailure;
    use crate::infrastructure::clock::FixedClock;
    use crate::infrastructure::fixed::FixedBackend;
    use chrono::{TimeZone, Utc};
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use rust_decimal_macros::dec;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, 15).unwrap()
    }

    fn session() -> KioskSession {
        KioskSession::with_rng(today(), &mut StdRng::seed_from_u64(3))
    }

    fn processor(backend: FixedBackend) -> PaymentProcessor {
        let clock = FixedClock(Utc.with_ymd_and_hms(2025, 6, 15, 12, 0, 0).unwrap());
        PaymentProcessor::new(Box::new(backend), Box::new(clock))
    }

    fn card() -> PaymentData {
        PaymentData {
            card_number: "6011 1111 1111 1117".to_string(),
            expiry: "01/27".to_string(),
            cvv: "999".to_string(),
            cardholder: "Alan Turing".to_string(),
        }
    }

    #[test]
    fn test_forward_navigation_stops_at_payment() {
        let mut s = session();
        assert_eq!(s.next().unwrap(), Screen::PackageDetails);
        assert_eq!(s.next().unwrap(), Screen::ServiceSelection);
        assert_eq!(s.next().unwrap(), Screen::Payment);
        assert!(matches!(s.next(), Err(KioskError::Navigation(_))));
        assert_eq!(s.screen(), Screen::Payment);
    }

    #[test]
    fn test_back_never_leaves_welcome() {
        let mut s = session();
        assert_eq!(s.back(), Screen::Welcome);
        s.next().unwrap();
        s.next().unwrap();
        assert_eq!(s.back(), Screen::PackageDetails);
        assert_eq!(s.back(), Screen::Welcome);
        assert_eq!(s.back(), Screen::Welcome);
    }

    #[test]
    fn test_weight_entry_reprices() {
        let mut s = session();
        assert_eq!(s.order().price.value(), dec!(12.00));
        assert_eq!(s.enter_weight("5").unwrap(), dec!(5));
        assert_eq!(s.order().price.value(), dec!(15.00));

        assert_eq!(
            s.enter_weight("80"),
            Err("Weight must be between 0.1 and 70 kg".to_string())
        );
        assert_eq!(s.order().weight, dec!(5));

        s.select_service(ServiceTier::TwoDay);
        assert_eq!(s.order().price.value(), dec!(10.00));
        let quotes = s.quotes();
        assert_eq!(quotes[2], (ServiceTier::Ground, Money::new(dec!(5.49)).unwrap()));
    }

    #[test]
    fn test_destination_rules() {
        let mut s = session();
        assert_eq!(s.set_destination("short"), Err("Must be at least 10 characters".to_string()));
        assert!(s.set_destination("5000 Forbes Ave, Pittsburgh").is_ok());
        assert_eq!(s.order().destination, "5000 Forbes Ave, Pittsburgh");
    }

    #[test]
    fn test_saved_card_payment() {
        let mut s = session();
        for _ in 0..3 {
            s.next().unwrap();
        }
        assert!(matches!(
            s.pay_with_saved_card(""),
            Err(KioskError::ValidationError(m)) if m == "CVV is required"
        ));
        assert!(matches!(
            s.pay_with_saved_card("12a"),
            Err(KioskError::ValidationError(m)) if m == "CVV must be 3 digits"
        ));
        assert_eq!(s.screen(), Screen::Payment);

        s.pay_with_saved_card("123").unwrap();
        assert_eq!(s.screen(), Screen::Confirmation);
        assert!(s.receipt().is_none());
    }

    #[tokio::test]
    async fn test_new_card_payment_success() {
        let mut s = session();
        for _ in 0..3 {
            s.next().unwrap();
        }
        let receipt = s
            .pay_with_new_card(&processor(FixedBackend::approving()), &card())
            .await
            .unwrap();

        assert_eq!(receipt.amount, s.order().price);
        assert_eq!(s.screen(), Screen::Confirmation);
        assert_eq!(s.payment_method(), PaymentMethod::NewCard);

        let confirmation = s.confirmation(today());
        assert_eq!(confirmation.receipt, Some(receipt));
        assert_eq!(
            confirmation.estimated_delivery,
            NaiveDate::from_ymd_opt(2025, 6, 16).unwrap()
        );
    }

    #[tokio::test]
    async fn test_declined_payment_stays_on_payment_screen() {
        let mut s = session();
        for _ in 0..3 {
            s.next().unwrap();
        }
        let error = s
            .pay_with_new_card(&processor(FixedBackend::declining()), &card())
            .await
            .unwrap_err();
        assert!(matches!(error, KioskError::Payment(PaymentFailure::Declined)));
        assert_eq!(s.screen(), Screen::Payment);
        assert!(s.next().is_err());
    }

    #[tokio::test]
    async fn test_payment_only_taken_on_payment_screen() {
        let mut s = session();
        assert!(matches!(
            s.pay_with_saved_card("123"),
            Err(KioskError::Navigation(_))
        ));
        assert_eq!(s.screen(), Screen::Welcome);

        s.next().unwrap();
        let backend = FixedBackend::approving();
        let error = s
            .pay_with_new_card(&processor(backend.clone()), &card())
            .await
            .unwrap_err();
        assert!(matches!(error, KioskError::Navigation(_)));
        assert_eq!(s.screen(), Screen::PackageDetails);
        assert_eq!(backend.calls(), 0);
        assert!(s.receipt().is_none());
    }

    #[test]
    fn test_start_new_resets_payment_state() {
        let mut s = session();
        for _ in 0..3 {
            s.next().unwrap();
        }
        s.select_payment_method(PaymentMethod::NewCard);
        s.pay_with_saved_card("123").unwrap();

        s.start_new(today());
        assert_eq!(s.screen(), Screen::Welcome);
        assert_eq!(s.payment_method(), PaymentMethod::SavedCard);
        assert!(s.receipt().is_none());
        assert!(s.order().tracking_number.as_str().starts_with("TS250615"));
    }
}
