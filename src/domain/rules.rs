//! Field-level validation rules.
//!
//! Each form field carries a fixed, ordered chain of rules. A chain stops at
//! the first failing rule and reports only that rule's message, so a user
//! sees one problem per field at a time.

use crate::error::{KioskError, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

static NUMERIC: LazyLock<Regex> = LazyLock::new(|| compile(r"^[0-9]+(\.[0-9]+)?$"));
static EMAIL: LazyLock<Regex> = LazyLock::new(|| compile(r"^[^\s@]+@[^\s@]+\.[^\s@]+$"));
static PHONE: LazyLock<Regex> = LazyLock::new(|| compile(r"^\+?[0-9\s\-()]{10,}$"));
static ZIP_CODE: LazyLock<Regex> = LazyLock::new(|| compile(r"^[0-9]{5}(-[0-9]{4})?$"));
static NAME: LazyLock<Regex> = LazyLock::new(|| compile(r"^[a-zA-Z\s'\-]{2,}$"));
static ADDRESS: LazyLock<Regex> = LazyLock::new(|| compile(r"^[a-zA-Z0-9\s,.\-#]{5,}$"));
static CARD_NUMBER_INPUT: LazyLock<Regex> = LazyLock::new(|| compile(r"^[0-9\s]{13,19}$"));
static CVV_INPUT: LazyLock<Regex> = LazyLock::new(|| compile(r"^[0-9]{3,4}$"));
static EXPIRY_INPUT: LazyLock<Regex> = LazyLock::new(|| compile(r"^[0-9]{2}/[0-9]{2}$"));

// Only called on the literals above.
fn compile(pattern: &str) -> Regex {
    Regex::new(pattern).unwrap_or_else(|e| panic!("invalid built-in pattern {pattern}: {e}"))
}

/// Result of evaluating one rule against one value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RuleOutcome {
    pub valid: bool,
    pub message: String,
}

impl RuleOutcome {
    fn new(valid: bool, message: impl Into<String>) -> Self {
        Self {
            valid,
            message: message.into(),
        }
    }
}

/// Upper bound accepted by the `weight` rule, in kilograms.
pub const MAX_WEIGHT_KG: f64 = 70.0;

#[derive(Debug, Clone)]
pub enum Rule {
    Required,
    MinLength(usize),
    MaxLength(usize),
    Pattern { regex: Regex, message: String },
    Numeric,
    PositiveNumber,
    /// Accepts `0 < w <= 70`. The message advertises 0.1 kg as the floor but
    /// the check is strictly greater than zero; both are kept as shipped.
    Weight,
    Email,
    Phone,
    ZipCode,
    Name,
    Address,
}

impl Rule {
    pub fn pattern(regex: Regex, message: impl Into<String>) -> Self {
        Self::Pattern {
            regex,
            message: message.into(),
        }
    }

    /// Builds a rule from its name and optional parameter.
    ///
    /// `minLength`/`maxLength` take a count, `pattern` takes a regular
    /// expression and reports "Invalid format" on mismatch.
    pub fn from_name(name: &str, param: Option<&str>) -> Result<Self> {
        let rule = match name {
            "required" => Self::Required,
            "minLength" => Self::MinLength(length_param(name, param)?),
            "maxLength" => Self::MaxLength(length_param(name, param)?),
            "pattern" => {
                let source = param.ok_or_else(|| KioskError::InvalidRuleParam {
                    rule: name.to_string(),
                    reason: "a regular expression is required".to_string(),
                })?;
                let regex = Regex::new(source).map_err(|e| KioskError::InvalidRuleParam {
                    rule: name.to_string(),
                    reason: e.to_string(),
                })?;
                Self::pattern(regex, "Invalid format")
            }
            "numeric" => Self::Numeric,
            "positiveNumber" => Self::PositiveNumber,
            "weight" => Self::Weight,
            "email" => Self::Email,
            "phone" => Self::Phone,
            "zipCode" => Self::ZipCode,
            "name" => Self::Name,
            "address" => Self::Address,
            other => return Err(KioskError::UnknownRule(other.to_string())),
        };
        Ok(rule)
    }

    /// Evaluates the rule. Apart from `required`, `minLength` and `weight`,
    /// rules accept an empty value so optional fields can share them.
    pub fn evaluate(&self, value: &str) -> RuleOutcome {
        match self {
            Self::Required => {
                RuleOutcome::new(!value.trim().is_empty(), "This field is required")
            }
            Self::MinLength(min) => RuleOutcome::new(
                !value.is_empty() && value.chars().count() >= *min,
                format!("Must be at least {min} characters"),
            ),
            Self::MaxLength(max) => RuleOutcome::new(
                value.chars().count() <= *max,
                format!("Must be no more than {max} characters"),
            ),
            Self::Pattern { regex, message } => {
                RuleOutcome::new(value.is_empty() || regex.is_match(value), message.clone())
            }
            Self::Numeric => RuleOutcome::new(
                value.is_empty() || NUMERIC.is_match(value),
                "Please enter a valid number",
            ),
            Self::PositiveNumber => RuleOutcome::new(
                value.is_empty() || parse_number(value).is_some_and(|n| n > 0.0),
                "Must be a positive number",
            ),
            Self::Weight => RuleOutcome::new(
                parse_number(value).is_some_and(|w| w > 0.0 && w <= MAX_WEIGHT_KG),
                "Weight must be between 0.1 and 70 kg",
            ),
            Self::Email => optional_match(&EMAIL, value, "Please enter a valid email address"),
            Self::Phone => optional_match(&PHONE, value, "Please enter a valid phone number"),
            Self::ZipCode => optional_match(&ZIP_CODE, value, "Please enter a valid ZIP code"),
            Self::Name => optional_match(&NAME, value, "Please enter a valid name"),
            Self::Address => optional_match(&ADDRESS, value, "Please enter a valid address"),
        }
    }
}

fn optional_match(regex: &Regex, value: &str, message: &str) -> RuleOutcome {
    RuleOutcome::new(value.is_empty() || regex.is_match(value), message)
}

fn parse_number(value: &str) -> Option<f64> {
    value.trim().parse::<f64>().ok().filter(|n| n.is_finite())
}

fn length_param(rule: &str, param: Option<&str>) -> Result<usize> {
    param
        .and_then(|p| p.trim().parse().ok())
        .ok_or_else(|| KioskError::InvalidRuleParam {
            rule: rule.to_string(),
            reason: format!("expected a length, got {param:?}"),
        })
}

/// Evaluates a single named rule against `value`.
pub fn evaluate(rule_name: &str, value: &str, param: Option<&str>) -> Result<RuleOutcome> {
    Ok(Rule::from_name(rule_name, param)?.evaluate(value))
}

/// One link in a field's rule chain, with an optional message override.
#[derive(Debug, Clone)]
pub struct RuleStep {
    pub rule: Rule,
    pub message: Option<&'static str>,
}

impl From<Rule> for RuleStep {
    fn from(rule: Rule) -> Self {
        Self {
            rule,
            message: None,
        }
    }
}

/// Input fields known to the kiosk forms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FormField {
    PackageWeight,
    DestinationAddress,
    CardNumber,
    Expiry,
    Cvv,
    Cardholder,
}

impl FormField {
    pub fn id(self) -> &'static str {
        match self {
            Self::PackageWeight => "package-weight",
            Self::DestinationAddress => "destination-address",
            Self::CardNumber => "card-number",
            Self::Expiry => "expiry",
            Self::Cvv => "cvv",
            Self::Cardholder => "cardholder",
        }
    }

    /// The field's rule chain, in evaluation order.
    pub fn rules(self) -> Vec<RuleStep> {
        match self {
            Self::PackageWeight => vec![Rule::Required.into(), Rule::Numeric.into(), Rule::Weight.into()],
            Self::DestinationAddress => vec![
                Rule::Required.into(),
                Rule::MinLength(10).into(),
                Rule::Address.into(),
            ],
            Self::CardNumber => vec![
                Rule::Required.into(),
                overridden(&CARD_NUMBER_INPUT, "Please enter a valid card number"),
            ],
            Self::Expiry => vec![
                Rule::Required.into(),
                overridden(&EXPIRY_INPUT, "Please enter expiry as MM/YY"),
            ],
            Self::Cvv => vec![
                Rule::Required.into(),
                overridden(&CVV_INPUT, "Please enter a valid CVV"),
            ],
            Self::Cardholder => vec![Rule::Required.into(), Rule::MinLength(2).into(), Rule::Name.into()],
        }
    }
}

fn overridden(regex: &LazyLock<Regex>, message: &'static str) -> RuleStep {
    RuleStep {
        rule: Rule::pattern(Regex::clone(regex), message),
        message: Some(message),
    }
}

impl fmt::Display for FormField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for FormField {
    type Err = KioskError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        [
            Self::PackageWeight,
            Self::DestinationAddress,
            Self::CardNumber,
            Self::Expiry,
            Self::Cvv,
            Self::Cardholder,
        ]
        .into_iter()
        .find(|field| field.id() == s)
        .ok_or_else(|| KioskError::ValidationError(format!("unknown form field: {s}")))
    }
}

/// Runs `steps` in order and returns the message of the first failing rule.
pub fn run_chain(steps: &[RuleStep], value: &str) -> Option<String> {
    steps.iter().find_map(|step| {
        let outcome = step.rule.evaluate(value);
        if outcome.valid {
            None
        } else {
            Some(step.message.map(str::to_string).unwrap_or(outcome.message))
        }
    })
}

/// Validates one field; `Err` carries the first failing rule's message.
pub fn validate_field(field: FormField, value: &str) -> std::result::Result<(), String> {
    match run_chain(&field.rules(), value) {
        Some(message) => Err(message),
        None => Ok(()),
    }
}

/// Validates several fields, each with its own short-circuiting chain.
pub fn validate_form(
    entries: &[(FormField, &str)],
) -> std::result::Result<(), BTreeMap<FormField, String>> {
    let errors: BTreeMap<_, _> = entries
        .iter()
        .filter_map(|(field, value)| validate_field(*field, value).err().map(|m| (*field, m)))
        .collect();

    if errors.is_empty() { Ok(()) } else { Err(errors) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_required_trims() {
        assert!(!evaluate("required", "   ", None).unwrap().valid);
        assert!(evaluate("required", " x ", None).unwrap().valid);
    }

    #[test]
    fn test_length_rules() {
        assert!(!evaluate("minLength", "a", Some("2")).unwrap().valid);
        assert!(evaluate("minLength", "ab", Some("2")).unwrap().valid);
        assert!(!evaluate("minLength", "", Some("0")).unwrap().valid);
        assert_eq!(
            evaluate("minLength", "a", Some("2")).unwrap().message,
            "Must be at least 2 characters"
        );
        assert!(evaluate("maxLength", "", Some("3")).unwrap().valid);
        assert!(!evaluate("maxLength", "abcd", Some("3")).unwrap().valid);
    }

    #[test]
    fn test_pattern_rule_from_name() {
        let outcome = evaluate("pattern", "abc", Some(r"^[0-9]+$")).unwrap();
        assert!(!outcome.valid);
        assert_eq!(outcome.message, "Invalid format");
        assert!(evaluate("pattern", "", Some(r"^[0-9]+$")).unwrap().valid);
    }

    #[test]
    fn test_bad_rule_names_and_params() {
        assert!(matches!(
            evaluate("luhn", "4111", None),
            Err(KioskError::UnknownRule(_))
        ));
        assert!(matches!(
            evaluate("minLength", "abc", None),
            Err(KioskError::InvalidRuleParam { .. })
        ));
        assert!(matches!(
            evaluate("pattern", "abc", Some("(")),
            Err(KioskError::InvalidRuleParam { .. })
        ));
    }

    #[test]
    fn test_numeric_rules() {
        assert!(evaluate("numeric", "3.5", None).unwrap().valid);
        assert!(!evaluate("numeric", "3.", None).unwrap().valid);
        assert!(!evaluate("numeric", "-1", None).unwrap().valid);
        assert!(evaluate("positiveNumber", "0.01", None).unwrap().valid);
        assert!(!evaluate("positiveNumber", "0", None).unwrap().valid);
        assert!(!evaluate("positiveNumber", "abc", None).unwrap().valid);
    }

    #[test]
    fn test_weight_boundaries() {
        // Strictly above zero, even though the message says 0.1.
        assert!(evaluate("weight", "0.05", None).unwrap().valid);
        assert!(!evaluate("weight", "0", None).unwrap().valid);
        assert!(evaluate("weight", "70", None).unwrap().valid);
        assert!(!evaluate("weight", "70.01", None).unwrap().valid);
        assert!(!evaluate("weight", "", None).unwrap().valid);
        assert_eq!(
            evaluate("weight", "0", None).unwrap().message,
            "Weight must be between 0.1 and 70 kg"
        );
    }

    #[test]
    fn test_contact_patterns() {
        assert!(evaluate("email", "a@b.co", None).unwrap().valid);
        assert!(!evaluate("email", "a@b", None).unwrap().valid);
        assert!(evaluate("phone", "+1 (412) 555-0100", None).unwrap().valid);
        assert!(!evaluate("phone", "555-0100", None).unwrap().valid);
        assert!(evaluate("zipCode", "15213-3890", None).unwrap().valid);
        assert!(!evaluate("zipCode", "1521", None).unwrap().valid);
    }

    #[test]
    fn test_chain_stops_at_first_failure() {
        // Empty weight fails `required`; `weight` would fail too but is never reported.
        assert_eq!(
            validate_field(FormField::PackageWeight, ""),
            Err("This field is required".to_string())
        );
        assert_eq!(
            validate_field(FormField::PackageWeight, "abc"),
            Err("Please enter a valid number".to_string())
        );
        assert_eq!(
            validate_field(FormField::PackageWeight, "71"),
            Err("Weight must be between 0.1 and 70 kg".to_string())
        );
        assert_eq!(validate_field(FormField::PackageWeight, "3.0"), Ok(()));
    }

    #[test]
    fn test_field_message_override() {
        assert_eq!(
            validate_field(FormField::Expiry, "1225"),
            Err("Please enter expiry as MM/YY".to_string())
        );
        assert_eq!(
            validate_field(FormField::CardNumber, "4111"),
            Err("Please enter a valid card number".to_string())
        );
        assert_eq!(validate_field(FormField::Cvv, "123"), Ok(()));
    }

    #[test]
    fn test_cardholder_chain() {
        assert_eq!(
            validate_field(FormField::Cardholder, "J"),
            Err("Must be at least 2 characters".to_string())
        );
        assert_eq!(
            validate_field(FormField::Cardholder, "J0"),
            Err("Please enter a valid name".to_string())
        );
        assert_eq!(validate_field(FormField::Cardholder, "Jo O'Neil-Smith"), Ok(()));
    }

    #[test]
    fn test_validate_form_collects_per_field() {
        let result = validate_form(&[
            (FormField::PackageWeight, "0"),
            (FormField::DestinationAddress, "100 Main St"),
            (FormField::Cardholder, ""),
        ]);
        let errors = result.unwrap_err();
        assert_eq!(errors.len(), 2);
        assert!(errors.contains_key(&FormField::PackageWeight));
        assert!(errors.contains_key(&FormField::Cardholder));
    }

    #[test]
    fn test_form_field_ids_round_trip() {
        for id in ["package-weight", "destination-address", "card-number", "expiry", "cvv", "cardholder"] {
            assert_eq!(id.parse::<FormField>().unwrap().id(), id);
        }
    }
}
