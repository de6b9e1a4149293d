//! Display formatting and input masks for the kiosk forms.

use crate::domain::card::strip_whitespace;
use crate::domain::money::Money;

/// Masks all but the last four digits, grouped in fours.
///
/// Numbers shorter than four digits are returned as given.
pub fn mask_card_number(number: &str) -> String {
    let clean = strip_whitespace(number);
    let len = clean.chars().count();
    if len < 4 {
        return number.to_string();
    }

    let masked: String = clean
        .chars()
        .enumerate()
        .map(|(i, c)| if i < len - 4 { '*' } else { c })
        .collect();
    group_by_four(&masked)
}

fn group_by_four(value: &str) -> String {
    value
        .chars()
        .collect::<Vec<_>>()
        .chunks(4)
        .map(|chunk| chunk.iter().collect::<String>())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Renders a USD amount, e.g. `$1,234.50`.
pub fn format_amount(amount: Money) -> String {
    let cents = amount.to_string();
    let (whole, fraction) = cents.split_once('.').unwrap_or((cents.as_str(), "00"));

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, c) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    format!("${grouped}.{fraction}")
}

/// Card number field mask: digits only, in groups of four.
pub fn format_card_number_input(raw: &str) -> String {
    let digits: String = raw.chars().filter(char::is_ascii_digit).collect();
    group_by_four(&digits)
}

/// Expiry field mask: `1225` becomes `12/25`.
pub fn format_expiry_input(raw: &str) -> String {
    let digits: String = raw.chars().filter(char::is_ascii_digit).collect();
    if digits.len() >= 2 {
        let end = digits.len().min(4);
        format!("{}/{}", &digits[..2], &digits[2..end])
    } else {
        digits
    }
}

/// CVV field mask: at most four digits.
pub fn format_cvv_input(raw: &str) -> String {
    raw.chars().filter(char::is_ascii_digit).take(4).collect()
}

/// Displays a 10-digit phone number as `(412) 555-0100`.
///
/// Anything that does not hold exactly ten digits is returned as given.
pub fn format_phone(raw: &str) -> String {
    let digits: String = raw.chars().filter(char::is_ascii_digit).collect();
    if digits.len() == 10 {
        format!("({}) {}-{}", &digits[..3], &digits[3..6], &digits[6..])
    } else {
        raw.to_string()
    }
}

/// Keeps only the digits of a ZIP code, hyphenating ZIP+4.
pub fn format_zip(raw: &str) -> String {
    let digits: String = raw.chars().filter(char::is_ascii_digit).collect();
    if digits.len() == 9 {
        format!("{}-{}", &digits[..5], &digits[5..])
    } else {
        digits
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputKind {
    Text,
    Name,
    Phone,
    Numeric,
    Address,
    Zip,
}

/// Trims and filters free-form input for the given field kind.
///
/// Plain text is HTML-escaped rather than filtered.
pub fn sanitize_input(value: &str, kind: InputKind) -> String {
    let value = value.trim();
    match kind {
        InputKind::Name => {
            let kept: String = value
                .chars()
                .filter(|c| c.is_ascii_alphabetic() || c.is_whitespace() || *c == '\'' || *c == '-')
                .collect();
            kept.split_whitespace().collect::<Vec<_>>().join(" ")
        }
        InputKind::Phone => value
            .chars()
            .filter(|c| c.is_ascii_digit() || "+- ()".contains(*c) || c.is_whitespace())
            .collect(),
        InputKind::Numeric => value
            .chars()
            .filter(|c| c.is_ascii_digit() || *c == '.')
            .collect(),
        InputKind::Address => value
            .chars()
            .filter(|c| c.is_ascii_alphanumeric() || c.is_whitespace() || ",.-#".contains(*c))
            .collect(),
        InputKind::Zip => value
            .chars()
            .filter(|c| c.is_ascii_digit() || *c == '-')
            .collect(),
        InputKind::Text => {
            let mut escaped = String::with_capacity(value.len());
            for c in value.chars() {
                match c {
                    '&' => escaped.push_str("&amp;"),
                    '<' => escaped.push_str("&lt;"),
                    '>' => escaped.push_str("&gt;"),
                    '"' => escaped.push_str("&quot;"),
                    '\'' => escaped.push_str("&#x27;"),
                    other => escaped.push(other),
                }
            }
            escaped
        }
    }
}
