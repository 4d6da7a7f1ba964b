use thiserror::Error;

/// Money is stored as integer minor units (cents) to avoid floating-point drift.
/// 100.00 = 10000 cents.
pub type Cents = i64;

/// Format cents as a plain decimal string.
/// Example: 7000 -> "70.00", -1234 -> "-12.34"
pub fn format_cents(cents: Cents) -> String {
    let sign = if cents < 0 { "-" } else { "" };
    let abs_cents = cents.unsigned_abs();
    format!("{}{}.{:02}", sign, abs_cents / 100, abs_cents % 100)
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseCentsError {
    #[error("amount is empty")]
    Empty,
    #[error("invalid money format")]
    InvalidFormat,
    #[error("amount is too large")]
    Overflow,
}

/// Parse a decimal string into cents.
/// Digits past the second decimal place are truncated: "100.999" -> 10099.
pub fn parse_cents(input: &str) -> Result<Cents, ParseCentsError> {
    let input = input.trim();
    if input.is_empty() {
        return Err(ParseCentsError::Empty);
    }

    let (negative, digits) = match input.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, input),
    };
    let (whole, fraction) = digits.split_once('.').unwrap_or((digits, ""));

    if whole.is_empty() && fraction.is_empty() {
        return Err(ParseCentsError::InvalidFormat);
    }
    let all_digits = |s: &str| s.bytes().all(|b| b.is_ascii_digit());
    if !all_digits(whole) || !all_digits(fraction) {
        return Err(ParseCentsError::InvalidFormat);
    }

    let units: i64 = if whole.is_empty() {
        0
    } else {
        whole.parse().map_err(|_| ParseCentsError::Overflow)?
    };

    let digit = |i: usize| i64::from(fraction.as_bytes()[i] - b'0');
    let fraction_cents: i64 = match fraction.len() {
        0 => 0,
        1 => digit(0) * 10,
        _ => digit(0) * 10 + digit(1),
    };

    let cents = units
        .checked_mul(100)
        .and_then(|c| c.checked_add(fraction_cents))
        .ok_or(ParseCentsError::Overflow)?;

    Ok(if negative { -cents } else { cents })
}
