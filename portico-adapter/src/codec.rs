//! Field codec
//!
//! Normalization of primitive values before they are embedded in a request
//! body. Every function either returns the normalized value or fails with
//! [`Error::Validation`]; nothing is partially normalized.

use crate::{Error, Result};
use regex::Regex;
use rust_decimal::{Decimal, RoundingStrategy};
use std::str::FromStr;

/// Currencies accepted when the caller supplies no allow-list
pub const DEFAULT_ALLOWED_CURRENCIES: &[&str] = &["usd"];

/// Maximum digits kept for a phone number
pub const MAX_PHONE_LENGTH: usize = 20;

/// Maximum characters kept for a postal code
pub const MAX_ZIP_LENGTH: usize = 9;

/// Maximum email length
pub const MAX_EMAIL_LENGTH: usize = 100;

lazy_static::lazy_static! {
    static ref EMAIL_REGEX: Regex = Regex::new(
        r"^[A-Za-z0-9.!#$%&'*+/=?^_`{|}~-]+@[A-Za-z0-9](?:[A-Za-z0-9-]{0,61}[A-Za-z0-9])?(?:\.[A-Za-z0-9](?:[A-Za-z0-9-]{0,61}[A-Za-z0-9])?)+$"
    )
    .unwrap();
}

/// Cardholder fields with a maximum length
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CardholderField {
    /// First name
    FirstName,
    /// Last name
    LastName,
    /// City
    City,
    /// State / province
    State,
    /// Street address
    Address,
}

impl CardholderField {
    /// Maximum length accepted by the processor
    pub fn max_length(&self) -> usize {
        match self {
            CardholderField::FirstName | CardholderField::LastName => 26,
            CardholderField::City | CardholderField::State => 20,
            CardholderField::Address => 50,
        }
    }

    fn label(&self) -> &'static str {
        match self {
            CardholderField::FirstName => "first name",
            CardholderField::LastName => "last name",
            CardholderField::City => "city",
            CardholderField::State => "state",
            CardholderField::Address => "address",
        }
    }
}

/// Normalize a raw amount to a string with exactly two decimal places.
///
/// Rejects absent and negative values, strips everything but digits and the
/// decimal point, rounds to three places and then to two.
pub fn normalize_amount(raw: Option<&str>) -> Result<String> {
    let raw = raw
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| Error::Validation("Amount is required".to_string()))?;

    if raw.contains('-') {
        return Err(Error::Validation(
            "Must be greater than or equal to 0".to_string(),
        ));
    }

    let digits: String = raw
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.')
        .collect();

    let value = Decimal::from_str(&digits)
        .map_err(|_| Error::Validation(format!("Invalid amount: {}", raw)))?;

    format_amount(value)
}

/// Format a decimal amount with exactly two decimal places
pub fn format_amount(value: Decimal) -> Result<String> {
    if value.is_sign_negative() && !value.is_zero() {
        return Err(Error::Validation(
            "Must be greater than or equal to 0".to_string(),
        ));
    }

    let mut rounded = value
        .round_dp_with_strategy(3, RoundingStrategy::MidpointAwayFromZero)
        .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    rounded.rescale(2);

    Ok(rounded.to_string())
}

/// Validate a currency against `allowed` (or the default allow-list),
/// case-insensitively. Returns the lower-cased code.
pub fn check_currency(raw: &str, allowed: Option<&[&str]>) -> Result<String> {
    let currency = raw.trim().to_lowercase();
    if currency.is_empty() {
        return Err(Error::Validation("Currency cannot be none".to_string()));
    }

    let allowed = allowed.unwrap_or(DEFAULT_ALLOWED_CURRENCIES);
    if !allowed.iter().any(|c| c.eq_ignore_ascii_case(&currency)) {
        return Err(Error::Validation(format!(
            "Currency '{}' is not supported, expected one of: {}",
            currency,
            allowed.join(", ")
        )));
    }

    Ok(currency)
}

/// Keep only digits; at most [`MAX_PHONE_LENGTH`]
pub fn clean_phone(raw: &str) -> Result<String> {
    let phone: String = raw.chars().filter(|c| c.is_ascii_digit()).collect();
    if phone.len() > MAX_PHONE_LENGTH {
        return Err(Error::Validation(format!(
            "The value for phone number can be no more than {} characters, please try again",
            MAX_PHONE_LENGTH
        )));
    }
    Ok(phone)
}

/// Keep only alphanumerics; at most [`MAX_ZIP_LENGTH`]
pub fn clean_zip(raw: &str) -> Result<String> {
    let zip: String = raw.chars().filter(|c| c.is_ascii_alphanumeric()).collect();
    if zip.len() > MAX_ZIP_LENGTH {
        return Err(Error::Validation(format!(
            "The value for zip code can be no more than {} characters, please try again",
            MAX_ZIP_LENGTH
        )));
    }
    Ok(zip)
}

/// Sanitize free cardholder text.
///
/// Trims, drops control characters and markup characters. When `field` is
/// given its maximum length is enforced on the sanitized value; untagged
/// text skips the length check.
pub fn check_cardholder_data(raw: &str, field: Option<CardholderField>) -> Result<String> {
    let value: String = raw
        .trim()
        .chars()
        .filter(|c| !c.is_control() && !matches!(c, '<' | '>' | '"' | '`'))
        .collect();

    if let Some(field) = field {
        let length = value.chars().count();
        if length > field.max_length() {
            return Err(Error::Validation(format!(
                "The value for {} can be no more than {} characters, please try again",
                field.label(),
                field.max_length()
            )));
        }
    }

    Ok(value)
}

/// Sanitize and validate an email address
pub fn check_email(raw: &str) -> Result<String> {
    let email: String = raw
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || "!#$%&'*+-=?^_`{|}~@.[]/".contains(*c))
        .collect();

    if !EMAIL_REGEX.is_match(&email) {
        return Err(Error::Validation("Invalid email address".to_string()));
    }

    if email.len() > MAX_EMAIL_LENGTH {
        return Err(Error::Validation(format!(
            "The value for email can be no more than {} characters, please try again",
            MAX_EMAIL_LENGTH
        )));
    }

    Ok(email)
}
