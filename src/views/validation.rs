//! Input validation for the admin forms.
//!
//! Failures are collected per field so a form can be re-rendered with every
//! problem listed at once.

use lazy_static::lazy_static;
use regex::Regex;
use std::collections::BTreeMap;

lazy_static! {
    /// Pragmatic e-mail shape check; the users backend does the real one
    static ref EMAIL_REGEX: Regex = Regex::new(
        r"^[A-Za-z0-9._%+-]+@[A-Za-z0-9-]+(\.[A-Za-z0-9-]+)*\.[A-Za-z]{2,}$"
    ).unwrap();

    /// Phone numbers: digits with optional +, spaces, dashes, dots and parentheses
    static ref PHONE_REGEX: Regex = Regex::new(
        r"^\+?[0-9 ().-]{5,20}$"
    ).unwrap();
}

/// Field name → messages
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct FieldErrors {
    errors: BTreeMap<String, Vec<String>>,
}

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) -> &mut Self {
        self.errors
            .entry(field.into())
            .or_default()
            .push(message.into());
        self
    }

    /// Record the error of a `Result<_, String>` check under `field`.
    pub fn check<T>(&mut self, field: &str, result: Result<T, String>) -> Option<T> {
        match result {
            Ok(value) => Some(value),
            Err(message) => {
                self.add(field, message);
                None
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// Flattened messages in field order, for display.
    pub fn messages(&self) -> Vec<String> {
        self.errors.values().flatten().cloned().collect()
    }

    pub fn has(&self, field: &str) -> bool {
        self.errors.contains_key(field)
    }

    pub fn finish(self) -> Result<(), FieldErrors> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

/// Required free text, trimmed, at most `max` characters.
pub fn required_text(value: &str, label: &str, max: usize) -> Result<String, String> {
    let value = value.trim();
    if value.is_empty() {
        return Err(format!("{} is required", label));
    }
    if value.chars().count() > max {
        return Err(format!("{} is too long (max {} characters)", label, max));
    }
    Ok(value.to_string())
}

pub fn validate_email(email: &str) -> Result<String, String> {
    let email = email.trim();
    if email.is_empty() {
        return Err("Email is required".to_string());
    }
    if email.len() > 254 || !EMAIL_REGEX.is_match(email) {
        return Err("Invalid email format".to_string());
    }
    Ok(email.to_string())
}

/// Optional e-mail: blank is fine, otherwise it must look like one.
pub fn optional_email(email: &str) -> Result<String, String> {
    if email.trim().is_empty() {
        Ok(String::new())
    } else {
        validate_email(email)
    }
}

pub fn optional_phone(phone: &str) -> Result<String, String> {
    let phone = phone.trim();
    if phone.is_empty() || PHONE_REGEX.is_match(phone) {
        Ok(phone.to_string())
    } else {
        Err("Invalid phone number".to_string())
    }
}

pub fn validate_password(password: &str) -> Result<String, String> {
    if password.is_empty() {
        return Err("Password is required".to_string());
    }
    if password.len() < 6 {
        return Err("Password must be at least 6 characters".to_string());
    }
    Ok(password.to_string())
}

/// Non-negative decimal amount such as a cost or price.
pub fn amount(value: &str, label: &str) -> Result<f64, String> {
    let value = value.trim();
    if value.is_empty() {
        return Err(format!("{} is required", label));
    }
    match value.parse::<f64>() {
        Ok(n) if n.is_finite() && n >= 0.0 => Ok(n),
        Ok(_) => Err(format!("{} cannot be negative", label)),
        Err(_) => Err(format!("{} must be a number", label)),
    }
}

/// Non-negative whole number such as a stock count. Blank means zero when
/// `blank_is_zero` is set.
pub fn count(value: &str, label: &str, blank_is_zero: bool) -> Result<i64, String> {
    let value = value.trim();
    if value.is_empty() {
        return if blank_is_zero {
            Ok(0)
        } else {
            Err(format!("{} is required", label))
        };
    }
    match value.parse::<i64>() {
        Ok(n) if n >= 0 => Ok(n),
        Ok(_) => Err(format!("{} cannot be negative", label)),
        Err(_) => Err(format!("{} must be a whole number", label)),
    }
}
