//! Input normalisation and validation helpers shared by the API and services

use once_cell::sync::Lazy;
use regex::Regex;

static EMAIL_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z0-9._%+\-]+@[A-Za-z0-9\-]+(\.[A-Za-z0-9\-]+)*\.[A-Za-z]{2,}$")
        .expect("email regex is valid")
});

/// Maximum length of an email address (RFC 5321)
pub const MAX_EMAIL_LENGTH: usize = 254;

/// Trim and lowercase an email address for storage and lookup
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Check if an email address is well formed
pub fn is_valid_email(email: &str) -> bool {
    let email = email.trim();
    email.len() <= MAX_EMAIL_LENGTH && EMAIL_REGEX.is_match(email)
}

/// List what a password is missing; empty when it is acceptable
pub fn password_strength_issues(password: &str, min_length: usize) -> Vec<String> {
    let mut issues = Vec::new();
    if password.chars().count() < min_length {
        issues.push(format!("must be at least {} characters", min_length));
    }
    if !password.chars().any(|c| c.is_alphabetic()) {
        issues.push("must contain a letter".to_string());
    }
    if !password.chars().any(|c| c.is_ascii_digit()) {
        issues.push("must contain a digit".to_string());
    }
    issues
}
