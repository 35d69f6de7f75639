//! Phone number and name handling for the signup and login forms

use std::sync::OnceLock;

use regex::Regex;
use thiserror::Error;

/// Length of a national mobile number (`09xxxxxxxxx`)
pub const PHONE_LENGTH: usize = 11;

/// Minimum number of characters in a full name
pub const MIN_FULLNAME_CHARS: usize = 3;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum FormError {
    #[error("Full name must be at least {MIN_FULLNAME_CHARS} characters!")]
    FullnameTooShort,
    #[error("Invalid phone number! It must be 11 digits and start with 09.")]
    InvalidPhone,
}

fn phone_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^09[0-9]{9}$").expect("valid phone regex"))
}

/// Normalize a phone field after every edit.
///
/// Non-digits are removed. Numbers starting with `0` are capped at 11
/// digits; a `98` country prefix is rewritten to a leading `0`.
pub fn format_phone_number(raw: &str) -> String {
    let digits: String = raw.chars().filter(|c| c.is_ascii_digit()).collect();
    if digits.starts_with('0') {
        digits.chars().take(PHONE_LENGTH).collect()
    } else if let Some(rest) = digits.strip_prefix("98") {
        format!("0{}", rest)
    } else {
        digits
    }
}

pub fn validate_phone(phone: &str) -> Result<(), FormError> {
    let phone = phone.trim();
    if phone.len() == PHONE_LENGTH && phone_pattern().is_match(phone) {
        Ok(())
    } else {
        Err(FormError::InvalidPhone)
    }
}

pub fn validate_fullname(name: &str) -> Result<(), FormError> {
    if name.trim().chars().count() < MIN_FULLNAME_CHARS {
        return Err(FormError::FullnameTooShort);
    }
    Ok(())
}

/// Group an 11-digit number as `0912 345 6789` for display.
/// Anything else is returned unchanged.
pub fn display_phone(phone: &str) -> String {
    if phone.len() == PHONE_LENGTH && phone.chars().all(|c| c.is_ascii_digit()) {
        format!("{} {} {}", &phone[..4], &phone[4..7], &phone[7..])
    } else {
        phone.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_strips_and_caps() {
        assert_eq!(format_phone_number("0912-345 6789"), "09123456789");
        assert_eq!(format_phone_number("091234567890000"), "09123456789");
    }

    #[test]
    fn test_format_rewrites_country_prefix() {
        assert_eq!(format_phone_number("+98 912 345 6789"), "09123456789");
        assert_eq!(format_phone_number("98"), "0");
    }

    #[test]
    fn test_format_leaves_other_numbers() {
        assert_eq!(format_phone_number("912"), "912");
        assert_eq!(format_phone_number("abc"), "");
    }

    #[test]
    fn test_validate_phone() {
        assert!(validate_phone("09123456789").is_ok());
        assert!(validate_phone(" 09123456789 ").is_ok());
        assert_eq!(validate_phone("0912345678"), Err(FormError::InvalidPhone));
        assert_eq!(validate_phone("08123456789"), Err(FormError::InvalidPhone));
        assert_eq!(validate_phone(""), Err(FormError::InvalidPhone));
    }

    #[test]
    fn test_validate_fullname() {
        assert!(validate_fullname("Ali Rezaei").is_ok());
        assert!(validate_fullname("علی").is_ok());
        assert_eq!(validate_fullname("  Al  "), Err(FormError::FullnameTooShort));
    }

    #[test]
    fn test_display_phone() {
        assert_eq!(display_phone("09123456789"), "0912 345 6789");
        assert_eq!(display_phone("0912"), "0912");
    }
}
