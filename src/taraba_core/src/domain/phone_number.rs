use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use thiserror::Error;

// E.164: leading +, country code starting 1-9, 8 to 15 digits total.
static E164_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\+[1-9]\d{7,14}$").expect("E.164 pattern is valid"));

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PhoneNumberError {
    #[error("Phone number must be in E.164 format")]
    InvalidFormat,
}

/// Canonical identity key: an E.164 international phone number.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PhoneNumber(String);

impl PhoneNumber {
    pub fn parse(input: &str) -> Result<Self, PhoneNumberError> {
        if E164_PATTERN.is_match(input) {
            Ok(Self(input.to_owned()))
        } else {
            Err(PhoneNumberError::InvalidFormat)
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for PhoneNumber {
    type Error = PhoneNumberError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl fmt::Display for PhoneNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use quickcheck_macros::quickcheck;

    use super::*;

    #[test]
    fn test_parse_valid_numbers() {
        for input in ["+40712345678", "+40722000000", "+15551234567", "+4915112345678"] {
            let phone = PhoneNumber::parse(input).unwrap();
            assert_eq!(phone.as_str(), input);
        }
    }

    #[test]
    fn test_parse_rejects_missing_plus() {
        assert_eq!(
            PhoneNumber::parse("40712345678"),
            Err(PhoneNumberError::InvalidFormat)
        );
    }

    #[test]
    fn test_parse_rejects_leading_zero_country_code() {
        assert_eq!(
            PhoneNumber::parse("+0712345678"),
            Err(PhoneNumberError::InvalidFormat)
        );
    }

    #[test]
    fn test_parse_rejects_non_digits() {
        assert_eq!(
            PhoneNumber::parse("+4071234abcd"),
            Err(PhoneNumberError::InvalidFormat)
        );
        assert_eq!(
            PhoneNumber::parse("+40 712 345 678"),
            Err(PhoneNumberError::InvalidFormat)
        );
    }

    #[test]
    fn test_parse_rejects_out_of_range_lengths() {
        assert_eq!(
            PhoneNumber::parse("+1234567"),
            Err(PhoneNumberError::InvalidFormat)
        );
        assert_eq!(
            PhoneNumber::parse("+1234567890123456"),
            Err(PhoneNumberError::InvalidFormat)
        );
    }

    #[quickcheck]
    fn prop_strings_without_plus_prefix_never_parse(input: String) -> bool {
        input.starts_with('+') || PhoneNumber::parse(&input).is_err()
    }
}
