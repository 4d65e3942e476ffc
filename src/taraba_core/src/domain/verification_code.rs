use std::fmt;

use rand::Rng;
use thiserror::Error;

/// Fixed length of a verification code, in decimal digits.
pub const CODE_LENGTH: usize = 6;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum VerificationCodeError {
    #[error("Verification code must be exactly {CODE_LENGTH} digits")]
    Malformed,
}

/// A short-lived one-time code sent to a phone number.
///
/// Drawn uniformly from the full 6-digit space; carries no relation to the
/// identity it is issued for or to the time it was generated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerificationCode(String);

impl VerificationCode {
    pub fn generate() -> Self {
        let value = rand::rng().random_range(0..1_000_000u32);
        Self(format!("{value:06}"))
    }

    /// Parse a caller-submitted code. Format is validated before any
    /// comparison against a stored code happens.
    pub fn parse(input: &str) -> Result<Self, VerificationCodeError> {
        if input.len() != CODE_LENGTH || !input.bytes().all(|b| b.is_ascii_digit()) {
            return Err(VerificationCodeError::Malformed);
        }
        Ok(Self(input.to_owned()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for VerificationCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use quickcheck_macros::quickcheck;

    use super::*;

    #[test]
    fn test_generated_codes_are_six_digits() {
        for _ in 0..100 {
            let code = VerificationCode::generate();
            assert_eq!(code.as_str().len(), CODE_LENGTH);
            assert!(code.as_str().bytes().all(|b| b.is_ascii_digit()));
        }
    }

    #[test]
    fn test_parse_accepts_leading_zeros() {
        let code = VerificationCode::parse("001234").unwrap();
        assert_eq!(code.as_str(), "001234");
    }

    #[test]
    fn test_parse_rejects_wrong_length() {
        assert_eq!(
            VerificationCode::parse("12345"),
            Err(VerificationCodeError::Malformed)
        );
        assert_eq!(
            VerificationCode::parse("1234567"),
            Err(VerificationCodeError::Malformed)
        );
    }

    #[test]
    fn test_parse_rejects_non_digits() {
        assert_eq!(
            VerificationCode::parse("12a456"),
            Err(VerificationCodeError::Malformed)
        );
        assert_eq!(
            VerificationCode::parse("12 456"),
            Err(VerificationCodeError::Malformed)
        );
    }

    #[quickcheck]
    fn prop_parse_roundtrips_generated_codes(_seed: u8) -> bool {
        let code = VerificationCode::generate();
        VerificationCode::parse(code.as_str()) == Ok(code)
    }
}
