use std::fmt;

use chrono::{DateTime, Utc};
use thiserror::Error;
use uuid::Uuid;

use crate::domain::{
    password::SecretHash, phone_number::PhoneNumber, role::Role,
    verification_code::VerificationCode,
};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum IdentityIdError {
    #[error("Invalid identity id")]
    Invalid,
}

/// Opaque unique identifier of an identity record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct IdentityId(Uuid);

impl IdentityId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn parse(input: &str) -> Result<Self, IdentityIdError> {
        Uuid::parse_str(input)
            .map(Self)
            .map_err(|_| IdentityIdError::Invalid)
    }
}

impl fmt::Display for IdentityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// An outstanding verification code and its expiry.
///
/// Modeled as one value so the code and the expiry are set and cleared
/// together; one cannot exist without the other.
#[derive(Debug, Clone)]
pub struct PendingCode {
    pub code: VerificationCode,
    pub expires_at: DateTime<Utc>,
}

/// The persisted user record, as seen through the identity store port.
#[derive(Debug, Clone)]
pub struct Identity {
    id: IdentityId,
    phone_number: PhoneNumber,
    role: Role,
    secret_hash: SecretHash,
    is_verified: bool,
    pending_code: Option<PendingCode>,
    last_login_at: Option<DateTime<Utc>>,
}

impl Identity {
    pub fn new(phone_number: PhoneNumber, role: Role, secret_hash: SecretHash) -> Self {
        Self {
            id: IdentityId::new(),
            phone_number,
            role,
            secret_hash,
            is_verified: false,
            pending_code: None,
            last_login_at: None,
        }
    }

    /// Rehydrate a record previously persisted through the identity store
    /// port.
    pub fn restore(
        id: IdentityId,
        phone_number: PhoneNumber,
        role: Role,
        secret_hash: SecretHash,
        is_verified: bool,
        pending_code: Option<PendingCode>,
        last_login_at: Option<DateTime<Utc>>,
    ) -> Self {
        Self {
            id,
            phone_number,
            role,
            secret_hash,
            is_verified,
            pending_code,
            last_login_at,
        }
    }

    pub fn id(&self) -> IdentityId {
        self.id
    }

    pub fn phone_number(&self) -> &PhoneNumber {
        &self.phone_number
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn secret_hash(&self) -> &SecretHash {
        &self.secret_hash
    }

    pub fn is_verified(&self) -> bool {
        self.is_verified
    }

    pub fn pending_code(&self) -> Option<&PendingCode> {
        self.pending_code.as_ref()
    }

    pub fn last_login_at(&self) -> Option<DateTime<Utc>> {
        self.last_login_at
    }

    pub fn set_secret_hash(&mut self, hash: SecretHash) {
        self.secret_hash = hash;
    }

    pub fn set_pending_code(&mut self, code: VerificationCode, expires_at: DateTime<Utc>) {
        self.pending_code = Some(PendingCode { code, expires_at });
    }

    /// Consume the pending code if it matches `submitted`. Returns the
    /// consumed code, or `None` when no code is stored or a different code
    /// is stored. On success the record is marked verified.
    pub fn consume_pending_code(&mut self, submitted: &VerificationCode) -> Option<PendingCode> {
        match &self.pending_code {
            Some(pending) if &pending.code == submitted => {
                self.is_verified = true;
                self.pending_code.take()
            }
            _ => None,
        }
    }

    pub fn set_last_login(&mut self, at: DateTime<Utc>) {
        self.last_login_at = Some(at);
    }
}

#[cfg(test)]
mod tests {
    use secrecy::Secret;

    use super::*;

    fn identity() -> Identity {
        Identity::new(
            PhoneNumber::parse("+40712345678").unwrap(),
            Role::Admin,
            SecretHash::new(Secret::from("$argon2id$stub".to_string())),
        )
    }

    #[test]
    fn test_new_identity_is_unverified_with_no_pending_code() {
        let identity = identity();
        assert!(!identity.is_verified());
        assert!(identity.pending_code().is_none());
        assert!(identity.last_login_at().is_none());
    }

    #[test]
    fn test_consume_pending_code_marks_verified_and_clears() {
        let mut identity = identity();
        let code = VerificationCode::parse("123456").unwrap();
        identity.set_pending_code(code.clone(), Utc::now());

        assert!(identity.consume_pending_code(&code).is_some());
        assert!(identity.is_verified());
        assert!(identity.pending_code().is_none());
    }

    #[test]
    fn test_consume_rejects_mismatched_code() {
        let mut identity = identity();
        identity.set_pending_code(VerificationCode::parse("123456").unwrap(), Utc::now());

        let wrong = VerificationCode::parse("654321").unwrap();
        assert!(identity.consume_pending_code(&wrong).is_none());
        assert!(!identity.is_verified());
        assert!(identity.pending_code().is_some());
    }

    #[test]
    fn test_consume_twice_fails_the_second_time() {
        let mut identity = identity();
        let code = VerificationCode::parse("123456").unwrap();
        identity.set_pending_code(code.clone(), Utc::now());

        assert!(identity.consume_pending_code(&code).is_some());
        assert!(identity.consume_pending_code(&code).is_none());
    }

    #[test]
    fn test_ids_are_unique() {
        assert_ne!(IdentityId::new(), IdentityId::new());
    }

    #[test]
    fn test_id_parse_roundtrip() {
        let id = IdentityId::new();
        assert_eq!(IdentityId::parse(&id.to_string()), Ok(id));
        assert_eq!(
            IdentityId::parse("not-a-uuid"),
            Err(IdentityIdError::Invalid)
        );
    }
}
