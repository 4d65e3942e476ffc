use secrecy::Secret;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PasswordError {
    #[error("Secret must not be empty")]
    Empty,
}

/// A plaintext secret in transit. Never stored; never logged.
///
/// Length policy is enforced by the credential hasher, where the configured
/// minimum lives.
#[derive(Debug, Clone)]
pub struct Password(Secret<String>);

impl Password {
    pub fn as_ref(&self) -> &Secret<String> {
        &self.0
    }
}

impl TryFrom<Secret<String>> for Password {
    type Error = PasswordError;

    fn try_from(value: Secret<String>) -> Result<Self, Self::Error> {
        use secrecy::ExposeSecret;

        if value.expose_secret().is_empty() {
            return Err(PasswordError::Empty);
        }
        Ok(Self(value))
    }
}

/// The stored output of the credential hasher (a PHC-format string).
#[derive(Debug, Clone)]
pub struct SecretHash(Secret<String>);

impl SecretHash {
    pub fn new(hash: Secret<String>) -> Self {
        Self(hash)
    }

    pub fn as_ref(&self) -> &Secret<String> {
        &self.0
    }
}
