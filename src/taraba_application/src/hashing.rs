use argon2::{
    Algorithm, Argon2, Params, PasswordHash, PasswordVerifier, Version,
    password_hash::{self, PasswordHasher, SaltString, rand_core},
};
use secrecy::{ExposeSecret, Secret};
use taraba_core::{Password, SecretHash};
use thiserror::Error;

/// Work-factor and policy knobs for credential hashing. Higher cost values
/// are slower and more resistant to offline guessing.
#[derive(Debug, Clone)]
pub struct HasherConfig {
    pub min_secret_length: usize,
    pub memory_cost_kib: u32,
    pub time_cost: u32,
    pub parallelism: u32,
}

impl Default for HasherConfig {
    fn default() -> Self {
        Self {
            min_secret_length: 8,
            memory_cost_kib: 15000,
            time_cost: 2,
            parallelism: 1,
        }
    }
}

#[derive(Debug, Error)]
pub enum HasherError {
    #[error("Secret is shorter than the {min} character minimum")]
    PolicyViolation { min: usize },
    #[error("Stored hash is corrupt")]
    CorruptHash,
    #[error("Unexpected error: {0}")]
    UnexpectedError(String),
}

/// One-way, salted Argon2id hashing with constant-time verification.
///
/// Hashing is deliberately slow; both operations run on the blocking pool so
/// they never stall the async scheduler.
#[derive(Debug, Clone)]
pub struct CredentialHasher {
    config: HasherConfig,
}

impl CredentialHasher {
    pub fn new(config: HasherConfig) -> Self {
        Self { config }
    }

    fn params(&self) -> Result<Params, HasherError> {
        Params::new(
            self.config.memory_cost_kib,
            self.config.time_cost,
            self.config.parallelism,
            None,
        )
        .map_err(|e| HasherError::UnexpectedError(e.to_string()))
    }

    #[tracing::instrument(name = "CredentialHasher::hash", skip_all)]
    pub async fn hash(&self, secret: &Password) -> Result<SecretHash, HasherError> {
        if secret.as_ref().expose_secret().chars().count() < self.config.min_secret_length {
            return Err(HasherError::PolicyViolation {
                min: self.config.min_secret_length,
            });
        }

        let params = self.params()?;
        let secret = secret.clone();
        let current_span = tracing::Span::current();

        let result = tokio::task::spawn_blocking(move || {
            current_span.in_scope(move || {
                let salt: SaltString = SaltString::generate(rand_core::OsRng);
                let hasher = Argon2::new(Algorithm::Argon2id, Version::V0x13, params);
                hasher
                    .hash_password(secret.as_ref().expose_secret().as_bytes(), &salt)
                    .map(|h| SecretHash::new(Secret::from(h.to_string())))
                    .map_err(|e| HasherError::UnexpectedError(e.to_string()))
            })
        })
        .await
        .map_err(|e| HasherError::UnexpectedError(e.to_string()))?;

        result
    }

    /// Verify `candidate` against a stored hash. Returns `Ok(false)` on a
    /// mismatch; errors only when the stored hash cannot be parsed.
    #[tracing::instrument(name = "CredentialHasher::verify", skip_all)]
    pub async fn verify(
        &self,
        candidate: &Password,
        stored: &SecretHash,
    ) -> Result<bool, HasherError> {
        let params = self.params()?;
        let candidate = candidate.clone();
        let stored = stored.clone();
        let current_span = tracing::Span::current();

        let result = tokio::task::spawn_blocking(move || {
            current_span.in_scope(move || {
                let expected: PasswordHash<'_> = PasswordHash::new(stored.as_ref().expose_secret())
                    .map_err(|_| HasherError::CorruptHash)?;

                let verifier = Argon2::new(Algorithm::Argon2id, Version::V0x13, params);
                match verifier.verify_password(
                    candidate.as_ref().expose_secret().as_bytes(),
                    &expected,
                ) {
                    Ok(()) => Ok(true),
                    Err(password_hash::Error::Password) => Ok(false),
                    Err(e) => Err(HasherError::UnexpectedError(e.to_string())),
                }
            })
        })
        .await
        .map_err(|e| HasherError::UnexpectedError(e.to_string()))?;

        result
    }
}
