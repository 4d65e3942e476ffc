use taraba_core::{
    Identity, IdentityId, IdentityStore, IdentityStoreError, Password, PhoneNumber, Role,
};

use crate::hashing::{CredentialHasher, HasherError};

/// Error types for the provision-identity use case
#[derive(Debug, thiserror::Error)]
pub enum ProvisionError {
    #[error("Secret is shorter than the {min} character minimum")]
    WeakSecret { min: usize },
    #[error("Phone number already registered")]
    PhoneAlreadyRegistered,
    #[error("Service unavailable: {0}")]
    Dependency(String),
}

/// Provision-identity use case - creates a new, unverified identity record
/// with a hashed secret. Verification happens separately over SMS.
pub struct ProvisionIdentityUseCase<S>
where
    S: IdentityStore,
{
    identity_store: S,
    hasher: CredentialHasher,
}

impl<S> ProvisionIdentityUseCase<S>
where
    S: IdentityStore,
{
    pub fn new(identity_store: S, hasher: CredentialHasher) -> Self {
        Self {
            identity_store,
            hasher,
        }
    }

    /// Execute the provision-identity use case
    ///
    /// # Returns
    /// The new identity's id, or ProvisionError
    #[tracing::instrument(name = "ProvisionIdentityUseCase::execute", skip(self, secret))]
    pub async fn execute(
        &self,
        phone_number: PhoneNumber,
        role: Role,
        secret: Password,
    ) -> Result<IdentityId, ProvisionError> {
        let hash = self.hasher.hash(&secret).await.map_err(|e| match e {
            HasherError::PolicyViolation { min } => ProvisionError::WeakSecret { min },
            other => ProvisionError::Dependency(other.to_string()),
        })?;

        let identity = Identity::new(phone_number, role, hash);
        let id = identity.id();

        self.identity_store
            .create(identity)
            .await
            .map_err(|e| match e {
                IdentityStoreError::PhoneAlreadyRegistered => {
                    ProvisionError::PhoneAlreadyRegistered
                }
                other => ProvisionError::Dependency(other.to_string()),
            })?;

        Ok(id)
    }
}

/// Error types for the change-secret use case
#[derive(Debug, thiserror::Error)]
pub enum ChangeSecretError {
    #[error("Identity not found")]
    NotFound,
    #[error("Secret is shorter than the {min} character minimum")]
    WeakSecret { min: usize },
    #[error("Service unavailable: {0}")]
    Dependency(String),
}

/// Change-secret use case - re-hashes and replaces an identity's secret.
pub struct ChangeSecretUseCase<S>
where
    S: IdentityStore,
{
    identity_store: S,
    hasher: CredentialHasher,
}

impl<S> ChangeSecretUseCase<S>
where
    S: IdentityStore,
{
    pub fn new(identity_store: S, hasher: CredentialHasher) -> Self {
        Self {
            identity_store,
            hasher,
        }
    }

    #[tracing::instrument(name = "ChangeSecretUseCase::execute", skip(self, new_secret))]
    pub async fn execute(
        &self,
        phone_number: PhoneNumber,
        new_secret: Password,
    ) -> Result<(), ChangeSecretError> {
        let identity = match self.identity_store.find_by_phone(&phone_number).await {
            Ok(identity) => identity,
            Err(IdentityStoreError::IdentityNotFound) => return Err(ChangeSecretError::NotFound),
            Err(e) => return Err(ChangeSecretError::Dependency(e.to_string())),
        };

        let hash = self.hasher.hash(&new_secret).await.map_err(|e| match e {
            HasherError::PolicyViolation { min } => ChangeSecretError::WeakSecret { min },
            other => ChangeSecretError::Dependency(other.to_string()),
        })?;

        self.identity_store
            .update_secret_hash(&identity.id(), hash)
            .await
            .map_err(|e| match e {
                IdentityStoreError::IdentityNotFound => ChangeSecretError::NotFound,
                other => ChangeSecretError::Dependency(other.to_string()),
            })
    }
}
