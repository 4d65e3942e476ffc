use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use taraba_core::{
    Identity, IdentityId, IdentityStore, IdentityStoreError, PhoneNumber, SecretHash,
    VerificationCode,
};

/// In-memory identity store for development and tests.
///
/// Every mutation takes the table's write lock, which is what makes the
/// pending-code operations atomic per identity: a confirm that lost a race
/// against another confirm or against a reissue observes the updated record
/// and fails instead of double-consuming.
#[derive(Default, Clone)]
pub struct HashMapIdentityStore {
    identities: Arc<RwLock<HashMap<PhoneNumber, Identity>>>,
}

impl HashMapIdentityStore {
    pub fn new() -> Self {
        Self {
            identities: Arc::new(RwLock::new(HashMap::new())),
        }
    }
}

#[async_trait::async_trait]
impl IdentityStore for HashMapIdentityStore {
    async fn find_by_phone(&self, phone: &PhoneNumber) -> Result<Identity, IdentityStoreError> {
        let identities = self.identities.read().await;
        identities
            .get(phone)
            .cloned()
            .ok_or(IdentityStoreError::IdentityNotFound)
    }

    async fn find_by_id(&self, id: &IdentityId) -> Result<Identity, IdentityStoreError> {
        let identities = self.identities.read().await;
        identities
            .values()
            .find(|identity| identity.id() == *id)
            .cloned()
            .ok_or(IdentityStoreError::IdentityNotFound)
    }

    async fn create(&self, identity: Identity) -> Result<(), IdentityStoreError> {
        let mut identities = self.identities.write().await;
        if identities.contains_key(identity.phone_number()) {
            return Err(IdentityStoreError::PhoneAlreadyRegistered);
        }
        identities.insert(identity.phone_number().clone(), identity);
        Ok(())
    }

    async fn update_secret_hash(
        &self,
        id: &IdentityId,
        hash: SecretHash,
    ) -> Result<(), IdentityStoreError> {
        let mut identities = self.identities.write().await;
        let identity = identities
            .values_mut()
            .find(|identity| identity.id() == *id)
            .ok_or(IdentityStoreError::IdentityNotFound)?;
        identity.set_secret_hash(hash);
        Ok(())
    }

    async fn set_pending_code(
        &self,
        id: &IdentityId,
        code: VerificationCode,
        expires_at: DateTime<Utc>,
    ) -> Result<(), IdentityStoreError> {
        let mut identities = self.identities.write().await;
        let identity = identities
            .values_mut()
            .find(|identity| identity.id() == *id)
            .ok_or(IdentityStoreError::IdentityNotFound)?;
        identity.set_pending_code(code, expires_at);
        Ok(())
    }

    async fn clear_pending_code_and_mark_verified(
        &self,
        id: &IdentityId,
        code: &VerificationCode,
    ) -> Result<(), IdentityStoreError> {
        let mut identities = self.identities.write().await;
        let identity = identities
            .values_mut()
            .find(|identity| identity.id() == *id)
            .ok_or(IdentityStoreError::IdentityNotFound)?;

        if identity.pending_code().is_none() {
            return Err(IdentityStoreError::NoPendingCode);
        }
        if identity.consume_pending_code(code).is_none() {
            return Err(IdentityStoreError::PendingCodeMismatch);
        }
        Ok(())
    }

    async fn update_last_login(
        &self,
        id: &IdentityId,
        at: DateTime<Utc>,
    ) -> Result<(), IdentityStoreError> {
        let mut identities = self.identities.write().await;
        let identity = identities
            .values_mut()
            .find(|identity| identity.id() == *id)
            .ok_or(IdentityStoreError::IdentityNotFound)?;
        identity.set_last_login(at);
        Ok(())
    }
}
