use taraba_core::{Clock, IdentityStore, IdentityStoreError};

use crate::tokens::{TokenError, TokenPair, TokenService, TokenType};

/// Error types for the refresh-session use case
#[derive(Debug, thiserror::Error)]
pub enum RefreshError {
    #[error("Malformed token")]
    Malformed,
    #[error("Token has expired")]
    Expired,
    #[error("Token type mismatch")]
    WrongType,
    #[error("User not found")]
    UserNotFound,
    #[error("Service unavailable: {0}")]
    Dependency(String),
}

/// Refresh-session use case - full rotation of the token pair.
///
/// The identity is re-resolved on every refresh so an account that has been
/// deleted or demoted since the tokens were issued cannot renew a session.
/// Both tokens are replaced; the previous refresh token is not revoked
/// server-side and simply ages out at its natural expiry.
pub struct RefreshSessionUseCase<S, C>
where
    S: IdentityStore,
    C: Clock,
{
    identity_store: S,
    clock: C,
    token_service: TokenService,
}

impl<S, C> RefreshSessionUseCase<S, C>
where
    S: IdentityStore,
    C: Clock,
{
    pub fn new(identity_store: S, clock: C, token_service: TokenService) -> Self {
        Self {
            identity_store,
            clock,
            token_service,
        }
    }

    /// Execute the refresh-session use case
    ///
    /// # Arguments
    /// * `refresh_token` - The refresh token from the previous pair
    ///
    /// # Returns
    /// A fresh token pair, or RefreshError
    #[tracing::instrument(name = "RefreshSessionUseCase::execute", skip_all)]
    pub async fn execute(&self, refresh_token: &str) -> Result<TokenPair, RefreshError> {
        let now = self.clock.now();

        let claims = self
            .token_service
            .verify(refresh_token, TokenType::Refresh, None, now)
            .map_err(|e| match e {
                TokenError::Expired => RefreshError::Expired,
                TokenError::WrongType => RefreshError::WrongType,
                TokenError::UnexpectedError(detail) => RefreshError::Dependency(detail),
                // Wrong issuer/audience means the token was never ours.
                _ => RefreshError::Malformed,
            })?;

        let id = claims.subject().map_err(|_| RefreshError::Malformed)?;

        let identity = match self.identity_store.find_by_id(&id).await {
            Ok(identity) => identity,
            Err(IdentityStoreError::IdentityNotFound) => return Err(RefreshError::UserNotFound),
            Err(e) => return Err(RefreshError::Dependency(e.to_string())),
        };

        if !identity.role().is_admin() {
            tracing::warn!("refresh rejected: role changed away from admin");
            return Err(RefreshError::UserNotFound);
        }

        self.token_service
            .issue_pair(&identity, now)
            .map_err(|e| RefreshError::Dependency(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::Arc;

    use async_trait::async_trait;
    use chrono::{DateTime, Duration, Utc};
    use secrecy::Secret;
    use taraba_core::{
        Identity, IdentityId, PhoneNumber, Role, SecretHash, VerificationCode,
    };
    use tokio::sync::RwLock;

    use crate::tokens::TokenConfig;

    use super::*;

    #[derive(Clone, Default)]
    struct MockIdentityStore {
        identities: Arc<RwLock<HashMap<IdentityId, Identity>>>,
    }

    impl MockIdentityStore {
        async fn insert(&self, identity: Identity) {
            self.identities.write().await.insert(identity.id(), identity);
        }

        async fn remove(&self, id: &IdentityId) {
            self.identities.write().await.remove(id);
        }
    }

    #[async_trait]
    impl IdentityStore for MockIdentityStore {
        async fn find_by_phone(
            &self,
            _phone: &PhoneNumber,
        ) -> Result<Identity, IdentityStoreError> {
            unimplemented!()
        }

        async fn find_by_id(&self, id: &IdentityId) -> Result<Identity, IdentityStoreError> {
            self.identities
                .read()
                .await
                .get(id)
                .cloned()
                .ok_or(IdentityStoreError::IdentityNotFound)
        }

        async fn create(&self, _identity: Identity) -> Result<(), IdentityStoreError> {
            unimplemented!()
        }

        async fn update_secret_hash(
            &self,
            _id: &IdentityId,
            _hash: SecretHash,
        ) -> Result<(), IdentityStoreError> {
            unimplemented!()
        }

        async fn set_pending_code(
            &self,
            _id: &IdentityId,
            _code: VerificationCode,
            _expires_at: DateTime<Utc>,
        ) -> Result<(), IdentityStoreError> {
            unimplemented!()
        }

        async fn clear_pending_code_and_mark_verified(
            &self,
            _id: &IdentityId,
            _code: &VerificationCode,
        ) -> Result<(), IdentityStoreError> {
            unimplemented!()
        }

        async fn update_last_login(
            &self,
            _id: &IdentityId,
            _at: DateTime<Utc>,
        ) -> Result<(), IdentityStoreError> {
            unimplemented!()
        }
    }

    struct AdvancingClock(Arc<std::sync::RwLock<DateTime<Utc>>>);

    impl Clock for AdvancingClock {
        fn now(&self) -> DateTime<Utc> {
            *self.0.read().expect("clock lock poisoned")
        }
    }

    fn token_service() -> TokenService {
        TokenService::new(TokenConfig {
            signing_key: Secret::from("test-signing-key".to_string()),
            issuer: "taraba-marketplace".to_string(),
            audience: "taraba-admin".to_string(),
            access_ttl: Duration::hours(8),
            refresh_ttl: Duration::days(7),
        })
    }

    fn admin_identity() -> Identity {
        Identity::new(
            PhoneNumber::parse("+40712345678").unwrap(),
            Role::Admin,
            SecretHash::new(Secret::from("$argon2id$stub".to_string())),
        )
    }

    fn use_case(
        store: MockIdentityStore,
        now: Arc<std::sync::RwLock<DateTime<Utc>>>,
    ) -> RefreshSessionUseCase<MockIdentityStore, AdvancingClock> {
        RefreshSessionUseCase::new(store, AdvancingClock(now), token_service())
    }

    #[tokio::test]
    async fn test_refresh_rotates_both_tokens_with_new_expiries() {
        let issued_at = Utc::now();
        let store = MockIdentityStore::default();
        let identity = admin_identity();
        store.insert(identity.clone()).await;

        let pair = token_service().issue_pair(&identity, issued_at).unwrap();

        let now = Arc::new(std::sync::RwLock::new(issued_at + Duration::hours(1)));
        let use_case = use_case(store, now.clone());

        let rotated = use_case.execute(&pair.refresh).await.unwrap();
        assert_ne!(rotated.access, pair.access);
        assert_ne!(rotated.refresh, pair.refresh);

        let claims = token_service()
            .verify(
                &rotated.access,
                TokenType::Access,
                None,
                issued_at + Duration::hours(1),
            )
            .unwrap();
        assert_eq!(
            claims.exp,
            (issued_at + Duration::hours(1) + Duration::hours(8)).timestamp()
        );
    }

    #[tokio::test]
    async fn test_access_token_cannot_refresh() {
        let issued_at = Utc::now();
        let store = MockIdentityStore::default();
        let identity = admin_identity();
        store.insert(identity.clone()).await;

        let pair = token_service().issue_pair(&identity, issued_at).unwrap();
        let now = Arc::new(std::sync::RwLock::new(issued_at));
        let use_case = use_case(store, now);

        let result = use_case.execute(&pair.access).await;
        assert!(matches!(result, Err(RefreshError::WrongType)));
    }

    #[tokio::test]
    async fn test_expired_refresh_token() {
        let issued_at = Utc::now();
        let store = MockIdentityStore::default();
        let identity = admin_identity();
        store.insert(identity.clone()).await;

        let pair = token_service().issue_pair(&identity, issued_at).unwrap();
        let now = Arc::new(std::sync::RwLock::new(issued_at + Duration::days(7)));
        let use_case = use_case(store, now);

        let result = use_case.execute(&pair.refresh).await;
        assert!(matches!(result, Err(RefreshError::Expired)));
    }

    #[tokio::test]
    async fn test_deleted_or_demoted_identity_cannot_refresh() {
        let issued_at = Utc::now();
        let store = MockIdentityStore::default();
        let identity = admin_identity();
        store.insert(identity.clone()).await;

        let pair = token_service().issue_pair(&identity, issued_at).unwrap();
        let now = Arc::new(std::sync::RwLock::new(issued_at));
        let use_case = use_case(store.clone(), now);

        store.remove(&identity.id()).await;
        let result = use_case.execute(&pair.refresh).await;
        assert!(matches!(result, Err(RefreshError::UserNotFound)));

        // Same outcome when the role changed away from admin.
        let demoted = Identity::restore(
            identity.id(),
            identity.phone_number().clone(),
            Role::Customer,
            identity.secret_hash().clone(),
            true,
            None,
            None,
        );
        store.insert(demoted).await;
        let result = use_case.execute(&pair.refresh).await;
        assert!(matches!(result, Err(RefreshError::UserNotFound)));
    }

    #[tokio::test]
    async fn test_previous_refresh_token_stays_structurally_valid() {
        // Rotation does not revoke the old refresh token server-side; it
        // remains usable until it ages out. Documented behavior, asserted
        // here so a change is a conscious one.
        let issued_at = Utc::now();
        let store = MockIdentityStore::default();
        let identity = admin_identity();
        store.insert(identity.clone()).await;

        let pair = token_service().issue_pair(&identity, issued_at).unwrap();
        let now = Arc::new(std::sync::RwLock::new(issued_at + Duration::hours(1)));
        let use_case = use_case(store, now);

        let _rotated = use_case.execute(&pair.refresh).await.unwrap();
        let reused = use_case.execute(&pair.refresh).await;
        assert!(reused.is_ok());
    }
}
