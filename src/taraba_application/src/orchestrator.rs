use taraba_core::{
    Clock, DispatchReceipt, IdentityId, IdentityStore, MessageGateway, Password, PhoneNumber, Role,
};

use crate::{
    codes::{CodeConfig, VerificationCodeManager},
    hashing::{CredentialHasher, HasherConfig},
    rate_limit::{RateLimitConfig, RateLimiter},
    tokens::{Claims, TokenConfig, TokenError, TokenPair, TokenService, TokenType},
    use_cases::{
        confirm_code::{ConfirmCodeError, ConfirmVerificationCodeUseCase},
        login::{AdminLoginUseCase, AuthenticatedAdmin, LoginError},
        provision::{
            ChangeSecretError, ChangeSecretUseCase, ProvisionError, ProvisionIdentityUseCase,
        },
        refresh::{RefreshError, RefreshSessionUseCase},
        request_code::{RequestCodeError, RequestVerificationCodeUseCase},
    },
};

/// Externally supplied constants for every component. No defaults are baked
/// into logic paths; tests construct this directly.
#[derive(Clone)]
pub struct AccessConfig {
    pub hashing: HasherConfig,
    pub codes: CodeConfig,
    pub rate_limits: RateLimitConfig,
    pub tokens: TokenConfig,
}

/// Composes the trust and access components into the user-facing flows:
/// admin login, phone verification, and session token handling.
///
/// Constructed once at process start and passed by handle; the rate-limit
/// table lives inside and is shared by the flows through cheap clones.
/// Logout is a client-side token discard: nothing is revoked server-side,
/// and short access-token lifetimes are the mitigating control.
pub struct AuthOrchestrator<S, G, C>
where
    S: IdentityStore + Clone,
    G: MessageGateway + Clone,
    C: Clock + Clone,
{
    identity_store: S,
    message_gateway: G,
    clock: C,
    rate_limiter: RateLimiter,
    hasher: CredentialHasher,
    codes: VerificationCodeManager,
    tokens: TokenService,
}

impl<S, G, C> AuthOrchestrator<S, G, C>
where
    S: IdentityStore + Clone,
    G: MessageGateway + Clone,
    C: Clock + Clone,
{
    pub fn new(identity_store: S, message_gateway: G, clock: C, config: AccessConfig) -> Self {
        Self {
            identity_store,
            message_gateway,
            clock,
            rate_limiter: RateLimiter::new(config.rate_limits),
            hasher: CredentialHasher::new(config.hashing),
            codes: VerificationCodeManager::new(config.codes),
            tokens: TokenService::new(config.tokens),
        }
    }

    /// Verify an admin's phone number and secret and issue a session.
    pub async fn authenticate_admin(
        &self,
        phone_number: PhoneNumber,
        secret: Password,
        source_address: Option<String>,
    ) -> Result<AuthenticatedAdmin, LoginError> {
        AdminLoginUseCase::new(
            self.identity_store.clone(),
            self.clock.clone(),
            self.rate_limiter.clone(),
            self.hasher.clone(),
            self.tokens.clone(),
        )
        .execute(phone_number, secret, source_address)
        .await
    }

    /// Issue a verification code and dispatch it over SMS.
    pub async fn request_verification_code(
        &self,
        phone_number: PhoneNumber,
    ) -> Result<DispatchReceipt, RequestCodeError> {
        RequestVerificationCodeUseCase::new(
            self.identity_store.clone(),
            self.message_gateway.clone(),
            self.clock.clone(),
            self.rate_limiter.clone(),
            self.codes.clone(),
        )
        .execute(phone_number)
        .await
    }

    /// Confirm a submitted verification code and mark the identity verified.
    pub async fn confirm_verification_code(
        &self,
        phone_number: PhoneNumber,
        submitted_code: &str,
    ) -> Result<(), ConfirmCodeError> {
        ConfirmVerificationCodeUseCase::new(
            self.identity_store.clone(),
            self.clock.clone(),
            self.rate_limiter.clone(),
            self.codes.clone(),
        )
        .execute(phone_number, submitted_code)
        .await
    }

    /// Rotate a session: both tokens are replaced.
    pub async fn refresh_session(&self, refresh_token: &str) -> Result<TokenPair, RefreshError> {
        RefreshSessionUseCase::new(
            self.identity_store.clone(),
            self.clock.clone(),
            self.tokens.clone(),
        )
        .execute(refresh_token)
        .await
    }

    /// Verify an access token, optionally gating on a required role.
    pub fn verify_access_token(
        &self,
        token: &str,
        required_role: Option<Role>,
    ) -> Result<Claims, TokenError> {
        self.tokens
            .verify(token, TokenType::Access, required_role, self.clock.now())
    }

    /// Create a new, unverified identity with a hashed secret.
    pub async fn provision_identity(
        &self,
        phone_number: PhoneNumber,
        role: Role,
        secret: Password,
    ) -> Result<IdentityId, ProvisionError> {
        ProvisionIdentityUseCase::new(self.identity_store.clone(), self.hasher.clone())
            .execute(phone_number, role, secret)
            .await
    }

    /// Replace an identity's secret with a fresh hash.
    pub async fn change_secret(
        &self,
        phone_number: PhoneNumber,
        new_secret: Password,
    ) -> Result<(), ChangeSecretError> {
        ChangeSecretUseCase::new(self.identity_store.clone(), self.hasher.clone())
            .execute(phone_number, new_secret)
            .await
    }
}
