pub mod codes;
pub mod hashing;
pub mod orchestrator;
pub mod rate_limit;
pub mod tokens;
pub mod use_cases;

// Re-export commonly used types for convenience
pub use codes::{CodeConfig, VerificationCodeManager};
pub use hashing::{CredentialHasher, HasherConfig, HasherError};
pub use orchestrator::{AccessConfig, AuthOrchestrator};
pub use rate_limit::{
    LimiterPolicy, RateLimitConfig, RateLimitError, RateLimitKey, RateLimitScope, RateLimiter,
};
pub use tokens::{Claims, TokenConfig, TokenError, TokenPair, TokenService, TokenType};
pub use use_cases::{
    AdminLoginUseCase, AuthenticatedAdmin, ChangeSecretError, ChangeSecretUseCase,
    ConfirmCodeError, ConfirmVerificationCodeUseCase, LoginError, ProvisionError,
    ProvisionIdentityUseCase, RefreshError, RefreshSessionUseCase, RequestCodeError,
    RequestVerificationCodeUseCase,
};
