pub mod confirm_code;
pub mod login;
pub mod provision;
pub mod refresh;
pub mod request_code;

pub use confirm_code::{ConfirmCodeError, ConfirmVerificationCodeUseCase};
pub use login::{AdminLoginUseCase, AuthenticatedAdmin, LoginError};
pub use provision::{
    ChangeSecretError, ChangeSecretUseCase, ProvisionError, ProvisionIdentityUseCase,
};
pub use refresh::{RefreshError, RefreshSessionUseCase};
pub use request_code::{RequestCodeError, RequestVerificationCodeUseCase};
