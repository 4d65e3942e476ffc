pub mod domain;
pub mod ports;

// Re-export commonly used types for convenience
pub use domain::{
    identity::{Identity, IdentityId, IdentityIdError, PendingCode},
    password::{Password, PasswordError, SecretHash},
    phone_number::{PhoneNumber, PhoneNumberError},
    role::Role,
    verification_code::{CODE_LENGTH, VerificationCode, VerificationCodeError},
};

pub use ports::{
    repositories::{IdentityStore, IdentityStoreError},
    services::{Clock, DispatchReceipt, MessageGateway, MessageGatewayError},
};
