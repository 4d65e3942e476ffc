//! # Taraba Access - Trust & Access Layer
//!
//! This is a facade crate that re-exports all public APIs of the Taraba
//! marketplace's trust and access components. Use this crate to get access
//! to admin authentication, phone verification and session tokens in one
//! place.
//!
//! ## Usage
//!
//! Add to your `Cargo.toml`:
//! ```toml
//! [dependencies]
//! taraba-access = { path = "../taraba-access" }
//! ```
//!
//! ## Structure
//!
//! - **Core domain types**: `PhoneNumber`, `Password`, `Role`, `Identity`, etc.
//! - **Port traits**: `IdentityStore`, `MessageGateway`, `Clock`
//! - **Components**: `CredentialHasher`, `VerificationCodeManager`,
//!   `RateLimiter`, `TokenService`
//! - **Use cases**: `AdminLoginUseCase`, `ConfirmVerificationCodeUseCase`, etc.
//! - **Adapters**: `HashMapIdentityStore`, `HttpSmsGateway`, `SystemClock`, etc.
//! - **Orchestrator**: `AuthOrchestrator` - the main entry point

// ============================================================================
// Core Domain Types
// ============================================================================

/// Core domain types and port traits
pub mod core {
    pub use taraba_core::*;
}

// Re-export most commonly used core types at the root level
pub use taraba_core::{
    Identity, IdentityId, Password, PendingCode, PhoneNumber, Role, SecretHash, VerificationCode,
};

// ============================================================================
// Port Traits
// ============================================================================

/// Port trait definitions
pub mod ports {
    pub use taraba_core::{
        Clock, DispatchReceipt, IdentityStore, IdentityStoreError, MessageGateway,
        MessageGatewayError,
    };
}

// Re-export port traits at root level
pub use taraba_core::{
    Clock, DispatchReceipt, IdentityStore, IdentityStoreError, MessageGateway,
    MessageGatewayError,
};

// ============================================================================
// Components and Use Cases (Application Layer)
// ============================================================================

/// Application components and use cases
pub mod application {
    pub use taraba_application::*;
}

// Re-export components and use cases at root level
pub use taraba_application::{
    AccessConfig, AdminLoginUseCase, AuthOrchestrator, AuthenticatedAdmin, Claims,
    ConfirmVerificationCodeUseCase, CredentialHasher, ProvisionIdentityUseCase, RateLimiter,
    RefreshSessionUseCase, RequestVerificationCodeUseCase, TokenPair, TokenService,
    VerificationCodeManager,
};

// ============================================================================
// Adapters (Infrastructure)
// ============================================================================

/// Infrastructure adapters
pub mod adapters {
    /// Persistence implementations
    pub mod persistence {
        pub use taraba_adapters::persistence::*;
    }

    /// SMS gateway implementations
    pub mod sms {
        pub use taraba_adapters::sms::*;
    }

    /// Clock implementations
    pub mod clock {
        pub use taraba_adapters::clock::*;
    }

    /// Configuration
    pub mod config {
        pub use taraba_adapters::config::*;
    }

    /// Telemetry setup
    pub mod telemetry {
        pub use taraba_adapters::telemetry::*;
    }
}

// Re-export commonly used adapters at root level
pub use taraba_adapters::{
    AccessSettings, HashMapIdentityStore, HttpSmsGateway, ManualClock, MockSmsGateway,
    SystemClock, init_telemetry,
};

// ============================================================================
// Re-export common external dependencies
// ============================================================================

/// Re-export async-trait for implementing port traits
pub use async_trait::async_trait;

/// Re-export secrecy for working with secrets
pub use secrecy::{ExposeSecret, Secret};
