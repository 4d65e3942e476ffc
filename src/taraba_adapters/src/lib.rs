pub mod clock;
pub mod config;
pub mod persistence;
pub mod sms;
pub mod telemetry;

// Re-export commonly used adapters for convenience
pub use clock::{ManualClock, SystemClock};
pub use config::AccessSettings;
pub use persistence::HashMapIdentityStore;
pub use sms::{HttpSmsGateway, MockSmsGateway, SentSms};
pub use telemetry::init_telemetry;
