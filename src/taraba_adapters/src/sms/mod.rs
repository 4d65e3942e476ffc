pub mod http_sms_gateway;
pub mod mock_sms_gateway;

pub use http_sms_gateway::HttpSmsGateway;
pub use mock_sms_gateway::{MockSmsGateway, SentSms};
