pub mod env {
    pub const CONFIG_FILE_ENV_VAR: &str = "TARABA_ACCESS_CONFIG";
    pub const SIGNING_KEY_ENV_VAR: &str = "TARABA__TOKEN__SIGNING_KEY";
    pub const SMS_API_TOKEN_ENV_VAR: &str = "TARABA_SMS_API_TOKEN";
}

pub mod prod {
    pub mod sms_gateway {
        use std::time::Duration;

        pub const BASE_URL: &str = "https://sms.taraba.ro/";
        pub const SENDER: &str = "TARABA";
        pub const TIMEOUT: Duration = std::time::Duration::from_secs(10);
    }
}

pub mod test {
    pub mod sms_gateway {
        use std::time::Duration;

        pub const SENDER: &str = "TARABA-TEST";
        pub const TIMEOUT: Duration = std::time::Duration::from_millis(200);
    }
}
