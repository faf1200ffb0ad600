// Stable error codes exposed to callers of the intake gateway

pub mod validation {
    pub const INVALID_INPUT: &str = "VALIDATION_1001";
}

pub mod anonymization {
    pub const DISABLED: &str = "ANON_5001";
    pub const DETECTION_FAILED: &str = "ANON_5002";
}

pub mod provider {
    pub const CHAIN_EXHAUSTED: &str = "PROVIDER_6001";
    pub const EXTERNAL_FAILURE: &str = "PROVIDER_6002";
}

pub mod configuration {
    pub const INVALID_CONFIG: &str = "CONFIG_7001";
}

pub mod system {
    pub const INTERNAL: &str = "SYSTEM_9001";
}
