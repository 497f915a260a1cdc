pub mod server {
    pub const NAME: &str = "api-bridge";
    pub const VERSION: &str = env!("CARGO_PKG_VERSION");
    pub const PROTOCOL_VERSION: &str = "2025-06-18";
    pub const FEATURES: &[&str] = &["api-integration", "widgets", "tools", "resources"];
}

pub mod network {
    pub const PLACEHOLDER_BASE_URL: &str = "https://api.example.com";
    pub const TIMEOUT_API_REQUEST_MS: u64 = 30_000;
    pub const DEFAULT_HTTP_PORT: u16 = 3_000;
}

pub mod headers {
    pub const STATIC_KEY: &str = "api-key";
    pub const CONTENT_TYPE_JSON: &str = "application/json";
    pub const BEARER_PREFIX: &str = "Bearer ";
}

pub mod env {
    pub const API_BASE_URL: &str = "API_BASE_URL";
    pub const API_KEY: &str = "API_KEY";
    pub const AUTH_TOKEN: &str = "AUTH_TOKEN";
    pub const API_TIMEOUT: &str = "API_TIMEOUT";
    pub const PORT: &str = "PORT";
    pub const LOG_LEVEL: &str = "LOG_LEVEL";
}

pub mod tokens {
    pub const CANDIDATE_FIELDS: &[&str] = &["token", "accessToken", "access_token"];
}

pub mod protocols {
    pub const ALLOWED_HTTP: &[&str] = &["http:", "https:"];
}

pub mod widget {
    pub const TEMPLATE_URI: &str = "ui://widget/api-result.html";
    pub const TEMPLATE_MIME: &str = "text/html+skybridge";
}

pub mod limits {
    pub const LOG_SUBSTRING_LENGTH: usize = 256;
}
