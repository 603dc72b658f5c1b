pub mod network {
    pub const DEFAULT_BASE_URL: &str = "http://localhost:5678/api/v1";
    pub const TIMEOUT_API_REQUEST_MS: u64 = 10_000;
    pub const USER_AGENT: &str = concat!("n8n-mcp/", env!("CARGO_PKG_VERSION"));
}

pub mod api {
    pub const BASE_PATH: &str = "/api/v1";
    /// Lowercase so it can be used directly as a `HeaderName`.
    pub const API_KEY_HEADER: &str = "x-n8n-api-key";
    pub const JSON_CONTENT_TYPE: &str = "application/json";
}

pub mod limits {
    pub const MAX_PAGE_LIMIT: i64 = 1_000;
    pub const DIAGNOSTIC_MAX_CHARS: usize = 1_000;
    pub const CAUSE_CHAIN_MAX_LINES: usize = 8;
    pub const SUGGESTION_LIMIT: usize = 3;
}

pub mod credentials {
    /// Inbound header names carrying an API key, highest priority first.
    pub const API_KEY_HEADERS: &[&str] = &[super::api::API_KEY_HEADER, "x-api-key"];
    pub const AUTHORIZATION_HEADER: &str = "authorization";
    pub const BEARER_PREFIX: &str = "bearer ";
}

pub mod protocols {
    pub const ALLOWED_HTTP: &[&str] = &["http:", "https:"];
}
