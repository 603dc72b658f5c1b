pub mod credentials;
pub mod diagnostics;
pub mod logger;
pub mod n8n_client;
pub mod tool_executor;
pub mod translator;
pub mod validation;
