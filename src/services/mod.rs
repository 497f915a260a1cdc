pub mod api_client;
pub mod auth_state;
pub mod logger;
pub mod token;
pub mod tool_executor;
pub mod validation;
