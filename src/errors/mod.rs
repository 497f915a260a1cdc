mod api_error;
mod mcp_error;
mod tool_error;
mod transport_error;

pub use api_error::ApiError;
pub use mcp_error::{ErrorCode, McpError};
pub use tool_error::{ToolError, ToolErrorKind};
pub use transport_error::HttpTransportError;
