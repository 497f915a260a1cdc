pub mod aliases;
pub mod catalog;
pub mod envelope;
pub mod http;
pub mod protocol;
pub mod resources;
pub mod server;
