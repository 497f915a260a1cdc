pub mod api;
pub mod info;
