pub mod api;
pub mod solar;
