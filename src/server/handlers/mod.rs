//! Server HTTP handlers.

mod status;

pub use status::status_handler;
