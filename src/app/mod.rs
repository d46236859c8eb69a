//! Application helpers shared by the binary and the library entry points.
//!
//! Target URL validation, Ctrl-C handling, and batch statistics output.

pub mod shutdown;
pub mod statistics;
pub mod url;

// Re-export public API
pub use shutdown::spawn_ctrl_c_listener;
pub use statistics::{print_batch_summary, print_error_statistics};
pub use url::validate_target_url;
