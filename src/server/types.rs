//! Server data structures.

use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;

use crate::admission::AdmissionController;

/// Shared state for every connection handler
#[derive(Clone)]
pub struct ServerState {
    /// Admission decisions for `/status`
    pub controller: Arc<AdmissionController>,
    /// Root directory for the static fallback
    pub static_root: Arc<PathBuf>,
}

impl ServerState {
    /// Bundles the controller and the static root for the router.
    pub fn new(controller: Arc<AdmissionController>, static_root: PathBuf) -> Self {
        ServerState {
            controller,
            static_root: Arc::new(static_root),
        }
    }
}

/// JSON body for an admitted `/status` request
#[derive(Serialize)]
pub struct StatusOk {
    /// Always `true`
    pub ok: bool,
}

/// JSON body for a rejected `/status` request
#[derive(Serialize)]
pub struct RateLimitExceeded {
    /// Human-readable rejection reason
    pub message: &'static str,
}
