//! Shared helpers for integration tests.
//!
//! Each test binary only uses some of these.
#![allow(dead_code)]

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use window_gate::server::{serve, ServerState};
use window_gate::{AdmissionController, Dispatcher, RateBudget, RetryPolicy};

/// A rate-limited server running on an ephemeral local port.
pub struct TestServer {
    pub addr: SocketAddr,
    pub controller: Arc<AdmissionController>,
    shutdown: CancellationToken,
}

impl TestServer {
    pub async fn start(max_requests: u32, window_size: Duration) -> Self {
        Self::start_with_root(max_requests, window_size, PathBuf::from(".")).await
    }

    pub async fn start_with_root(
        max_requests: u32,
        window_size: Duration,
        static_root: PathBuf,
    ) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind ephemeral port");
        let addr = listener.local_addr().expect("local addr");
        let controller = Arc::new(AdmissionController::new(max_requests, window_size));
        let shutdown = CancellationToken::new();

        let state = ServerState::new(Arc::clone(&controller), static_root);
        let token = shutdown.clone();
        tokio::spawn(async move {
            if let Err(e) = serve(listener, state, token).await {
                eprintln!("test server error: {:#}", e);
            }
        });

        TestServer {
            addr,
            controller,
            shutdown,
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}

/// A dispatcher with a generous local budget.
pub fn dispatcher(policy: RetryPolicy) -> Dispatcher {
    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(10))
        .build()
        .expect("Failed to create HTTP client");
    Dispatcher::new(
        Arc::new(client),
        Arc::new(RateBudget::new(1_000, Duration::from_secs(60))),
        policy,
    )
}
