// Transport Client - the outbound connection collaborator
//
// The directory hands a resolved host and port to a client and awaits the
// outcome. Connection handling, TLS, retries and timeouts stay on the
// client side.

use async_trait::async_trait;
use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;
use thiserror::Error;

/// Client able to open a connection to a peer's BMA endpoint
#[async_trait]
pub trait TransportClient: Send + Sync {
    type Response: Send;
    type Error: fmt::Debug + fmt::Display + Send;

    async fn connect(
        &self,
        host: &str,
        port: u16,
        use_tls_hint: bool,
        with_signature: bool,
    ) -> Result<Self::Response, Self::Error>;
}

/// Errors from probing a peer
#[derive(Error, Debug)]
pub enum ConnectError<E: fmt::Debug + fmt::Display> {
    #[error("Peer {0} advertises no reachable BMA endpoint")]
    Unreachable(String),

    #[error("Transport error: {0}")]
    Transport(E),
}

/// Arguments of one `connect` call, as seen by [`MockTransport`]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ConnectCall {
    pub host: String,
    pub port: u16,
    pub use_tls_hint: bool,
    pub with_signature: bool,
}

/// Mock implementation of TransportClient for testing
pub struct MockTransport {
    should_succeed: bool,
    failure_message: Option<String>,
    delay_ms: u64,
    call_count: AtomicUsize,
    calls: Mutex<Vec<ConnectCall>>,
}

impl MockTransport {
    /// Create a new mock client (defaults to failure)
    pub fn new() -> Self {
        Self {
            should_succeed: false,
            failure_message: None,
            delay_ms: 0,
            call_count: AtomicUsize::new(0),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Configure to always succeed
    pub fn with_success(mut self) -> Self {
        self.should_succeed = true;
        self
    }

    /// Configure to always fail with a message
    pub fn with_failure(mut self, message: &str) -> Self {
        self.should_succeed = false;
        self.failure_message = Some(message.to_string());
        self
    }

    /// Add a delay before responding
    pub fn with_delay_ms(mut self, ms: u64) -> Self {
        self.delay_ms = ms;
        self
    }

    pub fn call_count(&self) -> usize {
        self.call_count.load(Ordering::SeqCst)
    }

    /// Calls received so far, oldest first
    pub fn calls(&self) -> Vec<ConnectCall> {
        self.calls
            .lock()
            .map(|calls| calls.clone())
            .unwrap_or_default()
    }
}

impl Default for MockTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TransportClient for MockTransport {
    type Response = String;
    type Error = String;

    async fn connect(
        &self,
        host: &str,
        port: u16,
        use_tls_hint: bool,
        with_signature: bool,
    ) -> Result<String, String> {
        if self.delay_ms > 0 {
            tokio::time::sleep(Duration::from_millis(self.delay_ms)).await;
        }

        self.call_count.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(ConnectCall {
                host: host.to_string(),
                port,
                use_tls_hint,
                with_signature,
            });
        }

        if self.should_succeed {
            Ok(format!("connected to {}:{}", host, port))
        } else {
            Err(self
                .failure_message
                .clone()
                .unwrap_or_else(|| "Mock failure".to_string()))
        }
    }
}
