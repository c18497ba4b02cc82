//! Stub transport for testing without network access.
//!
//! Serves canned responses keyed by path prefix and counts every request,
//! so tests can assert both on results and on how much upstream traffic a
//! refresh caused. Routes can also hang forever, which lets tests check that
//! an abandoned request really is dropped.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use super::client::{RawResponse, Transport};
use super::error::FetchCause;

#[derive(Debug, Clone)]
enum Reply {
    Response(RawResponse),
    Failure(FetchCause),
    Hang,
}

/// Counts a hanging request when its future is dropped.
struct AbandonGuard(Arc<AtomicUsize>);

impl Drop for AbandonGuard {
    fn drop(&mut self) {
        self.0.fetch_add(1, Ordering::SeqCst);
    }
}

/// In-memory [`Transport`] that answers from a route table.
///
/// Routes are matched by path prefix in insertion order, so
/// `"partenze/S08409/"` matches whatever timestamp follows. Unmatched paths
/// answer 404 with an empty body. Answers yield to the runtime once before
/// resolving, so a concurrently polled request always gets started.
#[derive(Debug, Clone, Default)]
pub struct StubTransport {
    routes: Arc<Mutex<Vec<(String, Reply)>>>,
    calls: Arc<AtomicUsize>,
    abandoned: Arc<AtomicUsize>,
    paths: Arc<Mutex<Vec<String>>>,
}

impl StubTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer paths starting with `prefix` with `status` and `body`.
    pub fn route(self, prefix: impl Into<String>, status: u16, body: impl Into<String>) -> Self {
        self.push(prefix.into(), Reply::Response(RawResponse::new(status, body)));
        self
    }

    /// Fail paths starting with `prefix` before any status is received.
    pub fn fail(self, prefix: impl Into<String>, cause: FetchCause) -> Self {
        self.push(prefix.into(), Reply::Failure(cause));
        self
    }

    /// Never answer paths starting with `prefix`.
    pub fn hang(self, prefix: impl Into<String>) -> Self {
        self.push(prefix.into(), Reply::Hang);
        self
    }

    fn push(&self, prefix: String, reply: Reply) {
        if let Ok(mut routes) = self.routes.lock() {
            routes.push((prefix, reply));
        }
    }

    /// Number of requests served so far.
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Hanging requests whose future has been dropped.
    pub fn abandoned_count(&self) -> usize {
        self.abandoned.load(Ordering::SeqCst)
    }

    /// Paths requested so far, in order.
    pub fn requested_paths(&self) -> Vec<String> {
        self.paths.lock().map(|p| p.clone()).unwrap_or_default()
    }

    fn reply_for(&self, path: &str) -> Reply {
        self.routes
            .lock()
            .ok()
            .and_then(|routes| {
                routes
                    .iter()
                    .find(|(prefix, _)| path.starts_with(prefix.as_str()))
                    .map(|(_, reply)| reply.clone())
            })
            .unwrap_or(Reply::Response(RawResponse::new(404, "")))
    }
}

impl Transport for StubTransport {
    async fn get(&self, path: &str) -> Result<RawResponse, FetchCause> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut paths) = self.paths.lock() {
            paths.push(path.to_string());
        }

        match self.reply_for(path) {
            Reply::Response(response) => {
                tokio::task::yield_now().await;
                Ok(response)
            }
            Reply::Failure(cause) => {
                tokio::task::yield_now().await;
                Err(cause)
            }
            Reply::Hang => {
                let _guard = AbandonGuard(self.abandoned.clone());
                std::future::pending().await
            }
        }
    }
}
