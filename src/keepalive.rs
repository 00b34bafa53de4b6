// Keep-alive client for extending the server-side session

use async_trait::async_trait;
use tracing::debug;

/// Session extension signal
///
/// Implementations are best-effort by contract: one attempt, no retry, no
/// backoff, and the outcome never reaches the caller. The server remains
/// the authority on actual session expiry.
#[async_trait]
pub trait KeepAlive: Send + Sync {
    async fn send(&self);
}

/// HTTP keep-alive: a POST with no body whose response is ignored
pub struct HttpKeepAlive {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpKeepAlive {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: endpoint.into(),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl KeepAlive for HttpKeepAlive {
    async fn send(&self) {
        match self.client.post(&self.endpoint).send().await {
            Ok(response) => debug!(
                "Keep-alive sent to {}, status {}",
                self.endpoint,
                response.status()
            ),
            Err(e) => debug!("Keep-alive request to {} failed: {}", self.endpoint, e),
        }
    }
}
