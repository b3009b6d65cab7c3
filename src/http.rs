//! HTTP access behind a trait so clients can be tested without a network.

use crate::error::BriefingError;
use reqwest::Client;
use std::future::Future;
use std::time::Duration;
use tracing::{debug, warn};

/// Status code and body of a completed request.
///
/// Non-success statuses are returned, not turned into errors; each API
/// client decides what a 400 or a 401 means for its own endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn ok(body: impl Into<String>) -> Self {
        Self::new(200, body)
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Minimal async GET interface used by the API clients.
///
/// Only connectivity failures surface as [`BriefingError::NetworkError`].
pub trait HttpFetch: Send + Sync {
    fn get(
        &self,
        url: &str,
        bearer_token: Option<&str>,
    ) -> impl Future<Output = Result<HttpResponse, BriefingError>> + Send;
}

const USER_AGENT: &str = concat!("briefing-tui/", env!("CARGO_PKG_VERSION"));

/// reqwest-backed [`HttpFetch`].
#[derive(Clone)]
pub struct ReqwestFetcher {
    client: Client,
}

impl ReqwestFetcher {
    pub fn new(timeout_secs: u64) -> Result<Self, BriefingError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| BriefingError::NetworkError(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { client })
    }
}

impl HttpFetch for ReqwestFetcher {
    async fn get(&self, url: &str, bearer_token: Option<&str>) -> Result<HttpResponse, BriefingError> {
        debug!(url = url, "HTTP GET request starting");

        let mut request = self.client.get(url);
        if let Some(token) = bearer_token {
            request = request.header("Authorization", format!("BEARER {}", token));
        }

        let response = request.send().await.map_err(|e| {
            warn!(
                url = url,
                error = %e,
                is_connect = e.is_connect(),
                is_timeout = e.is_timeout(),
                "HTTP request failed"
            );
            BriefingError::NetworkError(format!("Request failed: {}", e))
        })?;

        let status = response.status().as_u16();
        debug!(url = url, status = status, "HTTP response received");

        let body = response.text().await.map_err(|e| {
            warn!(url = url, error = %e, "Failed to read response body");
            BriefingError::NetworkError(format!("Failed to read response: {}", e))
        })?;

        Ok(HttpResponse { status, body })
    }
}

#[cfg(test)]
pub(crate) mod mock {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    /// Replays queued responses and records every requested URL and token.
    #[derive(Default)]
    pub struct MockFetcher {
        responses: Mutex<VecDeque<Result<HttpResponse, BriefingError>>>,
        pub requests: Mutex<Vec<(String, Option<String>)>>,
    }

    impl MockFetcher {
        pub fn with(responses: Vec<Result<HttpResponse, BriefingError>>) -> Self {
            Self {
                responses: Mutex::new(responses.into()),
                requests: Mutex::new(Vec::new()),
            }
        }

        pub fn request_count(&self) -> usize {
            self.requests.lock().unwrap().len()
        }

        pub fn last_request(&self) -> Option<(String, Option<String>)> {
            self.requests.lock().unwrap().last().cloned()
        }
    }

    impl HttpFetch for MockFetcher {
        async fn get(&self, url: &str, bearer_token: Option<&str>) -> Result<HttpResponse, BriefingError> {
            self.requests
                .lock()
                .unwrap()
                .push((url.to_string(), bearer_token.map(str::to_string)));
            self.responses
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Err(BriefingError::NetworkError("no mock response".into())))
        }
    }
}
