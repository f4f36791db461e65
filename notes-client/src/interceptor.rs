//! Hooks observing every HTTP response.

use reqwest::Method;
use tracing::{debug, warn};

/// What an interceptor sees about a completed exchange.
#[derive(Debug, Clone, Copy)]
pub struct ResponseContext<'a> {
    pub method: &'a Method,
    pub endpoint: &'a str,
    pub status: u16,
    /// Whether the request carried a bearer token.
    pub authenticated: bool,
}

impl ResponseContext<'_> {
    #[must_use]
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Observer registered on [`crate::ApiClient`].
///
/// Called once per response, success or failure, before the executor builds
/// its result. Interceptors observe; they cannot change the outcome.
pub trait ResponseInterceptor: Send + Sync {
    fn on_response(&self, response: &ResponseContext<'_>);
}

/// Logs each response through `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingInterceptor;

impl ResponseInterceptor for TracingInterceptor {
    fn on_response(&self, response: &ResponseContext<'_>) {
        match response.status {
            403 => warn!(
                "{} {} -> 403: access denied",
                response.method, response.endpoint
            ),
            s if s >= 500 => warn!("{} {} -> {}", response.method, response.endpoint, s),
            s => debug!("{} {} -> {}", response.method, response.endpoint, s),
        }
    }
}
