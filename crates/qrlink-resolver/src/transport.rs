//! Outbound HTTP for the redirect resolver.
//!
//! The resolver needs to see a redirect response itself, so transports must
//! never follow redirects on their own.

use std::time::Duration;

use async_trait::async_trait;
use qrlink_core::ResolverSettings;
use reqwest::header::HeaderMap;
use reqwest::redirect::Policy;
use reqwest::{Client, StatusCode, Url};

use crate::error::ResolveError;

/// Status and headers of one outbound request. The body is never read.
#[derive(Debug, Clone)]
pub struct HopResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
}

impl HopResponse {
    #[must_use]
    pub fn is_redirect(&self) -> bool {
        self.status.is_redirection()
    }

    /// Header value by name, if present and valid visible ASCII.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }
}

/// Performs a single GET without following redirects.
#[async_trait]
pub trait Transport: Send + Sync {
    /// # Errors
    ///
    /// Returns [`ResolveError::Transport`] when the request fails at the
    /// network layer. Non-2xx statuses are not errors.
    async fn get(&self, url: &Url) -> Result<HopResponse, ResolveError>;
}

/// `reqwest`-backed transport with automatic redirects disabled.
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    /// Creates a transport with the configured timeouts and `User-Agent`.
    ///
    /// # Errors
    ///
    /// Returns [`ResolveError::Transport`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(settings: &ResolverSettings) -> Result<Self, ResolveError> {
        let client = Client::builder()
            .redirect(Policy::none())
            .timeout(Duration::from_secs(settings.request_timeout_secs))
            .connect_timeout(Duration::from_secs(settings.connect_timeout_secs))
            .user_agent(settings.user_agent.as_str())
            .build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn get(&self, url: &Url) -> Result<HopResponse, ResolveError> {
        let response = self.client.get(url.clone()).send().await?;
        Ok(HopResponse {
            status: response.status(),
            headers: response.headers().clone(),
        })
    }
}
