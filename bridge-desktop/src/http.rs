//! Reqwest transport for the provider crates.
//!
//! Content URLs handed out by the photo service grant access without any
//! credentials, so only their host is ever logged.

use async_trait::async_trait;
use bridge_traits::{
    error::{BridgeError, Result},
    http::{HttpClient, HttpMethod, HttpRequest, HttpResponse},
};
use reqwest::{Client, Method};
use std::time::Duration;
use tracing::{debug, warn};

const USER_AGENT: &str = concat!("gpsync/", env!("CARGO_PKG_VERSION"));

/// Whole-request ceiling. A single download may be a full-size video.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(120);
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Performs exactly one round trip per [`HttpClient::execute`] call.
#[derive(Debug, Clone)]
pub struct ReqwestHttpClient {
    client: Client,
}

impl ReqwestHttpClient {
    pub fn new() -> Result<Self> {
        Self::with_timeout(DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(timeout: Duration) -> Result<Self> {
        Client::builder()
            .timeout(timeout)
            .connect_timeout(CONNECT_TIMEOUT)
            .user_agent(USER_AGENT)
            .build()
            .map(Self::with_client)
            .map_err(|e| BridgeError::OperationFailed(format!("Cannot set up HTTP client: {}", e)))
    }

    pub fn with_client(client: Client) -> Self {
        Self { client }
    }

    fn method(method: HttpMethod) -> Method {
        match method {
            HttpMethod::Get => Method::GET,
            HttpMethod::Post => Method::POST,
        }
    }

    /// Scheme and host of `url`, for logs
    fn host_of(url: &str) -> &str {
        let after_scheme = url.find("://").map(|i| i + 3).unwrap_or(0);
        match url[after_scheme..].find('/') {
            Some(end) => &url[..after_scheme + end],
            None => url,
        }
    }

    fn transport_error(e: reqwest::Error) -> BridgeError {
        let kind = if e.is_timeout() {
            "timed out"
        } else if e.is_connect() {
            "could not connect"
        } else if e.is_body() || e.is_decode() {
            "broken response body"
        } else {
            "request failed"
        };
        BridgeError::OperationFailed(format!("HTTP {}: {}", kind, e.without_url()))
    }
}

#[async_trait]
impl HttpClient for ReqwestHttpClient {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse> {
        let HttpRequest {
            method,
            url,
            headers,
            body,
            timeout,
        } = request;
        let host = Self::host_of(&url);
        debug!(?method, host, "Sending request");

        let mut builder = self.client.request(Self::method(method), url.as_str());
        for (name, value) in headers {
            builder = builder.header(name, value);
        }
        if let Some(body) = body {
            builder = builder.body(body);
        }
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        let response = builder.send().await.map_err(|e| {
            let e = Self::transport_error(e);
            warn!(host, error = %e, "Transport failure");
            e
        })?;

        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|value| (name.as_str().to_string(), value.to_string()))
            })
            .collect();
        let body = response.bytes().await.map_err(Self::transport_error)?;

        debug!(host, status, bytes = body.len(), "Response received");
        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_client_builds() {
        assert!(ReqwestHttpClient::new().is_ok());
    }

    #[test]
    fn test_method_mapping() {
        assert_eq!(ReqwestHttpClient::method(HttpMethod::Get), Method::GET);
        assert_eq!(ReqwestHttpClient::method(HttpMethod::Post), Method::POST);
    }

    #[test]
    fn test_host_of_hides_capability_path() {
        assert_eq!(
            ReqwestHttpClient::host_of("https://lh3.googleusercontent.com/lr/AbC123=d"),
            "https://lh3.googleusercontent.com"
        );
        assert_eq!(
            ReqwestHttpClient::host_of("https://photoslibrary.googleapis.com"),
            "https://photoslibrary.googleapis.com"
        );
    }

    #[test]
    fn test_user_agent_names_the_tool() {
        assert!(USER_AGENT.starts_with("gpsync/"));
    }
}
