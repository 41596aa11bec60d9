//! HTTP transport used by the resource fetchers.

use std::future::Future;
use std::pin::Pin;

use serde_json::Value;
use url::Url;

use super::config::DigestConfig;
use super::error::{DigestError, DigestResult};

/// Boxed future type for transport operations.
pub type TransportFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Outcome of a request that reached the server.
#[derive(Clone, Debug, PartialEq)]
pub enum TransportResponse {
    /// 2xx response with its parsed JSON body.
    Success(Value),
    /// Any other response.
    Failure {
        /// HTTP status code.
        status: u16,
    },
}

/// Issues GET requests relative to a fixed base URL.
pub trait Transport: Send + Sync {
    /// GET `path` relative to the base URL.
    ///
    /// Non-success statuses resolve to [`TransportResponse::Failure`].
    ///
    /// # Errors
    /// Returns an error only for transport-level faults (unreachable host,
    /// undecodable body).
    fn get(&self, path: &str) -> TransportFuture<'_, DigestResult<TransportResponse>>;
}

/// `reqwest`-backed transport.
#[derive(Clone, Debug)]
pub struct HttpTransport {
    client: reqwest::Client,
    base_url: Url,
}

impl HttpTransport {
    /// Create a transport from configuration.
    ///
    /// # Errors
    /// Returns an error if the configuration is invalid or the client cannot be built.
    pub fn new(config: &DigestConfig) -> DigestResult<Self> {
        config.validate()?;
        let base_url = config.parsed_base_url()?;
        let client = Self::build_client(config)?;
        Ok(Self { client, base_url })
    }

    /// Build an HTTP client with JSON headers and the configured timeouts.
    fn build_client(config: &DigestConfig) -> DigestResult<reqwest::Client> {
        use reqwest::header::{ACCEPT, AUTHORIZATION, HeaderMap, HeaderValue, USER_AGENT};

        let mut headers = HeaderMap::new();

        if let Ok(ua) = HeaderValue::from_str(&config.user_agent) {
            headers.insert(USER_AGENT, ua);
        }

        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        if let Some(token) = &config.bearer_token {
            let mut value = HeaderValue::from_str(&format!("Bearer {token}"))
                .map_err(|e| DigestError::Config(format!("invalid bearer token: {e}")))?;
            value.set_sensitive(true);
            headers.insert(AUTHORIZATION, value);
        }

        reqwest::Client::builder()
            .default_headers(headers)
            .timeout(config.request_timeout)
            .connect_timeout(config.connect_timeout)
            .gzip(true)
            .brotli(true)
            .deflate(true)
            .build()
            .map_err(|e| DigestError::HttpClient(e.to_string()))
    }

    /// Resolve a relative resource path against the base URL.
    ///
    /// The base path is kept, so `http://host/api` + `users/1` is `http://host/api/users/1`.
    ///
    /// # Errors
    /// Returns an error if the resulting URL is malformed.
    pub fn resource_url(&self, path: &str) -> DigestResult<Url> {
        let base = self.base_url.as_str().trim_end_matches('/');
        let path = path.trim_start_matches('/');
        Ok(Url::parse(&format!("{base}/{path}"))?)
    }
}

impl Transport for HttpTransport {
    fn get(&self, path: &str) -> TransportFuture<'_, DigestResult<TransportResponse>> {
        let url = self.resource_url(path);
        Box::pin(async move {
            let url = url?;
            let response = self.client.get(url).send().await?;
            let status = response.status();

            if !status.is_success() {
                return Ok(TransportResponse::Failure {
                    status: status.as_u16(),
                });
            }

            let body = response.json::<Value>().await?;
            Ok(TransportResponse::Success(body))
        })
    }
}
