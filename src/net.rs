//! HTTP transport wrapping reqwest.
//!
//! One blocking-style GET at a time — the crawl is strictly sequential.
//! Transient failures and 5xx responses are retried a capped number of
//! times with linearly increasing backoff plus jitter; after that the
//! address is given up on and the caller treats it as a soft failure.

use rand::Rng;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT_LANGUAGE};
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

const DEFAULT_UA: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
                          AppleWebKit/537.36 (KHTML, like Gecko) \
                          Chrome/120.0.0.0 Safari/537.36";

const MAX_ATTEMPTS: u32 = 4;
const BACKOFF_STEP_MS: u64 = 1200;
const BACKOFF_JITTER_MS: u64 = 600;

/// A GET that could not be completed even after retries.
#[derive(Debug, Error)]
#[error("GET {url} failed after {attempts} attempts: {source}")]
pub struct FetchError {
    pub url: String,
    pub attempts: u32,
    #[source]
    pub source: reqwest::Error,
}

/// Response from an HTTP GET request.
#[derive(Debug, Clone)]
pub struct FetchResponse {
    /// Requested URL.
    pub url: String,
    /// HTTP status code.
    pub status: u16,
    /// Content-Type header, if present.
    pub content_type: Option<String>,
    /// Raw response body. Content-Encoding compression is already undone
    /// by the client; gzip *payloads* (`.xml.gz` files) are not.
    pub body: Vec<u8>,
}

impl FetchResponse {
    /// Whether the request succeeded at the HTTP level.
    pub fn is_success(&self) -> bool {
        self.status == 200
    }

    /// Body decoded as UTF-8 with lossy replacement of invalid bytes.
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

/// HTTP client for the crawl.
#[derive(Clone)]
pub struct HttpClient {
    client: reqwest::Client,
}

impl HttpClient {
    /// Create a client with the given User-Agent override (or the stock
    /// desktop-browser one) and per-request timeout.
    pub fn new(user_agent: Option<&str>, timeout: Duration) -> Self {
        let mut headers = HeaderMap::new();
        headers.insert(
            ACCEPT_LANGUAGE,
            HeaderValue::from_static("vi-VN,vi;q=0.9,en-US;q=0.8,en;q=0.7"),
        );

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .redirect(reqwest::redirect::Policy::limited(5))
            .user_agent(user_agent.unwrap_or(DEFAULT_UA))
            .default_headers(headers)
            .build()
            .unwrap_or_default();

        Self { client }
    }

    /// Perform a GET with retry on transport errors and 5xx responses.
    pub async fn get(&self, url: &str) -> Result<FetchResponse, FetchError> {
        let mut attempt = 0u32;

        loop {
            attempt += 1;
            match self.client.get(url).send().await {
                Ok(r) => {
                    let status = r.status().as_u16();
                    if status >= 500 && attempt < MAX_ATTEMPTS {
                        debug!("GET {url} -> {status}, retrying (attempt {attempt})");
                        backoff(attempt).await;
                        continue;
                    }

                    let content_type = r
                        .headers()
                        .get("content-type")
                        .and_then(|v| v.to_str().ok())
                        .map(|s| s.to_string());
                    let body = r.bytes().await.map(|b| b.to_vec()).unwrap_or_default();

                    return Ok(FetchResponse {
                        url: url.to_string(),
                        status,
                        content_type,
                        body,
                    });
                }
                Err(e) => {
                    if attempt < MAX_ATTEMPTS {
                        debug!("GET {url} failed ({e}), retrying (attempt {attempt})");
                        backoff(attempt).await;
                        continue;
                    }
                    return Err(FetchError {
                        url: url.to_string(),
                        attempts: attempt,
                        source: e,
                    });
                }
            }
        }
    }
}

/// Linearly increasing backoff with jitter.
async fn backoff(attempt: u32) {
    let jitter = { rand::thread_rng().gen_range(0..BACKOFF_JITTER_MS) };
    let delay = Duration::from_millis(BACKOFF_STEP_MS * u64::from(attempt) + jitter);
    tokio::time::sleep(delay).await;
}
