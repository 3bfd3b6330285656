// Copyright 2026 Sketchtab Contributors
// SPDX-License-Identifier: Apache-2.0

//! Content API fetch client.
//!
//! One job: turn `GET <endpoint>` into a validated [`SketchRecord`].
//! Transient failures (timeout, network, 5xx) are retried twice with
//! exponential backoff; everything else propagates immediately. The client
//! never touches the key-value store.

use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use reqwest::header::{CACHE_CONTROL, PRAGMA};
use url::Url;

use crate::types::{FetchError, SketchRecord, WireSketch};

/// Default content API endpoint.
pub const DEFAULT_ENDPOINT: &str = "https://api.sketchoftheday.com/sketch/random";

/// Default base for constructed sketch page links.
pub const DEFAULT_PAGE_BASE: &str = "https://sketchoftheday.com";

/// Per-attempt timeout for a normal fetch.
const ATTEMPT_TIMEOUT: Duration = Duration::from_secs(15);

/// Timeout for the quick service-recovery check.
const QUICK_CHECK_TIMEOUT: Duration = Duration::from_secs(3);

/// Backoff delays between retry attempts.
const RETRY_DELAYS: [Duration; 2] = [Duration::from_secs(1), Duration::from_secs(2)];

/// Something that can produce sketches. The acquisition policy depends on
/// this seam, not on the concrete HTTP client.
#[async_trait]
pub trait SketchSource: Send + Sync {
    /// Fetch a sketch, retrying transient failures internally.
    async fn fetch_sketch(&self) -> Result<SketchRecord, FetchError>;

    /// One quick attempt with a short timeout and no retries — used to
    /// check whether a previously unhealthy service has recovered.
    async fn quick_check(&self) -> Result<SketchRecord, FetchError>;
}

/// HTTP implementation of [`SketchSource`] over reqwest.
#[derive(Clone)]
pub struct FetchClient {
    http: reqwest::Client,
    endpoint: Url,
    page_base: String,
    attempt_timeout: Duration,
    quick_timeout: Duration,
    retry_delays: Vec<Duration>,
}

impl FetchClient {
    /// Create a client for the given content API endpoint.
    pub fn new(endpoint: Url) -> Self {
        let http = reqwest::Client::builder()
            .user_agent(concat!("sketchtab/", env!("CARGO_PKG_VERSION")))
            .build()
            .unwrap_or_default();

        Self {
            http,
            endpoint,
            page_base: DEFAULT_PAGE_BASE.to_string(),
            attempt_timeout: ATTEMPT_TIMEOUT,
            quick_timeout: QUICK_CHECK_TIMEOUT,
            retry_delays: RETRY_DELAYS.to_vec(),
        }
    }

    /// Override the base URL used for constructed sketch page links.
    pub fn with_page_base(mut self, page_base: impl Into<String>) -> Self {
        self.page_base = page_base.into();
        self
    }

    /// Override the per-attempt timeout.
    pub fn with_attempt_timeout(mut self, timeout: Duration) -> Self {
        self.attempt_timeout = timeout;
        self
    }

    /// Override the quick-check timeout.
    pub fn with_quick_timeout(mut self, timeout: Duration) -> Self {
        self.quick_timeout = timeout;
        self
    }

    /// Override the backoff delays (and thereby the retry count).
    pub fn with_retry_delays(mut self, delays: Vec<Duration>) -> Self {
        self.retry_delays = delays;
        self
    }

    /// Issue one request against the content API.
    async fn fetch_once(&self, timeout: Duration) -> Result<SketchRecord, FetchError> {
        // Cache-busting timestamp defeats intermediate caches that ignore
        // the no-cache headers.
        let mut url = self.endpoint.clone();
        url.query_pairs_mut()
            .append_pair("t", &Utc::now().timestamp_millis().to_string());

        let response = self
            .http
            .get(url)
            .header(CACHE_CONTROL, "no-cache")
            .header(PRAGMA, "no-cache")
            .timeout(timeout)
            .send()
            .await
            .map_err(request_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::HttpStatus(status.as_u16()));
        }

        let wire: WireSketch = response.json().await.map_err(body_error)?;
        SketchRecord::from_wire(wire, &self.page_base).ok_or(FetchError::MalformedResponse)
    }
}

#[async_trait]
impl SketchSource for FetchClient {
    async fn fetch_sketch(&self) -> Result<SketchRecord, FetchError> {
        let mut attempt = 0usize;

        loop {
            match self.fetch_once(self.attempt_timeout).await {
                Ok(record) => {
                    tracing::info!(uid = %record.uid, "fetched sketch");
                    return Ok(record);
                }
                Err(err) if err.is_transient() && attempt < self.retry_delays.len() => {
                    let delay = self.retry_delays[attempt];
                    attempt += 1;
                    tracing::debug!(
                        %err,
                        attempt,
                        delay_ms = delay.as_millis() as u64,
                        "transient fetch failure; backing off"
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(err) => return Err(err),
            }
        }
    }

    async fn quick_check(&self) -> Result<SketchRecord, FetchError> {
        self.fetch_once(self.quick_timeout).await
    }
}

fn request_error(err: reqwest::Error) -> FetchError {
    if err.is_timeout() {
        FetchError::Timeout
    } else {
        FetchError::Network(err.to_string())
    }
}

fn body_error(err: reqwest::Error) -> FetchError {
    if err.is_timeout() {
        FetchError::Timeout
    } else if err.is_decode() {
        FetchError::MalformedResponse
    } else {
        FetchError::Network(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::time::Instant;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> FetchClient {
        let endpoint = Url::parse(&format!("{}/sketch/random", server.uri())).unwrap();
        FetchClient::new(endpoint)
            .with_retry_delays(vec![Duration::from_millis(10), Duration::from_millis(20)])
    }

    #[tokio::test]
    async fn test_retries_5xx_then_succeeds() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/sketch/random"))
            .respond_with(ResponseTemplate::new(503))
            .up_to_n_times(2)
            .expect(2)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/sketch/random"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "uid": "pine-tree" })))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server);
        let started = Instant::now();
        let record = client.fetch_sketch().await.unwrap();

        assert_eq!(record.uid, "pine-tree");
        // Both backoff delays must have elapsed (10ms + 20ms)
        assert!(started.elapsed() >= Duration::from_millis(30));
    }

    #[tokio::test]
    async fn test_retries_exhausted_propagates_status() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/sketch/random"))
            .respond_with(ResponseTemplate::new(502))
            .expect(3) // initial attempt + 2 retries, never more
            .mount(&server)
            .await;

        let client = client_for(&server);
        let err = client.fetch_sketch().await.unwrap_err();
        assert!(matches!(err, FetchError::HttpStatus(502)));
    }

    #[tokio::test]
    async fn test_4xx_is_not_retried() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/sketch/random"))
            .respond_with(ResponseTemplate::new(404))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server);
        let err = client.fetch_sketch().await.unwrap_err();
        assert!(matches!(err, FetchError::HttpStatus(404)));
    }

    #[tokio::test]
    async fn test_missing_uid_is_malformed_and_not_retried() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/sketch/random"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({ "title": "No uid here" })),
            )
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server);
        let err = client.fetch_sketch().await.unwrap_err();
        assert!(matches!(err, FetchError::MalformedResponse));
    }

    #[tokio::test]
    async fn test_slow_response_times_out() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/sketch/random"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({ "uid": "slow" }))
                    .set_delay(Duration::from_millis(300)),
            )
            .mount(&server)
            .await;

        let client = client_for(&server)
            .with_attempt_timeout(Duration::from_millis(50))
            .with_retry_delays(Vec::new());
        let err = client.fetch_sketch().await.unwrap_err();
        assert!(matches!(err, FetchError::Timeout));
    }

    #[tokio::test]
    async fn test_cache_busting_param_is_appended() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/sketch/random"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "uid": "a" })))
            .mount(&server)
            .await;

        let client = client_for(&server);
        client.fetch_sketch().await.unwrap();

        let requests = server.received_requests().await.unwrap();
        assert_eq!(requests.len(), 1);
        assert!(requests[0].url.query_pairs().any(|(k, _)| k == "t"));
        let cache_control = requests[0]
            .headers
            .get("cache-control")
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default();
        assert_eq!(cache_control, "no-cache");
    }

    #[tokio::test]
    async fn test_quick_check_does_not_retry() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/sketch/random"))
            .respond_with(ResponseTemplate::new(503))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server);
        let err = client.quick_check().await.unwrap_err();
        assert!(matches!(err, FetchError::HttpStatus(503)));
    }
}
