//! Offline vs service-issue diagnosis.
//!
//! When a content fetch fails, the interesting question for messaging is
//! whether the user's connection is down or only the sketch backend is.
//! The probe answers it heuristically: hit a well-known always-up endpoint
//! and see whether *anything* comes back — the response status and body are
//! deliberately ignored, mirroring an opaque cross-origin probe. A captive
//! portal can still misclassify, so callers treat the result as advisory.

use std::time::Duration;

use url::Url;

use crate::types::ConnectivityState;

/// Default reachability probe endpoint.
pub const DEFAULT_PROBE_URL: &str = "http://clients3.google.com/generate_204";

/// Probe timeout. Short on purpose — a hung probe is an "offline" answer.
const PROBE_TIMEOUT: Duration = Duration::from_secs(4);

/// Classifies fetch failures by probing general internet reachability.
#[derive(Clone)]
pub struct Diagnoser {
    http: reqwest::Client,
    probe_url: Url,
    probe_timeout: Duration,
}

impl Diagnoser {
    pub fn new(probe_url: Url) -> Self {
        let http = reqwest::Client::builder()
            .user_agent(concat!("sketchtab/", env!("CARGO_PKG_VERSION")))
            .build()
            .unwrap_or_default();

        Self {
            http,
            probe_url,
            probe_timeout: PROBE_TIMEOUT,
        }
    }

    /// Diagnoser against the default probe endpoint.
    pub fn with_default_probe() -> Self {
        Self::new(Url::parse(DEFAULT_PROBE_URL).expect("default probe url parses"))
    }

    /// Override the probe timeout.
    pub fn with_probe_timeout(mut self, timeout: Duration) -> Self {
        self.probe_timeout = timeout;
        self
    }

    /// Classify a fetch failure.
    ///
    /// `offline_override` short-circuits to [`ConnectivityState::Offline`]
    /// without probing — the environment already knows it has no
    /// connectivity (or a test asked for it).
    pub async fn diagnose(&self, offline_override: bool) -> ConnectivityState {
        if offline_override {
            return ConnectivityState::Offline;
        }

        match self
            .http
            .get(self.probe_url.clone())
            .timeout(self.probe_timeout)
            .send()
            .await
        {
            // Any round trip at all means the internet is reachable and the
            // content API specifically is the problem.
            Ok(_) => ConnectivityState::ServiceIssue,
            Err(err) => {
                tracing::debug!(%err, probe = %self.probe_url, "reachability probe failed");
                ConnectivityState::Offline
            }
        }
    }
}
