// Copyright 2026 Sketchtab Contributors
// SPDX-License-Identifier: Apache-2.0

//! Core data types for sketch acquisition.

use serde::{Deserialize, Serialize};

/// How long a cached offline/service-issue classification stays valid.
pub const CLASSIFICATION_TTL_MS: i64 = 2 * 60 * 1000;

/// A single illustration record returned by the content API.
///
/// `uid` is always non-empty; a wire response without one is a fetch
/// failure, not a usable record. All other fields are filled from the
/// response or derived (see [`SketchRecord::from_wire`]).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SketchRecord {
    pub uid: String,
    pub title: String,
    pub image_url: Option<String>,
    pub page_url: String,
    pub description: String,
    pub prints_url: Option<String>,
    pub image_alt: String,
    pub published_at: Option<String>,
    pub podcast_url: Option<String>,
}

/// Wire shape of a content API response. Everything is optional here;
/// validation and fallback derivation happen in [`SketchRecord::from_wire`].
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireSketch {
    pub uid: Option<String>,
    pub title: Option<String>,
    pub image_url_optimised: Option<String>,
    pub image_url: Option<String>,
    pub page_url: Option<String>,
    pub description: Option<String>,
    pub redbubble_url: Option<String>,
    pub image_alt: Option<String>,
    pub published_at: Option<String>,
    pub podcast_url: Option<String>,
}

impl SketchRecord {
    /// Build a canonical record from a wire response.
    ///
    /// Returns `None` when the response has no non-empty `uid`. Missing
    /// fields fall back: `title` to a humanized `uid`, `page_url` to
    /// `<page_base>/sketch/<uid>`, `image_alt` to `title`.
    pub fn from_wire(wire: WireSketch, page_base: &str) -> Option<Self> {
        let uid = wire.uid.filter(|u| !u.is_empty())?;

        let title = wire
            .title
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| humanize_uid(&uid));
        let image_url = wire.image_url_optimised.or(wire.image_url);
        let page_url = wire
            .page_url
            .filter(|p| !p.is_empty())
            .unwrap_or_else(|| format!("{}/sketch/{uid}", page_base.trim_end_matches('/')));
        let image_alt = wire
            .image_alt
            .filter(|a| !a.is_empty())
            .unwrap_or_else(|| title.clone());

        Some(Self {
            uid,
            title,
            image_url,
            page_url,
            description: wire.description.unwrap_or_default(),
            prints_url: wire.redbubble_url,
            image_alt,
            published_at: wire.published_at,
            podcast_url: wire.podcast_url,
        })
    }
}

/// Turn a sketch uid like "morning-coffee_02" into "Morning Coffee 02".
pub fn humanize_uid(uid: &str) -> String {
    uid.split(['-', '_'])
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// User-configured fetch cadence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum FetchFrequency {
    /// Fetch once per local calendar day.
    #[default]
    Daily,
    /// Fetch when at least an hour has passed.
    Hourly,
    /// Fetch on every new tab.
    EachTab,
}

impl std::fmt::Display for FetchFrequency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FetchFrequency::Daily => write!(f, "daily"),
            FetchFrequency::Hourly => write!(f, "hourly"),
            FetchFrequency::EachTab => write!(f, "each-tab"),
        }
    }
}

/// Presentation theme. Persisted for the renderer; this crate only stores it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Light,
    Dark,
    #[default]
    System,
}

impl std::fmt::Display for Theme {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Theme::Light => write!(f, "light"),
            Theme::Dark => write!(f, "dark"),
            Theme::System => write!(f, "system"),
        }
    }
}

/// Why a fetch failed, as classified for user messaging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectivityState {
    /// General internet connectivity is down.
    Offline,
    /// Internet is reachable but the content API is unhealthy.
    ServiceIssue,
}

/// A cached connectivity classification with its timestamp.
///
/// Advisory only — a fresh fetch attempt always supersedes it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CachedClassification {
    pub state: ConnectivityState,
    /// Epoch milliseconds at classification time.
    pub at: i64,
}

impl CachedClassification {
    /// Whether this classification is still within its validity window.
    pub fn is_fresh(&self, now_ms: i64) -> bool {
        now_ms.saturating_sub(self.at) <= CLASSIFICATION_TTL_MS
    }
}

/// Errors from a single logical fetch of the content API.
#[derive(Debug, Clone, thiserror::Error)]
pub enum FetchError {
    #[error("request timed out")]
    Timeout,

    #[error("unexpected HTTP status {0}")]
    HttpStatus(u16),

    #[error("response body is not a usable sketch")]
    MalformedResponse,

    #[error("network error: {0}")]
    Network(String),
}

impl FetchError {
    /// Transient failures are worth retrying; everything else propagates.
    pub fn is_transient(&self) -> bool {
        match self {
            FetchError::Timeout | FetchError::Network(_) => true,
            FetchError::HttpStatus(code) => (500..=599).contains(code),
            FetchError::MalformedResponse => false,
        }
    }
}

/// Errors from the key-value store.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("store I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("store serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Errors surfaced by the acquisition policy.
#[derive(Debug, thiserror::Error)]
pub enum AcquireError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("a refresh is already in flight")]
    RefreshInFlight,
}

/// Outcome of classifying a fetch failure at the call site.
#[derive(Debug, Clone)]
pub enum FailureResolution {
    /// The quick recovery check succeeded; render this instead of an error.
    Recovered(SketchRecord),
    /// The failure stands, classified for user messaging.
    Classified(ConnectivityState),
}
