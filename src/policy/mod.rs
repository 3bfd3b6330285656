// Copyright 2026 Sketchtab Contributors
// SPDX-License-Identifier: Apache-2.0

//! Acquisition policy — the decision layer between the renderer and the
//! fetch client.
//!
//! Given the configured cadence and the persisted bookkeeping, decide
//! whether to reuse the last shown sketch or fetch anew; when fetching,
//! avoid the recency window via a bounded reject-and-refetch loop; on
//! failure, classify the outcome for user messaging. The policy is the
//! single writer of acquisition state — a per-instance in-flight flag keeps
//! concurrent refreshes from racing the store's non-transactional slots.

pub mod cadence;
pub mod recency;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use chrono::Utc;

use crate::connectivity::Diagnoser;
use crate::fetch::SketchSource;
use crate::store::{keys, Store};
use crate::types::{
    AcquireError, CachedClassification, ConnectivityState, FailureResolution, FetchError,
    FetchFrequency, SketchRecord, StoreError,
};

pub use recency::RecencyWindow;

/// How many fetches may be rejected for recency before a repeat is
/// accepted. The API does not guarantee uniqueness, so an unbounded reject
/// loop could starve against a small pool of sketches.
const DEDUP_ATTEMPTS: usize = 5;

/// Decides when to fetch, de-duplicates, and classifies failures.
pub struct AcquisitionPolicy {
    store: Store,
    source: Arc<dyn SketchSource>,
    diagnoser: Diagnoser,
    in_flight: AtomicBool,
}

impl AcquisitionPolicy {
    pub fn new(store: Store, source: Arc<dyn SketchSource>, diagnoser: Diagnoser) -> Self {
        Self {
            store,
            source,
            diagnoser,
            in_flight: AtomicBool::new(false),
        }
    }

    /// The "new tab" entry point: reuse the last sketch when the cadence
    /// allows it, otherwise fetch a fresh one.
    pub async fn next_sketch(&self) -> Result<SketchRecord, AcquireError> {
        let _guard = self.begin()?;

        let frequency: FetchFrequency = self
            .store
            .get(keys::FREQUENCY)
            .await?
            .unwrap_or_default();
        let last_fetch: Option<i64> = self.store.get(keys::LAST_FETCH_TIME).await?;
        let now = Utc::now().timestamp_millis();

        if !cadence::should_fetch(frequency, last_fetch, now) {
            if let Some(last) = self.store.get::<SketchRecord>(keys::LAST_SKETCH).await? {
                tracing::debug!(uid = %last.uid, %frequency, "cadence satisfied; reusing last sketch");
                return Ok(last);
            }
            // Cadence satisfied but nothing cached to show — fetch anyway.
        }

        self.fetch_and_persist().await
    }

    /// Manual refresh: always fetch, regardless of cadence.
    pub async fn refresh(&self) -> Result<SketchRecord, AcquireError> {
        let _guard = self.begin()?;
        self.fetch_and_persist().await
    }

    /// Record that a sketch (fresh or reused) is about to be rendered.
    ///
    /// Callers invoke this for every shown sketch; it is the only mutation
    /// path for the recency window.
    pub async fn record_shown(&self, uid: &str) -> Result<(), StoreError> {
        let mut recent: RecencyWindow = self
            .store
            .get(keys::RECENT)
            .await?
            .unwrap_or_default();
        recent.push(uid);
        self.store.set(keys::RECENT, &recent).await
    }

    /// Classify a fetch failure for user messaging.
    ///
    /// A fresh cached `service_issue` short-circuits the slow probe, but
    /// only after one quick check against the content API — the service may
    /// have recovered, in which case the recovered sketch is persisted and
    /// returned instead of any error state.
    pub async fn classify_failure(&self) -> Result<FailureResolution, StoreError> {
        let now = Utc::now().timestamp_millis();

        if let Some(cached) = self
            .store
            .get::<CachedClassification>(keys::CONNECTIVITY_CACHE)
            .await?
        {
            if cached.state == ConnectivityState::ServiceIssue && cached.is_fresh(now) {
                match self.source.quick_check().await {
                    Ok(record) => {
                        tracing::info!(uid = %record.uid, "service recovered during quick check");
                        self.persist_success(&record).await?;
                        return Ok(FailureResolution::Recovered(record));
                    }
                    Err(err) => {
                        tracing::debug!(%err, "quick check failed; keeping cached classification");
                        return Ok(FailureResolution::Classified(ConnectivityState::ServiceIssue));
                    }
                }
            }
        }

        let offline_override: bool = self
            .store
            .get(keys::TEST_OFFLINE_MODE)
            .await?
            .unwrap_or(false);
        let state = self.diagnoser.diagnose(offline_override).await;

        self.store
            .set(keys::CONNECTIVITY_CACHE, &CachedClassification { state, at: now })
            .await?;

        Ok(FailureResolution::Classified(state))
    }

    async fn fetch_and_persist(&self) -> Result<SketchRecord, AcquireError> {
        let recent: RecencyWindow = self
            .store
            .get(keys::RECENT)
            .await?
            .unwrap_or_default();

        let record = self.fetch_deduplicated(&recent).await?;
        self.persist_success(&record).await?;
        Ok(record)
    }

    /// Fetch, preferring a sketch not in the recency window. After
    /// [`DEDUP_ATTEMPTS`] recently-seen results, one final fetch is accepted
    /// unconditionally.
    async fn fetch_deduplicated(&self, recent: &RecencyWindow) -> Result<SketchRecord, FetchError> {
        for attempt in 0..DEDUP_ATTEMPTS {
            let record = self.source.fetch_sketch().await?;
            if !recent.contains(&record.uid) {
                return Ok(record);
            }
            tracing::debug!(uid = %record.uid, attempt, "sketch shown recently; fetching another");
        }

        self.source.fetch_sketch().await
    }

    /// `lastFetchTime` and `lastSketch` always move together, after the
    /// fetch succeeded, never before; any success also clears the cached
    /// connectivity classification.
    async fn persist_success(&self, record: &SketchRecord) -> Result<(), StoreError> {
        let now = Utc::now().timestamp_millis();
        self.store.set(keys::LAST_FETCH_TIME, &now).await?;
        self.store.set(keys::LAST_SKETCH, record).await?;
        self.store.remove(keys::CONNECTIVITY_CACHE).await?;
        Ok(())
    }

    fn begin(&self) -> Result<InFlightGuard<'_>, AcquireError> {
        if self
            .in_flight
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return Err(AcquireError::RefreshInFlight);
        }
        Ok(InFlightGuard(&self.in_flight))
    }
}

/// Clears the in-flight flag when the operation settles, success or not.
struct InFlightGuard<'a>(&'a AtomicBool);

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}
