//! Bounded history of recently shown sketch uids.

use serde::{Deserialize, Serialize};

/// Maximum number of uids remembered.
pub const RECENCY_CAP: usize = 24;

/// Ordered uids of recently shown sketches, newest first. Insertion past
/// the cap evicts the oldest entry. Serializes as a plain JSON array so the
/// store slot stays readable.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecencyWindow(Vec<String>);

impl RecencyWindow {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a shown uid as the newest entry.
    pub fn push(&mut self, uid: impl Into<String>) {
        self.0.insert(0, uid.into());
        self.0.truncate(RECENCY_CAP);
    }

    pub fn contains(&self, uid: &str) -> bool {
        self.0.iter().any(|seen| seen == uid)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }
}
