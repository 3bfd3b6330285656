//! CLI subcommand implementations for the sketchtab binary.
//!
//! The CLI plays the presentation-adapter role: it asks the acquisition
//! policy for a sketch and renders the result (or the classified failure
//! state) as terminal output.

pub mod config_cmd;
pub mod last_cmd;
pub mod next_cmd;
pub mod status_cmd;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use url::Url;

use crate::connectivity::Diagnoser;
use crate::fetch::{FetchClient, DEFAULT_ENDPOINT};
use crate::policy::AcquisitionPolicy;
use crate::store::{FileStore, MemoryStore, Store};

/// Shared wiring for all subcommands.
pub struct Context {
    pub store: Store,
    pub policy: AcquisitionPolicy,
    pub json: bool,
}

impl Context {
    /// Build the store, fetch client, and policy from the global flags.
    ///
    /// The store backend is selected once, here: the persistent file store
    /// when its location is usable, the in-memory fallback otherwise.
    pub async fn build(json: bool, store_path: Option<PathBuf>, endpoint: Option<Url>) -> Result<Self> {
        let path = store_path.unwrap_or_else(FileStore::default_path);
        let store = match FileStore::open(&path).await {
            Ok(backend) => Store::new(Arc::new(backend)),
            Err(err) => {
                tracing::warn!(
                    %err,
                    path = %path.display(),
                    "persistent store unavailable; falling back to in-memory"
                );
                Store::new(Arc::new(MemoryStore::new()))
            }
        };

        let endpoint = match endpoint {
            Some(url) => url,
            None => Url::parse(DEFAULT_ENDPOINT).expect("default endpoint parses"),
        };
        let source = Arc::new(FetchClient::new(endpoint));
        let policy = AcquisitionPolicy::new(store.clone(), source, Diagnoser::with_default_probe());

        Ok(Self { store, policy, json })
    }
}
