// Copyright 2026 Sketchtab Contributors
// SPDX-License-Identifier: Apache-2.0

//! Sketchtab library — acquisition engine for a rotating new-tab sketch feed.
//!
//! The policy layer decides when to fetch, avoids recently shown sketches,
//! and classifies failures as offline vs service issue; the fetch client and
//! key-value store are the pluggable edges.

pub mod cli;
pub mod connectivity;
pub mod fetch;
pub mod policy;
pub mod store;
pub mod types;
