//! Coordinator event log.
//!
//! Every state transition of the snapshot coordinator is recorded here so the
//! presentation layer (and tests) can observe the refresh contract without
//! reaching into coordinator internals.

use crate::types::CollectorName;
use serde::{Deserialize, Serialize};

/// Variants are append-only; the runner streams them as JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DashboardEvent {
    SelectionChanged {
        from: Option<CollectorName>,
        to:   Option<CollectorName>,
    },
    FetchStarted {
        collector:  CollectorName,
        generation: u64,
    },
    CacheHit {
        collector: CollectorName,
    },
    SnapshotPublished {
        collector:     CollectorName,
        generation:    u64,
        total_members: usize,
    },
    FetchFailed {
        collector:  CollectorName,
        generation: u64,
        cause:      String,
    },
    StaleResponseDiscarded {
        collector:  CollectorName,
        generation: u64,
    },
    /// Re-selection while the collector's fetch has not resolved yet.
    FetchInFlight {
        collector:  CollectorName,
        generation: u64,
    },
}

impl DashboardEvent {
    /// Stable name for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::SelectionChanged { .. }       => "selection_changed",
            Self::FetchStarted { .. }           => "fetch_started",
            Self::CacheHit { .. }               => "cache_hit",
            Self::SnapshotPublished { .. }      => "snapshot_published",
            Self::FetchFailed { .. }            => "fetch_failed",
            Self::StaleResponseDiscarded { .. } => "stale_response_discarded",
            Self::FetchInFlight { .. }          => "fetch_in_flight",
        }
    }
}
