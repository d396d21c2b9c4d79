//! Record fetcher boundary.
//!
//! RULE: a fetch yields both record sets or nothing. A failure in either
//! half fails the whole fetch so no snapshot is ever built from partial data.

use crate::{
    error::FetchError,
    member::{MemberRecord, PendingPaymentRequest},
};
use serde::{Deserialize, Serialize};

/// Everything the aggregation engine needs for one collector.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CollectorRecords {
    pub members:          Vec<MemberRecord>,
    pub pending_requests: Vec<PendingPaymentRequest>,
}

/// A source of collector-scoped records.
pub trait RecordFetcher {
    /// Retrieve members and pending payment requests for `collector`.
    fn fetch(&self, collector: &str) -> Result<CollectorRecords, FetchError>;
}

impl<F: RecordFetcher + ?Sized> RecordFetcher for &F {
    fn fetch(&self, collector: &str) -> Result<CollectorRecords, FetchError> {
        (**self).fetch(collector)
    }
}

/// Fetch for an optional selection. No collector means nothing to fetch:
/// returns `Ok(None)` and the engine must not be invoked.
pub fn fetch_selection<F: RecordFetcher + ?Sized>(
    fetcher: &F,
    collector: Option<&str>,
) -> Result<Option<CollectorRecords>, FetchError> {
    match collector {
        Some(name) => fetcher.fetch(name).map(Some),
        None => Ok(None),
    }
}

/// Fixed records per collector, for tests and offline demos.
#[derive(Debug, Clone, Default)]
pub struct StaticFetcher {
    records: std::collections::HashMap<String, Result<CollectorRecords, FetchError>>,
}

impl StaticFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_records(mut self, collector: &str, records: CollectorRecords) -> Self {
        self.records.insert(collector.to_string(), Ok(records));
        self
    }

    pub fn with_failure(mut self, collector: &str, error: FetchError) -> Self {
        self.records.insert(collector.to_string(), Err(error));
        self
    }
}

impl RecordFetcher for StaticFetcher {
    /// Unknown collectors have no records.
    fn fetch(&self, collector: &str) -> Result<CollectorRecords, FetchError> {
        self.records
            .get(collector)
            .cloned()
            .unwrap_or_else(|| Ok(CollectorRecords::default()))
    }
}
