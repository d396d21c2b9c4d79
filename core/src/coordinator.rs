//! Snapshot coordinator. Owns the cached snapshot for the selected collector.
//!
//! CONTRACT:
//!   - The cache is keyed by collector identity (or its absence).
//!   - Changing the key discards the prior snapshot and starts a new fetch.
//!   - Re-selecting the same key returns the cached entry without re-fetching.
//!   - No key selected ⇒ Unavailable; nothing is fetched or computed.
//!
//! SINGLE WRITER:
//!   Every fetch is issued a FetchTicket (collector + generation). Only the
//!   ticket for the current selection AND the latest generation may publish.
//!   Anything else is a stale response: it is dropped, never published.
//!   The underlying I/O is not aborted, only ignored.

use crate::{
    aggregation::compute_snapshot,
    clock::Clock,
    config::AggregationPolicy,
    error::FetchError,
    event::DashboardEvent,
    fetcher::{CollectorRecords, RecordFetcher},
    snapshot::StatisticsSnapshot,
    types::{CollectorName, Timestamp},
};
use std::{collections::HashMap, sync::Arc};

/// What the presentation layer observes.
#[derive(Debug, Clone, PartialEq)]
pub enum SnapshotState {
    /// No collector selected.
    Unavailable,
    Loading,
    Ready(Arc<StatisticsSnapshot>),
    /// The last fetch failed. Non-fatal: `refresh` retries.
    Failed(FetchError),
}

impl SnapshotState {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Unavailable => "unavailable",
            Self::Loading     => "loading",
            Self::Ready(_)    => "ready",
            Self::Failed(_)   => "failed",
        }
    }

    pub fn snapshot(&self) -> Option<&Arc<StatisticsSnapshot>> {
        match self {
            Self::Ready(snapshot) => Some(snapshot),
            _ => None,
        }
    }
}

/// Permission to publish the result of one fetch attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchTicket {
    collector:  CollectorName,
    generation: u64,
}

impl FetchTicket {
    pub fn collector(&self) -> &str {
        &self.collector
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }
}

/// Outcome of handing a fetch result back to the coordinator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Publication {
    /// The result (snapshot or failure) is now the visible state.
    Published,
    /// The ticket was superseded; the result was dropped.
    Discarded,
}

#[derive(Debug)]
enum CacheEntry {
    Pending { generation: u64 },
    Ready(Arc<StatisticsSnapshot>),
    Failed(FetchError),
}

pub struct SnapshotCoordinator {
    policy:          AggregationPolicy,
    selected:        Option<CollectorName>,
    entries:         HashMap<CollectorName, CacheEntry>,
    next_generation: u64,
    events:          Vec<DashboardEvent>,
}

impl SnapshotCoordinator {
    pub fn new(policy: AggregationPolicy) -> Self {
        Self {
            policy,
            selected: None,
            entries: HashMap::new(),
            next_generation: 0,
            events: Vec::new(),
        }
    }

    pub fn policy(&self) -> &AggregationPolicy {
        &self.policy
    }

    pub fn selected(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    /// Select a collector (or none).
    ///
    /// Returns a ticket when a fetch must be performed. `None` means the
    /// current state already answers the request (cached, or unavailable).
    pub fn select(&mut self, collector: Option<&str>) -> Option<FetchTicket> {
        if self.selected.as_deref() == collector {
            let name = collector?;
            match self.entries.get(name) {
                Some(CacheEntry::Pending { generation }) => {
                    log::debug!("Collector '{name}' unchanged; fetch {generation} still in flight");
                    self.events.push(DashboardEvent::FetchInFlight {
                        collector:  name.to_string(),
                        generation: *generation,
                    });
                    return None;
                }
                Some(CacheEntry::Ready(_) | CacheEntry::Failed(_)) => {
                    log::debug!("Collector '{name}' unchanged; serving cached state");
                    self.events.push(DashboardEvent::CacheHit {
                        collector: name.to_string(),
                    });
                    return None;
                }
                None => return self.begin_fetch(),
            }
        }

        let previous = self.selected.take();
        self.entries.clear();
        self.selected = collector.map(str::to_string);
        log::info!("Collector selection changed: {previous:?} -> {:?}", self.selected);
        self.events.push(DashboardEvent::SelectionChanged {
            from: previous,
            to:   self.selected.clone(),
        });

        self.begin_fetch()
    }

    /// Invalidate the current collector's entry and issue a new fetch.
    /// Any fetch already in flight becomes stale.
    pub fn refresh(&mut self) -> Option<FetchTicket> {
        self.begin_fetch()
    }

    fn begin_fetch(&mut self) -> Option<FetchTicket> {
        let collector = self.selected.clone()?;
        self.next_generation += 1;
        let generation = self.next_generation;
        self.entries
            .insert(collector.clone(), CacheEntry::Pending { generation });
        log::debug!("Fetch started for collector '{collector}' (generation {generation})");
        self.events.push(DashboardEvent::FetchStarted {
            collector: collector.clone(),
            generation,
        });
        Some(FetchTicket {
            collector,
            generation,
        })
    }

    /// Hand back the result of the fetch `ticket` was issued for.
    ///
    /// On success the snapshot is computed with `now` and published.
    /// On failure the failure is published. A superseded ticket publishes
    /// nothing and the engine is not run.
    pub fn complete(
        &mut self,
        ticket: FetchTicket,
        result: Result<CollectorRecords, FetchError>,
        now: Timestamp,
    ) -> Publication {
        if !self.is_current(&ticket) {
            log::debug!(
                "Discarding stale response for collector '{}' (generation {})",
                ticket.collector,
                ticket.generation
            );
            self.events.push(DashboardEvent::StaleResponseDiscarded {
                collector:  ticket.collector,
                generation: ticket.generation,
            });
            return Publication::Discarded;
        }

        let FetchTicket {
            collector,
            generation,
        } = ticket;
        match result {
            Ok(records) => {
                let snapshot = Arc::new(compute_snapshot(
                    &records.members,
                    &records.pending_requests,
                    now,
                    &self.policy,
                ));
                log::info!(
                    "Snapshot published for collector '{collector}': {} members, {} pending requests",
                    snapshot.total_members,
                    snapshot.pending_payments.count
                );
                self.events.push(DashboardEvent::SnapshotPublished {
                    collector: collector.clone(),
                    generation,
                    total_members: snapshot.total_members,
                });
                self.entries.insert(collector, CacheEntry::Ready(snapshot));
            }
            Err(error) => {
                log::warn!("Fetch failed for collector '{collector}': {error}");
                self.events.push(DashboardEvent::FetchFailed {
                    collector: collector.clone(),
                    generation,
                    cause: error.to_string(),
                });
                self.entries.insert(collector, CacheEntry::Failed(error));
            }
        }
        Publication::Published
    }

    fn is_current(&self, ticket: &FetchTicket) -> bool {
        self.selected.as_deref() == Some(ticket.collector.as_str())
            && matches!(
                self.entries.get(&ticket.collector),
                Some(CacheEntry::Pending { generation }) if *generation == ticket.generation
            )
    }

    pub fn state(&self) -> SnapshotState {
        let Some(collector) = &self.selected else {
            return SnapshotState::Unavailable;
        };
        match self.entries.get(collector) {
            None | Some(CacheEntry::Pending { .. }) => SnapshotState::Loading,
            Some(CacheEntry::Ready(snapshot)) => SnapshotState::Ready(Arc::clone(snapshot)),
            Some(CacheEntry::Failed(error)) => SnapshotState::Failed(error.clone()),
        }
    }

    pub fn snapshot(&self) -> Option<Arc<StatisticsSnapshot>> {
        self.state().snapshot().cloned()
    }

    /// Select and, if needed, fetch synchronously. Returns the resulting state.
    pub fn load<F, C>(&mut self, collector: Option<&str>, fetcher: &F, clock: &C) -> SnapshotState
    where
        F: RecordFetcher + ?Sized,
        C: Clock + ?Sized,
    {
        if let Some(ticket) = self.select(collector) {
            self.run_fetch(ticket, fetcher, clock);
        }
        self.state()
    }

    /// Refresh and fetch synchronously. Returns the resulting state.
    pub fn reload<F, C>(&mut self, fetcher: &F, clock: &C) -> SnapshotState
    where
        F: RecordFetcher + ?Sized,
        C: Clock + ?Sized,
    {
        if let Some(ticket) = self.refresh() {
            self.run_fetch(ticket, fetcher, clock);
        }
        self.state()
    }

    fn run_fetch<F, C>(&mut self, ticket: FetchTicket, fetcher: &F, clock: &C)
    where
        F: RecordFetcher + ?Sized,
        C: Clock + ?Sized,
    {
        let result = fetcher.fetch(ticket.collector());
        self.complete(ticket, result, clock.now());
    }

    /// Take every event recorded since the last drain.
    pub fn drain_events(&mut self) -> Vec<DashboardEvent> {
        std::mem::take(&mut self.events)
    }
}
