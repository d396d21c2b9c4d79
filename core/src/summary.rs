//! Presentation-side metrics derived from a snapshot.
//!
//! These are not part of the snapshot: they depend on the expected per-member
//! amount and involve division, which the engine never performs.

use crate::{config::AggregationPolicy, snapshot::StatisticsSnapshot, types::Amount};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollectionSummary {
    /// `None` when the collector has no members ("N/A").
    pub yearly_completion_pct:    Option<u32>,
    pub emergency_completion_pct: Option<u32>,
    pub remaining_members:        usize,
    /// Organization-wide expected total: every member at the expected amount.
    pub total_yearly_amount:      Amount,
    pub collected_yearly_amount:  Amount,
}

impl CollectionSummary {
    pub fn from_snapshot(snapshot: &StatisticsSnapshot, policy: &AggregationPolicy) -> Self {
        let total = snapshot.total_members;
        Self {
            yearly_completion_pct: completion_percentage(snapshot.yearly_payments.completed, total),
            emergency_completion_pct: completion_percentage(
                snapshot.emergency_collections.completed,
                total,
            ),
            remaining_members: total.saturating_sub(snapshot.yearly_payments.completed),
            total_yearly_amount: total as Amount * policy.expected_yearly_amount,
            collected_yearly_amount: snapshot.yearly_payments.total_collected,
        }
    }
}

/// `round(completed / total * 100)`, or `None` when there is nothing to divide by.
/// Halves round up.
pub fn completion_percentage(completed: usize, total: usize) -> Option<u32> {
    if total == 0 {
        return None;
    }
    let pct = (completed as f64 / total as f64) * 100.0;
    Some(pct.round() as u32)
}

/// Render a percentage the way the dashboard shows it.
pub fn format_percentage(pct: Option<u32>) -> String {
    match pct {
        Some(p) => format!("{p}%"),
        None => "N/A".to_string(),
    }
}
