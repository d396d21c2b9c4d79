//! Statistics snapshot: the aggregation engine's only output.
//!
//! A snapshot is computed for one collector at one instant and never
//! changes afterwards. It is cached for the session, never persisted.

use crate::types::{Amount, Timestamp};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StatisticsSnapshot {
    pub total_members:         usize,
    pub pending_payments:      PendingPaymentStats,
    pub yearly_payments:       YearlyPaymentStats,
    pub emergency_collections: EmergencyCollectionStats,
    pub recent_activity:       RecentActivityStats,
    pub membership_stats:      MembershipStats,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PendingPaymentStats {
    pub count:  usize,
    pub amount: Amount,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct YearlyPaymentStats {
    pub completed:       usize,
    pub pending:         usize,
    pub total_collected: Amount,
    /// Earliest due date across all members, paid or not.
    pub next_due_date:   Option<Timestamp>,
    pub overdue:         usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EmergencyCollectionStats {
    pub completed:       usize,
    pub pending:         usize,
    pub total_collected: Amount,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RecentActivityStats {
    pub last_payment_date: Option<Timestamp>,
    pub recent_payments:   usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MembershipStats {
    pub active:      usize,
    pub inactive:    usize,
    pub new_members: usize,
}

impl StatisticsSnapshot {
    /// True when the collector has no members and no pending requests.
    pub fn is_empty(&self) -> bool {
        self.total_members == 0 && self.pending_payments.count == 0
    }
}
