//! The aggregation engine: raw collector records in, one snapshot out.
//!
//! RULES:
//!   - Pure: no I/O, no clock reads, inputs are borrowed immutably.
//!   - Never divides. Percentages belong to the consumer (see summary.rs).
//!   - Absent values are skipped, never treated as extremes or as zero dates.
//!   - Window comparisons are strict on both ends:
//!       overdue       ⇔ due < now
//!       recent / new  ⇔ date > now − window

use crate::{
    config::AggregationPolicy,
    member::{CollectionStatus, MemberRecord, MembershipStatus, PendingPaymentRequest},
    snapshot::{
        EmergencyCollectionStats, MembershipStats, PendingPaymentStats, RecentActivityStats,
        StatisticsSnapshot, YearlyPaymentStats,
    },
    types::{Amount, Timestamp},
};
use chrono::{DateTime, Duration, Utc};

/// Compute the statistics snapshot for one collector's records.
///
/// `members` and `pending_requests` must already be filtered to the collector.
/// Empty inputs produce an all-zero snapshot.
pub fn compute_snapshot(
    members: &[MemberRecord],
    pending_requests: &[PendingPaymentRequest],
    now: Timestamp,
    policy: &AggregationPolicy,
) -> StatisticsSnapshot {
    let window_start = window_start(now, policy.recent_window_days);

    StatisticsSnapshot {
        total_members:         members.len(),
        pending_payments:      pending_payment_stats(pending_requests),
        yearly_payments:       yearly_payment_stats(members, now, policy),
        emergency_collections: emergency_collection_stats(members),
        recent_activity:       recent_activity_stats(members, window_start),
        membership_stats:      membership_stats(members, window_start),
    }
}

/// Start of the recent window. A window reaching past the representable
/// range starts at the earliest representable instant.
fn window_start(now: Timestamp, days: i64) -> Timestamp {
    Duration::try_days(days)
        .and_then(|window| now.checked_sub_signed(window))
        .unwrap_or(DateTime::<Utc>::MIN_UTC)
}

fn pending_payment_stats(requests: &[PendingPaymentRequest]) -> PendingPaymentStats {
    PendingPaymentStats {
        count:  requests.len(),
        amount: sum_amounts(requests.iter().map(|r| r.amount)),
    }
}

fn yearly_payment_stats(
    members: &[MemberRecord],
    now: Timestamp,
    policy: &AggregationPolicy,
) -> YearlyPaymentStats {
    YearlyPaymentStats {
        completed: count_status(members, |m| m.yearly_payment_status, CollectionStatus::Completed),
        pending:   count_status(members, |m| m.yearly_payment_status, CollectionStatus::Pending),
        total_collected: sum_amounts(
            members
                .iter()
                .map(|m| m.effective_yearly_amount(policy.default_yearly_amount)),
        ),
        next_due_date: members.iter().filter_map(|m| m.yearly_payment_due_date).min(),
        overdue: members
            .iter()
            .filter(|m| {
                m.yearly_payment_due_date.is_some_and(|due| due < now)
                    && !m.yearly_payment_status.is_completed()
            })
            .count(),
    }
}

fn emergency_collection_stats(members: &[MemberRecord]) -> EmergencyCollectionStats {
    EmergencyCollectionStats {
        completed: count_status(members, |m| m.emergency_collection_status, CollectionStatus::Completed),
        pending:   count_status(members, |m| m.emergency_collection_status, CollectionStatus::Pending),
        total_collected: sum_amounts(members.iter().map(MemberRecord::effective_emergency_amount)),
    }
}

fn recent_activity_stats(members: &[MemberRecord], window_start: Timestamp) -> RecentActivityStats {
    RecentActivityStats {
        last_payment_date: members.iter().filter_map(|m| m.payment_date).max(),
        recent_payments: members
            .iter()
            .filter(|m| m.payment_date.is_some_and(|paid| paid > window_start))
            .count(),
    }
}

fn membership_stats(members: &[MemberRecord], window_start: Timestamp) -> MembershipStats {
    let count_membership = |status: MembershipStatus| {
        members
            .iter()
            .filter(|m| m.membership_status == Some(status))
            .count()
    };
    MembershipStats {
        active:      count_membership(MembershipStatus::Active),
        inactive:    count_membership(MembershipStatus::Inactive),
        new_members: members
            .iter()
            .filter(|m| m.created_at.is_some_and(|joined| joined > window_start))
            .count(),
    }
}

fn count_status(
    members: &[MemberRecord],
    field: impl Fn(&MemberRecord) -> CollectionStatus,
    status: CollectionStatus,
) -> usize {
    members.iter().filter(|&m| field(m) == status).count()
}

// Folds from +0.0 so an empty sum serializes as 0, not -0.
fn sum_amounts(amounts: impl Iterator<Item = Amount>) -> Amount {
    amounts.fold(0.0, |total, amount| total + amount)
}
