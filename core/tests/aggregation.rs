//! Aggregation engine tests.
//!
//! Tests cover: member totals, determinism, monotonicity of collected totals,
//! the strict overdue and recent-window boundaries, absent-date handling,
//! per-member defaults, and the all-empty snapshot.

use chrono::{Duration, TimeZone, Utc};
use dues_core::{
    compute_snapshot,
    config::AggregationPolicy,
    member::{CollectionStatus, MemberRecord, MembershipStatus, PendingPaymentRequest},
    types::Timestamp,
};

fn at(y: i32, m: u32, d: u32) -> Timestamp {
    Utc.with_ymd_and_hms(y, m, d, 0, 0, 0).unwrap()
}

fn now() -> Timestamp {
    at(2024, 1, 1)
}

fn member() -> MemberRecord {
    MemberRecord::new(at(2020, 6, 1))
}

fn completed(amount: Option<f64>) -> MemberRecord {
    MemberRecord {
        yearly_payment_status: CollectionStatus::Completed,
        yearly_payment_amount: amount,
        ..member()
    }
}

fn request(amount: f64) -> PendingPaymentRequest {
    PendingPaymentRequest {
        amount,
        collector_id: "col-01".into(),
    }
}

fn policy() -> AggregationPolicy {
    AggregationPolicy::default()
}

#[test]
fn total_members_matches_member_count() {
    for n in [0usize, 1, 7, 120] {
        let members = vec![member(); n];
        let snapshot = compute_snapshot(&members, &[], now(), &policy());
        assert_eq!(snapshot.total_members, n);
    }
}

#[test]
fn identical_inputs_produce_identical_snapshots() {
    let members = vec![
        completed(Some(25.0)),
        MemberRecord {
            yearly_payment_due_date: Some(at(2023, 12, 1)),
            payment_date: Some(at(2023, 12, 20)),
            ..member()
        },
    ];
    let requests = vec![request(10.0), request(15.5)];

    let a = compute_snapshot(&members, &requests, now(), &policy());
    let b = compute_snapshot(&members, &requests, now(), &policy());
    assert_eq!(a, b);
    assert_eq!(
        serde_json::to_string(&a).unwrap(),
        serde_json::to_string(&b).unwrap()
    );
}

#[test]
fn inputs_are_not_mutated() {
    let members = vec![completed(None), member()];
    let requests = vec![request(5.0)];
    let members_before = members.clone();
    let requests_before = requests.clone();

    let _ = compute_snapshot(&members, &requests, now(), &policy());
    assert_eq!(members, members_before);
    assert_eq!(requests, requests_before);
}

#[test]
fn adding_a_completed_member_adds_its_effective_amount() {
    let mut members = vec![member(), completed(Some(30.0))];
    let before = compute_snapshot(&members, &[], now(), &policy());

    members.push(completed(Some(55.0)));
    let with_explicit = compute_snapshot(&members, &[], now(), &policy());
    assert_eq!(with_explicit.yearly_payments.completed, before.yearly_payments.completed + 1);
    assert_eq!(
        with_explicit.yearly_payments.total_collected,
        before.yearly_payments.total_collected + 55.0
    );

    members.push(completed(None));
    let with_default = compute_snapshot(&members, &[], now(), &policy());
    assert_eq!(with_default.yearly_payments.completed, with_explicit.yearly_payments.completed + 1);
    assert_eq!(
        with_default.yearly_payments.total_collected,
        with_explicit.yearly_payments.total_collected + 40.0
    );
}

#[test]
fn default_amount_applies_per_member_only() {
    let members = vec![completed(Some(100.0)), completed(None), completed(Some(0.0))];
    let snapshot = compute_snapshot(&members, &[], now(), &policy());
    assert_eq!(snapshot.yearly_payments.completed, 3);
    assert_eq!(snapshot.yearly_payments.total_collected, 140.0);
}

#[test]
fn pending_and_unset_members_contribute_nothing() {
    let members = vec![
        MemberRecord {
            yearly_payment_status: CollectionStatus::Pending,
            yearly_payment_amount: Some(40.0),
            ..member()
        },
        MemberRecord {
            yearly_payment_amount: Some(40.0),
            ..member()
        },
    ];
    let snapshot = compute_snapshot(&members, &[], now(), &policy());
    assert_eq!(snapshot.yearly_payments.completed, 0);
    assert_eq!(snapshot.yearly_payments.pending, 1);
    assert_eq!(snapshot.yearly_payments.total_collected, 0.0);
}

#[test]
fn due_date_equal_to_now_is_not_overdue() {
    let members = vec![MemberRecord {
        yearly_payment_status: CollectionStatus::Pending,
        yearly_payment_due_date: Some(now()),
        ..member()
    }];
    let snapshot = compute_snapshot(&members, &[], now(), &policy());
    assert_eq!(snapshot.yearly_payments.overdue, 0);
}

#[test]
fn due_date_one_second_before_now_is_overdue() {
    let members = vec![MemberRecord {
        yearly_payment_status: CollectionStatus::Pending,
        yearly_payment_due_date: Some(now() - Duration::seconds(1)),
        ..member()
    }];
    let snapshot = compute_snapshot(&members, &[], now(), &policy());
    assert_eq!(snapshot.yearly_payments.overdue, 1);
}

#[test]
fn unset_status_past_due_is_overdue_but_completed_is_not() {
    let past = Some(at(2023, 6, 1));
    let members = vec![
        MemberRecord {
            yearly_payment_due_date: past,
            ..member()
        },
        MemberRecord {
            yearly_payment_due_date: past,
            ..completed(None)
        },
    ];
    let snapshot = compute_snapshot(&members, &[], now(), &policy());
    assert_eq!(snapshot.yearly_payments.overdue, 1);
}

#[test]
fn payment_exactly_thirty_days_ago_is_not_recent() {
    let members = vec![MemberRecord {
        payment_date: Some(now() - Duration::days(30)),
        ..member()
    }];
    let snapshot = compute_snapshot(&members, &[], now(), &policy());
    assert_eq!(snapshot.recent_activity.recent_payments, 0);
    assert_eq!(snapshot.recent_activity.last_payment_date, Some(now() - Duration::days(30)));
}

#[test]
fn payment_twenty_nine_days_ago_is_recent() {
    let members = vec![MemberRecord {
        payment_date: Some(now() - Duration::days(29)),
        ..member()
    }];
    let snapshot = compute_snapshot(&members, &[], now(), &policy());
    assert_eq!(snapshot.recent_activity.recent_payments, 1);
}

#[test]
fn new_member_window_is_strict() {
    let members = vec![
        MemberRecord::new(now() - Duration::days(30)),
        MemberRecord::new(now() - Duration::days(29)),
        MemberRecord::new(now() - Duration::days(30) + Duration::seconds(1)),
    ];
    let snapshot = compute_snapshot(&members, &[], now(), &policy());
    assert_eq!(snapshot.membership_stats.new_members, 2);
}

#[test]
fn missing_due_date_never_affects_next_due_or_overdue() {
    let members = vec![
        MemberRecord {
            yearly_payment_status: CollectionStatus::Pending,
            ..member()
        },
        member(),
        completed(None),
    ];
    let snapshot = compute_snapshot(&members, &[], now(), &policy());
    assert_eq!(snapshot.yearly_payments.next_due_date, None);
    assert_eq!(snapshot.yearly_payments.overdue, 0);
}

#[test]
fn date_extremes_skip_absent_values() {
    let members = vec![
        MemberRecord {
            yearly_payment_due_date: Some(at(2024, 3, 1)),
            payment_date: Some(at(2023, 11, 2)),
            ..member()
        },
        member(),
        MemberRecord {
            // Completed members still count towards the earliest due date.
            yearly_payment_due_date: Some(at(2024, 2, 1)),
            payment_date: Some(at(2023, 12, 24)),
            ..completed(None)
        },
        MemberRecord {
            yearly_payment_due_date: Some(at(2024, 2, 1)),
            ..member()
        },
    ];
    let snapshot = compute_snapshot(&members, &[], now(), &policy());
    assert_eq!(snapshot.yearly_payments.next_due_date, Some(at(2024, 2, 1)));
    assert_eq!(snapshot.recent_activity.last_payment_date, Some(at(2023, 12, 24)));
}

#[test]
fn emergency_collections_have_no_default_amount() {
    let members = vec![
        MemberRecord {
            emergency_collection_status: CollectionStatus::Completed,
            emergency_collection_amount: Some(25.0),
            ..member()
        },
        MemberRecord {
            emergency_collection_status: CollectionStatus::Completed,
            ..member()
        },
        MemberRecord {
            emergency_collection_status: CollectionStatus::Pending,
            emergency_collection_amount: Some(50.0),
            ..member()
        },
    ];
    let snapshot = compute_snapshot(&members, &[], now(), &policy());
    assert_eq!(snapshot.emergency_collections.completed, 2);
    assert_eq!(snapshot.emergency_collections.pending, 1);
    assert_eq!(snapshot.emergency_collections.total_collected, 25.0);
}

#[test]
fn membership_counts_skip_members_without_status() {
    let members = vec![
        member(),
        MemberRecord {
            membership_status: Some(MembershipStatus::Inactive),
            ..member()
        },
        MemberRecord {
            membership_status: None,
            ..member()
        },
    ];
    let snapshot = compute_snapshot(&members, &[], now(), &policy());
    assert_eq!(snapshot.membership_stats.active, 1);
    assert_eq!(snapshot.membership_stats.inactive, 1);
    assert_eq!(snapshot.total_members, 3);
}

#[test]
fn pending_requests_are_counted_and_summed() {
    let requests = vec![request(40.0), request(12.5), request(0.0)];
    let snapshot = compute_snapshot(&[], &requests, now(), &policy());
    assert_eq!(snapshot.pending_payments.count, 3);
    assert_eq!(snapshot.pending_payments.amount, 52.5);
    assert_eq!(snapshot.total_members, 0);
}

#[test]
fn completed_member_without_amount_and_overdue_pending_member() {
    let members = vec![
        completed(None),
        MemberRecord {
            yearly_payment_status: CollectionStatus::Pending,
            yearly_payment_due_date: Some(at(2020, 1, 1)),
            ..member()
        },
    ];
    let snapshot = compute_snapshot(&members, &[], at(2024, 1, 1), &policy());
    assert_eq!(snapshot.yearly_payments.completed, 1);
    assert_eq!(snapshot.yearly_payments.total_collected, 40.0);
    assert_eq!(snapshot.yearly_payments.overdue, 1);
}

#[test]
fn empty_inputs_produce_a_zeroed_snapshot() {
    let snapshot = compute_snapshot(&[], &[], now(), &policy());
    assert!(snapshot.is_empty());
    assert_eq!(snapshot.total_members, 0);
    assert_eq!(snapshot.pending_payments.count, 0);
    assert_eq!(snapshot.pending_payments.amount, 0.0);
    assert_eq!(snapshot.yearly_payments.completed, 0);
    assert_eq!(snapshot.yearly_payments.pending, 0);
    assert_eq!(snapshot.yearly_payments.total_collected, 0.0);
    assert_eq!(snapshot.yearly_payments.next_due_date, None);
    assert_eq!(snapshot.yearly_payments.overdue, 0);
    assert_eq!(snapshot.emergency_collections.total_collected, 0.0);
    assert_eq!(snapshot.recent_activity.last_payment_date, None);
    assert_eq!(snapshot.recent_activity.recent_payments, 0);
    assert_eq!(snapshot.membership_stats.new_members, 0);

    // Sums start from +0.0, so nothing renders as "-0".
    let json = serde_json::to_string(&snapshot).unwrap();
    assert!(!json.contains("-0"), "unexpected negative zero in {json}");
}

#[test]
fn policy_constants_drive_the_folds() {
    let custom = AggregationPolicy {
        default_yearly_amount: 55.0,
        recent_window_days: 7,
        ..AggregationPolicy::default()
    };
    let members = vec![
        completed(None),
        MemberRecord {
            payment_date: Some(now() - Duration::days(10)),
            ..member()
        },
    ];
    let snapshot = compute_snapshot(&members, &[], now(), &custom);
    assert_eq!(snapshot.yearly_payments.total_collected, 55.0);
    assert_eq!(snapshot.recent_activity.recent_payments, 0);

    let default = compute_snapshot(&members, &[], now(), &policy());
    assert_eq!(default.yearly_payments.total_collected, 40.0);
    assert_eq!(default.recent_activity.recent_payments, 1);
}

#[test]
fn window_beyond_the_calendar_covers_everything() {
    let members = vec![
        MemberRecord {
            payment_date: Some(at(1990, 1, 1)),
            ..MemberRecord::new(at(1985, 5, 5))
        },
        MemberRecord {
            payment_date: Some(now() - Duration::days(1)),
            ..member()
        },
    ];
    for days in [100_000_000, i64::MAX] {
        let policy = AggregationPolicy {
            recent_window_days: days,
            ..AggregationPolicy::default()
        };
        let snapshot = compute_snapshot(&members, &[], now(), &policy);
        assert_eq!(snapshot.recent_activity.recent_payments, 2, "window of {days} days");
        assert_eq!(snapshot.membership_stats.new_members, 2, "window of {days} days");
    }
}

#[test]
fn member_without_join_date_is_counted_but_never_new() {
    let members = vec![
        MemberRecord {
            created_at: None,
            ..member()
        },
        MemberRecord::new(now() - Duration::days(3)),
    ];
    let snapshot = compute_snapshot(&members, &[], now(), &policy());
    assert_eq!(snapshot.total_members, 2);
    assert_eq!(snapshot.membership_stats.new_members, 1);
}
