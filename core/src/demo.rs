//! Deterministic demo dataset for the runner and for tests.
//!
//! Same seed and same `now` ⇒ same members, statuses, amounts, dates and
//! request ids, hence the same statistics.

use crate::{
    config::DemoDataConfig,
    error::DuesResult,
    member::{format_timestamp, CollectionStatus, MemberRecord, MembershipStatus, RawAmount},
    rng::{DemoRng, DemoStream},
    store::{DuesStore, NewMember, NewPaymentRequest},
    types::Timestamp,
};
use chrono::Duration;

const FIRST_NAMES: &[&str] = &[
    "Amina", "Bilal", "Chloe", "Dawit", "Elif", "Farah", "Gabriel", "Hana", "Idris", "Jamila",
    "Kofi", "Layla", "Musa", "Nadia", "Omar", "Priya", "Rahim", "Sara", "Tariq", "Yusuf",
];

const LAST_NAMES: &[&str] = &[
    "Ahmed", "Begum", "Chowdhury", "Diallo", "Evans", "Farooq", "Green", "Hussain", "Islam",
    "Jones", "Khan", "Lewis", "Malik", "Noor", "Osman", "Patel", "Rahman", "Shah", "Uddin", "Ward",
];

const PAYMENT_TYPES: &[&str] = &["cash", "bank_transfer"];
const OVERRIDE_AMOUNTS: &[f64] = &[20.0, 30.0, 50.0, 60.0];
const EMERGENCY_AMOUNTS: &[f64] = &[10.0, 25.0, 50.0];

/// Counts of what was written.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DemoSummary {
    pub collectors:       usize,
    pub members:          usize,
    pub pending_requests: usize,
}

pub fn seed_demo_data(
    store: &DuesStore,
    config: &DemoDataConfig,
    seed: u64,
    now: Timestamp,
) -> DuesResult<DemoSummary> {
    let mut members_rng = DemoRng::new(seed, DemoStream::Members);
    let mut payments_rng = DemoRng::new(seed, DemoStream::Payments);
    let mut requests_rng = DemoRng::new(seed, DemoStream::Requests);
    let mut names_rng = DemoRng::new(seed, DemoStream::Names);
    let mut summary = DemoSummary::default();

    for (i, collector) in config.collectors.iter().enumerate() {
        let collector_id = format!("col-{:02}", i + 1);
        store.insert_collector(&collector_id, collector, &format_timestamp(now))?;
        summary.collectors += 1;

        let prefix: String = collector
            .chars()
            .filter(|c| c.is_alphanumeric())
            .take(2)
            .collect::<String>()
            .to_uppercase();
        let mut member_numbers = Vec::with_capacity(config.members_per_collector);

        for j in 0..config.members_per_collector {
            let member_number = format!("{prefix}{:02}{:03}", i + 1, j + 1);
            let record = demo_member(&mut members_rng, &mut payments_rng, config, now);
            let full_name = format!(
                "{} {}",
                names_rng.pick(FIRST_NAMES).copied().unwrap_or("Member"),
                names_rng.pick(LAST_NAMES).copied().unwrap_or("Unknown"),
            );
            store.insert_member(&NewMember::from_record(
                &member_number,
                &full_name,
                Some(collector),
                &record,
            ))?;
            member_numbers.push(member_number);
            summary.members += 1;
        }

        for k in 0..config.pending_requests_per_collector {
            let Some(member_number) = requests_rng.pick(&member_numbers) else {
                break;
            };
            let value = *requests_rng.pick(OVERRIDE_AMOUNTS).unwrap_or(&40.0);
            // Alternate numeric and text amounts: both shapes occur in real data.
            let amount = if k % 2 == 0 {
                RawAmount::Number(value)
            } else {
                RawAmount::Text(format!("{value:.2}"))
            };
            store.insert_payment_request(&NewPaymentRequest {
                id: requests_rng.next_uuid().to_string(),
                member_number: member_number.clone(),
                collector_id: collector_id.clone(),
                amount,
                payment_type: requests_rng.pick(PAYMENT_TYPES).map(|t| t.to_string()),
                status: "pending".into(),
                created_at: format_timestamp(now - Duration::days(requests_rng.range_i64(0, 14))),
            })?;
            summary.pending_requests += 1;
        }

        // One already-approved request per collector; never counted as pending.
        if let Some(member_number) = member_numbers.first() {
            store.insert_payment_request(&NewPaymentRequest {
                id: requests_rng.next_uuid().to_string(),
                member_number: member_number.clone(),
                collector_id: collector_id.clone(),
                amount: RawAmount::Number(40.0),
                payment_type: Some("cash".into()),
                status: "approved".into(),
                created_at: format_timestamp(now - Duration::days(45)),
            })?;
        }

        log::debug!(
            "Seeded collector '{collector}' with {} members",
            member_numbers.len()
        );
    }

    log::info!(
        "Demo data seeded (seed={seed}): {} collectors, {} members, {} pending requests",
        summary.collectors,
        summary.members,
        summary.pending_requests
    );
    Ok(summary)
}

fn demo_member(
    members_rng: &mut DemoRng,
    payments_rng: &mut DemoRng,
    config: &DemoDataConfig,
    now: Timestamp,
) -> MemberRecord {
    let mut record = MemberRecord::new(now - Duration::days(members_rng.range_i64(0, 3 * 365)));
    record.membership_status = Some(if members_rng.chance(0.9) {
        MembershipStatus::Active
    } else {
        MembershipStatus::Inactive
    });

    if payments_rng.chance(0.85) {
        record.yearly_payment_due_date = Some(now + Duration::days(payments_rng.range_i64(-90, 180)));
    }

    if payments_rng.chance(config.yearly_completion_rate) {
        record.yearly_payment_status = CollectionStatus::Completed;
        if payments_rng.chance(0.3) {
            record.yearly_payment_amount = payments_rng.pick(OVERRIDE_AMOUNTS).copied();
        }
        record.payment_date = Some(now - Duration::days(payments_rng.range_i64(0, 120)));
        record.payment_type = payments_rng.pick(PAYMENT_TYPES).map(|t| t.to_string());
    } else if payments_rng.chance(0.7) {
        record.yearly_payment_status = CollectionStatus::Pending;
    }

    if payments_rng.chance(config.emergency_completion_rate) {
        record.emergency_collection_status = CollectionStatus::Completed;
        if payments_rng.chance(0.8) {
            record.emergency_collection_amount = payments_rng.pick(EMERGENCY_AMOUNTS).copied();
        }
    } else if payments_rng.chance(0.4) {
        record.emergency_collection_status = CollectionStatus::Pending;
    }

    record
}
