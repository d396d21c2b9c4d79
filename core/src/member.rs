//! Member and payment-request records as the aggregation engine sees them.
//!
//! Raw column values (nullable strings and numbers) are decoded here.
//! Anything that does not fit the type contract becomes an InputShapeError
//! at the fetch boundary; the engine only ever sees well-typed records.

use crate::{
    error::InputShapeError,
    types::{Amount, CollectorName, Timestamp},
};
use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

/// Status of a yearly payment or an emergency collection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CollectionStatus {
    Pending,
    Completed,
    #[default]
    Unset,
}

impl CollectionStatus {
    /// Decode a nullable status column.
    ///
    /// Only `pending` and `completed` land in a bucket. NULL, empty and any
    /// other value are Unset: the member still counts, just in neither bucket.
    pub fn from_column(value: Option<&str>, field: &'static str) -> Self {
        match value.map(str::trim) {
            None | Some("") => Self::Unset,
            Some("pending") => Self::Pending,
            Some("completed") => Self::Completed,
            Some(other) => {
                log::debug!("Unrecognised member.{field} '{other}'; treating as unset");
                Self::Unset
            }
        }
    }

    pub fn is_completed(self) -> bool {
        self == Self::Completed
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MembershipStatus {
    Active,
    Inactive,
}

impl MembershipStatus {
    /// Decode the nullable `status` column. NULL or an unrecognised value
    /// means the member is in neither bucket.
    pub fn from_column(value: Option<&str>) -> Option<Self> {
        match value.map(str::trim) {
            None | Some("") => None,
            Some("active") => Some(Self::Active),
            Some("inactive") => Some(Self::Inactive),
            Some(other) => {
                log::debug!("Unrecognised member.status '{other}'; counted in no bucket");
                None
            }
        }
    }
}

/// One person tracked by a collector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemberRecord {
    pub yearly_payment_status:       CollectionStatus,
    pub emergency_collection_status: CollectionStatus,
    pub yearly_payment_amount:       Option<Amount>,
    pub emergency_collection_amount: Option<Amount>,
    pub yearly_payment_due_date:     Option<Timestamp>,
    pub payment_date:                Option<Timestamp>,
    pub payment_type:                Option<String>,
    pub membership_status:           Option<MembershipStatus>,
    /// Unknown join date. Such a member is never counted as new.
    pub created_at:                  Option<Timestamp>,
}

impl MemberRecord {
    /// An active member with no payment activity and no amounts.
    pub fn new(created_at: Timestamp) -> Self {
        Self {
            yearly_payment_status:       CollectionStatus::Unset,
            emergency_collection_status: CollectionStatus::Unset,
            yearly_payment_amount:       None,
            emergency_collection_amount: None,
            yearly_payment_due_date:     None,
            payment_date:                None,
            payment_type:                None,
            membership_status:           Some(MembershipStatus::Active),
            created_at:                  Some(created_at),
        }
    }

    /// What this member contributes to the yearly collected total.
    pub fn effective_yearly_amount(&self, default_amount: Amount) -> Amount {
        if self.yearly_payment_status.is_completed() {
            self.yearly_payment_amount.unwrap_or(default_amount)
        } else {
            0.0
        }
    }

    pub fn effective_emergency_amount(&self) -> Amount {
        if self.emergency_collection_status.is_completed() {
            self.emergency_collection_amount.unwrap_or(0.0)
        } else {
            0.0
        }
    }
}

/// Column values exactly as the data source hands them over.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MemberRow {
    pub yearly_payment_status:       Option<String>,
    pub emergency_collection_status: Option<String>,
    pub yearly_payment_amount:       Option<RawAmount>,
    pub emergency_collection_amount: Option<RawAmount>,
    pub yearly_payment_due_date:     Option<String>,
    pub payment_date:                Option<String>,
    pub payment_type:                Option<String>,
    pub status:                      Option<String>,
    pub created_at:                  Option<String>,
}

impl TryFrom<MemberRow> for MemberRecord {
    type Error = InputShapeError;

    fn try_from(row: MemberRow) -> Result<Self, Self::Error> {
        Ok(Self {
            yearly_payment_status: CollectionStatus::from_column(
                row.yearly_payment_status.as_deref(),
                "yearly_payment_status",
            ),
            emergency_collection_status: CollectionStatus::from_column(
                row.emergency_collection_status.as_deref(),
                "emergency_collection_status",
            ),
            yearly_payment_amount: decode_amount(
                row.yearly_payment_amount,
                "member",
                "yearly_payment_amount",
            )?,
            emergency_collection_amount: decode_amount(
                row.emergency_collection_amount,
                "member",
                "emergency_collection_amount",
            )?,
            yearly_payment_due_date: decode_date(
                row.yearly_payment_due_date.as_deref(),
                "yearly_payment_due_date",
            )?,
            payment_date: decode_date(row.payment_date.as_deref(), "payment_date")?,
            payment_type: row.payment_type.filter(|t| !t.trim().is_empty()),
            membership_status: MembershipStatus::from_column(row.status.as_deref()),
            created_at: decode_date(row.created_at.as_deref(), "created_at")?,
        })
    }
}

impl From<&MemberRecord> for MemberRow {
    fn from(record: &MemberRecord) -> Self {
        let status_column = |status: CollectionStatus| match status {
            CollectionStatus::Pending => Some("pending".to_string()),
            CollectionStatus::Completed => Some("completed".to_string()),
            CollectionStatus::Unset => None,
        };
        Self {
            yearly_payment_status: status_column(record.yearly_payment_status),
            emergency_collection_status: status_column(record.emergency_collection_status),
            yearly_payment_amount: record.yearly_payment_amount.map(RawAmount::Number),
            emergency_collection_amount: record.emergency_collection_amount.map(RawAmount::Number),
            yearly_payment_due_date: record.yearly_payment_due_date.map(format_timestamp),
            payment_date: record.payment_date.map(format_timestamp),
            payment_type: record.payment_type.clone(),
            status: record.membership_status.map(|s| match s {
                MembershipStatus::Active => "active".to_string(),
                MembershipStatus::Inactive => "inactive".to_string(),
            }),
            created_at: record.created_at.map(format_timestamp),
        }
    }
}

/// A payment request still awaiting approval, already scoped to one collector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PendingPaymentRequest {
    pub amount:       Amount,
    pub collector_id: CollectorName,
}

/// A monetary column that may arrive as a number or as numeric text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawAmount {
    Number(f64),
    Text(String),
}

impl RawAmount {
    /// Coerce to an amount. Blank text means "no amount".
    pub fn coerce(
        &self,
        record: &'static str,
        field: &'static str,
    ) -> Result<Option<Amount>, InputShapeError> {
        let value = match self {
            Self::Number(n) => *n,
            Self::Text(s) if s.trim().is_empty() => return Ok(None),
            Self::Text(s) => s
                .trim()
                .parse::<f64>()
                .map_err(|_| InputShapeError::new(record, field, s.clone()))?,
        };
        if value.is_finite() {
            Ok(Some(value))
        } else {
            Err(InputShapeError::new(record, field, value.to_string()))
        }
    }
}

pub(crate) fn decode_amount(
    raw: Option<RawAmount>,
    record: &'static str,
    field: &'static str,
) -> Result<Option<Amount>, InputShapeError> {
    match raw {
        Some(raw) => raw.coerce(record, field),
        None => Ok(None),
    }
}

fn decode_date(raw: Option<&str>, field: &'static str) -> Result<Option<Timestamp>, InputShapeError> {
    match raw.map(str::trim) {
        None | Some("") => Ok(None),
        Some(s) => parse_timestamp(s)
            .map(Some)
            .ok_or_else(|| InputShapeError::new("member", field, s)),
    }
}

/// RFC 3339 in UTC, the form dates are written back in.
pub fn format_timestamp(ts: Timestamp) -> String {
    ts.to_rfc3339_opts(SecondsFormat::AutoSi, true)
}

/// Parse the ISO-8601 shapes the data source produces.
///
/// Timezone-less values are taken as UTC; a bare date is midnight UTC.
pub fn parse_timestamp(s: &str) -> Option<Timestamp> {
    let s = s.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    for fmt in ["%Y-%m-%d %H:%M:%S%.f%#z", "%Y-%m-%dT%H:%M:%S%.f%#z"] {
        if let Ok(dt) = DateTime::parse_from_str(s, fmt) {
            return Some(dt.with_timezone(&Utc));
        }
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}
