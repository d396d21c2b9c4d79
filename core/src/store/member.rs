use super::{amount_value, raw_amount, DuesStore};
use crate::{
    error::{DuesError, DuesResult},
    member::{MemberRecord, MemberRow},
};
use rusqlite::params;

/// A member as written to the store: identity columns plus raw record columns.
#[derive(Debug, Clone)]
pub struct NewMember {
    pub id:            String,
    pub member_number: String,
    pub full_name:     String,
    pub collector:     Option<String>,
    pub row:           MemberRow,
}

impl NewMember {
    pub fn from_record(
        member_number: &str,
        full_name: &str,
        collector: Option<&str>,
        record: &MemberRecord,
    ) -> Self {
        Self {
            id:            format!("mem-{member_number}"),
            member_number: member_number.to_string(),
            full_name:     full_name.to_string(),
            collector:     collector.map(str::to_string),
            row:           MemberRow::from(record),
        }
    }
}

impl DuesStore {
    // ── Member ───────────────────────────────────────────────────

    pub fn insert_member(&self, m: &NewMember) -> DuesResult<()> {
        let r = &m.row;
        self.conn.execute(
            "INSERT INTO members (
                id, member_number, full_name, collector,
                yearly_payment_status, emergency_collection_status,
                yearly_payment_amount, emergency_collection_amount,
                yearly_payment_due_date, payment_date, payment_type, status, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)",
            params![
                &m.id,
                &m.member_number,
                &m.full_name,
                &m.collector,
                &r.yearly_payment_status,
                &r.emergency_collection_status,
                amount_value(r.yearly_payment_amount.as_ref()),
                amount_value(r.emergency_collection_amount.as_ref()),
                &r.yearly_payment_due_date,
                &r.payment_date,
                &r.payment_type,
                &r.status,
                &r.created_at,
            ],
        )?;
        Ok(())
    }

    /// Raw rows for a collector, before type-contract decoding.
    pub fn member_rows_for_collector(&self, collector: &str) -> DuesResult<Vec<MemberRow>> {
        let mut stmt = self.conn.prepare(
            "SELECT yearly_payment_status, emergency_collection_status,
                    yearly_payment_amount, emergency_collection_amount,
                    yearly_payment_due_date, payment_date, payment_type, status, created_at
             FROM members WHERE collector = ?1
             ORDER BY member_number ASC",
        )?;
        let rows = stmt
            .query_map(params![collector], |row| {
                Ok(MemberRow {
                    yearly_payment_status:       row.get(0)?,
                    emergency_collection_status: row.get(1)?,
                    yearly_payment_amount:       raw_amount(row.get(2)?),
                    emergency_collection_amount: raw_amount(row.get(3)?),
                    yearly_payment_due_date:     row.get(4)?,
                    payment_date:                row.get(5)?,
                    payment_type:                row.get(6)?,
                    status:                      row.get(7)?,
                    created_at:                  row.get(8)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    /// Decoded member records for a collector. Any malformed row fails the call.
    pub fn members_for_collector(&self, collector: &str) -> DuesResult<Vec<MemberRecord>> {
        self.member_rows_for_collector(collector)?
            .into_iter()
            .map(|row| MemberRecord::try_from(row).map_err(DuesError::from))
            .collect()
    }

    pub fn member_count(&self, collector: &str) -> DuesResult<i64> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM members WHERE collector = ?1",
            params![collector],
            |row| row.get(0),
        )?;
        Ok(count)
    }
}
