use super::{amount_value, raw_amount, DuesStore};
use crate::{
    error::{DuesResult, InputShapeError},
    member::{decode_amount, PendingPaymentRequest, RawAmount},
};
use rusqlite::params;

#[derive(Debug, Clone)]
pub struct NewPaymentRequest {
    pub id:            String,
    pub member_number: String,
    pub collector_id:  String,
    pub amount:        RawAmount,
    pub payment_type:  Option<String>,
    pub status:        String,
    pub created_at:    String,
}

impl DuesStore {
    // ── Payment request ──────────────────────────────────────────

    pub fn insert_payment_request(&self, p: &NewPaymentRequest) -> DuesResult<()> {
        self.conn.execute(
            "INSERT INTO payment_requests (
                id, member_number, collector_id, amount, payment_type, status, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                &p.id,
                &p.member_number,
                &p.collector_id,
                amount_value(Some(&p.amount)),
                &p.payment_type,
                &p.status,
                &p.created_at,
            ],
        )?;
        Ok(())
    }

    /// Pending requests whose collector has the given name.
    pub fn pending_requests_for_collector(
        &self,
        collector: &str,
    ) -> DuesResult<Vec<PendingPaymentRequest>> {
        let mut stmt = self.conn.prepare(
            "SELECT pr.amount, pr.collector_id
             FROM payment_requests pr
             JOIN members_collectors mc ON mc.id = pr.collector_id
             WHERE pr.status = 'pending' AND mc.name = ?1
             ORDER BY pr.created_at ASC, pr.id ASC",
        )?;
        let raw = stmt
            .query_map(params![collector], |row| {
                Ok((raw_amount(row.get(0)?), row.get::<_, String>(1)?))
            })?
            .collect::<Result<Vec<_>, _>>()?;

        raw.into_iter()
            .map(|(amount, collector_id)| -> DuesResult<PendingPaymentRequest> {
                let amount = decode_amount(amount, "payment_request", "amount")?
                    .ok_or_else(|| InputShapeError::new("payment_request", "amount", "NULL"))?;
                Ok(PendingPaymentRequest {
                    amount,
                    collector_id,
                })
            })
            .collect()
    }

    pub fn payment_request_count(&self, status: &str) -> DuesResult<i64> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM payment_requests WHERE status = ?1",
            params![status],
            |row| row.get(0),
        )?;
        Ok(count)
    }
}
