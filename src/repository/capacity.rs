//! Capacity ledger reads on Repository

use chrono::NaiveDate;

use super::{LedgerRows, Repository};
use crate::{
    error::AppResult,
    models::{CapacityOverride, SlotCount},
};

impl Repository {
    /// Confirmed counts and active overrides for a date range, from one snapshot
    pub async fn capacity_ledger_rows(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> AppResult<LedgerRows> {
        let mut tx = self.pool.begin().await?;
        sqlx::query("SET TRANSACTION ISOLATION LEVEL REPEATABLE READ READ ONLY")
            .execute(&mut *tx)
            .await?;

        let counts = sqlx::query_as::<_, SlotCount>(
            r#"
            SELECT appointment_date, appointment_time, COUNT(*) AS booked
            FROM bookings
            WHERE status = 'confirmed' AND appointment_date BETWEEN $1 AND $2
            GROUP BY appointment_date, appointment_time
            "#,
        )
        .bind(start)
        .bind(end)
        .fetch_all(&mut *tx)
        .await?;

        let overrides = sqlx::query_as::<_, CapacityOverride>(
            r#"
            SELECT id, override_date, override_time, capacity, is_active, reason
            FROM capacity_overrides
            WHERE is_active AND override_date BETWEEN $1 AND $2
            "#,
        )
        .bind(start)
        .bind(end)
        .fetch_all(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(LedgerRows { counts, overrides })
    }
}
