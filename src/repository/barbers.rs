//! Barbers and service catalog reads on Repository

use super::Repository;
use crate::{
    error::AppResult,
    models::{Barber, ServiceOffering},
};

impl Repository {
    /// Barbers currently on shift, by id
    pub async fn barbers_list_active(&self) -> AppResult<Vec<Barber>> {
        let rows = sqlx::query_as::<_, Barber>(
            "SELECT id, name, is_active FROM barbers WHERE is_active ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// Get a catalog service by ID
    pub async fn barbers_get_offering(&self, id: i32) -> AppResult<Option<ServiceOffering>> {
        let row = sqlx::query_as::<_, ServiceOffering>(
            "SELECT id, name, duration_minutes, is_active FROM services WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }
}
