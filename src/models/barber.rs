//! Barbers and the service catalog, both maintained outside the scheduling core

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Barber {
    pub id: i32,
    pub name: String,
    pub is_active: bool,
}

/// Catalog entry (haircut, beard trim, ...)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct ServiceOffering {
    pub id: i32,
    pub name: String,
    pub duration_minutes: i32,
    pub is_active: bool,
}
