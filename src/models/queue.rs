//! Walk-in queue models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use super::{NAME_REGEX, PHONE_REGEX};

/// Walk-in queue entry status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum QueueStatus {
    Waiting,
    InService,
    Completed,
    NoShow,
    /// Customer left before being served
    Cancelled,
}

impl QueueStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            QueueStatus::Waiting => "waiting",
            QueueStatus::InService => "in_service",
            QueueStatus::Completed => "completed",
            QueueStatus::NoShow => "no_show",
            QueueStatus::Cancelled => "cancelled",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            QueueStatus::Completed | QueueStatus::NoShow | QueueStatus::Cancelled
        )
    }

    pub fn can_transition_to(&self, next: QueueStatus) -> bool {
        match self {
            QueueStatus::Waiting => next != QueueStatus::Waiting,
            QueueStatus::InService => {
                matches!(next, QueueStatus::Completed | QueueStatus::NoShow)
            }
            _ => false,
        }
    }
}

impl std::fmt::Display for QueueStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for QueueStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "waiting" => Ok(QueueStatus::Waiting),
            "in_service" => Ok(QueueStatus::InService),
            "completed" => Ok(QueueStatus::Completed),
            "no_show" => Ok(QueueStatus::NoShow),
            "cancelled" => Ok(QueueStatus::Cancelled),
            _ => Err(format!("Invalid queue status: {}", s)),
        }
    }
}

super::text_column!(QueueStatus);

/// Walk-in queue row
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct QueueEntry {
    pub id: Uuid,
    /// Monotonic join order, assigned by the store at insert
    pub join_seq: i64,
    pub customer_name: String,
    pub customer_phone: String,
    /// Preferred barber, `None` for the first free one
    pub barber_id: Option<i32>,
    pub status: QueueStatus,
    /// 1-based rank among waiting entries
    pub position: Option<i32>,
    pub estimated_wait_minutes: Option<i32>,
    /// Join time
    pub crea_date: DateTime<Utc>,
    /// When service started
    pub served_date: Option<DateTime<Utc>>,
    pub modif_date: Option<DateTime<Utc>>,
}

/// Entry to append to the queue
#[derive(Debug, Clone, PartialEq)]
pub struct NewQueueEntry {
    pub customer_name: String,
    pub customer_phone: String,
    pub barber_id: Option<i32>,
    pub crea_date: DateTime<Utc>,
}

impl NewQueueEntry {
    pub fn into_entry(self, id: Uuid, join_seq: i64, position: i32) -> QueueEntry {
        QueueEntry {
            id,
            join_seq,
            customer_name: self.customer_name,
            customer_phone: self.customer_phone,
            barber_id: self.barber_id,
            status: QueueStatus::Waiting,
            position: Some(position),
            estimated_wait_minutes: None,
            crea_date: self.crea_date,
            served_date: None,
            modif_date: None,
        }
    }
}

/// Position and wait computed for one waiting entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
pub struct QueueEstimate {
    pub id: Uuid,
    pub position: i32,
    pub estimated_wait_minutes: i32,
}

/// Join queue request
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct JoinQueue {
    #[validate(
        length(min = 1, max = 100, message = "Customer name must be 1-100 characters"),
        regex(path = *NAME_REGEX, message = "Customer name must not be blank")
    )]
    pub customer_name: String,
    #[validate(regex(path = *PHONE_REGEX, message = "Invalid phone number"))]
    pub customer_phone: String,
    /// Preferred barber; omit for the first free one
    pub barber_id: Option<i32>,
}

/// Queue status change
#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateQueueStatus {
    pub status: QueueStatus,
}

/// Current wait-time summary
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct WaitTimeSummary {
    /// Wait the next walk-in customer would face
    pub current_wait_minutes: i64,
    /// Number of waiting entries
    pub queue_length: usize,
    pub active_barber_count: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_queue_transitions() {
        assert!(QueueStatus::Waiting.can_transition_to(QueueStatus::InService));
        assert!(QueueStatus::Waiting.can_transition_to(QueueStatus::Cancelled));
        assert!(QueueStatus::InService.can_transition_to(QueueStatus::Completed));
        assert!(!QueueStatus::InService.can_transition_to(QueueStatus::Waiting));
        assert!(!QueueStatus::InService.can_transition_to(QueueStatus::Cancelled));
        assert!(!QueueStatus::Completed.can_transition_to(QueueStatus::Waiting));
        assert!(QueueStatus::NoShow.is_terminal());
        assert!(!QueueStatus::InService.is_terminal());
    }

    #[test]
    fn test_join_rejects_blank_name() {
        let mut request = JoinQueue {
            customer_name: " \t ".to_string(),
            customer_phone: "0612345678".to_string(),
            barber_id: None,
        };
        assert!(request.validate().is_err());

        request.customer_name = "Kai".to_string();
        assert!(request.validate().is_ok());
    }
}
