use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Deserialize, Serialize, Clone, Copy, sqlx::Type, PartialEq)]
#[sqlx(type_name = "event_type", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum EventType {
    Online,
    Offline,
}

impl EventType {
    pub fn to_str(&self) -> &str {
        match self {
            EventType::Online => "online",
            EventType::Offline => "offline",
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, Copy, sqlx::Type, PartialEq)]
#[sqlx(type_name = "offer_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum OfferStatus {
    Pending,
    Accepted,
}

impl OfferStatus {
    pub fn to_str(&self) -> &str {
        match self {
            OfferStatus::Pending => "pending",
            OfferStatus::Accepted => "accepted",
        }
    }
}

// Completed and Canceled are reserved: the HTTP surface never transitions
// an assignment past Pending.
#[derive(Debug, Deserialize, Serialize, Clone, Copy, sqlx::Type, PartialEq)]
#[sqlx(type_name = "assignment_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum AssignmentStatus {
    Pending,
    Accepted,
    Completed,
    Canceled,
}

impl AssignmentStatus {
    pub fn to_str(&self) -> &str {
        match self {
            AssignmentStatus::Pending => "pending",
            AssignmentStatus::Accepted => "accepted",
            AssignmentStatus::Completed => "completed",
            AssignmentStatus::Canceled => "canceled",
        }
    }
}

#[derive(Debug, Deserialize, Serialize, sqlx::FromRow, Clone)]
pub struct Service {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
}

/// A request for help posted by a profile. Immutable after creation and
/// never deleted by the workflow; `owner_id` is cleared when the owning
/// profile is deleted so the task survives.
#[derive(Debug, Deserialize, Serialize, sqlx::FromRow, Clone)]
pub struct Task {
    pub id: Uuid,
    pub owner_id: Option<Uuid>,
    pub service_id: Uuid,
    pub datetime_known: bool,
    pub datetime_options: Vec<DateTime<Utc>>,
    pub event_type: EventType,
    pub address: Option<String>,
    pub price_offer: i32,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Serialize, sqlx::FromRow, Clone)]
pub struct Offer {
    pub id: Uuid,
    pub task_id: Uuid,
    pub helper_id: Uuid,
    pub status: OfferStatus,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Serialize, sqlx::FromRow, Clone)]
pub struct Assignment {
    pub id: Uuid,
    pub offer_id: Uuid,
    pub status: AssignmentStatus,
    pub created_at: DateTime<Utc>,
}
