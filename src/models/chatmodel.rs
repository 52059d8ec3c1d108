use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One chat per offer, created when the offer is accepted.
#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, Clone)]
pub struct Chat {
    pub id: Uuid,
    pub offer_id: Uuid,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, Clone)]
pub struct Message {
    pub id: Uuid,
    pub chat_id: Uuid,
    pub sender_id: Uuid,
    pub recipient_id: Uuid,
    pub sent_at: DateTime<Utc>,
    pub read_at: Option<DateTime<Utc>>,
    pub text: String,
    pub created_at: DateTime<Utc>,
}
