use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Deserialize, Serialize, sqlx::FromRow, Clone)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

/// Public identity in the marketplace. Tasks, offers, messages and blocks
/// all reference profiles, not users.
#[derive(Debug, Deserialize, Serialize, sqlx::FromRow, Clone)]
pub struct Profile {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub age_above_18: bool,
    pub agreed_with_conditions: bool,
    pub city: Option<String>,
    pub speaking_languages: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fcm_token: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Serialize, sqlx::FromRow, Clone)]
pub struct Block {
    pub id: Uuid,
    pub blocking_profile_id: Uuid,
    pub blocked_profile_id: Uuid,
    pub created_at: DateTime<Utc>,
}
