use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct UserProfile {
    pub user_id: Uuid,
    pub full_name: String,
    pub phone: Option<String>,
    pub national_id: Option<String>,
    pub created_at: DateTime<Utc>,
}
