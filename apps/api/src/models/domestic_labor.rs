use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(type_name = "text", rename_all = "snake_case")]
pub enum DomesticRequestType {
    Recruitment,
    Transfer,
    Exit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(type_name = "text", rename_all = "snake_case")]
pub enum DomesticRequestStatus {
    Pending,
    Approved,
    Rejected,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct DomesticLaborRequest {
    pub id: Uuid,
    pub user_id: Uuid,
    pub request_type: DomesticRequestType,
    pub worker_nationality: String,
    pub worker_profession: String,
    pub notes: Option<String>,
    pub status: DomesticRequestStatus,
    pub created_at: DateTime<Utc>,
}
