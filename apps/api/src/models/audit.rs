use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;
use uuid::Uuid;

/// Append-only record of one dispatched agent action.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct AgentActionLog {
    pub id: Uuid,
    /// `None` when the payload carried no valid user id.
    pub user_id: Option<Uuid>,
    pub action_type: String,
    pub input_json: Value,
    pub output_json: Value,
    pub success: bool,
    pub created_at: DateTime<Utc>,
}
