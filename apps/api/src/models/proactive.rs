use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(type_name = "text", rename_all = "snake_case")]
pub enum EventType {
    StaleTicket,
    UpcomingAppointment,
    ContractExpiring,
}

impl EventType {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventType::StaleTicket => "stale_ticket",
            EventType::UpcomingAppointment => "upcoming_appointment",
            EventType::ContractExpiring => "contract_expiring",
        }
    }
}

/// A detected condition surfaced to the user until acted upon.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct ProactiveEvent {
    pub id: Uuid,
    pub user_id: Uuid,
    pub event_type: EventType,
    pub suggested_action: String,
    pub details: Value,
    pub detected_at: DateTime<Utc>,
    pub acted: bool,
    pub action_taken: Option<String>,
}
