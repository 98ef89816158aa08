pub mod agent;
pub mod appointments;
pub mod certificates;
pub mod chat;
pub mod contracts;
pub mod domestic_labor;
pub mod health;
pub mod proactive;
pub mod profile;
pub mod regulations;
pub mod resume;
pub mod tickets;

#[cfg(test)]
mod tests;

use axum::{
    extract::{DefaultBodyLimit, FromRequest, FromRequestParts},
    routing::{delete, get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::AppError;
use crate::state::AppState;
use crate::validation::parse_user_id;

/// Uploaded voice notes can exceed axum's 2 MB default.
const VOICE_BODY_LIMIT: usize = 25 * 1024 * 1024;

/// JSON body extractor whose rejection is an `AppError::Validation`,
/// so malformed bodies get the standard error envelope.
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct ApiJson<T>(pub T);

#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(AppError))]
pub struct ApiQuery<T>(pub T);

/// Success envelope: `{success: true, data}` or `{success: true, message}`.
#[derive(Debug, Serialize)]
pub struct Envelope<T: Serialize> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

pub type ApiResult<T> = Result<Json<Envelope<T>>, AppError>;

pub fn ok<T: Serialize>(data: T) -> ApiResult<T> {
    Ok(Json(Envelope {
        success: true,
        data: Some(data),
        message: None,
    }))
}

pub fn ok_message(message: impl Into<String>) -> ApiResult<()> {
    Ok(Json(Envelope {
        success: true,
        data: None,
        message: Some(message.into()),
    }))
}

#[derive(Debug, Deserialize)]
pub struct UserQuery {
    #[serde(default)]
    pub user_id: String,
}

impl UserQuery {
    pub fn user(&self) -> Result<Uuid, AppError> {
        parse_user_id(&self.user_id)
    }
}

/// A request body carrying the caller's `user_id` next to the operation's own fields.
#[derive(Debug, Deserialize)]
pub struct UserBody<T> {
    #[serde(default)]
    pub user_id: String,
    #[serde(flatten)]
    pub body: T,
}

impl<T> UserBody<T> {
    /// Validates the user id and hands back the typed body.
    pub fn into_parts(self) -> Result<(Uuid, T), AppError> {
        Ok((parse_user_id(&self.user_id)?, self.body))
    }
}

/// Body for routes that need nothing but the user id.
#[derive(Debug, Deserialize)]
pub struct Empty {}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        .route(
            "/api/profile",
            get(profile::handle_get_profile).post(profile::handle_upsert_profile),
        )
        .route(
            "/api/contracts",
            get(contracts::handle_list_contracts).post(contracts::handle_create_contract),
        )
        .route("/api/contracts/:id/end", post(contracts::handle_end_contract))
        .route(
            "/api/certificates",
            get(certificates::handle_list_certificates)
                .post(certificates::handle_generate_certificate),
        )
        .route(
            "/api/appointments",
            get(appointments::handle_list_appointments)
                .post(appointments::handle_book_appointment),
        )
        .route(
            "/api/appointments/:id/cancel",
            post(appointments::handle_cancel_appointment),
        )
        .route(
            "/api/appointments/:id/complete",
            post(appointments::handle_complete_appointment),
        )
        .route(
            "/api/resume",
            get(resume::handle_get_resume).put(resume::handle_update_resume),
        )
        .route(
            "/api/resume/courses",
            get(resume::handle_list_courses).post(resume::handle_add_course),
        )
        .route("/api/resume/courses/:id", delete(resume::handle_delete_course))
        .route("/api/regulations", get(regulations::handle_search_regulations))
        .route("/api/regulations/:id", get(regulations::handle_get_regulation))
        .route(
            "/api/tickets",
            get(tickets::handle_list_tickets).post(tickets::handle_open_ticket),
        )
        .route("/api/tickets/:id", get(tickets::handle_ticket_status))
        .route("/api/tickets/:id/close", post(tickets::handle_close_ticket))
        .route(
            "/api/domestic-labor",
            get(domestic_labor::handle_list_requests).post(domestic_labor::handle_create_request),
        )
        .route("/api/proactive", get(proactive::handle_pending_events))
        .route("/api/proactive/run", post(proactive::handle_run_triggers))
        .route("/api/proactive/:id/acted", post(proactive::handle_mark_acted))
        .route(
            "/api/agent/actions",
            get(agent::handle_list_actions).post(agent::handle_dispatch),
        )
        .route("/api/agent/logs", get(agent::handle_action_logs))
        .route("/api/chat", post(chat::handle_chat))
        .route(
            "/api/voice",
            post(chat::handle_voice).layer(DefaultBodyLimit::max(VOICE_BODY_LIMIT)),
        )
        .route("/api/tts", post(chat::handle_tts))
        .with_state(state)
}
