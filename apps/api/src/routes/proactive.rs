use axum::extract::{Path, State};
use chrono::Utc;
use serde::Deserialize;

use crate::models::proactive::ProactiveEvent;
use crate::proactive::{self, TriggerReport};
use crate::routes::{ok, ApiJson, ApiQuery, ApiResult, UserBody, UserQuery};
use crate::state::AppState;
use crate::validation::{parse_uuid_field, require_text};

#[derive(Debug, Deserialize)]
pub struct ActedRequest {
    pub action_taken: Option<String>,
}

/// GET /api/proactive?user_id=
pub async fn handle_pending_events(
    State(state): State<AppState>,
    ApiQuery(params): ApiQuery<UserQuery>,
) -> ApiResult<Vec<ProactiveEvent>> {
    let user_id = params.user()?;
    ok(proactive::pending_events(state.store.as_ref(), user_id).await?)
}

/// POST /api/proactive/run
/// Runs every trigger check once with the configured thresholds.
pub async fn handle_run_triggers(State(state): State<AppState>) -> ApiResult<TriggerReport> {
    ok(proactive::run_all(state.store.as_ref(), &state.config.triggers, Utc::now()).await?)
}

/// POST /api/proactive/:id/acted
pub async fn handle_mark_acted(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ApiJson(req): ApiJson<UserBody<ActedRequest>>,
) -> ApiResult<ProactiveEvent> {
    let (user_id, body) = req.into_parts()?;
    let event_id = parse_uuid_field("event_id", &id)?;
    let action_taken = require_text("action_taken", body.action_taken.as_deref())?;
    ok(proactive::mark_acted(state.store.as_ref(), user_id, event_id, action_taken).await?)
}
