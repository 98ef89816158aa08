use axum::extract::State;
use serde::Deserialize;
use serde_json::Value;

use crate::agent::{dispatch, supported_actions, ActionSpec};
use crate::models::audit::AgentActionLog;
use crate::routes::{ok, ApiJson, ApiQuery, ApiResult};
use crate::state::AppState;
use crate::validation::{parse_user_id, require_text};

const DEFAULT_LOG_LIMIT: i64 = 20;
const MAX_LOG_LIMIT: i64 = 100;

#[derive(Debug, Deserialize)]
pub struct DispatchRequest {
    pub action: Option<String>,
    #[serde(default)]
    pub payload: Value,
}

#[derive(Debug, Deserialize)]
pub struct LogQuery {
    #[serde(default)]
    pub user_id: String,
    pub limit: Option<i64>,
}

/// GET /api/agent/actions
pub async fn handle_list_actions() -> ApiResult<Vec<ActionSpec>> {
    ok(supported_actions())
}

/// POST /api/agent/actions
/// Body: `{action, payload}`. The payload carries its own `user_id`, which
/// the dispatcher validates; every call leaves an audit row.
pub async fn handle_dispatch(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<DispatchRequest>,
) -> ApiResult<Value> {
    let action = require_text("action", req.action.as_deref())?;
    ok(dispatch(state.store.as_ref(), action, req.payload).await?)
}

/// GET /api/agent/logs?user_id=&limit=
pub async fn handle_action_logs(
    State(state): State<AppState>,
    ApiQuery(params): ApiQuery<LogQuery>,
) -> ApiResult<Vec<AgentActionLog>> {
    let user_id = parse_user_id(&params.user_id)?;
    let limit = params
        .limit
        .unwrap_or(DEFAULT_LOG_LIMIT)
        .clamp(1, MAX_LOG_LIMIT);
    ok(state.store.recent_action_logs(user_id, limit).await?)
}
