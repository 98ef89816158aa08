use axum::extract::{Path, State};
use serde::Deserialize;

use crate::models::regulation::Regulation;
use crate::routes::{ok, ApiQuery, ApiResult};
use crate::services::regulations;
use crate::state::AppState;
use crate::validation::parse_uuid_field;

#[derive(Debug, Deserialize)]
pub struct RegulationParams {
    pub q: Option<String>,
    pub category: Option<String>,
}

/// GET /api/regulations?q=&category=
/// Public catalogue; no user id.
pub async fn handle_search_regulations(
    State(state): State<AppState>,
    ApiQuery(params): ApiQuery<RegulationParams>,
) -> ApiResult<Vec<Regulation>> {
    ok(regulations::search_regulations(
        state.store.as_ref(),
        params.q.as_deref(),
        params.category.as_deref(),
    )
    .await?)
}

/// GET /api/regulations/:id
pub async fn handle_get_regulation(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Regulation> {
    let id = parse_uuid_field("id", &id)?;
    ok(regulations::get_regulation(state.store.as_ref(), id).await?)
}
