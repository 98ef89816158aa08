use axum::extract::{Path, State};

use crate::models::contract::EmploymentContract;
use crate::routes::{ok, ApiJson, ApiQuery, ApiResult, Empty, UserBody, UserQuery};
use crate::services::contracts::{self, NewContract};
use crate::state::AppState;
use crate::validation::parse_uuid_field;

/// GET /api/contracts?user_id=
pub async fn handle_list_contracts(
    State(state): State<AppState>,
    ApiQuery(params): ApiQuery<UserQuery>,
) -> ApiResult<Vec<EmploymentContract>> {
    let user_id = params.user()?;
    ok(contracts::list_contracts(state.store.as_ref(), user_id).await?)
}

/// POST /api/contracts
pub async fn handle_create_contract(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<UserBody<NewContract>>,
) -> ApiResult<EmploymentContract> {
    let (user_id, input) = req.into_parts()?;
    ok(contracts::create_contract(state.store.as_ref(), user_id, input).await?)
}

/// POST /api/contracts/:id/end
pub async fn handle_end_contract(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ApiJson(req): ApiJson<UserBody<Empty>>,
) -> ApiResult<EmploymentContract> {
    let (user_id, _) = req.into_parts()?;
    let contract_id = parse_uuid_field("contract_id", &id)?;
    ok(contracts::end_contract(state.store.as_ref(), user_id, contract_id).await?)
}
