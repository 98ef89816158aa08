use axum::extract::State;

use crate::models::domestic_labor::DomesticLaborRequest;
use crate::routes::{ok, ApiJson, ApiQuery, ApiResult, UserBody, UserQuery};
use crate::services::domestic_labor::{self, NewDomesticRequest};
use crate::state::AppState;

/// GET /api/domestic-labor?user_id=
pub async fn handle_list_requests(
    State(state): State<AppState>,
    ApiQuery(params): ApiQuery<UserQuery>,
) -> ApiResult<Vec<DomesticLaborRequest>> {
    let user_id = params.user()?;
    ok(domestic_labor::list_requests(state.store.as_ref(), user_id).await?)
}

/// POST /api/domestic-labor
pub async fn handle_create_request(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<UserBody<NewDomesticRequest>>,
) -> ApiResult<DomesticLaborRequest> {
    let (user_id, input) = req.into_parts()?;
    ok(domestic_labor::create_request(state.store.as_ref(), user_id, input).await?)
}
