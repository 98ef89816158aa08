use axum::extract::State;

use crate::models::profile::UserProfile;
use crate::routes::{ok, ApiJson, ApiQuery, ApiResult, UserBody, UserQuery};
use crate::services::profiles::{self, ProfileInput};
use crate::state::AppState;

/// GET /api/profile?user_id=
/// `data` is null until the user saves a profile.
pub async fn handle_get_profile(
    State(state): State<AppState>,
    ApiQuery(params): ApiQuery<UserQuery>,
) -> ApiResult<Option<UserProfile>> {
    let user_id = params.user()?;
    ok(profiles::get_profile(state.store.as_ref(), user_id).await?)
}

/// POST /api/profile
pub async fn handle_upsert_profile(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<UserBody<ProfileInput>>,
) -> ApiResult<UserProfile> {
    let (user_id, input) = req.into_parts()?;
    ok(profiles::upsert_profile(state.store.as_ref(), user_id, input).await?)
}
