use axum::extract::State;

use crate::models::certificate::Certificate;
use crate::routes::{ok, ApiJson, ApiQuery, ApiResult, UserBody, UserQuery};
use crate::services::certificates::{self, CertificateRequest};
use crate::state::AppState;

/// GET /api/certificates?user_id=
pub async fn handle_list_certificates(
    State(state): State<AppState>,
    ApiQuery(params): ApiQuery<UserQuery>,
) -> ApiResult<Vec<Certificate>> {
    let user_id = params.user()?;
    ok(certificates::list_certificates(state.store.as_ref(), user_id).await?)
}

/// POST /api/certificates
/// Issues a certificate of the requested type from the profile and active contract.
pub async fn handle_generate_certificate(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<UserBody<CertificateRequest>>,
) -> ApiResult<Certificate> {
    let (user_id, input) = req.into_parts()?;
    ok(certificates::generate_certificate(state.store.as_ref(), user_id, input).await?)
}
