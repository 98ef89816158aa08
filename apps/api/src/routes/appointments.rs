use axum::extract::{Path, State};

use crate::models::appointment::LaborAppointment;
use crate::routes::{ok, ApiJson, ApiQuery, ApiResult, Empty, UserBody, UserQuery};
use crate::services::appointments::{self, NewAppointment};
use crate::state::AppState;
use crate::validation::parse_uuid_field;

/// GET /api/appointments?user_id=
pub async fn handle_list_appointments(
    State(state): State<AppState>,
    ApiQuery(params): ApiQuery<UserQuery>,
) -> ApiResult<Vec<LaborAppointment>> {
    let user_id = params.user()?;
    ok(appointments::list_appointments(state.store.as_ref(), user_id).await?)
}

/// POST /api/appointments
pub async fn handle_book_appointment(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<UserBody<NewAppointment>>,
) -> ApiResult<LaborAppointment> {
    let (user_id, input) = req.into_parts()?;
    ok(appointments::book_appointment(state.store.as_ref(), user_id, input).await?)
}

/// POST /api/appointments/:id/cancel
pub async fn handle_cancel_appointment(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ApiJson(req): ApiJson<UserBody<Empty>>,
) -> ApiResult<LaborAppointment> {
    let (user_id, _) = req.into_parts()?;
    let appointment_id = parse_uuid_field("appointment_id", &id)?;
    ok(appointments::cancel_appointment(state.store.as_ref(), user_id, appointment_id).await?)
}

/// POST /api/appointments/:id/complete
pub async fn handle_complete_appointment(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ApiJson(req): ApiJson<UserBody<Empty>>,
) -> ApiResult<LaborAppointment> {
    let (user_id, _) = req.into_parts()?;
    let appointment_id = parse_uuid_field("appointment_id", &id)?;
    ok(appointments::complete_appointment(state.store.as_ref(), user_id, appointment_id).await?)
}
