use axum::extract::{Path, State};

use crate::models::ticket::Ticket;
use crate::routes::{ok, ApiJson, ApiQuery, ApiResult, Empty, UserBody, UserQuery};
use crate::services::tickets::{self, NewTicket, TicketStatusView};
use crate::state::AppState;
use crate::validation::parse_uuid_field;

/// GET /api/tickets?user_id=
pub async fn handle_list_tickets(
    State(state): State<AppState>,
    ApiQuery(params): ApiQuery<UserQuery>,
) -> ApiResult<Vec<Ticket>> {
    let user_id = params.user()?;
    ok(tickets::list_tickets(state.store.as_ref(), user_id).await?)
}

/// POST /api/tickets
pub async fn handle_open_ticket(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<UserBody<NewTicket>>,
) -> ApiResult<Ticket> {
    let (user_id, input) = req.into_parts()?;
    ok(tickets::open_ticket(state.store.as_ref(), user_id, input).await?)
}

/// GET /api/tickets/:id?user_id=
pub async fn handle_ticket_status(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ApiQuery(params): ApiQuery<UserQuery>,
) -> ApiResult<TicketStatusView> {
    let user_id = params.user()?;
    let ticket_id = parse_uuid_field("ticket_id", &id)?;
    ok(tickets::ticket_status(state.store.as_ref(), user_id, ticket_id).await?)
}

/// POST /api/tickets/:id/close
pub async fn handle_close_ticket(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ApiJson(req): ApiJson<UserBody<Empty>>,
) -> ApiResult<Ticket> {
    let (user_id, _) = req.into_parts()?;
    let ticket_id = parse_uuid_field("ticket_id", &id)?;
    ok(tickets::close_ticket(state.store.as_ref(), user_id, ticket_id).await?)
}
