use chrono::Utc;
use serde::Serialize;
use serde_json::{json, Value};
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::agent::actions::{user_id_of, ActionKind, AgentAction};
use crate::errors::AppError;
use crate::models::audit::AgentActionLog;
use crate::services::{
    appointments, certificates, contracts, domestic_labor, profiles, regulations, resumes, tickets,
};
use crate::store::Store;

/// Resolves `name`, validates `payload`, runs the action and writes one
/// audit row whatever the outcome. The audit row is written before an
/// error is returned.
pub async fn dispatch(store: &dyn Store, name: &str, payload: Value) -> Result<Value, AppError> {
    let result = resolve_and_execute(store, name, &payload).await;

    let (output_json, success) = match &result {
        Ok(data) => (data.clone(), true),
        Err(e) => (json!({ "error": e.to_string() }), false),
    };
    let log = AgentActionLog {
        id: Uuid::new_v4(),
        user_id: user_id_of(&payload).ok(),
        action_type: name.to_string(),
        input_json: payload,
        output_json,
        success,
        created_at: Utc::now(),
    };
    // The action has already taken effect; an audit failure is reported
    // but does not turn a completed action into an error.
    if let Err(e) = store.insert_action_log(&log).await {
        error!("Failed to write audit row for action '{name}': {e}");
    }

    match &result {
        Ok(_) => info!("Agent action '{name}' succeeded"),
        Err(e) => warn!("Agent action '{name}' failed: {e}"),
    }
    result
}

async fn resolve_and_execute(
    store: &dyn Store,
    name: &str,
    payload: &Value,
) -> Result<Value, AppError> {
    let kind = ActionKind::parse(name).ok_or_else(|| AppError::UnknownAction(name.to_string()))?;
    let action = AgentAction::from_payload(kind, payload)?;
    execute(store, action).await
}

pub async fn execute(store: &dyn Store, action: AgentAction) -> Result<Value, AppError> {
    match action {
        AgentAction::GetProfile { user_id } => to_json(profiles::get_profile(store, user_id).await?),
        AgentAction::GetContracts { user_id } => {
            to_json(contracts::list_contracts(store, user_id).await?)
        }
        AgentAction::CreateContract { user_id, input } => {
            to_json(contracts::create_contract(store, user_id, input).await?)
        }
        AgentAction::EndContract { user_id, target } => {
            to_json(contracts::end_contract(store, user_id, target.contract_id).await?)
        }
        AgentAction::GenerateCertificate { user_id, input } => {
            to_json(certificates::generate_certificate(store, user_id, input).await?)
        }
        AgentAction::GetCertificates { user_id } => {
            to_json(certificates::list_certificates(store, user_id).await?)
        }
        AgentAction::BookAppointment { user_id, input } => {
            to_json(appointments::book_appointment(store, user_id, input).await?)
        }
        AgentAction::GetAppointments { user_id } => {
            to_json(appointments::list_appointments(store, user_id).await?)
        }
        AgentAction::CancelAppointment { user_id, target } => {
            to_json(appointments::cancel_appointment(store, user_id, target.appointment_id).await?)
        }
        AgentAction::CompleteAppointment { user_id, target } => to_json(
            appointments::complete_appointment(store, user_id, target.appointment_id).await?,
        ),
        AgentAction::GetResume { user_id } => {
            to_json(resumes::get_resume_with_courses(store, user_id).await?)
        }
        AgentAction::UpdateResume { user_id, input } => {
            to_json(resumes::update_resume(store, user_id, input).await?)
        }
        AgentAction::AddResumeCourse { user_id, input } => {
            to_json(resumes::add_course(store, user_id, input).await?)
        }
        AgentAction::SearchRegulations { input } => to_json(
            regulations::search_regulations(
                store,
                input.query.as_deref(),
                input.category.as_deref(),
            )
            .await?,
        ),
        AgentAction::CreateTicket { user_id, input } => {
            to_json(tickets::open_ticket(store, user_id, input).await?)
        }
        AgentAction::GetTicketStatus { user_id, target } => {
            to_json(tickets::ticket_status(store, user_id, target.ticket_id).await?)
        }
        AgentAction::CloseTicket { user_id, target } => {
            to_json(tickets::close_ticket(store, user_id, target.ticket_id).await?)
        }
        AgentAction::CreateDomesticLaborRequest { user_id, input } => {
            to_json(domestic_labor::create_request(store, user_id, input).await?)
        }
        AgentAction::GetDomesticLaborRequests { user_id } => {
            to_json(domestic_labor::list_requests(store, user_id).await?)
        }
    }
}

fn to_json<T: Serialize>(value: T) -> Result<Value, AppError> {
    serde_json::to_value(value).map_err(|e| AppError::Internal(e.into()))
}
