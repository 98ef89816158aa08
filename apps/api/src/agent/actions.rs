use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::errors::AppError;
use crate::services::appointments::{AppointmentRef, NewAppointment};
use crate::services::certificates::CertificateRequest;
use crate::services::contracts::{ContractRef, NewContract};
use crate::services::domestic_labor::NewDomesticRequest;
use crate::services::resumes::{NewCourse, ResumeUpdate};
use crate::services::tickets::{NewTicket, TicketRef};
use crate::validation::parse_user_id;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    GetProfile,
    GetContracts,
    CreateContract,
    EndContract,
    GenerateCertificate,
    GetCertificates,
    BookAppointment,
    GetAppointments,
    CancelAppointment,
    CompleteAppointment,
    GetResume,
    UpdateResume,
    AddResumeCourse,
    SearchRegulations,
    CreateTicket,
    GetTicketStatus,
    CloseTicket,
    CreateDomesticLaborRequest,
    GetDomesticLaborRequests,
}

impl ActionKind {
    pub const ALL: [ActionKind; 19] = [
        ActionKind::GetProfile,
        ActionKind::GetContracts,
        ActionKind::CreateContract,
        ActionKind::EndContract,
        ActionKind::GenerateCertificate,
        ActionKind::GetCertificates,
        ActionKind::BookAppointment,
        ActionKind::GetAppointments,
        ActionKind::CancelAppointment,
        ActionKind::CompleteAppointment,
        ActionKind::GetResume,
        ActionKind::UpdateResume,
        ActionKind::AddResumeCourse,
        ActionKind::SearchRegulations,
        ActionKind::CreateTicket,
        ActionKind::GetTicketStatus,
        ActionKind::CloseTicket,
        ActionKind::CreateDomesticLaborRequest,
        ActionKind::GetDomesticLaborRequests,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ActionKind::GetProfile => "get_profile",
            ActionKind::GetContracts => "get_contracts",
            ActionKind::CreateContract => "create_contract",
            ActionKind::EndContract => "end_contract",
            ActionKind::GenerateCertificate => "generate_certificate",
            ActionKind::GetCertificates => "get_certificates",
            ActionKind::BookAppointment => "book_appointment",
            ActionKind::GetAppointments => "get_appointments",
            ActionKind::CancelAppointment => "cancel_appointment",
            ActionKind::CompleteAppointment => "complete_appointment",
            ActionKind::GetResume => "get_resume",
            ActionKind::UpdateResume => "update_resume",
            ActionKind::AddResumeCourse => "add_resume_course",
            ActionKind::SearchRegulations => "search_regulations",
            ActionKind::CreateTicket => "create_ticket",
            ActionKind::GetTicketStatus => "get_ticket_status",
            ActionKind::CloseTicket => "close_ticket",
            ActionKind::CreateDomesticLaborRequest => "create_domestic_labor_request",
            ActionKind::GetDomesticLaborRequests => "get_domestic_labor_requests",
        }
    }

    pub fn parse(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.as_str() == name)
    }

    /// Fields that must be present, non-null and non-empty before any service runs.
    pub fn required_fields(&self) -> &'static [&'static str] {
        match self {
            ActionKind::GetProfile
            | ActionKind::GetContracts
            | ActionKind::GetCertificates
            | ActionKind::GetAppointments
            | ActionKind::GetResume
            | ActionKind::UpdateResume
            | ActionKind::GetDomesticLaborRequests => &["user_id"],
            ActionKind::CreateContract => &[
                "user_id",
                "employer_name",
                "position",
                "salary",
                "start_date",
            ],
            ActionKind::EndContract => &["user_id", "contract_id"],
            ActionKind::GenerateCertificate => &["user_id", "certificate_type"],
            ActionKind::BookAppointment => &["user_id", "appointment_type", "appointment_date"],
            ActionKind::CancelAppointment | ActionKind::CompleteAppointment => {
                &["user_id", "appointment_id"]
            }
            ActionKind::AddResumeCourse => &["user_id", "course_name", "provider"],
            ActionKind::SearchRegulations => &[],
            ActionKind::CreateTicket => &["user_id", "title", "category"],
            ActionKind::GetTicketStatus | ActionKind::CloseTicket => &["user_id", "ticket_id"],
            ActionKind::CreateDomesticLaborRequest => &[
                "user_id",
                "request_type",
                "worker_nationality",
                "worker_profession",
            ],
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            ActionKind::GetProfile => "Read the user's registered profile",
            ActionKind::GetContracts => "List the user's employment contracts",
            ActionKind::CreateContract => {
                "Register an employment contract (employer_name, position, salary, start_date, optional end_date)"
            }
            ActionKind::EndContract => "End an active employment contract by contract_id",
            ActionKind::GenerateCertificate => {
                "Issue a certificate: salary_definition, service_certificate or labor_license"
            }
            ActionKind::GetCertificates => "List certificates already issued to the user",
            ActionKind::BookAppointment => {
                "Book a labor office appointment (appointment_type, appointment_date YYYY-MM-DD, optional notes)"
            }
            ActionKind::GetAppointments => "List the user's appointments",
            ActionKind::CancelAppointment => "Cancel a scheduled appointment by appointment_id",
            ActionKind::CompleteAppointment => "Mark a scheduled appointment as completed",
            ActionKind::GetResume => "Read the user's resume and courses",
            ActionKind::UpdateResume => {
                "Create or update the resume (job_title, skills, experience_years, education, summary)"
            }
            ActionKind::AddResumeCourse => {
                "Add a training course to the resume (course_name, provider, optional date_completed, certificate_url)"
            }
            ActionKind::SearchRegulations => {
                "Search labor regulations by optional query text and category"
            }
            ActionKind::CreateTicket => "Open a support ticket (title, category, optional description)",
            ActionKind::GetTicketStatus => "Get the status of a ticket by ticket_id",
            ActionKind::CloseTicket => "Close an open ticket by ticket_id",
            ActionKind::CreateDomesticLaborRequest => {
                "Submit a domestic labor request (request_type recruitment|transfer|exit, worker_nationality, worker_profession)"
            }
            ActionKind::GetDomesticLaborRequests => "List the user's domestic labor requests",
        }
    }
}

/// Capability-discovery entry.
#[derive(Debug, Clone, Serialize)]
pub struct ActionSpec {
    pub name: &'static str,
    pub description: &'static str,
    pub required_fields: &'static [&'static str],
}

pub fn supported_actions() -> Vec<ActionSpec> {
    ActionKind::ALL
        .iter()
        .map(|k| ActionSpec {
            name: k.as_str(),
            description: k.description(),
            required_fields: k.required_fields(),
        })
        .collect()
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RegulationSearch {
    pub query: Option<String>,
    pub category: Option<String>,
}

/// A validated, typed agent action.
#[derive(Debug, Clone)]
pub enum AgentAction {
    GetProfile { user_id: Uuid },
    GetContracts { user_id: Uuid },
    CreateContract { user_id: Uuid, input: NewContract },
    EndContract { user_id: Uuid, target: ContractRef },
    GenerateCertificate { user_id: Uuid, input: CertificateRequest },
    GetCertificates { user_id: Uuid },
    BookAppointment { user_id: Uuid, input: NewAppointment },
    GetAppointments { user_id: Uuid },
    CancelAppointment { user_id: Uuid, target: AppointmentRef },
    CompleteAppointment { user_id: Uuid, target: AppointmentRef },
    GetResume { user_id: Uuid },
    UpdateResume { user_id: Uuid, input: ResumeUpdate },
    AddResumeCourse { user_id: Uuid, input: NewCourse },
    SearchRegulations { input: RegulationSearch },
    CreateTicket { user_id: Uuid, input: NewTicket },
    GetTicketStatus { user_id: Uuid, target: TicketRef },
    CloseTicket { user_id: Uuid, target: TicketRef },
    CreateDomesticLaborRequest { user_id: Uuid, input: NewDomesticRequest },
    GetDomesticLaborRequests { user_id: Uuid },
}

impl AgentAction {
    /// Checks the required-field contract, the user id format and the
    /// payload shape. Fails with `Validation` before any service is touched.
    pub fn from_payload(kind: ActionKind, payload: &Value) -> Result<Self, AppError> {
        if !payload.is_object() {
            return Err(AppError::validation("payload must be a JSON object"));
        }
        if let Some(missing) = kind
            .required_fields()
            .iter()
            .find(|field| is_absent(payload.get(**field)))
        {
            return Err(AppError::validation(format!(
                "{missing} is required for {}",
                kind.as_str()
            )));
        }

        let user = || user_id_of(payload);

        Ok(match kind {
            ActionKind::GetProfile => AgentAction::GetProfile { user_id: user()? },
            ActionKind::GetContracts => AgentAction::GetContracts { user_id: user()? },
            ActionKind::CreateContract => AgentAction::CreateContract {
                user_id: user()?,
                input: parse_body(kind, payload)?,
            },
            ActionKind::EndContract => AgentAction::EndContract {
                user_id: user()?,
                target: parse_body(kind, payload)?,
            },
            ActionKind::GenerateCertificate => AgentAction::GenerateCertificate {
                user_id: user()?,
                input: parse_body(kind, payload)?,
            },
            ActionKind::GetCertificates => AgentAction::GetCertificates { user_id: user()? },
            ActionKind::BookAppointment => AgentAction::BookAppointment {
                user_id: user()?,
                input: parse_body(kind, payload)?,
            },
            ActionKind::GetAppointments => AgentAction::GetAppointments { user_id: user()? },
            ActionKind::CancelAppointment => AgentAction::CancelAppointment {
                user_id: user()?,
                target: parse_body(kind, payload)?,
            },
            ActionKind::CompleteAppointment => AgentAction::CompleteAppointment {
                user_id: user()?,
                target: parse_body(kind, payload)?,
            },
            ActionKind::GetResume => AgentAction::GetResume { user_id: user()? },
            ActionKind::UpdateResume => AgentAction::UpdateResume {
                user_id: user()?,
                input: parse_body(kind, payload)?,
            },
            ActionKind::AddResumeCourse => AgentAction::AddResumeCourse {
                user_id: user()?,
                input: parse_body(kind, payload)?,
            },
            ActionKind::SearchRegulations => AgentAction::SearchRegulations {
                input: parse_body(kind, payload)?,
            },
            ActionKind::CreateTicket => AgentAction::CreateTicket {
                user_id: user()?,
                input: parse_body(kind, payload)?,
            },
            ActionKind::GetTicketStatus => AgentAction::GetTicketStatus {
                user_id: user()?,
                target: parse_body(kind, payload)?,
            },
            ActionKind::CloseTicket => AgentAction::CloseTicket {
                user_id: user()?,
                target: parse_body(kind, payload)?,
            },
            ActionKind::CreateDomesticLaborRequest => AgentAction::CreateDomesticLaborRequest {
                user_id: user()?,
                input: parse_body(kind, payload)?,
            },
            ActionKind::GetDomesticLaborRequests => {
                AgentAction::GetDomesticLaborRequests { user_id: user()? }
            }
        })
    }
}

fn is_absent(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => true,
        Some(Value::String(s)) => s.trim().is_empty(),
        Some(_) => false,
    }
}

/// Extracts and validates `user_id`, if present.
pub fn user_id_of(payload: &Value) -> Result<Uuid, AppError> {
    match payload.get("user_id") {
        Some(Value::String(raw)) => parse_user_id(raw),
        Some(_) => Err(AppError::validation("user_id must be a string")),
        None => Err(AppError::validation("user_id is required")),
    }
}

fn parse_body<T: DeserializeOwned>(kind: ActionKind, payload: &Value) -> Result<T, AppError> {
    serde_json::from_value(payload.clone()).map_err(|e| {
        AppError::validation(format!("invalid payload for {}: {e}", kind.as_str()))
    })
}
