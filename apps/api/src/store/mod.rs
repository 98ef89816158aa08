//! Persistence seam. Route handlers, services, the dispatcher and the trigger
//! engine only ever see `Arc<dyn Store>`, so the Postgres adapter and the
//! in-memory adapter are interchangeable.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::appointment::LaborAppointment;
use crate::models::audit::AgentActionLog;
use crate::models::certificate::Certificate;
use crate::models::chat::ChatMessage;
use crate::models::contract::EmploymentContract;
use crate::models::domestic_labor::DomesticLaborRequest;
use crate::models::proactive::ProactiveEvent;
use crate::models::profile::UserProfile;
use crate::models::regulation::{Regulation, RegulationQuery};
use crate::models::resume::{Resume, ResumeCourse};
use crate::models::ticket::Ticket;

pub mod memory;
pub mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

pub type StoreResult<T> = Result<T, AppError>;

#[async_trait]
pub trait Store: Send + Sync {
    // Profiles
    async fn get_profile(&self, user_id: Uuid) -> StoreResult<Option<UserProfile>>;
    async fn upsert_profile(&self, profile: &UserProfile) -> StoreResult<UserProfile>;

    // Contracts
    async fn insert_contract(&self, contract: &EmploymentContract) -> StoreResult<()>;
    async fn update_contract(&self, contract: &EmploymentContract) -> StoreResult<()>;
    async fn get_contract(&self, user_id: Uuid, id: Uuid)
        -> StoreResult<Option<EmploymentContract>>;
    async fn list_contracts(&self, user_id: Uuid) -> StoreResult<Vec<EmploymentContract>>;
    /// Most recently created contract with status `active`.
    async fn latest_active_contract(&self, user_id: Uuid)
        -> StoreResult<Option<EmploymentContract>>;
    /// Active contracts whose end date falls in `[from, to]`, across all users.
    async fn active_contracts_ending_between(
        &self,
        from: NaiveDate,
        to: NaiveDate,
    ) -> StoreResult<Vec<EmploymentContract>>;

    // Certificates
    async fn insert_certificate(&self, certificate: &Certificate) -> StoreResult<()>;
    async fn list_certificates(&self, user_id: Uuid) -> StoreResult<Vec<Certificate>>;

    // Appointments
    async fn insert_appointment(&self, appointment: &LaborAppointment) -> StoreResult<()>;
    async fn update_appointment(&self, appointment: &LaborAppointment) -> StoreResult<()>;
    async fn get_appointment(&self, user_id: Uuid, id: Uuid)
        -> StoreResult<Option<LaborAppointment>>;
    async fn list_appointments(&self, user_id: Uuid) -> StoreResult<Vec<LaborAppointment>>;
    /// Scheduled appointments dated in `[from, to]`, across all users.
    async fn scheduled_appointments_between(
        &self,
        from: NaiveDate,
        to: NaiveDate,
    ) -> StoreResult<Vec<LaborAppointment>>;

    // Resumes
    async fn get_resume(&self, user_id: Uuid) -> StoreResult<Option<Resume>>;
    /// Inserts the resume, or overwrites the one the user already has.
    /// Returns the stored row, whose id is the existing one on conflict.
    async fn insert_resume(&self, resume: &Resume) -> StoreResult<Resume>;
    async fn update_resume(&self, resume: &Resume) -> StoreResult<()>;
    async fn insert_course(&self, course: &ResumeCourse) -> StoreResult<()>;
    async fn list_courses(&self, resume_id: Uuid) -> StoreResult<Vec<ResumeCourse>>;
    /// Returns whether a row was deleted.
    async fn delete_course(&self, resume_id: Uuid, course_id: Uuid) -> StoreResult<bool>;

    // Regulations
    async fn search_regulations(&self, query: &RegulationQuery) -> StoreResult<Vec<Regulation>>;
    async fn get_regulation(&self, id: Uuid) -> StoreResult<Option<Regulation>>;

    // Domestic labor
    async fn insert_domestic_request(&self, request: &DomesticLaborRequest) -> StoreResult<()>;
    async fn list_domestic_requests(&self, user_id: Uuid)
        -> StoreResult<Vec<DomesticLaborRequest>>;

    // Tickets
    async fn insert_ticket(&self, ticket: &Ticket) -> StoreResult<()>;
    async fn update_ticket(&self, ticket: &Ticket) -> StoreResult<()>;
    async fn get_ticket(&self, user_id: Uuid, id: Uuid) -> StoreResult<Option<Ticket>>;
    async fn list_tickets(&self, user_id: Uuid) -> StoreResult<Vec<Ticket>>;
    /// Open tickets created strictly before `cutoff`, across all users.
    async fn open_tickets_created_before(&self, cutoff: DateTime<Utc>) -> StoreResult<Vec<Ticket>>;

    // Proactive events
    /// Atomically inserts `event` unless an unacted event with the same
    /// (user_id, event_type) exists. Returns whether the row was inserted.
    async fn insert_event_if_absent(&self, event: &ProactiveEvent) -> StoreResult<bool>;
    /// Unacted events, newest first, at most `limit`.
    async fn pending_events(&self, user_id: Uuid, limit: i64) -> StoreResult<Vec<ProactiveEvent>>;
    async fn get_event(&self, user_id: Uuid, id: Uuid) -> StoreResult<Option<ProactiveEvent>>;
    async fn update_event(&self, event: &ProactiveEvent) -> StoreResult<()>;

    // Audit log
    async fn insert_action_log(&self, log: &AgentActionLog) -> StoreResult<()>;
    async fn recent_action_logs(&self, user_id: Uuid, limit: i64)
        -> StoreResult<Vec<AgentActionLog>>;

    // Chat history
    async fn insert_chat_message(&self, message: &ChatMessage) -> StoreResult<()>;
    /// Most recent messages in chronological order.
    async fn recent_chat_messages(&self, user_id: Uuid, limit: i64)
        -> StoreResult<Vec<ChatMessage>>;
}
