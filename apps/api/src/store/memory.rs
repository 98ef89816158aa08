use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{Store, StoreResult};
use crate::models::appointment::{AppointmentStatus, LaborAppointment};
use crate::models::audit::AgentActionLog;
use crate::models::certificate::Certificate;
use crate::models::chat::ChatMessage;
use crate::models::contract::{ContractStatus, EmploymentContract};
use crate::models::domestic_labor::DomesticLaborRequest;
use crate::models::proactive::ProactiveEvent;
use crate::models::profile::UserProfile;
use crate::models::regulation::{Regulation, RegulationQuery};
use crate::models::resume::{Resume, ResumeCourse};
use crate::models::ticket::{Ticket, TicketStatus};
use crate::services::regulations;

#[derive(Default)]
struct Tables {
    profiles: Vec<UserProfile>,
    contracts: Vec<EmploymentContract>,
    certificates: Vec<Certificate>,
    appointments: Vec<LaborAppointment>,
    resumes: Vec<Resume>,
    courses: Vec<ResumeCourse>,
    regulations: Vec<Regulation>,
    domestic_requests: Vec<DomesticLaborRequest>,
    tickets: Vec<Ticket>,
    events: Vec<ProactiveEvent>,
    action_logs: Vec<AgentActionLog>,
    chat_messages: Vec<ChatMessage>,
}

/// Process-local store used when no `DATABASE_URL` is configured, and by tests.
/// All tables sit behind one lock, so every operation is atomic.
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

/// Row counts per table, for assertions in tests.
#[cfg(test)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TableCounts {
    pub profiles: usize,
    pub contracts: usize,
    pub certificates: usize,
    pub appointments: usize,
    pub resumes: usize,
    pub courses: usize,
    pub domestic_requests: usize,
    pub tickets: usize,
    pub events: usize,
    pub action_logs: usize,
    pub chat_messages: usize,
}

#[cfg(test)]
impl TableCounts {
    /// Rows across all domain tables (excludes the audit log and chat history).
    pub fn domain_rows(&self) -> usize {
        self.profiles
            + self.contracts
            + self.certificates
            + self.appointments
            + self.resumes
            + self.courses
            + self.domestic_requests
            + self.tickets
            + self.events
    }
}

impl MemoryStore {
    /// Empty store except for the built-in regulations catalogue.
    pub fn new() -> Self {
        Self {
            tables: RwLock::new(Tables {
                regulations: regulations::catalogue(),
                ..Tables::default()
            }),
        }
    }

    #[cfg(test)]
    pub fn with_regulations(regulations: Vec<Regulation>) -> Self {
        Self {
            tables: RwLock::new(Tables {
                regulations,
                ..Tables::default()
            }),
        }
    }

    #[cfg(test)]
    pub async fn counts(&self) -> TableCounts {
        let t = self.tables.read().await;
        TableCounts {
            profiles: t.profiles.len(),
            contracts: t.contracts.len(),
            certificates: t.certificates.len(),
            appointments: t.appointments.len(),
            resumes: t.resumes.len(),
            courses: t.courses.len(),
            domestic_requests: t.domestic_requests.len(),
            tickets: t.tickets.len(),
            events: t.events.len(),
            action_logs: t.action_logs.len(),
            chat_messages: t.chat_messages.len(),
        }
    }

    #[cfg(test)]
    pub async fn action_logs(&self) -> Vec<AgentActionLog> {
        self.tables.read().await.action_logs.clone()
    }
}

/// Replaces the row matching `same` in place; a missing row is a no-op,
/// mirroring an UPDATE that matches nothing.
fn replace<T: Clone>(rows: &mut [T], row: &T, same: impl Fn(&T) -> bool) {
    if let Some(slot) = rows.iter_mut().find(|r| same(r)) {
        *slot = row.clone();
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn get_profile(&self, user_id: Uuid) -> StoreResult<Option<UserProfile>> {
        let t = self.tables.read().await;
        Ok(t.profiles.iter().find(|p| p.user_id == user_id).cloned())
    }

    async fn upsert_profile(&self, profile: &UserProfile) -> StoreResult<UserProfile> {
        let mut t = self.tables.write().await;
        if let Some(existing) = t.profiles.iter_mut().find(|p| p.user_id == profile.user_id) {
            existing.full_name = profile.full_name.clone();
            existing.phone = profile.phone.clone();
            existing.national_id = profile.national_id.clone();
            return Ok(existing.clone());
        }
        t.profiles.push(profile.clone());
        Ok(profile.clone())
    }

    async fn insert_contract(&self, contract: &EmploymentContract) -> StoreResult<()> {
        self.tables.write().await.contracts.push(contract.clone());
        Ok(())
    }

    async fn update_contract(&self, contract: &EmploymentContract) -> StoreResult<()> {
        let mut t = self.tables.write().await;
        replace(&mut t.contracts, contract, |c| {
            c.id == contract.id && c.user_id == contract.user_id
        });
        Ok(())
    }

    async fn get_contract(
        &self,
        user_id: Uuid,
        id: Uuid,
    ) -> StoreResult<Option<EmploymentContract>> {
        let t = self.tables.read().await;
        Ok(t.contracts
            .iter()
            .find(|c| c.id == id && c.user_id == user_id)
            .cloned())
    }

    async fn list_contracts(&self, user_id: Uuid) -> StoreResult<Vec<EmploymentContract>> {
        let t = self.tables.read().await;
        let mut rows: Vec<_> = t
            .contracts
            .iter()
            .filter(|c| c.user_id == user_id)
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(rows)
    }

    async fn latest_active_contract(
        &self,
        user_id: Uuid,
    ) -> StoreResult<Option<EmploymentContract>> {
        let t = self.tables.read().await;
        Ok(t.contracts
            .iter()
            .filter(|c| c.user_id == user_id && c.status == ContractStatus::Active)
            .max_by_key(|c| c.created_at)
            .cloned())
    }

    async fn active_contracts_ending_between(
        &self,
        from: NaiveDate,
        to: NaiveDate,
    ) -> StoreResult<Vec<EmploymentContract>> {
        let t = self.tables.read().await;
        let mut rows: Vec<_> = t
            .contracts
            .iter()
            .filter(|c| c.status == ContractStatus::Active)
            .filter(|c| c.end_date.is_some_and(|d| d >= from && d <= to))
            .cloned()
            .collect();
        rows.sort_by_key(|c| c.end_date);
        Ok(rows)
    }

    async fn insert_certificate(&self, certificate: &Certificate) -> StoreResult<()> {
        self.tables.write().await.certificates.push(certificate.clone());
        Ok(())
    }

    async fn list_certificates(&self, user_id: Uuid) -> StoreResult<Vec<Certificate>> {
        let t = self.tables.read().await;
        let mut rows: Vec<_> = t
            .certificates
            .iter()
            .filter(|c| c.user_id == user_id)
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.issue_date.cmp(&a.issue_date));
        Ok(rows)
    }

    async fn insert_appointment(&self, appointment: &LaborAppointment) -> StoreResult<()> {
        self.tables.write().await.appointments.push(appointment.clone());
        Ok(())
    }

    async fn update_appointment(&self, appointment: &LaborAppointment) -> StoreResult<()> {
        let mut t = self.tables.write().await;
        replace(&mut t.appointments, appointment, |a| {
            a.id == appointment.id && a.user_id == appointment.user_id
        });
        Ok(())
    }

    async fn get_appointment(
        &self,
        user_id: Uuid,
        id: Uuid,
    ) -> StoreResult<Option<LaborAppointment>> {
        let t = self.tables.read().await;
        Ok(t.appointments
            .iter()
            .find(|a| a.id == id && a.user_id == user_id)
            .cloned())
    }

    async fn list_appointments(&self, user_id: Uuid) -> StoreResult<Vec<LaborAppointment>> {
        let t = self.tables.read().await;
        let mut rows: Vec<_> = t
            .appointments
            .iter()
            .filter(|a| a.user_id == user_id)
            .cloned()
            .collect();
        rows.sort_by_key(|a| a.appointment_date);
        Ok(rows)
    }

    async fn scheduled_appointments_between(
        &self,
        from: NaiveDate,
        to: NaiveDate,
    ) -> StoreResult<Vec<LaborAppointment>> {
        let t = self.tables.read().await;
        let mut rows: Vec<_> = t
            .appointments
            .iter()
            .filter(|a| a.status == AppointmentStatus::Scheduled)
            .filter(|a| a.appointment_date >= from && a.appointment_date <= to)
            .cloned()
            .collect();
        rows.sort_by_key(|a| a.appointment_date);
        Ok(rows)
    }

    async fn get_resume(&self, user_id: Uuid) -> StoreResult<Option<Resume>> {
        let t = self.tables.read().await;
        Ok(t.resumes.iter().find(|r| r.user_id == user_id).cloned())
    }

    async fn insert_resume(&self, resume: &Resume) -> StoreResult<Resume> {
        let mut t = self.tables.write().await;
        match t.resumes.iter_mut().find(|r| r.user_id == resume.user_id) {
            Some(existing) => {
                *existing = Resume {
                    id: existing.id,
                    ..resume.clone()
                };
                Ok(existing.clone())
            }
            None => {
                t.resumes.push(resume.clone());
                Ok(resume.clone())
            }
        }
    }

    async fn update_resume(&self, resume: &Resume) -> StoreResult<()> {
        let mut t = self.tables.write().await;
        replace(&mut t.resumes, resume, |r| r.id == resume.id);
        Ok(())
    }

    async fn insert_course(&self, course: &ResumeCourse) -> StoreResult<()> {
        self.tables.write().await.courses.push(course.clone());
        Ok(())
    }

    async fn list_courses(&self, resume_id: Uuid) -> StoreResult<Vec<ResumeCourse>> {
        let t = self.tables.read().await;
        let mut rows: Vec<_> = t
            .courses
            .iter()
            .filter(|c| c.resume_id == resume_id)
            .cloned()
            .collect();
        // NULLS LAST, newest completion first
        rows.sort_by(|a, b| match (a.date_completed, b.date_completed) {
            (Some(x), Some(y)) => y.cmp(&x),
            (Some(_), None) => std::cmp::Ordering::Less,
            (None, Some(_)) => std::cmp::Ordering::Greater,
            (None, None) => std::cmp::Ordering::Equal,
        });
        Ok(rows)
    }

    async fn delete_course(&self, resume_id: Uuid, course_id: Uuid) -> StoreResult<bool> {
        let mut t = self.tables.write().await;
        let before = t.courses.len();
        t.courses
            .retain(|c| !(c.id == course_id && c.resume_id == resume_id));
        Ok(t.courses.len() < before)
    }

    async fn search_regulations(&self, query: &RegulationQuery) -> StoreResult<Vec<Regulation>> {
        let t = self.tables.read().await;
        let mut rows: Vec<_> = t
            .regulations
            .iter()
            .filter(|r| query.matches(r))
            .cloned()
            .collect();
        rows.sort_by(|a, b| {
            b.issued_year
                .cmp(&a.issued_year)
                .then_with(|| a.title.cmp(&b.title))
        });
        Ok(rows)
    }

    async fn get_regulation(&self, id: Uuid) -> StoreResult<Option<Regulation>> {
        let t = self.tables.read().await;
        Ok(t.regulations.iter().find(|r| r.id == id).cloned())
    }

    async fn insert_domestic_request(&self, request: &DomesticLaborRequest) -> StoreResult<()> {
        self.tables.write().await.domestic_requests.push(request.clone());
        Ok(())
    }

    async fn list_domestic_requests(
        &self,
        user_id: Uuid,
    ) -> StoreResult<Vec<DomesticLaborRequest>> {
        let t = self.tables.read().await;
        let mut rows: Vec<_> = t
            .domestic_requests
            .iter()
            .filter(|r| r.user_id == user_id)
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(rows)
    }

    async fn insert_ticket(&self, ticket: &Ticket) -> StoreResult<()> {
        self.tables.write().await.tickets.push(ticket.clone());
        Ok(())
    }

    async fn update_ticket(&self, ticket: &Ticket) -> StoreResult<()> {
        let mut t = self.tables.write().await;
        replace(&mut t.tickets, ticket, |x| {
            x.id == ticket.id && x.user_id == ticket.user_id
        });
        Ok(())
    }

    async fn get_ticket(&self, user_id: Uuid, id: Uuid) -> StoreResult<Option<Ticket>> {
        let t = self.tables.read().await;
        Ok(t.tickets
            .iter()
            .find(|x| x.id == id && x.user_id == user_id)
            .cloned())
    }

    async fn list_tickets(&self, user_id: Uuid) -> StoreResult<Vec<Ticket>> {
        let t = self.tables.read().await;
        let mut rows: Vec<_> = t
            .tickets
            .iter()
            .filter(|x| x.user_id == user_id)
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(rows)
    }

    async fn open_tickets_created_before(&self, cutoff: DateTime<Utc>) -> StoreResult<Vec<Ticket>> {
        let t = self.tables.read().await;
        let mut rows: Vec<_> = t
            .tickets
            .iter()
            .filter(|x| x.status == TicketStatus::Open && x.created_at < cutoff)
            .cloned()
            .collect();
        rows.sort_by_key(|x| x.created_at);
        Ok(rows)
    }

    async fn insert_event_if_absent(&self, event: &ProactiveEvent) -> StoreResult<bool> {
        let mut t = self.tables.write().await;
        let exists = t.events.iter().any(|e| {
            !e.acted && e.user_id == event.user_id && e.event_type == event.event_type
        });
        if exists {
            return Ok(false);
        }
        t.events.push(event.clone());
        Ok(true)
    }

    async fn pending_events(&self, user_id: Uuid, limit: i64) -> StoreResult<Vec<ProactiveEvent>> {
        let t = self.tables.read().await;
        let mut rows: Vec<_> = t
            .events
            .iter()
            .filter(|e| e.user_id == user_id && !e.acted)
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.detected_at.cmp(&a.detected_at));
        rows.truncate(usize::try_from(limit).unwrap_or(0));
        Ok(rows)
    }

    async fn get_event(&self, user_id: Uuid, id: Uuid) -> StoreResult<Option<ProactiveEvent>> {
        let t = self.tables.read().await;
        Ok(t.events
            .iter()
            .find(|e| e.id == id && e.user_id == user_id)
            .cloned())
    }

    async fn update_event(&self, event: &ProactiveEvent) -> StoreResult<()> {
        let mut t = self.tables.write().await;
        replace(&mut t.events, event, |e| {
            e.id == event.id && e.user_id == event.user_id
        });
        Ok(())
    }

    async fn insert_action_log(&self, log: &AgentActionLog) -> StoreResult<()> {
        self.tables.write().await.action_logs.push(log.clone());
        Ok(())
    }

    async fn recent_action_logs(
        &self,
        user_id: Uuid,
        limit: i64,
    ) -> StoreResult<Vec<AgentActionLog>> {
        let t = self.tables.read().await;
        let mut rows: Vec<_> = t
            .action_logs
            .iter()
            .filter(|l| l.user_id == Some(user_id))
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        rows.truncate(usize::try_from(limit).unwrap_or(0));
        Ok(rows)
    }

    async fn insert_chat_message(&self, message: &ChatMessage) -> StoreResult<()> {
        self.tables.write().await.chat_messages.push(message.clone());
        Ok(())
    }

    async fn recent_chat_messages(
        &self,
        user_id: Uuid,
        limit: i64,
    ) -> StoreResult<Vec<ChatMessage>> {
        let t = self.tables.read().await;
        let mine: Vec<_> = t
            .chat_messages
            .iter()
            .filter(|m| m.user_id == user_id)
            .cloned()
            .collect();
        let keep = usize::try_from(limit).unwrap_or(0);
        let skip = mine.len().saturating_sub(keep);
        Ok(mine.into_iter().skip(skip).collect())
    }
}
