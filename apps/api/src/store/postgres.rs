use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::PgPool;
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

/// Postgres-backed store. Schema lives in `migrations/0001_init.sql`.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl Store for PgStore {
    async fn get_profile(&self, user_id: Uuid) -> StoreResult<Option<UserProfile>> {
        Ok(
            sqlx::query_as::<_, UserProfile>("SELECT * FROM user_profiles WHERE user_id = $1")
                .bind(user_id)
                .fetch_optional(&self.pool)
                .await?,
        )
    }

    async fn upsert_profile(&self, profile: &UserProfile) -> StoreResult<UserProfile> {
        // created_at is kept from the first insert
        Ok(sqlx::query_as::<_, UserProfile>(
            r#"
            INSERT INTO user_profiles (user_id, full_name, phone, national_id, created_at)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (user_id) DO UPDATE
                SET full_name = EXCLUDED.full_name,
                    phone = EXCLUDED.phone,
                    national_id = EXCLUDED.national_id
            RETURNING *
            "#,
        )
        .bind(profile.user_id)
        .bind(&profile.full_name)
        .bind(&profile.phone)
        .bind(&profile.national_id)
        .bind(profile.created_at)
        .fetch_one(&self.pool)
        .await?)
    }

    async fn insert_contract(&self, contract: &EmploymentContract) -> StoreResult<()> {
        sqlx::query(
            r#"
            INSERT INTO employment_contracts
                (id, user_id, employer_name, position, salary, start_date, end_date, status, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(contract.id)
        .bind(contract.user_id)
        .bind(&contract.employer_name)
        .bind(&contract.position)
        .bind(contract.salary)
        .bind(contract.start_date)
        .bind(contract.end_date)
        .bind(contract.status)
        .bind(contract.created_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn update_contract(&self, contract: &EmploymentContract) -> StoreResult<()> {
        sqlx::query(
            r#"
            UPDATE employment_contracts
            SET employer_name = $3, position = $4, salary = $5,
                start_date = $6, end_date = $7, status = $8
            WHERE id = $1 AND user_id = $2
            "#,
        )
        .bind(contract.id)
        .bind(contract.user_id)
        .bind(&contract.employer_name)
        .bind(&contract.position)
        .bind(contract.salary)
        .bind(contract.start_date)
        .bind(contract.end_date)
        .bind(contract.status)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn get_contract(
        &self,
        user_id: Uuid,
        id: Uuid,
    ) -> StoreResult<Option<EmploymentContract>> {
        Ok(sqlx::query_as::<_, EmploymentContract>(
            "SELECT * FROM employment_contracts WHERE id = $1 AND user_id = $2",
        )
        .bind(id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?)
    }

    async fn list_contracts(&self, user_id: Uuid) -> StoreResult<Vec<EmploymentContract>> {
        Ok(sqlx::query_as::<_, EmploymentContract>(
            "SELECT * FROM employment_contracts WHERE user_id = $1 ORDER BY created_at DESC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?)
    }

    async fn latest_active_contract(
        &self,
        user_id: Uuid,
    ) -> StoreResult<Option<EmploymentContract>> {
        Ok(sqlx::query_as::<_, EmploymentContract>(
            r#"
            SELECT * FROM employment_contracts
            WHERE user_id = $1 AND status = $2
            ORDER BY created_at DESC
            LIMIT 1
            "#,
        )
        .bind(user_id)
        .bind(ContractStatus::Active)
        .fetch_optional(&self.pool)
        .await?)
    }

    async fn active_contracts_ending_between(
        &self,
        from: NaiveDate,
        to: NaiveDate,
    ) -> StoreResult<Vec<EmploymentContract>> {
        Ok(sqlx::query_as::<_, EmploymentContract>(
            r#"
            SELECT * FROM employment_contracts
            WHERE status = $1 AND end_date BETWEEN $2 AND $3
            ORDER BY end_date ASC
            "#,
        )
        .bind(ContractStatus::Active)
        .bind(from)
        .bind(to)
        .fetch_all(&self.pool)
        .await?)
    }

    async fn insert_certificate(&self, certificate: &Certificate) -> StoreResult<()> {
        sqlx::query(
            r#"
            INSERT INTO certificates (id, user_id, contract_id, certificate_type, content, issue_date)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(certificate.id)
        .bind(certificate.user_id)
        .bind(certificate.contract_id)
        .bind(certificate.certificate_type)
        .bind(&certificate.content)
        .bind(certificate.issue_date)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn list_certificates(&self, user_id: Uuid) -> StoreResult<Vec<Certificate>> {
        Ok(sqlx::query_as::<_, Certificate>(
            "SELECT * FROM certificates WHERE user_id = $1 ORDER BY issue_date DESC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?)
    }

    async fn insert_appointment(&self, appointment: &LaborAppointment) -> StoreResult<()> {
        sqlx::query(
            r#"
            INSERT INTO labor_appointments
                (id, user_id, appointment_type, appointment_date, notes, status, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(appointment.id)
        .bind(appointment.user_id)
        .bind(&appointment.appointment_type)
        .bind(appointment.appointment_date)
        .bind(&appointment.notes)
        .bind(appointment.status)
        .bind(appointment.created_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn update_appointment(&self, appointment: &LaborAppointment) -> StoreResult<()> {
        sqlx::query(
            r#"
            UPDATE labor_appointments
            SET appointment_type = $3, appointment_date = $4, notes = $5, status = $6
            WHERE id = $1 AND user_id = $2
            "#,
        )
        .bind(appointment.id)
        .bind(appointment.user_id)
        .bind(&appointment.appointment_type)
        .bind(appointment.appointment_date)
        .bind(&appointment.notes)
        .bind(appointment.status)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn get_appointment(
        &self,
        user_id: Uuid,
        id: Uuid,
    ) -> StoreResult<Option<LaborAppointment>> {
        Ok(sqlx::query_as::<_, LaborAppointment>(
            "SELECT * FROM labor_appointments WHERE id = $1 AND user_id = $2",
        )
        .bind(id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?)
    }

    async fn list_appointments(&self, user_id: Uuid) -> StoreResult<Vec<LaborAppointment>> {
        Ok(sqlx::query_as::<_, LaborAppointment>(
            "SELECT * FROM labor_appointments WHERE user_id = $1 ORDER BY appointment_date ASC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?)
    }

    async fn scheduled_appointments_between(
        &self,
        from: NaiveDate,
        to: NaiveDate,
    ) -> StoreResult<Vec<LaborAppointment>> {
        Ok(sqlx::query_as::<_, LaborAppointment>(
            r#"
            SELECT * FROM labor_appointments
            WHERE status = $1 AND appointment_date BETWEEN $2 AND $3
            ORDER BY appointment_date ASC
            "#,
        )
        .bind(AppointmentStatus::Scheduled)
        .bind(from)
        .bind(to)
        .fetch_all(&self.pool)
        .await?)
    }

    async fn get_resume(&self, user_id: Uuid) -> StoreResult<Option<Resume>> {
        Ok(
            sqlx::query_as::<_, Resume>("SELECT * FROM resumes WHERE user_id = $1 LIMIT 1")
                .bind(user_id)
                .fetch_optional(&self.pool)
                .await?,
        )
    }

    async fn insert_resume(&self, resume: &Resume) -> StoreResult<Resume> {
        Ok(sqlx::query_as::<_, Resume>(
            r#"
            INSERT INTO resumes
                (id, user_id, job_title, skills, experience_years, education, summary, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            ON CONFLICT (user_id) DO UPDATE
            SET job_title = EXCLUDED.job_title,
                skills = EXCLUDED.skills,
                experience_years = EXCLUDED.experience_years,
                education = EXCLUDED.education,
                summary = EXCLUDED.summary,
                updated_at = EXCLUDED.updated_at
            RETURNING *
            "#,
        )
        .bind(resume.id)
        .bind(resume.user_id)
        .bind(&resume.job_title)
        .bind(&resume.skills)
        .bind(resume.experience_years)
        .bind(&resume.education)
        .bind(&resume.summary)
        .bind(resume.updated_at)
        .fetch_one(&self.pool)
        .await?)
    }

    async fn update_resume(&self, resume: &Resume) -> StoreResult<()> {
        sqlx::query(
            r#"
            UPDATE resumes
            SET job_title = $2, skills = $3, experience_years = $4,
                education = $5, summary = $6, updated_at = $7
            WHERE id = $1
            "#,
        )
        .bind(resume.id)
        .bind(&resume.job_title)
        .bind(&resume.skills)
        .bind(resume.experience_years)
        .bind(&resume.education)
        .bind(&resume.summary)
        .bind(resume.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn insert_course(&self, course: &ResumeCourse) -> StoreResult<()> {
        sqlx::query(
            r#"
            INSERT INTO resume_courses
                (id, resume_id, course_name, provider, date_completed, certificate_url)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(course.id)
        .bind(course.resume_id)
        .bind(&course.course_name)
        .bind(&course.provider)
        .bind(course.date_completed)
        .bind(&course.certificate_url)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn list_courses(&self, resume_id: Uuid) -> StoreResult<Vec<ResumeCourse>> {
        Ok(sqlx::query_as::<_, ResumeCourse>(
            "SELECT * FROM resume_courses WHERE resume_id = $1 ORDER BY date_completed DESC NULLS LAST",
        )
        .bind(resume_id)
        .fetch_all(&self.pool)
        .await?)
    }

    async fn delete_course(&self, resume_id: Uuid, course_id: Uuid) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM resume_courses WHERE id = $1 AND resume_id = $2")
            .bind(course_id)
            .bind(resume_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn search_regulations(&self, query: &RegulationQuery) -> StoreResult<Vec<Regulation>> {
        let pattern = query.text.as_deref().map(contains_pattern);
        Ok(sqlx::query_as::<_, Regulation>(
            r#"
            SELECT * FROM regulations
            WHERE ($1::text IS NULL OR lower(category) = lower($1))
              AND ($2::text IS NULL
                   OR title ILIKE $2 ESCAPE '\'
                   OR summary ILIKE $2 ESCAPE '\'
                   OR content ILIKE $2 ESCAPE '\')
            ORDER BY issued_year DESC, title ASC
            "#,
        )
        .bind(&query.category)
        .bind(pattern)
        .fetch_all(&self.pool)
        .await?)
    }

    async fn get_regulation(&self, id: Uuid) -> StoreResult<Option<Regulation>> {
        Ok(
            sqlx::query_as::<_, Regulation>("SELECT * FROM regulations WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?,
        )
    }

    async fn insert_domestic_request(&self, request: &DomesticLaborRequest) -> StoreResult<()> {
        sqlx::query(
            r#"
            INSERT INTO domestic_labor_requests
                (id, user_id, request_type, worker_nationality, worker_profession, notes, status, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(request.id)
        .bind(request.user_id)
        .bind(request.request_type)
        .bind(&request.worker_nationality)
        .bind(&request.worker_profession)
        .bind(&request.notes)
        .bind(request.status)
        .bind(request.created_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn list_domestic_requests(
        &self,
        user_id: Uuid,
    ) -> StoreResult<Vec<DomesticLaborRequest>> {
        Ok(sqlx::query_as::<_, DomesticLaborRequest>(
            "SELECT * FROM domestic_labor_requests WHERE user_id = $1 ORDER BY created_at DESC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?)
    }

    async fn insert_ticket(&self, ticket: &Ticket) -> StoreResult<()> {
        sqlx::query(
            r#"
            INSERT INTO tickets
                (id, user_id, title, category, description, status, created_at, closed_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(ticket.id)
        .bind(ticket.user_id)
        .bind(&ticket.title)
        .bind(&ticket.category)
        .bind(&ticket.description)
        .bind(ticket.status)
        .bind(ticket.created_at)
        .bind(ticket.closed_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn update_ticket(&self, ticket: &Ticket) -> StoreResult<()> {
        sqlx::query(
            r#"
            UPDATE tickets
            SET title = $3, category = $4, description = $5, status = $6, closed_at = $7
            WHERE id = $1 AND user_id = $2
            "#,
        )
        .bind(ticket.id)
        .bind(ticket.user_id)
        .bind(&ticket.title)
        .bind(&ticket.category)
        .bind(&ticket.description)
        .bind(ticket.status)
        .bind(ticket.closed_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn get_ticket(&self, user_id: Uuid, id: Uuid) -> StoreResult<Option<Ticket>> {
        Ok(
            sqlx::query_as::<_, Ticket>("SELECT * FROM tickets WHERE id = $1 AND user_id = $2")
                .bind(id)
                .bind(user_id)
                .fetch_optional(&self.pool)
                .await?,
        )
    }

    async fn list_tickets(&self, user_id: Uuid) -> StoreResult<Vec<Ticket>> {
        Ok(sqlx::query_as::<_, Ticket>(
            "SELECT * FROM tickets WHERE user_id = $1 ORDER BY created_at DESC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?)
    }

    async fn open_tickets_created_before(&self, cutoff: DateTime<Utc>) -> StoreResult<Vec<Ticket>> {
        Ok(sqlx::query_as::<_, Ticket>(
            "SELECT * FROM tickets WHERE status = $1 AND created_at < $2 ORDER BY created_at ASC",
        )
        .bind(TicketStatus::Open)
        .bind(cutoff)
        .fetch_all(&self.pool)
        .await?)
    }

    async fn insert_event_if_absent(&self, event: &ProactiveEvent) -> StoreResult<bool> {
        // Relies on the partial unique index proactive_events_pending_uniq
        let result = sqlx::query(
            r#"
            INSERT INTO proactive_events
                (id, user_id, event_type, suggested_action, details, detected_at, acted, action_taken)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            ON CONFLICT (user_id, event_type) WHERE acted = false DO NOTHING
            "#,
        )
        .bind(event.id)
        .bind(event.user_id)
        .bind(event.event_type)
        .bind(&event.suggested_action)
        .bind(&event.details)
        .bind(event.detected_at)
        .bind(event.acted)
        .bind(&event.action_taken)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() == 1)
    }

    async fn pending_events(&self, user_id: Uuid, limit: i64) -> StoreResult<Vec<ProactiveEvent>> {
        Ok(sqlx::query_as::<_, ProactiveEvent>(
            r#"
            SELECT * FROM proactive_events
            WHERE user_id = $1 AND acted = false
            ORDER BY detected_at DESC
            LIMIT $2
            "#,
        )
        .bind(user_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?)
    }

    async fn get_event(&self, user_id: Uuid, id: Uuid) -> StoreResult<Option<ProactiveEvent>> {
        Ok(sqlx::query_as::<_, ProactiveEvent>(
            "SELECT * FROM proactive_events WHERE id = $1 AND user_id = $2",
        )
        .bind(id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?)
    }

    async fn update_event(&self, event: &ProactiveEvent) -> StoreResult<()> {
        sqlx::query(
            "UPDATE proactive_events SET acted = $3, action_taken = $4 WHERE id = $1 AND user_id = $2",
        )
        .bind(event.id)
        .bind(event.user_id)
        .bind(event.acted)
        .bind(&event.action_taken)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn insert_action_log(&self, log: &AgentActionLog) -> StoreResult<()> {
        sqlx::query(
            r#"
            INSERT INTO agent_action_logs
                (id, user_id, action_type, input_json, output_json, success, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(log.id)
        .bind(log.user_id)
        .bind(&log.action_type)
        .bind(&log.input_json)
        .bind(&log.output_json)
        .bind(log.success)
        .bind(log.created_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn recent_action_logs(
        &self,
        user_id: Uuid,
        limit: i64,
    ) -> StoreResult<Vec<AgentActionLog>> {
        Ok(sqlx::query_as::<_, AgentActionLog>(
            r#"
            SELECT * FROM agent_action_logs
            WHERE user_id = $1
            ORDER BY created_at DESC
            LIMIT $2
            "#,
        )
        .bind(user_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?)
    }

    async fn insert_chat_message(&self, message: &ChatMessage) -> StoreResult<()> {
        sqlx::query(
            r#"
            INSERT INTO chat_messages (id, user_id, role, content, metadata, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(message.id)
        .bind(message.user_id)
        .bind(message.role)
        .bind(&message.content)
        .bind(&message.metadata)
        .bind(message.created_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn recent_chat_messages(
        &self,
        user_id: Uuid,
        limit: i64,
    ) -> StoreResult<Vec<ChatMessage>> {
        let mut messages = sqlx::query_as::<_, ChatMessage>(
            r#"
            SELECT * FROM chat_messages
            WHERE user_id = $1
            ORDER BY created_at DESC
            LIMIT $2
            "#,
        )
        .bind(user_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        messages.reverse();
        Ok(messages)
    }
}

/// ILIKE pattern matching `text` literally anywhere in the column.
/// Pairs with `ESCAPE '\'`.
fn contains_pattern(text: &str) -> String {
    let mut pattern = String::with_capacity(text.len() + 2);
    pattern.push('%');
    for c in text.chars() {
        if matches!(c, '\\' | '%' | '_') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}
