use chrono::{NaiveDate, Utc};
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::appointment::{AppointmentStatus, LaborAppointment};
use crate::store::Store;
use crate::validation::require_text;

#[derive(Debug, Clone, Deserialize)]
pub struct NewAppointment {
    pub appointment_type: String,
    pub appointment_date: NaiveDate,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppointmentRef {
    pub appointment_id: Uuid,
}

pub async fn list_appointments(
    store: &dyn Store,
    user_id: Uuid,
) -> Result<Vec<LaborAppointment>, AppError> {
    store.list_appointments(user_id).await
}

pub async fn book_appointment(
    store: &dyn Store,
    user_id: Uuid,
    input: NewAppointment,
) -> Result<LaborAppointment, AppError> {
    let appointment_type = require_text("appointment_type", Some(&input.appointment_type))?;
    let appointment = LaborAppointment {
        id: Uuid::new_v4(),
        user_id,
        appointment_type: appointment_type.to_string(),
        appointment_date: input.appointment_date,
        notes: input.notes.filter(|n| !n.trim().is_empty()),
        status: AppointmentStatus::Scheduled,
        created_at: Utc::now(),
    };
    store.insert_appointment(&appointment).await?;
    info!(
        "Booked {} appointment {} on {} for user {user_id}",
        appointment.appointment_type, appointment.id, appointment.appointment_date
    );
    Ok(appointment)
}

pub async fn cancel_appointment(
    store: &dyn Store,
    user_id: Uuid,
    appointment_id: Uuid,
) -> Result<LaborAppointment, AppError> {
    transition(store, user_id, appointment_id, AppointmentStatus::Cancelled).await
}

pub async fn complete_appointment(
    store: &dyn Store,
    user_id: Uuid,
    appointment_id: Uuid,
) -> Result<LaborAppointment, AppError> {
    transition(store, user_id, appointment_id, AppointmentStatus::Completed).await
}

/// Only `scheduled` may move; cancelled and completed are terminal.
async fn transition(
    store: &dyn Store,
    user_id: Uuid,
    appointment_id: Uuid,
    target: AppointmentStatus,
) -> Result<LaborAppointment, AppError> {
    let mut appointment = store
        .get_appointment(user_id, appointment_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Appointment {appointment_id} not found")))?;

    if appointment.status != AppointmentStatus::Scheduled {
        return Err(AppError::domain(format!(
            "Appointment is already {}",
            appointment.status.as_str()
        )));
    }

    appointment.status = target;
    store.update_appointment(&appointment).await?;
    info!(
        "Appointment {appointment_id} for user {user_id} is now {}",
        target.as_str()
    );
    Ok(appointment)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    fn consultation() -> NewAppointment {
        NewAppointment {
            appointment_type: "consultation".to_string(),
            appointment_date: NaiveDate::from_ymd_opt(2025, 12, 1).unwrap(),
            notes: None,
        }
    }

    #[tokio::test]
    async fn test_book_is_scheduled() {
        let store = MemoryStore::new();
        let user = Uuid::new_v4();
        let appt = book_appointment(&store, user, consultation()).await.unwrap();
        assert_eq!(appt.status, AppointmentStatus::Scheduled);
        assert_eq!(list_appointments(&store, user).await.unwrap(), vec![appt]);
    }

    #[tokio::test]
    async fn test_cancel_twice() {
        let store = MemoryStore::new();
        let user = Uuid::new_v4();
        let appt = book_appointment(&store, user, consultation()).await.unwrap();

        let cancelled = cancel_appointment(&store, user, appt.id).await.unwrap();
        assert_eq!(cancelled.status, AppointmentStatus::Cancelled);

        let err = cancel_appointment(&store, user, appt.id).await.unwrap_err();
        assert_eq!(err.to_string(), "Appointment is already cancelled");
        let after = store.get_appointment(user, appt.id).await.unwrap().unwrap();
        assert_eq!(after, cancelled);
    }

    #[tokio::test]
    async fn test_complete_twice_and_cancel_after_complete() {
        let store = MemoryStore::new();
        let user = Uuid::new_v4();
        let appt = book_appointment(&store, user, consultation()).await.unwrap();

        complete_appointment(&store, user, appt.id).await.unwrap();
        assert!(matches!(
            complete_appointment(&store, user, appt.id).await,
            Err(AppError::Domain(_))
        ));
        assert!(matches!(
            cancel_appointment(&store, user, appt.id).await,
            Err(AppError::Domain(_))
        ));
        let after = store.get_appointment(user, appt.id).await.unwrap().unwrap();
        assert_eq!(after.status, AppointmentStatus::Completed);
    }

    #[tokio::test]
    async fn test_blank_type_rejected() {
        let store = MemoryStore::new();
        let mut input = consultation();
        input.appointment_type = "  ".to_string();
        assert!(matches!(
            book_appointment(&store, Uuid::new_v4(), input).await,
            Err(AppError::Validation(_))
        ));
    }
}
