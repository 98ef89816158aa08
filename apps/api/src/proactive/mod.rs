//! Proactive trigger engine.
//!
//! Each trigger is a stateless check evaluated at a caller-supplied `now`.
//! Matches become `ProactiveEvent`s through the store's atomic
//! insert-if-absent, so at most one unacted event exists per
//! (user, event type) no matter how often or how concurrently checks run.
//! Periodic execution belongs to an external scheduler.

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use serde_json::{json, Value};
use tracing::info;
use uuid::Uuid;

use crate::config::TriggerSettings;
use crate::errors::AppError;
use crate::models::proactive::{EventType, ProactiveEvent};
use crate::store::Store;

/// Pending events shown to the user at once.
pub const PENDING_LIMIT: i64 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    StaleTicket,
    UpcomingAppointment,
    ContractExpiring,
}

impl Trigger {
    pub const ALL: [Trigger; 3] = [
        Trigger::StaleTicket,
        Trigger::UpcomingAppointment,
        Trigger::ContractExpiring,
    ];

    pub fn event_type(&self) -> EventType {
        match self {
            Trigger::StaleTicket => EventType::StaleTicket,
            Trigger::UpcomingAppointment => EventType::UpcomingAppointment,
            Trigger::ContractExpiring => EventType::ContractExpiring,
        }
    }
}

/// A single entity that satisfied a trigger condition.
#[derive(Debug, Clone, PartialEq)]
pub struct TriggerMatch {
    pub user_id: Uuid,
    pub suggested_action: String,
    pub details: Value,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct TriggerOutcome {
    pub event_type: EventType,
    pub matched: usize,
    pub created: usize,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct TriggerReport {
    pub outcomes: Vec<TriggerOutcome>,
    pub total_created: usize,
}

/// Finds entities matching `trigger` at `now`.
pub async fn find_matches(
    store: &dyn Store,
    trigger: Trigger,
    settings: &TriggerSettings,
    now: DateTime<Utc>,
) -> Result<Vec<TriggerMatch>, AppError> {
    settings.validate()?;
    let today = now.date_naive();
    let matches = match trigger {
        Trigger::StaleTicket => {
            let cutoff = now
                .checked_sub_signed(Duration::days(settings.stale_ticket_days))
                .ok_or_else(|| out_of_range("stale ticket cutoff"))?;
            store
                .open_tickets_created_before(cutoff)
                .await?
                .into_iter()
                .map(|t| TriggerMatch {
                    user_id: t.user_id,
                    suggested_action: format!(
                        "Your ticket \"{}\" has been open for more than {} days. Would you like to follow up or close it?",
                        t.title, settings.stale_ticket_days
                    ),
                    details: json!({
                        "ticket_id": t.id,
                        "open_days": (now - t.created_at).num_days(),
                    }),
                })
                .collect()
        }
        Trigger::UpcomingAppointment => {
            let until = today
                .checked_add_signed(Duration::days(settings.appointment_reminder_days))
                .ok_or_else(|| out_of_range("appointment reminder window"))?;
            store
                .scheduled_appointments_between(today, until)
                .await?
                .into_iter()
                .map(|a| TriggerMatch {
                    user_id: a.user_id,
                    suggested_action: format!(
                        "Reminder: your {} appointment is on {}. Reschedule or cancel if you cannot attend.",
                        a.appointment_type, a.appointment_date
                    ),
                    details: json!({
                        "appointment_id": a.id,
                        "appointment_date": a.appointment_date,
                    }),
                })
                .collect()
        }
        Trigger::ContractExpiring => {
            let until = today
                .checked_add_signed(Duration::days(settings.contract_expiry_days))
                .ok_or_else(|| out_of_range("contract expiry window"))?;
            store
                .active_contracts_ending_between(today, until)
                .await?
                .into_iter()
                .map(|c| TriggerMatch {
                    user_id: c.user_id,
                    suggested_action: format!(
                        "Your contract with {} ends on {}. Consider renewing it or requesting a service certificate.",
                        c.employer_name,
                        c.end_date.map(|d| d.to_string()).unwrap_or_default()
                    ),
                    details: json!({
                        "contract_id": c.id,
                        "end_date": c.end_date,
                    }),
                })
                .collect()
        }
    };
    Ok(matches)
}

fn out_of_range(what: &str) -> AppError {
    AppError::Internal(anyhow::anyhow!("{what} is outside the supported date range"))
}

/// Runs one trigger check and persists new events.
pub async fn run_trigger(
    store: &dyn Store,
    trigger: Trigger,
    settings: &TriggerSettings,
    now: DateTime<Utc>,
) -> Result<TriggerOutcome, AppError> {
    let matches = find_matches(store, trigger, settings, now).await?;
    let mut created = 0;
    for m in &matches {
        let event = ProactiveEvent {
            id: Uuid::new_v4(),
            user_id: m.user_id,
            event_type: trigger.event_type(),
            suggested_action: m.suggested_action.clone(),
            details: m.details.clone(),
            detected_at: now,
            acted: false,
            action_taken: None,
        };
        if store.insert_event_if_absent(&event).await? {
            created += 1;
        }
    }
    Ok(TriggerOutcome {
        event_type: trigger.event_type(),
        matched: matches.len(),
        created,
    })
}

/// Runs every trigger in sequence.
pub async fn run_all(
    store: &dyn Store,
    settings: &TriggerSettings,
    now: DateTime<Utc>,
) -> Result<TriggerReport, AppError> {
    let mut outcomes = Vec::with_capacity(Trigger::ALL.len());
    for trigger in Trigger::ALL {
        outcomes.push(run_trigger(store, trigger, settings, now).await?);
    }
    let total_created = outcomes.iter().map(|o| o.created).sum();
    info!("Proactive run complete: {total_created} new event(s)");
    Ok(TriggerReport {
        outcomes,
        total_created,
    })
}

/// Unacted events for display, newest first.
pub async fn pending_events(
    store: &dyn Store,
    user_id: Uuid,
) -> Result<Vec<ProactiveEvent>, AppError> {
    store.pending_events(user_id, PENDING_LIMIT).await
}

/// Records the user's response to an event. Events never expire on their own.
pub async fn mark_acted(
    store: &dyn Store,
    user_id: Uuid,
    event_id: Uuid,
    action_taken: &str,
) -> Result<ProactiveEvent, AppError> {
    let mut event = store
        .get_event(user_id, event_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Event {event_id} not found")))?;
    if event.acted {
        return Err(AppError::domain("Event has already been acted upon"));
    }
    event.acted = true;
    event.action_taken = Some(action_taken.to_string());
    store.update_event(&event).await?;
    info!(
        "User {user_id} acted on {} event {event_id}",
        event.event_type.as_str()
    );
    Ok(event)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::appointment::{AppointmentStatus, LaborAppointment};
    use crate::models::contract::{ContractStatus, EmploymentContract};
    use crate::models::ticket::{Ticket, TicketStatus};
    use crate::store::MemoryStore;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 15, 9, 0, 0).unwrap()
    }

    fn ticket(user_id: Uuid, age_days: i64, status: TicketStatus) -> Ticket {
        Ticket {
            id: Uuid::new_v4(),
            user_id,
            title: "Work permit delay".to_string(),
            category: "inquiry".to_string(),
            description: None,
            status,
            created_at: now() - Duration::days(age_days),
            closed_at: None,
        }
    }

    #[tokio::test]
    async fn test_stale_ticket_threshold() {
        let store = MemoryStore::new();
        let settings = TriggerSettings::default();
        let old = Uuid::new_v4();
        let fresh = Uuid::new_v4();
        let closed = Uuid::new_v4();
        store.insert_ticket(&ticket(old, 10, TicketStatus::Open)).await.unwrap();
        store.insert_ticket(&ticket(fresh, 2, TicketStatus::Open)).await.unwrap();
        store.insert_ticket(&ticket(closed, 30, TicketStatus::Closed)).await.unwrap();

        let matches = find_matches(&store, Trigger::StaleTicket, &settings, now())
            .await
            .unwrap();
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].user_id, old);
        assert_eq!(matches[0].details["open_days"], 10);
    }

    #[tokio::test]
    async fn test_running_twice_creates_one_event() {
        let store = MemoryStore::new();
        let settings = TriggerSettings::default();
        let user = Uuid::new_v4();
        // two stale tickets for the same user still yield one pending event
        store.insert_ticket(&ticket(user, 10, TicketStatus::Open)).await.unwrap();
        store.insert_ticket(&ticket(user, 20, TicketStatus::Open)).await.unwrap();

        let first = run_trigger(&store, Trigger::StaleTicket, &settings, now())
            .await
            .unwrap();
        let second = run_trigger(&store, Trigger::StaleTicket, &settings, now())
            .await
            .unwrap();

        assert_eq!(first.matched, 2);
        assert_eq!(first.created, 1);
        assert_eq!(second.created, 0);
        assert_eq!(pending_events(&store, user).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_acting_allows_redetection() {
        let store = MemoryStore::new();
        let settings = TriggerSettings::default();
        let user = Uuid::new_v4();
        store.insert_ticket(&ticket(user, 10, TicketStatus::Open)).await.unwrap();

        run_all(&store, &settings, now()).await.unwrap();
        let pending = pending_events(&store, user).await.unwrap();
        let acted = mark_acted(&store, user, pending[0].id, "dismissed").await.unwrap();
        assert!(acted.acted);
        assert_eq!(acted.action_taken.as_deref(), Some("dismissed"));
        assert!(pending_events(&store, user).await.unwrap().is_empty());

        assert!(matches!(
            mark_acted(&store, user, pending[0].id, "again").await,
            Err(AppError::Domain(_))
        ));

        let report = run_all(&store, &settings, now()).await.unwrap();
        assert_eq!(report.total_created, 1);
    }

    #[tokio::test]
    async fn test_oversized_threshold_is_an_error() {
        let store = MemoryStore::new();
        let settings = TriggerSettings {
            contract_expiry_days: 100_000_000,
            ..TriggerSettings::default()
        };
        assert!(matches!(
            run_all(&store, &settings, Utc::now()).await,
            Err(AppError::Internal(_))
        ));

        let negative = TriggerSettings {
            stale_ticket_days: -1,
            ..TriggerSettings::default()
        };
        let user = Uuid::new_v4();
        store.insert_ticket(&ticket(user, 0, TicketStatus::Open)).await.unwrap();
        assert!(run_all(&store, &negative, now()).await.is_err());
        assert!(pending_events(&store, user).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_date_at_calendar_edge_is_an_error() {
        let store = MemoryStore::new();
        let settings = TriggerSettings::default();
        let edge = DateTime::<Utc>::MAX_UTC;
        assert!(matches!(
            find_matches(&store, Trigger::ContractExpiring, &settings, edge).await,
            Err(AppError::Internal(_))
        ));
    }

    #[tokio::test]
    async fn test_upcoming_appointment_and_expiring_contract() {
        let store = MemoryStore::new();
        let settings = TriggerSettings::default();
        let user = Uuid::new_v4();
        let today = now().date_naive();

        store
            .insert_appointment(&LaborAppointment {
                id: Uuid::new_v4(),
                user_id: user,
                appointment_type: "consultation".to_string(),
                appointment_date: today + Duration::days(1),
                notes: None,
                status: AppointmentStatus::Scheduled,
                created_at: now(),
            })
            .await
            .unwrap();
        store
            .insert_appointment(&LaborAppointment {
                id: Uuid::new_v4(),
                user_id: user,
                appointment_type: "inspection".to_string(),
                appointment_date: today + Duration::days(10),
                notes: None,
                status: AppointmentStatus::Scheduled,
                created_at: now(),
            })
            .await
            .unwrap();
        store
            .insert_contract(&EmploymentContract {
                id: Uuid::new_v4(),
                user_id: user,
                employer_name: "Irbid Foods".to_string(),
                position: "Driver".to_string(),
                salary: 420.0,
                start_date: today - Duration::days(300),
                end_date: Some(today + Duration::days(20)),
                status: ContractStatus::Active,
                created_at: now(),
            })
            .await
            .unwrap();

        let report = run_all(&store, &settings, now()).await.unwrap();
        let by_type = |t: EventType| {
            report
                .outcomes
                .iter()
                .find(|o| o.event_type == t)
                .cloned()
                .unwrap()
        };
        assert_eq!(by_type(EventType::UpcomingAppointment).matched, 1);
        assert_eq!(by_type(EventType::ContractExpiring).created, 1);
        assert_eq!(by_type(EventType::StaleTicket).matched, 0);
        assert_eq!(report.total_created, 2);
    }

    #[tokio::test]
    async fn test_pending_excludes_acted_newest_first() {
        let store = MemoryStore::new();
        let user = Uuid::new_v4();
        // each stale event is acted before the next insert, except the last
        for i in 0..8 {
            let event = ProactiveEvent {
                id: Uuid::new_v4(),
                user_id: user,
                event_type: EventType::StaleTicket,
                suggested_action: format!("event {i}"),
                details: json!({}),
                detected_at: now() + Duration::minutes(i),
                acted: false,
                action_taken: None,
            };
            store.insert_event_if_absent(&event).await.unwrap();
            if i < 7 {
                mark_acted(&store, user, event.id, "seen").await.unwrap();
            }
        }
        let types = [EventType::UpcomingAppointment, EventType::ContractExpiring];
        for (i, t) in types.into_iter().enumerate() {
            store
                .insert_event_if_absent(&ProactiveEvent {
                    id: Uuid::new_v4(),
                    user_id: user,
                    event_type: t,
                    suggested_action: "x".to_string(),
                    details: json!({}),
                    detected_at: now() + Duration::hours(1 + i as i64),
                    acted: false,
                    action_taken: None,
                })
                .await
                .unwrap();
        }

        let pending = pending_events(&store, user).await.unwrap();
        assert_eq!(pending.len(), 3);
        assert!(pending.iter().all(|e| !e.acted));
        assert!(pending
            .windows(2)
            .all(|w| w[0].detected_at >= w[1].detected_at));
        assert_eq!(pending[0].event_type, EventType::ContractExpiring);
    }

    #[tokio::test]
    async fn test_store_limit_truncates_pending() {
        let store = MemoryStore::new();
        let user = Uuid::new_v4();
        for t in [
            EventType::StaleTicket,
            EventType::UpcomingAppointment,
            EventType::ContractExpiring,
        ] {
            store
                .insert_event_if_absent(&ProactiveEvent {
                    id: Uuid::new_v4(),
                    user_id: user,
                    event_type: t,
                    suggested_action: "x".to_string(),
                    details: json!({}),
                    detected_at: now(),
                    acted: false,
                    action_taken: None,
                })
                .await
                .unwrap();
        }
        assert_eq!(store.pending_events(user, 2).await.unwrap().len(), 2);
        assert_eq!(pending_events(&store, user).await.unwrap().len(), 3);
    }
}
