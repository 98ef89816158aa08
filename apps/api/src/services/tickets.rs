use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::ticket::{Ticket, TicketStatus};
use crate::store::Store;
use crate::validation::require_text;

#[derive(Debug, Clone, Deserialize)]
pub struct NewTicket {
    pub title: String,
    pub category: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TicketRef {
    pub ticket_id: Uuid,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TicketStatusView {
    pub ticket_id: Uuid,
    pub title: String,
    pub status: TicketStatus,
    pub age_days: i64,
}

pub async fn open_ticket(
    store: &dyn Store,
    user_id: Uuid,
    input: NewTicket,
) -> Result<Ticket, AppError> {
    let title = require_text("title", Some(&input.title))?;
    let category = require_text("category", Some(&input.category))?;
    let ticket = Ticket {
        id: Uuid::new_v4(),
        user_id,
        title: title.to_string(),
        category: category.to_string(),
        description: input.description.filter(|d| !d.trim().is_empty()),
        status: TicketStatus::Open,
        created_at: Utc::now(),
        closed_at: None,
    };
    store.insert_ticket(&ticket).await?;
    info!("Opened ticket {} for user {user_id}", ticket.id);
    Ok(ticket)
}

/// Closing is terminal; closing twice fails.
pub async fn close_ticket(
    store: &dyn Store,
    user_id: Uuid,
    ticket_id: Uuid,
) -> Result<Ticket, AppError> {
    let mut ticket = find_ticket(store, user_id, ticket_id).await?;
    if ticket.status == TicketStatus::Closed {
        return Err(AppError::domain("Ticket is already closed"));
    }
    ticket.status = TicketStatus::Closed;
    ticket.closed_at = Some(Utc::now());
    store.update_ticket(&ticket).await?;
    info!("Closed ticket {ticket_id} for user {user_id}");
    Ok(ticket)
}

pub async fn ticket_status(
    store: &dyn Store,
    user_id: Uuid,
    ticket_id: Uuid,
) -> Result<TicketStatusView, AppError> {
    let ticket = find_ticket(store, user_id, ticket_id).await?;
    let until = ticket.closed_at.unwrap_or_else(Utc::now);
    Ok(TicketStatusView {
        ticket_id: ticket.id,
        title: ticket.title,
        status: ticket.status,
        age_days: (until - ticket.created_at).num_days(),
    })
}

pub async fn list_tickets(store: &dyn Store, user_id: Uuid) -> Result<Vec<Ticket>, AppError> {
    store.list_tickets(user_id).await
}

async fn find_ticket(store: &dyn Store, user_id: Uuid, ticket_id: Uuid) -> Result<Ticket, AppError> {
    store
        .get_ticket(user_id, ticket_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Ticket {ticket_id} not found")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    fn wage_complaint() -> NewTicket {
        NewTicket {
            title: "Unpaid wages".to_string(),
            category: "complaint".to_string(),
            description: None,
        }
    }

    #[tokio::test]
    async fn test_close_twice() {
        let store = MemoryStore::new();
        let user = Uuid::new_v4();
        let ticket = open_ticket(&store, user, wage_complaint()).await.unwrap();
        assert_eq!(ticket.status, TicketStatus::Open);

        let closed = close_ticket(&store, user, ticket.id).await.unwrap();
        assert_eq!(closed.status, TicketStatus::Closed);
        assert!(closed.closed_at.is_some());

        let err = close_ticket(&store, user, ticket.id).await.unwrap_err();
        assert_eq!(err.to_string(), "Ticket is already closed");
        let after = store.get_ticket(user, ticket.id).await.unwrap().unwrap();
        assert_eq!(after, closed);
    }

    #[tokio::test]
    async fn test_status_view() {
        let store = MemoryStore::new();
        let user = Uuid::new_v4();
        let ticket = open_ticket(&store, user, wage_complaint()).await.unwrap();
        let view = ticket_status(&store, user, ticket.id).await.unwrap();
        assert_eq!(view.status, TicketStatus::Open);
        assert_eq!(view.age_days, 0);

        assert!(matches!(
            ticket_status(&store, Uuid::new_v4(), ticket.id).await,
            Err(AppError::NotFound(_))
        ));
    }
}
