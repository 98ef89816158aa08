use chrono::Utc;
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::domestic_labor::{
    DomesticLaborRequest, DomesticRequestStatus, DomesticRequestType,
};
use crate::store::Store;
use crate::validation::require_text;

#[derive(Debug, Clone, Deserialize)]
pub struct NewDomesticRequest {
    pub request_type: DomesticRequestType,
    pub worker_nationality: String,
    pub worker_profession: String,
    pub notes: Option<String>,
}

pub async fn create_request(
    store: &dyn Store,
    user_id: Uuid,
    input: NewDomesticRequest,
) -> Result<DomesticLaborRequest, AppError> {
    let nationality = require_text("worker_nationality", Some(&input.worker_nationality))?;
    let profession = require_text("worker_profession", Some(&input.worker_profession))?;
    let request = DomesticLaborRequest {
        id: Uuid::new_v4(),
        user_id,
        request_type: input.request_type,
        worker_nationality: nationality.to_string(),
        worker_profession: profession.to_string(),
        notes: input.notes.filter(|n| !n.trim().is_empty()),
        status: DomesticRequestStatus::Pending,
        created_at: Utc::now(),
    };
    store.insert_domestic_request(&request).await?;
    info!("Created domestic labor request {} for user {user_id}", request.id);
    Ok(request)
}

pub async fn list_requests(
    store: &dyn Store,
    user_id: Uuid,
) -> Result<Vec<DomesticLaborRequest>, AppError> {
    store.list_domestic_requests(user_id).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    #[tokio::test]
    async fn test_created_pending_and_scoped_to_user() {
        let store = MemoryStore::new();
        let user = Uuid::new_v4();
        let request = create_request(
            &store,
            user,
            NewDomesticRequest {
                request_type: DomesticRequestType::Recruitment,
                worker_nationality: "Philippines".to_string(),
                worker_profession: "Housekeeper".to_string(),
                notes: Some(" ".to_string()),
            },
        )
        .await
        .unwrap();

        assert_eq!(request.status, DomesticRequestStatus::Pending);
        assert_eq!(request.notes, None);
        assert_eq!(list_requests(&store, user).await.unwrap().len(), 1);
        assert!(list_requests(&store, Uuid::new_v4()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_blank_profession_rejected() {
        let store = MemoryStore::new();
        let err = create_request(
            &store,
            Uuid::new_v4(),
            NewDomesticRequest {
                request_type: DomesticRequestType::Transfer,
                worker_nationality: "Kenya".to_string(),
                worker_profession: "".to_string(),
                notes: None,
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }
}
