use chrono::Utc;
use serde::Deserialize;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::profile::UserProfile;
use crate::store::Store;
use crate::validation::require_text;

#[derive(Debug, Clone, Deserialize)]
pub struct ProfileInput {
    pub full_name: String,
    pub phone: Option<String>,
    pub national_id: Option<String>,
}

pub async fn get_profile(store: &dyn Store, user_id: Uuid) -> Result<Option<UserProfile>, AppError> {
    store.get_profile(user_id).await
}

/// Creates the profile on first visit; later calls update name and contact details.
pub async fn upsert_profile(
    store: &dyn Store,
    user_id: Uuid,
    input: ProfileInput,
) -> Result<UserProfile, AppError> {
    let full_name = require_text("full_name", Some(&input.full_name))?;
    let profile = UserProfile {
        user_id,
        full_name: full_name.to_string(),
        phone: input.phone.filter(|p| !p.trim().is_empty()),
        national_id: input.national_id.filter(|n| !n.trim().is_empty()),
        created_at: Utc::now(),
    };
    store.upsert_profile(&profile).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    #[tokio::test]
    async fn test_upsert_keeps_single_profile() {
        let store = MemoryStore::new();
        let user = Uuid::new_v4();
        let first = upsert_profile(
            &store,
            user,
            ProfileInput {
                full_name: "Sara Ali".to_string(),
                phone: None,
                national_id: None,
            },
        )
        .await
        .unwrap();
        let second = upsert_profile(
            &store,
            user,
            ProfileInput {
                full_name: "Sara A. Ali".to_string(),
                phone: Some("0790000000".to_string()),
                national_id: None,
            },
        )
        .await
        .unwrap();

        assert_eq!(second.created_at, first.created_at);
        assert_eq!(second.full_name, "Sara A. Ali");
        assert_eq!(store.counts().await.profiles, 1);
    }

    #[tokio::test]
    async fn test_missing_profile_is_none() {
        let store = MemoryStore::new();
        assert!(get_profile(&store, Uuid::new_v4()).await.unwrap().is_none());
    }
}
