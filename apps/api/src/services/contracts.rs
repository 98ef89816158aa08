use chrono::{NaiveDate, Utc};
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::contract::{ContractStatus, EmploymentContract};
use crate::store::Store;
use crate::validation::require_text;

#[derive(Debug, Clone, Deserialize)]
pub struct NewContract {
    pub employer_name: String,
    pub position: String,
    pub salary: f64,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ContractRef {
    pub contract_id: Uuid,
}

pub async fn list_contracts(
    store: &dyn Store,
    user_id: Uuid,
) -> Result<Vec<EmploymentContract>, AppError> {
    store.list_contracts(user_id).await
}

pub async fn create_contract(
    store: &dyn Store,
    user_id: Uuid,
    input: NewContract,
) -> Result<EmploymentContract, AppError> {
    let employer_name = require_text("employer_name", Some(&input.employer_name))?;
    let position = require_text("position", Some(&input.position))?;
    if !input.salary.is_finite() || input.salary < 0.0 {
        return Err(AppError::validation("salary must be a non-negative number"));
    }
    if let Some(end) = input.end_date {
        if end < input.start_date {
            return Err(AppError::validation("end_date cannot be before start_date"));
        }
    }

    let contract = EmploymentContract {
        id: Uuid::new_v4(),
        user_id,
        employer_name: employer_name.to_string(),
        position: position.to_string(),
        salary: input.salary,
        start_date: input.start_date,
        end_date: input.end_date,
        status: ContractStatus::Active,
        created_at: Utc::now(),
    };
    store.insert_contract(&contract).await?;
    info!("Created contract {} for user {user_id}", contract.id);
    Ok(contract)
}

/// Ends an active contract. Ending is one-way; a second call fails.
pub async fn end_contract(
    store: &dyn Store,
    user_id: Uuid,
    contract_id: Uuid,
) -> Result<EmploymentContract, AppError> {
    let mut contract = store
        .get_contract(user_id, contract_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Contract {contract_id} not found")))?;

    if contract.status == ContractStatus::Ended {
        return Err(AppError::domain("Contract is already ended"));
    }

    contract.status = ContractStatus::Ended;
    if contract.end_date.is_none() {
        contract.end_date = Some(Utc::now().date_naive());
    }
    store.update_contract(&contract).await?;
    info!("Ended contract {contract_id} for user {user_id}");
    Ok(contract)
}
