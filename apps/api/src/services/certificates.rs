use chrono::{NaiveDate, Utc};
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::certificate::{Certificate, CertificateType};
use crate::models::contract::EmploymentContract;
use crate::models::profile::UserProfile;
use crate::store::Store;

#[derive(Debug, Clone, Deserialize)]
pub struct CertificateRequest {
    pub certificate_type: String,
}

const ISSUER: &str = "Ministry of Labor, Citizen Services";

pub async fn list_certificates(
    store: &dyn Store,
    user_id: Uuid,
) -> Result<Vec<Certificate>, AppError> {
    store.list_certificates(user_id).await
}

/// Issues a certificate from the profile and the latest active contract.
/// Profile and contract are read separately; a contract ended between the
/// read and the insert still yields a certificate.
pub async fn generate_certificate(
    store: &dyn Store,
    user_id: Uuid,
    request: CertificateRequest,
) -> Result<Certificate, AppError> {
    let certificate_type = CertificateType::parse(request.certificate_type.trim()).ok_or_else(|| {
        AppError::validation(format!(
            "certificate_type must be one of: {}",
            CertificateType::ALL.map(|t| t.as_str()).join(", ")
        ))
    })?;

    let profile = store
        .get_profile(user_id)
        .await?
        .ok_or_else(|| AppError::domain("No profile found; complete registration first"))?;
    let contract = store
        .latest_active_contract(user_id)
        .await?
        .ok_or_else(|| AppError::domain("No active employment contract found"))?;

    let issue_date = Utc::now().date_naive();
    let certificate = Certificate {
        id: Uuid::new_v4(),
        user_id,
        contract_id: contract.id,
        certificate_type,
        content: render_certificate(certificate_type, &profile, &contract, issue_date),
        issue_date,
    };
    store.insert_certificate(&certificate).await?;
    info!(
        "Issued {} certificate {} for user {user_id}",
        certificate_type.as_str(),
        certificate.id
    );
    Ok(certificate)
}

/// Renders certificate text. Pure: output depends only on the arguments.
pub fn render_certificate(
    certificate_type: CertificateType,
    profile: &UserProfile,
    contract: &EmploymentContract,
    issue_date: NaiveDate,
) -> String {
    let national_id = profile.national_id.as_deref().unwrap_or("not provided");
    let start = contract.start_date.format("%Y-%m-%d");

    let body = match certificate_type {
        CertificateType::SalaryDefinition => format!(
            "This is to certify that {name} (national ID: {national_id}) is employed by \
             {employer} in the position of {position} since {start}, with a monthly salary \
             of {salary:.2}.\n\nThis letter is issued at the employee's request and carries \
             no liability towards third parties.",
            name = profile.full_name,
            employer = contract.employer_name,
            position = contract.position,
            salary = contract.salary,
        ),
        CertificateType::ServiceCertificate => {
            let until = contract
                .end_date
                .map(|d| d.format("%Y-%m-%d").to_string())
                .unwrap_or_else(|| "the present date".to_string());
            format!(
                "This is to certify that {name} (national ID: {national_id}) has served at \
                 {employer} as {position} from {start} until {until}.\n\nThis certificate \
                 is issued for whatever purpose it may serve.",
                name = profile.full_name,
                employer = contract.employer_name,
                position = contract.position,
            )
        }
        CertificateType::LaborLicense => format!(
            "The holder, {name} (national ID: {national_id}), is licensed to work as \
             {position} for {employer} under the contract registered on {start}.\n\nThis \
             license is valid while the registered contract remains active.",
            name = profile.full_name,
            employer = contract.employer_name,
            position = contract.position,
        ),
    };

    format!(
        "{title}\n{ISSUER}\nIssue date: {date}\n\n{body}\n",
        title = certificate_type.title().to_uppercase(),
        date = issue_date.format("%Y-%m-%d"),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::contract::ContractStatus;
    use crate::services::contracts::{create_contract, end_contract, NewContract};
    use crate::services::profiles::{upsert_profile, ProfileInput};
    use crate::store::MemoryStore;

    fn profile() -> UserProfile {
        UserProfile {
            user_id: Uuid::new_v4(),
            full_name: "Omar Haddad".to_string(),
            phone: None,
            national_id: Some("9981012345".to_string()),
            created_at: Utc::now(),
        }
    }

    fn contract(user_id: Uuid) -> EmploymentContract {
        EmploymentContract {
            id: Uuid::new_v4(),
            user_id,
            employer_name: "Zarqa Textiles".to_string(),
            position: "Machine Operator".to_string(),
            salary: 480.5,
            start_date: NaiveDate::from_ymd_opt(2021, 9, 15).unwrap(),
            end_date: None,
            status: ContractStatus::Active,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_render_differs_only_in_issue_date() {
        let p = profile();
        let c = contract(p.user_id);
        let d1 = NaiveDate::from_ymd_opt(2025, 1, 10).unwrap();
        let d2 = NaiveDate::from_ymd_opt(2025, 6, 30).unwrap();
        for kind in CertificateType::ALL {
            let a = render_certificate(kind, &p, &c, d1);
            let b = render_certificate(kind, &p, &c, d2);
            assert_ne!(a, b);
            assert_eq!(a.replace("2025-01-10", "<date>"), b.replace("2025-06-30", "<date>"));
        }
    }

    #[test]
    fn test_salary_letter_mentions_salary() {
        let p = profile();
        let c = contract(p.user_id);
        let text = render_certificate(
            CertificateType::SalaryDefinition,
            &p,
            &c,
            NaiveDate::from_ymd_opt(2025, 2, 1).unwrap(),
        );
        assert!(text.starts_with("SALARY DEFINITION LETTER"));
        assert!(text.contains("480.50"));
        assert!(text.contains("Omar Haddad"));
    }

    async fn registered_user(store: &MemoryStore) -> Uuid {
        let user = Uuid::new_v4();
        upsert_profile(
            store,
            user,
            ProfileInput {
                full_name: "Lina Saleh".to_string(),
                phone: None,
                national_id: None,
            },
        )
        .await
        .unwrap();
        user
    }

    fn new_contract(employer: &str) -> NewContract {
        NewContract {
            employer_name: employer.to_string(),
            position: "Accountant".to_string(),
            salary: 900.0,
            start_date: NaiveDate::from_ymd_opt(2020, 1, 1).unwrap(),
            end_date: None,
        }
    }

    #[tokio::test]
    async fn test_requires_active_contract() {
        let store = MemoryStore::new();
        let user = registered_user(&store).await;
        let err = generate_certificate(
            &store,
            user,
            CertificateRequest {
                certificate_type: "salary_definition".to_string(),
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, AppError::Domain(_)));
        assert_eq!(store.counts().await.certificates, 0);
    }

    #[tokio::test]
    async fn test_uses_latest_active_contract() {
        let store = MemoryStore::new();
        let user = registered_user(&store).await;
        create_contract(&store, user, new_contract("First Co")).await.unwrap();
        let second = create_contract(&store, user, new_contract("Second Co"))
            .await
            .unwrap();

        let cert = generate_certificate(
            &store,
            user,
            CertificateRequest {
                certificate_type: "service_certificate".to_string(),
            },
        )
        .await
        .unwrap();
        assert_eq!(cert.contract_id, second.id);
        assert!(cert.content.contains("Second Co"));

        end_contract(&store, user, second.id).await.unwrap();
        let cert = generate_certificate(
            &store,
            user,
            CertificateRequest {
                certificate_type: "labor_license".to_string(),
            },
        )
        .await
        .unwrap();
        assert!(cert.content.contains("First Co"));
    }

    #[tokio::test]
    async fn test_rejects_unknown_type() {
        let store = MemoryStore::new();
        let user = registered_user(&store).await;
        let err = generate_certificate(
            &store,
            user,
            CertificateRequest {
                certificate_type: "birth_certificate".to_string(),
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }
}
