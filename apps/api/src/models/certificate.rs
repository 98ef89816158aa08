use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(type_name = "text", rename_all = "snake_case")]
pub enum CertificateType {
    SalaryDefinition,
    ServiceCertificate,
    LaborLicense,
}

impl CertificateType {
    pub const ALL: [CertificateType; 3] = [
        CertificateType::SalaryDefinition,
        CertificateType::ServiceCertificate,
        CertificateType::LaborLicense,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CertificateType::SalaryDefinition => "salary_definition",
            CertificateType::ServiceCertificate => "service_certificate",
            CertificateType::LaborLicense => "labor_license",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.as_str() == raw)
    }

    pub fn title(&self) -> &'static str {
        match self {
            CertificateType::SalaryDefinition => "Salary Definition Letter",
            CertificateType::ServiceCertificate => "Certificate of Service",
            CertificateType::LaborLicense => "Labor License",
        }
    }
}

/// Issued certificates are immutable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Certificate {
    pub id: Uuid,
    pub user_id: Uuid,
    pub contract_id: Uuid,
    pub certificate_type: CertificateType,
    pub content: String,
    pub issue_date: NaiveDate,
}
