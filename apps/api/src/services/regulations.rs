use uuid::Uuid;

use crate::errors::AppError;
use crate::models::regulation::{Regulation, RegulationQuery};
use crate::store::Store;

/// A catalogue entry in `'static` form. The same rows are inserted by
/// `migrations/0002_seed_regulations.sql`.
pub struct SeedRegulation {
    pub id: Uuid,
    pub title: &'static str,
    pub category: &'static str,
    pub reference_number: &'static str,
    pub summary: &'static str,
    pub content: &'static str,
    pub issued_year: i32,
}

impl SeedRegulation {
    pub fn to_regulation(&self) -> Regulation {
        Regulation {
            id: self.id,
            title: self.title.to_string(),
            category: self.category.to_string(),
            reference_number: self.reference_number.to_string(),
            summary: self.summary.to_string(),
            content: self.content.to_string(),
            issued_year: self.issued_year,
        }
    }
}

pub const CATALOGUE: &[SeedRegulation] = &[
    SeedRegulation {
        id: Uuid::from_u128(0x5e3d0000_0000_4000_8000_000000000001),
        title: "Annual Leave Entitlement",
        category: "leave",
        reference_number: "LAB-LV-001",
        summary: "Paid annual leave for workers.",
        content: "Every worker is entitled to fourteen days of paid annual leave per year of service, rising to twenty-one days after five years with the same employer. Unused leave may be carried over to the following year only with the employer's written agreement.",
        issued_year: 2019,
    },
    SeedRegulation {
        id: Uuid::from_u128(0x5e3d0000_0000_4000_8000_000000000002),
        title: "Sick Leave",
        category: "leave",
        reference_number: "LAB-LV-002",
        summary: "Paid sick leave on a medical report.",
        content: "A worker is entitled to fourteen days of paid sick leave per year on presentation of a report from an approved physician. A further fourteen days are paid when the worker is admitted to hospital.",
        issued_year: 2019,
    },
    SeedRegulation {
        id: Uuid::from_u128(0x5e3d0000_0000_4000_8000_000000000003),
        title: "Maternity Leave",
        category: "leave",
        reference_number: "LAB-LV-003",
        summary: "Paid maternity leave and protection from dismissal.",
        content: "A female worker is entitled to ten weeks of fully paid maternity leave, of which at least six weeks must be taken after delivery. Dismissal during maternity leave is prohibited.",
        issued_year: 2023,
    },
    SeedRegulation {
        id: Uuid::from_u128(0x5e3d0000_0000_4000_8000_000000000004),
        title: "Minimum Wage",
        category: "wages",
        reference_number: "LAB-WG-001",
        summary: "The national minimum monthly wage.",
        content: "The national minimum monthly wage applies to all workers covered by the labor law, including non-national workers. Wages must be paid no later than seven days after they fall due.",
        issued_year: 2024,
    },
    SeedRegulation {
        id: Uuid::from_u128(0x5e3d0000_0000_4000_8000_000000000005),
        title: "Overtime Compensation",
        category: "wages",
        reference_number: "LAB-WG-002",
        summary: "Overtime rates on working days and rest days.",
        content: "Overtime on regular working days is paid at 125% of the normal hourly wage. Work on weekly rest days or official holidays is paid at 150%. Overtime requires the worker's consent.",
        issued_year: 2021,
    },
    SeedRegulation {
        id: Uuid::from_u128(0x5e3d0000_0000_4000_8000_000000000006),
        title: "Working Hours and Rest Days",
        category: "working_hours",
        reference_number: "LAB-WH-001",
        summary: "Daily and weekly limits on working time.",
        content: "Normal working hours may not exceed eight hours a day or forty-eight hours a week, excluding meal and rest breaks. Every worker is entitled to one paid weekly rest day.",
        issued_year: 2019,
    },
    SeedRegulation {
        id: Uuid::from_u128(0x5e3d0000_0000_4000_8000_000000000007),
        title: "Notice and End-of-Service Compensation",
        category: "termination",
        reference_number: "LAB-TR-001",
        summary: "Notice periods and end-of-service pay.",
        content: "An employer who ends an indefinite contract must give the worker at least one month's written notice. Workers not covered by social security receive end-of-service compensation of one month's wage per year of service.",
        issued_year: 2020,
    },
    SeedRegulation {
        id: Uuid::from_u128(0x5e3d0000_0000_4000_8000_000000000008),
        title: "Domestic Worker Contracts",
        category: "domestic_labor",
        reference_number: "LAB-DL-001",
        summary: "Obligations of employers of domestic workers.",
        content: "Employers of domestic workers must register a written contract with the ministry and pay wages monthly by bank transfer. Withholding a domestic worker's passport or identity documents is prohibited.",
        issued_year: 2020,
    },
    SeedRegulation {
        id: Uuid::from_u128(0x5e3d0000_0000_4000_8000_000000000009),
        title: "Work Permits for Non-National Workers",
        category: "work_permits",
        reference_number: "LAB-WP-001",
        summary: "When a work permit is required and how it is renewed.",
        content: "Non-national workers require a valid work permit issued by the ministry before starting work. A permit is tied to the employer and profession stated on the application and must be renewed every year.",
        issued_year: 2022,
    },
    SeedRegulation {
        id: Uuid::from_u128(0x5e3d0000_0000_4000_8000_00000000000a),
        title: "Occupational Safety",
        category: "safety",
        reference_number: "LAB-OS-001",
        summary: "Protective equipment and injury reporting.",
        content: "Employers must provide protective equipment and safety training suited to the hazards of the workplace free of charge. Work injuries must be reported to the ministry within seven days.",
        issued_year: 2021,
    },
];

/// Owned copy of [`CATALOGUE`], used to seed stores without a database.
pub fn catalogue() -> Vec<Regulation> {
    CATALOGUE.iter().map(SeedRegulation::to_regulation).collect()
}

/// Lists regulations, optionally narrowed by free text and/or category.
/// Blank parameters are treated as absent.
pub async fn search_regulations(
    store: &dyn Store,
    text: Option<&str>,
    category: Option<&str>,
) -> Result<Vec<Regulation>, AppError> {
    let clean = |v: Option<&str>| v.map(str::trim).filter(|v| !v.is_empty()).map(String::from);
    let query = RegulationQuery {
        text: clean(text),
        category: clean(category),
    };
    store.search_regulations(&query).await
}

pub async fn get_regulation(store: &dyn Store, id: Uuid) -> Result<Regulation, AppError> {
    store
        .get_regulation(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Regulation {id} not found")))
}
