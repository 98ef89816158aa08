use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Regulation {
    pub id: Uuid,
    pub title: String,
    pub category: String,
    pub reference_number: String,
    pub summary: String,
    pub content: String,
    pub issued_year: i32,
}

/// Free-text search and category filter; both optional and combinable.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct RegulationQuery {
    pub text: Option<String>,
    pub category: Option<String>,
}

impl RegulationQuery {
    pub fn matches(&self, regulation: &Regulation) -> bool {
        let category_ok = self
            .category
            .as_deref()
            .map(|c| regulation.category.eq_ignore_ascii_case(c))
            .unwrap_or(true);
        let text_ok = self
            .text
            .as_deref()
            .map(|t| {
                let needle = t.to_lowercase();
                [&regulation.title, &regulation.summary, &regulation.content]
                    .iter()
                    .any(|field| field.to_lowercase().contains(&needle))
            })
            .unwrap_or(true);
        category_ok && text_ok
    }
}
