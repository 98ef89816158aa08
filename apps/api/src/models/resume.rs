use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// One resume per user; updates mutate the existing row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Resume {
    pub id: Uuid,
    pub user_id: Uuid,
    pub job_title: String,
    pub skills: Vec<String>,
    pub experience_years: i32,
    pub education: String,
    pub summary: String,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct ResumeCourse {
    pub id: Uuid,
    pub resume_id: Uuid,
    pub course_name: String,
    pub provider: String,
    pub date_completed: Option<NaiveDate>,
    pub certificate_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResumeWithCourses {
    pub resume: Resume,
    pub courses: Vec<ResumeCourse>,
}
