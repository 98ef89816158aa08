use chrono::{NaiveDate, Utc};
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::resume::{Resume, ResumeCourse, ResumeWithCourses};
use crate::store::Store;
use crate::validation::require_text;

/// Partial update; absent fields keep their current value
/// (or an empty default when the resume is created).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ResumeUpdate {
    pub job_title: Option<String>,
    pub skills: Option<Vec<String>>,
    pub experience_years: Option<i32>,
    pub education: Option<String>,
    pub summary: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewCourse {
    pub course_name: String,
    pub provider: String,
    pub date_completed: Option<NaiveDate>,
    pub certificate_url: Option<String>,
}

pub async fn get_resume_with_courses(
    store: &dyn Store,
    user_id: Uuid,
) -> Result<Option<ResumeWithCourses>, AppError> {
    let Some(resume) = store.get_resume(user_id).await? else {
        return Ok(None);
    };
    let courses = store.list_courses(resume.id).await?;
    Ok(Some(ResumeWithCourses { resume, courses }))
}

/// Creates the user's resume if absent, otherwise mutates it in place.
pub async fn update_resume(
    store: &dyn Store,
    user_id: Uuid,
    update: ResumeUpdate,
) -> Result<Resume, AppError> {
    if update.experience_years.is_some_and(|y| y < 0) {
        return Err(AppError::validation("experience_years cannot be negative"));
    }
    let skills = update.skills.map(normalize_skills);

    match store.get_resume(user_id).await? {
        Some(mut resume) => {
            if let Some(job_title) = update.job_title {
                resume.job_title = job_title;
            }
            if let Some(skills) = skills {
                resume.skills = skills;
            }
            if let Some(years) = update.experience_years {
                resume.experience_years = years;
            }
            if let Some(education) = update.education {
                resume.education = education;
            }
            if let Some(summary) = update.summary {
                resume.summary = summary;
            }
            resume.updated_at = Utc::now();
            store.update_resume(&resume).await?;
            info!("Updated resume {} for user {user_id}", resume.id);
            Ok(resume)
        }
        None => {
            let draft = Resume {
                id: Uuid::new_v4(),
                user_id,
                job_title: update.job_title.unwrap_or_default(),
                skills: skills.unwrap_or_default(),
                experience_years: update.experience_years.unwrap_or(0),
                education: update.education.unwrap_or_default(),
                summary: update.summary.unwrap_or_default(),
                updated_at: Utc::now(),
            };
            let resume = store.insert_resume(&draft).await?;
            info!("Created resume {} for user {user_id}", resume.id);
            Ok(resume)
        }
    }
}

fn normalize_skills(skills: Vec<String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(skills.len());
    for skill in skills {
        let skill = skill.trim();
        if !skill.is_empty() && !out.iter().any(|s| s.eq_ignore_ascii_case(skill)) {
            out.push(skill.to_string());
        }
    }
    out
}

pub async fn list_courses(store: &dyn Store, user_id: Uuid) -> Result<Vec<ResumeCourse>, AppError> {
    match store.get_resume(user_id).await? {
        Some(resume) => store.list_courses(resume.id).await,
        None => Ok(Vec::new()),
    }
}

pub async fn add_course(
    store: &dyn Store,
    user_id: Uuid,
    input: NewCourse,
) -> Result<ResumeCourse, AppError> {
    let course_name = require_text("course_name", Some(&input.course_name))?;
    let provider = require_text("provider", Some(&input.provider))?;
    let resume = store
        .get_resume(user_id)
        .await?
        .ok_or_else(|| AppError::domain("Create a resume before adding courses"))?;

    let course = ResumeCourse {
        id: Uuid::new_v4(),
        resume_id: resume.id,
        course_name: course_name.to_string(),
        provider: provider.to_string(),
        date_completed: input.date_completed,
        certificate_url: input.certificate_url.filter(|u| !u.trim().is_empty()),
    };
    store.insert_course(&course).await?;
    Ok(course)
}

/// Deletes a course that belongs to the user's own resume.
pub async fn delete_course(
    store: &dyn Store,
    user_id: Uuid,
    course_id: Uuid,
) -> Result<(), AppError> {
    let not_found = || AppError::NotFound(format!("Course {course_id} not found"));
    let resume = store.get_resume(user_id).await?.ok_or_else(not_found)?;
    if !store.delete_course(resume.id, course_id).await? {
        return Err(not_found());
    }
    info!("Deleted course {course_id} from resume {}", resume.id);
    Ok(())
}
