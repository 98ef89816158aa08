use axum::extract::{Path, State};

use crate::models::resume::{Resume, ResumeCourse, ResumeWithCourses};
use crate::routes::{ok, ok_message, ApiJson, ApiQuery, ApiResult, UserBody, UserQuery};
use crate::services::resumes::{self, NewCourse, ResumeUpdate};
use crate::state::AppState;
use crate::validation::parse_uuid_field;

/// GET /api/resume?user_id=
pub async fn handle_get_resume(
    State(state): State<AppState>,
    ApiQuery(params): ApiQuery<UserQuery>,
) -> ApiResult<Option<ResumeWithCourses>> {
    let user_id = params.user()?;
    ok(resumes::get_resume_with_courses(state.store.as_ref(), user_id).await?)
}

/// PUT /api/resume
/// Creates the resume on first save; later saves only touch the fields sent.
pub async fn handle_update_resume(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<UserBody<ResumeUpdate>>,
) -> ApiResult<Resume> {
    let (user_id, input) = req.into_parts()?;
    ok(resumes::update_resume(state.store.as_ref(), user_id, input).await?)
}

/// GET /api/resume/courses?user_id=
pub async fn handle_list_courses(
    State(state): State<AppState>,
    ApiQuery(params): ApiQuery<UserQuery>,
) -> ApiResult<Vec<ResumeCourse>> {
    let user_id = params.user()?;
    ok(resumes::list_courses(state.store.as_ref(), user_id).await?)
}

/// POST /api/resume/courses
pub async fn handle_add_course(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<UserBody<NewCourse>>,
) -> ApiResult<ResumeCourse> {
    let (user_id, input) = req.into_parts()?;
    ok(resumes::add_course(state.store.as_ref(), user_id, input).await?)
}

/// DELETE /api/resume/courses/:id?user_id=
pub async fn handle_delete_course(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ApiQuery(params): ApiQuery<UserQuery>,
) -> ApiResult<()> {
    let user_id = params.user()?;
    let course_id = parse_uuid_field("course_id", &id)?;
    resumes::delete_course(state.store.as_ref(), user_id, course_id).await?;
    ok_message("Course deleted")
}
