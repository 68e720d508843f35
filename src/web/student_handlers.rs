// src/web/student_handlers.rs
use crate::{
    error::{AppError, AppResult},
    models::student::{ImportSummary, NewStudent, Student, StudentCard, StudentUpdate},
    services::{permissions, settings_service, student_service},
    state::AppState,
    web::{csv_download, mw_auth::CurrentUser, mw_permission::ensure_can, SearchParams},
};
use axum::{
    extract::{Extension, Path, Query, State},
    http::StatusCode,
    response::Response,
    Json,
};

// GET /students?q=
pub async fn list_students(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Json<Vec<Student>> {
    Json(state.students.search(params.query()).await)
}

// POST /students
pub async fn create_student(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Json(new): Json<NewStudent>,
) -> AppResult<(StatusCode, Json<Student>)> {
    ensure_can(&user, permissions::CREATE, permissions::STUDENTS)?;
    let student = state.students.add(new).await?;
    Ok((StatusCode::CREATED, Json(student)))
}

// PUT /students/{id}
pub async fn update_student(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<String>,
    Json(update): Json<StudentUpdate>,
) -> AppResult<Json<Student>> {
    ensure_can(&user, permissions::UPDATE, permissions::STUDENTS)?;
    Ok(Json(state.students.update(&id, update).await?))
}

// DELETE /students/{id}
pub async fn delete_student(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<String>,
) -> AppResult<StatusCode> {
    ensure_can(&user, permissions::DELETE, permissions::STUDENTS)?;
    state.students.delete(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// GET /students/{id}/card
pub async fn student_card(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<StudentCard>> {
    let student = state
        .students
        .find(&id)
        .await
        .ok_or_else(|| AppError::NotFound(format!("aluno {}", id)))?;
    let school = settings_service::load_school(state.settings_store.as_ref()).await?;
    Ok(Json(student_service::student_card(&student, &school.school_name)))
}

// POST /students/import (corpo: CSV)
pub async fn import_students(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    body: String,
) -> AppResult<(StatusCode, Json<ImportSummary>)> {
    ensure_can(&user, permissions::CREATE, permissions::STUDENTS)?;
    let summary = state.students.import_csv(body.as_bytes()).await?;
    Ok((StatusCode::CREATED, Json(summary)))
}

// GET /students/export
pub async fn export_students(State(state): State<AppState>) -> AppResult<Response> {
    let csv = state.students.export_csv().await?;
    Ok(csv_download("students.csv", csv))
}

// GET /students/template
pub async fn import_template() -> AppResult<Response> {
    let csv = student_service::import_template_csv()?;
    Ok(csv_download("students_template.csv", csv))
}
