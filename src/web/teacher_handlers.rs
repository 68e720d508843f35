// src/web/teacher_handlers.rs
use crate::{
    error::AppResult,
    models::teacher::{Teacher, TeacherForm},
    services::permissions,
    state::AppState,
    web::{csv_download, mw_auth::CurrentUser, mw_permission::ensure_can, SearchParams},
};
use axum::{
    extract::{Extension, Path, Query, State},
    http::StatusCode,
    response::Response,
    Json,
};

// GET /teachers?q=
pub async fn list_teachers(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Json<Vec<Teacher>> {
    Json(state.teachers.search(params.query()).await)
}

// POST /teachers
pub async fn create_teacher(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Json(form): Json<TeacherForm>,
) -> AppResult<(StatusCode, Json<Teacher>)> {
    ensure_can(&user, permissions::CREATE, permissions::TEACHERS)?;
    let teacher = state.teachers.add(form).await?;
    Ok((StatusCode::CREATED, Json(teacher)))
}

// PUT /teachers/{id}
pub async fn update_teacher(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<String>,
    Json(form): Json<TeacherForm>,
) -> AppResult<Json<Teacher>> {
    ensure_can(&user, permissions::UPDATE, permissions::TEACHERS)?;
    Ok(Json(state.teachers.update(&id, form).await?))
}

// DELETE /teachers/{id}
pub async fn delete_teacher(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<String>,
) -> AppResult<StatusCode> {
    ensure_can(&user, permissions::DELETE, permissions::TEACHERS)?;
    state.teachers.delete(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// GET /teachers/export
pub async fn export_teachers(State(state): State<AppState>) -> AppResult<Response> {
    let csv = state.teachers.export_csv().await?;
    Ok(csv_download("teachers.csv", csv))
}
