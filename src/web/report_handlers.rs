// src/web/report_handlers.rs
use crate::{
    error::AppResult,
    models::report::{AttendanceReport, DashboardStats, ReportQuery},
    services::{dashboard_service, permissions, report_service},
    state::AppState,
    web::{csv_download, mw_auth::CurrentUser, mw_permission::ensure_can},
};
use axum::{
    extract::{Extension, Query, State},
    response::Response,
    Json,
};
use chrono::Local;

// GET /dashboard
pub async fn dashboard(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
) -> AppResult<Json<DashboardStats>> {
    let today = Local::now().date_naive();
    let stats = dashboard_service::dashboard(&user.0, &state.students, &state.attendance, today).await?;
    Ok(Json(stats))
}

// GET /reports?q=&class=&range=&from=&to=
pub async fn attendance_report(
    State(state): State<AppState>,
    Query(query): Query<ReportQuery>,
) -> AppResult<Json<AttendanceReport>> {
    let today = Local::now().date_naive();
    let report = report_service::build_report(&state.students, &state.attendance, &query, today).await?;
    Ok(Json(report))
}

// GET /reports/export
pub async fn export_report(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Query(query): Query<ReportQuery>,
) -> AppResult<Response> {
    ensure_can(&user, permissions::EXPORT, permissions::REPORTS)?;
    let today = Local::now().date_naive();
    let report = report_service::build_report(&state.students, &state.attendance, &query, today).await?;
    let file_name = format!("attendance_{}_{}.csv", report.range.start, report.range.end);
    Ok(csv_download(&file_name, report_service::export_csv(&report)?))
}
