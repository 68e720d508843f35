// src/web/mod.rs
pub mod attendance_handlers;
pub mod auth_handlers;
pub mod mw_auth;
pub mod mw_permission;
pub mod report_handlers;
pub mod routes;
pub mod settings_handlers;
pub mod student_handlers;
pub mod teacher_handlers;

use axum::{
    http::header,
    response::{IntoResponse, Response},
};
use serde::Deserialize;

// Parâmetro ?q= das listagens
#[derive(Debug, Default, Deserialize)]
pub struct SearchParams {
    #[serde(default)]
    q: String,
}

impl SearchParams {
    pub fn query(&self) -> &str {
        self.q.trim()
    }
}

/// Resposta CSV para descarregar como ficheiro.
pub fn csv_download(file_name: &str, body: String) -> Response {
    (
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", file_name),
            ),
        ],
        body,
    )
        .into_response()
}
