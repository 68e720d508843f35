// src/web/mw_permission.rs
use crate::{
    error::{AppError, AppResult},
    services::permissions::{self, Capability},
    web::mw_auth::CurrentUser,
};
use axum::{
    extract::{Extension, Request, State},
    middleware::Next,
    response::Response,
};

/// Recusa com 403 quando o utilizador não tem a capacidade.
pub fn ensure_can(user: &CurrentUser, action: &str, subject: &str) -> AppResult<()> {
    if permissions::check_permission(Some(&user.0), action, subject) {
        Ok(())
    } else {
        tracing::warn!(
            "Permissão negada: {} ({}) tentou '{}' em '{}'",
            user.0.email,
            user.0.role,
            action,
            subject
        );
        Err(AppError::forbidden(action, subject))
    }
}

/// Middleware por grupo de rotas. Deve correr *depois* de `require_auth`.
pub async fn require_capability(
    State(required): State<Capability>,
    Extension(user): Extension<CurrentUser>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    ensure_can(&user, required.action, required.subject)?;
    tracing::debug!(
        "Permissão MW: '{}' em '{}' concedida a {}",
        required.action,
        required.subject,
        user.0.email
    );
    Ok(next.run(request).await)
}
