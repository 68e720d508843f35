// src/web/mw_auth.rs
use crate::{error::AppError, models::user::User, services::auth_service::AuthSession};
use axum::{extract::Request, middleware::Next, response::Response};
use tower_sessions::Session;

/// Utilizador autenticado, posto nas extensões do pedido por `require_auth`.
#[derive(Clone, Debug)]
pub struct CurrentUser(pub User);

// Middleware que verifica se há um utilizador na sessão
pub async fn require_auth(
    session: Session,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let auth = AuthSession::restore(session).await?;

    match auth.into_user() {
        Some(user) => {
            tracing::debug!("Autenticação MW: '{}' ({}) autenticado.", user.email, user.role);
            request.extensions_mut().insert(CurrentUser(user));
            Ok(next.run(request).await)
        }
        None => {
            tracing::debug!("Autenticação MW: pedido sem sessão para {}", request.uri().path());
            Err(AppError::Unauthorized)
        }
    }
}
