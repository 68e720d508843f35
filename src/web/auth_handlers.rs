// src/web/auth_handlers.rs
use crate::{
    error::{AppError, AppResult},
    models::user::{LoginForm, SessionView},
    services::{auth_service::AuthSession, permissions},
    state::AppState,
};
use axum::{extract::State, Json};
use tower_sessions::Session;

fn session_view(auth: &AuthSession<Session>) -> SessionView {
    SessionView {
        user: auth.user().cloned(),
        permissions: permissions::effective_permissions(auth.user()),
    }
}

// POST /login
pub async fn handle_login(
    State(state): State<AppState>,
    session: Session,
    Json(form): Json<LoginForm>,
) -> AppResult<Json<SessionView>> {
    tracing::info!("Tentativa de login para: {}", form.email);

    let mut auth = AuthSession::restore(session.clone()).await?;
    auth.sign_in(&state.credentials, &form.email, &form.password)
        .await?;

    // Novo ID de sessão depois do login
    session
        .cycle_id()
        .await
        .map_err(|e| AppError::SessionError(format!("Falha ao rodar ID: {}", e)))?;

    Ok(Json(session_view(&auth)))
}

// POST /logout
pub async fn handle_logout(session: Session) -> AppResult<Json<SessionView>> {
    let mut auth = AuthSession::restore(session.clone()).await?;
    auth.sign_out().await?;

    session
        .delete()
        .await
        .map_err(|e| AppError::SessionError(format!("Falha ao apagar sessão: {}", e)))?;

    Ok(Json(session_view(&auth)))
}

// GET /session
pub async fn show_session(session: Session) -> AppResult<Json<SessionView>> {
    let auth = AuthSession::restore(session).await?;
    Ok(Json(session_view(&auth)))
}
