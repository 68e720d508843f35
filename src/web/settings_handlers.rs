// src/web/settings_handlers.rs
use crate::{
    error::AppResult,
    models::settings::{AllSettings, Catalog, CatalogEntry, SchoolSettings},
    services::{permissions, settings_service},
    state::AppState,
    web::{mw_auth::CurrentUser, mw_permission::ensure_can},
};
use axum::{
    extract::{Extension, Path, State},
    Json,
};

// GET /settings
pub async fn show_settings(State(state): State<AppState>) -> AppResult<Json<AllSettings>> {
    Ok(Json(settings_service::load(state.settings_store.as_ref()).await?))
}

// PUT /settings
pub async fn save_settings(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Json(settings): Json<AllSettings>,
) -> AppResult<Json<AllSettings>> {
    ensure_can(&user, permissions::UPDATE, permissions::SETTINGS)?;
    settings_service::save(state.settings_store.as_ref(), &settings).await?;
    Ok(Json(settings))
}

// POST /settings/reset
pub async fn reset_settings(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
) -> AppResult<Json<AllSettings>> {
    ensure_can(&user, permissions::UPDATE, permissions::SETTINGS)?;
    Ok(Json(settings_service::reset(state.settings_store.as_ref()).await?))
}

// POST /settings/{catalog}
pub async fn add_catalog_entry(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(catalog): Path<Catalog>,
    Json(entry): Json<CatalogEntry>,
) -> AppResult<Json<SchoolSettings>> {
    ensure_can(&user, permissions::UPDATE, permissions::SETTINGS)?;
    let school =
        settings_service::add_catalog_entry(state.settings_store.as_ref(), catalog, &entry.value).await?;
    Ok(Json(school))
}

// DELETE /settings/{catalog}/{value}
pub async fn remove_catalog_entry(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path((catalog, value)): Path<(Catalog, String)>,
) -> AppResult<Json<SchoolSettings>> {
    ensure_can(&user, permissions::UPDATE, permissions::SETTINGS)?;
    let school =
        settings_service::remove_catalog_entry(state.settings_store.as_ref(), catalog, &value).await?;
    Ok(Json(school))
}
