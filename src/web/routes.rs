// src/web/routes.rs
use crate::{
    services::permissions::{self, Capability},
    state::AppState,
    web::{
        attendance_handlers, auth_handlers, mw_auth, mw_permission, report_handlers,
        settings_handlers, student_handlers, teacher_handlers,
    },
};
use axum::{
    middleware,
    routing::{delete, get, post, put},
    Router,
};

// Acesso mínimo a um grupo de rotas
fn view(subject: &'static str) -> Capability {
    Capability {
        action: permissions::VIEW,
        subject,
    }
}

/// Aplica a verificação `view <subject>` a um grupo de rotas.
fn gated(routes: Router<AppState>, subject: &'static str) -> Router<AppState> {
    routes.route_layer(middleware::from_fn_with_state(
        view(subject),
        mw_permission::require_capability,
    ))
}

pub fn create_router(app_state: AppState) -> Router {
    // --- Rotas Públicas ---
    let public_routes = Router::new()
        .route("/login", post(auth_handlers::handle_login))
        .route("/logout", post(auth_handlers::handle_logout))
        .route("/session", get(auth_handlers::show_session));

    let dashboard_routes = gated(
        Router::new().route("/", get(report_handlers::dashboard)),
        permissions::DASHBOARD,
    );

    let attendance_routes = gated(
        Router::new()
            .route("/", get(attendance_handlers::list_attendance))
            .route("/scan", post(attendance_handlers::scan))
            .route("/ws", get(attendance_handlers::attendance_websocket_handler))
            .route(
                "/{id}",
                put(attendance_handlers::update_status).delete(attendance_handlers::delete_record),
            ),
        permissions::ATTENDANCE,
    );

    let student_routes = gated(
        Router::new()
            .route(
                "/",
                get(student_handlers::list_students).post(student_handlers::create_student),
            )
            .route("/import", post(student_handlers::import_students))
            .route("/export", get(student_handlers::export_students))
            .route("/template", get(student_handlers::import_template))
            .route(
                "/{id}",
                put(student_handlers::update_student).delete(student_handlers::delete_student),
            )
            .route("/{id}/card", get(student_handlers::student_card)),
        permissions::STUDENTS,
    );

    let teacher_routes = gated(
        Router::new()
            .route(
                "/",
                get(teacher_handlers::list_teachers).post(teacher_handlers::create_teacher),
            )
            .route("/export", get(teacher_handlers::export_teachers))
            .route(
                "/{id}",
                put(teacher_handlers::update_teacher).delete(teacher_handlers::delete_teacher),
            ),
        permissions::TEACHERS,
    );

    let report_routes = gated(
        Router::new()
            .route("/", get(report_handlers::attendance_report))
            .route("/export", get(report_handlers::export_report)),
        permissions::REPORTS,
    );

    let settings_routes = gated(
        Router::new()
            .route(
                "/",
                get(settings_handlers::show_settings).put(settings_handlers::save_settings),
            )
            .route("/reset", post(settings_handlers::reset_settings))
            .route("/{catalog}", post(settings_handlers::add_catalog_entry))
            .route("/{catalog}/{value}", delete(settings_handlers::remove_catalog_entry)),
        permissions::SETTINGS,
    );

    // --- Rotas Autenticadas ---
    // require_auth corre antes das verificações de cada grupo
    let authenticated_routes = Router::new()
        .nest("/dashboard", dashboard_routes)
        .nest("/attendance", attendance_routes)
        .nest("/students", student_routes)
        .nest("/teachers", teacher_routes)
        .nest("/reports", report_routes)
        .nest("/settings", settings_routes)
        .route_layer(middleware::from_fn(mw_auth::require_auth));

    Router::new()
        .merge(public_routes)
        .merge(authenticated_routes)
        .with_state(app_state)
}
