// src/web/attendance_handlers.rs
use crate::{
    error::AppResult,
    models::attendance::{
        AttendanceFilter, AttendanceRecord, AttendanceSocketUpdate, RecordedAttendance,
        ScanRequest, StatusUpdate,
    },
    services::{attendance_service, permissions},
    state::AppState,
    web::{mw_auth::CurrentUser, mw_permission::ensure_can},
};
use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        Extension, Path, Query, State,
    },
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::Local;
use futures_util::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use uuid::Uuid;

// GET /attendance?date=&class=&status=
pub async fn list_attendance(
    State(state): State<AppState>,
    Query(filter): Query<AttendanceFilter>,
) -> AppResult<Json<Vec<AttendanceRecord>>> {
    let records = state.attendance.list(&filter).await?;
    Ok(Json(records))
}

// POST /attendance/scan
pub async fn scan(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Json(request): Json<ScanRequest>,
) -> AppResult<(StatusCode, Json<RecordedAttendance>)> {
    ensure_can(&user, permissions::CREATE, permissions::ATTENDANCE)?;
    let recorded = attendance_service::record_attendance(
        &state.students,
        &state.attendance,
        &request,
        Local::now().naive_local(),
        state.attendance_policy(),
    )
    .await?;

    // Os clientes do feed também recebem as marcações feitas por HTTP
    publish(&state, &success_update(&recorded, &request.civil_id, &user.0.name)).await;

    Ok((StatusCode::CREATED, Json(recorded)))
}

// PUT /attendance/{id}
pub async fn update_status(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<String>,
    Json(update): Json<StatusUpdate>,
) -> AppResult<Json<AttendanceRecord>> {
    ensure_can(&user, permissions::UPDATE, permissions::ATTENDANCE)?;
    let record = state.attendance.update_status(&id, update.status).await?;
    Ok(Json(record))
}

// DELETE /attendance/{id}
pub async fn delete_record(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<String>,
) -> AppResult<StatusCode> {
    ensure_can(&user, permissions::DELETE, permissions::ATTENDANCE)?;
    state.attendance.delete(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// --- WebSocket (GET /attendance/ws) ---

pub async fn attendance_websocket_handler(
    ws: WebSocketUpgrade,
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
) -> AppResult<impl IntoResponse> {
    ensure_can(&user, permissions::CREATE, permissions::ATTENDANCE)?;
    let operator = user.0.name;
    tracing::info!("Upgrade WebSocket de presenças pedido por {}", operator);
    Ok(ws.on_upgrade(move |socket| handle_socket(socket, state, operator)))
}

async fn handle_socket(socket: WebSocket, state: AppState, operator: String) {
    let conn_id = Uuid::new_v4();
    tracing::info!("🔌 Nova conexão WS de presenças: {} (Operador: {})", conn_id, operator);

    let (mut ws_sender, mut ws_receiver) = socket.split();
    let (tx, mut rx) = mpsc::channel::<Message>(32);
    state.attendance_feed.register(conn_id, tx).await;

    // Canal -> cliente
    let feed = state.attendance_feed.clone();
    let mut send_task = tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            if ws_sender.send(msg).await.is_err() {
                tracing::warn!("Falha ao enviar msg WS para {}, terminando send_task.", conn_id);
                break;
            }
        }
        feed.unregister(&conn_id).await;
    });

    // Cliente -> marcação -> broadcast
    let recv_state = state.clone();
    let mut recv_task = tokio::spawn(async move {
        while let Some(Ok(msg)) = ws_receiver.next().await {
            match msg {
                Message::Text(text) => {
                    tracing::debug!("<- WS Presenças recebido de {}: {}", conn_id, text);
                    let request = match serde_json::from_str::<ScanRequest>(&text) {
                        Ok(request) => request,
                        Err(e) => {
                            tracing::warn!("Mensagem WS inválida: {}, Erro: {}", text, e);
                            continue;
                        }
                    };

                    let update = process_scan(&recv_state, &request, &operator).await;
                    publish(&recv_state, &update).await;
                }
                Message::Close(_) => {
                    tracing::info!("Cliente {} enviou Close frame.", conn_id);
                    break;
                }
                _ => tracing::trace!("Ignorando msg WS não-texto de {}", conn_id),
            }
        }
    });

    tokio::select! {
        _ = (&mut send_task) => recv_task.abort(),
        _ = (&mut recv_task) => send_task.abort(),
    };

    state.attendance_feed.unregister(&conn_id).await;
    tracing::info!("🔌 Conexão WS de presenças {} fechada.", conn_id);
}

/// Envia o update a todos os clientes do feed.
async fn publish(state: &AppState, update: &AttendanceSocketUpdate) {
    match serde_json::to_string(update) {
        Ok(text) => {
            tracing::debug!("-> WS Presenças broadcast: {}", text);
            state.attendance_feed.broadcast(text).await;
        }
        Err(e) => tracing::error!("Erro ao serializar update WS: {:?}", e),
    }
}

fn success_update(recorded: &RecordedAttendance, civil_id: &str, operator: &str) -> AttendanceSocketUpdate {
    AttendanceSocketUpdate {
        success: true,
        message: format!(
            "{} registado(a) como {} por {}",
            recorded.student.name, recorded.record.status, operator
        ),
        civil_id: civil_id.to_string(),
        operator: operator.to_string(),
        record: Some(recorded.record.clone()),
        student_name: Some(recorded.student.name.clone()),
    }
}

/// Executa uma marcação pedida pelo socket. Devolve sempre um update (sucesso ou erro).
async fn process_scan(state: &AppState, request: &ScanRequest, operator: &str) -> AttendanceSocketUpdate {
    let result = attendance_service::record_attendance(
        &state.students,
        &state.attendance,
        request,
        Local::now().naive_local(),
        state.attendance_policy(),
    )
    .await;

    match result {
        Ok(recorded) => success_update(&recorded, &request.civil_id, operator),
        Err(e) => {
            tracing::warn!("Marcação WS falhou para {}: {}", request.civil_id, e);
            AttendanceSocketUpdate {
                success: false,
                message: e.to_string(),
                civil_id: request.civil_id.clone(),
                operator: operator.to_string(),
                ..Default::default()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        config::AppConfig,
        models::user::{User, UserRole},
        services::{
            auth_service::{CredentialTable, TEST_BCRYPT_COST},
            storage::MemoryKvStore,
        },
    };
    use serde_json::Value;
    use std::{sync::Arc, time::Duration};

    async fn test_state() -> AppState {
        let config = AppConfig {
            lookup_delay: Duration::ZERO,
            ..Default::default()
        };
        let credentials = CredentialTable::demo(TEST_BCRYPT_COST).await.unwrap();
        AppState::new(config, credentials, Arc::new(MemoryKvStore::new()))
    }

    fn operator() -> CurrentUser {
        CurrentUser(User {
            id: "3".into(),
            email: "assistant@school.com".into(),
            role: UserRole::Assistant,
            name: "خالد الفارسي".into(),
            permissions: None,
        })
    }

    fn scan_request(civil_id: &str) -> ScanRequest {
        ScanRequest {
            civil_id: civil_id.to_string(),
            source: Default::default(),
        }
    }

    async fn next_json(rx: &mut mpsc::Receiver<Message>) -> Value {
        match rx.recv().await {
            Some(Message::Text(text)) => serde_json::from_str(&text).unwrap(),
            other => panic!("mensagem inesperada: {:?}", other),
        }
    }

    #[tokio::test]
    async fn feed_scan_reports_success_and_failure() {
        let state = test_state().await;

        let ok = process_scan(&state, &scan_request("1234567890"), "خالد الفارسي").await;
        assert!(ok.success);
        assert_eq!(ok.student_name.as_deref(), Some("أحمد محمد"));
        assert_eq!(ok.record.as_ref().map(|r| r.student_id.as_str()), Some("s1"));

        let unknown = process_scan(&state, &scan_request("00000000"), "خالد الفارسي").await;
        assert!(!unknown.success);
        assert!(unknown.record.is_none());
        assert_eq!(unknown.civil_id, "00000000");
        assert!(!unknown.message.is_empty());

        assert_eq!(state.attendance.all().await.len(), 1);
    }

    #[tokio::test]
    async fn published_updates_reach_every_client() {
        let state = test_state().await;
        let (tx_a, mut rx_a) = mpsc::channel(4);
        let (tx_b, mut rx_b) = mpsc::channel(4);
        state.attendance_feed.register(Uuid::new_v4(), tx_a).await;
        state.attendance_feed.register(Uuid::new_v4(), tx_b).await;

        let failed = process_scan(&state, &scan_request("00000000"), "op").await;
        publish(&state, &failed).await;
        for rx in [&mut rx_a, &mut rx_b] {
            let update = next_json(rx).await;
            assert_eq!(update["success"], false);
            assert_eq!(update["operator"], "op");
        }
    }

    #[tokio::test]
    async fn http_scan_is_broadcast_to_the_feed() {
        let state = test_state().await;
        let (tx_a, mut rx_a) = mpsc::channel(4);
        let (tx_b, mut rx_b) = mpsc::channel(4);
        state.attendance_feed.register(Uuid::new_v4(), tx_a).await;
        state.attendance_feed.register(Uuid::new_v4(), tx_b).await;

        let (status, Json(recorded)) = scan(
            State(state.clone()),
            Extension(operator()),
            Json(scan_request("2345678901")),
        )
        .await
        .unwrap();
        assert_eq!(status, StatusCode::CREATED);

        for rx in [&mut rx_a, &mut rx_b] {
            let update = next_json(rx).await;
            assert_eq!(update["success"], true);
            assert_eq!(update["civil_id"], "2345678901");
            assert_eq!(update["operator"], "خالد الفارسي");
            assert_eq!(update["student_name"], "سارة عبدالله");
            assert_eq!(update["record"]["id"], Value::String(recorded.record.id.clone()));
        }
    }
}
