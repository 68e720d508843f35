// src/state.rs
use crate::{
    config::AppConfig,
    services::{
        attendance_service::{AttendanceLog, AttendancePolicy},
        auth_service::CredentialTable,
        storage::KeyValueStore,
        student_service::StudentRoster,
        teacher_service::TeacherRoster,
    },
};
use axum::extract::ws::Message;
use std::{collections::HashMap, sync::Arc};
use tokio::sync::{
    mpsc::{self, error::TrySendError},
    Mutex,
};
use uuid::Uuid;

// Canal de saída de uma conexão WebSocket
type WsTx = mpsc::Sender<Message>;

/// Conexões abertas no feed de presenças (`/attendance/ws`).
#[derive(Debug, Clone, Default)]
pub struct AttendanceFeed {
    connections: Arc<Mutex<HashMap<Uuid, WsTx>>>,
}

impl AttendanceFeed {
    pub async fn register(&self, conn_id: Uuid, tx: WsTx) {
        self.connections.lock().await.insert(conn_id, tx);
    }

    pub async fn unregister(&self, conn_id: &Uuid) {
        self.connections.lock().await.remove(conn_id);
    }

    /// Envia a mensagem para todas as conexões ativas sem bloquear.
    /// Um cliente com a fila cheia perde a mensagem; um canal fechado sai do registo.
    pub async fn broadcast(&self, message_text: String) {
        let senders: Vec<(Uuid, WsTx)> = self
            .connections
            .lock()
            .await
            .iter()
            .map(|(id, tx)| (*id, tx.clone()))
            .collect();

        let message = Message::Text(message_text.into());
        let mut closed = Vec::new();
        for (conn_id, tx) in senders {
            match tx.try_send(message.clone()) {
                Ok(()) => {}
                Err(TrySendError::Full(_)) => {
                    tracing::warn!("Fila WS de {} cheia, mensagem descartada.", conn_id);
                }
                Err(TrySendError::Closed(_)) => closed.push(conn_id),
            }
        }

        if !closed.is_empty() {
            let mut connections = self.connections.lock().await;
            for conn_id in &closed {
                connections.remove(conn_id);
                tracing::debug!("Conexão WS {} fechada, removida do feed.", conn_id);
            }
        }
    }
}

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub credentials: Arc<CredentialTable>,
    pub settings_store: Arc<dyn KeyValueStore>,
    pub students: Arc<StudentRoster>,
    pub teachers: Arc<TeacherRoster>,
    pub attendance: Arc<AttendanceLog>,
    pub attendance_feed: AttendanceFeed,
}

impl AppState {
    /// Estado com as listas de demonstração e um registo de presenças vazio.
    pub fn new(
        config: AppConfig,
        credentials: CredentialTable,
        settings_store: Arc<dyn KeyValueStore>,
    ) -> Self {
        Self {
            config: Arc::new(config),
            credentials: Arc::new(credentials),
            settings_store,
            students: Arc::new(StudentRoster::seeded()),
            teachers: Arc::new(TeacherRoster::seeded()),
            attendance: Arc::new(AttendanceLog::new()),
            attendance_feed: AttendanceFeed::default(),
        }
    }

    pub fn attendance_policy(&self) -> AttendancePolicy {
        AttendancePolicy {
            late_after: self.config.late_after,
            lookup_delay: self.config.lookup_delay,
        }
    }
}
