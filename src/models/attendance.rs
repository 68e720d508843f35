// src/models/attendance.rs
use crate::models::student::Student;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttendanceStatus {
    Present,
    Late,
    Absent,
}

impl fmt::Display for AttendanceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let token = match self {
            AttendanceStatus::Present => "present",
            AttendanceStatus::Late => "late",
            AttendanceStatus::Absent => "absent",
        };
        f.write_str(token)
    }
}

/// Um registo de presença, criado a cada leitura QR ou entrada manual.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttendanceRecord {
    pub id: String,
    pub student_id: String,
    pub date: String, // YYYY-MM-DD
    pub time: String, // HH:MM:SS
    pub class: String,
    pub status: AttendanceStatus,
}

/// Origem da identificação do aluno.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScanSource {
    Qr,
    #[default]
    Manual,
}

// Payload de POST /attendance/scan e das mensagens WebSocket
#[derive(Debug, Clone, Deserialize)]
pub struct ScanRequest {
    pub civil_id: String,
    #[serde(default)]
    pub source: ScanSource,
}

/// Resultado de uma marcação: o aluno encontrado e o registo criado.
#[derive(Debug, Clone, Serialize)]
pub struct RecordedAttendance {
    pub student: Student,
    pub record: AttendanceRecord,
}

/// Filtro da listagem de registos. `status=all` equivale a não filtrar.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AttendanceFilter {
    pub date: Option<String>,
    pub class: Option<String>,
    pub status: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct StatusUpdate {
    pub status: AttendanceStatus,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttendanceStats {
    pub present: usize,
    pub late: usize,
    pub absent: usize,
    pub total: usize,
}

/// Atualização enviada pelo servidor a todos os clientes do feed de presenças.
#[derive(Debug, Serialize, Clone, Default)]
pub struct AttendanceSocketUpdate {
    pub success: bool,
    pub message: String,
    pub civil_id: String,
    pub operator: String,
    pub record: Option<AttendanceRecord>,
    pub student_name: Option<String>,
}
