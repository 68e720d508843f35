// src/services/attendance_service.rs
use crate::{
    error::{AppError, AppResult},
    models::{
        attendance::{
            AttendanceFilter, AttendanceRecord, AttendanceStatus, RecordedAttendance, ScanRequest,
            ScanSource,
        },
        student::Student,
    },
    services::student_service::StudentRoster,
};
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use std::time::Duration;
use tokio::sync::RwLock;
use uuid::Uuid;

pub const MIN_CIVIL_ID_LEN: usize = 5;

/// Regras de marcação: hora de corte do atraso e atraso simulado da consulta.
#[derive(Debug, Clone, Copy)]
pub struct AttendancePolicy {
    pub late_after: NaiveTime,
    pub lookup_delay: Duration,
}

pub fn validate_civil_id(civil_id: &str) -> AppResult<&str> {
    let civil_id = civil_id.trim();
    if civil_id.chars().count() < MIN_CIVIL_ID_LEN {
        return Err(AppError::Validation(format!(
            "número civil inválido (mínimo {} caracteres)",
            MIN_CIVIL_ID_LEN
        )));
    }
    Ok(civil_id)
}

/// O QR do cartão contém "<civil_id>-<nome>"; só interessa o número civil.
pub fn civil_id_from_qr(payload: &str) -> &str {
    match payload.split_once('-') {
        Some((civil_id, _)) => civil_id,
        None => payload,
    }
}

/// Atraso a partir da hora de corte (inclusive).
pub fn classify(time: NaiveTime, late_after: NaiveTime) -> AttendanceStatus {
    if time >= late_after {
        AttendanceStatus::Late
    } else {
        AttendanceStatus::Present
    }
}

/// Registos de presença em memória.
#[derive(Default)]
pub struct AttendanceLog {
    records: RwLock<Vec<AttendanceRecord>>,
}

impl AttendanceLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn push(&self, record: AttendanceRecord) {
        self.records.write().await.push(record);
    }

    pub async fn all(&self) -> Vec<AttendanceRecord> {
        self.records.read().await.clone()
    }

    pub async fn list(&self, filter: &AttendanceFilter) -> AppResult<Vec<AttendanceRecord>> {
        let status = match filter.status.as_deref() {
            None | Some("") | Some("all") => None,
            Some("present") => Some(AttendanceStatus::Present),
            Some("late") => Some(AttendanceStatus::Late),
            Some("absent") => Some(AttendanceStatus::Absent),
            Some(other) => {
                return Err(AppError::Validation(format!("estado desconhecido: {}", other)));
            }
        };

        let records = self.records.read().await;
        Ok(records
            .iter()
            .filter(|r| filter.date.as_deref().map_or(true, |d| r.date == d))
            .filter(|r| filter.class.as_deref().map_or(true, |c| c == "all" || r.class == c))
            .filter(|r| status.map_or(true, |s| r.status == s))
            .cloned()
            .collect())
    }

    /// Registos cuja data cai entre `start` e `end` (inclusive).
    pub async fn between(&self, start: NaiveDate, end: NaiveDate) -> Vec<AttendanceRecord> {
        self.records
            .read()
            .await
            .iter()
            .filter(|r| {
                NaiveDate::parse_from_str(&r.date, "%Y-%m-%d")
                    .map(|d| start <= d && d <= end)
                    .unwrap_or(false)
            })
            .cloned()
            .collect()
    }

    pub async fn update_status(&self, id: &str, status: AttendanceStatus) -> AppResult<AttendanceRecord> {
        let mut records = self.records.write().await;
        let record = records
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or_else(|| AppError::NotFound(format!("registo {}", id)))?;
        record.status = status;
        tracing::info!("Registo {} alterado para {}", id, status);
        Ok(record.clone())
    }

    pub async fn delete(&self, id: &str) -> AppResult<AttendanceRecord> {
        let mut records = self.records.write().await;
        let pos = records
            .iter()
            .position(|r| r.id == id)
            .ok_or_else(|| AppError::NotFound(format!("registo {}", id)))?;
        let removed = records.remove(pos);
        tracing::info!("🗑️ Registo {} removido.", id);
        Ok(removed)
    }
}

pub fn build_record(student: &Student, now: NaiveDateTime, late_after: NaiveTime) -> AttendanceRecord {
    let status = classify(now.time(), late_after);
    AttendanceRecord {
        id: format!("att-{}", &Uuid::new_v4().simple().to_string()[..9]),
        student_id: student.id.clone(),
        date: now.format("%Y-%m-%d").to_string(),
        time: now.format("%H:%M:%S").to_string(),
        class: student.class.clone(),
        status,
    }
}

/// Regista a presença de um aluno identificado pelo número civil (ou pelo QR).
pub async fn record_attendance(
    roster: &StudentRoster,
    log: &AttendanceLog,
    request: &ScanRequest,
    now: NaiveDateTime,
    policy: AttendancePolicy,
) -> AppResult<RecordedAttendance> {
    let raw = match request.source {
        ScanSource::Qr => civil_id_from_qr(request.civil_id.trim()),
        ScanSource::Manual => request.civil_id.as_str(),
    };
    let civil_id = validate_civil_id(raw)?;
    tracing::debug!("Marcando presença para {} ({:?})", civil_id, request.source);

    // Consulta simulada do aluno
    if !policy.lookup_delay.is_zero() {
        tokio::time::sleep(policy.lookup_delay).await;
    }

    let student = roster
        .find_by_civil_id(civil_id)
        .await
        .ok_or_else(|| AppError::NotFound(format!("aluno com número civil {}", civil_id)))?;

    let record = build_record(&student, now, policy.late_after);
    log.push(record.clone()).await;
    tracing::info!(
        "✅ Presença registada: {} ({}) {} às {}",
        student.name,
        student.code,
        record.status,
        record.time
    );

    Ok(RecordedAttendance { student, record })
}
