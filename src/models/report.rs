// src/models/report.rs
use crate::models::attendance::AttendanceStats;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Intervalo de datas pedido para o relatório.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RangeKind {
    #[default]
    Week,
    Month,
    Semester,
    Custom,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReportQuery {
    #[serde(default)]
    pub q: Option<String>,
    #[serde(default)]
    pub class: Option<String>,
    #[serde(default)]
    pub range: RangeKind,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}

/// Linha do relatório: totais de um aluno no intervalo.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StudentAttendanceSummary {
    pub student_id: String,
    pub student_name: String,
    pub code: String,
    pub civil_id: String,
    pub class: String,
    pub present: usize,
    pub late: usize,
    pub absent: usize,
    pub total: usize,
}

#[derive(Debug, Serialize)]
pub struct AttendanceReport {
    pub range: DateRange,
    pub rows: Vec<StudentAttendanceSummary>,
    pub stats: AttendanceStats,
}

#[derive(Debug, Serialize)]
pub struct DashboardStats {
    pub greeting_name: String,
    pub role_label: String,
    pub date: String,
    pub total_students: usize,
    pub present_today: usize,
    pub late_today: usize,
    pub absent_today: usize,
    pub attendance_rate: String,
}
