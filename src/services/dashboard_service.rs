// src/services/dashboard_service.rs
use crate::{
    error::AppResult,
    models::{
        attendance::{AttendanceFilter, AttendanceRecord, AttendanceStats, AttendanceStatus},
        report::DashboardStats,
        user::User,
    },
    services::{attendance_service::AttendanceLog, student_service::StudentRoster},
};
use chrono::NaiveDate;
use std::collections::HashSet;

/// Totais do dia. Cada aluno conta uma vez; presente prevalece sobre atrasado.
pub fn today_stats(total_students: usize, today_records: &[AttendanceRecord]) -> AttendanceStats {
    let present: HashSet<&str> = today_records
        .iter()
        .filter(|r| r.status == AttendanceStatus::Present)
        .map(|r| r.student_id.as_str())
        .collect();
    let late: HashSet<&str> = today_records
        .iter()
        .filter(|r| r.status == AttendanceStatus::Late && !present.contains(r.student_id.as_str()))
        .map(|r| r.student_id.as_str())
        .collect();

    AttendanceStats {
        present: present.len(),
        late: late.len(),
        absent: total_students.saturating_sub(present.len() + late.len()),
        total: total_students,
    }
}

/// Percentagem de presença (presentes + atrasados) arredondada, "0%" sem alunos.
pub fn attendance_rate(stats: &AttendanceStats) -> String {
    if stats.total == 0 {
        return "0%".to_string();
    }
    let rate = ((stats.present + stats.late) as f64 / stats.total as f64 * 100.0).round();
    format!("{}%", rate.min(100.0) as u32)
}

pub async fn dashboard(
    user: &User,
    roster: &StudentRoster,
    log: &AttendanceLog,
    today: NaiveDate,
) -> AppResult<DashboardStats> {
    let filter = AttendanceFilter {
        date: Some(today.format("%Y-%m-%d").to_string()),
        ..Default::default()
    };
    let records = log.list(&filter).await?;
    let stats = today_stats(roster.len().await, &records);

    Ok(DashboardStats {
        greeting_name: user.name.clone(),
        role_label: user.role.label().to_string(),
        date: today.format("%Y-%m-%d").to_string(),
        total_students: stats.total,
        present_today: stats.present,
        late_today: stats.late,
        absent_today: stats.absent,
        attendance_rate: attendance_rate(&stats),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::user::UserRole;

    fn record(student_id: &str, status: AttendanceStatus) -> AttendanceRecord {
        AttendanceRecord {
            id: format!("att-{}", student_id),
            student_id: student_id.to_string(),
            date: "2025-03-02".to_string(),
            time: "07:00:00".to_string(),
            class: "10-أ".to_string(),
            status,
        }
    }

    #[test]
    fn rate_is_zero_without_students() {
        let stats = today_stats(0, &[]);
        assert_eq!(attendance_rate(&stats), "0%");
        assert_eq!(stats.absent, 0);
    }

    #[test]
    fn absent_never_goes_negative() {
        let records = vec![
            record("s1", AttendanceStatus::Present),
            record("s2", AttendanceStatus::Late),
            record("s3", AttendanceStatus::Present),
        ];
        let stats = today_stats(2, &records);
        assert_eq!(stats.absent, 0);
        assert_eq!(attendance_rate(&stats), "100%");
    }

    #[test]
    fn repeated_scans_count_once() {
        let records = vec![
            record("s1", AttendanceStatus::Present),
            record("s1", AttendanceStatus::Late),
            record("s2", AttendanceStatus::Late),
            record("s2", AttendanceStatus::Late),
        ];
        let stats = today_stats(3, &records);
        assert_eq!((stats.present, stats.late, stats.absent), (1, 1, 1));
        assert_eq!(attendance_rate(&stats), "67%");
    }

    #[tokio::test]
    async fn dashboard_greets_user_with_role_label() {
        let roster = StudentRoster::seeded();
        let log = AttendanceLog::new();
        log.push(record("s1", AttendanceStatus::Present)).await;
        let user = User {
            id: "2".into(),
            email: "teacher@school.com".into(),
            role: UserRole::Teacher,
            name: "سارة القاسمي".into(),
            permissions: None,
        };

        let stats = dashboard(&user, &roster, &log, NaiveDate::from_ymd_opt(2025, 3, 2).unwrap())
            .await
            .unwrap();
        assert_eq!(stats.greeting_name, "سارة القاسمي");
        assert_eq!(stats.role_label, UserRole::Teacher.label());
        assert_eq!(stats.total_students, 2);
        assert_eq!(stats.present_today, 1);
        assert_eq!(stats.absent_today, 1);
        assert_eq!(stats.attendance_rate, "50%");
    }
}
