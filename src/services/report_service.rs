// src/services/report_service.rs
use crate::{
    error::{AppError, AppResult},
    models::{
        attendance::{AttendanceRecord, AttendanceStats, AttendanceStatus},
        report::{AttendanceReport, DateRange, RangeKind, ReportQuery, StudentAttendanceSummary},
        student::Student,
    },
    services::{
        attendance_service::AttendanceLog,
        student_service::{into_csv_string, StudentRoster},
    },
};
use chrono::{Datelike, Duration, NaiveDate};
use std::collections::HashSet;

fn ymd(year: i32, month: u32, day: u32) -> AppResult<NaiveDate> {
    NaiveDate::from_ymd_opt(year, month, day).ok_or(AppError::InternalServerError)
}

fn last_day_of_month(year: i32, month: u32) -> AppResult<NaiveDate> {
    let (next_year, next_month) = if month == 12 { (year + 1, 1) } else { (year, month + 1) };
    ymd(next_year, next_month, 1)?
        .pred_opt()
        .ok_or(AppError::InternalServerError)
}

/// Resolve o intervalo pedido relativamente a `today`.
/// Semana de domingo a sábado; semestres de setembro a janeiro e de fevereiro a agosto.
pub fn date_range(
    kind: RangeKind,
    today: NaiveDate,
    from: Option<NaiveDate>,
    to: Option<NaiveDate>,
) -> AppResult<DateRange> {
    let range = match kind {
        RangeKind::Week => {
            let start = today - Duration::days(today.weekday().num_days_from_sunday() as i64);
            DateRange {
                start,
                end: start + Duration::days(6),
            }
        }
        RangeKind::Month => DateRange {
            start: ymd(today.year(), today.month(), 1)?,
            end: last_day_of_month(today.year(), today.month())?,
        },
        RangeKind::Semester => match today.month() {
            9..=12 => DateRange {
                start: ymd(today.year(), 9, 1)?,
                end: ymd(today.year() + 1, 1, 31)?,
            },
            1 => DateRange {
                start: ymd(today.year() - 1, 9, 1)?,
                end: ymd(today.year(), 1, 31)?,
            },
            _ => DateRange {
                start: ymd(today.year(), 2, 1)?,
                end: ymd(today.year(), 8, 31)?,
            },
        },
        RangeKind::Custom => {
            let (Some(start), Some(end)) = (from, to) else {
                return Err(AppError::Validation(
                    "intervalo personalizado requer 'from' e 'to'".to_string(),
                ));
            };
            if start > end {
                return Err(AppError::Validation(
                    "'from' não pode ser posterior a 'to'".to_string(),
                ));
            }
            DateRange { start, end }
        }
    };
    Ok(range)
}

fn matches_query(student: &Student, query: &ReportQuery) -> bool {
    let text_ok = match query.q.as_deref().map(str::trim) {
        None | Some("") => true,
        Some(q) => {
            let q = q.to_lowercase();
            student.name.to_lowercase().contains(&q)
                || student.code.to_lowercase().contains(&q)
                || student.civil_id.contains(&q)
        }
    };
    let class_ok = match query.class.as_deref() {
        None | Some("") | Some("all") => true,
        Some(class) => student.class == class,
    };
    text_ok && class_ok
}

/// Totais por aluno no intervalo. Os dias contados são as datas com algum registo;
/// um aluno sem registo num desses dias conta como ausente.
pub fn student_summaries(
    students: &[Student],
    records: &[AttendanceRecord],
    query: &ReportQuery,
) -> Vec<StudentAttendanceSummary> {
    let days: HashSet<&str> = records.iter().map(|r| r.date.as_str()).collect();
    let total = days.len();

    students
        .iter()
        .filter(|s| matches_query(s, query))
        .map(|student| {
            let mut present_days = HashSet::new();
            let mut late_days = HashSet::new();
            for record in records.iter().filter(|r| r.student_id == student.id) {
                match record.status {
                    AttendanceStatus::Present => {
                        present_days.insert(record.date.as_str());
                    }
                    AttendanceStatus::Late => {
                        late_days.insert(record.date.as_str());
                    }
                    AttendanceStatus::Absent => {}
                }
            }
            // Presente e atrasado no mesmo dia conta como presente
            late_days.retain(|d| !present_days.contains(d));

            let present = present_days.len();
            let late = late_days.len();
            StudentAttendanceSummary {
                student_id: student.id.clone(),
                student_name: student.name.clone(),
                code: student.code.clone(),
                civil_id: student.civil_id.clone(),
                class: student.class.clone(),
                present,
                late,
                absent: total.saturating_sub(present + late),
                total,
            }
        })
        .collect()
}

pub fn totals(rows: &[StudentAttendanceSummary]) -> AttendanceStats {
    rows.iter().fold(AttendanceStats::default(), |mut acc, row| {
        acc.present += row.present;
        acc.late += row.late;
        acc.absent += row.absent;
        acc.total += row.total;
        acc
    })
}

pub async fn build_report(
    roster: &StudentRoster,
    log: &AttendanceLog,
    query: &ReportQuery,
    today: NaiveDate,
) -> AppResult<AttendanceReport> {
    let range = date_range(query.range, today, query.from, query.to)?;
    let students = roster.all().await;
    let records = log.between(range.start, range.end).await;
    let rows = student_summaries(&students, &records, query);
    let stats = totals(&rows);
    tracing::debug!(
        "Relatório {} a {}: {} alunos, {} dias",
        range.start,
        range.end,
        rows.len(),
        rows.first().map_or(0, |r| r.total)
    );
    Ok(AttendanceReport { range, rows, stats })
}

pub fn export_csv(report: &AttendanceReport) -> AppResult<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(["الاسم", "الرمز", "الرقم المدني", "الفصل", "حاضر", "متأخر", "غائب", "المجموع"])?;
    for row in &report.rows {
        writer.write_record([
            row.student_name.clone(),
            row.code.clone(),
            row.civil_id.clone(),
            row.class.clone(),
            row.present.to_string(),
            row.late.to_string(),
            row.absent.to_string(),
            row.total.to_string(),
        ])?;
    }
    into_csv_string(writer)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn record(student_id: &str, date: &str, status: AttendanceStatus) -> AttendanceRecord {
        AttendanceRecord {
            id: format!("att-{}-{}", student_id, date),
            student_id: student_id.to_string(),
            date: date.to_string(),
            time: "07:00:00".to_string(),
            class: "10-أ".to_string(),
            status,
        }
    }

    #[test]
    fn week_runs_sunday_to_saturday() {
        // 2025-03-05 é uma quarta-feira
        let range = date_range(RangeKind::Week, day(2025, 3, 5), None, None).unwrap();
        assert_eq!(range.start, day(2025, 3, 2));
        assert_eq!(range.end, day(2025, 3, 8));

        let sunday = date_range(RangeKind::Week, day(2025, 3, 2), None, None).unwrap();
        assert_eq!(sunday.start, day(2025, 3, 2));
    }

    #[test]
    fn month_covers_whole_calendar_month() {
        let feb = date_range(RangeKind::Month, day(2024, 2, 10), None, None).unwrap();
        assert_eq!((feb.start, feb.end), (day(2024, 2, 1), day(2024, 2, 29)));
        let dec = date_range(RangeKind::Month, day(2025, 12, 31), None, None).unwrap();
        assert_eq!(dec.end, day(2025, 12, 31));
    }

    #[test]
    fn semesters() {
        let autumn = date_range(RangeKind::Semester, day(2025, 10, 1), None, None).unwrap();
        assert_eq!((autumn.start, autumn.end), (day(2025, 9, 1), day(2026, 1, 31)));
        let january = date_range(RangeKind::Semester, day(2026, 1, 15), None, None).unwrap();
        assert_eq!(january.start, day(2025, 9, 1));
        let spring = date_range(RangeKind::Semester, day(2025, 4, 1), None, None).unwrap();
        assert_eq!((spring.start, spring.end), (day(2025, 2, 1), day(2025, 8, 31)));
    }

    #[test]
    fn custom_range_needs_ordered_bounds() {
        let today = day(2025, 3, 5);
        assert!(date_range(RangeKind::Custom, today, None, Some(today)).is_err());
        assert!(date_range(RangeKind::Custom, today, Some(day(2025, 3, 6)), Some(today)).is_err());
        let range = date_range(RangeKind::Custom, today, Some(day(2025, 3, 1)), Some(today)).unwrap();
        assert!(range.contains(day(2025, 3, 3)));
    }

    #[test]
    fn absent_is_days_minus_present_and_late() {
        let roster = crate::services::student_service::seed_students();
        let records = vec![
            record("s1", "2025-03-02", AttendanceStatus::Present),
            record("s1", "2025-03-03", AttendanceStatus::Late),
            record("s2", "2025-03-03", AttendanceStatus::Present),
            record("s2", "2025-03-04", AttendanceStatus::Present),
        ];
        let rows = student_summaries(&roster, &records, &ReportQuery::default());
        assert_eq!(rows.len(), 2);

        let s1 = &rows[0];
        assert_eq!((s1.present, s1.late, s1.absent, s1.total), (1, 1, 1, 3));
        let s2 = &rows[1];
        assert_eq!((s2.present, s2.late, s2.absent, s2.total), (2, 0, 1, 3));

        let stats = totals(&rows);
        assert_eq!(stats, AttendanceStats { present: 3, late: 1, absent: 2, total: 6 });
    }

    #[test]
    fn no_records_means_no_days() {
        let roster = crate::services::student_service::seed_students();
        let rows = student_summaries(&roster, &[], &ReportQuery::default());
        assert!(rows.iter().all(|r| r.total == 0 && r.absent == 0));
    }

    #[test]
    fn search_and_class_filters() {
        let roster = crate::services::student_service::seed_students();
        let by_code = ReportQuery {
            q: Some(roster[1].code.to_lowercase()),
            ..Default::default()
        };
        let rows = student_summaries(&roster, &[], &by_code);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].student_id, "s2");

        let by_class = ReportQuery {
            class: Some(roster[0].class.clone()),
            ..Default::default()
        };
        assert!(student_summaries(&roster, &[], &by_class)
            .iter()
            .all(|r| r.class == roster[0].class));

        let all = ReportQuery {
            class: Some("all".into()),
            ..Default::default()
        };
        assert_eq!(student_summaries(&roster, &[], &all).len(), 2);
    }

    #[tokio::test]
    async fn report_uses_only_records_in_range() {
        let roster = StudentRoster::seeded();
        let log = AttendanceLog::new();
        log.push(record("s1", "2025-03-03", AttendanceStatus::Present)).await;
        log.push(record("s1", "2025-02-20", AttendanceStatus::Present)).await;

        let report = build_report(&roster, &log, &ReportQuery::default(), day(2025, 3, 5))
            .await
            .unwrap();
        assert_eq!(report.rows[0].total, 1);
        assert_eq!(report.stats.present, 1);

        let csv = export_csv(&report).unwrap();
        assert_eq!(csv.lines().count(), 3);
        assert!(csv.lines().next().unwrap().starts_with("الاسم,"));
    }
}
