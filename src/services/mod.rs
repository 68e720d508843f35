// src/services/mod.rs
pub mod attendance_service;
pub mod auth_service;
pub mod dashboard_service;
pub mod permissions;
pub mod report_service;
pub mod settings_service;
pub mod storage;
pub mod student_service;
pub mod teacher_service;
