// src/models/mod.rs
pub mod attendance;
pub mod report;
pub mod settings;
pub mod student;
pub mod teacher;
pub mod user;
