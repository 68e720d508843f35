// src/models/teacher.rs
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Teacher {
    pub id: String,
    pub civil_id: String,
    pub name: String,
    #[serde(default)]
    pub classes: Vec<String>,
}

// Payload usado tanto para criar como para editar um professor
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TeacherForm {
    #[serde(default)]
    pub civil_id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub classes: Vec<String>,
}
