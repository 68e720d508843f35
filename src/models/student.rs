// src/models/student.rs
use serde::{Deserialize, Serialize};

pub const SPECIALIZATION_SCIENTIFIC: &str = "علمي";
pub const SPECIALIZATION_LITERARY: &str = "أدبي";
pub const SPECIALIZATION_UNSET: &str = "غير محدد";
pub const DEFAULT_GRADE: &str = "العاشر";
pub const DEFAULT_SECTION: &str = "أ";

/// Separador entre o ano e a turma no campo `class` (ex: "العاشر-أ").
pub const CLASS_DELIMITER: char = '-';

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Student {
    pub id: String,
    pub civil_id: String,
    pub name: String,
    pub code: String,
    pub class: String,
    pub grade: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub specialization: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub qr_code: Option<String>,
}

impl Student {
    /// Turma extraída do campo `class`; sem separador, o próprio valor.
    pub fn section(&self) -> &str {
        section_of(&self.class)
    }

    pub fn specialization_label(&self) -> &str {
        self.specialization.as_deref().unwrap_or(SPECIALIZATION_UNSET)
    }
}

pub fn compose_class(grade: &str, section: &str) -> String {
    format!("{}{}{}", grade, CLASS_DELIMITER, section)
}

pub fn section_of(class: &str) -> &str {
    match class.split_once(CLASS_DELIMITER) {
        Some((_, section)) => section,
        None => class,
    }
}

/// Só as duas especializações conhecidas são aceites.
pub fn normalize_specialization(value: Option<&str>) -> Option<String> {
    match value.map(str::trim) {
        Some(SPECIALIZATION_SCIENTIFIC) => Some(SPECIALIZATION_SCIENTIFIC.to_string()),
        Some(SPECIALIZATION_LITERARY) => Some(SPECIALIZATION_LITERARY.to_string()),
        _ => None,
    }
}

// Payload para criar um aluno
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewStudent {
    pub name: String,
    pub civil_id: String,
    #[serde(default)]
    pub grade: String,
    #[serde(default)]
    pub section: Option<String>,
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub specialization: Option<String>,
}

// Payload para editar um aluno (substitui todos os campos editáveis)
#[derive(Debug, Clone, Deserialize)]
pub struct StudentUpdate {
    pub name: String,
    pub civil_id: String,
    pub code: String,
    pub class: String,
    pub grade: String,
    #[serde(default)]
    pub specialization: Option<String>,
}

/// Linha do ficheiro de importação.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StudentImportRow {
    pub name: String,
    pub civil_id: String,
    pub grade: String,
    pub section: String,
    #[serde(default)]
    pub specialization: String,
}

impl From<StudentImportRow> for NewStudent {
    fn from(row: StudentImportRow) -> Self {
        NewStudent {
            name: row.name,
            civil_id: row.civil_id,
            grade: row.grade,
            section: Some(row.section),
            code: None,
            specialization: Some(row.specialization),
        }
    }
}

/// Dados do cartão do aluno para impressão (o PDF é gerado pelo cliente).
#[derive(Debug, Clone, Serialize)]
pub struct StudentCard {
    pub school_name: String,
    pub title: String,
    pub name: String,
    pub civil_id: String,
    pub grade: String,
    pub section: String,
    pub specialization: String,
    pub code: String,
    pub qr_code: Option<String>,
    pub file_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ImportSummary {
    pub imported: usize,
    pub students: Vec<Student>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn class_round_trips_through_delimiter() {
        let class = compose_class("العاشر", "ب");
        assert_eq!(class, "العاشر-ب");
        assert_eq!(section_of(&class), "ب");
        assert_eq!(section_of("12"), "12");
    }

    #[test]
    fn only_known_specializations_survive() {
        assert_eq!(
            normalize_specialization(Some("أدبي")).as_deref(),
            Some(SPECIALIZATION_LITERARY)
        );
        assert_eq!(normalize_specialization(Some("فني")), None);
        assert_eq!(normalize_specialization(None), None);
    }
}
