// src/models/settings.rs
use serde::{Deserialize, Serialize};

pub const SCHOOL_SETTINGS_KEY: &str = "school_settings";
pub const NOTIFICATION_SETTINGS_KEY: &str = "notification_settings";
pub const THEME_SETTINGS_KEY: &str = "theme_settings";

pub fn default_grades() -> Vec<String> {
    vec!["العاشر".into(), "الحادي عشر".into(), "الثاني عشر".into()]
}

pub fn default_sections() -> Vec<String> {
    vec!["أ".into(), "ب".into(), "ج".into()]
}

pub fn default_specializations() -> Vec<String> {
    vec!["علمي".into(), "أدبي".into()]
}

// Os blobs guardados por versões antigas podem não ter as listas:
// `serde(default)` preenche-as com os valores de fábrica.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchoolSettings {
    pub school_name: String,
    pub school_address: String,
    pub school_phone: String,
    pub school_email: String,
    #[serde(default = "default_grades")]
    pub grades: Vec<String>,
    #[serde(default = "default_sections")]
    pub sections: Vec<String>,
    #[serde(default = "default_specializations")]
    pub specializations: Vec<String>,
}

impl Default for SchoolSettings {
    fn default() -> Self {
        Self {
            school_name: "مدرسة النهضة الثانوية".to_string(),
            school_address: "شارع الملك فهد، الرياض".to_string(),
            school_phone: "0112345678".to_string(),
            school_email: "info@school.edu.sa".to_string(),
            grades: default_grades(),
            sections: default_sections(),
            specializations: default_specializations(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationSettings {
    pub email_notifications: bool,
    pub daily_reports: bool,
    pub absence_alerts: bool,
}

impl Default for NotificationSettings {
    fn default() -> Self {
        Self {
            email_notifications: true,
            daily_reports: true,
            absence_alerts: true,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThemeSettings {
    pub dark_mode: bool,
    pub high_contrast: bool,
}

/// As três secções de definições juntas (GET/PUT /settings).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AllSettings {
    pub school: SchoolSettings,
    pub notifications: NotificationSettings,
    pub theme: ThemeSettings,
}

/// Listas editáveis das definições da escola.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Catalog {
    Grades,
    Sections,
    Specializations,
}

impl Catalog {
    pub fn entries_mut<'a>(&self, school: &'a mut SchoolSettings) -> &'a mut Vec<String> {
        match self {
            Catalog::Grades => &mut school.grades,
            Catalog::Sections => &mut school.sections,
            Catalog::Specializations => &mut school.specializations,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct CatalogEntry {
    pub value: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn legacy_school_blob_gets_default_lists() {
        let raw = r#"{"schoolName":"X","schoolAddress":"Y","schoolPhone":"1","schoolEmail":"a@b"}"#;
        let parsed: SchoolSettings = serde_json::from_str(raw).unwrap();
        assert_eq!(parsed.school_name, "X");
        assert_eq!(parsed.grades, default_grades());
        assert_eq!(parsed.sections, default_sections());
        assert_eq!(parsed.specializations, default_specializations());
    }
}
