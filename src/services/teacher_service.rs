// src/services/teacher_service.rs
use crate::{
    error::{AppError, AppResult},
    models::teacher::{Teacher, TeacherForm},
    services::student_service::into_csv_string,
};
use tokio::sync::RwLock;
use uuid::Uuid;

fn seed_teachers() -> Vec<Teacher> {
    vec![
        Teacher {
            id: "t1".to_string(),
            civil_id: "1234567890".to_string(),
            name: "أحمد محمد الخالد".to_string(),
            classes: vec!["10-أ".to_string(), "11-ب".to_string()],
        },
        Teacher {
            id: "t2".to_string(),
            civil_id: "2345678901".to_string(),
            name: "سارة عبدالله الفهد".to_string(),
            classes: vec!["10-ب".to_string(), "11-أ".to_string()],
        },
        Teacher {
            id: "t3".to_string(),
            civil_id: "3456789012".to_string(),
            name: "خالد العمر".to_string(),
            classes: vec!["12-أ".to_string(), "12-ب".to_string()],
        },
    ]
}

fn validate(form: &TeacherForm) -> AppResult<()> {
    if form.civil_id.trim().is_empty() || form.name.trim().is_empty() {
        return Err(AppError::Validation(
            "os campos 'civil_id' e 'name' são obrigatórios".to_string(),
        ));
    }
    Ok(())
}

/// Lista de professores em memória.
pub struct TeacherRoster {
    teachers: RwLock<Vec<Teacher>>,
}

impl Default for TeacherRoster {
    fn default() -> Self {
        Self::seeded()
    }
}

impl TeacherRoster {
    pub fn new(teachers: Vec<Teacher>) -> Self {
        Self {
            teachers: RwLock::new(teachers),
        }
    }

    pub fn seeded() -> Self {
        Self::new(seed_teachers())
    }

    /// Filtra por nome (sem maiúsculas), número civil ou turmas.
    pub async fn search(&self, query: &str) -> Vec<Teacher> {
        let query = query.to_lowercase();
        self.teachers
            .read()
            .await
            .iter()
            .filter(|t| {
                t.name.to_lowercase().contains(&query)
                    || t.civil_id.contains(&query)
                    || t.classes.join(" ").to_lowercase().contains(&query)
            })
            .cloned()
            .collect()
    }

    pub async fn add(&self, form: TeacherForm) -> AppResult<Teacher> {
        validate(&form)?;
        let teacher = Teacher {
            id: format!("t{}", &Uuid::new_v4().simple().to_string()[..9]),
            civil_id: form.civil_id.trim().to_string(),
            name: form.name.trim().to_string(),
            classes: form.classes,
        };
        self.teachers.write().await.push(teacher.clone());
        tracing::info!("✅ Professor '{}' adicionado.", teacher.name);
        Ok(teacher)
    }

    pub async fn update(&self, id: &str, form: TeacherForm) -> AppResult<Teacher> {
        validate(&form)?;
        let mut teachers = self.teachers.write().await;
        let teacher = teachers
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or_else(|| AppError::NotFound(format!("professor {}", id)))?;

        teacher.civil_id = form.civil_id.trim().to_string();
        teacher.name = form.name.trim().to_string();
        teacher.classes = form.classes;
        tracing::info!("✅ Professor '{}' atualizado.", id);
        Ok(teacher.clone())
    }

    pub async fn delete(&self, id: &str) -> AppResult<Teacher> {
        let mut teachers = self.teachers.write().await;
        let pos = teachers
            .iter()
            .position(|t| t.id == id)
            .ok_or_else(|| AppError::NotFound(format!("professor {}", id)))?;
        let removed = teachers.remove(pos);
        tracing::info!("🗑️ Professor '{}' removido.", removed.name);
        Ok(removed)
    }

    /// CSV com id, número civil, nome e turmas (separadas por " | ").
    pub async fn export_csv(&self) -> AppResult<String> {
        let teachers = self.teachers.read().await;
        let mut writer = csv::Writer::from_writer(Vec::new());
        writer.write_record(["الرقم التعريفي", "الرقم المدني", "الاسم", "الفصول"])?;
        for t in teachers.iter() {
            writer.write_record([
                t.id.as_str(),
                t.civil_id.as_str(),
                t.name.as_str(),
                t.classes.join(" | ").as_str(),
            ])?;
        }
        into_csv_string(writer)
    }
}
