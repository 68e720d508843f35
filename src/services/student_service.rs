// src/services/student_service.rs
use crate::{
    error::{AppError, AppResult},
    models::student::{
        compose_class, normalize_specialization, ImportSummary, NewStudent, Student, StudentCard,
        StudentImportRow, StudentUpdate, DEFAULT_GRADE, DEFAULT_SECTION, SPECIALIZATION_SCIENTIFIC,
    },
};
use rand::Rng;
use std::io::Read;
use tokio::sync::RwLock;
use uuid::Uuid;

const QR_SERVICE_URL: &str = "https://api.qrserver.com/v1/create-qr-code/?size=150x150&data=";
pub const CARD_TITLE: &str = "بطاقة الطالب";

/// URL da imagem QR para o conteúdo dado.
pub fn qr_code_url(data: &str) -> String {
    format!("{}{}", QR_SERVICE_URL, urlencoding::encode(data))
}

/// Conteúdo do QR impresso no cartão: "<civil_id>-<nome>".
pub fn qr_payload(civil_id: &str, name: &str) -> String {
    format!("{}-{}", civil_id, name)
}

fn generate_code() -> String {
    format!("ST{}", rand::thread_rng().gen_range(1000..10000))
}

fn generate_id() -> String {
    let raw = Uuid::new_v4().simple().to_string();
    format!("s-{}", &raw[..9])
}

pub(crate) fn seed_students() -> Vec<Student> {
    vec![
        Student {
            id: "s1".to_string(),
            civil_id: "1234567890".to_string(),
            name: "أحمد محمد".to_string(),
            code: "ST1001".to_string(),
            class: "10-أ".to_string(),
            grade: "العاشر".to_string(),
            specialization: Some("علمي".to_string()),
            qr_code: Some(qr_code_url("1234567890")),
        },
        Student {
            id: "s2".to_string(),
            civil_id: "2345678901".to_string(),
            name: "سارة عبدالله".to_string(),
            code: "ST1002".to_string(),
            class: "11-ب".to_string(),
            grade: "الحادي عشر".to_string(),
            specialization: Some("أدبي".to_string()),
            qr_code: Some(qr_code_url("2345678901")),
        },
    ]
}

fn require_field(value: &str, label: &str) -> AppResult<()> {
    if value.trim().is_empty() {
        return Err(AppError::Validation(format!("o campo '{}' é obrigatório", label)));
    }
    Ok(())
}

/// Lista de alunos em memória.
pub struct StudentRoster {
    students: RwLock<Vec<Student>>,
}

impl Default for StudentRoster {
    fn default() -> Self {
        Self::seeded()
    }
}

impl StudentRoster {
    pub fn new(students: Vec<Student>) -> Self {
        Self {
            students: RwLock::new(students),
        }
    }

    /// Roster com os alunos de demonstração.
    pub fn seeded() -> Self {
        Self::new(seed_students())
    }

    pub async fn all(&self) -> Vec<Student> {
        self.students.read().await.clone()
    }

    pub async fn len(&self) -> usize {
        self.students.read().await.len()
    }

    /// Procura por nome, número civil ou código (query vazia devolve todos).
    pub async fn search(&self, query: &str) -> Vec<Student> {
        let students = self.students.read().await;
        students
            .iter()
            .filter(|s| {
                query.is_empty()
                    || s.name.contains(query)
                    || s.civil_id.contains(query)
                    || s.code.contains(query)
            })
            .cloned()
            .collect()
    }

    pub async fn find(&self, id: &str) -> Option<Student> {
        self.students.read().await.iter().find(|s| s.id == id).cloned()
    }

    pub async fn find_by_civil_id(&self, civil_id: &str) -> Option<Student> {
        self.students
            .read()
            .await
            .iter()
            .find(|s| s.civil_id == civil_id)
            .cloned()
    }

    /// Valida os dados e constrói o aluno (sem o inserir).
    fn build(new: NewStudent) -> AppResult<Student> {
        require_field(&new.name, "name")?;
        require_field(&new.civil_id, "civil_id")?;
        require_field(&new.grade, "grade")?;

        let name = new.name.trim().to_string();
        let civil_id = new.civil_id.trim().to_string();
        let grade = new.grade.trim().to_string();
        let section = new
            .section
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .unwrap_or(DEFAULT_SECTION);
        let code = new
            .code
            .filter(|c| !c.trim().is_empty())
            .unwrap_or_else(generate_code);
        let specialization = normalize_specialization(new.specialization.as_deref())
            .unwrap_or_else(|| SPECIALIZATION_SCIENTIFIC.to_string());

        Ok(Student {
            id: generate_id(),
            qr_code: Some(qr_code_url(&qr_payload(&civil_id, &name))),
            class: compose_class(&grade, section),
            civil_id,
            name,
            code,
            grade,
            specialization: Some(specialization),
        })
    }

    fn ensure_unique_civil_id(students: &[Student], civil_id: &str, except_id: Option<&str>) -> AppResult<()> {
        let clash = students
            .iter()
            .any(|s| s.civil_id == civil_id && Some(s.id.as_str()) != except_id);
        if clash {
            return Err(AppError::Validation(format!(
                "já existe um aluno com o número civil {}",
                civil_id
            )));
        }
        Ok(())
    }

    pub async fn add(&self, new: NewStudent) -> AppResult<Student> {
        let student = Self::build(new)?;
        let mut students = self.students.write().await;
        Self::ensure_unique_civil_id(&students, &student.civil_id, None)?;
        students.push(student.clone());
        tracing::info!("✅ Aluno '{}' ({}) criado.", student.name, student.code);
        Ok(student)
    }

    pub async fn update(&self, id: &str, update: StudentUpdate) -> AppResult<Student> {
        require_field(&update.name, "name")?;
        require_field(&update.civil_id, "civil_id")?;

        let mut students = self.students.write().await;
        let pos = students
            .iter()
            .position(|s| s.id == id)
            .ok_or_else(|| AppError::NotFound(format!("aluno {}", id)))?;
        let name = update.name.trim();
        let civil_id = update.civil_id.trim();
        Self::ensure_unique_civil_id(&students, civil_id, Some(id))?;

        let student = &mut students[pos];
        // O QR codifica o número civil e o nome
        if student.civil_id != civil_id || student.name != name || student.qr_code.is_none() {
            student.qr_code = Some(qr_code_url(&qr_payload(civil_id, name)));
        }
        student.name = name.to_string();
        student.civil_id = civil_id.to_string();
        student.code = update.code;
        student.class = update.class;
        student.grade = if update.grade.trim().is_empty() {
            DEFAULT_GRADE.to_string()
        } else {
            update.grade
        };
        // Especialização desconhecida fica por definir
        student.specialization = normalize_specialization(update.specialization.as_deref());

        tracing::info!("✅ Aluno '{}' atualizado.", id);
        Ok(student.clone())
    }

    pub async fn delete(&self, id: &str) -> AppResult<Student> {
        let mut students = self.students.write().await;
        let pos = students
            .iter()
            .position(|s| s.id == id)
            .ok_or_else(|| AppError::NotFound(format!("aluno {}", id)))?;
        let removed = students.remove(pos);
        tracing::info!("🗑️ Aluno '{}' ({}) removido.", removed.name, removed.id);
        Ok(removed)
    }

    /// Importa alunos de um CSV com cabeçalho `name,civil_id,grade,section,specialization`.
    /// Qualquer linha inválida aborta a importação inteira.
    pub async fn import_csv<R: Read>(&self, reader: R) -> AppResult<ImportSummary> {
        let rows = read_import_rows(reader)?;
        if rows.is_empty() {
            return Err(AppError::Import("o ficheiro não contém alunos".to_string()));
        }

        let mut built = Vec::with_capacity(rows.len());
        for (line, row) in rows {
            let student = Self::build(row.into())
                .map_err(|e| AppError::Import(format!("linha {}: {}", line, e)))?;
            built.push(student);
        }

        let mut students = self.students.write().await;
        for (n, student) in built.iter().enumerate() {
            Self::ensure_unique_civil_id(&students, &student.civil_id, None)
                .and_then(|_| Self::ensure_unique_civil_id(&built[..n], &student.civil_id, None))
                .map_err(|e| AppError::Import(e.to_string()))?;
        }
        students.extend(built.iter().cloned());

        tracing::info!("✅ {} alunos importados.", built.len());
        Ok(ImportSummary {
            imported: built.len(),
            students: built,
        })
    }

    /// Exporta todos os alunos em CSV.
    pub async fn export_csv(&self) -> AppResult<String> {
        let students = self.students.read().await;
        let mut writer = csv::Writer::from_writer(Vec::new());
        writer.write_record(["اسم الطالب", "الرقم المدني", "الرمز", "الصف", "الشعبة", "التخصص"])?;
        for s in students.iter() {
            writer.write_record([
                s.name.as_str(),
                s.civil_id.as_str(),
                s.code.as_str(),
                s.grade.as_str(),
                s.section(),
                s.specialization_label(),
            ])?;
        }
        tracing::debug!("Exportação de {} alunos gerada.", students.len());
        into_csv_string(writer)
    }
}

/// Modelo do ficheiro de importação (cabeçalho + um exemplo).
pub fn import_template_csv() -> AppResult<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.serialize(StudentImportRow {
        name: "أحمد محمد".to_string(),
        civil_id: "1234567890".to_string(),
        grade: DEFAULT_GRADE.to_string(),
        section: DEFAULT_SECTION.to_string(),
        specialization: SPECIALIZATION_SCIENTIFIC.to_string(),
    })?;
    into_csv_string(writer)
}

/// Dados do cartão. Sem QR o cartão é gerado na mesma, com um aviso.
pub fn student_card(student: &Student, school_name: &str) -> StudentCard {
    let warning = match &student.qr_code {
        Some(_) => None,
        None => {
            tracing::warn!("Aluno {} sem código QR; cartão gerado sem imagem.", student.id);
            Some("cartão gerado sem código QR".to_string())
        }
    };

    StudentCard {
        school_name: school_name.to_string(),
        title: CARD_TITLE.to_string(),
        name: student.name.clone(),
        civil_id: student.civil_id.clone(),
        grade: student.grade.clone(),
        section: student.section().to_string(),
        specialization: student.specialization_label().to_string(),
        code: student.code.clone(),
        qr_code: student.qr_code.clone(),
        file_name: format!("{}_{}.pdf", CARD_TITLE.replace(' ', "_"), student.name),
        warning,
    }
}

fn read_import_rows<R: Read>(reader: R) -> AppResult<Vec<(u64, StudentImportRow)>> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .has_headers(true)
        .from_reader(reader);

    let mut rows = Vec::new();
    for (n, res) in csv_reader.deserialize::<StudentImportRow>().enumerate() {
        match res {
            Ok(row) => {
                // Cabeçalho na linha 1, dados a partir da 2
                rows.push(((n as u64) + 2, row));
            }
            Err(e) => {
                let estr = match e.position() {
                    Some(p) => format!("linha {}: {}", p.line(), e),
                    None => format!("registo {}: {}", n, e),
                };
                return Err(AppError::Import(estr));
            }
        }
    }
    Ok(rows)
}

pub(crate) fn into_csv_string(writer: csv::Writer<Vec<u8>>) -> AppResult<String> {
    let bytes = writer
        .into_inner()
        .map_err(|e| AppError::Import(format!("falha ao gerar CSV: {}", e)))?;
    String::from_utf8(bytes).map_err(|_| AppError::InternalServerError)
}
