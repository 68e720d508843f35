// src/models/user.rs
use serde::{Deserialize, Serialize};
use std::fmt;

/// Papéis possíveis de um utilizador da escola.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    Principal,
    Teacher,
    Assistant,
}

impl UserRole {
    pub const ALL: [UserRole; 3] = [UserRole::Principal, UserRole::Teacher, UserRole::Assistant];

    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::Principal => "principal",
            UserRole::Teacher => "teacher",
            UserRole::Assistant => "assistant",
        }
    }

    /// Nome do papel mostrado no painel.
    pub fn label(&self) -> &'static str {
        match self {
            UserRole::Principal => "المدير",
            UserRole::Teacher => "المعلم",
            UserRole::Assistant => "المساعد الإداري",
        }
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Uma capacidade concedida: o par (ação, assunto).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Permission {
    pub action: String,
    pub subject: String,
}

impl Permission {
    pub fn new(action: &str, subject: &str) -> Self {
        Self {
            action: action.to_string(),
            subject: subject.to_string(),
        }
    }
}

/// Utilizador autenticado, tal como fica guardado na sessão.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub email: String,
    pub role: UserRole,
    pub name: String,
    // Quando presente, substitui a lista do papel
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub permissions: Option<Vec<Permission>>,
}

// Dados do formulário de login
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

/// Resposta de `/session`: o utilizador atual e as capacidades efetivas.
#[derive(Debug, Serialize)]
pub struct SessionView {
    pub user: Option<User>,
    pub permissions: Vec<Permission>,
}
