// src/services/permissions.rs
//! Tabela de permissões por papel (RBAC).
//!
//! Cada papel tem uma lista fixa de pares (ação, assunto). Um utilizador com
//! uma lista explícita de permissões usa essa lista em vez da do papel. A
//! comparação é exata e sensível a maiúsculas: não há curingas nem herança.
use crate::models::user::{Permission, User, UserRole};

// Ações
pub const VIEW: &str = "view";
pub const CREATE: &str = "create";
pub const UPDATE: &str = "update";
pub const DELETE: &str = "delete";
pub const EXPORT: &str = "export";

// Assuntos
pub const DASHBOARD: &str = "dashboard";
pub const ATTENDANCE: &str = "attendance";
pub const STUDENTS: &str = "students";
pub const TEACHERS: &str = "teachers";
pub const REPORTS: &str = "reports";
pub const SETTINGS: &str = "settings";

pub const SUBJECTS: &[&str] = &[DASHBOARD, ATTENDANCE, STUDENTS, TEACHERS, REPORTS, SETTINGS];
pub const ACTIONS: &[&str] = &[VIEW, CREATE, UPDATE, DELETE, EXPORT];

/// Uma capacidade da tabela estática.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Capability {
    pub action: &'static str,
    pub subject: &'static str,
}

const fn cap(action: &'static str, subject: &'static str) -> Capability {
    Capability { action, subject }
}

impl Capability {
    pub fn matches(&self, action: &str, subject: &str) -> bool {
        self.action == action && self.subject == subject
    }

    pub fn to_permission(self) -> Permission {
        Permission::new(self.action, self.subject)
    }
}

const PRINCIPAL_PERMISSIONS: &[Capability] = &[
    cap(VIEW, DASHBOARD),
    cap(CREATE, DASHBOARD),
    cap(UPDATE, DASHBOARD),
    cap(DELETE, DASHBOARD),
    cap(VIEW, ATTENDANCE),
    cap(CREATE, ATTENDANCE),
    cap(UPDATE, ATTENDANCE),
    cap(DELETE, ATTENDANCE),
    cap(VIEW, STUDENTS),
    cap(CREATE, STUDENTS),
    cap(UPDATE, STUDENTS),
    cap(DELETE, STUDENTS),
    cap(VIEW, TEACHERS),
    cap(CREATE, TEACHERS),
    cap(UPDATE, TEACHERS),
    cap(DELETE, TEACHERS),
    cap(VIEW, REPORTS),
    cap(CREATE, REPORTS),
    cap(EXPORT, REPORTS),
    cap(VIEW, SETTINGS),
    cap(UPDATE, SETTINGS),
];

const TEACHER_PERMISSIONS: &[Capability] = &[
    cap(VIEW, DASHBOARD),
    cap(VIEW, ATTENDANCE),
    cap(CREATE, ATTENDANCE),
    cap(UPDATE, ATTENDANCE),
    // Alunos: só leitura
    cap(VIEW, STUDENTS),
    cap(VIEW, REPORTS),
    cap(EXPORT, REPORTS),
    cap(VIEW, SETTINGS),
];

// Sem acesso a alunos, professores, relatórios ou definições
const ASSISTANT_PERMISSIONS: &[Capability] = &[
    cap(VIEW, DASHBOARD),
    cap(VIEW, ATTENDANCE),
    cap(CREATE, ATTENDANCE),
];

/// Lista estática de capacidades de um papel.
pub fn role_permissions(role: UserRole) -> &'static [Capability] {
    match role {
        UserRole::Principal => PRINCIPAL_PERMISSIONS,
        UserRole::Teacher => TEACHER_PERMISSIONS,
        UserRole::Assistant => ASSISTANT_PERMISSIONS,
    }
}

/// Decide se o utilizador pode executar `action` sobre `subject`.
/// Sem utilizador não há permissões.
pub fn check_permission(user: Option<&User>, action: &str, subject: &str) -> bool {
    let Some(user) = user else {
        return false;
    };

    match &user.permissions {
        Some(explicit) => explicit
            .iter()
            .any(|p| p.action == action && p.subject == subject),
        None => role_permissions(user.role)
            .iter()
            .any(|c| c.matches(action, subject)),
    }
}

/// Lista efetiva de capacidades (a explícita ou a do papel).
pub fn effective_permissions(user: Option<&User>) -> Vec<Permission> {
    match user {
        None => Vec::new(),
        Some(User {
            permissions: Some(explicit),
            ..
        }) => explicit.clone(),
        Some(user) => role_permissions(user.role)
            .iter()
            .map(|c| c.to_permission())
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user_with(role: UserRole) -> User {
        User {
            id: "u".to_string(),
            email: format!("{}@school.com", role),
            role,
            name: "Teste".to_string(),
            permissions: None,
        }
    }

    #[test]
    fn anonymous_has_no_permissions() {
        for action in ACTIONS {
            for subject in SUBJECTS {
                assert!(!check_permission(None, action, subject));
            }
        }
        assert!(effective_permissions(None).is_empty());
    }

    #[test]
    fn every_table_entry_is_granted() {
        for role in UserRole::ALL {
            let user = user_with(role);
            for c in role_permissions(role) {
                assert!(
                    check_permission(Some(&user), c.action, c.subject),
                    "{} deveria poder {} {}",
                    role,
                    c.action,
                    c.subject
                );
            }
        }
    }

    #[test]
    fn everything_outside_the_table_is_denied() {
        for role in UserRole::ALL {
            let user = user_with(role);
            let table = role_permissions(role);
            for action in ACTIONS {
                for subject in SUBJECTS {
                    let expected = table.iter().any(|c| c.matches(action, subject));
                    assert_eq!(check_permission(Some(&user), action, subject), expected);
                }
            }
            assert!(!check_permission(Some(&user), "view", "unknown"));
        }
    }

    #[test]
    fn role_tables_match_the_school_policy() {
        let principal = user_with(UserRole::Principal);
        let teacher = user_with(UserRole::Teacher);
        let assistant = user_with(UserRole::Assistant);

        assert!(check_permission(Some(&principal), DELETE, TEACHERS));
        assert!(check_permission(Some(&principal), UPDATE, SETTINGS));
        assert!(!check_permission(Some(&principal), DELETE, REPORTS));
        assert!(!check_permission(Some(&principal), DELETE, SETTINGS));

        assert!(check_permission(Some(&teacher), UPDATE, ATTENDANCE));
        assert!(!check_permission(Some(&teacher), DELETE, ATTENDANCE));
        assert!(!check_permission(Some(&teacher), CREATE, STUDENTS));
        assert!(!check_permission(Some(&teacher), VIEW, TEACHERS));
        assert!(check_permission(Some(&teacher), EXPORT, REPORTS));
        assert!(!check_permission(Some(&teacher), UPDATE, SETTINGS));

        assert!(check_permission(Some(&assistant), CREATE, ATTENDANCE));
        assert!(!check_permission(Some(&assistant), UPDATE, ATTENDANCE));
        for subject in [STUDENTS, TEACHERS, REPORTS, SETTINGS] {
            assert!(!check_permission(Some(&assistant), VIEW, subject));
        }
    }

    #[test]
    fn matching_is_exact_and_case_sensitive() {
        let principal = user_with(UserRole::Principal);
        assert!(!check_permission(Some(&principal), "View", "dashboard"));
        assert!(!check_permission(Some(&principal), "view", "Dashboard"));
        assert!(!check_permission(Some(&principal), "*", "students"));
    }

    #[test]
    fn explicit_list_overrides_role() {
        let mut assistant = user_with(UserRole::Assistant);
        assistant.permissions = Some(vec![Permission::new(VIEW, REPORTS)]);

        assert!(check_permission(Some(&assistant), VIEW, REPORTS));
        // A lista do papel deixa de contar
        assert!(!check_permission(Some(&assistant), VIEW, DASHBOARD));

        assistant.permissions = Some(Vec::new());
        assert!(!check_permission(Some(&assistant), VIEW, DASHBOARD));
        assert!(effective_permissions(Some(&assistant)).is_empty());
    }

    #[test]
    fn effective_permissions_follow_the_role_table() {
        let teacher = user_with(UserRole::Teacher);
        let perms = effective_permissions(Some(&teacher));
        assert_eq!(perms.len(), TEACHER_PERMISSIONS.len());
        assert!(perms.contains(&Permission::new(EXPORT, REPORTS)));
    }
}
