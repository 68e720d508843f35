// src/services/auth_service.rs
use crate::{
    error::{AppError, AppResult},
    models::user::{User, UserRole},
    services::{
        permissions,
        storage::{self, KeyValueStore},
    },
};

/// Chave onde o utilizador autenticado fica guardado.
pub const SESSION_USER_KEY: &str = "qr_attendance_user";

// Custo mínimo do bcrypt, para os testes serem rápidos
#[cfg(test)]
pub const TEST_BCRYPT_COST: u32 = 4;

/// Verifica se a senha fornecida corresponde ao hash guardado.
pub async fn verify_password(password: &str, stored_hash: &str) -> AppResult<bool> {
    let password = password.to_string();
    let stored_hash = stored_hash.to_string();
    tokio::task::spawn_blocking(move || {
        tracing::debug!("Verificando hash bcrypt...");
        bcrypt::verify(&password, &stored_hash)
    })
    .await
    .map_err(|e| {
        tracing::error!("Erro na task spawn_blocking (verify_password): {:?}", e);
        AppError::InternalServerError
    })?
    .map_err(|e| {
        tracing::error!("Erro bcrypt ao verificar senha: {:?}", e);
        AppError::PasswordHashingError
    })
}

/// Gera um hash bcrypt para uma senha.
pub async fn hash_password(password: &str, cost: u32) -> AppResult<String> {
    let password = password.to_string();
    tokio::task::spawn_blocking(move || {
        tracing::debug!("Gerando hash bcrypt...");
        bcrypt::hash(&password, cost)
    })
    .await
    .map_err(|e| {
        tracing::error!("Erro na task spawn_blocking (hash_password): {:?}", e);
        AppError::InternalServerError
    })?
    .map_err(|e| {
        tracing::error!("Erro bcrypt ao gerar hash: {:?}", e);
        AppError::PasswordHashingError
    })
}

struct Credential {
    email: String,
    password_hash: String,
    user: User,
}

/// Tabela fixa de contas de demonstração.
pub struct CredentialTable {
    entries: Vec<Credential>,
}

impl CredentialTable {
    /// As três contas de demonstração: (email, senha, id, papel, nome).
    pub const DEMO_ACCOUNTS: [(&'static str, &'static str, &'static str, UserRole, &'static str); 3] = [
        ("principal@school.com", "admin", "1", UserRole::Principal, "أحمد المنصور"),
        ("teacher@school.com", "teacher", "2", UserRole::Teacher, "سارة القاسمي"),
        ("assistant@school.com", "assistant", "3", UserRole::Assistant, "خالد الفارسي"),
    ];

    pub async fn demo(cost: u32) -> AppResult<Self> {
        let mut entries = Vec::with_capacity(Self::DEMO_ACCOUNTS.len());
        for (email, password, id, role, name) in Self::DEMO_ACCOUNTS {
            entries.push(Credential {
                email: email.to_string(),
                password_hash: hash_password(password, cost).await?,
                user: User {
                    id: id.to_string(),
                    email: email.to_string(),
                    role,
                    name: name.to_string(),
                    permissions: None,
                },
            });
        }
        tracing::info!("Tabela de credenciais carregada ({} contas).", entries.len());
        Ok(Self { entries })
    }

    /// Email comparado sem maiúsculas; senha comparada exatamente (via bcrypt).
    pub async fn authenticate(&self, email: &str, password: &str) -> AppResult<Option<User>> {
        let lowercase_email = email.to_lowercase();
        let Some(entry) = self.entries.iter().find(|c| c.email == lowercase_email) else {
            tracing::debug!("Email desconhecido: {}", lowercase_email);
            return Ok(None);
        };

        if verify_password(password, &entry.password_hash).await? {
            Ok(Some(entry.user.clone()))
        } else {
            tracing::debug!("Senha incorreta para {}", lowercase_email);
            Ok(None)
        }
    }
}

/// Sessão de autenticação sobre um armazenamento injetado.
pub struct AuthSession<S: KeyValueStore> {
    store: S,
    user: Option<User>,
}

impl<S: KeyValueStore> AuthSession<S> {
    /// Restaura o utilizador guardado (se existir).
    pub async fn restore(store: S) -> AppResult<Self> {
        let user = storage::load_json::<User, _>(&store, SESSION_USER_KEY).await?;
        Ok(Self { store, user })
    }

    pub fn user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    pub fn into_user(self) -> Option<User> {
        self.user
    }

    pub fn can(&self, action: &str, subject: &str) -> bool {
        permissions::check_permission(self.user.as_ref(), action, subject)
    }

    /// Autentica e guarda o utilizador. Em caso de falha a sessão fica igual.
    pub async fn sign_in(
        &mut self,
        credentials: &CredentialTable,
        email: &str,
        password: &str,
    ) -> AppResult<User> {
        let Some(user) = credentials.authenticate(email, password).await? else {
            tracing::warn!("Falha de login para: {}", email);
            return Err(AppError::InvalidCredentials);
        };

        storage::save_json(&self.store, SESSION_USER_KEY, &user).await?;
        tracing::info!("✅ Login bem-sucedido para: {} ({})", user.email, user.role);
        self.user = Some(user.clone());
        Ok(user)
    }

    pub async fn sign_out(&mut self) -> AppResult<()> {
        self.store.remove_item(SESSION_USER_KEY).await?;
        match self.user.take() {
            Some(user) => tracing::info!("🚪 Utilizador '{}' desligado.", user.email),
            None => tracing::info!("🚪 Sessão anónima desligada."),
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::storage::MemoryKvStore;

    #[tokio::test]
    async fn password_hash_round_trip() {
        let hash = hash_password("segredo", TEST_BCRYPT_COST).await.unwrap();
        assert!(verify_password("segredo", &hash).await.unwrap());
        assert!(!verify_password("Segredo", &hash).await.unwrap());
    }

    #[tokio::test]
    async fn only_the_three_demo_pairs_authenticate() {
        let table = CredentialTable::demo(TEST_BCRYPT_COST).await.unwrap();

        let principal = table.authenticate("principal@school.com", "admin").await.unwrap();
        assert_eq!(principal.map(|u| u.role), Some(UserRole::Principal));
        let teacher = table.authenticate("teacher@school.com", "teacher").await.unwrap();
        assert_eq!(teacher.map(|u| u.id), Some("2".to_string()));
        let assistant = table.authenticate("assistant@school.com", "assistant").await.unwrap();
        assert_eq!(assistant.map(|u| u.role), Some(UserRole::Assistant));

        // Senhas trocadas entre contas, senha com maiúsculas, email desconhecido
        assert!(table.authenticate("principal@school.com", "teacher").await.unwrap().is_none());
        assert!(table.authenticate("teacher@school.com", "Teacher").await.unwrap().is_none());
        assert!(table.authenticate("nobody@school.com", "admin").await.unwrap().is_none());
        assert!(table.authenticate("", "").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn email_is_case_insensitive() {
        let table = CredentialTable::demo(TEST_BCRYPT_COST).await.unwrap();
        let user = table.authenticate("Principal@School.COM", "admin").await.unwrap();
        assert_eq!(user.map(|u| u.email), Some("principal@school.com".to_string()));
    }

    #[tokio::test]
    async fn sign_in_persists_and_restores() {
        let table = CredentialTable::demo(TEST_BCRYPT_COST).await.unwrap();
        let store = MemoryKvStore::new();

        let mut session = AuthSession::restore(store.clone()).await.unwrap();
        assert!(session.user().is_none());
        assert!(!session.can("view", "dashboard"));

        let user = session.sign_in(&table, "teacher@school.com", "teacher").await.unwrap();
        assert_eq!(user.role, UserRole::Teacher);
        assert!(session.can("view", "students"));
        assert!(!session.can("create", "students"));

        // Uma nova sessão sobre o mesmo armazenamento vê o mesmo utilizador
        let restored = AuthSession::restore(store.clone()).await.unwrap();
        assert_eq!(restored.user(), Some(&user));
    }

    #[tokio::test]
    async fn failed_sign_in_keeps_previous_state() {
        let table = CredentialTable::demo(TEST_BCRYPT_COST).await.unwrap();
        let store = MemoryKvStore::new();
        let mut session = AuthSession::restore(store.clone()).await.unwrap();

        let err = session.sign_in(&table, "teacher@school.com", "wrong").await.unwrap_err();
        assert!(matches!(err, AppError::InvalidCredentials));
        assert!(session.user().is_none());
        assert!(store.get_item(SESSION_USER_KEY).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn sign_out_behaves_as_anonymous() {
        let table = CredentialTable::demo(TEST_BCRYPT_COST).await.unwrap();
        let store = MemoryKvStore::new();
        let mut session = AuthSession::restore(store.clone()).await.unwrap();
        session.sign_in(&table, "principal@school.com", "admin").await.unwrap();
        assert!(session.can("delete", "students"));

        session.sign_out().await.unwrap();
        assert!(session.user().is_none());
        assert!(!session.can("view", "dashboard"));

        let restored = AuthSession::restore(store).await.unwrap();
        assert!(restored.user().is_none());
        assert!(!restored.can("view", "dashboard"));
    }
}
