// src/services/storage.rs
//! Armazenamento chave/valor injetável.
//!
//! Substitui o "local storage" do navegador: as definições da escola vivem
//! na tabela `kv_store` e o utilizador autenticado vive na sessão do cliente.
use crate::error::{AppError, AppResult};
use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};
use sqlx::SqlitePool;
use std::{collections::HashMap, sync::Arc};
use tokio::sync::RwLock;
use tower_sessions::Session;

#[async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn get_item(&self, key: &str) -> AppResult<Option<String>>;
    async fn set_item(&self, key: &str, value: &str) -> AppResult<()>;
    async fn remove_item(&self, key: &str) -> AppResult<()>;
}

/// Lê e desserializa um blob JSON. Um blob corrompido é registado e
/// tratado como ausente.
pub async fn load_json<T, S>(store: &S, key: &str) -> AppResult<Option<T>>
where
    T: DeserializeOwned,
    S: KeyValueStore + ?Sized,
{
    let Some(raw) = store.get_item(key).await? else {
        return Ok(None);
    };
    match serde_json::from_str::<T>(&raw) {
        Ok(value) => Ok(Some(value)),
        Err(e) => {
            tracing::warn!("Valor inválido na chave '{}', ignorado: {}", key, e);
            Ok(None)
        }
    }
}

pub async fn save_json<T, S>(store: &S, key: &str, value: &T) -> AppResult<()>
where
    T: Serialize + ?Sized,
    S: KeyValueStore + ?Sized,
{
    let raw = serde_json::to_string(value)?;
    store.set_item(key, &raw).await
}

// --- SQLite ---

#[derive(Clone)]
pub struct SqliteKvStore {
    db_pool: SqlitePool,
}

impl SqliteKvStore {
    pub fn new(db_pool: SqlitePool) -> Self {
        Self { db_pool }
    }
}

#[async_trait]
impl KeyValueStore for SqliteKvStore {
    async fn get_item(&self, key: &str) -> AppResult<Option<String>> {
        tracing::debug!("kv_store: lendo '{}'", key);
        let value = sqlx::query_scalar::<_, String>("SELECT value FROM kv_store WHERE key = ?1")
            .bind(key)
            .fetch_optional(&self.db_pool)
            .await?;
        Ok(value)
    }

    async fn set_item(&self, key: &str, value: &str) -> AppResult<()> {
        tracing::debug!("kv_store: gravando '{}'", key);
        sqlx::query(
            r#"
            INSERT INTO kv_store (key, value)
            VALUES (?1, ?2)
            ON CONFLICT(key) DO UPDATE SET value = excluded.value
            "#,
        )
        .bind(key)
        .bind(value)
        .execute(&self.db_pool)
        .await?;
        Ok(())
    }

    async fn remove_item(&self, key: &str) -> AppResult<()> {
        tracing::debug!("kv_store: removendo '{}'", key);
        sqlx::query("DELETE FROM kv_store WHERE key = ?1")
            .bind(key)
            .execute(&self.db_pool)
            .await?;
        Ok(())
    }
}

// --- Memória ---

#[derive(Clone, Default)]
pub struct MemoryKvStore {
    items: Arc<RwLock<HashMap<String, String>>>,
}

impl MemoryKvStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl KeyValueStore for MemoryKvStore {
    async fn get_item(&self, key: &str) -> AppResult<Option<String>> {
        Ok(self.items.read().await.get(key).cloned())
    }

    async fn set_item(&self, key: &str, value: &str) -> AppResult<()> {
        self.items
            .write()
            .await
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn remove_item(&self, key: &str) -> AppResult<()> {
        self.items.write().await.remove(key);
        Ok(())
    }
}

// --- Sessão do cliente (tower-sessions) ---

#[async_trait]
impl KeyValueStore for Session {
    async fn get_item(&self, key: &str) -> AppResult<Option<String>> {
        self.get::<String>(key)
            .await
            .map_err(|e| AppError::SessionError(format!("Falha ao ler '{}': {}", key, e)))
    }

    async fn set_item(&self, key: &str, value: &str) -> AppResult<()> {
        self.insert(key, value.to_string())
            .await
            .map_err(|e| AppError::SessionError(format!("Falha ao inserir '{}': {}", key, e)))
    }

    async fn remove_item(&self, key: &str) -> AppResult<()> {
        self.remove::<String>(key)
            .await
            .map(|_| ())
            .map_err(|e| AppError::SessionError(format!("Falha ao remover '{}': {}", key, e)))
    }
}
