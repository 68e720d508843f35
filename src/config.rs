// src/config.rs
use crate::error::{AppError, AppResult};
use chrono::NaiveTime;
use std::{env, net::SocketAddr, time::Duration};

pub const DEFAULT_DATABASE_URL: &str = "sqlite://qr_attendance.db";
pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";
pub const DEFAULT_LATE_AFTER: &str = "07:30";
pub const DEFAULT_LOOKUP_DELAY_MS: u64 = 1000;

/// Configuração da aplicação, lida das variáveis de ambiente (e do `.env`).
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub bind_addr: SocketAddr,
    // Obrigatório e com pelo menos 64 bytes (assina o cookie de sessão)
    pub session_secret: Option<String>,
    /// A partir desta hora a entrada conta como atraso.
    pub late_after: NaiveTime,
    /// Atraso simulado da consulta do aluno antes de registar a presença.
    pub lookup_delay: Duration,
    pub bcrypt_cost: u32,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database_url: DEFAULT_DATABASE_URL.to_string(),
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 3000)),
            session_secret: None,
            late_after: NaiveTime::from_hms_opt(7, 30, 0).unwrap_or_default(),
            lookup_delay: Duration::from_millis(DEFAULT_LOOKUP_DELAY_MS),
            bcrypt_cost: bcrypt::DEFAULT_COST,
        }
    }
}

impl AppConfig {
    /// Lê só o ambiente do processo. O `.env` é carregado uma vez no `main`.
    pub fn from_env() -> AppResult<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Constrói a configuração a partir de uma função de consulta (facilita os testes).
    pub fn from_lookup<F>(lookup: F) -> AppResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_url = lookup("DATABASE_URL").unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string());

        let bind_raw = lookup("BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());
        let bind_addr = bind_raw
            .parse::<SocketAddr>()
            .map_err(|e| AppError::ConfigError(format!("BIND_ADDR '{}' inválido: {}", bind_raw, e)))?;

        let late_raw = lookup("ATTENDANCE_LATE_AFTER").unwrap_or_else(|| DEFAULT_LATE_AFTER.to_string());
        let late_after = NaiveTime::parse_from_str(&late_raw, "%H:%M").map_err(|e| {
            AppError::ConfigError(format!("ATTENDANCE_LATE_AFTER '{}' inválido: {}", late_raw, e))
        })?;

        let lookup_delay = match lookup("ATTENDANCE_LOOKUP_DELAY_MS") {
            Some(raw) => Duration::from_millis(raw.parse::<u64>().map_err(|e| {
                AppError::ConfigError(format!("ATTENDANCE_LOOKUP_DELAY_MS '{}' inválido: {}", raw, e))
            })?),
            None => Duration::from_millis(DEFAULT_LOOKUP_DELAY_MS),
        };

        let bcrypt_cost = match lookup("BCRYPT_COST") {
            Some(raw) => {
                let cost = raw
                    .parse::<u32>()
                    .map_err(|e| AppError::ConfigError(format!("BCRYPT_COST '{}' inválido: {}", raw, e)))?;
                // Limites aceites pelo bcrypt
                if !(4..=31).contains(&cost) {
                    return Err(AppError::ConfigError(format!(
                        "BCRYPT_COST deve estar entre 4 e 31 (recebido {})",
                        cost
                    )));
                }
                cost
            }
            None => bcrypt::DEFAULT_COST,
        };

        Ok(Self {
            database_url,
            bind_addr,
            session_secret: lookup("SESSION_SECRET"),
            late_after,
            lookup_delay,
            bcrypt_cost,
        })
    }

    /// Devolve o segredo de sessão validado.
    pub fn require_session_secret(&self) -> AppResult<&str> {
        let secret = self
            .session_secret
            .as_deref()
            .ok_or_else(|| AppError::ConfigError("SESSION_SECRET não definida".to_string()))?;
        if secret.len() < 64 {
            return Err(AppError::ConfigError(
                "SESSION_SECRET deve ter pelo menos 64 bytes".to_string(),
            ));
        }
        Ok(secret)
    }
}
