// src/remote/session_store.rs

use std::fs;
use std::path::PathBuf;
use std::sync::Mutex;

use crate::common::error::AppError;
use crate::remote::auth_api::AuthSession;

// O análogo do storage do navegador: a sessão emitida pelo serviço de auth,
// persistida na íntegra como JSON. É o único estado local durável do painel
// e é apagado por inteiro no logout ou quando detectamos corrupção.
#[derive(Debug)]
pub struct SessionStore {
    path: Option<PathBuf>,
    cache: Mutex<Option<AuthSession>>,
}

impl SessionStore {
    /// Sem persistência em disco; a sessão vive só no processo.
    pub fn in_memory() -> Self {
        Self {
            path: None,
            cache: Mutex::new(None),
        }
    }

    pub fn with_file(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Some(path.into()),
            cache: Mutex::new(None),
        }
    }

    /// Carrega a sessão persistida. Arquivo ilegível ou JSON podre viram
    /// `StorageCorruption`: o chamador dispara a recuperação destrutiva.
    pub fn load(&self) -> Result<Option<AuthSession>, AppError> {
        if let Some(session) = self.cache.lock().unwrap().clone() {
            return Ok(Some(session));
        }
        let Some(path) = &self.path else {
            return Ok(None);
        };
        if !path.exists() {
            return Ok(None);
        }
        let raw = fs::read_to_string(path)
            .map_err(|e| AppError::StorageCorruption(e.to_string()))?;
        let session: AuthSession = serde_json::from_str(&raw)
            .map_err(|e| AppError::StorageCorruption(e.to_string()))?;
        *self.cache.lock().unwrap() = Some(session.clone());
        Ok(Some(session))
    }

    pub fn save(&self, session: &AuthSession) -> Result<(), AppError> {
        *self.cache.lock().unwrap() = Some(session.clone());
        if let Some(path) = &self.path {
            let raw = serde_json::to_string(session)?;
            fs::write(path, raw).map_err(|e| {
                AppError::Internal(anyhow::anyhow!("falha ao gravar sessão: {e}"))
            })?;
        }
        Ok(())
    }

    /// Limpeza total, melhor esforço: nunca falha, mesmo sem conseguir
    /// remover o arquivo.
    pub fn clear(&self) {
        *self.cache.lock().unwrap() = None;
        if let Some(path) = &self.path {
            let _ = fs::remove_file(path);
        }
    }
}
