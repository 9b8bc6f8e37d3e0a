// src/common/error.rs

use thiserror::Error;

// Nosso tipo de erro central, com `thiserror` para melhor ergonomia.
// Toda operação remota devolve AppError; a camada de UI converte em
// notificação transitória em vez de derrubar o processo.
#[derive(Debug, Error)]
pub enum AppError {
    // Erro de campo: nunca chega na camada remota, bloqueia o submit.
    #[error("{field}: {message}")]
    Validation { field: String, message: String },

    // Falha de uma operação no serviço de dados remoto.
    #[error("Erro do serviço remoto: {0}")]
    Remote(String),

    // Falha de autenticação (login, signup, update de usuário).
    #[error("Falha de autenticação: {0}")]
    Auth(String),

    // Licença ausente, inativa ou expirada. Bloqueia a navegação pós-login.
    #[error("Licença inválida: {0}")]
    License(String),

    // Estado persistido local ilegível: dispara a recuperação destrutiva.
    #[error("Armazenamento local corrompido: {0}")]
    StorageCorruption(String),

    // Arquivo de importação ilegível ou incompleto.
    #[error("Falha ao processar arquivo: {0}")]
    File(String),

    #[error("Erro de rede")]
    Http(#[from] reqwest::Error),

    #[error("Erro de serialização")]
    Serde(#[from] serde_json::Error),

    // Variante genérica para qualquer outro erro inesperado
    #[error("Erro interno")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        AppError::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Mensagem voltada para a UI, sem o prefixo da variante.
    pub fn ui_message(&self) -> String {
        match self {
            AppError::Validation { field, message } => format!("{field}: {message}"),
            AppError::Remote(m)
            | AppError::Auth(m)
            | AppError::License(m)
            | AppError::File(m)
            | AppError::StorageCorruption(m) => m.clone(),
            other => other.to_string(),
        }
    }
}

// Assinaturas conhecidas de uma sessão persistida podre. O cliente de auth
// devolve essas mensagens quando o token local não é mais aproveitável.
const CORRUPTION_MARKERS: &[&str] = &[
    "Invalid Refresh Token",
    "Refresh Token Not Found",
    "unexpected token",
    "invalid type",
    "EOF while parsing",
];

/// Detecta, por substring, se uma mensagem de erro indica estado local corrompido.
pub fn looks_corrupted(message: &str) -> bool {
    CORRUPTION_MARKERS.iter().any(|m| message.contains(m))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detecta_marcadores_de_corrupcao() {
        assert!(looks_corrupted("AuthApiError: Invalid Refresh Token"));
        assert!(looks_corrupted("EOF while parsing a value at line 1"));
        assert!(!looks_corrupted("Invalid login credentials"));
    }

    #[test]
    fn mensagem_de_ui_sem_prefixo() {
        let err = AppError::Remote("duplicate key".into());
        assert_eq!(err.ui_message(), "duplicate key");

        let err = AppError::validation("Email", "Invalid email format");
        assert_eq!(err.ui_message(), "Email: Invalid email format");
    }
}
