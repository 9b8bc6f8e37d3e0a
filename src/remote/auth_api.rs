// src/remote/auth_api.rs

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::common::error::AppError;

/// Usuário como o serviço de autenticação o descreve.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthUser {
    pub id: String,
    pub email: Option<String>,
}

/// Sessão emitida pelo serviço de autenticação. É isso que vai para o
/// armazenamento local, na íntegra.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthSession {
    pub access_token: String,
    pub refresh_token: Option<String>,
    /// Instante de expiração do access token (epoch em segundos).
    pub expires_at: Option<i64>,
    pub user: AuthUser,
}

/// Alteração suportada pelo update-user do serviço de auth.
#[derive(Debug, Clone, PartialEq)]
pub enum UserChange {
    Email(String),
    Password(String),
}

/// Evento entregue pelo canal de mudanças de autenticação.
#[derive(Debug, Clone, PartialEq)]
pub enum AuthEvent {
    SignedIn(AuthSession),
    TokenRefreshed(AuthSession),
    SignedOut,
}

// Fronteira fina com o serviço de autenticação hospedado. O resto do painel
// só conhece este trait; a implementação HTTP fica em `remote::supabase`.
#[async_trait]
pub trait AuthApi: Send + Sync {
    /// Autentica com e-mail e senha. O chamador já entrega o e-mail
    /// normalizado; aqui não se mexe no valor.
    async fn sign_in(&self, email: &str, password: &str) -> Result<AuthSession, AppError>;

    /// Cria uma conta nova e devolve o usuário criado.
    async fn sign_up(&self, email: &str, password: &str) -> Result<AuthUser, AppError>;

    /// Encerra a sessão remota.
    async fn sign_out(&self) -> Result<(), AppError>;

    /// Sessão corrente, se houver. `StorageCorruption` quando o estado
    /// persistido local não é recuperável.
    async fn get_session(&self) -> Result<Option<AuthSession>, AppError>;

    /// Atualiza e-mail ou senha do usuário autenticado.
    async fn update_user(&self, change: UserChange) -> Result<(), AppError>;
}
