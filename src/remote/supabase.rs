// src/remote/supabase.rs

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use reqwest::{Client, Method, RequestBuilder, StatusCode};
use serde::Deserialize;
use serde_json::{Value, json};
use url::Url;

use crate::common::error::{AppError, looks_corrupted};
use crate::remote::auth_api::{AuthApi, AuthSession, AuthUser, UserChange};
use crate::remote::data_api::{DataApi, Filter, Row};
use crate::remote::session_store::SessionStore;

// =============================================================================
//  CLIENTES HTTP PARA O BACKEND HOSPEDADO
// =============================================================================
//
// Auth fala com o GoTrue (/auth/v1), dados com o PostgREST (/rest/v1).
// Nenhum timeout local: a detecção de falha é toda do serviço remoto.

/// Corpo de erro do serviço de auth; o campo varia conforme o endpoint.
#[derive(Debug, Deserialize)]
struct RemoteErrorBody {
    error_description: Option<String>,
    msg: Option<String>,
    message: Option<String>,
}

impl RemoteErrorBody {
    fn message(self, status: StatusCode) -> String {
        self.error_description
            .or(self.msg)
            .or(self.message)
            .unwrap_or_else(|| format!("HTTP {status}"))
    }
}

async fn error_message(response: reqwest::Response) -> String {
    let status = response.status();
    match response.json::<RemoteErrorBody>().await {
        Ok(body) => body.message(status),
        Err(_) => format!("HTTP {status}"),
    }
}

/// Resposta de token do GoTrue (password grant e refresh).
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    refresh_token: Option<String>,
    expires_in: Option<i64>,
    expires_at: Option<i64>,
    user: AuthUser,
}

impl TokenResponse {
    fn into_session(self) -> AuthSession {
        let expires_at = self
            .expires_at
            .or_else(|| self.expires_in.map(|secs| Utc::now().timestamp() + secs));
        AuthSession {
            access_token: self.access_token,
            refresh_token: self.refresh_token,
            expires_at,
            user: self.user,
        }
    }
}

// -----------------------------------------------------------------------------
//  Auth
// -----------------------------------------------------------------------------

pub struct SupabaseAuthClient {
    http: Client,
    base_url: Url,
    anon_key: String,
    store: Arc<SessionStore>,
}

impl SupabaseAuthClient {
    pub fn new(http: Client, base_url: Url, anon_key: String, store: Arc<SessionStore>) -> Self {
        Self {
            http,
            base_url,
            anon_key,
            store,
        }
    }

    fn endpoint(&self, path: &str) -> Result<Url, AppError> {
        self.base_url
            .join(path)
            .map_err(|e| AppError::Internal(anyhow::anyhow!("URL de auth inválida: {e}")))
    }

    fn request(&self, method: Method, url: Url, bearer: &str) -> RequestBuilder {
        self.http
            .request(method, url)
            .header("apikey", &self.anon_key)
            .bearer_auth(bearer)
    }

    async fn refresh(&self, refresh_token: &str) -> Result<AuthSession, AppError> {
        let url = self.endpoint("auth/v1/token?grant_type=refresh_token")?;
        let response = self
            .request(Method::POST, url, &self.anon_key)
            .json(&json!({ "refresh_token": refresh_token }))
            .send()
            .await?;

        if !response.status().is_success() {
            let message = error_message(response).await;
            // Refresh token rejeitado é sintoma clássico de storage podre.
            if looks_corrupted(&message) {
                return Err(AppError::StorageCorruption(message));
            }
            return Err(AppError::Auth(message));
        }

        let session = response.json::<TokenResponse>().await?.into_session();
        self.store.save(&session)?;
        Ok(session)
    }
}

#[async_trait]
impl AuthApi for SupabaseAuthClient {
    async fn sign_in(&self, email: &str, password: &str) -> Result<AuthSession, AppError> {
        let url = self.endpoint("auth/v1/token?grant_type=password")?;
        let response = self
            .request(Method::POST, url, &self.anon_key)
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(AppError::Auth(error_message(response).await));
        }

        let session = response.json::<TokenResponse>().await?.into_session();
        self.store.save(&session)?;
        Ok(session)
    }

    async fn sign_up(&self, email: &str, password: &str) -> Result<AuthUser, AppError> {
        let url = self.endpoint("auth/v1/signup")?;
        let response = self
            .request(Method::POST, url, &self.anon_key)
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(AppError::Auth(error_message(response).await));
        }

        // Com confirmação de e-mail ligada o GoTrue devolve o usuário puro;
        // desligada, devolve a sessão com o usuário embutido.
        let body = response.json::<Value>().await?;
        let user_value = body.get("user").cloned().unwrap_or(body);
        let user: AuthUser = serde_json::from_value(user_value)?;
        Ok(user)
    }

    async fn sign_out(&self) -> Result<(), AppError> {
        let Some(session) = self.store.load()? else {
            return Ok(());
        };
        let url = self.endpoint("auth/v1/logout")?;
        let response = self
            .request(Method::POST, url, &session.access_token)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(AppError::Auth(error_message(response).await));
        }
        self.store.clear();
        Ok(())
    }

    async fn get_session(&self) -> Result<Option<AuthSession>, AppError> {
        let Some(session) = self.store.load()? else {
            return Ok(None);
        };

        let expired = session
            .expires_at
            .is_some_and(|at| at <= Utc::now().timestamp());
        if !expired {
            return Ok(Some(session));
        }

        let Some(refresh_token) = session.refresh_token.clone() else {
            return Err(AppError::StorageCorruption(
                "Refresh Token Not Found".into(),
            ));
        };
        Ok(Some(self.refresh(&refresh_token).await?))
    }

    async fn update_user(&self, change: UserChange) -> Result<(), AppError> {
        let session = self
            .store
            .load()?
            .ok_or_else(|| AppError::Auth("User not found".into()))?;

        let body = match change {
            UserChange::Email(email) => json!({ "email": email }),
            UserChange::Password(password) => json!({ "password": password }),
        };

        let url = self.endpoint("auth/v1/user")?;
        let response = self
            .request(Method::PUT, url, &session.access_token)
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(AppError::Auth(error_message(response).await));
        }
        Ok(())
    }
}

// -----------------------------------------------------------------------------
//  Dados
// -----------------------------------------------------------------------------

pub struct SupabaseDataClient {
    http: Client,
    base_url: Url,
    anon_key: String,
    store: Arc<SessionStore>,
}

impl SupabaseDataClient {
    pub fn new(http: Client, base_url: Url, anon_key: String, store: Arc<SessionStore>) -> Self {
        Self {
            http,
            base_url,
            anon_key,
            store,
        }
    }

    fn table_url(&self, table: &str, filters: &[Filter]) -> Result<Url, AppError> {
        let mut url = self
            .base_url
            .join(&format!("rest/v1/{table}"))
            .map_err(|e| AppError::Internal(anyhow::anyhow!("URL de dados inválida: {e}")))?;
        for filter in filters {
            let rendered = match &filter.value {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            url.query_pairs_mut()
                .append_pair(&filter.column, &format!("eq.{rendered}"));
        }
        Ok(url)
    }

    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        // O RLS do serviço decide o que a sessão enxerga; sem sessão, vale o
        // acesso anônimo da apikey.
        let bearer = self
            .store
            .load()
            .ok()
            .flatten()
            .map(|s| s.access_token)
            .unwrap_or_else(|| self.anon_key.clone());
        self.http
            .request(method, url)
            .header("apikey", &self.anon_key)
            .bearer_auth(bearer)
    }
}

#[async_trait]
impl DataApi for SupabaseDataClient {
    async fn select(
        &self,
        table: &str,
        columns: &str,
        filters: &[Filter],
    ) -> Result<Vec<Row>, AppError> {
        let mut url = self.table_url(table, filters)?;
        url.query_pairs_mut().append_pair("select", columns);

        let response = self.request(Method::GET, url).send().await?;
        if !response.status().is_success() {
            return Err(AppError::Remote(error_message(response).await));
        }
        Ok(response.json::<Vec<Row>>().await?)
    }

    async fn insert(&self, table: &str, rows: Vec<Row>) -> Result<Vec<Row>, AppError> {
        let url = self.table_url(table, &[])?;
        let response = self
            .request(Method::POST, url)
            .header("Prefer", "return=representation")
            .json(&rows)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(AppError::Remote(error_message(response).await));
        }
        Ok(response.json::<Vec<Row>>().await?)
    }

    async fn update(&self, table: &str, patch: Row, filters: &[Filter]) -> Result<(), AppError> {
        let url = self.table_url(table, filters)?;
        let response = self
            .request(Method::PATCH, url)
            .json(&patch)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(AppError::Remote(error_message(response).await));
        }
        Ok(())
    }

    async fn delete(&self, table: &str, filters: &[Filter]) -> Result<(), AppError> {
        let url = self.table_url(table, filters)?;
        let response = self.request(Method::DELETE, url).send().await?;

        if !response.status().is_success() {
            return Err(AppError::Remote(error_message(response).await));
        }
        Ok(())
    }

    async fn count(&self, table: &str, filters: &[Filter]) -> Result<u64, AppError> {
        let mut url = self.table_url(table, filters)?;
        url.query_pairs_mut().append_pair("select", "*");

        let response = self
            .request(Method::HEAD, url)
            .header("Prefer", "count=exact")
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(AppError::Remote(error_message(response).await));
        }

        // Content-Range: "0-24/42" ou "*/42"; a contagem vem depois da barra.
        let total = response
            .headers()
            .get("content-range")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.rsplit('/').next())
            .and_then(|v| v.parse::<u64>().ok())
            .ok_or_else(|| AppError::Remote("resposta de contagem sem Content-Range".into()))?;
        Ok(total)
    }
}
