// src/services/session.rs

use std::sync::Arc;

use serde_json::Value;

use crate::common::error::{AppError, looks_corrupted};
use crate::models::auth::{License, Role};
use crate::permissions;
use crate::remote::auth_api::{AuthApi, AuthEvent, AuthUser};
use crate::remote::data_api::{DataApi, Filter};
use crate::remote::session_store::SessionStore;

// =============================================================================
//  CONTEXTO DE SESSÃO
// =============================================================================
//
// Dono único do estado de autenticação do processo. Consumidores recebem uma
// referência; ninguém mais muta usuário/papel/tenant. As transições seguem a
// máquina: Uninitialized → Loading → {Authenticated, Anonymous, Reset}.

/// Estado corrente da sessão.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionState {
    Uninitialized,
    Loading,
    Authenticated(ActiveSession),
    Anonymous,
    /// Recuperação destrutiva executada: storage local zerado, sign-out
    /// forçado. A UI deve voltar para a tela de login.
    Reset,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ActiveSession {
    pub user: AuthUser,
    pub role: Option<Role>,
    pub company_id: Option<String>,
}

/// Papel e tenant resolvidos, devolvidos direto para o chamador do `login`.
/// Evita a corrida de ler o contexto logo depois do login resolver.
#[derive(Debug, Clone, PartialEq)]
pub struct LoginOutcome {
    pub role: Option<Role>,
    pub company_id: Option<String>,
}

pub struct SessionContext {
    auth: Arc<dyn AuthApi>,
    data: Arc<dyn DataApi>,
    store: Arc<SessionStore>,
    state: SessionState,
    loading: bool,
}

impl SessionContext {
    pub fn new(auth: Arc<dyn AuthApi>, data: Arc<dyn DataApi>, store: Arc<SessionStore>) -> Self {
        Self {
            auth,
            data,
            store,
            state: SessionState::Uninitialized,
            loading: false,
        }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn user(&self) -> Option<&AuthUser> {
        match &self.state {
            SessionState::Authenticated(active) => Some(&active.user),
            _ => None,
        }
    }

    pub fn role(&self) -> Option<Role> {
        match &self.state {
            SessionState::Authenticated(active) => active.role,
            _ => None,
        }
    }

    pub fn company_id(&self) -> Option<&str> {
        match &self.state {
            SessionState::Authenticated(active) => active.company_id.as_deref(),
            _ => None,
        }
    }

    /// Consulta a tabela estática de permissões com o papel corrente.
    /// Sessão anônima ou perfil sem papel negam tudo.
    pub fn has_permission(&self, required: &[&str]) -> bool {
        permissions::has_permission(self.role(), required)
    }

    /// Tenta restaurar uma sessão remota existente. Chamado uma vez, na
    /// subida do processo.
    pub async fn initialize(&mut self) {
        if self.state != SessionState::Uninitialized {
            return;
        }
        self.loading = true;
        self.state = SessionState::Loading;

        match self.auth.get_session().await {
            Ok(Some(session)) => {
                let (role, company_id) = self.hydrate_profile(&session.user.id).await;
                self.state = SessionState::Authenticated(ActiveSession {
                    user: session.user,
                    role,
                    company_id,
                });
            }
            Ok(None) => {
                self.state = SessionState::Anonymous;
            }
            Err(err) => {
                let message = err.ui_message();
                if matches!(err, AppError::StorageCorruption(_)) || looks_corrupted(&message) {
                    self.hard_reset(&message).await;
                } else {
                    tracing::error!("🔥 Falha ao restaurar sessão: {message}");
                    self.state = SessionState::Anonymous;
                }
            }
        }
        self.loading = false;
    }

    /// Autentica e devolve papel/tenant resolvidos na mesma chamada.
    /// E-mail é normalizado (trim + minúsculas) antes de ir para o serviço.
    pub async fn login(&mut self, email: &str, password: &str) -> Result<LoginOutcome, AppError> {
        self.loading = true;
        let normalized = email.trim().to_lowercase();

        let session = match self.auth.sign_in(&normalized, password).await {
            Ok(session) => session,
            Err(err) => {
                // Erro de credencial não mexe no estado da sessão.
                self.loading = false;
                return Err(err);
            }
        };

        let (role, company_id) = self.hydrate_profile(&session.user.id).await;
        self.state = SessionState::Authenticated(ActiveSession {
            user: session.user,
            role,
            company_id: company_id.clone(),
        });
        self.loading = false;
        Ok(LoginOutcome { role, company_id })
    }

    /// Registra uma conta nova: sign-up no serviço de auth e o perfil
    /// mínimo {id, email} em seguida. Sem rollback do primeiro passo; a
    /// falha do perfil é devolvida com mensagem própria.
    pub async fn signup(&mut self, email: &str, password: &str) -> Result<(), AppError> {
        let normalized = email.trim().to_lowercase();
        let user = self.auth.sign_up(&normalized, password).await?;

        let mut profile = crate::remote::data_api::Row::new();
        profile.insert("id".into(), Value::String(user.id));
        profile.insert("email".into(), Value::String(normalized));
        self.data
            .insert("profiles", vec![profile])
            .await
            .map_err(|err| {
                AppError::Auth(format!(
                    "Account created but profile setup failed: {}",
                    err.ui_message()
                ))
            })?;
        Ok(())
    }

    /// Sign-out remoto em melhor esforço; o estado local é limpo
    /// incondicionalmente para a UI nunca ficar "presa logada".
    pub async fn logout(&mut self) {
        self.loading = true;
        if let Err(err) = self.auth.sign_out().await {
            tracing::error!("🔥 signOut falhou: {err}");
        }
        self.store.clear();
        self.state = SessionState::Anonymous;
        self.loading = false;
    }

    /// Gate obrigatório pós-login: licença do tenant presente, ativa e não
    /// expirada (expiração estritamente anterior a agora reprova).
    pub async fn check_license(&self, company_override: Option<&str>) -> Result<String, AppError> {
        let company_id = company_override
            .map(str::to_owned)
            .or_else(|| self.company_id().map(str::to_owned))
            .ok_or_else(|| AppError::License("No company ID available".into()))?;

        let rows = self
            .data
            .select(
                "licenses",
                "status,expiration_date",
                &[Filter::eq("company_id", company_id)],
            )
            .await
            .map_err(|_| AppError::License("License not found.".into()))?;

        let row = rows
            .first()
            .ok_or_else(|| AppError::License("License not found.".into()))?;

        let license = License {
            status: field_str(row.get("status")),
            expiration_date: field_str(row.get("expiration_date")),
        };
        if !license.is_valid() {
            return Err(AppError::License("License is invalid or expired.".into()));
        }
        Ok(license.status)
    }

    /// Callback do canal de mudanças de autenticação do serviço remoto.
    pub async fn handle_auth_event(&mut self, event: AuthEvent) {
        match event {
            AuthEvent::SignedOut => {
                self.state = SessionState::Anonymous;
                self.loading = false;
            }
            AuthEvent::SignedIn(session) | AuthEvent::TokenRefreshed(session) => {
                self.loading = true;
                let (role, company_id) = self.hydrate_profile(&session.user.id).await;
                self.state = SessionState::Authenticated(ActiveSession {
                    user: session.user,
                    role,
                    company_id,
                });
                self.loading = false;
            }
        }
    }

    /// Busca papel e tenant do usuário na tabela `profiles`. Falha de
    /// hidratação não derruba o login; vira sessão sem papel (nega tudo).
    async fn hydrate_profile(&self, user_id: &str) -> (Option<Role>, Option<String>) {
        let rows = match self
            .data
            .select("profiles", "role,company_id", &[Filter::eq("id", user_id)])
            .await
        {
            Ok(rows) => rows,
            Err(err) => {
                tracing::error!("🔥 Falha ao hidratar perfil: {err}");
                return (None, None);
            }
        };

        let Some(row) = rows.first() else {
            tracing::error!("🔥 Perfil não encontrado para o usuário {user_id}");
            return (None, None);
        };

        let role = row
            .get("role")
            .and_then(Value::as_str)
            .and_then(|s| s.parse::<Role>().ok());
        let company_id = row
            .get("company_id")
            .and_then(Value::as_str)
            .map(str::to_owned);
        (role, company_id)
    }

    /// Recuperação destrutiva: zera o storage persistido, força sign-out e
    /// manda a UI de volta para a entrada de login. Melhor esforço, não
    /// garante consistência remota.
    async fn hard_reset(&mut self, reason: &str) {
        tracing::warn!("⚠️ Sessão local corrompida ({reason}); executando reset completo");
        self.store.clear();
        if let Err(err) = self.auth.sign_out().await {
            tracing::warn!("⚠️ sign-out do reset falhou (ignorado): {err}");
        }
        self.state = SessionState::Reset;
    }
}

fn field_str(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(s)) => s.clone(),
        Some(other) if !other.is_null() => other.to_string(),
        _ => String::new(),
    }
}
