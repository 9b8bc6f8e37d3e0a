// src/services/account.rs

use std::sync::Arc;

use serde_json::Value;

use crate::common::error::AppError;
use crate::common::notify::{Notification, Notifier};
use crate::remote::auth_api::{AuthApi, UserChange};
use crate::remote::data_api::{DataApi, Filter, Row};

// =============================================================================
//  MINHA CONTA
// =============================================================================
//
// Dados do usuário logado: nome vem do perfil, e-mail e senha vivem no
// serviço de auth. Cada atualização é uma chamada isolada; as mensagens de
// sucesso e erro são as que a tela sempre mostrou.

#[derive(Debug, Clone, Default)]
pub struct Account {
    pub user_id: String,
    pub email: Option<String>,
    pub name: String,
}

pub struct AccountService {
    auth: Arc<dyn AuthApi>,
    data: Arc<dyn DataApi>,
    notifier: Notifier,
}

impl AccountService {
    pub fn new(auth: Arc<dyn AuthApi>, data: Arc<dyn DataApi>) -> Self {
        Self {
            auth,
            data,
            notifier: Notifier::new(),
        }
    }

    pub fn take_notifications(&mut self) -> Vec<Notification> {
        self.notifier.drain()
    }

    /// Sessão ativa + nome do perfil correspondente.
    pub async fn fetch(&mut self) -> Result<Account, AppError> {
        let session = self
            .auth
            .get_session()
            .await?
            .ok_or_else(|| AppError::Auth("User not found".into()))?;

        let profiles = self
            .data
            .select(
                "profiles",
                "name",
                &[Filter::eq("id", Value::String(session.user.id.clone()))],
            )
            .await?;

        let name = profiles
            .first()
            .and_then(|row| row.get("name"))
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();

        Ok(Account {
            user_id: session.user.id,
            email: session.user.email,
            name,
        })
    }

    /// Atualiza o nome do perfil. Nome em branco não sai do cliente.
    pub async fn update_name(&mut self, user_id: &str, name: &str) -> Result<(), AppError> {
        if user_id.is_empty() {
            return Err(AppError::Auth("User not found".into()));
        }
        if name.trim().is_empty() {
            return Err(AppError::validation("name", "Name is required"));
        }

        let mut patch = Row::new();
        patch.insert("name".into(), Value::String(name.into()));
        if let Err(err) = self
            .data
            .update(
                "profiles",
                patch,
                &[Filter::eq("id", Value::String(user_id.into()))],
            )
            .await
        {
            self.notifier.error(err.ui_message());
            return Err(err);
        }

        self.notifier.success("Profile updated successfully!");
        Ok(())
    }

    /// Troca o e-mail via serviço de auth (que manda a confirmação).
    pub async fn update_email(&mut self, email: &str) -> Result<(), AppError> {
        if email.is_empty() {
            return Err(AppError::validation("email", "Email is required"));
        }

        if let Err(err) = self.auth.update_user(UserChange::Email(email.into())).await {
            self.notifier.error(err.ui_message());
            return Err(err);
        }

        self.notifier
            .success("Email updated successfully! Please check your email for verification.");
        Ok(())
    }

    /// Troca a senha. As duas caixas precisam bater e ter ao menos 6
    /// caracteres antes de qualquer chamada remota.
    pub async fn update_password(
        &mut self,
        password: &str,
        confirm: &str,
    ) -> Result<(), AppError> {
        if password.is_empty() || confirm.is_empty() {
            return Err(AppError::validation("password", "All fields are required"));
        }
        if password != confirm {
            return Err(AppError::validation("password", "Passwords do not match"));
        }
        if password.len() < 6 {
            return Err(AppError::validation(
                "password",
                "Password must be at least 6 characters",
            ));
        }

        if let Err(err) = self
            .auth
            .update_user(UserChange::Password(password.into()))
            .await
        {
            self.notifier.error(err.ui_message());
            return Err(err);
        }

        self.notifier.success("Password updated successfully!");
        Ok(())
    }
}
