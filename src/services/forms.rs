// src/services/forms.rs

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::Value;

use crate::common::error::AppError;
use crate::common::notify::{Notification, Notifier};
use crate::models::entities::{EntityKind, FieldDescriptor};
use crate::models::records::{OptionSource, SelectOption};
use crate::remote::auth_api::AuthApi;
use crate::remote::data_api::{DataApi, Filter, Row};
use crate::validation::validate;

// =============================================================================
//  FORMULÁRIOS DE CADASTRO
// =============================================================================
//
// Um formulário por tipo de entidade, dirigido pelo esquema estático do tipo.
// Cada tecla revalida o campo; o submit revalida tudo e só então faz UMA
// escrita remota, carimbada com o tenant. A exceção é o cadastro de usuário,
// que é um fluxo de dois passos sem transação: sign-up no serviço de auth e
// depois o insert do perfil, com a falha do segundo passo sinalizada à parte.

pub struct EntityForm {
    kind: EntityKind,
    schema: Vec<FieldDescriptor>,
    values: HashMap<&'static str, String>,
    errors: HashMap<&'static str, &'static str>,
    vendor_options: Vec<SelectOption>,
    data: Arc<dyn DataApi>,
    auth: Arc<dyn AuthApi>,
    notifier: Notifier,
    submitting: bool,
}

impl EntityForm {
    /// O tipo é resolvido para o esquema aqui, uma única vez.
    pub fn new(kind: EntityKind, data: Arc<dyn DataApi>, auth: Arc<dyn AuthApi>) -> Self {
        Self {
            kind,
            schema: kind.schema(),
            values: HashMap::new(),
            errors: HashMap::new(),
            vendor_options: Vec::new(),
            data,
            auth,
            notifier: Notifier::new(),
            submitting: false,
        }
    }

    pub fn kind(&self) -> EntityKind {
        self.kind
    }

    pub fn schema(&self) -> &[FieldDescriptor] {
        &self.schema
    }

    pub fn value(&self, name: &str) -> &str {
        self.values.get(name).map(String::as_str).unwrap_or("")
    }

    pub fn error(&self, name: &str) -> Option<&'static str> {
        self.errors.get(name).copied()
    }

    pub fn vendor_options(&self) -> &[SelectOption] {
        &self.vendor_options
    }

    pub fn take_notifications(&mut self) -> Vec<Notification> {
        self.notifier.drain()
    }

    /// Carrega as opções de fornecedor (id, nome) do tenant, quando algum
    /// campo do esquema as pede.
    pub async fn load_vendor_options(&mut self, company_id: Option<&str>) -> Result<(), AppError> {
        let wants_vendors = self
            .schema
            .iter()
            .any(|field| field.options == Some(OptionSource::Vendors));
        if !wants_vendors {
            return Ok(());
        }

        let filters: Vec<Filter> = company_id
            .map(|id| vec![Filter::eq("company_id", Value::String(id.into()))])
            .unwrap_or_default();

        match self.data.select("vendors", "id,name", &filters).await {
            Ok(vendors) => {
                self.vendor_options = vendors
                    .iter()
                    .filter_map(|row| {
                        let id = string_field(row, "id")?;
                        let name = string_field(row, "name")?;
                        Some(SelectOption::new(name, id))
                    })
                    .collect();
                Ok(())
            }
            Err(err) => {
                self.notifier
                    .error(format!("Error fetching vendors: {}", err.ui_message()));
                Err(err)
            }
        }
    }

    /// Grava o valor e revalida o campo na hora.
    pub fn set_value(&mut self, name: &str, value: impl Into<String>) {
        let Some(field) = self.schema.iter().find(|f| f.name == name) else {
            return;
        };
        let value = value.into();
        match validate(field.rule, &value, field.required) {
            Some(message) => self.errors.insert(field.name, message),
            None => self.errors.remove(field.name),
        };
        self.values.insert(field.name, value);
    }

    fn validate_all(&mut self) -> bool {
        for field in &self.schema {
            let value = self.values.get(field.name).cloned().unwrap_or_default();
            match validate(field.rule, &value, field.required) {
                Some(message) => self.errors.insert(field.name, message),
                None => self.errors.remove(field.name),
            };
        }
        self.errors.is_empty()
    }

    fn clear(&mut self) {
        self.values.clear();
        self.errors.clear();
    }

    /// Valida tudo e persiste. Qualquer erro de campo bloqueia antes de
    /// tocar o remoto; os erros ficam no mapa para a camada de exibição.
    pub async fn submit(&mut self, company_id: Option<&str>) -> Result<(), AppError> {
        if self.submitting {
            return Ok(());
        }
        if !self.validate_all() {
            let (field, message) = self
                .errors
                .iter()
                .next()
                .map(|(f, m)| (f.to_string(), *m))
                .unwrap_or_default();
            return Err(AppError::validation(field, message));
        }

        self.submitting = true;
        let result = self.submit_valid(company_id).await;
        self.submitting = false;

        if result.is_ok() {
            self.clear();
            self.notifier
                .success(format!("{} added successfully!", self.kind.label()));
        }
        result
    }

    async fn submit_valid(&mut self, company_id: Option<&str>) -> Result<(), AppError> {
        if self.kind == EntityKind::User {
            return self.submit_user(company_id).await;
        }

        let mut row = Row::new();
        for field in &self.schema {
            row.insert(
                field.name.into(),
                Value::String(self.values.get(field.name).cloned().unwrap_or_default()),
            );
        }
        if let Some(id) = company_id {
            row.insert("company_id".into(), Value::String(id.into()));
        }

        if let Err(err) = self.data.insert(self.kind.table(), vec![row]).await {
            self.notifier.error(format!(
                "Error adding {}: {}",
                self.kind.label(),
                err.ui_message()
            ));
            return Err(err);
        }
        Ok(())
    }

    /// Cadastro de usuário: sign-up e depois o perfil. Não há rollback do
    /// primeiro passo se o segundo falhar; a mensagem distingue os dois.
    async fn submit_user(&mut self, company_id: Option<&str>) -> Result<(), AppError> {
        let email = self.values.get("email").cloned().unwrap_or_default();
        let password = self.values.get("password").cloned().unwrap_or_default();

        let user = match self.auth.sign_up(&email, &password).await {
            Ok(user) => user,
            Err(err) => {
                self.notifier
                    .error(format!("Error creating user: {}", err.ui_message()));
                return Err(err);
            }
        };

        let mut profile = Row::new();
        profile.insert("id".into(), Value::String(user.id));
        profile.insert("email".into(), Value::String(email));
        profile.insert(
            "name".into(),
            Value::String(self.values.get("name").cloned().unwrap_or_default()),
        );
        let role = self
            .values
            .get("role")
            .filter(|r| !r.is_empty())
            .cloned()
            .unwrap_or_else(|| "User".into());
        profile.insert("role".into(), Value::String(role));
        if let Some(id) = company_id {
            profile.insert("company_id".into(), Value::String(id.into()));
        }

        if let Err(err) = self.data.insert("profiles", vec![profile]).await {
            self.notifier.error(format!(
                "User created but profile setup failed: {}",
                err.ui_message()
            ));
            return Err(err);
        }
        Ok(())
    }
}

fn string_field(row: &Row, field: &str) -> Option<String> {
    match row.get(field) {
        Some(Value::String(s)) => Some(s.clone()),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::notify::Severity;
    use crate::remote::fake::{FakeAuthApi, FakeDataApi};
    use serde_json::json;

    fn form(kind: EntityKind) -> (Arc<FakeDataApi>, Arc<FakeAuthApi>, EntityForm) {
        let data = Arc::new(FakeDataApi::new());
        let auth = Arc::new(FakeAuthApi::new());
        let form = EntityForm::new(kind, data.clone(), auth.clone());
        (data, auth, form)
    }

    #[tokio::test]
    async fn digitacao_valida_o_campo_na_hora() {
        let (_, _, mut form) = form(EntityKind::Vendor);

        form.set_value("email", "nao-e-email");
        assert_eq!(form.error("email"), Some("Invalid email format"));

        form.set_value("email", "vendas@acme.com");
        assert_eq!(form.error("email"), None);
    }

    #[tokio::test]
    async fn submit_com_erro_de_campo_nao_toca_o_remoto() {
        let (data, _, mut form) = form(EntityKind::Vendor);

        form.set_value("name", "Acme Supply");
        // email e website ficam vazios.
        let err = form.submit(Some("t1")).await.unwrap_err();

        assert!(matches!(err, AppError::Validation { .. }));
        assert!(data.calls().is_empty());
        assert!(form.error("email").is_some());
        assert!(form.error("website").is_some());
    }

    #[tokio::test]
    async fn submit_valido_insere_com_o_tenant_e_limpa_o_formulario() {
        let (data, _, mut form) = form(EntityKind::Vendor);

        form.set_value("name", "Acme Supply");
        form.set_value("email", "vendas@acme.com");
        form.set_value("website", "acme.example");
        form.submit(Some("t1")).await.unwrap();

        let stored = data.rows_of("vendors");
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0]["company_id"], json!("t1"));
        assert_eq!(form.value("name"), "");

        let notes = form.take_notifications();
        assert_eq!(notes.last().unwrap().message, "vendor added successfully!");
        assert_eq!(notes.last().unwrap().severity, Severity::Success);
    }

    #[tokio::test]
    async fn cadastro_de_usuario_faz_sign_up_e_depois_o_perfil() {
        let (data, auth, mut form) = form(EntityKind::User);
        *auth.user_id.lock().unwrap() = "novo-usuario".into();

        form.set_value("name", "Maria Silva");
        form.set_value("email", "maria@acme.com");
        form.set_value("password", "segredo1");
        form.set_value("role", "Service");
        form.submit(Some("t1")).await.unwrap();

        let profiles = data.rows_of("profiles");
        assert_eq!(profiles.len(), 1);
        assert_eq!(profiles[0]["id"], json!("novo-usuario"));
        assert_eq!(profiles[0]["role"], json!("Service"));
        assert_eq!(profiles[0]["company_id"], json!("t1"));
    }

    #[tokio::test]
    async fn falha_do_perfil_depois_do_sign_up_e_sinalizada_a_parte() {
        let (data, _, mut form) = form(EntityKind::User);
        data.fail_on("insert");

        form.set_value("name", "Maria Silva");
        form.set_value("email", "maria@acme.com");
        form.set_value("password", "segredo1");

        assert!(form.submit(Some("t1")).await.is_err());
        let notes = form.take_notifications();
        assert!(
            notes
                .last()
                .unwrap()
                .message
                .starts_with("User created but profile setup failed")
        );
    }

    #[tokio::test]
    async fn opcoes_de_fornecedor_vem_filtradas_pelo_tenant() {
        let (data, _, mut form) = form(EntityKind::Part);
        let mut v1 = Row::new();
        v1.insert("id".into(), json!("v1"));
        v1.insert("name".into(), json!("Acme Supply"));
        v1.insert("company_id".into(), json!("t1"));
        let mut v2 = Row::new();
        v2.insert("id".into(), json!("v2"));
        v2.insert("name".into(), json!("Outra"));
        v2.insert("company_id".into(), json!("t2"));
        data.seed("vendors", vec![v1, v2]);

        form.load_vendor_options(Some("t1")).await.unwrap();

        assert_eq!(form.vendor_options().len(), 1);
        assert_eq!(form.vendor_options()[0].value, "v1");
        assert_eq!(form.vendor_options()[0].label, "Acme Supply");
    }

    #[tokio::test]
    async fn formulario_sem_fornecedores_nao_consulta_a_tabela() {
        let (data, _, mut form) = form(EntityKind::Customer);
        form.load_vendor_options(Some("t1")).await.unwrap();
        assert!(data.calls().is_empty());
    }
}
