// src/services/settings.rs

use std::sync::Arc;

use serde_json::Value;

use crate::common::error::AppError;
use crate::common::notify::{Notification, Notifier};
use crate::models::records::id_from_value;
use crate::remote::data_api::{DataApi, Filter, Row};

// =============================================================================
//  CONFIGURAÇÕES DO TENANT
// =============================================================================
//
// Margem e imposto padrão usados na precificação. A tabela `settings` tem
// uma linha por tenant; lemos a primeira e atualizamos pelo id dela.

#[derive(Debug, Clone, PartialEq)]
pub struct TenantSettings {
    pub id: String,
    pub margin: f64,
    pub tax: f64,
}

pub struct SettingsService {
    data: Arc<dyn DataApi>,
    notifier: Notifier,
}

impl SettingsService {
    pub fn new(data: Arc<dyn DataApi>) -> Self {
        Self {
            data,
            notifier: Notifier::new(),
        }
    }

    pub fn take_notifications(&mut self) -> Vec<Notification> {
        self.notifier.drain()
    }

    /// Primeira linha de configurações do tenant, se existir.
    pub async fn fetch(&mut self, company_id: Option<&str>) -> Result<Option<TenantSettings>, AppError> {
        let filters: Vec<Filter> = company_id
            .map(|id| vec![Filter::eq("company_id", Value::String(id.into()))])
            .unwrap_or_default();

        let rows = self.data.select("settings", "*", &filters).await?;
        let Some(row) = rows.into_iter().next() else {
            return Ok(None);
        };

        let id = row
            .get("id")
            .and_then(id_from_value)
            .and_then(|id| id.as_filter_value())
            .and_then(|v| v.as_str().map(String::from))
            .ok_or_else(|| AppError::Remote("settings row has no id".into()))?;

        Ok(Some(TenantSettings {
            id,
            margin: numeric_field(&row, "margin"),
            tax: numeric_field(&row, "tax"),
        }))
    }

    pub async fn update(&mut self, id: &str, margin: f64, tax: f64) -> Result<(), AppError> {
        let mut patch = Row::new();
        patch.insert("margin".into(), json_number(margin));
        patch.insert("tax".into(), json_number(tax));

        if let Err(err) = self
            .data
            .update(
                "settings",
                patch,
                &[Filter::eq("id", Value::String(id.into()))],
            )
            .await
        {
            self.notifier
                .error(format!("Error updating settings: {}", err.ui_message()));
            return Err(err);
        }

        self.notifier.success("Settings updated successfully");
        Ok(())
    }
}

fn json_number(value: f64) -> Value {
    serde_json::Number::from_f64(value)
        .map(Value::Number)
        .unwrap_or(Value::Null)
}

// Números podem chegar como string dependendo do tipo da coluna.
fn numeric_field(row: &Row, field: &str) -> f64 {
    match row.get(field) {
        Some(Value::Number(n)) => n.as_f64().unwrap_or(0.0),
        Some(Value::String(s)) => s.parse().unwrap_or(0.0),
        _ => 0.0,
    }
}
