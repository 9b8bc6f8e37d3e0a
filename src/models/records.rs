// src/models/records.rs

use serde_json::{Map, Value};

use crate::validation::Rule;

/// Identidade de uma linha da grade.
///
/// `Pending` é o id temporário (timestamp em milissegundos) que uma linha
/// recém-adicionada carrega entre o "Add" e o insert bem-sucedido. Nunca
/// compartilha o espaço de ids do servidor: a troca por `Persisted` acontece
/// exatamente uma vez, na confirmação do insert.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RowId {
    Persisted(String),
    Pending(i64),
}

impl RowId {
    pub fn pending_now() -> Self {
        RowId::Pending(chrono::Utc::now().timestamp_millis())
    }

    /// Valor usável num filtro `eq` do serviço de dados. Linhas pendentes
    /// não existem no servidor; quem chamar com `Pending` tem um bug.
    pub fn as_filter_value(&self) -> Option<Value> {
        match self {
            RowId::Persisted(id) => Some(Value::String(id.clone())),
            RowId::Pending(_) => None,
        }
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, RowId::Pending(_))
    }
}

/// Converte o campo `id` vindo do servidor (número ou string) na forma
/// canônica usada localmente.
pub fn id_from_value(value: &Value) -> Option<RowId> {
    match value {
        Value::String(s) => Some(RowId::Persisted(s.clone())),
        Value::Number(n) => Some(RowId::Persisted(n.to_string())),
        _ => None,
    }
}

/// Modo de exibição de uma linha. O default é `View`; só ação explícita do
/// usuário (Add/Edit) leva para `Edit`, e só Save/Cancel traz de volta.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RowMode {
    #[default]
    View,
    Edit,
}

/// Uma linha da grade: id + campos de domínio, mais o marcador transitório
/// `is_new` (nunca é enviado ao servidor).
#[derive(Debug, Clone, PartialEq)]
pub struct RecordRow {
    pub id: RowId,
    pub fields: Map<String, Value>,
    pub is_new: bool,
}

impl RecordRow {
    /// Monta uma linha a partir de um registro devolvido pelo servidor.
    /// O campo `id` sai do mapa de campos e vira a identidade.
    pub fn from_remote(mut record: Map<String, Value>) -> Option<Self> {
        let id = record.remove("id").as_ref().and_then(id_from_value)?;
        Some(RecordRow {
            id,
            fields: record,
            is_new: false,
        })
    }

    pub fn field_str(&self, field: &str) -> String {
        match self.fields.get(field) {
            None | Some(Value::Null) => String::new(),
            Some(Value::String(s)) => s.clone(),
            Some(other) => other.to_string(),
        }
    }
}

/// Origem das opções de uma coluna/campo de seleção.
#[derive(Debug, Clone, PartialEq)]
pub enum OptionSource {
    Static(Vec<SelectOption>),
    /// Preenchida em tempo de execução com a lista de fornecedores do tenant.
    Vendors,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SelectOption {
    pub label: String,
    pub value: String,
}

impl SelectOption {
    pub fn new(label: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            value: value.into(),
        }
    }
}

/// Regra de validação anexada a uma coluna.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnRule {
    pub rule: Rule,
    pub required: bool,
}

/// Descritor de coluna da grade. Estático por instância; nunca persistido.
#[derive(Debug, Clone)]
pub struct ColumnDescriptor {
    /// Nome do campo exibido pela grade.
    pub field: String,
    /// Nome do campo no armazenamento, quando difere do exibido.
    pub db_field: Option<String>,
    pub header: String,
    pub editable: bool,
    pub rule: Option<ColumnRule>,
    pub options: Option<OptionSource>,
}

impl ColumnDescriptor {
    pub fn new(field: impl Into<String>, header: impl Into<String>) -> Self {
        let field = field.into();
        Self {
            db_field: None,
            field,
            header: header.into(),
            editable: false,
            rule: None,
            options: None,
        }
    }

    pub fn editable(mut self, editable: bool) -> Self {
        self.editable = editable;
        self
    }

    pub fn with_rule(mut self, rule: Rule, required: bool) -> Self {
        self.rule = Some(ColumnRule { rule, required });
        self
    }

    pub fn with_options(mut self, options: OptionSource) -> Self {
        self.options = Some(options);
        self
    }

    /// Nome do campo no armazenamento (cai no nome exibido se não houver
    /// mapeamento explícito).
    pub fn storage_field(&self) -> &str {
        self.db_field.as_deref().unwrap_or(&self.field)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn id_pendente_nao_vira_filtro() {
        assert!(RowId::pending_now().as_filter_value().is_none());
        assert_eq!(
            RowId::Persisted("7".into()).as_filter_value(),
            Some(json!("7"))
        );
    }

    #[test]
    fn id_numerico_do_servidor_vira_string_canonica() {
        assert_eq!(id_from_value(&json!(42)), Some(RowId::Persisted("42".into())));
        assert_eq!(
            id_from_value(&json!("abc-1")),
            Some(RowId::Persisted("abc-1".into()))
        );
        assert_eq!(id_from_value(&json!(null)), None);
    }

    #[test]
    fn from_remote_separa_id_dos_campos() {
        let mut record = Map::new();
        record.insert("id".into(), json!(1));
        record.insert("name".into(), json!("Acme"));

        let row = RecordRow::from_remote(record).unwrap();
        assert_eq!(row.id, RowId::Persisted("1".into()));
        assert!(!row.fields.contains_key("id"));
        assert_eq!(row.field_str("name"), "Acme");
        assert_eq!(row.field_str("inexistente"), "");
    }
}
