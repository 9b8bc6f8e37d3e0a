// src/remote/data_api.rs

use async_trait::async_trait;
use serde_json::{Map, Value};

use crate::common::error::AppError;

/// Um registro como trafega na fronteira de dados: mapa campo → valor.
pub type Row = Map<String, Value>;

/// Filtro de igualdade sobre uma coluna (o único operador que o painel usa).
#[derive(Debug, Clone, PartialEq)]
pub struct Filter {
    pub column: String,
    pub value: Value,
}

impl Filter {
    pub fn eq(column: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            column: column.into(),
            value: value.into(),
        }
    }
}

// Fronteira fina com o armazenamento relacional hospedado, por tabela.
// Sem transação local, sem retry automático: falha parcial entre duas
// chamadas é responsabilidade de quem orquestra surfacear.
#[async_trait]
pub trait DataApi: Send + Sync {
    /// `columns` na sintaxe de projeção do serviço ("*" ou "a,b,c").
    async fn select(
        &self,
        table: &str,
        columns: &str,
        filters: &[Filter],
    ) -> Result<Vec<Row>, AppError>;

    /// Insere em lote e devolve as linhas criadas (com id do servidor).
    async fn insert(&self, table: &str, rows: Vec<Row>) -> Result<Vec<Row>, AppError>;

    async fn update(&self, table: &str, patch: Row, filters: &[Filter]) -> Result<(), AppError>;

    async fn delete(&self, table: &str, filters: &[Filter]) -> Result<(), AppError>;

    /// Contagem exata, sem materializar linhas.
    async fn count(&self, table: &str, filters: &[Filter]) -> Result<u64, AppError>;
}
