// src/services/dashboard.rs

use std::sync::Arc;

use serde_json::Value;

use crate::common::error::AppError;
use crate::remote::data_api::{DataApi, Filter};

// =============================================================================
//  CONTADORES DO PAINEL INICIAL
// =============================================================================

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DashboardCounts {
    pub parts: u64,
    pub customers: u64,
    pub invoices: u64,
    pub pending_orders: u64,
}

pub struct DashboardService {
    data: Arc<dyn DataApi>,
}

impl DashboardService {
    pub fn new(data: Arc<dyn DataApi>) -> Self {
        Self { data }
    }

    /// Contagens exatas do tenant. As quatro consultas são awaited em
    /// sequência; qualquer falha aborta o conjunto.
    pub async fn fetch_counts(&self, company_id: Option<&str>) -> Result<DashboardCounts, AppError> {
        let tenant: Vec<Filter> = company_id
            .map(|id| vec![Filter::eq("company_id", Value::String(id.into()))])
            .unwrap_or_default();

        let parts = self.data.count("parts", &tenant).await?;
        let customers = self.data.count("customers", &tenant).await?;
        let invoices = self.data.count("invoices", &tenant).await?;

        let mut pending = tenant.clone();
        pending.push(Filter::eq("status", Value::String("pending".into())));
        let pending_orders = self.data.count("orders", &pending).await?;

        Ok(DashboardCounts {
            parts,
            customers,
            invoices,
            pending_orders,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::remote::data_api::Row;
    use crate::remote::fake::FakeDataApi;
    use serde_json::json;

    fn row(pairs: &[(&str, Value)]) -> Row {
        let mut row = Row::new();
        for (key, value) in pairs {
            row.insert(key.to_string(), value.clone());
        }
        row
    }

    #[tokio::test]
    async fn contagens_filtram_pelo_tenant_e_status() {
        let data = Arc::new(FakeDataApi::new());
        data.seed(
            "parts",
            vec![
                row(&[("id", json!(1)), ("company_id", json!("t1"))]),
                row(&[("id", json!(2)), ("company_id", json!("t2"))]),
            ],
        );
        data.seed(
            "customers",
            vec![row(&[("id", json!(1)), ("company_id", json!("t1"))])],
        );
        data.seed("invoices", vec![]);
        data.seed(
            "orders",
            vec![
                row(&[
                    ("id", json!(1)),
                    ("company_id", json!("t1")),
                    ("status", json!("pending")),
                ]),
                row(&[
                    ("id", json!(2)),
                    ("company_id", json!("t1")),
                    ("status", json!("shipped")),
                ]),
            ],
        );

        let service = DashboardService::new(data.clone());
        let counts = service.fetch_counts(Some("t1")).await.unwrap();

        assert_eq!(
            counts,
            DashboardCounts {
                parts: 1,
                customers: 1,
                invoices: 0,
                pending_orders: 1,
            }
        );
        assert_eq!(
            data.calls(),
            [
                "count:parts",
                "count:customers",
                "count:invoices",
                "count:orders"
            ]
        );
    }

    #[tokio::test]
    async fn falha_em_qualquer_contagem_aborta_o_conjunto() {
        let data = Arc::new(FakeDataApi::new());
        data.fail_on("count");

        let service = DashboardService::new(data);
        assert!(service.fetch_counts(Some("t1")).await.is_err());
    }
}
