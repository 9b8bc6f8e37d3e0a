// src/services/grid.rs

use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::Arc;

use serde_json::Value;

use crate::common::error::AppError;
use crate::common::notify::{Notification, Notifier};
use crate::models::records::{ColumnDescriptor, RecordRow, RowId, RowMode};
use crate::remote::data_api::{DataApi, Filter, Row};
use crate::services::transfer;
use crate::validation::validate;

// =============================================================================
//  GRADE GENÉRICA DE REGISTROS
// =============================================================================
//
// Uma instância por tabela: busca as linhas, mantém o ciclo de edição
// (Add/Edit/Save/Cancel/Delete) e cuida de importação/exportação em lote.
// Save nunca é otimista: falha remota deixa a linha em edição; sucesso
// refaz o fetch inteiro (consistência acima de eficiência).

/// Configuração estática de uma grade.
#[derive(Debug, Clone)]
pub struct GridConfig {
    pub table: String,
    pub columns: Vec<ColumnDescriptor>,
    /// Valores iniciais de uma linha recém-adicionada.
    pub default_row: Row,
    /// Falso esconde o ciclo de edição inteiro (grade somente leitura).
    pub edit_allowed: bool,
    pub sort_column: String,
    pub sort_ascending: bool,
    /// Busca o mapa id → nome de fornecedores junto com as linhas.
    pub lookup_vendors: bool,
    /// Campos exigidos de cada registro num arquivo importado.
    pub required_import_fields: Vec<String>,
}

impl GridConfig {
    pub fn new(table: impl Into<String>, columns: Vec<ColumnDescriptor>) -> Self {
        Self {
            table: table.into(),
            columns,
            default_row: Row::new(),
            edit_allowed: false,
            sort_column: "id".into(),
            sort_ascending: true,
            lookup_vendors: false,
            required_import_fields: Vec::new(),
        }
    }
}

pub struct RecordGrid {
    config: GridConfig,
    data: Arc<dyn DataApi>,
    rows: Vec<RecordRow>,
    modes: HashMap<RowId, RowMode>,
    /// Última versão boa de cada linha em edição; consumida no Cancel.
    snapshots: HashMap<RowId, RecordRow>,
    vendor_map: HashMap<String, String>,
    pending_delete: Option<RowId>,
    quick_filter: String,
    notifier: Notifier,
    loading: bool,
}

impl RecordGrid {
    pub fn new(config: GridConfig, data: Arc<dyn DataApi>) -> Self {
        Self {
            config,
            data,
            rows: Vec::new(),
            modes: HashMap::new(),
            snapshots: HashMap::new(),
            vendor_map: HashMap::new(),
            pending_delete: None,
            quick_filter: String::new(),
            notifier: Notifier::new(),
            loading: false,
        }
    }

    pub fn rows(&self) -> &[RecordRow] {
        &self.rows
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn mode(&self, id: &RowId) -> RowMode {
        self.modes.get(id).copied().unwrap_or_default()
    }

    pub fn vendor_name(&self, vendor_id: &str) -> Option<&str> {
        self.vendor_map.get(vendor_id).map(String::as_str)
    }

    pub fn pending_delete(&self) -> Option<&RowId> {
        self.pending_delete.as_ref()
    }

    /// Drena as notificações acumuladas, na ordem de chegada.
    pub fn take_notifications(&mut self) -> Vec<Notification> {
        self.notifier.drain()
    }

    fn editing_row(&self) -> Option<RowId> {
        self.modes
            .iter()
            .find(|(_, mode)| **mode == RowMode::Edit)
            .map(|(id, _)| id.clone())
    }

    fn row_index(&self, id: &RowId) -> Option<usize> {
        self.rows.iter().position(|row| &row.id == id)
    }

    // -------------------------------------------------------------------------
    //  Fetch
    // -------------------------------------------------------------------------

    /// Recarrega o conjunto de linhas por inteiro (sem fetch incremental).
    /// Quando configurado, o mapa de fornecedores vem antes, na mesma ordem
    /// sequencial de sempre.
    pub async fn fetch_all(&mut self) -> Result<(), AppError> {
        self.loading = true;

        if self.config.lookup_vendors {
            match self.data.select("vendors", "id,name", &[]).await {
                Ok(vendors) => {
                    self.vendor_map = vendors
                        .iter()
                        .filter_map(|v| {
                            let id = field_as_string(v.get("id"))?;
                            let name = field_as_string(v.get("name"))?;
                            Some((id, name))
                        })
                        .collect();
                }
                Err(err) => {
                    self.notifier
                        .error(format!("Error fetching vendors: {}", err.ui_message()));
                    self.loading = false;
                    return Err(err);
                }
            }
        }

        match self.data.select(&self.config.table, "*", &[]).await {
            Ok(records) => {
                self.rows = records
                    .into_iter()
                    .filter_map(RecordRow::from_remote)
                    .collect();
                // Conjunto novo: modos e snapshots antigos não valem mais.
                self.modes.clear();
                self.snapshots.clear();
                self.loading = false;
                Ok(())
            }
            Err(err) => {
                self.notifier.error(format!(
                    "Error fetching {}: {}",
                    self.config.table,
                    err.ui_message()
                ));
                self.loading = false;
                Err(err)
            }
        }
    }

    // -------------------------------------------------------------------------
    //  Ciclo de edição
    // -------------------------------------------------------------------------

    /// Adiciona uma linha local com id temporário e já a coloca em edição.
    /// Nada é escrito no servidor até o Save.
    pub fn add_row(&mut self) -> Option<RowId> {
        if !self.config.edit_allowed {
            self.notifier.warning("Editing is disabled for this table");
            return None;
        }
        if self.editing_row().is_some() {
            self.notifier
                .warning("Finish editing the current row before adding another");
            return None;
        }

        let id = RowId::pending_now();
        self.rows.push(RecordRow {
            id: id.clone(),
            fields: self.config.default_row.clone(),
            is_new: true,
        });
        self.modes.insert(id.clone(), RowMode::Edit);
        self.notifier.info("New row added");
        Some(id)
    }

    /// Entra em modo de edição, guardando o snapshot para o Cancel.
    /// Edição é exclusiva: uma linha em edição por grade.
    pub fn start_edit(&mut self, id: &RowId) {
        if !self.config.edit_allowed {
            self.notifier.warning("Editing is disabled for this table");
            return;
        }
        if self.mode(id) == RowMode::Edit {
            return;
        }
        if self.editing_row().is_some() {
            self.notifier
                .warning("Finish editing the current row before editing another");
            return;
        }
        let Some(index) = self.row_index(id) else {
            self.notifier.error("Invalid row ID in actions");
            return;
        };

        self.snapshots.insert(id.clone(), self.rows[index].clone());
        self.modes.insert(id.clone(), RowMode::Edit);
    }

    /// Altera um campo da linha em edição. Fora do modo Edit é ignorado.
    pub fn set_value(&mut self, id: &RowId, field: &str, value: Value) {
        if self.mode(id) != RowMode::Edit {
            self.notifier.warning("Row is not in edit mode");
            return;
        }
        if let Some(index) = self.row_index(id) {
            self.rows[index].fields.insert(field.into(), value);
        }
    }

    /// Valida e persiste a linha em edição. Na primeira coluna reprovada o
    /// save aborta com o nome da coluna; a linha continua em edição. Depois
    /// de persistir, o conjunto inteiro é rebuscado.
    pub async fn save(&mut self, id: &RowId) -> Result<(), AppError> {
        let Some(index) = self.row_index(id) else {
            self.notifier.error("Invalid row ID for saving");
            return Err(AppError::Remote("Invalid row ID for saving".into()));
        };
        if self.mode(id) != RowMode::Edit {
            self.notifier.warning("Row is not in edit mode");
            return Ok(());
        }

        // Validação campo a campo; nenhum erro daqui alcança o remoto.
        for column in &self.config.columns {
            let Some(rule) = column.rule else { continue };
            let value = self.rows[index].field_str(&column.field);
            if let Some(message) = validate(rule.rule, &value, rule.required) {
                self.notifier
                    .error(format!("{} Column: {}", column.header, message));
                return Err(AppError::validation(column.header.clone(), message));
            }
        }

        let row = &self.rows[index];
        if row.is_new {
            let inserted = match self.data.insert(&self.config.table, vec![row.fields.clone()]).await {
                Ok(inserted) => inserted,
                Err(err) => {
                    self.notifier
                        .error(format!("Error adding row: {}", err.ui_message()));
                    return Err(err);
                }
            };

            // Troca o id temporário pelo definitivo do servidor.
            let confirmed = inserted
                .into_iter()
                .next()
                .and_then(RecordRow::from_remote)
                .ok_or_else(|| AppError::Remote("insert returned no row".into()))?;
            let old_id = self.rows[index].id.clone();
            self.rows[index] = confirmed;
            self.modes.remove(&old_id);
            self.snapshots.remove(&old_id);
        } else {
            let filter_id = row
                .id
                .as_filter_value()
                .ok_or_else(|| AppError::Remote("Invalid row ID for saving".into()))?;
            if let Err(err) = self
                .data
                .update(
                    &self.config.table,
                    row.fields.clone(),
                    &[Filter::eq("id", filter_id)],
                )
                .await
            {
                self.notifier
                    .error(format!("Error updating row: {}", err.ui_message()));
                return Err(err);
            }
        }

        let saved_id = self.rows[index].id.clone();
        self.modes.insert(saved_id.clone(), RowMode::View);
        self.snapshots.remove(&saved_id);
        self.notifier.success("Row saved successfully");

        // Consistência acima de eficiência: rebusca tudo. Falha aqui já é
        // notificada pelo próprio fetch.
        let _ = self.fetch_all().await;
        Ok(())
    }

    /// Desfaz a edição. Linha existente volta ao snapshot; linha nova que
    /// nunca foi salva é removida (não existe snapshot nem registro remoto).
    pub fn cancel(&mut self, id: &RowId) {
        if self.mode(id) != RowMode::Edit {
            return;
        }
        if let Some(snapshot) = self.snapshots.remove(id) {
            if let Some(index) = self.row_index(id) {
                self.rows[index] = snapshot;
            }
            self.modes.insert(id.clone(), RowMode::View);
            return;
        }
        // Sem snapshot: é uma linha nova descartada.
        if let Some(index) = self.row_index(id) {
            if self.rows[index].is_new {
                self.rows.remove(index);
            }
        }
        self.modes.remove(id);
    }

    // -------------------------------------------------------------------------
    //  Exclusão (com confirmação)
    // -------------------------------------------------------------------------

    pub fn request_delete(&mut self, id: &RowId) {
        self.pending_delete = Some(id.clone());
    }

    pub fn dismiss_delete(&mut self) {
        self.pending_delete = None;
    }

    /// Efetiva a exclusão confirmada. Falha remota deixa o estado local como
    /// estava; sucesso remove a linha sem refetch.
    pub async fn confirm_delete(&mut self) -> Result<(), AppError> {
        let Some(id) = self.pending_delete.take() else {
            return Ok(());
        };

        // Linha pendente nunca chegou ao servidor; basta descartar local.
        if let Some(filter_id) = id.as_filter_value() {
            if let Err(err) = self
                .data
                .delete(&self.config.table, &[Filter::eq("id", filter_id)])
                .await
            {
                self.notifier
                    .error(format!("Error deleting row: {}", err.ui_message()));
                return Err(err);
            }
        }

        self.rows.retain(|row| row.id != id);
        self.modes.remove(&id);
        self.snapshots.remove(&id);
        self.notifier.success("Row deleted successfully");
        Ok(())
    }

    // -------------------------------------------------------------------------
    //  Importação / Exportação
    // -------------------------------------------------------------------------

    /// Importa uma planilha: valida os campos obrigatórios de cada registro
    /// (tudo-ou-nada) e faz um único insert em lote.
    pub async fn import(&mut self, filename: &str, bytes: &[u8]) -> Result<(), AppError> {
        let records = match transfer::parse_spreadsheet(filename, bytes) {
            Ok(records) => records,
            Err(err) => {
                self.notifier.error("Error processing file");
                return Err(err);
            }
        };

        if records.is_empty() {
            self.notifier.error("File is empty or invalid");
            return Err(AppError::File("File is empty or invalid".into()));
        }

        for record in &records {
            for field in &self.config.required_import_fields {
                let missing = match record.get(field) {
                    None | Some(Value::Null) => true,
                    Some(Value::String(s)) => s.is_empty(),
                    Some(_) => false,
                };
                if missing {
                    let message = format!("Missing required field: \"{field}\" in uploaded file");
                    self.notifier.error(message.clone());
                    return Err(AppError::File(message));
                }
            }
        }

        if let Err(err) = self.data.insert(&self.config.table, records).await {
            self.notifier
                .error(format!("Error uploading data: {}", err.ui_message()));
            return Err(err);
        }

        self.notifier.success("File uploaded successfully");
        let _ = self.fetch_all().await;
        Ok(())
    }

    pub fn set_quick_filter(&mut self, filter: impl Into<String>) {
        self.quick_filter = filter.into();
    }

    /// Linhas como a grade exibe: filtro rápido aplicado e ordenação pela
    /// coluna configurada. Paginação é só apresentação, fica fora daqui.
    pub fn visible_rows(&self) -> Vec<&RecordRow> {
        let needle = self.quick_filter.to_lowercase();
        let mut visible: Vec<&RecordRow> = self
            .rows
            .iter()
            .filter(|row| {
                needle.is_empty()
                    || row
                        .fields
                        .keys()
                        .any(|field| row.field_str(field).to_lowercase().contains(&needle))
            })
            .collect();

        let column = &self.config.sort_column;
        visible.sort_by(|a, b| {
            let left = a.field_str(column);
            let right = b.field_str(column);
            let ordering = match (left.parse::<f64>(), right.parse::<f64>()) {
                (Ok(l), Ok(r)) => l.partial_cmp(&r).unwrap_or(Ordering::Equal),
                _ => left.cmp(&right),
            };
            if self.config.sort_ascending {
                ordering
            } else {
                ordering.reverse()
            }
        });
        visible
    }

    /// Exporta o conjunto visível para CSV. Opera só sobre estado local.
    pub fn export_csv(&self) -> String {
        transfer::export_csv(&self.visible_rows(), &self.config.columns)
    }

    /// Exporta o conjunto visível para .xlsx. Opera só sobre estado local.
    pub fn export_xlsx(&self) -> Result<Vec<u8>, AppError> {
        transfer::export_xlsx(&self.visible_rows(), &self.config.columns)
    }
}

fn field_as_string(value: Option<&Value>) -> Option<String> {
    match value {
        Some(Value::String(s)) => Some(s.clone()),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::notify::Severity;
    use crate::remote::fake::FakeDataApi;
    use crate::validation::Rule;
    use serde_json::json;

    fn part_row(id: i64, name: &str, cog: &str) -> Row {
        let mut row = Row::new();
        row.insert("id".into(), json!(id));
        row.insert("name".into(), json!(name));
        row.insert("cog".into(), json!(cog));
        row
    }

    fn config() -> GridConfig {
        let columns = vec![
            ColumnDescriptor::new("name", "Part Name")
                .editable(true)
                .with_rule(Rule::Required, true),
            ColumnDescriptor::new("cog", "Cost of Goods")
                .editable(true)
                .with_rule(Rule::Price, true),
        ];
        GridConfig {
            edit_allowed: true,
            sort_column: "name".into(),
            required_import_fields: vec!["name".into(), "cog".into()],
            ..GridConfig::new("parts", columns)
        }
    }

    fn grid() -> (Arc<FakeDataApi>, RecordGrid) {
        let data = Arc::new(FakeDataApi::new());
        let grid = RecordGrid::new(config(), data.clone());
        (data, grid)
    }

    #[tokio::test]
    async fn adicionar_e_cancelar_remove_sem_chamada_remota() {
        let (data, mut grid) = grid();

        let id = grid.add_row().unwrap();
        grid.set_value(&id, "name", json!("Bearing"));
        grid.cancel(&id);

        assert!(grid.rows().is_empty());
        assert_eq!(grid.mode(&id), RowMode::View);
        assert!(data.calls().is_empty());
    }

    #[tokio::test]
    async fn save_com_obrigatorio_vazio_mantem_edicao_e_nao_chama_remoto() {
        let (data, mut grid) = grid();

        let id = grid.add_row().unwrap();
        grid.set_value(&id, "cog", json!("10.50"));

        let err = grid.save(&id).await.unwrap_err();
        assert!(matches!(err, AppError::Validation { .. }));
        assert_eq!(grid.mode(&id), RowMode::Edit);
        assert!(data.calls().is_empty());

        let notes = grid.take_notifications();
        let error = notes.iter().find(|n| n.severity == Severity::Error).unwrap();
        assert_eq!(error.message, "Part Name Column: This field is required");
    }

    #[tokio::test]
    async fn save_de_linha_nova_troca_o_id_e_rebusca_tudo() {
        let (data, mut grid) = grid();

        let id = grid.add_row().unwrap();
        assert!(id.is_pending());
        grid.set_value(&id, "name", json!("Bearing"));
        grid.set_value(&id, "cog", json!("10.50"));
        data.clear_calls();

        grid.save(&id).await.unwrap();

        assert_eq!(data.calls(), ["insert:parts", "select:parts"]);
        assert_eq!(grid.rows().len(), 1);
        assert!(!grid.rows()[0].id.is_pending());
        assert!(!grid.rows()[0].is_new);
    }

    #[tokio::test]
    async fn falha_remota_no_save_mantem_a_linha_em_edicao() {
        let (data, mut grid) = grid();
        data.fail_on("insert");

        let id = grid.add_row().unwrap();
        grid.set_value(&id, "name", json!("Bearing"));
        grid.set_value(&id, "cog", json!("10"));

        assert!(grid.save(&id).await.is_err());
        assert_eq!(grid.mode(&id), RowMode::Edit);
        assert_eq!(grid.rows().len(), 1);
    }

    #[tokio::test]
    async fn edicao_e_exclusiva_por_grade() {
        let (data, mut grid) = grid();
        data.seed("parts", vec![part_row(1, "Bearing", "10"), part_row(2, "Shaft", "20")]);
        grid.fetch_all().await.unwrap();

        let first = grid.rows()[0].id.clone();
        let second = grid.rows()[1].id.clone();
        grid.start_edit(&first);
        grid.start_edit(&second);

        assert_eq!(grid.mode(&first), RowMode::Edit);
        assert_eq!(grid.mode(&second), RowMode::View);
        assert!(grid.add_row().is_none());
    }

    #[tokio::test]
    async fn cancel_restaura_o_snapshot_da_linha_existente() {
        let (data, mut grid) = grid();
        data.seed("parts", vec![part_row(1, "Bearing", "10")]);
        grid.fetch_all().await.unwrap();

        let id = grid.rows()[0].id.clone();
        grid.start_edit(&id);
        grid.set_value(&id, "name", json!("Rasurado"));
        grid.cancel(&id);

        assert_eq!(grid.rows()[0].field_str("name"), "Bearing");
        assert_eq!(grid.mode(&id), RowMode::View);
    }

    #[tokio::test]
    async fn update_de_linha_existente_filtra_pelo_id() {
        let (data, mut grid) = grid();
        data.seed("parts", vec![part_row(1, "Bearing", "10")]);
        grid.fetch_all().await.unwrap();

        let id = grid.rows()[0].id.clone();
        grid.start_edit(&id);
        grid.set_value(&id, "cog", json!("12.75"));
        grid.save(&id).await.unwrap();

        let stored = data.rows_of("parts");
        assert_eq!(stored[0]["cog"], json!("12.75"));
    }

    #[tokio::test]
    async fn delete_so_acontece_depois_da_confirmacao() {
        let (data, mut grid) = grid();
        data.seed("parts", vec![part_row(1, "Bearing", "10")]);
        grid.fetch_all().await.unwrap();
        data.clear_calls();

        let id = grid.rows()[0].id.clone();
        grid.request_delete(&id);
        assert!(data.calls().is_empty());

        grid.confirm_delete().await.unwrap();
        assert_eq!(data.calls(), ["delete:parts"]);
        assert!(grid.rows().is_empty());
    }

    #[tokio::test]
    async fn falha_no_delete_preserva_o_estado_local() {
        let (data, mut grid) = grid();
        data.seed("parts", vec![part_row(1, "Bearing", "10")]);
        grid.fetch_all().await.unwrap();
        data.fail_on("delete");

        let id = grid.rows()[0].id.clone();
        grid.request_delete(&id);
        assert!(grid.confirm_delete().await.is_err());
        assert_eq!(grid.rows().len(), 1);
    }

    #[tokio::test]
    async fn importacao_aborta_inteira_no_primeiro_campo_faltando() {
        let (data, mut grid) = grid();

        let csv = b"name,cog\nBearing,10\nShaft,\n";
        let err = grid.import("parts.csv", csv).await.unwrap_err();

        assert!(matches!(err, AppError::File(_)));
        assert!(data.calls().is_empty());
        let notes = grid.take_notifications();
        assert_eq!(
            notes.last().unwrap().message,
            "Missing required field: \"cog\" in uploaded file"
        );
    }

    #[tokio::test]
    async fn importacao_valida_insere_em_lote_unico_e_rebusca() {
        let (data, mut grid) = grid();

        let csv = b"name,cog\nBearing,10\nShaft,20\n";
        grid.import("parts.csv", csv).await.unwrap();

        assert_eq!(data.calls(), ["insert:parts", "select:parts"]);
        assert_eq!(grid.rows().len(), 2);
    }

    #[tokio::test]
    async fn arquivo_vazio_e_rejeitado() {
        let (data, mut grid) = grid();

        let err = grid.import("parts.csv", b"name,cog\n").await.unwrap_err();
        assert!(matches!(err, AppError::File(_)));
        assert!(data.calls().is_empty());
    }

    #[tokio::test]
    async fn exportacao_usa_o_conjunto_visivel_filtrado_e_ordenado() {
        let (data, mut grid) = grid();
        data.seed(
            "parts",
            vec![part_row(1, "Shaft", "20"), part_row(2, "Bearing", "10")],
        );
        grid.fetch_all().await.unwrap();

        // Sem filtro: ordenado por nome.
        let csv = grid.export_csv();
        assert_eq!(csv, "name,cog\nBearing,10\nShaft,20");

        grid.set_quick_filter("shaft");
        let csv = grid.export_csv();
        assert_eq!(csv, "name,cog\nShaft,20");
        assert!(data.calls().iter().all(|c| !c.starts_with("select") || c == "select:parts"));
    }

    #[tokio::test]
    async fn fetch_monta_o_mapa_de_fornecedores_antes_das_linhas() {
        let data = Arc::new(FakeDataApi::new());
        let mut vendor = Row::new();
        vendor.insert("id".into(), json!("v1"));
        vendor.insert("name".into(), json!("Acme Supply"));
        data.seed("vendors", vec![vendor]);
        data.seed("parts", vec![part_row(1, "Bearing", "10")]);

        let mut cfg = config();
        cfg.lookup_vendors = true;
        let mut grid = RecordGrid::new(cfg, data.clone());
        grid.fetch_all().await.unwrap();

        assert_eq!(data.calls(), ["select:vendors", "select:parts"]);
        assert_eq!(grid.vendor_name("v1"), Some("Acme Supply"));
    }
}
