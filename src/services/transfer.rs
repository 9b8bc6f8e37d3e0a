// src/services/transfer.rs

use std::io::Cursor;

use calamine::{Data, Reader, Xlsx};
use rust_xlsxwriter::Workbook;
use serde_json::Value;

use crate::common::error::AppError;
use crate::models::records::{ColumnDescriptor, RecordRow};
use crate::remote::data_api::Row;

// =============================================================================
//  IMPORTAÇÃO / EXPORTAÇÃO DE PLANILHAS
// =============================================================================
//
// Importação lê .csv/.xlsx (primeira aba, primeira linha como cabeçalho) e
// vira registros planos. Exportação opera só sobre o estado já buscado do
// cliente; nunca toca o serviço remoto.

// Colunas internas que nunca saem no arquivo exportado.
const INTERNAL_COLUMNS: &[&str] = &["actions", "id", "created_at"];
// O id do tenant fica de fora só no CSV, que é o formato repassado adiante.
const CSV_ONLY_EXCLUDED: &[&str] = &["company_id"];

/// Decide o parser pela extensão do arquivo enviado.
pub fn parse_spreadsheet(filename: &str, bytes: &[u8]) -> Result<Vec<Row>, AppError> {
    let lower = filename.to_lowercase();
    if lower.ends_with(".csv") {
        parse_csv(bytes)
    } else if lower.ends_with(".xlsx") {
        parse_xlsx(bytes)
    } else {
        Err(AppError::File(format!("unsupported file type: {filename}")))
    }
}

pub fn parse_csv(bytes: &[u8]) -> Result<Vec<Row>, AppError> {
    let mut reader = csv::ReaderBuilder::new().from_reader(bytes);
    let headers = reader
        .headers()
        .map_err(|e| AppError::File(e.to_string()))?
        .clone();

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|e| AppError::File(e.to_string()))?;
        let mut row = Row::new();
        for (header, value) in headers.iter().zip(record.iter()) {
            // Célula vazia é omitida, como numa planilha convertida.
            if !value.is_empty() {
                row.insert(header.to_string(), Value::String(value.to_string()));
            }
        }
        if !row.is_empty() {
            rows.push(row);
        }
    }
    Ok(rows)
}

pub fn parse_xlsx(bytes: &[u8]) -> Result<Vec<Row>, AppError> {
    let mut workbook: Xlsx<_> =
        Xlsx::new(Cursor::new(bytes.to_vec())).map_err(|e| AppError::File(e.to_string()))?;

    // Só a primeira aba interessa.
    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| AppError::File("workbook has no sheets".into()))?
        .map_err(|e| AppError::File(e.to_string()))?;

    let mut row_iter = range.rows();
    let Some(header_cells) = row_iter.next() else {
        return Ok(Vec::new());
    };
    let headers: Vec<String> = header_cells.iter().map(|c| c.to_string()).collect();

    let mut rows = Vec::new();
    for cells in row_iter {
        let mut row = Row::new();
        for (header, cell) in headers.iter().zip(cells.iter()) {
            if let Some(value) = cell_to_value(cell) {
                row.insert(header.clone(), value);
            }
        }
        if !row.is_empty() {
            rows.push(row);
        }
    }
    Ok(rows)
}

fn cell_to_value(cell: &Data) -> Option<Value> {
    match cell {
        Data::Empty => None,
        Data::String(s) if s.is_empty() => None,
        Data::String(s) => Some(Value::String(s.clone())),
        Data::Int(i) => Some(Value::from(*i)),
        Data::Float(f) => serde_json::Number::from_f64(*f).map(Value::Number),
        Data::Bool(b) => Some(Value::Bool(*b)),
        other => Some(Value::String(other.to_string())),
    }
}

fn exported_columns<'a>(
    columns: &'a [ColumnDescriptor],
    csv: bool,
) -> Vec<&'a ColumnDescriptor> {
    columns
        .iter()
        .filter(|col| {
            let field = col.field.as_str();
            !INTERNAL_COLUMNS.contains(&field) && !(csv && CSV_ONLY_EXCLUDED.contains(&field))
        })
        .collect()
}

/// Serializa as linhas visíveis em CSV. Cabeçalho usa os nomes de campo do
/// armazenamento. Valores são unidos por vírgula sem aspas nem escape:
/// vírgula embutida quebra a coluna (limitação conhecida do formato gerado).
pub fn export_csv(rows: &[&RecordRow], columns: &[ColumnDescriptor]) -> String {
    let exported = exported_columns(columns, true);

    let mut lines = Vec::with_capacity(rows.len() + 1);
    lines.push(
        exported
            .iter()
            .map(|col| col.storage_field().to_string())
            .collect::<Vec<_>>()
            .join(","),
    );
    for row in rows {
        lines.push(
            exported
                .iter()
                .map(|col| row.field_str(&col.field))
                .collect::<Vec<_>>()
                .join(","),
        );
    }
    lines.join("\n")
}

/// Serializa as linhas visíveis num .xlsx de aba única.
pub fn export_xlsx(rows: &[&RecordRow], columns: &[ColumnDescriptor]) -> Result<Vec<u8>, AppError> {
    let exported = exported_columns(columns, false);

    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    sheet
        .set_name("Exported Data")
        .map_err(|e| AppError::File(e.to_string()))?;

    for (col_idx, col) in exported.iter().enumerate() {
        sheet
            .write_string(0, col_idx as u16, col.storage_field())
            .map_err(|e| AppError::File(e.to_string()))?;
    }
    for (row_idx, row) in rows.iter().enumerate() {
        for (col_idx, col) in exported.iter().enumerate() {
            sheet
                .write_string(row_idx as u32 + 1, col_idx as u16, row.field_str(&col.field))
                .map_err(|e| AppError::File(e.to_string()))?;
        }
    }

    workbook
        .save_to_buffer()
        .map_err(|e| AppError::File(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::records::RowId;
    use serde_json::json;

    fn row(pairs: &[(&str, Value)]) -> RecordRow {
        let mut fields = serde_json::Map::new();
        for (key, value) in pairs {
            fields.insert(key.to_string(), value.clone());
        }
        RecordRow {
            id: RowId::Persisted("1".into()),
            fields,
            is_new: false,
        }
    }

    #[test]
    fn csv_importa_com_cabecalho() {
        let bytes = b"name,cog,quantity\nBearing,10.5,4\nShaft,,2\n";
        let rows = parse_csv(bytes).unwrap();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0]["name"], json!("Bearing"));
        assert_eq!(rows[0]["cog"], json!("10.5"));
        // Célula vazia não entra no registro.
        assert!(!rows[1].contains_key("cog"));
    }

    #[test]
    fn extensao_desconhecida_e_rejeitada() {
        assert!(matches!(
            parse_spreadsheet("dump.pdf", b""),
            Err(AppError::File(_))
        ));
    }

    #[test]
    fn export_csv_exclui_colunas_internas_e_tenant() {
        let columns = vec![
            ColumnDescriptor::new("id", "ID"),
            ColumnDescriptor::new("name", "Part Name"),
            ColumnDescriptor::new("created_at", "Created"),
            ColumnDescriptor::new("company_id", "Tenant"),
        ];
        let record = row(&[
            ("name", json!("Acme")),
            ("created_at", json!("2024-01-01")),
            ("company_id", json!("t1")),
        ]);

        let csv = export_csv(&[&record], &columns);
        assert_eq!(csv, "name\nAcme");
    }

    #[test]
    fn export_csv_nao_escapa_virgula_embutida() {
        let columns = vec![
            ColumnDescriptor::new("name", "Name"),
            ColumnDescriptor::new("description", "Description"),
        ];
        let record = row(&[
            ("name", json!("Bolt")),
            ("description", json!("hex, zinc")),
        ]);

        // Limitação documentada: a vírgula do valor vira separador.
        let csv = export_csv(&[&record], &columns);
        assert_eq!(csv, "name,description\nBolt,hex, zinc");
    }

    #[test]
    fn export_xlsx_mantem_o_tenant_fora_do_csv_somente() {
        let columns = vec![
            ColumnDescriptor::new("name", "Name"),
            ColumnDescriptor::new("company_id", "Tenant"),
        ];
        let record = row(&[("name", json!("Acme")), ("company_id", json!("t1"))]);

        let bytes = export_xlsx(&[&record], &columns).unwrap();
        let parsed = parse_xlsx(&bytes).unwrap();
        assert_eq!(parsed.len(), 1);
        assert_eq!(parsed[0]["name"], json!("Acme"));
        assert_eq!(parsed[0]["company_id"], json!("t1"));
    }
}
