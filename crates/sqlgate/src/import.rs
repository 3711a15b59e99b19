//! Bulk load: CSV or JSON text → records → chunked batched INSERTs.

use crate::builder::{BatchInsert, Record, Statement, StatementBuilder};
use crate::error::{GateError, GateResult};
use crate::ident::Ident;
use crate::value::{SqlType, Value};
use std::collections::BTreeMap;

/// Rows per batched INSERT statement when chunking an import.
pub const DEFAULT_CHUNK_SIZE: usize = 50;

/// Parse a JSON array of flat objects into records.
pub fn records_from_json(text: &str) -> GateResult<Vec<Record>> {
    let parsed: serde_json::Value = serde_json::from_str(text)
        .map_err(|e| GateError::import(format!("Invalid JSON: {e}")))?;
    let items = match parsed {
        serde_json::Value::Array(items) => items,
        _ => return Err(GateError::import("Expected a JSON array of objects")),
    };

    let mut records = Vec::with_capacity(items.len());
    for (i, item) in items.iter().enumerate() {
        let object = item
            .as_object()
            .ok_or_else(|| GateError::import(format!("Row {i}: expected a JSON object")))?;
        let record = Record::from_json(object)
            .map_err(|e| GateError::import(format!("Row {i}: {e}")))?;
        if record.is_empty() {
            return Err(GateError::import(format!("Row {i}: object has no columns")));
        }
        records.push(record);
    }
    Ok(records)
}

/// Parse CSV text (headers required) into records.
///
/// `types` maps header names to declared column types; headers without an
/// entry import as text.
pub fn records_from_csv(text: &str, types: &BTreeMap<String, SqlType>) -> GateResult<Vec<Record>> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(text.as_bytes());

    let headers = reader
        .headers()
        .map_err(|e| GateError::import(format!("Invalid CSV header: {e}")))?
        .clone();
    if headers.is_empty() {
        return Err(GateError::import("CSV input has no header row"));
    }

    let mut columns = Vec::with_capacity(headers.len());
    for header in headers.iter() {
        let ident = Ident::parse(header)
            .map_err(|e| GateError::import(format!("CSV header '{header}': {e}")))?;
        let ty = types.get(header).copied();
        columns.push((ident, ty));
    }

    let mut records = Vec::new();
    for (i, row) in reader.records().enumerate() {
        let row = row.map_err(|e| GateError::import(format!("CSV row {}: {e}", i + 1)))?;
        if row.len() != columns.len() {
            return Err(GateError::import(format!(
                "CSV row {}: expected {} fields, got {}",
                i + 1,
                columns.len(),
                row.len()
            )));
        }
        let mut record = Record::new();
        for ((column, ty), raw) in columns.iter().zip(row.iter()) {
            let value = match ty {
                Some(ty) => ty.coerce(raw).map_err(|e| {
                    GateError::import(format!(
                        "CSV row {}, column '{}': {e}",
                        i + 1,
                        column.object_name()
                    ))
                })?,
                None => Value::Text(raw.to_string()),
            };
            record.set(column.clone(), value);
        }
        records.push(record);
    }
    Ok(records)
}

/// Split records into batched INSERT statements of at most `chunk_size`
/// rows each.
pub fn chunked_inserts(
    table: &Ident,
    records: Vec<Record>,
    chunk_size: usize,
) -> GateResult<Vec<Statement>> {
    if records.is_empty() {
        return Err(GateError::import("Import contains no rows"));
    }
    let chunk_size = chunk_size.max(1);

    let mut statements = Vec::with_capacity(records.len().div_ceil(chunk_size));
    let mut records = records.into_iter().peekable();
    while records.peek().is_some() {
        let mut batch = BatchInsert::new(table.clone());
        batch.extend(records.by_ref().take(chunk_size));
        statements.push(batch.build()?);
    }
    Ok(statements)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_array_to_records() {
        let records =
            records_from_json(r#"[{"name":"Ann","age":34},{"name":"Bo","age":28}]"#).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].len(), 2);
    }

    #[test]
    fn json_rejects_non_array() {
        assert!(records_from_json(r#"{"name":"Ann"}"#).is_err());
        assert!(records_from_json("[1, 2]").is_err());
        assert!(records_from_json("[{}]").is_err());
    }

    #[test]
    fn csv_with_typed_columns() {
        let mut types = BTreeMap::new();
        types.insert("age".to_string(), SqlType::Int);
        types.insert("active".to_string(), SqlType::Bit);

        let records =
            records_from_csv("name,age,active\nAnn,34,1\nBo,,0\n", &types).unwrap();
        assert_eq!(records.len(), 2);

        let fields: Vec<_> = records[0].iter().collect();
        assert_eq!(*fields[0].1, Value::Text("Ann".to_string()));
        assert_eq!(*fields[1].1, Value::Int(34));
        assert_eq!(*fields[2].1, Value::Bool(true));

        // empty typed cell -> NULL
        let fields: Vec<_> = records[1].iter().collect();
        assert_eq!(*fields[1].1, Value::Null);
    }

    #[test]
    fn csv_rejects_bad_cell() {
        let mut types = BTreeMap::new();
        types.insert("age".to_string(), SqlType::Int);
        let err = records_from_csv("age\nnot-a-number\n", &types).unwrap_err();
        assert!(err.to_string().contains("row 1"));
    }

    #[test]
    fn chunking_splits_and_scopes() {
        let table = Ident::parse("people").unwrap();
        let records = records_from_json(
            r#"[{"n":1},{"n":2},{"n":3},{"n":4},{"n":5}]"#,
        )
        .unwrap();
        let statements = chunked_inserts(&table, records, 2).unwrap();
        assert_eq!(statements.len(), 3);
        // Two rows per statement, names scoped by in-chunk position.
        assert_eq!(statements[0].params.len(), 2);
        assert!(statements[0].sql.contains("@b0_v1"));
        assert!(statements[0].sql.contains("@b1_v1"));
        assert_eq!(statements[2].params.len(), 1);
    }

    #[test]
    fn empty_import_rejected() {
        let table = Ident::parse("people").unwrap();
        assert!(chunked_inserts(&table, Vec::new(), 10).is_err());
    }
}
