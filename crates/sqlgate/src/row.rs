//! Row normalization: tiberius result rows → JSON objects.

use serde::Serialize;
use tiberius::ColumnData;

/// Normalized result of a row-returning statement.
#[derive(Debug, Clone, Serialize)]
pub struct QueryOutput {
    /// Column names in result order
    pub columns: Vec<String>,
    /// Rows as JSON objects keyed by column name
    pub rows: Vec<serde_json::Value>,
    /// Number of rows returned (after any truncation)
    pub row_count: usize,
    /// Whether the serving layer's row ceiling cut the result short
    pub truncated: bool,
}

impl QueryOutput {
    /// Build from raw tiberius rows.
    pub fn from_rows(rows: Vec<tiberius::Row>) -> Self {
        let columns: Vec<String> = rows
            .first()
            .map(|row| row.columns().iter().map(|c| c.name().to_string()).collect())
            .unwrap_or_default();

        let rows: Vec<serde_json::Value> = rows.iter().map(row_to_json).collect();
        let row_count = rows.len();
        Self {
            columns,
            rows,
            row_count,
            truncated: false,
        }
    }

    /// Cap the result at `max` rows, flagging truncation.
    ///
    /// This is the serving layer's ceiling, independent of any limit the
    /// caller asked for.
    pub fn truncate(&mut self, max: usize) {
        if self.rows.len() > max {
            self.rows.truncate(max);
            self.row_count = max;
            self.truncated = true;
        }
    }
}

/// Convert one row to a JSON object keyed by column name.
fn row_to_json(row: &tiberius::Row) -> serde_json::Value {
    let mut object = serde_json::Map::new();
    for (i, (column, data)) in row.cells().enumerate() {
        object.insert(column.name().to_string(), cell_to_json(row, i, data));
    }
    serde_json::Value::Object(object)
}

/// Convert one cell to a JSON scalar.
///
/// Date/time columns go through chrono-typed getters so they render as
/// ISO-style text rather than raw protocol values.
fn cell_to_json(row: &tiberius::Row, i: usize, data: &ColumnData<'_>) -> serde_json::Value {
    use serde_json::Value as Json;

    match data {
        ColumnData::Bit(Some(b)) => Json::Bool(*b),
        ColumnData::U8(Some(v)) => Json::from(*v as i64),
        ColumnData::I16(Some(v)) => Json::from(*v as i64),
        ColumnData::I32(Some(v)) => Json::from(*v as i64),
        ColumnData::I64(Some(v)) => Json::from(*v),
        ColumnData::F32(Some(v)) => float_to_json(*v as f64),
        ColumnData::F64(Some(v)) => float_to_json(*v),
        ColumnData::Numeric(Some(n)) => float_to_json(n.value() as f64 / 10f64.powi(n.scale() as i32)),
        ColumnData::String(Some(s)) => Json::String(s.to_string()),
        ColumnData::Guid(Some(g)) => Json::String(format!("{g}")),
        ColumnData::Binary(Some(b)) => Json::String(format!("0x{}", hex(b))),
        ColumnData::Xml(Some(xml)) => Json::String(xml.to_string()),
        ColumnData::DateTime(Some(_))
        | ColumnData::SmallDateTime(Some(_))
        | ColumnData::DateTime2(Some(_)) => row
            .try_get::<chrono::NaiveDateTime, _>(i)
            .ok()
            .flatten()
            .map(|dt| Json::String(dt.format("%Y-%m-%d %H:%M:%S%.f").to_string()))
            .unwrap_or(Json::Null),
        ColumnData::DateTimeOffset(Some(_)) => row
            .try_get::<chrono::DateTime<chrono::Utc>, _>(i)
            .ok()
            .flatten()
            .map(|dt| Json::String(dt.to_rfc3339()))
            .unwrap_or(Json::Null),
        ColumnData::Date(Some(_)) => row
            .try_get::<chrono::NaiveDate, _>(i)
            .ok()
            .flatten()
            .map(|d| Json::String(d.format("%Y-%m-%d").to_string()))
            .unwrap_or(Json::Null),
        ColumnData::Time(Some(_)) => row
            .try_get::<chrono::NaiveTime, _>(i)
            .ok()
            .flatten()
            .map(|t| Json::String(t.format("%H:%M:%S%.f").to_string()))
            .unwrap_or(Json::Null),
        _ => Json::Null,
    }
}

fn float_to_json(f: f64) -> serde_json::Value {
    serde_json::Number::from_f64(f)
        .map(serde_json::Value::Number)
        .unwrap_or(serde_json::Value::Null)
}

fn hex(bytes: &[u8]) -> String {
    use std::fmt::Write;
    let mut out = String::with_capacity(bytes.len() * 2);
    for b in bytes {
        let _ = write!(out, "{b:02x}");
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn truncate_caps_rows_and_flags() {
        let mut output = QueryOutput {
            columns: vec!["id".to_string()],
            rows: vec![json!({"id": 1}), json!({"id": 2}), json!({"id": 3})],
            row_count: 3,
            truncated: false,
        };
        output.truncate(2);
        assert_eq!(output.row_count, 2);
        assert_eq!(output.rows.len(), 2);
        assert!(output.truncated);
    }

    #[test]
    fn truncate_below_ceiling_is_noop() {
        let mut output = QueryOutput {
            columns: vec![],
            rows: vec![json!({"id": 1})],
            row_count: 1,
            truncated: false,
        };
        output.truncate(10);
        assert_eq!(output.row_count, 1);
        assert!(!output.truncated);
    }
}
