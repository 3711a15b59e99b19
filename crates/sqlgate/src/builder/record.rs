//! Column-to-value records for INSERT and UPDATE shapes.

use crate::error::GateResult;
use crate::ident::Ident;
use crate::value::Value;

/// An ordered mapping from column name to scalar value.
///
/// Order is preserved as supplied and mirrored in the emitted column and
/// placeholder lists.
#[derive(Debug, Clone, Default)]
pub struct Record {
    fields: Vec<(Ident, Value)>,
}

impl Record {
    /// Create an empty record.
    pub fn new() -> Self {
        Self { fields: Vec::new() }
    }

    /// Set a column value.
    pub fn set(&mut self, column: Ident, value: impl Into<Value>) -> &mut Self {
        self.fields.push((column, value.into()));
        self
    }

    /// Build a record from a JSON object of column → scalar.
    pub fn from_json(map: &serde_json::Map<String, serde_json::Value>) -> GateResult<Self> {
        let mut record = Record::new();
        for (column, value) in map {
            record.set(Ident::parse(column)?, Value::from_json(value)?);
        }
        Ok(record)
    }

    /// Iterate fields in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&Ident, &Value)> {
        self.fields.iter().map(|(c, v)| (c, v))
    }

    /// Number of columns.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Check if the record has no columns.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Column names in insertion order.
    pub fn columns(&self) -> impl Iterator<Item = &Ident> {
        self.fields.iter().map(|(c, _)| c)
    }
}
