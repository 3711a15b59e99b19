//! Tool input/output shapes and their conversions into core types.
//!
//! Structural validation (non-empty arrays, non-blank strings, known
//! enumeration tokens) happens here, before a description ever reaches the
//! statement builders.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use sqlgate::{
    Direction, Filter, GateError, GateResult, Ident, Join, JoinKind, OrderTerm, QueryOutput,
    Record, SqlType,
};
use std::collections::BTreeMap;

/// One filter predicate in wire form.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct FilterSpec {
    /// Column name, optionally schema-qualified
    pub column: String,
    /// Operator: =, !=, >, <, >=, <=, like, in, not_in, is_null, is_not_null
    pub operator: String,
    /// Comparison value; an array for in/not_in, omitted for the null tests
    #[serde(default)]
    pub value: Option<serde_json::Value>,
}

impl FilterSpec {
    pub fn to_filter(&self) -> GateResult<Filter> {
        Filter::parse(&self.column, &self.operator, self.value.as_ref())
    }
}

pub fn to_filters(specs: &[FilterSpec]) -> GateResult<Vec<Filter>> {
    specs.iter().map(FilterSpec::to_filter).collect()
}

/// One join clause in wire form.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct JoinSpec {
    /// Join kind: inner, left, right, or full
    pub kind: String,
    /// Table to join
    pub table: String,
    /// Raw ON expression. Emitted as-is — treat as trusted SQL text.
    pub on: String,
}

impl JoinSpec {
    pub fn to_join(&self) -> GateResult<Join> {
        if self.on.trim().is_empty() {
            return Err(GateError::validation("Join ON expression cannot be empty"));
        }
        Join::new(JoinKind::parse(&self.kind)?, self.table.as_str(), self.on.clone())
    }
}

/// One ordering term in wire form.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct OrderSpec {
    /// Column to sort by
    pub column: String,
    /// Sort direction: asc (default) or desc
    #[serde(default)]
    pub direction: Option<String>,
}

impl OrderSpec {
    pub fn to_order_term(&self) -> GateResult<OrderTerm> {
        let direction = match &self.direction {
            Some(d) => Direction::parse(d)?,
            None => Direction::Asc,
        };
        OrderTerm::new(self.column.as_str(), direction)
    }
}

/// Parse a table name, with a friendlier message for blank input.
pub fn parse_table(table: &str) -> GateResult<Ident> {
    if table.trim().is_empty() {
        return Err(GateError::validation("Table name cannot be empty"));
    }
    Ident::parse(table)
}

/// Convert a JSON object into a [`Record`], rejecting empty objects.
pub fn parse_record(
    map: &serde_json::Map<String, serde_json::Value>,
    what: &str,
) -> GateResult<Record> {
    if map.is_empty() {
        return Err(GateError::validation(format!("{what} cannot be empty")));
    }
    Record::from_json(map)
}

// ==================== Tool inputs ====================

#[derive(Debug, Deserialize, JsonSchema)]
pub struct ReadRowsInput {
    /// Table to read from
    pub table: String,
    /// Columns to project (default: all columns)
    #[serde(default)]
    pub columns: Option<Vec<String>>,
    /// Filter predicates, AND-combined in order
    #[serde(default)]
    pub filters: Option<Vec<FilterSpec>>,
    /// Join clauses, applied in order
    #[serde(default)]
    pub joins: Option<Vec<JoinSpec>>,
    /// Ordering terms, applied in order
    #[serde(default)]
    pub order_by: Option<Vec<OrderSpec>>,
    /// Maximum rows to return
    #[serde(default)]
    pub limit: Option<u64>,
    /// Rows to skip (requires order_by)
    #[serde(default)]
    pub offset: Option<u64>,
    /// Run inside an open transaction
    #[serde(default)]
    pub transaction_id: Option<String>,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct InsertRowInput {
    /// Table to insert into
    pub table: String,
    /// Column → value object for the new row
    pub row: serde_json::Map<String, serde_json::Value>,
    /// Run inside an open transaction
    #[serde(default)]
    pub transaction_id: Option<String>,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct UpdateRowsInput {
    /// Table to update
    pub table: String,
    /// Column → new-value object
    pub set: serde_json::Map<String, serde_json::Value>,
    /// Filter predicates selecting the rows to update (required, non-empty)
    pub filters: Vec<FilterSpec>,
    /// Run inside an open transaction
    #[serde(default)]
    pub transaction_id: Option<String>,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct DeleteRowsInput {
    /// Table to delete from
    pub table: String,
    /// Filter predicates selecting the rows to delete (required, non-empty)
    pub filters: Vec<FilterSpec>,
    /// Run inside an open transaction
    #[serde(default)]
    pub transaction_id: Option<String>,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct InsertBatchInput {
    /// Table to insert into
    pub table: String,
    /// One column → value object per row
    pub rows: Vec<serde_json::Map<String, serde_json::Value>>,
    /// Run inside an open transaction
    #[serde(default)]
    pub transaction_id: Option<String>,
}

/// One batched-update entry in wire form.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct UpdateEntrySpec {
    /// Column → new-value object
    pub set: serde_json::Map<String, serde_json::Value>,
    /// Filter predicates selecting the rows this entry updates
    pub filters: Vec<FilterSpec>,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct UpdateBatchInput {
    /// Table to update
    pub table: String,
    /// Batched entries, executed in order
    pub entries: Vec<UpdateEntrySpec>,
    /// Run inside an open transaction
    #[serde(default)]
    pub transaction_id: Option<String>,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct DeleteBatchInput {
    /// Table to delete from
    pub table: String,
    /// One filter-predicate list per batched delete
    pub entries: Vec<Vec<FilterSpec>>,
    /// Run inside an open transaction
    #[serde(default)]
    pub transaction_id: Option<String>,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct ListTablesInput {
    /// Restrict to one schema
    #[serde(default)]
    pub schema: Option<String>,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct TableInput {
    /// Table name, optionally schema-qualified
    pub table: String,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct CallProcedureInput {
    /// Stored procedure name, optionally schema-qualified
    pub procedure: String,
    /// Named arguments for the procedure
    #[serde(default)]
    pub arguments: Option<serde_json::Map<String, serde_json::Value>>,
    /// Run inside an open transaction
    #[serde(default)]
    pub transaction_id: Option<String>,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct TransactionIdInput {
    /// Id returned by begin_transaction
    pub transaction_id: String,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct SavepointInput {
    /// Id returned by begin_transaction
    pub transaction_id: String,
    /// Savepoint name (single identifier)
    pub name: String,
}

/// Import payload format.
#[derive(Debug, Clone, Copy, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum ImportFormat {
    Json,
    Csv,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct ImportRowsInput {
    /// Table to load into
    pub table: String,
    /// Payload format
    pub format: ImportFormat,
    /// The payload: a JSON array of objects, or CSV text with a header row
    pub data: String,
    /// CSV only: column name → declared type (bit, int, bigint, float,
    /// nvarchar) for typed coercion; unlisted columns import as text
    #[serde(default)]
    pub column_types: Option<BTreeMap<String, String>>,
    /// Run inside an open transaction
    #[serde(default)]
    pub transaction_id: Option<String>,
}

impl ImportRowsInput {
    pub fn parsed_column_types(&self) -> GateResult<BTreeMap<String, SqlType>> {
        let mut types = BTreeMap::new();
        if let Some(raw) = &self.column_types {
            for (column, name) in raw {
                types.insert(column.clone(), SqlType::parse(name)?);
            }
        }
        Ok(types)
    }
}

// ==================== Tool outputs ====================

/// Rows returned by a read or procedure call.
#[derive(Debug, Serialize, JsonSchema)]
pub struct RowsOutput {
    /// Column names in result order
    pub columns: Vec<String>,
    /// Rows as JSON objects keyed by column name
    pub rows: Vec<serde_json::Value>,
    /// Number of rows returned (after any truncation)
    pub row_count: usize,
    /// Whether the server's row ceiling cut the result short
    pub truncated: bool,
}

impl From<QueryOutput> for RowsOutput {
    fn from(output: QueryOutput) -> Self {
        Self {
            columns: output.columns,
            rows: output.rows,
            row_count: output.row_count,
            truncated: output.truncated,
        }
    }
}

/// Result of a mutation.
#[derive(Debug, Serialize, JsonSchema)]
pub struct MutationOutput {
    /// Affected row count, summed across a multi-statement batch
    pub rows_affected: u64,
}

/// Result of begin_transaction.
#[derive(Debug, Serialize, JsonSchema)]
pub struct BeginTransactionOutput {
    /// Pass this id to other tools to run inside the transaction
    pub transaction_id: String,
}

/// Result of transaction-control tools.
#[derive(Debug, Serialize, JsonSchema)]
pub struct TransactionOutput {
    pub transaction_id: String,
    /// What happened: committed, rolled_back, savepoint_created,
    /// rolled_back_to_savepoint
    pub status: String,
}

/// Result of import_rows.
#[derive(Debug, Serialize, JsonSchema)]
pub struct ImportOutput {
    /// Rows parsed from the payload
    pub rows_parsed: usize,
    /// Batched INSERT statements executed
    pub statements_executed: usize,
    /// Affected row count reported by the database
    pub rows_affected: u64,
}
