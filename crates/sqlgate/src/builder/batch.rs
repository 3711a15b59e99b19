//! Batched mutations: many logical entries, one physical execution.
//!
//! Each entry emits its own statement; the statements are joined into a
//! single multi-statement batch separated by `;`. Placeholder names carry
//! the entry's batch position (`b0_v1`, `b1_v1`, ...), so entries binding
//! the same column stay collision-free even though every entry's counters
//! restart at 1.

use super::delete::write_delete;
use super::insert::write_insert;
use super::record::Record;
use super::traits::{Statement, StatementBuilder};
use super::update::write_update;
use crate::error::{GateError, GateResult};
use crate::filter::Filter;
use crate::ident::Ident;
use crate::params::Params;

const STATEMENT_SEPARATOR: &str = ";\n";

/// Batched INSERT: one statement per record.
pub struct BatchInsert {
    table: Ident,
    rows: Vec<Record>,
}

impl BatchInsert {
    pub fn new(table: Ident) -> Self {
        Self {
            table,
            rows: Vec::new(),
        }
    }

    /// Append one record.
    pub fn push(&mut self, record: Record) -> &mut Self {
        self.rows.push(record);
        self
    }

    /// Append many records.
    pub fn extend(&mut self, records: impl IntoIterator<Item = Record>) -> &mut Self {
        self.rows.extend(records);
        self
    }

    /// Number of batched records.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Check if the batch is empty.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

impl StatementBuilder for BatchInsert {
    fn build(&self) -> GateResult<Statement> {
        if self.rows.is_empty() {
            return Err(GateError::validation(
                "Batched INSERT requires at least one record",
            ));
        }
        let mut sql = String::new();
        let mut params = Params::new();
        for (i, record) in self.rows.iter().enumerate() {
            if i > 0 {
                sql.push_str(STATEMENT_SEPARATOR);
            }
            write_insert(&self.table, record, Some(i), &mut sql, &mut params)?;
        }
        Ok(Statement { sql, params })
    }
}

/// One batched-update entry: the new values plus the predicates selecting
/// the rows they apply to.
pub struct UpdateEntry {
    pub record: Record,
    pub filters: Vec<Filter>,
}

/// Batched UPDATE: one statement per entry.
pub struct BatchUpdate {
    table: Ident,
    entries: Vec<UpdateEntry>,
}

impl BatchUpdate {
    pub fn new(table: Ident) -> Self {
        Self {
            table,
            entries: Vec::new(),
        }
    }

    /// Append one entry.
    pub fn push(&mut self, record: Record, filters: Vec<Filter>) -> &mut Self {
        self.entries.push(UpdateEntry { record, filters });
        self
    }

    /// Number of batched entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the batch is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl StatementBuilder for BatchUpdate {
    fn build(&self) -> GateResult<Statement> {
        if self.entries.is_empty() {
            return Err(GateError::validation(
                "Batched UPDATE requires at least one entry",
            ));
        }
        let mut sql = String::new();
        let mut params = Params::new();
        for (i, entry) in self.entries.iter().enumerate() {
            if i > 0 {
                sql.push_str(STATEMENT_SEPARATOR);
            }
            write_update(
                &self.table,
                &entry.record,
                &entry.filters,
                Some(i),
                &mut sql,
                &mut params,
            )?;
        }
        Ok(Statement { sql, params })
    }
}

/// Batched DELETE: one statement per filter sequence.
pub struct BatchDelete {
    table: Ident,
    entries: Vec<Vec<Filter>>,
}

impl BatchDelete {
    pub fn new(table: Ident) -> Self {
        Self {
            table,
            entries: Vec::new(),
        }
    }

    /// Append one entry (the predicates selecting rows to delete).
    pub fn push(&mut self, filters: Vec<Filter>) -> &mut Self {
        self.entries.push(filters);
        self
    }

    /// Number of batched entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the batch is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl StatementBuilder for BatchDelete {
    fn build(&self) -> GateResult<Statement> {
        if self.entries.is_empty() {
            return Err(GateError::validation(
                "Batched DELETE requires at least one entry",
            ));
        }
        let mut sql = String::new();
        let mut params = Params::new();
        for (i, filters) in self.entries.iter().enumerate() {
            if i > 0 {
                sql.push_str(STATEMENT_SEPARATOR);
            }
            // Full-table deletes are never allowed through the batch path.
            write_delete(&self.table, filters, Some(i), false, &mut sql, &mut params)?;
        }
        Ok(Statement { sql, params })
    }
}
