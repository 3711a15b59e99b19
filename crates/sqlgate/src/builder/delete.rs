use super::traits::{Statement, StatementBuilder};
use crate::error::{GateError, GateResult};
use crate::filter::{Filter, write_where};
use crate::ident::Ident;
use crate::params::{NamePool, Params, Role};

/// DELETE builder.
pub struct DeleteBuilder {
    table: Ident,
    filters: Vec<Filter>,
    /// Whether a full-table delete (no filters) is permitted
    allow_delete_all: bool,
}

impl DeleteBuilder {
    pub fn new(table: Ident) -> Self {
        Self {
            table,
            filters: Vec::new(),
            allow_delete_all: false,
        }
    }

    /// Create a builder around an existing filter sequence.
    pub fn from_filters(table: Ident, filters: Vec<Filter>) -> Self {
        Self {
            table,
            filters,
            allow_delete_all: false,
        }
    }

    /// Permit a DELETE without filters (full-table delete).
    pub fn allow_delete_all(&mut self, allow: bool) -> &mut Self {
        self.allow_delete_all = allow;
        self
    }

    /// Append a filter predicate.
    pub fn filter(&mut self, filter: Filter) -> &mut Self {
        self.filters.push(filter);
        self
    }
}

/// Emit one DELETE statement, binding WHERE values through the `Where` pool
/// (scoped to a batch position when given).
pub(crate) fn write_delete(
    table: &Ident,
    filters: &[Filter],
    scope: Option<usize>,
    allow_delete_all: bool,
    sql: &mut String,
    params: &mut Params,
) -> GateResult<()> {
    if filters.is_empty() && !allow_delete_all {
        return Err(GateError::validation(
            "DELETE requires at least one filter predicate",
        ));
    }

    sql.push_str("DELETE FROM ");
    table.write_sql(sql);

    if !filters.is_empty() {
        let mut pool = match scope {
            Some(i) => NamePool::scoped(Role::Where, i),
            None => NamePool::new(Role::Where),
        };
        sql.push_str(" WHERE ");
        write_where(filters, sql, &mut pool, params);
    }
    Ok(())
}

impl StatementBuilder for DeleteBuilder {
    fn build(&self) -> GateResult<Statement> {
        let mut sql = String::new();
        let mut params = Params::new();
        write_delete(
            &self.table,
            &self.filters,
            None,
            self.allow_delete_all,
            &mut sql,
            &mut params,
        )?;
        Ok(Statement { sql, params })
    }
}
