use super::record::Record;
use super::traits::{Statement, StatementBuilder};
use crate::error::{GateError, GateResult};
use crate::filter::{Filter, write_where};
use crate::ident::Ident;
use crate::params::{NamePool, Params, Role};
use crate::value::Value;

/// UPDATE builder.
///
/// SET values and WHERE values bind through disjoint name pools (`s*` vs
/// `w*`), so a column referenced in both clauses never collides.
pub struct UpdateBuilder {
    table: Ident,
    record: Record,
    filters: Vec<Filter>,
}

impl UpdateBuilder {
    pub fn new(table: Ident) -> Self {
        Self {
            table,
            record: Record::new(),
            filters: Vec::new(),
        }
    }

    /// Create a builder around an existing record and filter sequence.
    pub fn from_parts(table: Ident, record: Record, filters: Vec<Filter>) -> Self {
        Self {
            table,
            record,
            filters,
        }
    }

    /// Set a column to a new value.
    pub fn set(&mut self, column: Ident, value: impl Into<Value>) -> &mut Self {
        self.record.set(column, value);
        self
    }

    /// Append a filter predicate.
    pub fn filter(&mut self, filter: Filter) -> &mut Self {
        self.filters.push(filter);
        self
    }
}

/// Emit one UPDATE statement, binding SET and WHERE values through their
/// role pools (scoped to a batch position when given).
pub(crate) fn write_update(
    table: &Ident,
    record: &Record,
    filters: &[Filter],
    scope: Option<usize>,
    sql: &mut String,
    params: &mut Params,
) -> GateResult<()> {
    if record.is_empty() {
        return Err(GateError::validation(
            "UPDATE requires at least one SET column",
        ));
    }
    if filters.is_empty() {
        return Err(GateError::validation(
            "UPDATE requires at least one filter predicate",
        ));
    }

    let (mut set_pool, mut where_pool) = match scope {
        Some(i) => (
            NamePool::scoped(Role::Set, i),
            NamePool::scoped(Role::Where, i),
        ),
        None => (NamePool::new(Role::Set), NamePool::new(Role::Where)),
    };

    sql.push_str("UPDATE ");
    table.write_sql(sql);
    sql.push_str(" SET ");
    for (i, (column, value)) in record.iter().enumerate() {
        if i > 0 {
            sql.push_str(", ");
        }
        column.write_sql(sql);
        sql.push_str(" = ");
        sql.push_str(&params.bind(set_pool.next(), value.clone()));
    }
    sql.push_str(" WHERE ");
    write_where(filters, sql, &mut where_pool, params);
    Ok(())
}

impl StatementBuilder for UpdateBuilder {
    fn build(&self) -> GateResult<Statement> {
        let mut sql = String::new();
        let mut params = Params::new();
        write_update(
            &self.table,
            &self.record,
            &self.filters,
            None,
            &mut sql,
            &mut params,
        )?;
        Ok(Statement { sql, params })
    }
}
