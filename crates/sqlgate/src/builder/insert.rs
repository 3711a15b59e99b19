use super::record::Record;
use super::traits::{Statement, StatementBuilder};
use crate::error::{GateError, GateResult};
use crate::ident::Ident;
use crate::params::{NamePool, Params, Role};
use crate::value::Value;

/// INSERT builder.
pub struct InsertBuilder {
    table: Ident,
    record: Record,
}

impl InsertBuilder {
    pub fn new(table: Ident) -> Self {
        Self {
            table,
            record: Record::new(),
        }
    }

    /// Create a builder around an existing record.
    pub fn from_record(table: Ident, record: Record) -> Self {
        Self { table, record }
    }

    /// Set a column value.
    pub fn set(&mut self, column: Ident, value: impl Into<Value>) -> &mut Self {
        self.record.set(column, value);
        self
    }
}

/// Emit one INSERT statement for `record`, binding values through the
/// `Values` pool (scoped to a batch position when given).
pub(crate) fn write_insert(
    table: &Ident,
    record: &Record,
    scope: Option<usize>,
    sql: &mut String,
    params: &mut Params,
) -> GateResult<()> {
    if record.is_empty() {
        return Err(GateError::validation(
            "INSERT requires at least one column value",
        ));
    }

    let mut pool = match scope {
        Some(i) => NamePool::scoped(Role::Values, i),
        None => NamePool::new(Role::Values),
    };

    sql.push_str("INSERT INTO ");
    table.write_sql(sql);
    sql.push_str(" (");
    for (i, column) in record.columns().enumerate() {
        if i > 0 {
            sql.push_str(", ");
        }
        column.write_sql(sql);
    }
    sql.push_str(") VALUES (");
    for (i, (_, value)) in record.iter().enumerate() {
        if i > 0 {
            sql.push_str(", ");
        }
        sql.push_str(&params.bind(pool.next(), value.clone()));
    }
    sql.push(')');
    Ok(())
}

impl StatementBuilder for InsertBuilder {
    fn build(&self) -> GateResult<Statement> {
        let mut sql = String::new();
        let mut params = Params::new();
        write_insert(&self.table, &self.record, None, &mut sql, &mut params)?;
        Ok(Statement { sql, params })
    }
}
