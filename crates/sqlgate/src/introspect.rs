//! Schema introspection statements.
//!
//! Plain read-only metadata queries over `INFORMATION_SCHEMA` and the `sys`
//! catalog. The templates are fixed; anything caller-supplied (schema or
//! table names used as *lookup values*) binds through the same
//! placeholder/parameter contract the builders use.

use crate::builder::Statement;
use crate::ident::Ident;
use crate::params::{NamePool, Params, Role};

/// List tables and views, optionally restricted to one schema.
pub fn list_tables(schema: Option<&str>) -> Statement {
    let mut sql = String::from(
        "SELECT TABLE_SCHEMA, TABLE_NAME, TABLE_TYPE FROM INFORMATION_SCHEMA.TABLES",
    );
    let mut params = Params::new();
    let mut pool = NamePool::new(Role::Where);
    if let Some(schema) = schema {
        sql.push_str(" WHERE TABLE_SCHEMA = ");
        sql.push_str(&params.bind(pool.next(), schema.into()));
    }
    sql.push_str(" ORDER BY TABLE_SCHEMA, TABLE_NAME");
    Statement { sql, params }
}

/// Column metadata for one table.
pub fn table_columns(table: &Ident) -> Statement {
    let mut sql = String::from(
        "SELECT COLUMN_NAME, DATA_TYPE, IS_NULLABLE, CHARACTER_MAXIMUM_LENGTH, \
         COLUMN_DEFAULT, ORDINAL_POSITION \
         FROM INFORMATION_SCHEMA.COLUMNS WHERE TABLE_NAME = ",
    );
    let mut params = Params::new();
    let mut pool = NamePool::new(Role::Where);
    sql.push_str(&params.bind(pool.next(), table.object_name().into()));
    if let Some(schema) = table.schema_name() {
        sql.push_str(" AND TABLE_SCHEMA = ");
        sql.push_str(&params.bind(pool.next(), schema.into()));
    }
    sql.push_str(" ORDER BY ORDINAL_POSITION");
    Statement { sql, params }
}

/// Index metadata for one table.
pub fn table_indexes(table: &Ident) -> Statement {
    let mut sql = String::from(
        "SELECT i.name AS index_name, i.type_desc, i.is_unique, i.is_primary_key, \
         c.name AS column_name, ic.key_ordinal \
         FROM sys.indexes i \
         INNER JOIN sys.index_columns ic ON ic.object_id = i.object_id AND ic.index_id = i.index_id \
         INNER JOIN sys.columns c ON c.object_id = ic.object_id AND c.column_id = ic.column_id \
         WHERE i.object_id = OBJECT_ID(",
    );
    let mut params = Params::new();
    let mut pool = NamePool::new(Role::Where);
    sql.push_str(&params.bind(pool.next(), table.to_sql().into()));
    sql.push_str(") ORDER BY i.name, ic.key_ordinal");
    Statement { sql, params }
}

/// Foreign-key metadata for one table.
pub fn foreign_keys(table: &Ident) -> Statement {
    let mut sql = String::from(
        "SELECT fk.name AS constraint_name, cp.name AS column_name, \
         OBJECT_SCHEMA_NAME(fk.referenced_object_id) AS referenced_schema, \
         OBJECT_NAME(fk.referenced_object_id) AS referenced_table, \
         cr.name AS referenced_column \
         FROM sys.foreign_keys fk \
         INNER JOIN sys.foreign_key_columns fkc ON fkc.constraint_object_id = fk.object_id \
         INNER JOIN sys.columns cp ON cp.object_id = fkc.parent_object_id AND cp.column_id = fkc.parent_column_id \
         INNER JOIN sys.columns cr ON cr.object_id = fkc.referenced_object_id AND cr.column_id = fkc.referenced_column_id \
         WHERE fk.parent_object_id = OBJECT_ID(",
    );
    let mut params = Params::new();
    let mut pool = NamePool::new(Role::Where);
    sql.push_str(&params.bind(pool.next(), table.to_sql().into()));
    sql.push_str(") ORDER BY fk.name, fkc.constraint_column_id");
    Statement { sql, params }
}
