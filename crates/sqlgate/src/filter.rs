//! Filter predicates for dynamic WHERE clauses.
//!
//! This module provides [`Op`] (operator) and [`Filter`] primitives. A
//! filter is one comparison test against a named column; a statement takes
//! an ordered sequence of them, AND-joined in input order. There is no OR
//! and no grouping — that is a deliberate simplicity constraint of the tool
//! surface, not an oversight.

use crate::error::{GateError, GateResult};
use crate::ident::{Ident, IntoIdent};
use crate::params::{NamePool, Params};
use crate::value::Value;

/// Comparison operator for building filter predicates.
///
/// # Example
/// ```ignore
/// use sqlgate::{Filter, Op};
///
/// Filter::new("status", Op::eq("active"))?;
/// Filter::new("price", Op::gt(100))?;
/// Filter::new("name", Op::like("%smith%"))?;
/// Filter::new("region", Op::in_list(vec!["EU".into(), "US".into()]))?;
/// Filter::new("deleted_at", Op::IsNull)?;
/// # Ok::<(), sqlgate::GateError>(())
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum Op {
    /// Equal: column = value
    Eq(Value),
    /// Not equal: column != value
    Ne(Value),
    /// Greater than: column > value
    Gt(Value),
    /// Less than: column < value
    Lt(Value),
    /// Greater than or equal: column >= value
    Gte(Value),
    /// Less than or equal: column <= value
    Lte(Value),
    /// LIKE pattern match
    Like(Value),
    /// IN (list)
    In(Vec<Value>),
    /// NOT IN (list)
    NotIn(Vec<Value>),
    /// IS NULL
    IsNull,
    /// IS NOT NULL
    IsNotNull,
}

impl Op {
    pub fn eq(val: impl Into<Value>) -> Self {
        Op::Eq(val.into())
    }

    pub fn ne(val: impl Into<Value>) -> Self {
        Op::Ne(val.into())
    }

    pub fn gt(val: impl Into<Value>) -> Self {
        Op::Gt(val.into())
    }

    pub fn lt(val: impl Into<Value>) -> Self {
        Op::Lt(val.into())
    }

    pub fn gte(val: impl Into<Value>) -> Self {
        Op::Gte(val.into())
    }

    pub fn lte(val: impl Into<Value>) -> Self {
        Op::Lte(val.into())
    }

    pub fn like(pattern: impl Into<Value>) -> Self {
        Op::Like(pattern.into())
    }

    pub fn in_list(vals: Vec<Value>) -> Self {
        Op::In(vals)
    }

    pub fn not_in(vals: Vec<Value>) -> Self {
        Op::NotIn(vals)
    }

    fn sql_token(&self) -> &'static str {
        match self {
            Op::Eq(_) => "=",
            Op::Ne(_) => "!=",
            Op::Gt(_) => ">",
            Op::Lt(_) => "<",
            Op::Gte(_) => ">=",
            Op::Lte(_) => "<=",
            Op::Like(_) => "LIKE",
            Op::In(_) => "IN",
            Op::NotIn(_) => "NOT IN",
            Op::IsNull => "IS NULL",
            Op::IsNotNull => "IS NOT NULL",
        }
    }
}

/// One filter predicate: a column, an operator, and its value(s).
#[derive(Debug, Clone, PartialEq)]
pub struct Filter {
    column: Ident,
    op: Op,
}

impl Filter {
    /// Create a filter, validating operator/value shape.
    ///
    /// Membership operators require a non-empty value sequence; an empty
    /// `IN ()` is never emitted.
    pub fn new<I: IntoIdent>(column: I, op: Op) -> GateResult<Self> {
        let column = column.into_ident()?;
        if let Op::In(vals) | Op::NotIn(vals) = &op {
            if vals.is_empty() {
                return Err(GateError::validation(format!(
                    "{} filter on '{}' requires a non-empty value list",
                    op.sql_token(),
                    column.object_name()
                )));
            }
        }
        Ok(Self { column, op })
    }

    /// Parse a filter from its wire form: an operator token plus an
    /// optional JSON value.
    ///
    /// Accepted operator tokens (case-insensitive): `=`, `!=`, `<>`, `>`,
    /// `<`, `>=`, `<=`, `like`, `in`, `not in`, `is null`, `is not null`
    /// (underscores may stand in for spaces).
    pub fn parse(column: &str, operator: &str, value: Option<&serde_json::Value>) -> GateResult<Self> {
        let token = operator.trim().to_ascii_lowercase().replace('_', " ");

        let scalar = |v: Option<&serde_json::Value>| -> GateResult<Value> {
            match v {
                Some(v) => Value::from_json(v),
                None => Err(GateError::validation(format!(
                    "Operator '{operator}' on column '{column}' requires a value"
                ))),
            }
        };
        let list = |v: Option<&serde_json::Value>| -> GateResult<Vec<Value>> {
            match v {
                Some(serde_json::Value::Array(items)) => {
                    items.iter().map(Value::from_json).collect()
                }
                Some(_) => Err(GateError::validation(format!(
                    "Operator '{operator}' on column '{column}' requires an array value"
                ))),
                None => Err(GateError::validation(format!(
                    "Operator '{operator}' on column '{column}' requires an array value"
                ))),
            }
        };
        let no_value = |v: Option<&serde_json::Value>, op: Op| -> GateResult<Op> {
            match v {
                None | Some(serde_json::Value::Null) => Ok(op),
                Some(_) => Err(GateError::validation(format!(
                    "Operator '{operator}' on column '{column}' does not take a value"
                ))),
            }
        };

        let op = match token.as_str() {
            "=" | "eq" => Op::Eq(scalar(value)?),
            "!=" | "<>" | "ne" => Op::Ne(scalar(value)?),
            ">" | "gt" => Op::Gt(scalar(value)?),
            "<" | "lt" => Op::Lt(scalar(value)?),
            ">=" | "gte" => Op::Gte(scalar(value)?),
            "<=" | "lte" => Op::Lte(scalar(value)?),
            "like" => Op::Like(scalar(value)?),
            "in" => Op::In(list(value)?),
            "not in" => Op::NotIn(list(value)?),
            "is null" => no_value(value, Op::IsNull)?,
            "is not null" => no_value(value, Op::IsNotNull)?,
            other => {
                return Err(GateError::validation(format!(
                    "Unknown filter operator '{other}'"
                )));
            }
        };

        Self::new(column, op)
    }

    /// The filtered column.
    pub fn column(&self) -> &Ident {
        &self.column
    }

    /// Emit this predicate's clause, binding values through `pool`.
    pub(crate) fn write_clause(&self, out: &mut String, pool: &mut NamePool, params: &mut Params) {
        self.column.write_sql(out);
        match &self.op {
            Op::IsNull | Op::IsNotNull => {
                out.push(' ');
                out.push_str(self.op.sql_token());
            }
            Op::In(vals) | Op::NotIn(vals) => {
                out.push(' ');
                out.push_str(self.op.sql_token());
                out.push_str(" (");
                for (i, v) in vals.iter().enumerate() {
                    if i > 0 {
                        out.push_str(", ");
                    }
                    out.push_str(&params.bind(pool.next(), v.clone()));
                }
                out.push(')');
            }
            Op::Eq(v) | Op::Ne(v) | Op::Gt(v) | Op::Lt(v) | Op::Gte(v) | Op::Lte(v)
            | Op::Like(v) => {
                out.push(' ');
                out.push_str(self.op.sql_token());
                out.push(' ');
                out.push_str(&params.bind(pool.next(), v.clone()));
            }
        }
    }
}

/// Emit an AND-joined WHERE clause body from `filters` in input order.
pub(crate) fn write_where(
    filters: &[Filter],
    out: &mut String,
    pool: &mut NamePool,
    params: &mut Params,
) {
    for (i, filter) in filters.iter().enumerate() {
        if i > 0 {
            out.push_str(" AND ");
        }
        filter.write_clause(out, pool, params);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::Role;
    use serde_json::json;

    fn render(filter: &Filter) -> (String, Params) {
        let mut out = String::new();
        let mut pool = NamePool::new(Role::Where);
        let mut params = Params::new();
        filter.write_clause(&mut out, &mut pool, &mut params);
        (out, params)
    }

    #[test]
    fn eq_binds_one_param() {
        let f = Filter::new("status", Op::eq("active")).unwrap();
        let (sql, params) = render(&f);
        assert_eq!(sql, "[status] = @w1");
        assert_eq!(params.get("w1"), Some(&Value::Text("active".to_string())));
    }

    #[test]
    fn null_tests_bind_nothing() {
        let f = Filter::new("deleted_at", Op::IsNull).unwrap();
        let (sql, params) = render(&f);
        assert_eq!(sql, "[deleted_at] IS NULL");
        assert!(params.is_empty());

        let f = Filter::new("deleted_at", Op::IsNotNull).unwrap();
        let (sql, _) = render(&f);
        assert_eq!(sql, "[deleted_at] IS NOT NULL");
    }

    #[test]
    fn in_expands_per_element() {
        let f = Filter::new(
            "status",
            Op::in_list(vec!["A".into(), "B".into(), "C".into()]),
        )
        .unwrap();
        let (sql, params) = render(&f);
        assert_eq!(sql, "[status] IN (@w1, @w2, @w3)");
        assert_eq!(params.len(), 3);
        assert_eq!(params.get("w2"), Some(&Value::Text("B".to_string())));
    }

    #[test]
    fn not_in_renders_token() {
        let f = Filter::new("id", Op::not_in(vec![1.into(), 2.into()])).unwrap();
        let (sql, _) = render(&f);
        assert_eq!(sql, "[id] NOT IN (@w1, @w2)");
    }

    #[test]
    fn empty_in_rejected() {
        let err = Filter::new("id", Op::in_list(vec![])).unwrap_err();
        assert!(err.is_validation());
        assert!(Filter::new("id", Op::not_in(vec![])).is_err());
    }

    #[test]
    fn parse_wire_forms() {
        let f = Filter::parse("age", ">=", Some(&json!(21))).unwrap();
        let (sql, _) = render(&f);
        assert_eq!(sql, "[age] >= @w1");

        let f = Filter::parse("status", "IN", Some(&json!(["A", "B"]))).unwrap();
        let (sql, _) = render(&f);
        assert_eq!(sql, "[status] IN (@w1, @w2)");

        let f = Filter::parse("deleted_at", "is_not_null", None).unwrap();
        let (sql, _) = render(&f);
        assert_eq!(sql, "[deleted_at] IS NOT NULL");
    }

    #[test]
    fn parse_rejects_bad_shapes() {
        // value on a null test
        assert!(Filter::parse("x", "is null", Some(&json!(1))).is_err());
        // scalar on a membership test
        assert!(Filter::parse("x", "in", Some(&json!(1))).is_err());
        // empty membership list
        assert!(Filter::parse("x", "in", Some(&json!([]))).is_err());
        // missing value on a comparison
        assert!(Filter::parse("x", "=", None).is_err());
        // unknown operator
        assert!(Filter::parse("x", "between", Some(&json!(1))).is_err());
    }

    #[test]
    fn where_joins_in_order() {
        let filters = vec![
            Filter::new("a", Op::eq(1)).unwrap(),
            Filter::new("b", Op::IsNull).unwrap(),
            Filter::new("c", Op::lt(5)).unwrap(),
        ];
        let mut out = String::new();
        let mut pool = NamePool::new(Role::Where);
        let mut params = Params::new();
        write_where(&filters, &mut out, &mut pool, &mut params);
        assert_eq!(out, "[a] = @w1 AND [b] IS NULL AND [c] < @w2");
    }
}
