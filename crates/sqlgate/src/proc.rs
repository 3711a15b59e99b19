//! Stored-procedure invocation.

use crate::builder::{Statement, StatementBuilder};
use crate::error::{GateError, GateResult};
use crate::ident::Ident;
use crate::params::{NamePool, Params, Role};
use crate::value::Value;

/// A stored-procedure call: `EXEC [dbo].[proc] @name1 = @a1, @name2 = @a2`.
///
/// Argument names address the procedure's declared parameters; argument
/// values bind through the `a` pool, never interpolated.
pub struct ProcCall {
    proc: Ident,
    args: Vec<(String, Value)>,
}

impl ProcCall {
    pub fn new(proc: Ident) -> Self {
        Self {
            proc,
            args: Vec::new(),
        }
    }

    /// Add a named argument. A leading `@` on the name is accepted and
    /// stripped.
    pub fn arg(&mut self, name: impl Into<String>, value: impl Into<Value>) -> &mut Self {
        let name = name.into();
        let name = name.strip_prefix('@').map(str::to_string).unwrap_or(name);
        self.args.push((name, value.into()));
        self
    }
}

fn valid_arg_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c == '_' || c.is_ascii_alphabetic() => {}
        _ => return false,
    }
    chars.all(|c| c == '_' || c.is_ascii_alphanumeric())
}

impl StatementBuilder for ProcCall {
    fn build(&self) -> GateResult<Statement> {
        let mut sql = String::from("EXEC ");
        let mut params = Params::new();
        let mut pool = NamePool::new(Role::Arg);

        self.proc.write_sql(&mut sql);
        for (i, (name, value)) in self.args.iter().enumerate() {
            if !valid_arg_name(name) {
                return Err(GateError::validation(format!(
                    "Invalid procedure argument name '{name}'"
                )));
            }
            sql.push_str(if i == 0 { " " } else { ", " });
            sql.push('@');
            sql.push_str(name);
            sql.push_str(" = ");
            sql.push_str(&params.bind(pool.next(), value.clone()));
        }

        Ok(Statement { sql, params })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_args() {
        let call = ProcCall::new(Ident::parse("dbo.RefreshTotals").unwrap());
        let stmt = call.build().unwrap();
        assert_eq!(stmt.sql, "EXEC [dbo].[RefreshTotals]");
        assert!(stmt.params.is_empty());
    }

    #[test]
    fn named_args_bind_values() {
        let mut call = ProcCall::new(Ident::parse("dbo.AdjustPrice").unwrap());
        call.arg("ProductId", 42).arg("@Factor", 1.1);
        let stmt = call.build().unwrap();
        assert_eq!(
            stmt.sql,
            "EXEC [dbo].[AdjustPrice] @ProductId = @a1, @Factor = @a2"
        );
        assert_eq!(stmt.params.get("a1"), Some(&Value::Int(42)));
        assert_eq!(stmt.params.get("a2"), Some(&Value::Float(1.1)));
    }

    #[test]
    fn rejects_bad_arg_name() {
        let mut call = ProcCall::new(Ident::parse("p").unwrap());
        call.arg("bad name", 1);
        assert!(call.build().is_err());
    }
}
