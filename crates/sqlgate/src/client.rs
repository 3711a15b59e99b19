//! Execution seam: run a built statement against a SQL Server connection.
//!
//! The builders emit `@name` placeholders; the TDS wire protocol binds
//! positionally as `@P1, @P2, ...`. [`to_positional`] bridges the two:
//! known names are rewritten to `@PN` in first-occurrence order and their
//! values collected in the same order. `@` tokens that are not parameter
//! names (`@@ROWCOUNT`, variables inside a join's ON fragment) pass through
//! untouched.

use crate::error::GateResult;
use crate::params::Params;
use std::future::Future;
use tiberius::ToSql;
use tokio::net::TcpStream;
use tokio_util::compat::Compat;

/// A connected tiberius client over a tokio TCP stream.
pub type TdsClient = tiberius::Client<Compat<TcpStream>>;

/// The narrow execution contract the builders need: run parameterized SQL,
/// get back rows or an affected-row count.
///
/// TDS connections are exclusive while a statement is in flight, hence
/// `&mut self`.
pub trait Executor: Send {
    /// Run a row-returning statement.
    fn query(
        &mut self,
        sql: &str,
        params: &Params,
    ) -> impl Future<Output = GateResult<Vec<tiberius::Row>>> + Send;

    /// Run a mutation and return the total affected row count.
    fn execute(
        &mut self,
        sql: &str,
        params: &Params,
    ) -> impl Future<Output = GateResult<u64>> + Send;
}

impl Executor for TdsClient {
    async fn query(&mut self, sql: &str, params: &Params) -> GateResult<Vec<tiberius::Row>> {
        let (text, binds) = to_positional(sql, params);
        tracing::debug!(params = params.len(), sql = %text, "query");
        let stream = tiberius::Client::query(self, text, &binds).await?;
        Ok(stream.into_first_result().await?)
    }

    async fn execute(&mut self, sql: &str, params: &Params) -> GateResult<u64> {
        let (text, binds) = to_positional(sql, params);
        tracing::debug!(params = params.len(), sql = %text, "execute");
        let result = tiberius::Client::execute(self, text, &binds).await?;
        Ok(result.rows_affected().iter().sum())
    }
}

/// Rewrite `@name` placeholders to positional `@PN` markers and collect the
/// bound values in marker order.
///
/// A name bound more than once in the text reuses its first position.
pub fn to_positional<'a>(sql: &str, params: &'a Params) -> (String, Vec<&'a dyn ToSql>) {
    let mut out = String::with_capacity(sql.len());
    let mut order: Vec<String> = Vec::new();
    let mut binds: Vec<&'a dyn ToSql> = Vec::new();

    let mut chars = sql.chars().peekable();
    while let Some(c) = chars.next() {
        if c != '@' {
            out.push(c);
            continue;
        }
        let mut name = String::new();
        while let Some(&nc) = chars.peek() {
            if nc == '_' || nc.is_ascii_alphanumeric() {
                name.push(nc);
                chars.next();
            } else {
                break;
            }
        }
        match params.get(&name) {
            Some(value) => {
                let idx = match order.iter().position(|n| *n == name) {
                    Some(i) => i,
                    None => {
                        order.push(name);
                        binds.push(value as &dyn ToSql);
                        order.len() - 1
                    }
                };
                out.push_str(&format!("@P{}", idx + 1));
            }
            None => {
                out.push('@');
                out.push_str(&name);
            }
        }
    }

    (out, binds)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Value;

    fn params_of(entries: &[(&str, Value)]) -> Params {
        let mut params = Params::new();
        for (name, value) in entries {
            params.bind(name.to_string(), value.clone());
        }
        params
    }

    #[test]
    fn rewrites_in_first_occurrence_order() {
        let params = params_of(&[("w1", Value::Int(1)), ("s1", Value::Int(2))]);
        let (text, binds) = to_positional("UPDATE [t] SET [a] = @s1 WHERE [b] = @w1", &params);
        assert_eq!(text, "UPDATE [t] SET [a] = @P1 WHERE [b] = @P2");
        assert_eq!(binds.len(), 2);
    }

    #[test]
    fn repeated_name_reuses_position() {
        let params = params_of(&[("w1", Value::Int(1))]);
        let (text, binds) = to_positional("[a] = @w1 OR [b] = @w1", &params);
        assert_eq!(text, "[a] = @P1 OR [b] = @P1");
        assert_eq!(binds.len(), 1);
    }

    #[test]
    fn unknown_at_tokens_pass_through() {
        let params = params_of(&[("w1", Value::Int(1))]);
        let (text, binds) = to_positional("SELECT @@ROWCOUNT WHERE [a] = @w1 AND [b] = @other", &params);
        assert_eq!(text, "SELECT @@ROWCOUNT WHERE [a] = @P1 AND [b] = @other");
        assert_eq!(binds.len(), 1);
    }

    #[test]
    fn prefix_names_do_not_bleed() {
        // w1 vs w10 must not be confused by the scanner.
        let params = params_of(&[
            ("w1", Value::Int(1)),
            ("w10", Value::Int(10)),
        ]);
        let (text, _) = to_positional("[a] = @w10 AND [b] = @w1", &params);
        assert_eq!(text, "[a] = @P1 AND [b] = @P2");
    }
}
