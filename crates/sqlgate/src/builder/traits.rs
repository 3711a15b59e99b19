use crate::client::Executor;
use crate::error::GateResult;
use crate::params::Params;
use crate::row::QueryOutput;

/// A fully constructed statement: SQL text plus its bound-parameter map.
///
/// Every `@name` placeholder in `sql` has exactly one entry in `params`
/// and vice versa.
#[derive(Debug, Clone)]
pub struct Statement {
    pub sql: String,
    pub params: Params,
}

impl Statement {
    /// A statement with no bound parameters (fixed templates).
    pub fn fixed(sql: impl Into<String>) -> Self {
        Self {
            sql: sql.into(),
            params: Params::new(),
        }
    }

    /// Run as a row-returning query.
    pub async fn fetch<E: Executor>(&self, conn: &mut E) -> GateResult<QueryOutput> {
        let rows = conn.query(&self.sql, &self.params).await?;
        Ok(QueryOutput::from_rows(rows))
    }

    /// Run as a mutation and return the affected row count (summed across
    /// a multi-statement batch).
    pub async fn execute<E: Executor>(&self, conn: &mut E) -> GateResult<u64> {
        conn.execute(&self.sql, &self.params).await
    }
}

/// Base trait for statement builders.
pub trait StatementBuilder: Sync {
    /// Build the statement, validating the description.
    ///
    /// Either a complete, internally consistent statement comes back or an
    /// error does — there is no partial output.
    fn build(&self) -> GateResult<Statement>;

    /// Debug helper: the SQL text alone.
    fn to_sql(&self) -> GateResult<String> {
        Ok(self.build()?.sql)
    }

    /// Build and run as a row-returning query.
    fn fetch(
        &self,
        conn: &mut impl Executor,
    ) -> impl std::future::Future<Output = GateResult<QueryOutput>> + Send {
        async move {
            let stmt = self.build()?;
            stmt.fetch(conn).await
        }
    }

    /// Build and run as a mutation, returning the affected row count.
    fn execute(
        &self,
        conn: &mut impl Executor,
    ) -> impl std::future::Future<Output = GateResult<u64>> + Send {
        async move {
            let stmt = self.build()?;
            stmt.execute(conn).await
        }
    }
}
