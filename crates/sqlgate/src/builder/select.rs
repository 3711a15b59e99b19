use super::traits::{Statement, StatementBuilder};
use crate::error::{GateError, GateResult};
use crate::filter::{Filter, write_where};
use crate::ident::{Ident, IntoIdent};
use crate::params::{NamePool, Params, Role};

/// Join flavor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinKind {
    Inner,
    Left,
    Right,
    Full,
}

impl JoinKind {
    /// Parse a join kind from tool input (case-insensitive).
    pub fn parse(s: &str) -> GateResult<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "inner" => Ok(JoinKind::Inner),
            "left" => Ok(JoinKind::Left),
            "right" => Ok(JoinKind::Right),
            "full" => Ok(JoinKind::Full),
            other => Err(GateError::validation(format!(
                "Unknown join kind '{other}' (expected inner, left, right, or full)"
            ))),
        }
    }

    fn sql_token(self) -> &'static str {
        match self {
            JoinKind::Inner => "INNER JOIN",
            JoinKind::Left => "LEFT JOIN",
            JoinKind::Right => "RIGHT JOIN",
            JoinKind::Full => "FULL OUTER JOIN",
        }
    }
}

/// One table join.
///
/// # Safety
///
/// The ON expression is emitted as literal SQL text, never parameterized.
/// The caller must ensure it is trusted.
#[derive(Debug, Clone)]
pub struct Join {
    kind: JoinKind,
    table: Ident,
    on: String,
}

impl Join {
    pub fn new(kind: JoinKind, table: impl IntoIdent, on: impl Into<String>) -> GateResult<Self> {
        Ok(Self {
            kind,
            table: table.into_ident()?,
            on: on.into(),
        })
    }
}

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Asc,
    Desc,
}

impl Direction {
    /// Parse a direction from tool input (case-insensitive).
    pub fn parse(s: &str) -> GateResult<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "asc" | "ascending" => Ok(Direction::Asc),
            "desc" | "descending" => Ok(Direction::Desc),
            other => Err(GateError::validation(format!(
                "Unknown sort direction '{other}' (expected asc or desc)"
            ))),
        }
    }

    fn sql_token(self) -> &'static str {
        match self {
            Direction::Asc => "ASC",
            Direction::Desc => "DESC",
        }
    }
}

/// One ORDER BY term.
#[derive(Debug, Clone)]
pub struct OrderTerm {
    column: Ident,
    direction: Direction,
}

impl OrderTerm {
    pub fn new(column: impl IntoIdent, direction: Direction) -> GateResult<Self> {
        Ok(Self {
            column: column.into_ident()?,
            direction,
        })
    }

    pub fn asc(column: impl IntoIdent) -> GateResult<Self> {
        Self::new(column, Direction::Asc)
    }

    pub fn desc(column: impl IntoIdent) -> GateResult<Self> {
        Self::new(column, Direction::Desc)
    }
}

/// Pagination strategy, decided before any text is emitted. The TOP form
/// is produced by the projection emitter itself, never by post-hoc text
/// splicing.
#[derive(Clone, Copy)]
enum Pagination {
    None,
    Top(u64),
    OffsetFetch { offset: u64, fetch: Option<u64> },
}

/// Structured SELECT builder.
pub struct SelectBuilder {
    /// Main table
    table: Ident,
    /// Projection columns (empty = all columns)
    columns: Vec<Ident>,
    /// JOIN clauses, in input order
    joins: Vec<Join>,
    /// Filter predicates, AND-joined in input order
    filters: Vec<Filter>,
    /// ORDER BY terms, in input order
    order: Vec<OrderTerm>,
    /// Row limit
    limit: Option<u64>,
    /// Row offset
    offset: Option<u64>,
}

impl SelectBuilder {
    /// Create a new SELECT builder over `table`.
    pub fn new(table: Ident) -> Self {
        Self {
            table,
            columns: Vec::new(),
            joins: Vec::new(),
            filters: Vec::new(),
            order: Vec::new(),
            limit: None,
            offset: None,
        }
    }

    /// Append one projection column.
    pub fn column(&mut self, column: Ident) -> &mut Self {
        self.columns.push(column);
        self
    }

    /// Append projection columns.
    pub fn columns(&mut self, columns: impl IntoIterator<Item = Ident>) -> &mut Self {
        self.columns.extend(columns);
        self
    }

    /// Append a join.
    pub fn join(&mut self, join: Join) -> &mut Self {
        self.joins.push(join);
        self
    }

    /// Append a filter predicate.
    pub fn filter(&mut self, filter: Filter) -> &mut Self {
        self.filters.push(filter);
        self
    }

    /// Append filter predicates.
    pub fn filters(&mut self, filters: impl IntoIterator<Item = Filter>) -> &mut Self {
        self.filters.extend(filters);
        self
    }

    /// Append an ORDER BY term.
    pub fn order_by(&mut self, term: OrderTerm) -> &mut Self {
        self.order.push(term);
        self
    }

    /// Limit the number of returned rows.
    pub fn limit(&mut self, limit: u64) -> &mut Self {
        self.limit = Some(limit);
        self
    }

    /// Skip the first `offset` rows. Requires at least one ORDER BY term:
    /// skipping rows of an unordered result is nondeterministic.
    pub fn offset(&mut self, offset: u64) -> &mut Self {
        self.offset = Some(offset);
        self
    }

    fn pagination(&self) -> GateResult<Pagination> {
        match (self.limit, self.offset) {
            (Some(n), None) => Ok(Pagination::Top(n)),
            (fetch, Some(offset)) => {
                if self.order.is_empty() {
                    return Err(GateError::validation(
                        "Offset pagination requires at least one ordering term",
                    ));
                }
                Ok(Pagination::OffsetFetch { offset, fetch })
            }
            (None, None) => Ok(Pagination::None),
        }
    }
}

impl StatementBuilder for SelectBuilder {
    fn build(&self) -> GateResult<Statement> {
        let pagination = self.pagination()?;
        let mut sql = String::from("SELECT ");
        let mut params = Params::new();

        if let Pagination::Top(n) = pagination {
            sql.push_str(&format!("TOP ({n}) "));
        }

        if self.columns.is_empty() {
            sql.push('*');
        } else {
            for (i, column) in self.columns.iter().enumerate() {
                if i > 0 {
                    sql.push_str(", ");
                }
                column.write_sql(&mut sql);
            }
        }

        sql.push_str(" FROM ");
        self.table.write_sql(&mut sql);

        for join in &self.joins {
            sql.push(' ');
            sql.push_str(join.kind.sql_token());
            sql.push(' ');
            join.table.write_sql(&mut sql);
            sql.push_str(" ON ");
            sql.push_str(&join.on);
        }

        if !self.filters.is_empty() {
            sql.push_str(" WHERE ");
            let mut pool = NamePool::new(Role::Where);
            write_where(&self.filters, &mut sql, &mut pool, &mut params);
        }

        if !self.order.is_empty() {
            sql.push_str(" ORDER BY ");
            for (i, term) in self.order.iter().enumerate() {
                if i > 0 {
                    sql.push_str(", ");
                }
                term.column.write_sql(&mut sql);
                sql.push(' ');
                sql.push_str(term.direction.sql_token());
            }
        }

        if let Pagination::OffsetFetch { offset, fetch } = pagination {
            sql.push_str(&format!(" OFFSET {offset} ROWS"));
            if let Some(n) = fetch {
                sql.push_str(&format!(" FETCH NEXT {n} ROWS ONLY"));
            }
        }

        Ok(Statement { sql, params })
    }
}
