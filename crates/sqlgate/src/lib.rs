//! # sqlgate
//!
//! Parameter-safe T-SQL statement construction and pooled execution for
//! agent-facing database tools.
//!
//! ## Features
//!
//! - **Structured builders**: SELECT / INSERT / UPDATE / DELETE plus
//!   batched variants, all pure — a description in, SQL text and a
//!   bound-parameter map out
//! - **Value safety**: caller values only ever reach the text as `@name`
//!   placeholders; identifiers are bracket-quoted literal text
//! - **Collision-free naming**: per-role parameter pools (`v`/`s`/`w`/`a`)
//!   and batch-position scoping (`b0_…`), owned by the statement being built
//! - **Safe defaults**: UPDATE requires SET and WHERE; DELETE requires
//!   WHERE; offset pagination requires ordering
//! - **Thin execution seam**: an [`Executor`] trait over tiberius with a
//!   named→positional placeholder bridge, plus bb8 pooling
//!
//! ## Example
//!
//! ```ignore
//! use sqlgate::{Filter, Ident, Op, OrderTerm, SelectBuilder, StatementBuilder};
//!
//! let mut query = SelectBuilder::new(Ident::parse("dbo.Users")?);
//! query
//!     .filter(Filter::new("status", Op::eq("active"))?)
//!     .order_by(OrderTerm::desc("created_at")?)
//!     .limit(10);
//!
//! let stmt = query.build()?;
//! assert_eq!(
//!     stmt.sql,
//!     "SELECT TOP (10) * FROM [dbo].[Users] WHERE [status] = @w1 ORDER BY [created_at] DESC"
//! );
//! # Ok::<(), sqlgate::GateError>(())
//! ```

pub mod builder;
pub mod client;
pub mod error;
pub mod filter;
pub mod ident;
pub mod import;
pub mod introspect;
pub mod params;
pub mod proc;
pub mod row;
pub mod tx;
pub mod value;

pub use builder::{
    BatchDelete, BatchInsert, BatchUpdate, DeleteBuilder, Direction, InsertBuilder, Join,
    JoinKind, OrderTerm, Record, SelectBuilder, Statement, StatementBuilder, UpdateBuilder,
    UpdateEntry,
};
pub use client::{Executor, TdsClient, to_positional};
pub use error::{GateError, GateResult};
pub use filter::{Filter, Op};
pub use ident::{Ident, IntoIdent};
pub use params::Params;
pub use proc::ProcCall;
pub use row::QueryOutput;
pub use value::{SqlType, Value};

#[cfg(feature = "pool")]
pub mod pool;

#[cfg(feature = "pool")]
pub use pool::{ConnectOptions, OwnedTds, TdsPool, create_pool, create_pool_with_config};
