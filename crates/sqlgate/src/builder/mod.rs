//! Structured T-SQL statement builders.
//!
//! One builder per operation shape (SELECT / INSERT / UPDATE / DELETE) plus
//! batched variants that combine multiple entries into one multi-statement
//! execution. All builders are pure: they hold a query description and
//! produce a [`Statement`](traits::Statement) — SQL text plus its
//! bound-parameter map — without touching a connection.
//!
//! ## Design
//!
//! - Caller-supplied *values* only ever reach the text as `@name`
//!   placeholders; identifiers are bracket-quoted literal text.
//! - Placeholder names are scoped by clause role and batch position, so
//!   SET/WHERE pools and batched entries can never collide.
//! - Safe defaults: UPDATE requires SET and WHERE; DELETE requires WHERE
//!   (unless explicitly allowed).

pub mod batch;
pub mod delete;
pub mod insert;
pub mod record;
pub mod select;
pub mod traits;
pub mod update;

pub use batch::{BatchDelete, BatchInsert, BatchUpdate, UpdateEntry};
pub use delete::DeleteBuilder;
pub use insert::InsertBuilder;
pub use record::Record;
pub use select::{Direction, Join, JoinKind, OrderTerm, SelectBuilder};
pub use traits::{Statement, StatementBuilder};
pub use update::UpdateBuilder;

#[cfg(test)]
mod tests;
