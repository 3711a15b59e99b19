//! Transaction and savepoint statement templates.
//!
//! Fixed T-SQL strings; only savepoint names are caller-supplied, and those
//! are validated as single-part identifiers before being emitted.

use crate::builder::Statement;
use crate::error::{GateError, GateResult};
use crate::ident::Ident;

/// `BEGIN TRANSACTION`
pub fn begin() -> Statement {
    Statement::fixed("BEGIN TRANSACTION")
}

/// `COMMIT TRANSACTION`
pub fn commit() -> Statement {
    Statement::fixed("COMMIT TRANSACTION")
}

/// `ROLLBACK TRANSACTION`
pub fn rollback() -> Statement {
    Statement::fixed("ROLLBACK TRANSACTION")
}

fn savepoint_ident(name: &str) -> GateResult<Ident> {
    let ident = Ident::parse(name)?;
    if ident.part_count() != 1 {
        return Err(GateError::validation(format!(
            "Savepoint name '{name}' must be a single identifier"
        )));
    }
    Ok(ident)
}

/// `SAVE TRANSACTION [name]`
pub fn savepoint(name: &str) -> GateResult<Statement> {
    let ident = savepoint_ident(name)?;
    Ok(Statement::fixed(format!(
        "SAVE TRANSACTION {}",
        ident.to_sql()
    )))
}

/// `ROLLBACK TRANSACTION [name]`
pub fn rollback_to_savepoint(name: &str) -> GateResult<Statement> {
    let ident = savepoint_ident(name)?;
    Ok(Statement::fixed(format!(
        "ROLLBACK TRANSACTION {}",
        ident.to_sql()
    )))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_templates() {
        assert_eq!(begin().sql, "BEGIN TRANSACTION");
        assert_eq!(commit().sql, "COMMIT TRANSACTION");
        assert_eq!(rollback().sql, "ROLLBACK TRANSACTION");
        assert!(begin().params.is_empty());
    }

    #[test]
    fn savepoint_quotes_name() {
        assert_eq!(savepoint("sp1").unwrap().sql, "SAVE TRANSACTION [sp1]");
        assert_eq!(
            rollback_to_savepoint("sp1").unwrap().sql,
            "ROLLBACK TRANSACTION [sp1]"
        );
    }

    #[test]
    fn savepoint_rejects_injection() {
        assert!(savepoint("sp1; DROP TABLE x").is_err());
        assert!(savepoint("a.b").is_err());
    }
}
