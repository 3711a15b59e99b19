//! Safe SQL identifier handling.
//!
//! This module provides [`Ident`] which represents a T-SQL identifier
//! (schema/table/column), supporting dotted notation and bracket-delimited
//! segments.
//!
//! - Plain segments are validated against: `[A-Za-z_@#][A-Za-z0-9_@#$]*`
//! - Bracketed segments allow any characters except NUL and escape `]` as `]]`
//!
//! Every segment is rendered bracket-delimited, so reserved words and odd
//! column names are always safe to emit. Quoting is a textual transform, not
//! a security boundary: identifiers come from the structural part of a
//! request and are emitted as literal SQL text.
//!
//! # Example
//! ```ignore
//! use sqlgate::Ident;
//!
//! let t = Ident::parse("dbo.Users")?;
//! assert_eq!(t.to_sql(), "[dbo].[Users]");
//! let c = Ident::parse("[Order Details].Quantity")?;
//! # Ok::<(), sqlgate::GateError>(())
//! ```

use crate::error::{GateError, GateResult};

/// A T-SQL identifier (column, table, or schema name).
///
/// Supports dotted notation (e.g. `dbo.Users.id`) and bracketed segments
/// (e.g. `[Order Details]`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ident {
    parts: Vec<String>,
}

impl Ident {
    /// Parse an identifier string, supporting dotted and bracketed forms.
    ///
    /// - Dotted: `schema.table.column`
    /// - Bracketed: `[Order Details]`
    /// - Mixed: `dbo.[Order Details].id`
    pub fn parse(s: &str) -> GateResult<Self> {
        if s.is_empty() {
            return Err(GateError::validation("Identifier cannot be empty"));
        }
        if s.contains('\0') {
            return Err(GateError::validation(
                "Identifier cannot contain NUL character",
            ));
        }

        let mut parts = Vec::new();
        let mut chars = s.chars().peekable();

        while chars.peek().is_some() {
            // Consume '.' between parts (but require there is a next part).
            if !parts.is_empty() {
                match chars.next() {
                    Some('.') => {
                        if chars.peek().is_none() {
                            return Err(GateError::validation("Trailing '.' in identifier"));
                        }
                    }
                    Some(c) => {
                        return Err(GateError::validation(format!(
                            "Expected '.' between identifier parts, got '{c}'"
                        )));
                    }
                    None => break,
                }
            }

            // Bracketed segment.
            if chars.peek() == Some(&'[') {
                chars.next(); // opening bracket
                let mut name = String::new();
                loop {
                    match chars.next() {
                        Some(']') => {
                            // Escaped closing bracket: ]]
                            if chars.peek() == Some(&']') {
                                chars.next();
                                name.push(']');
                            } else {
                                break;
                            }
                        }
                        Some(c) => name.push(c),
                        None => {
                            return Err(GateError::validation("Unclosed bracketed identifier"));
                        }
                    }
                }
                if name.is_empty() {
                    return Err(GateError::validation("Empty bracketed identifier"));
                }
                parts.push(name);
                continue;
            }

            // Plain segment.
            let mut name = String::new();
            while let Some(&c) = chars.peek() {
                if c == '.' {
                    break;
                }
                if name.is_empty() {
                    // First char: letter, underscore, or the T-SQL sigils.
                    if c == '_' || c == '@' || c == '#' || c.is_ascii_alphabetic() {
                        name.push(c);
                        chars.next();
                    } else {
                        return Err(GateError::validation(format!(
                            "Invalid identifier start character: '{c}'"
                        )));
                    }
                } else if c == '_' || c == '@' || c == '#' || c == '$' || c.is_ascii_alphanumeric()
                {
                    name.push(c);
                    chars.next();
                } else {
                    return Err(GateError::validation(format!(
                        "Invalid character in identifier: '{c}'"
                    )));
                }
            }
            if name.is_empty() {
                return Err(GateError::validation("Empty identifier segment"));
            }
            parts.push(name);
        }

        if parts.is_empty() {
            return Err(GateError::validation("Empty identifier"));
        }

        Ok(Self { parts })
    }

    /// Number of dotted segments.
    pub fn part_count(&self) -> usize {
        self.parts.len()
    }

    /// The unquoted final segment (the object's own name).
    pub fn object_name(&self) -> &str {
        self.parts.last().map(String::as_str).unwrap_or("")
    }

    /// The unquoted next-to-last segment, when present (the schema for a
    /// two-part table name).
    pub fn schema_name(&self) -> Option<&str> {
        if self.parts.len() >= 2 {
            self.parts.get(self.parts.len() - 2).map(String::as_str)
        } else {
            None
        }
    }

    /// Render the identifier as SQL, every segment bracket-delimited.
    pub fn to_sql(&self) -> String {
        let mut cap = self.parts.len().saturating_sub(1); // dots
        for part in &self.parts {
            cap += part.len() + 2; // surrounding brackets (escapes may add more)
        }
        let mut out = String::with_capacity(cap);
        self.write_sql(&mut out);
        out
    }

    pub(crate) fn write_sql(&self, out: &mut String) {
        for (i, part) in self.parts.iter().enumerate() {
            if i > 0 {
                out.push('.');
            }
            out.push('[');
            for ch in part.chars() {
                if ch == ']' {
                    out.push(']');
                    out.push(']');
                } else {
                    out.push(ch);
                }
            }
            out.push(']');
        }
    }
}

/// Convert an input into an [`Ident`].
///
/// This is mainly for ergonomics in builder APIs.
pub trait IntoIdent {
    fn into_ident(self) -> GateResult<Ident>;
}

impl IntoIdent for Ident {
    fn into_ident(self) -> GateResult<Ident> {
        Ok(self)
    }
}

impl IntoIdent for &Ident {
    fn into_ident(self) -> GateResult<Ident> {
        Ok(self.clone())
    }
}

impl IntoIdent for &str {
    fn into_ident(self) -> GateResult<Ident> {
        Ident::parse(self)
    }
}

impl IntoIdent for String {
    fn into_ident(self) -> GateResult<Ident> {
        Ident::parse(&self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ident_simple() {
        let ident = Ident::parse("users").unwrap();
        assert_eq!(ident.to_sql(), "[users]");
    }

    #[test]
    fn ident_dotted() {
        let ident = Ident::parse("dbo.users").unwrap();
        assert_eq!(ident.to_sql(), "[dbo].[users]");
    }

    #[test]
    fn ident_three_parts() {
        let ident = Ident::parse("db.schema.col").unwrap();
        assert_eq!(ident.to_sql(), "[db].[schema].[col]");
    }

    #[test]
    fn ident_bracketed() {
        let ident = Ident::parse("[Order Details]").unwrap();
        assert_eq!(ident.to_sql(), "[Order Details]");
    }

    #[test]
    fn ident_bracketed_with_escape() {
        let ident = Ident::parse("[weird]]name]").unwrap();
        assert_eq!(ident.to_sql(), "[weird]]name]");
        assert_eq!(ident.object_name(), "weird]name");
    }

    #[test]
    fn ident_mixed_bracketed_plain() {
        let ident = Ident::parse("dbo.[Order Details].id").unwrap();
        assert_eq!(ident.to_sql(), "[dbo].[Order Details].[id]");
    }

    #[test]
    fn ident_schema_and_object() {
        let ident = Ident::parse("sales.Orders").unwrap();
        assert_eq!(ident.schema_name(), Some("sales"));
        assert_eq!(ident.object_name(), "Orders");

        let bare = Ident::parse("Orders").unwrap();
        assert_eq!(bare.schema_name(), None);
    }

    #[test]
    fn ident_rejects_empty() {
        assert!(Ident::parse("").is_err());
    }

    #[test]
    fn ident_rejects_start_digit() {
        assert!(Ident::parse("1table").is_err());
    }

    #[test]
    fn ident_rejects_space() {
        assert!(Ident::parse("my table").is_err());
    }

    #[test]
    fn ident_rejects_injection_text() {
        assert!(Ident::parse("users; DROP TABLE users--").is_err());
    }

    #[test]
    fn ident_rejects_double_dot() {
        assert!(Ident::parse("schema..table").is_err());
    }

    #[test]
    fn ident_rejects_trailing_dot() {
        assert!(Ident::parse("schema.").is_err());
    }

    #[test]
    fn ident_rejects_unclosed_bracket() {
        assert!(Ident::parse("[unclosed").is_err());
    }
}
