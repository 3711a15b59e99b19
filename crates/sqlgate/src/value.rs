//! Scalar values bound to statement parameters.
//!
//! [`Value`] is the closed set of scalar types a caller can bind: anything a
//! JSON scalar can carry. Structured JSON (arrays, objects) is rejected at
//! the boundary — membership operators take a sequence of scalars, never a
//! scalar holding a sequence.

use crate::error::{GateError, GateResult};
use std::borrow::Cow;
use tiberius::ColumnData;

/// A scalar parameter value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

impl Value {
    /// Convert a JSON scalar into a [`Value`].
    ///
    /// Integral numbers map to `Int`, everything else numeric to `Float`.
    /// Arrays and objects are rejected.
    pub fn from_json(v: &serde_json::Value) -> GateResult<Self> {
        match v {
            serde_json::Value::Null => Ok(Value::Null),
            serde_json::Value::Bool(b) => Ok(Value::Bool(*b)),
            serde_json::Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Ok(Value::Int(i))
                } else if let Some(f) = n.as_f64() {
                    Ok(Value::Float(f))
                } else {
                    Err(GateError::validation(format!(
                        "Numeric value out of range: {n}"
                    )))
                }
            }
            serde_json::Value::String(s) => Ok(Value::Text(s.clone())),
            serde_json::Value::Array(_) | serde_json::Value::Object(_) => Err(
                GateError::validation("Expected a scalar value, got a JSON array/object"),
            ),
        }
    }

    /// Render as a JSON scalar.
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Value::Null => serde_json::Value::Null,
            Value::Bool(b) => serde_json::Value::Bool(*b),
            Value::Int(i) => serde_json::Value::from(*i),
            Value::Float(f) => serde_json::Number::from_f64(*f)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
            Value::Text(s) => serde_json::Value::String(s.clone()),
        }
    }

    /// Name of the scalar type, for error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Text(_) => "text",
        }
    }
}

impl tiberius::ToSql for Value {
    fn to_sql(&self) -> ColumnData<'_> {
        match self {
            Value::Null => ColumnData::String(None),
            Value::Bool(b) => ColumnData::Bit(Some(*b)),
            Value::Int(i) => ColumnData::I64(Some(*i)),
            Value::Float(f) => ColumnData::F64(Some(*f)),
            Value::Text(s) => ColumnData::String(Some(Cow::Borrowed(s))),
        }
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int(v as i64)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

impl serde::Serialize for Value {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_json().serialize(serializer)
    }
}

impl<'de> serde::Deserialize<'de> for Value {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let json = serde_json::Value::deserialize(deserializer)?;
        Value::from_json(&json).map_err(serde::de::Error::custom)
    }
}

/// Declared column type for bulk-load coercion.
///
/// A closed variant rather than a string-keyed lookup: adding a type without
/// handling its coercion is a compile error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SqlType {
    Bit,
    Int,
    BigInt,
    Float,
    NVarChar,
}

impl SqlType {
    /// Parse a declared type name from tool input.
    pub fn parse(s: &str) -> GateResult<Self> {
        match s.to_ascii_lowercase().as_str() {
            "bit" | "bool" => Ok(SqlType::Bit),
            "int" => Ok(SqlType::Int),
            "bigint" => Ok(SqlType::BigInt),
            "float" | "real" => Ok(SqlType::Float),
            "nvarchar" | "text" => Ok(SqlType::NVarChar),
            other => Err(GateError::validation(format!(
                "Unknown column type '{other}' (expected bit, int, bigint, float, or nvarchar)"
            ))),
        }
    }

    /// Coerce a raw text field (e.g. a CSV cell) into a typed [`Value`].
    ///
    /// Empty text coerces to `Null` for every type except `NVarChar`.
    pub fn coerce(self, raw: &str) -> GateResult<Value> {
        if raw.is_empty() && self != SqlType::NVarChar {
            return Ok(Value::Null);
        }
        match self {
            SqlType::Bit => match raw {
                "0" | "false" | "FALSE" => Ok(Value::Bool(false)),
                "1" | "true" | "TRUE" => Ok(Value::Bool(true)),
                _ => Err(GateError::import(format!("Invalid bit value '{raw}'"))),
            },
            SqlType::Int | SqlType::BigInt => raw
                .parse::<i64>()
                .map(Value::Int)
                .map_err(|e| GateError::import(format!("Invalid integer '{raw}': {e}"))),
            SqlType::Float => raw
                .parse::<f64>()
                .map(Value::Float)
                .map_err(|e| GateError::import(format!("Invalid float '{raw}': {e}"))),
            SqlType::NVarChar => Ok(Value::Text(raw.to_string())),
        }
    }
}
