//! Bound-parameter storage and placeholder name generation.
//!
//! Every statement owns one [`Params`] map, built incrementally while the
//! SQL text is emitted. Names come from [`NamePool`]s: one pool per clause
//! role (`v` insert values, `s` SET values, `w` WHERE values, `a` procedure
//! arguments), each with its own counter, so a column referenced in two
//! roles can never collide. Batched statements add a `b{index}_` scope
//! prefix carrying the caller-visible batch position, so entry 0 and entry 1
//! binding the same column produce distinct names even though each entry's
//! counters restart at 1.

use crate::value::Value;

/// An insertion-ordered map from generated parameter name to bound value.
///
/// Keys are unique within one statement; uniqueness is guaranteed by the
/// name pools, not checked at insert time.
#[derive(Debug, Clone, Default)]
pub struct Params {
    entries: Vec<(String, Value)>,
}

impl Params {
    /// Create a new empty parameter map.
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Bind a value under a generated name and return the `@name`
    /// placeholder to splice into SQL text.
    pub(crate) fn bind(&mut self, name: String, value: Value) -> String {
        debug_assert!(
            !self.entries.iter().any(|(n, _)| *n == name),
            "duplicate parameter name {name}"
        );
        let placeholder = format!("@{name}");
        self.entries.push((name, value));
        placeholder
    }

    /// Look up a bound value by name.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v)
    }

    /// Iterate entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(n, v)| (n.as_str(), v))
    }

    /// Parameter names in insertion order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(n, _)| n.as_str())
    }

    /// Number of bound parameters.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the map is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Clause role a parameter belongs to. Each role is a disjoint namespace.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Role {
    /// INSERT VALUES list
    Values,
    /// UPDATE SET list
    Set,
    /// WHERE predicates
    Where,
    /// Stored-procedure arguments
    Arg,
}

impl Role {
    fn prefix(self) -> &'static str {
        match self {
            Role::Values => "v",
            Role::Set => "s",
            Role::Where => "w",
            Role::Arg => "a",
        }
    }
}

/// Per-statement generator of collision-free parameter names.
///
/// Owned by the builder constructing the statement and discarded with it;
/// there is no shared or global counter state.
#[derive(Debug)]
pub(crate) struct NamePool {
    role: Role,
    scope: Option<usize>,
    next: usize,
}

impl NamePool {
    /// A pool for a single (unbatched) statement.
    pub(crate) fn new(role: Role) -> Self {
        Self {
            role,
            scope: None,
            next: 0,
        }
    }

    /// A pool scoped to the batch entry at `index`.
    pub(crate) fn scoped(role: Role, index: usize) -> Self {
        Self {
            role,
            scope: Some(index),
            next: 0,
        }
    }

    /// Generate the next name in this pool, e.g. `w2` or `b3_w2`.
    pub(crate) fn next(&mut self) -> String {
        self.next += 1;
        match self.scope {
            Some(i) => format!("b{i}_{}{}", self.role.prefix(), self.next),
            None => format!("{}{}", self.role.prefix(), self.next),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bind_returns_placeholder() {
        let mut params = Params::new();
        let mut pool = NamePool::new(Role::Where);
        let p = params.bind(pool.next(), Value::Int(1));
        assert_eq!(p, "@w1");
        assert_eq!(params.get("w1"), Some(&Value::Int(1)));
    }

    #[test]
    fn roles_are_disjoint() {
        let mut set_pool = NamePool::new(Role::Set);
        let mut where_pool = NamePool::new(Role::Where);
        assert_eq!(set_pool.next(), "s1");
        assert_eq!(where_pool.next(), "w1");
        assert_eq!(set_pool.next(), "s2");
    }

    #[test]
    fn batch_scope_carries_position() {
        let mut p0 = NamePool::scoped(Role::Values, 0);
        let mut p7 = NamePool::scoped(Role::Values, 7);
        assert_eq!(p0.next(), "b0_v1");
        assert_eq!(p7.next(), "b7_v1");
    }
}
