//! Type tags and the tag-to-PostgreSQL type table.
//!
//! Every parameter and return annotation on a routine definition resolves
//! through a [`TypeMapper`]. Resolution is a hard error for tags without an
//! entry: nothing is ever defaulted to a guessed column type.

use std::collections::HashMap;
use std::fmt;

use crate::error::{PlGenError, PlGenResult};

/// A host value kind usable as a parameter or return annotation.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PlType {
    /// Whole numbers, mapped to `integer` by default.
    Integer,
    /// Character data, mapped to `varchar` by default.
    Text,
    /// No value / absent return annotation, mapped to `void` by default.
    Void,
    /// An extension tag; only resolvable once an entry is added.
    Other(String),
}

impl fmt::Display for PlType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlType::Integer => write!(f, "integer"),
            PlType::Text => write!(f, "text"),
            PlType::Void => write!(f, "void"),
            PlType::Other(tag) => write!(f, "{}", tag),
        }
    }
}

/// Table from type tags to PostgreSQL type names.
#[derive(Debug, Clone)]
pub struct TypeMapper {
    entries: HashMap<PlType, String>,
}

impl Default for TypeMapper {
    fn default() -> Self {
        let mut entries = HashMap::new();
        entries.insert(PlType::Integer, "integer".to_string());
        entries.insert(PlType::Text, "varchar".to_string());
        entries.insert(PlType::Void, "void".to_string());
        Self { entries }
    }
}

impl TypeMapper {
    /// Create a mapper with the built-in integer/text/void entries.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace an entry.
    pub fn insert(&mut self, tag: PlType, sql_type: impl Into<String>) -> &mut Self {
        self.entries.insert(tag, sql_type.into());
        self
    }

    /// Resolve a tag to its PostgreSQL type name.
    pub fn resolve(&self, tag: &PlType) -> PlGenResult<&str> {
        self.entries
            .get(tag)
            .map(String::as_str)
            .ok_or_else(|| PlGenError::UnknownType(tag.to_string()))
    }
}
