//! Field schema declarations for vertex and edge rows.
//!
//! A schema is an ordered list of [`FieldDecl`]s. Rows are constructed
//! against a schema and keep its field count and order for their whole
//! lifetime; the store holds one schema for vertices and one for edges,
//! fixed at construction.

use serde::{Deserialize, Serialize};

/// Value kind of a declared field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    Int,
    Double,
    Bool,
    Str,
    Blob,
}

/// A single declared column of a vertex or edge row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDecl {
    /// Field name (e.g. "pagerank", "weight").
    pub name: String,
    /// Value kind enforced by typed setters.
    pub kind: FieldKind,
}

impl FieldDecl {
    pub fn new(name: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            name: name.into(),
            kind,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_decl_serde_roundtrip() {
        let decl = FieldDecl::new("pagerank", FieldKind::Double);
        let json = serde_json::to_string(&decl).unwrap();
        assert_eq!(json, r#"{"name":"pagerank","kind":"double"}"#);
        let parsed: FieldDecl = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, decl);
    }

    #[test]
    fn test_schema_preserves_order() {
        let schema = vec![
            FieldDecl::new("a", FieldKind::Int),
            FieldDecl::new("b", FieldKind::Str),
            FieldDecl::new("c", FieldKind::Blob),
        ];
        let names: Vec<&str> = schema.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, ["a", "b", "c"]);
    }
}
