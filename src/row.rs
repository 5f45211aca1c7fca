//! Schema-aligned row of field values.
//!
//! A row is an ordered sequence of [`Value`]s, one per declared field, plus a
//! tag distinguishing vertex rows from edge rows. Field count and order match
//! the schema the row was constructed from and never change. Deep copy is
//! `Clone`: independent values with identical data and flags.

use serde_json::{Map, Value as JsonValue};

use crate::error::{GraphError, Result};
use crate::schema::FieldDecl;
use crate::value::{FieldData, Value};

#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    values: Vec<Value>,
    is_vertex: bool,
}

impl Row {
    /// Default-construct a row from a schema: one null, unmodified cell per
    /// declared field, in declaration order.
    pub fn from_schema(schema: &[FieldDecl], is_vertex: bool) -> Self {
        Self {
            values: schema.iter().map(|f| Value::new(f.kind)).collect(),
            is_vertex,
        }
    }

    pub fn is_vertex(&self) -> bool {
        self.is_vertex
    }

    /// Retag this row as a vertex or edge row. The store stamps the tag on
    /// insertion so caller-supplied rows cannot carry the wrong one.
    pub(crate) fn set_is_vertex(&mut self, is_vertex: bool) {
        self.is_vertex = is_vertex;
    }

    pub fn num_fields(&self) -> usize {
        self.values.len()
    }

    pub fn field(&self, pos: usize) -> Option<&Value> {
        self.values.get(pos)
    }

    pub fn field_mut(&mut self, pos: usize) -> Option<&mut Value> {
        self.values.get_mut(pos)
    }

    /// Fallible field access for callers that want an error instead of an
    /// `Option` (e.g. positional writes driven by external input).
    pub fn try_field_mut(&mut self, pos: usize) -> Result<&mut Value> {
        let len = self.values.len();
        self.values
            .get_mut(pos)
            .ok_or(GraphError::FieldOutOfRange(pos, len))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Value> {
        self.values.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Value> {
        self.values.iter_mut()
    }

    /// Whether any field has an uncommitted write.
    pub fn any_modified(&self) -> bool {
        self.values.iter().any(|v| v.is_modified())
    }

    /// Render this row as a JSON object keyed by field name.
    ///
    /// `schema` must be the schema the row was built from; a length mismatch
    /// indicates corrupted bookkeeping and panics.
    pub fn to_json(&self, schema: &[FieldDecl]) -> JsonValue {
        assert_eq!(
            schema.len(),
            self.values.len(),
            "row/schema field count mismatch: schema has {}, row has {}",
            schema.len(),
            self.values.len()
        );
        let mut obj = Map::new();
        for (decl, val) in schema.iter().zip(self.values.iter()) {
            let json = match val.data() {
                FieldData::Null => JsonValue::Null,
                FieldData::Int(v) => JsonValue::from(*v),
                FieldData::Double(v) => JsonValue::from(*v),
                FieldData::Bool(v) => JsonValue::from(*v),
                FieldData::Str(v) => JsonValue::from(v.clone()),
                FieldData::Blob(v) => JsonValue::from(v.clone()),
            };
            obj.insert(decl.name.clone(), json);
        }
        JsonValue::Object(obj)
    }
}
