//! Per-field storage cell: current data, committed snapshot, modified flag.
//!
//! A [`Value`] tracks whether it has been written since the last commit.
//! `post_commit_state()` is the only way the modified flag clears — it
//! synchronizes the snapshot to the current data. Typed setters enforce the
//! declared field kind; a wrong-kind write is rejected, not coerced.

use crate::error::{GraphError, Result};
use crate::schema::FieldKind;

/// Payload of a single field. Default-constructed fields are `Null`
/// regardless of their declared kind.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum FieldData {
    #[default]
    Null,
    Int(i64),
    Double(f64),
    Bool(bool),
    Str(String),
    Blob(Vec<u8>),
}

impl FieldData {
    /// Kind of the payload currently held. `None` for `Null`.
    pub fn kind(&self) -> Option<FieldKind> {
        match self {
            FieldData::Null => None,
            FieldData::Int(_) => Some(FieldKind::Int),
            FieldData::Double(_) => Some(FieldKind::Double),
            FieldData::Bool(_) => Some(FieldKind::Bool),
            FieldData::Str(_) => Some(FieldKind::Str),
            FieldData::Blob(_) => Some(FieldKind::Blob),
        }
    }
}

/// One field cell of a row.
///
/// Holds the current data, the committed snapshot, and the modified flag.
/// Cloning produces an independent cell with identical data and flags.
#[derive(Debug, Clone, PartialEq)]
pub struct Value {
    kind: FieldKind,
    data: FieldData,
    /// State as of the last commit. Starts as `Null` together with `data`.
    snapshot: FieldData,
    modified: bool,
}

impl Value {
    /// Default-construct a cell for a declared kind: null data, null
    /// snapshot, not modified.
    pub fn new(kind: FieldKind) -> Self {
        Self {
            kind,
            data: FieldData::Null,
            snapshot: FieldData::Null,
            modified: false,
        }
    }

    /// Declared kind of this field.
    pub fn kind(&self) -> FieldKind {
        self.kind
    }

    /// Current (possibly uncommitted) data.
    pub fn data(&self) -> &FieldData {
        &self.data
    }

    /// Committed snapshot — the data as of the last `post_commit_state`.
    pub fn previous(&self) -> &FieldData {
        &self.snapshot
    }

    /// Whether this cell has been written since the last commit.
    pub fn is_modified(&self) -> bool {
        self.modified
    }

    /// Synchronize the snapshot to the current data and clear the modified
    /// flag. This is the only path that clears the flag.
    pub fn post_commit_state(&mut self) {
        self.snapshot = self.data.clone();
        self.modified = false;
    }

    fn set(&mut self, data: FieldData) -> Result<()> {
        // A Null kind() means the payload carries no type to check.
        if let Some(kind) = data.kind() {
            if kind != self.kind {
                return Err(GraphError::KindMismatch {
                    expected: self.kind,
                    got: kind,
                });
            }
        }
        self.data = data;
        self.modified = true;
        Ok(())
    }

    pub fn set_int(&mut self, v: i64) -> Result<()> {
        self.set(FieldData::Int(v))
    }

    pub fn set_double(&mut self, v: f64) -> Result<()> {
        self.set(FieldData::Double(v))
    }

    pub fn set_bool(&mut self, v: bool) -> Result<()> {
        self.set(FieldData::Bool(v))
    }

    pub fn set_str(&mut self, v: impl Into<String>) -> Result<()> {
        self.set(FieldData::Str(v.into()))
    }

    pub fn set_blob(&mut self, v: Vec<u8>) -> Result<()> {
        self.set(FieldData::Blob(v))
    }

    /// Reset current data to null. Marks the cell modified.
    pub fn set_null(&mut self) {
        self.data = FieldData::Null;
        self.modified = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_value_is_clean_null() {
        let val = Value::new(FieldKind::Int);
        assert_eq!(*val.data(), FieldData::Null);
        assert_eq!(*val.previous(), FieldData::Null);
        assert!(!val.is_modified());
    }

    #[test]
    fn test_set_marks_modified() {
        let mut val = Value::new(FieldKind::Int);
        val.set_int(42).unwrap();
        assert!(val.is_modified());
        assert_eq!(*val.data(), FieldData::Int(42));
        // Snapshot unchanged until commit
        assert_eq!(*val.previous(), FieldData::Null);
    }

    #[test]
    fn test_post_commit_state_clears_flag_and_syncs_snapshot() {
        let mut val = Value::new(FieldKind::Str);
        val.set_str("hello").unwrap();
        val.post_commit_state();
        assert!(!val.is_modified());
        assert_eq!(*val.previous(), FieldData::Str("hello".into()));
    }

    #[test]
    fn test_wrong_kind_write_rejected() {
        let mut val = Value::new(FieldKind::Double);
        let err = val.set_str("nope").unwrap_err();
        assert!(err.to_string().contains("kind mismatch"));
        // Rejected write leaves the cell untouched
        assert!(!val.is_modified());
        assert_eq!(*val.data(), FieldData::Null);
    }

    #[test]
    fn test_set_null_is_always_legal() {
        let mut val = Value::new(FieldKind::Blob);
        val.set_blob(vec![1, 2, 3]).unwrap();
        val.post_commit_state();
        val.set_null();
        assert!(val.is_modified());
        assert_eq!(*val.data(), FieldData::Null);
        assert_eq!(*val.previous(), FieldData::Blob(vec![1, 2, 3]));
    }

    #[test]
    fn test_clone_is_independent() {
        let mut val = Value::new(FieldKind::Int);
        val.set_int(1).unwrap();
        let mut copy = val.clone();
        assert_eq!(copy, val);
        copy.set_int(2).unwrap();
        assert_eq!(*val.data(), FieldData::Int(1));
        assert_eq!(*copy.data(), FieldData::Int(2));
    }
}
