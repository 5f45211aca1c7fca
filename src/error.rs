//! Error types for the sharded graph store.

use thiserror::Error;

use crate::schema::FieldKind;

pub type Result<T> = std::result::Result<T, GraphError>;

#[derive(Error, Debug)]
pub enum GraphError {
    #[error("field kind mismatch: field declared {expected:?}, write attempted {got:?}")]
    KindMismatch { expected: FieldKind, got: FieldKind },

    #[error("field position {0} out of range (row has {1} fields)")]
    FieldOutOfRange(usize, usize),

    #[error("not implemented: {0}")]
    Unsupported(&'static str),
}
