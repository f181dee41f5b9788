use thiserror::Error;

use crate::data::ColumnType;

/// Convenience result type for frame operations.
pub type FrameResult<T> = Result<T, FrameError>;

/// Error type shared by the merger, the parser cascade and the data collector.
///
/// None of these are transient: every variant describes a precondition or
/// invariant violation detected synchronously at the call that raised it.
#[derive(Debug, Error)]
pub enum FrameError {
    /// A column path must contain at least one segment.
    #[error("column path must not be empty")]
    EmptyPath,

    /// Two sibling columns share a name.
    #[error("duplicate column name '{name}'")]
    DuplicateColumn { name: String },

    /// A column does not have the same number of rows as its siblings.
    #[error("column '{name}' has {actual} row(s) but the frame has {expected}")]
    LengthMismatch {
        name: String,
        expected: usize,
        actual: usize,
    },

    #[error("column '{path}' not found")]
    ColumnNotFound { path: String },

    #[error("can not insert columns under '{path}' because it is not a column group")]
    NotAColumnGroup { path: String },

    #[error("can not insert column '{path}' because a column with this path already exists")]
    PathAlreadyExists { path: String },

    #[error("can not insert more than one column into path '{path}'")]
    MultipleColumnsAtPath { path: String },

    /// No parser accepted every value of a column. The identity parser always
    /// succeeds, so this only happens when it was unregistered.
    #[error("no valid parser found for column '{column}'")]
    ParserCascadeExhausted { column: String },

    #[error("no parser registered for type {ty}")]
    NoParserForType { ty: ColumnType },

    /// A cell could not be converted to an explicitly requested type.
    #[error("failed to convert '{value}' from {from} to {to}")]
    TypeConversion {
        value: String,
        from: ColumnType,
        to: ColumnType,
    },

    /// A value pushed into a type-checked collector has the wrong type.
    #[error("value '{value}' of type {actual} is not assignable to {expected}")]
    TypeMismatch {
        value: String,
        actual: ColumnType,
        expected: ColumnType,
    },

    #[error("invalid date-time pattern '{pattern}'")]
    InvalidPattern { pattern: String },

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}
