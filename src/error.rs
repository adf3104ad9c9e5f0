//! Error types for path resolution, schema analysis, flattening and merging.

use serde::Serialize;
use thiserror::Error;

/// Errors raised while parsing a path expression.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PathSyntaxError {
    #[error("empty path expression")]
    Empty,

    #[error("empty field name in '{0}'")]
    EmptyName(String),

    #[error("unbalanced bracket in '{0}'")]
    UnbalancedBracket(String),

    #[error("empty brackets in '{0}'")]
    EmptyBracket(String),

    #[error("invalid segment '{segment}' in '{expr}'")]
    InvalidSegment { expr: String, segment: String },
}

/// The three ways evaluating a path against a record can fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PathErrorKind {
    MissingField,
    IndexOutOfRange,
    TypeMismatch,
}

/// Errors raised while evaluating a path expression.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PathError {
    #[error("field '{field}' not found while resolving '{path}'")]
    MissingField { path: String, field: String },

    #[error("index {index} out of range (len {len}) while resolving '{path}'")]
    IndexOutOfRange { path: String, index: usize, len: usize },

    #[error("expected {expected} at '{segment}' but found {found} while resolving '{path}'")]
    TypeMismatch {
        path: String,
        segment: String,
        expected: &'static str,
        found: &'static str,
    },
}

impl PathError {
    pub fn kind(&self) -> PathErrorKind {
        match self {
            Self::MissingField { .. } => PathErrorKind::MissingField,
            Self::IndexOutOfRange { .. } => PathErrorKind::IndexOutOfRange,
            Self::TypeMismatch { .. } => PathErrorKind::TypeMismatch,
        }
    }

    pub fn is_missing_field(&self) -> bool {
        self.kind() == PathErrorKind::MissingField
    }

    /// The source text of the expression that failed.
    pub fn path(&self) -> &str {
        match self {
            Self::MissingField { path, .. }
            | Self::IndexOutOfRange { path, .. }
            | Self::TypeMismatch { path, .. } => path,
        }
    }
}

/// Errors raised while turning a schema definition into a `RecordSchema`.
///
/// These are fatal for the whole batch since every row shares the schema.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SchemaError {
    #[error("type '{type_name}': fields '{first}' and '{second}' share column position {order}")]
    ConflictingOrder {
        type_name: String,
        order: u32,
        first: String,
        second: String,
    },

    #[error("type '{type_name}': field '{field}' is declared more than once")]
    DuplicateField { type_name: String, field: String },

    #[error("circular element reference: {}", .chain.join(" -> "))]
    CircularReference { chain: Vec<String> },

    #[error("unknown record type '{0}'")]
    UnknownType(String),

    #[error("type '{type_name}': invalid path for field '{field}': {source}")]
    InvalidPath {
        type_name: String,
        field: String,
        #[source]
        source: PathSyntaxError,
    },

    #[error("type '{type_name}': dynamic field '{field}' must be on the top-level record")]
    NestedDynamic { type_name: String, field: String },

    #[error("cannot infer schema for '{0}': no record samples")]
    NoSamples(String),

    #[error("type '{type_name}': column label '{header}' is produced by more than one field")]
    DuplicateHeader { type_name: String, header: String },
}

/// A record whose expansion would exceed the configured row ceiling.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize)]
#[error("'{type_name}' expands to {rows} rows, above the ceiling of {ceiling}")]
pub struct ExpansionError {
    pub type_name: String,
    pub rows: usize,
    pub ceiling: usize,
}

/// Errors that abort flattening of a batch.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FlattenError {
    #[error("record {record_index}, column '{column}': {source}")]
    Path {
        record_index: usize,
        column: String,
        #[source]
        source: PathError,
    },

    #[error("record {record_index}, dynamic field '{field}': {source}")]
    Header {
        record_index: usize,
        field: String,
        #[source]
        source: PathError,
    },

    #[error("field '{field}' produces column label '{header}', which is already in use")]
    DuplicateHeader { field: String, header: String },
}

/// Errors raised for invalid merge column declarations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MergeError {
    #[error("column {column} is out of range for rows of width {width}")]
    ColumnOutOfRange { column: usize, width: usize },

    #[error("column {0} cannot depend on itself")]
    SelfDependency(usize),

    #[error("column {column} declares parents {first} and {second}")]
    ConflictingParent {
        column: usize,
        first: usize,
        second: usize,
    },

    #[error("column dependency cycle through column {0}")]
    CyclicDependency(usize),

    #[error("unknown merge column '{0}'")]
    UnknownColumn(String),
}

/// Top-level error for a tabulation call.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TabulateError {
    #[error(transparent)]
    Schema(#[from] SchemaError),

    #[error(transparent)]
    Flatten(#[from] FlattenError),

    #[error(transparent)]
    Merge(#[from] MergeError),
}

pub type Result<T, E = TabulateError> = std::result::Result<T, E>;
