//! # Sheetmelt - records to tables
//!
//! Flattens collections of nested records into rows and columns and computes
//! which adjacent cells of a column should be rendered as one merged cell.
//! The output triple (headers, rows, merge regions) is meant for a
//! spreadsheet writer; this crate does no rendering itself.
//!
//! ## Modules
//!
//! - **path**: Parse and evaluate `a.b[0].c`, `m[key]`, `items[*].name` expressions
//! - **schema**: Declare, infer, analyze and cache record schemas
//! - **flatten**: Lay out columns and expand records into rows
//! - **merge**: Detect runs of equal cells, honouring column dependencies
//!
//! ## Quick Start
//!
//! ```rust
//! use sheetmelt::{ExportConfig, FieldDefinition, SchemaDefinition, SchemaSource, Tabulator};
//! use serde_json::json;
//!
//! # fn main() -> Result<(), sheetmelt::TabulateError> {
//! let records = vec![
//!     json!({"id": 1, "tags": ["a", "b"]}),
//!     json!({"id": 2, "tags": ["c"]}),
//! ];
//!
//! let definition = SchemaDefinition::new("Post")
//!     .field(FieldDefinition::scalar("id"))
//!     .field(FieldDefinition::values("tags").with_header("tag"));
//!
//! let config = ExportConfig::new(1_000).merge_column("id");
//! let output = Tabulator::new().tabulate(&records, SchemaSource::Declared(&definition), &config)?;
//!
//! assert_eq!(output.headers, vec!["id", "tag"]);
//! assert_eq!(output.rows.len(), 3);
//! // rows 0 and 1 share id 1
//! assert_eq!(output.merge_regions.len(), 1);
//! # Ok(())
//! # }
//! ```

use serde_json::Value;

pub mod error;
pub mod flatten;
pub mod merge;
pub mod path;
pub mod pipeline;
pub mod schema;
pub mod types;

// Re-export commonly used types for convenience
pub use error::{
    ExpansionError, FlattenError, MergeError, PathError, PathSyntaxError, SchemaError,
    TabulateError,
};
pub use merge::{compute_merge_regions, ColumnGroup, MergeRegion};
pub use path::{FieldAccessor, JsonFieldAccessor, PathExpression, PathResolver, ResolveOptions};
pub use pipeline::{SchemaSource, Tabulator};
pub use schema::{
    ElementDefinition, FieldDefinition, RecordSchema, SchemaCache, SchemaDefinition,
    SchemaRegistry,
};
pub use types::{
    DropReason, DroppedRecord, DynamicHeaderMode, EmptyListPolicy, ExportConfig, FlattenStrategy,
    FlattenedRow, HeaderSort, RecordGroup, TableOutput,
};

/// Tabulate JSON records with a schema inferred from the records themselves
pub fn tabulate_json(records: &[Value], config: &ExportConfig) -> error::Result<TableOutput> {
    Tabulator::new().tabulate(records, SchemaSource::Inferred("root"), config)
}
