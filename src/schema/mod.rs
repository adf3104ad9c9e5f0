//! Record schemas
//!
//! This module describes which columns a record type produces: declared
//! definitions, inference from samples, analysis into an immutable
//! [`RecordSchema`], and the per-type cache.

pub mod builder;
pub mod cache;
pub mod definition;
pub mod types;

pub use builder::{infer_definition, SchemaBuilder};
pub use cache::SchemaCache;
pub use definition::{
    ElementDefinition, FieldDefinition, FieldType, SchemaAnalyzer, SchemaDefinition,
    SchemaRegistry,
};
pub use types::{FieldDescriptor, FieldKind, RecordSchema};
