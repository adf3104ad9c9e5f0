//! Record flattening
//!
//! Turns a batch of records into rows over a fixed column layout:
//!
//! - [`headers`]: column names for map-typed fields
//! - [`plan`]: the column layout of a batch
//! - [`flattener`]: row expansion under a [`FlattenStrategy`](crate::types::FlattenStrategy)

pub mod flattener;
pub mod headers;
pub mod plan;

pub use flattener::{FlattenOptions, FlattenOutcome, RecordFlattener};
pub use headers::{DynamicColumn, DynamicHeaderBuilder, HeaderConfig};
pub use plan::{ColumnSource, TablePlan};
