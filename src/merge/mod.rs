//! Merge-region detection over flattened rows

pub mod computer;
pub mod region;

pub use computer::compute_merge_regions;
pub use region::{ColumnGroup, MergeRegion};
