use serde::{Deserialize, Serialize};

/// A rectangle of cells rendered as one merged cell.
///
/// Regions produced by this crate are single-column and span at least two
/// rows. Bounds are inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MergeRegion {
    pub first_row: usize,
    pub last_row: usize,
    pub first_column: usize,
    pub last_column: usize,
}

impl MergeRegion {
    /// Rows `first_row..=last_row` of a single column
    pub fn vertical(column: usize, first_row: usize, last_row: usize) -> Self {
        MergeRegion {
            first_row,
            last_row,
            first_column: column,
            last_column: column,
        }
    }

    /// Number of rows covered; zero for an inverted region
    pub fn row_span(&self) -> usize {
        (self.last_row + 1).saturating_sub(self.first_row)
    }

    pub fn contains_row(&self, row: usize) -> bool {
        (self.first_row..=self.last_row).contains(&row)
    }
}

/// A mergeable column and the column whose run boundaries it must respect
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnGroup {
    pub column: usize,
    pub parent: Option<usize>,
    /// `false` for a column that only lends its boundaries to dependants
    #[serde(default = "default_emit")]
    pub emit_regions: bool,
}

fn default_emit() -> bool {
    true
}

impl ColumnGroup {
    pub fn mergeable(column: usize) -> Self {
        ColumnGroup {
            column,
            parent: None,
            emit_regions: true,
        }
    }

    /// A column that constrains its dependants without being merged itself
    pub fn boundary_only(column: usize) -> Self {
        ColumnGroup {
            column,
            parent: None,
            emit_regions: false,
        }
    }

    pub fn with_parent(mut self, parent: usize) -> Self {
        self.parent = Some(parent);
        self
    }
}
