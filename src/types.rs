use crate::error::ExpansionError;
use crate::merge::MergeRegion;
use crate::path::ResolveOptions;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One output row, one cell per header
pub type FlattenedRow = Vec<Value>;

/// How several repeated fields of one record combine into rows
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlattenStrategy {
    /// As many rows as the longest list; shorter lists pad with nulls
    #[default]
    MaxLength,
    /// As many rows as the shortest non-empty list; longer lists are truncated
    MinLength,
    /// One row per combination of list elements
    Cartesian,
}

/// What a record with an empty repeated field contributes
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmptyListPolicy {
    /// Emit rows with nulls in the empty field's columns
    #[default]
    KeepRow,
    /// Emit no rows for the record
    SkipRow,
}

/// Where dynamic column names come from
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DynamicHeaderMode {
    /// Keys discovered in the data
    #[default]
    FromData,
    /// Only the configured names
    FromConfig,
    /// Configured names first, then newly discovered keys
    Mixed,
}

/// Ordering of dynamic column names
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HeaderSort {
    /// Insertion order
    #[default]
    None,
    Asc,
    Desc,
}

/// A declared `child -> parent` merge dependency, by header label
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnDependency {
    pub child: String,
    pub parent: String,
}

/// Configuration for one tabulation call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportConfig {
    #[serde(default)]
    pub flatten_strategy: FlattenStrategy,

    #[serde(default)]
    pub empty_list_policy: EmptyListPolicy,

    #[serde(default)]
    pub dynamic_header_mode: DynamicHeaderMode,

    #[serde(default)]
    pub header_sort: HeaderSort,

    /// Prepended to every dynamic column label
    #[serde(default)]
    pub header_prefix: String,

    /// Appended to every dynamic column label
    #[serde(default)]
    pub header_suffix: String,

    /// Maximum number of columns per dynamic field
    #[serde(default)]
    pub max_columns: Option<usize>,

    /// Keep only the first N rows of each record
    #[serde(default)]
    pub max_rows_per_record: Option<usize>,

    /// Hard limit on the rows one record may expand to; records above it are dropped
    pub row_ceiling: usize,

    /// Maximum number of elements joined by a `[*]` path
    #[serde(default)]
    pub max_join_size: Option<usize>,

    #[serde(default = "default_separator")]
    pub join_separator: String,

    /// Resolve path errors to `default_value` instead of failing
    #[serde(default)]
    pub ignore_path_errors: bool,

    #[serde(default)]
    pub default_value: Value,

    /// Header labels of columns whose equal neighbours merge
    #[serde(default)]
    pub merge_columns: Vec<String>,

    /// Make every top-level scalar column mergeable
    #[serde(default)]
    pub merge_scalar_columns: bool,

    #[serde(default)]
    pub column_dependencies: Vec<ColumnDependency>,
}

fn default_separator() -> String {
    String::from(",")
}

impl ExportConfig {
    /// Configuration with the given row ceiling and defaults elsewhere.
    ///
    /// There is no implicit ceiling: cartesian expansion is only bounded by it.
    pub fn new(row_ceiling: usize) -> Self {
        ExportConfig {
            flatten_strategy: FlattenStrategy::default(),
            empty_list_policy: EmptyListPolicy::default(),
            dynamic_header_mode: DynamicHeaderMode::default(),
            header_sort: HeaderSort::default(),
            header_prefix: String::new(),
            header_suffix: String::new(),
            max_columns: None,
            max_rows_per_record: None,
            row_ceiling,
            max_join_size: None,
            join_separator: default_separator(),
            ignore_path_errors: false,
            default_value: Value::Null,
            merge_columns: Vec::new(),
            merge_scalar_columns: false,
            column_dependencies: Vec::new(),
        }
    }

    pub fn with_strategy(mut self, strategy: FlattenStrategy) -> Self {
        self.flatten_strategy = strategy;
        self
    }

    pub fn with_empty_list_policy(mut self, policy: EmptyListPolicy) -> Self {
        self.empty_list_policy = policy;
        self
    }

    pub fn with_dynamic_headers(mut self, mode: DynamicHeaderMode, sort: HeaderSort) -> Self {
        self.dynamic_header_mode = mode;
        self.header_sort = sort;
        self
    }

    pub fn with_header_affixes(
        mut self,
        prefix: impl Into<String>,
        suffix: impl Into<String>,
    ) -> Self {
        self.header_prefix = prefix.into();
        self.header_suffix = suffix.into();
        self
    }

    pub fn with_max_columns(mut self, max_columns: usize) -> Self {
        self.max_columns = Some(max_columns);
        self
    }

    pub fn with_max_rows_per_record(mut self, max_rows: usize) -> Self {
        self.max_rows_per_record = Some(max_rows);
        self
    }

    pub fn with_join(mut self, separator: impl Into<String>, max_join_size: Option<usize>) -> Self {
        self.join_separator = separator.into();
        self.max_join_size = max_join_size;
        self
    }

    /// Replace path errors with `default_value`
    pub fn ignoring_path_errors(mut self, default_value: Value) -> Self {
        self.ignore_path_errors = true;
        self.default_value = default_value;
        self
    }

    pub fn merge_column(mut self, header: impl Into<String>) -> Self {
        self.merge_columns.push(header.into());
        self
    }

    pub fn merge_scalars(mut self) -> Self {
        self.merge_scalar_columns = true;
        self
    }

    /// Declare that `child`'s merge runs never cross `parent`'s run boundaries
    pub fn depend(mut self, child: impl Into<String>, parent: impl Into<String>) -> Self {
        self.column_dependencies.push(ColumnDependency {
            child: child.into(),
            parent: parent.into(),
        });
        self
    }

    pub fn resolve_options(&self) -> ResolveOptions {
        ResolveOptions {
            separator: self.join_separator.clone(),
            max_join_size: self.max_join_size,
            ignore_errors: self.ignore_path_errors,
            default_value: self.default_value.clone(),
        }
    }
}

/// The rows that came from one input record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RecordGroup {
    pub record_index: usize,
    pub first_row: usize,
    pub row_count: usize,
}

impl RecordGroup {
    /// Index of the last row, `None` for a group without rows
    pub fn last_row(&self) -> Option<usize> {
        (self.row_count > 0).then(|| self.first_row + self.row_count - 1)
    }
}

/// Why a record contributed no rows
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DropReason {
    /// A repeated field was empty under [`EmptyListPolicy::SkipRow`]
    EmptyList { field: String },
    /// Expansion exceeded the row ceiling
    Expansion(ExpansionError),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DroppedRecord {
    pub record_index: usize,
    pub reason: DropReason,
}

/// The engine's output: headers, rows and merge regions, plus bookkeeping
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TableOutput {
    pub headers: Vec<String>,
    pub rows: Vec<FlattenedRow>,
    pub merge_regions: Vec<MergeRegion>,
    pub groups: Vec<RecordGroup>,
    pub dropped: Vec<DroppedRecord>,
}

impl TableOutput {
    /// Index of the column with this header label
    pub fn column(&self, header: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == header)
    }

    /// Cells of one column, top to bottom; `None` for a column out of range
    pub fn column_values(&self, column: usize) -> Option<Vec<&Value>> {
        if column >= self.headers.len() {
            return None;
        }
        self.rows.iter().map(|row| row.get(column)).collect()
    }
}
