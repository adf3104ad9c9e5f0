//! Expansion of records into rows
//!
//! Each record becomes one or more rows. Scalar fields repeat on every row of
//! the record; repeated fields are expanded through their element schema
//! (recursively, so element lists of their own expand first) and combined
//! according to the [`FlattenStrategy`].

use crate::error::{ExpansionError, FlattenError, PathError};
use crate::flatten::headers::DynamicColumn;
use crate::flatten::plan::{ColumnSource, TablePlan};
use crate::path::{value_kind, PathResolver};
use crate::schema::{FieldDescriptor, FieldKind, RecordSchema};
use crate::types::{
    DropReason, DroppedRecord, EmptyListPolicy, ExportConfig, FlattenStrategy, FlattenedRow,
    RecordGroup,
};
use serde_json::Value;
use std::borrow::Cow;
use std::iter;

/// Row-expansion settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlattenOptions {
    pub strategy: FlattenStrategy,
    pub empty_list_policy: EmptyListPolicy,
    pub max_rows_per_record: Option<usize>,
    pub row_ceiling: usize,
}

impl FlattenOptions {
    pub fn new(row_ceiling: usize) -> Self {
        FlattenOptions {
            strategy: FlattenStrategy::default(),
            empty_list_policy: EmptyListPolicy::default(),
            max_rows_per_record: None,
            row_ceiling,
        }
    }
}

impl From<&ExportConfig> for FlattenOptions {
    fn from(config: &ExportConfig) -> Self {
        FlattenOptions {
            strategy: config.flatten_strategy,
            empty_list_policy: config.empty_list_policy,
            max_rows_per_record: config.max_rows_per_record,
            row_ceiling: config.row_ceiling,
        }
    }
}

/// Rows of a batch together with their provenance
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FlattenOutcome {
    pub rows: Vec<FlattenedRow>,
    pub groups: Vec<RecordGroup>,
    pub dropped: Vec<DroppedRecord>,
}

/// Why a single record produced no rows
#[derive(Debug)]
enum RecordFailure {
    Path { column: String, source: PathError },
    Expansion(ExpansionError),
    EmptyList { field: String },
}

/// The cells one field contributes to each row of its record
enum Piece {
    /// Same cells on every row
    Fixed(Vec<Value>),
    /// One sub-row per row, selected by the strategy
    Repeated {
        rows: Vec<FlattenedRow>,
        width: usize,
    },
}

/// Expands records into rows according to a [`TablePlan`]
pub struct RecordFlattener<'a> {
    resolver: &'a PathResolver,
    options: FlattenOptions,
}

impl<'a> RecordFlattener<'a> {
    pub fn new(resolver: &'a PathResolver, options: FlattenOptions) -> Self {
        RecordFlattener { resolver, options }
    }

    /// Flatten a batch.
    ///
    /// Records that exceed the row ceiling, or are skipped for an empty list,
    /// are reported in [`FlattenOutcome::dropped`] and the batch continues.
    /// An unrecovered path error fails the whole batch.
    pub fn flatten(
        &self,
        records: &[Value],
        plan: &TablePlan,
    ) -> Result<FlattenOutcome, FlattenError> {
        let mut outcome = FlattenOutcome::default();

        for (record_index, record) in records.iter().enumerate() {
            let expanded = self.expand(
                record,
                plan.schema(),
                Some(plan.sources()),
                self.options.max_rows_per_record,
            );

            match expanded {
                Ok(rows) => {
                    outcome.groups.push(RecordGroup {
                        record_index,
                        first_row: outcome.rows.len(),
                        row_count: rows.len(),
                    });
                    outcome.rows.extend(rows);
                }
                Err(RecordFailure::Path { column, source }) => {
                    return Err(FlattenError::Path {
                        record_index,
                        column,
                        source,
                    });
                }
                Err(RecordFailure::Expansion(err)) => {
                    tracing::warn!(record_index, error = %err, "record dropped");
                    outcome.dropped.push(DroppedRecord {
                        record_index,
                        reason: DropReason::Expansion(err),
                    });
                }
                Err(RecordFailure::EmptyList { field }) => {
                    tracing::debug!(record_index, field = %field, "record skipped for empty list");
                    outcome.dropped.push(DroppedRecord {
                        record_index,
                        reason: DropReason::EmptyList { field },
                    });
                }
            }
        }

        Ok(outcome)
    }

    /// Expand one record (or list element) into rows over `schema`'s columns
    fn expand(
        &self,
        record: &Value,
        schema: &RecordSchema,
        sources: Option<&[ColumnSource]>,
        limit: Option<usize>,
    ) -> Result<Vec<FlattenedRow>, RecordFailure> {
        let mut pieces = Vec::with_capacity(schema.fields().len());
        let mut repeated_names = Vec::new();

        for (index, field) in schema.fields().iter().enumerate() {
            let piece = match &field.kind {
                FieldKind::Scalar => Piece::Fixed(vec![self.resolve_scalar(record, field)?]),
                FieldKind::Repeated { element, max_items } => {
                    repeated_names.push(field.name.as_str());
                    self.repeated_piece(record, field, element, *max_items)?
                }
                FieldKind::Dynamic { .. } => match sources.and_then(|s| s.get(index)) {
                    Some(ColumnSource::Dynamic { columns }) => {
                        Piece::Fixed(self.dynamic_cells(record, field, columns)?)
                    }
                    _ => Piece::Fixed(Vec::new()),
                },
            };
            pieces.push(piece);
        }

        self.combine(schema.type_name(), &pieces, &repeated_names, limit)
    }

    /// Resolve a repeated field and expand each of its elements
    fn repeated_piece(
        &self,
        record: &Value,
        field: &FieldDescriptor,
        element: &RecordSchema,
        max_items: Option<usize>,
    ) -> Result<Piece, RecordFailure> {
        let resolved = match self.resolver.try_resolve(record, &field.path) {
            Ok(value) => value,
            // An absent list is an empty list
            Err(err) if err.is_missing_field() => Cow::Owned(Value::Null),
            Err(err) => {
                self.recover(field, err)?;
                Cow::Owned(Value::Null)
            }
        };

        let items: &[Value] = match resolved.as_ref() {
            Value::Array(items) => items,
            Value::Null => &[],
            other => {
                self.recover(field, mismatch(field, "list", other))?;
                &[]
            }
        };

        let mut rows = Vec::new();
        for item in items.iter().take(max_items.unwrap_or(usize::MAX)) {
            match self.expand(item, element, None, None) {
                Ok(sub_rows) => rows.extend(sub_rows),
                // Under SkipRow an element with an empty list of its own is dropped
                Err(RecordFailure::EmptyList { .. }) => {}
                Err(other) => return Err(other),
            }
            if rows.len() > self.options.row_ceiling {
                return Err(RecordFailure::Expansion(ExpansionError {
                    type_name: element.type_name().to_string(),
                    rows: rows.len(),
                    ceiling: self.options.row_ceiling,
                }));
            }
        }

        Ok(Piece::Repeated {
            rows,
            width: element.static_width(),
        })
    }

    /// Combine the pieces of one record into rows
    fn combine(
        &self,
        type_name: &str,
        pieces: &[Piece],
        repeated_names: &[&str],
        limit: Option<usize>,
    ) -> Result<Vec<FlattenedRow>, RecordFailure> {
        let lengths: Vec<usize> = pieces
            .iter()
            .filter_map(|piece| match piece {
                Piece::Repeated { rows, .. } => Some(rows.len()),
                Piece::Fixed(_) => None,
            })
            .collect();

        if self.options.empty_list_policy == EmptyListPolicy::SkipRow {
            if let Some(position) = lengths.iter().position(|len| *len == 0) {
                return Err(RecordFailure::EmptyList {
                    field: repeated_names[position].to_string(),
                });
            }
        }

        let count = row_count(self.options.strategy, &lengths);
        let rows_to_build = limit.map_or(count, |limit| count.min(limit));

        if rows_to_build > self.options.row_ceiling {
            return Err(RecordFailure::Expansion(ExpansionError {
                type_name: type_name.to_string(),
                rows: rows_to_build,
                ceiling: self.options.row_ceiling,
            }));
        }

        let strides = strides(&lengths);
        let width: usize = pieces
            .iter()
            .map(|piece| match piece {
                Piece::Fixed(cells) => cells.len(),
                Piece::Repeated { width, .. } => *width,
            })
            .sum();

        let mut out = Vec::with_capacity(rows_to_build);
        for row_index in 0..rows_to_build {
            let mut row = Vec::with_capacity(width);
            let mut repeated = 0;

            for piece in pieces {
                match piece {
                    Piece::Fixed(cells) => row.extend(cells.iter().cloned()),
                    Piece::Repeated { rows, width } => {
                        let picked = self
                            .select(row_index, rows.len(), strides[repeated])
                            .and_then(|i| rows.get(i));
                        match picked {
                            Some(sub_row) => row.extend(sub_row.iter().cloned()),
                            None => row.extend(iter::repeat(Value::Null).take(*width)),
                        }
                        repeated += 1;
                    }
                }
            }

            out.push(row);
        }

        Ok(out)
    }

    /// Which element of a list of `len` sub-rows lands on `row_index`
    fn select(&self, row_index: usize, len: usize, stride: usize) -> Option<usize> {
        match self.options.strategy {
            FlattenStrategy::MaxLength | FlattenStrategy::MinLength => {
                (row_index < len).then_some(row_index)
            }
            FlattenStrategy::Cartesian => (len > 0).then(|| (row_index / stride) % len),
        }
    }

    fn resolve_scalar(
        &self,
        record: &Value,
        field: &FieldDescriptor,
    ) -> Result<Value, RecordFailure> {
        match self.resolver.try_resolve(record, &field.path) {
            Ok(value) => Ok(value.into_owned()),
            Err(err) if err.is_missing_field() && field.optional => Ok(Value::Null),
            Err(err) => self.recover(field, err),
        }
    }

    fn dynamic_cells(
        &self,
        record: &Value,
        field: &FieldDescriptor,
        columns: &[DynamicColumn],
    ) -> Result<Vec<Value>, RecordFailure> {
        if columns.is_empty() {
            return Ok(Vec::new());
        }

        match self.resolve_scalar(record, field)? {
            Value::Object(map) => Ok(columns
                .iter()
                .map(|column| map.get(&column.key).cloned().unwrap_or(Value::Null))
                .collect()),
            Value::Null => Ok(vec![Value::Null; columns.len()]),
            other => {
                let fill = self.recover(field, mismatch(field, "map", &other))?;
                Ok(vec![fill; columns.len()])
            }
        }
    }

    fn recover(&self, field: &FieldDescriptor, err: PathError) -> Result<Value, RecordFailure> {
        self.resolver
            .recover(err)
            .map_err(|source| RecordFailure::Path {
                column: field.header.clone(),
                source,
            })
    }
}

/// Rows a record expands to, before any per-record limit
fn row_count(strategy: FlattenStrategy, lengths: &[usize]) -> usize {
    if lengths.is_empty() {
        return 1;
    }
    match strategy {
        FlattenStrategy::MaxLength => lengths.iter().copied().max().unwrap_or(0).max(1),
        FlattenStrategy::MinLength => lengths
            .iter()
            .copied()
            .filter(|len| *len > 0)
            .min()
            .unwrap_or(1),
        FlattenStrategy::Cartesian => lengths
            .iter()
            .fold(1usize, |acc, len| acc.saturating_mul((*len).max(1))),
    }
}

/// Mixed-radix place values; the first list is the most significant digit
fn strides(lengths: &[usize]) -> Vec<usize> {
    let mut strides = vec![1usize; lengths.len()];
    for i in (0..lengths.len().saturating_sub(1)).rev() {
        strides[i] = strides[i + 1].saturating_mul(lengths[i + 1].max(1));
    }
    strides
}

fn mismatch(field: &FieldDescriptor, expected: &'static str, found: &Value) -> PathError {
    PathError::TypeMismatch {
        path: field.path.to_string(),
        segment: field.name.clone(),
        expected,
        found: value_kind(found),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flatten::headers::HeaderConfig;
    use crate::path::{JsonFieldAccessor, ResolveOptions};
    use crate::schema::{
        ElementDefinition, FieldDefinition, SchemaAnalyzer, SchemaDefinition, SchemaRegistry,
    };
    use serde_json::json;
    use std::sync::Arc;

    fn two_lists() -> SchemaDefinition {
        SchemaDefinition::new("Order")
            .field(FieldDefinition::scalar("id"))
            .field(FieldDefinition::values("a"))
            .field(FieldDefinition::values("b"))
    }

    fn run_with(
        definition: &SchemaDefinition,
        records: &[Value],
        options: FlattenOptions,
        resolver: &PathResolver,
    ) -> Result<FlattenOutcome, FlattenError> {
        let schema = SchemaAnalyzer::new(&SchemaRegistry::new())
            .analyze(definition)
            .unwrap();
        let plan =
            TablePlan::build(Arc::new(schema), records, resolver, &HeaderConfig::default())?;
        RecordFlattener::new(resolver, options).flatten(records, &plan)
    }

    fn run(
        definition: &SchemaDefinition,
        records: &[Value],
        options: FlattenOptions,
    ) -> FlattenOutcome {
        run_with(definition, records, options, &PathResolver::json()).unwrap()
    }

    fn options(strategy: FlattenStrategy) -> FlattenOptions {
        FlattenOptions {
            strategy,
            ..FlattenOptions::new(1_000)
        }
    }

    #[test]
    fn test_max_length_pads_with_nulls() {
        let record = json!({"id": 1, "a": ["a0", "a1"], "b": ["b0", "b1", "b2", "b3"]});
        let outcome = run(&two_lists(), &[record], options(FlattenStrategy::MaxLength));

        assert_eq!(outcome.rows.len(), 4);
        assert_eq!(outcome.rows[1], vec![json!(1), json!("a1"), json!("b1")]);
        assert_eq!(outcome.rows[2], vec![json!(1), Value::Null, json!("b2")]);
        assert_eq!(outcome.rows[3], vec![json!(1), Value::Null, json!("b3")]);
    }

    #[test]
    fn test_min_length_truncates() {
        let record = json!({"id": 1, "a": ["a0", "a1"], "b": ["b0", "b1", "b2", "b3"]});
        let outcome = run(&two_lists(), &[record], options(FlattenStrategy::MinLength));

        assert_eq!(
            outcome.rows,
            vec![
                vec![json!(1), json!("a0"), json!("b0")],
                vec![json!(1), json!("a1"), json!("b1")],
            ]
        );
    }

    #[test]
    fn test_min_length_ignores_empty_lists() {
        let record = json!({"id": 1, "a": [], "b": ["b0", "b1"]});
        let outcome = run(&two_lists(), &[record], options(FlattenStrategy::MinLength));

        assert_eq!(outcome.rows.len(), 2);
        assert_eq!(outcome.rows[0][1], Value::Null);
    }

    #[test]
    fn test_cartesian_mixed_radix_order() {
        let record = json!({"id": 1, "a": ["x", "y"], "b": [1, 2, 3]});
        let outcome = run(&two_lists(), &[record], options(FlattenStrategy::Cartesian));

        let pairs: Vec<(Value, Value)> = outcome
            .rows
            .iter()
            .map(|row| (row[1].clone(), row[2].clone()))
            .collect();

        assert_eq!(
            pairs,
            vec![
                (json!("x"), json!(1)),
                (json!("x"), json!(2)),
                (json!("x"), json!(3)),
                (json!("y"), json!(1)),
                (json!("y"), json!(2)),
                (json!("y"), json!(3)),
            ]
        );
    }

    #[test]
    fn test_cartesian_treats_empty_list_as_one_null() {
        let record = json!({"id": 1, "a": [], "b": [1, 2, 3]});
        let outcome = run(&two_lists(), &[record], options(FlattenStrategy::Cartesian));

        assert_eq!(outcome.rows.len(), 3);
        assert!(outcome.rows.iter().all(|row| row[1].is_null()));
    }

    #[test]
    fn test_record_without_lists_yields_one_row() {
        let definition = SchemaDefinition::new("T")
            .field(FieldDefinition::scalar("id"))
            .field(FieldDefinition::scalar("name"));
        let outcome = run(
            &definition,
            &[json!({"id": 1, "name": "x"}), json!({"id": 2, "name": "y"})],
            options(FlattenStrategy::Cartesian),
        );

        assert_eq!(outcome.rows.len(), 2);
        assert_eq!(outcome.groups[1].first_row, 1);
        assert_eq!(outcome.groups[1].row_count, 1);
    }

    #[test]
    fn test_scalars_repeat_across_group() {
        let records = [
            json!({"id": 1, "a": ["p", "q", "r"], "b": []}),
            json!({"id": 2, "a": ["s"], "b": ["t"]}),
        ];
        let outcome = run(&two_lists(), &records, options(FlattenStrategy::MaxLength));

        assert_eq!(outcome.rows.len(), 4);
        assert!(outcome.rows[..3].iter().all(|row| row[0] == json!(1)));
        assert_eq!(
            outcome.groups,
            vec![
                RecordGroup { record_index: 0, first_row: 0, row_count: 3 },
                RecordGroup { record_index: 1, first_row: 3, row_count: 1 },
            ]
        );
    }

    #[test]
    fn test_keep_row_emits_nulls_for_empty_list() {
        let record = json!({"id": 1, "a": [], "b": null});
        let outcome = run(&two_lists(), &[record], options(FlattenStrategy::MaxLength));

        assert_eq!(outcome.rows, vec![vec![json!(1), Value::Null, Value::Null]]);
    }

    #[test]
    fn test_skip_row_drops_only_that_record() {
        let records = [
            json!({"id": 1, "a": [], "b": ["x"]}),
            json!({"id": 2, "a": ["y"], "b": ["z"]}),
        ];
        let outcome = run(
            &two_lists(),
            &records,
            FlattenOptions {
                empty_list_policy: EmptyListPolicy::SkipRow,
                ..options(FlattenStrategy::MaxLength)
            },
        );

        assert_eq!(outcome.rows, vec![vec![json!(2), json!("y"), json!("z")]]);
        assert_eq!(outcome.groups[0].record_index, 1);
        assert_eq!(
            outcome.dropped,
            vec![DroppedRecord {
                record_index: 0,
                reason: DropReason::EmptyList { field: "a".to_string() },
            }]
        );
    }

    #[test]
    fn test_max_rows_per_record_keeps_head() {
        let record = json!({"id": 1, "a": ["x", "y"], "b": [1, 2, 3]});
        let outcome = run(
            &two_lists(),
            &[record],
            FlattenOptions {
                max_rows_per_record: Some(4),
                ..options(FlattenStrategy::Cartesian)
            },
        );

        assert_eq!(outcome.rows.len(), 4);
        assert_eq!(outcome.rows[3][1], json!("y"));
        assert_eq!(outcome.rows[3][2], json!(1));
    }

    #[test]
    fn test_ceiling_drops_record_and_continues() {
        let records = [
            json!({"id": 1, "a": [1, 2, 3, 4], "b": [1, 2, 3, 4]}),
            json!({"id": 2, "a": [1], "b": [1, 2]}),
        ];
        let outcome = run(
            &two_lists(),
            &records,
            FlattenOptions {
                row_ceiling: 10,
                ..options(FlattenStrategy::Cartesian)
            },
        );

        assert_eq!(outcome.rows.len(), 2);
        assert_eq!(outcome.groups[0].record_index, 1);
        assert_eq!(
            outcome.dropped,
            vec![DroppedRecord {
                record_index: 0,
                reason: DropReason::Expansion(ExpansionError {
                    type_name: "Order".to_string(),
                    rows: 16,
                    ceiling: 10,
                }),
            }]
        );
    }

    #[test]
    fn test_max_items_caps_list() {
        let definition = SchemaDefinition::new("T")
            .field(FieldDefinition::values("tags").with_max_items(2));
        let outcome = run(
            &definition,
            &[json!({"tags": ["a", "b", "c"]})],
            options(FlattenStrategy::MaxLength),
        );

        assert_eq!(outcome.rows, vec![vec![json!("a")], vec![json!("b")]]);
    }

    #[test]
    fn test_nested_lists_expand_recursively() {
        let definition = SchemaDefinition::new("Order")
            .field(FieldDefinition::scalar("id"))
            .field(FieldDefinition::repeated(
                "lines",
                ElementDefinition::Inline(
                    SchemaDefinition::new("Line")
                        .field(FieldDefinition::scalar("sku"))
                        .field(FieldDefinition::values("serials").with_header("serial")),
                ),
            ));
        let record = json!({
            "id": 9,
            "lines": [
                {"sku": "A", "serials": ["a1", "a2"]},
                {"sku": "B", "serials": []},
                {"sku": "C", "serials": ["c1"]}
            ]
        });

        let outcome = run(&definition, &[record], options(FlattenStrategy::MaxLength));
        assert_eq!(
            outcome.rows,
            vec![
                vec![json!(9), json!("A"), json!("a1")],
                vec![json!(9), json!("A"), json!("a2")],
                vec![json!(9), json!("B"), Value::Null],
                vec![json!(9), json!("C"), json!("c1")],
            ]
        );
    }

    #[test]
    fn test_nested_skip_row_drops_element_only() {
        let definition = SchemaDefinition::new("Order")
            .field(FieldDefinition::scalar("id"))
            .field(FieldDefinition::repeated(
                "lines",
                ElementDefinition::Inline(
                    SchemaDefinition::new("Line")
                        .field(FieldDefinition::scalar("sku"))
                        .field(FieldDefinition::values("serials")),
                ),
            ));
        let record = json!({
            "id": 9,
            "lines": [{"sku": "A", "serials": []}, {"sku": "B", "serials": ["b1"]}]
        });

        let outcome = run(
            &definition,
            &[record],
            FlattenOptions {
                empty_list_policy: EmptyListPolicy::SkipRow,
                ..options(FlattenStrategy::MaxLength)
            },
        );
        assert_eq!(outcome.rows, vec![vec![json!(9), json!("B"), json!("b1")]]);
    }

    #[test]
    fn test_path_error_fails_batch_with_record_index() {
        let definition = SchemaDefinition::new("T").field(FieldDefinition::scalar("name"));
        let records = [json!({"name": "x"}), json!({"title": "y"})];

        let err = run_with(
            &definition,
            &records,
            options(FlattenStrategy::MaxLength),
            &PathResolver::json(),
        )
        .unwrap_err();

        assert!(matches!(
            err,
            FlattenError::Path { record_index: 1, ref column, .. } if column == "name"
        ));
    }

    #[test]
    fn test_ignored_path_errors_use_default() {
        let definition = SchemaDefinition::new("T")
            .field(FieldDefinition::scalar("name"))
            .field(FieldDefinition::values("tags"));
        let resolver = PathResolver::new(
            Arc::new(JsonFieldAccessor),
            ResolveOptions {
                ignore_errors: true,
                default_value: json!("?"),
                ..ResolveOptions::default()
            },
        );

        let outcome = run_with(
            &definition,
            &[json!({"title": "y", "tags": "not-a-list"})],
            options(FlattenStrategy::MaxLength),
            &resolver,
        )
        .unwrap();

        assert_eq!(outcome.rows, vec![vec![json!("?"), Value::Null]]);
    }

    #[test]
    fn test_optional_field_missing_is_null() {
        let definition =
            SchemaDefinition::new("T").field(FieldDefinition::scalar("nick").optional());
        let outcome = run(&definition, &[json!({})], options(FlattenStrategy::MaxLength));
        assert_eq!(outcome.rows, vec![vec![Value::Null]]);
    }

    #[test]
    fn test_dynamic_cells_follow_plan_columns() {
        let definition = SchemaDefinition::new("T")
            .field(FieldDefinition::scalar("id"))
            .field(FieldDefinition::dynamic("attrs"));
        let records = [
            json!({"id": 1, "attrs": {"color": "red"}}),
            json!({"id": 2, "attrs": {"size": "L", "color": "blue"}}),
            json!({"id": 3, "attrs": null}),
        ];

        let outcome = run(&definition, &records, options(FlattenStrategy::MaxLength));
        assert_eq!(
            outcome.rows,
            vec![
                vec![json!(1), json!("red"), Value::Null],
                vec![json!(2), json!("blue"), json!("L")],
                vec![json!(3), Value::Null, Value::Null],
            ]
        );
    }

    #[test]
    fn test_row_count_and_strides() {
        assert_eq!(row_count(FlattenStrategy::MaxLength, &[0, 0]), 1);
        assert_eq!(row_count(FlattenStrategy::MinLength, &[0, 0]), 1);
        assert_eq!(row_count(FlattenStrategy::Cartesian, &[2, 0, 3]), 6);
        assert_eq!(row_count(FlattenStrategy::Cartesian, &[usize::MAX, 2]), usize::MAX);
        assert_eq!(strides(&[2, 3, 4]), vec![12, 4, 1]);
        assert!(strides(&[]).is_empty());
    }
}
