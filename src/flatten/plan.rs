//! Pre-computed column layout for one batch
//!
//! A [`TablePlan`] fixes, before any row is produced, which columns each
//! schema field contributes. Static fields are known from the schema alone;
//! dynamic fields need one scan of the batch to discover their keys.

use crate::error::FlattenError;
use crate::flatten::headers::{DynamicColumn, DynamicHeaderBuilder, HeaderConfig};
use crate::path::PathResolver;
use crate::schema::{FieldKind, RecordSchema};
use serde_json::Value;
use std::collections::HashSet;
use std::sync::Arc;

/// Columns contributed by one top-level field
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnSource {
    /// One column
    Scalar,
    /// The element schema's columns
    Repeated { width: usize },
    /// One column per discovered or configured key
    Dynamic { columns: Vec<DynamicColumn> },
}

impl ColumnSource {
    pub fn width(&self) -> usize {
        match self {
            ColumnSource::Scalar => 1,
            ColumnSource::Repeated { width } => *width,
            ColumnSource::Dynamic { columns } => columns.len(),
        }
    }
}

/// Column layout of a batch: headers plus where each column comes from
#[derive(Debug, Clone)]
pub struct TablePlan {
    schema: Arc<RecordSchema>,
    /// Parallel to `schema.fields()`
    sources: Vec<ColumnSource>,
    headers: Vec<String>,
    scalar_columns: Vec<usize>,
}

impl TablePlan {
    /// Lay out the columns of `schema` for this batch of records
    pub fn build(
        schema: Arc<RecordSchema>,
        records: &[Value],
        resolver: &PathResolver,
        header_config: &HeaderConfig,
    ) -> Result<Self, FlattenError> {
        let header_builder = DynamicHeaderBuilder::new(resolver, header_config);
        let mut sources = Vec::with_capacity(schema.fields().len());
        let mut headers = Vec::new();
        let mut scalar_columns = Vec::new();

        let mut seen = HashSet::new();

        for field in schema.fields() {
            let first_new = headers.len();
            let source = match &field.kind {
                FieldKind::Scalar => {
                    scalar_columns.push(headers.len());
                    headers.push(field.header.clone());
                    ColumnSource::Scalar
                }
                FieldKind::Repeated { element, .. } => {
                    headers.extend(element.static_headers());
                    ColumnSource::Repeated {
                        width: element.static_width(),
                    }
                }
                FieldKind::Dynamic { .. } => {
                    let columns = header_builder.build(records, field)?;
                    headers.extend(columns.iter().map(|c| c.header.clone()));
                    ColumnSource::Dynamic { columns }
                }
            };

            // Labels are unique; map keys may collide with static labels
            for header in &headers[first_new..] {
                if !seen.insert(header.clone()) {
                    return Err(FlattenError::DuplicateHeader {
                        field: field.name.clone(),
                        header: header.clone(),
                    });
                }
            }
            sources.push(source);
        }

        tracing::debug!(
            type_name = schema.type_name(),
            columns = headers.len(),
            "built table plan"
        );

        Ok(TablePlan {
            schema,
            sources,
            headers,
            scalar_columns,
        })
    }

    pub fn schema(&self) -> &Arc<RecordSchema> {
        &self.schema
    }

    pub fn sources(&self) -> &[ColumnSource] {
        &self.sources
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn width(&self) -> usize {
        self.headers.len()
    }

    /// Column carrying this header label
    pub fn column_index(&self, header: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == header)
    }

    /// Columns of the record's own scalar fields
    pub fn scalar_columns(&self) -> &[usize] {
        &self.scalar_columns
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{
        ElementDefinition, FieldDefinition, FieldDescriptor, SchemaAnalyzer, SchemaDefinition,
        SchemaRegistry,
    };
    use serde_json::json;

    #[test]
    fn test_plan_layout() {
        let definition = SchemaDefinition::new("Order")
            .field(FieldDefinition::scalar("id"))
            .field(FieldDefinition::repeated(
                "lines",
                ElementDefinition::Inline(
                    SchemaDefinition::new("Line")
                        .field(FieldDefinition::scalar("sku"))
                        .field(FieldDefinition::scalar("qty")),
                ),
            ))
            .field(FieldDefinition::dynamic("attrs"))
            .field(FieldDefinition::scalar("total"));
        let schema = SchemaAnalyzer::new(&SchemaRegistry::new())
            .analyze(&definition)
            .unwrap();

        let records = vec![
            json!({"id": 1, "lines": [], "attrs": {"color": "red"}, "total": 3}),
            json!({"id": 2, "lines": [], "attrs": {"size": "L"}, "total": 4}),
        ];

        let plan = TablePlan::build(
            Arc::new(schema),
            &records,
            &PathResolver::json(),
            &HeaderConfig::default(),
        )
        .unwrap();

        assert_eq!(
            plan.headers(),
            &["id", "sku", "qty", "color", "size", "total"]
        );
        assert_eq!(plan.scalar_columns(), &[0, 5]);
        assert_eq!(plan.column_index("size"), Some(4));
        assert_eq!(plan.sources()[1].width(), 2);
        assert_eq!(plan.width(), 6);
    }

    #[test]
    fn test_dynamic_key_clashing_with_static_label() {
        let definition = SchemaDefinition::new("Order")
            .field(FieldDefinition::scalar("id"))
            .field(FieldDefinition::dynamic("attrs"));
        let schema = SchemaAnalyzer::new(&SchemaRegistry::new())
            .analyze(&definition)
            .unwrap();
        let records = vec![json!({"id": 1, "attrs": {"color": "red", "id": "x-1"}})];

        let err = TablePlan::build(
            Arc::new(schema),
            &records,
            &PathResolver::json(),
            &HeaderConfig::default(),
        )
        .unwrap_err();
        assert_eq!(
            err,
            FlattenError::DuplicateHeader {
                field: "attrs".to_string(),
                header: "id".to_string(),
            }
        );

        let schema = SchemaAnalyzer::new(&SchemaRegistry::new())
            .analyze(&definition)
            .unwrap();
        let prefixed = HeaderConfig {
            prefix: "attrs.".to_string(),
            ..HeaderConfig::default()
        };
        let plan = TablePlan::build(Arc::new(schema), &records, &PathResolver::json(), &prefixed)
            .unwrap();
        assert_eq!(plan.headers(), &["id", "attrs.color", "attrs.id"]);
    }

    #[test]
    fn test_prebuilt_schema_with_clashing_labels_is_rejected() {
        let line = RecordSchema::new("Line", vec![FieldDescriptor::scalar("id")]);
        let mut lines = FieldDescriptor::scalar("lines");
        lines.kind = FieldKind::Repeated {
            element: Arc::new(line),
            max_items: None,
        };
        let schema = RecordSchema::new("Order", vec![FieldDescriptor::scalar("id"), lines]);

        let err = TablePlan::build(
            Arc::new(schema),
            &[],
            &PathResolver::json(),
            &HeaderConfig::default(),
        )
        .unwrap_err();
        assert_eq!(
            err,
            FlattenError::DuplicateHeader {
                field: "lines".to_string(),
                header: "id".to_string(),
            }
        );
    }
}
