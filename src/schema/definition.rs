//! Declared schemas and their analysis into [`RecordSchema`]s
//!
//! A [`SchemaDefinition`] is the serializable description of a record type:
//! which fields become columns, in what order, under which labels, and which
//! fields are lists or maps. [`SchemaAnalyzer`] validates a definition and
//! resolves element references through a [`SchemaRegistry`].

use crate::error::SchemaError;
use crate::path::PathExpression;
use crate::schema::types::{FieldDescriptor, FieldKind, RecordSchema};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

/// The kind of a declared field
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldType {
    #[default]
    Scalar,
    Repeated,
    Dynamic,
}

/// Element schema of a repeated field
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ElementDefinition {
    /// Element type described in place
    Inline(SchemaDefinition),
    /// Element type registered elsewhere under this name
    Reference(String),
}

/// One declared field
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FieldDefinition {
    pub name: String,

    /// Column label; defaults to the field name
    #[serde(default)]
    pub header: Option<String>,

    /// Explicit column position; explicit positions come before implicit ones
    #[serde(default)]
    pub order: Option<u32>,

    /// Path to read instead of the field name, e.g. `customer.address.city`
    #[serde(default)]
    pub path: Option<String>,

    #[serde(default)]
    pub optional: bool,

    #[serde(default)]
    pub kind: FieldType,

    /// Element schema of a repeated field; `None` means a list of plain values
    #[serde(default)]
    pub element: Option<ElementDefinition>,

    /// Cap on the number of list elements expanded
    #[serde(default)]
    pub max_items: Option<usize>,

    /// Configured column names of a dynamic field
    #[serde(default)]
    pub names: Vec<String>,
}

impl FieldDefinition {
    pub fn scalar(name: impl Into<String>) -> Self {
        FieldDefinition {
            name: name.into(),
            header: None,
            order: None,
            path: None,
            optional: false,
            kind: FieldType::Scalar,
            element: None,
            max_items: None,
            names: Vec::new(),
        }
    }

    /// A list field whose elements expand through `element`
    pub fn repeated(name: impl Into<String>, element: ElementDefinition) -> Self {
        FieldDefinition {
            kind: FieldType::Repeated,
            element: Some(element),
            ..Self::scalar(name)
        }
    }

    /// A list of plain values, one column
    pub fn values(name: impl Into<String>) -> Self {
        FieldDefinition {
            kind: FieldType::Repeated,
            ..Self::scalar(name)
        }
    }

    /// A map field whose keys become columns
    pub fn dynamic(name: impl Into<String>) -> Self {
        FieldDefinition {
            kind: FieldType::Dynamic,
            ..Self::scalar(name)
        }
    }

    pub fn with_header(mut self, header: impl Into<String>) -> Self {
        self.header = Some(header.into());
        self
    }

    pub fn with_order(mut self, order: u32) -> Self {
        self.order = Some(order);
        self
    }

    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    pub fn with_max_items(mut self, max_items: usize) -> Self {
        self.max_items = Some(max_items);
        self
    }

    pub fn with_names<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.names = names.into_iter().map(Into::into).collect();
        self
    }

    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }

    fn header_label(&self) -> String {
        self.header.clone().unwrap_or_else(|| self.name.clone())
    }
}

/// Declared shape of a record type
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SchemaDefinition {
    pub type_name: String,

    #[serde(default)]
    pub fields: Vec<FieldDefinition>,
}

impl SchemaDefinition {
    pub fn new(type_name: impl Into<String>) -> Self {
        SchemaDefinition {
            type_name: type_name.into(),
            fields: Vec::new(),
        }
    }

    pub fn field(mut self, field: FieldDefinition) -> Self {
        self.fields.push(field);
        self
    }
}

/// Named definitions that repeated fields can reference
#[derive(Debug, Clone, Default)]
pub struct SchemaRegistry {
    definitions: HashMap<String, SchemaDefinition>,
}

impl SchemaRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a definition, replacing any earlier one of the same name
    pub fn register(&mut self, definition: SchemaDefinition) {
        self.definitions
            .insert(definition.type_name.clone(), definition);
    }

    pub fn get(&self, type_name: &str) -> Option<&SchemaDefinition> {
        self.definitions.get(type_name)
    }

    pub fn contains(&self, type_name: &str) -> bool {
        self.definitions.contains_key(type_name)
    }
}

/// Turns definitions into validated, immutable [`RecordSchema`]s
pub struct SchemaAnalyzer<'r> {
    registry: &'r SchemaRegistry,
}

impl<'r> SchemaAnalyzer<'r> {
    pub fn new(registry: &'r SchemaRegistry) -> Self {
        SchemaAnalyzer { registry }
    }

    /// Analyze a registered type
    pub fn analyze_registered(&self, type_name: &str) -> Result<RecordSchema, SchemaError> {
        let definition = self
            .registry
            .get(type_name)
            .ok_or_else(|| SchemaError::UnknownType(type_name.to_string()))?;
        self.analyze(definition)
    }

    /// Analyze a definition, resolving element references recursively
    ///
    /// Column labels must be unique across the whole table, nested element
    /// columns included; use `header` to rename clashing fields.
    pub fn analyze(&self, definition: &SchemaDefinition) -> Result<RecordSchema, SchemaError> {
        let mut stack = Vec::new();
        let schema = self.analyze_level(definition, &mut stack)?;

        let mut seen = HashSet::new();
        for header in schema.static_headers() {
            if !seen.insert(header.clone()) {
                return Err(SchemaError::DuplicateHeader {
                    type_name: definition.type_name.clone(),
                    header,
                });
            }
        }

        Ok(schema)
    }

    fn analyze_level(
        &self,
        definition: &SchemaDefinition,
        stack: &mut Vec<String>,
    ) -> Result<RecordSchema, SchemaError> {
        if stack.contains(&definition.type_name) {
            let mut chain = stack.clone();
            chain.push(definition.type_name.clone());
            return Err(SchemaError::CircularReference { chain });
        }
        stack.push(definition.type_name.clone());

        let ordered = order_fields(definition)?;
        let nested = stack.len() > 1;

        let mut fields = Vec::with_capacity(ordered.len());
        for field in ordered {
            fields.push(self.analyze_field(definition, field, nested, stack)?);
        }

        stack.pop();
        Ok(RecordSchema::new(definition.type_name.clone(), fields))
    }

    fn analyze_field(
        &self,
        definition: &SchemaDefinition,
        field: &FieldDefinition,
        nested: bool,
        stack: &mut Vec<String>,
    ) -> Result<FieldDescriptor, SchemaError> {
        let path = match &field.path {
            Some(expr) => {
                PathExpression::parse(expr).map_err(|source| SchemaError::InvalidPath {
                    type_name: definition.type_name.clone(),
                    field: field.name.clone(),
                    source,
                })?
            }
            None => PathExpression::field(field.name.clone()),
        };

        let kind = match field.kind {
            FieldType::Scalar => FieldKind::Scalar,
            FieldType::Dynamic => {
                if nested {
                    return Err(SchemaError::NestedDynamic {
                        type_name: definition.type_name.clone(),
                        field: field.name.clone(),
                    });
                }
                FieldKind::Dynamic {
                    configured: field.names.clone(),
                }
            }
            FieldType::Repeated => {
                let element = match &field.element {
                    None => RecordSchema::value_list(
                        format!("{}.{}", definition.type_name, field.name),
                        field.header_label(),
                    ),
                    Some(ElementDefinition::Inline(inline)) => self.analyze_level(inline, stack)?,
                    Some(ElementDefinition::Reference(type_name)) => {
                        let referenced = self
                            .registry
                            .get(type_name)
                            .ok_or_else(|| SchemaError::UnknownType(type_name.clone()))?;
                        self.analyze_level(referenced, stack)?
                    }
                };
                FieldKind::Repeated {
                    element: Arc::new(element),
                    max_items: field.max_items,
                }
            }
        };

        Ok(FieldDescriptor {
            name: field.name.clone(),
            header: field.header_label(),
            declared_order: 0,
            kind,
            path,
            optional: field.optional,
        })
    }
}

/// Explicitly positioned fields first (by position), then the rest in declaration order
fn order_fields(definition: &SchemaDefinition) -> Result<Vec<&FieldDefinition>, SchemaError> {
    let mut names = HashSet::new();
    let mut positions: HashMap<u32, &str> = HashMap::new();
    let mut explicit = Vec::new();
    let mut implicit = Vec::new();

    for field in &definition.fields {
        if !names.insert(field.name.as_str()) {
            return Err(SchemaError::DuplicateField {
                type_name: definition.type_name.clone(),
                field: field.name.clone(),
            });
        }

        match field.order {
            Some(order) => {
                if let Some(first) = positions.insert(order, field.name.as_str()) {
                    return Err(SchemaError::ConflictingOrder {
                        type_name: definition.type_name.clone(),
                        order,
                        first: first.to_string(),
                        second: field.name.clone(),
                    });
                }
                explicit.push((order, field));
            }
            None => implicit.push(field),
        }
    }

    explicit.sort_by_key(|(order, _)| *order);
    Ok(explicit
        .into_iter()
        .map(|(_, field)| field)
        .chain(implicit)
        .collect())
}
