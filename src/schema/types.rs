use crate::path::PathExpression;
use std::sync::Arc;

/// How a field contributes columns, resolved once at schema analysis
#[derive(Debug, Clone, PartialEq)]
pub enum FieldKind {
    /// One column, same value on every row of the record
    Scalar,

    /// A list whose elements expand into rows through `element`
    Repeated {
        element: Arc<RecordSchema>,
        max_items: Option<usize>,
    },

    /// A map whose keys become columns, discovered per batch
    Dynamic { configured: Vec<String> },
}

/// Describes where one field's columns come from
#[derive(Debug, Clone, PartialEq)]
pub struct FieldDescriptor {
    pub name: String,

    /// Column label (scalar fields) or label stem (dynamic fields)
    pub header: String,

    /// Final position among the schema's fields
    pub declared_order: usize,

    pub kind: FieldKind,

    pub path: PathExpression,

    /// A missing field resolves to null instead of failing
    pub optional: bool,
}

impl FieldDescriptor {
    pub fn scalar(name: impl Into<String>) -> Self {
        let name = name.into();
        FieldDescriptor {
            header: name.clone(),
            path: PathExpression::field(name.clone()),
            name,
            declared_order: 0,
            kind: FieldKind::Scalar,
            optional: false,
        }
    }

    pub fn is_repeated(&self) -> bool {
        matches!(self.kind, FieldKind::Repeated { .. })
    }

    pub fn is_dynamic(&self) -> bool {
        matches!(self.kind, FieldKind::Dynamic { .. })
    }

    pub fn element_schema(&self) -> Option<&Arc<RecordSchema>> {
        match &self.kind {
            FieldKind::Repeated { element, .. } => Some(element),
            _ => None,
        }
    }
}

/// The analyzed shape of one record type, in final column order
#[derive(Debug, Clone, PartialEq)]
pub struct RecordSchema {
    type_name: String,
    fields: Vec<FieldDescriptor>,
}

impl RecordSchema {
    /// Build a schema from fields already in column order.
    ///
    /// `declared_order` is rewritten to match the position of each field.
    pub fn new(type_name: impl Into<String>, mut fields: Vec<FieldDescriptor>) -> Self {
        for (position, field) in fields.iter_mut().enumerate() {
            field.declared_order = position;
        }
        RecordSchema {
            type_name: type_name.into(),
            fields,
        }
    }

    /// Schema of a list of plain values: one column holding the element itself
    pub fn value_list(type_name: impl Into<String>, header: impl Into<String>) -> Self {
        let field = FieldDescriptor {
            name: String::from("value"),
            header: header.into(),
            declared_order: 0,
            kind: FieldKind::Scalar,
            path: PathExpression::identity(),
            optional: false,
        };
        Self::new(type_name, vec![field])
    }

    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    pub fn fields(&self) -> &[FieldDescriptor] {
        &self.fields
    }

    pub fn field(&self, name: &str) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn scalar_fields(&self) -> impl Iterator<Item = &FieldDescriptor> {
        self.fields.iter().filter(|f| matches!(f.kind, FieldKind::Scalar))
    }

    pub fn repeated_fields(&self) -> impl Iterator<Item = &FieldDescriptor> {
        self.fields.iter().filter(|f| f.is_repeated())
    }

    pub fn dynamic_sources(&self) -> impl Iterator<Item = &FieldDescriptor> {
        self.fields.iter().filter(|f| f.is_dynamic())
    }

    /// Column labels contributed by scalar and repeated fields, dynamic fields skipped
    pub fn static_headers(&self) -> Vec<String> {
        let mut headers = Vec::new();
        self.collect_headers(&mut headers);
        headers
    }

    /// Number of columns contributed by scalar and repeated fields
    pub fn static_width(&self) -> usize {
        self.fields
            .iter()
            .map(|field| match &field.kind {
                FieldKind::Scalar => 1,
                FieldKind::Repeated { element, .. } => element.static_width(),
                FieldKind::Dynamic { .. } => 0,
            })
            .sum()
    }

    fn collect_headers(&self, headers: &mut Vec<String>) {
        for field in &self.fields {
            match &field.kind {
                FieldKind::Scalar => headers.push(field.header.clone()),
                FieldKind::Repeated { element, .. } => element.collect_headers(headers),
                FieldKind::Dynamic { .. } => {}
            }
        }
    }
}
