//! Schema inference with a streaming accumulator
//!
//! Instead of inferring a shape per sample and merging the results, the
//! builder accumulates statistics across all samples and produces the final
//! [`SchemaDefinition`] once at the end. Field order is first-seen order.

use crate::error::SchemaError;
use crate::schema::definition::{ElementDefinition, FieldDefinition, SchemaDefinition};
use serde_json::{Map, Value};
use std::collections::HashMap;

/// Type identifier for JSON values
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum JsonType {
    Null,
    Scalar,
    Array,
    Object,
}

impl JsonType {
    fn from_value(value: &Value) -> Self {
        match value {
            Value::Null => JsonType::Null,
            Value::Array(_) => JsonType::Array,
            Value::Object(_) => JsonType::Object,
            _ => JsonType::Scalar,
        }
    }
}

/// Accumulates the element values of every array seen at one position
#[derive(Debug)]
struct ArrayBuilder {
    items_builder: Box<SchemaBuilder>,
}

impl ArrayBuilder {
    fn new() -> Self {
        ArrayBuilder {
            items_builder: Box::new(SchemaBuilder::new()),
        }
    }

    fn add_array(&mut self, arr: &[Value]) {
        for item in arr {
            self.items_builder.add_value(item);
        }
    }
}

/// Accumulates the properties of every object seen at one position
#[derive(Debug)]
struct ObjectBuilder {
    // Property names in first-seen order
    order: Vec<String>,
    properties: HashMap<String, SchemaBuilder>,
    // Number of objects each property appeared in
    appearances: HashMap<String, usize>,
    object_count: usize,
}

impl ObjectBuilder {
    fn new() -> Self {
        ObjectBuilder {
            order: Vec::new(),
            properties: HashMap::new(),
            appearances: HashMap::new(),
            object_count: 0,
        }
    }

    fn add_object(&mut self, obj: &Map<String, Value>) {
        self.object_count += 1;

        for (key, value) in obj.iter() {
            if !self.properties.contains_key(key) {
                self.order.push(key.clone());
            }
            self.properties
                .entry(key.clone())
                .or_insert_with(SchemaBuilder::new)
                .add_value(value);
            *self.appearances.entry(key.clone()).or_insert(0) += 1;
        }
    }

    fn build(
        mut self,
        type_name: &str,
        header_prefix: Option<&str>,
        nested: bool,
    ) -> SchemaDefinition {
        let mut definition = SchemaDefinition::new(type_name);

        for key in std::mem::take(&mut self.order) {
            let Some(builder) = self.properties.remove(&key) else {
                continue;
            };
            let header = match header_prefix {
                Some(prefix) => format!("{}.{}", prefix, key),
                None => key.clone(),
            };
            let optional = self.appearances.get(&key).copied().unwrap_or(0) < self.object_count;

            let mut field = builder.build_field(type_name, &key, &header, nested);
            field.optional = optional;
            if header != key {
                field.header = Some(header);
            }
            definition.fields.push(field);
        }

        definition
    }
}

/// Main schema builder that accumulates statistics
#[derive(Debug)]
pub struct SchemaBuilder {
    // Count of each type seen
    type_counts: HashMap<JsonType, usize>,
    // Total number of samples processed
    sample_count: usize,
    // Type-specific builders
    array_builder: Option<ArrayBuilder>,
    object_builder: Option<ObjectBuilder>,
}

impl SchemaBuilder {
    /// Create a new empty schema builder
    pub fn new() -> Self {
        SchemaBuilder {
            type_counts: HashMap::new(),
            sample_count: 0,
            array_builder: None,
            object_builder: None,
        }
    }

    pub fn sample_count(&self) -> usize {
        self.sample_count
    }

    /// Add a value to the builder, accumulating statistics
    pub fn add_value(&mut self, value: &Value) {
        self.sample_count += 1;
        let json_type = JsonType::from_value(value);
        *self.type_counts.entry(json_type).or_insert(0) += 1;

        match value {
            Value::Array(arr) => {
                let builder = self.array_builder.get_or_insert_with(ArrayBuilder::new);
                builder.add_array(arr);
            }
            Value::Object(obj) => {
                let builder = self.object_builder.get_or_insert_with(ObjectBuilder::new);
                builder.add_object(obj);
            }
            _ => {}
        }
    }

    /// Build the record definition from the accumulated samples.
    ///
    /// Every sample should be an object; non-object samples are ignored.
    pub fn build(self, type_name: &str) -> Result<SchemaDefinition, SchemaError> {
        match self.object_builder {
            Some(builder) => Ok(builder.build(type_name, None, false)),
            None => Err(SchemaError::NoSamples(type_name.to_string())),
        }
    }

    /// The single non-null type seen, if the samples agree
    fn dominant_type(&self) -> Option<JsonType> {
        let mut non_null = self
            .type_counts
            .keys()
            .copied()
            .filter(|t| *t != JsonType::Null);
        match (non_null.next(), non_null.next()) {
            (Some(only), None) => Some(only),
            _ => None,
        }
    }

    /// Classify one property of a record
    fn build_field(
        self,
        type_name: &str,
        key: &str,
        header: &str,
        nested: bool,
    ) -> FieldDefinition {
        match self.dominant_type() {
            Some(JsonType::Array) => {
                let items = self.array_builder.map(|b| *b.items_builder);
                match items {
                    Some(items) if items.dominant_type() == Some(JsonType::Object) => {
                        let element_type = format!("{}.{}", type_name, key);
                        let element = items
                            .object_builder
                            .map(|b| b.build(&element_type, Some(header), true))
                            .unwrap_or_else(|| SchemaDefinition::new(element_type));
                        FieldDefinition::repeated(key, ElementDefinition::Inline(element))
                    }
                    _ => FieldDefinition::values(key),
                }
            }
            // Maps become dynamic columns on the record itself; inside list
            // elements they stay whole values in a single cell.
            Some(JsonType::Object) if !nested => FieldDefinition::dynamic(key),
            _ => FieldDefinition::scalar(key),
        }
    }
}

impl Default for SchemaBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Infer a definition from sample records using the streaming builder
pub fn infer_definition(
    type_name: &str,
    samples: &[Value],
) -> Result<SchemaDefinition, SchemaError> {
    let mut builder = SchemaBuilder::new();

    for sample in samples {
        builder.add_value(sample);
    }

    builder.build(type_name)
}
