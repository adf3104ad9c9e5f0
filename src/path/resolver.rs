//! Read-only evaluation of path expressions against record graphs.

use crate::error::PathError;
use crate::path::expression::{PathExpression, Segment};
use serde_json::Value;
use std::borrow::Cow;
use std::sync::Arc;

/// Field introspection port.
///
/// The resolver never looks inside a record itself; it asks the accessor.
/// The default [`JsonFieldAccessor`] reads JSON objects, other implementations
/// can alias or hide fields.
pub trait FieldAccessor: Send + Sync {
    /// Fetch a named member, `None` when the record has no such field
    fn get_field<'a>(&self, record: &'a Value, name: &str) -> Option<&'a Value>;

    /// Field names of a record, in declaration order
    fn field_names(&self, record: &Value) -> Vec<String>;

    /// Whether the value can be asked for fields at all
    fn is_record(&self, value: &Value) -> bool {
        value.is_object()
    }
}

/// Accessor over plain JSON objects
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonFieldAccessor;

impl FieldAccessor for JsonFieldAccessor {
    fn get_field<'a>(&self, record: &'a Value, name: &str) -> Option<&'a Value> {
        record.as_object().and_then(|obj| obj.get(name))
    }

    fn field_names(&self, record: &Value) -> Vec<String> {
        record
            .as_object()
            .map(|obj| obj.keys().cloned().collect())
            .unwrap_or_default()
    }
}

/// Options controlling wildcard joins and error recovery
#[derive(Debug, Clone, PartialEq)]
pub struct ResolveOptions {
    /// Separator placed between joined wildcard elements
    pub separator: String,

    /// Maximum number of elements a wildcard joins; the rest are dropped
    pub max_join_size: Option<usize>,

    /// Replace resolution errors with `default_value` instead of failing
    pub ignore_errors: bool,

    /// Value returned for failed resolutions when `ignore_errors` is set
    pub default_value: Value,
}

impl Default for ResolveOptions {
    fn default() -> Self {
        ResolveOptions {
            separator: String::from(","),
            max_join_size: None,
            ignore_errors: false,
            default_value: Value::Null,
        }
    }
}

/// Evaluates [`PathExpression`]s through a [`FieldAccessor`]
#[derive(Clone)]
pub struct PathResolver {
    accessor: Arc<dyn FieldAccessor>,
    options: ResolveOptions,
}

impl PathResolver {
    pub fn new(accessor: Arc<dyn FieldAccessor>, options: ResolveOptions) -> Self {
        PathResolver { accessor, options }
    }

    /// Resolver over JSON objects with default options
    pub fn json() -> Self {
        Self::new(Arc::new(JsonFieldAccessor), ResolveOptions::default())
    }

    pub fn options(&self) -> &ResolveOptions {
        &self.options
    }

    pub fn accessor(&self) -> &dyn FieldAccessor {
        self.accessor.as_ref()
    }

    /// Resolve `expr` against `root`, applying the error policy.
    pub fn resolve(&self, root: &Value, expr: &PathExpression) -> Result<Value, PathError> {
        match self.try_resolve(root, expr) {
            Ok(value) => Ok(value.into_owned()),
            Err(err) => self.recover(err),
        }
    }

    /// Resolve `expr` against `root` without applying the error policy.
    ///
    /// Borrows from `root` unless a wildcard had to build a new value.
    pub fn try_resolve<'v>(
        &self,
        root: &'v Value,
        expr: &PathExpression,
    ) -> Result<Cow<'v, Value>, PathError> {
        self.walk(expr, root, 0)
    }

    /// Apply the error policy to a failed resolution
    pub fn recover(&self, err: PathError) -> Result<Value, PathError> {
        if self.options.ignore_errors {
            tracing::debug!(
                path = err.path(),
                error = %err,
                "path error replaced by default value"
            );
            Ok(self.options.default_value.clone())
        } else {
            Err(err)
        }
    }

    fn walk<'v>(
        &self,
        expr: &PathExpression,
        mut current: &'v Value,
        start: usize,
    ) -> Result<Cow<'v, Value>, PathError> {
        let segments = expr.segments();

        for (index, segment) in segments.iter().enumerate().skip(start) {
            if current.is_null() {
                return Ok(Cow::Borrowed(current));
            }

            match segment {
                Segment::Field(name) => {
                    if !self.accessor.is_record(current) {
                        return Err(mismatch(expr, segment, "record", current));
                    }
                    current = self.accessor.get_field(current, name).ok_or_else(|| {
                        PathError::MissingField {
                            path: expr.to_string(),
                            field: name.clone(),
                        }
                    })?;
                }
                Segment::Index(position) => {
                    let Value::Array(items) = current else {
                        return Err(mismatch(expr, segment, "list", current));
                    };
                    current = items.get(*position).ok_or_else(|| PathError::IndexOutOfRange {
                        path: expr.to_string(),
                        index: *position,
                        len: items.len(),
                    })?;
                }
                Segment::Key(key) => {
                    let Value::Object(map) = current else {
                        return Err(mismatch(expr, segment, "map", current));
                    };
                    match map.get(key) {
                        Some(value) => current = value,
                        None => return Ok(Cow::Owned(Value::Null)),
                    }
                }
                Segment::Wildcard => {
                    let Value::Array(items) = current else {
                        return Err(mismatch(expr, segment, "list", current));
                    };
                    return self.join(expr, items, index + 1).map(Cow::Owned);
                }
            }
        }

        Ok(Cow::Borrowed(current))
    }

    /// Resolve the rest of the path against each element and join the texts
    fn join(
        &self,
        expr: &PathExpression,
        items: &[Value],
        rest: usize,
    ) -> Result<Value, PathError> {
        let limit = self.options.max_join_size.unwrap_or(usize::MAX);
        let mut parts = Vec::with_capacity(items.len().min(limit));

        for item in items.iter().take(limit) {
            let value = self.walk(expr, item, rest)?;
            parts.push(value_to_text(&value));
        }

        Ok(Value::String(parts.join(&self.options.separator)))
    }
}

impl std::fmt::Debug for PathResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PathResolver")
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

/// Render a value as cell text: strings raw, null empty, everything else as JSON
pub fn value_to_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Short name of a value's type, used in error messages
pub fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "list",
        Value::Object(_) => "record",
    }
}

fn mismatch(
    expr: &PathExpression,
    segment: &Segment,
    expected: &'static str,
    found: &Value,
) -> PathError {
    PathError::TypeMismatch {
        path: expr.to_string(),
        segment: segment.to_string(),
        expected,
        found: value_kind(found),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PathErrorKind;
    use serde_json::json;

    fn path(expr: &str) -> PathExpression {
        PathExpression::parse(expr).unwrap()
    }

    fn order() -> Value {
        json!({
            "id": 7,
            "customer": {"name": "Alice", "tier": null},
            "items": [
                {"name": "x", "qty": 1},
                {"name": "y", "qty": 2},
                {"name": "z", "qty": 3}
            ],
            "attrs": {"color": "red", "size": "M"}
        })
    }

    #[test]
    fn test_field_and_index_access() {
        let resolver = PathResolver::json();
        let root = order();

        assert_eq!(resolver.resolve(&root, &path("customer.name")).unwrap(), json!("Alice"));
        assert_eq!(resolver.resolve(&root, &path("items[1].qty")).unwrap(), json!(2));
        assert_eq!(resolver.resolve(&root, &path("attrs[color]")).unwrap(), json!("red"));
    }

    #[test]
    fn test_wildcard_join() {
        let resolver = PathResolver::json();
        let value = resolver.resolve(&order(), &path("items[*].name")).unwrap();
        assert_eq!(value, json!("x,y,z"));
    }

    #[test]
    fn test_wildcard_join_respects_cap() {
        let options = ResolveOptions {
            max_join_size: Some(2),
            ..ResolveOptions::default()
        };
        let resolver = PathResolver::new(Arc::new(JsonFieldAccessor), options);
        let value = resolver.resolve(&order(), &path("items[*].name")).unwrap();
        assert_eq!(value, json!("x,y"));
    }

    #[test]
    fn test_wildcard_custom_separator_and_numbers() {
        let options = ResolveOptions {
            separator: " | ".to_string(),
            ..ResolveOptions::default()
        };
        let resolver = PathResolver::new(Arc::new(JsonFieldAccessor), options);
        let value = resolver.resolve(&order(), &path("items[*].qty")).unwrap();
        assert_eq!(value, json!("1 | 2 | 3"));
    }

    #[test]
    fn test_missing_key_is_null() {
        let resolver = PathResolver::json();
        let value = resolver.resolve(&order(), &path("attrs[weight]")).unwrap();
        assert_eq!(value, Value::Null);
    }

    #[test]
    fn test_null_short_circuits() {
        let resolver = PathResolver::json();
        let value = resolver.resolve(&order(), &path("customer.tier.label")).unwrap();
        assert_eq!(value, Value::Null);
    }

    #[test]
    fn test_error_kinds() {
        let resolver = PathResolver::json();
        let root = order();

        let err = resolver.resolve(&root, &path("customer.email")).unwrap_err();
        assert_eq!(err.kind(), PathErrorKind::MissingField);

        let err = resolver.resolve(&root, &path("items[5].name")).unwrap_err();
        assert_eq!(
            err,
            PathError::IndexOutOfRange {
                path: "items[5].name".to_string(),
                index: 5,
                len: 3,
            }
        );

        let err = resolver.resolve(&root, &path("id.value")).unwrap_err();
        assert_eq!(err.kind(), PathErrorKind::TypeMismatch);

        let err = resolver.resolve(&root, &path("attrs[*]")).unwrap_err();
        assert_eq!(err.kind(), PathErrorKind::TypeMismatch);
    }

    #[test]
    fn test_ignore_errors_returns_default() {
        let options = ResolveOptions {
            ignore_errors: true,
            default_value: json!("n/a"),
            ..ResolveOptions::default()
        };
        let resolver = PathResolver::new(Arc::new(JsonFieldAccessor), options);
        let value = resolver.resolve(&order(), &path("items[9].name")).unwrap();
        assert_eq!(value, json!("n/a"));
    }

    #[test]
    fn test_resolve_is_idempotent_and_read_only() {
        let resolver = PathResolver::json();
        let root = order();
        let snapshot = root.clone();
        let expr = path("items[*].name");

        let first = resolver.resolve(&root, &expr).unwrap();
        let second = resolver.resolve(&root, &expr).unwrap();

        assert_eq!(first, second);
        assert_eq!(root, snapshot);
    }

    #[test]
    fn test_identity_path_returns_root() {
        let resolver = PathResolver::json();
        let root = json!("plain");
        assert_eq!(
            resolver.resolve(&root, &PathExpression::identity()).unwrap(),
            json!("plain")
        );
    }

    #[test]
    fn test_custom_accessor_is_used() {
        struct UpperCase;

        impl FieldAccessor for UpperCase {
            fn get_field<'a>(&self, record: &'a Value, name: &str) -> Option<&'a Value> {
                record.get(name.to_uppercase())
            }

            fn field_names(&self, record: &Value) -> Vec<String> {
                JsonFieldAccessor.field_names(record)
            }
        }

        let resolver = PathResolver::new(Arc::new(UpperCase), ResolveOptions::default());
        let root = json!({"NAME": "Bob"});
        assert_eq!(resolver.resolve(&root, &path("name")).unwrap(), json!("Bob"));
    }
}
