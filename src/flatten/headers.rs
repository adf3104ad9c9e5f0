//! Column names for map-typed (dynamic) fields

use crate::error::{FlattenError, PathError};
use crate::path::{value_kind, PathResolver};
use crate::schema::{FieldDescriptor, FieldKind};
use crate::types::{DynamicHeaderMode, ExportConfig, HeaderSort};
use serde_json::Value;
use std::collections::HashSet;

/// Settings for dynamic column discovery
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeaderConfig {
    pub mode: DynamicHeaderMode,
    pub sort: HeaderSort,
    pub prefix: String,
    pub suffix: String,
    pub max_columns: Option<usize>,
}

impl From<&ExportConfig> for HeaderConfig {
    fn from(config: &ExportConfig) -> Self {
        HeaderConfig {
            mode: config.dynamic_header_mode,
            sort: config.header_sort,
            prefix: config.header_prefix.clone(),
            suffix: config.header_suffix.clone(),
            max_columns: config.max_columns,
        }
    }
}

/// One column contributed by a dynamic field
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DynamicColumn {
    /// Map key the column reads
    pub key: String,
    /// Label with prefix and suffix applied
    pub header: String,
}

/// Collects dynamic column names from configuration and from the data
pub struct DynamicHeaderBuilder<'a> {
    resolver: &'a PathResolver,
    config: &'a HeaderConfig,
}

impl<'a> DynamicHeaderBuilder<'a> {
    pub fn new(resolver: &'a PathResolver, config: &'a HeaderConfig) -> Self {
        DynamicHeaderBuilder { resolver, config }
    }

    /// Build the columns of one dynamic field over a batch of records
    pub fn build(
        &self,
        records: &[Value],
        field: &FieldDescriptor,
    ) -> Result<Vec<DynamicColumn>, FlattenError> {
        let FieldKind::Dynamic { configured } = &field.kind else {
            return Ok(Vec::new());
        };

        let mut seen = HashSet::new();
        let mut keys: Vec<String> = Vec::new();

        if self.config.mode != DynamicHeaderMode::FromData {
            for name in configured {
                if seen.insert(name.clone()) {
                    keys.push(name.clone());
                }
            }
        }

        if self.config.mode != DynamicHeaderMode::FromConfig {
            for (record_index, record) in records.iter().enumerate() {
                let discovered = self.discover(record, field).map_err(|source| {
                    FlattenError::Header {
                        record_index,
                        field: field.name.clone(),
                        source,
                    }
                })?;
                for key in discovered {
                    if seen.insert(key.clone()) {
                        keys.push(key);
                    }
                }
            }
        }

        match self.config.sort {
            HeaderSort::None => {}
            HeaderSort::Asc => keys.sort(),
            HeaderSort::Desc => keys.sort_by(|a, b| b.cmp(a)),
        }

        if let Some(max) = self.config.max_columns {
            if keys.len() > max {
                tracing::debug!(
                    field = %field.name,
                    kept = max,
                    found = keys.len(),
                    "truncating dynamic columns"
                );
                keys.truncate(max);
            }
        }

        Ok(keys
            .into_iter()
            .map(|key| DynamicColumn {
                header: format!("{}{}{}", self.config.prefix, key, self.config.suffix),
                key,
            })
            .collect())
    }

    /// Map keys of one record's dynamic field, in map order
    fn discover(&self, record: &Value, field: &FieldDescriptor) -> Result<Vec<String>, PathError> {
        let resolved = match self.resolver.try_resolve(record, &field.path) {
            Ok(value) => value,
            Err(err) if err.is_missing_field() && field.optional => return Ok(Vec::new()),
            Err(err) => return self.resolver.recover(err).map(|_| Vec::new()),
        };

        match resolved.as_ref() {
            Value::Object(map) => Ok(map.keys().cloned().collect()),
            Value::Null => Ok(Vec::new()),
            other => {
                let err = PathError::TypeMismatch {
                    path: field.path.to_string(),
                    segment: field.name.clone(),
                    expected: "map",
                    found: value_kind(other),
                };
                self.resolver.recover(err).map(|_| Vec::new())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::path::{JsonFieldAccessor, ResolveOptions};
    use serde_json::json;
    use std::sync::Arc;

    fn attrs_field(configured: &[&str]) -> FieldDescriptor {
        let mut field = FieldDescriptor::scalar("attrs");
        field.kind = FieldKind::Dynamic {
            configured: configured.iter().map(|s| s.to_string()).collect(),
        };
        field
    }

    fn records() -> Vec<Value> {
        vec![
            json!({"attrs": {"size": "M", "color": "red"}}),
            json!({"attrs": {"weight": 3, "color": "blue"}}),
            json!({"attrs": null}),
        ]
    }

    fn keys(columns: &[DynamicColumn]) -> Vec<&str> {
        columns.iter().map(|c| c.key.as_str()).collect()
    }

    #[test]
    fn test_from_data_first_seen_order() {
        let resolver = PathResolver::json();
        let config = HeaderConfig::default();
        let columns = DynamicHeaderBuilder::new(&resolver, &config)
            .build(&records(), &attrs_field(&["brand"]))
            .unwrap();

        assert_eq!(keys(&columns), vec!["size", "color", "weight"]);
    }

    #[test]
    fn test_from_config_only() {
        let resolver = PathResolver::json();
        let config = HeaderConfig {
            mode: DynamicHeaderMode::FromConfig,
            ..HeaderConfig::default()
        };
        let columns = DynamicHeaderBuilder::new(&resolver, &config)
            .build(&records(), &attrs_field(&["brand", "color"]))
            .unwrap();

        assert_eq!(keys(&columns), vec!["brand", "color"]);
    }

    #[test]
    fn test_mixed_keeps_configured_first() {
        let resolver = PathResolver::json();
        let config = HeaderConfig {
            mode: DynamicHeaderMode::Mixed,
            prefix: "attr:".to_string(),
            suffix: "*".to_string(),
            ..HeaderConfig::default()
        };
        let columns = DynamicHeaderBuilder::new(&resolver, &config)
            .build(&records(), &attrs_field(&["color", "brand"]))
            .unwrap();

        assert_eq!(keys(&columns), vec!["color", "brand", "size", "weight"]);
        assert_eq!(columns[0].header, "attr:color*");
    }

    #[test]
    fn test_sort_then_truncate() {
        let resolver = PathResolver::json();
        let config = HeaderConfig {
            sort: HeaderSort::Desc,
            max_columns: Some(2),
            ..HeaderConfig::default()
        };
        let columns = DynamicHeaderBuilder::new(&resolver, &config)
            .build(&records(), &attrs_field(&[]))
            .unwrap();

        assert_eq!(keys(&columns), vec!["weight", "size"]);

        let config = HeaderConfig {
            sort: HeaderSort::Asc,
            ..HeaderConfig::default()
        };
        let columns = DynamicHeaderBuilder::new(&resolver, &config)
            .build(&records(), &attrs_field(&[]))
            .unwrap();
        assert_eq!(keys(&columns), vec!["color", "size", "weight"]);
    }

    #[test]
    fn test_non_map_value_is_reported() {
        let resolver = PathResolver::json();
        let config = HeaderConfig::default();
        let data = vec![json!({"attrs": {"a": 1}}), json!({"attrs": 5})];

        let err = DynamicHeaderBuilder::new(&resolver, &config)
            .build(&data, &attrs_field(&[]))
            .unwrap_err();
        assert!(matches!(err, FlattenError::Header { record_index: 1, .. }));

        let lenient = PathResolver::new(
            Arc::new(JsonFieldAccessor),
            ResolveOptions {
                ignore_errors: true,
                ..ResolveOptions::default()
            },
        );
        let columns = DynamicHeaderBuilder::new(&lenient, &config)
            .build(&data, &attrs_field(&[]))
            .unwrap();
        assert_eq!(keys(&columns), vec!["a"]);
    }
}
