//! The composition root: schema lookup, flattening and merge detection for one batch

use crate::error::{MergeError, Result, SchemaError};
use crate::flatten::{FlattenOptions, HeaderConfig, RecordFlattener, TablePlan};
use crate::merge::{compute_merge_regions, ColumnGroup};
use crate::path::{FieldAccessor, JsonFieldAccessor, PathResolver};
use crate::schema::{
    infer_definition, RecordSchema, SchemaAnalyzer, SchemaCache, SchemaDefinition, SchemaRegistry,
};
use crate::types::{ExportConfig, TableOutput};
use serde_json::Value;
use std::sync::Arc;

/// Where the schema of a batch comes from
#[derive(Debug, Clone)]
pub enum SchemaSource<'a> {
    /// A definition supplied with the call, cached by its full content
    Declared(&'a SchemaDefinition),
    /// A definition previously registered with [`Tabulator::register`]
    Registered(&'a str),
    /// Inferred from the batch itself; never cached
    Inferred(&'a str),
    /// An already analyzed schema
    Prebuilt(Arc<RecordSchema>),
}

/// Turns batches of records into [`TableOutput`]s.
///
/// Owns the field accessor, the registry of named definitions and the schema
/// caches. A `Tabulator` can be shared between threads; calls for different
/// record types never wait on each other's schema analysis.
pub struct Tabulator {
    accessor: Arc<dyn FieldAccessor>,
    registry: SchemaRegistry,
    /// Registered types by name
    cache: SchemaCache,
    /// Per-call definitions by content
    declared: SchemaCache<SchemaDefinition>,
}

impl Default for Tabulator {
    fn default() -> Self {
        Self::new()
    }
}

impl Tabulator {
    /// Tabulator over plain JSON objects
    pub fn new() -> Self {
        Self::with_accessor(Arc::new(JsonFieldAccessor))
    }

    pub fn with_accessor(accessor: Arc<dyn FieldAccessor>) -> Self {
        Tabulator {
            accessor,
            registry: SchemaRegistry::new(),
            cache: SchemaCache::new(),
            declared: SchemaCache::new(),
        }
    }

    /// Register a named definition.
    ///
    /// Cached schemas may embed the type being replaced through a reference,
    /// so both caches are cleared.
    pub fn register(&mut self, definition: SchemaDefinition) {
        self.registry.register(definition);
        self.cache.clear();
        self.declared.clear();
    }

    pub fn registry(&self) -> &SchemaRegistry {
        &self.registry
    }

    /// Schemas of registered types
    pub fn cache(&self) -> &SchemaCache {
        &self.cache
    }

    /// Schemas of definitions passed with [`SchemaSource::Declared`]
    pub fn declared_cache(&self) -> &SchemaCache<SchemaDefinition> {
        &self.declared
    }

    /// Look up or analyze the schema for a batch
    pub fn schema_for(
        &self,
        records: &[Value],
        source: SchemaSource<'_>,
    ) -> std::result::Result<Arc<RecordSchema>, SchemaError> {
        let analyzer = SchemaAnalyzer::new(&self.registry);

        match source {
            SchemaSource::Declared(definition) => self
                .declared
                .get_or_try_insert_with(definition, || analyzer.analyze(definition)),
            SchemaSource::Registered(type_name) => self
                .cache
                .get_or_try_insert_with(type_name, || analyzer.analyze_registered(type_name)),
            SchemaSource::Inferred(type_name) => {
                let definition = infer_definition(type_name, records)?;
                analyzer.analyze(&definition).map(Arc::new)
            }
            SchemaSource::Prebuilt(schema) => Ok(schema),
        }
    }

    /// Flatten a batch and compute its merge regions
    pub fn tabulate(
        &self,
        records: &[Value],
        source: SchemaSource<'_>,
        config: &ExportConfig,
    ) -> Result<TableOutput> {
        let schema = self.schema_for(records, source)?;
        let resolver = PathResolver::new(self.accessor.clone(), config.resolve_options());

        let plan = TablePlan::build(schema, records, &resolver, &HeaderConfig::from(config))?;
        let outcome =
            RecordFlattener::new(&resolver, FlattenOptions::from(config)).flatten(records, &plan)?;

        let groups = column_groups(&plan, config)?;
        let merge_regions = compute_merge_regions(&outcome.rows, &groups)?;

        tracing::info!(
            type_name = plan.schema().type_name(),
            records = records.len(),
            rows = outcome.rows.len(),
            columns = plan.width(),
            merge_regions = merge_regions.len(),
            dropped = outcome.dropped.len(),
            "tabulated batch"
        );

        Ok(TableOutput {
            headers: plan.headers().to_vec(),
            rows: outcome.rows,
            merge_regions,
            groups: outcome.groups,
            dropped: outcome.dropped,
        })
    }
}

/// Translate the header labels of the merge settings into column groups
fn column_groups(
    plan: &TablePlan,
    config: &ExportConfig,
) -> std::result::Result<Vec<ColumnGroup>, MergeError> {
    let lookup = |label: &str| {
        plan.column_index(label)
            .ok_or_else(|| MergeError::UnknownColumn(label.to_string()))
    };

    let mut mergeable: Vec<usize> = Vec::new();
    if config.merge_scalar_columns {
        mergeable.extend_from_slice(plan.scalar_columns());
    }
    for label in &config.merge_columns {
        let column = lookup(label)?;
        if !mergeable.contains(&column) {
            mergeable.push(column);
        }
    }

    let mut dependencies = Vec::with_capacity(config.column_dependencies.len());
    for dependency in &config.column_dependencies {
        dependencies.push((lookup(&dependency.child)?, lookup(&dependency.parent)?));
    }

    let mut groups = Vec::new();
    for &column in &mergeable {
        let mut constrained = false;
        for &(child, parent) in &dependencies {
            if child == column {
                groups.push(ColumnGroup::mergeable(column).with_parent(parent));
                constrained = true;
            }
        }
        if !constrained {
            groups.push(ColumnGroup::mergeable(column));
        }
    }

    // Dependencies of columns that are not merged still carry boundaries down
    for &(child, parent) in &dependencies {
        if !mergeable.contains(&child) {
            groups.push(ColumnGroup::boundary_only(child).with_parent(parent));
        }
    }

    Ok(groups)
}
