//! Memoized schemas
//!
//! Registered types are cached by type name. Definitions supplied per call
//! are cached by the definition itself, so two definitions that share a type
//! name never see each other's schema.

use crate::error::SchemaError;
use crate::schema::types::RecordSchema;
use once_cell::sync::OnceCell;
use parking_lot::RwLock;
use std::borrow::Borrow;
use std::collections::HashMap;
use std::hash::Hash;
use std::sync::Arc;

type Slot = Arc<OnceCell<Arc<RecordSchema>>>;

/// Process-lifetime cache of analyzed schemas.
///
/// The map lock is only held to fetch or insert a slot; the analysis itself
/// runs inside the slot's `OnceCell`, so two callers asking for the same key
/// run one analysis and callers for different keys never wait on each other.
/// A failed analysis leaves the slot empty and the next caller retries.
#[derive(Debug)]
pub struct SchemaCache<K = String> {
    slots: RwLock<HashMap<K, Slot>>,
}

impl<K> Default for SchemaCache<K> {
    fn default() -> Self {
        SchemaCache {
            slots: RwLock::new(HashMap::new()),
        }
    }
}

impl<K: Hash + Eq> SchemaCache<K> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached schema for a key, if one has been analyzed
    pub fn get<Q>(&self, key: &Q) -> Option<Arc<RecordSchema>>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.slots
            .read()
            .get(key)
            .and_then(|slot| slot.get().cloned())
    }

    /// Return the cached schema or run `analyze` once to produce it
    pub fn get_or_try_insert_with<Q, F>(
        &self,
        key: &Q,
        analyze: F,
    ) -> Result<Arc<RecordSchema>, SchemaError>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ToOwned<Owned = K> + ?Sized,
        F: FnOnce() -> Result<RecordSchema, SchemaError>,
    {
        let slot = self.slot(key);
        slot.get_or_try_init(|| {
            let schema = analyze()?;
            tracing::debug!(type_name = schema.type_name(), "analyzed record schema");
            Ok(Arc::new(schema))
        })
        .cloned()
    }

    /// Store a prebuilt schema unless one is already cached under `key`
    pub fn insert(&self, key: K, schema: Arc<RecordSchema>) -> Arc<RecordSchema> {
        let slot = self.slots.write().entry(key).or_default().clone();
        slot.get_or_init(|| schema).clone()
    }

    pub fn len(&self) -> usize {
        self.slots
            .read()
            .values()
            .filter(|slot| slot.get().is_some())
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop every cached schema
    pub fn clear(&self) {
        self.slots.write().clear();
    }

    fn slot<Q>(&self, key: &Q) -> Slot
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ToOwned<Owned = K> + ?Sized,
    {
        if let Some(slot) = self.slots.read().get(key) {
            return slot.clone();
        }
        self.slots
            .write()
            .entry(key.to_owned())
            .or_default()
            .clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::definition::{
        FieldDefinition, SchemaAnalyzer, SchemaDefinition, SchemaRegistry,
    };
    use crate::schema::types::FieldDescriptor;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::thread;

    fn schema(type_name: &str) -> RecordSchema {
        RecordSchema::new(type_name, vec![FieldDescriptor::scalar("id")])
    }

    #[test]
    fn test_analyzes_once() {
        let cache: SchemaCache = SchemaCache::new();
        let calls = AtomicUsize::new(0);

        for _ in 0..3 {
            let cached = cache
                .get_or_try_insert_with("Order", || {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Ok(schema("Order"))
                })
                .unwrap();
            assert_eq!(cached.type_name(), "Order");
        }

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_failed_analysis_is_retried() {
        let cache: SchemaCache = SchemaCache::new();

        let err = cache
            .get_or_try_insert_with("Order", || Err(SchemaError::UnknownType("Order".into())))
            .unwrap_err();
        assert_eq!(err, SchemaError::UnknownType("Order".into()));
        assert!(cache.get("Order").is_none());

        cache
            .get_or_try_insert_with("Order", || Ok(schema("Order")))
            .unwrap();
        assert!(cache.get("Order").is_some());
    }

    #[test]
    fn test_clear() {
        let cache = SchemaCache::new();
        cache.insert("A".to_string(), Arc::new(schema("A")));
        cache.insert("B".to_string(), Arc::new(schema("B")));
        assert_eq!(cache.len(), 2);

        cache.clear();
        assert!(cache.is_empty());
        assert!(cache.get("A").is_none());
    }

    #[test]
    fn test_concurrent_lookups() {
        let cache: Arc<SchemaCache> = Arc::new(SchemaCache::new());
        let calls = Arc::new(AtomicUsize::new(0));

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let cache = Arc::clone(&cache);
                let calls = Arc::clone(&calls);
                thread::spawn(move || {
                    let type_name = if i % 2 == 0 { "Even" } else { "Odd" };
                    cache
                        .get_or_try_insert_with(type_name, || {
                            calls.fetch_add(1, Ordering::SeqCst);
                            Ok(schema(type_name))
                        })
                        .unwrap()
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn test_definitions_sharing_a_type_name_are_kept_apart() {
        let cache: SchemaCache<SchemaDefinition> = SchemaCache::new();
        let narrow = SchemaDefinition::new("Order").field(FieldDefinition::scalar("id"));
        let wide = narrow.clone().field(FieldDefinition::scalar("total"));
        let analyzer_registry = SchemaRegistry::new();
        let analyzer = SchemaAnalyzer::new(&analyzer_registry);

        let first = cache
            .get_or_try_insert_with(&narrow, || analyzer.analyze(&narrow))
            .unwrap();
        let second = cache
            .get_or_try_insert_with(&wide, || analyzer.analyze(&wide))
            .unwrap();

        assert_eq!(first.static_headers(), vec!["id"]);
        assert_eq!(second.static_headers(), vec!["id", "total"]);
        assert_eq!(cache.len(), 2);
        assert!(Arc::ptr_eq(&first, &cache.get(&narrow).unwrap()));
    }
}
