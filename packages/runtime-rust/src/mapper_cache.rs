//! Per-schema mapper cache.

use std::sync::Arc;

use dashmap::DashMap;
use opbind_core::{MapperFactory, SchemaDescriptor, SchemaMapper};
use tracing::debug;

use crate::error::BindError;

/// Creates at most one mapper per schema and shares it across operations.
///
/// Keyed by `{microservice}.{schema_id}`, so provider and consumer schemas with
/// the same id reuse the mapper.
pub struct MapperCache {
    factory: Arc<dyn MapperFactory>,
    mappers: DashMap<String, Arc<dyn SchemaMapper>>,
}

impl MapperCache {
    #[must_use]
    pub fn new(factory: Arc<dyn MapperFactory>) -> Self {
        Self {
            factory,
            mappers: DashMap::new(),
        }
    }

    /// Returns the cached mapper of `schema`, creating it on first use.
    ///
    /// # Errors
    ///
    /// Returns `BindError::Mapper` if the factory cannot map the schema.
    /// Failures are not cached.
    pub fn get_or_create_mapper(
        &self,
        schema: &SchemaDescriptor,
    ) -> Result<Arc<dyn SchemaMapper>, BindError> {
        let key = format!("{}.{}", schema.microservice_name(), schema.schema_id());
        if let Some(mapper) = self.mappers.get(&key) {
            return Ok(Arc::clone(mapper.value()));
        }

        let entry = self
            .mappers
            .entry(key)
            .or_try_insert_with(|| {
                debug!(schema = %schema.schema_id(), "creating schema mapper");
                self.factory.create_mapper(schema)
            })
            .map_err(|source| BindError::Mapper {
                schema_id: schema.schema_id().to_string(),
                source,
            })?;
        Ok(Arc::clone(entry.value()))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.mappers.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.mappers.is_empty()
    }
}

impl std::fmt::Debug for MapperCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MapperCache")
            .field("mappers", &self.mappers.len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU32, Ordering};

    use opbind_core::{CodecError, OperationDefinition, Role, SchemaDefinition, TaggedMapper};

    use super::*;

    fn schema(schema_id: &str, role: Role) -> SchemaDescriptor {
        SchemaDescriptor::build(
            SchemaDefinition {
                microservice_name: "demo".to_string(),
                schema_id: schema_id.to_string(),
                operations: vec![OperationDefinition::new("ping")],
            },
            role,
        )
        .unwrap()
    }

    fn counting_cache() -> (MapperCache, Arc<AtomicU32>) {
        let calls = Arc::new(AtomicU32::new(0));
        let counter = Arc::clone(&calls);
        let factory = move |_: &SchemaDescriptor| -> Result<Arc<dyn SchemaMapper>, CodecError> {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(Arc::new(TaggedMapper::new()))
        };
        (MapperCache::new(Arc::new(factory)), calls)
    }

    #[test]
    fn factory_called_once_per_schema() {
        let (cache, calls) = counting_cache();
        let first = cache.get_or_create_mapper(&schema("A", Role::Provider)).unwrap();
        let second = cache.get_or_create_mapper(&schema("A", Role::Consumer)).unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert!(format!("{first:?}").contains("TaggedMapper"));
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        cache.get_or_create_mapper(&schema("B", Role::Provider)).unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn factory_failure_is_not_cached() {
        let factory = |s: &SchemaDescriptor| -> Result<Arc<dyn SchemaMapper>, CodecError> {
            Err(CodecError::MapperUnavailable {
                schema_id: s.schema_id().to_string(),
                reason: "no proto".to_string(),
            })
        };
        let cache = MapperCache::new(Arc::new(factory));
        let err = cache.get_or_create_mapper(&schema("A", Role::Provider)).unwrap_err();
        assert!(matches!(err, BindError::Mapper { ref schema_id, .. } if schema_id == "A"));
        assert!(cache.is_empty());
    }
}
