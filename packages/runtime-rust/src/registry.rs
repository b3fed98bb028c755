//! Registry of bound operations.
//!
//! A schema is registered atomically: every operation is bound first and the
//! bindings are stored only when all of them succeed.

use std::sync::Arc;

use dashmap::DashMap;
use opbind_core::{MapperFactory, OperationDescriptor, Role, SchemaDescriptor};
use parking_lot::RwLock;
use tracing::{error, info};

use crate::binding::{CodecBinder, OperationBinding};
use crate::error::BindError;
use crate::mapper_cache::MapperCache;

type BindingKey = (Role, String);

/// Registry of operation bindings for both roles.
///
/// Provides two lookup mechanisms:
/// - **By qualified name** (`get`): `{microservice}.{schema_id}.{operation_id}`
/// - **By schema and operation id** (`find`)
///
/// Registration order is kept for deterministic listing.
pub struct OperationRegistry {
    binder: CodecBinder,
    mappers: MapperCache,
    by_key: DashMap<BindingKey, Arc<OperationBinding>>,
    by_id: DashMap<(Role, String, String), Arc<OperationBinding>>,
    order: RwLock<Vec<BindingKey>>,
}

impl OperationRegistry {
    #[must_use]
    pub fn new(factory: Arc<dyn MapperFactory>) -> Self {
        Self {
            binder: CodecBinder::new(),
            mappers: MapperCache::new(factory),
            by_key: DashMap::new(),
            by_id: DashMap::new(),
            order: RwLock::new(Vec::new()),
        }
    }

    /// Binds and stores every operation of `schema` under the schema's role.
    ///
    /// # Errors
    ///
    /// Returns the first `BindError`; no operation of the schema is stored then.
    pub fn register_schema(
        &self,
        schema: &SchemaDescriptor,
    ) -> Result<Vec<Arc<OperationBinding>>, BindError> {
        let role = schema.role();
        let mapper = self.mappers.get_or_create_mapper(schema).inspect_err(|e| {
            error!(schema = %schema.schema_id(), %role, error = %e, "schema registration failed");
        })?;

        let bindings = schema
            .operations()
            .iter()
            .map(|op| {
                self.binder
                    .bind(op, role, mapper.as_ref())
                    .map(Arc::new)
            })
            .collect::<Result<Vec<_>, _>>()
            .inspect_err(|e| {
                error!(schema = %schema.schema_id(), %role, error = %e, "schema registration failed");
            })?;

        let mut order = self.order.write();
        for binding in &bindings {
            let op = binding.operation();
            let key = (role, op.qualified_name().to_string());
            if self.by_key.insert(key.clone(), Arc::clone(binding)).is_none() {
                order.push(key);
            }
            self.by_id.insert(
                (role, op.schema_id().to_string(), op.operation_id().to_string()),
                Arc::clone(binding),
            );
        }
        drop(order);

        info!(
            schema = %schema.schema_id(),
            %role,
            operations = bindings.len(),
            "schema registered"
        );
        Ok(bindings)
    }

    #[must_use]
    pub fn get(&self, role: Role, qualified_name: &str) -> Option<Arc<OperationBinding>> {
        self.by_key
            .get(&(role, qualified_name.to_string()))
            .map(|entry| Arc::clone(entry.value()))
    }

    #[must_use]
    pub fn find(
        &self,
        role: Role,
        schema_id: &str,
        operation_id: &str,
    ) -> Option<Arc<OperationBinding>> {
        self.by_id
            .get(&(role, schema_id.to_string(), operation_id.to_string()))
            .map(|entry| Arc::clone(entry.value()))
    }

    /// Binding of `operation` under the role recorded on its descriptor.
    #[must_use]
    pub fn binding_for(&self, operation: &OperationDescriptor) -> Option<Arc<OperationBinding>> {
        self.get(operation.role(), operation.qualified_name())
    }

    /// Qualified names of one role, in registration order.
    #[must_use]
    pub fn qualified_names(&self, role: Role) -> Vec<String> {
        self.order
            .read()
            .iter()
            .filter(|(r, _)| *r == role)
            .map(|(_, name)| name.clone())
            .collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.by_key.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_key.is_empty()
    }
}

impl std::fmt::Debug for OperationRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OperationRegistry")
            .field("bindings", &self.by_key.len())
            .field("mappers", &self.mappers)
            .finish_non_exhaustive()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use opbind_core::{
        CodecError, MessageDescriptor, OperationDefinition, SchemaDefinition, SchemaMapper,
        TaggedMapper, TypeRef, ANNOTATION_WRAP_ARGUMENTS,
    };

    use super::*;
    use crate::error::MessageKind;

    fn mapper() -> TaggedMapper {
        TaggedMapper::new()
            .with_operation(
                "echo",
                MessageDescriptor::new("EchoRequest")
                    .with_annotation(ANNOTATION_WRAP_ARGUMENTS)
                    .with_field("text", 1, TypeRef::String),
                MessageDescriptor::new("EchoResponse").with_field("text", 1, TypeRef::String),
            )
            .with_operation(
                "ping",
                MessageDescriptor::new("PingRequest"),
                MessageDescriptor::new("Empty"),
            )
    }

    fn registry() -> OperationRegistry {
        let factory = |_: &SchemaDescriptor| -> Result<Arc<dyn SchemaMapper>, CodecError> {
            Ok(Arc::new(mapper()))
        };
        OperationRegistry::new(Arc::new(factory))
    }

    fn schema(operations: Vec<OperationDefinition>, role: Role) -> SchemaDescriptor {
        SchemaDescriptor::build(
            SchemaDefinition {
                microservice_name: "demo".to_string(),
                schema_id: "Echo".to_string(),
                operations,
            },
            role,
        )
        .unwrap()
    }

    fn echo() -> OperationDefinition {
        OperationDefinition::new("echo")
            .param("text", TypeRef::String)
            .response(200, TypeRef::String)
    }

    #[test]
    fn registers_all_operations_in_order() {
        let registry = registry();
        let bindings = registry
            .register_schema(&schema(vec![echo(), OperationDefinition::new("ping")], Role::Provider))
            .unwrap();

        assert_eq!(bindings.len(), 2);
        assert_eq!(
            registry.qualified_names(Role::Provider),
            vec!["demo.Echo.echo".to_string(), "demo.Echo.ping".to_string()]
        );
        assert!(registry.qualified_names(Role::Consumer).is_empty());

        let echo = registry.get(Role::Provider, "demo.Echo.echo").unwrap();
        assert!(echo.request_deserializer().unwrap().is_wrap());
        assert!(registry.get(Role::Consumer, "demo.Echo.echo").is_none());

        let ping = registry.find(Role::Provider, "Echo", "ping").unwrap();
        assert!(Arc::ptr_eq(&ping, &bindings[1]));
        assert!(registry.binding_for(ping.operation()).is_some());
    }

    #[test]
    fn both_roles_coexist() {
        let registry = registry();
        registry.register_schema(&schema(vec![echo()], Role::Provider)).unwrap();
        registry.register_schema(&schema(vec![echo()], Role::Consumer)).unwrap();

        assert_eq!(registry.len(), 2);
        let consumer = registry.get(Role::Consumer, "demo.Echo.echo").unwrap();
        assert_eq!(consumer.role(), Role::Consumer);
        assert!(consumer.request_serializer().is_some());
    }

    #[test]
    fn failing_operation_aborts_whole_schema() {
        let registry = registry();
        let schema = schema(
            vec![echo(), OperationDefinition::new("missing")],
            Role::Provider,
        );

        let err = registry.register_schema(&schema).unwrap_err();
        assert!(matches!(
            err,
            BindError::MessageNotFound { ref qualified_name, kind: MessageKind::Request }
                if qualified_name == "demo.Echo.missing"
        ));
        assert!(registry.is_empty());
        assert!(registry.get(Role::Provider, "demo.Echo.echo").is_none());
    }

    #[test]
    fn re_registration_does_not_duplicate_order() {
        let registry = registry();
        let schema = schema(vec![echo()], Role::Provider);
        registry.register_schema(&schema).unwrap();
        registry.register_schema(&schema).unwrap();

        assert_eq!(registry.len(), 1);
        assert_eq!(registry.qualified_names(Role::Provider).len(), 1);
    }
}
