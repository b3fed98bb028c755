//! Operation and schema descriptors.
//!
//! A [`SchemaDescriptor`] is the registry-owned, immutable description of one
//! schema of a microservice. Each of its operations is an
//! [`OperationDescriptor`] shared via `Arc` with bindings and invocations.

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::status::STATUS_OK;
use crate::types::TypeRef;

/// Which side of a call this process plays for an operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Caller: encodes requests, decodes responses.
    Consumer,
    /// Server: decodes requests, encodes responses.
    Provider,
}

impl Role {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Role::Consumer => "consumer",
            Role::Provider => "provider",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A declared operation parameter.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ParamDescriptor {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: TypeRef,
}

impl ParamDescriptor {
    #[must_use]
    pub fn new(name: impl Into<String>, ty: TypeRef) -> Self {
        Self {
            name: name.into(),
            ty,
        }
    }
}

static ANY: TypeRef = TypeRef::Any;

/// Declared response types of an operation, keyed by status code.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResponseTypes {
    by_status: BTreeMap<u16, TypeRef>,
    default: Option<TypeRef>,
}

impl ResponseTypes {
    #[must_use]
    pub fn new(by_status: BTreeMap<u16, TypeRef>, default: Option<TypeRef>) -> Self {
        Self { by_status, default }
    }

    /// Resolves the type for `status`: exact code, then the declared default,
    /// then the generic placeholder.
    #[must_use]
    pub fn find_response_type(&self, status: u16) -> &TypeRef {
        self.by_status
            .get(&status)
            .or(self.default.as_ref())
            .unwrap_or(&ANY)
    }

    /// The type bound to success responses.
    #[must_use]
    pub fn success_type(&self) -> &TypeRef {
        self.find_response_type(STATUS_OK)
    }
}

/// Immutable description of one remote operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperationDescriptor {
    schema_id: String,
    operation_id: String,
    qualified_name: String,
    role: Role,
    parameters: Arc<[ParamDescriptor]>,
    responses: ResponseTypes,
}

impl OperationDescriptor {
    /// Creates a descriptor. The qualified name is
    /// `<microservice>.<schema_id>.<operation_id>`.
    #[must_use]
    pub fn new(
        microservice_name: &str,
        schema_id: impl Into<String>,
        operation_id: impl Into<String>,
        role: Role,
        parameters: Vec<ParamDescriptor>,
        responses: ResponseTypes,
    ) -> Self {
        let schema_id = schema_id.into();
        let operation_id = operation_id.into();
        let qualified_name = format!("{microservice_name}.{schema_id}.{operation_id}");
        Self {
            schema_id,
            operation_id,
            qualified_name,
            role,
            parameters: parameters.into(),
            responses,
        }
    }

    #[must_use]
    pub fn schema_id(&self) -> &str {
        &self.schema_id
    }

    #[must_use]
    pub fn operation_id(&self) -> &str {
        &self.operation_id
    }

    /// Name used in diagnostics and as the registry key.
    #[must_use]
    pub fn qualified_name(&self) -> &str {
        &self.qualified_name
    }

    #[must_use]
    pub fn role(&self) -> Role {
        self.role
    }

    /// Declared parameters in declaration order.
    #[must_use]
    pub fn parameters(&self) -> &[ParamDescriptor] {
        &self.parameters
    }

    /// Shared handle to the parameter list, for binding to a wrapped envelope.
    #[must_use]
    pub fn parameters_shared(&self) -> Arc<[ParamDescriptor]> {
        Arc::clone(&self.parameters)
    }

    #[must_use]
    pub fn responses(&self) -> &ResponseTypes {
        &self.responses
    }
}

// ---------------------------------------------------------------------------
// Schema
// ---------------------------------------------------------------------------

/// Errors raised while assembling or querying a schema.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SchemaError {
    #[error("operation {operation_id} declared twice in schema {schema_id}")]
    DuplicateOperation {
        schema_id: String,
        operation_id: String,
    },
    #[error("operation {operation_id} not found in schema {schema_id}")]
    OperationNotFound {
        schema_id: String,
        operation_id: String,
    },
}

/// Serializable definition of a schema, as loaded from a contract document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchemaDefinition {
    pub microservice_name: String,
    pub schema_id: String,
    #[serde(default)]
    pub operations: Vec<OperationDefinition>,
}

/// Serializable definition of one operation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OperationDefinition {
    pub operation_id: String,
    #[serde(default)]
    pub parameters: Vec<ParamDescriptor>,
    /// Declared response type per status code.
    #[serde(default)]
    pub responses: BTreeMap<u16, TypeRef>,
    /// Response type for codes without an explicit entry.
    #[serde(default)]
    pub default_response: Option<TypeRef>,
}

impl OperationDefinition {
    #[must_use]
    pub fn new(operation_id: impl Into<String>) -> Self {
        Self {
            operation_id: operation_id.into(),
            parameters: Vec::new(),
            responses: BTreeMap::new(),
            default_response: None,
        }
    }

    #[must_use]
    pub fn param(mut self, name: impl Into<String>, ty: TypeRef) -> Self {
        self.parameters.push(ParamDescriptor::new(name, ty));
        self
    }

    #[must_use]
    pub fn response(mut self, status: u16, ty: TypeRef) -> Self {
        self.responses.insert(status, ty);
        self
    }
}

/// Registry-owned description of one schema and its operations.
#[derive(Debug, Clone)]
pub struct SchemaDescriptor {
    microservice_name: String,
    schema_id: String,
    role: Role,
    operations: Vec<Arc<OperationDescriptor>>,
    by_id: HashMap<String, usize>,
}

impl SchemaDescriptor {
    /// Builds the descriptor for `role` from a definition.
    ///
    /// # Errors
    ///
    /// Returns `SchemaError::DuplicateOperation` if two operations share an id.
    pub fn build(definition: SchemaDefinition, role: Role) -> Result<Self, SchemaError> {
        let SchemaDefinition {
            microservice_name,
            schema_id,
            operations: defs,
        } = definition;

        let mut operations = Vec::with_capacity(defs.len());
        let mut by_id = HashMap::with_capacity(defs.len());
        for def in defs {
            if by_id.contains_key(&def.operation_id) {
                return Err(SchemaError::DuplicateOperation {
                    schema_id,
                    operation_id: def.operation_id,
                });
            }
            by_id.insert(def.operation_id.clone(), operations.len());
            operations.push(Arc::new(OperationDescriptor::new(
                &microservice_name,
                schema_id.clone(),
                def.operation_id,
                role,
                def.parameters,
                ResponseTypes::new(def.responses, def.default_response),
            )));
        }

        Ok(Self {
            microservice_name,
            schema_id,
            role,
            operations,
            by_id,
        })
    }

    #[must_use]
    pub fn microservice_name(&self) -> &str {
        &self.microservice_name
    }

    #[must_use]
    pub fn schema_id(&self) -> &str {
        &self.schema_id
    }

    #[must_use]
    pub fn role(&self) -> Role {
        self.role
    }

    /// Operations in declaration order.
    #[must_use]
    pub fn operations(&self) -> &[Arc<OperationDescriptor>] {
        &self.operations
    }

    #[must_use]
    pub fn find_operation(&self, operation_id: &str) -> Option<&Arc<OperationDescriptor>> {
        self.by_id.get(operation_id).map(|&i| &self.operations[i])
    }

    /// Like [`find_operation`](Self::find_operation), but absence is an error.
    ///
    /// # Errors
    ///
    /// Returns `SchemaError::OperationNotFound` if no operation has this id.
    pub fn ensure_find_operation(
        &self,
        operation_id: &str,
    ) -> Result<&Arc<OperationDescriptor>, SchemaError> {
        self.find_operation(operation_id)
            .ok_or_else(|| SchemaError::OperationNotFound {
                schema_id: self.schema_id.clone(),
                operation_id: operation_id.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn calculator() -> SchemaDefinition {
        SchemaDefinition {
            microservice_name: "calc".to_string(),
            schema_id: "CalculatorEndpoint".to_string(),
            operations: vec![
                OperationDefinition::new("add")
                    .param("a", TypeRef::Int)
                    .param("b", TypeRef::Int)
                    .response(200, TypeRef::Int),
                OperationDefinition::new("echo")
                    .response(200, TypeRef::Message("EchoResponse".to_string())),
            ],
        }
    }

    #[test]
    fn qualified_name_joins_service_schema_operation() {
        let schema = SchemaDescriptor::build(calculator(), Role::Provider).unwrap();
        let add = schema.find_operation("add").unwrap();
        assert_eq!(add.qualified_name(), "calc.CalculatorEndpoint.add");
        assert_eq!(add.role(), Role::Provider);
        assert_eq!(add.parameters().len(), 2);
    }

    #[test]
    fn operations_keep_declaration_order() {
        let schema = SchemaDescriptor::build(calculator(), Role::Consumer).unwrap();
        let ids: Vec<_> = schema.operations().iter().map(|o| o.operation_id()).collect();
        assert_eq!(ids, vec!["add", "echo"]);
    }

    #[test]
    fn ensure_find_operation_reports_missing_id() {
        let schema = SchemaDescriptor::build(calculator(), Role::Consumer).unwrap();
        let err = schema.ensure_find_operation("divide").unwrap_err();
        assert_eq!(
            err,
            SchemaError::OperationNotFound {
                schema_id: "CalculatorEndpoint".to_string(),
                operation_id: "divide".to_string(),
            }
        );
        assert!(err.to_string().contains("divide"));
    }

    #[test]
    fn duplicate_operation_ids_are_rejected() {
        let mut def = calculator();
        def.operations.push(OperationDefinition::new("add"));
        let err = SchemaDescriptor::build(def, Role::Provider).unwrap_err();
        assert!(matches!(err, SchemaError::DuplicateOperation { operation_id, .. } if operation_id == "add"));
    }

    #[test]
    fn response_type_lookup_falls_back() {
        let mut by_status = BTreeMap::new();
        by_status.insert(200, TypeRef::Message("Ok".to_string()));
        let responses = ResponseTypes::new(by_status, Some(TypeRef::Message("Fault".to_string())));

        assert_eq!(responses.success_type(), &TypeRef::Message("Ok".to_string()));
        assert_eq!(
            responses.find_response_type(500),
            &TypeRef::Message("Fault".to_string())
        );
        assert_eq!(ResponseTypes::default().success_type(), &TypeRef::Any);
    }

    #[test]
    fn schema_definition_from_json() {
        let def: SchemaDefinition = serde_json::from_str(
            r#"{
                "microservice_name": "calc",
                "schema_id": "CalculatorEndpoint",
                "operations": [
                    {
                        "operation_id": "add",
                        "parameters": [
                            {"name": "a", "type": "int"},
                            {"name": "b", "type": "int"}
                        ],
                        "responses": {"200": "int"}
                    }
                ]
            }"#,
        )
        .unwrap();
        let schema = SchemaDescriptor::build(def, Role::Provider).unwrap();
        let add = schema.ensure_find_operation("add").unwrap();
        assert_eq!(add.responses().success_type(), &TypeRef::Int);
        assert_eq!(add.parameters()[1], ParamDescriptor::new("b", TypeRef::Int));
    }
}
