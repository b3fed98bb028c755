//! Codec binder: resolves an operation's root codecs once, at registration.

use std::sync::Arc;

use opbind_core::{CodecError, MessageShape, OperationDescriptor, Role, SchemaMapper, TargetType};
use tracing::{debug, error};

use super::plan::{plan, RequestPlan, ResponsePlan};
use super::root::{RootDeserializer, RootSerializer};
use super::{BindingSide, OperationBinding};
use crate::error::{BindError, MessageKind};

/// Builds [`OperationBinding`]s from operation descriptors and a schema mapper.
///
/// Stateless: the result depends only on the descriptor, the role, and what
/// the mapper returns, so binding the same inputs twice yields equivalent
/// bindings.
#[derive(Debug, Clone, Copy, Default)]
pub struct CodecBinder;

impl CodecBinder {
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Binds `operation` using the role recorded on its descriptor.
    ///
    /// # Errors
    ///
    /// See [`bind`](Self::bind).
    pub fn bind_operation(
        &self,
        operation: &Arc<OperationDescriptor>,
        mapper: &dyn SchemaMapper,
    ) -> Result<OperationBinding, BindError> {
        self.bind(operation, operation.role(), mapper)
    }

    /// Resolves the root codecs of `operation` for `role`.
    ///
    /// # Errors
    ///
    /// - `BindError::MessageNotFound` if the mapper lacks a request or response message.
    /// - `BindError::AmbiguousRequest` for an unwrapped request with two or more parameters.
    /// - `BindError::Codec` if the mapper cannot build a codec.
    pub fn bind(
        &self,
        operation: &Arc<OperationDescriptor>,
        role: Role,
        mapper: &dyn SchemaMapper,
    ) -> Result<OperationBinding, BindError> {
        let name = operation.qualified_name();
        let missing = |kind| BindError::MessageNotFound {
            qualified_name: name.to_string(),
            kind,
        };
        let request_message = mapper
            .request_message(operation.operation_id())
            .ok_or_else(|| missing(MessageKind::Request))?;
        let response_message = mapper
            .response_message(operation.operation_id())
            .ok_or_else(|| missing(MessageKind::Response))?;

        let param_count = operation.parameters().len();
        let plan = plan(
            role,
            MessageShape::classify(&request_message),
            MessageShape::classify(&response_message),
            param_count,
        )
        .map_err(|e| {
            error!(operation = name, %role, param_count, "cannot bind request: {e}");
            BindError::AmbiguousRequest {
                qualified_name: name.to_string(),
                param_count,
            }
        })?;

        debug!(
            operation = name,
            %role,
            request = ?plan.request,
            response = ?plan.response,
            "binding plan resolved"
        );

        let codec_err = |source: CodecError| BindError::Codec {
            qualified_name: name.to_string(),
            source,
        };

        let request_target = request_target(plan.request, operation);
        let response_target = match plan.response {
            ResponsePlan::Empty => TargetType::Any,
            ResponsePlan::Wrapped | ResponsePlan::Direct => {
                TargetType::Type(operation.responses().success_type().clone())
            }
        };
        let response_wrap = plan.response.is_wrap();

        let response_deserializer = RootDeserializer::new(
            mapper
                .create_deserializer(&response_message, response_target.clone())
                .map_err(codec_err)?,
            response_wrap,
            None,
        );

        let side = match role {
            Role::Provider => {
                let single_argument_name = match plan.request {
                    RequestPlan::Single => Some(operation.parameters()[0].name.clone()),
                    RequestPlan::Wrapped | RequestPlan::Empty => None,
                };
                BindingSide::Provider {
                    request_deserializer: RootDeserializer::new(
                        mapper
                            .create_deserializer(&request_message, request_target)
                            .map_err(codec_err)?,
                        plan.request.is_wrap(),
                        single_argument_name,
                    ),
                    response_serializer: RootSerializer::new(
                        mapper
                            .create_serializer(&response_message, response_target)
                            .map_err(codec_err)?,
                        response_wrap,
                        false,
                    ),
                    response_deserializer,
                }
            }
            Role::Consumer => BindingSide::Consumer {
                request_serializer: RootSerializer::new(
                    mapper
                        .create_serializer(&request_message, request_target)
                        .map_err(codec_err)?,
                    plan.request.is_wrap(),
                    plan.request == RequestPlan::Single,
                ),
                response_deserializer,
            },
        };

        Ok(OperationBinding::new(Arc::clone(operation), side))
    }
}

fn request_target(plan: RequestPlan, operation: &OperationDescriptor) -> TargetType {
    match plan {
        RequestPlan::Wrapped => TargetType::Params(operation.parameters_shared()),
        RequestPlan::Empty => TargetType::Any,
        RequestPlan::Single => TargetType::Type(operation.parameters()[0].ty.clone()),
    }
}
