//! The binding decision table.
//!
//! Maps `(role, request shape, response shape, parameter count)` to a
//! [`BindingPlan`] without touching any mapper, so every combination can be
//! tested directly.

use opbind_core::{MessageShape, Role};

/// How the request message carries the argument set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestPlan {
    /// The whole message is the packed argument set.
    Wrapped,
    /// No parameters and no envelope: bound to the placeholder type.
    Empty,
    /// The message is the value of the one declared parameter.
    Single,
}

impl RequestPlan {
    #[must_use]
    pub fn is_wrap(self) -> bool {
        self == RequestPlan::Wrapped
    }
}

/// How the response message carries the success value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponsePlan {
    /// The value sits in the single wrapper field.
    Wrapped,
    /// The message has no fields: bound to the placeholder type.
    Empty,
    /// The message is the success value itself.
    Direct,
}

impl ResponsePlan {
    #[must_use]
    pub fn is_wrap(self) -> bool {
        self == ResponsePlan::Wrapped
    }
}

/// Which response codecs a role binds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResponseCodecs {
    pub serializer: bool,
    pub deserializer: bool,
}

/// The full decision for one operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BindingPlan {
    pub role: Role,
    pub request: RequestPlan,
    pub response: ResponsePlan,
    pub response_codecs: ResponseCodecs,
}

/// Two or more parameters with an unwrapped request message: no field of the
/// message can be attributed to a parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("{param_count} parameters cannot be carried by an unwrapped request message")]
pub struct AmbiguousRequest {
    pub param_count: usize,
}

/// # Errors
///
/// Returns `AmbiguousRequest` for an unwrapped message with two or more parameters.
pub fn plan_request(shape: MessageShape, param_count: usize) -> Result<RequestPlan, AmbiguousRequest> {
    if shape.wraps_arguments {
        return Ok(RequestPlan::Wrapped);
    }
    match param_count {
        0 => Ok(RequestPlan::Empty),
        1 => Ok(RequestPlan::Single),
        n => Err(AmbiguousRequest { param_count: n }),
    }
}

/// `wraps_property` takes precedence over emptiness.
#[must_use]
pub fn plan_response(shape: MessageShape) -> ResponsePlan {
    if shape.wraps_property {
        ResponsePlan::Wrapped
    } else if shape.is_empty {
        ResponsePlan::Empty
    } else {
        ResponsePlan::Direct
    }
}

/// Providers bind both response codecs; consumers bind the deserializer,
/// mirroring their request serializer.
#[must_use]
pub fn response_codecs(role: Role) -> ResponseCodecs {
    match role {
        Role::Provider => ResponseCodecs {
            serializer: true,
            deserializer: true,
        },
        Role::Consumer => ResponseCodecs {
            serializer: false,
            deserializer: true,
        },
    }
}

/// # Errors
///
/// Returns `AmbiguousRequest` when the request side cannot be planned.
pub fn plan(
    role: Role,
    request: MessageShape,
    response: MessageShape,
    param_count: usize,
) -> Result<BindingPlan, AmbiguousRequest> {
    Ok(BindingPlan {
        role,
        request: plan_request(request, param_count)?,
        response: plan_response(response),
        response_codecs: response_codecs(role),
    })
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    const PLAIN: MessageShape = MessageShape {
        wraps_arguments: false,
        wraps_property: false,
        is_empty: false,
    };

    fn shape(wraps_arguments: bool, wraps_property: bool, is_empty: bool) -> MessageShape {
        MessageShape {
            wraps_arguments,
            wraps_property,
            is_empty,
        }
    }

    #[test]
    fn unwrapped_request_by_parameter_count() {
        assert_eq!(plan_request(PLAIN, 0), Ok(RequestPlan::Empty));
        assert_eq!(plan_request(PLAIN, 1), Ok(RequestPlan::Single));
        assert_eq!(
            plan_request(PLAIN, 2),
            Err(AmbiguousRequest { param_count: 2 })
        );
    }

    #[test]
    fn response_precedence() {
        assert_eq!(plan_response(shape(false, true, true)), ResponsePlan::Wrapped);
        assert_eq!(plan_response(shape(false, false, true)), ResponsePlan::Empty);
        assert_eq!(plan_response(PLAIN), ResponsePlan::Direct);
    }

    #[test]
    fn response_codecs_per_role() {
        assert_eq!(
            response_codecs(Role::Provider),
            ResponseCodecs {
                serializer: true,
                deserializer: true
            }
        );
        assert_eq!(
            response_codecs(Role::Consumer),
            ResponseCodecs {
                serializer: false,
                deserializer: true
            }
        );
    }

    #[test]
    fn echo_plan() {
        let p = plan(Role::Provider, PLAIN, PLAIN, 0).unwrap();
        assert_eq!(p.request, RequestPlan::Empty);
        assert_eq!(p.response, ResponsePlan::Direct);
        assert!(!p.request.is_wrap());
        assert!(!p.response.is_wrap());
    }

    proptest! {
        #[test]
        fn wrapped_request_ignores_parameter_count(
            count in 0usize..64,
            wraps_property in any::<bool>(),
            is_empty in any::<bool>(),
        ) {
            let s = shape(true, wraps_property, is_empty);
            prop_assert_eq!(plan_request(s, count), Ok(RequestPlan::Wrapped));
        }

        #[test]
        fn unwrapped_multi_parameter_request_always_fails(
            count in 2usize..64,
            role in prop_oneof![Just(Role::Consumer), Just(Role::Provider)],
            is_empty in any::<bool>(),
        ) {
            let s = shape(false, false, is_empty);
            prop_assert_eq!(
                plan(role, s, PLAIN, count),
                Err(AmbiguousRequest { param_count: count })
            );
        }

        #[test]
        fn response_plan_wraps_iff_wraps_property(
            wraps_arguments in any::<bool>(),
            wraps_property in any::<bool>(),
            is_empty in any::<bool>(),
        ) {
            let p = plan_response(shape(wraps_arguments, wraps_property, is_empty));
            prop_assert_eq!(p.is_wrap(), wraps_property);
        }
    }
}
