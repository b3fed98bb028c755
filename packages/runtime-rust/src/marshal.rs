//! Packing and unpacking of call values with resolved root codecs.
//!
//! The root codec flags decide the envelope:
//!
//! | codec                       | wrap                    | unwrapped                          |
//! |-----------------------------|-------------------------|------------------------------------|
//! | request serializer          | argument map = message  | positional arg = message, or empty |
//! | request deserializer        | message = argument map  | `{name: message}`, or no arguments |
//! | response serializer         | `{value: result}`       | result = message                   |
//! | response deserializer       | `value` field           | message (field-less message = `Null`) |
//!
//! A direct response to a message that declares fields has no way to carry
//! `Null`: it encodes to zero bytes and decodes as the empty map.

use std::collections::BTreeMap;

use opbind_core::{Arguments, Value, WRAP_PROPERTY_FIELD};

use crate::binding::{RootDeserializer, RootSerializer};
use crate::error::MarshalError;

/// Encodes a consumer's argument set into a request message.
///
/// # Errors
///
/// - `MarshalError::PositionalArity` if a positional request does not get exactly one argument.
/// - `MarshalError::Codec` if the codec rejects the value.
pub fn encode_request(
    serializer: &RootSerializer,
    arguments: &Arguments,
) -> Result<Vec<u8>, MarshalError> {
    let message = if serializer.is_wrap() {
        Value::Map(arguments.clone())
    } else if serializer.is_positional() {
        let mut values = arguments.values();
        match (values.next(), values.next()) {
            (Some(only), None) => only.clone(),
            _ => {
                return Err(MarshalError::PositionalArity {
                    count: arguments.len(),
                })
            }
        }
    } else {
        Value::Null
    };
    Ok(serializer.codec().serialize(&message)?)
}

/// Decodes a request message into the provider's argument set.
///
/// # Errors
///
/// - `MarshalError::Codec` if the bytes cannot be decoded.
/// - `MarshalError::NotAMessage` if a wrapped request does not decode to a map.
pub fn decode_request(
    deserializer: &RootDeserializer,
    bytes: &[u8],
) -> Result<Arguments, MarshalError> {
    let decoded = deserializer.codec().deserialize(bytes)?;
    if deserializer.is_wrap() {
        return match decoded {
            Value::Map(fields) => Ok(fields),
            other => Err(MarshalError::NotAMessage {
                what: "wrapped request",
                found: other.kind(),
            }),
        };
    }
    let mut arguments = BTreeMap::new();
    if let Some(name) = deserializer.single_argument_name() {
        arguments.insert(name.to_string(), decoded);
    }
    Ok(arguments)
}

/// Encodes a provider's success result into a response message.
///
/// # Errors
///
/// Returns `MarshalError::Codec` if the codec rejects the value.
pub fn encode_response(serializer: &RootSerializer, result: &Value) -> Result<Vec<u8>, MarshalError> {
    if serializer.is_wrap() {
        let wrapped = Value::map([(WRAP_PROPERTY_FIELD, result.clone())]);
        return Ok(serializer.codec().serialize(&wrapped)?);
    }
    Ok(serializer.codec().serialize(result)?)
}

/// Decodes a success response message into the call's result.
///
/// # Errors
///
/// - `MarshalError::Codec` if the bytes cannot be decoded.
/// - `MarshalError::NotAMessage` if a wrapped response does not decode to a map.
pub fn decode_response(deserializer: &RootDeserializer, bytes: &[u8]) -> Result<Value, MarshalError> {
    let decoded = deserializer.codec().deserialize(bytes)?;
    if deserializer.is_wrap() {
        return match decoded {
            Value::Map(mut fields) => Ok(fields.remove(WRAP_PROPERTY_FIELD).unwrap_or(Value::Null)),
            other => Err(MarshalError::NotAMessage {
                what: "wrapped response",
                found: other.kind(),
            }),
        };
    }
    if deserializer.codec().message().fields.is_empty() {
        return Ok(Value::Null);
    }
    Ok(decoded)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use opbind_core::{
        MessageDescriptor, OperationDescriptor, ResponseTypes, Role, TaggedMapper, TypeRef,
        ANNOTATION_WRAP_ARGUMENTS, ANNOTATION_WRAP_PROPERTY,
    };

    use super::*;
    use crate::binding::{CodecBinder, OperationBinding};

    fn user_message() -> MessageDescriptor {
        MessageDescriptor::new("User")
            .with_field("name", 1, TypeRef::String)
            .with_field("age", 2, TypeRef::Int)
    }

    fn mapper() -> TaggedMapper {
        TaggedMapper::new()
            .with_operation(
                "add",
                MessageDescriptor::new("AddRequest")
                    .with_annotation(ANNOTATION_WRAP_ARGUMENTS)
                    .with_field("a", 1, TypeRef::Int)
                    .with_field("b", 2, TypeRef::Int),
                MessageDescriptor::new("IntResult")
                    .with_annotation(ANNOTATION_WRAP_PROPERTY)
                    .with_field(WRAP_PROPERTY_FIELD, 1, TypeRef::Int),
            )
            .with_operation("saveUser", user_message(), user_message())
            .with_operation(
                "ping",
                MessageDescriptor::new("PingRequest"),
                MessageDescriptor::new("Empty"),
            )
    }

    fn operation(role: Role, id: &str, params: &[(&str, TypeRef)], result: TypeRef) -> Arc<OperationDescriptor> {
        let mut by_status = BTreeMap::new();
        by_status.insert(200, result);
        Arc::new(OperationDescriptor::new(
            "demo",
            "DemoEndpoint",
            id,
            role,
            params
                .iter()
                .map(|(n, t)| opbind_core::ParamDescriptor::new(*n, t.clone()))
                .collect(),
            ResponseTypes::new(by_status, None),
        ))
    }

    fn pair(id: &str, params: &[(&str, TypeRef)], result: TypeRef) -> (OperationBinding, OperationBinding) {
        let binder = CodecBinder::new();
        let mapper = mapper();
        let consumer = binder
            .bind_operation(&operation(Role::Consumer, id, params, result.clone()), &mapper)
            .unwrap();
        let provider = binder
            .bind_operation(&operation(Role::Provider, id, params, result), &mapper)
            .unwrap();
        (consumer, provider)
    }

    #[test]
    fn wrapped_arguments_travel_as_one_envelope() {
        let (consumer, provider) = pair("add", &[("a", TypeRef::Int), ("b", TypeRef::Int)], TypeRef::Int);
        let args: Arguments = [("a".to_string(), Value::Int(2)), ("b".to_string(), Value::Int(3))]
            .into_iter()
            .collect();

        let bytes = encode_request(consumer.request_serializer().unwrap(), &args).unwrap();
        let decoded = decode_request(provider.request_deserializer().unwrap(), &bytes).unwrap();
        assert_eq!(decoded, args);

        let response = encode_response(
            provider.find_response_serializer(200).unwrap(),
            &Value::Int(5),
        )
        .unwrap();
        let result = decode_response(consumer.find_response_deserializer(200).unwrap(), &response).unwrap();
        assert_eq!(result, Value::Int(5));
    }

    #[test]
    fn positional_argument_is_the_message() {
        let user = TypeRef::Message("User".to_string());
        let (consumer, provider) = pair("saveUser", &[("user", user.clone())], user);
        let alice = Value::map([("name", Value::from("alice")), ("age", Value::Int(30))]);
        let args: Arguments = [("user".to_string(), alice.clone())].into_iter().collect();

        let bytes = encode_request(consumer.request_serializer().unwrap(), &args).unwrap();

        // The same bytes decode directly as a User message.
        let as_user = provider
            .request_deserializer()
            .unwrap()
            .codec()
            .deserialize(&bytes)
            .unwrap();
        assert_eq!(as_user, alice);

        let decoded = decode_request(provider.request_deserializer().unwrap(), &bytes).unwrap();
        assert_eq!(decoded.get("user"), Some(&alice));

        let response = encode_response(provider.find_response_serializer(200).unwrap(), &alice).unwrap();
        let result = decode_response(consumer.find_response_deserializer(200).unwrap(), &response).unwrap();
        assert_eq!(result, alice);
    }

    #[test]
    fn positional_request_rejects_wrong_arity() {
        let user = TypeRef::Message("User".to_string());
        let (consumer, _) = pair("saveUser", &[("user", user.clone())], user);
        let err = encode_request(consumer.request_serializer().unwrap(), &Arguments::new()).unwrap_err();
        assert!(matches!(err, MarshalError::PositionalArity { count: 0 }));
    }

    #[test]
    fn empty_request_and_void_response() {
        let (consumer, provider) = pair("ping", &[], TypeRef::Any);

        let bytes = encode_request(consumer.request_serializer().unwrap(), &Arguments::new()).unwrap();
        assert!(bytes.is_empty());
        let decoded = decode_request(provider.request_deserializer().unwrap(), &bytes).unwrap();
        assert!(decoded.is_empty());

        let response = encode_response(provider.find_response_serializer(200).unwrap(), &Value::Null).unwrap();
        assert!(response.is_empty());
        let result = decode_response(consumer.find_response_deserializer(200).unwrap(), &response).unwrap();
        assert_eq!(result, Value::Null);
    }

    #[test]
    fn wrapped_response_with_missing_value_is_null() {
        let (consumer, _) = pair("add", &[("a", TypeRef::Int), ("b", TypeRef::Int)], TypeRef::Int);
        let result = decode_response(consumer.find_response_deserializer(200).unwrap(), &[]).unwrap();
        assert_eq!(result, Value::Null);
    }

    #[test]
    fn null_through_direct_response_arrives_as_empty_message() {
        let user = TypeRef::Message("User".to_string());
        let (consumer, provider) = pair("saveUser", &[("user", user.clone())], user);

        let response = encode_response(provider.find_response_serializer(200).unwrap(), &Value::Null).unwrap();
        assert!(response.is_empty());
        let result = decode_response(consumer.find_response_deserializer(200).unwrap(), &response).unwrap();
        assert_eq!(result, Value::Map(BTreeMap::new()));
    }
}
