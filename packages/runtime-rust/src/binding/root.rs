//! Root codecs: a raw codec plus the wrap/positional policy resolved at bind time.

use std::sync::Arc;

use opbind_core::{Deserializer, Serializer};

/// Encoder for the top-level message of one side of an operation.
#[derive(Debug, Clone)]
pub struct RootSerializer {
    codec: Arc<dyn Serializer>,
    is_wrap: bool,
    is_positional: bool,
}

impl RootSerializer {
    /// A serializer is never both wrapped and positional.
    #[must_use]
    pub fn new(codec: Arc<dyn Serializer>, is_wrap: bool, is_positional: bool) -> Self {
        debug_assert!(!(is_wrap && is_positional), "wrapped serializer cannot be positional");
        Self {
            codec,
            is_wrap,
            is_positional,
        }
    }

    #[must_use]
    pub fn codec(&self) -> &Arc<dyn Serializer> {
        &self.codec
    }

    /// The entire message is the packed value.
    #[must_use]
    pub fn is_wrap(&self) -> bool {
        self.is_wrap
    }

    /// Exactly one unwrapped value is the message, addressed by position.
    #[must_use]
    pub fn is_positional(&self) -> bool {
        self.is_positional
    }
}

/// Decoder for the top-level message of one side of an operation.
#[derive(Debug, Clone)]
pub struct RootDeserializer {
    codec: Arc<dyn Deserializer>,
    is_wrap: bool,
    single_argument_name: Option<String>,
}

impl RootDeserializer {
    #[must_use]
    pub fn new(
        codec: Arc<dyn Deserializer>,
        is_wrap: bool,
        single_argument_name: Option<String>,
    ) -> Self {
        debug_assert!(
            !(is_wrap && single_argument_name.is_some()),
            "wrapped deserializer cannot name a single argument"
        );
        Self {
            codec,
            is_wrap,
            single_argument_name,
        }
    }

    #[must_use]
    pub fn codec(&self) -> &Arc<dyn Deserializer> {
        &self.codec
    }

    #[must_use]
    pub fn is_wrap(&self) -> bool {
        self.is_wrap
    }

    /// Name of the parameter the decoded message is spread into, when the
    /// request is unwrapped and has exactly one parameter.
    #[must_use]
    pub fn single_argument_name(&self) -> Option<&str> {
        self.single_argument_name.as_deref()
    }
}
