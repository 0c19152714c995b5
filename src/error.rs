/// Error type shared by every decoder in the schema layer.
///
/// Messages are part of the wire contract: gateway callers surface them
/// verbatim in 400 responses, so the texts below are stable.
#[derive(Debug, thiserror::Error)]
pub enum SchemaError {
    #[error("truncated {field} data")]
    Truncated { field: &'static str },
    #[error("invalid {field} type (must be {expected})")]
    InvalidType {
        field: &'static str,
        expected: &'static str,
    },
    #[error("invalid {field} array element")]
    InvalidArrayElement { field: &'static str },
    #[error("cannot unmarshal {field} as {shape}: {source}")]
    Element {
        field: &'static str,
        shape: &'static str,
        #[source]
        source: serde_json::Error,
    },
    #[error("cannot unmarshal JSON data as {expected}")]
    Unrecognized { expected: &'static str },
    #[error("{kind} does not have {key}")]
    MissingDiscriminator {
        kind: &'static str,
        key: &'static str,
    },
    #[error("unknown {kind} type: {value}")]
    UnknownDiscriminator { kind: &'static str, value: String },
    #[error("failed to unmarshal chunk: {0}")]
    Chunk(#[source] serde_json::Error),
    #[error("invalid JSON body: {0}")]
    Json(#[from] serde_json::Error),
}

/// Broad error category, used by callers to pick a log level or metric label.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// The payload is not one of the shapes a field accepts.
    Shape,
    /// A discriminated object is missing its tag or carries an unknown one.
    Discriminator,
    /// A streamed fragment could not be decoded.
    StreamFraming,
}

impl SchemaError {
    #[must_use]
    pub fn category(&self) -> ErrorCategory {
        match self {
            SchemaError::Truncated { .. }
            | SchemaError::InvalidType { .. }
            | SchemaError::InvalidArrayElement { .. }
            | SchemaError::Element { .. }
            | SchemaError::Unrecognized { .. }
            | SchemaError::Json(_) => ErrorCategory::Shape,
            SchemaError::MissingDiscriminator { .. } | SchemaError::UnknownDiscriminator { .. } => {
                ErrorCategory::Discriminator
            }
            SchemaError::Chunk(_) => ErrorCategory::StreamFraming,
        }
    }

    /// Convert into a deserializer error, keeping the message text intact.
    pub(crate) fn into_de<E: serde::de::Error>(self) -> E {
        E::custom(self)
    }
}
