use std::borrow::Cow;

use crate::error::SchemaError;
use crate::json_scan::top_level_text_field;

/// Peek at the tag of a discriminated object without decoding its body.
///
/// An absent or empty tag is reported as missing.
pub(crate) fn peek_tag<'a>(
    bytes: &'a [u8],
    kind: &'static str,
    key: &'static str,
) -> Result<Cow<'a, str>, SchemaError> {
    match top_level_text_field(bytes, key.as_bytes()) {
        Ok(Some(tag)) if !tag.is_empty() => Ok(tag),
        Ok(_) => Err(SchemaError::MissingDiscriminator { kind, key }),
        Err(_) => Err(SchemaError::InvalidType {
            field: kind,
            expected: "object",
        }),
    }
}

/// Decode the full object once its variant is known.
pub(crate) fn decode_variant<T: serde::de::DeserializeOwned>(
    bytes: &[u8],
    kind: &'static str,
    variant: &'static str,
) -> Result<T, SchemaError> {
    serde_json::from_slice(bytes).map_err(|source| SchemaError::Element {
        field: kind,
        shape: variant,
        source,
    })
}

pub(crate) fn unknown(kind: &'static str, tag: &str) -> SchemaError {
    SchemaError::UnknownDiscriminator {
        kind,
        value: tag.to_owned(),
    }
}
