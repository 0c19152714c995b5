//! Fast decoding for fields that accept several JSON shapes.
//!
//! Instead of trying every candidate type until one sticks, the decoder looks
//! at the first significant byte (and, for arrays, the first element) and runs
//! exactly one typed decode. Encoding is the derived `untagged` form, so a
//! value is written back in the shape it arrived in.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::value::RawValue;

use crate::error::SchemaError;
use crate::json_scan::{skip_ws, unquote_fast};

/// Skip JSON whitespace starting at `idx`, failing when nothing is left.
///
/// # Errors
///
/// Returns [`SchemaError::Truncated`] when only whitespace remains.
pub fn skip_leading_whitespace(
    field: &'static str,
    data: &[u8],
    idx: usize,
) -> Result<usize, SchemaError> {
    let i = skip_ws(data, idx);
    if i >= data.len() {
        return Err(SchemaError::Truncated { field });
    }
    Ok(i)
}

/// Decode a JSON string literal, trying the allocation-light unquote first
/// and falling back to `serde_json` for escapes it does not handle.
pub(crate) fn decode_string(field: &'static str, literal: &[u8]) -> Result<String, SchemaError> {
    if let Some(text) = unquote_fast(literal) {
        return Ok(text);
    }
    decode_element(field, "string", literal)
}

pub(crate) fn decode_element<T: DeserializeOwned>(
    field: &'static str,
    shape: &'static str,
    data: &[u8],
) -> Result<T, SchemaError> {
    serde_json::from_slice(data).map_err(|source| SchemaError::Element {
        field,
        shape,
        source,
    })
}

/// Capture the raw bytes of the value being deserialized and hand them to a
/// byte-level decoder.
pub(crate) fn deserialize_raw<'de, D, T>(
    deserializer: D,
    decode: impl FnOnce(&[u8]) -> Result<T, SchemaError>,
) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Box::<RawValue>::deserialize(deserializer)?;
    decode(raw.get().as_bytes()).map_err(SchemaError::into_de)
}

// ---------------------------------------------------------------------------
// TextOrTokens
// ---------------------------------------------------------------------------

/// The `prompt` / `input` family: text, a list of texts, a token-id list, or
/// a list of token-id lists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum TextOrTokens {
    Text(String),
    TextArray(Vec<String>),
    Tokens(Vec<i64>),
    TokenArrays(Vec<Vec<i64>>),
}

impl TextOrTokens {
    /// Decode one field value. `field` names the field in error messages.
    ///
    /// An empty array decodes as an empty [`TextOrTokens::TextArray`].
    ///
    /// # Errors
    ///
    /// Returns a shape error naming `field` when the payload is truncated,
    /// has an unsupported top-level type, an unsupported first array element,
    /// or fails the selected typed decode.
    pub fn decode(field: &'static str, data: &[u8]) -> Result<Self, SchemaError> {
        let idx = skip_leading_whitespace(field, data, 0)?;
        match data[idx] {
            b'"' => decode_string(field, &data[idx..]).map(Self::Text),
            b'[' => {
                let first = skip_leading_whitespace(field, data, idx + 1)?;
                let array = &data[idx..];
                match data[first] {
                    b']' => Ok(Self::TextArray(Vec::new())),
                    b'"' => decode_element(field, "[]string", array).map(Self::TextArray),
                    b'[' => decode_element(field, "[][]int64", array).map(Self::TokenArrays),
                    b'-' | b'0'..=b'9' => decode_element(field, "[]int64", array).map(Self::Tokens),
                    _ => Err(SchemaError::InvalidArrayElement { field }),
                }
            }
            _ => Err(SchemaError::InvalidType {
                field,
                expected: "string or array",
            }),
        }
    }

    /// The single text value, if this is the plain-text shape.
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            _ => None,
        }
    }

    /// Number of top-level entries: 1 for text, otherwise the array length.
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Self::Text(_) => 1,
            Self::TextArray(items) => items.len(),
            Self::Tokens(items) => items.len(),
            Self::TokenArrays(items) => items.len(),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl From<&str> for TextOrTokens {
    fn from(text: &str) -> Self {
        Self::Text(text.to_owned())
    }
}

/// `deserialize_with` adapter for a `prompt` field.
///
/// # Errors
///
/// Propagates the prompt shape error as a deserializer error.
pub fn deserialize_prompt<'de, D: Deserializer<'de>>(d: D) -> Result<TextOrTokens, D::Error> {
    deserialize_raw(d, |bytes| TextOrTokens::decode("prompt", bytes))
}

/// `deserialize_with` adapter for an `input` field.
///
/// # Errors
///
/// Propagates the input shape error as a deserializer error.
pub fn deserialize_input<'de, D: Deserializer<'de>>(d: D) -> Result<TextOrTokens, D::Error> {
    deserialize_raw(d, |bytes| TextOrTokens::decode("input", bytes))
}

// ---------------------------------------------------------------------------
// StopUnion
// ---------------------------------------------------------------------------

/// The `stop` field: one stop sequence or several.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum StopUnion {
    Text(String),
    List(Vec<String>),
}

impl StopUnion {
    /// # Errors
    ///
    /// Returns a shape error naming the `stop` field.
    pub fn decode(data: &[u8]) -> Result<Self, SchemaError> {
        const FIELD: &str = "stop";
        let idx = skip_leading_whitespace(FIELD, data, 0)?;
        match data[idx] {
            b'"' => decode_string(FIELD, &data[idx..]).map(Self::Text),
            b'[' => decode_element(FIELD, "[]string", &data[idx..]).map(Self::List),
            _ => Err(SchemaError::InvalidType {
                field: FIELD,
                expected: "string or array",
            }),
        }
    }

    #[must_use]
    pub fn sequences(&self) -> Vec<&str> {
        match self {
            Self::Text(text) => vec![text.as_str()],
            Self::List(items) => items.iter().map(String::as_str).collect(),
        }
    }
}

impl<'de> Deserialize<'de> for StopUnion {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserialize_raw(deserializer, Self::decode)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn prompt(raw: &str) -> Result<TextOrTokens, SchemaError> {
        TextOrTokens::decode("prompt", raw.as_bytes())
    }

    #[test]
    fn test_shape_is_selected_by_first_byte() {
        assert_eq!(prompt(r#""hello""#).unwrap(), TextOrTokens::Text("hello".into()));
        assert_eq!(
            prompt(r#"["a","b"]"#).unwrap(),
            TextOrTokens::TextArray(vec!["a".into(), "b".into()])
        );
        assert_eq!(prompt("[1,2,3]").unwrap(), TextOrTokens::Tokens(vec![1, 2, 3]));
        assert_eq!(prompt("[-1, 0]").unwrap(), TextOrTokens::Tokens(vec![-1, 0]));
        assert_eq!(
            prompt("[[1,2],[3,4]]").unwrap(),
            TextOrTokens::TokenArrays(vec![vec![1, 2], vec![3, 4]])
        );
    }

    #[test]
    fn test_shape_survives_reencode() {
        for raw in [r#""hello""#, r#"["a","b"]"#, "[1,2,3]", "[[1,2],[3,4]]", "[]"] {
            let decoded = prompt(raw).unwrap();
            assert_eq!(serde_json::to_string(&decoded).unwrap(), raw);
        }
    }

    #[test]
    fn test_empty_array_defaults_to_text_array() {
        assert_eq!(prompt(" [ ] ").unwrap(), TextOrTokens::TextArray(Vec::new()));
        assert!(prompt("[]").unwrap().is_empty());
    }

    #[test]
    fn test_leading_whitespace_is_skipped() {
        assert_eq!(
            prompt(" \t\r\n\"x\"").unwrap(),
            TextOrTokens::Text("x".into())
        );
        assert_eq!(prompt("\n[ \"y\" ]").unwrap().len(), 1);
    }

    #[test]
    fn test_escaped_slash_uses_fallback_decoder() {
        assert_eq!(
            prompt(r#""a\/b é""#).unwrap(),
            TextOrTokens::Text("a/b é".into())
        );
    }

    #[test]
    fn test_escaped_path_decodes_to_plain_slashes() {
        assert_eq!(
            prompt(r#""\/path\/to\/file""#).unwrap(),
            TextOrTokens::Text("/path/to/file".into())
        );
        assert_eq!(
            decode_string("prompt", br#""\/path\/to\/file""#).unwrap(),
            "/path/to/file"
        );
    }

    #[test]
    fn test_truncated_input() {
        assert_eq!(prompt("").unwrap_err().to_string(), "truncated prompt data");
        assert_eq!(prompt("   ").unwrap_err().to_string(), "truncated prompt data");
        assert_eq!(prompt("[  ").unwrap_err().to_string(), "truncated prompt data");
        assert_eq!(
            TextOrTokens::decode("input", b"").unwrap_err().to_string(),
            "truncated input data"
        );
    }

    #[test]
    fn test_invalid_types() {
        let err = prompt("123").unwrap_err().to_string();
        assert!(err.contains("invalid prompt type"), "{err}");
        assert_eq!(err, "invalid prompt type (must be string or array)");

        let err = prompt(r#"{"key":"value"}"#).unwrap_err().to_string();
        assert!(err.contains("invalid prompt type"), "{err}");

        assert_eq!(
            prompt("[true]").unwrap_err().to_string(),
            "invalid prompt array element"
        );
        assert_eq!(
            prompt("[{}]").unwrap_err().to_string(),
            "invalid prompt array element"
        );
    }

    #[test]
    fn test_element_errors_name_the_shape() {
        let err = prompt(r#"["a", 1]"#).unwrap_err().to_string();
        assert!(err.starts_with("cannot unmarshal prompt as []string: "), "{err}");

        let err = prompt(r#"[1, "a"]"#).unwrap_err().to_string();
        assert!(err.starts_with("cannot unmarshal prompt as []int64: "), "{err}");

        let err = prompt("[[1], 2]").unwrap_err().to_string();
        assert!(err.starts_with("cannot unmarshal prompt as [][]int64: "), "{err}");

        let err = prompt(r#""unterminated"#).unwrap_err().to_string();
        assert!(err.starts_with("cannot unmarshal prompt as string: "), "{err}");
    }

    #[test]
    fn test_stop_union() {
        let single: StopUnion = serde_json::from_str(r#""\n""#).unwrap();
        assert_eq!(single, StopUnion::Text("\n".into()));
        let many: StopUnion = serde_json::from_str(r#"["END","STOP"]"#).unwrap();
        assert_eq!(many.sequences(), vec!["END", "STOP"]);
        assert_eq!(serde_json::to_string(&many).unwrap(), r#"["END","STOP"]"#);

        let err = serde_json::from_str::<StopUnion>("5").unwrap_err().to_string();
        assert!(err.contains("invalid stop type"), "{err}");
    }
}
