//! Message content unions and the typed content parts they carry.
//!
//! Every union keeps an explicit `Null` variant so `"content": null` is
//! distinguishable from `""`, `[]` and an absent key.

use std::borrow::Cow;

use serde::{Deserialize, Deserializer, Serialize};

use super::discriminator::{decode_variant, peek_tag, unknown};
use super::union::{decode_element, decode_string, deserialize_raw, skip_leading_whitespace};
use crate::error::SchemaError;

const CONTENT: &str = "content";

fn is_null_literal(data: &[u8], idx: usize) -> bool {
    data[idx..].starts_with(b"null")
}

// ---------------------------------------------------------------------------
// Parts
// ---------------------------------------------------------------------------

/// `{"type":"text","text":...}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextPart {
    pub text: String,
    #[serde(rename = "type", default, skip_serializing_if = "String::is_empty")]
    pub type_: String,
}

impl TextPart {
    #[must_use]
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            type_: "text".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageUrl {
    pub url: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub detail: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageUrlPart {
    pub image_url: ImageUrl,
    #[serde(rename = "type")]
    pub type_: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputAudio {
    pub data: String,
    #[serde(default)]
    pub format: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputAudioPart {
    pub input_audio: InputAudio,
    #[serde(rename = "type")]
    pub type_: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_data: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilePart {
    pub file: FileData,
    #[serde(rename = "type")]
    pub type_: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefusalPart {
    pub refusal: String,
    #[serde(rename = "type")]
    pub type_: String,
}

/// A part of user message content, selected by its `type` tag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum UserContentPart {
    Text(TextPart),
    ImageUrl(ImageUrlPart),
    InputAudio(InputAudioPart),
    File(FilePart),
}

impl UserContentPart {
    const KIND: &'static str = "content part";

    /// # Errors
    ///
    /// Returns a discriminator error when `type` is missing or unknown, or a
    /// shape error when the selected part does not decode.
    pub fn decode(bytes: &[u8]) -> Result<Self, SchemaError> {
        let tag = peek_tag(bytes, Self::KIND, "type")?;
        match tag.as_ref() {
            "text" => decode_variant(bytes, Self::KIND, "text").map(Self::Text),
            "image_url" => decode_variant(bytes, Self::KIND, "image_url").map(Self::ImageUrl),
            "input_audio" => {
                decode_variant(bytes, Self::KIND, "input_audio").map(Self::InputAudio)
            }
            "file" => decode_variant(bytes, Self::KIND, "file").map(Self::File),
            other => Err(unknown(Self::KIND, other)),
        }
    }
}

impl<'de> Deserialize<'de> for UserContentPart {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserialize_raw(deserializer, Self::decode)
    }
}

/// A part of assistant message content, selected by its `type` tag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum AssistantContentPart {
    Text(TextPart),
    Refusal(RefusalPart),
}

impl AssistantContentPart {
    const KIND: &'static str = "assistant content part";

    /// # Errors
    ///
    /// Returns a discriminator error when `type` is missing or unknown.
    pub fn decode(bytes: &[u8]) -> Result<Self, SchemaError> {
        let tag = peek_tag(bytes, Self::KIND, "type")?;
        match tag.as_ref() {
            "text" => decode_variant(bytes, Self::KIND, "text").map(Self::Text),
            "refusal" => decode_variant(bytes, Self::KIND, "refusal").map(Self::Refusal),
            other => Err(unknown(Self::KIND, other)),
        }
    }

    #[must_use]
    pub fn text(&self) -> Option<&str> {
        match self {
            Self::Text(part) => Some(&part.text),
            Self::Refusal(_) => None,
        }
    }
}

impl<'de> Deserialize<'de> for AssistantContentPart {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserialize_raw(deserializer, Self::decode)
    }
}

// ---------------------------------------------------------------------------
// ContentUnion (system / developer / tool)
// ---------------------------------------------------------------------------

/// Content of system, developer and tool messages: text or text parts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ContentUnion {
    Null,
    Text(String),
    Parts(Vec<TextPart>),
}

impl ContentUnion {
    /// # Errors
    ///
    /// Returns a shape error naming the `content` field.
    pub fn decode(data: &[u8]) -> Result<Self, SchemaError> {
        let idx = skip_leading_whitespace(CONTENT, data, 0)?;
        match data[idx] {
            b'n' if is_null_literal(data, idx) => Ok(Self::Null),
            b'"' => decode_string(CONTENT, &data[idx..]).map(Self::Text),
            b'[' => decode_element(CONTENT, "array of text parts", &data[idx..]).map(Self::Parts),
            _ => Err(SchemaError::InvalidType {
                field: CONTENT,
                expected: "string or array of text parts",
            }),
        }
    }

    /// Plain text view: parts are joined without a separator. The array
    /// shape itself is kept for re-encoding.
    #[must_use]
    pub fn text(&self) -> Cow<'_, str> {
        match self {
            Self::Null => Cow::Borrowed(""),
            Self::Text(text) => Cow::Borrowed(text),
            Self::Parts(parts) => join_texts(parts.iter().map(|p| p.text.as_str())),
        }
    }
}

impl From<&str> for ContentUnion {
    fn from(text: &str) -> Self {
        Self::Text(text.to_owned())
    }
}

impl<'de> Deserialize<'de> for ContentUnion {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserialize_raw(deserializer, Self::decode)
    }
}

fn join_texts<'a>(mut texts: impl Iterator<Item = &'a str>) -> Cow<'a, str> {
    let Some(first) = texts.next() else {
        return Cow::Borrowed("");
    };
    let Some(second) = texts.next() else {
        return Cow::Borrowed(first);
    };
    let mut joined = String::with_capacity(first.len() + second.len());
    joined.push_str(first);
    joined.push_str(second);
    for text in texts {
        joined.push_str(text);
    }
    Cow::Owned(joined)
}

// ---------------------------------------------------------------------------
// UserContent
// ---------------------------------------------------------------------------

/// Content of a user message: text or typed parts (text, image, audio, file).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum UserContent {
    Null,
    Text(String),
    Parts(Vec<UserContentPart>),
}

impl UserContent {
    /// # Errors
    ///
    /// Returns a shape error naming the `content` field, or the part's
    /// discriminator error wrapped in the array decode error.
    pub fn decode(data: &[u8]) -> Result<Self, SchemaError> {
        let idx = skip_leading_whitespace(CONTENT, data, 0)?;
        match data[idx] {
            b'n' if is_null_literal(data, idx) => Ok(Self::Null),
            b'"' => decode_string(CONTENT, &data[idx..]).map(Self::Text),
            b'[' => {
                decode_element(CONTENT, "array of content parts", &data[idx..]).map(Self::Parts)
            }
            _ => Err(SchemaError::InvalidType {
                field: CONTENT,
                expected: "string or array of content parts",
            }),
        }
    }

    /// Typed parts; empty for text and null content.
    #[must_use]
    pub fn parts(&self) -> &[UserContentPart] {
        match self {
            Self::Parts(parts) => parts,
            Self::Null | Self::Text(_) => &[],
        }
    }

    /// Text of the message, skipping non-text parts.
    #[must_use]
    pub fn text(&self) -> Cow<'_, str> {
        match self {
            Self::Null => Cow::Borrowed(""),
            Self::Text(text) => Cow::Borrowed(text),
            Self::Parts(parts) => join_texts(parts.iter().filter_map(|part| match part {
                UserContentPart::Text(text) => Some(text.text.as_str()),
                _ => None,
            })),
        }
    }
}

impl From<&str> for UserContent {
    fn from(text: &str) -> Self {
        Self::Text(text.to_owned())
    }
}

impl<'de> Deserialize<'de> for UserContent {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserialize_raw(deserializer, Self::decode)
    }
}

// ---------------------------------------------------------------------------
// AssistantContent
// ---------------------------------------------------------------------------

/// Content of an assistant message. Besides text and a part array, a single
/// part object is accepted and written back as an object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum AssistantContent {
    Null,
    Text(String),
    Parts(Vec<AssistantContentPart>),
    Part(AssistantContentPart),
}

impl AssistantContent {
    const FIELD: &'static str = "assistant content";

    /// # Errors
    ///
    /// Returns [`SchemaError::Unrecognized`] for scalars other than string
    /// and null, or a shape error when the parts do not decode.
    pub fn decode(data: &[u8]) -> Result<Self, SchemaError> {
        let idx = skip_leading_whitespace(Self::FIELD, data, 0)?;
        match data[idx] {
            b'n' if is_null_literal(data, idx) => Ok(Self::Null),
            b'"' => decode_string(Self::FIELD, &data[idx..]).map(Self::Text),
            b'[' => decode_element(Self::FIELD, "array of content parts", &data[idx..])
                .map(Self::Parts),
            b'{' => AssistantContentPart::decode(&data[idx..]).map(Self::Part),
            _ => Err(SchemaError::Unrecognized {
                expected: "string or assistant content parts",
            }),
        }
    }

    /// Text of the message; refusal parts are skipped.
    #[must_use]
    pub fn text(&self) -> Cow<'_, str> {
        match self {
            Self::Null => Cow::Borrowed(""),
            Self::Text(text) => Cow::Borrowed(text),
            Self::Parts(parts) => join_texts(parts.iter().filter_map(AssistantContentPart::text)),
            Self::Part(part) => Cow::Borrowed(part.text().unwrap_or_default()),
        }
    }
}

impl<'de> Deserialize<'de> for AssistantContent {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserialize_raw(deserializer, Self::decode)
    }
}

/// `deserialize_with` adapter keeping `null` as `Some(AssistantContent::Null)`;
/// pair it with `#[serde(default)]` so an absent key stays `None`.
pub(crate) fn deserialize_present<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<AssistantContent>, D::Error> {
    AssistantContent::deserialize(deserializer).map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_content_union_shapes() {
        let text: ContentUnion = serde_json::from_str(r#""be brief""#).unwrap();
        assert_eq!(text.text(), "be brief");

        let parts: ContentUnion =
            serde_json::from_str(r#"[{"type":"text","text":"a"},{"type":"text","text":"b"}]"#)
                .unwrap();
        assert_eq!(parts.text(), "ab");
        assert_eq!(
            serde_json::to_value(&parts).unwrap(),
            json!([{"text":"a","type":"text"},{"text":"b","type":"text"}])
        );

        let null: ContentUnion = serde_json::from_str("null").unwrap();
        assert_eq!(null, ContentUnion::Null);
        assert_eq!(serde_json::to_string(&null).unwrap(), "null");
    }

    #[test]
    fn test_content_union_rejects_objects() {
        let err = serde_json::from_str::<ContentUnion>(r#"{"text":"x"}"#)
            .unwrap_err()
            .to_string();
        assert!(
            err.contains("invalid content type (must be string or array of text parts)"),
            "{err}"
        );
    }

    #[test]
    fn test_user_parts_dispatch_on_type() {
        let body = json!([
            {"type": "text", "text": "what is this?"},
            {"type": "image_url", "image_url": {"url": "https://example.com/cat.png", "detail": "low"}},
            {"type": "input_audio", "input_audio": {"data": "audio-data"}},
            {"type": "file", "file": {"file_id": "file-123"}}
        ])
        .to_string();
        let content: UserContent = serde_json::from_str(&body).unwrap();

        let parts = content.parts();
        assert_eq!(parts.len(), 4);
        assert!(matches!(parts[0], UserContentPart::Text(_)));
        assert!(
            matches!(&parts[1], UserContentPart::ImageUrl(p) if p.image_url.detail == "low")
        );
        assert!(matches!(parts[2], UserContentPart::InputAudio(_)));
        assert!(
            matches!(&parts[3], UserContentPart::File(p) if p.file.file_id.as_deref() == Some("file-123"))
        );
        assert_eq!(content.text(), "what is this?");
    }

    #[test]
    fn test_input_audio_keeps_empty_format() {
        let part: UserContentPart =
            serde_json::from_str(r#"{"type":"input_audio","input_audio":{"data":"audio-data"}}"#)
                .unwrap();
        assert_eq!(
            serde_json::to_string(&part).unwrap(),
            r#"{"input_audio":{"data":"audio-data","format":""},"type":"input_audio"}"#
        );
    }

    #[test]
    fn test_user_part_discriminator_errors() {
        let missing = UserContentPart::decode(br#"{"text":"hi"}"#).unwrap_err();
        assert_eq!(missing.to_string(), "content part does not have type");

        let unknown = UserContentPart::decode(br#"{"type":"video","video":{}}"#).unwrap_err();
        assert_eq!(unknown.to_string(), "unknown content part type: video");

        let nested = serde_json::from_str::<UserContent>(r#"[{"text":"hi"}]"#)
            .unwrap_err()
            .to_string();
        assert!(nested.contains("content part does not have type"), "{nested}");
    }

    #[test]
    fn test_assistant_content_shapes() {
        let single: AssistantContent =
            serde_json::from_str(r#"{"type":"text","text":"hi"}"#).unwrap();
        assert!(matches!(single, AssistantContent::Part(_)));
        assert_eq!(single.text(), "hi");
        assert_eq!(
            serde_json::to_value(&single).unwrap(),
            json!({"text": "hi", "type": "text"})
        );

        let parts: AssistantContent = serde_json::from_str(
            r#"[{"type":"text","text":"a"},{"type":"refusal","refusal":"no"},{"type":"text","text":"b"}]"#,
        )
        .unwrap();
        assert_eq!(parts.text(), "ab");

        let err = serde_json::from_str::<AssistantContent>("42")
            .unwrap_err()
            .to_string();
        assert!(
            err.contains("cannot unmarshal JSON data as string or assistant content parts"),
            "{err}"
        );
    }
}
