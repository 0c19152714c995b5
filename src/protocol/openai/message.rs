//! Chat messages, discriminated by `role`.
//!
//! The role is peeked from the raw object first; only the selected variant
//! is then decoded, so a malformed tool message never gets a chance to be
//! mistaken for a user message.

use std::borrow::Cow;
use std::fmt;
use std::sync::LazyLock;

use rustc_hash::FxHashMap;
use serde::{Deserialize, Deserializer, Serialize};

use super::content::{deserialize_present, AssistantContent, ContentUnion, UserContent};
use super::discriminator::{decode_variant, peek_tag, unknown};
use super::response::ToolCall;
use super::union::deserialize_raw;
use crate::error::SchemaError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    System,
    Developer,
    User,
    Assistant,
    Tool,
}

impl ChatRole {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            ChatRole::System => "system",
            ChatRole::Developer => "developer",
            ChatRole::User => "user",
            ChatRole::Assistant => "assistant",
            ChatRole::Tool => "tool",
        }
    }
}

impl fmt::Display for ChatRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Variants
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SystemMessage {
    pub content: ContentUnion,
    pub role: ChatRole,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeveloperMessage {
    pub content: ContentUnion,
    pub role: ChatRole,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserMessage {
    pub content: UserContent,
    pub role: ChatRole,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,
}

/// Reference to a previous assistant audio response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AudioRef {
    pub id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssistantMessage {
    pub role: ChatRole,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "deserialize_present"
    )]
    pub content: Option<AssistantContent>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refusal: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tool_calls: Vec<ToolCall>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audio: Option<AudioRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reasoning_content: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolMessage {
    pub content: ContentUnion,
    pub role: ChatRole,
    pub tool_call_id: String,
}

// ---------------------------------------------------------------------------
// ChatMessage
// ---------------------------------------------------------------------------

/// One entry of a chat request's `messages` array.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ChatMessage {
    System(SystemMessage),
    Developer(DeveloperMessage),
    User(UserMessage),
    Assistant(AssistantMessage),
    Tool(ToolMessage),
}

type MessageDecoder = fn(&[u8]) -> Result<ChatMessage, SchemaError>;

const MESSAGE: &str = "message";

static MESSAGE_DECODERS: LazyLock<FxHashMap<&'static str, MessageDecoder>> = LazyLock::new(|| {
    let mut table: FxHashMap<&'static str, MessageDecoder> = FxHashMap::default();
    table.insert("system", |b: &[u8]| {
        decode_variant(b, MESSAGE, "system").map(ChatMessage::System)
    });
    table.insert("developer", |b: &[u8]| {
        decode_variant(b, MESSAGE, "developer").map(ChatMessage::Developer)
    });
    table.insert("user", |b: &[u8]| {
        decode_variant(b, MESSAGE, "user").map(ChatMessage::User)
    });
    table.insert("assistant", |b: &[u8]| {
        decode_variant(b, MESSAGE, "assistant").map(ChatMessage::Assistant)
    });
    table.insert("tool", |b: &[u8]| {
        decode_variant(b, MESSAGE, "tool").map(ChatMessage::Tool)
    });
    table
});

impl ChatMessage {
    /// Decode one message object.
    ///
    /// # Errors
    ///
    /// - `message does not have role` when the role is absent or empty.
    /// - `unknown message type: <role>` for roles outside the known set.
    /// - A shape error when the selected variant does not decode.
    pub fn decode(bytes: &[u8]) -> Result<Self, SchemaError> {
        let role = peek_tag(bytes, MESSAGE, "role")?;
        let decoder = MESSAGE_DECODERS
            .get(role.as_ref())
            .ok_or_else(|| unknown(MESSAGE, &role))?;
        decoder(bytes)
    }

    #[must_use]
    pub fn system(content: impl Into<ContentUnion>) -> Self {
        Self::System(SystemMessage {
            content: content.into(),
            role: ChatRole::System,
            name: String::new(),
        })
    }

    #[must_use]
    pub fn user(content: impl Into<UserContent>) -> Self {
        Self::User(UserMessage {
            content: content.into(),
            role: ChatRole::User,
            name: String::new(),
        })
    }

    #[must_use]
    pub fn assistant(text: impl Into<String>) -> Self {
        Self::Assistant(AssistantMessage {
            role: ChatRole::Assistant,
            content: Some(AssistantContent::Text(text.into())),
            name: String::new(),
            refusal: None,
            tool_calls: Vec::new(),
            audio: None,
            reasoning_content: None,
        })
    }

    #[must_use]
    pub fn tool(tool_call_id: impl Into<String>, content: impl Into<ContentUnion>) -> Self {
        Self::Tool(ToolMessage {
            content: content.into(),
            role: ChatRole::Tool,
            tool_call_id: tool_call_id.into(),
        })
    }

    /// The role implied by the variant.
    #[must_use]
    pub fn role(&self) -> ChatRole {
        match self {
            ChatMessage::System(_) => ChatRole::System,
            ChatMessage::Developer(_) => ChatRole::Developer,
            ChatMessage::User(_) => ChatRole::User,
            ChatMessage::Assistant(_) => ChatRole::Assistant,
            ChatMessage::Tool(_) => ChatRole::Tool,
        }
    }

    /// Plain text of the message content; non-text parts are skipped.
    #[must_use]
    pub fn text_content(&self) -> Cow<'_, str> {
        match self {
            ChatMessage::System(m) => m.content.text(),
            ChatMessage::Developer(m) => m.content.text(),
            ChatMessage::Tool(m) => m.content.text(),
            ChatMessage::User(m) => m.content.text(),
            ChatMessage::Assistant(m) => m
                .content
                .as_ref()
                .map_or(Cow::Borrowed(""), AssistantContent::text),
        }
    }
}

impl<'de> Deserialize<'de> for ChatMessage {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserialize_raw(deserializer, Self::decode)
    }
}
