//! Core types and structures for pocketchat
//!
//! This crate provides the data model shared by the chat core and both
//! front ends: messages, conversations, the theme preference and the
//! runtime configuration.

use serde::{Deserialize, Serialize};
use std::time::Duration;

// ============================================================================
// Constants
// ============================================================================

/// Storage key holding the serialized conversation collection
pub const DEFAULT_CONVERSATIONS_KEY: &str = "chat-conversations";

/// Storage key holding the theme preference
pub const DEFAULT_THEME_KEY: &str = "theme";

/// Simulated round-trip latency of an assistant reply
pub const DEFAULT_REPLY_DELAY_MS: u64 = 1500;

/// Number of characters of the first message used for a conversation title
pub const DEFAULT_TITLE_MAX_CHARS: usize = 20;

/// Marker appended to every conversation title
pub const DEFAULT_TITLE_SUFFIX: &str = "...";

// ============================================================================
// Message Types
// ============================================================================

/// Author of a message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    User,
    Assistant,
}

impl Sender {
    pub fn as_str(&self) -> &'static str {
        match self {
            Sender::User => "user",
            Sender::Assistant => "assistant",
        }
    }
}

impl std::fmt::Display for Sender {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What a message's content holds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageKind {
    #[default]
    Text,
    /// Content is an image reference (a data URL in the browser, a path on disk)
    Image,
}

/// One turn in a conversation. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub content: String,
    pub sender: Sender,
    #[serde(rename = "type", alias = "kind", default)]
    pub kind: MessageKind,
}

impl Message {
    pub fn new(content: impl Into<String>, sender: Sender, kind: MessageKind) -> Self {
        Self {
            content: content.into(),
            sender,
            kind,
        }
    }

    pub fn user_text(content: impl Into<String>) -> Self {
        Self::new(content, Sender::User, MessageKind::Text)
    }

    pub fn user_image(reference: impl Into<String>) -> Self {
        Self::new(reference, Sender::User, MessageKind::Image)
    }

    pub fn assistant_text(content: impl Into<String>) -> Self {
        Self::new(content, Sender::Assistant, MessageKind::Text)
    }

    pub fn is_image(&self) -> bool {
        self.kind == MessageKind::Image
    }
}

// ============================================================================
// Conversation Types
// ============================================================================

/// Conversation identifier: the creation time in milliseconds since the epoch
pub type ConversationId = i64;

/// A titled, identified, ordered sequence of messages
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Conversation {
    pub id: ConversationId,
    pub title: String,
    pub messages: Vec<Message>,
}

impl Conversation {
    pub fn new(id: ConversationId, title: String, messages: Vec<Message>) -> Self {
        Self { id, title, messages }
    }

    pub fn message_count(&self) -> usize {
        self.messages.len()
    }
}

/// Build a conversation title from the first message's content.
///
/// Takes the leading `max_chars` characters and always appends `suffix`,
/// even when nothing was cut off.
pub fn derive_title(content: &str, max_chars: usize, suffix: &str) -> String {
    let mut title: String = content.chars().take(max_chars).collect();
    title.push_str(suffix);
    title
}

// ============================================================================
// Theme
// ============================================================================

/// Visual mode preference, persisted verbatim as `"light"` or `"dark"`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Light,
    #[default]
    Dark,
}

impl Theme {
    pub fn as_str(&self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }

    /// Anything other than `"light"` reads as dark.
    pub fn from_stored(value: &str) -> Self {
        if value == "light" {
            Theme::Light
        } else {
            Theme::Dark
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }
}

// ============================================================================
// Configuration
// ============================================================================

fn default_reply_delay_ms() -> u64 {
    DEFAULT_REPLY_DELAY_MS
}

fn default_title_max_chars() -> usize {
    DEFAULT_TITLE_MAX_CHARS
}

fn default_title_suffix() -> String {
    DEFAULT_TITLE_SUFFIX.to_string()
}

fn default_conversations_key() -> String {
    DEFAULT_CONVERSATIONS_KEY.to_string()
}

fn default_theme_key() -> String {
    DEFAULT_THEME_KEY.to_string()
}

/// Runtime configuration shared by both front ends
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatConfig {
    #[serde(default = "default_reply_delay_ms")]
    pub reply_delay_ms: u64,
    #[serde(default = "default_title_max_chars")]
    pub title_max_chars: usize,
    #[serde(default = "default_title_suffix")]
    pub title_suffix: String,
    #[serde(default = "default_conversations_key")]
    pub conversations_key: String,
    #[serde(default = "default_theme_key")]
    pub theme_key: String,
}

impl ChatConfig {
    pub fn reply_delay(&self) -> Duration {
        Duration::from_millis(self.reply_delay_ms)
    }

    pub fn with_reply_delay_ms(mut self, reply_delay_ms: u64) -> Self {
        self.reply_delay_ms = reply_delay_ms;
        self
    }
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            reply_delay_ms: default_reply_delay_ms(),
            title_max_chars: default_title_max_chars(),
            title_suffix: default_title_suffix(),
            conversations_key: default_conversations_key(),
            theme_key: default_theme_key(),
        }
    }
}
