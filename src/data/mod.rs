//! Core data model: configured agents, live sessions, and the status snapshot.
//!
//! Session types mirror the loosely-shaped JSON emitted by
//! `openclaw sessions list --json`. Every field that may be missing on the
//! wire is defaulted here so the rest of the crate never sees an ambiguous shape.

use serde::{Deserialize, Deserializer, Serialize};

/// Sprite used when an agent does not configure one
pub const DEFAULT_SPRITE: &str = "desk-with-pc.png";

/// Title used when the config does not set one
pub const DEFAULT_TITLE: &str = "OpenClaw Virtual Office";

/// Task shown for agents with no matching session
pub const NO_SESSION_TASK: &str = "尚未建立 session";

/// Task shown when a session has no extractable message text
pub const EMPTY_TASK: &str = "...";

/// `lastActive` for agents with no matching session
pub const NO_SESSION_AGE: i64 = -1;

/// `lastActive` for matched sessions without a usable timestamp
pub const UNKNOWN_AGE: i64 = 999;

/// A statically configured agent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentConfig {
    pub id: String,
    pub name: String,
    #[serde(default = "default_sprite")]
    pub sprite: String,
    #[serde(default)]
    pub role: String,
    /// Substring looked up in `key|displayName`; absent means never matches
    #[serde(default)]
    pub session_match: Option<String>,
}

fn default_sprite() -> String {
    DEFAULT_SPRITE.to_string()
}

/// A live session as reported by the OpenClaw CLI.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Session {
    #[serde(deserialize_with = "null_as_default")]
    pub key: String,
    #[serde(deserialize_with = "null_as_default")]
    pub display_name: String,
    /// Milliseconds since epoch
    #[serde(deserialize_with = "lenient_i64")]
    pub updated_at: Option<i64>,
    #[serde(deserialize_with = "lenient_u64")]
    pub total_tokens: Option<u64>,
    /// Chronological, oldest first
    #[serde(deserialize_with = "null_as_default")]
    pub messages: Vec<Message>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Message {
    pub content: MessageContent,
}

impl<'de> Deserialize<'de> for Message {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = serde_json::Value::deserialize(deserializer)?;
        Ok(Message {
            content: MessageContent::from_value(&value["content"]),
        })
    }
}

/// The two content shapes a message can carry, plus a catch-all.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum MessageContent {
    Text(String),
    Blocks(Vec<ContentBlock>),
    #[default]
    Other,
}

impl MessageContent {
    fn from_value(value: &serde_json::Value) -> Self {
        match value {
            serde_json::Value::String(text) => MessageContent::Text(text.clone()),
            serde_json::Value::Array(entries) => {
                MessageContent::Blocks(entries.iter().map(ContentBlock::from_value).collect())
            }
            _ => MessageContent::Other,
        }
    }
}

impl<'de> Deserialize<'de> for MessageContent {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = serde_json::Value::deserialize(deserializer)?;
        Ok(Self::from_value(&value))
    }
}

/// One entry of a structured message body.
///
/// Only text blocks carry anything the dashboard uses; every other entry
/// (images, tool calls, stray scalars) collapses to `Other`.
#[derive(Debug, Clone, PartialEq)]
pub enum ContentBlock {
    Text { text: String },
    Other,
}

impl ContentBlock {
    fn from_value(value: &serde_json::Value) -> Self {
        match (value["type"].as_str(), value["text"].as_str()) {
            (Some("text"), Some(text)) => ContentBlock::Text {
                text: text.to_string(),
            },
            _ => ContentBlock::Other,
        }
    }
}

impl<'de> Deserialize<'de> for ContentBlock {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = serde_json::Value::deserialize(deserializer)?;
        Ok(Self::from_value(&value))
    }
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Integer field that may arrive as a float; anything unusable becomes `None`.
fn lenient_i64<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<i64>, D::Error> {
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(value.as_i64().or_else(|| {
        value
            .as_f64()
            .filter(|f| f.is_finite())
            .map(|f| f.trunc() as i64)
    }))
}

fn lenient_u64<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<u64>, D::Error> {
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(value.as_u64().or_else(|| {
        value
            .as_f64()
            .filter(|f| f.is_finite() && *f >= 0.0)
            .map(|f| f.trunc() as u64)
    }))
}

/// Activity category derived from session recency
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AgentStatus {
    Busy,
    Online,
    Idle,
    Offline,
}

impl AgentStatus {
    pub fn is_active(&self) -> bool {
        !matches!(self, Self::Offline)
    }
}

/// One agent's entry in the snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentStatusRecord {
    pub id: String,
    pub name: String,
    pub sprite: String,
    pub role: String,
    pub status: AgentStatus,
    pub task: String,
    /// Minutes since last update, or `NO_SESSION_AGE` / `UNKNOWN_AGE`
    pub last_active: i64,
    pub session: Option<String>,
    pub tokens: u64,
}

/// The full output of one poll. Replaces the previous snapshot wholesale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub title: String,
    /// Capture time in milliseconds since epoch
    pub timestamp: i64,
    pub agents: Vec<AgentStatusRecord>,
}

impl Snapshot {
    /// Number of agents not currently offline
    pub fn active_count(&self) -> usize {
        self.agents.iter().filter(|a| a.status.is_active()).count()
    }
}
