use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Speaker {
    #[serde(rename = "user")]
    User,
    #[serde(rename = "model")]
    Assistant,
}

/// One message of a conversation. Immutable once appended to a transcript.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Turn {
    #[serde(rename = "role")]
    pub speaker: Speaker,
    pub text: String,
}

impl Turn {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            speaker: Speaker::User,
            text: text.into(),
        }
    }

    pub fn assistant(text: impl Into<String>) -> Self {
        Self {
            speaker: Speaker::Assistant,
            text: text.into(),
        }
    }
}

/// Which backend path produced a chat reply. Only drives the source badge.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ReplyProvenance {
    Dataset,
    Ai,
    Error,
}

impl ReplyProvenance {
    pub fn badge(&self) -> &'static str {
        match self {
            ReplyProvenance::Dataset => "Local ML",
            ReplyProvenance::Ai => "Gemini AI",
            ReplyProvenance::Error => "Offline",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChatReply {
    pub text: String,
    pub source: ReplyProvenance,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f32>,
}
