//! Transcript message types.
//!
//! The displayed transcript mixes three sources: messages the server
//! returned, messages the parent authored locally (which may still be in
//! flight), and client-generated notices. Each gets its own variant so
//! rendering and any future export logic can tell "the advisor said this"
//! apart from "the widget informed you of a local event".

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Represents the role of a server-sourced message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    /// Message from the parent.
    User,
    /// Message from the advisor.
    Assistant,
}

/// A single server-sourced message in an advisor conversation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// The role of the message sender.
    pub role: MessageRole,
    /// The content of the message.
    pub content: String,
    /// Timestamp when the message was created, if the server provided one.
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// Delivery state of a locally-authored message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeliveryState {
    /// Appended optimistically; the send request is still in flight.
    Pending,
    /// The backend acknowledged the send.
    Confirmed,
    /// The send failed; the message was never persisted server-side.
    Failed,
}

/// Kind of a client-generated notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoticeKind {
    Info,
    Error,
}

/// One entry in the displayed transcript.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TranscriptEntry {
    /// A message the server returned (loaded history or an advisor reply).
    Remote(ChatMessage),
    /// A parent-authored message with explicit delivery reconciliation.
    Outbound {
        content: String,
        delivery: DeliveryState,
    },
    /// A client-generated notice (focus changes, local failures).
    Notice { kind: NoticeKind, content: String },
}

impl TranscriptEntry {
    /// Creates an optimistic outbound entry for a just-sent message.
    pub fn outbound(content: impl Into<String>) -> Self {
        Self::Outbound {
            content: content.into(),
            delivery: DeliveryState::Pending,
        }
    }

    /// Creates an informational notice.
    pub fn info(content: impl Into<String>) -> Self {
        Self::Notice {
            kind: NoticeKind::Info,
            content: content.into(),
        }
    }

    /// Creates an error notice.
    pub fn error(content: impl Into<String>) -> Self {
        Self::Notice {
            kind: NoticeKind::Error,
            content: content.into(),
        }
    }

    /// The displayable text of this entry.
    pub fn content(&self) -> &str {
        match self {
            Self::Remote(message) => &message.content,
            Self::Outbound { content, .. } => content,
            Self::Notice { content, .. } => content,
        }
    }

    /// True for entries rendered on the parent's side of the transcript.
    pub fn is_from_parent(&self) -> bool {
        match self {
            Self::Remote(message) => message.role == MessageRole::User,
            Self::Outbound { .. } => true,
            Self::Notice { .. } => false,
        }
    }

    /// True if this is an outbound entry still awaiting confirmation.
    pub fn is_pending(&self) -> bool {
        matches!(
            self,
            Self::Outbound {
                delivery: DeliveryState::Pending,
                ..
            }
        )
    }
}
