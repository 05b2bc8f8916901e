//! Persisted advisor conversation summaries.

use crate::child::AgeLevel;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A previously persisted advisor conversation, as listed in the
/// history sidebar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationSummary {
    /// Unique conversation identifier
    pub id: Uuid,
    /// The child the conversation is scoped to
    pub child_id: Uuid,
    /// When the conversation was created
    pub created_at: DateTime<Utc>,
    /// Session pinned as discussion context, if any
    #[serde(default)]
    pub focus_session_id: Option<Uuid>,
    /// Child display name, denormalized for the sidebar
    pub child_name: String,
    /// Child age band, denormalized for the sidebar
    pub child_age_level: AgeLevel,
    /// Number of persisted turns
    pub message_count: usize,
}
