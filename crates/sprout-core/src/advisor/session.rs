//! Learning session summaries.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A past learning session belonging to one child.
///
/// Used only as a selectable focus context for advisor conversations;
/// the advisor subsystem never mutates sessions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSummary {
    /// Unique session identifier
    pub session_id: Uuid,
    /// The concept the session covered
    pub concept: String,
    /// When the session started
    pub created_at: DateTime<Utc>,
    /// When the session ended, if it has
    #[serde(default)]
    pub ended_at: Option<DateTime<Utc>>,
}

impl SessionSummary {
    /// Short label for pickers: concept plus the session date.
    pub fn label(&self) -> String {
        format!("{} ({})", self.concept, self.created_at.format("%Y-%m-%d"))
    }
}
