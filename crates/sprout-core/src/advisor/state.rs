//! Advisor chat widget state.
//!
//! The widget's overlapping booleans and id fields are modeled as one
//! explicit state value: the user's navigational [`SelectionState`] plus a
//! [`ChatPhase`] tagged union describing which remote conversation (if any)
//! the widget is currently talking to. All mutation goes through the
//! reducer in [`super::reducer`].

use super::message::TranscriptEntry;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// What an in-flight establishment call is trying to point the widget at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EstablishTarget {
    /// Start (or continue) a fresh advisor chat for a child.
    NewChat { child_id: Uuid },
    /// Load a persisted conversation from the history sidebar.
    History { conversation_id: Uuid },
}

/// Which remote conversation the widget is talking to.
///
/// Exactly one phase holds at a time; `chat_id` exists only in `Ready`.
/// Messages may be sent only while `Ready`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "phase", rename_all = "snake_case")]
pub enum ChatPhase {
    /// Widget not yet pointed at any conversation.
    Idle,
    /// A start/load call is in flight. `epoch` fences stale responses:
    /// only the establishment carrying the current epoch may resolve.
    Establishing { epoch: u64, target: EstablishTarget },
    /// A chat is established and accepting messages.
    Ready {
        chat_id: Uuid,
        focus_session_id: Option<Uuid>,
    },
    /// Establishment failed; sending stays disabled until a selection
    /// change triggers a new establishment.
    Unavailable,
}

/// The user's current navigational choice.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectionState {
    /// Whether the widget is open
    pub open: bool,
    /// Whether the history sidebar is open
    pub sidebar_open: bool,
    /// The child the conversation is scoped to
    pub selected_child_id: Option<Uuid>,
    /// Session selected as discussion context, if any
    pub focus_session_id: Option<Uuid>,
    /// Conversation picked from the history sidebar, if any
    pub selected_conversation_id: Option<Uuid>,
    /// True while the transcript shows a persisted conversation
    pub viewing_history: bool,
}

/// Complete widget state: selection, chat phase, transcript, send flag.
///
/// Owned exclusively by one widget instance; nothing here is persisted
/// beyond the instance's lifetime.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatState {
    /// The user's current navigational choice
    pub selection: SelectionState,
    /// Which remote conversation the widget is talking to
    pub phase: ChatPhase,
    /// The displayed transcript
    pub transcript: Vec<TranscriptEntry>,
    /// True while a send is in flight (single-flight guard)
    pub sending: bool,
    /// Monotonic counter of establishment requests issued so far
    pub(crate) epoch: u64,
}

impl ChatState {
    /// Creates the initial widget state: closed, nothing selected.
    pub fn new() -> Self {
        Self {
            selection: SelectionState::default(),
            phase: ChatPhase::Idle,
            transcript: Vec::new(),
            sending: false,
            epoch: 0,
        }
    }

    /// The active chat id, if a chat is established.
    pub fn chat_id(&self) -> Option<Uuid> {
        match self.phase {
            ChatPhase::Ready { chat_id, .. } => Some(chat_id),
            _ => None,
        }
    }

    /// True when a message could be sent right now.
    pub fn can_send(&self) -> bool {
        matches!(self.phase, ChatPhase::Ready { .. }) && !self.sending
    }
}

impl Default for ChatState {
    fn default() -> Self {
        Self::new()
    }
}
