//! Advisor backend API boundary.
//!
//! Defines the interface for the remote advisor operations, decoupling the
//! chat controller from the specific transport (HTTP client in production,
//! scripted mocks in tests).

use super::conversation::ConversationSummary;
use super::message::ChatMessage;
use super::session::SessionSummary;
use crate::error::Result;
use async_trait::async_trait;
use uuid::Uuid;

/// Result of establishing (starting or continuing) an advisor chat.
#[derive(Debug, Clone, PartialEq)]
pub struct EstablishedChat {
    /// The chat identity to send subsequent messages against
    pub chat_id: Uuid,
    /// Initial transcript as served by the backend
    pub messages: Vec<ChatMessage>,
}

/// Result of loading a persisted conversation by id.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadedChat {
    /// The chat identity of the loaded conversation
    pub chat_id: Uuid,
    /// Session pinned as discussion context when the conversation was saved
    pub focus_session_id: Option<Uuid>,
    /// Full persisted transcript
    pub messages: Vec<ChatMessage>,
}

/// Result of sending one parent message.
#[derive(Debug, Clone, PartialEq)]
pub struct SendOutcome {
    /// The advisor's reply
    pub assistant_message: ChatMessage,
    /// Guidance notes the backend appended to the child's record as a
    /// byproduct of this exchange
    pub appended_notes: Vec<String>,
}

/// An abstract client for the advisor backend.
///
/// One method per remote operation the chat widget consumes. All errors are
/// surfaced as [`crate::SproutError`]; the controller decides whether a
/// failure degrades silently or becomes an in-transcript notice.
#[async_trait]
pub trait AdvisorApi: Send + Sync {
    /// Lists past learning sessions for a child, newest first.
    async fn list_sessions(&self, child_id: Uuid) -> Result<Vec<SessionSummary>>;

    /// Lists persisted advisor conversations, optionally filtered by child.
    async fn list_conversations(
        &self,
        child_id: Option<Uuid>,
    ) -> Result<Vec<ConversationSummary>>;

    /// Ensures an advisor chat exists for the child and returns its
    /// identity plus the initial transcript. Idempotent on the backend.
    async fn start_chat(
        &self,
        child_id: Uuid,
        focus_session_id: Option<Uuid>,
    ) -> Result<EstablishedChat>;

    /// Loads a persisted conversation's full transcript and metadata.
    async fn load_chat(&self, conversation_id: Uuid) -> Result<LoadedChat>;

    /// Changes which session an established chat is focused on.
    /// `None` returns the chat to general discussion.
    async fn update_focus(&self, chat_id: Uuid, focus_session_id: Option<Uuid>) -> Result<()>;

    /// Sends one parent message and returns the advisor's reply.
    async fn send_message(&self, chat_id: Uuid, text: &str) -> Result<SendOutcome>;
}
