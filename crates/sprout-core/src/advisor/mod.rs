//! Advisor chat domain module.
//!
//! Everything the parent advisor widget needs below the UI: the backend
//! API boundary, the transcript model, and the chat state machine.
//!
//! # Module Structure
//!
//! - `session`: learning session summaries (`SessionSummary`)
//! - `conversation`: persisted conversation summaries (`ConversationSummary`)
//! - `message`: transcript entry types (`ChatMessage`, `TranscriptEntry`)
//! - `api`: backend API boundary (`AdvisorApi`)
//! - `state`: widget state (`SelectionState`, `ChatPhase`, `ChatState`)
//! - `reducer`: the transition function (`Action`, `Effect`, `reduce`)

mod api;
mod conversation;
mod message;
pub mod reducer;
mod session;
mod state;

// Re-export public API
pub use api::{AdvisorApi, EstablishedChat, LoadedChat, SendOutcome};
pub use conversation::ConversationSummary;
pub use message::{ChatMessage, DeliveryState, MessageRole, NoticeKind, TranscriptEntry};
pub use reducer::{Action, Effect, reduce};
pub use session::SessionSummary;
pub use state::{ChatPhase, ChatState, EstablishTarget, SelectionState};
