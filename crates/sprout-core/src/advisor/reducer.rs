//! The advisor chat reducer.
//!
//! One function, [`reduce`], applies an [`Action`] to a [`ChatState`] and
//! returns the [`Effect`]s the caller must execute. The asymmetry between
//! the destructive paths (child switch, history load: transcript replaced
//! wholesale) and the additive path (in-place focus change: one notice
//! appended, transcript intact) is expressed directly in the transition
//! table rather than emerging from effect-dependency timing.
//!
//! Establishment requests are fenced with a monotonic epoch: when the user
//! switches child A -> B -> A rapidly, two establishment calls may be in
//! flight, and only the one carrying the latest epoch is allowed to
//! resolve. Stale responses are dropped.

use super::message::{ChatMessage, DeliveryState, TranscriptEntry};
use super::state::{ChatPhase, ChatState, EstablishTarget};
use uuid::Uuid;

/// Notice shown when starting a fresh chat fails.
pub const START_CHAT_FAILED: &str =
    "Unable to start advisor chat right now. Please try again in a moment.";
/// Notice shown when loading a persisted conversation fails.
pub const LOAD_CHAT_FAILED: &str =
    "Unable to load this conversation. Please pick another one or start a new chat.";
/// Notice shown when an in-place focus update fails.
pub const FOCUS_UPDATE_FAILED: &str =
    "Could not update the session focus. The previous focus still applies.";
/// Notice shown when a send fails.
pub const SEND_FAILED: &str = "Sorry, something went wrong sending that. Please try again.";
/// Notice shown when the focus is cleared back to general discussion.
pub const FOCUS_CLEARED: &str = "Focus cleared. We are back to general discussion.";

/// An input to the reducer: a user interaction or the resolution of a
/// previously issued effect.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// Widget opened (or reopened) pointed at a child.
    Opened { child_id: Uuid },
    /// Widget closed.
    Closed,
    /// History sidebar toggled.
    SidebarToggled,
    /// A different child was picked.
    ChildSelected(Uuid),
    /// A focus session was picked (`None` clears the focus).
    FocusSelected(Option<Uuid>),
    /// A conversation was picked from the history sidebar.
    ConversationSelected(Uuid),
    /// The "new conversation" affordance was used.
    NewConversationRequested,
    /// An establishment call resolved successfully.
    ChatEstablished {
        epoch: u64,
        chat_id: Uuid,
        focus_session_id: Option<Uuid>,
        messages: Vec<ChatMessage>,
    },
    /// An establishment call failed.
    ChatEstablishFailed { epoch: u64 },
    /// A focus update was acknowledged by the backend.
    FocusAcknowledged { focus_session_id: Option<Uuid> },
    /// A focus update failed.
    FocusUpdateFailed,
    /// The parent submitted a message.
    SendRequested { text: String },
    /// A send resolved with the advisor's reply.
    SendCompleted {
        assistant_message: ChatMessage,
        appended_notes: usize,
    },
    /// A send failed.
    SendFailed,
}

/// Work the caller must perform after a state transition.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// Refetch the focus-session picker list for a child.
    RefreshSessions { child_id: Uuid },
    /// Refetch the history sidebar list.
    RefreshConversations { child_id: Option<Uuid> },
    /// Start or load a chat. Must resolve back into the reducer as
    /// `ChatEstablished`/`ChatEstablishFailed` carrying the same epoch.
    EstablishChat { epoch: u64, target: EstablishTarget },
    /// Send an in-place focus update for the established chat.
    UpdateFocus {
        chat_id: Uuid,
        focus_session_id: Option<Uuid>,
    },
    /// Send one parent message.
    SendMessage { chat_id: Uuid, text: String },
    /// Surface a transient toast naming the guidance-note count.
    ShowNotesToast { count: usize },
}

/// Applies `action` to `state` and returns the effects to execute.
pub fn reduce(state: &mut ChatState, action: Action) -> Vec<Effect> {
    match action {
        Action::Opened { child_id } => opened(state, child_id),
        Action::Closed => {
            state.selection.open = false;
            Vec::new()
        }
        Action::SidebarToggled => {
            state.selection.sidebar_open = !state.selection.sidebar_open;
            Vec::new()
        }
        Action::ChildSelected(child_id) => child_selected(state, child_id),
        Action::FocusSelected(focus) => focus_selected(state, focus),
        Action::ConversationSelected(conversation_id) => {
            conversation_selected(state, conversation_id)
        }
        Action::NewConversationRequested => new_conversation_requested(state),
        Action::ChatEstablished {
            epoch,
            chat_id,
            focus_session_id,
            messages,
        } => chat_established(state, epoch, chat_id, focus_session_id, messages),
        Action::ChatEstablishFailed { epoch } => chat_establish_failed(state, epoch),
        Action::FocusAcknowledged { focus_session_id } => {
            focus_acknowledged(state, focus_session_id)
        }
        Action::FocusUpdateFailed => {
            state.transcript.push(TranscriptEntry::error(FOCUS_UPDATE_FAILED));
            Vec::new()
        }
        Action::SendRequested { text } => send_requested(state, text),
        Action::SendCompleted {
            assistant_message,
            appended_notes,
        } => send_completed(state, assistant_message, appended_notes),
        Action::SendFailed => send_failed(state),
    }
}

fn opened(state: &mut ChatState, child_id: Uuid) -> Vec<Effect> {
    state.selection.open = true;

    if state.selection.selected_child_id != Some(child_id) {
        // Reopening pointed at a different child invalidates any prior
        // focus or history selection.
        return child_selected(state, child_id);
    }

    // Same child: refresh both lists and re-establish according to the
    // current mode (history view survives a close/reopen cycle).
    let target = match (
        state.selection.viewing_history,
        state.selection.selected_conversation_id,
    ) {
        (true, Some(conversation_id)) => EstablishTarget::History { conversation_id },
        _ => EstablishTarget::NewChat { child_id },
    };
    let mut effects = vec![
        Effect::RefreshSessions { child_id },
        Effect::RefreshConversations {
            child_id: Some(child_id),
        },
    ];
    effects.push(begin_establish(state, target));
    effects
}

fn child_selected(state: &mut ChatState, child_id: Uuid) -> Vec<Effect> {
    if state.selection.selected_child_id == Some(child_id) {
        return Vec::new();
    }

    state.selection.selected_child_id = Some(child_id);
    state.selection.focus_session_id = None;
    state.selection.viewing_history = false;
    state.selection.selected_conversation_id = None;

    if !state.selection.open {
        return Vec::new();
    }

    vec![
        Effect::RefreshSessions { child_id },
        Effect::RefreshConversations {
            child_id: Some(child_id),
        },
        begin_establish(state, EstablishTarget::NewChat { child_id }),
    ]
}

fn focus_selected(state: &mut ChatState, focus: Option<Uuid>) -> Vec<Effect> {
    if state.selection.focus_session_id == focus {
        return Vec::new();
    }
    state.selection.focus_session_id = focus;

    // The in-place context change path: only an already-established chat
    // gets an update-focus call. A focus change landing while an
    // establishment is in flight is absorbed by that reload.
    match (state.selection.open, &state.phase) {
        (true, ChatPhase::Ready { chat_id, .. }) => vec![Effect::UpdateFocus {
            chat_id: *chat_id,
            focus_session_id: focus,
        }],
        _ => Vec::new(),
    }
}

fn conversation_selected(state: &mut ChatState, conversation_id: Uuid) -> Vec<Effect> {
    if state.selection.viewing_history
        && state.selection.selected_conversation_id == Some(conversation_id)
    {
        return Vec::new();
    }

    state.selection.selected_conversation_id = Some(conversation_id);
    state.selection.viewing_history = true;

    if !state.selection.open {
        return Vec::new();
    }

    vec![begin_establish(
        state,
        EstablishTarget::History { conversation_id },
    )]
}

fn new_conversation_requested(state: &mut ChatState) -> Vec<Effect> {
    let was_viewing_history = state.selection.viewing_history;
    let had_focus = state.selection.focus_session_id.is_some();

    state.selection.viewing_history = false;
    state.selection.selected_conversation_id = None;
    state.selection.focus_session_id = None;

    if !state.selection.open {
        return Vec::new();
    }

    if was_viewing_history {
        let Some(child_id) = state.selection.selected_child_id else {
            return Vec::new();
        };
        return vec![begin_establish(state, EstablishTarget::NewChat { child_id })];
    }

    // Already in new-conversation mode: nothing to re-establish. Clearing
    // a focus on a live chat is an in-place change, not a reset.
    if had_focus {
        if let ChatPhase::Ready { chat_id, .. } = state.phase {
            return vec![Effect::UpdateFocus {
                chat_id,
                focus_session_id: None,
            }];
        }
    }
    Vec::new()
}

fn begin_establish(state: &mut ChatState, target: EstablishTarget) -> Effect {
    state.epoch += 1;
    state.phase = ChatPhase::Establishing {
        epoch: state.epoch,
        target,
    };
    Effect::EstablishChat {
        epoch: state.epoch,
        target,
    }
}

fn chat_established(
    state: &mut ChatState,
    epoch: u64,
    chat_id: Uuid,
    focus_session_id: Option<Uuid>,
    messages: Vec<ChatMessage>,
) -> Vec<Effect> {
    let ChatPhase::Establishing {
        epoch: current,
        target,
    } = state.phase
    else {
        return Vec::new();
    };
    if epoch != current {
        // A newer establishment has been issued since; this response is
        // for a selection the user has already left.
        tracing::debug!(stale = epoch, current, "dropping stale chat establishment");
        return Vec::new();
    }

    if let EstablishTarget::History { .. } = target {
        state.selection.focus_session_id = focus_session_id;
    }

    state.phase = ChatPhase::Ready {
        chat_id,
        focus_session_id,
    };
    state.transcript = messages.into_iter().map(TranscriptEntry::Remote).collect();
    state.sending = false;
    Vec::new()
}

fn chat_establish_failed(state: &mut ChatState, epoch: u64) -> Vec<Effect> {
    let ChatPhase::Establishing {
        epoch: current,
        target,
    } = state.phase
    else {
        return Vec::new();
    };
    if epoch != current {
        return Vec::new();
    }

    let notice = match target {
        EstablishTarget::NewChat { .. } => START_CHAT_FAILED,
        EstablishTarget::History { .. } => LOAD_CHAT_FAILED,
    };
    state.phase = ChatPhase::Unavailable;
    state.transcript = vec![TranscriptEntry::error(notice)];
    state.sending = false;
    Vec::new()
}

fn focus_acknowledged(state: &mut ChatState, focus: Option<Uuid>) -> Vec<Effect> {
    if let ChatPhase::Ready {
        focus_session_id, ..
    } = &mut state.phase
    {
        *focus_session_id = focus;
    }
    let notice = match focus {
        Some(session_id) => format!("Now focusing on session {}.", short_id(session_id)),
        None => FOCUS_CLEARED.to_string(),
    };
    state.transcript.push(TranscriptEntry::info(notice));
    Vec::new()
}

fn send_requested(state: &mut ChatState, text: String) -> Vec<Effect> {
    let trimmed = text.trim();
    if trimmed.is_empty() || state.sending {
        return Vec::new();
    }
    let ChatPhase::Ready { chat_id, .. } = state.phase else {
        return Vec::new();
    };

    state.sending = true;
    state.transcript.push(TranscriptEntry::outbound(trimmed));
    vec![Effect::SendMessage {
        chat_id,
        text: trimmed.to_string(),
    }]
}

fn send_completed(
    state: &mut ChatState,
    assistant_message: ChatMessage,
    appended_notes: usize,
) -> Vec<Effect> {
    if !state.sending {
        // The chat this send belonged to has been replaced meanwhile.
        return Vec::new();
    }
    state.sending = false;
    settle_pending(state, DeliveryState::Confirmed);
    state
        .transcript
        .push(TranscriptEntry::Remote(assistant_message));

    if appended_notes > 0 {
        vec![
            Effect::ShowNotesToast {
                count: appended_notes,
            },
            Effect::RefreshConversations {
                child_id: state.selection.selected_child_id,
            },
        ]
    } else {
        Vec::new()
    }
}

fn send_failed(state: &mut ChatState) -> Vec<Effect> {
    if !state.sending {
        return Vec::new();
    }
    state.sending = false;
    // The optimistic message stays in the transcript, marked as failed
    // rather than left indistinguishable from a confirmed send.
    settle_pending(state, DeliveryState::Failed);
    state.transcript.push(TranscriptEntry::error(SEND_FAILED));
    Vec::new()
}

fn settle_pending(state: &mut ChatState, outcome: DeliveryState) {
    if let Some(TranscriptEntry::Outbound { delivery, .. }) = state
        .transcript
        .iter_mut()
        .rev()
        .find(|entry| entry.is_pending())
    {
        *delivery = outcome;
    }
}

/// First 8 hex characters of a uuid, for user-facing notices.
fn short_id(id: Uuid) -> String {
    id.to_string().chars().take(8).collect()
}
