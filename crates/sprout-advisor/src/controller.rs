//! The advisor chat controller.
//!
//! `AdvisorChat` owns the widget state and executes the reducer's effects
//! against an [`AdvisorApi`] implementation. Each public method feeds one
//! action through the reducer, then drains the resulting effect queue,
//! feeding completion actions back in until nothing is left to do.

use crate::cache::ListCache;
use crate::toast::NotesToast;
use sprout_core::advisor::{
    Action, AdvisorApi, ChatState, ConversationSummary, Effect, EstablishTarget, SessionSummary,
    TranscriptEntry, reduce,
};
use sprout_core::child::ChildProfile;
use std::collections::VecDeque;
use std::sync::Arc;
use uuid::Uuid;

/// Controller for one advisor chat widget instance.
///
/// All state is local to the instance; the only shared resource is the
/// backend conversation record. API failures never escape: list fetches
/// degrade to empty lists, chat failures become in-transcript notices.
pub struct AdvisorChat<A: AdvisorApi> {
    api: Arc<A>,
    state: ChatState,
    sessions: ListCache<SessionSummary>,
    conversations: ListCache<ConversationSummary>,
    toast: Option<NotesToast>,
}

impl<A: AdvisorApi> AdvisorChat<A> {
    /// Creates a closed widget controller backed by the given API client.
    pub fn new(api: Arc<A>) -> Self {
        Self {
            api,
            state: ChatState::new(),
            sessions: ListCache::new(),
            conversations: ListCache::new(),
            toast: None,
        }
    }

    /// Opens the widget on the first child in the roster.
    pub async fn open(&mut self, roster: &[ChildProfile]) {
        match roster.first() {
            Some(child) => self.dispatch(Action::Opened { child_id: child.id }).await,
            None => {
                // Nothing to scope a conversation to; the widget shows its
                // empty state until a child exists.
                self.state.selection.open = true;
            }
        }
    }

    /// Opens the widget pointed at a specific child.
    pub async fn open_with_child(&mut self, child_id: Uuid) {
        self.dispatch(Action::Opened { child_id }).await;
    }

    /// Closes the widget. In-flight requests are not cancelled; their
    /// resolutions are fenced out by the reducer if they become stale.
    pub async fn close(&mut self) {
        self.dispatch(Action::Closed).await;
    }

    /// Toggles the history sidebar.
    pub async fn toggle_sidebar(&mut self) {
        self.dispatch(Action::SidebarToggled).await;
    }

    /// Switches the conversation to a different child.
    pub async fn select_child(&mut self, child_id: Uuid) {
        self.dispatch(Action::ChildSelected(child_id)).await;
    }

    /// Changes which session the conversation is focused on, in place.
    /// `None` returns the chat to general discussion.
    pub async fn select_focus_session(&mut self, session_id: Option<Uuid>) {
        self.dispatch(Action::FocusSelected(session_id)).await;
    }

    /// Loads a persisted conversation from the history sidebar.
    pub async fn select_conversation(&mut self, conversation_id: Uuid) {
        self.dispatch(Action::ConversationSelected(conversation_id))
            .await;
    }

    /// Leaves history view and starts a fresh conversation.
    pub async fn start_new_conversation(&mut self) {
        self.dispatch(Action::NewConversationRequested).await;
    }

    /// Sends a parent message against the established chat.
    ///
    /// A no-op when no chat is established, a send is already in flight,
    /// or the trimmed text is empty.
    pub async fn send(&mut self, text: impl Into<String>) {
        self.dispatch(Action::SendRequested { text: text.into() })
            .await;
    }

    /// The full widget state.
    pub fn state(&self) -> &ChatState {
        &self.state
    }

    /// The displayed transcript.
    pub fn transcript(&self) -> &[TranscriptEntry] {
        &self.state.transcript
    }

    /// The focus-session picker cache.
    pub fn sessions(&self) -> &ListCache<SessionSummary> {
        &self.sessions
    }

    /// The history sidebar cache.
    pub fn conversations(&self) -> &ListCache<ConversationSummary> {
        &self.conversations
    }

    /// True when a message could be sent right now.
    pub fn can_send(&self) -> bool {
        self.state.can_send()
    }

    /// The guidance-note toast, if one is still within its display window.
    pub fn active_toast(&self) -> Option<&NotesToast> {
        self.toast.as_ref().filter(|toast| toast.is_active())
    }

    async fn dispatch(&mut self, action: Action) {
        let mut queue = VecDeque::from([action]);
        while let Some(action) = queue.pop_front() {
            tracing::debug!(?action, "advisor chat action");
            for effect in reduce(&mut self.state, action) {
                if let Some(follow_up) = self.run_effect(effect).await {
                    queue.push_back(follow_up);
                }
            }
        }
    }

    async fn run_effect(&mut self, effect: Effect) -> Option<Action> {
        match effect {
            Effect::RefreshSessions { child_id } => {
                self.sessions.begin();
                match self.api.list_sessions(child_id).await {
                    Ok(items) => self.sessions.finish(items),
                    Err(err) => {
                        tracing::warn!(%child_id, %err, "session list fetch failed");
                        self.sessions.degrade();
                    }
                }
                None
            }
            Effect::RefreshConversations { child_id } => {
                self.conversations.begin();
                match self.api.list_conversations(child_id).await {
                    Ok(items) => self.conversations.finish(items),
                    Err(err) => {
                        tracing::warn!(%err, "conversation list fetch failed");
                        self.conversations.degrade();
                    }
                }
                None
            }
            Effect::EstablishChat { epoch, target } => {
                Some(self.establish(epoch, target).await)
            }
            Effect::UpdateFocus {
                chat_id,
                focus_session_id,
            } => match self.api.update_focus(chat_id, focus_session_id).await {
                Ok(()) => Some(Action::FocusAcknowledged { focus_session_id }),
                Err(err) => {
                    tracing::warn!(%chat_id, %err, "focus update failed");
                    Some(Action::FocusUpdateFailed)
                }
            },
            Effect::SendMessage { chat_id, text } => {
                match self.api.send_message(chat_id, &text).await {
                    Ok(outcome) => Some(Action::SendCompleted {
                        assistant_message: outcome.assistant_message,
                        appended_notes: outcome.appended_notes.len(),
                    }),
                    Err(err) => {
                        tracing::warn!(%chat_id, %err, "send failed");
                        Some(Action::SendFailed)
                    }
                }
            }
            Effect::ShowNotesToast { count } => {
                self.toast = Some(NotesToast::new(count));
                None
            }
        }
    }

    async fn establish(&mut self, epoch: u64, target: EstablishTarget) -> Action {
        match target {
            EstablishTarget::NewChat { child_id } => {
                // A fresh chat is always requested without an explicit
                // focus; focus changes on a live chat go through the
                // in-place update path instead.
                match self.api.start_chat(child_id, None).await {
                    Ok(chat) => Action::ChatEstablished {
                        epoch,
                        chat_id: chat.chat_id,
                        focus_session_id: None,
                        messages: chat.messages,
                    },
                    Err(err) => {
                        tracing::warn!(%child_id, %err, "starting advisor chat failed");
                        Action::ChatEstablishFailed { epoch }
                    }
                }
            }
            EstablishTarget::History { conversation_id } => {
                match self.api.load_chat(conversation_id).await {
                    Ok(chat) => Action::ChatEstablished {
                        epoch,
                        chat_id: chat.chat_id,
                        focus_session_id: chat.focus_session_id,
                        messages: chat.messages,
                    },
                    Err(err) => {
                        tracing::warn!(%conversation_id, %err, "loading conversation failed");
                        Action::ChatEstablishFailed { epoch }
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use sprout_core::advisor::reducer::{SEND_FAILED, START_CHAT_FAILED};
    use sprout_core::advisor::{
        ChatMessage, ChatPhase, DeliveryState, EstablishedChat, LoadedChat, MessageRole,
        NoticeKind, SendOutcome,
    };
    use sprout_core::child::AgeLevel;
    use sprout_core::error::{Result, SproutError};
    use std::sync::Mutex;

    #[derive(Debug, Clone, PartialEq)]
    enum ApiCall {
        ListSessions(Uuid),
        ListConversations(Option<Uuid>),
        StartChat {
            child_id: Uuid,
            focus: Option<Uuid>,
        },
        LoadChat(Uuid),
        UpdateFocus {
            chat_id: Uuid,
            focus: Option<Uuid>,
        },
        Send {
            chat_id: Uuid,
            text: String,
        },
    }

    // Scripted backend: fixed responses, per-operation failure switches,
    // and a recording of every call in order.
    struct MockAdvisorApi {
        calls: Mutex<Vec<ApiCall>>,
        chat_id: Uuid,
        initial_messages: Vec<ChatMessage>,
        sessions: Vec<SessionSummary>,
        loaded: Option<LoadedChat>,
        appended_notes: Vec<String>,
        fail_sessions: bool,
        fail_conversations: bool,
        fail_start: bool,
        fail_load: bool,
        fail_update: bool,
        fail_send: bool,
    }

    impl MockAdvisorApi {
        fn new() -> Self {
            Self {
                calls: Mutex::new(Vec::new()),
                chat_id: Uuid::new_v4(),
                initial_messages: vec![assistant("Hi! Ask me about your child's progress.")],
                sessions: Vec::new(),
                loaded: None,
                appended_notes: Vec::new(),
                fail_sessions: false,
                fail_conversations: false,
                fail_start: false,
                fail_load: false,
                fail_update: false,
                fail_send: false,
            }
        }

        fn calls(&self) -> Vec<ApiCall> {
            self.calls.lock().unwrap().clone()
        }

        fn clear_calls(&self) {
            self.calls.lock().unwrap().clear();
        }

        fn record(&self, call: ApiCall) {
            self.calls.lock().unwrap().push(call);
        }

        fn conversation_refreshes(&self) -> usize {
            self.calls()
                .iter()
                .filter(|call| matches!(call, ApiCall::ListConversations(_)))
                .count()
        }
    }

    fn assistant(content: &str) -> ChatMessage {
        ChatMessage {
            role: MessageRole::Assistant,
            content: content.to_string(),
            created_at: None,
        }
    }

    fn mock_error() -> SproutError {
        SproutError::http("mock backend unavailable")
    }

    #[async_trait]
    impl AdvisorApi for MockAdvisorApi {
        async fn list_sessions(&self, child_id: Uuid) -> Result<Vec<SessionSummary>> {
            self.record(ApiCall::ListSessions(child_id));
            if self.fail_sessions {
                return Err(mock_error());
            }
            Ok(self.sessions.clone())
        }

        async fn list_conversations(
            &self,
            child_id: Option<Uuid>,
        ) -> Result<Vec<ConversationSummary>> {
            self.record(ApiCall::ListConversations(child_id));
            if self.fail_conversations {
                return Err(mock_error());
            }
            Ok(Vec::new())
        }

        async fn start_chat(
            &self,
            child_id: Uuid,
            focus_session_id: Option<Uuid>,
        ) -> Result<EstablishedChat> {
            self.record(ApiCall::StartChat {
                child_id,
                focus: focus_session_id,
            });
            if self.fail_start {
                return Err(mock_error());
            }
            Ok(EstablishedChat {
                chat_id: self.chat_id,
                messages: self.initial_messages.clone(),
            })
        }

        async fn load_chat(&self, conversation_id: Uuid) -> Result<LoadedChat> {
            self.record(ApiCall::LoadChat(conversation_id));
            if self.fail_load {
                return Err(mock_error());
            }
            self.loaded.clone().ok_or_else(mock_error)
        }

        async fn update_focus(
            &self,
            chat_id: Uuid,
            focus_session_id: Option<Uuid>,
        ) -> Result<()> {
            self.record(ApiCall::UpdateFocus {
                chat_id,
                focus: focus_session_id,
            });
            if self.fail_update {
                return Err(mock_error());
            }
            Ok(())
        }

        async fn send_message(&self, chat_id: Uuid, text: &str) -> Result<SendOutcome> {
            self.record(ApiCall::Send {
                chat_id,
                text: text.to_string(),
            });
            if self.fail_send {
                return Err(mock_error());
            }
            Ok(SendOutcome {
                assistant_message: assistant("Thanks, noted."),
                appended_notes: self.appended_notes.clone(),
            })
        }
    }

    fn child(name: &str) -> ChildProfile {
        ChildProfile {
            id: Uuid::new_v4(),
            name: name.to_string(),
            age_level: AgeLevel::Eight,
            learning_code: format!("{}-0000", name.to_uppercase()),
            target_topic: None,
        }
    }

    #[tokio::test]
    async fn cold_open_selects_first_child_and_establishes_chat() {
        let api = Arc::new(MockAdvisorApi::new());
        let roster = vec![child("ada"), child("ben")];
        let mut widget = AdvisorChat::new(api.clone());

        widget.open(&roster).await;

        let first = roster[0].id;
        assert_eq!(widget.state().selection.selected_child_id, Some(first));
        assert_eq!(
            api.calls(),
            vec![
                ApiCall::ListSessions(first),
                ApiCall::ListConversations(Some(first)),
                ApiCall::StartChat {
                    child_id: first,
                    focus: None,
                },
            ]
        );
        assert_eq!(widget.transcript().len(), 1);
        assert_eq!(
            widget.transcript()[0].content(),
            "Hi! Ask me about your child's progress."
        );
        assert!(widget.can_send());
    }

    #[tokio::test]
    async fn focus_switch_issues_one_update_and_appends_one_notice() {
        let api = Arc::new(MockAdvisorApi::new());
        let roster = vec![child("ada")];
        let mut widget = AdvisorChat::new(api.clone());
        widget.open(&roster).await;
        api.clear_calls();
        let before_len = widget.transcript().len();

        let session_id = Uuid::new_v4();
        widget.select_focus_session(Some(session_id)).await;

        assert_eq!(
            api.calls(),
            vec![ApiCall::UpdateFocus {
                chat_id: api.chat_id,
                focus: Some(session_id),
            }]
        );
        assert_eq!(widget.transcript().len(), before_len + 1);
        let short: String = session_id.to_string().chars().take(8).collect();
        assert!(widget.transcript().last().unwrap().content().contains(&short));
    }

    #[tokio::test]
    async fn history_selection_round_trips_chat_identity() {
        let conversation_id = Uuid::new_v4();
        let loaded_chat_id = Uuid::new_v4();
        let loaded_focus = Some(Uuid::new_v4());
        let mut api = MockAdvisorApi::new();
        api.loaded = Some(LoadedChat {
            chat_id: loaded_chat_id,
            focus_session_id: loaded_focus,
            messages: vec![assistant("We talked about fractions.")],
        });
        let api = Arc::new(api);
        let mut widget = AdvisorChat::new(api.clone());
        widget.open(&[child("ada")]).await;
        api.clear_calls();

        widget.select_conversation(conversation_id).await;

        assert!(widget.state().selection.viewing_history);
        assert_eq!(api.calls(), vec![ApiCall::LoadChat(conversation_id)]);
        assert_eq!(widget.state().chat_id(), Some(loaded_chat_id));
        assert_eq!(widget.state().selection.focus_session_id, loaded_focus);
        assert_eq!(widget.transcript().len(), 1);
        assert_eq!(
            widget.transcript()[0].content(),
            "We talked about fractions."
        );
    }

    #[tokio::test]
    async fn send_with_notes_shows_toast_and_refreshes_history_once() {
        let mut api = MockAdvisorApi::new();
        api.appended_notes = vec!["n1".to_string(), "n2".to_string()];
        let api = Arc::new(api);
        let mut widget = AdvisorChat::new(api.clone());
        widget.open(&[child("ada")]).await;
        assert_eq!(api.conversation_refreshes(), 1);

        widget.send("Please go slower on division").await;

        let toast = widget.active_toast().expect("toast should be active");
        assert_eq!(toast.count(), 2);
        assert!(toast.text().contains('2'));
        assert_eq!(api.conversation_refreshes(), 2);
    }

    #[tokio::test]
    async fn send_without_notes_shows_no_toast() {
        let api = Arc::new(MockAdvisorApi::new());
        let mut widget = AdvisorChat::new(api.clone());
        widget.open(&[child("ada")]).await;

        widget.send("hello").await;

        assert!(widget.active_toast().is_none());
        assert_eq!(api.conversation_refreshes(), 1);
    }

    #[tokio::test]
    async fn list_failures_degrade_to_empty_without_breaking_the_chat() {
        let mut api = MockAdvisorApi::new();
        api.fail_sessions = true;
        api.fail_conversations = true;
        let api = Arc::new(api);
        let mut widget = AdvisorChat::new(api.clone());

        widget.open(&[child("ada")]).await;

        assert!(widget.sessions().items().is_empty());
        assert!(!widget.sessions().is_loading());
        assert!(widget.conversations().items().is_empty());
        assert!(widget.can_send());
    }

    #[tokio::test]
    async fn start_failure_disables_sending_and_shows_one_notice() {
        let mut api = MockAdvisorApi::new();
        api.fail_start = true;
        let api = Arc::new(api);
        let mut widget = AdvisorChat::new(api.clone());

        widget.open(&[child("ada")]).await;

        assert_eq!(widget.state().phase, ChatPhase::Unavailable);
        assert_eq!(widget.transcript().len(), 1);
        assert_eq!(widget.transcript()[0].content(), START_CHAT_FAILED);
        assert!(!widget.can_send());

        api.clear_calls();
        widget.send("is anyone there?").await;
        assert!(api.calls().is_empty());
    }

    #[tokio::test]
    async fn send_failure_marks_the_optimistic_message_failed() {
        let mut api = MockAdvisorApi::new();
        api.fail_send = true;
        let api = Arc::new(api);
        let mut widget = AdvisorChat::new(api.clone());
        widget.open(&[child("ada")]).await;
        let before_len = widget.transcript().len();

        widget.send("hello").await;

        assert_eq!(widget.transcript().len(), before_len + 2);
        assert!(matches!(
            widget.transcript()[before_len],
            TranscriptEntry::Outbound {
                delivery: DeliveryState::Failed,
                ..
            }
        ));
        assert!(matches!(
            &widget.transcript()[before_len + 1],
            TranscriptEntry::Notice {
                kind: NoticeKind::Error,
                content,
            } if content.as_str() == SEND_FAILED
        ));
        assert!(widget.active_toast().is_none());
        assert!(widget.can_send());
    }

    #[tokio::test]
    async fn failed_secondary_refresh_after_notes_is_swallowed() {
        let mut api = MockAdvisorApi::new();
        api.appended_notes = vec!["n1".to_string()];
        api.fail_conversations = true;
        let api = Arc::new(api);
        let mut widget = AdvisorChat::new(api.clone());
        widget.open(&[child("ada")]).await;

        widget.send("note this down").await;

        // The toast still fires; the history list just stays empty.
        assert!(widget.active_toast().is_some());
        assert!(widget.conversations().items().is_empty());
        assert!(widget.can_send());
    }

    #[tokio::test]
    async fn focus_update_failure_keeps_the_transcript_and_chat_usable() {
        let mut api = MockAdvisorApi::new();
        api.fail_update = true;
        let api = Arc::new(api);
        let mut widget = AdvisorChat::new(api.clone());
        widget.open(&[child("ada")]).await;
        let before_len = widget.transcript().len();

        widget.select_focus_session(Some(Uuid::new_v4())).await;

        assert_eq!(widget.transcript().len(), before_len + 1);
        assert!(matches!(
            widget.transcript().last().unwrap(),
            TranscriptEntry::Notice {
                kind: NoticeKind::Error,
                ..
            }
        ));
        assert!(widget.can_send());
    }

    #[tokio::test]
    async fn sidebar_toggle_flips_the_flag_without_touching_the_backend() {
        let api = Arc::new(MockAdvisorApi::new());
        let mut widget = AdvisorChat::new(api.clone());
        widget.open(&[child("ada")]).await;
        api.clear_calls();
        assert!(!widget.state().selection.sidebar_open);

        widget.toggle_sidebar().await;
        assert!(widget.state().selection.sidebar_open);

        widget.toggle_sidebar().await;
        assert!(!widget.state().selection.sidebar_open);
        assert!(api.calls().is_empty());
    }

    #[tokio::test]
    async fn switching_child_resets_context_and_re_establishes() {
        let api = Arc::new(MockAdvisorApi::new());
        let roster = vec![child("ada"), child("ben")];
        let mut widget = AdvisorChat::new(api.clone());
        widget.open(&roster).await;
        widget.select_focus_session(Some(Uuid::new_v4())).await;
        api.clear_calls();

        let second = roster[1].id;
        widget.select_child(second).await;

        assert_eq!(widget.state().selection.focus_session_id, None);
        assert!(!widget.state().selection.viewing_history);
        assert_eq!(
            api.calls(),
            vec![
                ApiCall::ListSessions(second),
                ApiCall::ListConversations(Some(second)),
                ApiCall::StartChat {
                    child_id: second,
                    focus: None,
                },
            ]
        );
    }
}
