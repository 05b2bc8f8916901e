//! HTTP implementation of the advisor backend API.
//!
//! Talks JSON to the parent portal backend under its `/parent` router.
//! Non-2xx responses carry the backend's `{"detail": ...}` error shape,
//! which is surfaced as `SproutError::Api`.

use crate::config::ApiConfig;
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::{Deserialize, Serialize};
use sprout_core::advisor::{
    AdvisorApi, ChatMessage, ConversationSummary, EstablishedChat, LoadedChat, SendOutcome,
    SessionSummary,
};
use sprout_core::child::ChildProfile;
use sprout_core::error::{Result, SproutError};
use uuid::Uuid;

/// HTTP client for the parent portal backend.
#[derive(Clone)]
pub struct HttpAdvisorApi {
    client: Client,
    config: ApiConfig,
}

impl HttpAdvisorApi {
    /// Creates a client with the provided configuration.
    pub fn new(config: ApiConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    /// Creates a client configured from environment variables.
    pub fn try_from_env() -> Result<Self> {
        Ok(Self::new(ApiConfig::try_from_env()?))
    }

    /// Fetches the parent's child roster.
    ///
    /// Not part of [`AdvisorApi`]: the embedding shell normally supplies
    /// the roster, but standalone front ends need to fetch it themselves.
    pub async fn list_children(&self) -> Result<Vec<ChildProfile>> {
        let response = self
            .get(&self.config.endpoint("/parent/children"))
            .send()
            .await?;
        Ok(expect_success(response).await?.json().await?)
    }

    fn get(&self, url: &str) -> RequestBuilder {
        self.authorize(self.client.get(url))
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.config.auth_token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }
}

#[async_trait]
impl AdvisorApi for HttpAdvisorApi {
    async fn list_sessions(&self, child_id: Uuid) -> Result<Vec<SessionSummary>> {
        let url = self
            .config
            .endpoint(&format!("/parent/children/{child_id}/sessions"));
        let response = self.get(&url).send().await?;
        Ok(expect_success(response).await?.json().await?)
    }

    async fn list_conversations(
        &self,
        child_id: Option<Uuid>,
    ) -> Result<Vec<ConversationSummary>> {
        let url = self.config.endpoint("/parent/advisor/conversations");
        let mut request = self.get(&url);
        if let Some(child_id) = child_id {
            request = request.query(&[("child_id", child_id.to_string())]);
        }
        let response = request.send().await?;
        Ok(expect_success(response).await?.json().await?)
    }

    async fn start_chat(
        &self,
        child_id: Uuid,
        focus_session_id: Option<Uuid>,
    ) -> Result<EstablishedChat> {
        let url = self.config.endpoint("/parent/advisor/chat");
        let response = self
            .authorize(self.client.post(&url))
            .json(&StartChatRequest {
                child_id,
                focus_session_id,
            })
            .send()
            .await?;
        let body: StartChatResponse = expect_success(response).await?.json().await?;
        Ok(EstablishedChat {
            chat_id: body.chat_id,
            messages: body.messages,
        })
    }

    async fn load_chat(&self, conversation_id: Uuid) -> Result<LoadedChat> {
        let url = self
            .config
            .endpoint(&format!("/parent/advisor/conversations/{conversation_id}"));
        let response = self.get(&url).send().await?;
        let body: LoadChatResponse = expect_success(response)
            .await
            .map_err(|err| conversation_not_found(err, conversation_id))?
            .json()
            .await?;
        Ok(LoadedChat {
            chat_id: body.chat.id,
            focus_session_id: body.chat.focus_session_id,
            messages: body.messages,
        })
    }

    async fn update_focus(&self, chat_id: Uuid, focus_session_id: Option<Uuid>) -> Result<()> {
        let url = self
            .config
            .endpoint(&format!("/parent/advisor/chat/{chat_id}/focus"));
        let response = self
            .authorize(self.client.patch(&url))
            .json(&UpdateFocusRequest { focus_session_id })
            .send()
            .await?;
        expect_success(response).await?;
        Ok(())
    }

    async fn send_message(&self, chat_id: Uuid, text: &str) -> Result<SendOutcome> {
        let url = self
            .config
            .endpoint(&format!("/parent/advisor/chat/{chat_id}/messages"));
        let response = self
            .authorize(self.client.post(&url))
            .json(&SendMessageRequest { message: text })
            .send()
            .await?;
        let body: SendMessageResponse = expect_success(response).await?.json().await?;
        Ok(SendOutcome {
            assistant_message: body.assistant_message,
            appended_notes: body.appended_notes,
        })
    }
}

#[derive(Serialize)]
struct StartChatRequest {
    child_id: Uuid,
    #[serde(skip_serializing_if = "Option::is_none")]
    focus_session_id: Option<Uuid>,
}

#[derive(Deserialize)]
struct StartChatResponse {
    chat_id: Uuid,
    messages: Vec<ChatMessage>,
}

#[derive(Deserialize)]
struct ChatMeta {
    id: Uuid,
    #[serde(default)]
    focus_session_id: Option<Uuid>,
}

#[derive(Deserialize)]
struct LoadChatResponse {
    chat: ChatMeta,
    messages: Vec<ChatMessage>,
}

#[derive(Serialize)]
struct UpdateFocusRequest {
    focus_session_id: Option<Uuid>,
}

#[derive(Serialize)]
struct SendMessageRequest<'a> {
    message: &'a str,
}

#[derive(Deserialize)]
struct SendMessageResponse {
    assistant_message: ChatMessage,
    #[serde(default)]
    appended_notes: Vec<String>,
}

#[derive(Deserialize)]
struct ErrorResponse {
    detail: String,
}

async fn expect_success(response: Response) -> Result<Response> {
    if response.status().is_success() {
        return Ok(response);
    }
    let status = response.status();
    let body = response
        .text()
        .await
        .unwrap_or_else(|_| "failed to read error body".to_string());
    Err(map_http_error(status, body))
}

fn map_http_error(status: StatusCode, body: String) -> SproutError {
    let message = serde_json::from_str::<ErrorResponse>(&body)
        .map(|wrapper| wrapper.detail)
        .unwrap_or(body);
    SproutError::api(status.as_u16(), message)
}

/// A 404 on a conversation load means the id itself is gone (deleted or
/// never persisted), not a transient backend failure.
fn conversation_not_found(err: SproutError, conversation_id: Uuid) -> SproutError {
    match err {
        SproutError::Api { status: 404, .. } => {
            SproutError::not_found("Conversation", conversation_id.to_string())
        }
        other => other,
    }
}
