use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, StatusCode};
use serde_json::Value;
use thiserror::Error;
use url::Url;

use crate::pairing::StartConversationPayload;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("url error: {0}")]
    Url(#[from] url::ParseError),
    #[error("unexpected status: {0}")]
    Status(u16),
    #[error("not authenticated")]
    Unauthorized,
}

/// The two inbox calls the conversation launcher depends on.
///
/// Responses are handed back as raw JSON; their envelope varies by endpoint
/// version and is unpicked by [`crate::extract`]. Implementations carry their
/// own authentication.
#[async_trait]
pub trait InboxTransport: Send + Sync {
    async fn list_conversations(&self, limit: u32, offset: u32) -> Result<Value, ApiError>;

    async fn start_conversation(&self, payload: &StartConversationPayload) -> Result<Value, ApiError>;
}

#[derive(Clone)]
pub struct ApiClient {
    base_url: String,
    http: Client,
}

impl ApiClient {
    pub fn new(base_url: String) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            http: Client::new(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub async fn list_conversations(
        &self,
        token: &str,
        limit: u32,
        offset: u32,
    ) -> Result<Value, ApiError> {
        let mut url = self.conversations_url()?;
        url.query_pairs_mut()
            .append_pair("offset", &offset.to_string())
            .append_pair("limit", &limit.to_string());
        let request = self.http.get(url).bearer_auth(token);
        self.send(request).await
    }

    pub async fn start_conversation(
        &self,
        token: &str,
        payload: &StartConversationPayload,
    ) -> Result<Value, ApiError> {
        let url = self.conversations_url()?;
        let request = self.http.post(url).bearer_auth(token).json(payload);
        self.send(request).await
    }

    fn conversations_url(&self) -> Result<Url, ApiError> {
        Ok(Url::parse(&format!("{}/api/v1/inbox/conversations", self.base_url))?)
    }

    // A 2xx body that is not JSON comes back as `Value::Null`; callers treat it
    // as a response without a usable id.
    async fn send(&self, request: RequestBuilder) -> Result<Value, ApiError> {
        let response = request.send().await?;
        let status = response.status();
        if status == StatusCode::UNAUTHORIZED {
            return Err(ApiError::Unauthorized);
        }
        if !status.is_success() {
            return Err(ApiError::Status(status.as_u16()));
        }
        let body = response.text().await?;
        match serde_json::from_str(&body) {
            Ok(value) => Ok(value),
            Err(error) => {
                tracing::debug!(%error, status = status.as_u16(), "inbox response is not json");
                Ok(Value::Null)
            }
        }
    }
}

/// An [`ApiClient`] bound to a bearer token.
#[derive(Clone)]
pub struct InboxSession {
    api: ApiClient,
    token: String,
}

impl InboxSession {
    pub fn new(api: ApiClient, token: String) -> Self {
        Self { api, token }
    }
}

#[async_trait]
impl InboxTransport for InboxSession {
    async fn list_conversations(&self, limit: u32, offset: u32) -> Result<Value, ApiError> {
        self.api.list_conversations(&self.token, limit, offset).await
    }

    async fn start_conversation(&self, payload: &StartConversationPayload) -> Result<Value, ApiError> {
        self.api.start_conversation(&self.token, payload).await
    }
}
