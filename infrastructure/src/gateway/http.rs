//! REST adapter for the chat backend.
//!
//! Routes (all under `{base_url}/api`):
//!
//! | Operation | Route |
//! |---|---|
//! | list | `GET /chats` |
//! | create | `POST /chats` |
//! | get | `GET /chats/{id}` |
//! | update | `PUT /chats/{id}` |
//! | delete | `DELETE /chats/{id}` |
//! | search | `GET /chats/search?q=` |
//! | append message | `POST /chats/{id}/messages` |
//!
//! Authentication is a session cookie forwarded verbatim. A 401 from any
//! route raises [`SessionExpiry`] and surfaces as
//! [`GatewayError::Unauthorized`].

use super::envelope::{AppendBody, ChatBody, ChatsBody, ErrorBody};
use super::expiry::SessionExpiry;
use crate::config::FileServerConfig;
use async_trait::async_trait;
use polychat_application::ports::session_gateway::{GatewayError, SessionGateway};
use polychat_domain::{
    Conversation, ConversationId, ConversationPatch, MessageContent, MessagePair, NewConversation,
};
use reqwest::header::COOKIE;
use reqwest::{Method, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::json;
use std::time::Duration;
use tracing::{debug, warn};

pub struct HttpSessionGateway {
    client: reqwest::Client,
    base_url: String,
    session_cookie: Option<String>,
    expiry: SessionExpiry,
}

impl HttpSessionGateway {
    /// Create a gateway for the backend at `base_url`.
    ///
    /// `timeout` bounds every request; `None` waits indefinitely.
    pub fn new(
        base_url: impl Into<String>,
        timeout: Option<Duration>,
    ) -> Result<Self, GatewayError> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| GatewayError::Transport(e.to_string()))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            session_cookie: None,
            expiry: SessionExpiry::new(),
        })
    }

    /// Create a gateway from the `[server]` config section
    pub fn from_config(config: &FileServerConfig) -> Result<Self, GatewayError> {
        Ok(Self::new(config.base_url.trim(), config.request_timeout())?
            .with_session_cookie(config.session_cookie.clone()))
    }

    pub fn with_session_cookie(mut self, cookie: Option<String>) -> Self {
        self.session_cookie = cookie.filter(|c| !c.trim().is_empty());
        self
    }

    pub fn with_expiry(mut self, expiry: SessionExpiry) -> Self {
        self.expiry = expiry;
        self
    }

    /// Signal raised when the backend rejects the session
    pub fn expiry(&self) -> &SessionExpiry {
        &self.expiry
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = format!("{}/api{}", self.base_url, path);
        let builder = self.client.request(method, url);
        match &self.session_cookie {
            Some(cookie) => builder.header(COOKIE, cookie),
            None => builder,
        }
    }

    /// Send `request`, mapping transport and status failures. Returns the body.
    async fn send(&self, request: RequestBuilder, upstream: bool) -> Result<String, GatewayError> {
        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                GatewayError::Timeout
            } else {
                GatewayError::Transport(e.to_string())
            }
        })?;

        let status = response.status();
        let body = response.text().await.map_err(|e| {
            if e.is_timeout() {
                GatewayError::Timeout
            } else {
                GatewayError::Transport(e.to_string())
            }
        })?;

        if status.is_success() {
            Ok(body)
        } else {
            Err(self.status_error(status, &body, upstream))
        }
    }

    async fn fetch<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, GatewayError> {
        let body = self.send(request, false).await?;
        decode(&body)
    }

    /// Map a non-success response. `upstream` marks routes whose 5xx means
    /// the model failed to answer rather than the server itself.
    fn status_error(&self, status: StatusCode, body: &str, upstream: bool) -> GatewayError {
        let message = serde_json::from_str::<ErrorBody>(body)
            .map(|b| b.error)
            .unwrap_or_else(|_| {
                status
                    .canonical_reason()
                    .unwrap_or("unexpected status")
                    .to_string()
            });

        match status {
            StatusCode::UNAUTHORIZED => {
                warn!("Backend rejected the session");
                self.expiry.signal();
                GatewayError::Unauthorized
            }
            StatusCode::NOT_FOUND => GatewayError::NotFound(message),
            StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => {
                GatewayError::Validation(message)
            }
            s if s.is_server_error() && upstream => GatewayError::Upstream(message),
            s => GatewayError::Server {
                status: s.as_u16(),
                message,
            },
        }
    }
}

fn decode<T: DeserializeOwned>(body: &str) -> Result<T, GatewayError> {
    serde_json::from_str(body).map_err(|e| GatewayError::Decode(e.to_string()))
}

fn chat_path(id: &ConversationId) -> String {
    format!("/chats/{}", id)
}

#[async_trait]
impl SessionGateway for HttpSessionGateway {
    async fn list_conversations(&self) -> Result<Vec<Conversation>, GatewayError> {
        let body: ChatsBody = self.fetch(self.request(Method::GET, "/chats")).await?;
        let chats = body.into_summaries();
        debug!("Listed {} conversations", chats.len());
        Ok(chats)
    }

    async fn create_conversation(
        &self,
        request: &NewConversation,
    ) -> Result<Conversation, GatewayError> {
        let body: ChatBody = self
            .fetch(self.request(Method::POST, "/chats").json(request))
            .await?;
        Ok(body.into_conversation())
    }

    async fn get_conversation(&self, id: &ConversationId) -> Result<Conversation, GatewayError> {
        let body: ChatBody = self.fetch(self.request(Method::GET, &chat_path(id))).await?;
        Ok(body.into_conversation())
    }

    async fn update_conversation(
        &self,
        id: &ConversationId,
        patch: &ConversationPatch,
    ) -> Result<Conversation, GatewayError> {
        let body: ChatBody = self
            .fetch(self.request(Method::PUT, &chat_path(id)).json(patch))
            .await?;
        Ok(body.into_conversation())
    }

    async fn delete_conversation(&self, id: &ConversationId) -> Result<(), GatewayError> {
        self.send(self.request(Method::DELETE, &chat_path(id)), false)
            .await?;
        Ok(())
    }

    async fn search_conversations(&self, query: &str) -> Result<Vec<Conversation>, GatewayError> {
        let request = self
            .request(Method::GET, "/chats/search")
            .query(&[("q", query)]);
        let body: ChatsBody = self.fetch(request).await?;
        Ok(body.into_summaries())
    }

    async fn append_message(
        &self,
        id: &ConversationId,
        content: &MessageContent,
    ) -> Result<MessagePair, GatewayError> {
        let request = self
            .request(Method::POST, &format!("{}/messages", chat_path(id)))
            .json(&json!({ "content": content.as_str() }));
        let body = self.send(request, true).await?;
        let pair: AppendBody = decode(&body)?;
        Ok(pair.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use polychat_domain::{Model, Role};
    use serde_json::Value;
    use wiremock::matchers::{body_json, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn chat(id: u64, title: &str) -> Value {
        json!({
            "id": id,
            "user_id": 1,
            "title": title,
            "model": "gpt-4",
            "created_at": "2024-06-01T10:00:00.000000",
            "updated_at": "2024-06-01T10:05:00.000000",
            "message_count": 0
        })
    }

    fn message(id: u64, chat_id: u64, role: &str, content: &str) -> Value {
        json!({
            "id": id,
            "chat_id": chat_id,
            "role": role,
            "content": content,
            "timestamp": "2024-06-01T10:05:00"
        })
    }

    fn gateway(server: &MockServer) -> HttpSessionGateway {
        HttpSessionGateway::new(server.uri(), None).unwrap()
    }

    // ==================== Success paths ====================

    #[tokio::test]
    async fn test_list_conversations() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/chats"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({ "chats": [chat(2, "newer"), chat(1, "older")] })),
            )
            .mount(&server)
            .await;

        let chats = gateway(&server).list_conversations().await.unwrap();

        assert_eq!(chats.len(), 2);
        assert_eq!(chats[0].id.as_str(), "2");
        assert_eq!(chats[0].title, "newer");
        assert_eq!(chats[0].model, Model::Gpt4);
        assert!(chats.iter().all(|c| c.messages.is_none()));
    }

    #[tokio::test]
    async fn test_create_conversation_posts_request() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/chats"))
            .and(body_json(json!({ "title": "Plans", "model": "claude-3-haiku-20240307" })))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({
                "message": "Chat created successfully",
                "chat": chat(5, "Plans")
            })))
            .expect(1)
            .mount(&server)
            .await;

        let request = NewConversation::new(Some("Plans"), Model::Claude3Haiku);
        let created = gateway(&server)
            .create_conversation(&request)
            .await
            .unwrap();

        assert_eq!(created.id.as_str(), "5");
    }

    #[tokio::test]
    async fn test_create_without_title_omits_field() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/chats"))
            .and(body_json(json!({ "model": "gpt-4" })))
            .respond_with(
                ResponseTemplate::new(201).set_body_json(json!({ "chat": chat(6, "New Chat") })),
            )
            .expect(1)
            .mount(&server)
            .await;

        let created = gateway(&server)
            .create_conversation(&NewConversation::new(None, Model::Gpt4))
            .await
            .unwrap();

        assert_eq!(created.title, "New Chat");
    }

    #[tokio::test]
    async fn test_get_conversation_embeds_messages() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/chats/3"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "chat": chat(3, "Trip"),
                "messages": [message(10, 3, "user", "hi"), message(11, 3, "assistant", "hello")]
            })))
            .mount(&server)
            .await;

        let conversation = gateway(&server)
            .get_conversation(&ConversationId::new("3"))
            .await
            .unwrap();

        let messages = conversation.messages.unwrap();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].role, Role::User);
        assert_eq!(messages[1].content, "hello");
        assert_eq!(messages[1].conversation_id.as_str(), "3");
    }

    #[tokio::test]
    async fn test_update_conversation_puts_patch() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(path("/api/chats/3"))
            .and(body_json(json!({ "title": "Renamed" })))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({ "chat": chat(3, "Renamed") })),
            )
            .expect(1)
            .mount(&server)
            .await;

        let updated = gateway(&server)
            .update_conversation(&ConversationId::new("3"), &ConversationPatch::title("Renamed"))
            .await
            .unwrap();

        assert_eq!(updated.title, "Renamed");
    }

    #[tokio::test]
    async fn test_delete_conversation() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/api/chats/3"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({ "message": "Chat deleted successfully" })),
            )
            .expect(1)
            .mount(&server)
            .await;

        gateway(&server)
            .delete_conversation(&ConversationId::new("3"))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_search_sends_query_param() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/chats/search"))
            .and(query_param("q", "rust async"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({ "chats": [chat(4, "rust async")] })),
            )
            .expect(1)
            .mount(&server)
            .await;

        let results = gateway(&server)
            .search_conversations("rust async")
            .await
            .unwrap();

        assert_eq!(results.len(), 1);
    }

    #[tokio::test]
    async fn test_append_message_returns_pair() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/chats/3/messages"))
            .and(body_json(json!({ "content": "hi" })))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({
                "user_message": message(10, 3, "user", "hi"),
                "ai_message": message(11, 3, "assistant", "hello"),
                "chat": chat(3, "hi")
            })))
            .mount(&server)
            .await;

        let content = MessageContent::try_new("hi").unwrap();
        let pair = gateway(&server)
            .append_message(&ConversationId::new("3"), &content)
            .await
            .unwrap();

        assert_eq!(pair.user.id.as_str(), "10");
        assert_eq!(pair.user.role, Role::User);
        assert_eq!(pair.assistant.id.as_str(), "11");
        assert_eq!(pair.assistant.role, Role::Assistant);
    }

    #[tokio::test]
    async fn test_session_cookie_forwarded() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/chats"))
            .and(header("cookie", "session=abc123"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "chats": [] })))
            .expect(1)
            .mount(&server)
            .await;

        let gateway = gateway(&server).with_session_cookie(Some("session=abc123".to_string()));
        assert!(gateway.list_conversations().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_trailing_slash_in_base_url() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/chats"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .expect(1)
            .mount(&server)
            .await;

        let gateway = HttpSessionGateway::new(format!("{}/", server.uri()), None).unwrap();
        assert!(gateway.list_conversations().await.unwrap().is_empty());
    }

    // ==================== Error mapping ====================

    #[tokio::test]
    async fn test_unauthorized_raises_expiry() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(401).set_body_json(json!({ "error": "Login required" })),
            )
            .mount(&server)
            .await;

        let gateway = gateway(&server);
        let expired = gateway.expiry().subscribe();

        let err = gateway.list_conversations().await.unwrap_err();

        assert_eq!(err, GatewayError::Unauthorized);
        assert!(gateway.expiry().is_expired());
        assert!(expired.has_changed().unwrap());
    }

    #[tokio::test]
    async fn test_not_found_carries_error_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/chats/99"))
            .respond_with(
                ResponseTemplate::new(404).set_body_json(json!({ "error": "Chat not found" })),
            )
            .mount(&server)
            .await;

        let err = gateway(&server)
            .get_conversation(&ConversationId::new("99"))
            .await
            .unwrap_err();

        assert_eq!(err, GatewayError::NotFound("Chat not found".to_string()));
        assert!(!err.is_unauthorized());
    }

    #[tokio::test]
    async fn test_bad_request_is_validation() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(400)
                    .set_body_json(json!({ "error": "Invalid model selected" })),
            )
            .mount(&server)
            .await;

        let err = gateway(&server)
            .create_conversation(&NewConversation::new(None, Model::Custom("x".to_string())))
            .await
            .unwrap_err();

        assert_eq!(
            err,
            GatewayError::Validation("Invalid model selected".to_string())
        );
    }

    #[tokio::test]
    async fn test_append_server_error_is_upstream() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/chats/3/messages"))
            .respond_with(
                ResponseTemplate::new(500)
                    .set_body_json(json!({ "error": "Failed to generate AI response" })),
            )
            .mount(&server)
            .await;

        let content = MessageContent::try_new("hi").unwrap();
        let err = gateway(&server)
            .append_message(&ConversationId::new("3"), &content)
            .await
            .unwrap_err();

        assert_eq!(
            err,
            GatewayError::Upstream("Failed to generate AI response".to_string())
        );
    }

    #[tokio::test]
    async fn test_other_server_error_keeps_status() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503).set_body_string("<html>down</html>"))
            .mount(&server)
            .await;

        let err = gateway(&server).list_conversations().await.unwrap_err();

        assert_eq!(
            err,
            GatewayError::Server {
                status: 503,
                message: "Service Unavailable".to_string(),
            }
        );
    }

    #[tokio::test]
    async fn test_malformed_body_is_decode_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&server)
            .await;

        let err = gateway(&server).list_conversations().await.unwrap_err();
        assert!(matches!(err, GatewayError::Decode(_)));
    }

    #[tokio::test]
    async fn test_timeout() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({ "chats": [] }))
                    .set_delay(Duration::from_secs(2)),
            )
            .mount(&server)
            .await;

        let gateway =
            HttpSessionGateway::new(server.uri(), Some(Duration::from_millis(100))).unwrap();
        let err = gateway.list_conversations().await.unwrap_err();

        assert_eq!(err, GatewayError::Timeout);
    }

    #[tokio::test]
    async fn test_connection_refused_is_transport() {
        let gateway = HttpSessionGateway::new("http://127.0.0.1:1", None).unwrap();
        let err = gateway.list_conversations().await.unwrap_err();
        assert!(matches!(err, GatewayError::Transport(_)));
    }

    #[test]
    fn test_from_config() {
        let config = FileServerConfig {
            base_url: "http://example.test/".to_string(),
            session_cookie: Some("  ".to_string()),
            request_timeout_secs: Some(5),
        };
        let gateway = HttpSessionGateway::from_config(&config).unwrap();
        assert_eq!(gateway.base_url, "http://example.test");
        assert!(gateway.session_cookie.is_none());
    }
}
