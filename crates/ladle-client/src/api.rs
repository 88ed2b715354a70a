//! HTTP collaborator for conversation listing and detail.
//!
//! Read-only from this crate's perspective: the authoritative message list
//! lives server-side and the cache is rebuilt from these endpoints.

use ladle_core::messages::{Conversation, ConversationList};
use thiserror::Error;

/// Failure talking to the listing/detail endpoints.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Network-level failure.
    #[error("request failed: {0}")]
    Network(#[from] reqwest::Error),

    /// The conversation does not exist server-side.
    #[error("conversation `{id}` not found")]
    NotFound {
        /// The requested conversation id.
        id: String,
    },

    /// The server answered with a non-success status.
    #[error("server returned status {status}")]
    Status {
        /// HTTP status code.
        status: u16,
    },
}

/// Client for the conversation HTTP endpoints.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    /// Client against the given backend origin.
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_owned();
        Self {
            http: reqwest::Client::new(),
            base_url,
        }
    }

    /// `GET /api/conversations?user_id=&limit=` — the user's conversations.
    pub async fn list_conversations(
        &self,
        user_id: &str,
        limit: Option<usize>,
    ) -> Result<ConversationList, FetchError> {
        let mut request = self
            .http
            .get(format!("{}/api/conversations", self.base_url))
            .query(&[("user_id", user_id)]);
        if let Some(limit) = limit {
            request = request.query(&[("limit", limit.to_string())]);
        }
        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                status: status.as_u16(),
            });
        }
        Ok(response.json().await?)
    }

    /// `GET /api/conversations/{id}` — full transcript for one conversation.
    pub async fn get_conversation(&self, id: &str) -> Result<Conversation, FetchError> {
        let response = self
            .http
            .get(format!("{}/api/conversations/{id}", self.base_url))
            .send()
            .await?;
        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(FetchError::NotFound { id: id.to_owned() });
        }
        if !status.is_success() {
            return Err(FetchError::Status {
                status: status.as_u16(),
            });
        }
        Ok(response.json().await?)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    fn listing_body() -> serde_json::Value {
        serde_json::json!({
            "conversations": [{
                "conversation_id": "c1",
                "user_id": "u1",
                "messages": [],
                "metadata": {"title": "Soup night", "tags": []},
                "created_at": "2025-03-01T12:00:00Z",
                "updated_at": "2025-03-01T12:00:00Z"
            }],
            "total": 1
        })
    }

    #[tokio::test]
    async fn list_conversations_parses_response() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/conversations"))
            .and(query_param("user_id", "u1"))
            .and(query_param("limit", "25"))
            .respond_with(ResponseTemplate::new(200).set_body_json(listing_body()))
            .mount(&server)
            .await;

        let api = ApiClient::new(server.uri());
        let list = api.list_conversations("u1", Some(25)).await.unwrap();
        assert_eq!(list.total, 1);
        assert_eq!(list.conversations[0].conversation_id, "c1");
        assert_eq!(list.conversations[0].title(), "Soup night");
    }

    #[tokio::test]
    async fn list_conversations_omits_limit_when_none() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/conversations"))
            .respond_with(ResponseTemplate::new(200).set_body_json(listing_body()))
            .mount(&server)
            .await;

        let api = ApiClient::new(server.uri());
        let list = api.list_conversations("u1", None).await.unwrap();
        assert_eq!(list.conversations.len(), 1);
    }

    #[tokio::test]
    async fn server_error_surfaces_status() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/conversations"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let api = ApiClient::new(server.uri());
        let err = api.list_conversations("u1", None).await.unwrap_err();
        assert_matches!(err, FetchError::Status { status: 500 });
    }

    #[tokio::test]
    async fn get_conversation_parses_detail() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/conversations/c7"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "conversation_id": "c7",
                "user_id": "u1",
                "messages": [
                    {"message_id": "m1", "role": "user", "content": "ramen?",
                     "timestamp": "2025-03-01T12:00:00Z"}
                ],
                "metadata": {},
                "created_at": "2025-03-01T12:00:00Z",
                "updated_at": "2025-03-01T12:00:00Z"
            })))
            .mount(&server)
            .await;

        let api = ApiClient::new(server.uri());
        let conv = api.get_conversation("c7").await.unwrap();
        assert_eq!(conv.conversation_id, "c7");
        assert_eq!(conv.messages.len(), 1);
    }

    #[tokio::test]
    async fn missing_conversation_is_not_found() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/conversations/ghost"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let api = ApiClient::new(server.uri());
        let err = api.get_conversation("ghost").await.unwrap_err();
        assert_matches!(err, FetchError::NotFound { id } if id == "ghost");
    }

    #[tokio::test]
    async fn unreachable_server_is_network_error() {
        // Bind-then-drop guarantees a dead port.
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let api = ApiClient::new(format!("http://{addr}"));
        let err = api.list_conversations("u1", None).await.unwrap_err();
        assert_matches!(err, FetchError::Network(_));
    }
}
