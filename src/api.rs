use crate::{
    config::Config,
    errors::{ChatError, ChatResult},
    logging::log_api_call,
    models::{ApiCallLog, ChatRequest, ServerResponse},
    utils::snippet,
};
use chrono::Utc;
use reqwest::Client;
use std::time::Instant;

/// HTTP client for the chat endpoint. Cheap to clone; clones share one connection pool.
#[derive(Debug, Clone)]
pub struct ChatClient {
    http: Client,
    endpoint: String,
}

impl ChatClient {
    pub fn new(config: &Config) -> ChatResult<Self> {
        let http = Client::builder()
            .timeout(config.request_timeout())
            .build()?;

        Ok(Self {
            http,
            endpoint: config.chat_endpoint(),
        })
    }

    /// Posts `{"message": text}` and decodes the reply.
    ///
    /// Non-2xx statuses and bodies that are not a valid reply object are errors.
    pub async fn send(&self, text: &str) -> ChatResult<ServerResponse> {
        let started = Instant::now();
        let result = self.post(text).await;

        let response_status = match &result {
            Ok((status, _)) => *status,
            Err(ChatError::Status { status, .. }) => *status,
            Err(_) => 0,
        };
        log_api_call(&ApiCallLog {
            timestamp: Utc::now(),
            endpoint: self.endpoint.clone(),
            request_summary: snippet(text, 60),
            response_status,
            response_time_ms: started.elapsed().as_millis(),
        });

        result.map(|(_, reply)| reply)
    }

    async fn post(&self, text: &str) -> ChatResult<(u16, ServerResponse)> {
        let response = self
            .http
            .post(&self.endpoint)
            .json(&ChatRequest { message: text })
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(ChatError::status_error(status.as_u16(), snippet(&body, 200)));
        }

        let reply: ServerResponse = serde_json::from_str(&body)?;
        Ok((status.as_u16(), reply))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::{
        matchers::{body_json, header, method, path},
        Mock, MockServer, ResponseTemplate,
    };

    fn client_for(server: &MockServer) -> ChatClient {
        let mut config = Config::default();
        config.server_url = server.uri();
        ChatClient::new(&config).unwrap()
    }

    #[tokio::test]
    async fn test_posts_json_message() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/chat"))
            .and(header("content-type", "application/json"))
            .and(body_json(json!({ "message": "generate rego" })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "response": "Here is your Rego policy:",
                "rego_policy": "package p\n\ndefault allow = false\n"
            })))
            .expect(1)
            .mount(&mock_server)
            .await;

        let reply = client_for(&mock_server).send("generate rego").await.unwrap();
        assert_eq!(reply.response, "Here is your Rego policy:");
        assert_eq!(
            reply.rego_policy.as_deref(),
            Some("package p\n\ndefault allow = false\n")
        );
        assert_eq!(reply.message, None);
    }

    #[tokio::test]
    async fn test_non_json_reply_is_decode_error() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/chat"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
            .mount(&mock_server)
            .await;

        let err = client_for(&mock_server).send("hi").await.unwrap_err();
        assert!(matches!(err, ChatError::Decode(_)));
    }

    #[tokio::test]
    async fn test_error_status_is_reported() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/chat"))
            .respond_with(ResponseTemplate::new(500).set_body_string("Internal Server Error"))
            .mount(&mock_server)
            .await;

        let err = client_for(&mock_server).send("hi").await.unwrap_err();
        match err {
            ChatError::Status { status, body } => {
                assert_eq!(status, 500);
                assert_eq!(body, "Internal Server Error");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_unreachable_server_is_network_error() {
        let mock_server = MockServer::start().await;
        let client = client_for(&mock_server);
        drop(mock_server);

        let err = client.send("hi").await.unwrap_err();
        assert!(matches!(err, ChatError::Network(_)));
    }
}
