//! HTTP transport to the inference service.

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

use super::prompt::BattlePrompt;
use crate::api::MoveProvider;

#[derive(Debug, Clone, Error)]
pub enum InferenceError {
    #[error("inference transport failed: {0}")]
    Transport(String),

    #[error("inference service answered {status}: {body}")]
    Status { status: u16, body: String },

    #[error("inference response unreadable: {0}")]
    InvalidResponse(String),
}

/// Posts the prompt as JSON and returns the response body.
///
/// Bodies that are not JSON come back as a JSON string so the shape decoder
/// can still try to unwrap them.
pub struct HttpMoveProvider {
    endpoint: String,
    api_key: Option<String>,
    http: reqwest::Client,
}

impl HttpMoveProvider {
    pub fn new(endpoint: impl Into<String>) -> Result<Self, InferenceError> {
        let http = reqwest::Client::builder()
            .build()
            .map_err(|e| InferenceError::Transport(e.to_string()))?;
        Ok(Self {
            endpoint: endpoint.into(),
            api_key: None,
            http,
        })
    }

    /// Sends `key` as a bearer token on every request.
    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl MoveProvider for HttpMoveProvider {
    async fn request_moves(&self, prompt: &BattlePrompt) -> Result<Value, InferenceError> {
        let mut request = self.http.post(&self.endpoint).json(prompt);
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request
            .send()
            .await
            .map_err(|e| InferenceError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(InferenceError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let body = response
            .text()
            .await
            .map_err(|e| InferenceError::InvalidResponse(e.to_string()))?;
        tracing::trace!(round = prompt.round, %body, "inference response");

        Ok(serde_json::from_str(&body).unwrap_or(Value::String(body)))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use arena_core::{Combatant, Traits, WarriorId};
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use tokio::sync::Mutex;

    use super::*;
    use crate::inference::prompt::AgentBrief;

    fn prompt() -> BattlePrompt {
        let brief = |id| {
            AgentBrief::new(
                &Combatant::new(WarriorId(id), Traits::default(), 0),
                None,
                vec![],
            )
            .unwrap()
        };
        BattlePrompt::new(1, 5, brief(1), brief(2))
    }

    /// One-shot HTTP server: records the request, answers with `status` and `body`.
    async fn serve_once(status: &'static str, body: &'static str) -> (String, Arc<Mutex<String>>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let url = format!("http://{}/moves", listener.local_addr().unwrap());
        let seen = Arc::new(Mutex::new(String::new()));
        let record = Arc::clone(&seen);

        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = Vec::new();
            let mut chunk = [0u8; 1024];
            loop {
                let n = socket.read(&mut chunk).await.unwrap();
                if n == 0 {
                    break;
                }
                buf.extend_from_slice(&chunk[..n]);
                let text = String::from_utf8_lossy(&buf).to_string();
                if let Some(end) = text.find("\r\n\r\n") {
                    let length = text[..end]
                        .lines()
                        .find_map(|line| {
                            let lower = line.to_ascii_lowercase();
                            lower
                                .strip_prefix("content-length:")
                                .map(|v| v.trim().parse::<usize>().unwrap())
                        })
                        .unwrap_or(0);
                    if buf.len() >= end + 4 + length {
                        break;
                    }
                }
            }
            *record.lock().await = String::from_utf8_lossy(&buf).to_string();

            let response = format!(
                "HTTP/1.1 {status}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
                body.len()
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.unwrap();
        });

        (url, seen)
    }

    #[tokio::test]
    async fn posts_prompt_with_bearer_token() {
        let (url, seen) =
            serve_once("200 OK", r#"{"agent_1":"strike","agent_2":"dodge"}"#).await;
        let provider = HttpMoveProvider::new(url).unwrap().with_api_key("secret");

        let response = provider.request_moves(&prompt()).await.unwrap();
        assert_eq!(response["agent_2"], "dodge");

        let request = seen.lock().await.to_ascii_lowercase();
        assert!(request.starts_with("post /moves"));
        assert!(request.contains("authorization: bearer secret"));
        assert!(request.contains("\"max_rounds\":5"));
    }

    #[tokio::test]
    async fn non_success_status_is_an_error() {
        let (url, _) = serve_once("503 Service Unavailable", "busy").await;
        let provider = HttpMoveProvider::new(url).unwrap();

        let err = provider.request_moves(&prompt()).await.unwrap_err();
        assert!(matches!(err, InferenceError::Status { status: 503, ref body } if body == "busy"));
    }

    #[tokio::test]
    async fn plain_text_bodies_become_json_strings() {
        let (url, _) = serve_once("200 OK", "strike and dodge").await;
        let provider = HttpMoveProvider::new(url).unwrap();

        let response = provider.request_moves(&prompt()).await.unwrap();
        assert_eq!(response, Value::String("strike and dodge".into()));
    }
}
