use super::streaming::{create_client, SseProcessor, COMPLETE_TIMEOUT};
use super::{ChatRequest, FragmentStream, LlmProvider};
use crate::config::Config;
use crate::error::{Error, Result};
use crate::history::Message;
use async_trait::async_trait;
use futures_util::StreamExt;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;

/// Fragments buffered between the HTTP reader and the consumer
const CHANNEL_CAPACITY: usize = 64;

/// Client for OpenAI-compatible `/chat/completions` endpoints (OpenAI, Groq,
/// local servers).
pub struct OpenAIProvider {
    client: reqwest::Client,
    api_key: Option<String>,
    api_url: String,
}

#[derive(Serialize)]
struct OpenAIRequest<'a> {
    model: &'a str,
    messages: &'a [Message],
    stream: bool,
}

#[derive(Deserialize, Debug)]
struct CompletionResponse {
    choices: Vec<CompletionChoice>,
}

#[derive(Deserialize, Debug)]
struct CompletionChoice {
    message: AssistantMessage,
}

#[derive(Deserialize, Debug)]
struct AssistantMessage {
    content: Option<String>,
}

#[derive(Deserialize, Debug)]
struct StreamChunk {
    choices: Vec<Choice>,
}

#[derive(Deserialize, Debug)]
struct Choice {
    #[serde(default)]
    delta: DeltaContent,
}

#[derive(Deserialize, Debug, Default)]
struct DeltaContent {
    content: Option<String>,
}

impl OpenAIProvider {
    pub fn new(config: &Config) -> Self {
        Self {
            client: create_client(),
            api_key: config.api_key.clone(),
            api_url: format!("{}/chat/completions", config.endpoint),
        }
    }

    async fn send(&self, request: &ChatRequest<'_>, stream: bool) -> Result<reqwest::Response> {
        let body = OpenAIRequest {
            model: request.model,
            messages: request.messages,
            stream,
        };

        let mut builder = self.client.post(&self.api_url).json(&body);
        if let Some(key) = &self.api_key {
            builder = builder.bearer_auth(key);
        }
        if !stream {
            builder = builder.timeout(COMPLETE_TIMEOUT);
        }

        tracing::debug!(url = %self.api_url, model = request.model, stream, "sending chat request");
        let response = builder.send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(Error::Api { status, body });
        }

        Ok(response)
    }
}

#[async_trait]
impl LlmProvider for OpenAIProvider {
    async fn complete(&self, request: &ChatRequest<'_>) -> Result<String> {
        let response = self.send(request, false).await?;
        let body: CompletionResponse = response.json().await?;
        body.choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| Error::InvalidResponse("missing choices[0].message.content".to_string()))
    }

    async fn stream(&self, request: &ChatRequest<'_>) -> Result<FragmentStream> {
        let response = self.send(request, true).await?;
        let (tx, rx) = mpsc::channel(CHANNEL_CAPACITY);
        tokio::spawn(forward_events(response, tx));
        Ok(ReceiverStream::new(rx).boxed())
    }
}

/// Reads the SSE body and sends each content delta down `tx` until the
/// response ends, fails, or the receiver goes away.
async fn forward_events(response: reqwest::Response, tx: mpsc::Sender<Result<String>>) {
    let mut processor = SseProcessor::new();
    let mut body = response.bytes_stream();

    while let Some(chunk) = body.next().await {
        let drained = chunk.map_err(Error::from).and_then(|chunk| {
            processor.push_chunk(&chunk);
            processor.process_events(parse_delta)
        });

        let drained = match drained {
            Ok(drained) => drained,
            Err(e) => {
                let _ = tx.send(Err(e)).await;
                return;
            }
        };

        for text in drained.texts {
            if tx.send(Ok(text)).await.is_err() {
                tracing::debug!("stream consumer went away, closing response");
                return;
            }
        }
        if drained.done {
            return;
        }
    }
}

/// Content of one streamed chunk. Unparseable chunks are logged and skipped.
fn parse_delta(data: &str) -> Result<Option<String>> {
    let chunk = match serde_json::from_str::<StreamChunk>(data) {
        Ok(chunk) => chunk,
        Err(e) => {
            tracing::warn!(error = %e, "skipping unparseable stream chunk");
            return Ok(None);
        }
    };

    Ok(chunk
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.delta.content)
        .filter(|content| !content.is_empty()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Backend;
    use crate::history::Role;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_delta() {
        let data = r#"{"id":"1","choices":[{"index":0,"delta":{"content":"Hel"}}]}"#;
        assert_eq!(parse_delta(data).unwrap(), Some("Hel".to_string()));
    }

    #[test]
    fn test_parse_delta_skips_empty_and_role_only_chunks() {
        let role_only = r#"{"choices":[{"delta":{"role":"assistant"}}]}"#;
        let empty = r#"{"choices":[{"delta":{"content":""}}]}"#;
        let finish = r#"{"choices":[{"delta":{},"finish_reason":"stop"}]}"#;
        let no_choices = r#"{"choices":[]}"#;
        for data in [role_only, empty, finish, no_choices] {
            assert_eq!(parse_delta(data).unwrap(), None, "data: {data}");
        }
    }

    #[test]
    fn test_parse_delta_skips_invalid_json() {
        assert_eq!(parse_delta("{not json").unwrap(), None);
    }

    #[test]
    fn test_request_body() {
        let messages = vec![
            Message::new(Role::System, "sys"),
            Message::new(Role::User, "hi"),
        ];
        let body = OpenAIRequest {
            model: "m",
            messages: &messages,
            stream: true,
        };
        assert_eq!(
            serde_json::to_value(&body).unwrap(),
            serde_json::json!({
                "model": "m",
                "messages": [
                    { "role": "system", "content": "sys" },
                    { "role": "user", "content": "hi" }
                ],
                "stream": true
            })
        );
    }

    #[test]
    fn test_completion_response_shape() {
        let body = r#"{"choices":[{"index":0,"message":{"role":"assistant","content":"Hi!"}}]}"#;
        let parsed: CompletionResponse = serde_json::from_str(body).unwrap();
        assert_eq!(parsed.choices[0].message.content.as_deref(), Some("Hi!"));
    }

    #[test]
    fn test_url_from_endpoint() {
        let config = Config {
            backend: Backend::Groq,
            endpoint: "https://api.groq.com/openai/v1".to_string(),
            api_key: None,
            default_model: "a".to_string(),
            fast_model: "b".to_string(),
            reasoning_model: "c".to_string(),
        };
        let provider = OpenAIProvider::new(&config);
        assert_eq!(
            provider.api_url,
            "https://api.groq.com/openai/v1/chat/completions"
        );
        assert_eq!(provider.api_key, None);
    }
}
