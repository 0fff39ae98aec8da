use super::base_client::{ErrorBody, HttpClient, data_stream};
use super::{CompletionRequest, Fragment, FragmentStream, LLMProvider};
use crate::core::error::ChatError;
use crate::prompt::ChatEntry;
use crate::settings::{Model, Temperature};
use async_trait::async_trait;
use futures::StreamExt;
use serde::{Deserialize, Serialize};

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

#[derive(Serialize)]
struct ChatCompletionRequest<'a> {
    model: Model,
    temperature: Temperature,
    messages: &'a [ChatEntry],
    stream: bool,
}

#[derive(Deserialize)]
struct StreamResponse {
    #[serde(default)]
    choices: Vec<StreamChoice>,
    error: Option<ErrorBody>,
}

#[derive(Deserialize)]
struct StreamChoice {
    #[serde(default)]
    delta: StreamDelta,
}

#[derive(Deserialize, Default)]
struct StreamDelta {
    content: Option<String>,
}

/// Decodes one `chat.completion.chunk` payload.
///
/// An `error` object sent in place of a chunk fails the stream.
fn parse_chunk(data: &str) -> Result<Fragment, ChatError> {
    let parsed: StreamResponse = serde_json::from_str(data)
        .map_err(|e| ChatError::Serialization(format!("Failed to parse stream data: {}", e)))?;

    if let Some(error) = parsed.error {
        let message = if error.message.is_empty() {
            "An error occurred during streaming".to_string()
        } else {
            error.message
        };
        tracing::warn!(%message, "API reported an error mid-stream");
        return Err(ChatError::Transport(format!("API error: {}", message)));
    }

    match parsed.choices.into_iter().next().and_then(|c| c.delta.content) {
        Some(text) => Ok(Fragment::text(text)),
        None => Ok(Fragment::empty()),
    }
}

#[derive(Clone)]
pub struct OpenAIProvider {
    client: HttpClient,
}

impl OpenAIProvider {
    pub fn with_endpoint(endpoint: &str, api_key: &str) -> Result<Self, ChatError> {
        Ok(Self {
            client: HttpClient::new(endpoint, api_key)?,
        })
    }

    pub fn endpoint(&self) -> &str {
        self.client.endpoint()
    }
}

#[async_trait]
impl LLMProvider for OpenAIProvider {
    async fn complete(&self, request: &CompletionRequest) -> Result<FragmentStream, ChatError> {
        let payload = ChatCompletionRequest {
            model: request.model,
            temperature: request.temperature,
            messages: &request.messages,
            stream: true,
        };

        let response = self.client.post("chat/completions", &payload).await?;
        tracing::debug!(model = %request.model, "completion stream opened");

        let stream = data_stream(response).map(|item| item.and_then(|data| parse_chunk(&data)));
        Ok(stream.boxed())
    }
}
