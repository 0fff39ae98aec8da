use crate::core::error::ChatError;
use eventsource_stream::{EventStreamError, Eventsource};
use futures::future;
use futures::stream::{BoxStream, Stream, StreamExt};
use reqwest::{Client, Response, StatusCode};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

const CONNECT_TIMEOUT: Duration = Duration::from_secs(30);
const DONE: &str = "[DONE]";

/// Shared HTTP plumbing for JSON-over-SSE completion endpoints.
#[derive(Clone)]
pub struct HttpClient {
    client: Client,
    endpoint: String,
    api_key: String,
}

impl HttpClient {
    pub fn new(endpoint: impl Into<String>, api_key: impl Into<String>) -> Result<Self, ChatError> {
        let client = Client::builder().connect_timeout(CONNECT_TIMEOUT).build()?;
        Ok(Self {
            client,
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// POSTs `payload` and returns the response once the status line says
    /// the stream is open.
    pub async fn post<T: Serialize + ?Sized>(
        &self,
        path: &str,
        payload: &T,
    ) -> Result<Response, ChatError> {
        let url = format!("{}/{}", self.endpoint, path);
        tracing::debug!(%url, "opening completion stream");

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .header("Accept", "text/event-stream")
            .json(payload)
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let detail = error_detail(&body);
        tracing::warn!(%url, %status, %detail, "completion request rejected");

        match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Err(ChatError::Configuration(
                format!("API key rejected ({}): {}", status, detail),
            )),
            _ => Err(ChatError::Transport(format!(
                "API returned error status {}: {}",
                status, detail
            ))),
        }
    }
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

/// The `error` object OpenAI-style APIs send, in error bodies and mid-stream.
#[derive(Debug, Deserialize)]
pub(super) struct ErrorBody {
    #[serde(default)]
    pub(super) message: String,
}

/// Pulls `error.message` out of an API error body, falling back to the raw text.
fn error_detail(body: &str) -> String {
    serde_json::from_str::<ErrorEnvelope>(body)
        .map(|e| e.error.message)
        .unwrap_or_else(|_| body.trim().to_string())
}

/// Turns an open response body into the sequence of SSE `data` payloads.
pub fn data_stream(response: Response) -> BoxStream<'static, Result<String, ChatError>> {
    event_data(response.bytes_stream())
}

/// Decodes SSE events from `body` and yields their `data` fields.
///
/// The stream ends at the `[DONE]` sentinel, or right after the first error.
fn event_data<S, B, E>(body: S) -> BoxStream<'static, Result<String, ChatError>>
where
    S: Stream<Item = Result<B, E>> + Send + 'static,
    B: AsRef<[u8]> + Send + 'static,
    E: Into<ChatError> + fmt::Display + Send + 'static,
{
    body.eventsource()
        .map(|event| match event {
            Ok(event) => Ok(event.data),
            Err(EventStreamError::Transport(e)) => {
                tracing::warn!(error = %e, "completion stream interrupted");
                Err(e.into())
            }
            Err(e) => Err(ChatError::Serialization(format!(
                "Malformed event stream: {}",
                e
            ))),
        })
        .take_while(|item| future::ready(!matches!(item, Ok(data) if data.trim() == DONE)))
        .scan(false, |failed, item| {
            if *failed {
                return future::ready(None);
            }
            *failed = item.is_err();
            future::ready(Some(item))
        })
        .boxed()
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::stream;

    async fn collect(chunks: Vec<Result<&'static str, ChatError>>) -> Vec<Result<String, ChatError>> {
        event_data(stream::iter(chunks)).collect().await
    }

    fn data(items: &[Result<String, ChatError>]) -> Vec<&str> {
        items
            .iter()
            .filter_map(|i| i.as_ref().ok())
            .map(String::as_str)
            .collect()
    }

    #[tokio::test]
    async fn decodes_events_split_across_chunks() {
        let items = collect(vec![
            Ok("data: {\"a\""),
            Ok(":1}\n"),
            Ok("\ndata: {\"b\":2}\n\n"),
        ])
        .await;

        assert_eq!(data(&items), vec!["{\"a\":1}", "{\"b\":2}"]);
    }

    #[tokio::test]
    async fn stops_at_done() {
        let items = collect(vec![Ok("data: one\n\ndata: [DONE]\n\ndata: late\n\n")]).await;

        assert_eq!(data(&items), vec!["one"]);
        assert_eq!(items.len(), 1);
    }

    #[tokio::test]
    async fn handles_crlf_and_comments() {
        let items = collect(vec![Ok(": keep-alive\r\nevent: message\r\ndata:x\r\n\r\n")]).await;

        assert_eq!(data(&items), vec!["x"]);
    }

    #[tokio::test]
    async fn body_error_ends_the_stream() {
        let items = collect(vec![
            Ok("data: first\n\n"),
            Err(ChatError::Transport("connection reset".into())),
            Ok("data: never\n\n"),
        ])
        .await;

        assert_eq!(items.len(), 2);
        assert_eq!(data(&items), vec!["first"]);
        assert!(matches!(items[1], Err(ChatError::Transport(_))));
    }

    #[test]
    fn extracts_api_error_message() {
        let body = r#"{"error":{"message":"Incorrect API key provided","type":"invalid_request_error"}}"#;
        assert_eq!(error_detail(body), "Incorrect API key provided");
        assert_eq!(error_detail(" bad gateway \n"), "bad gateway");
    }
}
