use crate::core::error::ChatError;
use crate::prompt::ChatEntry;
use crate::settings::{Model, Temperature};
use async_trait::async_trait;
use futures::stream::BoxStream;

pub mod base_client;
pub mod openai;

/// One incremental piece of a streamed completion.
///
/// Control-only deltas (role announcements, finish markers) carry no text.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Fragment {
    pub text: Option<String>,
}

impl Fragment {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
        }
    }

    pub fn empty() -> Self {
        Self { text: None }
    }
}

/// Fragments in the order the remote service emitted them.
pub type FragmentStream = BoxStream<'static, Result<Fragment, ChatError>>;

#[derive(Debug, Clone)]
pub struct CompletionRequest {
    pub model: Model,
    pub temperature: Temperature,
    pub messages: Vec<ChatEntry>,
}

#[async_trait]
pub trait LLMProvider: Send + Sync {
    /// Opens one streaming completion.
    ///
    /// Connection and credential failures are returned here, before any
    /// fragment is produced. Failures after the stream is open arrive as an
    /// `Err` item and end the stream.
    async fn complete(&self, request: &CompletionRequest) -> Result<FragmentStream, ChatError>;
}

#[cfg(test)]
pub(crate) mod scripted;
