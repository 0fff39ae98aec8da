use crate::conversation::Conversation;
use crate::core::error::ChatError;
use crate::prompt::{ChatEntry, assemble};
use crate::providers::{CompletionRequest, LLMProvider};
use crate::settings::Settings;
use crate::stream::{DisplaySurface, accumulate};

/// Where the session is within one request/response cycle.
///
/// Anything but `Idle` at the start of a submission means the previous
/// submission was dropped before it finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleState {
    Idle,
    AwaitingResponse,
    Streaming,
}

/// What one submission produced.
#[derive(Debug)]
pub struct TurnOutcome {
    /// The committed assistant reply, or `None` if the stream never opened.
    pub reply: Option<String>,
    pub error: Option<ChatError>,
}

impl TurnOutcome {
    pub fn is_complete(&self) -> bool {
        self.reply.is_some() && self.error.is_none()
    }
}

/// One interactive chat session: the conversation, the knowledge base and
/// the current settings, driven one submission at a time.
pub struct ChatSession {
    conversation: Conversation,
    knowledge: String,
    settings: Settings,
    provider: Box<dyn LLMProvider>,
    state: CycleState,
}

impl ChatSession {
    pub fn new(provider: Box<dyn LLMProvider>, knowledge: String, settings: Settings) -> Self {
        Self {
            conversation: Conversation::new(),
            knowledge,
            settings,
            provider,
            state: CycleState::Idle,
        }
    }

    pub fn conversation(&self) -> &Conversation {
        &self.conversation
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn settings_mut(&mut self) -> &mut Settings {
        &mut self.settings
    }

    pub fn has_knowledge(&self) -> bool {
        !self.knowledge.is_empty()
    }

    pub fn knowledge_len(&self) -> usize {
        self.knowledge.len()
    }

    /// The messages that would be sent if the conversation were submitted now.
    pub fn payload(&self) -> Vec<ChatEntry> {
        assemble(
            self.conversation.snapshot(),
            &self.knowledge,
            self.settings.include_knowledge,
        )
    }

    /// Runs one request/response cycle for `input`.
    ///
    /// Blank input is ignored and returns `Ok(None)`. Request failures are
    /// reported on `surface` and in the returned outcome; the session stays
    /// usable. A reply cut short by a stream error is still committed; a turn
    /// abandoned by dropping this future leaves its user message unanswered.
    pub async fn submit<D>(
        &mut self,
        input: &str,
        surface: &mut D,
    ) -> Result<Option<TurnOutcome>, ChatError>
    where
        D: DisplaySurface + ?Sized,
    {
        let input = input.trim();
        if input.is_empty() {
            return Ok(None);
        }
        if self.state != CycleState::Idle {
            tracing::warn!(state = ?self.state, "previous turn was abandoned before it finished");
            self.state = CycleState::Idle;
        }

        self.conversation.push_user(input);
        self.state = CycleState::AwaitingResponse;

        let request = CompletionRequest {
            model: self.settings.model,
            temperature: self.settings.temperature,
            messages: self.payload(),
        };
        tracing::info!(
            model = %request.model,
            temperature = %request.temperature,
            history = self.conversation.len(),
            entries = request.messages.len(),
            knowledge = self.settings.include_knowledge && self.has_knowledge(),
            "submitting turn"
        );

        let stream = match self.provider.complete(&request).await {
            Ok(stream) => stream,
            Err(e) => {
                tracing::warn!(error = %e, "completion request failed");
                surface.show_error(&e);
                self.state = CycleState::Idle;
                return Ok(Some(TurnOutcome {
                    reply: None,
                    error: Some(e),
                }));
            }
        };

        self.state = CycleState::Streaming;
        let outcome = accumulate(stream, surface).await;
        surface.finish(&outcome.text);
        if let Some(e) = &outcome.error {
            surface.show_error(e);
        }

        self.conversation.push_assistant(outcome.text.clone());
        self.state = CycleState::Idle;

        let turn = TurnOutcome {
            reply: Some(outcome.text),
            error: outcome.error,
        };
        tracing::debug!(complete = turn.is_complete(), "turn committed");
        Ok(Some(turn))
    }
}
