use super::{CompletionRequest, Fragment, FragmentStream, LLMProvider};
use crate::core::error::ChatError;
use async_trait::async_trait;
use futures::StreamExt;
use futures::stream;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

/// What the next `complete` call should do.
pub enum Script {
    Stream(Vec<Result<Fragment, ChatError>>),
    Fail(ChatError),
    /// Yields the fragments, then never finishes.
    Hang(Vec<Result<Fragment, ChatError>>),
}

impl Script {
    pub fn reply(pieces: &[&str]) -> Self {
        Script::Stream(pieces.iter().map(|p| Ok(Fragment::text(*p))).collect())
    }
}

/// Provider that plays back canned streams and records every request.
#[derive(Clone, Default)]
pub struct ScriptedProvider {
    scripts: Arc<Mutex<VecDeque<Script>>>,
    requests: Arc<Mutex<Vec<CompletionRequest>>>,
}

impl ScriptedProvider {
    pub fn new(scripts: Vec<Script>) -> Self {
        Self {
            scripts: Arc::new(Mutex::new(scripts.into())),
            requests: Arc::default(),
        }
    }

    pub fn requests(&self) -> Vec<CompletionRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl LLMProvider for ScriptedProvider {
    async fn complete(&self, request: &CompletionRequest) -> Result<FragmentStream, ChatError> {
        self.requests.lock().unwrap().push(request.clone());
        let script = self.scripts.lock().unwrap().pop_front();
        match script {
            Some(Script::Stream(items)) => Ok(stream::iter(items).boxed()),
            Some(Script::Fail(e)) => Err(e),
            Some(Script::Hang(items)) => Ok(stream::iter(items).chain(stream::pending()).boxed()),
            None => Err(ChatError::Transport("no scripted reply left".to_string())),
        }
    }
}
