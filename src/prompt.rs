use crate::conversation::{Message, Role};
use serde::Serialize;

/// Header placed in front of the knowledge base when it is sent to the model.
pub const KNOWLEDGE_PREAMBLE: &str =
    "Here is relevant background knowledge (provided by the user):\n\n";

/// A role/content pair as it goes over the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChatEntry {
    pub role: Role,
    pub content: String,
}

impl From<&Message> for ChatEntry {
    fn from(message: &Message) -> Self {
        Self {
            role: message.role(),
            content: message.content().to_string(),
        }
    }
}

/// Builds the request messages for one completion call.
///
/// When `include_knowledge` is set and `knowledge` is non-empty, the whole
/// knowledge base is inlined as a leading user entry. The conversation
/// follows in order with roles unchanged.
pub fn assemble(conversation: &[Message], knowledge: &str, include_knowledge: bool) -> Vec<ChatEntry> {
    let mut entries = Vec::with_capacity(conversation.len() + 1);

    if include_knowledge && !knowledge.is_empty() {
        entries.push(ChatEntry {
            role: Role::User,
            content: format!("{}{}", KNOWLEDGE_PREAMBLE, knowledge),
        });
    }

    entries.extend(conversation.iter().map(ChatEntry::from));
    entries
}
