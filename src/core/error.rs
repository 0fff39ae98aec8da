use std::io;
use thiserror::Error;

/// Unified error type for kbchat
#[derive(Error, Debug)]
pub enum ChatError {
    /// Missing or rejected credential, unreadable config file
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Connection failures while opening or draining a completion stream
    #[error("Transport error: {0}")]
    Transport(String),

    /// User input errors
    #[error("Input error: {0}")]
    Input(String),

    /// IO-related errors
    #[error("IO error: {source}")]
    Io {
        #[from]
        source: io::Error,
    },

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<reqwest::Error> for ChatError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ChatError::Transport(format!("Request timed out: {}", err))
        } else if err.is_connect() {
            ChatError::Transport(format!("Connection failed: {}", err))
        } else if err.is_body() || err.is_decode() {
            ChatError::Transport(format!("Stream interrupted: {}", err))
        } else {
            ChatError::Transport(format!("Request failed: {}", err))
        }
    }
}

impl From<serde_json::Error> for ChatError {
    fn from(err: serde_json::Error) -> Self {
        ChatError::Serialization(format!("JSON error: {}", err))
    }
}

impl From<serde_yml::Error> for ChatError {
    fn from(err: serde_yml::Error) -> Self {
        ChatError::Serialization(format!("YAML error: {}", err))
    }
}

impl From<rustyline::error::ReadlineError> for ChatError {
    fn from(err: rustyline::error::ReadlineError) -> Self {
        ChatError::Input(format!("Line editor error: {}", err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn yaml_errors_are_serialization_errors() {
        let err: ChatError = serde_yml::from_str::<Vec<u8>>("[1, 2").unwrap_err().into();
        assert!(matches!(err, ChatError::Serialization(_)));
    }

    #[test]
    fn display_includes_category() {
        let err = ChatError::Transport("connection reset".into());
        assert_eq!(err.to_string(), "Transport error: connection reset");
    }

    #[test]
    fn io_errors_convert() {
        let err: ChatError = io::Error::new(io::ErrorKind::NotFound, "gone").into();
        assert!(matches!(err, ChatError::Io { .. }));
    }
}
