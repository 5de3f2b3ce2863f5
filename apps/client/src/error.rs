//! Client error types.

use lumi_core::CoreError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Backend error: {status} - {message}")]
    Backend { status: u16, message: String },

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Invalid input: {0}")]
    Core(#[from] CoreError),

    #[error("Not connected to the backend")]
    Disconnected,

    #[error("Configuration error: {0}")]
    Config(String),
}

impl ClientError {
    /// Text shown to the user in place of the raw error.
    pub fn user_message(&self) -> String {
        match self {
            ClientError::Network(_) | ClientError::Disconnected => {
                "Could not reach the server. Changes are kept on this device only.".to_string()
            }
            ClientError::Backend { message, .. } => format!("The server refused the change: {message}"),
            ClientError::NotFound(what) => format!("{what} no longer exists."),
            ClientError::Parse(_) => "The server sent a response this app does not understand.".to_string(),
            ClientError::Core(e) => capitalize(&e.to_string()),
            ClientError::Config(e) => format!("The app is not configured correctly: {e}"),
        }
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            ClientError::Parse(e.to_string())
        } else {
            ClientError::Network(e.to_string())
        }
    }
}

pub type Result<T> = std::result::Result<T, ClientError>;

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn core_errors_read_as_sentences() {
        let error = ClientError::from(CoreError::EmptyContent);
        assert_eq!(error.user_message(), "Empty content");
    }

    #[test]
    fn backend_error_display() {
        let error = ClientError::Backend {
            status: 400,
            message: "Task has no remaining steps".to_string(),
        };
        assert_eq!(error.to_string(), "Backend error: 400 - Task has no remaining steps");
        assert!(error.user_message().contains("no remaining steps"));
    }

    #[test]
    fn network_errors_mention_local_only() {
        let error = ClientError::Network("connection refused".to_string());
        assert!(error.user_message().contains("this device only"));
    }
}
