//! Error types for telegrammer

use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Failed to read file {}: {source}", path.display())]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Authentication failed: {0}")]
    Auth(String),

    #[error("Failed to send message: {0}")]
    Send(String),

    #[error("Failed to remove webhook: {0}")]
    Webhook(String),

    #[error("Failed to get updates: {0}")]
    Stream(String),

    #[error("Failed to render update: {0}")]
    Render(String),
}

impl Error {
    /// Whether execution can continue after this error was logged.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, Error::Config(_) | Error::Render(_))
    }
}

pub type Result<T> = std::result::Result<T, Error>;

impl From<serde_yaml::Error> for Error {
    fn from(err: serde_yaml::Error) -> Self {
        Error::Config(err.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Render(err.to_string())
    }
}
