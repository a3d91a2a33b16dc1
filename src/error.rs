use crate::network::queue::QueueError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum UamaskError {
    /// Error from the kernel packet queue transport
    #[error("packet queue error: {0}")]
    Queue(#[from] QueueError),

    /// Error loading or validating the configuration file
    #[error("configuration error: {0}")]
    Config(String),

    /// The process lacks the privileges required to bind the packet queue
    #[error("insufficient privilege: {0}")]
    Privilege(String),

    /// I/O errors from file and socket operations
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// A convenient Result type alias using `UamaskError`.
pub type Result<T> = std::result::Result<T, UamaskError>;

impl UamaskError {
    /// Creates a new configuration error with a descriptive message.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }
}
