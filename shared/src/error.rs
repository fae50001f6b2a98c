/*!
Common error types for the angle sweeper components.
*/

use thiserror::Error;

/// Common result type used throughout the shared library
pub type Result<T> = std::result::Result<T, SharedError>;

/// Error type for all shared operations
#[derive(Error, Debug)]
pub enum SharedError {
    /// I/O errors while writing to a channel
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The output channel could not be acquired
    #[error("Channel error: {0}")]
    Channel(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),
}

impl SharedError {
    /// Create a new channel acquisition error
    pub fn channel(msg: impl Into<String>) -> Self {
        Self::Channel(msg.into())
    }

    /// Create a new configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }
}
