//! Error types for Kino Embed

use thiserror::Error;

/// Result type alias for embed operations
pub type Result<T> = std::result::Result<T, Error>;

/// Embed error types
#[derive(Error, Debug)]
pub enum Error {
    // Configuration errors
    #[error("Missing required attribute: {name}")]
    MissingAttribute { name: &'static str },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // Frame errors
    #[error("Failed to create player frame: {0}")]
    FrameCreation(String),

    #[error("Failed to post message to player frame: {0}")]
    PostMessage(String),

    // Internal errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl Error {
    /// Returns true if this error is recoverable
    ///
    /// Configuration errors abort construction of the embed and are never
    /// recoverable from inside the component.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Error::PostMessage(_))
    }

    /// Returns the error code for diagnostics
    pub fn error_code(&self) -> &'static str {
        match self {
            Error::MissingAttribute { .. } => "MISSING_ATTRIBUTE",
            Error::InvalidConfig(_) => "INVALID_CONFIG",
            Error::FrameCreation(_) => "FRAME_CREATION",
            Error::PostMessage(_) => "POST_MESSAGE",
            Error::Serialization(_) => "SERIALIZATION",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_attribute_message() {
        let err = Error::MissingAttribute { name: "data-apikey" };
        assert_eq!(err.to_string(), "Missing required attribute: data-apikey");
        assert_eq!(err.error_code(), "MISSING_ATTRIBUTE");
        assert!(!err.is_recoverable());
    }

    #[test]
    fn test_post_message_is_recoverable() {
        assert!(Error::PostMessage("detached".into()).is_recoverable());
    }
}
