//! Error types for the chat relay.

use thiserror::Error;

/// A shared error type for every chatrelay crate.
///
/// Store, repository and relay operations all report through this enum so
/// that background tasks can log one uniform shape of failure.
#[derive(Error, Debug, Clone)]
pub enum ChatRelayError {
    /// IO error (file system operations)
    #[error("IO error: {message}")]
    Io { message: String },

    /// Key-value store failure (write rejected, lock poisoned, ...)
    #[error("Storage error: {0}")]
    Storage(String),

    /// Serialization/deserialization error
    #[error("Serialization error: {format} - {message}")]
    Serialization {
        format: String, // "TOML", "JSON", etc.
        message: String,
    },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Inbound or local payload missing the fields its direction requires
    #[error("Malformed payload: {0}")]
    MalformedPayload(String),

    /// Message channel rejected an outbound event
    #[error("Channel error: {0}")]
    Channel(String),

    /// Internal error (should not happen in normal operation)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ChatRelayError {
    /// Creates a Storage error
    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage(message.into())
    }

    /// Creates a Config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Creates a MalformedPayload error
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::MalformedPayload(message.into())
    }

    /// Creates a Channel error
    pub fn channel(message: impl Into<String>) -> Self {
        Self::Channel(message.into())
    }

    /// Creates an Internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// Check if this is a serialization error
    pub fn is_serialization(&self) -> bool {
        matches!(self, Self::Serialization { .. })
    }

    /// Check if this is a malformed payload error
    pub fn is_malformed(&self) -> bool {
        matches!(self, Self::MalformedPayload(_))
    }
}

impl From<std::io::Error> for ChatRelayError {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            message: format!("{} (kind: {:?})", err, err.kind()),
        }
    }
}

impl From<serde_json::Error> for ChatRelayError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization {
            format: "JSON".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<toml::de::Error> for ChatRelayError {
    fn from(err: toml::de::Error) -> Self {
        Self::Serialization {
            format: "TOML".to_string(),
            message: err.to_string(),
        }
    }
}

/// A type alias for `Result<T, ChatRelayError>`.
pub type Result<T> = std::result::Result<T, ChatRelayError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_error_maps_to_serialization() {
        let err = serde_json::from_str::<serde_json::Value>("{not json").unwrap_err();
        let err: ChatRelayError = err.into();
        assert!(err.is_serialization());
        assert!(err.to_string().starts_with("Serialization error: JSON"));
    }

    #[test]
    fn test_constructor_helpers() {
        assert!(matches!(
            ChatRelayError::channel("closed"),
            ChatRelayError::Channel(_)
        ));
        assert!(ChatRelayError::malformed("missing ext").is_malformed());
        assert_eq!(
            ChatRelayError::storage("disk full").to_string(),
            "Storage error: disk full"
        );
    }
}
