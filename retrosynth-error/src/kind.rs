//! Error kinds for retrosynth operations

use std::fmt;

/// The kind of error that occurred.
///
/// This enum categorizes errors to help users write clear error handling logic.
/// Users can match on ErrorKind to decide how to handle specific error cases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum ErrorKind {
    // =========================================================================
    // General errors
    // =========================================================================
    /// An unexpected error occurred - catch-all for unhandled cases
    Unexpected,

    /// The requested feature or operation is not supported
    Unsupported,

    /// Invalid configuration or parameters
    ConfigInvalid,

    // =========================================================================
    // Chemistry errors
    // =========================================================================
    /// A molecule string failed structural well-formedness checks
    InvalidSmiles,

    // =========================================================================
    // Predictor/LLM errors
    // =========================================================================
    /// The generative predictor call failed
    PredictionFailed,

    /// Predictor service is unreachable or returned a server error
    ProviderUnavailable,

    /// Rate limit exceeded
    RateLimited,

    /// Authentication with the predictor service failed
    AuthFailed,

    // =========================================================================
    // Registry errors
    // =========================================================================
    /// Compound registry is unreachable or returned a server error
    RegistryUnavailable,

    /// Registry responded but the answer could not be interpreted
    LookupFailed,

    // =========================================================================
    // Time errors
    // =========================================================================
    /// An external call exceeded its deadline
    Timeout,

    // =========================================================================
    // Storage errors
    // =========================================================================
    /// Storage key not found
    StorageNotFound,

    /// Storage operation failed
    StorageFailed,

    /// Serialization/deserialization failed
    SerializationFailed,

    // =========================================================================
    // IO errors
    // =========================================================================
    /// File not found
    FileNotFound,

    /// Permission denied
    PermissionDenied,

    /// IO operation failed
    IoFailed,

    /// Network error
    NetworkFailed,

    // =========================================================================
    // Parse errors
    // =========================================================================
    /// Failed to parse input
    ParseFailed,

    /// Invalid argument passed to function
    InvalidArgument,
}

impl ErrorKind {
    /// Returns the error kind as a static string
    pub fn as_str(&self) -> &'static str {
        match self {
            // General
            ErrorKind::Unexpected => "Unexpected",
            ErrorKind::Unsupported => "Unsupported",
            ErrorKind::ConfigInvalid => "ConfigInvalid",

            // Chemistry
            ErrorKind::InvalidSmiles => "InvalidSmiles",

            // Predictor
            ErrorKind::PredictionFailed => "PredictionFailed",
            ErrorKind::ProviderUnavailable => "ProviderUnavailable",
            ErrorKind::RateLimited => "RateLimited",
            ErrorKind::AuthFailed => "AuthFailed",

            // Registry
            ErrorKind::RegistryUnavailable => "RegistryUnavailable",
            ErrorKind::LookupFailed => "LookupFailed",

            // Time
            ErrorKind::Timeout => "Timeout",

            // Storage
            ErrorKind::StorageNotFound => "StorageNotFound",
            ErrorKind::StorageFailed => "StorageFailed",
            ErrorKind::SerializationFailed => "SerializationFailed",

            // IO
            ErrorKind::FileNotFound => "FileNotFound",
            ErrorKind::PermissionDenied => "PermissionDenied",
            ErrorKind::IoFailed => "IoFailed",
            ErrorKind::NetworkFailed => "NetworkFailed",

            // Parse
            ErrorKind::ParseFailed => "ParseFailed",
            ErrorKind::InvalidArgument => "InvalidArgument",
        }
    }

    /// Check if this error kind is retryable by default
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            ErrorKind::PredictionFailed
                | ErrorKind::ProviderUnavailable
                | ErrorKind::RateLimited
                | ErrorKind::RegistryUnavailable
                | ErrorKind::Timeout
                | ErrorKind::NetworkFailed
        )
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kind_display() {
        assert_eq!(ErrorKind::InvalidSmiles.to_string(), "InvalidSmiles");
        assert_eq!(ErrorKind::PredictionFailed.to_string(), "PredictionFailed");
    }

    #[test]
    fn test_is_retryable() {
        assert!(ErrorKind::NetworkFailed.is_retryable());
        assert!(ErrorKind::RateLimited.is_retryable());
        assert!(ErrorKind::RegistryUnavailable.is_retryable());
        assert!(!ErrorKind::InvalidSmiles.is_retryable());
        assert!(!ErrorKind::ParseFailed.is_retryable());
    }
}
