//! The main Error type for retrosynth

use crate::{ErrorKind, ErrorStatus};
use std::fmt;

/// The unified error type for all retrosynth operations.
///
/// This error type provides:
/// - `kind`: What type of error occurred
/// - `message`: Human-readable description
/// - `status`: Whether the error is retryable
/// - `operation`: What operation caused the error
/// - `context`: Key-value pairs for debugging
/// - `source`: The underlying error (if any)
///
/// # Example
///
/// ```rust
/// use retrosynth_error::{Error, ErrorKind, ErrorStatus};
///
/// let err = Error::new(ErrorKind::PredictionFailed, "model returned empty response")
///     .with_operation("predictor::predict")
///     .with_status(ErrorStatus::Temporary)
///     .with_context("model", "gpt-3.5-turbo")
///     .with_context("reaction_class", "Hydrogenation");
///
/// assert_eq!(err.kind(), ErrorKind::PredictionFailed);
/// assert!(err.status().is_retryable());
/// ```
pub struct Error {
    kind: ErrorKind,
    message: String,
    status: ErrorStatus,
    operation: &'static str,
    context: Vec<(&'static str, String)>,
    source: Option<anyhow::Error>,
}

impl Error {
    /// Create a new error with the given kind and message
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        let status = if kind.is_retryable() {
            ErrorStatus::Temporary
        } else {
            ErrorStatus::Permanent
        };

        Self {
            kind,
            message: message.into(),
            status,
            operation: "",
            context: Vec::new(),
            source: None,
        }
    }

    // =========================================================================
    // Getters
    // =========================================================================

    /// Get the error kind
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Get the error message
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Get the error status
    pub fn status(&self) -> ErrorStatus {
        self.status
    }

    /// Get the operation that caused this error
    pub fn operation(&self) -> &'static str {
        self.operation
    }

    /// Get the context key-value pairs
    pub fn context(&self) -> &[(&'static str, String)] {
        &self.context
    }

    /// Get the source error (if any)
    pub fn source_ref(&self) -> Option<&anyhow::Error> {
        self.source.as_ref()
    }

    // =========================================================================
    // Builders (chainable)
    // =========================================================================

    /// Set the error status
    pub fn with_status(mut self, status: ErrorStatus) -> Self {
        self.status = status;
        self
    }

    /// Mark as temporary (retryable)
    pub fn temporary(mut self) -> Self {
        self.status = ErrorStatus::Temporary;
        self
    }

    /// Mark as permanent (not retryable)
    pub fn permanent(mut self) -> Self {
        self.status = ErrorStatus::Permanent;
        self
    }

    /// Set the operation that caused this error.
    ///
    /// If an operation was already set, the previous one is moved to context
    /// as "called" to preserve the call chain.
    pub fn with_operation(mut self, operation: &'static str) -> Self {
        if !self.operation.is_empty() {
            self.context.push(("called", self.operation.to_string()));
        }
        self.operation = operation;
        self
    }

    /// Add context to the error
    pub fn with_context(mut self, key: &'static str, value: impl Into<String>) -> Self {
        self.context.push((key, value.into()));
        self
    }

    /// Set the source error.
    ///
    /// # Panics (debug only)
    /// Panics in debug mode if source was already set.
    pub fn set_source(mut self, source: impl Into<anyhow::Error>) -> Self {
        debug_assert!(self.source.is_none(), "source error already set");
        self.source = Some(source.into());
        self
    }

    // =========================================================================
    // Status mutations
    // =========================================================================

    /// Mark as persistent after failed retries
    pub fn persist(mut self) -> Self {
        self.status = self.status.persist();
        self
    }

    /// Check if this error is retryable
    pub fn is_retryable(&self) -> bool {
        self.status.is_retryable()
    }
}

// =============================================================================
// Display - compact, single-line format for logs
// =============================================================================

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}) at {}", self.kind, self.status, self.operation)?;

        if !self.context.is_empty() {
            write!(f, ", context {{ ")?;
            for (i, (key, value)) in self.context.iter().enumerate() {
                if i > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{}: {}", key, value)?;
            }
            write!(f, " }}")?;
        }

        if !self.message.is_empty() {
            write!(f, " => {}", self.message)?;
        }

        Ok(())
    }
}

// =============================================================================
// Debug - verbose, multi-line format for debugging
// =============================================================================

impl fmt::Debug for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{} ({}) at {}", self.kind, self.status, self.operation)?;

        if !self.message.is_empty() {
            writeln!(f)?;
            writeln!(f, "    Message: {}", self.message)?;
        }

        if !self.context.is_empty() {
            writeln!(f)?;
            writeln!(f, "    Context:")?;
            for (key, value) in &self.context {
                writeln!(f, "        {}: {}", key, value)?;
            }
        }

        if let Some(source) = &self.source {
            writeln!(f)?;
            writeln!(f, "    Source: {:?}", source)?;
        }

        Ok(())
    }
}

// =============================================================================
// std::error::Error implementation
// =============================================================================

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source.as_ref().map(|e| e.as_ref() as &(dyn std::error::Error + 'static))
    }
}

// =============================================================================
// Convenient From implementations (be careful not to leak raw errors!)
// =============================================================================

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        let kind = match err.kind() {
            std::io::ErrorKind::NotFound => ErrorKind::FileNotFound,
            std::io::ErrorKind::PermissionDenied => ErrorKind::PermissionDenied,
            _ => ErrorKind::IoFailed,
        };
        Error::new(kind, err.to_string())
            .with_operation("io")
            .set_source(err)
    }
}

// =============================================================================
// Convenience constructors
// =============================================================================

impl Error {
    /// Create an Unexpected error
    pub fn unexpected(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Unexpected, message)
    }

    /// Create an Unsupported error
    pub fn unsupported(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Unsupported, message)
    }

    /// Create a ConfigInvalid error
    pub fn config_invalid(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::ConfigInvalid, message)
    }

    /// Create an InvalidSmiles error
    pub fn invalid_smiles(smiles: impl Into<String>) -> Self {
        let smiles = smiles.into();
        Self::new(ErrorKind::InvalidSmiles, format!("'{}' is not a well-formed SMILES string", smiles))
            .with_context("smiles", smiles)
    }

    /// Create a PredictionFailed error
    pub fn prediction_failed(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::PredictionFailed, message)
    }

    /// Create a RateLimited error
    pub fn rate_limited(retry_after: Option<u64>) -> Self {
        let err = Self::new(ErrorKind::RateLimited, "rate limit exceeded");
        match retry_after {
            Some(secs) => err.with_context("retry_after_secs", secs.to_string()),
            None => err,
        }
    }

    /// Create an AuthFailed error
    pub fn auth_failed(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::AuthFailed, message)
    }

    /// Create a ProviderUnavailable error
    pub fn provider_unavailable(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::ProviderUnavailable, message)
    }

    /// Create a RegistryUnavailable error
    pub fn registry_unavailable(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::RegistryUnavailable, message)
    }

    /// Create a LookupFailed error
    pub fn lookup_failed(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::LookupFailed, message)
    }

    /// Create a Timeout error naming the service that missed its deadline
    pub fn timeout(service: &'static str) -> Self {
        Self::new(ErrorKind::Timeout, format!("call to {} timed out", service))
            .with_context("service", service)
    }

    /// Create a ParseFailed error
    pub fn parse_failed(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::ParseFailed, message)
    }

    /// Create a SerializationFailed error
    pub fn serialization_failed(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::SerializationFailed, message)
    }

    /// Create a StorageNotFound error
    pub fn storage_not_found(key: impl Into<String>) -> Self {
        let key = key.into();
        Self::new(ErrorKind::StorageNotFound, format!("storage key '{}' not found", key))
            .with_context("key", key)
    }

    /// Create a StorageFailed error
    pub fn storage_failed(reason: impl Into<String>) -> Self {
        Self::new(ErrorKind::StorageFailed, reason)
    }

    /// Create an IoFailed error
    pub fn io_failed(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::IoFailed, message)
    }

    /// Create a NetworkFailed error
    pub fn network_failed(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::NetworkFailed, message)
    }

    /// Create an InvalidArgument error
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvalidArgument, message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let err = Error::new(ErrorKind::LookupFailed, "registry answer had no CID list");
        assert_eq!(err.kind(), ErrorKind::LookupFailed);
        assert_eq!(err.message(), "registry answer had no CID list");
        assert_eq!(err.status(), ErrorStatus::Permanent);
    }

    #[test]
    fn test_error_with_context() {
        let err = Error::new(ErrorKind::PredictionFailed, "timeout")
            .with_operation("predictor::predict")
            .with_context("model", "gpt-3.5-turbo")
            .with_context("product", "C1=CC=CC=C1");

        assert_eq!(err.operation(), "predictor::predict");
        assert_eq!(err.context().len(), 2);
        assert_eq!(err.context()[0], ("model", "gpt-3.5-turbo".to_string()));
    }

    #[test]
    fn test_operation_chaining() {
        let err = Error::new(ErrorKind::IoFailed, "write failed")
            .with_operation("store::save")
            .with_operation("cli::predict");

        assert_eq!(err.operation(), "cli::predict");
        assert_eq!(err.context().len(), 1);
        assert_eq!(err.context()[0], ("called", "store::save".to_string()));
    }

    #[test]
    fn test_temporary_status() {
        let err = Error::new(ErrorKind::RegistryUnavailable, "503 from compound service");
        assert!(err.is_retryable()); // RegistryUnavailable defaults to temporary

        let err = Error::new(ErrorKind::InvalidSmiles, "unbalanced ring bond");
        assert!(!err.is_retryable()); // InvalidSmiles defaults to permanent
    }

    #[test]
    fn test_persist() {
        let err = Error::new(ErrorKind::NetworkFailed, "connection refused")
            .temporary();
        assert!(err.is_retryable());

        let err = err.persist();
        assert!(!err.is_retryable());
        assert_eq!(err.status(), ErrorStatus::Persistent);
    }

    #[test]
    fn test_display() {
        let err = Error::new(ErrorKind::PredictionFailed, "model unavailable")
            .with_operation("predictor::predict")
            .with_context("model", "gpt-3.5-turbo")
            .with_context("attempt", "3");

        let display = format!("{}", err);
        assert!(display.contains("PredictionFailed"));
        assert!(display.contains("temporary"));
        assert!(display.contains("predictor::predict"));
        assert!(display.contains("model: gpt-3.5-turbo"));
    }

    #[test]
    fn test_convenience_constructors() {
        let err = Error::invalid_smiles("C1=CC");
        assert_eq!(err.kind(), ErrorKind::InvalidSmiles);
        assert!(err.message().contains("C1=CC"));

        let err = Error::timeout("registry");
        assert_eq!(err.kind(), ErrorKind::Timeout);
        assert!(err.is_retryable());

        let err = Error::storage_not_found("run_1234");
        assert_eq!(err.kind(), ErrorKind::StorageNotFound);
        assert!(err.message().contains("run_1234"));
    }

    #[test]
    fn test_set_source() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err = Error::new(ErrorKind::FileNotFound, "runs directory not found")
            .set_source(io_err);

        assert!(err.source_ref().is_some());
    }
}
