//! Core error types
//!
//! Re-exports retrosynth-error and provides collaborator-specific conveniences.

// Re-export the core error types
pub use retrosynth_error::{Error, ErrorKind, ErrorStatus, Result};

// =============================================================================
// Collaborator-specific error constructors
// =============================================================================

/// Create an InvalidSmiles error
pub fn invalid_smiles(smiles: impl Into<String>) -> Error {
    Error::invalid_smiles(smiles)
}

/// Create a PredictionFailed error
pub fn prediction_failed(reason: impl Into<String>) -> Error {
    Error::prediction_failed(reason)
}

/// Create a Timeout error for a named service
pub fn timeout(service: &'static str) -> Error {
    Error::timeout(service)
}

/// Create a RegistryUnavailable error
pub fn registry_unavailable(reason: impl Into<String>) -> Error {
    Error::registry_unavailable(reason)
}

/// Create a LookupFailed error
pub fn lookup_failed(reason: impl Into<String>) -> Error {
    Error::lookup_failed(reason)
}

/// Create a ParseFailed error
pub fn parse_error(message: impl Into<String>) -> Error {
    Error::parse_failed(message)
}

/// Create a SerializationFailed error
pub fn serialization_error(message: impl Into<String>) -> Error {
    Error::serialization_failed(message)
}

/// Create an IoFailed error
pub fn io_error(message: impl Into<String>) -> Error {
    Error::io_failed(message)
}

/// Create a StorageNotFound error
pub fn storage_not_found(key: impl Into<String>) -> Error {
    Error::storage_not_found(key)
}

/// Create a StorageFailed error
pub fn storage_failed(reason: impl Into<String>) -> Error {
    Error::storage_failed(reason)
}

/// Create a ConfigInvalid error
pub fn config_invalid(message: impl Into<String>) -> Error {
    Error::config_invalid(message)
}
