//! # Commercial Compound Registry
//!
//! Lookup of candidate molecules in a public compound database.
//!
//! ## Design
//! - `Registry` trait with a tri-state answer: `Ok(Presence::Known)`,
//!   `Ok(Presence::NotKnown)`, or `Err(_)` for lookup failures. A network
//!   error is never reported as "not known" - callers must be able to
//!   tell a negative answer from a failed question.
//! - `PubChemRegistry` implements it against the PubChem PUG REST API.

pub mod pubchem;

pub use pubchem::PubChemRegistry;

use crate::error::Result;
use async_trait::async_trait;

/// Whether a molecule is present in the registry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Presence {
    /// The compound is catalogued - treated as commercially available
    Known,
    /// The registry answered and does not list the compound
    NotKnown,
}

impl Presence {
    pub fn is_known(&self) -> bool {
        matches!(self, Presence::Known)
    }
}

/// The commercial-compound registry
#[async_trait]
pub trait Registry: Send + Sync {
    /// Get the registry name (e.g., "pubchem")
    fn name(&self) -> &str;

    /// Look up a molecule by its SMILES representation
    async fn lookup(&self, smiles: &str) -> Result<Presence>;
}

// ============================================================================
// Registry Configuration
// ============================================================================

/// Configuration for creating registries
#[derive(Debug, Clone)]
pub struct RegistryConfig {
    pub base_url: String,
    pub timeout_secs: u64,
    /// Extra attempts after a temporary failure (0 disables retry)
    pub max_retries: u32,
    /// Base backoff delay, doubled per attempt
    pub backoff_ms: u64,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            base_url: "https://pubchem.ncbi.nlm.nih.gov".into(),
            timeout_secs: 10,
            max_retries: 2,
            backoff_ms: 500,
        }
    }
}

impl RegistryConfig {
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }

    pub fn with_max_retries(mut self, retries: u32) -> Self {
        self.max_retries = retries;
        self
    }

    pub fn with_backoff_ms(mut self, millis: u64) -> Self {
        self.backoff_ms = millis;
        self
    }
}
