//! # Retrosynth Core
//!
//! The external collaborators consumed by the candidate-refinement loop.
//!
//! ## Core Concepts
//! - **ValidityOracle**: pure well-formedness check for SMILES molecule strings
//! - **Predictor**: trait-based access to the generative reactant predictor
//! - **Registry**: tri-state commercial-compound lookup (known / not known / error)
//! - **RunStore**: persistence sink for loop run transcripts

pub mod chem;
pub mod error;
pub mod provider;
pub mod registry;
pub mod store;

pub use chem::{SmilesChecker, ValidityOracle};
pub use error::{Error, ErrorKind, ErrorStatus, Result};
pub use provider::{
    ChatMessage, Completion, OpenAiPredictor, Predictor, PredictorConfig, Role, Usage,
};
pub use registry::{Presence, PubChemRegistry, Registry, RegistryConfig};
pub use store::{FileStore, MemoryStore, RunRecord, RunStore};
