//! # Retrosynth Agent
//!
//! The candidate-refinement loop: given a product molecule and a reaction
//! class, repeatedly ask the generative predictor for a precursor, validate
//! it, check it against the commercial registry, and either accept it or
//! feed it back as the next target.
//!
//! ## Core Concepts
//! - **Refiner**: bounded state machine driving one loop run
//! - **LoopOutcome**: typed result carrying the full candidate trace;
//!   no error escapes the loop boundary
//! - **CancelFlag**: cooperative cancellation checked between transitions
//! - **RefineService**: concurrency cap for parallel loop runs

mod outcome;
mod refine;
mod service;

pub use outcome::{FailureReason, LoopOutcome};
pub use refine::{extract_candidate, CancelFlag, RefineConfig, Refiner};
pub use service::RefineService;
