//! Candidate-refinement loop
//!
//! One `Refiner::run` call drives one search: predict a precursor for the
//! target, validate it, look it up in the registry, and either accept it
//! or make it the next target. The loop is an explicit state machine with
//! an iteration cap; every termination path produces a `LoopOutcome`.
//!
//! Per iteration the loop makes exactly one predictor call, at most one
//! validity check, and at most one registry lookup (skipped once validity
//! fails). Structurally invalid candidates are discarded: they are not
//! appended to the trace and do not replace the current target.

use crate::outcome::{FailureReason, LoopOutcome};
use retrosynth_core::error::{Error, ErrorKind};
use retrosynth_core::{Predictor, Presence, Registry, ValidityOracle};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, warn};

/// Configuration for the refinement loop
#[derive(Debug, Clone)]
pub struct RefineConfig {
    /// Maximum number of predictor calls before giving up
    pub max_iterations: u32,
}

impl Default for RefineConfig {
    fn default() -> Self {
        Self { max_iterations: 25 }
    }
}

impl RefineConfig {
    pub fn with_max_iterations(mut self, max_iterations: u32) -> Self {
        self.max_iterations = max_iterations;
        self
    }
}

/// Cooperative cancellation handle, checked between loop transitions
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation; the loop stops at its next transition
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Loop state. Candidates travel inside the state so each transition is
/// explicit about what it consumes.
enum LoopState {
    Predicting,
    Validating(String),
    LookingUp(String),
    Accepted,
    Failed(FailureReason),
}

/// The refinement loop driver
pub struct Refiner {
    predictor: Arc<dyn Predictor>,
    oracle: Arc<dyn ValidityOracle>,
    registry: Arc<dyn Registry>,
    config: RefineConfig,
}

impl Refiner {
    /// Create a refiner with default configuration
    pub fn new(
        predictor: Arc<dyn Predictor>,
        oracle: Arc<dyn ValidityOracle>,
        registry: Arc<dyn Registry>,
    ) -> Self {
        Self {
            predictor,
            oracle,
            registry,
            config: RefineConfig::default(),
        }
    }

    pub fn with_config(mut self, config: RefineConfig) -> Self {
        self.config = config;
        self
    }

    /// Run one refinement search to completion
    pub async fn run(&self, product: &str, reaction_class: &str) -> LoopOutcome {
        self.run_with_cancel(product, reaction_class, &CancelFlag::new())
            .await
    }

    /// Run one refinement search, honoring a caller-supplied cancel flag.
    ///
    /// The very first target is taken as-is; validating it is the caller's
    /// responsibility.
    pub async fn run_with_cancel(
        &self,
        product: &str,
        reaction_class: &str,
        cancel: &CancelFlag,
    ) -> LoopOutcome {
        let mut target = product.to_string();
        let mut trace: Vec<String> = Vec::new();
        let mut iterations = 0u32;
        let mut state = LoopState::Predicting;

        loop {
            state = match state {
                LoopState::Predicting => {
                    // cancellation is checked once per iteration, before
                    // the next predictor call is committed to
                    if cancel.is_cancelled() {
                        LoopState::Failed(FailureReason::Cancelled)
                    } else if iterations >= self.config.max_iterations {
                        LoopState::Failed(FailureReason::IterationLimit)
                    } else {
                        iterations += 1;
                        match self.predictor.predict(&target, reaction_class).await {
                            Ok(completion) => {
                                match extract_candidate(completion.content.as_deref()) {
                                    Some(candidate) => LoopState::Validating(candidate),
                                    None => {
                                        warn!(iterations, "predictor yielded no parseable candidate");
                                        LoopState::Failed(FailureReason::PredictorParse)
                                    }
                                }
                            }
                            Err(err) => {
                                warn!(iterations, error = %err, "predictor call failed");
                                LoopState::Failed(predictor_failure(&err))
                            }
                        }
                    }
                }
                LoopState::Validating(candidate) => {
                    if self.oracle.is_valid(&candidate) {
                        trace.push(candidate.clone());
                        LoopState::LookingUp(candidate)
                    } else {
                        // discard and re-predict for the same target
                        debug!(candidate = %candidate, "candidate rejected by validity oracle");
                        LoopState::Predicting
                    }
                }
                LoopState::LookingUp(candidate) => {
                    match self.registry.lookup(&candidate).await {
                        Ok(Presence::Known) => {
                            debug!(candidate = %candidate, "candidate is commercially known");
                            LoopState::Accepted
                        }
                        Ok(Presence::NotKnown) => {
                            debug!(candidate = %candidate, "candidate unknown, refining further");
                            target = candidate;
                            LoopState::Predicting
                        }
                        Err(err) => {
                            warn!(candidate = %candidate, error = %err, "registry lookup failed");
                            LoopState::Failed(registry_failure(&err))
                        }
                    }
                }
                LoopState::Accepted => {
                    return LoopOutcome::Accepted { trace, iterations };
                }
                LoopState::Failed(reason) => {
                    return LoopOutcome::Exhausted {
                        trace,
                        iterations,
                        reason,
                    };
                }
            };
        }
    }
}

fn predictor_failure(err: &Error) -> FailureReason {
    match err.kind() {
        ErrorKind::Timeout => FailureReason::PredictorTimeout,
        _ => FailureReason::PredictorFailed,
    }
}

fn registry_failure(err: &Error) -> FailureReason {
    match err.kind() {
        ErrorKind::Timeout => FailureReason::RegistryTimeout,
        _ => FailureReason::RegistryFailed,
    }
}

/// Extract a single candidate molecule string from predictor output.
///
/// Tolerates the fine-tune answer prefix ("The predicted reactant is: ..."),
/// markdown fences, and trailing prose; returns `None` when nothing usable
/// remains.
pub fn extract_candidate(content: Option<&str>) -> Option<String> {
    let text = content?.trim();
    if text.is_empty() {
        return None;
    }

    // strip a markdown fence if the model wrapped its answer in one
    let text = if text.contains("```") {
        text.split("```").nth(1).map(|s| s.trim()).unwrap_or(text)
    } else {
        text
    };

    // drop the conversational prefix from the fine-tune answer format;
    // ASCII lowercasing keeps byte offsets aligned with the original
    const PREFIX: &str = "reactant is:";
    let lower = text.to_ascii_lowercase();
    let text = match lower.find(PREFIX) {
        Some(idx) => text[idx + PREFIX.len()..].trim_start(),
        None => text,
    };

    let token = text
        .split_whitespace()
        .next()?
        .trim_matches(|c| matches!(c, '`' | '"' | '\'' | ',' | '.'));

    if token.is_empty() {
        None
    } else {
        Some(token.to_string())
    }
}
