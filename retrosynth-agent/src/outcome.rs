//! Loop outcome types
//!
//! Every refinement run terminates in a `LoopOutcome` value. Failures are
//! data, not errors: the caller renders the trace and the reason, and
//! nothing propagates as a panic or `Err` across the loop boundary.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Why a refinement run stopped without an accepted candidate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FailureReason {
    /// The predictor response contained no parseable candidate
    PredictorParse,
    /// The predictor call itself failed (auth, rate limit, server error)
    PredictorFailed,
    /// The predictor call exceeded its deadline
    PredictorTimeout,
    /// The registry lookup exceeded its deadline
    RegistryTimeout,
    /// The registry lookup failed (distinct from "not known")
    RegistryFailed,
    /// The configured iteration cap was reached
    IterationLimit,
    /// The caller cancelled the run
    Cancelled,
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            FailureReason::PredictorParse => "predictor yielded no parseable candidate",
            FailureReason::PredictorFailed => "predictor call failed",
            FailureReason::PredictorTimeout => "predictor call timed out",
            FailureReason::RegistryTimeout => "registry lookup timed out",
            FailureReason::RegistryFailed => "registry lookup failed",
            FailureReason::IterationLimit => "iteration limit reached",
            FailureReason::Cancelled => "cancelled by caller",
        };
        write!(f, "{}", text)
    }
}

/// How a refinement run ended
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum LoopOutcome {
    /// The last candidate in the trace is structurally valid and
    /// registry-known
    Accepted { trace: Vec<String>, iterations: u32 },
    /// The loop stopped before finding a registry-known candidate
    Exhausted {
        trace: Vec<String>,
        iterations: u32,
        reason: FailureReason,
    },
}

impl LoopOutcome {
    /// The ordered candidate trace, regardless of how the run ended
    pub fn trace(&self) -> &[String] {
        match self {
            LoopOutcome::Accepted { trace, .. } => trace,
            LoopOutcome::Exhausted { trace, .. } => trace,
        }
    }

    /// Number of predictor calls made
    pub fn iterations(&self) -> u32 {
        match self {
            LoopOutcome::Accepted { iterations, .. } => *iterations,
            LoopOutcome::Exhausted { iterations, .. } => *iterations,
        }
    }

    pub fn is_accepted(&self) -> bool {
        matches!(self, LoopOutcome::Accepted { .. })
    }

    /// The failure reason, if the run did not accept a candidate
    pub fn reason(&self) -> Option<FailureReason> {
        match self {
            LoopOutcome::Accepted { .. } => None,
            LoopOutcome::Exhausted { reason, .. } => Some(*reason),
        }
    }

    /// One-line description for logs and run records
    pub fn summary(&self) -> String {
        match self {
            LoopOutcome::Accepted { iterations, .. } => {
                format!("accepted after {} iterations", iterations)
            }
            LoopOutcome::Exhausted { reason, iterations, .. } => {
                format!("failed after {} iterations: {}", iterations, reason)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accessors() {
        let outcome = LoopOutcome::Accepted {
            trace: vec!["CCO".to_string()],
            iterations: 1,
        };
        assert!(outcome.is_accepted());
        assert_eq!(outcome.trace(), ["CCO".to_string()]);
        assert_eq!(outcome.iterations(), 1);
        assert_eq!(outcome.reason(), None);

        let outcome = LoopOutcome::Exhausted {
            trace: vec![],
            iterations: 25,
            reason: FailureReason::IterationLimit,
        };
        assert!(!outcome.is_accepted());
        assert_eq!(outcome.reason(), Some(FailureReason::IterationLimit));
    }

    #[test]
    fn test_summary() {
        let accepted = LoopOutcome::Accepted {
            trace: vec!["CCO".to_string()],
            iterations: 3,
        };
        assert_eq!(accepted.summary(), "accepted after 3 iterations");

        let failed = LoopOutcome::Exhausted {
            trace: vec![],
            iterations: 1,
            reason: FailureReason::PredictorParse,
        };
        assert!(failed.summary().contains("no parseable candidate"));
    }

    #[test]
    fn test_outcome_serializes() {
        let outcome = LoopOutcome::Exhausted {
            trace: vec!["CCO".to_string()],
            iterations: 2,
            reason: FailureReason::RegistryFailed,
        };
        let json = serde_json::to_string(&outcome).unwrap();
        let back: LoopOutcome = serde_json::from_str(&json).unwrap();
        assert_eq!(back, outcome);
    }
}
