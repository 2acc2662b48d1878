//! Concurrency-capped refinement service
//!
//! Loop runs are independent (each owns its trace and targets only
//! external services), so they can run in parallel freely. The external
//! services cannot absorb unbounded fan-out, though, so the service
//! gates concurrent runs behind a semaphore.

use crate::outcome::{FailureReason, LoopOutcome};
use crate::refine::{CancelFlag, Refiner};
use std::sync::Arc;
use tokio::sync::Semaphore;
use tracing::debug;

/// Runs refinement loops with a cap on concurrent executions
pub struct RefineService {
    refiner: Arc<Refiner>,
    permits: Arc<Semaphore>,
}

impl RefineService {
    /// Create a service allowing at most `max_concurrent` runs at once
    pub fn new(refiner: Arc<Refiner>, max_concurrent: usize) -> Self {
        Self {
            refiner,
            permits: Arc::new(Semaphore::new(max_concurrent)),
        }
    }

    /// Run one refinement search, waiting for a permit if the service is
    /// at capacity
    pub async fn run(&self, product: &str, reaction_class: &str) -> LoopOutcome {
        self.run_with_cancel(product, reaction_class, &CancelFlag::new())
            .await
    }

    /// Run one refinement search with a caller-supplied cancel flag
    pub async fn run_with_cancel(
        &self,
        product: &str,
        reaction_class: &str,
        cancel: &CancelFlag,
    ) -> LoopOutcome {
        let permit = match self.permits.acquire().await {
            Ok(permit) => permit,
            // the semaphore is never closed by this service; treat a
            // closed semaphore like a cancelled run instead of panicking
            Err(_) => {
                return LoopOutcome::Exhausted {
                    trace: Vec::new(),
                    iterations: 0,
                    reason: FailureReason::Cancelled,
                }
            }
        };

        debug!(product, reaction_class, "starting refinement run");
        let outcome = self
            .refiner
            .run_with_cancel(product, reaction_class, cancel)
            .await;
        drop(permit);
        outcome
    }

    /// Permits currently available (mostly useful for tests and metrics)
    pub fn available_permits(&self) -> usize {
        self.permits.available_permits()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use retrosynth_core::error::Result;
    use retrosynth_core::{
        Completion, Predictor, Presence, Registry, SmilesChecker, Usage,
    };
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Predictor that records how many calls are in flight at once
    struct GaugedPredictor {
        in_flight: AtomicUsize,
        peak: AtomicUsize,
    }

    impl GaugedPredictor {
        fn new() -> Self {
            Self {
                in_flight: AtomicUsize::new(0),
                peak: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl Predictor for GaugedPredictor {
        fn name(&self) -> &str {
            "gauged"
        }

        async fn predict(&self, _product: &str, _reaction_class: &str) -> Result<Completion> {
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(now, Ordering::SeqCst);
            tokio::time::sleep(std::time::Duration::from_millis(10)).await;
            self.in_flight.fetch_sub(1, Ordering::SeqCst);
            Ok(Completion {
                model: "gauged".into(),
                content: Some("CCO".to_string()),
                usage: Usage::default(),
            })
        }
    }

    struct AllKnownRegistry;

    #[async_trait]
    impl Registry for AllKnownRegistry {
        fn name(&self) -> &str {
            "all-known"
        }

        async fn lookup(&self, _smiles: &str) -> Result<Presence> {
            Ok(Presence::Known)
        }
    }

    #[tokio::test]
    async fn test_concurrent_runs_respect_the_cap() {
        let predictor = Arc::new(GaugedPredictor::new());
        let refiner = Arc::new(Refiner::new(
            predictor.clone(),
            Arc::new(SmilesChecker::new()),
            Arc::new(AllKnownRegistry),
        ));
        let service = Arc::new(RefineService::new(refiner, 2));

        let mut handles = Vec::new();
        for _ in 0..8 {
            let service = service.clone();
            handles.push(tokio::spawn(async move {
                service.run("CCC", "Oxidation").await
            }));
        }
        for handle in handles {
            assert!(handle.await.unwrap().is_accepted());
        }

        assert!(predictor.peak.load(Ordering::SeqCst) <= 2);
        assert_eq!(service.available_permits(), 2);
    }

    #[tokio::test]
    async fn test_single_run_through_service() {
        let refiner = Arc::new(Refiner::new(
            Arc::new(GaugedPredictor::new()),
            Arc::new(SmilesChecker::new()),
            Arc::new(AllKnownRegistry),
        ));
        let service = RefineService::new(refiner, 1);

        let outcome = service.run("CCC", "Oxidation").await;
        assert!(outcome.is_accepted());
        assert_eq!(outcome.trace(), ["CCO".to_string()]);
    }
}
