//! Fan-out / fan-in batch execution
//!
//! The input is partitioned into at most `W` contiguous batches, one unit
//! of work per batch is submitted to the pool and the call waits for every
//! unit before looking at any result. Results are merged in partition
//! order, so the output lines up with the input no matter which unit
//! finished first. Any failure fails the whole call.

use std::sync::Arc;

use crate::engines::core::logging::Logger;
use crate::engines::core::parallel::{partition, WorkerPool};
use crate::engines::{EngineError, EngineResult};
use crate::modules::seq::{AnalysisError, SequenceAnalysis, StatRecord};

pub struct BatchExecutor<A> {
    analyzer: Arc<A>,
    pool: Arc<WorkerPool>,
    logger: Logger,
}

impl<A: SequenceAnalysis> BatchExecutor<A> {
    pub fn new(analyzer: Arc<A>, pool: Arc<WorkerPool>, logger: Logger) -> Self {
        Self {
            analyzer,
            pool,
            logger,
        }
    }

    pub fn analyzer(&self) -> &A {
        &self.analyzer
    }

    pub fn pool(&self) -> &WorkerPool {
        &self.pool
    }

    /// Analyze every sequence, returning records in input order.
    ///
    /// Empty input returns an empty list without touching the pool.
    pub fn process_batch<S>(&self, sequences: &[S]) -> EngineResult<Vec<StatRecord>>
    where
        S: AsRef<str> + Sync,
    {
        let workers = self.pool.capacity();
        let batches = partition(sequences, workers)?;
        if batches.is_empty() {
            return Ok(Vec::new());
        }

        self.logger.debug(format_args!(
            "dispatching {} sequences as {} batches on {} workers",
            sequences.len(),
            batches.len(),
            workers
        ));

        let analyzer = &*self.analyzer;
        let outcomes = self
            .pool
            .run_all(batches.clone(), |batch| analyzer.batch_analyze(batch.items))?;

        let mut merged = Vec::with_capacity(sequences.len());
        let mut first_failure: Option<EngineError> = None;
        let mut failed = 0;

        for (batch, outcome) in batches.iter().zip(outcomes) {
            let result = outcome
                .map_err(AnalysisError::from)
                .and_then(|records| records);

            match result {
                Ok(records) => merged.extend(records),
                Err(err) => {
                    let err = err.offset_by(batch.offset);
                    let range = batch.range();
                    self.logger.error(format_args!(
                        "batch {} (sequences {}..{}) failed: {}",
                        batch.index, range.start, range.end, err
                    ));
                    failed += 1;
                    if first_failure.is_none() {
                        first_failure = Some(EngineError::BatchProcessing {
                            batch: batch.index,
                            start: range.start,
                            end: range.end,
                            source: err,
                        });
                    }
                }
            }
        }

        if let Some(err) = first_failure {
            self.logger.warn(format_args!(
                "{} of {} batches failed, discarding {} completed records",
                failed,
                batches.len(),
                merged.len()
            ));
            return Err(err);
        }

        Ok(merged)
    }
}

impl<A> std::fmt::Debug for BatchExecutor<A> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BatchExecutor")
            .field("pool", &self.pool)
            .finish()
    }
}
