//! Aggregation of per-sequence records and rendering of the three views

use std::sync::Arc;

use serde::Serialize;

use crate::engines::core::logging::Logger;
use crate::engines::core::parallel::WorkerPool;
use crate::engines::render::{ArtifactKind, RenderError, RenderingSink, Series, Visualizations};
use crate::engines::{EngineError, EngineResult};
use crate::modules::seq::StatRecord;

/// Read-only summary of a completed batch
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregateSummary {
    pub mean_gc: f64,
    pub mean_n_content: f64,
    pub total_bases: usize,
    /// Record lengths in input order
    pub length_series: Vec<usize>,
    /// Quality scores in input order
    pub quality_series: Vec<f64>,
}

impl AggregateSummary {
    /// Summarize `records`; fails on an empty list
    pub fn from_records(records: &[StatRecord]) -> EngineResult<Self> {
        if records.is_empty() {
            return Err(EngineError::EmptyBatch);
        }

        let count = records.len() as f64;
        let mean_gc = records.iter().map(|r| r.gc_content).sum::<f64>() / count;
        let mean_n_content = records.iter().map(|r| r.n_content).sum::<f64>() / count;
        let length_series: Vec<usize> = records.iter().map(|r| r.length).collect();

        Ok(Self {
            mean_gc,
            mean_n_content,
            total_bases: length_series.iter().sum(),
            length_series,
            quality_series: records.iter().map(|r| r.quality_score).collect(),
        })
    }

    pub fn record_count(&self) -> usize {
        self.length_series.len()
    }
}

pub struct SummaryAggregator<R> {
    renderer: Arc<R>,
    pool: Arc<WorkerPool>,
    logger: Logger,
}

impl<R: RenderingSink> SummaryAggregator<R> {
    pub fn new(renderer: Arc<R>, pool: Arc<WorkerPool>, logger: Logger) -> Self {
        Self {
            renderer,
            pool,
            logger,
        }
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    /// Summarize `records` and render every view
    pub fn generate_visualizations(&self, records: &[StatRecord]) -> EngineResult<Visualizations> {
        let summary = AggregateSummary::from_records(records)?;
        self.render(&summary)
    }

    /// Render the three views of `summary` concurrently.
    ///
    /// All renders settle before the first failure, in view order, is
    /// returned. No placeholder image is substituted for a failed view.
    pub fn render(&self, summary: &AggregateSummary) -> EngineResult<Visualizations> {
        let lengths: Vec<f64> = summary.length_series.iter().map(|&l| l as f64).collect();
        let renderer = &*self.renderer;

        let outcomes = self.pool.run_all(ArtifactKind::ALL.to_vec(), |kind| {
            let series = match kind {
                ArtifactKind::GcContent => Series::Scalar(summary.mean_gc),
                ArtifactKind::SequenceLength => Series::Values(&lengths),
                ArtifactKind::QualityScores => Series::Values(&summary.quality_series),
            };
            renderer.render(series, kind.title())
        })?;

        let mut artifacts = Visualizations::new();
        let mut first_failure = None;

        for (kind, outcome) in ArtifactKind::ALL.iter().copied().zip(outcomes) {
            let result = outcome
                .map_err(|unit| RenderError::Panicked(unit.message))
                .and_then(|buffer| buffer);

            match result {
                Ok(buffer) => {
                    artifacts.insert(kind, buffer);
                }
                Err(err) => {
                    self.logger
                        .error(format_args!("rendering {} failed: {}", kind, err));
                    if first_failure.is_none() {
                        first_failure = Some(EngineError::Visualization {
                            view: kind,
                            source: err,
                        });
                    }
                }
            }
        }

        match first_failure {
            Some(err) => Err(err),
            None => Ok(artifacts),
        }
    }
}

impl<R> std::fmt::Debug for SummaryAggregator<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SummaryAggregator")
            .field("pool", &self.pool)
            .finish()
    }
}
