//! Execution engines
//!
//! The worker pool, the compute kernels that run inside it and the
//! rendering sinks that turn aggregated numbers into images.

pub mod core;
pub mod compute;
pub mod render;

use crate::engines::compute::alignment::AlignmentError;
use crate::engines::core::config::ConfigError;
use crate::engines::core::parallel::{PartitionError, PoolError};
use crate::engines::render::{ArtifactKind, RenderError};
use crate::modules::io::fasta::FastaError;
use crate::modules::seq::AnalysisError;

/// Result type for engine-level operations
pub type EngineResult<T> = Result<T, EngineError>;

/// Errors surfaced to callers of the batch engine
///
/// Failures inside concurrent units never reach the caller one by one: the
/// executor and the aggregator fold them into a single `BatchProcessing` or
/// `Visualization` error once every sibling unit has settled.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error(transparent)]
    Partition(#[from] PartitionError),

    #[error(transparent)]
    Pool(#[from] PoolError),

    #[error(transparent)]
    Analysis(#[from] AnalysisError),

    #[error(transparent)]
    Alignment(#[from] AlignmentError),

    #[error("batch {batch} (sequences {start}..{end}) failed: {source}")]
    BatchProcessing {
        batch: usize,
        start: usize,
        end: usize,
        #[source]
        source: AnalysisError,
    },

    #[error("rendering of {view} failed: {source}")]
    Visualization {
        view: ArtifactKind,
        #[source]
        source: RenderError,
    },

    #[error("cannot aggregate an empty batch")]
    EmptyBatch,

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Fasta(#[from] FastaError),
}
