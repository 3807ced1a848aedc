//! Bounded fan-out / fan-in batch analysis of biological sequences.
//!
//! A [`BatchProcessor`] splits a list of sequences into at most `W`
//! contiguous batches, analyzes them concurrently on a fixed-size worker
//! pool and merges the per-sequence [`StatRecord`]s back in input order.
//! The merged records can then be summarized and rendered into three
//! views (`gc_content`, `sequence_length`, `quality_scores`).
//!
//! ```no_run
//! use seqbatch::{BatchProcessor, ProcessorConfig};
//!
//! let processor = BatchProcessor::from_config(&ProcessorConfig::default())?;
//! let records = processor.process_batch(&["ACGT", "GGCCNN", "ATAT"])?;
//! let views = processor.generate_visualizations(&records)?;
//! assert_eq!(views.len(), 3);
//! # Ok::<(), seqbatch::EngineError>(())
//! ```

pub mod engines;
pub mod modules;

pub use engines::compute::{compare, AlignmentError, Comparison, ScoringScheme};
pub use engines::core::{Logger, PartitionError, PoolError, ProcessorConfig, WorkerPool};
pub use engines::render::{ArtifactKind, RenderError, RenderingSink, Series, SvgRenderer, Visualizations};
pub use engines::{EngineError, EngineResult};
pub use modules::batch::{AggregateSummary, BatchExecutor, BatchProcessor, SummaryAggregator};
pub use modules::io::{parse_fasta_str, read_fasta, FastaError, FastaRecord};
pub use modules::seq::{
    Alphabet, AnalysisError, HeuristicQualityScorer, QualityScorer, RandomQualityScorer,
    SequenceAnalysis, SequenceAnalyzer, StatRecord,
};
