//! Sequence analysis
//!
//! Alphabets, quality scoring strategies and the per-sequence analyzer the
//! batch executor runs on its workers.

pub mod alphabet;
pub mod analyzer;
pub mod quality;

pub use alphabet::Alphabet;
pub use analyzer::{AnalysisError, AnalysisResult, SequenceAnalysis, SequenceAnalyzer, StatRecord};
pub use quality::{HeuristicQualityScorer, QualityScorer, RandomQualityScorer};
