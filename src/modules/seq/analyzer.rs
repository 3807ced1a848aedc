//! Per-sequence statistics
//!
//! [`SequenceAnalysis`] is the contract the batch executor runs inside its
//! workers. [`SequenceAnalyzer`] is the stock implementation: base
//! composition from the compute kernels, quality from a pluggable
//! [`QualityScorer`], comparison through affine-gap global alignment.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::engines::compute::alignment::{self, AlignmentResult, Comparison, ScoringScheme};
use crate::engines::compute::string_ops::count_bases;
use crate::engines::core::config::{ConfigError, ConfigResult, ProcessorConfig};
use crate::engines::core::parallel::UnitPanic;
use crate::modules::seq::alphabet::Alphabet;
use crate::modules::seq::quality::{HeuristicQualityScorer, QualityScorer};

#[derive(Debug, Clone, PartialEq, Error)]
pub enum AnalysisError {
    #[error("unsupported symbol {symbol:?} at position {position}")]
    UnsupportedSymbol { symbol: char, position: usize },

    #[error("sequence {index}: {source}")]
    InSequence {
        index: usize,
        #[source]
        source: Box<AnalysisError>,
    },

    #[error("quality score {0} is outside [0, 1]")]
    QualityOutOfRange(f64),

    #[error("analysis panicked: {0}")]
    Panicked(String),

    #[error("{0}")]
    Custom(String),
}

impl AnalysisError {
    /// Shift a sequence index by `offset`, turning a batch-relative
    /// position into an input-relative one
    pub fn offset_by(self, offset: usize) -> Self {
        match self {
            AnalysisError::InSequence { index, source } => AnalysisError::InSequence {
                index: index + offset,
                source,
            },
            other => other,
        }
    }
}

impl From<UnitPanic> for AnalysisError {
    fn from(panic: UnitPanic) -> Self {
        AnalysisError::Panicked(panic.message)
    }
}

pub type AnalysisResult<T> = Result<T, AnalysisError>;

/// Statistics for one sequence
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StatRecord {
    /// G+C over non-N bases, 0 when there are none
    pub gc_content: f64,
    /// Number of symbols (chars, not bytes)
    pub length: usize,
    /// N over all bases, 0 for an empty sequence
    pub n_content: f64,
    pub quality_score: f64,
}

/// What the batch executor needs from an analyzer
pub trait SequenceAnalysis: Send + Sync {
    fn analyze(&self, sequence: &str) -> AnalysisResult<StatRecord>;

    /// Analyze every sequence in order.
    ///
    /// Stops at the first failure, which is reported with the index of the
    /// offending sequence.
    fn batch_analyze<S: AsRef<str>>(&self, sequences: &[S]) -> AnalysisResult<Vec<StatRecord>>
    where
        Self: Sized,
    {
        sequences
            .iter()
            .enumerate()
            .map(|(index, sequence)| {
                self.analyze(sequence.as_ref())
                    .map_err(|e| AnalysisError::InSequence {
                        index,
                        source: Box::new(e),
                    })
            })
            .collect()
    }

    fn compare(&self, seq1: &str, seq2: &str) -> AlignmentResult<Comparison> {
        alignment::compare(seq1, seq2, &ScoringScheme::default())
    }
}

/// Stock analyzer
#[derive(Debug, Clone)]
pub struct SequenceAnalyzer<Q = HeuristicQualityScorer> {
    scorer: Q,
    alphabet: Option<Alphabet>,
    scoring: ScoringScheme,
}

impl Default for SequenceAnalyzer {
    fn default() -> Self {
        Self::with_scorer(HeuristicQualityScorer)
    }
}

impl SequenceAnalyzer {
    /// Analyzer configured from `config`
    pub fn from_config(config: &ProcessorConfig) -> ConfigResult<Self> {
        let scoring = config
            .scoring
            .to_scheme()
            .map_err(|e| ConfigError::Invalid(e.to_string()))?;

        let analyzer = Self::default().with_scoring(scoring);
        Ok(if config.strict_alphabet {
            analyzer
        } else {
            analyzer.lenient()
        })
    }
}

impl<Q: QualityScorer> SequenceAnalyzer<Q> {
    /// Strict DNA analyzer with the default scoring scheme
    pub fn with_scorer(scorer: Q) -> Self {
        Self {
            scorer,
            alphabet: Some(Alphabet::Dna),
            scoring: ScoringScheme::default(),
        }
    }

    /// Accept any symbol; unknown ones count towards length and the GC
    /// denominator
    pub fn lenient(mut self) -> Self {
        self.alphabet = None;
        self
    }

    pub fn with_alphabet(mut self, alphabet: Alphabet) -> Self {
        self.alphabet = Some(alphabet);
        self
    }

    pub fn with_scoring(mut self, scoring: ScoringScheme) -> Self {
        self.scoring = scoring;
        self
    }

    pub fn alphabet(&self) -> Option<Alphabet> {
        self.alphabet
    }

    pub fn scoring(&self) -> &ScoringScheme {
        &self.scoring
    }

    pub fn scorer(&self) -> &Q {
        &self.scorer
    }
}

impl<Q: QualityScorer> SequenceAnalysis for SequenceAnalyzer<Q> {
    fn analyze(&self, sequence: &str) -> AnalysisResult<StatRecord> {
        let bytes = sequence.as_bytes();

        if let Some(alphabet) = self.alphabet {
            if let Some((position, byte)) = alphabet.first_invalid(bytes) {
                let symbol = sequence[position..].chars().next().unwrap_or(byte as char);
                return Err(AnalysisError::UnsupportedSymbol { symbol, position });
            }
        }

        let quality_score = self.scorer.score(bytes);
        if !(0.0..=1.0).contains(&quality_score) {
            return Err(AnalysisError::QualityOutOfRange(quality_score));
        }

        let counts = count_bases(bytes);
        let length = sequence.chars().count();

        Ok(StatRecord {
            gc_content: counts.gc_fraction(length),
            length,
            n_content: counts.n_fraction(length),
            quality_score,
        })
    }

    fn compare(&self, seq1: &str, seq2: &str) -> AlignmentResult<Comparison> {
        alignment::compare(seq1, seq2, &self.scoring)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engines::compute::alignment::AlignmentError;

    fn fixed(_: &[u8]) -> f64 {
        0.5
    }

    fn analyzer() -> SequenceAnalyzer<fn(&[u8]) -> f64> {
        SequenceAnalyzer::with_scorer(fixed as fn(&[u8]) -> f64)
    }

    #[test]
    fn test_empty_sequence() {
        let record = analyzer().analyze("").unwrap();
        assert_eq!(record.gc_content, 0.0);
        assert_eq!(record.n_content, 0.0);
        assert_eq!(record.length, 0);
    }

    #[test]
    fn test_gc_only() {
        let record = analyzer().analyze("GC").unwrap();
        assert_eq!(record.gc_content, 1.0);
        assert_eq!(record.n_content, 0.0);
        assert_eq!(record.length, 2);
    }

    #[test]
    fn test_all_n() {
        let record = analyzer().analyze("NNNN").unwrap();
        assert_eq!(record.gc_content, 0.0);
        assert_eq!(record.n_content, 1.0);
        assert_eq!(record.length, 4);
    }

    #[test]
    fn test_mixed_case() {
        let record = analyzer().analyze("acgtNN").unwrap();
        assert_eq!(record.gc_content, 0.5);
        assert!((record.n_content - 1.0 / 3.0).abs() < 1e-12);
        assert_eq!(record.quality_score, 0.5);
    }

    #[test]
    fn test_strict_alphabet() {
        let err = analyzer().analyze("ACXT").unwrap_err();
        assert_eq!(
            err,
            AnalysisError::UnsupportedSymbol {
                symbol: 'X',
                position: 2
            }
        );

        // Unknown symbols stay in the GC denominator: 1 / 4
        let record = analyzer().lenient().analyze("ACXT").unwrap();
        assert_eq!(record.length, 4);
        assert_eq!(record.gc_content, 0.25);
    }

    #[test]
    fn test_lenient_length_counts_symbols() {
        let record = analyzer().lenient().analyze("GCé").unwrap();
        assert_eq!(record.length, 3);
        assert!((record.gc_content - 2.0 / 3.0).abs() < 1e-12);

        let record = analyzer().lenient().analyze("NNΩ").unwrap();
        assert_eq!(record.length, 3);
        assert!((record.n_content - 2.0 / 3.0).abs() < 1e-12);
        assert_eq!(record.gc_content, 0.0);
    }

    #[test]
    fn test_out_of_range_quality() {
        let analyzer = SequenceAnalyzer::with_scorer(|_: &[u8]| 1.5_f64);
        assert_eq!(
            analyzer.analyze("ACGT").unwrap_err(),
            AnalysisError::QualityOutOfRange(1.5)
        );

        let analyzer = SequenceAnalyzer::with_scorer(|_: &[u8]| f64::NAN);
        assert!(matches!(
            analyzer.analyze("ACGT"),
            Err(AnalysisError::QualityOutOfRange(_))
        ));
    }

    #[test]
    fn test_batch_analyze_keeps_order() {
        let sequences = ["GGGG", "AAAA", "NNNN", ""];
        let records = analyzer().batch_analyze(&sequences).unwrap();
        let lengths: Vec<usize> = records.iter().map(|r| r.length).collect();
        let gc: Vec<f64> = records.iter().map(|r| r.gc_content).collect();

        assert_eq!(lengths, vec![4, 4, 4, 0]);
        assert_eq!(gc, vec![1.0, 0.0, 0.0, 0.0]);
    }

    #[test]
    fn test_batch_analyze_reports_index() {
        let sequences = vec!["ACGT".to_string(), "ACGT".to_string(), "AC?T".to_string()];
        let err = analyzer().batch_analyze(&sequences).unwrap_err();

        match err.clone() {
            AnalysisError::InSequence { index, source } => {
                assert_eq!(index, 2);
                assert!(matches!(*source, AnalysisError::UnsupportedSymbol { symbol: '?', .. }));
            }
            other => panic!("unexpected error {:?}", other),
        }

        match err.offset_by(10) {
            AnalysisError::InSequence { index, .. } => assert_eq!(index, 12),
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[test]
    fn test_compare_uses_configured_scheme() {
        let analyzer = SequenceAnalyzer::default();
        let result = analyzer.compare("ACGT", "ACGT").unwrap();
        assert_eq!(result.similarity, 1.0);

        assert_eq!(
            analyzer.compare("", "ACGT").unwrap_err(),
            AlignmentError::EmptyInput
        );
    }

    #[test]
    fn test_from_config() {
        let mut config = ProcessorConfig::default();
        config.strict_alphabet = false;
        let analyzer = SequenceAnalyzer::from_config(&config).unwrap();
        assert_eq!(analyzer.alphabet(), None);

        config.scoring.gap_open = 1;
        assert!(SequenceAnalyzer::from_config(&config).is_err());
    }
}
