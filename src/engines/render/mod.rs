//! Rendering sinks
//!
//! A sink turns one numeric view of a batch into an encoded image. The
//! engine treats the bytes it returns as opaque.

pub mod svg;

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use svg::SvgRenderer;

pub type RenderResult<T> = Result<T, RenderError>;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum RenderError {
    #[error("cannot render empty series {title:?}")]
    EmptySeries { title: String },

    #[error("series {title:?} contains non-finite value {value}")]
    NonFinite { title: String, value: f64 },

    #[error("renderer panicked: {0}")]
    Panicked(String),

    #[error("{0}")]
    Backend(String),
}

/// Input handed to a sink
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Series<'a> {
    Scalar(f64),
    Values(&'a [f64]),
}

/// Turns a numeric series into an encoded image
pub trait RenderingSink: Send + Sync {
    fn render(&self, series: Series<'_>, title: &str) -> RenderResult<Vec<u8>>;
}

impl<F> RenderingSink for F
where
    F: Fn(Series<'_>, &str) -> RenderResult<Vec<u8>> + Send + Sync,
{
    fn render(&self, series: Series<'_>, title: &str) -> RenderResult<Vec<u8>> {
        self(series, title)
    }
}

/// The three views rendered for every batch
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArtifactKind {
    GcContent,
    SequenceLength,
    QualityScores,
}

impl ArtifactKind {
    pub const ALL: [ArtifactKind; 3] = [
        ArtifactKind::GcContent,
        ArtifactKind::SequenceLength,
        ArtifactKind::QualityScores,
    ];

    /// Key under which the rendered buffer is returned
    pub fn key(self) -> &'static str {
        match self {
            ArtifactKind::GcContent => "gc_content",
            ArtifactKind::SequenceLength => "sequence_length",
            ArtifactKind::QualityScores => "quality_scores",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            ArtifactKind::GcContent => "Mean GC content",
            ArtifactKind::SequenceLength => "Sequence length distribution",
            ArtifactKind::QualityScores => "Quality score distribution",
        }
    }
}

impl fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Rendered buffers keyed by view
pub type Visualizations = BTreeMap<ArtifactKind, Vec<u8>>;
