//! Compute primitives for sequence statistics
//!
//! Pure, allocation-light kernels: base counting for the per-sequence
//! statistics and pairwise alignment for sequence comparison.

pub mod alignment;
pub mod string_ops;

pub use alignment::{compare, AlignmentError, AlignmentResult, Comparison, ScoringScheme};
pub use string_ops::{count_bases, gc_fraction, n_fraction, BaseCounts};
