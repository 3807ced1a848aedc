//! Base-level counting over raw sequence bytes

use itertools::Itertools;

/// Per-symbol tallies for a DNA sequence (case-insensitive)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BaseCounts {
    pub a: usize,
    pub c: usize,
    pub g: usize,
    pub t: usize,
    pub n: usize,
    /// Anything outside A, C, G, T, N
    pub other: usize,
}

impl BaseCounts {
    pub fn total(&self) -> usize {
        self.a + self.c + self.g + self.t + self.n + self.other
    }

    pub fn gc(&self) -> usize {
        self.g + self.c
    }

    /// GC fraction for a sequence of `length` symbols, N excluded from the
    /// denominator
    pub fn gc_fraction(&self, length: usize) -> f64 {
        let informative = length.saturating_sub(self.n);
        if informative == 0 {
            return 0.0;
        }
        self.gc() as f64 / informative as f64
    }

    /// N fraction for a sequence of `length` symbols
    pub fn n_fraction(&self, length: usize) -> f64 {
        if length == 0 {
            return 0.0;
        }
        self.n as f64 / length as f64
    }
}

/// Count occurrences of each base in a DNA sequence
pub fn count_bases(sequence: &[u8]) -> BaseCounts {
    let mut counts = BaseCounts::default();

    for &base in sequence {
        match base {
            b'A' | b'a' => counts.a += 1,
            b'C' | b'c' => counts.c += 1,
            b'G' | b'g' => counts.g += 1,
            b'T' | b't' => counts.t += 1,
            b'N' | b'n' => counts.n += 1,
            _ => counts.other += 1,
        }
    }

    counts
}

/// GC fraction in `[0, 1]`, with N excluded from the denominator.
///
/// Returns 0 when nothing but N is left.
pub fn gc_fraction(sequence: &[u8]) -> f64 {
    count_bases(sequence).gc_fraction(sequence.len())
}

/// Fraction of N in `[0, 1]`; 0 for an empty sequence
pub fn n_fraction(sequence: &[u8]) -> f64 {
    count_bases(sequence).n_fraction(sequence.len())
}

/// Lengths of maximal runs of the same base, in order
pub fn homopolymer_runs(sequence: &[u8]) -> Vec<usize> {
    sequence
        .iter()
        .map(|b| b.to_ascii_uppercase())
        .dedup_with_count()
        .map(|(count, _)| count)
        .collect()
}
