//! Quality scoring strategies
//!
//! A [`QualityScorer`] maps a raw sequence to a score in `[0, 1]`. The
//! analyzer takes one by value, so tests can plug in a fixed stub and
//! production code picks the heuristic or the random placeholder.

use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::engines::compute::string_ops::{count_bases, gc_fraction, homopolymer_runs};

/// Scores one sequence
pub trait QualityScorer: Send + Sync {
    fn score(&self, sequence: &[u8]) -> f64;
}

impl<F> QualityScorer for F
where
    F: Fn(&[u8]) -> f64 + Send + Sync,
{
    fn score(&self, sequence: &[u8]) -> f64 {
        self(sequence)
    }
}

/// Deterministic composition heuristic
///
/// Adds 0.3 for balanced GC content (0.4 to 0.6), 0.3 when no base is
/// ambiguous, and up to 0.4 for repeated runs.
#[derive(Debug, Clone, Copy, Default)]
pub struct HeuristicQualityScorer;

impl HeuristicQualityScorer {
    const GC_BONUS: f64 = 0.3;
    const NO_N_BONUS: f64 = 0.3;
    const RUN_CAP: f64 = 0.4;
}

impl QualityScorer for HeuristicQualityScorer {
    fn score(&self, sequence: &[u8]) -> f64 {
        if sequence.is_empty() {
            return 0.0;
        }

        let mut score = 0.0;

        let gc = gc_fraction(sequence);
        if (0.4..=0.6).contains(&gc) {
            score += Self::GC_BONUS;
        }

        if count_bases(sequence).n == 0 {
            score += Self::NO_N_BONUS;
        }

        let runs: f64 = homopolymer_runs(sequence)
            .into_iter()
            .filter(|&run| run > 1)
            .map(|run| (0.01 * run as f64).min(0.1))
            .sum();
        score += runs.min(Self::RUN_CAP);

        score.clamp(0.0, 1.0)
    }
}

/// Uniform random score in `[0, 1)`
///
/// Carries no information about the sequence.
#[derive(Debug)]
pub struct RandomQualityScorer {
    rng: Mutex<StdRng>,
}

impl RandomQualityScorer {
    /// Reproducible scorer
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }

    pub fn from_entropy() -> Self {
        Self {
            rng: Mutex::new(StdRng::from_entropy()),
        }
    }
}

impl Default for RandomQualityScorer {
    fn default() -> Self {
        Self::from_entropy()
    }
}

impl QualityScorer for RandomQualityScorer {
    fn score(&self, _sequence: &[u8]) -> f64 {
        self.rng.lock().gen::<f64>()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_heuristic_balanced_clean() {
        // GC 0.5, no N, no runs
        assert!(approx(HeuristicQualityScorer.score(b"ACGT"), 0.6));
    }

    #[test]
    fn test_heuristic_runs() {
        // GC 0.0, no N, one run of 4: 0.3 + 0.04
        assert!(approx(HeuristicQualityScorer.score(b"AAAAT"), 0.34));
        // Runs are capped at 0.1 each
        let long_run = vec![b'A'; 50];
        assert!(approx(HeuristicQualityScorer.score(&long_run), 0.4));
    }

    #[test]
    fn test_heuristic_counts_trailing_run() {
        let leading = HeuristicQualityScorer.score(b"AAAAT");
        assert!(approx(HeuristicQualityScorer.score(b"TAAAA"), leading));
        assert!(approx(HeuristicQualityScorer.score(b"CGAA"), 0.62));
    }

    #[test]
    fn test_heuristic_gc_ignores_n() {
        // GC over non-N bases is 0.5; over the full length it would be 0.25
        assert!(approx(HeuristicQualityScorer.score(b"ACGTNNNN"), 0.3 + 0.04));
    }

    #[test]
    fn test_heuristic_bounds() {
        assert_eq!(HeuristicQualityScorer.score(b""), 0.0);
        // All N: no GC bonus, no clean bonus, one run of 4
        assert!(approx(HeuristicQualityScorer.score(b"NNNN"), 0.04));

        let mut busy = Vec::new();
        for _ in 0..10 {
            busy.extend_from_slice(b"GGGGGGGGGGCCCCCCCCCCAAAAAAAAAATTTTTTTTTT");
        }
        let score = HeuristicQualityScorer.score(&busy);
        assert!(approx(score, 1.0));
    }

    #[test]
    fn test_random_is_seedable() {
        let a = RandomQualityScorer::seeded(7);
        let b = RandomQualityScorer::seeded(7);
        for _ in 0..16 {
            let x = a.score(b"ACGT");
            assert_eq!(x, b.score(b"ACGT"));
            assert!((0.0..1.0).contains(&x));
        }
    }

    #[test]
    fn test_closure_scorer() {
        let fixed = |_: &[u8]| 0.25_f64;
        assert_eq!(fixed.score(b"ACGT"), 0.25);
    }
}
