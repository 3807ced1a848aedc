//! Pairwise sequence alignment
//!
//! Global alignment with a substitution matrix and affine gap costs
//! (Gotoh's three-state formulation of Needleman-Wunsch). A gap of length
//! `k` costs `gap_open + (k - 1) * gap_extend`.

use thiserror::Error;

/// Result type for alignment operations
pub type AlignmentResult<T> = Result<T, AlignmentError>;

/// Error types for alignment operations
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AlignmentError {
    #[error("cannot align an empty sequence")]
    EmptyInput,

    #[error("symbol {symbol:?} at position {position} of sequence {sequence} is not covered by the scoring scheme")]
    UnsupportedSymbol {
        sequence: usize,
        position: usize,
        symbol: char,
    },

    #[error("invalid scoring scheme: {0}")]
    InvalidScheme(String),
}

const ABSENT: u8 = u8::MAX;
const NEG_INF: i64 = i64::MIN / 4;

/// Substitution scores over an alphabet plus affine gap costs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoringScheme {
    alphabet: Vec<u8>,
    /// Row-major `alphabet.len() x alphabet.len()` substitution matrix
    matrix: Vec<i32>,
    gap_open: i32,
    gap_extend: i32,
}

impl ScoringScheme {
    /// Uniform match/mismatch scheme over `alphabet`
    pub fn new(
        alphabet: &[u8],
        match_score: i32,
        mismatch_score: i32,
        gap_open: i32,
        gap_extend: i32,
    ) -> AlignmentResult<Self> {
        let size = alphabet.len();
        let matrix = (0..size * size)
            .map(|k| if k / size == k % size { match_score } else { mismatch_score })
            .collect();
        Self::with_matrix(alphabet, matrix, gap_open, gap_extend)
    }

    /// Scheme with an explicit row-major substitution matrix
    pub fn with_matrix(
        alphabet: &[u8],
        matrix: Vec<i32>,
        gap_open: i32,
        gap_extend: i32,
    ) -> AlignmentResult<Self> {
        if alphabet.is_empty() {
            return Err(AlignmentError::InvalidScheme("alphabet is empty".to_string()));
        }

        let alphabet: Vec<u8> = alphabet.iter().map(|b| b.to_ascii_uppercase()).collect();
        for (i, symbol) in alphabet.iter().enumerate() {
            if alphabet[..i].contains(symbol) {
                return Err(AlignmentError::InvalidScheme(format!(
                    "symbol {:?} listed twice",
                    *symbol as char
                )));
            }
        }
        if alphabet.len() >= ABSENT as usize {
            return Err(AlignmentError::InvalidScheme("alphabet too large".to_string()));
        }
        if matrix.len() != alphabet.len() * alphabet.len() {
            return Err(AlignmentError::InvalidScheme(format!(
                "matrix has {} entries, expected {}",
                matrix.len(),
                alphabet.len() * alphabet.len()
            )));
        }
        if gap_open >= 0 || gap_extend >= 0 {
            return Err(AlignmentError::InvalidScheme(
                "gap costs must be strictly negative".to_string(),
            ));
        }
        if gap_open >= gap_extend {
            return Err(AlignmentError::InvalidScheme(
                "gap opening must cost more than gap extension".to_string(),
            ));
        }

        let scheme = Self {
            alphabet,
            matrix,
            gap_open,
            gap_extend,
        };
        if let Some(i) = (0..scheme.alphabet.len()).find(|&i| scheme.identity_score(i) <= 0) {
            return Err(AlignmentError::InvalidScheme(format!(
                "identity score for {:?} must be positive",
                scheme.alphabet[i] as char
            )));
        }
        Ok(scheme)
    }

    pub fn alphabet(&self) -> &[u8] {
        &self.alphabet
    }

    pub fn gap_open(&self) -> i32 {
        self.gap_open
    }

    pub fn gap_extend(&self) -> i32 {
        self.gap_extend
    }

    /// Substitution score, or `None` if either symbol is outside the alphabet
    pub fn score(&self, a: u8, b: u8) -> Option<i32> {
        let size = self.alphabet.len();
        let i = self.index_of(a)?;
        let j = self.index_of(b)?;
        Some(self.matrix[i * size + j])
    }

    /// Highest identity score in the matrix
    pub fn best_diagonal(&self) -> i32 {
        (0..self.alphabet.len())
            .map(|i| self.identity_score(i))
            .max()
            .unwrap_or(0)
    }

    /// Score of aligning `sequence` against itself, or `None` if it has a
    /// symbol outside the alphabet
    pub fn self_score(&self, sequence: &[u8]) -> Option<i64> {
        sequence
            .iter()
            .map(|&b| self.index_of(b).map(|i| self.identity_score(i) as i64))
            .sum()
    }

    fn identity_score(&self, index: usize) -> i32 {
        self.matrix[index * self.alphabet.len() + index]
    }

    fn index_of(&self, symbol: u8) -> Option<usize> {
        let upper = symbol.to_ascii_uppercase();
        self.alphabet.iter().position(|&s| s == upper)
    }

    fn encode(&self, sequence: &[u8], which: usize) -> AlignmentResult<Vec<u8>> {
        sequence
            .iter()
            .enumerate()
            .map(|(position, &symbol)| {
                self.index_of(symbol)
                    .map(|i| i as u8)
                    .ok_or(AlignmentError::UnsupportedSymbol {
                        sequence: which,
                        position,
                        symbol: symbol as char,
                    })
            })
            .collect()
    }
}

impl Default for ScoringScheme {
    /// DNA (A, C, G, T, N) with match 2, mismatch -1, gap open -2, gap extend -1
    fn default() -> Self {
        let alphabet = b"ACGTN".to_vec();
        let size = alphabet.len();
        Self {
            matrix: (0..size * size)
                .map(|k| if k / size == k % size { 2 } else { -1 })
                .collect(),
            alphabet,
            gap_open: -2,
            gap_extend: -1,
        }
    }
}

/// Represents an alignment between two sequences
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alignment {
    /// First sequence aligned (with gaps)
    pub seq1_aligned: Vec<u8>,
    /// Second sequence aligned (with gaps)
    pub seq2_aligned: Vec<u8>,
    pub score: i64,
}

impl Alignment {
    /// Number of gap columns
    pub fn gap_count(&self) -> usize {
        self.seq1_aligned
            .iter()
            .zip(&self.seq2_aligned)
            .filter(|(a, b)| **a == b'-' || **b == b'-')
            .count()
    }

    /// Identical, non-gap columns over alignment length
    pub fn identity(&self) -> f64 {
        if self.seq1_aligned.is_empty() {
            return 0.0;
        }
        let matches = self
            .seq1_aligned
            .iter()
            .zip(&self.seq2_aligned)
            .filter(|(a, b)| **a != b'-' && a.eq_ignore_ascii_case(b))
            .count();
        matches as f64 / self.seq1_aligned.len() as f64
    }
}

/// Outcome of comparing two sequences
#[derive(Debug, Clone, PartialEq)]
pub struct Comparison {
    /// Best score over the larger of the two self-alignment scores, in `[0, 1]`
    pub similarity: f64,
    pub alignment: Option<(String, String)>,
}

impl Comparison {
    fn unaligned() -> Self {
        Self {
            similarity: 0.0,
            alignment: None,
        }
    }
}

/// Compare two sequences by global alignment
pub fn compare(seq1: &str, seq2: &str, scoring: &ScoringScheme) -> AlignmentResult<Comparison> {
    let alignment = match needleman_wunsch(seq1.as_bytes(), seq2.as_bytes(), scoring)? {
        Some(alignment) => alignment,
        None => return Ok(Comparison::unaligned()),
    };

    // Both sequences were checked against the alphabet by the alignment
    let ceiling = scoring
        .self_score(seq1.as_bytes())
        .max(scoring.self_score(seq2.as_bytes()))
        .unwrap_or(0);
    if ceiling <= 0 {
        return Ok(Comparison::unaligned());
    }
    let similarity = (alignment.score as f64 / ceiling as f64).clamp(0.0, 1.0);

    Ok(Comparison {
        similarity,
        alignment: Some((
            String::from_utf8_lossy(&alignment.seq1_aligned).into_owned(),
            String::from_utf8_lossy(&alignment.seq2_aligned).into_owned(),
        )),
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    /// Diagonal: both sequences consume a symbol
    Match,
    /// Gap in seq2: only seq1 consumes
    Up,
    /// Gap in seq1: only seq2 consumes
    Left,
}

fn best_of(candidates: [(i64, State); 3]) -> (i64, State) {
    // Ties resolve in candidate order
    let mut best = candidates[0];
    for candidate in &candidates[1..] {
        if candidate.0 > best.0 {
            best = *candidate;
        }
    }
    best
}

/// Perform global alignment with affine gaps.
///
/// Returns `Ok(None)` if no complete path through the matrices exists.
pub fn needleman_wunsch(
    seq1: &[u8],
    seq2: &[u8],
    scoring: &ScoringScheme,
) -> AlignmentResult<Option<Alignment>> {
    if seq1.is_empty() || seq2.is_empty() {
        return Err(AlignmentError::EmptyInput);
    }

    let a = scoring.encode(seq1, 1)?;
    let b = scoring.encode(seq2, 2)?;
    let size = scoring.alphabet.len();

    let m = a.len();
    let n = b.len();
    let width = n + 1;
    let cells = (m + 1) * width;
    let open = scoring.gap_open as i64;
    let extend = scoring.gap_extend as i64;

    // Best score ending in each state, and the state it came from
    let mut diag = vec![NEG_INF; cells];
    let mut up = vec![NEG_INF; cells];
    let mut left = vec![NEG_INF; cells];
    let mut diag_from = vec![State::Match; cells];
    let mut up_from = vec![State::Match; cells];
    let mut left_from = vec![State::Match; cells];

    diag[0] = 0;
    for i in 1..=m {
        up[i * width] = open + (i as i64 - 1) * extend;
        up_from[i * width] = if i == 1 { State::Match } else { State::Up };
    }
    for j in 1..=n {
        left[j] = open + (j as i64 - 1) * extend;
        left_from[j] = if j == 1 { State::Match } else { State::Left };
    }

    for i in 1..=m {
        for j in 1..=n {
            let here = i * width + j;
            let nw = (i - 1) * width + (j - 1);
            let north = (i - 1) * width + j;
            let west = i * width + (j - 1);

            let substitution = scoring.matrix[a[i - 1] as usize * size + b[j - 1] as usize] as i64;
            let (best, from) = best_of([
                (diag[nw], State::Match),
                (up[nw], State::Up),
                (left[nw], State::Left),
            ]);
            diag[here] = best + substitution;
            diag_from[here] = from;

            let (best, from) = best_of([
                (diag[north] + open, State::Match),
                (up[north] + extend, State::Up),
                (left[north] + open, State::Left),
            ]);
            up[here] = best;
            up_from[here] = from;

            let (best, from) = best_of([
                (diag[west] + open, State::Match),
                (up[west] + open, State::Up),
                (left[west] + extend, State::Left),
            ]);
            left[here] = best;
            left_from[here] = from;
        }
    }

    let last = m * width + n;
    let (score, mut state) = best_of([
        (diag[last], State::Match),
        (up[last], State::Up),
        (left[last], State::Left),
    ]);
    if score <= NEG_INF / 2 {
        return Ok(None);
    }

    // Traceback to construct the alignment
    let mut aligned_seq1 = Vec::with_capacity(m + n);
    let mut aligned_seq2 = Vec::with_capacity(m + n);
    let mut i = m;
    let mut j = n;

    while i > 0 || j > 0 {
        let here = i * width + j;
        match state {
            State::Match if i > 0 && j > 0 => {
                aligned_seq1.push(seq1[i - 1]);
                aligned_seq2.push(seq2[j - 1]);
                state = diag_from[here];
                i -= 1;
                j -= 1;
            }
            State::Up if i > 0 => {
                aligned_seq1.push(seq1[i - 1]);
                aligned_seq2.push(b'-');
                state = up_from[here];
                i -= 1;
            }
            State::Left if j > 0 => {
                aligned_seq1.push(b'-');
                aligned_seq2.push(seq2[j - 1]);
                state = left_from[here];
                j -= 1;
            }
            // Broken path
            _ => return Ok(None),
        }
    }

    // Reverse the alignment (we traced backwards)
    aligned_seq1.reverse();
    aligned_seq2.reverse();

    Ok(Some(Alignment {
        seq1_aligned: aligned_seq1,
        seq2_aligned: aligned_seq2,
        score,
    }))
}
