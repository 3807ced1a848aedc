//! Sequence alphabets

use serde::{Deserialize, Serialize};

/// Symbol set a sequence is checked against (case-insensitive)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Alphabet {
    Dna,
    Rna,
    Protein,
}

impl Alphabet {
    /// Upper-case letters of the alphabet
    pub fn letters(self) -> &'static [u8] {
        match self {
            Alphabet::Dna => b"ACGTN",
            Alphabet::Rna => b"ACGUN",
            Alphabet::Protein => b"ACDEFGHIKLMNPQRSTVWYBZX*",
        }
    }

    pub fn contains(self, symbol: u8) -> bool {
        self.letters().contains(&symbol.to_ascii_uppercase())
    }

    pub fn is_valid(self, sequence: &[u8]) -> bool {
        self.first_invalid(sequence).is_none()
    }

    /// Position and value of the first symbol outside the alphabet
    pub fn first_invalid(self, sequence: &[u8]) -> Option<(usize, u8)> {
        sequence
            .iter()
            .enumerate()
            .find(|(_, &b)| !self.contains(b))
            .map(|(i, &b)| (i, b))
    }
}

impl Default for Alphabet {
    fn default() -> Self {
        Alphabet::Dna
    }
}
