//! Sequence file input

pub mod fasta;

pub use fasta::{parse_fasta_str, read_fasta, FastaError, FastaRecord};
