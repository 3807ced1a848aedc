//! FASTA input
//!
//! Records come back in file order so their sequences can be fed straight
//! into a batch.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum FastaError {
    #[error("failed to read FASTA {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("line {line}: sequence data before the first header")]
    MissingHeader { line: usize },

    #[error("line {line}: header has no identifier")]
    EmptyHeader { line: usize },
}

pub type FastaResult<T> = Result<T, FastaError>;

/// A FASTA record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FastaRecord {
    /// Sequence identifier
    pub id: String,
    /// Rest of the header line, if any
    pub description: Option<String>,
    pub sequence: String,
}

impl FastaRecord {
    pub fn new(id: &str, description: Option<&str>, sequence: &str) -> Self {
        Self {
            id: id.to_string(),
            description: description.map(|s| s.to_string()),
            sequence: sequence.to_string(),
        }
    }
}

/// Sequences of `records`, in order
pub fn sequences(records: &[FastaRecord]) -> Vec<&str> {
    records.iter().map(|r| r.sequence.as_str()).collect()
}

#[derive(Default)]
struct FastaBuilder {
    records: Vec<FastaRecord>,
    current: Option<FastaRecord>,
}

impl FastaBuilder {
    fn push_line(&mut self, line: &str, line_no: usize) -> FastaResult<()> {
        let line = line.trim();

        if line.is_empty() {
            return Ok(());
        }

        if let Some(header) = line.strip_prefix('>') {
            let mut parts = header.trim_start().splitn(2, char::is_whitespace);
            let id = parts.next().unwrap_or("");
            if id.is_empty() {
                return Err(FastaError::EmptyHeader { line: line_no });
            }
            let description = parts.next().map(str::trim).filter(|d| !d.is_empty());

            self.finish_record();
            self.current = Some(FastaRecord::new(id, description, ""));
            return Ok(());
        }

        match self.current.as_mut() {
            Some(record) => {
                record.sequence.push_str(line);
                Ok(())
            }
            None => Err(FastaError::MissingHeader { line: line_no }),
        }
    }

    fn finish_record(&mut self) {
        if let Some(record) = self.current.take() {
            self.records.push(record);
        }
    }

    fn finish(mut self) -> Vec<FastaRecord> {
        self.finish_record();
        self.records
    }
}

/// Parse FASTA text
///
/// Blank lines are skipped and multi-line sequences are joined. A header
/// with no sequence lines yields a record with an empty sequence.
pub fn parse_fasta_str(content: &str) -> FastaResult<Vec<FastaRecord>> {
    let mut builder = FastaBuilder::default();

    for (idx, line) in content.lines().enumerate() {
        builder.push_line(line, idx + 1)?;
    }

    Ok(builder.finish())
}

/// Read sequences from a FASTA file
pub fn read_fasta<P: AsRef<Path>>(path: P) -> FastaResult<Vec<FastaRecord>> {
    let path = path.as_ref();
    let io_err = |source: std::io::Error| FastaError::Io {
        path: path.to_path_buf(),
        source,
    };

    let reader = BufReader::new(File::open(path).map_err(io_err)?);
    let mut builder = FastaBuilder::default();

    for (idx, line) in reader.lines().enumerate() {
        let line = line.map_err(io_err)?;
        builder.push_line(&line, idx + 1)?;
    }

    Ok(builder.finish())
}
