//! Processor configuration
//!
//! Every field has a default, so an empty TOML document is a valid
//! configuration.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::engines::compute::alignment::{AlignmentError, ScoringScheme};
use crate::engines::core::parallel::{default_num_threads, DEFAULT_THREAD_PREFIX};
use crate::modules::seq::Alphabet;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config syntax: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("invalid config value: {0}")]
    Invalid(String),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

/// Top-level configuration for a batch processor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProcessorConfig {
    /// Worker pool capacity
    pub workers: usize,
    pub thread_name_prefix: String,
    /// Reject symbols outside A, C, G, T, N
    pub strict_alphabet: bool,
    pub scoring: ScoringConfig,
    pub render: RenderConfig,
}

impl Default for ProcessorConfig {
    fn default() -> Self {
        Self {
            workers: default_num_threads(),
            thread_name_prefix: DEFAULT_THREAD_PREFIX.to_string(),
            strict_alphabet: true,
            scoring: ScoringConfig::default(),
            render: RenderConfig::default(),
        }
    }
}

/// Match/mismatch scores and affine gap costs for pairwise comparison
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    pub match_score: i32,
    pub mismatch_score: i32,
    pub gap_open: i32,
    pub gap_extend: i32,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            match_score: 2,
            mismatch_score: -1,
            gap_open: -2,
            gap_extend: -1,
        }
    }
}

impl ScoringConfig {
    /// Build the DNA scoring scheme described by this config
    pub fn to_scheme(&self) -> Result<ScoringScheme, AlignmentError> {
        ScoringScheme::new(
            Alphabet::Dna.letters(),
            self.match_score,
            self.mismatch_score,
            self.gap_open,
            self.gap_extend,
        )
    }
}

/// Canvas settings for the SVG renderer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    pub width: u32,
    pub height: u32,
    /// Histogram bins for series views
    pub bins: usize,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            width: 640,
            height: 320,
            bins: 20,
        }
    }
}

impl ProcessorConfig {
    /// Parse and validate a TOML document
    pub fn from_toml_str(content: &str) -> ConfigResult<Self> {
        let config: ProcessorConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a TOML file
    pub fn from_path<P: AsRef<Path>>(path: P) -> ConfigResult<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    pub fn to_toml_string(&self) -> ConfigResult<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> ConfigResult<()> {
        if self.workers == 0 {
            return Err(ConfigError::Invalid("workers must be at least 1".to_string()));
        }
        if self.render.width == 0 || self.render.height == 0 {
            return Err(ConfigError::Invalid(
                "render width and height must be positive".to_string(),
            ));
        }
        if self.render.bins == 0 {
            return Err(ConfigError::Invalid("render bins must be at least 1".to_string()));
        }
        self.scoring
            .to_scheme()
            .map_err(|e| ConfigError::Invalid(e.to_string()))?;
        Ok(())
    }
}
