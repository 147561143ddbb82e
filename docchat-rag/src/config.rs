//! Configuration for chunking and retrieval.

use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{RagError, Result};

/// Environment variable overriding [`RagConfig::chunk_size`].
pub const ENV_CHUNK_SIZE: &str = "DOCCHAT_CHUNK_SIZE";
/// Environment variable overriding [`RagConfig::chunk_overlap`].
pub const ENV_CHUNK_OVERLAP: &str = "DOCCHAT_CHUNK_OVERLAP";
/// Environment variable overriding [`RagConfig::top_k`].
pub const ENV_TOP_K: &str = "DOCCHAT_TOP_K";
/// Environment variable setting [`RagConfig::embedding_timeout`], in seconds.
pub const ENV_EMBEDDING_TIMEOUT_SECS: &str = "DOCCHAT_EMBEDDING_TIMEOUT_SECS";

/// Configuration parameters for chunking and retrieval.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RagConfig {
    /// Maximum chunk size in characters.
    pub chunk_size: usize,
    /// Number of overlapping characters between consecutive chunks.
    pub chunk_overlap: usize,
    /// Number of chunks handed back per query.
    pub top_k: usize,
    /// Upper bound on the batched embedding call. `None` waits for the provider.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub embedding_timeout: Option<Duration>,
}

impl Default for RagConfig {
    fn default() -> Self {
        Self { chunk_size: 1000, chunk_overlap: 200, top_k: 3, embedding_timeout: None }
    }
}

impl RagConfig {
    /// Create a new builder for constructing a [`RagConfig`].
    pub fn builder() -> RagConfigBuilder {
        RagConfigBuilder::default()
    }

    /// Build a validated config from the `DOCCHAT_*` environment variables,
    /// falling back to the defaults for anything unset.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Like [`from_env`](Self::from_env), but reads values through `lookup`.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut builder = Self::builder();
        if let Some(size) = parse_var(&lookup, ENV_CHUNK_SIZE)? {
            builder = builder.chunk_size(size);
        }
        if let Some(overlap) = parse_var(&lookup, ENV_CHUNK_OVERLAP)? {
            builder = builder.chunk_overlap(overlap);
        }
        if let Some(k) = parse_var(&lookup, ENV_TOP_K)? {
            builder = builder.top_k(k);
        }
        if let Some(secs) = parse_var::<_, u64>(&lookup, ENV_EMBEDDING_TIMEOUT_SECS)? {
            builder = builder.embedding_timeout(Duration::from_secs(secs));
        }
        builder.build()
    }

    /// Check that the parameters are consistent.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::InvalidConfiguration`] if:
    /// - `chunk_size == 0`
    /// - `chunk_overlap >= chunk_size`
    /// - `top_k == 0`
    pub fn validate(&self) -> Result<()> {
        validate_chunking(self.chunk_size, self.chunk_overlap)?;
        validate_top_k(self.top_k)
    }
}

pub(crate) fn validate_chunking(chunk_size: usize, chunk_overlap: usize) -> Result<()> {
    if chunk_size == 0 {
        return Err(RagError::InvalidConfiguration(
            "chunk_size must be greater than zero".to_string(),
        ));
    }
    if chunk_overlap >= chunk_size {
        return Err(RagError::InvalidConfiguration(format!(
            "chunk_overlap ({chunk_overlap}) must be less than chunk_size ({chunk_size})"
        )));
    }
    Ok(())
}

pub(crate) fn validate_top_k(top_k: usize) -> Result<()> {
    if top_k == 0 {
        return Err(RagError::InvalidConfiguration("k must be greater than zero".to_string()));
    }
    Ok(())
}

fn parse_var<F, T>(lookup: &F, key: &str) -> Result<Option<T>>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::fmt::Display,
{
    let Some(raw) = lookup(key) else {
        return Ok(None);
    };
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(None);
    }
    raw.parse::<T>().map(Some).map_err(|e| {
        RagError::InvalidConfiguration(format!("{key}={raw:?} is not a valid value: {e}"))
    })
}

/// Builder for constructing a validated [`RagConfig`].
#[derive(Debug, Clone, Default)]
pub struct RagConfigBuilder {
    config: RagConfig,
}

impl RagConfigBuilder {
    /// Set the maximum chunk size in characters.
    pub fn chunk_size(mut self, size: usize) -> Self {
        self.config.chunk_size = size;
        self
    }

    /// Set the overlap between consecutive chunks in characters.
    pub fn chunk_overlap(mut self, overlap: usize) -> Self {
        self.config.chunk_overlap = overlap;
        self
    }

    /// Set the number of chunks returned per query.
    pub fn top_k(mut self, k: usize) -> Self {
        self.config.top_k = k;
        self
    }

    /// Bound the embedding call; on expiry retrieval ranks lexically.
    pub fn embedding_timeout(mut self, timeout: Duration) -> Self {
        self.config.embedding_timeout = Some(timeout);
        self
    }

    /// Build the [`RagConfig`], validating that parameters are consistent.
    ///
    /// # Errors
    ///
    /// See [`RagConfig::validate`].
    pub fn build(self) -> Result<RagConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}
