//! Top-k retrieval with graceful degradation.
//!
//! The [`Retriever`] picks a ranking strategy on every call: embedding
//! similarity when a provider is configured, lexical overlap otherwise. If the
//! embedding path fails for any reason the same call is answered lexically,
//! once, with no retry. The caller always gets a ranked result of the same
//! shape.
//!
//! The retriever holds no document state. Every call receives the full chunk
//! sequence, so one instance can serve concurrent, unrelated requests.
//!
//! # Example
//!
//! ```rust,ignore
//! use docchat_rag::{Retriever, RagConfig};
//!
//! let retriever = Retriever::builder()
//!     .config(RagConfig::default())
//!     .embedding_provider(Arc::new(my_embedder))
//!     .build()?;
//!
//! let context = retriever.retrieve("what is the refund policy?", &chunks, 3).await?;
//! ```

use std::sync::Arc;

use tracing::{info, warn};

use crate::config::{RagConfig, validate_top_k};
use crate::document::Retrieval;
use crate::embedding::EmbeddingProvider;
use crate::error::Result;
use crate::ranker::{EmbeddingRanker, LexicalRanker, Ranker};

/// Ranks a caller-supplied chunk sequence against a query.
#[derive(Debug, Clone)]
pub struct Retriever {
    config: RagConfig,
    embedding: Option<EmbeddingRanker>,
    lexical: LexicalRanker,
}

impl Default for Retriever {
    fn default() -> Self {
        Self::lexical()
    }
}

impl Retriever {
    /// Create a new [`RetrieverBuilder`].
    pub fn builder() -> RetrieverBuilder {
        RetrieverBuilder::default()
    }

    /// A retriever that only ranks lexically, with the default configuration.
    pub fn lexical() -> Self {
        Self { config: RagConfig::default(), embedding: None, lexical: LexicalRanker }
    }

    /// Return a reference to the retriever configuration.
    pub fn config(&self) -> &RagConfig {
        &self.config
    }

    /// Whether an embedding provider is configured.
    pub fn has_embeddings(&self) -> bool {
        self.embedding.is_some()
    }

    /// Return the `k` chunk texts most relevant to `query`, best first.
    ///
    /// The result holds `min(k, chunks.len())` entries. An empty `chunks`
    /// yields an empty result for any `k`.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::InvalidConfiguration`](crate::RagError::InvalidConfiguration)
    /// if `k == 0` and `chunks` is not empty. Embedding failures are never
    /// returned.
    pub async fn retrieve(&self, query: &str, chunks: &[String], k: usize) -> Result<Vec<String>> {
        Ok(self.retrieve_scored(query, chunks, k).await?.into_texts())
    }

    /// [`retrieve`](Self::retrieve) with the configured `top_k`.
    pub async fn retrieve_default(&self, query: &str, chunks: &[String]) -> Result<Vec<String>> {
        self.retrieve(query, chunks, self.config.top_k).await
    }

    /// Like [`retrieve`](Self::retrieve), but keeps scores, chunk positions,
    /// and the strategy that produced them.
    pub async fn retrieve_scored(
        &self,
        query: &str,
        chunks: &[String],
        k: usize,
    ) -> Result<Retrieval> {
        if chunks.is_empty() {
            let strategy = match &self.embedding {
                Some(embedding) => embedding.strategy(),
                None => self.lexical.strategy(),
            };
            return Ok(Retrieval { strategy, chunks: Vec::new() });
        }
        validate_top_k(k)?;

        if let Some(embedding) = &self.embedding {
            match embedding.rank(query, chunks, k).await {
                Ok(ranked) => {
                    info!(
                        strategy = %embedding.strategy(),
                        chunk_count = chunks.len(),
                        result_count = ranked.len(),
                        "retrieval completed"
                    );
                    return Ok(Retrieval { strategy: embedding.strategy(), chunks: ranked });
                }
                Err(e) => {
                    warn!(
                        provider = embedding.provider_name(),
                        error = %e,
                        "embedding ranking failed, falling back to lexical"
                    );
                }
            }
        }

        Ok(self.lexical_retrieval(query, chunks, k))
    }

    fn lexical_retrieval(&self, query: &str, chunks: &[String], k: usize) -> Retrieval {
        let ranked = self.lexical.rank_now(query, chunks, k);
        info!(
            strategy = %self.lexical.strategy(),
            chunk_count = chunks.len(),
            result_count = ranked.len(),
            "retrieval completed"
        );
        Retrieval { strategy: self.lexical.strategy(), chunks: ranked }
    }
}

/// Builder for constructing a [`Retriever`].
///
/// All fields are optional. Without an embedding provider the retriever ranks
/// lexically.
#[derive(Default)]
pub struct RetrieverBuilder {
    config: Option<RagConfig>,
    embedding_provider: Option<Arc<dyn EmbeddingProvider>>,
}

impl RetrieverBuilder {
    /// Set the configuration (default `top_k` and embedding timeout).
    pub fn config(mut self, config: RagConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Set the embedding provider for the primary ranking path.
    pub fn embedding_provider(mut self, provider: Arc<dyn EmbeddingProvider>) -> Self {
        self.embedding_provider = Some(provider);
        self
    }

    /// Build the [`Retriever`].
    ///
    /// # Errors
    ///
    /// Returns [`RagError::InvalidConfiguration`](crate::RagError::InvalidConfiguration)
    /// if the configuration does not validate.
    pub fn build(self) -> Result<Retriever> {
        let config = self.config.unwrap_or_default();
        config.validate()?;

        let embedding = self.embedding_provider.map(|provider| {
            let ranker = EmbeddingRanker::new(provider);
            match config.embedding_timeout {
                Some(timeout) => ranker.with_timeout(timeout),
                None => ranker,
            }
        });

        Ok(Retriever { config, embedding, lexical: LexicalRanker })
    }
}
