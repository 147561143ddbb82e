//! Ranking strategies for scoring chunks against a query.
//!
//! Two implementations share the [`Ranker`] trait:
//!
//! - [`EmbeddingRanker`]: cosine similarity over embeddings from an [`EmbeddingProvider`]
//! - [`LexicalRanker`]: counts query tokens found in each chunk; needs no remote service
//!
//! Both sort descending by score with a stable sort, so equal scores keep the
//! chunks' submitted order.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::debug;

use crate::document::{RankedChunk, RankingStrategy};
use crate::embedding::EmbeddingProvider;
use crate::error::{RagError, Result};
use crate::similarity::cosine_similarity;

/// A strategy that ranks chunks by relevance to a query.
#[async_trait]
pub trait Ranker: Send + Sync {
    /// The strategy this ranker implements.
    fn strategy(&self) -> RankingStrategy;

    /// Score every chunk against `query` and return the best `k`, most
    /// relevant first.
    async fn rank(&self, query: &str, chunks: &[String], k: usize) -> Result<Vec<RankedChunk>>;
}

/// Stable-sort scored chunks descending and keep the first `k`.
fn top_k(chunks: &[String], scores: impl IntoIterator<Item = f32>, k: usize) -> Vec<RankedChunk> {
    let mut scored: Vec<(usize, f32)> = scores.into_iter().enumerate().collect();
    scored.sort_by(|a, b| b.1.total_cmp(&a.1));
    scored
        .into_iter()
        .take(k)
        .map(|(index, score)| RankedChunk { index, text: chunks[index].clone(), score })
        .collect()
}

/// Ranks chunks by cosine similarity between query and chunk embeddings.
///
/// The query and all chunks are embedded in one batched call, `[query] + chunks`.
/// Any provider failure, an expired timeout, or a malformed response (wrong
/// vector count, empty or mismatched dimensions) is returned as
/// [`RagError::EmbeddingServiceError`].
#[derive(Clone)]
pub struct EmbeddingRanker {
    provider: Arc<dyn EmbeddingProvider>,
    timeout: Option<Duration>,
}

impl EmbeddingRanker {
    /// Create a ranker backed by `provider`.
    pub fn new(provider: Arc<dyn EmbeddingProvider>) -> Self {
        Self { provider, timeout: None }
    }

    /// Give up on the embedding call after `timeout`.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Name of the underlying provider.
    pub fn provider_name(&self) -> &str {
        self.provider.name()
    }

    async fn embed_all(&self, query: &str, chunks: &[String]) -> Result<Vec<Vec<f32>>> {
        let mut inputs: Vec<&str> = Vec::with_capacity(chunks.len() + 1);
        inputs.push(query);
        inputs.extend(chunks.iter().map(String::as_str));

        let call = self.provider.embed_batch(&inputs);
        let vectors = match self.timeout {
            Some(timeout) => tokio::time::timeout(timeout, call).await.map_err(|_| {
                RagError::embedding(
                    self.provider.name(),
                    format!("no response within {}ms", timeout.as_millis()),
                )
            })??,
            None => call.await?,
        };

        if vectors.len() != inputs.len() {
            return Err(RagError::embedding(
                self.provider.name(),
                format!("expected {} vectors, got {}", inputs.len(), vectors.len()),
            ));
        }

        let dimensions = vectors[0].len();
        if dimensions == 0 {
            return Err(RagError::embedding(self.provider.name(), "empty query embedding"));
        }
        if let Some(position) = vectors.iter().position(|v| v.len() != dimensions) {
            return Err(RagError::embedding(
                self.provider.name(),
                format!(
                    "vector {position} has {} dimensions, expected {dimensions}",
                    vectors[position].len()
                ),
            ));
        }
        Ok(vectors)
    }
}

impl std::fmt::Debug for EmbeddingRanker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EmbeddingRanker")
            .field("provider", &self.provider.name())
            .field("timeout", &self.timeout)
            .finish()
    }
}

#[async_trait]
impl Ranker for EmbeddingRanker {
    fn strategy(&self) -> RankingStrategy {
        RankingStrategy::Embedding
    }

    async fn rank(&self, query: &str, chunks: &[String], k: usize) -> Result<Vec<RankedChunk>> {
        if chunks.is_empty() {
            return Ok(Vec::new());
        }

        let vectors = self.embed_all(query, chunks).await?;
        let (query_vector, chunk_vectors) = vectors.split_at(1);
        let query_vector = &query_vector[0];

        debug!(
            provider = self.provider.name(),
            chunk_count = chunks.len(),
            dimensions = query_vector.len(),
            "scoring chunks by cosine similarity"
        );

        let scores = chunk_vectors.iter().map(|v| cosine_similarity(query_vector, v));
        Ok(top_k(chunks, scores, k))
    }
}

/// Ranks chunks by how many query tokens they contain.
///
/// Query and chunk are lower-cased, the query is split on whitespace, and a
/// chunk scores one point per query token (repeats included) that appears
/// anywhere in it as a substring.
#[derive(Debug, Clone, Copy, Default)]
pub struct LexicalRanker;

/// Count the lower-cased `tokens` found in `chunk`.
fn token_hits(tokens: &[&str], chunk: &str) -> usize {
    let chunk = chunk.to_lowercase();
    tokens.iter().filter(|token| chunk.contains(**token)).count()
}

impl LexicalRanker {
    /// Score a single chunk against a query.
    pub fn score(query: &str, chunk: &str) -> usize {
        let query = query.to_lowercase();
        let tokens: Vec<&str> = query.split_whitespace().collect();
        token_hits(&tokens, chunk)
    }

    /// Rank without going through the async trait; lexical ranking never fails.
    pub fn rank_now(&self, query: &str, chunks: &[String], k: usize) -> Vec<RankedChunk> {
        let query = query.to_lowercase();
        let tokens: Vec<&str> = query.split_whitespace().collect();
        let scores = chunks.iter().map(|chunk| token_hits(&tokens, chunk) as f32);
        top_k(chunks, scores, k)
    }
}

#[async_trait]
impl Ranker for LexicalRanker {
    fn strategy(&self) -> RankingStrategy {
        RankingStrategy::Lexical
    }

    async fn rank(&self, query: &str, chunks: &[String], k: usize) -> Result<Vec<RankedChunk>> {
        Ok(self.rank_now(query, chunks, k))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chunks(texts: &[&str]) -> Vec<String> {
        texts.iter().map(|t| t.to_string()).collect()
    }

    #[test]
    fn lexical_score_counts_repeated_tokens() {
        assert_eq!(LexicalRanker::score("rust Rust", "I like RUST"), 2);
        assert_eq!(LexicalRanker::score("cats", "dogs"), 0);
    }

    #[test]
    fn lexical_score_matches_substrings() {
        assert_eq!(LexicalRanker::score("learn", "machine learning"), 1);
    }

    #[test]
    fn rank_scores_agree_with_single_chunk_score() {
        let chunks = chunks(&["Rust and rust", "learning", "nothing"]);
        let query = "rust learn RUST";
        for ranked in LexicalRanker.rank_now(query, &chunks, 3) {
            assert_eq!(ranked.score, LexicalRanker::score(query, &ranked.text) as f32);
        }
    }

    #[test]
    fn lexical_ties_keep_submitted_order() {
        let chunks = chunks(&["alpha one", "beta", "alpha two", "alpha three"]);
        let ranked = LexicalRanker.rank_now("alpha", &chunks, 3);
        let indices: Vec<usize> = ranked.iter().map(|r| r.index).collect();
        assert_eq!(indices, vec![0, 2, 3]);
    }

    #[test]
    fn lexical_ranks_best_match_first() {
        let chunks = chunks(&["nothing here", "machine", "machine learning"]);
        let ranked = LexicalRanker.rank_now("machine learning", &chunks, 2);
        assert_eq!(ranked[0].text, "machine learning");
        assert_eq!(ranked[0].score, 2.0);
        assert_eq!(ranked[1].text, "machine");
    }

    #[test]
    fn top_k_truncates_and_orders() {
        let chunks = chunks(&["a", "b", "c"]);
        let ranked = top_k(&chunks, [0.1, 0.9, 0.5], 2);
        assert_eq!(ranked.len(), 2);
        assert_eq!(ranked[0].text, "b");
        assert_eq!(ranked[1].text, "c");
    }
}
