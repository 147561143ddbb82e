//! Data types for uploaded documents, transported chunk sets, and ranked results.

use serde::{Deserialize, Serialize};

/// Raw text extracted from an upload, owned by the caller for one request.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Document {
    /// Display name of the source, typically the uploaded file name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// The extracted text.
    pub text: String,
}

impl Document {
    /// Create an unnamed document.
    pub fn new(text: impl Into<String>) -> Self {
        Self { name: None, text: text.into() }
    }

    /// Attach a display name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }
}

/// The chunks of one document, handed back to the caller for safekeeping.
///
/// Nothing is stored server-side: the caller re-submits `chunks` with every
/// query.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChunkedDocument {
    /// Display name of the source document, if known.
    #[serde(default)]
    pub filename: Option<String>,
    /// Number of chunks produced.
    #[serde(default)]
    pub chunks_processed: usize,
    /// The chunk texts in document order.
    pub chunks: Vec<String>,
}

/// A chunk selected by a ranker, with its relevance score.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RankedChunk {
    /// Position of the chunk in the submitted sequence.
    pub index: usize,
    /// The chunk text.
    pub text: String,
    /// Relevance score (higher is more relevant).
    pub score: f32,
}

/// Which ranking path produced a result set.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RankingStrategy {
    /// Cosine similarity over embedding vectors.
    Embedding,
    /// Query-token overlap.
    Lexical,
}

impl std::fmt::Display for RankingStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Embedding => f.write_str("embedding"),
            Self::Lexical => f.write_str("lexical"),
        }
    }
}

/// Ranked chunks plus the strategy that ranked them.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Retrieval {
    /// The strategy that produced `chunks`.
    pub strategy: RankingStrategy,
    /// At most `k` chunks, most relevant first.
    pub chunks: Vec<RankedChunk>,
}

impl Retrieval {
    /// Drop scores and positions, keeping only chunk texts.
    pub fn into_texts(self) -> Vec<String> {
        self.chunks.into_iter().map(|c| c.text).collect()
    }
}
