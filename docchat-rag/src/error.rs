//! Error types for the `docchat-rag` crate.

use thiserror::Error;

/// Errors that can occur while chunking documents or retrieving context.
#[derive(Debug, Error)]
pub enum RagError {
    /// Chunking or retrieval parameters are inconsistent.
    ///
    /// Raised for `chunk_overlap >= chunk_size`, a zero `chunk_size`, a zero
    /// `k`, or a configuration value that cannot be parsed.
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// The embedding service failed (network, auth, rate limit, bad response).
    ///
    /// The [`Retriever`](crate::Retriever) recovers from this locally by
    /// ranking lexically; it only reaches callers that use a provider directly.
    #[error("Embedding service error ({provider}): {message}")]
    EmbeddingServiceError {
        /// The embedding provider that produced the error.
        provider: String,
        /// A description of the failure.
        message: String,
    },

    /// The uploaded document has no usable text.
    #[error("Empty document: {0}")]
    EmptyDocument(String),
}

impl RagError {
    pub(crate) fn embedding(provider: &str, message: impl Into<String>) -> Self {
        Self::EmbeddingServiceError { provider: provider.to_string(), message: message.into() }
    }
}

/// A convenience result type for RAG operations.
pub type Result<T> = std::result::Result<T, RagError>;
