//! Stateless retrieval over a single uploaded document.
//!
//! This crate provides:
//! - Fixed-size, overlapping document chunking
//! - Top-k retrieval by embedding similarity, with a lexical fallback when the
//!   embedding service is unavailable
//! - An [`EmbeddingProvider`] trait and an OpenAI implementation (`openai` feature)
//! - Grounded system-prompt assembly from retrieved chunks
//!
//! Nothing is persisted between calls. The caller keeps the chunk list
//! returned at upload time and passes it back with every query.
//!
//! # Example
//!
//! ```rust,ignore
//! use docchat_rag::{Document, RagConfig, Retriever, chunk_document};
//!
//! let config = RagConfig::default();
//! let upload = chunk_document(&Document::new(text).with_name("report.pdf"), &config)?;
//!
//! let retriever = Retriever::builder().config(config).build()?;
//! let context = retriever.retrieve("quarterly revenue", &upload.chunks, 3).await?;
//! ```

pub mod chunking;
pub mod config;
pub mod document;
pub mod embedding;
pub mod error;
#[cfg(feature = "openai")]
pub mod openai;
pub mod prompt;
pub mod ranker;
pub mod retriever;
pub mod similarity;

pub use chunking::{FixedSizeChunker, chunk_document, chunk_text};
pub use config::{RagConfig, RagConfigBuilder};
pub use document::{ChunkedDocument, Document, RankedChunk, RankingStrategy, Retrieval};
pub use embedding::EmbeddingProvider;
pub use error::{RagError, Result};
#[cfg(feature = "openai")]
pub use openai::OpenAIEmbeddingProvider;
pub use prompt::{GroundedPrompt, augment_system_prompt, build_context, system_prompt};
pub use ranker::{EmbeddingRanker, LexicalRanker, Ranker};
pub use retriever::{Retriever, RetrieverBuilder};
pub use similarity::cosine_similarity;
