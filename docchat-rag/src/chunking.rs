//! Fixed-size document chunking.
//!
//! Splitting is purely positional: a window of `chunk_size` characters slides
//! across the text with a step of `chunk_size - chunk_overlap`. There is no
//! sentence or paragraph awareness.
//!
//! Sizes and offsets count Unicode scalar values (`char`s), so a window never
//! splits a multi-byte code point. Text is not normalized first; visually
//! identical strings in different normal forms chunk differently.

use std::iter;

use tracing::info;

use crate::config::{RagConfig, validate_chunking};
use crate::document::{ChunkedDocument, Document};
use crate::error::{RagError, Result};

/// Splits text into fixed-size, overlapping chunks by character count.
///
/// # Example
///
/// ```rust,ignore
/// use docchat_rag::FixedSizeChunker;
///
/// let chunker = FixedSizeChunker::new(1000, 200)?;
/// let chunks = chunker.chunk(&text);
/// ```
#[derive(Debug, Clone, Copy)]
pub struct FixedSizeChunker {
    chunk_size: usize,
    chunk_overlap: usize,
}

impl FixedSizeChunker {
    /// Create a new `FixedSizeChunker`.
    ///
    /// # Arguments
    ///
    /// * `chunk_size` — maximum number of characters per chunk
    /// * `chunk_overlap` — number of overlapping characters between consecutive chunks
    ///
    /// # Errors
    ///
    /// Returns [`RagError::InvalidConfiguration`] unless
    /// `0 <= chunk_overlap < chunk_size`.
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> Result<Self> {
        validate_chunking(chunk_size, chunk_overlap)?;
        Ok(Self { chunk_size, chunk_overlap })
    }

    /// Create a chunker from the size and overlap in `config`.
    pub fn from_config(config: &RagConfig) -> Result<Self> {
        Self::new(config.chunk_size, config.chunk_overlap)
    }

    /// Maximum number of characters per chunk.
    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    /// Number of characters shared by consecutive chunks.
    pub fn chunk_overlap(&self) -> usize {
        self.chunk_overlap
    }

    /// Split `text` into chunks.
    ///
    /// Text no longer than `chunk_size` comes back as a single chunk, unchanged.
    /// Longer text is windowed; windows that are blank after trimming are
    /// dropped, and the last window is clipped to the end of the text.
    pub fn chunk(&self, text: &str) -> Vec<String> {
        // Byte offset of every char boundary, including the end of the text.
        let boundaries: Vec<usize> =
            text.char_indices().map(|(i, _)| i).chain(iter::once(text.len())).collect();
        let char_len = boundaries.len() - 1;

        if char_len <= self.chunk_size {
            return vec![text.to_string()];
        }

        let step = self.chunk_size - self.chunk_overlap;
        let mut chunks = Vec::with_capacity(char_len.div_ceil(step));
        let mut start = 0;

        loop {
            let end = (start + self.chunk_size).min(char_len);
            let window = &text[boundaries[start]..boundaries[end]];
            if !window.trim().is_empty() {
                chunks.push(window.to_string());
            }
            if end == char_len {
                break;
            }
            start += step;
        }

        chunks
    }
}

/// Split `text` into chunks of at most `chunk_size` characters overlapping by
/// `chunk_overlap` characters.
///
/// # Errors
///
/// Returns [`RagError::InvalidConfiguration`] unless
/// `0 <= chunk_overlap < chunk_size`.
pub fn chunk_text(text: &str, chunk_size: usize, chunk_overlap: usize) -> Result<Vec<String>> {
    Ok(FixedSizeChunker::new(chunk_size, chunk_overlap)?.chunk(text))
}

/// Chunk an uploaded document into a [`ChunkedDocument`] for the caller to keep.
///
/// # Errors
///
/// - [`RagError::InvalidConfiguration`] if the chunking parameters are invalid.
/// - [`RagError::EmptyDocument`] if the text is blank or yields no chunks.
pub fn chunk_document(document: &Document, config: &RagConfig) -> Result<ChunkedDocument> {
    let chunker = FixedSizeChunker::from_config(config)?;
    let name = document.name.as_deref().unwrap_or("document");

    if document.text.trim().is_empty() {
        return Err(RagError::EmptyDocument(format!(
            "'{name}' is empty or contains no extractable text"
        )));
    }

    let chunks = chunker.chunk(&document.text);
    if chunks.is_empty() {
        return Err(RagError::EmptyDocument(format!("could not create text chunks from '{name}'")));
    }

    info!(
        document = name,
        chunk_count = chunks.len(),
        chunk_size = chunker.chunk_size,
        chunk_overlap = chunker.chunk_overlap,
        "chunked document"
    );

    Ok(ChunkedDocument {
        filename: document.name.clone(),
        chunks_processed: chunks.len(),
        chunks,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_text_is_one_chunk() {
        let chunker = FixedSizeChunker::new(10, 2).unwrap();
        assert_eq!(chunker.chunk("hello"), vec!["hello".to_string()]);
        assert_eq!(chunker.chunk("exactly10!"), vec!["exactly10!".to_string()]);
    }

    #[test]
    fn windows_overlap_and_stop_at_end() {
        let chunker = FixedSizeChunker::new(4, 1).unwrap();
        assert_eq!(chunker.chunk("abcdefghij"), vec!["abcd", "defg", "ghij"]);
    }

    #[test]
    fn last_window_may_be_short() {
        let chunker = FixedSizeChunker::new(4, 1).unwrap();
        assert_eq!(chunker.chunk("abcdefgh"), vec!["abcd", "defg", "gh"]);
    }

    #[test]
    fn blank_windows_are_dropped() {
        let chunker = FixedSizeChunker::new(4, 0).unwrap();
        assert_eq!(chunker.chunk("abcd    efgh  \n "), vec!["abcd", "efgh"]);
    }

    #[test]
    fn zero_overlap_tiles_the_text() {
        let chunker = FixedSizeChunker::new(3, 0).unwrap();
        assert_eq!(chunker.chunk("abcdefg"), vec!["abc", "def", "g"]);
    }

    #[test]
    fn multibyte_text_splits_on_char_boundaries() {
        let chunker = FixedSizeChunker::new(3, 1).unwrap();
        assert_eq!(chunker.chunk("héllo wörld"), vec!["hél", "llo", "o w", "wör", "rld"]);
    }

    #[test]
    fn overlap_must_be_smaller_than_size() {
        assert!(matches!(FixedSizeChunker::new(5, 5), Err(RagError::InvalidConfiguration(_))));
        assert!(matches!(FixedSizeChunker::new(5, 9), Err(RagError::InvalidConfiguration(_))));
        assert!(matches!(FixedSizeChunker::new(0, 0), Err(RagError::InvalidConfiguration(_))));
    }

    #[test]
    fn chunk_document_reports_count_and_name() {
        let document = Document::new("a".repeat(2500)).with_name("notes.pdf");
        let chunked = chunk_document(&document, &RagConfig::default()).unwrap();
        assert_eq!(chunked.filename.as_deref(), Some("notes.pdf"));
        assert_eq!(chunked.chunks_processed, 3);
        assert_eq!(chunked.chunks.len(), 3);
    }

    #[test]
    fn chunk_document_rejects_blank_text() {
        let err = chunk_document(&Document::new(" \n\t "), &RagConfig::default()).unwrap_err();
        assert!(matches!(err, RagError::EmptyDocument(_)));
    }
}
