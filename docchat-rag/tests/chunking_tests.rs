//! Property tests for fixed-size chunking.

use docchat_rag::{FixedSizeChunker, RagError, chunk_text};
use proptest::prelude::*;

fn char_len(s: &str) -> usize {
    s.chars().count()
}

fn first_chars(s: &str, n: usize) -> String {
    s.chars().take(n).collect()
}

fn last_chars(s: &str, n: usize) -> String {
    let len = char_len(s);
    s.chars().skip(len.saturating_sub(n)).collect()
}

/// Chunk size and overlap with `0 <= overlap < size`.
fn arb_size_and_overlap() -> impl Strategy<Value = (usize, usize)> {
    (1usize..64).prop_flat_map(|size| (Just(size), 0..size))
}

#[test]
fn repeated_letter_document_splits_into_three_windows() {
    let text = "A".repeat(2500);
    let chunks = chunk_text(&text, 1000, 200).unwrap();
    assert_eq!(chunks, vec![&text[0..1000], &text[800..1800], &text[1600..2500]]);
}

#[test]
fn default_sized_chunks_overlap_by_two_hundred() {
    let text: String = (0..3000).map(|i| char::from(b'a' + (i % 26) as u8)).collect();
    let chunks = chunk_text(&text, 1000, 200).unwrap();
    assert_eq!(chunks.len(), 4);
    assert_eq!(chunks[3], &text[2400..3000]);
    for pair in chunks.windows(2) {
        assert_eq!(last_chars(&pair[0], 200), first_chars(&pair[1], 200));
    }
}

#[test]
fn overlap_not_smaller_than_size_is_rejected() {
    assert!(matches!(chunk_text("abc", 10, 10), Err(RagError::InvalidConfiguration(_))));
    assert!(matches!(chunk_text("abc", 10, 11), Err(RagError::InvalidConfiguration(_))));
}

/// *For any* text no longer than `chunk_size`, chunking SHALL return exactly
/// one chunk equal to the input.
mod prop_short_text_is_single_chunk {
    use super::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(200))]

        #[test]
        fn single_chunk_equals_input(
            text in "\\PC{0,64}",
            slack in 0usize..16,
            overlap_seed in any::<usize>(),
        ) {
            let size = (char_len(&text) + slack).max(1);
            let overlap = overlap_seed % size;
            let chunks = FixedSizeChunker::new(size, overlap).unwrap().chunk(&text);
            prop_assert_eq!(chunks, vec![text]);
        }
    }
}

/// *For any* valid size and overlap, every chunk SHALL be at most
/// `chunk_size` characters, and adjacent chunks SHALL share exactly
/// `chunk_overlap` characters.
mod prop_window_bounds_and_overlap {
    use super::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(200))]

        #[test]
        fn chunks_are_bounded_and_overlap(
            (size, overlap) in arb_size_and_overlap(),
            text in "[a-zé中]{1,400}",
        ) {
            let chunks = FixedSizeChunker::new(size, overlap).unwrap().chunk(&text);
            prop_assert!(!chunks.is_empty());

            for chunk in &chunks {
                prop_assert!(char_len(chunk) <= size);
                prop_assert!(text.contains(chunk.as_str()));
            }

            for pair in chunks.windows(2) {
                prop_assert!(char_len(&pair[0]) >= overlap);
                if char_len(&pair[1]) >= overlap {
                    prop_assert_eq!(last_chars(&pair[0], overlap), first_chars(&pair[1], overlap));
                }
            }
        }

        #[test]
        fn chunks_cover_the_whole_text(
            (size, overlap) in arb_size_and_overlap(),
            text in "[a-z]{1,400}",
        ) {
            let chunks = FixedSizeChunker::new(size, overlap).unwrap().chunk(&text);
            prop_assert!(text.starts_with(chunks[0].as_str()));
            prop_assert!(text.ends_with(chunks[chunks.len() - 1].as_str()));

            let mut rebuilt = chunks[0].clone();
            for chunk in &chunks[1..] {
                rebuilt.extend(chunk.chars().skip(overlap));
            }
            prop_assert_eq!(rebuilt, text);
        }

        #[test]
        fn no_chunk_is_blank_once_windowed(
            (size, overlap) in arb_size_and_overlap(),
            text in "[a \\n]{1,200}",
        ) {
            prop_assume!(char_len(&text) > size);
            let chunks = FixedSizeChunker::new(size, overlap).unwrap().chunk(&text);
            for chunk in &chunks {
                prop_assert!(!chunk.trim().is_empty());
            }
        }
    }
}

/// *For any* overlap greater than or equal to the chunk size, chunking SHALL
/// fail with an invalid-configuration error.
mod prop_invalid_overlap {
    use super::*;

    proptest! {
        #[test]
        fn rejected(size in 0usize..64, extra in 0usize..64, text in "[a-z]{0,32}") {
            let result = chunk_text(&text, size, size + extra);
            prop_assert!(matches!(result, Err(RagError::InvalidConfiguration(_))));
        }
    }
}
