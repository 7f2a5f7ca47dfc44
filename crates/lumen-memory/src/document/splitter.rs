use super::DocumentError;
use super::types::{Chunk, Document};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SplitterConfig {
    pub chunk_size: usize,
    pub chunk_overlap: usize,
}

impl Default for SplitterConfig {
    fn default() -> Self {
        Self {
            chunk_size: 500,
            chunk_overlap: 50,
        }
    }
}

/// Greedy character splitter with boundary preference.
///
/// Each chunk is the longest span of at most `chunk_size` chars that ends on
/// a paragraph break, else after sentence punctuation, else on whitespace.
/// When none of those occur in the back half of the window the span is cut
/// hard at `chunk_size`, so an oversized paragraph or word is split mid-text.
/// Every chunk after the first starts `chunk_overlap` chars before the end of
/// the previous one.
#[derive(Debug, Clone)]
pub struct TextSplitter {
    config: SplitterConfig,
}

impl TextSplitter {
    /// # Errors
    ///
    /// Returns [`DocumentError::InvalidConfig`] if `chunk_size` is zero or
    /// `chunk_overlap` is not smaller than `chunk_size`.
    pub fn new(config: SplitterConfig) -> Result<Self, DocumentError> {
        if config.chunk_size == 0 {
            return Err(DocumentError::InvalidConfig(
                "chunk_size must be positive".into(),
            ));
        }
        if config.chunk_overlap >= config.chunk_size {
            return Err(DocumentError::InvalidConfig(format!(
                "chunk_overlap ({}) must be smaller than chunk_size ({})",
                config.chunk_overlap, config.chunk_size
            )));
        }
        Ok(Self { config })
    }

    #[must_use]
    pub fn config(&self) -> SplitterConfig {
        self.config
    }

    #[must_use]
    pub fn split(&self, document: &Document) -> Vec<Chunk> {
        spans(&document.content, self.config)
            .into_iter()
            .enumerate()
            .map(|(i, (start, content))| Chunk {
                source_id: document.source_id.clone(),
                content,
                metadata: document.metadata.clone(),
                chunk_index: i,
                start,
            })
            .collect()
    }

    /// Split every document, preserving document order then chunk order.
    #[must_use]
    pub fn split_all(&self, documents: &[Document]) -> Vec<Chunk> {
        let chunks: Vec<Chunk> = documents.iter().flat_map(|d| self.split(d)).collect();
        tracing::debug!(
            documents = documents.len(),
            chunks = chunks.len(),
            "split documents"
        );
        chunks
    }
}

fn spans(text: &str, config: SplitterConfig) -> Vec<(usize, String)> {
    let chars: Vec<char> = text.chars().collect();
    let len = chars.len();
    let SplitterConfig {
        chunk_size: size,
        chunk_overlap: overlap,
    } = config;

    let mut out = Vec::new();
    let mut start = 0;
    while start < len {
        let end = if len - start <= size {
            len
        } else {
            find_break(&chars, start, size, overlap)
        };

        let piece: String = chars[start..end].iter().collect();
        if !piece.trim().is_empty() {
            out.push((start, piece));
        }

        if end == len {
            break;
        }
        start = end - overlap;
    }
    out
}

/// End offset (exclusive) of the chunk starting at `start`.
///
/// Candidates lie in `(floor, start + size]` where `floor` keeps the next
/// start strictly ahead of this one.
fn find_break(chars: &[char], start: usize, size: usize, overlap: usize) -> usize {
    let limit = start + size;
    let floor = (start + overlap).max(start + size / 2);
    let candidates = || (floor + 1..=limit).rev();

    let paragraph = |p: usize| p >= start + 2 && chars[p - 2] == '\n' && chars[p - 1] == '\n';
    let sentence = |p: usize| {
        p >= start + 2 && chars[p - 1].is_whitespace() && matches!(chars[p - 2], '.' | '!' | '?')
    };
    let word = |p: usize| chars[p - 1].is_whitespace();

    candidates()
        .find(|&p| paragraph(p))
        .or_else(|| candidates().find(|&p| sentence(p)))
        .or_else(|| candidates().find(|&p| word(p)))
        .unwrap_or(limit)
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;
    use crate::document::DocumentMetadata;

    fn doc(content: &str) -> Document {
        Document {
            source_id: "test".into(),
            content: content.into(),
            metadata: DocumentMetadata::new("test", "text/plain"),
        }
    }

    fn splitter(size: usize, overlap: usize) -> TextSplitter {
        TextSplitter::new(SplitterConfig {
            chunk_size: size,
            chunk_overlap: overlap,
        })
        .unwrap()
    }

    #[test]
    fn rejects_invalid_config() {
        for (size, overlap) in [(0, 0), (10, 10), (10, 20)] {
            let err = TextSplitter::new(SplitterConfig {
                chunk_size: size,
                chunk_overlap: overlap,
            })
            .unwrap_err();
            assert!(matches!(err, DocumentError::InvalidConfig(_)));
        }
    }

    #[test]
    fn default_config_is_valid() {
        let s = TextSplitter::new(SplitterConfig::default()).unwrap();
        assert_eq!(s.config().chunk_size, 500);
        assert_eq!(s.config().chunk_overlap, 50);
    }

    #[test]
    fn empty_and_blank_documents_yield_no_chunks() {
        let s = splitter(100, 10);
        assert!(s.split(&doc("")).is_empty());
        assert!(s.split(&doc("   \n\n  ")).is_empty());
    }

    #[test]
    fn short_document_is_single_chunk() {
        let chunks = splitter(100, 10).split(&doc("Hello world."));
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].content, "Hello world.");
        assert_eq!(chunks[0].start, 0);
        assert_eq!(chunks[0].chunk_index, 0);
    }

    #[test]
    fn unbroken_text_splits_into_three_overlapping_chunks() {
        let text = "A".repeat(1200);
        let chunks = splitter(500, 50).split(&doc(&text));
        assert_eq!(chunks.len(), 3);
        assert_eq!(
            chunks.iter().map(|c| c.start).collect::<Vec<_>>(),
            vec![0, 450, 900]
        );
        let first_end = chunks[0].start + chunks[0].content.chars().count();
        assert!(first_end - chunks[1].start <= 50);
        assert_eq!(chunks[2].content.len(), 300);
    }

    #[test]
    fn prefers_paragraph_break() {
        let text = format!("{}\n\n{}. {}", "a".repeat(60), "b".repeat(20), "c".repeat(40));
        let chunks = splitter(100, 0).split(&doc(&text));
        assert_eq!(chunks[0].content, format!("{}\n\n", "a".repeat(60)));
    }

    #[test]
    fn prefers_sentence_over_word() {
        let text = format!("{}. {} {}", "a".repeat(55), "b".repeat(20), "c".repeat(40));
        let chunks = splitter(100, 0).split(&doc(&text));
        assert_eq!(chunks[0].content, format!("{}. ", "a".repeat(55)));
    }

    #[test]
    fn falls_back_to_word_boundary() {
        let text = format!("{} {} {}", "a".repeat(55), "b".repeat(30), "c".repeat(40));
        let chunks = splitter(100, 0).split(&doc(&text));
        assert_eq!(
            chunks[0].content,
            format!("{} {} ", "a".repeat(55), "b".repeat(30))
        );
    }

    #[test]
    fn overlap_starts_before_previous_end() {
        let text = "word ".repeat(100);
        let chunks = splitter(100, 20).split(&doc(&text));
        for pair in chunks.windows(2) {
            let prev_end = pair[0].start + pair[0].content.chars().count();
            assert_eq!(prev_end - pair[1].start, 20);
        }
    }

    #[test]
    fn chunks_inherit_metadata_and_are_indexed() {
        let mut d = doc(&"x ".repeat(300));
        d.metadata = d.metadata.with("title", "T");
        let chunks = splitter(100, 10).split(&d);
        assert!(chunks.len() > 1);
        for (i, c) in chunks.iter().enumerate() {
            assert_eq!(c.chunk_index, i);
            assert_eq!(c.metadata.title(), Some("T"));
            assert_eq!(c.source_id, "test");
        }
    }

    #[test]
    fn split_all_preserves_document_order() {
        let docs = [doc("first"), doc("second")];
        let chunks = splitter(100, 10).split_all(&docs);
        assert_eq!(chunks[0].content, "first");
        assert_eq!(chunks[1].content, "second");
    }

    #[test]
    fn multibyte_text_counts_chars() {
        let text = "é".repeat(250);
        let chunks = splitter(100, 10).split(&doc(&text));
        assert!(chunks.iter().all(|c| c.content.chars().count() <= 100));
        assert_eq!(chunks[0].content.chars().count(), 100);
    }

    fn config_strategy() -> impl Strategy<Value = (usize, usize)> {
        (1usize..200).prop_flat_map(|size| (Just(size), 0..size))
    }

    proptest! {
        #[test]
        fn split_is_deterministic(text in "[a-z .!?\n]{0,2000}", (size, overlap) in config_strategy()) {
            let s = splitter(size, overlap);
            prop_assert_eq!(s.split(&doc(&text)), s.split(&doc(&text)));
        }

        #[test]
        fn chunks_never_exceed_size(text in "\\PC{0,1500}", (size, overlap) in config_strategy()) {
            let chunks = splitter(size, overlap).split(&doc(&text));
            for c in &chunks {
                prop_assert!(c.content.chars().count() <= size);
            }
        }

        #[test]
        fn chunks_cover_all_non_whitespace(text in "[a-z .\n]{0,1500}", (size, overlap) in config_strategy()) {
            let chars: Vec<char> = text.chars().collect();
            let chunks = splitter(size, overlap).split(&doc(&text));
            let mut covered = vec![false; chars.len()];
            for c in &chunks {
                let n = c.content.chars().count();
                let span: String = chars[c.start..c.start + n].iter().collect();
                prop_assert_eq!(&span, &c.content);
                for flag in &mut covered[c.start..c.start + n] {
                    *flag = true;
                }
            }
            for (i, ch) in chars.iter().enumerate() {
                if !ch.is_whitespace() {
                    prop_assert!(covered[i], "char {} not covered", i);
                }
            }
        }

        #[test]
        fn starts_strictly_increase(text in "[a-z \n]{0,1500}", (size, overlap) in config_strategy()) {
            let chunks = splitter(size, overlap).split(&doc(&text));
            for pair in chunks.windows(2) {
                prop_assert!(pair[1].start > pair[0].start);
            }
        }
    }
}
