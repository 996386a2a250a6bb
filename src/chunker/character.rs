//! Separator-based character splitter
//!
//! Text is cut on a separator, then the pieces are merged greedily into
//! chunks of at most `chunk_size` characters. When a chunk is emitted,
//! pieces are dropped from its front until at most `chunk_overlap`
//! characters remain; those carry over into the next chunk.

use std::collections::VecDeque;

use tracing::warn;

/// Splits on a separator and merges pieces up to a size limit
#[derive(Debug, Clone)]
pub struct CharacterSplitter {
    separator: String,
    chunk_size: usize,
    chunk_overlap: usize,
}

impl CharacterSplitter {
    pub fn new(separator: impl Into<String>, chunk_size: usize, chunk_overlap: usize) -> anyhow::Result<Self> {
        if chunk_overlap > chunk_size {
            anyhow::bail!(
                "Chunk overlap ({}) is larger than chunk size ({})",
                chunk_overlap,
                chunk_size
            );
        }

        Ok(Self {
            separator: separator.into(),
            chunk_size,
            chunk_overlap,
        })
    }

    /// Split `text` into chunks
    pub fn split_text(&self, text: &str) -> Vec<String> {
        let pieces: Vec<&str> = if self.separator.is_empty() {
            // Empty separator means split into characters
            text.char_indices()
                .map(|(i, c)| &text[i..i + c.len_utf8()])
                .collect()
        } else {
            text.split(self.separator.as_str()).filter(|p| !p.is_empty()).collect()
        };

        self.merge(&pieces)
    }

    fn merge(&self, pieces: &[&str]) -> Vec<String> {
        let sep_len = self.separator.chars().count();
        let mut chunks = Vec::new();
        let mut current: VecDeque<(&str, usize)> = VecDeque::new();
        let mut total = 0usize;

        for piece in pieces {
            let len = piece.chars().count();
            let joiner = if current.is_empty() { 0 } else { sep_len };

            if total + len + joiner > self.chunk_size {
                if total > self.chunk_size {
                    warn!(
                        "Created a chunk of {} chars, longer than the limit of {}",
                        total, self.chunk_size
                    );
                }

                if !current.is_empty() {
                    if let Some(chunk) = self.join(&current) {
                        chunks.push(chunk);
                    }

                    // Keep a tail no longer than the overlap that still leaves room
                    loop {
                        let joiner = if current.is_empty() { 0 } else { sep_len };
                        let no_room = total > 0 && total + len + joiner > self.chunk_size;
                        if total <= self.chunk_overlap && !no_room {
                            break;
                        }
                        let Some((_, front_len)) = current.pop_front() else {
                            break;
                        };
                        total -= front_len;
                        if !current.is_empty() {
                            total -= sep_len;
                        }
                    }
                }
            }

            let joiner = if current.is_empty() { 0 } else { sep_len };
            current.push_back((piece, len));
            total += len + joiner;
        }

        if let Some(chunk) = self.join(&current) {
            chunks.push(chunk);
        }

        chunks
    }

    fn join(&self, pieces: &VecDeque<(&str, usize)>) -> Option<String> {
        let joined = pieces
            .iter()
            .map(|(p, _)| *p)
            .collect::<Vec<_>>()
            .join(&self.separator);
        let trimmed = joined.trim();
        (!trimmed.is_empty()).then(|| trimmed.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_text_single_chunk() {
        let splitter = CharacterSplitter::new("\n\n", 100, 10).unwrap();
        assert_eq!(splitter.split_text("one\n\ntwo"), vec!["one\n\ntwo"]);
    }

    #[test]
    fn test_merges_up_to_limit() {
        let splitter = CharacterSplitter::new(" ", 7, 0).unwrap();
        assert_eq!(
            splitter.split_text("foo bar baz 123"),
            vec!["foo bar", "baz 123"]
        );
    }

    #[test]
    fn test_overlap_carries_tail() {
        let splitter = CharacterSplitter::new(" ", 7, 3).unwrap();
        assert_eq!(
            splitter.split_text("foo bar baz 123"),
            vec!["foo bar", "bar baz", "baz 123"]
        );
    }

    #[test]
    fn test_oversized_piece_kept_whole() {
        let splitter = CharacterSplitter::new(" ", 3, 0).unwrap();
        assert_eq!(
            splitter.split_text("ab abcdef ab"),
            vec!["ab", "abcdef", "ab"]
        );
    }

    #[test]
    fn test_empty_pieces_dropped() {
        let splitter = CharacterSplitter::new("\n\n", 100, 0).unwrap();
        assert_eq!(splitter.split_text("\n\n\n\nonly\n\n\n\n"), vec!["only"]);
        assert!(splitter.split_text("").is_empty());
    }

    #[test]
    fn test_counts_chars_not_bytes() {
        let splitter = CharacterSplitter::new(" ", 5, 0).unwrap();
        assert_eq!(splitter.split_text("ééé üü"), vec!["ééé", "üü"]);
    }

    #[test]
    fn test_overlap_larger_than_size_rejected() {
        assert!(CharacterSplitter::new(" ", 5, 10).is_err());
    }
}
