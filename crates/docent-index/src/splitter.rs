//! Prose splitting: sentence-aware chunks with bounded overlap.

use crate::types::{Document, Segment};

#[derive(Debug, Clone)]
pub struct SplitterConfig {
    pub chunk_size: usize,
    pub chunk_overlap: usize,
}

impl Default for SplitterConfig {
    fn default() -> Self {
        Self {
            chunk_size: 1000,
            chunk_overlap: 200,
        }
    }
}

pub struct TextSplitter {
    config: SplitterConfig,
}

impl TextSplitter {
    #[must_use]
    pub fn new(config: SplitterConfig) -> Self {
        Self { config }
    }

    /// Split a document into segments of at most `chunk_size` characters,
    /// with up to `chunk_overlap` characters repeated between neighbors.
    /// Boundaries prefer sentence and paragraph ends.
    #[must_use]
    pub fn split(&self, document: &Document) -> Vec<Segment> {
        if document.content.is_empty() {
            return Vec::new();
        }

        let sentences = split_sentences(&document.content);
        let chunks = merge_sentences(&sentences, self.config.chunk_size, self.config.chunk_overlap);

        chunks
            .into_iter()
            .enumerate()
            .map(|(i, content)| Segment {
                content,
                metadata: document.metadata.clone(),
                chunk_index: i,
            })
            .collect()
    }
}

/// Split text into sentence-or-paragraph pieces, each at most `max` chars.
/// A single sentence longer than the chunk size is hard-split so the size
/// bound holds for every output chunk.
fn split_sentences(text: &str) -> Vec<String> {
    let mut sentences = Vec::new();
    let mut current = String::new();

    let chars: Vec<char> = text.chars().collect();
    let mut i = 0;

    while i < chars.len() {
        current.push(chars[i]);

        // Paragraph break
        if chars[i] == '\n' && i + 1 < chars.len() && chars[i + 1] == '\n' {
            current.push(chars[i + 1]);
            i += 1;
            if !current.trim().is_empty() {
                sentences.push(std::mem::take(&mut current));
            } else {
                current.clear();
            }
        }
        // Sentence ending followed by whitespace
        else if matches!(chars[i], '.' | '?' | '!')
            && i + 1 < chars.len()
            && chars[i + 1].is_whitespace()
            && !current.trim().is_empty()
        {
            sentences.push(std::mem::take(&mut current));
        }

        i += 1;
    }

    if !current.trim().is_empty() {
        sentences.push(current);
    }

    sentences
}

fn merge_sentences(sentences: &[String], chunk_size: usize, chunk_overlap: usize) -> Vec<String> {
    let mut chunks = Vec::new();
    let mut current = String::new();
    let mut window: Vec<String> = Vec::new();

    let push_piece = |piece: &str,
                      current: &mut String,
                      window: &mut Vec<String>,
                      chunks: &mut Vec<String>| {
        let piece_len = piece.chars().count();
        if !current.is_empty() && current.chars().count() + piece_len > chunk_size {
            chunks.push(std::mem::take(current));

            // Rebuild the start of the next chunk from trailing sentences.
            // The overlap budget shrinks so overlap + piece stays within the
            // chunk size; the size bound holds for every emitted chunk.
            let budget = chunk_overlap.min(chunk_size.saturating_sub(piece_len));
            let mut overlap_len = 0;
            let mut keep = Vec::new();
            for s in window.iter().rev() {
                let len = s.chars().count();
                if overlap_len + len > budget {
                    break;
                }
                overlap_len += len;
                keep.push(s.clone());
            }
            keep.reverse();
            for s in &keep {
                current.push_str(s);
            }
            *window = keep;
        }
        current.push_str(piece);
        window.push(piece.to_owned());
    };

    for sentence in sentences {
        if sentence.chars().count() > chunk_size {
            // Oversized sentence: hard-split into windows of chunk_size.
            for piece in char_windows(sentence, chunk_size) {
                push_piece(&piece, &mut current, &mut window, &mut chunks);
            }
        } else {
            push_piece(sentence, &mut current, &mut window, &mut chunks);
        }
    }

    if !current.is_empty() {
        chunks.push(current);
    }

    chunks
}

fn char_windows(text: &str, size: usize) -> Vec<String> {
    let chars: Vec<char> = text.chars().collect();
    chars
        .chunks(size.max(1))
        .map(|w| w.iter().collect())
        .collect()
}
