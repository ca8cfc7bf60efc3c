//! Source-code splitting: tree-sitter boundaries, fixed budget, no overlap.

use tree_sitter::{Node, Parser};

use crate::error::{IndexError, Result};
use crate::types::{Document, Segment};

/// Splits Python source into segments of at most `max_size` characters with
/// zero overlap. Segment boundaries follow the syntax tree: top-level
/// statements are merged greedily under the budget, oversized definitions
/// are split at their child statements, and only un-splittable leaves fall
/// back to plain character windows.
#[derive(Debug, Clone)]
pub struct CodeSplitter {
    max_size: usize,
}

impl Default for CodeSplitter {
    fn default() -> Self {
        Self { max_size: 500 }
    }
}

impl CodeSplitter {
    #[must_use]
    pub fn new(max_size: usize) -> Self {
        Self {
            max_size: max_size.max(1),
        }
    }

    /// # Errors
    ///
    /// Returns an error if the Python grammar cannot be loaded or parsing
    /// fails outright.
    pub fn split(&self, document: &Document) -> Result<Vec<Segment>> {
        let source = document.content.as_str();
        if source.trim().is_empty() {
            return Ok(Vec::new());
        }

        let mut parser = Parser::new();
        parser
            .set_language(&tree_sitter_python::LANGUAGE.into())
            .map_err(|e| IndexError::Parse(format!("set_language failed: {e}")))?;

        let tree = parser
            .parse(source, None)
            .ok_or_else(|| IndexError::Parse(format!("parse failed for {}", document.metadata.source)))?;

        let mut pieces = Vec::new();
        self.chunk_children(source, &tree.root_node(), &mut pieces);

        // A file tree-sitter sees as a single opaque blob still gets indexed.
        if pieces.is_empty() {
            pieces = char_windows(source, self.max_size);
        }

        Ok(pieces
            .into_iter()
            .filter(|p| !p.trim().is_empty())
            .enumerate()
            .map(|(i, content)| Segment {
                content,
                metadata: document.metadata.clone(),
                chunk_index: i,
            })
            .collect())
    }

    fn chunk_children(&self, source: &str, parent: &Node, output: &mut Vec<String>) {
        let mut cursor = parent.walk();
        let children: Vec<Node> = parent.named_children(&mut cursor).collect();

        // Greedy sibling merge: extend the batch while the covering span
        // stays under the budget.
        let mut batch_start: Option<usize> = None;
        let mut batch_end = 0usize;

        for child in children {
            let child_text = &source[child.byte_range()];
            let child_chars = child_text.chars().count();

            if child_chars > self.max_size {
                if let Some(start) = batch_start.take() {
                    output.push(source[start..batch_end].to_owned());
                }

                let mut grandchild_cursor = child.walk();
                if child.named_children(&mut grandchild_cursor).next().is_some() {
                    self.chunk_children(source, &child, output);
                } else {
                    output.extend(char_windows(child_text, self.max_size));
                }
                continue;
            }

            match batch_start {
                Some(start) => {
                    let candidate = &source[start..child.end_byte()];
                    if candidate.chars().count() > self.max_size {
                        output.push(source[start..batch_end].to_owned());
                        batch_start = Some(child.start_byte());
                    }
                }
                None => batch_start = Some(child.start_byte()),
            }
            batch_end = child.end_byte();
        }

        if let Some(start) = batch_start {
            output.push(source[start..batch_end].to_owned());
        }
    }
}

fn char_windows(text: &str, size: usize) -> Vec<String> {
    let chars: Vec<char> = text.chars().collect();
    chars
        .chunks(size.max(1))
        .map(|w| w.iter().collect())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::DocumentMetadata;

    fn make_doc(content: &str) -> Document {
        Document {
            content: content.to_owned(),
            metadata: DocumentMetadata::new("test.py", "text/x-python"),
        }
    }

    const SAMPLE: &str = r#"import os

def greet(name):
    return f"Hello, {name}"

def farewell(name):
    return f"Bye, {name}"

class Greeter:
    def __init__(self, name):
        self.name = name

    def run(self):
        print(greet(self.name))
"#;

    #[test]
    fn empty_source_yields_nothing() {
        let segments = CodeSplitter::default().split(&make_doc("")).unwrap();
        assert!(segments.is_empty());
    }

    #[test]
    fn small_file_single_segment() {
        let segments = CodeSplitter::default().split(&make_doc(SAMPLE)).unwrap();
        assert_eq!(segments.len(), 1);
        assert!(segments[0].content.contains("def greet"));
    }

    #[test]
    fn segments_respect_size_bound() {
        let source = "def f_0():\n    return 0\n\n".repeat(100);
        let splitter = CodeSplitter::default();
        let segments = splitter.split(&make_doc(&source)).unwrap();
        assert!(segments.len() > 1);
        for segment in &segments {
            assert!(segment.content.chars().count() <= 500);
        }
    }

    #[test]
    fn statements_not_split_when_avoidable() {
        let source = "def alpha():\n    return 1\n\ndef beta():\n    return 2\n\n".repeat(20);
        let segments = CodeSplitter::new(120).split(&make_doc(&source)).unwrap();
        for segment in &segments {
            // Every segment starts at a statement boundary.
            assert!(segment.content.starts_with("def "), "{:?}", segment.content);
        }
    }

    #[test]
    fn zero_overlap_between_segments() {
        let source = "x = 1\ny = 2\nz = 3\n".repeat(200);
        let doc = make_doc(&source);
        let segments = CodeSplitter::default().split(&doc).unwrap();
        assert!(segments.len() > 1);

        // Segments appear in order and never repeat source text.
        let mut cursor = 0;
        for segment in &segments {
            let pos = source[cursor..]
                .find(&segment.content)
                .expect("segment must come from source, in order");
            cursor += pos + segment.content.len();
        }
    }

    #[test]
    fn oversized_function_split_at_children() {
        let body: String = (0..60).map(|i| format!("    v{i} = {i}\n")).collect();
        let source = format!("def big():\n{body}");
        let segments = CodeSplitter::default().split(&make_doc(&source)).unwrap();
        assert!(segments.len() > 1);
        for segment in &segments {
            assert!(segment.content.chars().count() <= 500);
        }
    }

    #[test]
    fn chunk_indices_sequential() {
        let source = "a = 1\n\nb = 2\n\nc = 3\n".repeat(100);
        let segments = CodeSplitter::default().split(&make_doc(&source)).unwrap();
        for (i, segment) in segments.iter().enumerate() {
            assert_eq!(segment.chunk_index, i);
        }
    }
}
