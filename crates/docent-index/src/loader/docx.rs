use std::io::{Cursor, Read};
use std::path::Path;
use std::pin::Pin;

use super::{DEFAULT_MAX_FILE_SIZE, DocumentLoader, check_file_size};
use crate::error::{IndexError, Result};
use crate::types::{Document, DocumentMetadata};

/// Loads `.docx` files by reading `word/document.xml` out of the OOXML
/// archive and collecting the `<w:t>` text runs.
pub struct DocxLoader {
    pub max_file_size: u64,
}

impl Default for DocxLoader {
    fn default() -> Self {
        Self {
            max_file_size: DEFAULT_MAX_FILE_SIZE,
        }
    }
}

impl DocumentLoader for DocxLoader {
    fn load(
        &self,
        path: &Path,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<Document>>> + Send + '_>> {
        let path = path.to_path_buf();
        let max_size = self.max_file_size;
        Box::pin(async move {
            let path = std::fs::canonicalize(&path)?;
            check_file_size(&path, max_size).await?;

            let source = path.display().to_string();
            let bytes = tokio::fs::read(&path).await?;
            let content = tokio::task::spawn_blocking(move || extract_docx_text(&bytes))
                .await
                .map_err(|e| IndexError::Io(std::io::Error::other(e)))??;

            Ok(vec![Document {
                content,
                metadata: DocumentMetadata::new(
                    source,
                    "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
                ),
            }])
        })
    }

    fn supported_extensions(&self) -> &[&str] {
        &["docx"]
    }
}

fn extract_docx_text(bytes: &[u8]) -> Result<String> {
    let mut archive = zip::ZipArchive::new(Cursor::new(bytes))
        .map_err(|e| IndexError::Docx(e.to_string()))?;

    let mut xml = String::new();
    archive
        .by_name("word/document.xml")
        .map_err(|e| IndexError::Docx(e.to_string()))?
        .read_to_string(&mut xml)
        .map_err(|e| IndexError::Docx(e.to_string()))?;

    Ok(document_xml_to_text(&xml))
}

/// Collect the text runs of a WordprocessingML document body, one line per
/// paragraph.
fn document_xml_to_text(xml: &str) -> String {
    let mut out = String::new();
    for paragraph in xml.split("</w:p>") {
        let start = out.len();
        append_text_runs(paragraph, &mut out);
        if out.len() > start {
            out.push('\n');
        }
    }
    out.trim_end().to_owned()
}

fn append_text_runs(fragment: &str, out: &mut String) {
    let mut rest = fragment;
    while let Some(pos) = rest.find("<w:t") {
        let tail = &rest[pos + 4..];
        // Reject longer tag names sharing the prefix (e.g. <w:tbl>).
        match tail.as_bytes().first() {
            Some(b'>' | b' ' | b'/') => {}
            _ => {
                rest = tail;
                continue;
            }
        }
        let Some(gt) = tail.find('>') else { return };
        if tail[..gt].ends_with('/') {
            rest = &tail[gt + 1..];
            continue;
        }
        let body = &tail[gt + 1..];
        let Some(end) = body.find("</w:t>") else {
            return;
        };
        decode_entities(&body[..end], out);
        rest = &body[end + "</w:t>".len()..];
    }
}

fn decode_entities(text: &str, out: &mut String) {
    let mut rest = text;
    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        let tail = &rest[amp..];
        let Some(semi) = tail.find(';') else {
            out.push_str(tail);
            return;
        };
        match &tail[..=semi] {
            "&amp;" => out.push('&'),
            "&lt;" => out.push('<'),
            "&gt;" => out.push('>'),
            "&quot;" => out.push('"'),
            "&apos;" => out.push('\''),
            other => out.push_str(other),
        }
        rest = &tail[semi + 1..];
    }
    out.push_str(rest);
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_docx(path: &Path, document_xml: &str) {
        let file = std::fs::File::create(path).unwrap();
        let mut archive = zip::ZipWriter::new(file);
        let options = zip::write::SimpleFileOptions::default();
        archive.start_file("word/document.xml", options).unwrap();
        archive.write_all(document_xml.as_bytes()).unwrap();
        archive.finish().unwrap();
    }

    const SAMPLE: &str = concat!(
        r#"<?xml version="1.0"?><w:document><w:body>"#,
        "<w:p><w:r><w:t>First paragraph.</w:t></w:r></w:p>",
        r#"<w:p><w:r><w:t xml:space="preserve">Second </w:t></w:r>"#,
        "<w:r><w:t>half.</w:t></w:r></w:p>",
        "</w:body></w:document>"
    );

    #[test]
    fn runs_joined_paragraphs_split() {
        let text = document_xml_to_text(SAMPLE);
        assert_eq!(text, "First paragraph.\nSecond half.");
    }

    #[test]
    fn entities_decoded() {
        let text = document_xml_to_text("<w:p><w:r><w:t>a &amp; b &lt;c&gt;</w:t></w:r></w:p>");
        assert_eq!(text, "a & b <c>");
    }

    #[test]
    fn self_closing_run_skipped() {
        let text = document_xml_to_text("<w:p><w:r><w:t/></w:r><w:r><w:t>x</w:t></w:r></w:p>");
        assert_eq!(text, "x");
    }

    #[test]
    fn similar_tag_names_ignored() {
        let text =
            document_xml_to_text("<w:p><w:tbl>no</w:tbl><w:r><w:t>yes</w:t></w:r></w:p>");
        assert_eq!(text, "yes");
    }

    #[tokio::test]
    async fn load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("doc.docx");
        write_docx(&file, SAMPLE);

        let docs = DocxLoader::default().load(&file).await.unwrap();
        assert_eq!(docs.len(), 1);
        assert!(docs[0].content.contains("First paragraph."));
        assert!(docs[0].metadata.content_type.contains("wordprocessingml"));
    }

    #[tokio::test]
    async fn not_an_archive_is_docx_error() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("bad.docx");
        std::fs::write(&file, "plain text").unwrap();

        let result = DocxLoader::default().load(&file).await;
        assert!(matches!(result, Err(IndexError::Docx(_))));
    }
}
