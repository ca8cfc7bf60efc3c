use std::path::Path;
use std::pin::Pin;

use super::{DEFAULT_MAX_FILE_SIZE, DocumentLoader, check_file_size};
use crate::error::{IndexError, Result};
use crate::types::{Document, DocumentMetadata};

/// Loads `.html`/`.htm` files, extracting the visible text of the body.
pub struct HtmlLoader {
    pub max_file_size: u64,
}

impl Default for HtmlLoader {
    fn default() -> Self {
        Self {
            max_file_size: DEFAULT_MAX_FILE_SIZE,
        }
    }
}

impl DocumentLoader for HtmlLoader {
    fn load(
        &self,
        path: &Path,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<Document>>> + Send + '_>> {
        let path = path.to_path_buf();
        let max_size = self.max_file_size;
        Box::pin(async move {
            let path = std::fs::canonicalize(&path)?;
            check_file_size(&path, max_size).await?;

            let html = tokio::fs::read_to_string(&path).await?;
            let content = tokio::task::spawn_blocking(move || html_to_text(&html))
                .await
                .map_err(|e| IndexError::Io(std::io::Error::other(e)))?;

            Ok(vec![Document {
                content,
                metadata: DocumentMetadata::new(path.display().to_string(), "text/html"),
            }])
        })
    }

    fn supported_extensions(&self) -> &[&str] {
        &["html", "htm"]
    }
}

/// Extract visible text from an HTML document. Parses the DOM and takes the
/// body text; fragments without a body fall back to a tag-stripping scan.
fn html_to_text(html: &str) -> String {
    let soup = scrape_core::Soup::parse(html);
    if let Ok(bodies) = soup.find_all("body") {
        let text: Vec<String> = bodies
            .into_iter()
            .map(|tag| tag.text().trim().to_owned())
            .filter(|t| !t.is_empty())
            .collect();
        if !text.is_empty() {
            return text.join("\n");
        }
    }
    strip_tags(html)
}

fn strip_tags(html: &str) -> String {
    let lowered = html.to_ascii_lowercase();
    let mut out = String::new();
    let mut i = 0;

    while let Some(lt) = lowered[i..].find('<') {
        let lt = i + lt;
        push_text(&html[i..lt], &mut out);

        // Drop script/style subtrees entirely.
        if let Some(skip) =
            skip_container(&lowered[lt..], "script").or_else(|| skip_container(&lowered[lt..], "style"))
        {
            i = lt + skip;
            continue;
        }

        match lowered[lt..].find('>') {
            Some(gt) => i = lt + gt + 1,
            None => return out.trim().to_owned(),
        }
    }
    push_text(&html[i..], &mut out);
    out.trim().to_owned()
}

fn skip_container(lowered_tail: &str, name: &str) -> Option<usize> {
    if !lowered_tail.starts_with(&format!("<{name}")) {
        return None;
    }
    let close = format!("</{name}>");
    lowered_tail.find(&close).map(|pos| pos + close.len())
}

fn push_text(raw: &str, out: &mut String) {
    let text = raw.trim();
    if text.is_empty() {
        return;
    }
    if !out.is_empty() {
        out.push('\n');
    }
    out.push_str(text);
}
