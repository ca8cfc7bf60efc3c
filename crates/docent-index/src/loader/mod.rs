//! Document loaders, selected by file extension.

pub mod docx;
pub mod html;
pub mod pdf;

use std::path::Path;

use crate::error::{IndexError, Result};
use crate::types::Document;

pub use docx::DocxLoader;
pub use html::HtmlLoader;
pub use pdf::PdfLoader;

/// Default maximum file size: 50 MiB.
pub const DEFAULT_MAX_FILE_SIZE: u64 = 50 * 1024 * 1024;

pub trait DocumentLoader: Send + Sync {
    fn load(
        &self,
        path: &Path,
    ) -> std::pin::Pin<Box<dyn Future<Output = Result<Vec<Document>>> + Send + '_>>;

    fn supported_extensions(&self) -> &[&str];
}

/// Select a loader for `path` by extension.
///
/// # Errors
///
/// Returns [`IndexError::UnsupportedFormat`] for any extension other than
/// `pdf`, `docx`, `html`, or `htm`. The failure happens before anything is
/// read, so a rejected file leaves no trace in the store.
pub fn loader_for(path: &Path, max_file_size: u64) -> Result<Box<dyn DocumentLoader>> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();

    match ext.as_str() {
        "pdf" => Ok(Box::new(PdfLoader { max_file_size })),
        "docx" => Ok(Box::new(DocxLoader { max_file_size })),
        "html" | "htm" => Ok(Box::new(HtmlLoader { max_file_size })),
        _ => Err(IndexError::UnsupportedFormat(path.display().to_string())),
    }
}

pub(crate) async fn check_file_size(path: &Path, max_size: u64) -> Result<()> {
    let meta = tokio::fs::metadata(path).await?;
    if meta.len() > max_size {
        return Err(IndexError::FileTooLarge(meta.len()));
    }
    Ok(())
}
