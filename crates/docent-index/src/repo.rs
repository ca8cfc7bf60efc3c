//! Repository loading: clone a git URL and collect its Python sources.

use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::error::{IndexError, Result};
use crate::types::{Document, DocumentMetadata};

/// Skip files larger than this when walking a clone.
const MAX_SOURCE_FILE_BYTES: u64 = 1_048_576;

pub struct RepoLoader {
    workdir: PathBuf,
}

impl RepoLoader {
    #[must_use]
    pub fn new(workdir: impl Into<PathBuf>) -> Self {
        Self {
            workdir: workdir.into(),
        }
    }

    /// Clone `url` and return one [`Document`] per `.py` file in the tree.
    ///
    /// A previous clone of the same URL under the workdir is wiped first, so
    /// repeated ingestion picks up the current remote state.
    ///
    /// # Errors
    ///
    /// Returns an error if the clone fails or the workdir is not writable.
    pub async fn load(&self, url: &str) -> Result<Vec<Document>> {
        let target = self.workdir.join(clone_dir_name(url));
        let url = url.to_owned();

        tokio::task::spawn_blocking(move || {
            if target.exists() {
                std::fs::remove_dir_all(&target)?;
            }
            std::fs::create_dir_all(&target)?;

            tracing::info!(%url, target = %target.display(), "cloning repository");
            git2::Repository::clone(&url, &target)?;

            Ok(collect_python_files(&target))
        })
        .await
        .map_err(|e| IndexError::Io(std::io::Error::other(e)))?
    }
}

fn collect_python_files(root: &Path) -> Vec<Document> {
    let mut documents = Vec::new();

    for entry in WalkDir::new(root)
        .into_iter()
        .filter_entry(|e| !is_hidden(e))
        .filter_map(std::result::Result::ok)
    {
        if !entry.file_type().is_file() {
            continue;
        }
        let path = entry.path();
        if path.extension().and_then(|e| e.to_str()) != Some("py") {
            continue;
        }
        if entry
            .metadata()
            .is_ok_and(|m| m.len() > MAX_SOURCE_FILE_BYTES)
        {
            continue;
        }

        let relative = path
            .strip_prefix(root)
            .unwrap_or(path)
            .to_string_lossy()
            .to_string();

        // Skip files that can't be read as UTF-8.
        let Ok(content) = std::fs::read_to_string(path) else {
            continue;
        };

        documents.push(Document {
            content,
            metadata: DocumentMetadata::new(relative, "text/x-python"),
        });
    }

    documents.sort_by(|a, b| a.metadata.source.cmp(&b.metadata.source));
    documents
}

fn is_hidden(entry: &walkdir::DirEntry) -> bool {
    entry.depth() > 0
        && entry
            .file_name()
            .to_str()
            .is_some_and(|name| name.starts_with('.'))
}

fn clone_dir_name(url: &str) -> String {
    let stem = url
        .trim_end_matches('/')
        .rsplit('/')
        .next()
        .unwrap_or("repo")
        .trim_end_matches(".git");

    let sanitized: String = stem
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '-' })
        .collect();

    if sanitized.is_empty() {
        "repo".to_owned()
    } else {
        sanitized
    }
}
