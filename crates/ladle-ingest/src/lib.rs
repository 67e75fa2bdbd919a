use std::path::{Path, PathBuf};

use thiserror::Error;

pub mod pages;

// Re-export the backend trait for convenience
pub use ladle_core::{PageReadError, PageTextProvider};
pub use pages::{MemoryPages, PageDirectory, PlainTextDocument};

#[derive(Error, Debug)]
pub enum IngestError {
    #[error("failed to read document {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("no page files found in {0}")]
    EmptyDirectory(PathBuf),
}

/// Open a document as a page-text provider.
///
/// Dispatches on the path:
/// - a directory → [`PageDirectory`] (one text file per page, read lazily)
/// - anything else → [`PlainTextDocument`] (form-feed-paginated plain text)
pub fn open_document(path: &Path) -> Result<Box<dyn PageTextProvider>, IngestError> {
    if path.is_dir() {
        Ok(Box::new(PageDirectory::open(path)?))
    } else {
        Ok(Box::new(PlainTextDocument::open(path)?))
    }
}
