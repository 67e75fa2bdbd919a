use thiserror::Error;

/// Trait for page-text providers.
///
/// Implementors supply the raw per-page text of a document; the extraction
/// pipeline (classification, segmentation, validation, deduplication) lives
/// in `ladle-parsing`.
pub trait PageTextProvider: Send + Sync {
    /// Total number of pages in the document.
    fn page_count(&self) -> usize;

    /// Plain text of the given 1-based page.
    fn page_text(&self, page_number: usize) -> Result<String, PageReadError>;
}

/// A per-page read failure. Isolated to the failing page; a run counts it
/// and continues with the next page.
#[derive(Error, Debug)]
pub enum PageReadError {
    #[error("page {page} out of range (document has {page_count} pages)")]
    OutOfRange { page: usize, page_count: usize },
    #[error("failed to read page {page}: {source}")]
    Io {
        page: usize,
        #[source]
        source: std::io::Error,
    },
}
