use std::path::{Path, PathBuf};

use tracing::debug;

use ladle_core::{PageReadError, PageTextProvider};

use crate::IngestError;

/// An in-memory page sequence. The natural provider for tests and for
/// callers that already hold per-page text.
#[derive(Debug, Clone, Default)]
pub struct MemoryPages {
    pages: Vec<String>,
}

impl MemoryPages {
    pub fn new<I, S>(pages: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            pages: pages.into_iter().map(Into::into).collect(),
        }
    }
}

impl PageTextProvider for MemoryPages {
    fn page_count(&self) -> usize {
        self.pages.len()
    }

    fn page_text(&self, page_number: usize) -> Result<String, PageReadError> {
        page_number
            .checked_sub(1)
            .and_then(|i| self.pages.get(i))
            .cloned()
            .ok_or(PageReadError::OutOfRange {
                page: page_number,
                page_count: self.pages.len(),
            })
    }
}

/// A plain-text document paginated by form-feed characters, the format page
/// OCR dumps commonly arrive in. A file with no form feeds is one page.
#[derive(Debug, Clone)]
pub struct PlainTextDocument {
    pages: Vec<String>,
}

impl PlainTextDocument {
    pub fn open(path: &Path) -> Result<Self, IngestError> {
        let text = std::fs::read_to_string(path).map_err(|source| IngestError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let doc = Self::from_text(&text);
        debug!(path = %path.display(), pages = doc.pages.len(), "opened plain-text document");
        Ok(doc)
    }

    pub fn from_text(text: &str) -> Self {
        Self {
            pages: text.split('\u{0c}').map(str::to_string).collect(),
        }
    }
}

impl PageTextProvider for PlainTextDocument {
    fn page_count(&self) -> usize {
        self.pages.len()
    }

    fn page_text(&self, page_number: usize) -> Result<String, PageReadError> {
        page_number
            .checked_sub(1)
            .and_then(|i| self.pages.get(i))
            .cloned()
            .ok_or(PageReadError::OutOfRange {
                page: page_number,
                page_count: self.pages.len(),
            })
    }
}

/// A directory with one text file per page (`page-001.txt`, `page-002.txt`,
/// …), ordered numerically where possible and by name otherwise. Files are
/// read lazily so a single unreadable page stays an isolated failure.
#[derive(Debug, Clone)]
pub struct PageDirectory {
    files: Vec<PathBuf>,
}

impl PageDirectory {
    pub fn open(dir: &Path) -> Result<Self, IngestError> {
        let entries = std::fs::read_dir(dir).map_err(|source| IngestError::Io {
            path: dir.to_path_buf(),
            source,
        })?;
        let mut files: Vec<PathBuf> = entries
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| {
                path.is_file()
                    && path
                        .extension()
                        .and_then(|e| e.to_str())
                        .is_some_and(|e| e.eq_ignore_ascii_case("txt"))
            })
            .collect();
        if files.is_empty() {
            return Err(IngestError::EmptyDirectory(dir.to_path_buf()));
        }
        files.sort_by_key(|path| (page_sort_key(path), path.clone()));
        debug!(dir = %dir.display(), pages = files.len(), "opened page directory");
        Ok(Self { files })
    }
}

/// Numeric component of a page file name, for `page-2` before `page-10`.
fn page_sort_key(path: &Path) -> u64 {
    let stem = path.file_stem().and_then(|s| s.to_str()).unwrap_or("");
    let digits: String = stem.chars().filter(|c| c.is_ascii_digit()).collect();
    digits.parse().unwrap_or(u64::MAX)
}

impl PageTextProvider for PageDirectory {
    fn page_count(&self) -> usize {
        self.files.len()
    }

    fn page_text(&self, page_number: usize) -> Result<String, PageReadError> {
        let path = page_number
            .checked_sub(1)
            .and_then(|i| self.files.get(i))
            .ok_or(PageReadError::OutOfRange {
                page: page_number,
                page_count: self.files.len(),
            })?;
        std::fs::read_to_string(path).map_err(|source| PageReadError::Io {
            page: page_number,
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_pages_are_one_based() {
        let pages = MemoryPages::new(["first", "second"]);
        assert_eq!(pages.page_count(), 2);
        assert_eq!(pages.page_text(1).unwrap(), "first");
        assert_eq!(pages.page_text(2).unwrap(), "second");
        assert!(matches!(
            pages.page_text(0),
            Err(PageReadError::OutOfRange { .. })
        ));
        assert!(matches!(
            pages.page_text(3),
            Err(PageReadError::OutOfRange { page: 3, page_count: 2 })
        ));
    }

    #[test]
    fn form_feed_pagination() {
        let doc = PlainTextDocument::from_text("page one\u{0c}page two\u{0c}page three");
        assert_eq!(doc.page_count(), 3);
        assert_eq!(doc.page_text(2).unwrap(), "page two");
    }

    #[test]
    fn no_form_feed_is_single_page() {
        let doc = PlainTextDocument::from_text("all one page");
        assert_eq!(doc.page_count(), 1);
    }

    #[test]
    fn plain_text_document_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("book.txt");
        std::fs::write(&path, "a\u{0c}b").unwrap();
        let doc = PlainTextDocument::open(&path).unwrap();
        assert_eq!(doc.page_count(), 2);
        assert_eq!(doc.page_text(1).unwrap(), "a");
    }

    #[test]
    fn missing_file_is_ingest_error() {
        let result = PlainTextDocument::open(Path::new("/nonexistent/book.txt"));
        assert!(matches!(result, Err(IngestError::Io { .. })));
    }

    #[test]
    fn page_directory_orders_numerically() {
        let dir = tempfile::tempdir().unwrap();
        for (name, content) in [
            ("page-10.txt", "ten"),
            ("page-2.txt", "two"),
            ("page-1.txt", "one"),
        ] {
            std::fs::write(dir.path().join(name), content).unwrap();
        }
        std::fs::write(dir.path().join("notes.md"), "ignored").unwrap();
        let pages = PageDirectory::open(dir.path()).unwrap();
        assert_eq!(pages.page_count(), 3);
        assert_eq!(pages.page_text(1).unwrap(), "one");
        assert_eq!(pages.page_text(2).unwrap(), "two");
        assert_eq!(pages.page_text(3).unwrap(), "ten");
    }

    #[test]
    fn empty_directory_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let result = PageDirectory::open(dir.path());
        assert!(matches!(result, Err(IngestError::EmptyDirectory(_))));
    }

    #[test]
    fn open_document_dispatches_on_path_kind() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("book.txt");
        std::fs::write(&file, "one\u{0c}two").unwrap();
        let doc = crate::open_document(&file).unwrap();
        assert_eq!(doc.page_count(), 2);

        let pages_dir = dir.path().join("pages");
        std::fs::create_dir(&pages_dir).unwrap();
        std::fs::write(pages_dir.join("page-1.txt"), "one").unwrap();
        let doc = crate::open_document(&pages_dir).unwrap();
        assert_eq!(doc.page_count(), 1);
    }
}
