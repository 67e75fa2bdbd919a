use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;
use tracing::debug;

use ladle_core::{PageTextProvider, SectionRange};

use crate::config::ExtractionConfig;

/// Table-of-contents indexing failure. Non-fatal: callers fall back to one
/// unrestricted full-document scan with the `"Uncategorized"` category.
#[derive(Error, Debug)]
pub enum TocError {
    #[error("no table of contents heading found in the first {0} pages")]
    NotFound(usize),
    #[error("table of contents headings carried no page references")]
    NoPageReferences,
}

/// One `Title ..... 23` entry collected under a category heading.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TocEntry {
    pub title: String,
    pub page: usize,
}

// Dot-leader entries ("Apple Pie ..... 42") and plain trailing page numbers.
static DOTTED_ENTRY_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(.+?)\s*\.{2,}\s*(\d{1,4})\s*$").unwrap());
static PLAIN_ENTRY_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(.+?)\s+(\d{1,4})\s*$").unwrap());

/// Parse a single TOC entry line into a title and a page number.
pub(crate) fn parse_entry(line: &str) -> Option<TocEntry> {
    let caps = DOTTED_ENTRY_RE
        .captures(line)
        .or_else(|| PLAIN_ENTRY_RE.captures(line))?;
    let title = caps.get(1)?.as_str().trim().trim_end_matches('.').trim();
    if !title.chars().any(|c| c.is_alphabetic()) {
        return None;
    }
    let page: usize = caps.get(2)?.as_str().parse().ok()?;
    if page == 0 {
        return None;
    }
    Some(TocEntry {
        title: title.to_string(),
        page,
    })
}

/// Scan a bounded page prefix for category headings and build page ranges.
///
/// For each heading from the category vocabulary, following entry lines are
/// collected until the next heading or a blank-line run; each category's
/// range spans the min/max page it references. Ranges come back sorted by
/// start page and de-overlapped so a run visits pages in non-decreasing
/// order. The result is advisory: the segmenter's own page assignment always
/// takes precedence over TOC listings.
pub fn index_toc(
    provider: &dyn PageTextProvider,
    config: &ExtractionConfig,
) -> Result<Vec<SectionRange>, TocError> {
    let scan_limit = config.toc_scan_pages.min(provider.page_count());
    let mut collected: Vec<(String, usize, usize)> = Vec::new();
    let mut current: Option<usize> = None;
    let mut found_heading = false;
    let mut blank_run = 0usize;

    for page in 1..=scan_limit {
        let text = match provider.page_text(page) {
            Ok(text) => text,
            Err(e) => {
                debug!(page, error = %e, "skipping unreadable page during TOC scan");
                continue;
            }
        };
        for line in text.lines() {
            let trimmed = line.trim();
            if trimmed.is_empty() {
                blank_run += 1;
                if blank_run >= 2 {
                    // A blank-line run closes the current heading's list.
                    current = None;
                }
                continue;
            }
            blank_run = 0;
            if let Some(name) = config.toc_category(trimmed) {
                found_heading = true;
                let idx = collected
                    .iter()
                    .position(|(existing, _, _)| existing == name)
                    .unwrap_or_else(|| {
                        collected.push((name.to_string(), usize::MAX, 0));
                        collected.len() - 1
                    });
                current = Some(idx);
                continue;
            }
            if let Some(idx) = current {
                if let Some(entry) = parse_entry(trimmed) {
                    let slot = &mut collected[idx];
                    slot.1 = slot.1.min(entry.page);
                    slot.2 = slot.2.max(entry.page);
                }
            }
        }
    }

    if !found_heading {
        return Err(TocError::NotFound(scan_limit));
    }

    let page_count = provider.page_count();
    let mut ranges: Vec<SectionRange> = collected
        .into_iter()
        .filter(|(_, lo, _)| *lo != usize::MAX)
        .map(|(category_name, lo, hi)| SectionRange {
            category_name,
            start_page: lo.max(1),
            end_page: hi.min(page_count),
        })
        .filter(|r| r.start_page <= r.end_page)
        .collect();
    if ranges.is_empty() {
        return Err(TocError::NoPageReferences);
    }

    ranges.sort_by(|a, b| {
        (a.start_page, a.end_page, &a.category_name).cmp(&(b.start_page, b.end_page, &b.category_name))
    });

    let mut out: Vec<SectionRange> = Vec::with_capacity(ranges.len());
    for mut range in ranges {
        if let Some(prev) = out.last() {
            if range.start_page <= prev.end_page {
                range.start_page = prev.end_page + 1;
            }
        }
        if range.start_page <= range.end_page {
            out.push(range);
        } else {
            debug!(
                category = %range.category_name,
                "dropping TOC range fully shadowed by an earlier section"
            );
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ladle_core::PageReadError;

    struct Pages(Vec<&'static str>);

    impl PageTextProvider for Pages {
        fn page_count(&self) -> usize {
            self.0.len()
        }

        fn page_text(&self, page_number: usize) -> Result<String, PageReadError> {
            self.0
                .get(page_number.checked_sub(1).unwrap_or(usize::MAX))
                .map(|t| t.to_string())
                .ok_or(PageReadError::OutOfRange {
                    page: page_number,
                    page_count: self.0.len(),
                })
        }
    }

    fn blank_pages(n: usize) -> Vec<&'static str> {
        vec![""; n]
    }

    #[test]
    fn parse_entry_variants() {
        assert_eq!(
            parse_entry("Apple Pie ........ 42"),
            Some(TocEntry {
                title: "Apple Pie".to_string(),
                page: 42
            })
        );
        assert_eq!(
            parse_entry("Apple Pie 42"),
            Some(TocEntry {
                title: "Apple Pie".to_string(),
                page: 42
            })
        );
        assert_eq!(parse_entry("1234 5678"), None);
        assert_eq!(parse_entry("no trailing number"), None);
    }

    #[test]
    fn builds_ranges_from_headings() {
        let mut pages = vec![
            "Contents\n\nDesserts\nApple Pie ..... 20\nPecan Pie ..... 24\n\n\nSoups\nMinestrone ..... 5\nChicken Soup ..... 9\n",
        ];
        pages.extend(blank_pages(30));
        let provider = Pages(pages);
        let ranges = index_toc(&provider, &ExtractionConfig::default()).unwrap();
        assert_eq!(ranges.len(), 2);
        assert_eq!(ranges[0].category_name, "Soups");
        assert_eq!((ranges[0].start_page, ranges[0].end_page), (5, 9));
        assert_eq!(ranges[1].category_name, "Desserts");
        assert_eq!((ranges[1].start_page, ranges[1].end_page), (20, 24));
    }

    #[test]
    fn no_heading_is_not_found() {
        let provider = Pages(vec!["just some prose\n", "more prose\n"]);
        let result = index_toc(&provider, &ExtractionConfig::default());
        assert!(matches!(result, Err(TocError::NotFound(_))));
    }

    #[test]
    fn heading_without_entries_is_no_page_references() {
        let provider = Pages(vec!["Desserts\n\n\n", ""]);
        let result = index_toc(&provider, &ExtractionConfig::default());
        assert!(matches!(result, Err(TocError::NoPageReferences)));
    }

    #[test]
    fn overlapping_ranges_are_deoverlapped() {
        let mut pages = vec![
            "Soups\nMinestrone ..... 5\nStew ..... 12\n\n\nSalads\nCobb Salad ..... 10\nFruit Salad ..... 18\n",
        ];
        pages.extend(blank_pages(20));
        let provider = Pages(pages);
        let ranges = index_toc(&provider, &ExtractionConfig::default()).unwrap();
        assert_eq!(ranges.len(), 2);
        assert_eq!((ranges[0].start_page, ranges[0].end_page), (5, 12));
        // Salads originally started at 10; it now starts after Soups ends.
        assert_eq!(ranges[1].category_name, "Salads");
        assert_eq!((ranges[1].start_page, ranges[1].end_page), (13, 18));
    }

    #[test]
    fn ranges_clamped_to_document_length() {
        let mut pages = vec!["Desserts\nApple Pie ..... 20\nLost Pie ..... 900\n"];
        pages.extend(blank_pages(24));
        let provider = Pages(pages);
        let ranges = index_toc(&provider, &ExtractionConfig::default()).unwrap();
        assert_eq!(ranges.len(), 1);
        assert_eq!(ranges[0].end_page, 25);
    }

    #[test]
    fn blank_run_closes_heading_scope() {
        let mut pages = vec![
            "Desserts\nApple Pie ..... 20\n\n\nsome stray prose line 7\n",
        ];
        pages.extend(blank_pages(25));
        let provider = Pages(pages);
        let ranges = index_toc(&provider, &ExtractionConfig::default()).unwrap();
        // The stray line after the blank run must not extend the range to 7.
        assert_eq!((ranges[0].start_page, ranges[0].end_page), (20, 20));
    }

    #[test]
    fn heading_match_is_case_insensitive() {
        let mut pages = vec!["DESSERTS\nApple Pie ..... 20\n"];
        pages.extend(blank_pages(25));
        let provider = Pages(pages);
        let ranges = index_toc(&provider, &ExtractionConfig::default()).unwrap();
        assert_eq!(ranges[0].category_name, "Desserts");
    }
}
