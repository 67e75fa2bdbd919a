use std::collections::BTreeSet;

use serde::Serialize;

pub mod backend;
pub mod config_file;
pub mod text_utils;

// Re-export for convenience
pub use backend::{PageReadError, PageTextProvider};
pub use text_utils::{collapse_whitespace, normalize_title};

/// Category assigned to recipes found outside every table-of-contents range.
pub const UNCATEGORIZED: &str = "Uncategorized";

/// Raw text of a single document page. Immutable once fetched.
#[derive(Debug, Clone)]
pub struct PageText {
    pub page_number: usize,
    pub raw_text: String,
}

/// Semantic label assigned to one line of page text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LineKind {
    Blank,
    TitleCandidate,
    SectionMarker,
    IngredientLine,
    InstructionLine,
    BodyText,
}

/// A line of page text together with its classification.
#[derive(Debug, Clone)]
pub struct ClassifiedLine {
    pub text: String,
    pub kind: LineKind,
    /// 0-based index of the line within its page.
    pub line_index: usize,
}

/// A category's page range, derived once from the table of contents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectionRange {
    pub category_name: String,
    pub start_page: usize,
    pub end_page: usize,
}

impl SectionRange {
    pub fn contains(&self, page_number: usize) -> bool {
        page_number >= self.start_page && page_number <= self.end_page
    }
}

/// Line offsets of a candidate within its section scan (running count, not
/// per-page indices).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct LineSpan {
    pub start: usize,
    pub end: usize,
}

/// An extracted-but-not-yet-validated recipe. Mutable only while the
/// segmenter is building it; finalized into exactly one of accepted,
/// discarded, or merged-as-duplicate.
#[derive(Debug, Clone)]
pub struct CandidateRecipe {
    pub title: String,
    pub category: String,
    pub page_number: usize,
    pub ingredients_text: String,
    pub instructions_text: String,
    pub line_span: LineSpan,
}

/// Outcome of structural validation of a candidate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationResult {
    pub is_valid: bool,
    pub failed_rules: BTreeSet<&'static str>,
}

impl ValidationResult {
    pub fn passing() -> Self {
        Self {
            is_valid: true,
            failed_rules: BTreeSet::new(),
        }
    }
}

/// An accepted recipe record, handed to downstream ingestion in page order.
#[derive(Debug, Clone, Serialize)]
pub struct RecipeRecord {
    pub title: String,
    pub category: String,
    pub page_number: usize,
    pub ingredients_text: String,
    pub instructions_text: String,
    pub validation: ValidationResult,
}

/// Counters for a single extraction run. Owned by one run; per-section
/// accumulators are merged into the run's instance at a single merge point.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ExtractionStats {
    pub pages_processed: usize,
    pub recipes_found: usize,
    pub recipes_validated: usize,
    pub duplicates_found: usize,
    pub validation_failures: usize,
    pub page_failures: usize,
}

impl ExtractionStats {
    /// Total errors encountered: validation failures plus page read failures.
    pub fn errors_encountered(&self) -> usize {
        self.validation_failures + self.page_failures
    }

    pub fn merge(&mut self, other: &ExtractionStats) {
        self.pages_processed += other.pages_processed;
        self.recipes_found += other.recipes_found;
        self.recipes_validated += other.recipes_validated;
        self.duplicates_found += other.duplicates_found;
        self.validation_failures += other.validation_failures;
        self.page_failures += other.page_failures;
    }
}

/// Progress events emitted during an extraction run. Advisory output only;
/// never consumed by later pipeline stages.
#[derive(Debug, Clone)]
pub enum RunEvent {
    SectionStarted {
        category: String,
        start_page: usize,
        end_page: usize,
    },
    PageProcessed {
        page_number: usize,
    },
    PageFailed {
        page_number: usize,
    },
    RecipeAccepted {
        title: String,
        page_number: usize,
    },
    RecipeRejected {
        title: String,
        failed_rules: Vec<String>,
    },
    DuplicateSkipped {
        title: String,
        page_number: usize,
    },
}
