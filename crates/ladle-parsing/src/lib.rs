use tokio_util::sync::CancellationToken;

pub mod classify;
pub mod config;
pub mod dedup;
pub mod extractor;
pub mod segment;
pub mod toc;
pub mod validate;

pub use classify::{Classification, classify_line};
pub use config::{
    ConfigError, ExtractionConfig, ExtractionConfigBuilder, ListOverride, MarkerKind,
};
pub use dedup::{DedupOutcome, Deduplicator};
pub use extractor::{LineTrace, RecipeExtractor, RunReport};
pub use segment::{RecipeSegmenter, SegmenterState};
pub use toc::{TocEntry, TocError, index_toc};
pub use validate::validate_candidate;
// Re-export domain types from core (canonical definitions live there)
pub use ladle_core::{
    CandidateRecipe, ClassifiedLine, ExtractionStats, LineKind, PageReadError, PageTextProvider,
    RecipeRecord, RunEvent, SectionRange, UNCATEGORIZED, ValidationResult,
};

/// Extract recipes from a document using default configuration.
///
/// Pipeline:
/// 1. Index the table of contents into category page ranges (or fall back
///    to one unrestricted `"Uncategorized"` scan)
/// 2. Classify each page's lines
/// 3. Segment classified lines into candidate recipes, carrying state
///    across page boundaries within a section
/// 4. Validate each candidate's structure
/// 5. Drop duplicates seen under a normalized title nearby
pub fn extract_recipes(provider: &dyn PageTextProvider) -> RunReport {
    RecipeExtractor::new().run(provider, &CancellationToken::new(), |_| {})
}
