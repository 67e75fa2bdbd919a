use rayon::prelude::*;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use ladle_core::{
    CandidateRecipe, ClassifiedLine, ExtractionStats, LineKind, PageReadError, PageTextProvider,
    RecipeRecord, RunEvent, SectionRange, UNCATEGORIZED, ValidationResult,
};

use crate::classify::classify_line;
use crate::config::ExtractionConfig;
use crate::dedup::{DedupOutcome, Deduplicator};
use crate::segment::RecipeSegmenter;
use crate::toc;
use crate::validate::validate_candidate;

/// One entry of the per-line classification trace. Advisory output only.
#[derive(Debug, Clone)]
pub struct LineTrace {
    pub page_number: usize,
    pub line_index: usize,
    pub kind: LineKind,
    pub rule: &'static str,
}

/// Everything a run produces: accepted records in page order, run statistics,
/// the section plan, and (when enabled) the classification trace.
#[derive(Debug, Default)]
pub struct RunReport {
    pub recipes: Vec<RecipeRecord>,
    pub stats: ExtractionStats,
    pub sections: Vec<SectionRange>,
    pub trace: Vec<LineTrace>,
}

/// Per-section accumulator, merged into the run report at a single point.
struct SectionOutcome {
    validated: Vec<(CandidateRecipe, ValidationResult)>,
    stats: ExtractionStats,
    trace: Vec<LineTrace>,
}

/// The configurable recipe extraction pipeline.
///
/// Holds an [`ExtractionConfig`] and drives classification, segmentation,
/// validation and deduplication over a page range. Page-level failures are
/// counted and skipped; a run always completes and reports statistics.
pub struct RecipeExtractor {
    config: ExtractionConfig,
}

impl Default for RecipeExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl RecipeExtractor {
    /// Create an extractor with default configuration.
    pub fn new() -> Self {
        Self {
            config: ExtractionConfig::default(),
        }
    }

    /// Create an extractor with a custom configuration.
    pub fn with_config(config: ExtractionConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ExtractionConfig {
        &self.config
    }

    /// Build the section plan: TOC ranges when a TOC is found, otherwise one
    /// full-document `"Uncategorized"` range, filtered by the category
    /// allow-list.
    fn plan_sections(&self, provider: &dyn PageTextProvider) -> Vec<SectionRange> {
        let ranges = match toc::index_toc(provider, &self.config) {
            Ok(ranges) => ranges,
            Err(e) => {
                debug!(error = %e, "falling back to unrestricted full-document scan");
                vec![SectionRange {
                    category_name: UNCATEGORIZED.to_string(),
                    start_page: 1,
                    end_page: provider.page_count(),
                }]
            }
        };
        ranges
            .into_iter()
            .filter(|r| self.config.keeps_category(&r.category_name))
            .collect()
    }

    /// Run the full pipeline over the document.
    ///
    /// Sections are scanned in page order; with `parallel_sections` set and
    /// no recipe cap they fan out across threads, each with a private
    /// accumulator merged back in section order, so output is identical to
    /// the sequential path. Cancellation is checked between pages; an
    /// in-flight candidate is discarded, never emitted.
    pub fn run(
        &self,
        provider: &dyn PageTextProvider,
        cancel: &CancellationToken,
        progress: impl Fn(RunEvent) + Send + Sync,
    ) -> RunReport {
        let sections = self.plan_sections(provider);
        let mut report = RunReport {
            sections: sections.clone(),
            ..Default::default()
        };
        let mut dedup = Deduplicator::new(self.config.dedup_window);

        let parallel =
            self.config.parallel_sections && self.config.max_recipes.is_none() && sections.len() > 1;

        if parallel {
            let outcomes: Vec<SectionOutcome> = sections
                .par_iter()
                .map(|section| self.scan_section(provider, section, cancel, &progress))
                .collect();
            for outcome in outcomes {
                report.stats.merge(&outcome.stats);
                report.trace.extend(outcome.trace);
                for (candidate, validation) in outcome.validated {
                    self.admit(candidate, validation, &mut dedup, &mut report, &progress);
                }
            }
        } else {
            self.run_sequential(provider, &sections, cancel, &progress, &mut dedup, &mut report);
        }

        report
    }

    fn run_sequential(
        &self,
        provider: &dyn PageTextProvider,
        sections: &[SectionRange],
        cancel: &CancellationToken,
        progress: &(impl Fn(RunEvent) + Send + Sync),
        dedup: &mut Deduplicator,
        report: &mut RunReport,
    ) {
        'sections: for section in sections {
            progress(RunEvent::SectionStarted {
                category: section.category_name.clone(),
                start_page: section.start_page,
                end_page: section.end_page,
            });
            let mut segmenter =
                RecipeSegmenter::new(section.category_name.clone(), &self.config);

            for page in section.start_page..=section.end_page {
                if cancel.is_cancelled() {
                    debug!(page, "run cancelled; discarding in-flight candidate");
                    segmenter.abandon();
                    break 'sections;
                }
                let emitted = match self.scan_page(provider, &mut segmenter, page, &mut report.trace)
                {
                    Ok(emitted) => {
                        report.stats.pages_processed += 1;
                        progress(RunEvent::PageProcessed { page_number: page });
                        emitted
                    }
                    Err(e) => {
                        warn!(page, error = %e, "page read failed; continuing with next page");
                        report.stats.page_failures += 1;
                        progress(RunEvent::PageFailed { page_number: page });
                        continue;
                    }
                };
                for candidate in emitted {
                    self.dispose(candidate, dedup, report, progress);
                    if self.cap_reached(report) {
                        segmenter.abandon();
                        break 'sections;
                    }
                }
            }

            if let Some(candidate) = segmenter.finish() {
                self.dispose(candidate, dedup, report, progress);
                if self.cap_reached(report) {
                    break 'sections;
                }
            }
        }
    }

    /// Scan one section into a private accumulator (parallel path).
    fn scan_section(
        &self,
        provider: &dyn PageTextProvider,
        section: &SectionRange,
        cancel: &CancellationToken,
        progress: &(impl Fn(RunEvent) + Send + Sync),
    ) -> SectionOutcome {
        progress(RunEvent::SectionStarted {
            category: section.category_name.clone(),
            start_page: section.start_page,
            end_page: section.end_page,
        });
        let mut outcome = SectionOutcome {
            validated: Vec::new(),
            stats: ExtractionStats::default(),
            trace: Vec::new(),
        };
        let mut segmenter = RecipeSegmenter::new(section.category_name.clone(), &self.config);

        for page in section.start_page..=section.end_page {
            if cancel.is_cancelled() {
                segmenter.abandon();
                return outcome;
            }
            let emitted = match self.scan_page(provider, &mut segmenter, page, &mut outcome.trace) {
                Ok(emitted) => {
                    outcome.stats.pages_processed += 1;
                    progress(RunEvent::PageProcessed { page_number: page });
                    emitted
                }
                Err(e) => {
                    warn!(page, error = %e, "page read failed; continuing with next page");
                    outcome.stats.page_failures += 1;
                    progress(RunEvent::PageFailed { page_number: page });
                    continue;
                }
            };
            for candidate in emitted {
                self.validate_into(candidate, &mut outcome, progress);
            }
        }
        if let Some(candidate) = segmenter.finish() {
            self.validate_into(candidate, &mut outcome, progress);
        }
        outcome
    }

    /// Classify one page's lines and feed them to the segmenter.
    fn scan_page(
        &self,
        provider: &dyn PageTextProvider,
        segmenter: &mut RecipeSegmenter<'_>,
        page: usize,
        trace: &mut Vec<LineTrace>,
    ) -> Result<Vec<CandidateRecipe>, PageReadError> {
        let text = provider.page_text(page)?;
        segmenter.begin_page(page);
        let mut emitted = Vec::new();
        for (line_index, raw) in text.lines().enumerate() {
            let classification = classify_line(raw, &self.config);
            if self.config.collect_trace {
                trace.push(LineTrace {
                    page_number: page,
                    line_index,
                    kind: classification.kind,
                    rule: classification.rule,
                });
            }
            let line = ClassifiedLine {
                text: raw.to_string(),
                kind: classification.kind,
                line_index,
            };
            if let Some(candidate) = segmenter.push_line(&line) {
                emitted.push(candidate);
            }
        }
        Ok(emitted)
    }

    /// Validate an emitted candidate into a section accumulator.
    fn validate_into(
        &self,
        candidate: CandidateRecipe,
        outcome: &mut SectionOutcome,
        progress: &(impl Fn(RunEvent) + Send + Sync),
    ) {
        outcome.stats.recipes_found += 1;
        let validation = validate_candidate(&candidate, &self.config);
        if validation.is_valid {
            outcome.validated.push((candidate, validation));
        } else {
            outcome.stats.validation_failures += 1;
            debug!(title = %candidate.title, rules = ?validation.failed_rules, "candidate failed validation");
            progress(RunEvent::RecipeRejected {
                title: candidate.title,
                failed_rules: validation
                    .failed_rules
                    .iter()
                    .map(|r| r.to_string())
                    .collect(),
            });
        }
    }

    /// Give an emitted candidate its terminal disposition (sequential path):
    /// validation failure, duplicate, or accepted.
    fn dispose(
        &self,
        candidate: CandidateRecipe,
        dedup: &mut Deduplicator,
        report: &mut RunReport,
        progress: &(impl Fn(RunEvent) + Send + Sync),
    ) {
        report.stats.recipes_found += 1;
        let validation = validate_candidate(&candidate, &self.config);
        if !validation.is_valid {
            report.stats.validation_failures += 1;
            debug!(title = %candidate.title, rules = ?validation.failed_rules, "candidate failed validation");
            progress(RunEvent::RecipeRejected {
                title: candidate.title,
                failed_rules: validation
                    .failed_rules
                    .iter()
                    .map(|r| r.to_string())
                    .collect(),
            });
            return;
        }
        self.admit(candidate, validation, dedup, report, progress);
    }

    /// Deduplicate a validated candidate and record it if fresh.
    fn admit(
        &self,
        candidate: CandidateRecipe,
        validation: ValidationResult,
        dedup: &mut Deduplicator,
        report: &mut RunReport,
        progress: &(impl Fn(RunEvent) + Send + Sync),
    ) {
        match dedup.observe(&candidate.title, candidate.page_number) {
            DedupOutcome::Duplicate => {
                report.stats.duplicates_found += 1;
                progress(RunEvent::DuplicateSkipped {
                    title: candidate.title,
                    page_number: candidate.page_number,
                });
            }
            DedupOutcome::Fresh => {
                report.stats.recipes_validated += 1;
                progress(RunEvent::RecipeAccepted {
                    title: candidate.title.clone(),
                    page_number: candidate.page_number,
                });
                report.recipes.push(RecipeRecord {
                    title: candidate.title,
                    category: candidate.category,
                    page_number: candidate.page_number,
                    ingredients_text: candidate.ingredients_text,
                    instructions_text: candidate.instructions_text,
                    validation,
                });
            }
        }
    }

    fn cap_reached(&self, report: &RunReport) -> bool {
        self.config
            .max_recipes
            .is_some_and(|cap| report.recipes.len() >= cap)
    }
}
