use ladle_core::{CandidateRecipe, ClassifiedLine, LineKind, LineSpan};

use crate::config::{ExtractionConfig, MarkerKind};

/// Segmentation state. Cycles back to `SeekingTitle` after each emission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SegmenterState {
    SeekingTitle,
    InHeader,
    InIngredients,
    InInstructions,
}

/// In-progress recipe accumulator.
#[derive(Debug, Clone)]
struct Draft {
    title: String,
    page_number: usize,
    start_line: usize,
    last_line: usize,
    ingredient_lines: Vec<String>,
    instruction_lines: Vec<String>,
    /// Page boundaries crossed while still waiting for ingredients.
    pages_in_header: usize,
}

impl Draft {
    fn new(title: String, page_number: usize, line: usize) -> Self {
        Self {
            title,
            page_number,
            start_line: line,
            last_line: line,
            ingredient_lines: Vec::new(),
            instruction_lines: Vec::new(),
            pages_in_header: 0,
        }
    }
}

/// Per-section state machine consuming classified lines and emitting
/// candidate recipes. One instance per section range; state, including the
/// partially built ingredient and instruction text, carries across page
/// boundaries within the section.
pub struct RecipeSegmenter<'a> {
    config: &'a ExtractionConfig,
    category: String,
    state: SegmenterState,
    draft: Option<Draft>,
    current_page: usize,
    /// Running line count within the section, for candidate line spans.
    line_counter: usize,
    /// Whether the previous line was blank (or a page/section boundary).
    prev_blank: bool,
}

impl<'a> RecipeSegmenter<'a> {
    pub fn new(category: String, config: &'a ExtractionConfig) -> Self {
        Self {
            config,
            category,
            state: SegmenterState::SeekingTitle,
            draft: None,
            current_page: 0,
            line_counter: 0,
            prev_blank: true,
        }
    }

    pub fn state(&self) -> SegmenterState {
        self.state
    }

    /// Mark a page boundary. The boundary counts as a blank-line gap, and a
    /// draft still waiting for ingredients after one full following page is
    /// abandoned (single-page look-ahead).
    pub fn begin_page(&mut self, page_number: usize) {
        self.current_page = page_number;
        self.prev_blank = true;
        if self.state == SegmenterState::InHeader {
            let stale = match &mut self.draft {
                Some(draft) => {
                    draft.pages_in_header += 1;
                    draft.pages_in_header > 1
                }
                None => false,
            };
            if stale {
                self.reset();
            }
        }
    }

    /// Consume one classified line. Returns a candidate when the line
    /// completes the previous recipe.
    pub fn push_line(&mut self, line: &ClassifiedLine) -> Option<CandidateRecipe> {
        self.line_counter += 1;
        let gap = self.prev_blank;
        self.prev_blank = line.kind == LineKind::Blank;
        let at = self.line_counter;

        match self.state {
            SegmenterState::SeekingTitle => {
                // The blank-gap requirement resolves the tie-break when a
                // line could also read as body text.
                if line.kind == LineKind::TitleCandidate && gap {
                    self.draft = Some(Draft::new(
                        line.text.trim().to_string(),
                        self.current_page,
                        at,
                    ));
                    self.state = SegmenterState::InHeader;
                }
                None
            }
            SegmenterState::InHeader => {
                match line.kind {
                    LineKind::SectionMarker => {
                        if self.config.marker_kind(&line.text) == Some(MarkerKind::Ingredients) {
                            self.state = SegmenterState::InIngredients;
                        }
                        // An instructions marker before any ingredients is
                        // left alone; the candidate would fail validation
                        // anyway if nothing else turns up.
                    }
                    LineKind::IngredientLine => {
                        self.push_ingredient(&line.text, at);
                        self.state = SegmenterState::InIngredients;
                    }
                    LineKind::TitleCandidate if gap => {
                        // Stacked headings: a category banner above the real
                        // recipe title. The later candidate wins.
                        self.draft = Some(Draft::new(
                            line.text.trim().to_string(),
                            self.current_page,
                            at,
                        ));
                    }
                    _ => {}
                }
                None
            }
            SegmenterState::InIngredients => {
                match line.kind {
                    LineKind::SectionMarker => {
                        if self.config.marker_kind(&line.text) == Some(MarkerKind::Instructions) {
                            self.state = SegmenterState::InInstructions;
                        }
                    }
                    LineKind::InstructionLine => {
                        self.push_instruction(&line.text, at);
                        self.state = SegmenterState::InInstructions;
                    }
                    LineKind::IngredientLine | LineKind::BodyText | LineKind::TitleCandidate => {
                        // Title-ish lines inside the block are sub-headings
                        // ("Topping") and stay with the ingredients.
                        self.push_ingredient(&line.text, at);
                    }
                    LineKind::Blank => {}
                }
                None
            }
            SegmenterState::InInstructions => {
                if line.kind == LineKind::TitleCandidate && gap {
                    // Next recipe's title terminates this one and seeds the
                    // next draft.
                    let emitted = self.take_candidate();
                    self.draft = Some(Draft::new(
                        line.text.trim().to_string(),
                        self.current_page,
                        at,
                    ));
                    self.state = SegmenterState::InHeader;
                    return emitted;
                }
                match line.kind {
                    // Repeated markers are structure, not content.
                    LineKind::Blank | LineKind::SectionMarker => {}
                    _ => self.push_instruction(&line.text, at),
                }
                None
            }
        }
    }

    /// End of the assigned page range: emit the in-progress candidate if it
    /// reached the instructions block.
    pub fn finish(&mut self) -> Option<CandidateRecipe> {
        let emitted = if self.state == SegmenterState::InInstructions {
            self.take_candidate()
        } else {
            None
        };
        self.reset();
        emitted
    }

    /// Discard the in-progress candidate without emitting it (cancellation).
    pub fn abandon(&mut self) {
        self.reset();
    }

    fn reset(&mut self) {
        self.draft = None;
        self.state = SegmenterState::SeekingTitle;
    }

    fn push_ingredient(&mut self, text: &str, at: usize) {
        if let Some(draft) = &mut self.draft {
            draft.ingredient_lines.push(text.trim().to_string());
            draft.last_line = at;
        }
    }

    fn push_instruction(&mut self, text: &str, at: usize) {
        if let Some(draft) = &mut self.draft {
            draft.instruction_lines.push(text.trim().to_string());
            draft.last_line = at;
        }
    }

    fn take_candidate(&mut self) -> Option<CandidateRecipe> {
        let draft = self.draft.take()?;
        self.state = SegmenterState::SeekingTitle;
        Some(CandidateRecipe {
            title: draft.title,
            category: self.category.clone(),
            page_number: draft.page_number,
            ingredients_text: draft.ingredient_lines.join("\n"),
            instructions_text: draft.instruction_lines.join("\n"),
            line_span: LineSpan {
                start: draft.start_line,
                end: draft.last_line,
            },
        })
    }
}
