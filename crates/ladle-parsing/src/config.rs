use std::collections::HashSet;

use thiserror::Error;

/// Controls how a vocabulary list is overridden from its defaults.
#[derive(Debug, Clone, Default)]
pub enum ListOverride<T> {
    /// Use the built-in defaults.
    #[default]
    Default,
    /// Completely replace the defaults with these values.
    Replace(Vec<T>),
    /// Append these values to the defaults.
    Extend(Vec<T>),
}

impl<T: Clone> ListOverride<T> {
    /// Resolve this override against the given defaults.
    pub fn resolve(&self, defaults: &[T]) -> Vec<T> {
        match self {
            ListOverride::Default => defaults.to_vec(),
            ListOverride::Replace(v) => v.clone(),
            ListOverride::Extend(v) => {
                let mut result = defaults.to_vec();
                result.extend(v.iter().cloned());
                result
            }
        }
    }
}

/// Which block a section-marker line opens.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkerKind {
    Ingredients,
    Instructions,
}

/// Configuration rejected before a run starts.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("max_recipes must be at least 1 when set")]
    ZeroRecipeCap,
    #[error("toc_scan_pages must be at least 1")]
    ZeroTocScan,
    #[error("title length bounds are inverted ({min} > {max})")]
    TitleBounds { min: usize, max: usize },
    #[error("title_min_len must be at least 1")]
    ZeroTitleLength,
}

/// Unit keywords that may follow a quantity token on an ingredient line.
pub(crate) static UNIT_KEYWORDS: &[&str] = &[
    "cup", "cups", "c", "tablespoon", "tablespoons", "tbsp", "teaspoon", "teaspoons", "tsp",
    "ounce", "ounces", "oz", "pound", "pounds", "lb", "lbs", "gram", "grams", "g", "kg", "quart",
    "quarts", "qt", "pint", "pints", "pt", "gallon", "gallons", "liter", "liters", "ml", "pinch",
    "pinches", "dash", "dashes", "clove", "cloves", "stick", "sticks", "can", "cans", "package",
    "packages", "pkg", "jar", "jars", "slice", "slices", "bunch", "bunches", "head", "heads",
    "stalk", "stalks", "sprig", "sprigs", "envelope", "envelopes", "box", "boxes", "carton",
    "dozen",
];

/// Verbs that open a cooking instruction.
pub(crate) static ACTION_VERBS: &[&str] = &[
    "add", "arrange", "bake", "baste", "beat", "blend", "boil", "bring", "broil", "brown",
    "brush", "chill", "chop", "coat", "combine", "cook", "cool", "cover", "cream", "cut",
    "dissolve", "dip", "drain", "drizzle", "drop", "fill", "fold", "fry", "garnish", "grate",
    "grease", "grill", "heat", "knead", "layer", "let", "marinate", "mash", "melt", "mix",
    "peel", "place", "pour", "preheat", "press", "reduce", "refrigerate", "remove", "repeat",
    "return", "roast", "roll", "rub", "saute", "scald", "season", "serve", "set", "shake",
    "sift", "simmer", "slice", "soak", "spoon", "spread", "sprinkle", "stir", "stuff", "toss",
    "top", "transfer", "turn", "whip", "whisk",
];

/// Literal headings that open the ingredients block.
pub(crate) static INGREDIENTS_MARKERS: &[&str] =
    &["ingredients", "you will need", "what you need"];

/// Literal headings that open the instructions block.
pub(crate) static INSTRUCTIONS_MARKERS: &[&str] = &[
    "instructions",
    "directions",
    "method",
    "preparation",
    "steps",
    "to prepare",
];

/// Category headings recognized in the table of contents, in display case.
pub(crate) static TOC_CATEGORIES: &[&str] = &[
    "Appetizers",
    "Beverages",
    "Breads",
    "Breakfast",
    "Brunch",
    "Cakes",
    "Candy",
    "Casseroles",
    "Cookies",
    "Desserts",
    "Main Dishes",
    "Meats",
    "Miscellaneous",
    "Pies",
    "Pies and Pastry",
    "Poultry",
    "Salads",
    "Sandwiches",
    "Sauces",
    "Seafood",
    "Side Dishes",
    "Soups",
    "Vegetables",
];

/// Configuration for the recipe extraction pipeline.
///
/// Thresholds are configurable defaults, not fixed law; vocabularies resolve
/// [`ListOverride`]s once at build time since classification runs per line.
/// Use [`ExtractionConfigBuilder`] to construct a non-default config.
#[derive(Debug, Clone)]
pub struct ExtractionConfig {
    pub(crate) title_min_len: usize,
    pub(crate) title_max_len: usize,
    pub(crate) dedup_window: usize,
    pub(crate) toc_scan_pages: usize,
    pub(crate) max_recipes: Option<usize>,
    /// Lower-cased category allow-list; `None` keeps every section.
    pub(crate) category_filter: Option<Vec<String>>,
    pub(crate) parallel_sections: bool,
    pub(crate) collect_trace: bool,
    pub(crate) unit_keywords: HashSet<String>,
    pub(crate) action_verbs: HashSet<String>,
    pub(crate) ingredients_markers: Vec<String>,
    pub(crate) instructions_markers: Vec<String>,
    pub(crate) toc_categories: Vec<String>,
}

fn lowered(words: &[String]) -> HashSet<String> {
    words.iter().map(|w| w.to_lowercase()).collect()
}

fn owned(words: &[&str]) -> Vec<String> {
    words.iter().map(|w| w.to_string()).collect()
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            title_min_len: 3,
            title_max_len: 80,
            dedup_window: 5,
            toc_scan_pages: 12,
            max_recipes: None,
            category_filter: None,
            parallel_sections: false,
            collect_trace: false,
            unit_keywords: lowered(&owned(UNIT_KEYWORDS)),
            action_verbs: lowered(&owned(ACTION_VERBS)),
            ingredients_markers: owned(INGREDIENTS_MARKERS),
            instructions_markers: owned(INSTRUCTIONS_MARKERS),
            toc_categories: owned(TOC_CATEGORIES),
        }
    }
}

impl ExtractionConfig {
    pub fn title_min_len(&self) -> usize {
        self.title_min_len
    }

    pub fn title_max_len(&self) -> usize {
        self.title_max_len
    }

    pub fn dedup_window(&self) -> usize {
        self.dedup_window
    }

    pub fn toc_scan_pages(&self) -> usize {
        self.toc_scan_pages
    }

    pub fn max_recipes(&self) -> Option<usize> {
        self.max_recipes
    }

    /// Which block a marker line opens, or `None` if the line is not a
    /// marker. Matching is case-insensitive with an optional trailing colon.
    pub fn marker_kind(&self, line: &str) -> Option<MarkerKind> {
        let key = line.trim().trim_end_matches(':').trim().to_lowercase();
        if key.is_empty() {
            return None;
        }
        if self.ingredients_markers.iter().any(|m| m.to_lowercase() == key) {
            return Some(MarkerKind::Ingredients);
        }
        if self.instructions_markers.iter().any(|m| m.to_lowercase() == key) {
            return Some(MarkerKind::Instructions);
        }
        None
    }

    /// Whether `word` is a measurement unit, ignoring case and trailing
    /// punctuation (`"cups,"`, `"tsp."`).
    pub fn is_unit_keyword(&self, word: &str) -> bool {
        let key = word
            .trim_matches(|c: char| c == '.' || c == ',' || c == ';' || c == ':')
            .to_lowercase();
        !key.is_empty() && self.unit_keywords.contains(&key)
    }

    /// Whether `word` opens a cooking instruction, ignoring case and
    /// trailing punctuation.
    pub fn is_action_verb(&self, word: &str) -> bool {
        let key = word
            .trim_matches(|c: char| !c.is_alphanumeric())
            .to_lowercase();
        !key.is_empty() && self.action_verbs.contains(&key)
    }

    /// Canonical display name for a TOC category heading, if `line` is one.
    pub fn toc_category(&self, line: &str) -> Option<&str> {
        let key = line.trim().trim_end_matches(':').trim().to_lowercase();
        self.toc_categories
            .iter()
            .find(|c| c.to_lowercase() == key)
            .map(|c| c.as_str())
    }

    /// Whether the category allow-list (if any) keeps this category.
    pub fn keeps_category(&self, category: &str) -> bool {
        match &self.category_filter {
            Some(allow) => allow.iter().any(|a| a == &category.to_lowercase()),
            None => true,
        }
    }
}

/// Builder for [`ExtractionConfig`].
///
/// Fails fast with [`ConfigError`] on invalid thresholds, before any run
/// starts.
#[derive(Debug, Clone, Default)]
pub struct ExtractionConfigBuilder {
    title_min_len: Option<usize>,
    title_max_len: Option<usize>,
    dedup_window: Option<usize>,
    toc_scan_pages: Option<usize>,
    max_recipes: Option<usize>,
    category_filter: Option<Vec<String>>,
    parallel_sections: Option<bool>,
    collect_trace: Option<bool>,
    unit_keywords: ListOverride<String>,
    action_verbs: ListOverride<String>,
    ingredients_markers: ListOverride<String>,
    instructions_markers: ListOverride<String>,
    toc_categories: ListOverride<String>,
}

impl ExtractionConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    // ── Thresholds ──

    pub fn title_length_bounds(mut self, min: usize, max: usize) -> Self {
        self.title_min_len = Some(min);
        self.title_max_len = Some(max);
        self
    }

    pub fn dedup_window(mut self, pages: usize) -> Self {
        self.dedup_window = Some(pages);
        self
    }

    pub fn toc_scan_pages(mut self, pages: usize) -> Self {
        self.toc_scan_pages = Some(pages);
        self
    }

    pub fn max_recipes(mut self, cap: usize) -> Self {
        self.max_recipes = Some(cap);
        self
    }

    pub fn category_filter(mut self, categories: Vec<String>) -> Self {
        self.category_filter = Some(categories);
        self
    }

    pub fn parallel_sections(mut self, enabled: bool) -> Self {
        self.parallel_sections = Some(enabled);
        self
    }

    /// Collect a per-line classification trace (kind + matched rule) for
    /// diagnostics.
    pub fn trace(mut self, enabled: bool) -> Self {
        self.collect_trace = Some(enabled);
        self
    }

    // ── Vocabularies ──

    pub fn set_unit_keywords(mut self, words: Vec<String>) -> Self {
        self.unit_keywords = ListOverride::Replace(words);
        self
    }

    pub fn add_unit_keyword(mut self, word: String) -> Self {
        extend(&mut self.unit_keywords, word);
        self
    }

    pub fn set_action_verbs(mut self, verbs: Vec<String>) -> Self {
        self.action_verbs = ListOverride::Replace(verbs);
        self
    }

    pub fn add_action_verb(mut self, verb: String) -> Self {
        extend(&mut self.action_verbs, verb);
        self
    }

    pub fn set_ingredients_markers(mut self, markers: Vec<String>) -> Self {
        self.ingredients_markers = ListOverride::Replace(markers);
        self
    }

    pub fn add_ingredients_marker(mut self, marker: String) -> Self {
        extend(&mut self.ingredients_markers, marker);
        self
    }

    pub fn set_instructions_markers(mut self, markers: Vec<String>) -> Self {
        self.instructions_markers = ListOverride::Replace(markers);
        self
    }

    pub fn add_instructions_marker(mut self, marker: String) -> Self {
        extend(&mut self.instructions_markers, marker);
        self
    }

    pub fn set_toc_categories(mut self, categories: Vec<String>) -> Self {
        self.toc_categories = ListOverride::Replace(categories);
        self
    }

    pub fn add_toc_category(mut self, category: String) -> Self {
        extend(&mut self.toc_categories, category);
        self
    }

    /// Validate thresholds and resolve vocabularies into an
    /// [`ExtractionConfig`].
    pub fn build(self) -> Result<ExtractionConfig, ConfigError> {
        let defaults = ExtractionConfig::default();

        let title_min_len = self.title_min_len.unwrap_or(defaults.title_min_len);
        let title_max_len = self.title_max_len.unwrap_or(defaults.title_max_len);
        if title_min_len == 0 {
            return Err(ConfigError::ZeroTitleLength);
        }
        if title_min_len > title_max_len {
            return Err(ConfigError::TitleBounds {
                min: title_min_len,
                max: title_max_len,
            });
        }
        if self.max_recipes == Some(0) {
            return Err(ConfigError::ZeroRecipeCap);
        }
        let toc_scan_pages = self.toc_scan_pages.unwrap_or(defaults.toc_scan_pages);
        if toc_scan_pages == 0 {
            return Err(ConfigError::ZeroTocScan);
        }

        Ok(ExtractionConfig {
            title_min_len,
            title_max_len,
            dedup_window: self.dedup_window.unwrap_or(defaults.dedup_window),
            toc_scan_pages,
            max_recipes: self.max_recipes,
            category_filter: self
                .category_filter
                .map(|list| list.into_iter().map(|c| c.to_lowercase()).collect()),
            parallel_sections: self.parallel_sections.unwrap_or(false),
            collect_trace: self.collect_trace.unwrap_or(false),
            unit_keywords: lowered(&self.unit_keywords.resolve(&owned(UNIT_KEYWORDS))),
            action_verbs: lowered(&self.action_verbs.resolve(&owned(ACTION_VERBS))),
            ingredients_markers: self
                .ingredients_markers
                .resolve(&owned(INGREDIENTS_MARKERS)),
            instructions_markers: self
                .instructions_markers
                .resolve(&owned(INSTRUCTIONS_MARKERS)),
            toc_categories: self.toc_categories.resolve(&owned(TOC_CATEGORIES)),
        })
    }
}

fn extend(slot: &mut ListOverride<String>, value: String) {
    match slot {
        ListOverride::Extend(v) => v.push(value),
        _ => *slot = ListOverride::Extend(vec![value]),
    }
}
