use once_cell::sync::Lazy;
use regex::Regex;

use ladle_core::LineKind;

use crate::config::ExtractionConfig;

/// Outcome of classifying one line: the kind plus the rule that matched.
/// The rule name feeds the diagnostic trace.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Classification {
    pub kind: LineKind,
    pub rule: &'static str,
}

/// One entry in the ordered classification rule table.
struct Rule {
    name: &'static str,
    kind: LineKind,
    matches: fn(&str, &ExtractionConfig) -> bool,
}

/// Fixed-precedence rule table. First matching rule wins; no backtracking.
static RULES: &[Rule] = &[
    Rule {
        name: "section-marker",
        kind: LineKind::SectionMarker,
        matches: is_section_marker,
    },
    Rule {
        name: "numbered-step",
        kind: LineKind::InstructionLine,
        matches: is_numbered_step,
    },
    Rule {
        name: "ingredient-quantity",
        kind: LineKind::IngredientLine,
        matches: is_ingredient_line,
    },
    Rule {
        name: "title-candidate",
        kind: LineKind::TitleCandidate,
        matches: is_title_candidate,
    },
    Rule {
        name: "blank",
        kind: LineKind::Blank,
        matches: is_blank,
    },
];

/// Label a line of page text. Pure function of the line and the config.
pub fn classify_line(line: &str, config: &ExtractionConfig) -> Classification {
    for rule in RULES {
        if (rule.matches)(line, config) {
            return Classification {
                kind: rule.kind,
                rule: rule.name,
            };
        }
    }
    Classification {
        kind: LineKind::BodyText,
        rule: "body-text",
    }
}

fn is_blank(line: &str, _config: &ExtractionConfig) -> bool {
    line.trim().is_empty()
}

fn is_section_marker(line: &str, config: &ExtractionConfig) -> bool {
    config.marker_kind(line).is_some()
}

static NUMBERED_STEP_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\s*\d{1,2}[.)]\s+\S").unwrap());

fn is_numbered_step(line: &str, _config: &ExtractionConfig) -> bool {
    NUMBERED_STEP_RE.is_match(line)
}

/// Vulgar fraction glyphs accepted as a quantity prefix.
const FRACTION_GLYPHS: &[char] = &[
    '¼', '½', '¾', '⅐', '⅑', '⅒', '⅓', '⅔', '⅕', '⅖', '⅗', '⅘', '⅙', '⅚', '⅛', '⅜', '⅝', '⅞',
];

static SPELLED_FRACTIONS: &[&str] = &[
    "half",
    "one-half",
    "quarter",
    "one-quarter",
    "third",
    "one-third",
    "two-thirds",
    "three-quarters",
];

static ASCII_FRACTION_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d+/\d+$").unwrap());

/// Whether a token reads as a quantity: `2`, `1/2`, `1½`, `half`.
pub(crate) fn is_quantity_token(token: &str) -> bool {
    let t = token.trim_matches(|c: char| c == '.' || c == ',');
    if t.is_empty() {
        return false;
    }
    if t.chars().all(|c| c.is_ascii_digit()) {
        return true;
    }
    if ASCII_FRACTION_RE.is_match(t) {
        return true;
    }
    if t.chars().any(|c| c.is_ascii_digit())
        && t.chars()
            .all(|c| c.is_ascii_digit() || FRACTION_GLYPHS.contains(&c))
    {
        return true;
    }
    SPELLED_FRACTIONS.contains(&t.to_lowercase().as_str())
}

fn is_ingredient_line(line: &str, config: &ExtractionConfig) -> bool {
    let mut words = line.split_whitespace();
    let Some(first) = words.next() else {
        return false;
    };
    // A bare fraction-glyph prefix is enough on its own ("½ apple, diced").
    if first
        .chars()
        .next()
        .is_some_and(|c| FRACTION_GLYPHS.contains(&c))
    {
        return true;
    }
    if !is_quantity_token(first) {
        return false;
    }
    let Some(second) = words.next() else {
        return false;
    };
    config.is_unit_keyword(second)
}

/// Minor words exempt from the capitalization requirement in title case.
static MINOR_WORDS: &[&str] = &[
    "a", "an", "and", "at", "de", "for", "in", "la", "n", "of", "on", "or", "the", "to", "with",
];

fn is_title_case(text: &str) -> bool {
    let mut significant = 0usize;
    for (i, word) in text.split_whitespace().enumerate() {
        let Some(first_alpha) = word.chars().find(|c| c.is_alphabetic()) else {
            continue;
        };
        if i > 0 && MINOR_WORDS.contains(&word.to_lowercase().as_str()) {
            continue;
        }
        if first_alpha.is_lowercase() {
            return false;
        }
        significant += 1;
    }
    significant > 0
}

fn is_all_caps(text: &str) -> bool {
    text.chars().any(|c| c.is_alphabetic()) && !text.chars().any(|c| c.is_lowercase())
}

fn is_title_candidate(line: &str, config: &ExtractionConfig) -> bool {
    let trimmed = line.trim();
    let len = trimmed.chars().count();
    if len < config.title_min_len || len > config.title_max_len {
        return false;
    }
    if trimmed.starts_with(|c: char| c.is_ascii_digit()) {
        return false;
    }
    let Some(first_word) = trimmed.split_whitespace().next() else {
        return false;
    };
    if config.is_unit_keyword(first_word) || is_quantity_token(first_word) {
        return false;
    }
    if trimmed.ends_with(['.', '!', '?', ',', ';', ':']) {
        return false;
    }
    is_title_case(trimmed) || is_all_caps(trimmed)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classify(line: &str) -> Classification {
        classify_line(line, &ExtractionConfig::default())
    }

    #[test]
    fn blank_lines() {
        assert_eq!(classify("").kind, LineKind::Blank);
        assert_eq!(classify("   \t ").kind, LineKind::Blank);
    }

    #[test]
    fn section_markers_beat_everything() {
        assert_eq!(classify("Ingredients").kind, LineKind::SectionMarker);
        assert_eq!(classify("DIRECTIONS:").kind, LineKind::SectionMarker);
        assert_eq!(classify("  Method  ").kind, LineKind::SectionMarker);
    }

    #[test]
    fn numbered_steps() {
        assert_eq!(classify("1. Stir the oats.").kind, LineKind::InstructionLine);
        assert_eq!(classify("12) Bake at 350.").kind, LineKind::InstructionLine);
        // A 4-digit "step" is a year or page artifact, not a step
        assert_eq!(classify("1998. A fine vintage").kind, LineKind::BodyText);
    }

    #[test]
    fn ingredient_lines() {
        assert_eq!(classify("1 cup rolled oats").kind, LineKind::IngredientLine);
        assert_eq!(classify("½ cup milk").kind, LineKind::IngredientLine);
        assert_eq!(classify("1/2 tsp. vanilla").kind, LineKind::IngredientLine);
        assert_eq!(classify("2 Tablespoons butter").kind, LineKind::IngredientLine);
        assert_eq!(classify("1½ cups flour").kind, LineKind::IngredientLine);
        // Bare fraction glyph needs no unit
        assert_eq!(classify("½ apple, diced").kind, LineKind::IngredientLine);
        // Quantity without a unit is not an ingredient line
        assert_eq!(classify("2 eggs").kind, LineKind::BodyText);
    }

    #[test]
    fn numbered_step_outranks_ingredient_heuristics() {
        // "1." reads as a step prefix even though "cup" follows
        assert_eq!(classify("1. cup the berries gently").kind, LineKind::InstructionLine);
    }

    #[test]
    fn title_candidates() {
        assert_eq!(classify("Overnight Oats").kind, LineKind::TitleCandidate);
        assert_eq!(classify("GRANDMA'S APPLE PIE").kind, LineKind::TitleCandidate);
        assert_eq!(classify("Chicken and Dumplings").kind, LineKind::TitleCandidate);
    }

    #[test]
    fn titles_reject_sentence_punctuation() {
        assert_eq!(classify("Stir well and serve.").kind, LineKind::BodyText);
        assert_eq!(classify("Delicious!").kind, LineKind::BodyText);
    }

    #[test]
    fn titles_reject_leading_digits_and_measurements() {
        assert_eq!(classify("350 Degrees For An Hour").kind, LineKind::BodyText);
        assert_eq!(classify("Cup For Cup Substitutions").kind, LineKind::BodyText);
    }

    #[test]
    fn titles_reject_out_of_bounds_length() {
        assert_eq!(classify("Ox").kind, LineKind::BodyText);
        let long = "A ".repeat(41) + "Pie";
        assert_eq!(classify(&long).kind, LineKind::BodyText);
    }

    #[test]
    fn lowercase_prose_is_body_text() {
        assert_eq!(
            classify("combine everything in a large bowl").kind,
            LineKind::BodyText
        );
    }

    #[test]
    fn matched_rule_name_is_reported() {
        assert_eq!(classify("Ingredients").rule, "section-marker");
        assert_eq!(classify("1 cup sugar").rule, "ingredient-quantity");
        assert_eq!(classify("Overnight Oats").rule, "title-candidate");
        assert_eq!(classify("plain prose here").rule, "body-text");
    }

    #[test]
    fn quantity_tokens() {
        assert!(is_quantity_token("2"));
        assert!(is_quantity_token("10"));
        assert!(is_quantity_token("1/2"));
        assert!(is_quantity_token("1½"));
        assert!(is_quantity_token("half"));
        assert!(!is_quantity_token("dozenish"));
        assert!(!is_quantity_token(""));
        assert!(!is_quantity_token("a"));
    }
}
