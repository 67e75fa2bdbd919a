use std::collections::BTreeSet;

use once_cell::sync::Lazy;
use regex::Regex;

use ladle_core::{CandidateRecipe, ValidationResult};

use crate::config::ExtractionConfig;

/// One entry in the validation rule table. `passes` returns `true` when the
/// candidate satisfies the rule.
struct ValidationRule {
    name: &'static str,
    passes: fn(&CandidateRecipe, &ExtractionConfig) -> bool,
}

/// Structural plausibility rules. All must pass for a candidate to be valid;
/// each failure is recorded by name.
static RULES: &[ValidationRule] = &[
    ValidationRule {
        name: "empty_ingredients",
        passes: has_ingredients,
    },
    ValidationRule {
        name: "empty_instructions",
        passes: has_instructions,
    },
    ValidationRule {
        name: "title_length",
        passes: title_length_in_bounds,
    },
    ValidationRule {
        name: "title_all_noise",
        passes: title_has_substance,
    },
    ValidationRule {
        name: "no_action_verb",
        passes: has_action_verb_line,
    },
    ValidationRule {
        name: "ingredients_look_like_instructions",
        passes: ingredients_not_dominated_by_steps,
    },
];

/// Apply all structural rules to a candidate.
pub fn validate_candidate(
    candidate: &CandidateRecipe,
    config: &ExtractionConfig,
) -> ValidationResult {
    let failed_rules: BTreeSet<&'static str> = RULES
        .iter()
        .filter(|rule| !(rule.passes)(candidate, config))
        .map(|rule| rule.name)
        .collect();
    ValidationResult {
        is_valid: failed_rules.is_empty(),
        failed_rules,
    }
}

fn has_ingredients(candidate: &CandidateRecipe, _config: &ExtractionConfig) -> bool {
    !candidate.ingredients_text.trim().is_empty()
}

fn has_instructions(candidate: &CandidateRecipe, _config: &ExtractionConfig) -> bool {
    !candidate.instructions_text.trim().is_empty()
}

fn title_length_in_bounds(candidate: &CandidateRecipe, config: &ExtractionConfig) -> bool {
    let len = candidate.title.trim().chars().count();
    len >= config.title_min_len && len <= config.title_max_len
}

fn title_has_substance(candidate: &CandidateRecipe, _config: &ExtractionConfig) -> bool {
    candidate.title.chars().any(|c| c.is_alphabetic())
}

static STEP_PREFIX_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\s*\d{1,2}[.)]\s*").unwrap());

/// At least one instruction line opens with an action verb, after stripping
/// any numbered-step prefix.
fn has_action_verb_line(candidate: &CandidateRecipe, config: &ExtractionConfig) -> bool {
    candidate.instructions_text.lines().any(|line| {
        let stripped = STEP_PREFIX_RE.replace(line, "");
        stripped
            .split_whitespace()
            .next()
            .is_some_and(|word| config.is_action_verb(word))
    })
}

static NUMBERED_LINE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\s*\d{1,2}[.)]\s+\S").unwrap());

/// The ingredients block must not read like an instructions block: more than
/// half its lines carrying a numbered-step prefix fails the candidate.
fn ingredients_not_dominated_by_steps(
    candidate: &CandidateRecipe,
    _config: &ExtractionConfig,
) -> bool {
    let lines: Vec<&str> = candidate
        .ingredients_text
        .lines()
        .filter(|l| !l.trim().is_empty())
        .collect();
    if lines.is_empty() {
        // Covered by empty_ingredients.
        return true;
    }
    let step_like = lines
        .iter()
        .filter(|l| NUMBERED_LINE_RE.is_match(l))
        .count();
    step_like * 2 <= lines.len()
}
