use std::io::Write;

use ladle_core::{ExtractionStats, RecipeRecord, SectionRange};
use ladle_parsing::LineTrace;
use owo_colors::OwoColorize;

/// Whether to use colored output.
#[derive(Debug, Clone, Copy)]
pub struct ColorMode(pub bool);

impl ColorMode {
    pub fn enabled(&self) -> bool {
        self.0
    }
}

/// Print the accepted recipes, one per line with category and page.
pub fn print_recipes(
    w: &mut dyn Write,
    recipes: &[RecipeRecord],
    color: ColorMode,
) -> std::io::Result<()> {
    for recipe in recipes {
        if color.enabled() {
            writeln!(
                w,
                "{} {} {} (p. {})",
                "+".green(),
                recipe.title.bold(),
                format!("[{}]", recipe.category).dimmed(),
                recipe.page_number
            )?;
        } else {
            writeln!(
                w,
                "+ {} [{}] (p. {})",
                recipe.title, recipe.category, recipe.page_number
            )?;
        }
    }
    Ok(())
}

/// Print the run summary after extraction.
pub fn print_summary(
    w: &mut dyn Write,
    stats: &ExtractionStats,
    color: ColorMode,
) -> std::io::Result<()> {
    writeln!(w)?;
    writeln!(
        w,
        "Processed {} pages, found {} candidates",
        stats.pages_processed, stats.recipes_found
    )?;
    writeln!(w, "Accepted {} recipes", stats.recipes_validated)?;

    let noise = format!(
        "(Dropped {} duplicates, {} validation failures, {} unreadable pages)",
        stats.duplicates_found, stats.validation_failures, stats.page_failures
    );
    if stats.errors_encountered() + stats.duplicates_found > 0 {
        if color.enabled() {
            writeln!(w, "{}", noise.dimmed())?;
        } else {
            writeln!(w, "{}", noise)?;
        }
    }
    Ok(())
}

/// Print detected TOC section ranges.
pub fn print_sections(
    w: &mut dyn Write,
    sections: &[SectionRange],
    color: ColorMode,
) -> std::io::Result<()> {
    for section in sections {
        if color.enabled() {
            writeln!(
                w,
                "{}  pages {}-{}",
                section.category_name.bold(),
                section.start_page,
                section.end_page
            )?;
        } else {
            writeln!(
                w,
                "{}  pages {}-{}",
                section.category_name, section.start_page, section.end_page
            )?;
        }
    }
    Ok(())
}

/// Print the per-line classification trace. Diagnostic output only.
pub fn print_trace(
    w: &mut dyn Write,
    trace: &[LineTrace],
    color: ColorMode,
) -> std::io::Result<()> {
    for entry in trace {
        let line = format!(
            "p{:<4} l{:<4} {:<18} {}",
            entry.page_number,
            entry.line_index,
            format!("{:?}", entry.kind),
            entry.rule
        );
        if color.enabled() {
            writeln!(w, "{}", line.dimmed())?;
        } else {
            writeln!(w, "{}", line)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    use ladle_core::ValidationResult;

    fn record(title: &str, page: usize) -> RecipeRecord {
        RecipeRecord {
            title: title.to_string(),
            category: "Desserts".to_string(),
            page_number: page,
            ingredients_text: "1 cup sugar".to_string(),
            instructions_text: "1. Mix.".to_string(),
            validation: ValidationResult {
                is_valid: true,
                failed_rules: BTreeSet::new(),
            },
        }
    }

    #[test]
    fn recipes_render_without_color() {
        let mut buf = Vec::new();
        print_recipes(&mut buf, &[record("Pecan Pie", 12)], ColorMode(false)).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert!(text.contains("Pecan Pie"));
        assert!(text.contains("[Desserts]"));
        assert!(text.contains("(p. 12)"));
    }

    #[test]
    fn summary_mentions_noise_only_when_present() {
        let mut clean = Vec::new();
        print_summary(&mut clean, &ExtractionStats::default(), ColorMode(false)).unwrap();
        let text = String::from_utf8(clean).unwrap();
        assert!(!text.contains("Dropped"));

        let mut noisy = Vec::new();
        let stats = ExtractionStats {
            duplicates_found: 2,
            ..Default::default()
        };
        print_summary(&mut noisy, &stats, ColorMode(false)).unwrap();
        let text = String::from_utf8(noisy).unwrap();
        assert!(text.contains("Dropped 2 duplicates"));
    }
}
