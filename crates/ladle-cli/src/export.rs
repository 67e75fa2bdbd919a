use std::io::Write;
use std::path::Path;

use serde::Serialize;

use ladle_core::{ExtractionStats, RecipeRecord};
use ladle_parsing::RunReport;

/// Supported export formats for `--output`.
#[derive(clap::ValueEnum, Clone, Copy, Debug)]
pub enum ExportFormat {
    Json,
    Csv,
}

#[derive(Serialize)]
struct ExportDoc<'a> {
    stats: &'a ExtractionStats,
    recipes: &'a [RecipeRecord],
}

/// Export a run's accepted recipes and stats to the given path.
pub fn export_report(
    report: &RunReport,
    format: ExportFormat,
    path: &Path,
) -> std::io::Result<()> {
    let content = match format {
        ExportFormat::Json => export_json(report)?,
        ExportFormat::Csv => export_csv(report),
    };
    let mut file = std::fs::File::create(path)?;
    file.write_all(content.as_bytes())
}

fn export_json(report: &RunReport) -> std::io::Result<String> {
    let doc = ExportDoc {
        stats: &report.stats,
        recipes: &report.recipes,
    };
    serde_json::to_string_pretty(&doc).map_err(std::io::Error::other)
}

fn export_csv(report: &RunReport) -> String {
    let mut out = String::from("title,category,page,valid,ingredients,instructions\n");
    for recipe in &report.recipes {
        out.push_str(&format!(
            "{},{},{},{},{},{}\n",
            csv_field(&recipe.title),
            csv_field(&recipe.category),
            recipe.page_number,
            recipe.validation.is_valid,
            csv_field(&recipe.ingredients_text),
            csv_field(&recipe.instructions_text),
        ));
    }
    out
}

/// Quote a CSV field, doubling embedded quotes and flattening newlines.
fn csv_field(value: &str) -> String {
    let flat = value.replace('\n', " / ");
    format!("\"{}\"", flat.replace('"', "\"\""))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    use ladle_core::ValidationResult;

    fn report_with_one_recipe() -> RunReport {
        RunReport {
            recipes: vec![RecipeRecord {
                title: "Overnight \"Famous\" Oats".to_string(),
                category: "Breakfast".to_string(),
                page_number: 4,
                ingredients_text: "1 cup oats\n½ cup milk".to_string(),
                instructions_text: "1. Stir and chill.".to_string(),
                validation: ValidationResult {
                    is_valid: true,
                    failed_rules: BTreeSet::new(),
                },
            }],
            stats: ExtractionStats {
                pages_processed: 1,
                recipes_found: 1,
                recipes_validated: 1,
                ..Default::default()
            },
            sections: Vec::new(),
            trace: Vec::new(),
        }
    }

    #[test]
    fn json_roundtrips_through_serde() {
        let report = report_with_one_recipe();
        let json = export_json(&report).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["recipes"][0]["title"], "Overnight \"Famous\" Oats");
        assert_eq!(value["recipes"][0]["page_number"], 4);
        assert_eq!(value["stats"]["recipes_validated"], 1);
    }

    #[test]
    fn csv_escapes_quotes_and_newlines() {
        let report = report_with_one_recipe();
        let csv = export_csv(&report);
        let mut lines = csv.lines();
        assert_eq!(
            lines.next().unwrap(),
            "title,category,page,valid,ingredients,instructions"
        );
        let row = lines.next().unwrap();
        assert!(row.contains("\"Overnight \"\"Famous\"\" Oats\""));
        assert!(row.contains("1 cup oats / ½ cup milk"));
    }
}
