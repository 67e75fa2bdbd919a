use std::io::Write;
use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use signal_hook::consts::SIGINT;
use signal_hook::iterator::Signals;
use tokio_util::sync::CancellationToken;

mod export;
mod output;

use export::ExportFormat;
use ladle_core::config_file::{self, ConfigFile};
use ladle_core::RunEvent;
use ladle_parsing::{ExtractionConfig, ExtractionConfigBuilder, RecipeExtractor, index_toc};
use output::ColorMode;

/// Cookbook recipe extractor - turn scanned cookbook page text into structured recipes
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Extract recipes from a document (plain-text file or page directory)
    Extract {
        /// Path to the document: a form-feed-paginated text file or a
        /// directory with one .txt file per page
        document: PathBuf,

        /// Stop after this many accepted recipes
        #[arg(long)]
        max_recipes: Option<usize>,

        /// Only extract the given categories (repeatable)
        #[arg(long = "category")]
        categories: Vec<String>,

        /// Print a per-line classification trace (kind + matched rule)
        #[arg(long)]
        trace: bool,

        /// Pages of front matter to scan for a table of contents
        #[arg(long)]
        toc_pages: Option<usize>,

        /// Page-distance window for duplicate detection
        #[arg(long)]
        dedup_window: Option<usize>,

        /// Scan independent sections in parallel
        #[arg(long)]
        parallel: bool,

        /// Output format for --output
        #[arg(long, value_enum, default_value_t = ExportFormat::Json)]
        format: ExportFormat,

        /// Write accepted recipes to this path
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Disable colored output
        #[arg(long)]
        no_color: bool,
    },

    /// Show the section ranges detected from the table of contents
    Toc {
        /// Path to the document
        document: PathBuf,

        /// Pages of front matter to scan for a table of contents
        #[arg(long)]
        toc_pages: Option<usize>,

        /// Disable colored output
        #[arg(long)]
        no_color: bool,
    },
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Command::Extract {
            document,
            max_recipes,
            categories,
            trace,
            toc_pages,
            dedup_window,
            parallel,
            format,
            output,
            no_color,
        } => extract(
            document,
            max_recipes,
            categories,
            trace,
            toc_pages,
            dedup_window,
            parallel,
            format,
            output,
            no_color,
        ),
        Command::Toc {
            document,
            toc_pages,
            no_color,
        } => show_toc(document, toc_pages, no_color),
    }
}

#[allow(clippy::too_many_arguments)]
fn extract(
    document: PathBuf,
    max_recipes: Option<usize>,
    categories: Vec<String>,
    trace: bool,
    toc_pages: Option<usize>,
    dedup_window: Option<usize>,
    parallel: bool,
    format: ExportFormat,
    output: Option<PathBuf>,
    no_color: bool,
) -> anyhow::Result<()> {
    let file_config = config_file::load_config();
    let config = build_config(
        &file_config,
        max_recipes,
        categories,
        trace,
        toc_pages,
        dedup_window,
        parallel,
    )?;

    let provider = ladle_ingest::open_document(&document)
        .with_context(|| format!("opening {}", document.display()))?;

    let cancel = CancellationToken::new();
    let mut signals = Signals::new([SIGINT]).context("installing signal handler")?;
    let handler_token = cancel.clone();
    std::thread::spawn(move || {
        if signals.forever().next().is_some() {
            handler_token.cancel();
        }
    });

    let bar = ProgressBar::new(provider.page_count() as u64);
    bar.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .unwrap()
            .progress_chars("#>-"),
    );

    let extractor = RecipeExtractor::with_config(config);
    let report = extractor.run(provider.as_ref(), &cancel, |event| match event {
        RunEvent::PageProcessed { .. } | RunEvent::PageFailed { .. } => bar.inc(1),
        RunEvent::RecipeAccepted { title, .. } => bar.set_message(title),
        _ => {}
    });
    bar.finish_and_clear();

    let color = ColorMode(!no_color);
    let stdout = std::io::stdout();
    let mut out = stdout.lock();

    if trace {
        output::print_trace(&mut out, &report.trace, color)?;
    }
    output::print_recipes(&mut out, &report.recipes, color)?;
    output::print_summary(&mut out, &report.stats, color)?;
    if cancel.is_cancelled() {
        writeln!(out, "Run interrupted; results above are partial.")?;
    }

    if let Some(path) = output {
        export::export_report(&report, format, &path)
            .with_context(|| format!("writing {}", path.display()))?;
        writeln!(out, "Wrote {} recipes to {}", report.recipes.len(), path.display())?;
    }

    Ok(())
}

fn show_toc(document: PathBuf, toc_pages: Option<usize>, no_color: bool) -> anyhow::Result<()> {
    let file_config = config_file::load_config();
    let config = build_config(&file_config, None, Vec::new(), false, toc_pages, None, false)?;
    let provider = ladle_ingest::open_document(&document)
        .with_context(|| format!("opening {}", document.display()))?;

    let color = ColorMode(!no_color);
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    match index_toc(provider.as_ref(), &config) {
        Ok(sections) => output::print_sections(&mut out, &sections, color)?,
        Err(e) => writeln!(out, "{} (falling back to a full-document scan)", e)?,
    }
    Ok(())
}

/// Layer CLI flags over the config file over built-in defaults.
fn build_config(
    file: &ConfigFile,
    max_recipes: Option<usize>,
    categories: Vec<String>,
    trace: bool,
    toc_pages: Option<usize>,
    dedup_window: Option<usize>,
    parallel: bool,
) -> anyhow::Result<ExtractionConfig> {
    let limits = file.limits.clone().unwrap_or_default();
    let mut builder = ExtractionConfigBuilder::new();

    if limits.title_min_len.is_some() || limits.title_max_len.is_some() {
        builder = builder.title_length_bounds(
            limits.title_min_len.unwrap_or(3),
            limits.title_max_len.unwrap_or(80),
        );
    }
    if let Some(window) = dedup_window.or(limits.dedup_window) {
        builder = builder.dedup_window(window);
    }
    if let Some(pages) = toc_pages.or(limits.toc_scan_pages) {
        builder = builder.toc_scan_pages(pages);
    }
    if let Some(cap) = max_recipes {
        builder = builder.max_recipes(cap);
    }
    if !categories.is_empty() {
        builder = builder.category_filter(categories);
    }
    builder = builder
        .parallel_sections(parallel || limits.parallel_sections.unwrap_or(false))
        .trace(trace);

    if let Some(vocabulary) = &file.vocabulary {
        for unit in vocabulary.extra_units.iter().flatten() {
            builder = builder.add_unit_keyword(unit.clone());
        }
        for verb in vocabulary.extra_action_verbs.iter().flatten() {
            builder = builder.add_action_verb(verb.clone());
        }
        for category in vocabulary.extra_categories.iter().flatten() {
            builder = builder.add_toc_category(category.clone());
        }
        for marker in vocabulary.extra_ingredients_markers.iter().flatten() {
            builder = builder.add_ingredients_marker(marker.clone());
        }
        for marker in vocabulary.extra_instructions_markers.iter().flatten() {
            builder = builder.add_instructions_marker(marker.clone());
        }
    }

    builder.build().context("invalid configuration")
}
