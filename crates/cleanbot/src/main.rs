//! CLI entry point for the tabular cleaning pipeline.

use anyhow::{Context, Result, anyhow};
use clap::Parser;
use cleanbot::{
    CleaningConfig, CleaningOutcome, DataProfiler, FillPlan, FillStrategy, Pipeline,
    SessionHistory,
};
use std::path::{Path, PathBuf};
use tracing::{error, info};

#[derive(Parser, Debug)]
#[command(
    version,
    about = "Tabular data cleaning pipeline",
    long_about = "Removes duplicate rows, fills missing values, normalizes column names, \
                  coerces column types and filters z-score outliers.\n\n\
                  EXAMPLES:\n  \
                  # Clean with the default plan (missing values left as is)\n  \
                  cleanbot -i sales.csv\n\n  \
                  # Choose strategies per column\n  \
                  cleanbot -i sales.csv --fill age=median --fill 'city=constant:Unknown'\n\n  \
                  # Preview which columns need a strategy\n  \
                  cleanbot -i sales.xlsx --dry-run"
)]
struct Args {
    /// Path to the file to clean (.csv, .tsv, .txt, .xlsx, .xlsm, .xls, .ods)
    #[arg(short, long)]
    input: String,

    /// Output directory for the cleaned file
    #[arg(short, long, default_value = "./outputs")]
    output: String,

    /// Fill strategy for one column, as COLUMN=STRATEGY
    ///
    /// STRATEGY is one of median, mean, mode, leave or constant:<value>.
    /// May be given more than once.
    #[arg(long = "fill", value_name = "COLUMN=STRATEGY")]
    fills: Vec<String>,

    /// JSON file holding a complete fill plan
    ///
    /// Entries given with --fill override entries from the file.
    #[arg(long)]
    plan: Option<String>,

    /// Strategy for columns with missing values and no explicit entry
    #[arg(long)]
    default_fill: Option<String>,

    /// Normalize text cells (lower-case, strip punctuation, capitalize)
    #[arg(long)]
    normalize_text: bool,

    /// Absolute z-score above which a row is removed
    #[arg(long, default_value = "3.0")]
    outlier_threshold: f64,

    /// Field separator for delimited input and output
    #[arg(long, default_value = ",")]
    separator: char,

    /// Show the table overview without cleaning
    #[arg(long)]
    dry_run: bool,

    /// Output JSON to stdout instead of a human-readable summary
    ///
    /// Disables all progress logs; only outputs the final JSON.
    #[arg(long)]
    json: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: String,

    /// Suppress progress output (only show errors and final result)
    #[arg(short, long)]
    quiet: bool,
}

/// Initialize the tracing subscriber for logging.
///
/// When `json_output` is true, logging is completely disabled to ensure
/// only JSON is written to stdout.
fn init_logging(level: &str, quiet: bool, json_output: bool) {
    if json_output {
        return;
    }

    use tracing_subscriber::EnvFilter;

    let effective_level = if quiet { "warn" } else { level };

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(effective_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

fn main() -> Result<()> {
    let args = Args::parse();

    init_logging(&args.log_level, args.quiet, args.json);

    let input = Path::new(&args.input);
    if !input.exists() {
        return Err(anyhow!("Input file not found: {}", args.input));
    }

    let separator = u8::try_from(args.separator)
        .map_err(|_| anyhow!("Separator must be a single ASCII character"))?;
    let config = CleaningConfig::builder()
        .normalize_text(args.normalize_text)
        .outlier_threshold(args.outlier_threshold)
        .separator(separator)
        .build()?;

    let plan = build_fill_plan(&args)?;
    let pipeline = build_pipeline(&args, config, plan)?;

    let file_name = input
        .file_name()
        .and_then(|name| name.to_str())
        .ok_or_else(|| anyhow!("Input path has no file name: {}", args.input))?;
    let bytes = std::fs::read(input).with_context(|| format!("Failed to read {}", args.input))?;

    if args.dry_run {
        return run_dry_run(&args, &pipeline, file_name, &bytes);
    }

    let mut history = SessionHistory::new();
    let outcome = match pipeline.clean_upload(file_name, &bytes, &mut history) {
        Ok(outcome) => outcome,
        Err(e) => {
            error!("Cleaning failed: {}", e);
            if args.json {
                println!("{}", serde_json::to_string_pretty(&e)?);
            }
            return Err(anyhow!("Cleaning failed: {}", e));
        }
    };

    let entry = history
        .latest()
        .ok_or_else(|| anyhow!("Cleaned file was not recorded"))?;
    let output_path = write_output(&args.output, &entry.file_name, &entry.bytes)?;

    if args.json {
        let json = serde_json::json!({
            "input_file": args.input,
            "output_file": output_path.display().to_string(),
            "created_at": entry.created_at,
            "summary": outcome.summary,
            "report": outcome.report.entries(),
        });
        println!("{}", serde_json::to_string_pretty(&json)?);
        return Ok(());
    }

    print_human_readable_summary(&outcome, &args.input, &output_path);
    Ok(())
}

/// Assemble the fill plan from `--plan`, `--fill` and `--default-fill`.
fn build_fill_plan(args: &Args) -> Result<FillPlan> {
    let mut plan = match &args.plan {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read fill plan {}", path))?;
            serde_json::from_str::<FillPlan>(&text)
                .with_context(|| format!("Invalid fill plan {}", path))?
        }
        None => FillPlan::new(),
    };

    for fill in &args.fills {
        let (column, strategy) = fill
            .split_once('=')
            .ok_or_else(|| anyhow!("Expected COLUMN=STRATEGY, got '{}'", fill))?;
        let strategy: FillStrategy = strategy.parse()?;
        plan = plan.with(column.trim(), strategy);
    }

    if let Some(default) = &args.default_fill {
        plan = plan.with_default(default.parse()?);
    }

    Ok(plan)
}

fn build_pipeline(args: &Args, config: CleaningConfig, plan: FillPlan) -> Result<Pipeline> {
    let mut builder = Pipeline::builder().config(config).fill_plan(plan);

    if !args.quiet && !args.json {
        builder = builder.on_progress(|update| {
            info!(
                "[{:.0}%] {}: {}",
                update.progress * 100.0,
                update.stage.display_name(),
                update.message
            );
        });
    }

    Ok(builder.build()?)
}

/// Write the cleaned bytes into `output_dir`, creating it if needed.
fn write_output(output_dir: &str, file_name: &str, bytes: &[u8]) -> Result<PathBuf> {
    let dir = Path::new(output_dir);
    if !dir.exists() {
        std::fs::create_dir_all(dir)?;
        info!("Created output directory: {}", output_dir);
    }

    let path = dir.join(file_name);
    std::fs::write(&path, bytes).with_context(|| format!("Failed to write {}", path.display()))?;
    info!("Cleaned file saved: {}", path.display());
    Ok(path)
}

/// Show the table overview and the plan that would be applied.
///
/// Uses `println!` on purpose: this output is the point of `--dry-run` and
/// must not depend on the log level.
fn run_dry_run(args: &Args, pipeline: &Pipeline, file_name: &str, bytes: &[u8]) -> Result<()> {
    let df = pipeline.loader().load_bytes(file_name, bytes)?;
    let overview = DataProfiler::overview(&df)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&overview)?);
        return Ok(());
    }

    println!("\n{}", "=".repeat(80));
    println!("DRY RUN - Preview of cleaning");
    println!("{}\n", "=".repeat(80));

    println!("TABLE OVERVIEW");
    println!("{}", "-".repeat(40));
    println!("  File: {}", args.input);
    println!("  Rows: {}", overview.rows);
    println!("  Columns: {}", overview.columns);
    println!("  Duplicate rows: {}", overview.duplicate_rows);
    println!();

    println!("COLUMNS NEEDING A FILL STRATEGY");
    println!("{}", "-".repeat(40));
    let mut any_missing = false;
    for column in overview.columns_with_missing() {
        any_missing = true;
        println!(
            "  {:<24} {:<16} {:>6} missing  -> {}",
            truncate_str(&column.name, 23),
            column.dtype,
            column.missing_count,
            pipeline.fill_plan().strategy_for(&column.name)
        );
    }
    if !any_missing {
        println!("  No missing values found");
    }
    println!();

    if let Err(e) = pipeline.fill_plan().validate(&df) {
        println!("  WARNING: fill plan is invalid for this table: {}", e);
        println!();
    }

    println!("{}", "=".repeat(80));
    println!("To execute the cleaning, run without --dry-run");
    println!("{}", "=".repeat(80));

    Ok(())
}

/// Truncate a string to max length with ellipsis
fn truncate_str(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

/// Print a human-readable summary of the cleaning run.
fn print_human_readable_summary(outcome: &CleaningOutcome, input: &str, output: &Path) {
    let summary = &outcome.summary;

    println!();
    println!("{}", "=".repeat(80));
    println!("CLEANING COMPLETE");
    println!("{}", "=".repeat(80));
    println!();

    println!(
        "Input:  {} ({} rows x {} columns)",
        input, summary.rows_before, summary.columns
    );
    println!(
        "Output: {} ({} rows x {} columns)",
        output.display(),
        summary.rows_after,
        summary.columns
    );
    println!();

    println!("Summary:");
    println!("  Duration: {}ms", summary.duration_ms);
    println!("  Duplicates removed: {}", summary.duplicates_removed);
    println!("  Values filled: {}", summary.values_filled);
    println!("  Columns renamed: {}", summary.columns_renamed);
    println!("  Columns converted: {}", summary.columns_converted);
    println!("  Outlier rows removed: {}", summary.outliers_removed);
    println!();

    println!("Report:");
    for line in outcome.report.lines() {
        println!("  - {}", line);
    }
    println!();

    println!("Use --json for machine-readable output");
    println!("{}", "=".repeat(80));
}
