//! # sheetplate-cli
//!
//! Command-line interface for inspecting report templates and copying
//! template blocks with their conditional formatting.

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use serde::Serialize;
use sheetplate_primitives::address::cell_range_to_address;
use sheetplate_primitives::CellRange;
use sheetplate_sheet::Book;
use sheetplate_transform::{
    CellRef, ConditionalFormattingEntry, GridSheetData, SheetData, TransformOptions, Transformer,
};
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// sheetplate - spreadsheet template tooling
#[derive(Parser)]
#[command(name = "sheetplate")]
#[command(author, version, about = "Inspect and expand xlsx report templates", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Load transform options from a YAML file
    #[arg(long = "options", value_name = "FILE", global = true)]
    options: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Command {
    /// Show what the template adapter sees in a workbook
    Inspect {
        /// Workbook to read
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Only inspect this sheet
        #[arg(short, long)]
        sheet: Option<String>,

        /// Output format (json, table)
        #[arg(short = 'f', long = "format", default_value = "table")]
        format: OutputFormat,
    },
    /// Copy a block of template cells to another location
    Copy(CopyArgs),
}

#[derive(clap::Args)]
struct CopyArgs {
    /// Workbook to read
    #[arg(value_name = "FILE")]
    file: PathBuf,

    /// Source block in A1 notation (e.g. A1:C4)
    #[arg(long)]
    from: String,

    /// Top-left target cell, optionally sheet-qualified (e.g. 'Report'!B10)
    #[arg(long)]
    to: String,

    /// Source sheet (defaults to the first sheet)
    #[arg(short, long)]
    sheet: Option<String>,

    /// Target sheet when --to has no sheet prefix (defaults to the source sheet)
    #[arg(long = "target-sheet")]
    target_sheet: Option<String>,

    /// Also apply the source column widths to the target sheet
    #[arg(long = "column-widths")]
    column_widths: bool,

    /// Where to write the result
    #[arg(short, long, value_name = "OUT")]
    output: PathBuf,
}

/// Output format for inspection reports.
#[derive(Clone, Copy, Default, clap::ValueEnum)]
enum OutputFormat {
    /// JSON output
    Json,
    /// Human-readable summary (default)
    #[default]
    Table,
}

#[derive(Debug, Serialize)]
struct SheetReport {
    name: String,
    rows: usize,
    cells_per_row: Vec<Option<usize>>,
    merged_regions: Vec<String>,
    column_widths: Option<Vec<u32>>,
    conditional_formatting: Vec<ConditionalFormattingReport>,
}

#[derive(Debug, Serialize)]
struct ConditionalFormattingReport {
    ranges: Vec<String>,
    rules: usize,
}

impl SheetReport {
    fn new(data: &GridSheetData) -> Self {
        Self {
            name: data.sheet_name().to_string(),
            rows: data.number_of_rows(),
            cells_per_row: data
                .rows()
                .iter()
                .map(|row| row.as_ref().map(|row| row.number_of_cells()))
                .collect(),
            merged_regions: data
                .merged_regions()
                .iter()
                .map(|region| cell_range_to_address(None, *region))
                .collect(),
            column_widths: data.column_widths().map(<[u32]>::to_vec),
            conditional_formatting: data
                .conditional_formattings()
                .iter()
                .map(ConditionalFormattingReport::new)
                .collect(),
        }
    }
}

impl ConditionalFormattingReport {
    fn new(entry: &ConditionalFormattingEntry) -> Self {
        Self {
            ranges: entry
                .ranges()
                .iter()
                .map(|range| cell_range_to_address(None, *range))
                .collect(),
            rules: entry.rules().len(),
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    if cli.verbose {
        tracing_subscriber::fmt()
            .with_env_filter(
                EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
            )
            .init();
    }

    let options = load_options(cli.options.as_deref())?;

    match cli.command {
        Command::Inspect {
            file,
            sheet,
            format,
        } => run_inspect(&file, sheet.as_deref(), &options, format),
        Command::Copy(args) => run_copy(&args, options),
    }
}

/// Read transform options from YAML, or use the defaults.
fn load_options(path: Option<&Path>) -> Result<TransformOptions> {
    let Some(path) = path else {
        return Ok(TransformOptions::default());
    };
    let source = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read options file: {}", path.display()))?;
    parse_options(&source).with_context(|| format!("Invalid options file: {}", path.display()))
}

fn parse_options(source: &str) -> Result<TransformOptions> {
    if source.trim().is_empty() {
        return Ok(TransformOptions::default());
    }
    Ok(serde_yaml::from_str(source)?)
}

fn load_book(path: &Path) -> Result<Book> {
    Book::from_xlsx(path).with_context(|| format!("Failed to read workbook: {}", path.display()))
}

fn inspect_reports(
    book: &Book,
    sheet: Option<&str>,
    options: &TransformOptions,
) -> Result<Vec<SheetReport>> {
    let transformer = Transformer::with_options(book.clone(), options.clone());
    match sheet {
        Some(name) => Ok(vec![SheetReport::new(transformer.sheet_data(name)?)]),
        None => Ok(transformer.sheet_data_iter().map(SheetReport::new).collect()),
    }
}

fn run_inspect(
    file: &Path,
    sheet: Option<&str>,
    options: &TransformOptions,
    format: OutputFormat,
) -> Result<()> {
    let book = load_book(file)?;
    let reports = inspect_reports(&book, sheet, options)?;

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&reports)?),
        OutputFormat::Table => {
            for report in &reports {
                print_report(report);
            }
        }
    }
    Ok(())
}

fn print_report(report: &SheetReport) {
    println!("{}", report.name.cyan().bold());
    println!("  rows:            {}", report.rows);
    let columns = report.column_widths.as_ref().map_or(0, Vec::len);
    println!("  columns:         {columns}");
    if report.merged_regions.is_empty() {
        println!("  merged regions:  {}", "none".dimmed());
    } else {
        println!("  merged regions:  {}", report.merged_regions.join(", "));
    }
    if report.conditional_formatting.is_empty() {
        println!("  cond. formats:   {}", "none".dimmed());
    }
    for block in &report.conditional_formatting {
        println!(
            "  cond. format:    {} ({} rule{})",
            block.ranges.join(" "),
            block.rules,
            if block.rules == 1 { "" } else { "s" }
        );
    }
}

/// Resolve the source sheet, area and target cell of a copy.
fn resolve_copy(book: &Book, args: &CopyArgs) -> Result<(String, CellRange, CellRef)> {
    let src_sheet = match &args.sheet {
        Some(name) => name.clone(),
        None => book
            .sheet_names()
            .first()
            .map(|name| (*name).to_string())
            .context("Workbook has no sheets")?,
    };
    if !book.has_sheet(&src_sheet) {
        bail!("Sheet not found: {src_sheet}");
    }
    let area = CellRange::from_a1(&args.from)
        .with_context(|| format!("Invalid source range: '{}'", args.from))?;
    let default_target = args.target_sheet.as_deref().unwrap_or(&src_sheet);
    let target = CellRef::parse(&args.to, default_target)
        .with_context(|| format!("Invalid target cell: '{}'", args.to))?;
    Ok((src_sheet, area, target))
}

fn copy_block(book: Book, args: &CopyArgs, options: TransformOptions) -> Result<(Book, usize)> {
    let (src_sheet, area, target) = resolve_copy(&book, args)?;
    let mut transformer = Transformer::with_options(book, options);
    let cells = transformer.transform_area(&src_sheet, area, &target)?;
    if args.column_widths {
        transformer.copy_column_widths(&src_sheet, &target.sheet_name)?;
    }
    info!(src_sheet = %src_sheet, area = %area, target = %target, cells, "Copied block");
    Ok((transformer.into_book(), cells))
}

fn run_copy(args: &CopyArgs, options: TransformOptions) -> Result<()> {
    let book = load_book(&args.file)?;
    let (book, cells) = copy_block(book, args, options)?;
    book.save_as_xlsx(&args.output)
        .with_context(|| format!("Failed to write workbook: {}", args.output.display()))?;
    println!(
        "{} {cells} cell{} {} {} -> {}",
        "Copied".green().bold(),
        if cells == 1 { "" } else { "s" },
        args.from,
        args.to,
        args.output.display()
    );
    Ok(())
}
