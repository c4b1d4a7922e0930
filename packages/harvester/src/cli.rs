//! Command-line interface for the harvester.

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand, ValueEnum};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;

use crate::config::{validate_date, HarvesterConfig};
use crate::dates::ReleaseDate;
use crate::error::{HarvesterError, Result};
use crate::harvester::{compare_dates, harvest_report, list_releases, process_document};
use crate::types::RawDocument;

/// Exit code for a result that was produced but must not be trusted.
pub const EXIT_NOT_OK: i32 = 2;

/// H.4.1 Harvester - Extract and reconcile the weekly Federal Reserve balance sheet.
#[derive(Parser)]
#[command(name = "h41-harvester")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Json,
    Yaml,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Harvest the release closest to a date and print the canonical report.
    Report {
        /// Requested date in YYYY-MM-DD format (default: today)
        #[arg(short, long)]
        date: Option<String>,

        #[arg(short, long, value_enum, default_value_t = OutputFormat::Json)]
        format: OutputFormat,

        /// Write the report to this file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// List discovered release dates, newest first.
    Dates,

    /// Parse a saved release page without touching the network.
    Parse {
        /// Path to the saved HTML
        file: PathBuf,

        /// Release date the page belongs to (YYYY-MM-DD)
        #[arg(short, long)]
        date: String,

        /// Source URL recorded in the report (default: the file path)
        #[arg(long)]
        source_url: Option<String>,

        #[arg(short, long, value_enum, default_value_t = OutputFormat::Json)]
        format: OutputFormat,

        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Compare the releases closest to two dates.
    Compare {
        /// Earlier date (YYYY-MM-DD)
        from: String,

        /// Later date (YYYY-MM-DD)
        to: String,

        #[arg(short, long, value_enum, default_value_t = OutputFormat::Json)]
        format: OutputFormat,

        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

/// Run the CLI and return the process exit code.
pub fn run() -> Result<i32> {
    let cli = Cli::parse();
    let config = HarvesterConfig::from_env()?;

    match cli.command {
        Commands::Report {
            date,
            format,
            output,
        } => report_command(&config, date.as_deref(), format, output.as_deref()),
        Commands::Dates => dates_command(&config),
        Commands::Parse {
            file,
            date,
            source_url,
            format,
            output,
        } => parse_command(&config, &file, &date, source_url, format, output.as_deref()),
        Commands::Compare {
            from,
            to,
            format,
            output,
        } => compare_command(&config, &from, &to, format, output.as_deref()),
    }
}

fn spinner(message: &'static str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    #[allow(clippy::expect_used)] // Static template string that is guaranteed to be valid
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .expect("valid template"),
    );
    pb.set_message(message);
    pb.enable_steady_tick(std::time::Duration::from_millis(100));
    pb
}

/// Execute the report command.
fn report_command(
    config: &HarvesterConfig,
    date: Option<&str>,
    format: OutputFormat,
    output: Option<&Path>,
) -> Result<i32> {
    // Use today if no date provided
    let requested = date
        .map(String::from)
        .unwrap_or_else(|| chrono::Local::now().format("%Y-%m-%d").to_string());
    validate_date(&requested)?;

    eprintln!(
        "{} H.4.1 release closest to {}",
        style("Harvesting").bold(),
        style(&requested).green()
    );

    let pb = spinner("Discovering and fetching release...");
    let outcome = harvest_report(&requested, config);
    pb.finish_and_clear();
    let outcome = outcome?;

    eprintln!("  Resolved: {}", style(&outcome.resolved_date).cyan());
    print_warnings(&outcome.warnings);

    match &outcome.report {
        Some(report) => emit(report, format, output)?,
        None => emit(&outcome, format, output)?,
    }
    Ok(exit_code(outcome.ok))
}

/// Execute the dates command.
fn dates_command(config: &HarvesterConfig) -> Result<i32> {
    let pb = spinner("Discovering releases...");
    let catalog = list_releases(config);
    pb.finish_and_clear();
    let catalog = catalog?;

    if catalog.is_empty() {
        eprintln!("{}", style("No releases discovered").yellow());
        return Ok(1);
    }
    for (date, url) in catalog.iter() {
        println!("{date}  {url}");
    }
    Ok(0)
}

/// Execute the parse command.
fn parse_command(
    config: &HarvesterConfig,
    file: &Path,
    date: &str,
    source_url: Option<String>,
    format: OutputFormat,
    output: Option<&Path>,
) -> Result<i32> {
    let date = ReleaseDate::parse(date)?;
    let html = std::fs::read_to_string(file)?;
    let doc = RawDocument {
        html,
        source_url: source_url.unwrap_or_else(|| file.display().to_string()),
        date: date.clone(),
    };

    let outcome = process_document(&date, &doc, config);
    print_warnings(&outcome.warnings);

    match &outcome.report {
        Some(report) => emit(report, format, output)?,
        None => emit(&outcome, format, output)?,
    }
    Ok(exit_code(outcome.ok))
}

/// Execute the compare command.
fn compare_command(
    config: &HarvesterConfig,
    from: &str,
    to: &str,
    format: OutputFormat,
    output: Option<&Path>,
) -> Result<i32> {
    let pb = spinner("Harvesting both releases...");
    let result = compare_dates(from, to, config);
    pb.finish_and_clear();
    let result = result?;

    eprintln!(
        "{} {} -> {}",
        style("Comparing").bold(),
        style(&result.comparison.from).cyan(),
        style(&result.comparison.to).cyan()
    );
    print_warnings(&result.warnings);
    emit(&result.comparison, format, output)?;
    Ok(exit_code(result.ok))
}

fn exit_code(ok: bool) -> i32 {
    if ok {
        0
    } else {
        EXIT_NOT_OK
    }
}

fn print_warnings(warnings: &[String]) {
    if warnings.is_empty() {
        return;
    }
    eprintln!("  Warnings: {}", style(warnings.len()).yellow().bold());
    let options = textwrap::Options::new(100)
        .initial_indent("    - ")
        .subsequent_indent("      ");
    for warning in warnings {
        eprintln!("{}", textwrap::fill(warning, &options));
    }
}

/// Serialize `value` in the requested format.
pub fn render<T: Serialize>(value: &T, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(value)?),
        OutputFormat::Yaml => Ok(serde_yaml_ng::to_string(value)?),
    }
}

fn emit<T: Serialize>(value: &T, format: OutputFormat, output: Option<&Path>) -> Result<()> {
    let rendered = render(value, format)?;
    match output {
        Some(path) => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                if !parent.is_dir() {
                    return Err(HarvesterError::Io(std::io::Error::new(
                        std::io::ErrorKind::NotFound,
                        format!("Output directory does not exist: {}", parent.display()),
                    )));
                }
            }
            std::fs::write(path, rendered)?;
            eprintln!("{} {}", style("Saved to:").green().bold(), path.display());
        }
        None => println!("{rendered}"),
    }
    Ok(())
}
