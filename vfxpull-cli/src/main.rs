//! vfxpull CLI - VFX pull lists from conform EDLs.

use anyhow::Context;
use clap::Parser;
use console::style;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use vfxpull_edl::{
    diff_table, read_table, write_table, DiffReport, DiffStatus, EdlParser, ParseOutput,
    ParserConfig, TableOptions,
};
use vfxpull_timecode::FrameRate;

/// Output mode for the CLI.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OutputMode {
    /// Shot table plus warnings and diff listing.
    Normal,
    /// Single JSON document on stdout.
    Json,
    /// Shot table only.
    Quiet,
    /// Normal output with debug logging and parse statistics.
    Verbose,
}

/// Command-line arguments for the vfxpull tool.
#[derive(Parser, Debug)]
#[command(name = "vfxpull")]
#[command(version)]
#[command(about = "Extract VFX shot lists from CMX3600 EDL marker metadata")]
#[command(long_about = "vfxpull reads a conform EDL, matches every VFX marker to the cut \
    events under it, and writes a shot table.\n\n\
    EXAMPLES:\n    \
    vfxpull -i cut.edl --fps 23.976\n    \
    vfxpull -i cut.edl --fps 24 -o shots.csv\n    \
    vfxpull -i cut_v2.edl --fps 24 -o shots_v2.csv --previous shots.csv\n    \
    vfxpull -i cut.edl --fps 25 --json")]
struct Args {
    /// Input EDL path
    #[arg(short, long)]
    input: PathBuf,

    /// Frame rate (e.g. 24, 23.976, 24000/1001)
    #[arg(long, default_value = "24")]
    fps: String,

    /// Output table path (prints to stdout when omitted)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Previously exported table to diff against
    #[arg(long)]
    previous: Option<PathBuf>,

    /// Largest gap in frames between cuts of one shot
    #[arg(long)]
    tolerance: Option<u64>,

    /// VFX code prefix
    #[arg(long)]
    prefix: Option<String>,

    /// JSON parser config file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Table field delimiter
    #[arg(long, default_value = ",")]
    delimiter: char,

    /// Leave the Description column out of the table
    #[arg(long)]
    no_description: bool,

    /// Verbose output with debug logging
    #[arg(short, long, conflicts_with = "quiet", conflicts_with = "json")]
    verbose: bool,

    /// Quiet mode: print only the table
    #[arg(short, long, conflicts_with = "verbose", conflicts_with = "json")]
    quiet: bool,

    /// Emit the parse result and diff as JSON
    #[arg(long, conflicts_with = "verbose", conflicts_with = "quiet")]
    json: bool,
}

impl Args {
    /// Determine the output mode based on flags.
    fn output_mode(&self) -> OutputMode {
        if self.json {
            OutputMode::Json
        } else if self.quiet {
            OutputMode::Quiet
        } else if self.verbose {
            OutputMode::Verbose
        } else {
            OutputMode::Normal
        }
    }

    /// Config file values with command-line overrides applied.
    fn parser_config(&self) -> anyhow::Result<ParserConfig> {
        let mut config = match &self.config {
            Some(path) => ParserConfig::from_file(path)
                .with_context(|| format!("Failed to load config {}", path.display()))?,
            None => ParserConfig::default(),
        };
        if let Some(tolerance) = self.tolerance {
            config.tolerance_frames = tolerance;
        }
        if let Some(prefix) = &self.prefix {
            config.vfx_prefix = prefix.clone();
        }
        Ok(config)
    }

    fn table_options(&self) -> TableOptions {
        TableOptions {
            delimiter: self.delimiter,
            include_description: !self.no_description,
        }
    }
}

/// JSON result document.
#[derive(Debug, Serialize)]
struct JsonOutput<'a> {
    #[serde(rename = "type")]
    msg_type: &'static str,
    input: String,
    fps: f64,
    #[serde(flatten)]
    result: &'a ParseOutput,
    table_path: Option<String>,
    diff: Option<&'a DiffReport>,
    diff_error: Option<String>,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let output_mode = args.output_mode();

    // Initialize logging (not in JSON or quiet mode)
    if output_mode != OutputMode::Json && output_mode != OutputMode::Quiet {
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(if args.verbose {
                tracing::Level::DEBUG
            } else {
                tracing::Level::INFO
            })
            .with_target(false)
            .with_writer(std::io::stderr)
            .finish();
        let _ = tracing::subscriber::set_global_default(subscriber);
    }

    let rate: FrameRate = match args.fps.parse() {
        Ok(rate) => rate,
        Err(e) => fail(output_mode, "invalid_frame_rate", &e.to_string()),
    };

    let parser = match args
        .parser_config()
        .and_then(|c| EdlParser::new(c).map_err(Into::into))
    {
        Ok(parser) => parser,
        Err(e) => fail(output_mode, "invalid_config", &format!("{e:#}")),
    };

    let bytes = match std::fs::read(&args.input) {
        Ok(bytes) => bytes,
        Err(e) => fail(
            output_mode,
            "input_unreadable",
            &format!("Cannot read {}: {e}", args.input.display()),
        ),
    };

    let output = match parser.parse_bytes(&bytes, rate) {
        Ok(output) => output,
        Err(e) => fail(output_mode, "encoding", &e.to_string()),
    };

    let options = args.table_options();

    // Read the previous table before `-o` can overwrite it. A bad previous
    // table never fails the run.
    let diff = args
        .previous
        .as_deref()
        .map(|path| diff_previous(&output, path, options.delimiter));

    let table = write_table(&output.shots, &options);
    if let Some(path) = &args.output {
        std::fs::write(path, &table)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        info!(path = %path.display(), shots = output.shots.len(), "Wrote shot table");
    } else if output_mode != OutputMode::Json {
        print!("{table}");
    }

    match output_mode {
        OutputMode::Json => {
            let (diff, diff_error) = match &diff {
                Some(Ok(report)) => (Some(report), None),
                Some(Err(e)) => (None, Some(format!("{e:#}"))),
                None => (None, None),
            };
            let doc = JsonOutput {
                msg_type: "result",
                input: args.input.display().to_string(),
                fps: rate.as_f64(),
                result: &output,
                table_path: args.output.as_ref().map(|p| p.display().to_string()),
                diff,
                diff_error,
            };
            println!("{}", serde_json::to_string_pretty(&doc)?);
        }
        OutputMode::Quiet => {}
        OutputMode::Normal | OutputMode::Verbose => {
            print_summary(&output, output_mode == OutputMode::Verbose);
            match &diff {
                Some(Ok(report)) => print_diff(report),
                Some(Err(e)) => eprintln!("{} {e:#}", style("Diff error:").red().bold()),
                None => {}
            }
        }
    }

    Ok(())
}

fn diff_previous(output: &ParseOutput, path: &Path, delimiter: char) -> anyhow::Result<DiffReport> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Cannot read previous table {}", path.display()))?;
    let previous = read_table(&text, delimiter)
        .with_context(|| format!("Cannot parse previous table {}", path.display()))?;
    debug!(rows = previous.len(), "Loaded previous table");
    Ok(diff_table(&output.shots, &previous)?)
}

/// Report a fatal error in the current output mode and exit.
fn fail(mode: OutputMode, kind: &str, message: &str) -> ! {
    if mode == OutputMode::Json {
        let error = serde_json::json!({
            "type": "error",
            "error": kind,
            "message": message,
        });
        println!("{}", error);
    } else if mode != OutputMode::Quiet {
        eprintln!("{} {}", style("Error:").red().bold(), message);
    }
    std::process::exit(1);
}

fn print_summary(output: &ParseOutput, verbose: bool) {
    eprintln!();
    if let Some(title) = &output.title {
        eprintln!("{} {}", style("Title:").cyan().bold(), title);
    }
    eprintln!(
        "{} {} shot(s)",
        style("Extracted:").cyan().bold(),
        style(output.shots.len()).green()
    );
    if verbose {
        let stats = &output.stats;
        eprintln!("  Cut events:    {}", stats.events);
        eprintln!("  Marker lines:  {}", stats.marker_lines);
        eprintln!("  VFX markers:   {}", stats.markers);
    }
    for warning in &output.warnings {
        eprintln!("{} {}", style("Warning:").yellow().bold(), warning);
    }
}

fn status_label(status: DiffStatus) -> String {
    let tag = format!("{:<10}", status.to_string());
    match status {
        DiffStatus::New => style(tag).green().bold().to_string(),
        DiffStatus::Deleted => style(tag).red().bold().to_string(),
        DiffStatus::Changed => style(tag).yellow().bold().to_string(),
        DiffStatus::Unmodified => style(tag).dim().to_string(),
    }
}

fn print_diff(report: &DiffReport) {
    let summary = &report.summary;
    eprintln!();
    eprintln!(
        "{} {} new, {} deleted, {} changed, {} unmodified",
        style("Diff:").cyan().bold(),
        style(summary.new).green(),
        style(summary.deleted).red(),
        style(summary.changed).yellow(),
        summary.unmodified
    );
    for entry in &report.entries {
        eprintln!("  {} {}", status_label(entry.status), entry.vfx_code);
        for change in &entry.changes {
            eprintln!(
                "      {}: {} \u{2192} {}",
                change.field,
                style(&change.old).red(),
                style(&change.new).green()
            );
        }
    }
}
