//! pathsift - find files by depth, exclusion patterns and time windows.
//!
//! Usage:
//!   sift [PATHS]...                          List every file below PATHS
//!   sift src --max-depth 1 --exclude-glob '*.rs'
//!   sift . --modified-after 2024-01-01 --created-on 2024-03-05
//!   sift --config sift.toml --format json .
//!   sift --help                              Show help

use std::path::PathBuf;

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use clap::{Parser, ValueEnum};
use color_eyre::eyre::{Context, Result, eyre};
use tracing_subscriber::EnvFilter;

use pathsift_core::{DiscoverConfig, Instant, TimeWindow};
use pathsift_filter::DateFilter;
use pathsift_scan::PathDiscovery;

#[derive(Parser)]
#[command(
    name = "pathsift",
    version,
    about = "Find files by depth, exclusion patterns and creation/modification time",
    long_about = "pathsift walks files and directories, drops anything matching an \
                  exclusion rule, then keeps only files whose timestamps fall inside \
                  every supplied time window.\n\n\
                  Times accept RFC 3339, `YYYY-MM-DD HH:MM:SS` or `YYYY-MM-DD` (UTC)."
)]
struct Cli {
    /// Files or directories to search (defaults to current directory)
    #[arg(default_value = ".")]
    paths: Vec<PathBuf>,

    /// Load discovery settings from a TOML file; flags add to or override it
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Directory levels below each root to descend into
    #[arg(short = 'd', long)]
    max_depth: Option<usize>,

    /// Exclude paths containing this fragment
    #[arg(short = 'p', long = "exclude-path", value_name = "FRAGMENT")]
    exclude_paths: Vec<PathBuf>,

    /// Exclude paths matching this regex
    #[arg(short = 'r', long = "exclude-regex", value_name = "REGEX")]
    exclude_regexes: Vec<String>,

    /// Exclude files matching this glob, relative to each directory root
    #[arg(short = 'g', long = "exclude-glob", value_name = "GLOB")]
    exclude_globs: Vec<String>,

    /// Fail on paths that do not exist instead of skipping them
    #[arg(long)]
    strict: bool,

    /// Do not follow symlinks back into a directory being walked
    #[arg(long)]
    guard_cycles: bool,

    #[command(flatten)]
    dates: DateArgs,

    /// Sort output (directory order is otherwise OS-defined)
    #[arg(short, long)]
    sort: bool,

    /// Output format
    #[arg(short, long, default_value = "text")]
    format: OutputFormat,

    /// Log discovery decisions to stderr (RUST_LOG overrides)
    #[arg(short, long)]
    verbose: bool,
}

#[derive(clap::Args)]
struct DateArgs {
    /// Created between two times, `START..END`
    #[arg(long, value_name = "START..END", value_parser = parse_range)]
    created_in: Option<TimeWindow>,

    /// Created on this UTC day
    #[arg(long, value_name = "DATE", value_parser = parse_day)]
    created_on: Option<TimeWindow>,

    /// Created strictly before this time
    #[arg(long, value_name = "TIME", value_parser = parse_instant)]
    created_before: Option<Instant>,

    /// Created strictly after this time
    #[arg(long, value_name = "TIME", value_parser = parse_instant)]
    created_after: Option<Instant>,

    /// Modified between two times, `START..END`
    #[arg(long, value_name = "START..END", value_parser = parse_range)]
    modified_in: Option<TimeWindow>,

    /// Modified on this UTC day
    #[arg(long, value_name = "DATE", value_parser = parse_day)]
    modified_on: Option<TimeWindow>,

    /// Modified strictly before this time
    #[arg(long, value_name = "TIME", value_parser = parse_instant)]
    modified_before: Option<Instant>,

    /// Modified strictly after this time
    #[arg(long, value_name = "TIME", value_parser = parse_instant)]
    modified_after: Option<Instant>,
}

#[derive(Debug, Clone, Copy, ValueEnum, Default)]
enum OutputFormat {
    #[default]
    Text,
    Json,
}

fn main() -> Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = discover_config(&cli)?;
    let filter = date_filter(&cli.dates);
    run_sift(cli.paths, config, &filter, cli.sort, cli.format)
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Merge the optional config file with command-line flags.
fn discover_config(cli: &Cli) -> Result<DiscoverConfig> {
    let base = match &cli.config {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            toml::from_str::<DiscoverConfig>(&text)
                .with_context(|| format!("Invalid config file {}", path.display()))?
        }
        None => DiscoverConfig::default(),
    };

    let mut exclude_paths = base.exclude_paths;
    exclude_paths.extend(cli.exclude_paths.iter().cloned());
    let mut exclude_regexes = base.exclude_regexes;
    exclude_regexes.extend(cli.exclude_regexes.iter().cloned());
    let mut exclude_globs = base.exclude_globs;
    exclude_globs.extend(cli.exclude_globs.iter().cloned());

    DiscoverConfig::builder()
        .max_depth(cli.max_depth.or(base.max_depth))
        .exclude_paths(exclude_paths)
        .exclude_regexes(exclude_regexes)
        .exclude_globs(exclude_globs)
        .strict_inputs(cli.strict || base.strict_inputs)
        .guard_symlink_cycles(cli.guard_cycles || base.guard_symlink_cycles)
        .build()
        .map_err(|e| eyre!("{e}"))
}

fn date_filter(dates: &DateArgs) -> DateFilter {
    let mut filter = DateFilter::new();
    if let Some(window) = dates.created_in {
        filter = filter.created_in(window);
    }
    if let Some(window) = dates.created_on {
        filter = filter.created_on(window);
    }
    if let Some(instant) = dates.created_before {
        filter = filter.created_before(TimeWindow::Before(instant));
    }
    if let Some(instant) = dates.created_after {
        filter = filter.created_after(TimeWindow::After(instant));
    }
    if let Some(window) = dates.modified_in {
        filter = filter.modified_in(window);
    }
    if let Some(window) = dates.modified_on {
        filter = filter.modified_on(window);
    }
    if let Some(instant) = dates.modified_before {
        filter = filter.modified_before(TimeWindow::Before(instant));
    }
    if let Some(instant) = dates.modified_after {
        filter = filter.modified_after(TimeWindow::After(instant));
    }
    filter
}

/// Discover, filter and print.
fn run_sift(
    paths: Vec<PathBuf>,
    config: DiscoverConfig,
    filter: &DateFilter,
    sort: bool,
    format: OutputFormat,
) -> Result<()> {
    let engine = PathDiscovery::new(config).context("Invalid discovery settings")?;
    let results = filter.apply(engine.discover(paths));

    if !sort && matches!(format, OutputFormat::Text) {
        // Stream as we go.
        for path in results {
            let path = path.context("Search failed")?;
            println!("{}", path.display());
        }
        return Ok(());
    }

    let mut found: Vec<PathBuf> = results
        .collect::<Result<_, _>>()
        .context("Search failed")?;
    if sort {
        found.sort();
    }

    match format {
        OutputFormat::Text => {
            for path in &found {
                println!("{}", path.display());
            }
        }
        OutputFormat::Json => {
            let printable: Vec<String> = found
                .iter()
                .map(|p| p.to_string_lossy().into_owned())
                .collect();
            println!("{}", serde_json::to_string_pretty(&printable)?);
        }
    }

    Ok(())
}

/// Parse a time (e.g., "2024-01-01T12:00:00Z", "2024-01-01 12:00:00", "2024-01-01").
fn parse_instant(s: &str) -> Result<Instant, String> {
    let s = s.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S") {
        return Ok(naive.and_utc());
    }
    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Ok(date.and_time(NaiveTime::MIN).and_utc());
    }

    Err(format!(
        "invalid time `{s}` (expected RFC 3339, `YYYY-MM-DD HH:MM:SS` or `YYYY-MM-DD`)"
    ))
}

/// Parse a calendar day (e.g., "2024-03-05").
fn parse_day(s: &str) -> Result<TimeWindow, String> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
        .map(TimeWindow::Day)
        .map_err(|e| format!("invalid date `{s}` (expected YYYY-MM-DD): {e}"))
}

/// Parse an inclusive range (e.g., "2024-01-01..2024-02-01").
fn parse_range(s: &str) -> Result<TimeWindow, String> {
    let (start, end) = s
        .split_once("..")
        .ok_or_else(|| format!("invalid range `{s}` (expected START..END)"))?;
    Ok(TimeWindow::between(parse_instant(start)?, parse_instant(end)?))
}
