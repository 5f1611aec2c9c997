//! filetrack - find, classify and fingerprint files.
//!
//! Usage:
//!   filetrack search TERM [PATH]   Search file names (fuzzy by default)
//!   filetrack scan [PATH]          List every file with optional hashes/metadata
//!   filetrack hash FILE            Print a file digest
//!   filetrack verify LOG           Check a log against its .hash sidecar
//!   filetrack --help               Show help

mod export;
mod settings;

use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use chrono::{Local, NaiveDate, TimeZone};
use clap::{Args, Parser, Subcommand};
use color_eyre::eyre::{Context, Result, bail, eyre};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

use filetrack_core::{
    ContentType, FileRecord, HashAlgorithm, PluginRegistry, ScanConfig, ScanStats, ScanWarning,
    StopReason,
};
use filetrack_query::{QueryEngine, SearchOptions, SortField, SortOrder};
use filetrack_scan::{Capabilities, MetadataExtractor, Scanner, hash_file};

use crate::export::{OutputFormat, verify_log, write_log, write_records};
use crate::settings::Settings;

#[derive(Parser)]
#[command(
    name = "filetrack",
    version,
    about = "Find, classify and fingerprint files",
    long_about = "filetrack walks a directory, records name, size, modification time, \
                  MIME type and category for every file, and optionally hashes files and \
                  extracts EXIF or audio/video metadata.\n\n\
                  Log verbosity follows RUST_LOG (default: warn)."
)]
struct Cli {
    /// Settings file (defaults to <config dir>/filetrack/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Search file names under a directory
    Search {
        /// Search term (fuzzy unless --exact or --regex)
        term: String,

        /// Directory to search
        #[arg(default_value = ".")]
        path: PathBuf,

        /// Match the whole name or the name without its extension
        #[arg(short, long)]
        exact: bool,

        /// Treat TERM as a case-insensitive regular expression
        #[arg(short, long, conflicts_with = "exact")]
        regex: bool,

        /// Only this category (movie, tv, other)
        #[arg(short = 't', long = "type")]
        content_type: Option<ContentType>,

        /// Minimum size (e.g., "100KB", "1.5GB")
        #[arg(long)]
        min_size: Option<String>,

        /// Maximum size
        #[arg(long)]
        max_size: Option<String>,

        /// Modified on or after this day (YYYY-MM-DD, local time)
        #[arg(long)]
        after: Option<String>,

        /// Modified on or before this day (YYYY-MM-DD, local time)
        #[arg(long)]
        before: Option<String>,

        /// Sort by field (name, path, size, modified, mime, content_type, hash, or a metadata key)
        #[arg(short, long, default_value = "name")]
        sort: SortField,

        /// Sort descending
        #[arg(long)]
        desc: bool,

        /// Maximum number of results
        #[arg(short = 'n', long)]
        limit: Option<usize>,

        /// Give up after this long (e.g., "30s", "5m")
        #[arg(long)]
        timeout: Option<String>,

        #[command(flatten)]
        scan: ScanArgs,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// List every file under a directory
    Scan {
        /// Directory to scan
        #[arg(default_value = ".")]
        path: PathBuf,

        /// Give up after this long (e.g., "30s", "5m")
        #[arg(long)]
        timeout: Option<String>,

        #[command(flatten)]
        scan: ScanArgs,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// Print the digest of a file
    Hash {
        file: PathBuf,

        /// md5, sha224, sha256, sha384, sha512 or blake3
        #[arg(short, long, default_value = "sha256")]
        algorithm: String,
    },

    /// Check a log file against its .hash sidecar
    Verify {
        log: PathBuf,

        /// Algorithm the sidecar was written with (defaults to the settings file)
        #[arg(short, long)]
        algorithm: Option<String>,
    },
}

/// Options shared by every command that scans.
#[derive(Args)]
struct ScanArgs {
    /// Hash files with this algorithm
    #[arg(long = "hash", value_name = "ALGORITHM")]
    hash_algorithm: Option<String>,

    /// Extract filesystem, EXIF and audio/video metadata
    #[arg(short, long)]
    metadata: bool,

    /// Only the top-level directory
    #[arg(long)]
    no_recursive: bool,

    /// Skip hidden files
    #[arg(long)]
    no_hidden: bool,

    /// Follow symbolic links to directories
    #[arg(long)]
    follow_symlinks: bool,

    /// Extensions to skip, replacing the configured list (repeatable)
    #[arg(short = 'x', long = "exclude", value_name = "EXT")]
    exclude: Vec<String>,

    /// Worker threads (0 = auto)
    #[arg(short = 'j', long)]
    threads: Option<usize>,
}

#[derive(Args)]
struct OutputArgs {
    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,

    /// Write records to this file instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Also write OUTPUT.hash with the digest of the written file
    #[arg(long, requires = "output")]
    log_hash: bool,
}

fn main() -> Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();
    init_tracing(cli.verbose);
    let settings = Settings::load(cli.config.as_deref())?;

    match cli.command {
        Command::Search {
            term,
            path,
            exact,
            regex,
            content_type,
            min_size,
            max_size,
            after,
            before,
            sort,
            desc,
            limit,
            timeout,
            scan,
            output,
        } => {
            let options = SearchOptions {
                content_type,
                exact_match: exact,
                use_regex: regex,
                size_range: size_range(min_size.as_deref(), max_size.as_deref())?,
                date_range: date_range(after.as_deref(), before.as_deref())?,
                sort_by: sort,
                sort_order: if desc { SortOrder::Desc } else { SortOrder::Asc },
                max_results: limit,
                max_duration: timeout.as_deref().map(parse_duration).transpose()?,
                hash_algorithm: scan.algorithm()?,
                extract_metadata: scan.metadata,
                recursive: !scan.no_recursive,
                excluded_extensions: scan.excluded_extensions(&settings),
                include_hidden: !scan.no_hidden,
                follow_symlinks: scan.follow_symlinks,
                threads: scan.threads.unwrap_or(settings.threads),
                ..SearchOptions::default()
            };
            run_search(&term, &path, &options, &output, &settings)?;
        }
        Command::Scan {
            path,
            timeout,
            scan,
            output,
        } => {
            let config = ScanConfig {
                root: path,
                recursive: !scan.no_recursive,
                hash_algorithm: scan.algorithm()?,
                extract_metadata: scan.metadata,
                excluded_extensions: scan.excluded_extensions(&settings),
                threads: scan.threads.unwrap_or(settings.threads),
                follow_symlinks: scan.follow_symlinks,
                include_hidden: !scan.no_hidden,
                max_duration: timeout.as_deref().map(parse_duration).transpose()?,
                extractors: None,
            };
            run_scan(&config, &output, &settings)?;
        }
        Command::Hash { file, algorithm } => {
            let algorithm = HashAlgorithm::parse(&algorithm)?;
            let digest = hash_file(&file, algorithm)
                .with_context(|| format!("Cannot hash {}", file.display()))?;
            println!("{digest}  {}", file.display());
        }
        Command::Verify { log, algorithm } => {
            let algorithm = match algorithm {
                Some(name) => HashAlgorithm::parse(&name)?,
                None => settings.log_hash_algorithm,
            };
            if verify_log(&log, algorithm)? {
                println!("{}: OK", log.display());
            } else {
                bail!("{}: digest does not match {}.hash", log.display(), log.display());
            }
        }
    }

    Ok(())
}

impl ScanArgs {
    fn algorithm(&self) -> Result<Option<HashAlgorithm>> {
        Ok(self
            .hash_algorithm
            .as_deref()
            .map(HashAlgorithm::parse)
            .transpose()?)
    }

    fn excluded_extensions(&self, settings: &Settings) -> Vec<String> {
        if self.exclude.is_empty() {
            settings.excluded_extensions.clone()
        } else {
            self.exclude.clone()
        }
    }
}

/// Log to stderr; RUST_LOG overrides the -v level.
fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer().with_writer(io::stderr))
        .init();
}

fn engine() -> QueryEngine {
    QueryEngine::with_capabilities(Capabilities::detect(), Arc::new(PluginRegistry::new()))
}

/// Run a search and print or export the matches.
fn run_search(
    term: &str,
    path: &Path,
    options: &SearchOptions,
    output: &OutputArgs,
    settings: &Settings,
) -> Result<()> {
    eprintln!("Searching {} for \"{}\"...", path.display(), term);

    let results = engine()
        .search(term, path, options)
        .context("Search failed")?;

    emit(&results.records, output, settings)?;

    if output.format == OutputFormat::Text || output.output.is_some() {
        eprintln!();
        eprintln!(
            " {} match(es) among {} file(s) in {:.2}s",
            results.records.len(),
            results.scanned,
            results.duration.as_secs_f64()
        );
        report_tail(&results.warnings, results.stopped);
    }

    Ok(())
}

/// Run a plain scan and print or export every record.
fn run_scan(config: &ScanConfig, output: &OutputArgs, settings: &Settings) -> Result<()> {
    eprintln!("Scanning {}...", config.root.display());

    let extractor = MetadataExtractor::new(Capabilities::detect(), Arc::new(PluginRegistry::new()));
    let scan = Scanner::with_extractor(extractor)
        .scan(config)
        .context("Scan failed")?;

    emit(&scan.records, output, settings)?;

    if output.format == OutputFormat::Text || output.output.is_some() {
        print_summary(&scan.root, &scan.stats, scan.duration);
        report_tail(&scan.warnings, scan.stopped);
    }

    Ok(())
}

/// Send records to the requested destination.
fn emit(records: &[FileRecord], output: &OutputArgs, settings: &Settings) -> Result<()> {
    match &output.output {
        Some(path) => {
            let log_hash = output.log_hash.then_some(settings.log_hash_algorithm);
            write_log(records, path, output.format, log_hash)?;
            eprintln!("Wrote {} record(s) to {}", records.len(), path.display());
        }
        None if output.format == OutputFormat::Text => print_table(records),
        None => {
            let stdout = io::stdout();
            let mut lock = stdout.lock();
            write_records(records, output.format, &mut lock)?;
            lock.flush()?;
        }
    }
    Ok(())
}

fn print_table(records: &[FileRecord]) {
    if records.is_empty() {
        println!(" No files found.");
        return;
    }

    println!(
        "{:<44} {:>10} {:<16} {:<8} {}",
        "NAME", "SIZE", "MODIFIED", "TYPE", "PATH"
    );
    println!("{}", "─".repeat(100));
    for record in records {
        let modified = record
            .modified_at()
            .map(|t| t.with_timezone(&Local).format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_else(|| "-".to_string());
        println!(
            "{:<44} {:>10} {:<16} {:<8} {}",
            truncate(&record.name, 44),
            format_size(record.size_bytes),
            modified,
            record.content_type.to_string(),
            record.path.display()
        );
        if let Some(hash) = &record.hash {
            println!("  {hash}");
        }
        if let Some(metadata) = &record.extra_metadata {
            for (key, value) in metadata {
                println!("  {key}: {value}");
            }
        }
    }
}

fn print_summary(root: &Path, stats: &ScanStats, duration: Duration) {
    eprintln!();
    eprintln!("{}", "─".repeat(60));
    eprintln!(" {} - {}", root.display(), format_size(stats.total_size));
    eprintln!(
        " {} files recorded, {} excluded, {} directories",
        stats.files_recorded, stats.files_excluded, stats.dirs_visited
    );
    if let Some((path, size)) = &stats.largest_file {
        eprintln!(" Largest: {} ({})", path.display(), format_size(*size));
    }
    eprintln!(" Scanned in {:.2}s", duration.as_secs_f64());
    eprintln!("{}", "─".repeat(60));
}

fn report_tail(warnings: &[ScanWarning], stopped: Option<StopReason>) {
    if !warnings.is_empty() {
        eprintln!(" {} warning(s) during scan (use -v for details)", warnings.len());
    }
    match stopped {
        Some(StopReason::TimedOut) => eprintln!(" Time limit reached; results are partial."),
        Some(StopReason::Cancelled) => eprintln!(" Cancelled; results are partial."),
        None => {}
    }
}

/// Format size in human-readable form.
fn format_size(bytes: u64) -> String {
    humansize::format_size(bytes, humansize::BINARY)
}

/// Truncate a string to max chars.
fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let head: String = s.chars().take(max_len - 1).collect();
        format!("{head}…")
    }
}

fn size_range(min: Option<&str>, max: Option<&str>) -> Result<Option<(u64, u64)>> {
    if min.is_none() && max.is_none() {
        return Ok(None);
    }
    let min = min.map(parse_size).transpose()?.unwrap_or(0);
    let max = max.map(parse_size).transpose()?.unwrap_or(u64::MAX);
    Ok(Some((min, max)))
}

/// Inclusive bounds from whole local days: the start of `after` to the end
/// of `before`.
fn date_range(after: Option<&str>, before: Option<&str>) -> Result<Option<(f64, f64)>> {
    if after.is_none() && before.is_none() {
        return Ok(None);
    }
    let from = match after {
        Some(day) => day_bound(day, 0, 0, 0)?,
        None => f64::MIN,
    };
    let to = match before {
        Some(day) => day_bound(day, 23, 59, 59)?,
        None => f64::MAX,
    };
    Ok(Some((from, to)))
}

fn day_bound(day: &str, hour: u32, min: u32, sec: u32) -> Result<f64> {
    let date = NaiveDate::parse_from_str(day.trim(), "%Y-%m-%d")
        .with_context(|| format!("Invalid date '{day}', expected YYYY-MM-DD"))?;
    let naive = date
        .and_hms_opt(hour, min, sec)
        .ok_or_else(|| eyre!("Invalid time of day"))?;
    let local = Local
        .from_local_datetime(&naive)
        .earliest()
        .ok_or_else(|| eyre!("'{day}' does not exist in the local time zone"))?;
    Ok(local.timestamp() as f64)
}

/// Parse a size string (e.g., "1KB", "10MB", "1GB").
fn parse_size(s: &str) -> Result<u64> {
    let s = s.trim().to_uppercase();
    let digits = |s: &str| -> Result<f64> {
        s.trim_end_matches(|c: char| !c.is_ascii_digit() && c != '.')
            .parse()
            .with_context(|| format!("Invalid size '{s}'"))
    };

    let (num, multiplier) = if s.ends_with("GB") || s.ends_with('G') {
        (digits(&s)?, 1024 * 1024 * 1024)
    } else if s.ends_with("MB") || s.ends_with('M') {
        (digits(&s)?, 1024 * 1024)
    } else if s.ends_with("KB") || s.ends_with('K') {
        (digits(&s)?, 1024)
    } else {
        (digits(&s)?, 1)
    };

    Ok((num * multiplier as f64) as u64)
}

/// Parse a duration string (e.g., "500ms", "30s", "5m", "1h").
fn parse_duration(s: &str) -> Result<Duration> {
    let s = s.trim().to_lowercase();
    let number = |n: &str| -> Result<f64> {
        n.trim()
            .parse()
            .with_context(|| format!("Invalid duration '{s}'"))
    };

    let seconds = if let Some(n) = s.strip_suffix("ms") {
        number(n)? / 1000.0
    } else if let Some(n) = s.strip_suffix('s') {
        number(n)?
    } else if let Some(n) = s.strip_suffix('m') {
        number(n)? * 60.0
    } else if let Some(n) = s.strip_suffix('h') {
        number(n)? * 60.0 * 60.0
    } else {
        number(&s)?
    };

    Duration::try_from_secs_f64(seconds).with_context(|| format!("Invalid duration '{s}'"))
}
