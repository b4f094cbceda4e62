//! keysync - whitelist-driven directory sync
//!
//! Removes destination directories that are not listed in a key file, then
//! copies every listed key from the source root into the destination root.

use clap::{Parser, ValueEnum};
use keysync::{
    Action, Error as SyncError, KeySet, ParsedKeys, Reporter, SyncBuilder, SyncEvent, SyncReport,
    TracingReporter, parse_keys_file,
};
use serde_json::{Value, json};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

/// keysync - prune and populate a directory tree from a key list
///
/// Step 1 removes every subdirectory of DEST whose name is not a key.
/// Step 2 copies SOURCE/<key> into DEST/<key> for every key, merging into
/// existing content.
///
/// Usage:
///   keysync --source SRC --dest DEST --list keys.txt
///   keysync -s SRC -d DEST -l keys.txt --exclude .git,__pycache__ --dry-run
#[derive(Parser, Debug)]
#[command(name = "keysync", version, about, long_about = None)]
struct Args {
    /// Source root directory (contains key subdirectories)
    #[arg(short = 's', long)]
    source: Option<PathBuf>,

    /// Destination root directory to clean and populate
    #[arg(short = 'd', long)]
    dest: Option<PathBuf>,

    /// File listing the keys to keep and copy
    #[arg(short = 'l', long)]
    list: PathBuf,

    /// Comma-separated file name patterns to exclude (e.g. '.git,__pycache__')
    ///
    /// May be given more than once. Patterns match bare names at any depth.
    #[arg(short = 'e', long, value_delimiter = ',')]
    exclude: Vec<String>,

    /// Report what would be removed and copied without changing anything
    #[arg(short = 'n', long = "dry-run", alias = "plan")]
    dry_run: bool,

    /// Parse the key list, print the keys, and exit
    #[arg(long)]
    show_keys: bool,

    /// Output format
    #[arg(long, value_enum, default_value = "human")]
    output: OutputMode,

    /// Do not preserve file timestamps
    #[arg(long)]
    no_times: bool,

    /// Do not preserve file permissions
    #[arg(long)]
    no_perms: bool,

    /// Do not call fsync after each file (faster but less safe)
    #[arg(long)]
    no_sync: bool,

    /// Increase logging verbosity (-v info, -vv debug)
    #[arg(short = 'v', long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
enum OutputMode {
    Human,
    Json,
}

type CliResult<T> = std::result::Result<T, CliError>;

#[derive(Debug, Error)]
enum CliError {
    #[error("{source}")]
    KeyList { source: SyncError },

    #[error("No keys were parsed from {path}; aborting")]
    NoKeys { path: PathBuf },

    #[error("{source}")]
    Sync { source: SyncError },

    #[error("Missing required argument: --{name}")]
    MissingArgument { name: &'static str },

    #[error("Failed to serialize JSON output: {source}")]
    JsonSerialize { source: serde_json::Error },
}

impl CliError {
    fn code(&self) -> &'static str {
        match self {
            Self::KeyList { .. } => "key_list_unreadable",
            Self::NoKeys { .. } => "no_keys",
            Self::Sync {
                source: SyncError::InvalidPattern { .. },
            } => "invalid_pattern",
            Self::Sync { .. } => "sync_failed",
            Self::MissingArgument { .. } => "invalid_input",
            Self::JsonSerialize { .. } => "internal",
        }
    }

    fn exit_code(&self) -> i32 {
        match self {
            Self::NoKeys { .. } => EXIT_NO_KEYS,
            _ => EXIT_ERROR,
        }
    }
}

const EXIT_OK: i32 = 0;
const EXIT_ERROR: i32 = 1;
const EXIT_NO_KEYS: i32 = 2;
const EXIT_PARTIAL: i32 = 3;

fn main() {
    let args = Args::parse();
    init_logging(args.verbose);

    match run(&args) {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            eprintln!("error[{}]: {}", err.code(), err);
            std::process::exit(err.exit_code());
        }
    }
}

/// Install the global subscriber. `RUST_LOG` wins over `-v`.
fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn run(args: &Args) -> CliResult<i32> {
    if args.show_keys {
        let parsed = load_keys(&args.list)?;
        emit_keys(args.output, &parsed.keys)?;
        return Ok(EXIT_OK);
    }

    // Not required for --show-keys
    let source = args.source.as_ref().ok_or(CliError::MissingArgument { name: "source" })?;
    let dest = args.dest.as_ref().ok_or(CliError::MissingArgument { name: "dest" })?;

    let parsed = load_keys(&args.list)?;
    if parsed.keys.is_empty() {
        return Err(CliError::NoKeys {
            path: args.list.clone(),
        });
    }

    info!("Parsed {} keys from list.", parsed.keys.len());
    debug!(
        "Keys: {}",
        parsed.keys.iter().map(String::as_str).collect::<Vec<_>>().join(", ")
    );

    let mut builder = SyncBuilder::new(source, dest)
        .keys(parsed.keys.clone())
        .excludes(args.exclude.iter().filter(|p| !p.is_empty()).cloned())
        .dry_run(args.dry_run)
        .reporter(Arc::new(TracingReporter));
    if args.no_times {
        builder = builder.no_timestamps();
    }
    if args.no_perms {
        builder = builder.no_permissions();
    }
    if args.no_sync {
        builder = builder.no_fsync();
    }

    let report = builder.run().map_err(|source| CliError::Sync { source })?;

    info!("Removed directories: {}", removed_summary(&report));
    info!("Completed operation (dry-run={}).", report.dry_run);

    match args.output {
        OutputMode::Human => print_human(&report),
        OutputMode::Json => print_json_value(&report_json(&parsed.keys, &report)?)?,
    }

    Ok(if report.has_failures() {
        EXIT_PARTIAL
    } else {
        EXIT_OK
    })
}

/// Read the key list, logging rejected tokens at debug level.
fn load_keys(path: &Path) -> CliResult<ParsedKeys> {
    let parsed = parse_keys_file(path).map_err(|source| CliError::KeyList { source })?;
    for rejected in &parsed.rejected {
        TracingReporter.event(&SyncEvent::TokenRejected {
            line: rejected.line,
            token: &rejected.token,
        });
    }
    Ok(parsed)
}

fn emit_keys(output: OutputMode, keys: &KeySet) -> CliResult<()> {
    match output {
        OutputMode::Human => {
            print!("{}", keys.to_list_text());
            Ok(())
        }
        OutputMode::Json => {
            let keys: Vec<&str> = keys.iter().map(String::as_str).collect();
            print_json_value(&json!({ "schema_version": "1.0", "keys": keys }))
        }
    }
}

fn removed_summary(report: &SyncReport) -> String {
    if report.pruned.removed.is_empty() {
        "<none>".to_string()
    } else {
        report
            .pruned
            .removed
            .iter()
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(", ")
    }
}

fn print_human(report: &SyncReport) {
    if report.dry_run {
        println!("Dry run: no changes were made.");
        for action in &report.planned {
            println!("  {}", describe_action(action));
        }
        println!("Would remove directories: {}", removed_summary(report));
    } else {
        println!("Removed directories: {}", removed_summary(report));
    }

    let copied = &report.copied;
    let verb = if report.dry_run { "Would copy" } else { "Copied" };
    println!(
        "{} {} files ({}), {} new dirs, {} excluded",
        verb,
        copied.files_copied,
        format_bytes(copied.bytes_copied),
        copied.dirs_created,
        copied.excluded
    );
    for missing in &copied.missing_sources {
        println!("Missing source (skipped): {}", missing.display());
    }

    for failure in report
        .pruned
        .failures
        .iter()
        .chain(report.copied.failures.iter())
    {
        eprintln!(
            "warning: failed to {} {}: {}",
            failure.action,
            failure.path.display(),
            failure.message
        );
    }
}

fn describe_action(action: &Action) -> String {
    match action {
        Action::RemoveDir { path } => format!("remove {}", path.display()),
        Action::CreateDir { path } => format!("mkdir  {}", path.display()),
        Action::CopyFile { src, dst } => format!("copy   {} -> {}", src.display(), dst.display()),
    }
}

fn report_json(keys: &KeySet, report: &SyncReport) -> CliResult<Value> {
    let mut value =
        serde_json::to_value(report).map_err(|source| CliError::JsonSerialize { source })?;

    let mut failures = Vec::new();
    for section in ["pruned", "copied"] {
        if let Some(Value::Array(items)) = value[section]
            .as_object_mut()
            .and_then(|obj| obj.remove("failures"))
        {
            failures.extend(items);
        }
    }

    let keys: Vec<&str> = keys.iter().map(String::as_str).collect();
    Ok(json!({
        "schema_version": "1.0",
        "mode": if report.dry_run { "plan" } else { "execute" },
        "keys": keys,
        "removed": value["pruned"]["removed"].take(),
        "copy": value["copied"].take(),
        "failures": failures,
        "planned": value["planned"].take(),
    }))
}

fn print_json_value(value: &Value) -> CliResult<()> {
    let serialized =
        serde_json::to_string(value).map_err(|source| CliError::JsonSerialize { source })?;
    println!("{serialized}");
    Ok(())
}

fn format_bytes(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if bytes >= GB {
        format!("{:.2} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.2} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.2} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}
