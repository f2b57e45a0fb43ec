use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::Context;
use clap::{ArgAction, Args, Parser, Subcommand};
use glob::glob;
use pcapwalk_core::{CaptureInfo, CaptureReader, ReportOptions};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

/// Legacy input variable, still honored after `PCAPWALK_FILE`.
const LEGACY_INPUT_ENV: &str = "FILENAME";

const LONG_VERSION: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    " (commit ",
    env!("PCAPWALK_BUILD_COMMIT"),
    ", ",
    env!("PCAPWALK_BUILD_DATE"),
    ")"
);

#[derive(Parser, Debug)]
#[command(name = "pcapwalk")]
#[command(version, long_version = LONG_VERSION)]
#[command(
    about = "Layered decoder for classic pcap captures (Ethernet / IPv4 / UDP).",
    long_about = None,
    after_help = "Examples:\n  pcapwalk pcap decode capture.pcap -o records.json\n  pcapwalk pcap decode capture.pcap --stdout --pretty\n  PCAPWALK_FILE=capture.pcap pcapwalk pcap header"
)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace); RUST_LOG wins
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Operations on classic pcap inputs.
    Pcap {
        #[command(subcommand)]
        command: PcapCommands,
    },
}

#[derive(Args, Debug)]
struct InputArgs {
    /// Path (or glob matching one file) to a .pcap capture; falls back to $FILENAME
    #[arg(env = "PCAPWALK_FILE")]
    input: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
enum PcapCommands {
    /// Decode every record and write a JSON report.
    #[command(alias = "dump")]
    Decode {
        #[command(flatten)]
        input: InputArgs,

        /// Output report path (JSON)
        #[arg(short = 'o', long, required_unless_present = "stdout")]
        report: Option<PathBuf>,

        /// Write JSON report to stdout
        #[arg(long, conflicts_with = "report")]
        stdout: bool,

        /// Pretty-print JSON output
        #[arg(long, conflicts_with = "compact")]
        pretty: bool,

        /// Compact JSON output (default)
        #[arg(long)]
        compact: bool,

        /// Suppress non-error output
        #[arg(long)]
        quiet: bool,

        /// Stop after this many records
        #[arg(long)]
        limit: Option<u64>,

        /// Omit payload text from the report
        #[arg(long)]
        no_payload: bool,
    },
    /// Print the global capture header as JSON.
    Header {
        #[command(flatten)]
        input: InputArgs,

        /// Pretty-print JSON output
        #[arg(long)]
        pretty: bool,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Pcap { command } => match command {
            PcapCommands::Decode {
                input,
                report,
                stdout,
                pretty,
                compact,
                quiet,
                limit,
                no_payload,
            } => cmd_pcap_decode(
                input,
                report,
                stdout,
                OutputFormat { pretty, compact },
                quiet,
                ReportOptions {
                    limit,
                    include_payload: !no_payload,
                },
            ),
            PcapCommands::Header { input, pretty } => cmd_pcap_header(input, pretty),
        },
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {}", err.message);
            if let Some(hint) = err.hint {
                eprintln!("hint: {}", hint);
            }
            ExitCode::from(2)
        }
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| level.into()))
        .with_writer(std::io::stderr)
        .init();
}

#[derive(Debug)]
struct CliError {
    message: String,
    hint: Option<String>,
}

impl CliError {
    fn new(message: impl Into<String>, hint: Option<String>) -> Self {
        Self {
            message: message.into(),
            hint,
        }
    }
}

impl std::fmt::Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CliError {}

impl From<anyhow::Error> for CliError {
    fn from(err: anyhow::Error) -> Self {
        CliError::new(format!("{err:#}"), None)
    }
}

#[derive(Debug, Clone, Copy)]
struct OutputFormat {
    pretty: bool,
    compact: bool,
}

fn cmd_pcap_decode(
    input: InputArgs,
    report: Option<PathBuf>,
    stdout: bool,
    format: OutputFormat,
    quiet: bool,
    options: ReportOptions,
) -> Result<(), CliError> {
    let input = select_input(input)?;
    let resolved_input = resolve_input_path(&input)?;
    validate_input_file(&resolved_input)?;

    let report = if stdout {
        None
    } else {
        Some(report.ok_or_else(|| {
            CliError::new(
                "missing output path",
                Some("use -o/--report or --stdout".to_string()),
            )
        })?)
    };
    if let Some(report_path) = report.as_ref() {
        ensure_distinct_output(&resolved_input, report_path)?;
    }

    info!(input = %resolved_input.display(), "decoding capture");
    let rep = pcapwalk_core::decode_capture_file(&resolved_input, &options)
        .context("capture could not be read")?;
    debug!(records = rep.records.len(), "report built");
    let json = serialize_json(&rep, format)?;

    match report {
        None => print!("{}", json),
        Some(report) => {
            if let Some(parent) = report.parent() {
                if !parent.as_os_str().is_empty() {
                    fs::create_dir_all(parent).with_context(|| {
                        format!("Failed to create output directory: {}", parent.display())
                    })?;
                }
            }
            fs::write(&report, json)
                .with_context(|| format!("Failed to write report: {}", report.display()))?;
            if !quiet {
                eprintln!(
                    "OK: {} records written -> {}",
                    rep.records.len(),
                    report.display()
                );
            }
        }
    }

    if let Some(error) = rep.error {
        return Err(CliError::new(
            format!(
                "decoding stopped after {} records at offset {}: {}",
                error.records_decoded, error.offset, error.message
            ),
            Some("records before the failure are in the report".to_string()),
        ));
    }
    Ok(())
}

fn cmd_pcap_header(input: InputArgs, pretty: bool) -> Result<(), CliError> {
    let input = select_input(input)?;
    let resolved_input = resolve_input_path(&input)?;
    validate_input_file(&resolved_input)?;

    let bytes = pcapwalk_core::read_capture_file(&resolved_input)
        .context("capture could not be read")?;
    let header = CaptureReader::new(&bytes).header().map_err(|err| {
        CliError::new(
            format!("invalid capture header: {}", err.source),
            Some("expected a classic pcap file (pcapng is not supported)".to_string()),
        )
    })?;
    let info = CaptureInfo::from(&header);
    let json = serialize_json(
        &info,
        OutputFormat {
            pretty,
            compact: !pretty,
        },
    )?;
    println!("{}", json);
    Ok(())
}

fn serialize_json<T: serde::Serialize>(value: &T, format: OutputFormat) -> Result<String, CliError> {
    if format.pretty && format.compact {
        return Err(CliError::new(
            "cannot use --pretty and --compact together",
            Some("choose one output format".to_string()),
        ));
    }
    if format.pretty {
        serde_json::to_string_pretty(value)
            .context("JSON serialization failed")
            .map_err(Into::into)
    } else {
        serde_json::to_string(value)
            .context("JSON serialization failed")
            .map_err(Into::into)
    }
}

fn select_input(args: InputArgs) -> Result<PathBuf, CliError> {
    args.input
        .or_else(|| env::var_os(LEGACY_INPUT_ENV).map(PathBuf::from))
        .ok_or_else(|| {
            CliError::new(
                "missing input capture",
                Some(format!(
                    "pass a .pcap path, or set PCAPWALK_FILE or {LEGACY_INPUT_ENV}"
                )),
            )
        })
}

fn ensure_distinct_output(input: &Path, report_path: &Path) -> Result<(), CliError> {
    let input_abs = fs::canonicalize(input)
        .with_context(|| format!("Failed to resolve input path: {}", input.display()))?;
    let report_dir = report_path
        .parent()
        .map(|parent| {
            if parent.as_os_str().is_empty() {
                fs::canonicalize(".")
            } else {
                fs::canonicalize(parent)
            }
        })
        .transpose()
        .with_context(|| format!("Failed to resolve output path: {}", report_path.display()));
    // A missing output directory is created later; it cannot alias the input.
    let Ok(Some(report_dir)) = report_dir else {
        return Ok(());
    };
    let file_name = report_path
        .file_name()
        .ok_or_else(|| anyhow::anyhow!("Invalid report path"))?;
    if report_dir.join(file_name) == input_abs {
        return Err(CliError::new(
            format!(
                "report path must differ from input: {}",
                report_path.display()
            ),
            Some("choose a different output path".to_string()),
        ));
    }
    Ok(())
}

fn validate_input_file(input: &Path) -> Result<(), CliError> {
    if !input.exists() {
        return Err(CliError::new(
            format!("input file not found: {}", input.display()),
            Some("use a .pcap file".to_string()),
        ));
    }
    if !input.is_file() {
        return Err(CliError::new(
            format!("input is not a file: {}", input.display()),
            Some("use a .pcap file".to_string()),
        ));
    }
    let ext = input
        .extension()
        .and_then(|ext| ext.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();
    if ext == "pcapng" {
        return Err(CliError::new(
            format!("unsupported input format '{}'", input.display()),
            Some("pcapng is not supported; convert with `editcap -F pcap`".to_string()),
        ));
    }
    if ext != "pcap" && ext != "cap" {
        return Err(CliError::new(
            format!("unsupported input format '{}'", input.display()),
            Some("expected a .pcap or .cap file".to_string()),
        ));
    }
    Ok(())
}

fn resolve_input_path(input: &Path) -> Result<PathBuf, CliError> {
    let pattern = input.to_string_lossy();
    if !is_glob_pattern(&pattern) {
        return Ok(input.to_path_buf());
    }

    let mut matches = Vec::new();
    let paths = glob(&pattern).map_err(|err| {
        CliError::new(
            format!("invalid input pattern '{}'", pattern),
            Some(format!("pattern error: {}", err.msg)),
        )
    })?;
    for entry in paths {
        let path = entry.map_err(|err| {
            CliError::new(
                format!("invalid input pattern '{}'", pattern),
                Some(format!("pattern error: {}", err)),
            )
        })?;
        if path.is_file() {
            matches.push(path);
        }
    }

    match matches.len() {
        0 => Err(CliError::new(
            format!("no files match pattern '{}'", pattern),
            Some("check the path or quote the pattern; expected .pcap".to_string()),
        )),
        1 => Ok(matches.remove(0)),
        count => {
            let listed = matches
                .iter()
                .take(3)
                .map(|p| p.display().to_string())
                .collect::<Vec<_>>()
                .join(", ");
            let more = if count > 3 { ", ..." } else { "" };
            Err(CliError::new(
                format!(
                    "multiple files match pattern '{}' ({} matches); matches: {}{}",
                    pattern, count, listed, more
                ),
                Some("pass a single capture file, or run once per file".to_string()),
            ))
        }
    }
}

fn is_glob_pattern(input: &str) -> bool {
    input.contains('*') || input.contains('?') || input.contains('[')
}
