//! Purpose: `dniscan` CLI entry point.
//! Role: Binary crate root; parses args, runs commands, emits JSON reports on stdout.
//! Invariants: Parse reports go to stdout for both success and failure.
//! Invariants: Non-interactive errors and notices are emitted as JSON on stderr.
//! Invariants: Process exit code is derived from `api::to_exit_code`.
use std::ffi::OsString;
use std::io::{self, IsTerminal, Read};
use std::path::{Path, PathBuf};

use bstr::ByteSlice;
use clap::{
    CommandFactory, Parser, Subcommand, ValueEnum, ValueHint, error::ErrorKind as ClapErrorKind,
};
use clap_complete::aot::Shell;
use serde_json::{Map, Value, json};
use std::error::Error as StdError;
use tracing_subscriber::EnvFilter;

mod batch;
mod color_json;
mod command_dispatch;

use batch::{BatchConfig, BatchFailure, BatchOutcome, BatchRecord, ErrorPolicy, run_batch};
use color_json::colorize_json;
use dniscan::api::{
    DEFAULT_EXCERPT_BYTES, Error, ErrorKind, ParseFailure, ParseOptions, RegistrationDraft,
    SchemePriority, failure_json, manual_entry, record_json, scan, scan_json, to_exit_code,
    to_iso_date,
};
use dniscan::notice::{Notice, notice_json};

const LOG_ENV: &str = "DNISCAN_LOG";
const DEFAULT_MAX_LINE_BYTES: usize = 64 * 1024;
const DEFAULT_MAX_SNIPPET_BYTES: usize = 200;

#[derive(Copy, Clone, Debug)]
struct RunOutcome {
    exit_code: i32,
}

impl RunOutcome {
    fn ok() -> Self {
        Self { exit_code: 0 }
    }

    fn with_code(exit_code: i32) -> Self {
        Self { exit_code }
    }
}

fn main() {
    init_tracing();
    let exit_code = match run() {
        Ok(outcome) => outcome.exit_code,
        Err((err, color_mode)) => {
            emit_error(&err, color_mode);
            to_exit_code(err.kind())
        }
    };
    std::process::exit(exit_code);
}

fn run() -> Result<RunOutcome, (Error, ColorMode)> {
    let cli = match Cli::try_parse_from(normalize_args(std::env::args_os())) {
        Ok(cli) => cli,
        Err(err) => match err.kind() {
            ClapErrorKind::DisplayHelp
            | ClapErrorKind::DisplayVersion
            | ClapErrorKind::DisplayHelpOnMissingArgumentOrSubcommand => {
                err.print().map_err(|io_err| {
                    (
                        Error::new(ErrorKind::Io)
                            .with_message("failed to write help")
                            .with_source(io_err),
                        ColorMode::Auto,
                    )
                })?;
                let exit_code = if matches!(
                    err.kind(),
                    ClapErrorKind::DisplayHelpOnMissingArgumentOrSubcommand
                ) {
                    2
                } else {
                    0
                };
                return Ok(RunOutcome::with_code(exit_code));
            }
            _ => {
                return Err((
                    Error::new(ErrorKind::Usage)
                        .with_message(clap_error_summary(&err))
                        .with_hint(clap_error_hint(&err)),
                    ColorMode::Auto,
                ));
            }
        },
    };

    let color_mode = cli.color;
    let options = ParseOptions {
        priority: cli.prefer.into(),
        excerpt_bytes: cli.excerpt_bytes,
    };

    command_dispatch::dispatch_command(cli.command, options, color_mode)
        .map_err(add_io_hint)
        .map_err(add_internal_hint)
        .map_err(|err| (err, color_mode))
}

fn normalize_args<I>(args: I) -> Vec<OsString>
where
    I: IntoIterator<Item = OsString>,
{
    args.into_iter()
        .map(|arg| {
            let replacement = arg.to_str().and_then(|value| match value {
                "---help" => Some("--help"),
                "---version" => Some("--version"),
                _ => None,
            });
            replacement.map(OsString::from).unwrap_or(arg)
        })
        .collect()
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(io::stderr)
        .try_init();
}

#[derive(Parser)]
#[command(
    name = "dniscan",
    version,
    about = "Extract identity fields from decoded DNI PDF417 payloads",
    help_template = r#"{about-with-newline}
{before-help}USAGE
  {usage}

COMMANDS
{subcommands}

OPTIONS
{options}

{after-help}
"#,
    long_about = None,
    before_help = r#"Feed the text a PDF417 decoder produced from the back of the card.

Mental model:
  - `parse` reads one payload and prints a report (record or failure)
  - `batch` reads one payload per line and prints one report per line
  - `manual` validates a number typed by hand
"#,
    after_help = r#"EXAMPLES
  $ dniscan parse '00610299988@JAIME@FEDERICO NICOLAS@M@38437748@C@22/09/1994@28/09/2019@204'
  $ decoder --pdf417 | dniscan parse
  $ dniscan batch --file scans.txt --errors skip
  $ dniscan manual 38437748 --prefill

LOGGING
  Set DNISCAN_LOG (e.g. DNISCAN_LOG=debug) to trace parsing on stderr.

LEARN MORE
  $ dniscan <command> --help"#,
    arg_required_else_help = true,
    disable_help_subcommand = false
)]
struct Cli {
    #[arg(
        long,
        global = true,
        default_value = "auto",
        value_enum,
        help = "Colorize stderr diagnostics and pretty JSON output: auto|always|never"
    )]
    color: ColorMode,
    #[arg(
        long,
        global = true,
        default_value = "at-sign",
        value_enum,
        help = "Delimiter tested first when a payload contains both `@` and `|`"
    )]
    prefer: PreferCli,
    #[arg(
        long,
        global = true,
        default_value_t = DEFAULT_EXCERPT_BYTES,
        help = "Max bytes of the raw payload echoed back in failure reports"
    )]
    excerpt_bytes: usize,

    #[command(subcommand)]
    command: Command,
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum ColorMode {
    Auto,
    Always,
    Never,
}

impl ColorMode {
    fn use_color(self, is_tty: bool) -> bool {
        match self {
            ColorMode::Auto => is_tty,
            ColorMode::Always => true,
            ColorMode::Never => false,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum PreferCli {
    AtSign,
    Pipe,
}

impl From<PreferCli> for SchemePriority {
    fn from(value: PreferCli) -> Self {
        match value {
            PreferCli::AtSign => SchemePriority::AtSignFirst,
            PreferCli::Pipe => SchemePriority::PipeFirst,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, ValueEnum)]
enum ErrorPolicyCli {
    Stop,
    Skip,
}

#[derive(Subcommand)]
enum Command {
    #[command(
        about = "Parse one decoded payload",
        long_about = r#"Parse one decoded payload and print a report.

The payload comes from the argument, or from stdin when omitted or `-`.
On failure the report names the failure kind, echoes a bounded excerpt of
the payload, and lists every digit run that looked like a document number."#,
        after_help = r#"EXAMPLES
  $ dniscan parse 'XYZ 38437748 ABC'
  $ dniscan parse --prefill < scan.txt

NOTES
  - Exit codes: 0 ok, 3 empty input, 4 no document number, 5 wrong length"#
    )]
    Parse {
        #[arg(help = "Decoded payload text (stdin when omitted or `-`)")]
        payload: Option<String>,
        #[arg(long, help = "Print a registration form draft instead of the report")]
        prefill: bool,
    },
    #[command(
        about = "Parse one payload per line",
        long_about = r#"Parse newline-delimited payloads and print one JSON report per line.

Blank lines are ignored. Each report carries its 1-based `line`."#,
        after_help = r#"EXAMPLES
  $ dniscan batch < scans.txt
  $ dniscan batch --file scans.txt --errors skip

NOTES
  - `--errors stop` (default) exits with the first failure's code
  - `--errors skip` keeps going and reports skipped lines as notices on stderr"#
    )]
    Batch {
        #[arg(
            long,
            value_hint = ValueHint::FilePath,
            help = "Read payloads from a file instead of stdin (`-` for stdin)"
        )]
        file: Option<PathBuf>,
        #[arg(
            long,
            short = 'e',
            default_value = "stop",
            value_enum,
            help = "On a rejected line: stop|skip"
        )]
        errors: ErrorPolicyCli,
        #[arg(
            long,
            default_value_t = DEFAULT_MAX_LINE_BYTES,
            help = "Reject lines longer than this many bytes"
        )]
        max_line_bytes: usize,
    },
    #[command(
        about = "Validate a document number typed by hand",
        after_help = r#"EXAMPLES
  $ dniscan manual 38437748
  $ dniscan manual 1234567 --prefill"#
    )]
    Manual {
        #[arg(help = "7 or 8 digit document number")]
        number: String,
        #[arg(long, help = "Print a registration form draft instead of the report")]
        prefill: bool,
    },
    #[command(
        about = "Convert a DD/MM/YYYY birth date to YYYY-MM-DD",
        after_help = r#"EXAMPLES
  $ dniscan iso-date 22/09/1994

NOTES
  - Prints an empty line when the date is not DD/MM/YYYY"#
    )]
    IsoDate {
        #[arg(help = "Birth date as printed on the card")]
        date: String,
    },
    #[command(about = "Print version info")]
    Version,
    #[command(
        arg_required_else_help = true,
        about = "Generate shell completion scripts",
        after_help = r#"EXAMPLES
  $ dniscan completion bash > ~/.local/share/bash-completion/completions/dniscan
  $ dniscan completion zsh > ~/.zfunc/_dniscan
  $ dniscan completion fish > ~/.config/fish/completions/dniscan.fish"#
    )]
    Completion {
        #[arg(help = "Shell to generate completions for")]
        shell: Shell,
    },
}

fn error_policy_to_batch(policy: ErrorPolicyCli) -> ErrorPolicy {
    match policy {
        ErrorPolicyCli::Stop => ErrorPolicy::Stop,
        ErrorPolicyCli::Skip => ErrorPolicy::Skip,
    }
}

fn read_payload_arg(payload: Option<String>) -> Result<String, Error> {
    match payload {
        Some(payload) if payload != "-" => Ok(payload),
        _ => {
            let mut stdin = io::stdin();
            if stdin.is_terminal() {
                return Err(Error::new(ErrorKind::Usage)
                    .with_message("parse requires a payload")
                    .with_hint("Pass the payload as an argument or pipe it on stdin."));
            }
            let mut bytes = Vec::new();
            stdin.read_to_end(&mut bytes).map_err(|err| {
                Error::new(ErrorKind::Io)
                    .with_message("failed to read stdin")
                    .with_source(err)
            })?;
            Ok(bytes
                .to_str_lossy()
                .trim_end_matches(['\n', '\r'])
                .to_string())
        }
    }
}

fn open_batch_reader(path: Option<&Path>) -> Result<Box<dyn Read>, Error> {
    let Some(path) = path.filter(|path| path.as_os_str() != "-") else {
        return Ok(Box::new(io::stdin()));
    };
    let reader = std::fs::File::open(path).map_err(|err| {
        Error::new(ErrorKind::Io)
            .with_message(format!("failed to open payload file {}", path.display()))
            .with_source(err)
    })?;
    Ok(Box::new(reader))
}

fn add_io_hint(err: Error) -> Error {
    if err.hint().is_some() || err.kind() != ErrorKind::Io {
        return err;
    }
    err.with_hint("I/O error. Check the path and that the input stream is readable.")
}

fn add_internal_hint(err: Error) -> Error {
    if err.kind() != ErrorKind::Internal || err.hint().is_some() {
        return err;
    }
    err.with_hint(
        "Unexpected internal failure. Retry with DNISCAN_LOG=debug and share the payload excerpt if it persists.",
    )
}

fn failure_exit_code(failure: &ParseFailure) -> i32 {
    to_exit_code(failure.kind().error_kind())
}

fn draft_json(draft: &RegistrationDraft) -> Result<Value, Error> {
    serde_json::to_value(draft).map_err(|err| {
        Error::new(ErrorKind::Internal)
            .with_message("failed to encode registration draft")
            .with_source(err)
    })
}

fn manual_json(record: &dniscan::api::IdentityRecord) -> Value {
    json!({
        "ok": true,
        "scheme": "manual",
        "record": record_json(record),
        "birth_date_iso": record.birth_date_iso(),
        "candidates": [],
    })
}

fn batch_record_json(record: &BatchRecord) -> Value {
    let mut value = match &record.result {
        Ok(scan) => scan_json(scan),
        Err(failure) => failure_json(failure),
    };
    if let Some(map) = value.as_object_mut() {
        map.insert("line".to_string(), json!(record.line));
    }
    value
}

fn emit_version_output(color_mode: ColorMode) {
    if io::stdout().is_terminal() {
        println!("dniscan {}", env!("CARGO_PKG_VERSION"));
    } else {
        emit_json(
            json!({
                "name": "dniscan",
                "version": env!("CARGO_PKG_VERSION"),
            }),
            color_mode,
        );
    }
}

fn emit_json(value: Value, color_mode: ColorMode) {
    let is_tty = io::stdout().is_terminal();
    let use_color = color_mode.use_color(is_tty);
    let pretty = is_tty || use_color;
    let json = if pretty {
        colorize_json(&value, use_color)
    } else {
        serde_json::to_string(&value)
            .unwrap_or_else(|_| "{\"error\":\"json encode failed\"}".to_string())
    };
    println!("{json}");
}

// Batch output stays one object per line, even on a terminal.
fn emit_jsonl(value: &Value) {
    let json = serde_json::to_string(value)
        .unwrap_or_else(|_| "{\"error\":\"json encode failed\"}".to_string());
    println!("{json}");
}

// Human-facing stderr labels; plain when color is off.
#[derive(Copy, Clone, Debug)]
struct Labels {
    color: bool,
}

impl Labels {
    fn for_stderr(color_mode: ColorMode) -> Self {
        Self {
            color: color_mode.use_color(io::stderr().is_terminal()),
        }
    }

    fn red(self, label: &str) -> String {
        self.paint("31", label)
    }

    fn yellow(self, label: &str) -> String {
        self.paint("33", label)
    }

    fn paint(self, code: &str, label: &str) -> String {
        if self.color {
            format!("\u{1b}[{code}m{label}\u{1b}[0m")
        } else {
            label.to_string()
        }
    }
}

/// Writes one diagnostic to stderr: readable text on a terminal, a JSON line otherwise.
fn emit_stderr(text: impl FnOnce(Labels) -> String, value: Value, color_mode: ColorMode) {
    if io::stderr().is_terminal() {
        eprintln!("{}", text(Labels::for_stderr(color_mode)));
        return;
    }
    match serde_json::to_string(&value) {
        Ok(json) => eprintln!("{json}"),
        Err(_) => eprintln!(
            "{{\"error\":{{\"kind\":\"Internal\",\"message\":\"json encode failed\"}}}}"
        ),
    }
}

fn emit_error(err: &Error, color_mode: ColorMode) {
    emit_stderr(|labels| error_text(err, labels), error_json(err), color_mode);
}

fn emit_notice(notice: &Notice, color_mode: ColorMode) {
    let text = |labels: Labels| match notice.line {
        Some(line) => format!(
            "{} {} (line: {line})",
            labels.yellow("notice:"),
            notice.message
        ),
        None => format!("{} {}", labels.yellow("notice:"), notice.message),
    };
    emit_stderr(text, notice_json(notice), color_mode);
}

fn batch_notice(
    kind: &str,
    line: Option<u64>,
    message: String,
    details: Map<String, Value>,
) -> Notice {
    Notice {
        kind: kind.to_string(),
        time: time::OffsetDateTime::now_utc()
            .format(&time::format_description::well_known::Rfc3339)
            .unwrap_or_else(|_| "unknown".to_string()),
        cmd: "batch".to_string(),
        line,
        message,
        details,
    }
}

fn batch_failure_notice(failure: &BatchFailure, color_mode: ColorMode) {
    let mut details = Map::new();
    details.insert("error_kind".to_string(), json!(failure.error_kind));
    if let Some(snippet) = &failure.snippet {
        details.insert("snippet".to_string(), json!(snippet));
    }
    let notice = batch_notice(
        "batch_skip",
        Some(failure.line),
        format!("Skipped payload: {}.", failure.message),
        details,
    );
    emit_notice(&notice, color_mode);
}

fn batch_summary_notice(outcome: &BatchOutcome, color_mode: ColorMode) {
    let mut details = Map::new();
    details.insert("total".to_string(), json!(outcome.records_total));
    details.insert("ok".to_string(), json!(outcome.ok));
    details.insert("failed".to_string(), json!(outcome.failed));
    let plural = if outcome.failed == 1 { "" } else { "s" };
    let notice = batch_notice(
        "batch_summary",
        None,
        format!("Finished with {} skipped payload{plural}.", outcome.failed),
        details,
    );
    emit_notice(&notice, color_mode);
}

fn error_json(err: &Error) -> Value {
    let mut inner = Map::new();
    inner.insert("kind".to_string(), json!(format!("{:?}", err.kind())));
    inner.insert(
        "message".to_string(),
        json!(err.message().unwrap_or(err.kind().summary())),
    );
    if let Some(hint) = err.hint() {
        inner.insert("hint".to_string(), json!(hint));
    }
    if let Some(excerpt) = err.excerpt() {
        inner.insert("excerpt".to_string(), json!(excerpt));
    }
    if let Some(line) = err.line() {
        inner.insert("line".to_string(), json!(line));
    }
    let causes: Vec<String> = std::iter::successors(err.source(), |&cause| cause.source())
        .map(|cause| cause.to_string())
        .collect();
    if !causes.is_empty() {
        inner.insert("causes".to_string(), json!(causes));
    }
    json!({ "error": inner })
}

fn error_text(err: &Error, labels: Labels) -> String {
    let mut text = format!(
        "{} {}",
        labels.red("error:"),
        err.message().unwrap_or(err.kind().summary())
    );
    let context = [
        ("hint:", err.hint().map(str::to_string)),
        ("payload:", err.excerpt().map(str::to_string)),
        ("line:", err.line().map(|line| line.to_string())),
        ("caused by:", err.source().map(|cause| cause.to_string())),
    ];
    for (label, value) in context {
        if let Some(value) = value {
            text.push('\n');
            text.push_str(&format!("{} {value}", labels.yellow(label)));
        }
    }
    text
}

// First meaningful line of clap's rendering, without its `error:` prefix.
fn clap_error_summary(err: &clap::Error) -> String {
    err.to_string()
        .lines()
        .map(str::trim)
        .find(|line| !line.is_empty())
        .map(|line| line.strip_prefix("error:").unwrap_or(line).trim().to_string())
        .unwrap_or_else(|| "invalid arguments".to_string())
}

fn clap_error_hint(err: &clap::Error) -> String {
    let rendered = err.to_string();
    let usage = rendered
        .lines()
        .find_map(|line| line.trim().strip_prefix("Usage: "))
        .map(str::trim);

    let Some(usage) = usage else {
        return "Try `dniscan --help`.".to_string();
    };

    let tokens: Vec<&str> = usage.split_whitespace().collect();
    let Some(pos) = tokens.iter().position(|t| *t == "dniscan") else {
        return "Try `dniscan --help`.".to_string();
    };

    let parts: Vec<&str> = tokens
        .iter()
        .skip(pos + 1)
        .take_while(|token| {
            !(token.starts_with('-') || token.starts_with('<') || token.starts_with('['))
        })
        .copied()
        .collect();

    if parts.is_empty() {
        return "Try `dniscan --help`.".to_string();
    }
    format!("Try `dniscan {} --help`.", parts.join(" "))
}
