use std::io::{self, Write};
use std::ops::Range;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::{Instant, SystemTime};

use clap::{Args, Parser, Subcommand};
use color_eyre::Result;
use color_eyre::eyre::{WrapErr, eyre};
use serde::Serialize;

use rainbow_brackets::config::{self, Config};
use rainbow_brackets::render::{self, Report};
use rainbow_brackets::{DocumentSession, EditPlan, Position, ScanResult, SelectTarget};

#[cfg(debug_assertions)]
const DEBUG_LOG_PATH: &str = "/tmp/rainbow-brackets-debug.log";

/// Rainbow bracket matching, mismatch detection and structural bracket editing
#[derive(Parser, Debug)]
#[command(
    version,
    about = "Rainbow bracket matching, mismatch detection and structural bracket editing"
)]
struct Cli {
    /// Syntax to use instead of detecting it from the file extension
    #[arg(long, global = true, value_name = "NAME")]
    syntax: Option<String>,

    /// Config file (default: ~/.config/rainbow-brackets/config.toml)
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Write debug logs to stderr
    #[arg(long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Args, Debug)]
struct Input {
    /// Input file (if not provided, reads from stdin)
    file: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct Cursors {
    /// Character offset `A` or selection `A..B`; repeat for multiple cursors
    #[arg(long = "cursor", value_name = "A[..B]", value_parser = parse_cursor, required = true)]
    cursors: Vec<Range<usize>>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the text with every bracket colored by its nesting level
    Paint {
        #[command(flatten)]
        input: Input,

        /// Only scan a window around this character offset
        #[arg(long, value_name = "OFFSET")]
        window_at: Option<usize>,

        /// Print level markers under each line instead of colors
        #[arg(long, conflicts_with = "json")]
        annotate: bool,

        /// Print a JSON report instead of the text
        #[arg(long)]
        json: bool,
    },

    /// Report mismatched closers and unclosed openers; exits 1 if any
    Check {
        #[command(flatten)]
        input: Input,
    },

    /// Print the matched pairs as an indented tree
    Tree {
        #[command(flatten)]
        input: Input,
    },

    /// Grow each cursor to its enclosing pair
    Select {
        #[command(flatten)]
        input: Input,

        #[command(flatten)]
        cursors: Cursors,

        /// Bracket (either side) or leading word of the pair to select
        #[arg(long)]
        target: Option<String>,

        #[arg(long)]
        json: bool,
    },

    /// Delete the brackets of each enclosing pair
    Remove {
        #[command(flatten)]
        input: Input,

        #[command(flatten)]
        cursors: Cursors,

        /// Select what was between the removed brackets
        #[arg(long)]
        select_content: bool,

        #[arg(long)]
        json: bool,
    },

    /// Change the bracket type of each enclosing pair
    Retype {
        #[command(flatten)]
        input: Input,

        #[command(flatten)]
        cursors: Cursors,

        /// New opening bracket
        #[arg(long, value_name = "CHAR")]
        to: char,

        #[arg(long)]
        json: bool,
    },
}

impl Command {
    fn input(&self) -> &Input {
        match self {
            Command::Paint { input, .. }
            | Command::Check { input }
            | Command::Tree { input }
            | Command::Select { input, .. }
            | Command::Remove { input, .. }
            | Command::Retype { input, .. } => input,
        }
    }
}

fn main() -> Result<ExitCode> {
    color_eyre::install()?;

    let cli = Cli::parse();

    let config_result = match &cli.config {
        Some(path) => config::load_config_from(path),
        None => config::load_config(),
    };

    init_logging(cli.debug || config_result.config.debug);

    if let Some(warning) = &config_result.warning {
        eprintln!("warning: {}", warning);
    }

    let code = run(cli, config_result.config)?;

    log::debug!("=== RAINBOW-BRACKETS SESSION ENDED ===");

    Ok(code)
}

/// Logs to stderr with `--debug`; debug builds otherwise log to a file
fn init_logging(debug: bool) {
    if debug {
        env_logger::Builder::new()
            .filter_level(log::LevelFilter::Debug)
            .format(format_record)
            .init();
        log::debug!("=== RAINBOW-BRACKETS SESSION STARTED ===");
        return;
    }

    // Writes to /tmp/rainbow-brackets-debug.log at DEBUG level
    #[cfg(debug_assertions)]
    {
        let Ok(log_file) = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(DEBUG_LOG_PATH)
        else {
            eprintln!("warning: could not open {}", DEBUG_LOG_PATH);
            return;
        };

        env_logger::Builder::new()
            .filter_level(log::LevelFilter::Debug)
            .target(env_logger::Target::Pipe(Box::new(log_file)))
            .format(format_record)
            .init();

        log::debug!("=== RAINBOW-BRACKETS DEBUG SESSION STARTED ===");
    }
}

fn format_record(buf: &mut env_logger::fmt::Formatter, record: &log::Record) -> io::Result<()> {
    let datetime: chrono::DateTime<chrono::Local> = SystemTime::now().into();
    writeln!(
        buf,
        "[{}] [{}] {}",
        datetime.format("%Y-%m-%dT%H:%M:%S%.3f"),
        record.level(),
        record.args()
    )
}

/// Parses `A` as an empty cursor and `A..B` as a selection.
fn parse_cursor(arg: &str) -> Result<Range<usize>, String> {
    let offset = |s: &str| {
        s.trim()
            .parse::<usize>()
            .map_err(|e| format!("invalid offset {:?}: {}", s, e))
    };
    match arg.split_once("..") {
        None => {
            let at = offset(arg)?;
            Ok(at..at)
        }
        Some((start, end)) => {
            let (start, end) = (offset(start)?, offset(end)?);
            if start > end {
                return Err(format!("selection {:?} ends before it starts", arg));
            }
            Ok(start..end)
        }
    }
}

fn read_input(path: Option<&Path>) -> Result<String> {
    match path {
        Some(path) => std::fs::read_to_string(path)
            .wrap_err_with(|| format!("Failed to read {}", path.display())),
        None => io::read_to_string(io::stdin()).wrap_err("Failed to read stdin"),
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Edited text together with the plan that produced it.
#[derive(Serialize)]
struct EditOutput<'a> {
    text: String,
    plan: &'a EditPlan,
}

fn run(cli: Cli, mut config: Config) -> Result<ExitCode> {
    let file = cli.command.input().file.clone();
    let label = file
        .as_ref()
        .map_or_else(|| "<stdin>".to_string(), |p| p.display().to_string());

    let text = read_input(file.as_deref())?;
    let syntax = config.syntax_for_path(cli.syntax.as_deref(), file.as_deref());
    let settings = config.resolve(&syntax)?;

    log::debug!(
        "{}: syntax {}, {} chars",
        label,
        syntax,
        text.chars().count()
    );

    if let Command::Paint {
        window_at: Some(_), ..
    } = &cli.command
    {
        config.large_file_threshold = 0;
    }

    let mut doc = DocumentSession::new(settings, &config, &text)?;

    match cli.command {
        Command::Paint {
            window_at,
            annotate,
            json,
            ..
        } => {
            if let Some(offset) = window_at {
                doc.set_cursor(offset);
            }
            if doc.settings().enabled {
                doc.color()?;
            } else {
                doc.refresh()?;
            }

            if json {
                print_json(&report(&doc)?)?;
            } else if annotate {
                println!("{}", render::annotate(doc.chars(), &doc.marks()));
            } else {
                let painted = render::paint(doc.chars(), &doc.marks(), &doc.settings().palette);
                io::stdout().write_all(painted.as_bytes())?;
            }
        }

        Command::Check { .. } => {
            tree_scan(&mut doc)?;
            return Ok(check(&label, doc.chars(), scanned(&doc)?));
        }

        Command::Tree { .. } => {
            tree_scan(&mut doc)?;
            let scan = scanned(&doc)?;
            let outline = render::outline(&scan.forest, &doc.settings().table);
            if !outline.is_empty() {
                println!("{}", outline);
            }
        }

        Command::Select {
            cursors,
            target,
            json,
            ..
        } => {
            let target = target
                .as_deref()
                .and_then(|t| SelectTarget::parse(t, &doc.settings().table));
            let selections = doc.select(&cursors.cursors, target.as_ref())?;

            if json {
                print_json(&selections)?;
            } else {
                for selection in selections {
                    println!("{}..{}", selection.start, selection.end);
                }
            }
        }

        Command::Remove {
            cursors,
            select_content,
            json,
            ..
        } => {
            let plan = doc.remove(&cursors.cursors, select_content)?;
            if json {
                print_json(&EditOutput {
                    text: doc.text(),
                    plan: &plan,
                })?;
            } else {
                io::stdout().write_all(doc.text().as_bytes())?;
            }
        }

        Command::Retype {
            cursors, to, json, ..
        } => {
            let plan = doc.retype(&cursors.cursors, to, Instant::now())?;
            if json {
                print_json(&EditOutput {
                    text: doc.text(),
                    plan: &plan,
                })?;
            } else {
                io::stdout().write_all(doc.text().as_bytes())?;
            }
        }
    }

    doc.close();
    Ok(ExitCode::SUCCESS)
}

fn report(doc: &DocumentSession) -> Result<Report> {
    doc.report().ok_or_else(|| eyre!("document was not scanned"))
}

/// Full scan without colors, for commands that only need the structure.
fn tree_scan(doc: &mut DocumentSession) -> Result<()> {
    doc.sweep();
    doc.refresh()?;
    Ok(())
}

fn scanned(doc: &DocumentSession) -> Result<&ScanResult> {
    doc.scan().ok_or_else(|| eyre!("document was not scanned"))
}

fn check(label: &str, text: &[char], scan: &ScanResult) -> ExitCode {
    let mut problems: Vec<(Position, &str)> = scan
        .mismatches
        .iter()
        .map(|&p| (p, "mismatched closing bracket"))
        .chain(scan.unclosed.iter().map(|&p| (p, "unclosed opening bracket")))
        .collect();
    problems.sort();

    if problems.is_empty() {
        println!(
            "{}: ok ({} pairs, max depth {})",
            label,
            scan.forest.pair_count(),
            scan.forest.max_depth()
        );
        return ExitCode::SUCCESS;
    }

    for (position, message) in &problems {
        let (line, column) = render::line_col(text, position.start);
        let bracket = text.get(position.start).copied().unwrap_or('?');
        println!("{}:{}:{}: {} '{}'", label, line, column, message, bracket);
    }
    ExitCode::FAILURE
}
