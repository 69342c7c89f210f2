use crate::error::{Result, ScoreError};
use chrono::Local;
use env_logger::{Builder, Target, WriteStyle};
use log::{self, Level, LevelFilter};
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::Path;
use std::sync::Mutex;
use yansi::Paint;

/// Diagnostic sink handed to every component at construction
///
/// `debug` and `info` are diagnostics; `console` is the result channel and
/// always reaches the user regardless of verbosity.
pub trait Logger: Send + Sync {
    /// Records a detailed diagnostic
    fn debug(&self, message: &str);
    /// Records a coarse progress or failure diagnostic
    fn info(&self, message: &str);
    /// Emits a line of program output
    fn console(&self, line: &str);
}

/// Forwards diagnostics to the `log` facade and console lines to stdout
#[derive(Debug, Clone, Copy, Default)]
pub struct LogFacade;

impl Logger for LogFacade {
    fn debug(&self, message: &str) {
        log::debug!(target: "trustscore", "{}", message);
    }

    fn info(&self, message: &str) {
        log::info!(target: "trustscore", "{}", message);
    }

    fn console(&self, line: &str) {
        println!("{}", line);
    }
}

/// Keeps every message in memory, for tests and embedding
#[derive(Debug, Default)]
pub struct MemoryLogger {
    records: Mutex<Vec<(Level, String)>>,
    console: Mutex<Vec<String>>,
}

impl MemoryLogger {
    /// Creates an empty logger
    pub fn new() -> Self {
        Self::default()
    }

    /// All diagnostics recorded so far
    pub fn records(&self) -> Vec<(Level, String)> {
        self.records.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    /// All console lines recorded so far
    pub fn console_lines(&self) -> Vec<String> {
        self.console.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    /// Whether a diagnostic at `level` contains `needle`
    pub fn contains(&self, level: Level, needle: &str) -> bool {
        self.records()
            .iter()
            .any(|(l, message)| *l == level && message.contains(needle))
    }

    fn push(&self, level: Level, message: &str) {
        self.records
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push((level, message.to_string()));
    }
}

impl Logger for MemoryLogger {
    fn debug(&self, message: &str) {
        self.push(Level::Debug, message);
    }

    fn info(&self, message: &str) {
        self.push(Level::Info, message);
    }

    fn console(&self, line: &str) {
        self.console
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(line.to_string());
    }
}

/// Initializes the `log` backend, appending to `log_file`
///
/// `log_level` follows [`parse_log_level`]. With the level off the file is
/// still created so that a missing directory surfaces at startup.
pub fn init(log_file: &Path, log_level: &str) -> Result<()> {
    if let Some(parent) = log_file.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    let file = OpenOptions::new().create(true).append(true).open(log_file)?;

    Builder::new()
        .filter_level(parse_log_level(log_level))
        .write_style(WriteStyle::Never)
        .target(Target::Pipe(Box::new(file)))
        .format(|buf, record| writeln!(buf, "{}", format_log(record)))
        .try_init()
        .map_err(|e| ScoreError::Config(format!("Logger already initialized: {}", e)))
}

/// Formats a log record into a structured string
///
/// Returns a formatted string with timestamp, level, and message
pub fn format_log(record: &log::Record) -> String {
    let timestamp = Local::now().format("%d/%m/%Y %H:%M:%S");
    let target = if !record.target().is_empty() {
        record.target()
    } else {
        record.module_path().unwrap_or("unknown")
    };

    format!(
        "{} [{}] [{}] {}",
        timestamp,
        level_label(record.level(), false),
        target,
        record.args()
    )
}

/// A fatal error as printed on stderr before exiting
///
/// The level label is painted when `colored` is set.
pub fn fatal_line(message: &str, colored: bool) -> String {
    format!("{} {}", level_label(Level::Error, colored), message)
}

fn level_label(level: Level, colored: bool) -> String {
    let label = match level {
        Level::Error => "ERROR",
        Level::Warn => "WARN ",
        Level::Info => "INFO ",
        Level::Debug => "DEBUG",
        Level::Trace => "TRACE",
    };
    if !colored {
        return label.to_string();
    }
    match level {
        Level::Error => Paint::red(label).bold().to_string(),
        Level::Warn => Paint::yellow(label).bold().to_string(),
        Level::Info => Paint::cyan(label).bold().to_string(),
        Level::Debug => Paint::blue(label).bold().to_string(),
        Level::Trace => Paint::new(label).to_string(),
    }
}

/// Parses a verbosity setting into a LevelFilter
///
/// Accepts the numeric `LOG_LEVEL` convention (`0` silent, `1` info,
/// `2` debug) as well as level names. Anything else is silent.
pub fn parse_log_level(level: &str) -> LevelFilter {
    match level.trim().to_lowercase().as_str() {
        "1" | "info" => LevelFilter::Info,
        "2" | "debug" => LevelFilter::Debug,
        "error" => LevelFilter::Error,
        "warn" => LevelFilter::Warn,
        "trace" => LevelFilter::Trace,
        _ => LevelFilter::Off,
    }
}
