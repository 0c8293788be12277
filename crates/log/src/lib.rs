//! Diagnostics for the wallet codec.
//!
//! Records are written to stderr as text or JSON lines, and can also be kept
//! in a bounded in-memory ring so a caller can look at what a load reported.

use std::collections::VecDeque;
use std::fmt;
use std::io::{self, Write};
use std::sync::atomic::{AtomicBool, AtomicU8, AtomicUsize, Ordering};
use std::sync::{Mutex, OnceLock, PoisonError};
use std::time::{SystemTime, UNIX_EPOCH};

use serde_json::json;

#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd)]
pub enum Level {
    Error = 1,
    Warn = 2,
    Info = 3,
    Debug = 4,
}

impl Level {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Error => "ERROR",
            Self::Warn => "WARN",
            Self::Info => "INFO",
            Self::Debug => "DEBUG",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "error" => Some(Self::Error),
            "warn" | "warning" => Some(Self::Warn),
            "info" => Some(Self::Info),
            "debug" => Some(Self::Debug),
            _ => None,
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Format {
    Text = 0,
    Json = 1,
}

impl Format {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "text" => Some(Self::Text),
            "json" => Some(Self::Json),
            _ => None,
        }
    }
}

/// Process-wide logging setup applied by [`init`].
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct LogConfig {
    pub level: Level,
    pub format: Format,
    pub timestamps: bool,
    pub stderr: bool,
    /// Records kept in memory; zero disables capture.
    pub capture: usize,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: Level::Info,
            format: Format::Text,
            timestamps: true,
            stderr: true,
            capture: 0,
        }
    }
}

impl LogConfig {
    /// Builds a config from textual level/format names, keeping defaults for
    /// anything that does not parse.
    pub fn from_names(level: Option<&str>, format: Option<&str>) -> Self {
        let defaults = Self::default();
        Self {
            level: level.and_then(Level::parse).unwrap_or(defaults.level),
            format: format.and_then(Format::parse).unwrap_or(defaults.format),
            ..defaults
        }
    }

    /// Silent on stderr; keeps the last `capacity` records at `level` or above.
    pub fn capture_only(level: Level, capacity: usize) -> Self {
        Self {
            level,
            stderr: false,
            capture: capacity,
            ..Self::default()
        }
    }
}

static LEVEL: AtomicU8 = AtomicU8::new(Level::Info as u8);
static FORMAT: AtomicU8 = AtomicU8::new(Format::Text as u8);
static TIMESTAMPS: AtomicBool = AtomicBool::new(true);
static STDERR: AtomicBool = AtomicBool::new(true);
static CAPTURE_CAPACITY: AtomicUsize = AtomicUsize::new(0);
static CAPTURED: OnceLock<Mutex<VecDeque<Record>>> = OnceLock::new();

/// A captured diagnostic.
#[derive(Clone, Debug)]
pub struct Record {
    pub ts_ms: u64,
    pub level: Level,
    pub target: &'static str,
    pub msg: String,
}

pub fn init(config: LogConfig) {
    LEVEL.store(config.level as u8, Ordering::Relaxed);
    FORMAT.store(config.format as u8, Ordering::Relaxed);
    TIMESTAMPS.store(config.timestamps, Ordering::Relaxed);
    STDERR.store(config.stderr, Ordering::Relaxed);
    CAPTURE_CAPACITY.store(config.capture, Ordering::Relaxed);
    if config.capture > 0 {
        CAPTURED.get_or_init(|| Mutex::new(VecDeque::with_capacity(config.capture.min(4096))));
    }
}

/// Captured records, oldest first.
pub fn captured() -> Vec<Record> {
    let Some(buf) = CAPTURED.get() else {
        return Vec::new();
    };
    buf.lock()
        .unwrap_or_else(PoisonError::into_inner)
        .iter()
        .cloned()
        .collect()
}

pub fn enabled(level: Level) -> bool {
    level as u8 <= LEVEL.load(Ordering::Relaxed)
}

#[doc(hidden)]
pub fn log(level: Level, target: &'static str, args: fmt::Arguments<'_>) {
    if !enabled(level) {
        return;
    }
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default();
    let record = Record {
        ts_ms: now.as_millis().try_into().unwrap_or(u64::MAX),
        level,
        target,
        msg: args.to_string(),
    };

    if STDERR.load(Ordering::Relaxed) {
        write_stderr(&record);
    }

    let capacity = CAPTURE_CAPACITY.load(Ordering::Relaxed);
    if capacity == 0 {
        return;
    }
    let Some(buf) = CAPTURED.get() else {
        return;
    };
    let mut guard = buf.lock().unwrap_or_else(PoisonError::into_inner);
    guard.push_back(record);
    while guard.len() > capacity {
        guard.pop_front();
    }
}

fn write_stderr(record: &Record) {
    let mut out = io::stderr().lock();
    if FORMAT.load(Ordering::Relaxed) == Format::Json as u8 {
        let line = json!({
            "ts_ms": record.ts_ms,
            "level": record.level.as_str(),
            "target": record.target,
            "msg": record.msg,
        });
        let _ = writeln!(out, "{line}");
        return;
    }
    if TIMESTAMPS.load(Ordering::Relaxed) {
        let _ = write!(out, "{}.{:03} ", record.ts_ms / 1000, record.ts_ms % 1000);
    }
    let _ = writeln!(
        out,
        "{} {}: {}",
        record.level.as_str(),
        record.target,
        record.msg
    );
}

#[macro_export]
macro_rules! log_at {
    ($level:expr, $($arg:tt)*) => {{
        if $crate::enabled($level) {
            $crate::log($level, module_path!(), format_args!($($arg)*));
        }
    }};
}

#[macro_export]
macro_rules! log_warn {
    ($($arg:tt)*) => {{
        $crate::log_at!($crate::Level::Warn, $($arg)*);
    }};
}

#[macro_export]
macro_rules! log_info {
    ($($arg:tt)*) => {{
        $crate::log_at!($crate::Level::Info, $($arg)*);
    }};
}

#[macro_export]
macro_rules! log_debug {
    ($($arg:tt)*) => {{
        $crate::log_at!($crate::Level::Debug, $($arg)*);
    }};
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_level() {
        assert_eq!(Level::parse("info"), Some(Level::Info));
        assert_eq!(Level::parse("WARN"), Some(Level::Warn));
        assert_eq!(Level::parse("warning"), Some(Level::Warn));
        assert_eq!(Level::parse("trace"), None);
    }

    #[test]
    fn config_from_names_falls_back() {
        let config = LogConfig::from_names(Some("debug"), Some("yaml"));
        assert_eq!(config.level, Level::Debug);
        assert_eq!(config.format, Format::Text);
        assert_eq!(LogConfig::from_names(None, None), LogConfig::default());
    }

    #[test]
    fn capture_keeps_most_recent() {
        init(LogConfig::capture_only(Level::Debug, 1024));
        log_warn!("capture-check {}", 1);
        log_debug!("capture-check {}", 2);
        let checks: Vec<_> = captured()
            .into_iter()
            .filter(|entry| entry.msg.starts_with("capture-check"))
            .collect();
        assert_eq!(checks.len(), 2);
        assert_eq!(checks[1].msg, "capture-check 2");
        assert_eq!(checks[1].level, Level::Debug);
        assert_eq!(checks[0].level, Level::Warn);
    }
}
