//! Logging backend for the `kroki-blocks` binary.
//!
//! Library code logs through the `log` facade only; this module installs the
//! sink. Lines are timestamped and go to stderr, or to the file named by
//! `KROKI_BLOCKS_LOG_FILE` when set, so rendered output on stdout stays clean.
//!
//! Level precedence: `--log-level` flag, then `RUST_LOG`, then `warn`.

use std::fs::{File, OpenOptions};
use std::io::Write;
use std::str::FromStr;
use std::sync::OnceLock;
use std::time::{SystemTime, UNIX_EPOCH};

use log::{LevelFilter, Log, Metadata, Record};
use parking_lot::Mutex;

/// Environment variable naming a log file to append to instead of stderr.
pub const LOG_FILE_ENV: &str = "KROKI_BLOCKS_LOG_FILE";

const DEFAULT_LEVEL: LevelFilter = LevelFilter::Warn;

struct DebugLogger {
    level: LevelFilter,
    file: Mutex<Option<File>>,
}

impl DebugLogger {
    fn write_line(&self, line: &str) {
        let mut file = self.file.lock();
        match file.as_mut() {
            Some(f) => {
                let _ = f.write_all(line.as_bytes());
                let _ = f.flush();
            }
            None => {
                let _ = std::io::stderr().lock().write_all(line.as_bytes());
            }
        }
    }
}

impl Log for DebugLogger {
    fn enabled(&self, metadata: &Metadata<'_>) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record<'_>) {
        if !self.enabled(record.metadata()) {
            return;
        }
        self.write_line(&format!(
            "[{}] [{:<5}] [{}] {}\n",
            get_timestamp(),
            record.level(),
            record.target(),
            record.args()
        ));
    }

    fn flush(&self) {
        if let Some(f) = self.file.lock().as_mut() {
            let _ = f.flush();
        }
    }
}

static LOGGER: OnceLock<DebugLogger> = OnceLock::new();

fn get_timestamp() -> String {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default();
    format!("{}.{:06}", now.as_secs(), now.subsec_micros())
}

/// Resolve the effective level from the CLI flag and `RUST_LOG`.
///
/// Only a bare level in `RUST_LOG` is understood (`debug`, `info`, ...);
/// anything else falls back to the default.
pub fn resolve_level(cli_level: Option<LevelFilter>) -> LevelFilter {
    cli_level
        .or_else(|| {
            std::env::var("RUST_LOG")
                .ok()
                .and_then(|v| LevelFilter::from_str(v.trim()).ok())
        })
        .unwrap_or(DEFAULT_LEVEL)
}

/// Install the logger as the `log` backend. Later calls are no-ops.
pub fn init_log_bridge(cli_level: Option<LevelFilter>) {
    let level = resolve_level(cli_level);
    let file = std::env::var_os(LOG_FILE_ENV).and_then(|path| {
        OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .ok()
    });

    let logger = LOGGER.get_or_init(|| DebugLogger {
        level,
        file: Mutex::new(file),
    });
    if log::set_logger(logger).is_ok() {
        log::set_max_level(logger.level);
    }
}
