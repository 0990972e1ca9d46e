//! Tracing bootstrap and the host-framework log bridge.

use std::io;

use tracing::Level;
use tracing_subscriber::EnvFilter;

/// Install a plain-text subscriber filtered by `RUST_LOG`. Safe to call
/// more than once; later calls are no-ops.
pub fn init() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .try_init();
}

/// Install a JSON subscriber filtered by `RUST_LOG`.
pub fn init_json() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init();
}

/// An `io::Write` sink to hand to a host framework that logs through plain
/// writers, so its output lands in the same structured stream as ours.
///
/// Each written chunk is reformatted: the configured debug prefix is
/// stripped, `[WARNING]` / `[ERROR]` markers promote the level, double
/// quotes and tabs are normalized, and multi-line chunks become one event
/// per line.
pub struct HostLogWriter {
    level: Level,
    prefix: String,
}

impl HostLogWriter {
    pub fn new(level: Level) -> Self {
        Self {
            level,
            prefix: String::new(),
        }
    }

    /// Strip this prefix (e.g. the host's `[FRAMEWORK-debug]` marker) from
    /// every line before emitting it.
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    fn classify<'a>(&self, raw: &'a str) -> (Level, &'a str) {
        let mut message = raw.trim();
        if !self.prefix.is_empty() {
            message = message.strip_prefix(&self.prefix).unwrap_or(message).trim();
        }
        let mut level = self.level;
        if let Some(rest) = message.strip_prefix("[WARNING]") {
            message = rest.trim();
            level = Level::WARN;
        }
        if let Some(rest) = message.strip_prefix("[ERROR]") {
            message = rest.trim();
            level = Level::ERROR;
        }
        (level, message)
    }
}

impl io::Write for HostLogWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let chunk = String::from_utf8_lossy(buf);
        let (level, message) = self.classify(&chunk);
        let normalized = message.replace('"', "'").replace('\t', "  ");
        for line in normalized.lines() {
            let line = line.trim();
            if !line.is_empty() {
                emit(level, line);
            }
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

fn emit(level: Level, message: &str) {
    match level {
        Level::ERROR => tracing::error!(target: "routebind::host", "{message}"),
        Level::WARN => tracing::warn!(target: "routebind::host", "{message}"),
        Level::INFO => tracing::info!(target: "routebind::host", "{message}"),
        Level::DEBUG => tracing::debug!(target: "routebind::host", "{message}"),
        Level::TRACE => tracing::trace!(target: "routebind::host", "{message}"),
    }
}
