//! Verbose diagnostics for the refresh/parse/layout cycle.
//!
//! Gated by a global flag driven from the `verbose` configuration key.
//! Output goes to stderr so it never interferes with a host that consumes
//! stdout.

use std::io::{self, Write};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

/// Global verbose flag.
static VERBOSE_ENABLED: AtomicBool = AtomicBool::new(false);

/// Start time stored as millis since UNIX epoch (atomic-safe).
static START_TIME_MS: AtomicU64 = AtomicU64::new(0);

/// Enables verbose diagnostics globally.
pub fn enable() {
    let now = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0);
    START_TIME_MS.store(now, Ordering::SeqCst);
    VERBOSE_ENABLED.store(true, Ordering::SeqCst);
}

/// Disables verbose diagnostics globally.
pub fn disable() {
    VERBOSE_ENABLED.store(false, Ordering::SeqCst);
}

/// Returns true if verbose diagnostics are enabled.
#[inline]
pub fn is_enabled() -> bool {
    VERBOSE_ENABLED.load(Ordering::Relaxed)
}

/// Gets elapsed time since diagnostics were enabled.
fn elapsed_ms() -> u64 {
    let start = START_TIME_MS.load(Ordering::Relaxed);
    if start == 0 {
        return 0;
    }
    let now = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0);
    now.saturating_sub(start)
}

/// Diagnostic levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    /// Debug information
    Debug,
    /// Informational messages
    Info,
    /// Warnings
    Warn,
    /// Errors
    Error,
}

impl Level {
    fn as_str(self) -> &'static str {
        match self {
            Level::Debug => "DEBUG",
            Level::Info => "INFO",
            Level::Warn => "WARN",
            Level::Error => "ERROR",
        }
    }
}

/// Logs a message if verbose diagnostics are enabled.
///
/// Format: `[+0000ms] [LEVEL] [component] message`
pub fn log(level: Level, component: &str, message: &str) {
    if !is_enabled() {
        return;
    }

    let _ = writeln!(
        io::stderr(),
        "[+{:04}ms] [{:5}] [{}] {}",
        elapsed_ms(),
        level.as_str(),
        component,
        message
    );
}
