//! Bounded history buffer feeding the sparkline, plus the graph style it
//! carries.
//!
//! Properties:
//!
//! - **Bounded capacity**: the in-memory sequence never exceeds the
//!   configured length; oldest values are evicted FIFO.
//! - **Append-only log**: every recorded value is mirrored to a text log
//!   (one value per line) that is never truncated — unbounded on disk,
//!   bounded in memory.
//! - **Replay on load**: a cold start replays the log, skips non-finite
//!   values, and keeps only the most recent `capacity` entries.

use std::collections::VecDeque;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::color::Rgba;
use crate::debug::{self, Level};

/// A bounded, optionally log-backed sequence of observed scalar values.
#[derive(Debug)]
pub struct HistoryStore {
    /// In-memory window, oldest first.
    data: VecDeque<f64>,
    /// Maximum number of in-memory entries.
    capacity: usize,
    /// Append-only persistence target. `None` keeps history memory-only.
    log_path: Option<PathBuf>,
}

impl HistoryStore {
    /// Creates a memory-only store with the given capacity.
    ///
    /// A capacity of zero is treated as one; the store must be able to hold
    /// at least the latest sample.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            data: VecDeque::with_capacity(capacity),
            capacity,
            log_path: None,
        }
    }

    /// Creates a store backed by an append-only log, replaying any existing
    /// log contents.
    ///
    /// Unreadable or absent logs start the store empty; replayed lines that
    /// do not parse to a finite float are skipped; only the most recent
    /// `capacity` values are kept in memory.
    #[must_use]
    pub fn with_log(capacity: usize, path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let mut store = Self::new(capacity);

        if let Ok(contents) = fs::read_to_string(&path) {
            let values = contents
                .lines()
                .filter_map(|line| line.trim().parse::<f64>().ok())
                .filter(|v| v.is_finite());
            for value in values {
                store.push_bounded(value);
            }
        }

        store.log_path = Some(path);
        store
    }

    /// Default log location under the user data directory.
    #[must_use]
    pub fn default_log_path() -> Option<PathBuf> {
        dirs::data_dir().map(|d| d.join("cmdstrip").join("history.txt"))
    }

    /// Records a value: bounded in-memory append plus best-effort log append.
    ///
    /// Persistence failures are logged through the debug channel and
    /// swallowed; history continues in-memory-only for that cycle.
    pub fn record(&mut self, value: f64) {
        self.push_bounded(value);

        if let Some(path) = self.log_path.clone() {
            if let Err(e) = append_log_line(&path, value) {
                debug::log(
                    Level::Warn,
                    "history",
                    &format!("log append failed at '{}': {e}", path.display()),
                );
            }
        }
    }

    /// Appends in memory, evicting from the front once over capacity.
    ///
    /// Also where a shrunken capacity takes effect: the loop drains any
    /// surplus left by a prior `set_capacity` call.
    fn push_bounded(&mut self, value: f64) {
        self.data.push_back(value);
        while self.data.len() > self.capacity {
            self.data.pop_front();
        }
    }

    /// Updates the capacity. A shrink is enforced on the next [`record`].
    ///
    /// [`record`]: HistoryStore::record
    pub fn set_capacity(&mut self, capacity: usize) {
        self.capacity = capacity.max(1);
    }

    /// Returns the current number of values.
    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns true if no values have been recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Returns the configured capacity.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Iterates values from oldest to newest.
    pub fn iter(&self) -> impl Iterator<Item = f64> + '_ {
        self.data.iter().copied()
    }

    /// Returns the live (min, max) of the buffer, or `None` when empty.
    #[must_use]
    pub fn extent(&self) -> Option<(f64, f64)> {
        if self.data.is_empty() {
            return None;
        }
        let mut min = f64::INFINITY;
        let mut max = f64::NEG_INFINITY;
        for &v in &self.data {
            min = min.min(v);
            max = max.max(v);
        }
        Some((min, max))
    }
}

/// Appends one raw value to the log, creating the parent directory on first
/// use.
fn append_log_line(path: &Path, value: f64) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let mut file = OpenOptions::new().create(true).append(true).open(path)?;
    writeln!(file, "{value}")
}

/// Style of the background sparkline, mutated only by `GR:` tokens.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GraphStyle {
    /// Stroke/fill color of the sparkline.
    pub color: Rgba,
    /// Fixed `(min, max)` scale override; `None` auto-scales to the live
    /// history extent.
    pub bounds: Option<(f64, f64)>,
    /// Set once the first graph sample has ever been observed; the sparkline
    /// draws only after that.
    pub enabled: bool,
}

impl Default for GraphStyle {
    fn default() -> Self {
        Self {
            color: Rgba::GREEN,
            bounds: None,
            enabled: false,
        }
    }
}

/// History plus style, owned by the refresh scheduler and passed by
/// reference into the parser (mutation) and the layout engine (read).
#[derive(Debug)]
pub struct GraphState {
    /// Recorded samples.
    pub history: HistoryStore,
    /// Current sparkline style.
    pub style: GraphStyle,
}

impl GraphState {
    /// Creates graph state around an existing history store.
    #[must_use]
    pub fn new(history: HistoryStore) -> Self {
        Self {
            history,
            style: GraphStyle::default(),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================


// ============================================================================
// Property-based tests
// ============================================================================

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// The in-memory window is always bounded by capacity.
        #[test]
        fn prop_never_exceeds_capacity(
            capacity in 1usize..200,
            pushes in 0usize..1000
        ) {
            let mut store = HistoryStore::new(capacity);
            for i in 0..pushes {
                store.record(i as f64);
            }
            prop_assert!(store.len() <= capacity);
            prop_assert_eq!(store.len(), pushes.min(capacity));
        }

        /// After overflow the window holds exactly the most recent values in
        /// original order.
        #[test]
        fn prop_window_is_suffix_of_input(
            capacity in 1usize..50,
            values in prop::collection::vec(-1e6f64..1e6, 1..300)
        ) {
            let mut store = HistoryStore::new(capacity);
            for &v in &values {
                store.record(v);
            }
            let got: Vec<f64> = store.iter().collect();
            let skip = values.len().saturating_sub(capacity);
            let expected: Vec<f64> = values[skip..].to_vec();
            prop_assert_eq!(got, expected);
        }
    }
}
