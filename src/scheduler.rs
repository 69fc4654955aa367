//! Refresh scheduling: run the command, parse, hold the latest document.
//!
//! The scheduler owns the configuration, the graph state, and the most
//! recent parsed document. The timer is a plain deadline that is explicitly
//! re-armed after each refresh completes, so a slow command delays the next
//! cycle instead of stacking overlapping runs.

use std::time::{Duration, Instant};

use crate::config::ChartConfig;
use crate::debug::{self, Level};
use crate::geometry::Size;
use crate::history::{GraphState, HistoryStore};
use crate::layout::{self, DrawOp, LayoutStyle, TextMeasurer};
use crate::markup::{self, Document};
use crate::subprocess;

/// Command execution seam, so refresh logic is testable without a shell.
pub trait CommandRunner {
    /// Runs a command line and returns its stdout, empty on failure.
    fn run(&self, command: &str, timeout: Duration) -> String;
}

/// Production runner backed by `sh -c` with a timeout.
#[derive(Debug, Clone, Copy, Default)]
pub struct ShellRunner;

impl CommandRunner for ShellRunner {
    fn run(&self, command: &str, timeout: Duration) -> String {
        subprocess::capture_markup(command, timeout)
    }
}

/// Drives the periodic refresh cycle and owns its results.
#[derive(Debug)]
pub struct RefreshScheduler<R: CommandRunner> {
    runner: R,
    config: ChartConfig,
    graph: GraphState,
    document: Document,
    deadline: Option<Instant>,
}

impl RefreshScheduler<ShellRunner> {
    /// Creates a scheduler with the shell runner and memory-only history.
    #[must_use]
    pub fn new(config: ChartConfig) -> Self {
        Self::with_runner(config, ShellRunner)
    }
}

impl<R: CommandRunner> RefreshScheduler<R> {
    /// Creates a scheduler with a custom runner and memory-only history.
    #[must_use]
    pub fn with_runner(config: ChartConfig, runner: R) -> Self {
        let history = HistoryStore::new(config.history_len);
        Self::assemble(config, runner, history)
    }

    /// Creates a scheduler whose history replays from and appends to a log.
    #[must_use]
    pub fn with_history_log(config: ChartConfig, runner: R, log_path: std::path::PathBuf) -> Self {
        let history = HistoryStore::with_log(config.history_len, log_path);
        Self::assemble(config, runner, history)
    }

    fn assemble(config: ChartConfig, runner: R, history: HistoryStore) -> Self {
        if config.verbose {
            debug::enable();
        }
        Self {
            runner,
            config,
            graph: GraphState::new(history),
            document: Document::default(),
            deadline: None,
        }
    }

    /// The most recently parsed document.
    #[must_use]
    pub fn document(&self) -> &Document {
        &self.document
    }

    /// The current configuration.
    #[must_use]
    pub fn config(&self) -> &ChartConfig {
        &self.config
    }

    /// The graph state accumulated across refreshes.
    #[must_use]
    pub fn graph(&self) -> &GraphState {
        &self.graph
    }

    /// Runs one refresh cycle now and re-arms the timer from `now`.
    ///
    /// The command's stdout replaces the current document wholesale; graph
    /// samples accumulate into the owned history.
    pub fn refresh(&mut self, now: Instant) {
        let raw = self.runner.run(&self.config.command, self.config.cmd_timeout());
        debug::log(
            Level::Debug,
            "scheduler",
            &format!("refreshed: {} bytes of markup", raw.len()),
        );
        self.document = markup::parse(&raw, &mut self.graph);
        self.deadline = Some(now + self.config.update_interval());
    }

    /// Refreshes if the deadline has passed (or never armed).
    ///
    /// Returns true when a refresh ran, so the caller knows to redraw.
    pub fn poll(&mut self, now: Instant) -> bool {
        let due = match self.deadline {
            None => true,
            Some(deadline) => now >= deadline,
        };
        if due {
            self.refresh(now);
        }
        due
    }

    /// Replaces the configuration, re-arming the timer from `now`.
    ///
    /// History capacity follows the new value (a shrink lands on the next
    /// sample), and the verbose flag toggles global diagnostics.
    pub fn apply_config(&mut self, config: ChartConfig, now: Instant) {
        if config.verbose {
            debug::enable();
        } else {
            debug::disable();
        }
        self.graph.history.set_capacity(config.history_len);
        self.deadline = Some(now + config.update_interval());
        self.config = config;
    }

    /// Lays out the current document for a canvas of the configured width.
    #[must_use]
    pub fn layout_ops(&self, height: f32, measurer: &dyn TextMeasurer) -> Vec<DrawOp> {
        let canvas = Size::new(self.config.chart_width, height);
        let style = LayoutStyle::from(&self.config);
        layout::layout(&self.document, canvas, &style, &self.graph, measurer)
    }
}
