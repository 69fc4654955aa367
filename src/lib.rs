//! # cmdstrip
//!
//! Markup-to-drawing pipeline for a command-driven panel strip.
//!
//! A user-configured shell command prints a compact markup language on
//! stdout; cmdstrip parses it into status elements (circles, bars, text,
//! graph samples), lays them out deterministically on a fixed-size strip,
//! and emits backend-agnostic drawing instructions. Graph samples accumulate
//! in a bounded history that survives restarts through an append-only log.
//!
//! ## Quick Start
//!
//! ```rust
//! use cmdstrip::prelude::*;
//! use std::time::Instant;
//!
//! let config = ChartConfig {
//!     command: "echo 'CR:g|TXT:all good'".to_string(),
//!     ..ChartConfig::default()
//! };
//! let mut scheduler = RefreshScheduler::new(config);
//! scheduler.refresh(Instant::now());
//!
//! let ops = scheduler.layout_ops(24.0, &HeuristicMeasurer);
//! assert!(!ops.is_empty());
//! ```
//!
//! ## Markup
//!
//! Tokens are separated by `|`, lines by `||`:
//!
//! - `CR:<color>` — status circle
//! - `BAR:<min>-<max>=<value>[:<fg>[:<bg>]]` — vertical bar
//! - `HBAR:<min>-<max>=<value>[:<fg>[:<bg>]]` — horizontal bar
//! - `TXT:<text>` / `TXTC:<color>:<text>` — label (`\|` escapes a pipe)
//! - `GR:<color>:<value>[:<min>:<max>]` — background sparkline sample

#![warn(missing_docs)]
// Allow unwrap() in tests only - banned in production code
#![cfg_attr(test, allow(clippy::unwrap_used))]
// Allow common patterns in layout/drawing code
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::module_name_repetitions)]

// ============================================================================
// Core Modules
// ============================================================================

/// Color resolution from markup color specs.
pub mod color;

/// Strip configuration (YAML, kebab-case keys).
pub mod config;

/// Verbose diagnostics on stderr.
pub mod debug;

/// Error types for the library.
pub mod error;

/// Geometric primitives (points, rectangles, sizes).
pub mod geometry;

/// Bounded, log-backed graph history and sparkline state.
pub mod history;

/// Deterministic layout producing drawing instructions.
pub mod layout;

/// Markup tokenizer and parser.
pub mod markup;

/// Refresh scheduling and the command-execution seam.
pub mod scheduler;

/// Shell command execution with timeout.
pub mod subprocess;

// ============================================================================
// Prelude
// ============================================================================

/// Convenient single import for the common pipeline types.
///
/// ```rust
/// use cmdstrip::prelude::*;
/// ```
pub mod prelude {
    pub use crate::color::{ColorSpec, Rgba};
    pub use crate::config::ChartConfig;
    pub use crate::error::{ChartError, Result};
    pub use crate::geometry::{Point, Rect, Size};
    pub use crate::history::{GraphState, GraphStyle, HistoryStore};
    pub use crate::layout::{layout, DrawOp, HeuristicMeasurer, LayoutStyle, TextMeasurer};
    pub use crate::markup::{parse, BarSpec, Document, Element, Line};
    pub use crate::scheduler::{CommandRunner, RefreshScheduler, ShellRunner};
}

// ============================================================================
// Re-exports
// ============================================================================

pub use color::Rgba;
pub use config::ChartConfig;
pub use error::{ChartError, Result};
pub use layout::DrawOp;
pub use markup::{Document, Element};
pub use scheduler::RefreshScheduler;
