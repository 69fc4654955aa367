//! Tokenizer/parser for the command-output markup.
//!
//! One command output describes a row of widgets. Lines are separated by the
//! literal `||`; tokens within a line by an unescaped `|` (a `|` whose
//! immediately preceding character is not `\`). Spaces around a token
//! delimiter are discarded, and `\|` inside `TXT`/`TXTC` payloads restores a
//! literal pipe.
//!
//! Token vocabulary, classified by the keyword before the first `:`:
//!
//! | Prefix | Payload | Produces |
//! |---|---|---|
//! | `CR:` | `<color>` | colored circle |
//! | `BAR:` / `HBAR:` | `<min>-<max>=<value>[:<fg>[:<bg>]]` | vertical / horizontal bar |
//! | `TXTC:` | `<color>:<text>` | colored text |
//! | `TXT:` | `<text>` | text in the default label color |
//! | `GR:` | `<color>:<value>[:<min>:<max>]` | graph sample (side effect only) |
//!
//! Parsing is total: a malformed `CR`/`BAR`/`HBAR`/`GR` token is dropped, a
//! malformed `TXTC` token degrades to a fixed `"Parse error"` placeholder so
//! the row width stays predictable, and an unknown keyword is skipped
//! silently. Nothing aborts the line or the document.

use crate::color::{self, ColorSpec};
use crate::debug::{self, Level};
use crate::history::GraphState;

/// Placeholder content substituted for malformed text tokens.
pub const PARSE_ERROR_PLACEHOLDER: &str = "Parse error";

/// An ordered sequence of lines, produced fresh on every parse.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Document {
    lines: Vec<Line>,
}

impl Document {
    /// The parsed lines, in input order.
    #[must_use]
    pub fn lines(&self) -> &[Line] {
        &self.lines
    }

    /// Number of lines (equals the number of `||`-delimited input segments).
    #[must_use]
    pub fn line_count(&self) -> usize {
        self.lines.len()
    }
}

/// An ordered sequence of elements on one horizontal band of the strip.
///
/// May be empty: an empty input segment still yields a line placeholder, and
/// a line whose tokens all failed stays in the document.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Line {
    elements: Vec<Element>,
}

impl Line {
    /// The surviving elements, in token order.
    #[must_use]
    pub fn elements(&self) -> &[Element] {
        &self.elements
    }

    /// Returns true if no element survived on this line.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }
}

/// Numeric body shared by vertical and horizontal bars.
#[derive(Debug, Clone, PartialEq)]
pub struct BarSpec {
    /// Lower bound of the configured range.
    pub min: i64,
    /// Upper bound of the configured range.
    pub max: i64,
    /// Observed value; may fall outside `[min, max]`.
    pub value: f64,
    /// Fill color (defaults to `g` when the token carries no color group).
    pub fg: ColorSpec,
    /// Explicit background color; `None` lets the renderer compute the
    /// complementary translucent fallback.
    pub bg: Option<ColorSpec>,
}

impl BarSpec {
    /// Fill fraction `(value - min) / (max - min)`.
    ///
    /// Defined as 0 when `max <= min` (no division). Deliberately not
    /// clamped to [0, 1]: out-of-range values overdraw or underdraw
    /// proportionally, matching the numeric model of the grammar.
    #[must_use]
    pub fn percentage(&self) -> f64 {
        if self.max <= self.min {
            return 0.0;
        }
        (self.value - self.min as f64) / (self.max - self.min) as f64
    }
}

/// A typed, renderable unit produced from one token.
///
/// `GR:` tokens are not elements; they mutate [`GraphState`] and vanish.
#[derive(Debug, Clone, PartialEq)]
pub enum Element {
    /// A colored status dot.
    Circle {
        /// Dot color.
        color: ColorSpec,
    },
    /// A vertical progress bar.
    Bar(BarSpec),
    /// A horizontal progress bar.
    HBar(BarSpec),
    /// A text run.
    Text {
        /// Text content, with `\|` escapes already restored.
        content: String,
        /// Explicit color; `None` means the configured default label color.
        color: Option<ColorSpec>,
    },
}

/// Why a single token failed; folded into drop-or-placeholder per token kind.
#[derive(Debug)]
struct ParseFailure {
    reason: &'static str,
}

impl ParseFailure {
    const fn new(reason: &'static str) -> Self {
        Self { reason }
    }
}

/// Parses one command output into a [`Document`].
///
/// Never errors past this boundary; always returns a document whose line
/// count equals the number of `||`-delimited segments (including empty
/// ones). Pure except for the `GR:` side channel into `graph`.
///
/// A legacy `NL|` line-count prefix (N a digit 1-4) is stripped and
/// otherwise ignored. `TXTC` payloads must split into exactly color and
/// text; additional colons in the text make the token malformed and yield
/// the placeholder (preserved from the observed behavior of the original
/// format).
pub fn parse(raw: &str, graph: &mut GraphState) -> Document {
    let raw = strip_line_count_prefix(raw);
    let lines = raw
        .split("||")
        .map(|segment| parse_line(segment.trim(), graph))
        .collect();
    Document { lines }
}

/// Strips the optional legacy `NL|` prefix. The digit is never used.
fn strip_line_count_prefix(raw: &str) -> &str {
    let bytes = raw.as_bytes();
    if bytes.len() >= 3 && (b'1'..=b'4').contains(&bytes[0]) && bytes[1] == b'L' && bytes[2] == b'|'
    {
        &raw[3..]
    } else {
        raw
    }
}

/// Parses one trimmed line segment into its surviving elements.
fn parse_line(segment: &str, graph: &mut GraphState) -> Line {
    if segment.is_empty() {
        return Line::default();
    }

    let mut elements = Vec::new();
    for token in split_unescaped(segment) {
        // Spaces around a delimiter are not part of the token.
        let token = token.trim();
        if token.is_empty() {
            continue;
        }
        if let Some(element) = parse_token(token, graph) {
            elements.push(element);
        }
    }
    Line { elements }
}

/// Splits on `|` delimiters whose preceding character is not `\`.
fn split_unescaped(segment: &str) -> Vec<&str> {
    let mut tokens = Vec::new();
    let mut start = 0;
    let mut prev = None;
    for (i, c) in segment.char_indices() {
        if c == '|' && prev != Some('\\') {
            tokens.push(&segment[start..i]);
            start = i + 1;
        }
        prev = Some(c);
    }
    tokens.push(&segment[start..]);
    tokens
}

/// Restores escaped pipes inside a text payload.
fn unescape_text(payload: &str) -> String {
    payload.replace("\\|", "|")
}

/// Classifies and parses one token, applying the per-kind failure policy.
fn parse_token(token: &str, graph: &mut GraphState) -> Option<Element> {
    let Some((keyword, payload)) = token.split_once(':') else {
        // No keyword prefix at all: skipped, no element, no failure.
        return None;
    };

    let parsed = match keyword {
        "CR" => parse_circle(payload),
        "BAR" => parse_bar(payload).map(Element::Bar),
        "HBAR" => parse_bar(payload).map(Element::HBar),
        "TXTC" => parse_colored_text(payload),
        "TXT" => Ok(Element::Text {
            content: unescape_text(payload),
            color: None,
        }),
        "GR" => {
            return match parse_graph_sample(payload, graph) {
                Ok(()) => None,
                Err(failure) => {
                    drop_token(keyword, failure);
                    None
                }
            };
        }
        _ => return None,
    };

    match parsed {
        Ok(element) => Some(element),
        Err(failure) => {
            drop_token(keyword, failure);
            match keyword {
                // Text tokens keep the row width predictable.
                "TXTC" | "TXT" => Some(Element::Text {
                    content: PARSE_ERROR_PLACEHOLDER.to_string(),
                    color: None,
                }),
                _ => None,
            }
        }
    }
}

fn drop_token(keyword: &str, failure: ParseFailure) {
    debug::log(
        Level::Debug,
        "markup",
        &format!("malformed {keyword} token: {}", failure.reason),
    );
}

/// `CR:<color>`
fn parse_circle(payload: &str) -> Result<Element, ParseFailure> {
    if payload.is_empty() {
        return Err(ParseFailure::new("empty color code"));
    }
    Ok(Element::Circle {
        color: ColorSpec::new(payload),
    })
}

/// `BAR:<min>-<max>=<value>[:<fg>[:<bg>]]` (and `HBAR:` alike)
fn parse_bar(payload: &str) -> Result<BarSpec, ParseFailure> {
    let parts: Vec<&str> = payload.split(':').collect();

    let (range, value) = parts[0]
        .split_once('=')
        .ok_or(ParseFailure::new("missing '=' in range"))?;
    let (min, max) = range
        .split_once('-')
        .ok_or(ParseFailure::new("missing '-' in range"))?;

    let min: i64 = min
        .parse()
        .map_err(|_| ParseFailure::new("non-numeric range minimum"))?;
    let max: i64 = max
        .parse()
        .map_err(|_| ParseFailure::new("non-numeric range maximum"))?;
    let value: f64 = value
        .parse()
        .map_err(|_| ParseFailure::new("unparsable value"))?;
    if !value.is_finite() {
        return Err(ParseFailure::new("non-finite value"));
    }

    let (fg, bg) = match parts.len() {
        1 => (ColorSpec::new("g"), None),
        2 => (ColorSpec::new(parts[1]), None),
        3 => (ColorSpec::new(parts[1]), Some(ColorSpec::new(parts[2]))),
        _ => return Err(ParseFailure::new("too many color groups")),
    };

    Ok(BarSpec {
        min,
        max,
        value,
        fg,
        bg,
    })
}

/// `TXTC:<color>:<text>` — exact arity; extra colons are malformed.
fn parse_colored_text(payload: &str) -> Result<Element, ParseFailure> {
    let parts: Vec<&str> = payload.split(':').collect();
    if parts.len() != 2 {
        return Err(ParseFailure::new("expected exactly <color>:<text>"));
    }
    if parts[0].is_empty() || parts[1].is_empty() {
        return Err(ParseFailure::new("empty color or text"));
    }
    Ok(Element::Text {
        content: unescape_text(parts[1]),
        color: Some(ColorSpec::new(parts[0])),
    })
}

/// `GR:<color>:<value>[:<min>:<max>]` — records into history and updates the
/// graph style; produces no element.
fn parse_graph_sample(payload: &str, graph: &mut GraphState) -> Result<(), ParseFailure> {
    let parts: Vec<&str> = payload.split(':').collect();

    let bounds = match parts.len() {
        2 => None,
        4 => {
            let min: f64 = parts[2]
                .parse()
                .map_err(|_| ParseFailure::new("unparsable scale minimum"))?;
            let max: f64 = parts[3]
                .parse()
                .map_err(|_| ParseFailure::new("unparsable scale maximum"))?;
            if !min.is_finite() || !max.is_finite() {
                return Err(ParseFailure::new("non-finite scale bound"));
            }
            Some((min, max))
        }
        _ => return Err(ParseFailure::new("expected <color>:<value>[:<min>:<max>]")),
    };

    let value: f64 = parts[1]
        .parse()
        .map_err(|_| ParseFailure::new("unparsable sample value"))?;
    if !value.is_finite() {
        return Err(ParseFailure::new("non-finite sample value"));
    }

    graph.history.record(value);
    graph.style.color = color::resolve(parts[0]);
    graph.style.bounds = bounds;
    graph.style.enabled = true;
    Ok(())
}

// ============================================================================
// Tests
// ============================================================================


// ============================================================================
// Property-based tests
// ============================================================================
