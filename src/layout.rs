//! Deterministic layout engine: parsed lines in, positioned drawing
//! instructions out.
//!
//! The engine owns no surface. It walks each line left to right, measures
//! every element's footprint under the current style, and emits [`DrawOp`]s
//! until an element would cross the right edge — at which point it emits a
//! single overflow marker and abandons the rest of that line. The sparkline
//! overlay is emitted before the element layer so it renders as background.

use crate::color::{self, Rgba};
use crate::geometry::{Point, Rect, Size};
use crate::history::GraphState;
use crate::markup::{BarSpec, Document, Element};

/// Fixed left margin where each line's cursor starts.
const MARGIN: f32 = 3.0;

/// Horizontal gap appended to every element footprint.
const GAP: f32 = 3.0;

/// Outline stroked around bar tracks.
const BAR_OUTLINE: Rgba = Rgba::new(0.5, 0.5, 0.5, 0.8);

/// A single drawing instruction for the external 2D surface.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawOp {
    /// Filled axis-aligned rectangle.
    FillRect {
        /// Target rectangle.
        rect: Rect,
        /// Fill color.
        color: Rgba,
    },
    /// Stroked axis-aligned rectangle.
    StrokeRect {
        /// Target rectangle.
        rect: Rect,
        /// Stroke color.
        color: Rgba,
        /// Stroke width in pixels.
        line_width: f32,
    },
    /// Filled circle.
    FillCircle {
        /// Center position.
        center: Point,
        /// Radius in pixels.
        radius: f32,
        /// Fill color.
        color: Rgba,
    },
    /// A text run anchored at its baseline start.
    ///
    /// Shadows are separate `TextRun` ops offset by one unit, emitted
    /// immediately before the main run.
    TextRun {
        /// Baseline start position.
        pos: Point,
        /// Text content.
        content: String,
        /// Text color.
        color: Rgba,
        /// Font family name.
        family: String,
        /// Font size in pixels.
        size: f32,
    },
    /// Filled polygon (sparkline area, closed to the bottom edge).
    FillPolygon {
        /// Polygon vertices in draw order.
        points: Vec<Point>,
        /// Fill color.
        color: Rgba,
    },
    /// Stroked open polyline (sparkline top line).
    StrokePolyline {
        /// Vertices in draw order.
        points: Vec<Point>,
        /// Stroke color.
        color: Rgba,
        /// Stroke width in pixels.
        line_width: f32,
    },
    /// The `»` glyph marking a truncated line.
    OverflowMarker {
        /// Baseline position of the glyph.
        pos: Point,
        /// Glyph color.
        color: Rgba,
    },
}

/// Style snapshot consumed by the layout engine.
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutStyle {
    /// Width of a vertical bar track (and thickness of a horizontal one).
    pub bar_width: f32,
    /// Label font family.
    pub font_family: String,
    /// Label font size in pixels.
    pub font_size: f32,
    /// Default label color (elements may override per token).
    pub font_color: Rgba,
    /// Shadow color behind label text.
    pub font_shadow_color: Rgba,
    /// Whether label text casts a shadow.
    pub enable_font_shadow: bool,
    /// Opacity of the strip background fill.
    pub chart_area_transparency: f32,
    /// Opacity of the sparkline stroke (the fill uses half of it).
    pub graph_transparency: f32,
}

impl Default for LayoutStyle {
    fn default() -> Self {
        Self {
            bar_width: 8.0,
            font_family: "Sans".to_string(),
            font_size: 10.0,
            font_color: Rgba::WHITE,
            font_shadow_color: Rgba::BLACK,
            enable_font_shadow: true,
            chart_area_transparency: 0.3,
            graph_transparency: 0.8,
        }
    }
}

/// Text measurement seam.
///
/// The real drawing surface owns font metrics; the layout engine only needs
/// `(width, height)` extents to advance the cursor and detect overflow.
pub trait TextMeasurer {
    /// Measures the extents of `text` at the given family and size.
    fn measure(&self, text: &str, family: &str, size: f32) -> (f32, f32);
}

/// Fallback measurer estimating extents from character count.
///
/// Uses the `0.6 * size` average advance the original implementation fell
/// back to when real extents were unavailable.
#[derive(Debug, Clone, Copy, Default)]
pub struct HeuristicMeasurer;

impl TextMeasurer for HeuristicMeasurer {
    fn measure(&self, text: &str, _family: &str, size: f32) -> (f32, f32) {
        (text.chars().count() as f32 * size * 0.6, size)
    }
}

/// Computes the ordered drawing instructions for one document.
///
/// Emission order: strip background, sparkline overlay, then the element
/// layer line by line. Deterministic for a given document, canvas, style,
/// and graph state.
#[must_use]
pub fn layout(
    doc: &Document,
    canvas: Size,
    style: &LayoutStyle,
    graph: &GraphState,
    measurer: &dyn TextMeasurer,
) -> Vec<DrawOp> {
    let mut ops = Vec::new();

    ops.push(DrawOp::FillRect {
        rect: Rect::new(0.0, 0.0, canvas.width, canvas.height),
        color: Rgba::BLACK.with_alpha(style.chart_area_transparency),
    });

    push_sparkline(&mut ops, canvas, style, graph);

    let line_count = doc.line_count();
    if line_count == 0 {
        return ops;
    }
    let line_height = canvas.height / line_count as f32;

    for (index, line) in doc.lines().iter().enumerate() {
        let y = index as f32 * line_height;
        let mut cursor = MARGIN;

        for element in line.elements() {
            let footprint = element_footprint(element, line_height, style, measurer);
            if cursor + footprint > canvas.width {
                ops.push(DrawOp::OverflowMarker {
                    pos: Point::new(cursor, y + line_height / 2.0 + style.font_size / 3.0),
                    color: style.font_color.with_alpha(0.6),
                });
                break;
            }
            push_element(&mut ops, element, cursor, y, line_height, style);
            cursor += footprint;
        }
    }

    ops
}

/// Horizontal space an element occupies, including its trailing gap.
fn element_footprint(
    element: &Element,
    line_height: f32,
    style: &LayoutStyle,
    measurer: &dyn TextMeasurer,
) -> f32 {
    match element {
        Element::Circle { .. } => 2.0 * circle_radius(line_height) + GAP,
        Element::Bar(_) => style.bar_width + GAP,
        Element::HBar(_) => line_height + GAP,
        Element::Text { content, .. } => {
            let (width, _) = measurer.measure(content, &style.font_family, style.font_size);
            width + GAP
        }
    }
}

fn circle_radius(line_height: f32) -> f32 {
    line_height / 3.0
}

/// Emits the draw ops for one element at the cursor position.
fn push_element(
    ops: &mut Vec<DrawOp>,
    element: &Element,
    cursor: f32,
    y: f32,
    line_height: f32,
    style: &LayoutStyle,
) {
    match element {
        Element::Circle { color } => {
            let radius = circle_radius(line_height);
            ops.push(DrawOp::FillCircle {
                center: Point::new(cursor + radius, y + line_height / 2.0),
                radius: (radius - 2.0).max(1.0),
                color: color.resolve(),
            });
        }
        Element::Bar(spec) => push_bar(ops, spec, cursor, y, line_height, style),
        Element::HBar(spec) => push_hbar(ops, spec, cursor, y, line_height, style),
        Element::Text { content, color } => {
            let baseline = y + line_height / 2.0 + style.font_size / 3.0;

            if style.enable_font_shadow {
                ops.push(DrawOp::TextRun {
                    pos: Point::new(cursor + 1.0, baseline + 1.0),
                    content: content.clone(),
                    color: style.font_shadow_color,
                    family: style.font_family.clone(),
                    size: style.font_size,
                });
            }

            let color = color
                .as_ref()
                .map_or(style.font_color, color::ColorSpec::resolve);
            ops.push(DrawOp::TextRun {
                pos: Point::new(cursor, baseline),
                content: content.clone(),
                color,
                family: style.font_family.clone(),
                size: style.font_size,
            });
        }
    }
}

/// Vertical bar: track background, fill growing from the bottom edge,
/// outline.
///
/// The fill height is `percentage * line_height` with no clamping, so
/// out-of-range values overdraw or underdraw proportionally.
fn push_bar(
    ops: &mut Vec<DrawOp>,
    spec: &BarSpec,
    cursor: f32,
    y: f32,
    line_height: f32,
    style: &LayoutStyle,
) {
    let track = Rect::new(cursor, y, style.bar_width, line_height);
    let fill_height = spec.percentage() as f32 * line_height;

    ops.push(DrawOp::FillRect {
        rect: track,
        color: bar_background(spec),
    });
    ops.push(DrawOp::FillRect {
        rect: Rect::new(
            cursor,
            y + line_height - fill_height,
            style.bar_width,
            fill_height,
        ),
        color: spec.fg.resolve(),
    });
    ops.push(DrawOp::StrokeRect {
        rect: track,
        color: BAR_OUTLINE,
        line_width: 1.0,
    });
}

/// Horizontal bar: a track of width `line_height`, `bar_width` thick,
/// vertically centered; fill grows from the left edge.
fn push_hbar(
    ops: &mut Vec<DrawOp>,
    spec: &BarSpec,
    cursor: f32,
    y: f32,
    line_height: f32,
    style: &LayoutStyle,
) {
    let thickness = style.bar_width.min(line_height);
    let track_y = y + (line_height - thickness) / 2.0;
    let track = Rect::new(cursor, track_y, line_height, thickness);
    let fill_width = spec.percentage() as f32 * line_height;

    ops.push(DrawOp::FillRect {
        rect: track,
        color: bar_background(spec),
    });
    ops.push(DrawOp::FillRect {
        rect: Rect::new(cursor, track_y, fill_width, thickness),
        color: spec.fg.resolve(),
    });
    ops.push(DrawOp::StrokeRect {
        rect: track,
        color: BAR_OUTLINE,
        line_width: 1.0,
    });
}

/// Explicit background color, or the complementary translucent fallback.
fn bar_background(spec: &BarSpec) -> Rgba {
    spec.bg
        .as_ref()
        .map_or_else(|| spec.fg.resolve().complement(0.2), color::ColorSpec::resolve)
}

/// Sparkline overlay: filled area closed to the bottom edge plus a stroked
/// top line, both in the current graph color.
///
/// Draws only after a graph sample has ever been observed and at least two
/// points exist. Samples normalize to the explicit bounds override when
/// present, else to the live history extent; a degenerate range is treated
/// as 1 so a flat history draws along the bottom instead of dividing by
/// zero.
fn push_sparkline(ops: &mut Vec<DrawOp>, canvas: Size, style: &LayoutStyle, graph: &GraphState) {
    if !graph.style.enabled || graph.history.len() < 2 {
        return;
    }

    let (min, max) = match graph.style.bounds.or_else(|| graph.history.extent()) {
        Some(bounds) => bounds,
        None => return,
    };
    let range = max - min;
    let range = if range > 0.0 && range.is_finite() {
        range
    } else {
        1.0
    };

    let step = canvas.width / (graph.history.len() - 1) as f32;
    let points: Vec<Point> = graph
        .history
        .iter()
        .enumerate()
        .map(|(i, value)| {
            let t = ((value - min) / range) as f32;
            Point::new(i as f32 * step, canvas.height - t * canvas.height)
        })
        .collect();

    let mut area = points.clone();
    area.push(Point::new(canvas.width, canvas.height));
    area.push(Point::new(0.0, canvas.height));

    ops.push(DrawOp::FillPolygon {
        points: area,
        color: graph.style.color.with_alpha(style.graph_transparency / 2.0),
    });
    ops.push(DrawOp::StrokePolyline {
        points,
        color: graph.style.color.with_alpha(style.graph_transparency),
        line_width: 2.0,
    });
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::history::{GraphState, HistoryStore};
    use crate::markup::parse;
    use approx::assert_relative_eq;

    fn graph() -> GraphState {
        GraphState::new(HistoryStore::new(16))
    }

    fn run_layout(input: &str, canvas: Size) -> Vec<DrawOp> {
        let mut graph = graph();
        let doc = parse(input, &mut graph);
        layout(&doc, canvas, &LayoutStyle::default(), &graph, &HeuristicMeasurer)
    }

    /// Everything after the strip background fill.
    fn element_ops(ops: &[DrawOp]) -> &[DrawOp] {
        assert!(matches!(ops[0], DrawOp::FillRect { .. }));
        &ops[1..]
    }

    #[test]
    fn test_background_covers_canvas() {
        let ops = run_layout("CR:g", Size::new(200.0, 24.0));
        let DrawOp::FillRect { rect, color } = &ops[0] else {
            panic!("first op must be the background fill");
        };
        assert_relative_eq!(rect.width, 200.0);
        assert_relative_eq!(rect.height, 24.0);
        assert_relative_eq!(color.a, 0.3);
    }

    #[test]
    fn test_end_to_end_single_line() {
        let style = LayoutStyle::default();
        let ops = run_layout("CR:g|BAR:0-100=75:k:g|TXT:Status is OK", Size::new(400.0, 24.0));
        let ops = element_ops(&ops);

        // Circle first, in green.
        let DrawOp::FillCircle { center, color, .. } = &ops[0] else {
            panic!("expected circle, got {:?}", ops[0]);
        };
        assert_eq!(*color, Rgba::GREEN);
        assert_relative_eq!(center.y, 12.0);

        // Bar pair: green track background, then black 75%-height fill.
        let DrawOp::FillRect { color, .. } = &ops[1] else {
            panic!("expected bar background, got {:?}", ops[1]);
        };
        assert_eq!(*color, Rgba::GREEN);

        let DrawOp::FillRect { rect, color } = &ops[2] else {
            panic!("expected bar fill, got {:?}", ops[2]);
        };
        assert_eq!(*color, Rgba::BLACK);
        assert_relative_eq!(rect.height, 18.0); // 75% of 24
        assert_relative_eq!(rect.y, 6.0);

        assert!(matches!(ops[3], DrawOp::StrokeRect { .. }));

        // Shadow run then the main text run in the default label color.
        let DrawOp::TextRun { content, color, .. } = &ops[4] else {
            panic!("expected shadow run, got {:?}", ops[4]);
        };
        assert_eq!(content, "Status is OK");
        assert_eq!(*color, style.font_shadow_color);

        let DrawOp::TextRun { content, color, .. } = &ops[5] else {
            panic!("expected text run, got {:?}", ops[5]);
        };
        assert_eq!(content, "Status is OK");
        assert_eq!(*color, style.font_color);

        assert_eq!(ops.len(), 6);
    }

    #[test]
    fn test_cursor_advances_by_footprints() {
        // Two circles: second starts at margin + (2r + gap).
        let ops = run_layout("CR:g|CR:r", Size::new(200.0, 24.0));
        let ops = element_ops(&ops);
        let radius = 24.0 / 3.0;

        let DrawOp::FillCircle { center, .. } = &ops[0] else {
            panic!();
        };
        assert_relative_eq!(center.x, 3.0 + radius);

        let DrawOp::FillCircle { center, .. } = &ops[1] else {
            panic!();
        };
        assert_relative_eq!(center.x, 3.0 + 2.0 * radius + 3.0 + radius);
    }

    #[test]
    fn test_overflow_truncates_line_and_keeps_earlier_elements() {
        // Canvas fits one bar (8 + 3 wide starting at margin 3) but not two.
        let ops = run_layout("BAR:0-10=5:g|BAR:0-10=7:r|CR:b", Size::new(20.0, 24.0));
        let ops = element_ops(&ops);

        // First bar: background + fill + outline.
        assert!(matches!(ops[0], DrawOp::FillRect { .. }));
        assert!(matches!(ops[1], DrawOp::FillRect { .. }));
        assert!(matches!(ops[2], DrawOp::StrokeRect { .. }));

        // Exactly one overflow marker, then nothing.
        let DrawOp::OverflowMarker { pos, .. } = &ops[3] else {
            panic!("expected overflow marker, got {:?}", ops[3]);
        };
        assert_relative_eq!(pos.x, 3.0 + 8.0 + 3.0);
        assert_eq!(ops.len(), 4);
    }

    #[test]
    fn test_overflow_leaves_other_lines_unaffected() {
        let wide_text = "TXT:this text is far too wide to fit";
        let ops = run_layout(&format!("{wide_text}||CR:g"), Size::new(40.0, 24.0));
        let ops = element_ops(&ops);

        assert!(matches!(ops[0], DrawOp::OverflowMarker { .. }));
        assert!(matches!(ops[1], DrawOp::FillCircle { .. }));
        assert_eq!(ops.len(), 2);
    }

    #[test]
    fn test_line_height_splits_canvas() {
        let ops = run_layout("CR:g||CR:r", Size::new(200.0, 24.0));
        let ops = element_ops(&ops);

        let DrawOp::FillCircle { center, radius, .. } = &ops[0] else {
            panic!();
        };
        assert_relative_eq!(center.y, 6.0); // middle of the first 12px band
        assert_relative_eq!(*radius, 2.0); // 12/3 - 2

        let DrawOp::FillCircle { center, .. } = &ops[1] else {
            panic!();
        };
        assert_relative_eq!(center.y, 18.0);
    }

    #[test]
    fn test_bar_without_background_uses_complement() {
        let ops = run_layout("BAR:0-10=5:r", Size::new(200.0, 24.0));
        let ops = element_ops(&ops);
        let DrawOp::FillRect { color, .. } = &ops[0] else {
            panic!();
        };
        assert_eq!(*color, Rgba::new(0.0, 1.0, 1.0, 0.2));
    }

    #[test]
    fn test_bar_overdraw_is_not_clamped() {
        let ops = run_layout("BAR:0-100=150:g", Size::new(200.0, 20.0));
        let ops = element_ops(&ops);
        let DrawOp::FillRect { rect, .. } = &ops[1] else {
            panic!();
        };
        assert_relative_eq!(rect.height, 30.0); // 150% of 20
    }

    #[test]
    fn test_hbar_geometry() {
        let ops = run_layout("HBAR:0-100=50:g", Size::new(200.0, 24.0));
        let ops = element_ops(&ops);

        let DrawOp::FillRect { rect, .. } = &ops[0] else {
            panic!();
        };
        assert_relative_eq!(rect.width, 24.0); // track width = line height
        assert_relative_eq!(rect.height, 8.0); // thickness = bar width
        assert_relative_eq!(rect.y, 8.0); // centered in the band

        let DrawOp::FillRect { rect, .. } = &ops[1] else {
            panic!();
        };
        assert_relative_eq!(rect.width, 12.0); // 50% of the track
    }

    #[test]
    fn test_text_color_precedence() {
        let ops = run_layout("TXTC:r:alert", Size::new(200.0, 24.0));
        let ops = element_ops(&ops);
        // ops[0] is the shadow, ops[1] the run.
        let DrawOp::TextRun { color, .. } = &ops[1] else {
            panic!();
        };
        assert_eq!(*color, Rgba::rgb(1.0, 0.0, 0.0));
    }

    #[test]
    fn test_shadow_disabled_emits_single_run() {
        let mut graph = graph();
        let doc = parse("TXT:plain", &mut graph);
        let style = LayoutStyle {
            enable_font_shadow: false,
            ..LayoutStyle::default()
        };
        let ops = layout(&doc, Size::new(200.0, 24.0), &style, &graph, &HeuristicMeasurer);
        let runs: Vec<_> = ops
            .iter()
            .filter(|op| matches!(op, DrawOp::TextRun { .. }))
            .collect();
        assert_eq!(runs.len(), 1);
    }

    #[test]
    fn test_shadow_is_offset_by_one_unit() {
        let ops = run_layout("TXT:x", Size::new(200.0, 24.0));
        let ops = element_ops(&ops);
        let DrawOp::TextRun { pos: shadow, .. } = &ops[0] else {
            panic!();
        };
        let DrawOp::TextRun { pos: main, .. } = &ops[1] else {
            panic!();
        };
        assert_relative_eq!(shadow.x, main.x + 1.0);
        assert_relative_eq!(shadow.y, main.y + 1.0);
    }

    #[test]
    fn test_sparkline_requires_enable_and_two_points() {
        let style = LayoutStyle::default();
        let doc = parse("", &mut graph());

        // History present but never enabled: no sparkline.
        let mut g = graph();
        g.history.record(1.0);
        g.history.record(2.0);
        let ops = layout(&doc, Size::new(100.0, 20.0), &style, &g, &HeuristicMeasurer);
        assert_eq!(ops.len(), 1, "background only");

        // Enabled but a single point: still nothing.
        let mut g = graph();
        parse("GR:g:1", &mut g);
        let ops = layout(&doc, Size::new(100.0, 20.0), &style, &g, &HeuristicMeasurer);
        assert_eq!(ops.len(), 1);
    }

    #[test]
    fn test_sparkline_fill_and_stroke() {
        let mut g = graph();
        let doc = parse("GR:r:0|GR:r:10|GR:r:5", &mut g);
        let style = LayoutStyle::default();
        let ops = layout(&doc, Size::new(100.0, 20.0), &style, &g, &HeuristicMeasurer);

        let DrawOp::FillPolygon { points, color } = &ops[1] else {
            panic!("expected sparkline area, got {:?}", ops[1]);
        };
        // 3 samples + 2 closing corners.
        assert_eq!(points.len(), 5);
        assert_relative_eq!(color.a, 0.4); // half of 0.8

        let DrawOp::StrokePolyline { points, color, .. } = &ops[2] else {
            panic!("expected sparkline stroke, got {:?}", ops[2]);
        };
        assert_eq!(points.len(), 3);
        assert_relative_eq!(color.a, 0.8);
        assert_eq!(*color, crate::color::resolve("r").with_alpha(0.8));

        // Auto-scale: min maps to the bottom edge, max to the top.
        assert_relative_eq!(points[0].x, 0.0);
        assert_relative_eq!(points[0].y, 20.0);
        assert_relative_eq!(points[1].x, 50.0);
        assert_relative_eq!(points[1].y, 0.0);
        assert_relative_eq!(points[2].x, 100.0);
        assert_relative_eq!(points[2].y, 10.0);
    }

    #[test]
    fn test_sparkline_bounds_override() {
        let mut g = graph();
        let doc = parse("GR:g:25:0:100|GR:g:75:0:100", &mut g);
        let ops = layout(
            &doc,
            Size::new(100.0, 20.0),
            &LayoutStyle::default(),
            &g,
            &HeuristicMeasurer,
        );

        let DrawOp::StrokePolyline { points, .. } = &ops[2] else {
            panic!();
        };
        assert_relative_eq!(points[0].y, 15.0); // 25% up a 20px canvas
        assert_relative_eq!(points[1].y, 5.0); // 75% up
    }

    #[test]
    fn test_sparkline_flat_history_draws_along_bottom() {
        let mut g = graph();
        let doc = parse("GR:g:5|GR:g:5", &mut g);
        let ops = layout(
            &doc,
            Size::new(100.0, 20.0),
            &LayoutStyle::default(),
            &g,
            &HeuristicMeasurer,
        );

        let DrawOp::StrokePolyline { points, .. } = &ops[2] else {
            panic!();
        };
        for p in points {
            assert_relative_eq!(p.y, 20.0);
        }
    }

    #[test]
    fn test_heuristic_measurer() {
        let (w, h) = HeuristicMeasurer.measure("abcd", "Sans", 10.0);
        assert_relative_eq!(w, 24.0);
        assert_relative_eq!(h, 10.0);
    }

    #[test]
    fn test_empty_document_emits_background_only() {
        let ops = run_layout("", Size::new(200.0, 24.0));
        assert_eq!(ops.len(), 1);
    }
}
