//! Draw commands and hit regions.
//!
//! Renderers never touch an image. They append primitives to a [`Canvas`]
//! in paint order; an encoder (SVG, raster, image map) consumes the list.

use crate::style::{Color, Font};
use serde::Serialize;
use sprintchart_core::TaskId;

/// Axis-aligned rectangle in pixels
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Rect {
    pub const fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// From two corners (x1, y1) and (x2, y2)
    pub fn from_corners(x1: i32, y1: i32, x2: i32, y2: i32) -> Self {
        Self {
            x: x1.min(x2),
            y: y1.min(y2),
            width: (x2 - x1).abs(),
            height: (y2 - y1).abs(),
        }
    }

    pub const fn right(&self) -> i32 {
        self.x + self.width
    }

    pub const fn bottom(&self) -> i32 {
        self.y + self.height
    }

    /// Whether the two rectangles share any interior area
    pub fn intersects(&self, other: &Rect) -> bool {
        self.x < other.right()
            && other.x < self.right()
            && self.y < other.bottom()
            && other.y < self.bottom()
    }

    pub fn contains(&self, x: i32, y: i32) -> bool {
        x >= self.x && x < self.right() && y >= self.y && y < self.bottom()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub enum TextAlign {
    #[default]
    Left,
    Center,
    Right,
}

/// Stroke style for lines
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct Stroke {
    pub width: f32,
    /// Dash length; `None` for a solid line
    pub dash: Option<f32>,
}

impl Stroke {
    pub const fn solid(width: f32) -> Self {
        Self { width, dash: None }
    }

    pub const fn dashed(width: f32, dash: f32) -> Self {
        Self {
            width,
            dash: Some(dash),
        }
    }
}

/// A single paint operation
#[derive(Clone, Debug, PartialEq, Serialize)]
pub enum DrawCommand {
    FillRect {
        rect: Rect,
        color: Color,
    },
    StrokeRect {
        rect: Rect,
        color: Color,
        stroke: Stroke,
    },
    Line {
        from: Point,
        to: Point,
        color: Color,
        stroke: Stroke,
    },
    Polygon {
        points: Vec<Point>,
        color: Color,
    },
    Oval {
        rect: Rect,
        color: Color,
        stroke: Stroke,
    },
    /// `y` is the vertical center of the text
    Text {
        x: i32,
        y: i32,
        text: String,
        font: Font,
        color: Color,
        align: TextAlign,
    },
}

/// Clickable area carrying tooltip lines
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct HitRegion {
    pub rect: Rect,
    pub task: Option<TaskId>,
    pub tooltip: Vec<String>,
}

/// Ordered paint list plus hit regions
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct Canvas {
    pub commands: Vec<DrawCommand>,
    pub regions: Vec<HitRegion>,
}

impl Canvas {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, command: DrawCommand) {
        self.commands.push(command);
    }

    pub fn fill_rect(&mut self, x: i32, y: i32, width: i32, height: i32, color: Color) {
        self.push(DrawCommand::FillRect {
            rect: Rect::new(x, y, width, height),
            color,
        });
    }

    pub fn stroke_rect(&mut self, rect: Rect, color: Color, stroke: Stroke) {
        self.push(DrawCommand::StrokeRect {
            rect,
            color,
            stroke,
        });
    }

    pub fn line(&mut self, x1: i32, y1: i32, x2: i32, y2: i32, color: Color, stroke: Stroke) {
        self.push(DrawCommand::Line {
            from: Point::new(x1, y1),
            to: Point::new(x2, y2),
            color,
            stroke,
        });
    }

    pub fn polygon(&mut self, points: Vec<Point>, color: Color) {
        self.push(DrawCommand::Polygon { points, color });
    }

    pub fn oval(&mut self, rect: Rect, color: Color, stroke: Stroke) {
        self.push(DrawCommand::Oval {
            rect,
            color,
            stroke,
        });
    }

    pub fn text(
        &mut self,
        x: i32,
        y: i32,
        text: impl Into<String>,
        font: &Font,
        color: Color,
        align: TextAlign,
    ) {
        self.push(DrawCommand::Text {
            x,
            y,
            text: text.into(),
            font: font.clone(),
            color,
            align,
        });
    }

    pub fn region(&mut self, rect: Rect, task: Option<TaskId>, tooltip: Vec<String>) {
        self.regions.push(HitRegion {
            rect,
            task,
            tooltip,
        });
    }

    /// Topmost region under a point
    pub fn hit_test(&self, x: i32, y: i32) -> Option<&HitRegion> {
        self.regions.iter().rev().find(|r| r.rect.contains(x, y))
    }

    /// Number of text commands whose content equals `text`
    pub fn count_text(&self, text: &str) -> usize {
        self.commands
            .iter()
            .filter(|c| matches!(c, DrawCommand::Text { text: t, .. } if t == text))
            .count()
    }
}

/// Finished chart: size is known before any encoder allocates an image
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Chart {
    pub width: i32,
    pub height: i32,
    pub canvas: Canvas,
}

// ============================================================================
// Text metrics
// ============================================================================

/// Text measurement is supplied by the encoder's font backend
pub trait TextMeasure {
    fn text_width(&self, text: &str, font: &Font) -> i32;
}

/// Average glyph width of 0.6 em; good enough to decide whether a label fits
#[derive(Clone, Copy, Debug, Default)]
pub struct ApproximateTextMeasure;

impl TextMeasure for ApproximateTextMeasure {
    fn text_width(&self, text: &str, font: &Font) -> i32 {
        let glyphs = text.chars().count() as f64;
        let em = f64::from(font.size) * if font.bold { 0.65 } else { 0.6 };
        (glyphs * em).ceil() as i32
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn rect_from_corners_normalizes() {
        assert_eq!(Rect::from_corners(10, 20, 4, 8), Rect::new(4, 8, 6, 12));
    }

    #[test]
    fn touching_rects_do_not_intersect() {
        let a = Rect::new(0, 0, 10, 10);
        let b = Rect::new(0, 10, 10, 10);
        let c = Rect::new(5, 5, 10, 10);
        assert!(!a.intersects(&b));
        assert!(a.intersects(&c));
    }

    #[test]
    fn hit_test_prefers_last_region() {
        let mut canvas = Canvas::new();
        canvas.region(Rect::new(0, 0, 100, 100), Some(1), vec!["outer".into()]);
        canvas.region(Rect::new(10, 10, 10, 10), Some(2), vec!["inner".into()]);
        assert_eq!(canvas.hit_test(15, 15).and_then(|r| r.task), Some(2));
        assert_eq!(canvas.hit_test(50, 50).and_then(|r| r.task), Some(1));
        assert!(canvas.hit_test(150, 50).is_none());
    }

    #[test]
    fn approximate_measure_scales_with_font() {
        let m = ApproximateTextMeasure;
        assert_eq!(m.text_width("50%", &Font::new("Arial", 10)), 18);
        assert!(m.text_width("50%", &Font::new("Arial", 20)) > 18);
    }
}
