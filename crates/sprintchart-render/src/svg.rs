//! SVG encoder for rendered charts.
//!
//! Turns a [`Chart`]'s draw list into an SVG document with the `svg` crate.
//! Hit regions become transparent rectangles carrying a `<title>` so that
//! browsers show the tooltip lines on hover.

use crate::canvas::{Chart, DrawCommand, HitRegion, Point, Rect, Stroke, TextAlign};
use crate::style::{Color, Font};
use sprintchart_core::RenderError;
use ::svg::node::element::{Element, Ellipse, Group, Line, Polygon, Rectangle, Text};
use ::svg::node::Node;
use ::svg::Document;

/// Chart to SVG encoder
#[derive(Clone, Debug)]
pub struct SvgEncoder {
    /// Emit hit regions with `<title>` tooltips
    pub tooltips: bool,
}

impl Default for SvgEncoder {
    fn default() -> Self {
        Self { tooltips: true }
    }
}

impl SvgEncoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn without_tooltips(mut self) -> Self {
        self.tooltips = false;
        self
    }

    pub fn encode(&self, chart: &Chart) -> Result<String, RenderError> {
        let mut document = Document::new()
            .set("width", chart.width)
            .set("height", chart.height)
            .set("viewBox", format!("0 0 {} {}", chart.width, chart.height))
            .set("xmlns", "http://www.w3.org/2000/svg");

        let mut paint = Group::new().set("class", "chart");
        for command in &chart.canvas.commands {
            paint = match command {
                DrawCommand::FillRect { rect, color } => paint.add(fill(rect_element(rect), *color)),
                DrawCommand::StrokeRect {
                    rect,
                    color,
                    stroke,
                } => paint.add(outline(rect_element(rect), *color, *stroke)),
                DrawCommand::Line {
                    from,
                    to,
                    color,
                    stroke,
                } => paint.add(line_element(*from, *to, *color, *stroke)),
                DrawCommand::Polygon { points, color } => {
                    paint.add(fill(Polygon::new().set("points", points_attr(points)), *color))
                }
                DrawCommand::Oval {
                    rect,
                    color,
                    stroke,
                } => paint.add(outline(ellipse_element(rect), *color, *stroke)),
                DrawCommand::Text {
                    x,
                    y,
                    text,
                    font,
                    color,
                    align,
                } => paint.add(text_element(*x, *y, text, font, *color, *align)),
            };
        }
        document = document.add(paint);

        if self.tooltips && !chart.canvas.regions.is_empty() {
            let mut regions = Group::new().set("class", "regions");
            for region in &chart.canvas.regions {
                regions = regions.add(region_element(region));
            }
            document = document.add(regions);
        }

        let mut output = Vec::new();
        ::svg::write(&mut output, &document)
            .map_err(|e| RenderError::Format(format!("Failed to write SVG: {}", e)))?;

        String::from_utf8(output).map_err(|e| RenderError::Format(format!("Invalid UTF-8: {}", e)))
    }
}

fn rect_element(rect: &Rect) -> Rectangle {
    Rectangle::new()
        .set("x", rect.x)
        .set("y", rect.y)
        .set("width", rect.width)
        .set("height", rect.height)
}

fn ellipse_element(rect: &Rect) -> Ellipse {
    Ellipse::new()
        .set("cx", f64::from(rect.x) + f64::from(rect.width) / 2.0)
        .set("cy", f64::from(rect.y) + f64::from(rect.height) / 2.0)
        .set("rx", f64::from(rect.width) / 2.0)
        .set("ry", f64::from(rect.height) / 2.0)
}

fn line_element(from: Point, to: Point, color: Color, stroke: Stroke) -> Line {
    let line = Line::new()
        .set("x1", from.x)
        .set("y1", from.y)
        .set("x2", to.x)
        .set("y2", to.y);
    stroked(line, color, stroke)
}

fn points_attr(points: &[Point]) -> String {
    points
        .iter()
        .map(|p| format!("{},{}", p.x, p.y))
        .collect::<Vec<_>>()
        .join(" ")
}

fn text_element(x: i32, y: i32, content: &str, font: &Font, color: Color, align: TextAlign) -> Text {
    let anchor = match align {
        TextAlign::Left => "start",
        TextAlign::Center => "middle",
        TextAlign::Right => "end",
    };
    let mut text = Text::new(content)
        .set("x", x)
        .set("y", y)
        .set("dominant-baseline", "central")
        .set("text-anchor", anchor)
        .set("font-family", font.family.as_str())
        .set("font-size", font.size);
    if font.bold {
        text = text.set("font-weight", "bold");
    }
    fill(text, color)
}

fn region_element(region: &HitRegion) -> Rectangle {
    let mut title = Element::new("title");
    title.append(::svg::node::Text::new(region.tooltip.join("\n")));
    let mut rect = rect_element(&region.rect).set("fill", "transparent");
    if let Some(task) = region.task {
        rect = rect.set("data-task", task.to_string());
    }
    rect.add(title)
}

/// Shared attribute setters for every svg element type
trait Paint: Sized {
    fn set_attr(self, name: &str, value: String) -> Self;
}

macro_rules! impl_paint {
    ($($element:ty),*) => {
        $(impl Paint for $element {
            fn set_attr(self, name: &str, value: String) -> Self {
                self.set(name, value)
            }
        })*
    };
}

impl_paint!(Rectangle, Ellipse, Line, Polygon, Text);

fn fill<T: Paint>(element: T, color: Color) -> T {
    let element = element.set_attr("fill", color.to_rgb_hex());
    if color.is_opaque() {
        element
    } else {
        element.set_attr("fill-opacity", format!("{:.3}", color.opacity()))
    }
}

fn stroked<T: Paint>(element: T, color: Color, stroke: Stroke) -> T {
    let mut element = element
        .set_attr("stroke", color.to_rgb_hex())
        .set_attr("stroke-width", stroke.width.to_string());
    if !color.is_opaque() {
        element = element.set_attr("stroke-opacity", format!("{:.3}", color.opacity()));
    }
    if let Some(dash) = stroke.dash {
        element = element.set_attr("stroke-dasharray", dash.to_string());
    }
    element
}

fn outline<T: Paint>(element: T, color: Color, stroke: Stroke) -> T {
    stroked(element.set_attr("fill", "none".to_string()), color, stroke)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::Canvas;

    fn sample_chart() -> Chart {
        let mut canvas = Canvas::new();
        canvas.fill_rect(0, 0, 100, 50, Color::WHITE);
        canvas.fill_rect(10, 10, 20, 10, Color::rgba(0x34, 0x66, 0xed, 0x7f));
        canvas.line(0, 0, 100, 50, Color::RED, Stroke::dashed(1.0, 3.0));
        canvas.text(
            50,
            25,
            "Design Build",
            &Font::new("Arial", 12).bold(),
            Color::BLACK,
            TextAlign::Center,
        );
        canvas.region(Rect::new(10, 10, 20, 10), Some(2), vec!["Design".into(), "Duration 2d".into()]);
        Chart {
            width: 100,
            height: 50,
            canvas,
        }
    }

    #[test]
    fn encode_produces_svg_document() {
        let svg = SvgEncoder::new().encode(&sample_chart()).unwrap();
        assert!(svg.starts_with("<svg"));
        assert!(svg.contains("</svg>"));
        assert!(svg.contains("viewBox=\"0 0 100 50\""));
    }

    #[test]
    fn alpha_becomes_opacity() {
        let svg = SvgEncoder::new().encode(&sample_chart()).unwrap();
        assert!(svg.contains("fill=\"#3466ed\""));
        assert!(svg.contains("fill-opacity=\"0.498\""));
        assert!(svg.contains("stroke-dasharray=\"3\""));
    }

    #[test]
    fn text_is_anchored() {
        let svg = SvgEncoder::new().encode(&sample_chart()).unwrap();
        assert!(svg.contains("text-anchor=\"middle\""));
        assert!(svg.contains("font-weight=\"bold\""));
        assert!(svg.contains("Design Build"));
    }

    #[test]
    fn regions_carry_titles() {
        let svg = SvgEncoder::new().encode(&sample_chart()).unwrap();
        assert!(svg.contains("<title>"));
        assert!(svg.contains("data-task=\"2\""));
        assert!(svg.contains("Duration 2d"));

        let plain = SvgEncoder::new().without_tooltips().encode(&sample_chart()).unwrap();
        assert!(!plain.contains("<title>"));
    }
}
