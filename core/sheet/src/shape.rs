//! FILENAME: core/sheet/src/shape.rs
//! PURPOSE: Primitive shape descriptors produced by cells.
//! CONTEXT: Cells never touch the canvas. They append descriptors to their
//! own shape list and the host's scene graph turns them into drawing calls.

use serde::Serialize;
use engine::{measure_styled_text, Bounds, Color, TextStyle};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RectShape {
    pub bounds: Bounds,
    pub fill: Option<Color>,
    pub stroke: Option<Color>,
    pub line_width: f64,
    pub opacity: f64,
}

impl RectShape {
    pub fn filled(bounds: Bounds, fill: Color) -> Self {
        RectShape {
            bounds,
            fill: Some(fill),
            stroke: None,
            line_width: 0.0,
            opacity: 1.0,
        }
    }

    pub fn outlined(bounds: Bounds, stroke: Color, line_width: f64) -> Self {
        RectShape {
            bounds,
            fill: None,
            stroke: Some(stroke),
            line_width,
            opacity: 1.0,
        }
    }

    pub fn with_stroke(mut self, stroke: Color, line_width: f64) -> Self {
        self.stroke = Some(stroke);
        self.line_width = line_width;
        self
    }

    pub fn with_opacity(mut self, opacity: f64) -> Self {
        self.opacity = opacity;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LineShape {
    pub x1: f64,
    pub y1: f64,
    pub x2: f64,
    pub y2: f64,
    pub stroke: Color,
    pub line_width: f64,
    pub opacity: f64,
}

/// A single line of text. `x`/`y` is the top-left corner of its box.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TextShape {
    pub x: f64,
    pub y: f64,
    pub text: String,
    pub style: TextStyle,
}

impl TextShape {
    pub fn width(&self) -> f64 {
        measure_styled_text(&self.text, &self.style)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Shape {
    Rect(RectShape),
    Line(LineShape),
    Text(TextShape),
}

impl Shape {
    /// Bounding box of the shape.
    pub fn bbox(&self) -> Bounds {
        match self {
            Shape::Rect(r) => r.bounds,
            Shape::Line(l) => {
                let x = l.x1.min(l.x2);
                let y = l.y1.min(l.y2);
                Bounds::new(x, y, (l.x1 - l.x2).abs(), (l.y1 - l.y2).abs())
            }
            Shape::Text(t) => Bounds::new(t.x, t.y, t.width(), t.style.font_size),
        }
    }

    pub fn as_text(&self) -> Option<&TextShape> {
        match self {
            Shape::Text(t) => Some(t),
            _ => None,
        }
    }

    pub fn as_rect(&self) -> Option<&RectShape> {
        match self {
            Shape::Rect(r) => Some(r),
            _ => None,
        }
    }
}

impl From<RectShape> for Shape {
    fn from(shape: RectShape) -> Self {
        Shape::Rect(shape)
    }
}

impl From<LineShape> for Shape {
    fn from(shape: LineShape) -> Self {
        Shape::Line(shape)
    }
}

impl From<TextShape> for Shape {
    fn from(shape: TextShape) -> Self {
        Shape::Text(shape)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bboxes() {
        let line = Shape::from(LineShape {
            x1: 10.0,
            y1: 20.0,
            x2: 10.0,
            y2: 8.0,
            stroke: Color::black(),
            line_width: 1.0,
            opacity: 0.25,
        });
        assert_eq!(line.bbox(), Bounds::new(10.0, 8.0, 0.0, 12.0));

        let text = Shape::from(TextShape {
            x: 5.0,
            y: 9.0,
            text: "12".into(),
            style: TextStyle::default(),
        });
        let bbox = text.bbox();
        assert_eq!(bbox.height, 12.0);
        assert!(bbox.width > 0.0);
        assert!(text.as_text().is_some());
        assert!(text.as_rect().is_none());
    }
}
