//! FILENAME: core/sheet/src/cell/mod.rs
//! PURPOSE: The cell abstraction - one rendering unit per grid position.
//! CONTEXT: A cell draws by appending shape descriptors to its own surface.
//! It reads a borrowed `ViewMeta` and the `DrawContext` and never touches
//! another cell or the node trees. Custom variants wrap a base cell and call
//! its painting explicitly before adding their own shapes.

pub mod corner_cell;
pub mod data_cell;
pub mod header_cell;
pub mod kpi_cell;

use serde::Serialize;
use engine::{Bounds, CellTheme, Color, FieldValue, TextAlign, TextStyle};
use pivot_engine::{DataConfig, LayoutResult, SortState, ViewMeta};

use crate::error::CellDrawError;
use crate::options::SheetOptions;
use crate::shape::{RectShape, Shape, TextShape};

pub use corner_cell::CornerCell;
pub use data_cell::DataCell;
pub use header_cell::HeaderCell;
pub use kpi_cell::KpiDataCell;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum CellKind {
    RowHeader,
    ColHeader,
    Data,
    Corner,
    Custom,
}

/// Visual interaction state pushed into a cell by the coordinator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum InteractionState {
    #[default]
    Default,
    Hover,
    Selected,
    /// Outside the current selection while spotlighting.
    Unselected,
}

/// Everything a cell may read while drawing besides its own `ViewMeta`.
#[derive(Debug, Clone, Copy)]
pub struct DrawContext<'a> {
    pub config: &'a DataConfig,
    pub options: &'a SheetOptions,
    pub layout: &'a LayoutResult,
    pub sort_state: &'a SortState,
}

/// Text a cell shows plus the value it was derived from.
#[derive(Debug, Clone, PartialEq)]
pub struct FormattedValue {
    pub text: String,
    pub value: FieldValue,
}

impl FormattedValue {
    pub fn new(text: impl Into<String>, value: FieldValue) -> Self {
        FormattedValue {
            text: text.into(),
            value,
        }
    }
}

// ============================================================================
// CELL SURFACE
// ============================================================================

/// Shapes owned by one cell: the drawn content plus the interaction overlay.
#[derive(Debug, Clone, Default)]
pub struct CellSurface {
    pub bounds: Bounds,
    pub theme: CellTheme,
    pub shapes: Vec<Shape>,
    pub state_shapes: Vec<Shape>,
    pub state: InteractionState,

    /// Bounding box of the main text shape, once drawn.
    pub text_bbox: Option<Bounds>,
}

impl CellSurface {
    /// Starts a fresh draw. The interaction state survives a redraw.
    pub fn reset(&mut self, bounds: Bounds, theme: CellTheme) {
        self.bounds = bounds;
        self.theme = theme;
        self.shapes.clear();
        self.text_bbox = None;
        self.repaint_state();
    }

    pub fn clear(&mut self) {
        self.shapes.clear();
        self.state_shapes.clear();
        self.text_bbox = None;
    }

    pub fn add_shape(&mut self, shape: impl Into<Shape>) {
        self.shapes.push(shape.into());
    }

    /// Background rect with the theme border.
    pub fn draw_background(&mut self, fill: Option<Color>) {
        let theme = &self.theme;
        let rect = RectShape::filled(self.bounds, fill.unwrap_or(theme.background))
            .with_stroke(theme.border, theme.border_width);
        self.add_shape(rect);
    }

    /// Draws `text` inside the bounds honoring the style's alignment and
    /// records its bounding box.
    pub fn draw_text(&mut self, text: &str, style: TextStyle) -> Bounds {
        let shape = aligned_text(self.bounds, self.theme.padding, text, style);
        let bbox = Shape::Text(shape.clone()).bbox();
        self.text_bbox = Some(bbox);
        self.add_shape(shape);
        bbox
    }

    pub fn set_state(&mut self, state: InteractionState) {
        self.state = state;
        self.repaint_state();
    }

    fn repaint_state(&mut self) {
        self.state_shapes.clear();
        let theme = &self.theme;
        let overlay = match self.state {
            InteractionState::Default => None,
            InteractionState::Hover => Some(RectShape::filled(self.bounds, theme.hover_overlay)),
            InteractionState::Selected => Some(RectShape::outlined(
                self.bounds,
                theme.selected_border,
                theme.border_width * 2.0,
            )),
            InteractionState::Unselected => Some(
                RectShape::filled(self.bounds, Color::white())
                    .with_opacity(1.0 - theme.unselected_opacity),
            ),
        };
        if let Some(rect) = overlay {
            self.state_shapes.push(rect.into());
        }
    }

    /// Content shapes followed by the interaction overlay.
    pub fn all_shapes(&self) -> impl Iterator<Item = &Shape> {
        self.shapes.iter().chain(self.state_shapes.iter())
    }
}

/// Positions one line of text inside `bounds`, vertically centered.
pub fn aligned_text(bounds: Bounds, padding: f64, text: &str, style: TextStyle) -> TextShape {
    let width = engine::measure_styled_text(text, &style);
    let x = match style.text_align {
        TextAlign::Left => bounds.x + padding,
        TextAlign::Center => bounds.x + (bounds.width - width) / 2.0,
        TextAlign::Right => bounds.max_x() - padding - width,
    };
    let y = bounds.center_y() - style.font_size / 2.0;
    TextShape {
        x,
        y,
        text: text.to_string(),
        style,
    }
}

// ============================================================================
// CELL TRAIT
// ============================================================================

pub trait SheetCell {
    fn kind(&self) -> CellKind;

    fn surface(&self) -> &CellSurface;

    fn surface_mut(&mut self) -> &mut CellSurface;

    /// Text shown for `meta`.
    fn formatted_value(&self, ctx: &DrawContext<'_>, meta: &ViewMeta<'_>) -> FormattedValue;

    /// Rebuilds the cell's shapes for `meta`.
    fn draw(&mut self, ctx: &DrawContext<'_>, meta: &ViewMeta<'_>) -> Result<(), CellDrawError>;

    fn shapes(&self) -> &[Shape] {
        &self.surface().shapes
    }

    /// Repaints the interaction overlay only. Content shapes stay as drawn.
    fn on_interaction_state_change(&mut self, state: InteractionState) {
        self.surface_mut().set_state(state);
    }

    fn interaction_state(&self) -> InteractionState {
        self.surface().state
    }

    /// Drops every shape (a failed draw leaves the cell blank).
    fn clear(&mut self) {
        self.surface_mut().clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_overlay_survives_redraw() {
        let mut surface = CellSurface::default();
        surface.reset(Bounds::new(0.0, 0.0, 100.0, 30.0), CellTheme::data_cell());
        surface.set_state(InteractionState::Hover);
        assert_eq!(surface.state_shapes.len(), 1);

        surface.reset(Bounds::new(0.0, 30.0, 100.0, 30.0), CellTheme::data_cell());
        assert_eq!(surface.state, InteractionState::Hover);
        let overlay = surface.state_shapes[0].as_rect().unwrap();
        assert_eq!(overlay.bounds.y, 30.0);

        surface.set_state(InteractionState::Default);
        assert!(surface.state_shapes.is_empty());
    }

    #[test]
    fn test_aligned_text() {
        let bounds = Bounds::new(10.0, 0.0, 100.0, 30.0);
        let style = TextStyle::default();
        let width = engine::measure_styled_text("42", &style);

        let right = aligned_text(bounds, 8.0, "42", style.clone());
        assert!((right.x - (110.0 - 8.0 - width)).abs() < 1e-9);
        assert_eq!(right.y, 9.0);

        let left = aligned_text(bounds, 8.0, "42", style.aligned(TextAlign::Left));
        assert_eq!(left.x, 18.0);
    }
}
