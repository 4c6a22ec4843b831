//! FILENAME: core/sheet/src/cell/corner_cell.rs
//! PURPOSE: Top-left cell above the row headers.

use engine::FieldValue;
use pivot_engine::ViewMeta;

use super::{CellKind, CellSurface, DrawContext, FormattedValue, SheetCell};
use crate::error::CellDrawError;

/// Joins row field names in the default corner text.
const FIELD_SEPARATOR: &str = "/";

#[derive(Debug, Default)]
pub struct CornerCell {
    surface: CellSurface,
}

impl CornerCell {
    pub fn new() -> Self {
        CornerCell::default()
    }
}

impl SheetCell for CornerCell {
    fn kind(&self) -> CellKind {
        CellKind::Corner
    }

    fn surface(&self) -> &CellSurface {
        &self.surface
    }

    fn surface_mut(&mut self) -> &mut CellSurface {
        &mut self.surface
    }

    /// `cornerText` when set, otherwise the row field names.
    fn formatted_value(&self, ctx: &DrawContext<'_>, _meta: &ViewMeta<'_>) -> FormattedValue {
        let text = match &ctx.options.corner_text {
            Some(text) => text.clone(),
            None => ctx
                .layout
                .row_fields
                .iter()
                .map(|f| ctx.config.field_name(f))
                .collect::<Vec<_>>()
                .join(FIELD_SEPARATOR),
        };
        FormattedValue::new(text.clone(), FieldValue::Text(text))
    }

    fn draw(&mut self, ctx: &DrawContext<'_>, meta: &ViewMeta<'_>) -> Result<(), CellDrawError> {
        let formatted = self.formatted_value(ctx, meta);
        self.surface.reset(meta.bounds(), ctx.options.theme.corner.clone());
        self.surface.draw_background(None);
        if !formatted.text.is_empty() {
            let style = self.surface.theme.text.clone();
            self.surface.draw_text(&formatted.text, style);
        }
        Ok(())
    }
}
