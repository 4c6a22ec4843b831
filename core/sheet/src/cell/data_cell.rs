//! FILENAME: core/sheet/src/cell/data_cell.rs
//! PURPOSE: Default data cell: background, interval bar, formatted value.

use engine::{Bounds, Color, FieldValue};
use pivot_engine::ViewMeta;

use super::{CellKind, CellSurface, DrawContext, FormattedValue, SheetCell};
use crate::conditions::{interval_ratio, ConditionKind};
use crate::error::CellDrawError;
use crate::shape::RectShape;

/// Interval bar color when the mapping gives none.
const DEFAULT_INTERVAL_FILL: Color = Color::new(0x5B, 0x8F, 0xF9);
/// Vertical inset of the interval bar.
const INTERVAL_INSET: f64 = 4.0;

#[derive(Debug, Default)]
pub struct DataCell {
    surface: CellSurface,
}

impl DataCell {
    pub fn new() -> Self {
        DataCell::default()
    }

    /// Value text through the field's meta formatter.
    pub fn base_formatted_value(ctx: &DrawContext<'_>, meta: &ViewMeta<'_>) -> FormattedValue {
        let text = ctx
            .config
            .format_field_value(meta.field.unwrap_or_default(), meta.value);
        FormattedValue::new(text, meta.value.clone())
    }

    /// Base painting: background (or its condition), interval bar, then the
    /// value text. Custom cells call this before adding their own shapes.
    pub fn paint(
        &mut self,
        ctx: &DrawContext<'_>,
        meta: &ViewMeta<'_>,
        formatted: &FormattedValue,
    ) -> Result<(), CellDrawError> {
        let theme = ctx.options.theme.data_cell.clone();
        let conditions = &ctx.options.conditions;
        let field = meta.field.unwrap_or_default();

        self.surface.reset(meta.bounds(), theme);

        let background = conditions
            .evaluate(ConditionKind::Background, field, meta.value, meta.data)
            .and_then(|m| m.fill);
        self.surface.draw_background(background);

        if let Some(mapping) = conditions.evaluate(ConditionKind::Interval, field, meta.value, meta.data) {
            if let Some(value) = meta.value.as_f64() {
                let (min_value, max_value) = if mapping.is_compare {
                    (mapping.min_value.unwrap_or(0.0), mapping.max_value.unwrap_or(value))
                } else {
                    ctx.layout.value_range(field).unwrap_or((0.0, value))
                };
                let ratio = interval_ratio(value, min_value, max_value);
                let b = meta.bounds();
                let bar = Bounds::new(
                    b.x,
                    b.y + INTERVAL_INSET,
                    b.width * ratio,
                    (b.height - INTERVAL_INSET * 2.0).max(0.0),
                );
                self.surface
                    .add_shape(RectShape::filled(bar, mapping.fill.unwrap_or(DEFAULT_INTERVAL_FILL)));
            }
        }

        let bolder = meta.is_totals || !is_leaf_cell(ctx, meta);
        let theme = &self.surface.theme;
        let mut style = if bolder {
            theme.bolder_text.clone()
        } else {
            theme.text.clone()
        };
        if let Some(fill) = conditions
            .evaluate(ConditionKind::Text, field, meta.value, meta.data)
            .and_then(|m| m.fill)
        {
            style.fill = fill;
        }
        self.surface.draw_text(&formatted.text, style);
        Ok(())
    }
}

/// Tree parents and subtotal rows are drawn bold like totals.
fn is_leaf_cell(ctx: &DrawContext<'_>, meta: &ViewMeta<'_>) -> bool {
    meta.address
        .and_then(|a| {
            let row = ctx.layout.row_items.get(a.row_index)?;
            let col = ctx.layout.col_items.get(a.col_index)?;
            Some(row.is_leaf && col.is_leaf)
        })
        .unwrap_or(true)
}

impl SheetCell for DataCell {
    fn kind(&self) -> CellKind {
        CellKind::Data
    }

    fn surface(&self) -> &CellSurface {
        &self.surface
    }

    fn surface_mut(&mut self) -> &mut CellSurface {
        &mut self.surface
    }

    fn formatted_value(&self, ctx: &DrawContext<'_>, meta: &ViewMeta<'_>) -> FormattedValue {
        DataCell::base_formatted_value(ctx, meta)
    }

    fn draw(&mut self, ctx: &DrawContext<'_>, meta: &ViewMeta<'_>) -> Result<(), CellDrawError> {
        let formatted = self.formatted_value(ctx, meta);
        self.paint(ctx, meta, &formatted)
    }
}

/// Value of the measure field as a number, or a draw error naming the field.
pub fn numeric_value(meta: &ViewMeta<'_>, field: &str) -> Result<f64, CellDrawError> {
    let value: &FieldValue = meta.record_field(field);
    if value.is_empty() {
        return Err(CellDrawError::MissingField(field.to_string()));
    }
    value.as_f64().ok_or_else(|| CellDrawError::InvalidValue {
        field: field.to_string(),
        reason: format!("expected a number, got {:?}", value.display_value()),
    })
}
