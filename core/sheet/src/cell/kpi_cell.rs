//! FILENAME: core/sheet/src/cell/kpi_cell.rs
//! PURPOSE: KPI data cell - progress bullet bar, expected line, delta arrow.
//! CONTEXT: Built on the default data cell. Records flagged `isProgress`
//! show their value as a percentage with a bar against `expectedValue`;
//! every record that is not `isExtra` gets a signed delta from `compare`
//! (a leading `-` means down).

use engine::{Bounds, Color, FieldValue, TextStyle};
use pivot_engine::ViewMeta;

use super::data_cell::numeric_value;
use super::{CellKind, CellSurface, DataCell, DrawContext, FormattedValue, SheetCell};
use crate::error::CellDrawError;
use crate::shape::{LineShape, RectShape, TextShape};

pub const VALUE_FIELD: &str = "value";
pub const EXPECTED_FIELD: &str = "expectedValue";
pub const PROGRESS_FLAG: &str = "isProgress";
pub const EXTRA_FLAG: &str = "isExtra";
pub const COMPARE_FIELD: &str = "compare";

const BAR_WIDTH: f64 = 80.0;
const BAR_HEIGHT: f64 = 10.0;
const BAR_INNER_HEIGHT: f64 = 6.0;
const BAR_CONTAINER: Color = Color::new(0xE9, 0xE9, 0xE9);

const EXPECTED_LINE_WIDTH: f64 = 1.0;
const EXPECTED_LINE_HEIGHT: f64 = 12.0;
const EXPECTED_LINE_OPACITY: f64 = 0.25;

const HEALTHY: Color = Color::new(0x30, 0xBF, 0x78);
const LATE: Color = Color::new(0xFA, 0xAD, 0x14);
const DANGER: Color = Color::new(0xF4, 0x66, 0x4A);

const DERIVE_UP: Color = Color::new(0xF4, 0x66, 0x4A);
const DERIVE_DOWN: Color = Color::new(0x30, 0xBF, 0x78);
const DERIVE_FONT_SIZE: f64 = 12.0;

const PADDING: f64 = 10.0;

/// Bar color by how far progress lags behind the expectation.
pub fn status_color(real: f64, expected: f64) -> Color {
    let behind = expected - real;
    if behind <= 0.1 {
        HEALTHY
    } else if behind <= 0.3 {
        LATE
    } else {
        DANGER
    }
}

/// `0.35` -> `35 %`.
pub fn percent_text(value: f64) -> String {
    let percent = (value * 10000.0).round() / 100.0;
    format!("{} %", FieldValue::Number(percent).display_value())
}

#[derive(Debug, Default)]
pub struct KpiDataCell {
    base: DataCell,
}

impl KpiDataCell {
    pub fn new() -> Self {
        KpiDataCell::default()
    }

    fn draw_progress_bar(&mut self, meta: &ViewMeta<'_>) -> Result<(), CellDrawError> {
        if !meta.record_field(PROGRESS_FLAG).is_truthy() {
            return Ok(());
        }
        let current = numeric_value(meta, VALUE_FIELD)?;
        let expected = numeric_value(meta, EXPECTED_FIELD)?;

        let bar_x = meta.x + meta.width - BAR_WIDTH - PADDING;
        let surface = self.base.surface_mut();
        surface.add_shape(RectShape::filled(
            Bounds::new(bar_x, meta.y + (meta.height - BAR_HEIGHT) / 2.0, BAR_WIDTH, BAR_HEIGHT),
            BAR_CONTAINER,
        ));
        surface.add_shape(RectShape::filled(
            Bounds::new(
                bar_x,
                meta.y + (meta.height - BAR_INNER_HEIGHT) / 2.0,
                (BAR_WIDTH * current).clamp(0.0, BAR_WIDTH),
                BAR_INNER_HEIGHT,
            ),
            status_color(current, expected),
        ));

        let line_x = bar_x + BAR_WIDTH * expected;
        let line_y = meta.y + (meta.height - EXPECTED_LINE_HEIGHT) / 2.0;
        surface.add_shape(LineShape {
            x1: line_x,
            y1: line_y,
            x2: line_x,
            y2: line_y + EXPECTED_LINE_HEIGHT,
            stroke: Color::black(),
            line_width: EXPECTED_LINE_WIDTH,
            opacity: EXPECTED_LINE_OPACITY,
        });
        Ok(())
    }

    fn draw_derive_value(&mut self, meta: &ViewMeta<'_>) {
        if meta.data.is_none() || meta.record_field(EXTRA_FLAG).is_truthy() {
            return;
        }
        let compare = meta.record_field(COMPARE_FIELD).display_value();
        if compare.is_empty() {
            return;
        }

        let is_down = compare.starts_with('-');
        let magnitude = compare.replacen('-', "", 1);
        let (arrow, fill) = if is_down { ("↓", DERIVE_DOWN) } else { ("↑", DERIVE_UP) };
        let text = format!("{}{}", arrow, magnitude);
        let style = TextStyle {
            fill,
            font_size: DERIVE_FONT_SIZE,
            ..TextStyle::default()
        };

        let surface = self.base.surface_mut();
        let width = engine::measure_styled_text(&text, &style);
        let bottom = surface
            .text_bbox
            .map(|b| b.max_y())
            .unwrap_or_else(|| meta.bounds().center_y() + DERIVE_FONT_SIZE / 2.0);
        surface.add_shape(TextShape {
            x: meta.x + meta.width - width - PADDING,
            y: bottom - DERIVE_FONT_SIZE,
            text,
            style,
        });
    }
}

impl SheetCell for KpiDataCell {
    fn kind(&self) -> CellKind {
        CellKind::Custom
    }

    fn surface(&self) -> &CellSurface {
        self.base.surface()
    }

    fn surface_mut(&mut self) -> &mut CellSurface {
        self.base.surface_mut()
    }

    fn formatted_value(&self, ctx: &DrawContext<'_>, meta: &ViewMeta<'_>) -> FormattedValue {
        let progress = meta
            .data
            .filter(|_| meta.record_field(PROGRESS_FLAG).is_truthy())
            .and_then(|_| meta.value.as_f64());
        match progress {
            Some(value) => FormattedValue::new(percent_text(value), meta.value.clone()),
            None => DataCell::base_formatted_value(ctx, meta),
        }
    }

    fn draw(&mut self, ctx: &DrawContext<'_>, meta: &ViewMeta<'_>) -> Result<(), CellDrawError> {
        let formatted = self.formatted_value(ctx, meta);
        self.base.paint(ctx, meta, &formatted)?;
        self.draw_progress_bar(meta)?;
        self.draw_derive_value(meta);
        Ok(())
    }
}
