//! FILENAME: core/sheet/src/cell/header_cell.rs
//! PURPOSE: Row and column header cells with the sort indicator.

use engine::TextAlign;
use pivot_engine::{Axis, Node, SortDirective, SortMethod, ViewMeta, EXTRA_FIELD};

use super::{aligned_text, CellKind, CellSurface, DrawContext, FormattedValue, SheetCell};
use crate::error::CellDrawError;

const SORT_ASC: &str = "↑";
const SORT_DESC: &str = "↓";
const SORT_CUSTOM: &str = "≡";

/// Field a header node sorts. Measure nodes sort their value field.
pub fn sort_field_of(node: &Node) -> &str {
    if node.key == EXTRA_FIELD {
        node.value.as_str().unwrap_or(EXTRA_FIELD)
    } else {
        &node.key
    }
}

/// Glyph shown next to a header sorted by `directive`.
pub fn sort_indicator(directive: &SortDirective) -> &'static str {
    if directive.sort_by.is_some() {
        return SORT_CUSTOM;
    }
    match directive.sort_method {
        SortMethod::Asc => SORT_ASC,
        SortMethod::Desc => SORT_DESC,
    }
}

#[derive(Debug)]
pub struct HeaderCell {
    axis: Axis,
    surface: CellSurface,
}

impl HeaderCell {
    pub fn new(axis: Axis) -> Self {
        HeaderCell {
            axis,
            surface: CellSurface::default(),
        }
    }

    pub fn axis(&self) -> Axis {
        self.axis
    }
}

impl SheetCell for HeaderCell {
    fn kind(&self) -> CellKind {
        match self.axis {
            Axis::Row => CellKind::RowHeader,
            Axis::Col => CellKind::ColHeader,
        }
    }

    fn surface(&self) -> &CellSurface {
        &self.surface
    }

    fn surface_mut(&mut self) -> &mut CellSurface {
        &mut self.surface
    }

    fn formatted_value(&self, _ctx: &DrawContext<'_>, meta: &ViewMeta<'_>) -> FormattedValue {
        let text = meta
            .label
            .map(str::to_string)
            .unwrap_or_else(|| meta.value.display_value());
        FormattedValue::new(text, meta.value.clone())
    }

    fn draw(&mut self, ctx: &DrawContext<'_>, meta: &ViewMeta<'_>) -> Result<(), CellDrawError> {
        let formatted = self.formatted_value(ctx, meta);
        self.surface.reset(meta.bounds(), ctx.options.theme.header.clone());
        self.surface.draw_background(None);

        let bolder = meta.is_totals || meta.node.map_or(false, |n| !n.is_leaf());
        let theme = &self.surface.theme;
        let style = if bolder {
            theme.bolder_text.clone()
        } else {
            theme.text.clone()
        };
        let padding = theme.padding;
        self.surface.draw_text(&formatted.text, style.clone());

        let directive = meta
            .node
            .map(sort_field_of)
            .and_then(|field| ctx.sort_state.get(field));
        if let Some(directive) = directive {
            let indicator = aligned_text(
                self.surface.bounds,
                padding,
                sort_indicator(directive),
                style.aligned(TextAlign::Right),
            );
            self.surface.add_shape(indicator);
        }
        Ok(())
    }
}
