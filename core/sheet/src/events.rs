//! FILENAME: core/sheet/src/events.rs
//! PURPOSE: Events a sheet session emits for its host.

use serde::Serialize;
use pivot_engine::{DataCellAddress, SortState};

use crate::interaction::HoverTarget;
use crate::render::CellLocation;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", content = "payload", rename_all = "camelCase")]
pub enum SheetEvent {
    /// A header opened its sort menu.
    #[serde(rename_all = "camelCase")]
    SortMenuRequested { node_id: String, field: String },

    /// The sort state changed through the sort menu.
    SortApplied(SortState),

    CellHoverChanged(Option<HoverTarget>),

    SelectionChanged(Vec<DataCellAddress>),

    /// A render pass finished.
    RenderComplete {
        drawn: usize,
        failed: Vec<CellLocation>,
    },
}
