//! FILENAME: core/sheet/src/render.rs
//! PURPOSE: Render scheduling and per-cell failure isolation.
//! CONTEXT: Render requests raised during a batch or during a running pass
//! are coalesced into one trailing render. Each cell draws inside its own
//! guard; a returned error or a panic blanks that cell only and the pass
//! carries on.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};

use serde::Serialize;
use engine::{log_warn, Bounds};
use pivot_engine::{DataCellAddress, ViewMeta};

use crate::cell::{DrawContext, SheetCell};
use crate::error::CellDrawError;
use crate::options::DataCellFactory;

// ============================================================================
// SCHEDULER
// ============================================================================

#[derive(Debug, Default)]
pub struct RenderScheduler {
    batch_depth: usize,
    in_pass: bool,
    pending: bool,
}

impl RenderScheduler {
    pub fn new() -> Self {
        RenderScheduler::default()
    }

    /// Registers a render request. Returns true when the caller should render
    /// now; otherwise the request is folded into the pending one.
    pub fn request(&mut self) -> bool {
        if self.batch_depth > 0 || self.in_pass {
            self.pending = true;
            return false;
        }
        true
    }

    pub fn begin_batch(&mut self) {
        self.batch_depth += 1;
    }

    /// Ends a batch. Returns true when a render is owed.
    pub fn end_batch(&mut self) -> bool {
        self.batch_depth = self.batch_depth.saturating_sub(1);
        self.batch_depth == 0 && !self.in_pass && std::mem::take(&mut self.pending)
    }

    pub fn begin_pass(&mut self) {
        self.in_pass = true;
    }

    /// Ends a pass. Returns true when a trailing render was requested meanwhile.
    pub fn end_pass(&mut self) -> bool {
        self.in_pass = false;
        self.batch_depth == 0 && std::mem::take(&mut self.pending)
    }

    pub fn in_batch(&self) -> bool {
        self.batch_depth > 0
    }

    pub fn is_pending(&self) -> bool {
        self.pending
    }
}

// ============================================================================
// REPORT
// ============================================================================

/// Where a failed cell sits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum CellLocation {
    Data(DataCellAddress),
    Header(String),
    Corner,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CellFailure {
    pub location: CellLocation,
    pub error: String,
}

/// Outcome of one render pass.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderReport {
    pub drawn: usize,
    pub failed: Vec<CellFailure>,
    /// Cells skipped because they lie outside the viewport.
    pub culled: usize,
}

impl RenderReport {
    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }

    pub fn failed_addresses(&self) -> Vec<DataCellAddress> {
        self.failed
            .iter()
            .filter_map(|f| match f.location {
                CellLocation::Data(address) => Some(address),
                _ => None,
            })
            .collect()
    }

    pub fn record(&mut self, location: CellLocation, result: Result<(), CellDrawError>) {
        match result {
            Ok(()) => self.drawn += 1,
            Err(error) => self.failed.push(CellFailure {
                location,
                error: error.to_string(),
            }),
        }
    }
}

// ============================================================================
// GUARDED DRAW
// ============================================================================

/// Draws one cell. A failing cell is cleared so it renders blank.
pub fn guarded_draw(
    cell: &mut dyn SheetCell,
    ctx: &DrawContext<'_>,
    meta: &ViewMeta<'_>,
) -> Result<(), CellDrawError> {
    let result = panic::catch_unwind(AssertUnwindSafe(|| cell.draw(ctx, meta)))
        .unwrap_or_else(|payload| Err(CellDrawError::Panicked(panic_message(payload.as_ref()))));

    if let Err(error) = &result {
        log_warn!(
            "CELL",
            "draw failed at ({}, {}): {}",
            meta.row_id,
            meta.col_id,
            error
        );
        cell.clear();
    }
    result
}

/// Builds a data cell through a custom factory. A panicking factory fails
/// that cell only.
pub fn guarded_create(
    factory: &DataCellFactory,
    meta: &ViewMeta<'_>,
) -> Result<Box<dyn SheetCell>, CellDrawError> {
    panic::catch_unwind(AssertUnwindSafe(|| factory.create(meta))).map_err(|payload| {
        let error = CellDrawError::Panicked(panic_message(payload.as_ref()));
        log_warn!(
            "CELL",
            "create failed at ({}, {}): {}",
            meta.row_id,
            meta.col_id,
            error
        );
        error
    })
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}

/// Whether a cell at `bounds` is visible in the viewport.
pub fn is_visible(bounds: &Bounds, viewport: &Bounds) -> bool {
    bounds.intersects(viewport)
}
