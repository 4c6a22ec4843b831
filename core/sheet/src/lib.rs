//! FILENAME: core/sheet/src/lib.rs
//! Sheet session layer.
//!
//! Wires the layout engines to drawable cells and user input. A session owns
//! the data config, options and sort state; it lays out through
//! `pivot-engine` or `table-engine`, draws every visible cell, and routes
//! pointer input and sort menu choices back into state changes.
//!
//! Layers:
//! - `options` / `conditions`: What the sheet looks like
//! - `shape` / `cell`: How a single grid position draws itself
//! - `interaction` / `tooltip`: What the user did
//! - `render` / `session`: When and what gets drawn

pub mod cell;
pub mod conditions;
pub mod error;
pub mod events;
pub mod interaction;
pub mod options;
pub mod render;
pub mod session;
pub mod shape;
pub mod tooltip;

pub use cell::{
    CellKind, CellSurface, CornerCell, DataCell, DrawContext, FormattedValue, HeaderCell,
    InteractionState, KpiDataCell, SheetCell,
};
pub use conditions::{Condition, ConditionKind, Conditions, FieldMatcher, MappingResult};
pub use error::{CellDrawError, SheetError};
pub use events::SheetEvent;
pub use interaction::{
    resolve_target, HeaderState, HoverTarget, InteractionAction, InteractionCoordinator, Key,
    PointerEvent, PointerEventKind, PointerTarget,
};
pub use options::{DataCellFactory, InteractionOptions, SheetOptions, SheetTheme, TooltipOptions};
pub use render::{guarded_create, guarded_draw, CellFailure, CellLocation, RenderReport, RenderScheduler};
pub use session::{SheetKind, SheetSession};
pub use shape::{LineShape, RectShape, Shape, TextShape};
pub use tooltip::{
    default_sort_choices, FieldDescriptor, NoopTooltip, SortMenuChoice, TooltipCollaborator,
    TooltipContent, TooltipInfo,
};
