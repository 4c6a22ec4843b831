//! FILENAME: core/pivot-engine/src/lib.rs
//! Pivot layout subsystem.
//!
//! Turns a data config (fields, meta, records, sort params) into positioned
//! row/column header trees and an addressable data cell grid. It depends on
//! `engine` only for shared types (FieldValue, Record, Bounds, styles).
//!
//! Layers:
//! - `definition`: Serializable configuration (what the sheet IS)
//! - `sort`: Sort directives and the sort state merge rule
//! - `node`: Header tree nodes
//! - `cache`: Per-pass data index (HOW cells find their records)
//! - `view`: Positioned output and the cell view model (WHAT we display)
//! - `engine`: Layout engine (HOW we lay out)

pub mod definition;
pub mod sort;
pub mod node;
pub mod cache;
pub mod view;
pub mod engine;

pub use definition::*;
pub use sort::{apply_sort, SortDirective, SortMethod, SortRequest, SortState};
pub use node::{child_id, collect_leaves, find_node, flatten, Node, NodePath};
pub use cache::{record_path_id, values_path_id, DataIndex, PathMode};
pub use view::{AxisItem, DataCellAddress, LayoutResult, ViewMeta};
pub use self::engine::{grand_total_id, layout, place_nodes, LayoutCalculator};
