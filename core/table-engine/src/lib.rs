//! FILENAME: core/table-engine/src/lib.rs
//! Table sheet subsystem.
//!
//! Flat tables: the column field list is a single header row and every source
//! record is one grid row. It depends on `pivot-engine` for the node, sort and
//! view types so table and pivot sheets share one `LayoutResult` shape, and on
//! `engine` for shared types.
//!
//! Layers:
//! - `engine`: Table layout (record ordering, column sizing, coordinates)

pub mod engine;

pub use self::engine::{layout_table, sort_record_indices, SERIES_NUMBER_LABEL};
