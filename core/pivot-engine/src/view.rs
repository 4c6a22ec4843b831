//! FILENAME: core/pivot-engine/src/view.rs
//! Layout View - the positioned output of a layout pass.
//!
//! A `LayoutResult` holds the laid-out header trees, the flattened row and
//! column items that span the data cell address space, and the data indexes
//! used to resolve a cell's value lazily. Cells never receive the result
//! itself; they get a `ViewMeta` borrowed from it for the duration of a draw.

use rustc_hash::FxHashMap;
use serde::Serialize;
use engine::{record_value, Bounds, FieldValue, Record};

use crate::cache::DataIndex;
use crate::definition::{Axis, DataConfig, HierarchyType, SERIES_NUMBER_FIELD};
use crate::node::{find_node, flatten, Node};

// ============================================================================
// AXIS ITEMS
// ============================================================================

/// One row or column of the data cell grid.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AxisItem {
    /// Id of the header node this item belongs to.
    pub node_id: String,

    /// Dimension id used for index lookups (measure level excluded).
    pub dim_id: String,

    /// Measure field contributed by this axis, if the measure level is here.
    /// Table columns carry their own field.
    pub value_field: Option<String>,

    /// Source record for table rows.
    pub record_index: Option<usize>,

    /// Value shown for this item (row number for table rows).
    pub value: FieldValue,

    pub bounds: Bounds,
    pub depth: usize,
    pub is_totals: bool,
    pub is_leaf: bool,
}

/// Position of a data cell in the grid (row item index, column item index).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DataCellAddress {
    pub row_index: usize,
    pub col_index: usize,
}

impl DataCellAddress {
    pub fn new(row_index: usize, col_index: usize) -> Self {
        DataCellAddress { row_index, col_index }
    }
}

// ============================================================================
// CELL VIEW MODEL
// ============================================================================

/// Read-only snapshot handed to a cell while it draws.
#[derive(Debug, Clone, Copy)]
pub struct ViewMeta<'a> {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,

    /// Raw value of the cell (header value for header cells).
    pub value: &'a FieldValue,

    /// Row node id ("" for column headers and the corner).
    pub row_id: &'a str,

    /// Column node id ("" for row headers and the corner).
    pub col_id: &'a str,

    /// Field whose value is shown (measure field for data cells).
    pub field: Option<&'a str>,

    /// Header label.
    pub label: Option<&'a str>,

    /// Raw record behind the cell.
    pub data: Option<&'a Record>,

    /// Grid position for data cells.
    pub address: Option<DataCellAddress>,

    /// Header node for header cells.
    pub node: Option<&'a Node>,

    pub depth: usize,
    pub is_totals: bool,
}

impl<'a> ViewMeta<'a> {
    pub fn bounds(&self) -> Bounds {
        Bounds::new(self.x, self.y, self.width, self.height)
    }

    /// Another field of the record behind this cell.
    pub fn record_field(&self, field: &str) -> &'a FieldValue {
        static EMPTY: FieldValue = FieldValue::Empty;
        match self.data {
            Some(record) => record_value(record, field),
            None => &EMPTY,
        }
    }
}

/// Record behind the intersection of `row` and `col`. Totals, tree parents
/// and subtotals read `total_data`; table rows point at their record directly.
pub(crate) fn resolve_record<'a>(
    config: &'a DataConfig,
    data_index: &DataIndex,
    total_index: &DataIndex,
    row: &AxisItem,
    col: &AxisItem,
) -> Option<&'a Record> {
    if let Some(index) = row.record_index {
        return config.data.get(index);
    }
    if row.is_totals || col.is_totals || !row.is_leaf || !col.is_leaf {
        total_index
            .first(&row.dim_id, &col.dim_id)
            .and_then(|i| config.total_data.get(i))
    } else {
        data_index
            .first(&row.dim_id, &col.dim_id)
            .and_then(|i| config.data.get(i))
    }
}

// ============================================================================
// LAYOUT RESULT
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct LayoutResult {
    pub hierarchy_type: HierarchyType,

    /// Row header forest (grand total last when enabled).
    pub row_nodes: Vec<Node>,

    /// Column header forest.
    pub col_nodes: Vec<Node>,

    /// Grid rows in display order.
    pub row_items: Vec<AxisItem>,

    /// Grid columns in display order.
    pub col_items: Vec<AxisItem>,

    pub row_header_width: f64,
    pub col_header_height: f64,

    /// Height of one display row.
    pub row_height: f64,

    /// Where each header level starts across its axis (grid placement).
    pub row_level_offsets: Vec<f64>,
    pub col_level_offsets: Vec<f64>,

    /// Dimension fields of each axis (measure level excluded).
    pub row_fields: Vec<String>,
    pub col_fields: Vec<String>,

    /// `data` records by coordinate.
    pub data_index: DataIndex,

    /// `total_data` records by coordinate.
    pub total_index: DataIndex,

    /// Min / max of every measure (pivot) or column (table) field.
    pub value_ranges: FxHashMap<String, (f64, f64)>,
}

impl LayoutResult {
    pub fn corner_bounds(&self) -> Bounds {
        Bounds::new(0.0, 0.0, self.row_header_width, self.col_header_height)
    }

    /// Full content size (headers included).
    pub fn content_width(&self) -> f64 {
        self.col_items
            .last()
            .map(|c| c.bounds.max_x())
            .unwrap_or(self.row_header_width)
    }

    pub fn content_height(&self) -> f64 {
        self.row_items
            .last()
            .map(|r| r.bounds.max_y())
            .unwrap_or(self.col_header_height)
    }

    pub fn value_range(&self, field: &str) -> Option<(f64, f64)> {
        self.value_ranges.get(field).copied()
    }

    pub fn data_cell_count(&self) -> usize {
        self.row_items.len() * self.col_items.len()
    }

    /// Every address of the grid, row-major.
    pub fn addresses(&self) -> impl Iterator<Item = DataCellAddress> + '_ {
        let cols = self.col_items.len();
        (0..self.row_items.len())
            .flat_map(move |r| (0..cols).map(move |c| DataCellAddress::new(r, c)))
    }

    /// Address of the cell at (row node id, column node id).
    pub fn address_of(&self, row_id: &str, col_id: &str) -> Option<DataCellAddress> {
        let row_index = self.row_items.iter().position(|r| r.node_id == row_id)?;
        let col_index = self.col_items.iter().position(|c| c.node_id == col_id)?;
        Some(DataCellAddress::new(row_index, col_index))
    }

    pub fn find_node(&self, id: &str) -> Option<(&Node, Axis)> {
        if let Some(node) = find_node(&self.row_nodes, id) {
            return Some((node, Axis::Row));
        }
        find_node(&self.col_nodes, id).map(|n| (n, Axis::Col))
    }

    /// All header nodes of one axis in pre-order.
    pub fn header_nodes(&self, axis: Axis) -> Vec<&Node> {
        match axis {
            Axis::Row => flatten(&self.row_nodes),
            Axis::Col => flatten(&self.col_nodes),
        }
    }

    /// Area painted by a header cell. Tree rows only paint their own display
    /// row and grid parents only their own level; leaves paint their full
    /// node bounds.
    pub fn header_cell_bounds(&self, node: &Node, axis: Axis) -> Bounds {
        let bounds = node.bounds.unwrap_or_default();
        if axis == Axis::Row && self.hierarchy_type == HierarchyType::Tree {
            return Bounds::new(bounds.x, bounds.y, bounds.width, self.row_height.min(bounds.height));
        }
        if node.is_leaf() {
            return bounds;
        }
        match axis {
            Axis::Row => {
                let end = self.row_level_offsets.get(node.depth + 1).copied().unwrap_or(bounds.max_x());
                Bounds::new(bounds.x, bounds.y, (end - bounds.x).max(0.0), bounds.height)
            }
            Axis::Col => {
                let end = self.col_level_offsets.get(node.depth + 1).copied().unwrap_or(bounds.max_y());
                Bounds::new(bounds.x, bounds.y, bounds.width, (end - bounds.y).max(0.0))
            }
        }
    }

    pub fn header_meta<'a>(&'a self, node: &'a Node, axis: Axis) -> ViewMeta<'a> {
        let b = self.header_cell_bounds(node, axis);
        let (row_id, col_id) = match axis {
            Axis::Row => (node.id.as_str(), ""),
            Axis::Col => ("", node.id.as_str()),
        };
        ViewMeta {
            x: b.x,
            y: b.y,
            width: b.width,
            height: b.height,
            value: &node.value,
            row_id,
            col_id,
            field: Some(node.key.as_str()),
            label: Some(node.label.as_str()),
            data: None,
            address: None,
            node: Some(node),
            depth: node.depth,
            is_totals: node.is_totals,
        }
    }

    /// Resolves one data cell.
    pub fn data_cell<'a>(
        &'a self,
        config: &'a DataConfig,
        address: DataCellAddress,
    ) -> Option<ViewMeta<'a>> {
        static EMPTY: FieldValue = FieldValue::Empty;

        let row = self.row_items.get(address.row_index)?;
        let col = self.col_items.get(address.col_index)?;
        let field = row
            .value_field
            .as_deref()
            .or(col.value_field.as_deref());

        let is_totals = row.is_totals || col.is_totals;
        let data = resolve_record(config, &self.data_index, &self.total_index, row, col);
        let value = match (field, data) {
            (Some(SERIES_NUMBER_FIELD), _) => &row.value,
            (Some(f), Some(record)) => record_value(record, f),
            _ => &EMPTY,
        };

        Some(ViewMeta {
            x: col.bounds.x,
            y: row.bounds.y,
            width: col.bounds.width,
            height: row.bounds.height,
            value,
            row_id: &row.node_id,
            col_id: &col.node_id,
            field,
            label: None,
            data,
            address: Some(address),
            node: None,
            depth: row.depth,
            is_totals,
        })
    }

    /// Every data cell, row-major.
    pub fn data_cells<'a>(
        &'a self,
        config: &'a DataConfig,
    ) -> impl Iterator<Item = ViewMeta<'a>> + 'a {
        self.addresses()
            .filter_map(move |address| self.data_cell(config, address))
    }
}
