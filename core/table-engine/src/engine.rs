//! FILENAME: core/table-engine/src/engine.rs
//! Table Engine - lays out a flat table sheet.
//!
//! Key differences from the pivot engine:
//! - Columns are the declared column fields, one depth-0 leaf each
//! - Rows are the source records themselves, no grouping
//! - Sorting is a stable multi-key sort over records, first directive primary
//! - Row ids use the source index so a record keeps its id across re-sorts

use std::cmp::Ordering;

use rustc_hash::FxHashMap;
use engine::{log_enter, log_exit, measure_styled_text, record_value, Bounds, CellTheme, FieldValue, Record};
use pivot_engine::{
    child_id, place_nodes, Axis, AxisItem, DataConfig, DataIndex, HierarchyType, LayoutOptions,
    LayoutResult, Node, SortDirective, SortState, WidthMode, ROOT_ID, SERIES_NUMBER_FIELD,
};

/// Header label of the row number column.
pub const SERIES_NUMBER_LABEL: &str = "No.";

/// Source indices of `records` in display order.
///
/// Only directives whose field is in `columns` take part. Records equal on
/// every key keep their source order.
pub fn sort_record_indices(records: &[Record], columns: &[String], sort_state: &SortState) -> Vec<usize> {
    let directives: Vec<&SortDirective> = sort_state
        .iter()
        .filter(|d| columns.iter().any(|c| *c == d.sort_field_id))
        .collect();

    let mut indices: Vec<usize> = (0..records.len()).collect();
    if directives.is_empty() {
        return indices;
    }

    indices.sort_by(|&a, &b| {
        for directive in &directives {
            let field = directive.sort_field_id.as_str();
            let ord = directive.compare(record_value(&records[a], field), record_value(&records[b], field));
            if ord != Ordering::Equal {
                return ord;
            }
        }
        Ordering::Equal
    });
    indices
}

/// Runs one table layout pass.
pub fn layout_table(config: &DataConfig, options: &LayoutOptions, sort_state: &SortState) -> LayoutResult {
    log_enter!(
        "LAYOUT",
        "layout_table",
        "records={} columns={:?} sorts={}",
        config.data.len(),
        config.fields.columns,
        sort_state.len()
    );

    let style = &options.style;
    let col_header_height = style.col_cfg.height;
    let row_height = style.cell_cfg.height;

    // Rows
    let order = sort_record_indices(&config.data, &config.fields.columns, sort_state);
    let mut row_nodes = Vec::with_capacity(order.len());
    let mut row_items = Vec::with_capacity(order.len());
    for (display_index, &source_index) in order.iter().enumerate() {
        let id = child_id(ROOT_ID, &source_index.to_string());
        let number = FieldValue::Number((display_index + 1) as f64);
        let bounds = Bounds::new(0.0, col_header_height + display_index as f64 * row_height, 0.0, row_height);

        let mut node = Node::with_id(id.as_str(), SERIES_NUMBER_FIELD, number.clone(), (display_index + 1).to_string());
        node.bounds = Some(bounds);
        row_nodes.push(node);

        row_items.push(AxisItem {
            node_id: id.clone(),
            dim_id: id,
            value_field: None,
            record_index: Some(source_index),
            value: number,
            bounds,
            depth: 0,
            is_totals: false,
            is_leaf: true,
        });
    }

    // Columns
    let mut col_nodes: Vec<Node> = Vec::with_capacity(config.fields.columns.len() + 1);
    if options.show_series_number {
        col_nodes.push(Node::new(
            ROOT_ID,
            &[],
            SERIES_NUMBER_FIELD,
            FieldValue::text(SERIES_NUMBER_FIELD),
            SERIES_NUMBER_LABEL,
            0,
        ));
    }
    for field in &config.fields.columns {
        col_nodes.push(Node::new(
            ROOT_ID,
            &[],
            field.as_str(),
            FieldValue::text(field.as_str()),
            config.field_name(field),
            0,
        ));
    }

    let widths = ColumnWidths::measure(config, options, &col_nodes, &order);
    let mut x = 0.0;
    place_nodes(&mut col_nodes, Axis::Col, &mut x, &[0.0], col_header_height, &|node| {
        widths.get(&node.key)
    });

    let col_items: Vec<AxisItem> = col_nodes
        .iter()
        .map(|node| AxisItem {
            node_id: node.id.clone(),
            dim_id: node.id.clone(),
            value_field: Some(node.key.clone()),
            record_index: None,
            value: node.value.clone(),
            bounds: node.bounds.unwrap_or_default(),
            depth: 0,
            is_totals: false,
            is_leaf: true,
        })
        .collect();

    log_exit!(
        "LAYOUT",
        "layout_table",
        "rows={} cols={}",
        row_items.len(),
        col_items.len()
    );

    LayoutResult {
        hierarchy_type: HierarchyType::Grid,
        row_nodes,
        col_nodes,
        row_items,
        col_items,
        row_header_width: 0.0,
        col_header_height,
        row_height,
        row_level_offsets: Vec::new(),
        col_level_offsets: vec![0.0],
        row_fields: Vec::new(),
        col_fields: config.fields.columns.clone(),
        data_index: DataIndex::default(),
        total_index: DataIndex::default(),
        value_ranges: config.value_ranges(&config.fields.columns),
    }
}

/// Column widths keyed by field. Fixed unless the width mode is adaptive.
struct ColumnWidths {
    fixed: f64,
    measured: FxHashMap<String, f64>,
}

impl ColumnWidths {
    fn measure(config: &DataConfig, options: &LayoutOptions, col_nodes: &[Node], order: &[usize]) -> Self {
        let fixed = options.style.cell_cfg.width;
        let mut measured = FxHashMap::default();
        if options.style.col_cfg.width_mode != WidthMode::Adaptive {
            return ColumnWidths { fixed, measured };
        }

        let data_theme = CellTheme::data_cell();
        let header_theme = CellTheme::header();
        let padding = data_theme.padding * 2.0;

        for node in col_nodes {
            let mut width = fixed.max(measure_styled_text(&node.label, &header_theme.bolder_text) + padding);
            for (display_index, &source_index) in order.iter().enumerate() {
                let text = if node.key == SERIES_NUMBER_FIELD {
                    (display_index + 1).to_string()
                } else {
                    let value = record_value(&config.data[source_index], &node.key);
                    config.format_field_value(&node.key, value)
                };
                width = width.max(measure_styled_text(&text, &data_theme.text) + padding);
            }
            measured.insert(node.key.clone(), width);
        }
        ColumnWidths { fixed, measured }
    }

    fn get(&self, field: &str) -> f64 {
        self.measured.get(field).copied().unwrap_or(self.fixed)
    }
}
