//! FILENAME: core/pivot-engine/src/engine.rs
//! Layout Engine - turns a data config into positioned header trees and a
//! data cell grid.
//!
//! Algorithm:
//! 1. Resolve effective axis fields (the measure level joins rows or columns)
//! 2. Build axis trees by grouping records depth-first, ordering siblings with
//!    the sort directive of that level's field (stable, first occurrence wins ties)
//! 3. Append grand-total nodes when configured
//! 4. Build the data and total indexes once for the pass
//! 5. Assign coordinates: rows first, then columns (adaptive widths need the rows)
//! 6. Flatten trees into row/column items spanning the cell address space
//!
//! The pass is a pure function of (config, options, sort state).

use rustc_hash::FxHashMap;
use engine::{
    log_debug, log_enter, log_exit, measure_styled_text, record_value, Bounds, CellTheme,
    FieldValue,
};

use crate::cache::{values_path_id, DataIndex, PathMode};
use crate::definition::{
    Axis, DataConfig, HierarchyType, LayoutOptions, WidthMode, EXTRA_FIELD, ROOT_ID,
};
use crate::node::{child_id, Node};
use crate::sort::SortState;
use crate::view::{resolve_record, AxisItem, LayoutResult};

/// Runs one layout pass.
pub fn layout(config: &DataConfig, options: &LayoutOptions, sort_state: &SortState) -> LayoutResult {
    LayoutCalculator::new(config, options, sort_state).calculate()
}

// ============================================================================
// LAYOUT CALCULATOR
// ============================================================================

pub struct LayoutCalculator<'a> {
    config: &'a DataConfig,
    options: &'a LayoutOptions,
    sort_state: &'a SortState,

    /// Row fields including the measure level when values sit in rows.
    row_fields: Vec<String>,

    /// Column fields including the measure level when values sit in columns.
    col_fields: Vec<String>,

    /// Dimension fields only (index keys).
    row_dims: Vec<String>,
    col_dims: Vec<String>,
}

impl<'a> LayoutCalculator<'a> {
    pub fn new(config: &'a DataConfig, options: &'a LayoutOptions, sort_state: &'a SortState) -> Self {
        let fields = &config.fields;
        let mut row_fields = fields.rows.clone();
        let mut col_fields = fields.columns.clone();
        if !fields.values.is_empty() {
            if fields.value_in_cols {
                col_fields.push(EXTRA_FIELD.to_string());
            } else {
                row_fields.push(EXTRA_FIELD.to_string());
            }
        }

        LayoutCalculator {
            config,
            options,
            sort_state,
            row_fields,
            col_fields,
            row_dims: fields.rows.clone(),
            col_dims: fields.columns.clone(),
        }
    }

    pub fn calculate(&self) -> LayoutResult {
        log_enter!(
            "LAYOUT",
            "layout",
            "records={} rows={:?} cols={:?} sorts={}",
            self.config.data.len(),
            self.row_fields,
            self.col_fields,
            self.sort_state.len()
        );

        for directive in self.sort_state {
            let field = directive.sort_field_id.as_str();
            if !self.row_fields.iter().any(|f| f == field) && !self.col_fields.iter().any(|f| f == field) {
                log_debug!("LAYOUT", "directive for {} has no axis level, ignored", field);
            }
        }

        // Step 1-3: trees
        let mut row_nodes = self.build_axis_tree(&self.row_fields, Axis::Row);
        let mut col_nodes = self.build_axis_tree(&self.col_fields, Axis::Col);

        // Step 4: indexes
        let data_index = DataIndex::build(&self.config.data, &self.row_dims, &self.col_dims, PathMode::Full);
        let total_index = DataIndex::build(
            &self.config.total_data,
            &self.row_dims,
            &self.col_dims,
            PathMode::Prefix,
        );

        // Step 5: coordinates
        let col_level_heights = self.col_level_heights();
        let col_header_height = if self.col_fields.is_empty() {
            self.options.style.col_cfg.height
        } else {
            col_level_heights.iter().sum()
        };
        let row_header_width = self.row_header_width();
        let row_height = self.options.style.cell_cfg.height;

        let row_level_offsets = cumulative(&self.row_level_widths(), 0.0);
        match self.options.hierarchy_type {
            HierarchyType::Grid => {
                let mut y = col_header_height;
                place_nodes(&mut row_nodes, Axis::Row, &mut y, &row_level_offsets, row_header_width, &|_| row_height);
            }
            HierarchyType::Tree => {
                let mut y = col_header_height;
                self.place_tree_rows(&mut row_nodes, &mut y, row_height);
            }
        }

        let row_items = self.row_items(&row_nodes, row_header_width, col_header_height, row_height);

        let mut leaf_widths: FxHashMap<String, f64> = FxHashMap::default();
        if self.options.style.col_cfg.width_mode == WidthMode::Adaptive {
            let pending = self.col_items(&col_nodes, row_header_width, col_header_height);
            for col in &pending {
                let width = self.adaptive_width(&col_nodes, col, &row_items, &data_index, &total_index);
                leaf_widths.insert(col.node_id.clone(), width);
            }
        }

        let cell_width = self.options.style.cell_cfg.width;
        let col_level_offsets = cumulative(&col_level_heights, 0.0);
        let mut x = row_header_width;
        place_nodes(&mut col_nodes, Axis::Col, &mut x, &col_level_offsets, col_header_height, &|node| {
            leaf_widths.get(&node.id).copied().unwrap_or(cell_width)
        });

        // Step 6: items
        let col_items = self.col_items(&col_nodes, row_header_width, col_header_height);

        log_exit!(
            "LAYOUT",
            "layout",
            "row_items={} col_items={} header={}x{}",
            row_items.len(),
            col_items.len(),
            row_header_width,
            col_header_height
        );

        LayoutResult {
            hierarchy_type: self.options.hierarchy_type,
            row_nodes,
            col_nodes,
            row_items,
            col_items,
            row_header_width,
            col_header_height,
            row_height,
            row_level_offsets,
            col_level_offsets,
            row_fields: self.row_dims.clone(),
            col_fields: self.col_dims.clone(),
            data_index,
            total_index,
            value_ranges: self.config.value_ranges(&self.config.fields.values),
        }
    }

    // ========================================================================
    // TREE BUILDING
    // ========================================================================

    fn build_axis_tree(&self, fields: &[String], axis: Axis) -> Vec<Node> {
        if fields.is_empty() {
            return Vec::new();
        }

        let all: Vec<usize> = (0..self.config.data.len()).collect();
        let mut nodes = self.build_tree_level(fields, 0, &all, ROOT_ID, &[]);

        let totals = &self.options.totals;
        let wants_total = match axis {
            Axis::Row => totals.row,
            Axis::Col => totals.col,
        };
        let dims = match axis {
            Axis::Row => &self.row_dims,
            Axis::Col => &self.col_dims,
        };
        if wants_total && !dims.is_empty() && !nodes.is_empty() {
            nodes.push(self.grand_total_node(fields));
        }

        nodes
    }

    /// Groups `indices` by the value of `fields[level]` and recurses.
    fn build_tree_level(
        &self,
        fields: &[String],
        level: usize,
        indices: &[usize],
        parent_id: &str,
        parent_path: &[FieldValue],
    ) -> Vec<Node> {
        let field = match fields.get(level) {
            Some(f) => f,
            None => return Vec::new(),
        };

        if field == EXTRA_FIELD {
            let mut nodes: Vec<Node> = self
                .measure_nodes(parent_id, parent_path, level)
                .into_iter()
                .map(|mut node| {
                    node.children = self.build_tree_level(fields, level + 1, indices, &node.id, &node.path);
                    node
                })
                .collect();
            self.sort_siblings(field, &mut nodes);
            return nodes;
        }

        // Group by first occurrence
        let mut positions: FxHashMap<String, usize> = FxHashMap::default();
        let mut groups: Vec<(FieldValue, Vec<usize>)> = Vec::new();
        for &index in indices {
            let value = record_value(&self.config.data[index], field);
            let key = value.key();
            match positions.get(&key) {
                Some(&pos) => groups[pos].1.push(index),
                None => {
                    positions.insert(key, groups.len());
                    groups.push((value.clone(), vec![index]));
                }
            }
        }

        if let Some(directive) = self.sort_state.get(field) {
            groups.sort_by(|a, b| directive.compare(&a.0, &b.0));
        }

        groups
            .into_iter()
            .map(|(value, members)| {
                let label = self.config.format_field_value(field, &value);
                let mut node = Node::new(parent_id, parent_path, field.as_str(), value, label, level);
                node.children = self.build_tree_level(fields, level + 1, &members, &node.id, &node.path);
                node
            })
            .collect()
    }

    /// One node per value field, labelled with the field's display name.
    fn measure_nodes(&self, parent_id: &str, parent_path: &[FieldValue], depth: usize) -> Vec<Node> {
        self.config
            .fields
            .values
            .iter()
            .map(|value_field| {
                Node::new(
                    parent_id,
                    parent_path,
                    EXTRA_FIELD,
                    FieldValue::text(value_field.as_str()),
                    self.config.field_name(value_field),
                    depth,
                )
            })
            .collect()
    }

    fn sort_siblings(&self, field: &str, nodes: &mut [Node]) {
        if let Some(directive) = self.sort_state.get(field) {
            nodes.sort_by(|a, b| directive.compare(&a.value, &b.value));
        }
    }

    /// Grand total spanning every dimension level; carries the measure level
    /// below it when the measure sits on the same axis.
    fn grand_total_node(&self, fields: &[String]) -> Node {
        let mut total = Node::grand_total(fields[0].as_str(), self.options.totals.label.as_str());
        if let Some(extra_level) = fields.iter().position(|f| f == EXTRA_FIELD) {
            total.children = self
                .measure_nodes(&total.id, &[], extra_level)
                .into_iter()
                .map(|mut node| {
                    node.is_totals = true;
                    node
                })
                .collect();
        }
        total
    }

    // ========================================================================
    // SIZING
    // ========================================================================

    fn hides_measure_level(&self) -> bool {
        self.options.style.col_cfg.hide_measure_column && self.config.fields.values.len() == 1
    }

    fn col_level_heights(&self) -> Vec<f64> {
        let height = self.options.style.col_cfg.height;
        self.col_fields
            .iter()
            .map(|f| {
                if f == EXTRA_FIELD && self.hides_measure_level() {
                    0.0
                } else {
                    height
                }
            })
            .collect()
    }

    fn row_level_widths(&self) -> Vec<f64> {
        vec![self.options.style.row_cfg.width; self.row_fields.len()]
    }

    fn row_header_width(&self) -> f64 {
        if self.row_fields.is_empty() {
            return 0.0;
        }
        match self.options.hierarchy_type {
            HierarchyType::Grid => self.row_level_widths().iter().sum(),
            HierarchyType::Tree => self.options.style.row_cfg.tree_rows_width,
        }
    }

    /// Widest of the configured width, the header label and every cell text
    /// in the column (text widths include cell padding on both sides).
    fn adaptive_width(
        &self,
        col_nodes: &[Node],
        col: &AxisItem,
        row_items: &[AxisItem],
        data_index: &DataIndex,
        total_index: &DataIndex,
    ) -> f64 {
        let data_theme = CellTheme::data_cell();
        let header_theme = CellTheme::header();
        let padding = data_theme.padding * 2.0;

        let mut width = self.options.style.cell_cfg.width;
        if let Some(node) = crate::node::find_node(col_nodes, &col.node_id) {
            width = width.max(measure_styled_text(&node.label, &header_theme.bolder_text) + padding);
        }

        for row in row_items {
            let field = match row.value_field.as_deref().or(col.value_field.as_deref()) {
                Some(f) => f,
                None => continue,
            };
            if let Some(record) = resolve_record(self.config, data_index, total_index, row, col) {
                let text = self.config.format_field_value(field, record_value(record, field));
                width = width.max(measure_styled_text(&text, &data_theme.text) + padding);
            }
        }
        width
    }

    // ========================================================================
    // COORDINATES
    // ========================================================================

    /// Tree rows: DFS pre-order, one display row per node. A parent spans its
    /// own row plus all descendant rows and is indented by depth.
    fn place_tree_rows(&self, nodes: &mut [Node], y: &mut f64, row_height: f64) {
        let row_cfg = &self.options.style.row_cfg;
        for node in nodes.iter_mut() {
            let start = *y;
            *y += row_height;
            self.place_tree_rows(&mut node.children, y, row_height);

            let x = (node.depth as f64 * row_cfg.tree_indent).min(row_cfg.tree_rows_width);
            node.bounds = Some(Bounds::new(x, start, row_cfg.tree_rows_width - x, *y - start));
        }
    }

    // ========================================================================
    // AXIS ITEMS
    // ========================================================================

    fn row_items(
        &self,
        row_nodes: &[Node],
        row_header_width: f64,
        col_header_height: f64,
        row_height: f64,
    ) -> Vec<AxisItem> {
        if self.row_fields.is_empty() {
            return synthetic_item(
                !self.config.data.is_empty(),
                Bounds::new(0.0, col_header_height, row_header_width, row_height),
            );
        }

        let tree = self.options.hierarchy_type == HierarchyType::Tree;
        let mut items = Vec::new();
        for top in row_nodes {
            top.walk(&mut |node| {
                if !tree && !node.is_leaf() {
                    return;
                }
                let mut item = self.axis_item(node, &self.row_fields);
                if tree {
                    item.bounds.height = row_height.min(item.bounds.height);
                }
                items.push(item);
            });
        }
        items
    }

    fn col_items(&self, col_nodes: &[Node], row_header_width: f64, col_header_height: f64) -> Vec<AxisItem> {
        if self.col_fields.is_empty() {
            return synthetic_item(
                !self.config.data.is_empty(),
                Bounds::new(
                    row_header_width,
                    0.0,
                    self.options.style.cell_cfg.width,
                    col_header_height,
                ),
            );
        }

        crate::node::collect_leaves(col_nodes)
            .into_iter()
            .map(|node| self.axis_item(node, &self.col_fields))
            .collect()
    }

    fn axis_item(&self, node: &Node, fields: &[String]) -> AxisItem {
        let is_measure = node.key == EXTRA_FIELD;
        let dim_id = if node.is_totals {
            ROOT_ID.to_string()
        } else {
            values_path_id(
                node.path
                    .iter()
                    .zip(fields)
                    .filter(|(_, f)| f.as_str() != EXTRA_FIELD)
                    .map(|(v, _)| v),
            )
        };

        AxisItem {
            node_id: node.id.clone(),
            dim_id,
            value_field: if is_measure { node.value.as_str().map(str::to_string) } else { None },
            record_index: None,
            value: node.value.clone(),
            bounds: node.bounds.unwrap_or_default(),
            depth: node.depth,
            is_totals: node.is_totals,
            is_leaf: node.is_leaf(),
        }
    }
}

// ============================================================================
// HELPERS
// ============================================================================

/// Running sums: `[a, b, c]` -> `[start, start+a, start+a+b, start+a+b+c]`.
fn cumulative(sizes: &[f64], start: f64) -> Vec<f64> {
    let mut out = Vec::with_capacity(sizes.len() + 1);
    let mut acc = start;
    out.push(acc);
    for size in sizes {
        acc += size;
        out.push(acc);
    }
    out
}

/// Grid placement along `axis`.
///
/// Along the branching axis leaves take `leaf_size` and parents the sum of
/// their children. Across it a node runs from its level offset to the end of
/// the header, so a parent always encloses its children. The area a parent
/// paints is narrowed to its own level by `LayoutResult::header_cell_bounds`.
pub fn place_nodes(
    nodes: &mut [Node],
    axis: Axis,
    cursor: &mut f64,
    level_offsets: &[f64],
    header_extent: f64,
    leaf_size: &dyn Fn(&Node) -> f64,
) {
    for node in nodes.iter_mut() {
        let start = *cursor;
        let cross_start = level_offsets.get(node.depth).copied().unwrap_or(header_extent);

        if node.is_leaf() {
            *cursor += leaf_size(node);
        } else {
            place_nodes(&mut node.children, axis, cursor, level_offsets, header_extent, leaf_size);
        }

        let main = *cursor - start;
        let cross = (header_extent - cross_start).max(0.0);
        node.bounds = Some(match axis {
            Axis::Row => Bounds::new(cross_start, start, cross, main),
            Axis::Col => Bounds::new(start, cross_start, main, cross),
        });
    }
}

/// Single grid item for an axis without fields, so records still get a cell.
fn synthetic_item(has_data: bool, bounds: Bounds) -> Vec<AxisItem> {
    if !has_data {
        return Vec::new();
    }
    vec![AxisItem {
        node_id: ROOT_ID.to_string(),
        dim_id: ROOT_ID.to_string(),
        value_field: None,
        record_index: None,
        value: FieldValue::Empty,
        bounds,
        depth: 0,
        is_totals: false,
        is_leaf: true,
    }]
}

/// Id of the grand-total node of either axis.
pub fn grand_total_id() -> String {
    child_id(ROOT_ID, crate::definition::TOTAL_KEY)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::definition::{Fields, FieldMeta};
    use crate::node::flatten;
    use crate::sort::{SortDirective, SortMethod};
    use crate::view::DataCellAddress;
    use engine::Record;

    fn records(json: serde_json::Value) -> Vec<Record> {
        serde_json::from_value(json).unwrap()
    }

    fn sales_config() -> DataConfig {
        let data = records(serde_json::json!([
            { "province": "Zhejiang", "city": "Hangzhou", "type": "pen",   "price": 1 },
            { "province": "Zhejiang", "city": "Ningbo",   "type": "pen",   "price": 2 },
            { "province": "Sichuan",  "city": "Chengdu",  "type": "pen",   "price": 3 },
            { "province": "Zhejiang", "city": "Hangzhou", "type": "paper", "price": 4 },
            { "province": "Sichuan",  "city": "Mianyang", "type": "paper", "price": 5 },
        ]));
        DataConfig::new(
            Fields {
                rows: vec!["province".into(), "city".into()],
                columns: vec!["type".into()],
                values: vec!["price".into()],
                value_in_cols: true,
            },
            data,
        )
        .with_meta(vec![FieldMeta::new("price", "Price")])
    }

    fn labels(nodes: &[Node]) -> Vec<&str> {
        nodes.iter().map(|n| n.label.as_str()).collect()
    }

    #[test]
    fn test_groups_by_first_occurrence() {
        let result = layout(&sales_config(), &LayoutOptions::default(), &SortState::new());

        assert_eq!(labels(&result.row_nodes), vec!["Zhejiang", "Sichuan"]);
        assert_eq!(labels(&result.row_nodes[0].children), vec!["Hangzhou", "Ningbo"]);
        assert_eq!(labels(&result.col_nodes), vec!["pen", "paper"]);
        assert_eq!(labels(&result.col_nodes[0].children), vec!["Price"]);
        assert_eq!(result.row_items.len(), 4);
        assert_eq!(result.col_items.len(), 2);
        assert_eq!(result.col_items[0].node_id, "root[&]pen[&]price");
        assert_eq!(result.col_items[0].dim_id, "root[&]pen");
    }

    #[test]
    fn test_layout_is_deterministic() {
        let config = sales_config();
        let state = SortState::from_directives(vec![SortDirective::new("city", SortMethod::Desc)]);
        let a = layout(&config, &LayoutOptions::default(), &state);
        let b = layout(&config, &LayoutOptions::default(), &state);
        assert_eq!(a, b);
    }

    #[test]
    fn test_directive_orders_its_own_level() {
        let state = SortState::from_directives(vec![
            SortDirective::new("city", SortMethod::Desc),
            SortDirective::new("type", SortMethod::Asc),
        ]);
        let result = layout(&sales_config(), &LayoutOptions::default(), &state);

        // Province level has no directive: first occurrence order.
        assert_eq!(labels(&result.row_nodes), vec!["Zhejiang", "Sichuan"]);
        assert_eq!(labels(&result.row_nodes[0].children), vec!["Ningbo", "Hangzhou"]);
        assert_eq!(labels(&result.row_nodes[1].children), vec!["Mianyang", "Chengdu"]);
        assert_eq!(labels(&result.col_nodes), vec!["paper", "pen"]);
    }

    #[test]
    fn test_sort_by_list_with_unlisted_values() {
        let state = SortState::from_directives(vec![
            SortDirective::new("city", SortMethod::Asc).with_sort_by(["Mianyang", "Ningbo"]),
        ]);
        let result = layout(&sales_config(), &LayoutOptions::default(), &state);
        assert_eq!(labels(&result.row_nodes[0].children), vec!["Ningbo", "Hangzhou"]);
        assert_eq!(labels(&result.row_nodes[1].children), vec!["Mianyang", "Chengdu"]);
    }

    #[test]
    fn test_directive_for_unknown_field_is_ignored() {
        let config = sales_config();
        let plain = layout(&config, &LayoutOptions::default(), &SortState::new());
        let state = SortState::from_directives(vec![SortDirective::new("missing", SortMethod::Desc)]);
        let sorted = layout(&config, &LayoutOptions::default(), &state);
        assert_eq!(plain, sorted);
    }

    #[test]
    fn test_data_cells_resolve_values() {
        let config = sales_config();
        let result = layout(&config, &LayoutOptions::default(), &SortState::new());

        let addr = result
            .address_of("root[&]Sichuan[&]Mianyang", "root[&]paper[&]price")
            .unwrap();
        let meta = result.data_cell(&config, addr).unwrap();
        assert_eq!(meta.value, &FieldValue::Number(5.0));
        assert_eq!(meta.field, Some("price"));
        assert!(meta.data.is_some());

        // Ningbo has no paper record.
        let addr = result
            .address_of("root[&]Zhejiang[&]Ningbo", "root[&]paper[&]price")
            .unwrap();
        let meta = result.data_cell(&config, addr).unwrap();
        assert_eq!(meta.value, &FieldValue::Empty);
        assert!(meta.data.is_none());
        assert_eq!(result.data_cells(&config).count(), 8);
    }

    #[test]
    fn test_grid_coordinates() {
        let config = sales_config();
        let result = layout(&config, &LayoutOptions::default(), &SortState::new());

        assert_eq!(result.col_header_height, 60.0);
        assert_eq!(result.row_header_width, 192.0);
        assert_eq!(result.corner_bounds(), Bounds::new(0.0, 0.0, 192.0, 60.0));

        let zj = &result.row_nodes[0];
        assert_eq!(zj.bounds, Some(Bounds::new(0.0, 60.0, 192.0, 60.0)));
        assert_eq!(result.header_cell_bounds(zj, Axis::Row), Bounds::new(0.0, 60.0, 96.0, 60.0));
        assert_eq!(zj.children[1].bounds, Some(Bounds::new(96.0, 90.0, 96.0, 30.0)));

        let pen = &result.col_nodes[0];
        assert_eq!(pen.bounds, Some(Bounds::new(192.0, 0.0, 96.0, 60.0)));
        assert_eq!(result.header_cell_bounds(pen, Axis::Col), Bounds::new(192.0, 0.0, 96.0, 30.0));
        assert_eq!(pen.children[0].bounds, Some(Bounds::new(192.0, 30.0, 96.0, 30.0)));

        let meta = result.data_cell(&config, DataCellAddress::new(3, 1)).unwrap();
        assert_eq!(meta.bounds(), Bounds::new(288.0, 150.0, 96.0, 30.0));
    }

    #[test]
    fn test_parent_bounds_contain_children() {
        let mut options = LayoutOptions::default();
        options.totals.row = true;
        options.totals.col = true;
        for hierarchy in [HierarchyType::Grid, HierarchyType::Tree] {
            options.hierarchy_type = hierarchy;
            let result = layout(&sales_config(), &options, &SortState::new());
            for node in flatten(&result.row_nodes).into_iter().chain(flatten(&result.col_nodes)) {
                let outer = node.bounds.unwrap();
                for child in &node.children {
                    assert!(outer.contains(&child.bounds.unwrap()), "{} in {}", child.id, node.id);
                }
            }
        }
    }

    #[test]
    fn test_hide_measure_column() {
        let mut options = LayoutOptions::default();
        options.style.col_cfg.hide_measure_column = true;
        let result = layout(&sales_config(), &options, &SortState::new());
        assert_eq!(result.col_header_height, 30.0);
        assert_eq!(result.col_items.len(), 2);
    }

    #[test]
    fn test_values_in_rows() {
        let mut config = sales_config();
        config.fields.value_in_cols = false;
        config.fields.values.push("qty".into());
        let result = layout(&config, &LayoutOptions::default(), &SortState::new());

        // province / city / measure
        assert_eq!(result.row_header_width, 96.0 * 3.0);
        assert_eq!(result.row_items.len(), 8);
        assert_eq!(result.row_items[0].value_field.as_deref(), Some("price"));
        assert_eq!(result.row_items[0].dim_id, "root[&]Zhejiang[&]Hangzhou");
        assert_eq!(result.col_items.len(), 2);
        assert_eq!(result.col_items[0].value_field, None);

        let meta = result.data_cell(&config, DataCellAddress::new(0, 1)).unwrap();
        assert_eq!(meta.value, &FieldValue::Number(4.0));
    }

    #[test]
    fn test_tree_rows_own_display_rows() {
        let mut options = LayoutOptions::default();
        options.hierarchy_type = HierarchyType::Tree;
        let result = layout(&sales_config(), &options, &SortState::new());

        assert_eq!(result.row_header_width, 120.0);
        // 2 provinces + 4 cities
        assert_eq!(result.row_items.len(), 6);
        let zj = &result.row_nodes[0];
        assert_eq!(zj.bounds, Some(Bounds::new(0.0, 60.0, 120.0, 90.0)));
        assert_eq!(zj.children[0].bounds, Some(Bounds::new(12.0, 90.0, 108.0, 30.0)));
        assert_eq!(
            result.header_cell_bounds(zj, Axis::Row),
            Bounds::new(0.0, 60.0, 120.0, 30.0)
        );
        assert!(!result.row_items[0].is_leaf);
        assert_eq!(result.row_items[0].dim_id, "root[&]Zhejiang");
    }

    #[test]
    fn test_totals_resolve_against_total_data() {
        let mut config = sales_config();
        config.total_data = records(serde_json::json!([
            { "price": 15 },
            { "province": "Zhejiang", "price": 7 },
            { "type": "pen", "price": 6 },
        ]));
        let mut options = LayoutOptions::default();
        options.totals.row = true;
        options.totals.col = true;
        options.hierarchy_type = HierarchyType::Tree;
        let result = layout(&config, &options, &SortState::new());

        let total_row = result.row_nodes.last().unwrap();
        assert!(total_row.is_totals);
        assert_eq!(total_row.label, "Grand Total");
        let total_col = result.col_nodes.last().unwrap();
        assert!(total_col.is_totals);
        assert_eq!(total_col.children.len(), 1);

        let total_col_leaf = &total_col.children[0].id;
        let corner = result.address_of(&total_row.id, total_col_leaf).unwrap();
        assert_eq!(result.data_cell(&config, corner).unwrap().value, &FieldValue::Number(15.0));

        let subtotal = result.address_of("root[&]Zhejiang", total_col_leaf).unwrap();
        assert_eq!(result.data_cell(&config, subtotal).unwrap().value, &FieldValue::Number(7.0));

        let pen_total = result.address_of(&total_row.id, "root[&]pen[&]price").unwrap();
        let meta = result.data_cell(&config, pen_total).unwrap();
        assert_eq!(meta.value, &FieldValue::Number(6.0));
        assert!(meta.is_totals);
    }

    #[test]
    fn test_missing_field_forms_undefined_group() {
        let config = DataConfig::new(
            Fields {
                rows: vec!["region".into()],
                columns: vec![],
                values: vec!["price".into()],
                value_in_cols: true,
            },
            records(serde_json::json!([{ "price": 1 }, { "price": 2 }])),
        );
        let result = layout(&config, &LayoutOptions::default(), &SortState::new());
        assert_eq!(result.row_nodes.len(), 1);
        assert_eq!(result.row_nodes[0].id, "root[&]undefined");
        assert_eq!(result.row_nodes[0].label, "-");

        let meta = result.data_cell(&config, DataCellAddress::new(0, 0)).unwrap();
        assert_eq!(meta.value, &FieldValue::Number(1.0));
    }

    #[test]
    fn test_adaptive_width_fits_long_text() {
        let mut config = sales_config();
        config.data[0].insert("price".into(), FieldValue::text("a very long price description"));
        let mut options = LayoutOptions::default();
        options.style.col_cfg.width_mode = WidthMode::Adaptive;
        let result = layout(&config, &options, &SortState::new());

        let pen = &result.col_items[0];
        let paper = &result.col_items[1];
        assert!(pen.bounds.width > 96.0);
        assert_eq!(paper.bounds.width, 96.0);
        assert_eq!(paper.bounds.x, pen.bounds.max_x());
    }

    #[test]
    fn test_empty_data_has_no_cells() {
        let mut config = sales_config();
        config.data.clear();
        let result = layout(&config, &LayoutOptions::default(), &SortState::new());
        assert!(result.row_nodes.is_empty());
        assert_eq!(result.data_cell_count(), 0);
    }

    #[test]
    fn test_grand_total_id() {
        assert_eq!(grand_total_id(), "root[&]$$total$$");
    }
}
