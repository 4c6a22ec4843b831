//! FILENAME: core/pivot-engine/src/definition.rs
//! Sheet Definition - The serializable configuration.
//!
//! This module contains all the types needed to DESCRIBE a sheet's data and
//! layout. These structures are designed to be:
//! - Serializable (JSON keys match the data config / options contract)
//! - Cheap to compare (layout results are cached on the layout inputs)
//! - Immutable snapshots of user intent

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use engine::{format_value, FieldValue, NumberFormat, Record};

use crate::sort::SortState;

/// Field key of the synthetic measure level ("which value field").
pub const EXTRA_FIELD: &str = "$$extra$$";

/// Id segment used for grand-total nodes.
pub const TOTAL_KEY: &str = "$$total$$";

/// Field key of the table-sheet row number column.
pub const SERIES_NUMBER_FIELD: &str = "$$series_number$$";

/// Id of the implicit root above every top-level node.
pub const ROOT_ID: &str = "root";

/// Separator between path segments in node ids.
///
/// Segments are value keys joined as-is, so ids are only unique while field
/// values avoid the reserved keys: a value containing `[&]`, or equal to
/// `$$total$$`, `$$extra$$` or `undefined` (the key of a missing value),
/// shares its id with another node.
pub const ID_SEPARATOR: &str = "[&]";

/// Text shown for empty values when the field meta gives none.
pub const DEFAULT_EMPTY_TEXT: &str = "-";

// ============================================================================
// FIELDS
// ============================================================================

/// Which fields form the rows, columns and values of the sheet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Fields {
    /// Row dimension fields (ordered from outer to inner).
    pub rows: Vec<String>,

    /// Column dimension fields (ordered from outer to inner).
    pub columns: Vec<String>,

    /// Measure fields.
    pub values: Vec<String>,

    /// Place the measure level on the column axis (otherwise on rows).
    pub value_in_cols: bool,
}

impl Default for Fields {
    fn default() -> Self {
        Fields {
            rows: Vec::new(),
            columns: Vec::new(),
            values: Vec::new(),
            value_in_cols: true,
        }
    }
}

/// Display metadata for one field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldMeta {
    pub field: String,

    /// Display name (defaults to the field key).
    #[serde(default)]
    pub name: Option<String>,

    /// Number format applied to numeric values of this field.
    #[serde(default)]
    pub formatter: Option<NumberFormat>,

    /// Text for empty values (defaults to "-").
    #[serde(default)]
    pub empty_text: Option<String>,
}

impl FieldMeta {
    pub fn new(field: impl Into<String>, name: impl Into<String>) -> Self {
        FieldMeta {
            field: field.into(),
            name: Some(name.into()),
            formatter: None,
            empty_text: None,
        }
    }

    pub fn with_formatter(mut self, formatter: NumberFormat) -> Self {
        self.formatter = Some(formatter);
        self
    }

    pub fn with_empty_text(mut self, text: impl Into<String>) -> Self {
        self.empty_text = Some(text.into());
        self
    }
}

/// Which axis a field or node belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Axis {
    Row,
    Col,
}

// ============================================================================
// DATA CONFIG
// ============================================================================

/// The complete data description of a sheet.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DataConfig {
    pub fields: Fields,

    pub meta: Vec<FieldMeta>,

    /// Source records.
    pub data: Vec<Record>,

    /// The sheet's Sort State.
    pub sort_params: SortState,

    /// Pre-aggregated total / subtotal records.
    pub total_data: Vec<Record>,
}

impl DataConfig {
    pub fn new(fields: Fields, data: Vec<Record>) -> Self {
        DataConfig {
            fields,
            data,
            ..Default::default()
        }
    }

    pub fn with_meta(mut self, meta: Vec<FieldMeta>) -> Self {
        self.meta = meta;
        self
    }

    pub fn meta_for(&self, field: &str) -> Option<&FieldMeta> {
        self.meta.iter().find(|m| m.field == field)
    }

    /// Display name of a field (meta name, else the key itself).
    pub fn field_name<'a>(&'a self, field: &'a str) -> &'a str {
        if field == EXTRA_FIELD {
            return "Values";
        }
        self.meta_for(field)
            .and_then(|m| m.name.as_deref())
            .unwrap_or(field)
    }

    /// Formats a value of `field` using its meta formatter.
    pub fn format_field_value(&self, field: &str, value: &FieldValue) -> String {
        let meta = self.meta_for(field);
        if value.is_empty() {
            return meta
                .and_then(|m| m.empty_text.clone())
                .unwrap_or_else(|| DEFAULT_EMPTY_TEXT.to_string());
        }
        format_value(value, meta.and_then(|m| m.formatter.as_ref()))
    }

    /// The axis a dimension field is declared on, if any.
    pub fn axis_of(&self, field: &str) -> Option<Axis> {
        if self.fields.rows.iter().any(|f| f == field) {
            Some(Axis::Row)
        } else if self.fields.columns.iter().any(|f| f == field) {
            Some(Axis::Col)
        } else {
            None
        }
    }

    /// Min / max of the numeric values of each of `fields` across the source
    /// data, in one scan. Fields without numbers are absent.
    pub fn value_ranges<'a, I>(&self, fields: I) -> FxHashMap<String, (f64, f64)>
    where
        I: IntoIterator<Item = &'a String>,
    {
        let fields: Vec<&String> = fields.into_iter().collect();
        let mut ranges: FxHashMap<String, (f64, f64)> = FxHashMap::default();
        for record in &self.data {
            for field in &fields {
                let Some(v) = engine::record_value(record, field).as_f64() else {
                    continue;
                };
                ranges
                    .entry((*field).clone())
                    .and_modify(|(lo, hi)| {
                        *lo = lo.min(v);
                        *hi = hi.max(v);
                    })
                    .or_insert((v, v));
            }
        }
        ranges
    }
}

// ============================================================================
// LAYOUT OPTIONS
// ============================================================================

/// How the row header is arranged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub enum HierarchyType {
    /// One header column per row field.
    #[default]
    Grid,
    /// All row nodes stacked in one indented column.
    Tree,
}

/// How column widths are determined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub enum WidthMode {
    #[default]
    Fixed,
    /// Measure header labels and cell text; never narrower than the fixed width.
    Adaptive,
}

/// Data cell size.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CellCfg {
    pub width: f64,
    pub height: f64,
}

impl Default for CellCfg {
    fn default() -> Self {
        CellCfg {
            width: 96.0,
            height: 30.0,
        }
    }
}

/// Row header sizing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RowCfg {
    /// Width of each row level in grid mode.
    pub width: f64,
    /// Width of the single header column in tree mode.
    pub tree_rows_width: f64,
    /// Horizontal indent per depth in tree mode.
    pub tree_indent: f64,
}

impl Default for RowCfg {
    fn default() -> Self {
        RowCfg {
            width: 96.0,
            tree_rows_width: 120.0,
            tree_indent: 12.0,
        }
    }
}

/// Column header sizing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ColCfg {
    /// Height of each column level.
    pub height: f64,
    pub width_mode: WidthMode,
    /// Collapse the measure level when there is a single value field.
    pub hide_measure_column: bool,
}

impl Default for ColCfg {
    fn default() -> Self {
        ColCfg {
            height: 30.0,
            width_mode: WidthMode::Fixed,
            hide_measure_column: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StyleCfg {
    pub cell_cfg: CellCfg,
    pub row_cfg: RowCfg,
    pub col_cfg: ColCfg,
}

/// Grand total nodes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TotalsCfg {
    /// Append a grand-total row.
    pub row: bool,
    /// Append a grand-total column.
    pub col: bool,
    pub label: String,
}

impl Default for TotalsCfg {
    fn default() -> Self {
        TotalsCfg {
            row: false,
            col: false,
            label: "Grand Total".to_string(),
        }
    }
}

/// The structural options a layout pass depends on.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LayoutOptions {
    pub hierarchy_type: HierarchyType,
    pub style: StyleCfg,
    pub totals: TotalsCfg,
    /// Table sheets only: prepend a row-number column.
    pub show_series_number: bool,
}
