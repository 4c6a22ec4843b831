//! FILENAME: core/sheet/src/options.rs
//! PURPOSE: Sheet options (size, hierarchy, interaction, style, theme).
//! CONTEXT: Everything except the function-valued options loads from JSON with
//! camelCase keys. Conditions and the data cell factory are attached in code.

use std::fmt;
use std::rc::Rc;

use serde::{Deserialize, Serialize};
use engine::CellTheme;
use pivot_engine::{HierarchyType, LayoutOptions, StyleCfg, TotalsCfg, ViewMeta};

use crate::cell::SheetCell;
use crate::conditions::Conditions;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct InteractionOptions {
    pub hover_highlight: bool,
    /// Dim every other data cell while a selection exists.
    pub selected_cells_spotlight: bool,
    /// Clicking outside any cell resets selection and hover.
    pub auto_reset_sheet_style: bool,
}

impl Default for InteractionOptions {
    fn default() -> Self {
        InteractionOptions {
            hover_highlight: true,
            selected_cells_spotlight: false,
            auto_reset_sheet_style: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TooltipOptions {
    pub show_tooltip: bool,
}

impl Default for TooltipOptions {
    fn default() -> Self {
        TooltipOptions { show_tooltip: true }
    }
}

/// Palettes per cell kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SheetTheme {
    pub data_cell: CellTheme,
    pub header: CellTheme,
    pub corner: CellTheme,
}

impl Default for SheetTheme {
    fn default() -> Self {
        SheetTheme {
            data_cell: CellTheme::data_cell(),
            header: CellTheme::header(),
            corner: CellTheme::corner(),
        }
    }
}

/// Builds the cell that draws one data cell in place of the default variant.
#[derive(Clone)]
pub struct DataCellFactory(Rc<dyn Fn(&ViewMeta<'_>) -> Box<dyn SheetCell>>);

impl DataCellFactory {
    pub fn new<F>(factory: F) -> Self
    where
        F: Fn(&ViewMeta<'_>) -> Box<dyn SheetCell> + 'static,
    {
        DataCellFactory(Rc::new(factory))
    }

    pub fn create(&self, meta: &ViewMeta<'_>) -> Box<dyn SheetCell> {
        (self.0)(meta)
    }
}

impl fmt::Debug for DataCellFactory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("DataCellFactory(..)")
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SheetOptions {
    pub width: f64,
    pub height: f64,
    pub hierarchy_type: HierarchyType,
    pub interaction: InteractionOptions,
    pub tooltip: TooltipOptions,
    pub style: StyleCfg,
    pub totals: TotalsCfg,
    pub corner_text: Option<String>,
    pub show_series_number: bool,
    pub theme: SheetTheme,

    #[serde(skip)]
    pub conditions: Conditions,

    #[serde(skip)]
    pub data_cell: Option<DataCellFactory>,
}

impl Default for SheetOptions {
    fn default() -> Self {
        SheetOptions {
            width: 600.0,
            height: 480.0,
            hierarchy_type: HierarchyType::Grid,
            interaction: InteractionOptions::default(),
            tooltip: TooltipOptions::default(),
            style: StyleCfg::default(),
            totals: TotalsCfg::default(),
            corner_text: None,
            show_series_number: false,
            theme: SheetTheme::default(),
            conditions: Conditions::default(),
            data_cell: None,
        }
    }
}

impl SheetOptions {
    pub fn with_conditions(mut self, conditions: Conditions) -> Self {
        self.conditions = conditions;
        self
    }

    pub fn with_data_cell<F>(mut self, factory: F) -> Self
    where
        F: Fn(&ViewMeta<'_>) -> Box<dyn SheetCell> + 'static,
    {
        self.data_cell = Some(DataCellFactory::new(factory));
        self
    }

    /// The subset of options the layout engines read.
    pub fn layout_options(&self) -> LayoutOptions {
        LayoutOptions {
            hierarchy_type: self.hierarchy_type,
            style: self.style.clone(),
            totals: self.totals.clone(),
            show_series_number: self.show_series_number,
        }
    }
}
