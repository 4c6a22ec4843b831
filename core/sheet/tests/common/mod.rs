//! FILENAME: tests/common/mod.rs
//! Test harness and fixtures for sheet session integration tests.

#![allow(dead_code)]

use std::cell::RefCell;
use std::rc::Rc;

use engine::Record;
use pivot_engine::{DataCellAddress, DataConfig, Fields, FieldMeta, SortMethod};
use sheet::{
    FieldDescriptor, SheetEvent, SheetOptions, SheetSession, SortMenuChoice, TooltipCollaborator,
    TooltipInfo,
};

// ============================================================================
// TOOLTIP RECORDER
// ============================================================================

#[derive(Debug, Default)]
pub struct TooltipLog {
    pub shown: Vec<TooltipInfo>,
    pub hidden: usize,
}

/// Tooltip collaborator that records every call into a shared log.
pub struct RecordingTooltip {
    log: Rc<RefCell<TooltipLog>>,
}

impl TooltipCollaborator for RecordingTooltip {
    fn show_tooltip_with_info(&mut self, info: TooltipInfo) {
        self.log.borrow_mut().shown.push(info);
    }

    fn hide_tooltip(&mut self) {
        self.log.borrow_mut().hidden += 1;
    }
}

// ============================================================================
// HARNESS
// ============================================================================

/// A session plus a handle on what its tooltip collaborator was asked to do.
pub struct TestHarness {
    pub session: SheetSession,
    pub tooltip: Rc<RefCell<TooltipLog>>,
}

impl TestHarness {
    fn wrap(session: SheetSession) -> Self {
        let tooltip = Rc::new(RefCell::new(TooltipLog::default()));
        let session = session.with_tooltip(Box::new(RecordingTooltip {
            log: Rc::clone(&tooltip),
        }));
        TestHarness { session, tooltip }
    }

    /// Pivot sheet over the orders fixture with default options.
    pub fn pivot() -> Self {
        Self::pivot_with(SheetOptions::default())
    }

    pub fn pivot_with(options: SheetOptions) -> Self {
        Self::wrap(SheetSession::pivot(OrdersFixture::pivot_config(), options).unwrap())
    }

    /// Table sheet over the orders fixture.
    pub fn table_with(options: SheetOptions) -> Self {
        Self::wrap(SheetSession::table(OrdersFixture::table_config(), options).unwrap())
    }

    /// Renders and clears the events of that render.
    pub fn rendered(mut self) -> Self {
        self.session.render().unwrap();
        self.session.drain_events();
        self
    }

    /// Sort menu click on `field`.
    pub fn click_sort(&mut self, key: &str, field: &str) {
        self.session
            .on_sort_tooltip_click(&SortMenuChoice::new(key), &FieldDescriptor::new(field))
            .unwrap();
    }

    pub fn sort_fields(&self) -> Vec<(String, SortMethod)> {
        self.session
            .sort_state()
            .iter()
            .map(|d| (d.sort_field_id.clone(), d.sort_method))
            .collect()
    }

    pub fn events(&mut self) -> Vec<SheetEvent> {
        self.session.drain_events()
    }

    pub fn render_count(&self) -> usize {
        self.session.render_count()
    }

    /// Main text of a drawn data cell.
    pub fn cell_text(&self, row: usize, col: usize) -> Option<String> {
        self.session
            .data_cell(DataCellAddress::new(row, col))?
            .shapes()
            .iter()
            .find_map(|s| s.as_text())
            .map(|t| t.text.clone())
    }

    /// Row node ids in display order.
    pub fn row_ids(&self) -> Vec<String> {
        self.session
            .layout()
            .map(|l| l.row_items.iter().map(|r| r.node_id.clone()).collect())
            .unwrap_or_default()
    }

    pub fn tooltips_shown(&self) -> usize {
        self.tooltip.borrow().shown.len()
    }

    pub fn tooltips_hidden(&self) -> usize {
        self.tooltip.borrow().hidden
    }
}

pub fn addr(row: usize, col: usize) -> DataCellAddress {
    DataCellAddress::new(row, col)
}

pub fn records(json: serde_json::Value) -> Vec<Record> {
    serde_json::from_value(json).unwrap()
}

// ============================================================================
// FIXTURES
// ============================================================================

/// Stationery orders by province / city / type.
///
/// Pivot layout (grid, default sizes):
/// rows    ZJ > Hangzhou, Ningbo ; SC > Chengdu       (row header 192 wide)
/// columns pen > cost ; paper > cost                  (column header 60 high)
pub struct OrdersFixture;

impl OrdersFixture {
    pub fn data() -> Vec<Record> {
        records(serde_json::json!([
            { "province": "ZJ", "city": "Hangzhou", "type": "pen",   "cost": 3 },
            { "province": "ZJ", "city": "Ningbo",   "type": "pen",   "cost": 1 },
            { "province": "ZJ", "city": "Hangzhou", "type": "paper", "cost": 2 },
            { "province": "SC", "city": "Chengdu",  "type": "pen",   "cost": 5 },
            { "province": "SC", "city": "Chengdu",  "type": "paper", "cost": 4 },
        ]))
    }

    pub fn meta() -> Vec<FieldMeta> {
        vec![
            FieldMeta::new("province", "Province"),
            FieldMeta::new("city", "City"),
            FieldMeta::new("cost", "Cost"),
        ]
    }

    pub fn pivot_config() -> DataConfig {
        DataConfig::new(
            Fields {
                rows: vec!["province".into(), "city".into()],
                columns: vec!["type".into()],
                values: vec!["cost".into()],
                value_in_cols: true,
            },
            Self::data(),
        )
        .with_meta(Self::meta())
    }

    pub fn table_config() -> DataConfig {
        DataConfig::new(
            Fields {
                columns: vec!["city".into(), "type".into(), "cost".into()],
                ..Fields::default()
            },
            Self::data(),
        )
        .with_meta(Self::meta())
    }

    pub const DATA_CELLS: usize = 6;
    pub const ROW_HEADERS: usize = 5;
    pub const COL_HEADERS: usize = 4;
}

/// KPI records for the KPI data cell.
pub struct KpiFixture;

impl KpiFixture {
    pub fn config() -> DataConfig {
        DataConfig::new(
            Fields {
                rows: vec!["metric".into()],
                columns: vec!["name".into()],
                values: vec!["value".into()],
                value_in_cols: true,
            },
            records(serde_json::json!([
                { "metric": "Sales",  "name": "Q1", "value": 0.35, "expectedValue": 0.5, "isProgress": true, "compare": "-0.2" },
                { "metric": "Users",  "name": "Q1", "value": 1200, "compare": "0.1" },
                { "metric": "Extra",  "name": "Q1", "value": 7, "isExtra": true, "compare": "0.3" },
                { "metric": "Broken", "name": "Q1", "value": 0.4, "isProgress": true },
            ])),
        )
    }
}
