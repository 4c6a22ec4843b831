//! FILENAME: tests/test_cells.rs
//! Integration tests for cell drawing: formatting, conditions, custom cells
//! and per-cell failure isolation.

mod common;

use common::{addr, KpiFixture, OrdersFixture, TestHarness};
use engine::{Color, FieldValue};
use pivot_engine::{Axis, DataConfig, ViewMeta};
use regex::Regex;
use sheet::{
    CellDrawError, CellKind, CellLocation, CellSurface, Condition, Conditions, DataCell,
    DrawContext, FormattedValue, KpiDataCell, MappingResult, Shape, SheetCell, SheetEvent,
    SheetOptions, SheetSession,
};

const GREEN: Color = Color::new(0x30, 0xBF, 0x78);
const RED: Color = Color::new(0xF4, 0x66, 0x4A);
const BLUE: Color = Color::new(0x80, 0xBF, 0xFF);

fn rects(shapes: &[Shape]) -> Vec<&sheet::RectShape> {
    shapes.iter().filter_map(|s| s.as_rect()).collect()
}

// ============================================================================
// BASE CELLS
// ============================================================================

#[test]
fn test_first_render_draws_every_cell() {
    let mut h = TestHarness::pivot();
    h.session.render().unwrap();

    let report = h.session.last_render_report().clone();
    assert!(report.is_clean());
    assert_eq!(
        report.drawn,
        1 + OrdersFixture::ROW_HEADERS + OrdersFixture::COL_HEADERS + OrdersFixture::DATA_CELLS
    );
    assert_eq!(report.culled, 0);
    assert_eq!(h.session.data_cell_count(), OrdersFixture::DATA_CELLS);
    assert_eq!(
        h.events(),
        vec![SheetEvent::RenderComplete {
            drawn: report.drawn,
            failed: Vec::new(),
        }]
    );
}

#[test]
fn test_data_cell_text_and_geometry() {
    let h = TestHarness::pivot().rendered();

    assert_eq!(h.cell_text(0, 0).as_deref(), Some("3"));
    assert_eq!(h.cell_text(2, 1).as_deref(), Some("4"));
    // Ningbo sold no paper
    assert_eq!(h.cell_text(1, 1).as_deref(), Some("-"));

    let cell = h.session.data_cell(addr(0, 1)).unwrap();
    assert_eq!(cell.kind(), CellKind::Data);
    let background = rects(cell.shapes())[0];
    assert_eq!(background.bounds, engine::Bounds::new(288.0, 60.0, 96.0, 30.0));
    assert_eq!(background.fill, Some(Color::white()));

    // Text sits inside the cell, right aligned
    let text = cell.shapes().iter().find_map(|s| s.as_text()).unwrap();
    assert!(text.x > 288.0 && text.x + text.width() <= 384.0);
}

#[test]
fn test_empty_text_from_meta() {
    let mut config = OrdersFixture::pivot_config();
    config.meta[2] = pivot_engine::FieldMeta::new("cost", "Cost").with_empty_text("n/a");
    let mut session = SheetSession::pivot(config, SheetOptions::default()).unwrap();
    session.render().unwrap();

    let text = session
        .data_cell(addr(1, 1))
        .unwrap()
        .shapes()
        .iter()
        .find_map(|s| s.as_text())
        .map(|t| t.text.clone());
    assert_eq!(text.as_deref(), Some("n/a"));
}

#[test]
fn test_corner_text() {
    let h = TestHarness::pivot().rendered();
    let corner = h.session.corner_cell();
    assert_eq!(corner.kind(), CellKind::Corner);
    let text = corner.shapes().iter().find_map(|s| s.as_text()).unwrap();
    assert_eq!(text.text, "Province/City");
    assert_eq!(rects(corner.shapes())[0].bounds, engine::Bounds::new(0.0, 0.0, 192.0, 60.0));

    let options = SheetOptions {
        corner_text: Some("Region".into()),
        ..Default::default()
    };
    let h = TestHarness::pivot_with(options).rendered();
    let text = h.session.corner_cell().shapes().iter().find_map(|s| s.as_text()).cloned();
    assert_eq!(text.map(|t| t.text).as_deref(), Some("Region"));
}

#[test]
fn test_header_labels() {
    let h = TestHarness::pivot().rendered();
    let label = |axis: Axis, id: &str| {
        h.session
            .header_cell(axis, id)
            .and_then(|c| c.shapes().iter().find_map(|s| s.as_text()).map(|t| t.text.clone()))
    };
    assert_eq!(label(Axis::Row, "root[&]SC").as_deref(), Some("SC"));
    assert_eq!(label(Axis::Col, "root[&]pen").as_deref(), Some("pen"));
    assert_eq!(label(Axis::Col, "root[&]pen[&]cost").as_deref(), Some("Cost"));
    assert_eq!(
        h.session.header_cell(Axis::Col, "root[&]pen").unwrap().kind(),
        CellKind::ColHeader
    );
}

// ============================================================================
// CONDITIONS
// ============================================================================

#[test]
fn test_text_and_background_conditions() {
    let conditions = Conditions {
        text: vec![Condition::fixed("cost", GREEN)],
        background: vec![
            Condition::fixed("cost", GREEN),
            // Declared last, wins for "cost"
            Condition::new(Regex::new("co*").unwrap(), |value, _| {
                (value.as_f64()? >= 4.0).then(|| MappingResult::fill(RED))
            }),
        ],
        ..Default::default()
    };
    let h = TestHarness::pivot_with(SheetOptions::default().with_conditions(conditions)).rendered();

    let cell = h.session.data_cell(addr(2, 0)).unwrap();
    assert_eq!(rects(cell.shapes())[0].fill, Some(RED));
    let text = cell.shapes().iter().find_map(|s| s.as_text()).unwrap();
    assert_eq!(text.style.fill, GREEN);

    // Last rule declines: default background
    let cell = h.session.data_cell(addr(0, 0)).unwrap();
    assert_eq!(rects(cell.shapes())[0].fill, Some(Color::white()));
}

#[test]
fn test_interval_condition_with_explicit_range() {
    let conditions = Conditions {
        interval: vec![Condition::new("cost", |_, _| Some(MappingResult::compare(BLUE, 0.0, 6.0)))],
        ..Default::default()
    };
    let h = TestHarness::pivot_with(SheetOptions::default().with_conditions(conditions)).rendered();

    // cost 3 of [0, 6]
    let cell = h.session.data_cell(addr(0, 0)).unwrap();
    let bar = rects(cell.shapes())[1];
    assert_eq!(bar.fill, Some(BLUE));
    assert_eq!(bar.bounds.x, 192.0);
    assert_eq!(bar.bounds.width, 48.0);
}

#[test]
fn test_interval_condition_uses_field_range() {
    let conditions = Conditions {
        interval: vec![Condition::new("cost", |_, _| Some(MappingResult::default()))],
        ..Default::default()
    };
    let h = TestHarness::pivot_with(SheetOptions::default().with_conditions(conditions)).rendered();

    // cost 3 within [1, 5]; cost 5 fills the cell
    let half = rects(h.session.data_cell(addr(0, 0)).unwrap().shapes())[1].bounds.width;
    let full = rects(h.session.data_cell(addr(2, 0)).unwrap().shapes())[1].bounds.width;
    assert_eq!(half, 48.0);
    assert_eq!(full, 96.0);

    // Empty cells get no bar
    assert_eq!(rects(h.session.data_cell(addr(1, 1)).unwrap().shapes()).len(), 1);
}

#[test]
fn test_mapping_receives_record() {
    let conditions = Conditions {
        text: vec![Condition::new("cost", |_, record| {
            let city = record?.get("city")?.as_str()?;
            (city == "Chengdu").then(|| MappingResult::fill(RED))
        })],
        ..Default::default()
    };
    let h = TestHarness::pivot_with(SheetOptions::default().with_conditions(conditions)).rendered();

    let fill = |row, col| {
        h.session
            .data_cell(addr(row, col))
            .and_then(|c| c.shapes().iter().find_map(|s| s.as_text()).map(|t| t.style.fill))
    };
    assert_eq!(fill(2, 0), Some(RED));
    assert_ne!(fill(0, 0), Some(RED));
}

// ============================================================================
// CUSTOM CELLS
// ============================================================================

/// Custom cell that fails on purpose.
#[derive(Default)]
struct FailingCell {
    surface: CellSurface,
    panic: bool,
}

impl SheetCell for FailingCell {
    fn kind(&self) -> CellKind {
        CellKind::Custom
    }

    fn surface(&self) -> &CellSurface {
        &self.surface
    }

    fn surface_mut(&mut self) -> &mut CellSurface {
        &mut self.surface
    }

    fn formatted_value(&self, ctx: &DrawContext<'_>, meta: &ViewMeta<'_>) -> FormattedValue {
        DataCell::base_formatted_value(ctx, meta)
    }

    fn draw(&mut self, ctx: &DrawContext<'_>, meta: &ViewMeta<'_>) -> Result<(), CellDrawError> {
        // Partial drawing before the failure must not leak into the frame
        self.surface.reset(meta.bounds(), ctx.options.theme.data_cell.clone());
        self.surface.draw_background(None);
        if self.panic {
            panic!("custom cell exploded");
        }
        Err(CellDrawError::Custom("refused".into()))
    }
}

#[test]
fn test_failing_cells_are_isolated() {
    let options = SheetOptions::default().with_data_cell(|meta: &ViewMeta<'_>| -> Box<dyn SheetCell> {
        match meta.address {
            Some(a) if a == addr(0, 0) => Box::new(FailingCell {
                panic: true,
                ..Default::default()
            }),
            Some(a) if a == addr(1, 1) => Box::new(FailingCell::default()),
            _ => Box::new(DataCell::new()),
        }
    });
    let mut h = TestHarness::pivot_with(options);
    h.session.render().unwrap();

    let report = h.session.last_render_report().clone();
    assert_eq!(report.failed_addresses(), vec![addr(0, 0), addr(1, 1)]);
    assert!(report.failed[0].error.contains("custom cell exploded"));
    assert!(report.failed[1].error.contains("refused"));
    assert_eq!(
        report.drawn,
        1 + OrdersFixture::ROW_HEADERS + OrdersFixture::COL_HEADERS + OrdersFixture::DATA_CELLS - 2
    );

    // Failed cells render blank, their neighbours draw normally
    assert!(h.session.data_cell(addr(0, 0)).unwrap().shapes().is_empty());
    assert!(h.session.data_cell(addr(1, 1)).unwrap().shapes().is_empty());
    assert_eq!(h.cell_text(0, 1).as_deref(), Some("2"));
    assert_eq!(h.cell_text(1, 0).as_deref(), Some("1"));

    match h.events().last() {
        Some(SheetEvent::RenderComplete { failed, .. }) => assert_eq!(
            failed,
            &vec![CellLocation::Data(addr(0, 0)), CellLocation::Data(addr(1, 1))]
        ),
        other => panic!("expected RenderComplete, got {:?}", other),
    }
}

#[test]
fn test_panicking_factory_fails_one_cell() {
    let options = SheetOptions::default().with_data_cell(|meta: &ViewMeta<'_>| -> Box<dyn SheetCell> {
        if meta.address == Some(addr(0, 0)) {
            panic!("no cell for this address");
        }
        Box::new(DataCell::new())
    });
    let mut h = TestHarness::pivot_with(options);
    h.session.render().unwrap();

    let report = h.session.last_render_report().clone();
    assert_eq!(report.failed_addresses(), vec![addr(0, 0)]);
    assert!(report.failed[0].error.contains("no cell for this address"));
    assert_eq!(
        report.drawn,
        1 + OrdersFixture::ROW_HEADERS + OrdersFixture::COL_HEADERS + OrdersFixture::DATA_CELLS - 1
    );

    let blank = h.session.data_cell(addr(0, 0)).unwrap();
    assert_eq!(blank.kind(), CellKind::Data);
    assert!(blank.shapes().is_empty());
    assert_eq!(h.cell_text(0, 1).as_deref(), Some("2"));
}

fn kpi_session() -> SheetSession {
    let mut options = SheetOptions::default().with_data_cell(|_: &ViewMeta<'_>| -> Box<dyn SheetCell> {
        Box::new(KpiDataCell::new())
    });
    options.style.cell_cfg.width = 150.0;
    let mut session = SheetSession::pivot(KpiFixture::config(), options).unwrap();
    session.render().unwrap();
    session
}

fn texts(session: &SheetSession, row: usize) -> Vec<(String, Color)> {
    session
        .data_cell(addr(row, 0))
        .unwrap()
        .shapes()
        .iter()
        .filter_map(|s| s.as_text())
        .map(|t| (t.text.clone(), t.style.fill))
        .collect()
}

#[test]
fn test_kpi_progress_bar() {
    let session = kpi_session();
    let cell = session.data_cell(addr(0, 0)).unwrap();
    assert_eq!(cell.kind(), CellKind::Custom);

    // Base drawing first: background, then the percentage text
    let shapes = cell.shapes();
    assert!(matches!(&shapes[0], Shape::Rect(_)));
    assert_eq!(shapes[1].as_text().map(|t| t.text.as_str()), Some("35 %"));

    // Cell spans x 96..246, y 60..90; the bar is right aligned with 10 padding
    let bars = rects(shapes);
    let container = bars[1];
    assert_eq!(container.bounds, engine::Bounds::new(156.0, 70.0, 80.0, 10.0));
    assert_eq!(container.fill, Some(Color::new(0xE9, 0xE9, 0xE9)));
    let progress = bars[2];
    assert!((progress.bounds.width - 28.0).abs() < 1e-9);
    assert_eq!(progress.bounds.y, 72.0);
    // 0.15 behind expectation
    assert_eq!(progress.fill, Some(Color::new(0xFA, 0xAD, 0x14)));

    let line = shapes
        .iter()
        .find_map(|s| match s {
            Shape::Line(l) => Some(l),
            _ => None,
        })
        .unwrap();
    assert_eq!(line.x1, 196.0);
    assert_eq!((line.y1, line.y2), (69.0, 81.0));
    assert_eq!(line.opacity, 0.25);
}

#[test]
fn test_kpi_delta_and_formatting() {
    let session = kpi_session();

    let sales = texts(&session, 0);
    assert_eq!(sales[1], ("↓0.2".to_string(), GREEN));

    let users = texts(&session, 1);
    assert_eq!(users[0].0, "1200");
    assert_eq!(users[1], ("↑0.1".to_string(), RED));

    // Extra rows carry no delta
    assert_eq!(texts(&session, 2).len(), 1);

    // Delta sits on the value text's bottom line, right aligned
    let cell = session.data_cell(addr(1, 0)).unwrap();
    let value_box = cell.surface().text_bbox.unwrap();
    let delta = cell.shapes().iter().filter_map(|s| s.as_text()).nth(1).unwrap();
    assert_eq!(delta.y + delta.style.font_size, value_box.max_y());
    assert!((delta.x + delta.width() - (246.0 - 10.0)).abs() < 1e-9);
}

#[test]
fn test_kpi_missing_expectation_fails_that_cell_only() {
    let session = kpi_session();
    let report = session.last_render_report();
    assert_eq!(report.failed_addresses(), vec![addr(3, 0)]);
    assert!(report.failed[0].error.contains("expectedValue"));
    assert!(session.data_cell(addr(3, 0)).unwrap().shapes().is_empty());
    assert!(!session.data_cell(addr(2, 0)).unwrap().shapes().is_empty());
}

#[test]
fn test_kpi_formatted_value_delegates_for_plain_records() {
    let config: DataConfig = KpiFixture::config();
    let options = SheetOptions::default();
    let layout = pivot_engine::layout(&config, &options.layout_options(), &config.sort_params);
    let sort_state = config.sort_params.clone();
    let ctx = DrawContext {
        config: &config,
        options: &options,
        layout: &layout,
        sort_state: &sort_state,
    };

    let cell = KpiDataCell::new();
    let progress = layout.data_cell(&config, addr(0, 0)).unwrap();
    let plain = layout.data_cell(&config, addr(1, 0)).unwrap();
    assert_eq!(cell.formatted_value(&ctx, &progress).text, "35 %");
    assert_eq!(cell.formatted_value(&ctx, &plain), DataCell::base_formatted_value(&ctx, &plain));
    assert_eq!(cell.formatted_value(&ctx, &plain).value, FieldValue::Number(1200.0));
}
