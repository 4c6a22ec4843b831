//! FILENAME: core/sheet/src/session.rs
//! PURPOSE: Sheet session - owns config, options, sort state and cells.
//! CONTEXT: The session is the only place state changes. It lays out through
//! the pivot or table engine (cached per data version, options and sort
//! state), draws every visible cell under a failure guard, forwards input to
//! the interaction coordinator and turns sort menu choices into sort state
//! changes. Every successful data or sort change triggers exactly one render;
//! requests made inside `batch` or during a pass collapse into one.

use std::collections::BTreeMap;

use engine::{log_debug, log_info, Bounds, FieldValue};
use pivot_engine::{
    apply_sort, layout, Axis, DataCellAddress, DataConfig, LayoutOptions, LayoutResult, Node,
    SortMethod, SortRequest, SortState, ViewMeta,
};
use table_engine::layout_table;

use crate::cell::header_cell::sort_field_of;
use crate::cell::{CornerCell, DataCell, DrawContext, HeaderCell, SheetCell};
use crate::error::SheetError;
use crate::events::SheetEvent;
use crate::interaction::{
    resolve_target, InteractionAction, InteractionCoordinator, Key, PointerEvent, PointerTarget,
};
use crate::options::SheetOptions;
use crate::render::{
    guarded_create, guarded_draw, is_visible, CellLocation, RenderReport, RenderScheduler,
};
use crate::tooltip::{
    default_sort_choices, FieldDescriptor, NoopTooltip, SortMenuChoice, TooltipCollaborator,
    TooltipContent, TooltipInfo,
};

static EMPTY: FieldValue = FieldValue::Empty;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SheetKind {
    Pivot,
    Table,
}

/// Layout of one (data version, layout options, sort state) triple.
struct CachedLayout {
    version: u64,
    options: LayoutOptions,
    sort_state: SortState,
    result: LayoutResult,
}

pub struct SheetSession {
    kind: SheetKind,
    config: DataConfig,
    options: SheetOptions,
    sort_state: SortState,

    /// Bumped by every data config change.
    version: u64,
    cache: Option<CachedLayout>,

    corner: CornerCell,
    header_cells: BTreeMap<(Axis, String), Box<dyn SheetCell>>,
    data_cells: BTreeMap<DataCellAddress, Box<dyn SheetCell>>,

    coordinator: InteractionCoordinator,
    scheduler: RenderScheduler,
    tooltip: Box<dyn TooltipCollaborator>,

    /// Top-left of the visible area in sheet space.
    scroll: (f64, f64),

    events: Vec<SheetEvent>,
    render_count: usize,
    last_report: RenderReport,
    destroyed: bool,
}

impl SheetSession {
    pub fn new(kind: SheetKind, config: DataConfig, options: SheetOptions) -> Result<Self, SheetError> {
        validate_config(kind, &config)?;
        log_info!(
            "SESSION",
            "new {:?} sheet: {} records, {} sort directive(s)",
            kind,
            config.data.len(),
            config.sort_params.len()
        );

        Ok(SheetSession {
            kind,
            sort_state: config.sort_params.clone(),
            coordinator: InteractionCoordinator::new(options.interaction.clone()),
            config,
            options,
            version: 0,
            cache: None,
            corner: CornerCell::new(),
            header_cells: BTreeMap::new(),
            data_cells: BTreeMap::new(),
            scheduler: RenderScheduler::new(),
            tooltip: Box::new(NoopTooltip),
            scroll: (0.0, 0.0),
            events: Vec::new(),
            render_count: 0,
            last_report: RenderReport::default(),
            destroyed: false,
        })
    }

    pub fn pivot(config: DataConfig, options: SheetOptions) -> Result<Self, SheetError> {
        SheetSession::new(SheetKind::Pivot, config, options)
    }

    pub fn table(config: DataConfig, options: SheetOptions) -> Result<Self, SheetError> {
        SheetSession::new(SheetKind::Table, config, options)
    }

    /// Builds a session from JSON data config and options.
    pub fn from_json(kind: SheetKind, config_json: &str, options_json: &str) -> Result<Self, SheetError> {
        let config: DataConfig = serde_json::from_str(config_json)?;
        let options: SheetOptions = serde_json::from_str(options_json)?;
        SheetSession::new(kind, config, options)
    }

    pub fn with_tooltip(mut self, tooltip: Box<dyn TooltipCollaborator>) -> Self {
        self.tooltip = tooltip;
        self
    }

    // ========================================================================
    // ACCESSORS
    // ========================================================================

    pub fn kind(&self) -> SheetKind {
        self.kind
    }

    pub fn data_config(&self) -> &DataConfig {
        &self.config
    }

    pub fn options(&self) -> &SheetOptions {
        &self.options
    }

    pub fn sort_state(&self) -> &SortState {
        &self.sort_state
    }

    /// Layout of the last render, if any.
    pub fn layout(&self) -> Option<&LayoutResult> {
        self.cache.as_ref().map(|c| &c.result)
    }

    pub fn render_count(&self) -> usize {
        self.render_count
    }

    pub fn last_render_report(&self) -> &RenderReport {
        &self.last_report
    }

    pub fn is_destroyed(&self) -> bool {
        self.destroyed
    }

    pub fn coordinator(&self) -> &InteractionCoordinator {
        &self.coordinator
    }

    pub fn corner_cell(&self) -> &dyn SheetCell {
        &self.corner
    }

    pub fn header_cell(&self, axis: Axis, node_id: &str) -> Option<&dyn SheetCell> {
        self.header_cells
            .get(&(axis, node_id.to_string()))
            .map(|c| c.as_ref())
    }

    pub fn data_cell(&self, address: DataCellAddress) -> Option<&dyn SheetCell> {
        self.data_cells.get(&address).map(|c| c.as_ref())
    }

    pub fn data_cell_count(&self) -> usize {
        self.data_cells.len()
    }

    /// Visible area in sheet space.
    pub fn viewport(&self) -> Bounds {
        Bounds::new(self.scroll.0, self.scroll.1, self.options.width, self.options.height)
    }

    /// Events raised since the last call.
    pub fn drain_events(&mut self) -> Vec<SheetEvent> {
        std::mem::take(&mut self.events)
    }

    // ========================================================================
    // LIFECYCLE
    // ========================================================================

    pub fn render(&mut self) -> Result<(), SheetError> {
        self.ensure_alive()?;
        self.request_render();
        Ok(())
    }

    /// Releases cells and state. Safe to call more than once.
    pub fn destroy(&mut self) {
        if self.destroyed {
            return;
        }
        log_info!("SESSION", "destroy after {} render(s)", self.render_count);
        self.destroyed = true;
        self.tooltip.hide_tooltip();
        self.coordinator.reset();
        self.header_cells.clear();
        self.data_cells.clear();
        self.corner.clear();
        self.cache = None;
        self.events.clear();
    }

    /// Runs `f` with renders deferred; at most one render follows.
    pub fn batch<R>(&mut self, f: impl FnOnce(&mut Self) -> R) -> Result<R, SheetError> {
        self.ensure_alive()?;
        self.scheduler.begin_batch();
        let result = f(self);
        if self.scheduler.end_batch() && !self.destroyed {
            self.run_render();
        }
        Ok(result)
    }

    // ========================================================================
    // DATA AND SORT
    // ========================================================================

    /// Replaces the data config. Its `sortParams` replace the sort state.
    pub fn set_data_cfg(&mut self, config: DataConfig) -> Result<(), SheetError> {
        self.ensure_alive()?;
        validate_config(self.kind, &config)?;
        self.sort_state = config.sort_params.clone();
        self.config = config;
        self.version += 1;
        self.coordinator.reset();
        log_debug!("SESSION", "data config v{} with {} records", self.version, self.config.data.len());
        self.request_render();
        Ok(())
    }

    /// Replaces the sort state wholesale.
    pub fn set_sort_state(&mut self, state: SortState) -> Result<(), SheetError> {
        self.ensure_alive()?;
        self.config.sort_params = state.clone();
        self.sort_state = state;
        self.request_render();
        Ok(())
    }

    pub fn set_options(&mut self, options: SheetOptions) -> Result<(), SheetError> {
        self.ensure_alive()?;
        self.coordinator.set_options(options.interaction.clone());
        self.options = options;
        self.request_render();
        Ok(())
    }

    pub fn scroll_to(&mut self, x: f64, y: f64) -> Result<(), SheetError> {
        self.ensure_alive()?;
        self.scroll = (x.max(0.0), y.max(0.0));
        self.request_render();
        Ok(())
    }

    // ========================================================================
    // SORT MENU
    // ========================================================================

    /// Opens the sort menu of a header node.
    pub fn handle_group_sort(&mut self, node: &Node) -> Result<(), SheetError> {
        self.ensure_alive()?;
        let field = sort_field_of(node).to_string();
        if let Some(closed) = self.coordinator.open_menu(&node.id) {
            log_debug!("INTERACTION", "menu of {} closed by {}", closed, node.id);
        }
        self.events.push(SheetEvent::SortMenuRequested {
            node_id: node.id.clone(),
            field: field.clone(),
        });

        if self.options.tooltip.show_tooltip {
            let anchor = self
                .layout()
                .and_then(|layout| {
                    let (laid_out, axis) = layout.find_node(&node.id)?;
                    Some(layout.header_cell_bounds(laid_out, axis))
                })
                .unwrap_or_else(|| node.bounds.unwrap_or_default());
            self.show_tooltip_with_info(TooltipInfo {
                anchor,
                content: TooltipContent::SortMenu {
                    field: FieldDescriptor::new(field),
                    choices: default_sort_choices(),
                },
            });
        }
        self.refresh_interaction_states();
        Ok(())
    }

    /// Applies a sort menu choice to `field` and re-renders once.
    pub fn on_sort_tooltip_click(
        &mut self,
        choice: &SortMenuChoice,
        field: &FieldDescriptor,
    ) -> Result<(), SheetError> {
        self.ensure_alive()?;
        let method = SortMethod::from_key(&choice.key)
            .ok_or_else(|| SheetError::UnknownSortMethod(choice.key.clone()))?;

        let state = apply_sort(&self.sort_state, SortRequest::new(field.field.as_str(), method));
        log_info!(
            "SORT",
            "{} {} -> [{}]",
            field.field,
            method.as_str(),
            state
                .iter()
                .map(|d| format!("{}:{}", d.sort_field_id, d.sort_method.as_str()))
                .collect::<Vec<_>>()
                .join(", ")
        );

        self.config.sort_params = state.clone();
        self.sort_state = state.clone();
        self.coordinator.close_menu();
        self.tooltip.hide_tooltip();
        self.events.push(SheetEvent::SortApplied(state));
        self.request_render();
        Ok(())
    }

    pub fn show_tooltip_with_info(&mut self, info: TooltipInfo) {
        self.tooltip.show_tooltip_with_info(info);
    }

    // ========================================================================
    // INPUT
    // ========================================================================

    /// Target under a sheet-space point of the last rendered layout.
    pub fn target_at(&self, x: f64, y: f64) -> PointerTarget {
        match self.layout() {
            Some(layout) => resolve_target(layout, x, y),
            None => PointerTarget::Outside,
        }
    }

    /// Feeds a pointer event. Only interaction states repaint; no re-layout.
    pub fn handle_pointer(&mut self, event: &PointerEvent) -> Result<(), SheetError> {
        self.ensure_alive()?;
        let actions = self.coordinator.handle_pointer(event);
        self.dispatch(actions)
    }

    pub fn handle_key(&mut self, key: Key) -> Result<(), SheetError> {
        self.ensure_alive()?;
        let actions = self.coordinator.handle_key(key);
        self.dispatch(actions)
    }

    fn dispatch(&mut self, actions: Vec<InteractionAction>) -> Result<(), SheetError> {
        for action in actions {
            match action {
                InteractionAction::HoverChanged(target) => {
                    self.events.push(SheetEvent::CellHoverChanged(target));
                }
                InteractionAction::SelectionChanged(selection) => {
                    self.events.push(SheetEvent::SelectionChanged(selection));
                }
                InteractionAction::MenuRequested(node_id) => {
                    let node = self
                        .layout()
                        .and_then(|l| l.find_node(&node_id))
                        .map(|(node, _)| node.clone())
                        .ok_or(SheetError::UnknownNode(node_id))?;
                    self.handle_group_sort(&node)?;
                }
                InteractionAction::MenuDismissed(node_id) => {
                    log_debug!("INTERACTION", "menu of {} dismissed", node_id);
                    self.tooltip.hide_tooltip();
                }
            }
        }
        self.refresh_interaction_states();
        Ok(())
    }

    fn refresh_interaction_states(&mut self) {
        for (address, cell) in self.data_cells.iter_mut() {
            let state = self.coordinator.cell_state(*address);
            if cell.interaction_state() != state {
                cell.on_interaction_state_change(state);
            }
        }
        for ((_, node_id), cell) in self.header_cells.iter_mut() {
            let state = self.coordinator.header_interaction_state(node_id);
            if cell.interaction_state() != state {
                cell.on_interaction_state_change(state);
            }
        }
    }

    // ========================================================================
    // RENDERING
    // ========================================================================

    fn ensure_alive(&self) -> Result<(), SheetError> {
        if self.destroyed {
            Err(SheetError::Destroyed)
        } else {
            Ok(())
        }
    }

    fn request_render(&mut self) {
        if self.scheduler.request() {
            self.run_render();
        }
    }

    fn run_render(&mut self) {
        loop {
            self.scheduler.begin_pass();
            let report = self.render_pass();
            self.render_count += 1;
            log_info!(
                "SESSION",
                "render #{}: drawn={} failed={} culled={}",
                self.render_count,
                report.drawn,
                report.failed.len(),
                report.culled
            );
            self.events.push(SheetEvent::RenderComplete {
                drawn: report.drawn,
                failed: report.failed.iter().map(|f| f.location.clone()).collect(),
            });
            self.last_report = report;
            if !self.scheduler.end_pass() {
                break;
            }
        }
    }

    /// Layout for the current inputs, reusing the cached one when nothing changed.
    fn ensure_layout(&mut self) {
        let options = self.options.layout_options();
        let fresh = matches!(
            &self.cache,
            Some(c) if c.version == self.version && c.options == options && c.sort_state == self.sort_state
        );
        if fresh {
            return;
        }
        let result = match self.kind {
            SheetKind::Pivot => layout(&self.config, &options, &self.sort_state),
            SheetKind::Table => layout_table(&self.config, &options, &self.sort_state),
        };

        // Interaction state follows its cells, not their grid positions
        if let Some(previous) = &self.cache {
            let old = &previous.result;
            let moved = self.coordinator.remap_cells(|address| {
                let row = old.row_items.get(address.row_index)?;
                let col = old.col_items.get(address.col_index)?;
                result.address_of(&row.node_id, &col.node_id)
            });
            if let Some(selection) = moved {
                self.events.push(SheetEvent::SelectionChanged(selection));
            }
        }

        self.cache = Some(CachedLayout {
            version: self.version,
            options,
            sort_state: self.sort_state.clone(),
            result,
        });
    }

    fn render_pass(&mut self) -> RenderReport {
        self.ensure_layout();
        let mut report = RenderReport::default();
        let Some(cache) = self.cache.as_ref() else {
            return report;
        };

        let layout = &cache.result;
        let viewport = Bounds::new(self.scroll.0, self.scroll.1, self.options.width, self.options.height);
        let ctx = DrawContext {
            config: &self.config,
            options: &self.options,
            layout,
            sort_state: &self.sort_state,
        };

        // Corner
        let corner_bounds = layout.corner_bounds();
        let corner_meta = ViewMeta {
            x: corner_bounds.x,
            y: corner_bounds.y,
            width: corner_bounds.width,
            height: corner_bounds.height,
            value: &EMPTY,
            row_id: "",
            col_id: "",
            field: None,
            label: None,
            data: None,
            address: None,
            node: None,
            depth: 0,
            is_totals: false,
        };
        report.record(CellLocation::Corner, guarded_draw(&mut self.corner, &ctx, &corner_meta));

        // Headers
        let mut header_cells: BTreeMap<(Axis, String), Box<dyn SheetCell>> = BTreeMap::new();
        for axis in [Axis::Row, Axis::Col] {
            for node in layout.header_nodes(axis) {
                let meta = layout.header_meta(node, axis);
                if !is_visible(&meta.bounds(), &viewport) {
                    report.culled += 1;
                    continue;
                }
                let mut cell: Box<dyn SheetCell> = Box::new(HeaderCell::new(axis));
                let result = guarded_draw(cell.as_mut(), &ctx, &meta);
                cell.on_interaction_state_change(self.coordinator.header_interaction_state(&node.id));
                report.record(CellLocation::Header(node.id.clone()), result);
                header_cells.insert((axis, node.id.clone()), cell);
            }
        }

        // Data cells
        let mut data_cells: BTreeMap<DataCellAddress, Box<dyn SheetCell>> = BTreeMap::new();
        for meta in layout.data_cells(&self.config) {
            let Some(address) = meta.address else {
                continue;
            };
            if !is_visible(&meta.bounds(), &viewport) {
                report.culled += 1;
                continue;
            }
            let created = match &self.options.data_cell {
                Some(factory) => guarded_create(factory, &meta),
                None => Ok(Box::new(DataCell::new()) as Box<dyn SheetCell>),
            };
            let (mut cell, result) = match created {
                Ok(mut cell) => {
                    let result = guarded_draw(cell.as_mut(), &ctx, &meta);
                    (cell, result)
                }
                Err(error) => (Box::new(DataCell::new()) as Box<dyn SheetCell>, Err(error)),
            };
            cell.on_interaction_state_change(self.coordinator.cell_state(address));
            report.record(CellLocation::Data(address), result);
            data_cells.insert(address, cell);
        }

        self.header_cells = header_cells;
        self.data_cells = data_cells;
        report
    }
}

/// Field sets must not overlap; a pivot field may appear on one axis only.
fn validate_config(kind: SheetKind, config: &DataConfig) -> Result<(), SheetError> {
    let fields = &config.fields;
    let groups: Vec<(&str, &Vec<String>)> = match kind {
        SheetKind::Pivot => vec![
            ("rows", &fields.rows),
            ("columns", &fields.columns),
            ("values", &fields.values),
        ],
        SheetKind::Table => vec![("columns", &fields.columns)],
    };

    let mut seen: BTreeMap<&str, &str> = BTreeMap::new();
    for (group, list) in groups {
        for field in list.iter() {
            if let Some(previous) = seen.insert(field.as_str(), group) {
                return Err(SheetError::InvalidConfig(format!(
                    "field '{}' appears in both {} and {}",
                    field, previous, group
                )));
            }
        }
    }
    Ok(())
}
