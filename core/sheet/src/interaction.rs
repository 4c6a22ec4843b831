//! FILENAME: core/sheet/src/interaction.rs
//! PURPOSE: Interaction Coordinator - pointer/keyboard input to semantic actions.
//! CONTEXT: Events arrive already hit-tested (or are resolved against the
//! layout with `resolve_target`). The coordinator keeps hover, header menu
//! and selection state and answers which interaction state every cell should
//! show. It never touches the sort state itself: opening a menu or dismissing
//! it comes back to the session as an `InteractionAction`.
//!
//! Header lifecycle: Idle -> Hovered -> MenuOpen -> Idle. At most one menu
//! is open; opening another closes the first.

use std::collections::BTreeSet;

use serde::Serialize;
use engine::log_debug;
use pivot_engine::{Axis, DataCellAddress, LayoutResult};

use crate::cell::InteractionState;
use crate::options::InteractionOptions;

// ============================================================================
// INPUT
// ============================================================================

/// What a pointer event landed on.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum PointerTarget {
    DataCell(DataCellAddress),
    Header { node_id: String, axis: Axis },
    Corner,
    /// Outside every cell (or outside the sheet).
    Outside,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum PointerEventKind {
    Move,
    Click,
    Leave,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PointerEvent {
    pub kind: PointerEventKind,
    pub target: PointerTarget,
    pub shift_key: bool,
}

impl PointerEvent {
    pub fn moved(target: PointerTarget) -> Self {
        PointerEvent {
            kind: PointerEventKind::Move,
            target,
            shift_key: false,
        }
    }

    pub fn click(target: PointerTarget) -> Self {
        PointerEvent {
            kind: PointerEventKind::Click,
            target,
            shift_key: false,
        }
    }

    pub fn shift_click(target: PointerTarget) -> Self {
        PointerEvent {
            shift_key: true,
            ..PointerEvent::click(target)
        }
    }

    pub fn leave() -> Self {
        PointerEvent {
            kind: PointerEventKind::Leave,
            target: PointerTarget::Outside,
            shift_key: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    Escape,
    Other,
}

/// Resolves a sheet-space point against a layout.
pub fn resolve_target(layout: &LayoutResult, x: f64, y: f64) -> PointerTarget {
    let in_col_header = y < layout.col_header_height;
    let in_row_header = x < layout.row_header_width;

    if in_col_header && in_row_header {
        return if x >= 0.0 && y >= 0.0 {
            PointerTarget::Corner
        } else {
            PointerTarget::Outside
        };
    }

    let axis = match (in_col_header, in_row_header) {
        (true, false) => Some(Axis::Col),
        (false, true) => Some(Axis::Row),
        _ => None,
    };
    if let Some(axis) = axis {
        // Pre-order: the deepest node containing the point comes last.
        let hit = layout
            .header_nodes(axis)
            .into_iter()
            .filter(|n| layout.header_cell_bounds(n, axis).contains_point(x, y))
            .last();
        return match hit {
            Some(node) => PointerTarget::Header {
                node_id: node.id.clone(),
                axis,
            },
            None => PointerTarget::Outside,
        };
    }

    let row = layout
        .row_items
        .iter()
        .position(|r| y >= r.bounds.y && y < r.bounds.max_y());
    let col = layout
        .col_items
        .iter()
        .position(|c| x >= c.bounds.x && x < c.bounds.max_x());
    match (row, col) {
        (Some(r), Some(c)) => PointerTarget::DataCell(DataCellAddress::new(r, c)),
        _ => PointerTarget::Outside,
    }
}

// ============================================================================
// STATE
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum HeaderState {
    Idle,
    Hovered,
    MenuOpen,
}

/// What is under the pointer.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum HoverTarget {
    Header(String),
    Cell(DataCellAddress),
}

/// Semantic result of one input event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InteractionAction {
    HoverChanged(Option<HoverTarget>),
    SelectionChanged(Vec<DataCellAddress>),
    /// A header asked for its sort menu.
    MenuRequested(String),
    /// An open menu was closed without choosing.
    MenuDismissed(String),
}

#[derive(Debug, Default)]
pub struct InteractionCoordinator {
    options: InteractionOptions,
    hover: Option<HoverTarget>,
    open_menu: Option<String>,
    selection: BTreeSet<DataCellAddress>,
    anchor: Option<DataCellAddress>,
}

impl InteractionCoordinator {
    pub fn new(options: InteractionOptions) -> Self {
        InteractionCoordinator {
            options,
            ..Default::default()
        }
    }

    pub fn set_options(&mut self, options: InteractionOptions) {
        self.options = options;
        if !self.options.hover_highlight {
            self.hover = None;
        }
    }

    pub fn hover(&self) -> Option<&HoverTarget> {
        self.hover.as_ref()
    }

    pub fn open_menu_node(&self) -> Option<&str> {
        self.open_menu.as_deref()
    }

    pub fn selection(&self) -> Vec<DataCellAddress> {
        self.selection.iter().copied().collect()
    }

    pub fn header_state(&self, node_id: &str) -> HeaderState {
        if self.open_menu.as_deref() == Some(node_id) {
            HeaderState::MenuOpen
        } else if matches!(&self.hover, Some(HoverTarget::Header(id)) if id == node_id) {
            HeaderState::Hovered
        } else {
            HeaderState::Idle
        }
    }

    pub fn header_interaction_state(&self, node_id: &str) -> InteractionState {
        match self.header_state(node_id) {
            HeaderState::Idle => InteractionState::Default,
            HeaderState::Hovered => InteractionState::Hover,
            HeaderState::MenuOpen => InteractionState::Selected,
        }
    }

    pub fn cell_state(&self, address: DataCellAddress) -> InteractionState {
        if self.selection.contains(&address) {
            InteractionState::Selected
        } else if self.hover == Some(HoverTarget::Cell(address)) {
            InteractionState::Hover
        } else if self.options.selected_cells_spotlight && !self.selection.is_empty() {
            InteractionState::Unselected
        } else {
            InteractionState::Default
        }
    }

    /// Opens the menu of `node_id`, closing any other. Returns the node whose
    /// menu was closed.
    pub fn open_menu(&mut self, node_id: &str) -> Option<String> {
        let previous = self.open_menu.replace(node_id.to_string());
        log_debug!("INTERACTION", "menu open node={} (closed {:?})", node_id, previous);
        previous.filter(|p| p != node_id)
    }

    /// Closes the open menu, if any.
    pub fn close_menu(&mut self) -> Option<String> {
        self.open_menu.take()
    }

    pub fn handle_pointer(&mut self, event: &PointerEvent) -> Vec<InteractionAction> {
        match event.kind {
            PointerEventKind::Move => self.pointer_move(&event.target),
            PointerEventKind::Leave => self.set_hover(None).into_iter().collect(),
            PointerEventKind::Click => self.click(&event.target, event.shift_key),
        }
    }

    pub fn handle_key(&mut self, key: Key) -> Vec<InteractionAction> {
        let mut actions = Vec::new();
        if key != Key::Escape {
            return actions;
        }
        if let Some(node_id) = self.close_menu() {
            actions.push(InteractionAction::MenuDismissed(node_id));
        }
        if let Some(action) = self.clear_selection() {
            actions.push(action);
        }
        actions
    }

    /// Drops hover, menu and selection.
    pub fn reset(&mut self) {
        self.hover = None;
        self.open_menu = None;
        self.selection.clear();
        self.anchor = None;
    }

    /// Moves hover and selection onto the addresses their cells hold in a new
    /// layout; cells that no longer exist drop out. Returns the new selection
    /// when it changed.
    pub fn remap_cells<F>(&mut self, remap: F) -> Option<Vec<DataCellAddress>>
    where
        F: Fn(DataCellAddress) -> Option<DataCellAddress>,
    {
        if let Some(HoverTarget::Cell(address)) = self.hover {
            self.hover = remap(address).map(HoverTarget::Cell);
        }
        self.anchor = self.anchor.and_then(&remap);

        let before = self.selection();
        self.selection = before.iter().filter_map(|a| remap(*a)).collect();
        let after = self.selection();
        if after != before {
            log_debug!("INTERACTION", "selection moved {:?} -> {:?}", before, after);
            Some(after)
        } else {
            None
        }
    }

    fn pointer_move(&mut self, target: &PointerTarget) -> Vec<InteractionAction> {
        let hover = match target {
            PointerTarget::DataCell(address) => Some(HoverTarget::Cell(*address)),
            PointerTarget::Header { node_id, .. } => Some(HoverTarget::Header(node_id.clone())),
            PointerTarget::Corner | PointerTarget::Outside => None,
        };
        self.set_hover(hover).into_iter().collect()
    }

    fn set_hover(&mut self, hover: Option<HoverTarget>) -> Option<InteractionAction> {
        let hover = if self.options.hover_highlight { hover } else { None };
        if self.hover == hover {
            return None;
        }
        self.hover = hover.clone();
        Some(InteractionAction::HoverChanged(hover))
    }

    fn click(&mut self, target: &PointerTarget, shift_key: bool) -> Vec<InteractionAction> {
        let mut actions = Vec::new();

        match target {
            PointerTarget::Header { node_id, .. } => {
                actions.push(InteractionAction::MenuRequested(node_id.clone()));
            }
            PointerTarget::DataCell(address) => {
                if let Some(node_id) = self.close_menu() {
                    actions.push(InteractionAction::MenuDismissed(node_id));
                }
                actions.push(self.select(*address, shift_key));
            }
            PointerTarget::Corner | PointerTarget::Outside => {
                if let Some(node_id) = self.close_menu() {
                    actions.push(InteractionAction::MenuDismissed(node_id));
                }
                if self.options.auto_reset_sheet_style {
                    actions.extend(self.set_hover(None));
                    actions.extend(self.clear_selection());
                }
            }
        }
        actions
    }

    fn select(&mut self, address: DataCellAddress, shift_key: bool) -> InteractionAction {
        match (shift_key, self.anchor) {
            (true, Some(anchor)) => {
                let rows = anchor.row_index.min(address.row_index)..=anchor.row_index.max(address.row_index);
                let cols = anchor.col_index.min(address.col_index)..=anchor.col_index.max(address.col_index);
                self.selection = rows
                    .flat_map(|r| cols.clone().map(move |c| DataCellAddress::new(r, c)))
                    .collect();
            }
            _ => {
                let toggled_off = self.selection.len() == 1 && self.selection.contains(&address);
                self.selection.clear();
                if toggled_off {
                    self.anchor = None;
                } else {
                    self.selection.insert(address);
                    self.anchor = Some(address);
                }
            }
        }
        InteractionAction::SelectionChanged(self.selection())
    }

    fn clear_selection(&mut self) -> Option<InteractionAction> {
        self.anchor = None;
        if self.selection.is_empty() {
            return None;
        }
        self.selection.clear();
        Some(InteractionAction::SelectionChanged(Vec::new()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn addr(r: usize, c: usize) -> DataCellAddress {
        DataCellAddress::new(r, c)
    }

    fn header(id: &str) -> PointerTarget {
        PointerTarget::Header {
            node_id: id.to_string(),
            axis: Axis::Col,
        }
    }

    #[test]
    fn test_header_lifecycle() {
        let mut coordinator = InteractionCoordinator::new(InteractionOptions::default());
        assert_eq!(coordinator.header_state("root[&]city"), HeaderState::Idle);

        coordinator.handle_pointer(&PointerEvent::moved(header("root[&]city")));
        assert_eq!(coordinator.header_state("root[&]city"), HeaderState::Hovered);

        let actions = coordinator.handle_pointer(&PointerEvent::click(header("root[&]city")));
        assert_eq!(actions, vec![InteractionAction::MenuRequested("root[&]city".into())]);
        coordinator.open_menu("root[&]city");
        assert_eq!(coordinator.header_state("root[&]city"), HeaderState::MenuOpen);

        let actions = coordinator.handle_pointer(&PointerEvent::click(PointerTarget::Outside));
        assert_eq!(actions[0], InteractionAction::MenuDismissed("root[&]city".into()));
        assert_eq!(coordinator.open_menu_node(), None);
    }

    #[test]
    fn test_remap_moves_and_drops_cells() {
        let mut coordinator = InteractionCoordinator::new(InteractionOptions::default());
        coordinator.handle_pointer(&PointerEvent::click(PointerTarget::DataCell(addr(0, 0))));
        coordinator.handle_pointer(&PointerEvent::shift_click(PointerTarget::DataCell(addr(1, 0))));
        coordinator.handle_pointer(&PointerEvent::moved(PointerTarget::DataCell(addr(1, 0))));

        // Row 0 moved to 2, row 1 is gone
        let moved = coordinator.remap_cells(|a| (a.row_index == 0).then(|| addr(2, a.col_index)));
        assert_eq!(moved, Some(vec![addr(2, 0)]));
        assert_eq!(coordinator.hover(), None);
        assert_eq!(coordinator.remap_cells(Some), None);
    }

    #[test]
    fn test_single_open_menu() {
        let mut coordinator = InteractionCoordinator::default();
        assert_eq!(coordinator.open_menu("a"), None);
        assert_eq!(coordinator.open_menu("b"), Some("a".to_string()));
        assert_eq!(coordinator.header_state("a"), HeaderState::Idle);
        assert_eq!(coordinator.header_state("b"), HeaderState::MenuOpen);
        assert_eq!(coordinator.open_menu("b"), None);
    }

    #[test]
    fn test_hover_can_be_disabled() {
        let options = InteractionOptions {
            hover_highlight: false,
            ..Default::default()
        };
        let mut coordinator = InteractionCoordinator::new(options);
        let actions = coordinator.handle_pointer(&PointerEvent::moved(PointerTarget::DataCell(addr(0, 0))));
        assert!(actions.is_empty());
        assert_eq!(coordinator.cell_state(addr(0, 0)), InteractionState::Default);
        assert_eq!(coordinator.header_state("x"), HeaderState::Idle);
    }

    #[test]
    fn test_selection_click_range_toggle_escape() {
        let mut coordinator = InteractionCoordinator::new(InteractionOptions::default());

        coordinator.handle_pointer(&PointerEvent::click(PointerTarget::DataCell(addr(1, 1))));
        assert_eq!(coordinator.selection(), vec![addr(1, 1)]);

        coordinator.handle_pointer(&PointerEvent::shift_click(PointerTarget::DataCell(addr(0, 2))));
        assert_eq!(
            coordinator.selection(),
            vec![addr(0, 1), addr(0, 2), addr(1, 1), addr(1, 2)]
        );

        coordinator.handle_pointer(&PointerEvent::click(PointerTarget::DataCell(addr(2, 0))));
        assert_eq!(coordinator.selection(), vec![addr(2, 0)]);

        // Same single cell again clears
        coordinator.handle_pointer(&PointerEvent::click(PointerTarget::DataCell(addr(2, 0))));
        assert!(coordinator.selection().is_empty());

        coordinator.handle_pointer(&PointerEvent::click(PointerTarget::DataCell(addr(0, 0))));
        let actions = coordinator.handle_key(Key::Escape);
        assert_eq!(actions, vec![InteractionAction::SelectionChanged(Vec::new())]);
        assert!(coordinator.handle_key(Key::Escape).is_empty());
    }

    #[test]
    fn test_spotlight_states() {
        let options = InteractionOptions {
            selected_cells_spotlight: true,
            ..Default::default()
        };
        let mut coordinator = InteractionCoordinator::new(options);
        assert_eq!(coordinator.cell_state(addr(0, 0)), InteractionState::Default);

        coordinator.handle_pointer(&PointerEvent::click(PointerTarget::DataCell(addr(0, 0))));
        coordinator.handle_pointer(&PointerEvent::moved(PointerTarget::DataCell(addr(1, 1))));
        assert_eq!(coordinator.cell_state(addr(0, 0)), InteractionState::Selected);
        assert_eq!(coordinator.cell_state(addr(1, 1)), InteractionState::Hover);
        assert_eq!(coordinator.cell_state(addr(1, 0)), InteractionState::Unselected);
    }

    #[test]
    fn test_click_away_respects_auto_reset() {
        let options = InteractionOptions {
            auto_reset_sheet_style: false,
            ..Default::default()
        };
        let mut coordinator = InteractionCoordinator::new(options);
        coordinator.handle_pointer(&PointerEvent::click(PointerTarget::DataCell(addr(0, 0))));
        coordinator.handle_pointer(&PointerEvent::click(PointerTarget::Outside));
        assert_eq!(coordinator.selection(), vec![addr(0, 0)]);

        coordinator.set_options(InteractionOptions::default());
        let actions = coordinator.handle_pointer(&PointerEvent::click(PointerTarget::Outside));
        assert_eq!(actions, vec![InteractionAction::SelectionChanged(Vec::new())]);
    }
}
