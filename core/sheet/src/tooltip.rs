//! FILENAME: core/sheet/src/tooltip.rs
//! PURPOSE: Tooltip collaborator interface and the sort menu vocabulary.
//! CONTEXT: Rendering a tooltip is the host's business. The session only
//! tells the collaborator what to show and when to hide it.

use serde::{Deserialize, Serialize};
use engine::Bounds;

/// One option of the sort menu (`{ key: "asc", label: "Ascending" }`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SortMenuChoice {
    pub key: String,
    #[serde(default)]
    pub label: String,
}

impl SortMenuChoice {
    pub fn new(key: impl Into<String>) -> Self {
        SortMenuChoice {
            key: key.into(),
            label: String::new(),
        }
    }
}

/// The field a sort menu was opened for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldDescriptor {
    pub field: String,
}

impl FieldDescriptor {
    pub fn new(field: impl Into<String>) -> Self {
        FieldDescriptor { field: field.into() }
    }
}

/// Payload of a tooltip.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum TooltipContent {
    /// Sort menu for a header field.
    SortMenu {
        field: FieldDescriptor,
        choices: Vec<SortMenuChoice>,
    },
    /// Free text.
    Text(String),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TooltipInfo {
    /// Area the tooltip is anchored to.
    pub anchor: Bounds,
    pub content: TooltipContent,
}

/// The default ascending / descending menu.
pub fn default_sort_choices() -> Vec<SortMenuChoice> {
    vec![
        SortMenuChoice {
            key: "asc".into(),
            label: "Ascending".into(),
        },
        SortMenuChoice {
            key: "desc".into(),
            label: "Descending".into(),
        },
    ]
}

pub trait TooltipCollaborator {
    fn show_tooltip_with_info(&mut self, info: TooltipInfo);

    fn hide_tooltip(&mut self);
}

/// Collaborator used when the host attaches none.
#[derive(Debug, Default)]
pub struct NoopTooltip;

impl TooltipCollaborator for NoopTooltip {
    fn show_tooltip_with_info(&mut self, _info: TooltipInfo) {}

    fn hide_tooltip(&mut self) {}
}
