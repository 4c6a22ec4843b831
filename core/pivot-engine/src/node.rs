//! FILENAME: core/pivot-engine/src/node.rs
//! Node Model - one label of a row or column hierarchy.
//!
//! Nodes are created fresh by every layout pass and handed out read-only.
//! The id is the path of value keys from the root joined with `[&]`, so it is
//! unique within its tree and stable across passes over the same data.

use serde::Serialize;
use smallvec::SmallVec;
use engine::{Bounds, FieldValue};

use crate::definition::{ID_SEPARATOR, ROOT_ID, TOTAL_KEY};

/// Field values from the root down to a node.
pub type NodePath = SmallVec<[FieldValue; 4]>;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Node {
    /// Stable id derived from the path (`root[&]Zhejiang[&]Hangzhou`).
    pub id: String,

    /// Field this node belongs to.
    pub key: String,

    /// Raw value of `key` shared by the node's records.
    pub value: FieldValue,

    /// Display label.
    pub label: String,

    /// 0 = top level.
    pub depth: usize,

    pub children: Vec<Node>,

    /// Assigned by the layout engine.
    pub bounds: Option<Bounds>,

    /// Synthetic aggregate node.
    pub is_totals: bool,

    /// Values of every ancestor plus this node, outermost first.
    #[serde(skip)]
    pub path: NodePath,
}

/// Joins a parent id and one more key.
pub fn child_id(parent_id: &str, key: &str) -> String {
    let mut id = String::with_capacity(parent_id.len() + ID_SEPARATOR.len() + key.len());
    id.push_str(parent_id);
    id.push_str(ID_SEPARATOR);
    id.push_str(key);
    id
}

impl Node {
    /// Creates a node below the node with id `parent_id` (`ROOT_ID` for the
    /// top level). `parent_path` is the parent's path.
    pub fn new(
        parent_id: &str,
        parent_path: &[FieldValue],
        key: impl Into<String>,
        value: FieldValue,
        label: impl Into<String>,
        depth: usize,
    ) -> Self {
        let id = child_id(parent_id, &value.key());
        let mut path: NodePath = parent_path.iter().cloned().collect();
        path.push(value.clone());
        Node {
            id,
            key: key.into(),
            value,
            label: label.into(),
            depth,
            children: Vec::new(),
            bounds: None,
            is_totals: false,
            path,
        }
    }

    /// Grand-total node at depth 0.
    pub fn grand_total(key: impl Into<String>, label: impl Into<String>) -> Self {
        Node {
            id: child_id(ROOT_ID, TOTAL_KEY),
            key: key.into(),
            value: FieldValue::Empty,
            label: label.into(),
            depth: 0,
            children: Vec::new(),
            bounds: None,
            is_totals: true,
            path: NodePath::new(),
        }
    }

    /// Node with an explicit id (table rows, series-number column).
    pub fn with_id(
        id: impl Into<String>,
        key: impl Into<String>,
        value: FieldValue,
        label: impl Into<String>,
    ) -> Self {
        Node {
            id: id.into(),
            key: key.into(),
            value,
            label: label.into(),
            depth: 0,
            children: Vec::new(),
            bounds: None,
            is_totals: false,
            path: NodePath::new(),
        }
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    pub fn x(&self) -> Option<f64> {
        self.bounds.map(|b| b.x)
    }

    pub fn y(&self) -> Option<f64> {
        self.bounds.map(|b| b.y)
    }

    pub fn width(&self) -> Option<f64> {
        self.bounds.map(|b| b.width)
    }

    pub fn height(&self) -> Option<f64> {
        self.bounds.map(|b| b.height)
    }

    /// Pre-order walk over this node and all descendants.
    pub fn walk<'a>(&'a self, visit: &mut dyn FnMut(&'a Node)) {
        visit(self);
        for child in &self.children {
            child.walk(visit);
        }
    }

    pub fn leaves(&self) -> Vec<&Node> {
        let mut out = Vec::new();
        self.walk(&mut |n| {
            if n.is_leaf() {
                out.push(n);
            }
        });
        out
    }

    pub fn find(&self, id: &str) -> Option<&Node> {
        if self.id == id {
            return Some(self);
        }
        // Ids are path-prefixed; skip branches that cannot hold the target.
        self.children
            .iter()
            .filter(|c| id.starts_with(c.id.as_str()))
            .find_map(|c| c.find(id))
    }

    pub fn descendant_count(&self) -> usize {
        self.children
            .iter()
            .map(|c| 1 + c.descendant_count())
            .sum()
    }
}

/// Finds a node by id anywhere in a forest.
pub fn find_node<'a>(nodes: &'a [Node], id: &str) -> Option<&'a Node> {
    nodes.iter().find_map(|n| n.find(id))
}

/// Leaves of a forest in display order.
pub fn collect_leaves(nodes: &[Node]) -> Vec<&Node> {
    nodes.iter().flat_map(|n| n.leaves()).collect()
}

/// Every node of a forest in pre-order.
pub fn flatten(nodes: &[Node]) -> Vec<&Node> {
    let mut out = Vec::new();
    for node in nodes {
        node.walk(&mut |n| out.push(n));
    }
    out
}
