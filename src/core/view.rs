//! Caller-owned expansion state for tree views over an immutable outline.

use crate::core::layout::{DocumentOutline, OutlineNode};
use crate::core::stats::flatten;
use std::collections::HashSet;

/// Which nodes a particular view shows expanded. Kept outside the outline so one outline can
/// back several views.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExpansionState {
    expanded: HashSet<String>,
}

impl ExpansionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_expanded(&self, id: &str) -> bool {
        self.expanded.contains(id)
    }

    pub fn expand(&mut self, id: impl Into<String>) {
        self.expanded.insert(id.into());
    }

    pub fn collapse(&mut self, id: &str) {
        self.expanded.remove(id);
    }

    /// Returns the new state of `id`.
    pub fn toggle(&mut self, id: &str) -> bool {
        if self.expanded.remove(id) {
            false
        } else {
            self.expanded.insert(id.to_string());
            true
        }
    }

    /// Expand every node that has children.
    pub fn expand_all(&mut self, outline: &DocumentOutline) {
        for node in flatten(outline) {
            if !node.is_leaf() {
                self.expanded.insert(node.id.clone());
            }
        }
    }

    pub fn collapse_all(&mut self) {
        self.expanded.clear();
    }

    /// Drop ids that are not part of `outline`, e.g. after a rebuild.
    pub fn retain_known(&mut self, outline: &DocumentOutline) {
        let known: HashSet<&str> = flatten(outline).into_iter().map(|n| n.id.as_str()).collect();
        self.expanded.retain(|id| known.contains(id.as_str()));
    }

    pub fn len(&self) -> usize {
        self.expanded.len()
    }

    pub fn is_empty(&self) -> bool {
        self.expanded.is_empty()
    }
}

/// A row a tree widget would draw.
#[derive(Debug, Clone, Copy)]
pub struct VisibleRow<'a> {
    pub node: &'a OutlineNode,
    /// Nesting depth in edges from the forest root (not the heading level).
    pub depth: usize,
    pub expanded: bool,
}

impl VisibleRow<'_> {
    pub fn has_children(&self) -> bool {
        !self.node.is_leaf()
    }
}

/// Pre-order rows, skipping the descendants of collapsed nodes.
pub fn visible_rows<'a>(outline: &'a DocumentOutline, state: &ExpansionState) -> Vec<VisibleRow<'a>> {
    let mut rows = Vec::new();
    let mut pending: Vec<(&'a OutlineNode, usize)> = outline.nodes.iter().rev().map(|n| (n, 0)).collect();

    while let Some((node, depth)) = pending.pop() {
        let expanded = state.is_expanded(&node.id);
        rows.push(VisibleRow { node, depth, expanded });
        if expanded {
            pending.extend(node.children.iter().rev().map(|c| (c, depth + 1)));
        }
    }
    rows
}
