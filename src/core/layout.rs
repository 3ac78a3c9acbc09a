use crate::core::stats::OutlineStats;
use crate::{FormatInfo, SourceRef};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One heading in the outline forest. A node owns its children; there is no parent link.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutlineNode {
    pub id: String,
    pub level: i32,
    pub text: String,
    /// Position of the originating record in the input sequence (0-based).
    pub index: usize,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub format: Option<FormatInfo>,
    pub children: Vec<OutlineNode>,
    pub source_ref: SourceRef,
}

impl OutlineNode {
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// Number of nodes in this subtree, the node itself included.
    pub fn subtree_len(&self) -> usize {
        let mut count = 0;
        let mut pending = vec![self];
        while let Some(node) = pending.pop() {
            count += 1;
            pending.extend(node.children.iter());
        }
        count
    }
}

/// Result of one outline request. Created fresh per request and never mutated afterwards.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentOutline {
    /// Top-level nodes. A forest, since the first heading need not be the shallowest.
    pub nodes: Vec<OutlineNode>,
    pub total_headings: usize,
    /// Highest heading level present (0 when empty).
    pub max_depth: i32,
    pub level_counts: BTreeMap<i32, usize>,
}

impl DocumentOutline {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// The statistics stored alongside the forest.
    pub fn stats(&self) -> OutlineStats {
        OutlineStats {
            total_headings: self.total_headings,
            max_depth: self.max_depth,
            level_counts: self.level_counts.clone(),
        }
    }

    /// Look a node up by id with a linear walk. Use `OutlineIndex` for repeated lookups.
    pub fn find(&self, id: &str) -> Option<&OutlineNode> {
        let mut pending: Vec<&OutlineNode> = self.nodes.iter().rev().collect();
        while let Some(node) = pending.pop() {
            if node.id == id {
                return Some(node);
            }
            pending.extend(node.children.iter().rev());
        }
        None
    }
}
