use crate::core::layout::{DocumentOutline, OutlineNode};
use crate::{FormatInfo, SourceRef};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Aggregate counts over a set of outline nodes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutlineStats {
    pub total_headings: usize,
    pub max_depth: i32,
    pub level_counts: BTreeMap<i32, usize>,
}

/// Pre-order walk of the forest: a node before its children, siblings in original order.
pub fn flatten(outline: &DocumentOutline) -> Vec<&OutlineNode> {
    let mut flat = Vec::with_capacity(outline.total_headings);
    let mut pending: Vec<&OutlineNode> = outline.nodes.iter().rev().collect();
    while let Some(node) = pending.pop() {
        flat.push(node);
        pending.extend(node.children.iter().rev());
    }
    flat
}

/// Counts exactly the nodes given; children are not descended into.
pub fn compute_stats<'a, I>(nodes: I) -> OutlineStats
where
    I: IntoIterator<Item = &'a OutlineNode>,
{
    let mut stats = OutlineStats::default();
    let mut max_level: Option<i32> = None;

    for node in nodes {
        stats.total_headings += 1;
        *stats.level_counts.entry(node.level).or_insert(0) += 1;
        max_level = Some(max_level.map_or(node.level, |m| m.max(node.level)));
    }

    stats.max_depth = max_level.unwrap_or(0);
    stats
}

/// A node of the flat view: the same fields as `OutlineNode` minus `children`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlatHeading {
    pub id: String,
    pub level: i32,
    pub text: String,
    pub index: usize,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub format: Option<FormatInfo>,
    pub source_ref: SourceRef,
}

impl From<&OutlineNode> for FlatHeading {
    fn from(node: &OutlineNode) -> Self {
        Self {
            id: node.id.clone(),
            level: node.level,
            text: node.text.clone(),
            index: node.index,
            format: node.format.clone(),
            source_ref: node.source_ref.clone(),
        }
    }
}

/// Flat request mode: headings in reading order without nesting.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlatOutline {
    pub headings: Vec<FlatHeading>,
    pub total_headings: usize,
    pub max_depth: i32,
    pub level_counts: BTreeMap<i32, usize>,
}

impl From<&DocumentOutline> for FlatOutline {
    fn from(outline: &DocumentOutline) -> Self {
        let nodes = flatten(outline);
        let stats = compute_stats(nodes.iter().copied());
        Self {
            headings: nodes.into_iter().map(FlatHeading::from).collect(),
            total_headings: stats.total_headings,
            max_depth: stats.max_depth,
            level_counts: stats.level_counts,
        }
    }
}
