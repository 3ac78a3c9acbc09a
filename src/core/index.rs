use crate::core::layout::{DocumentOutline, OutlineNode};
use crate::error::{OutlineError, Result};
use crate::SourceRef;
use std::collections::HashMap;

/// Id lookup over one outline, built with a single traversal.
#[derive(Debug, Clone)]
pub struct OutlineIndex<'a> {
    nodes: HashMap<&'a str, &'a OutlineNode>,
}

impl<'a> OutlineIndex<'a> {
    pub fn new(outline: &'a DocumentOutline) -> Self {
        let mut nodes = HashMap::with_capacity(outline.total_headings);
        let mut pending: Vec<&'a OutlineNode> = outline.nodes.iter().collect();
        while let Some(node) = pending.pop() {
            nodes.insert(node.id.as_str(), node);
            pending.extend(node.children.iter());
        }
        Self { nodes }
    }

    pub fn resolve(&self, id: &str) -> Result<&'a OutlineNode> {
        self.nodes
            .get(id)
            .copied()
            .ok_or_else(|| OutlineError::NotFound { id: id.to_string() })
    }

    /// The host location behind `id`, for the navigation side.
    pub fn source_ref(&self, id: &str) -> Result<&'a SourceRef> {
        self.resolve(id).map(|node| &node.source_ref)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.nodes.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Every indexed id, in no particular order.
    pub fn ids(&self) -> impl Iterator<Item = &'a str> + '_ {
        self.nodes.keys().copied()
    }
}

pub fn index_of(outline: &DocumentOutline) -> OutlineIndex<'_> {
    OutlineIndex::new(outline)
}
