use crate::core::layout::{DocumentOutline, OutlineNode};
use crate::core::stats::{compute_stats, flatten};
use crate::HeadingRecord;
use log::debug;
use uuid::Uuid;

/// Options for one outline build.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildOptions {
    /// Copy each record's format info onto its node.
    pub include_format: bool,
    /// Records deeper than this are dropped entirely.
    pub max_depth: Option<i32>,
}

impl BuildOptions {
    pub fn with_max_depth(mut self, max_depth: i32) -> Self {
        self.max_depth = Some(max_depth);
        self
    }

    pub fn with_format(mut self) -> Self {
        self.include_format = true;
        self
    }
}

/// Mints node ids that are unique within one build and differ between builds.
struct IdMinter {
    token: String,
    next: usize,
}

impl IdMinter {
    fn new() -> Self {
        let token = Uuid::new_v4().simple().to_string();
        Self {
            token: token[..12].to_string(),
            next: 0,
        }
    }

    fn mint(&mut self) -> String {
        let id = format!("h{}-{}", self.token, self.next);
        self.next += 1;
        id
    }
}

pub struct OutlineBuilder;

impl OutlineBuilder {
    /// Turn flat heading records into a forest by level nesting.
    ///
    /// The open ancestor chain is an explicit stack. A record pops every open node whose
    /// level is >= its own; each popped node is attached to whatever is below it on the
    /// stack, or becomes a root when nothing is left. Never fails, whatever the levels.
    pub fn build(records: &[HeadingRecord], options: &BuildOptions) -> DocumentOutline {
        let mut ids = IdMinter::new();
        let mut roots: Vec<OutlineNode> = Vec::new();
        let mut stack: Vec<OutlineNode> = Vec::new();
        let mut skipped = 0usize;

        for (index, record) in records.iter().enumerate() {
            if let Some(max_depth) = options.max_depth {
                if record.level > max_depth {
                    skipped += 1;
                    continue;
                }
            }

            while let Some(top) = stack.last() {
                if top.level < record.level {
                    break;
                }
                Self::close_top(&mut stack, &mut roots);
            }

            stack.push(OutlineNode {
                id: ids.mint(),
                level: record.level,
                text: record.text.clone(),
                index,
                format: if options.include_format {
                    record.format_info.clone()
                } else {
                    None
                },
                children: Vec::new(),
                source_ref: record.source_ref.clone(),
            });
        }

        while !stack.is_empty() {
            Self::close_top(&mut stack, &mut roots);
        }

        let mut outline = DocumentOutline {
            nodes: roots,
            ..DocumentOutline::default()
        };
        let stats = compute_stats(flatten(&outline));
        outline.total_headings = stats.total_headings;
        outline.max_depth = stats.max_depth;
        outline.level_counts = stats.level_counts;

        debug!(
            "built outline: {} records, {} skipped by depth filter, {} nodes, max level {}",
            records.len(),
            skipped,
            outline.total_headings,
            outline.max_depth
        );

        outline
    }

    fn close_top(stack: &mut Vec<OutlineNode>, roots: &mut Vec<OutlineNode>) {
        if let Some(node) = stack.pop() {
            match stack.last_mut() {
                Some(parent) => parent.children.push(node),
                None => roots.push(node),
            }
        }
    }
}

pub fn build_outline(records: &[HeadingRecord], options: &BuildOptions) -> DocumentOutline {
    OutlineBuilder::build(records, options)
}
