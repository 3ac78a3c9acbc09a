use outline_rs::core::index::OutlineIndex;
use outline_rs::{
    build_outline, compute_stats, flatten, from_json, to_json, to_markdown, BuildOptions, HeadingRecord,
    OutlineNode,
};
use proptest::prelude::*;
use std::collections::HashSet;

fn records_strategy() -> impl Strategy<Value = Vec<HeadingRecord>> {
    prop::collection::vec((-1i32..12, "[a-zA-Z0-9 ]{0,12}"), 0..60).prop_map(|items| {
        items
            .into_iter()
            .enumerate()
            .map(|(i, (level, text))| HeadingRecord::new(level, text).with_source_ref(format!("p{}", i)))
            .collect()
    })
}

/// Children sit strictly deeper than their parent; a later sibling is never deeper than an earlier one.
fn assert_nesting(nodes: &[OutlineNode]) {
    let mut levels: Vec<&[OutlineNode]> = vec![nodes];
    while let Some(siblings) = levels.pop() {
        for pair in siblings.windows(2) {
            assert!(pair[1].level <= pair[0].level);
        }
        for node in siblings {
            for child in &node.children {
                assert!(child.level > node.level, "{} nested under {}", child.level, node.level);
                assert!(child.index > node.index);
            }
            levels.push(&node.children);
        }
    }
}

proptest! {
    #[test]
    fn tree_and_flat_agree(records in records_strategy()) {
        let outline = build_outline(&records, &BuildOptions::default());
        prop_assert_eq!(compute_stats(flatten(&outline)), outline.stats());
        prop_assert_eq!(outline.total_headings, records.len());
    }

    #[test]
    fn preorder_matches_input_order(records in records_strategy()) {
        let outline = build_outline(&records, &BuildOptions::default());
        let indices: Vec<usize> = flatten(&outline).iter().map(|n| n.index).collect();
        let expected: Vec<usize> = (0..records.len()).collect();
        prop_assert_eq!(indices, expected);
        assert_nesting(&outline.nodes);
    }

    #[test]
    fn depth_filter_is_a_hard_filter(records in records_strategy(), k in 0i32..10) {
        let outline = build_outline(&records, &BuildOptions::default().with_max_depth(k));
        let flat = flatten(&outline);
        prop_assert!(flat.iter().all(|n| n.level <= k));
        prop_assert_eq!(outline.total_headings, records.iter().filter(|r| r.level <= k).count());
        prop_assert_eq!(compute_stats(flat), outline.stats());
    }

    #[test]
    fn ids_are_unique_and_fully_indexed(records in records_strategy()) {
        let outline = build_outline(&records, &BuildOptions::default());
        let ids: HashSet<&str> = flatten(&outline).iter().map(|n| n.id.as_str()).collect();
        prop_assert_eq!(ids.len(), records.len());

        let index = OutlineIndex::new(&outline);
        prop_assert_eq!(index.len(), ids.len());
        for id in &ids {
            prop_assert!(index.resolve(id).is_ok());
        }
        prop_assert!(index.ids().all(|id| ids.contains(id)));

        let other = build_outline(&records, &BuildOptions::default());
        for node in flatten(&other) {
            prop_assert!(index.resolve(&node.id).is_err());
        }
    }

    #[test]
    fn exports_are_deterministic(records in records_strategy()) {
        let outline = build_outline(&records, &BuildOptions::default());
        prop_assert_eq!(to_markdown(&outline), to_markdown(&outline));
        let json = to_json(&outline).unwrap();
        prop_assert_eq!(&json, &to_json(&outline).unwrap());
        prop_assert_eq!(from_json(&json).unwrap(), outline.clone());

        let lines = to_markdown(&outline);
        let line_count = if records.is_empty() { 0 } else { lines.split('\n').count() };
        prop_assert_eq!(line_count, records.len());
    }
}

#[test]
fn markdown_for_single_h2() {
    let outline = build_outline(&[HeadingRecord::new(2, "Intro")], &BuildOptions::default());
    assert_eq!(to_markdown(&outline), "## Intro");
}

#[test]
fn sibling_closing() {
    let records = vec![
        HeadingRecord::new(1, "A"),
        HeadingRecord::new(2, "B"),
        HeadingRecord::new(1, "C"),
    ];
    let outline = build_outline(&records, &BuildOptions::default());
    assert_eq!(outline.nodes.len(), 2);
    assert_eq!(outline.nodes[0].children[0].text, "B");
    assert!(outline.nodes[1].children.is_empty());
}
