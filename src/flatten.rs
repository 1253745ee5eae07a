use std::collections::HashSet;

use crate::{NodeId, TreeIndex};

/// A visible row of the tree.
#[must_use]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Flattened {
    pub node: NodeId,
    /// Zero based depth. Depth 0 means top level with 0 indentation.
    pub depth: usize,
    pub has_children: bool,
}

/// Get all visible (= below opened) rows in display order.
///
/// Only uses the row based operations of the [`TreeIndex`].
/// The children of the root are always visible, the root itself never is.
#[must_use]
pub fn flatten(index: &TreeIndex, opened: &HashSet<NodeId>) -> Vec<Flattened> {
    let mut result = Vec::new();
    flatten_into(index, opened, NodeId::ROOT, 0, &mut result);
    result
}

fn flatten_into(
    index: &TreeIndex,
    opened: &HashSet<NodeId>,
    parent: NodeId,
    depth: usize,
    result: &mut Vec<Flattened>,
) {
    for row in 0..index.child_count(parent) {
        let Ok(node) = index.child_at(parent, row) else {
            continue;
        };
        let has_children = index.child_count(node) > 0;
        result.push(Flattened {
            node,
            depth,
            has_children,
        });
        if has_children && opened.contains(&node) {
            flatten_into(index, opened, node, depth + 1, result);
        }
    }
}

#[cfg(test)]
fn example() -> TreeIndex {
    TreeIndex::new(crate::RecordTree::build(&crate::record::example_container()))
}

#[cfg(test)]
fn labels(index: &TreeIndex, opened: &HashSet<NodeId>) -> Vec<String> {
    flatten(index, opened)
        .into_iter()
        .map(|flattened| index.cell_value(flattened.node, 0).unwrap().into_owned())
        .collect()
}

#[test]
fn depth_works() {
    let index = example();
    let kv = index.child_at(NodeId::ROOT, 17).unwrap();
    let sgd = index.child_at(NodeId::ROOT, 18).unwrap();
    let opened = HashSet::from([kv, sgd]);
    let depths = flatten(&index, &opened)
        .into_iter()
        .map(|flattened| flattened.depth)
        .collect::<Vec<_>>();
    let mut expected = vec![0; 18];
    expected.extend([1, 1, 0, 1, 0]);
    assert_eq!(depths, expected);
}

#[test]
fn flatten_nothing_opened_is_top_level() {
    let index = example();
    let rows = labels(&index, &HashSet::new());
    assert_eq!(rows.len(), 20);
    assert_eq!(rows.last().map(String::as_str), Some("images"));
}

#[test]
fn flatten_opened_below_closed_is_hidden() {
    let index = example();
    let images = index.child_at(NodeId::ROOT, 19).unwrap();
    let level = index.child_at(images, 0).unwrap();
    let opened = HashSet::from([level]);
    assert_eq!(labels(&index, &opened).len(), 20);
}

#[test]
fn flatten_opened_image_path() {
    let index = example();
    let images = index.child_at(NodeId::ROOT, 19).unwrap();
    let level = index.child_at(images, 1).unwrap();
    let layer = index.child_at(level, 0).unwrap();
    let face = index.child_at(layer, 0).unwrap();
    let opened = HashSet::from([images, level, layer, face]);
    let rows = labels(&index, &opened);
    assert_eq!(
        rows[19..],
        ["images", "level", "level", "layer", "face", "depth", "layer"]
    );
}

#[test]
fn flatten_leaf_is_never_expanded() {
    let index = example();
    let width = index.child_at(NodeId::ROOT, 2).unwrap();
    let opened = HashSet::from([width]);
    let rows = flatten(&index, &opened);
    assert_eq!(rows.len(), 20);
    assert!(!rows[2].has_children);
}
