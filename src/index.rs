use std::borrow::Cow;

use crate::error::{Error, Result};
use crate::{NodeId, RecordTree};

/// Row and column access to a [`RecordTree`] for display surfaces.
///
/// On creation the tree is walked once to remember the parent and row of every node.
/// Afterwards every operation is a lookup.
///
/// # Example
///
/// ```
/// # use ktx2_tree::{Container, NodeId, RecordTree, TreeIndex, VkFormat};
/// let index = TreeIndex::new(RecordTree::build(&Container::new(VkFormat::R8G8B8A8_UNORM)));
/// let width = index.child_at(NodeId::ROOT, 2)?;
/// assert_eq!(index.cell_value(width, 0).as_deref(), Some("pixelWidth"));
/// assert_eq!(index.parent_of(width), Some((2, NodeId::ROOT)));
/// # Ok::<(), ktx2_tree::Error>(())
/// ```
#[derive(Debug, Clone)]
pub struct TreeIndex {
    tree: RecordTree,
    /// Row and parent of every node, indexed by [`NodeId::index`]. `None` for the root.
    parents: Vec<Option<(usize, NodeId)>>,
}

impl TreeIndex {
    /// Name and value.
    pub const COLUMNS: usize = 2;

    #[must_use]
    pub fn new(tree: RecordTree) -> Self {
        let mut parents = vec![None; tree.len()];
        let mut stack = vec![NodeId::ROOT];
        while let Some(parent) = stack.pop() {
            let Some(node) = tree.node(parent) else {
                continue;
            };
            for (row, &child) in node.children().iter().enumerate() {
                parents[child.index()] = Some((row, parent));
            }
            // Reversed to visit the children in row order
            stack.extend(node.children().iter().rev());
        }
        Self { tree, parents }
    }

    #[must_use]
    pub const fn tree(&self) -> &RecordTree {
        &self.tree
    }

    /// Amount of children of the node, 0 for leaves and unknown nodes.
    #[must_use]
    pub fn child_count(&self, node: NodeId) -> usize {
        self.tree
            .node(node)
            .map_or(0, |node| node.children().len())
    }

    #[must_use]
    pub const fn column_count(&self) -> usize {
        Self::COLUMNS
    }

    /// Column 0 is the label, column 1 the value.
    ///
    /// The root has no cells.
    #[must_use]
    pub fn cell_value(&self, node: NodeId, column: usize) -> Option<Cow<'_, str>> {
        if node == NodeId::ROOT {
            return None;
        }
        let node = self.tree.node(node)?;
        match column {
            0 => Some(Cow::Borrowed(node.label())),
            1 => Some(Cow::Owned(node.value().to_string())),
            _ => None,
        }
    }

    /// Get the child at the given row.
    ///
    /// # Errors
    ///
    /// Errors when `row` is not below [`child_count`](Self::child_count) or the parent is not part of this tree.
    pub fn child_at(&self, parent: NodeId, row: usize) -> Result<NodeId> {
        let node = self.tree.node(parent).ok_or(Error::UnknownNode(parent))?;
        node.children()
            .get(row)
            .copied()
            .ok_or(Error::RowOutOfRange {
                row,
                child_count: node.children().len(),
            })
    }

    /// Row within the parent and the parent itself.
    ///
    /// Returns `None` for the root which has no parent.
    #[must_use]
    pub fn parent_of(&self, node: NodeId) -> Option<(usize, NodeId)> {
        self.parents.get(node.index()).copied().flatten()
    }
}

#[cfg(test)]
fn example() -> TreeIndex {
    TreeIndex::new(RecordTree::build(&crate::record::example_container()))
}

#[cfg(test)]
fn all_nodes(index: &TreeIndex) -> Vec<NodeId> {
    let mut result = Vec::new();
    let mut stack = vec![NodeId::ROOT];
    while let Some(node) = stack.pop() {
        result.push(node);
        for row in 0..index.child_count(node) {
            stack.push(index.child_at(node, row).unwrap());
        }
    }
    result
}

#[test]
fn parent_of_round_trips_with_child_at() {
    let index = example();
    let nodes = all_nodes(&index);
    assert_eq!(nodes.len(), index.tree().len());
    for node in nodes.into_iter().filter(|node| *node != NodeId::ROOT) {
        let (row, parent) = index.parent_of(node).expect("non root nodes have a parent");
        assert_eq!(index.child_at(parent, row), Ok(node));
    }
}

#[test]
fn root_has_no_parent_and_no_cells() {
    let index = example();
    assert_eq!(index.parent_of(NodeId::ROOT), None);
    assert_eq!(index.cell_value(NodeId::ROOT, 0), None);
    assert_eq!(index.cell_value(NodeId::ROOT, 1), None);
}

#[test]
fn root_children_count() {
    let index = example();
    assert_eq!(index.child_count(NodeId::ROOT), 20);
    assert_eq!(index.column_count(), 2);
}

#[test]
fn identical_siblings_have_distinct_parents() {
    let index = example();
    let images = index.child_at(NodeId::ROOT, 19).unwrap();
    let first_depth = index.tree().descend(images, &[0, 0, 0, 0]);
    let second_depth = index.tree().descend(images, &[0, 1, 0, 0]);
    assert_eq!(index.cell_value(first_depth, 0), index.cell_value(second_depth, 0));
    assert_eq!(index.cell_value(first_depth, 1), index.cell_value(second_depth, 1));
    assert_ne!(first_depth, second_depth);
    assert_ne!(index.parent_of(first_depth), index.parent_of(second_depth));
}

#[test]
fn cells() {
    let index = example();
    let scheme = index.child_at(NodeId::ROOT, 8).unwrap();
    assert_eq!(
        index.cell_value(scheme, 0).as_deref(),
        Some("supercompressionScheme")
    );
    assert_eq!(index.cell_value(scheme, 1).as_deref(), Some("Zstandard"));
    assert_eq!(index.cell_value(scheme, 2), None);
}

#[test]
fn child_at_out_of_range() {
    let index = example();
    assert_eq!(
        index.child_at(NodeId::ROOT, 20),
        Err(Error::RowOutOfRange {
            row: 20,
            child_count: 20
        })
    );
    let width = index.child_at(NodeId::ROOT, 2).unwrap();
    assert_eq!(index.child_count(width), 0);
    assert!(index.child_at(width, 0).is_err());
}

#[test]
#[should_panic = "RowOutOfRange"]
fn child_at_beyond_count_is_not_tolerated() {
    let index = example();
    index.child_at(NodeId::ROOT, 100).unwrap();
}

#[test]
fn unknown_node() {
    let index = example();
    let foreign = NodeId::from_index(index.tree().len());
    assert_eq!(index.child_count(foreign), 0);
    assert_eq!(index.cell_value(foreign, 0), None);
    assert_eq!(index.parent_of(foreign), None);
    assert_eq!(index.child_at(foreign, 0), Err(Error::UnknownNode(foreign)));
}
