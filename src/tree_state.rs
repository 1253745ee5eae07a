use std::collections::HashSet;

use crate::flatten::{flatten, Flattened};
use crate::{NodeId, TreeIndex};

/// Keeps the state of what is currently selected and what was opened in a [`RecordTreeView`](crate::RecordTreeView).
///
/// Nodes are referenced by their [`NodeId`] so the state belongs to one [`TreeIndex`].
/// When another container is opened the state has to be replaced too.
///
/// # Example
///
/// ```
/// # use ktx2_tree::TreeState;
/// let mut state = TreeState::default();
/// assert_eq!(state.selected(), None);
/// ```
#[derive(Debug, Default, Clone)]
pub struct TreeState {
    pub(super) offset: usize,
    pub(super) opened: HashSet<NodeId>,
    pub(super) selected: Option<NodeId>,
    pub(super) ensure_selected_in_view_on_next_render: bool,
}

impl TreeState {
    #[must_use]
    pub const fn get_offset(&self) -> usize {
        self.offset
    }

    /// All opened nodes in creation order.
    #[must_use]
    pub fn get_all_opened(&self) -> Vec<NodeId> {
        let mut opened = self.opened.iter().copied().collect::<Vec<_>>();
        opened.sort_unstable();
        opened
    }

    /// Get a flat list of all visible (= below open) rows with this `TreeState`.
    #[must_use]
    pub fn flatten(&self, index: &TreeIndex) -> Vec<Flattened> {
        flatten(index, &self.opened)
    }

    #[must_use]
    pub const fn selected(&self) -> Option<NodeId> {
        self.selected
    }

    /// Selects the given node.
    ///
    /// Returns `true` when the selection changed.
    ///
    /// Clear the selection by passing `None`:
    ///
    /// ```rust
    /// # use ktx2_tree::TreeState;
    /// # let mut state = TreeState::default();
    /// state.select(None);
    /// ```
    pub fn select(&mut self, node: Option<NodeId>) -> bool {
        self.ensure_selected_in_view_on_next_render = true;
        let changed = self.selected != node;
        self.selected = node;
        changed
    }

    /// Open a tree node.
    /// Returns `true` if the node was closed and has been opened.
    /// Returns `false` if the node was already open.
    pub fn open(&mut self, node: NodeId) -> bool {
        if node == NodeId::ROOT {
            false
        } else {
            self.opened.insert(node)
        }
    }

    /// Close a tree node.
    /// Returns `true` if the node was open and has been closed.
    /// Returns `false` if the node was already closed.
    pub fn close(&mut self, node: NodeId) -> bool {
        self.opened.remove(&node)
    }

    /// Toggles a tree node.
    /// If the node is in opened then it calls [`close`](Self::close). Otherwise it calls [`open`](Self::open).
    ///
    /// Returns `true` when a node is opened / closed.
    /// As toggle always changes something, this only returns `false` for the root.
    pub fn toggle(&mut self, node: NodeId) -> bool {
        if self.opened.contains(&node) {
            self.close(node)
        } else {
            self.open(node)
        }
    }

    /// Toggles the currently selected tree node.
    /// See also [`toggle`](Self::toggle)
    ///
    /// Returns `true` when a node is opened / closed.
    /// As toggle always changes something, this only returns `false` when nothing is selected.
    pub fn toggle_selected(&mut self) -> bool {
        self.ensure_selected_in_view_on_next_render = true;
        self.selected.is_some_and(|selected| self.toggle(selected))
    }

    /// Closes all open nodes.
    ///
    /// Returns `true` when any node was closed.
    pub fn close_all(&mut self) -> bool {
        if self.opened.is_empty() {
            false
        } else {
            self.opened.clear();
            true
        }
    }

    /// Open all ancestors of the node and select it.
    ///
    /// Returns `true` when the selection changed.
    pub fn reveal(&mut self, index: &TreeIndex, node: NodeId) -> bool {
        let mut current = node;
        while let Some((_, parent)) = index.parent_of(current) {
            self.open(parent);
            current = parent;
        }
        self.select(Some(node))
    }

    /// Select the first node.
    ///
    /// Returns `true` when the selection changed.
    pub fn select_first(&mut self, index: &TreeIndex) -> bool {
        self.select(index.child_at(NodeId::ROOT, 0).ok())
    }

    /// Select the last visible node.
    ///
    /// Returns `true` when the selection changed.
    pub fn select_last(&mut self, index: &TreeIndex) -> bool {
        let visible = self.flatten(index);
        let new_node = visible.last().map(|flattened| flattened.node);
        self.select(new_node)
    }

    /// Select the node visible on the given index.
    ///
    /// Returns `true` when the selection changed.
    ///
    /// This can be useful for mouse clicks.
    pub fn select_visible_index(&mut self, index: &TreeIndex, new_index: usize) -> bool {
        let visible = self.flatten(index);
        let new_index = new_index.min(visible.len().saturating_sub(1));
        let new_node = visible.get(new_index).map(|flattened| flattened.node);
        self.select(new_node)
    }

    /// Move the current selection with the direction/amount by the given function.
    ///
    /// Returns `true` when the selection changed.
    ///
    /// For examples take a look into the source code of [`key_up`](Self::key_up) or [`key_down`](Self::key_down).
    /// They are implemented with this method.
    pub fn select_visible_relative<F>(&mut self, index: &TreeIndex, change_function: F) -> bool
    where
        F: FnOnce(Option<usize>) -> usize,
    {
        let visible = self.flatten(index);
        let current_index = visible
            .iter()
            .position(|flattened| Some(flattened.node) == self.selected);
        let new_index = change_function(current_index).min(visible.len().saturating_sub(1));
        let new_node = visible.get(new_index).map(|flattened| flattened.node);
        self.select(new_node)
    }

    /// Ensure the selected node is visible on next render
    pub fn scroll_selected_into_view(&mut self) {
        self.ensure_selected_in_view_on_next_render = true;
    }

    /// Scroll the specified amount of lines up
    ///
    /// Returns `true` when the scroll position changed.
    /// Returns `false` when the scrolling has reached the top.
    pub fn scroll_up(&mut self, lines: usize) -> bool {
        let before = self.offset;
        self.offset = self.offset.saturating_sub(lines);
        before != self.offset
    }

    /// Scroll the specified amount of lines down
    ///
    /// In contrast to [`scroll_up()`](Self::scroll_up) this can not return whether the view position changed or not as the actual change is determined on render.
    /// Always returns `true`.
    pub fn scroll_down(&mut self, lines: usize) -> bool {
        self.offset = self.offset.saturating_add(lines);
        true
    }

    /// Handles the up arrow key.
    /// Moves up in the current depth or to its parent.
    ///
    /// Returns `true` when the selection changed.
    pub fn key_up(&mut self, index: &TreeIndex) -> bool {
        self.select_visible_relative(index, |current| {
            current.map_or(usize::MAX, |current| current.saturating_sub(1))
        })
    }

    /// Handles the down arrow key.
    /// Moves down in the current depth or into a child node.
    ///
    /// Returns `true` when the selection changed.
    pub fn key_down(&mut self, index: &TreeIndex) -> bool {
        self.select_visible_relative(index, |current| {
            current.map_or(0, |current| current.saturating_add(1))
        })
    }

    /// Handles the left arrow key.
    /// Closes the currently selected or moves to its parent.
    ///
    /// Returns `true` when the selection or the open state changed.
    pub fn key_left(&mut self, index: &TreeIndex) -> bool {
        self.ensure_selected_in_view_on_next_render = true;
        let Some(selected) = self.selected else {
            return false;
        };
        if self.opened.remove(&selected) {
            return true;
        }
        match index.parent_of(selected) {
            Some((_, parent)) if parent != NodeId::ROOT => self.select(Some(parent)),
            _ => false,
        }
    }

    /// Handles the right arrow key.
    /// Opens the currently selected.
    ///
    /// Returns `true` if the node was closed and has been opened.
    /// Returns `false` if the node was already open or has no children.
    pub fn key_right(&mut self, index: &TreeIndex) -> bool {
        self.ensure_selected_in_view_on_next_render = true;
        match self.selected {
            Some(selected) if index.child_count(selected) > 0 => self.open(selected),
            _ => false,
        }
    }
}

#[cfg(test)]
fn example() -> TreeIndex {
    TreeIndex::new(crate::RecordTree::build(&crate::record::example_container()))
}

#[test]
fn key_down_starts_at_the_top() {
    let index = example();
    let mut state = TreeState::default();
    assert!(state.key_down(&index));
    assert_eq!(state.selected(), index.child_at(NodeId::ROOT, 0).ok());
}

#[test]
fn key_up_without_selection_selects_last() {
    let index = example();
    let mut state = TreeState::default();
    assert!(state.key_up(&index));
    assert_eq!(state.selected(), index.child_at(NodeId::ROOT, 19).ok());
}

#[test]
fn key_right_then_down_enters_the_group() {
    let index = example();
    let kv = index.child_at(NodeId::ROOT, 17).unwrap();
    let mut state = TreeState::default();
    state.select(Some(kv));
    assert!(state.key_right(&index));
    assert!(state.key_down(&index));
    assert_eq!(state.selected(), index.child_at(kv, 0).ok());
}

#[test]
fn key_right_on_leaf_does_nothing() {
    let index = example();
    let mut state = TreeState::default();
    state.select_first(&index);
    assert!(!state.key_right(&index));
    assert!(state.get_all_opened().is_empty());
}

#[test]
fn key_left_closes_then_moves_to_parent() {
    let index = example();
    let images = index.child_at(NodeId::ROOT, 19).unwrap();
    let level = index.child_at(images, 1).unwrap();
    let mut state = TreeState::default();
    state.open(images);
    state.open(level);
    state.select(Some(level));

    assert!(state.key_left(&index));
    assert_eq!(state.get_all_opened(), [images]);
    assert_eq!(state.selected(), Some(level));

    assert!(state.key_left(&index));
    assert_eq!(state.selected(), Some(images));

    assert!(state.key_left(&index));
    assert!(!state.key_left(&index));
    assert_eq!(state.selected(), Some(images));
}

#[test]
fn reveal_opens_all_ancestors() {
    let index = example();
    let images = index.child_at(NodeId::ROOT, 19).unwrap();
    let level = index.child_at(images, 1).unwrap();
    let layer = index.child_at(level, 1).unwrap();
    let face = index.child_at(layer, 0).unwrap();
    let depth = index.child_at(face, 0).unwrap();
    let mut state = TreeState::default();
    assert!(state.reveal(&index, depth));
    assert_eq!(state.get_all_opened(), [images, level, layer, face]);
    let visible = state.flatten(&index);
    assert!(visible.iter().any(|flattened| flattened.node == depth));
}

#[test]
fn toggle_selected_without_selection() {
    let mut state = TreeState::default();
    assert!(!state.toggle_selected());
}

#[test]
fn root_can_not_be_opened() {
    let mut state = TreeState::default();
    assert!(!state.open(NodeId::ROOT));
    assert!(!state.toggle(NodeId::ROOT));
}

#[test]
fn select_visible_index_is_clamped() {
    let index = example();
    let mut state = TreeState::default();
    state.select_visible_index(&index, 1000);
    assert_eq!(state.selected(), index.child_at(NodeId::ROOT, 19).ok());
}

#[test]
fn scroll() {
    let mut state = TreeState::default();
    assert!(!state.scroll_up(1));
    assert!(state.scroll_down(3));
    assert!(state.scroll_up(1));
    assert_eq!(state.get_offset(), 2);
}
