use crate::error::Result;
use crate::{Container, Image, ImageAddress, RecordTree, TreeIndex, TreeState};

/// One opened container together with its tree and the interaction state.
///
/// Opening another container replaces the whole document.
/// Nothing of the previous tree, index or selection survives.
///
/// # Example
///
/// ```
/// # use ktx2_tree::{Container, Document, VkFormat};
/// let mut document = Document::open(Container::new(VkFormat::R8G8B8A8_SRGB).with_counts(0, 6, 1));
/// let (index, state) = document.parts_mut();
/// state.select_first(index);
/// assert_eq!(document.selected_image(), Ok(None));
///
/// document = Document::open(Container::new(VkFormat::BC7_UNORM_BLOCK));
/// assert_eq!(document.state().selected(), None);
/// ```
#[derive(Debug, Clone)]
pub struct Document {
    container: Container,
    index: TreeIndex,
    state: TreeState,
}

impl Document {
    #[must_use]
    pub fn open(container: Container) -> Self {
        let index = TreeIndex::new(RecordTree::build(&container));
        Self {
            container,
            index,
            state: TreeState::default(),
        }
    }

    #[must_use]
    pub const fn container(&self) -> &Container {
        &self.container
    }

    #[must_use]
    pub const fn index(&self) -> &TreeIndex {
        &self.index
    }

    #[must_use]
    pub const fn state(&self) -> &TreeState {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut TreeState {
        &mut self.state
    }

    /// The index for reading and the state for updating at the same time, as rendering needs it.
    pub fn parts_mut(&mut self) -> (&TreeIndex, &mut TreeState) {
        (&self.index, &mut self.state)
    }

    /// Address of the image the current selection denotes.
    #[must_use]
    pub fn selected_address(&self) -> Option<ImageAddress> {
        let selected = self.state.selected()?;
        crate::resolve(self.index.tree(), selected)
    }

    /// Payload of the image the current selection denotes.
    ///
    /// # Errors
    ///
    /// Errors when the container holds fewer payloads than its declared counts describe.
    pub fn selected_image(&self) -> Result<Option<&Image>> {
        match self.state.selected() {
            Some(selected) => crate::selected_image(&self.container, self.index.tree(), selected),
            None => Ok(None),
        }
    }
}

#[test]
fn nothing_selected_is_no_image() {
    let document = Document::open(crate::record::example_container());
    assert_eq!(document.selected_address(), None);
    assert_eq!(document.selected_image(), Ok(None));
}

#[test]
fn revealed_depth_slice_is_shown() {
    let mut document = Document::open(crate::record::example_container());
    let (index, state) = document.parts_mut();
    let images = index.child_at(crate::NodeId::ROOT, 19).unwrap();
    let depth = index.tree().descend(images, &[1, 1, 0, 0]);
    state.reveal(index, depth);
    assert_eq!(
        document.selected_address(),
        Some(ImageAddress::new(1, 1, 0, 0))
    );
    let image = document.selected_image().unwrap().unwrap();
    assert_eq!(image.pixel_width, 4);
}

#[test]
fn opening_replaces_the_state() {
    let mut document = Document::open(crate::record::example_container());
    let (index, state) = document.parts_mut();
    state.key_down(index);
    assert!(document.state().selected().is_some());
    document = Document::open(Container::default());
    assert_eq!(document.state().selected(), None);
    assert_eq!(document.index().tree().len(), RecordTree::build(&Container::default()).len());
}
