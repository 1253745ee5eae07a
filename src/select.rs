use crate::error::Result;
use crate::{Container, Image, ImageAddress, NodeId, NodeKind, RecordTree};

/// Map a selected node to the image slot it denotes.
///
/// Only depth slices below `images → level → layer → face` address an image.
/// Everything else (header fields, metadata, groups) resolves to `None`.
#[must_use]
pub fn resolve(tree: &RecordTree, selected: NodeId) -> Option<ImageAddress> {
    let path = tree.path_to(selected)?;
    let kinds = path
        .iter()
        .filter_map(|id| tree.node(*id))
        .map(crate::Node::kind)
        .collect::<Vec<_>>();
    let address = match kinds.as_slice() {
        [.., NodeKind::Images, NodeKind::Level(level), NodeKind::Layer(layer), NodeKind::Face(face), NodeKind::Depth(depth)] => {
            ImageAddress::new(*level, *layer, *face, *depth)
        }
        _ => {
            tracing::trace!(%selected, "selection does not address an image");
            return None;
        }
    };
    tracing::debug!(%selected, ?address, "selection addresses an image");
    Some(address)
}

/// Flat index into the image payloads of the selected depth slice.
///
/// # Example
///
/// ```
/// # use ktx2_tree::{Container, NodeId, RecordTree, TreeIndex, VkFormat};
/// // A cubemap with a single level and no array layers
/// let container = Container::new(VkFormat::R8G8B8A8_SRGB).with_counts(0, 6, 1);
/// let index = TreeIndex::new(RecordTree::build(&container));
/// let images = index.child_at(NodeId::ROOT, 19)?;
/// let level = index.child_at(images, 0)?;
/// let layer = index.child_at(level, 0)?;
/// let face = index.child_at(layer, 3)?;
/// let depth = index.child_at(face, 0)?;
/// assert_eq!(ktx2_tree::image_index(index.tree(), depth), Some(3));
/// # Ok::<(), ktx2_tree::Error>(())
/// ```
#[must_use]
pub fn image_index(tree: &RecordTree, selected: NodeId) -> Option<usize> {
    resolve(tree, selected).map(|address| address.flat_index(tree.dimensions()))
}

/// Fetch the payload of the selected depth slice.
///
/// Returns `Ok(None)` when the selection does not address an image.
///
/// # Errors
///
/// Errors when the container holds fewer payloads than its declared counts describe.
pub fn selected_image<'container>(
    container: &'container Container,
    tree: &RecordTree,
    selected: NodeId,
) -> Result<Option<&'container Image>> {
    image_index(tree, selected)
        .map(|index| container.image(index))
        .transpose()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Error, VkFormat};

    fn images(container: &Container) -> Vec<Image> {
        let count = crate::ImageDimensions::from_container(container).image_count();
        (0..count)
            .map(|index| Image::new(1, 1, vec![u8::try_from(index).unwrap()]))
            .collect()
    }

    fn depth_leaf(tree: &RecordTree, level: usize, layer: usize, face: usize, depth: usize) -> NodeId {
        let images = tree.top_level("images");
        tree.descend(images, &[level, layer, face, depth])
    }

    #[test]
    fn cubemap_face() {
        let container = Container::new(VkFormat::R8G8B8A8_SRGB)
            .with_size(16, 16, 0)
            .with_counts(0, 6, 1);
        let tree = RecordTree::build(&container);
        let selected = depth_leaf(&tree, 0, 0, 3, 0);
        assert_eq!(
            resolve(&tree, selected),
            Some(ImageAddress::new(0, 0, 3, 0))
        );
        assert_eq!(image_index(&tree, selected), Some(3));
    }

    #[test]
    fn array_layer_of_second_level() {
        let container = Container::new(VkFormat::R8G8B8A8_SRGB)
            .with_size(16, 16, 0)
            .with_counts(2, 1, 2);
        let tree = RecordTree::build(&container);
        assert_eq!(image_index(&tree, depth_leaf(&tree, 1, 1, 0, 0)), Some(3));
    }

    #[test]
    fn every_depth_leaf_gets_its_own_index() {
        let container = Container::new(VkFormat::R8G8B8A8_SRGB)
            .with_size(8, 8, 3)
            .with_counts(2, 1, 2);
        let tree = RecordTree::build(&container);
        let dimensions = *tree.dimensions();
        for (expected, address) in dimensions.addresses().enumerate() {
            let leaf = depth_leaf(&tree, address.level, address.layer, address.face, address.depth);
            assert_eq!(image_index(&tree, leaf), Some(expected));
        }
    }

    #[test]
    fn header_field_is_no_image() {
        let container = Container::new(VkFormat::R8G8B8A8_SRGB).with_size(16, 16, 0);
        let tree = RecordTree::build(&container);
        let width = tree.top_level("pixelWidth");
        assert_eq!(resolve(&tree, width), None);
        assert_eq!(selected_image(&container, &tree, width), Ok(None));
    }

    #[test]
    fn groups_are_no_image() {
        let container = crate::record::example_container();
        let tree = RecordTree::build(&container);
        let images = tree.top_level("images");
        for rows in [&[][..], &[0][..], &[0, 0][..], &[0, 0, 0][..]] {
            assert_eq!(resolve(&tree, tree.descend(images, rows)), None);
        }
        assert_eq!(resolve(&tree, NodeId::ROOT), None);
    }

    #[test]
    fn level_index_entry_is_no_image() {
        let container = crate::record::example_container();
        let tree = RecordTree::build(&container);
        let levels = tree.top_level("levels");
        let byte_length = tree.descend(levels, &[0, 1]);
        assert_eq!(resolve(&tree, byte_length), None);
    }

    #[test]
    fn foreign_node_is_no_image() {
        let tree = RecordTree::build(&Container::default());
        assert_eq!(resolve(&tree, NodeId::from_index(tree.len())), None);
    }

    #[test]
    fn selected_image_fetches_the_payload() {
        let container = Container::new(VkFormat::R8G8B8A8_SRGB).with_counts(0, 6, 1);
        let container = container.clone().with_images(images(&container));
        let tree = RecordTree::build(&container);
        let image = selected_image(&container, &tree, depth_leaf(&tree, 0, 0, 5, 0))
            .unwrap()
            .unwrap();
        assert_eq!(image.data, [5]);
    }

    #[test]
    fn missing_payload_is_surfaced() {
        let container = Container::new(VkFormat::R8G8B8A8_SRGB)
            .with_counts(0, 6, 1)
            .with_images(vec![Image::default(); 4]);
        let tree = RecordTree::build(&container);
        assert_eq!(
            selected_image(&container, &tree, depth_leaf(&tree, 0, 0, 5, 0)),
            Err(Error::ImageOutOfRange {
                index: 5,
                image_count: 4
            })
        );
    }
}
