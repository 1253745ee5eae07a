use crate::Container;

/// Counts are allowed to be zero in the header, meaning a single implicit instance.
fn normalized(count: u32) -> usize {
    usize::try_from(count).unwrap_or(usize::MAX).max(1)
}

/// The four dimensions of the flattened image array, each at least 1.
///
/// Both the record tree and the selection resolver get their loop bounds from here,
/// so the slots shown in the tree always match the flat index arithmetic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ImageDimensions {
    pub level_count: usize,
    pub layer_count: usize,
    pub face_count: usize,
    pub depth_count: usize,
}

impl ImageDimensions {
    #[must_use]
    pub fn from_container(container: &Container) -> Self {
        Self {
            level_count: normalized(container.level_count),
            layer_count: normalized(container.layer_count),
            face_count: normalized(container.face_count),
            depth_count: normalized(container.pixel_depth),
        }
    }

    /// Amount of images the declared counts describe.
    #[must_use]
    pub const fn image_count(&self) -> usize {
        self.level_count.saturating_mul(self.images_per_level())
    }

    const fn images_per_level(&self) -> usize {
        self.layer_count
            .saturating_mul(self.face_count)
            .saturating_mul(self.depth_count)
    }

    /// Inverse of [`ImageAddress::flat_index`].
    ///
    /// Returns `None` when the index is beyond [`image_count`](Self::image_count).
    #[must_use]
    pub const fn address_of(&self, index: usize) -> Option<ImageAddress> {
        if index >= self.image_count() {
            return None;
        }
        let depth = index % self.depth_count;
        let rest = index / self.depth_count;
        let face = rest % self.face_count;
        let rest = rest / self.face_count;
        let layer = rest % self.layer_count;
        let level = rest / self.layer_count;
        Some(ImageAddress {
            level,
            layer,
            face,
            depth,
        })
    }

    /// All addresses in flat index order.
    pub fn addresses(&self) -> impl Iterator<Item = ImageAddress> + '_ {
        (0..self.image_count()).filter_map(|index| self.address_of(index))
    }
}

/// Coordinate of one image inside the container.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ImageAddress {
    pub level: usize,
    pub layer: usize,
    pub face: usize,
    pub depth: usize,
}

impl ImageAddress {
    #[must_use]
    pub const fn new(level: usize, layer: usize, face: usize, depth: usize) -> Self {
        Self {
            level,
            layer,
            face,
            depth,
        }
    }

    /// Position of the image in the flattened image array.
    ///
    /// Mixed radix with the level as the most significant digit.
    ///
    /// ```
    /// # use ktx2_tree::{ImageAddress, ImageDimensions};
    /// let cubemap = ImageDimensions { level_count: 1, layer_count: 1, face_count: 6, depth_count: 1 };
    /// assert_eq!(ImageAddress::new(0, 0, 3, 0).flat_index(&cubemap), 3);
    /// ```
    #[must_use]
    pub const fn flat_index(&self, dimensions: &ImageDimensions) -> usize {
        let ImageDimensions {
            layer_count,
            face_count,
            depth_count,
            ..
        } = *dimensions;
        self.level * (layer_count * face_count * depth_count)
            + self.layer * (face_count * depth_count)
            + self.face * depth_count
            + self.depth
    }
}

#[cfg(test)]
fn dimensions(levels: usize, layers: usize, faces: usize, depths: usize) -> ImageDimensions {
    ImageDimensions {
        level_count: levels,
        layer_count: layers,
        face_count: faces,
        depth_count: depths,
    }
}

#[test]
fn zero_counts_are_normalized() {
    let container = Container::default();
    assert_eq!(
        ImageDimensions::from_container(&container),
        dimensions(1, 1, 1, 1)
    );
}

#[test]
fn pixel_depth_is_the_depth_count() {
    let container = Container::default().with_size(4, 4, 8).with_counts(2, 1, 3);
    assert_eq!(
        ImageDimensions::from_container(&container),
        dimensions(3, 2, 1, 8)
    );
}

#[test]
fn array_layer_index() {
    let dimensions = dimensions(2, 2, 1, 1);
    assert_eq!(ImageAddress::new(1, 1, 0, 0).flat_index(&dimensions), 3);
}

#[test]
fn flat_index_is_a_bijection() {
    let dimensions = dimensions(3, 2, 6, 4);
    let mut seen = vec![false; dimensions.image_count()];
    for level in 0..dimensions.level_count {
        for layer in 0..dimensions.layer_count {
            for face in 0..dimensions.face_count {
                for depth in 0..dimensions.depth_count {
                    let address = ImageAddress::new(level, layer, face, depth);
                    let index = address.flat_index(&dimensions);
                    assert!(!seen[index], "index {index} produced twice");
                    seen[index] = true;
                    assert_eq!(dimensions.address_of(index), Some(address));
                }
            }
        }
    }
    assert!(seen.into_iter().all(|seen| seen));
}

#[test]
fn addresses_are_in_flat_order() {
    let dimensions = dimensions(2, 1, 6, 1);
    let indices = dimensions
        .addresses()
        .map(|address| address.flat_index(&dimensions))
        .collect::<Vec<_>>();
    assert_eq!(indices, (0..12).collect::<Vec<_>>());
}

#[test]
fn address_beyond_count_is_none() {
    assert_eq!(dimensions(1, 1, 6, 1).address_of(6), None);
}
