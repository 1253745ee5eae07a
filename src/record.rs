use std::borrow::Cow;
use std::fmt;

use crate::{Container, ImageDimensions};

/// Position of a [`Node`] inside its [`RecordTree`].
///
/// Two nodes with the same label and value are still different nodes.
/// Ids are only meaningful for the tree which created them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    pub const ROOT: Self = Self(0);

    #[must_use]
    pub const fn index(self) -> usize {
        self.0
    }

    #[cfg(test)]
    pub(crate) const fn from_index(index: usize) -> Self {
        Self(index)
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Printable value of a [`Node`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Value {
    Empty,
    Integer(u64),
    Text(String),
    /// Group marker holding the amount of entries below.
    Count(usize),
    /// Size of an opaque block.
    Bytes(u64),
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => Ok(()),
            Self::Integer(value) => write!(f, "{value}"),
            Self::Text(text) => f.write_str(text),
            Self::Count(count) => write!(f, "[{count}]"),
            Self::Bytes(1) => f.write_str("1 byte"),
            Self::Bytes(length) => write!(f, "{length} bytes"),
        }
    }
}

/// What a [`Node`] stands for in the container.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Root,
    HeaderField,
    LevelIndexTable,
    LevelIndexEntry(usize),
    LevelIndexField,
    DataFormatDescriptor,
    KeyValueTable,
    KeyValueEntry,
    SupercompressionGlobalData,
    SupercompressionField,
    Images,
    Level(usize),
    Layer(usize),
    Face(usize),
    Depth(usize),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    label: Cow<'static, str>,
    value: Value,
    kind: NodeKind,
    children: Vec<NodeId>,
}

impl Node {
    #[must_use]
    pub fn label(&self) -> &str {
        &self.label
    }

    #[must_use]
    pub const fn value(&self) -> &Value {
        &self.value
    }

    #[must_use]
    pub const fn kind(&self) -> NodeKind {
        self.kind
    }

    #[must_use]
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }
}

/// Immutable tree describing one [`Container`].
///
/// All nodes live in one arena and reference their children by [`NodeId`].
/// The tree is built once per opened container and never changes afterwards.
///
/// # Example
///
/// ```
/// # use ktx2_tree::{Container, NodeId, RecordTree, VkFormat};
/// let tree = RecordTree::build(&Container::new(VkFormat::R8G8B8A8_UNORM));
/// let first = tree.node(tree.root().children()[0]).unwrap();
/// assert_eq!(first.label(), "vkFormat");
/// assert_eq!(first.value().to_string(), "VK_FORMAT_R8G8B8A8_UNORM");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordTree {
    nodes: Vec<Node>,
    dimensions: ImageDimensions,
}

impl RecordTree {
    #[must_use]
    pub fn build(container: &Container) -> Self {
        let dimensions = ImageDimensions::from_container(container);
        let mut builder = Builder::default();

        let header = [
            ("vkFormat", Value::Text(container.vk_format.to_string())),
            ("typeSize", u32_value(container.type_size)),
            ("pixelWidth", u32_value(container.pixel_width)),
            ("pixelHeight", u32_value(container.pixel_height)),
            ("pixelDepth", u32_value(container.pixel_depth)),
            ("layerCount", u32_value(container.layer_count)),
            ("faceCount", u32_value(container.face_count)),
            ("levelCount", u32_value(container.level_count)),
            (
                "supercompressionScheme",
                Value::Text(container.supercompression_scheme.to_string()),
            ),
            ("dfdByteOffset", Value::Integer(container.dfd.byte_offset)),
            ("dfdByteLength", Value::Integer(container.dfd.byte_length)),
            ("kvdByteOffset", Value::Integer(container.kvd.byte_offset)),
            ("kvdByteLength", Value::Integer(container.kvd.byte_length)),
            ("sgdByteOffset", Value::Integer(container.sgd.byte_offset)),
            ("sgdByteLength", Value::Integer(container.sgd.byte_length)),
        ];
        for (label, value) in header {
            builder.push(NodeId::ROOT, label, value, NodeKind::HeaderField);
        }

        let levels = builder.push(
            NodeId::ROOT,
            "levels",
            Value::Count(container.levels.len()),
            NodeKind::LevelIndexTable,
        );
        for (index, level) in container.levels.iter().enumerate() {
            let entry = builder.push(
                levels,
                "level",
                usize_value(index),
                NodeKind::LevelIndexEntry(index),
            );
            let fields = [
                ("byteOffset", level.byte_offset),
                ("byteLength", level.byte_length),
                ("uncompressedByteLength", level.uncompressed_byte_length),
            ];
            for (label, value) in fields {
                builder.push(entry, label, Value::Integer(value), NodeKind::LevelIndexField);
            }
        }

        builder.push(
            NodeId::ROOT,
            "dfd",
            Value::Bytes(container.dfd.byte_length),
            NodeKind::DataFormatDescriptor,
        );

        let key_values = builder.push(
            NodeId::ROOT,
            "kv",
            Value::Count(container.key_values.len()),
            NodeKind::KeyValueTable,
        );
        for (key, value) in &container.key_values {
            builder.push(
                key_values,
                key.clone(),
                Value::Text(value.to_string()),
                NodeKind::KeyValueEntry,
            );
        }

        let sgd = builder.push(
            NodeId::ROOT,
            "sgd",
            Value::Empty,
            NodeKind::SupercompressionGlobalData,
        );
        builder.push(
            sgd,
            "byteLength",
            Value::Bytes(container.sgd.byte_length),
            NodeKind::SupercompressionField,
        );

        let images = builder.push(
            NodeId::ROOT,
            "images",
            Value::Count(dimensions.level_count),
            NodeKind::Images,
        );
        for level in 0..dimensions.level_count {
            let level_node =
                builder.push(images, "level", usize_value(level), NodeKind::Level(level));
            for layer in 0..dimensions.layer_count {
                let layer_node =
                    builder.push(level_node, "layer", usize_value(layer), NodeKind::Layer(layer));
                for face in 0..dimensions.face_count {
                    let face_node =
                        builder.push(layer_node, "face", usize_value(face), NodeKind::Face(face));
                    for depth in 0..dimensions.depth_count {
                        builder.push(
                            face_node,
                            "depth",
                            usize_value(depth),
                            NodeKind::Depth(depth),
                        );
                    }
                }
            }
        }

        if container.images.len() != dimensions.image_count() {
            tracing::warn!(
                declared = dimensions.image_count(),
                actual = container.images.len(),
                "image count does not match the declared dimensions"
            );
        }

        let tree = Self {
            nodes: builder.nodes,
            dimensions,
        };
        tracing::debug!(nodes = tree.len(), ?dimensions, "built record tree");
        tree
    }

    #[must_use]
    pub fn root(&self) -> &Node {
        &self.nodes[NodeId::ROOT.0]
    }

    #[must_use]
    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0)
    }

    /// Amount of nodes including the root.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Always `false` as there is at least the root.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    #[must_use]
    pub const fn dimensions(&self) -> &ImageDimensions {
        &self.dimensions
    }

    /// Ids of all nodes from the root down to `target`, both included.
    ///
    /// Searches the tree depth first.
    /// This is only done on user interaction so the search is not cached.
    /// Returns `None` when `target` is not part of this tree.
    #[must_use]
    pub fn path_to(&self, target: NodeId) -> Option<Vec<NodeId>> {
        let mut path = Vec::new();
        self.search(NodeId::ROOT, target, &mut path).then_some(path)
    }

    fn search(&self, current: NodeId, target: NodeId, path: &mut Vec<NodeId>) -> bool {
        path.push(current);
        if current == target {
            return true;
        }
        for &child in &self.nodes[current.0].children {
            if self.search(child, target, path) {
                return true;
            }
        }
        path.pop();
        false
    }
}

fn u32_value(value: u32) -> Value {
    Value::Integer(u64::from(value))
}

fn usize_value(value: usize) -> Value {
    Value::Integer(u64::try_from(value).unwrap_or(u64::MAX))
}

/// Assigns ids in creation order, the root being the first one.
struct Builder {
    nodes: Vec<Node>,
}

impl Default for Builder {
    fn default() -> Self {
        Self {
            nodes: vec![Node {
                label: Cow::Borrowed(""),
                value: Value::Empty,
                kind: NodeKind::Root,
                children: Vec::new(),
            }],
        }
    }
}

impl Builder {
    fn push<L>(&mut self, parent: NodeId, label: L, value: Value, kind: NodeKind) -> NodeId
    where
        L: Into<Cow<'static, str>>,
    {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            label: label.into(),
            value,
            kind,
            children: Vec::new(),
        });
        self.nodes[parent.0].children.push(id);
        id
    }
}

#[cfg(test)]
impl RecordTree {
    /// Labels of the children of the node.
    pub(crate) fn child_labels(&self, id: NodeId) -> Vec<&str> {
        self.nodes[id.0]
            .children
            .iter()
            .map(|child| self.nodes[child.0].label())
            .collect()
    }

    /// Child of the root with the given label.
    pub(crate) fn top_level(&self, label: &str) -> NodeId {
        *self
            .root()
            .children()
            .iter()
            .find(|child| self.nodes[child.0].label() == label)
            .expect("top level label should exist")
    }

    /// Follow the rows from the node downwards.
    pub(crate) fn descend(&self, from: NodeId, rows: &[usize]) -> NodeId {
        rows.iter()
            .fold(from, |current, &row| self.nodes[current.0].children[row])
    }
}

#[cfg(test)]
pub(crate) fn example_container() -> Container {
    use crate::{ByteRange, Image, LevelIndex, MetadataValue, SupercompressionScheme, VkFormat};

    Container::new(VkFormat::R8G8B8A8_SRGB)
        .with_size(4, 4, 0)
        .with_counts(2, 0, 2)
        .with_supercompression(SupercompressionScheme::Zstandard)
        .with_blocks(
            ByteRange::new(104, 44),
            ByteRange::new(148, 52),
            ByteRange::new(0, 0),
        )
        .with_levels(vec![
            LevelIndex {
                byte_offset: 208,
                byte_length: 128,
                uncompressed_byte_length: 128,
            },
            LevelIndex {
                byte_offset: 336,
                byte_length: 32,
                uncompressed_byte_length: 32,
            },
        ])
        .with_key_value("KTXorientation", MetadataValue::from_bytes(b"rd\0"))
        .with_key_value("KTXwriter", MetadataValue::from_bytes(b"toktx v4.3\0"))
        .with_images((0..4).map(|_| Image::new(4, 4, vec![0; 64])).collect())
}

#[test]
fn top_level_order() {
    let tree = RecordTree::build(&example_container());
    assert_eq!(
        tree.child_labels(NodeId::ROOT),
        [
            "vkFormat",
            "typeSize",
            "pixelWidth",
            "pixelHeight",
            "pixelDepth",
            "layerCount",
            "faceCount",
            "levelCount",
            "supercompressionScheme",
            "dfdByteOffset",
            "dfdByteLength",
            "kvdByteOffset",
            "kvdByteLength",
            "sgdByteOffset",
            "sgdByteLength",
            "levels",
            "dfd",
            "kv",
            "sgd",
            "images",
        ]
    );
}

#[test]
fn header_values_are_printable() {
    let tree = RecordTree::build(&example_container());
    let value = |label: &str| tree.node(tree.top_level(label)).unwrap().value().to_string();
    assert_eq!(value("vkFormat"), "VK_FORMAT_R8G8B8A8_SRGB");
    assert_eq!(value("pixelWidth"), "4");
    assert_eq!(value("supercompressionScheme"), "Zstandard");
    assert_eq!(value("kvdByteOffset"), "148");
}

#[test]
fn level_index_entries() {
    let tree = RecordTree::build(&example_container());
    let levels = tree.top_level("levels");
    assert_eq!(tree.child_labels(levels), ["level", "level"]);
    let second = tree.descend(levels, &[1]);
    assert_eq!(
        tree.child_labels(second),
        ["byteOffset", "byteLength", "uncompressedByteLength"]
    );
    let byte_offset = tree.descend(second, &[0]);
    assert_eq!(tree.node(byte_offset).unwrap().value(), &Value::Integer(336));
}

#[test]
fn key_values_keep_insertion_order() {
    let tree = RecordTree::build(&example_container());
    let kv = tree.top_level("kv");
    assert_eq!(tree.child_labels(kv), ["KTXorientation", "KTXwriter"]);
    let orientation = tree.descend(kv, &[0]);
    assert_eq!(tree.node(orientation).unwrap().value().to_string(), "rd");
}

#[test]
fn opaque_blocks() {
    let tree = RecordTree::build(&example_container());
    let dfd = tree.node(tree.top_level("dfd")).unwrap();
    assert!(dfd.children().is_empty());
    assert_eq!(dfd.value().to_string(), "44 bytes");
    let sgd = tree.top_level("sgd");
    assert_eq!(tree.child_labels(sgd), ["byteLength"]);
}

#[test]
fn image_slots_follow_the_normalized_counts() {
    let tree = RecordTree::build(&example_container());
    let images = tree.top_level("images");
    assert_eq!(tree.child_labels(images), ["level", "level"]);
    let level = tree.descend(images, &[1]);
    assert_eq!(tree.child_labels(level), ["layer", "layer"]);
    let layer = tree.descend(level, &[1]);
    assert_eq!(tree.child_labels(layer), ["face"]);
    let face = tree.descend(layer, &[0]);
    assert_eq!(tree.child_labels(face), ["depth"]);
    let depth = tree.descend(face, &[0]);
    let depth = tree.node(depth).unwrap();
    assert_eq!(depth.kind(), NodeKind::Depth(0));
    assert!(depth.children().is_empty());
}

#[test]
fn minimal_container_has_one_slot_per_dimension() {
    let container = Container::default().with_counts(0, 0, 1);
    let tree = RecordTree::build(&container);
    let images = tree.top_level("images");
    for rows in [&[0_usize][..], &[0, 0][..], &[0, 0, 0][..]] {
        assert_eq!(tree.node(tree.descend(images, rows)).unwrap().children().len(), 1);
    }
}

#[test]
fn building_twice_is_deterministic() {
    let container = example_container();
    assert_eq!(RecordTree::build(&container), RecordTree::build(&container));
}

#[test]
fn path_to_leaf() {
    let tree = RecordTree::build(&example_container());
    let images = tree.top_level("images");
    let depth = tree.descend(images, &[1, 0, 0, 0]);
    let labels = tree
        .path_to(depth)
        .unwrap()
        .into_iter()
        .map(|id| tree.node(id).unwrap().label().to_owned())
        .collect::<Vec<_>>();
    assert_eq!(labels, ["", "images", "level", "layer", "face", "depth"]);
}

#[test]
fn path_to_root_is_only_the_root() {
    let tree = RecordTree::build(&example_container());
    assert_eq!(tree.path_to(NodeId::ROOT), Some(vec![NodeId::ROOT]));
}

#[test]
fn path_to_foreign_node_is_none() {
    let tree = RecordTree::build(&example_container());
    assert_eq!(tree.path_to(NodeId(tree.len())), None);
}
