use thiserror::Error;

use crate::NodeId;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    #[error("row {row} is out of range, the node has {child_count} children")]
    RowOutOfRange { row: usize, child_count: usize },

    #[error("node {0} does not belong to this tree")]
    UnknownNode(NodeId),

    /// The declared counts of the container disagree with its actual payload count.
    #[error("image {index} is out of range, the container holds {image_count} images")]
    ImageOutOfRange { index: usize, image_count: usize },
}

pub type Result<T> = std::result::Result<T, Error>;
