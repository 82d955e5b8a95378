use crate::animation::AnimationError;
use crate::host::{ContainerError, ViewId};
use crate::tree::NodeId;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum MenuError {
    #[error("node {0} does not exist")]
    UnknownNode(NodeId),
    #[error("the root node cannot be removed")]
    RootRemoval,
    #[error(
        "item {node} ({view}) already has a parent; items must be detached before an animated open"
    )]
    AlreadyAttached { node: NodeId, view: ViewId },
    #[error("no animation engine configured for an animated transition")]
    NoAnimator,
    #[error(transparent)]
    Container(#[from] ContainerError),
    #[error(transparent)]
    Animation(#[from] AnimationError),
}
