//! Radial floating-action menus: a tree of buttons whose children fan out along an
//! arc around their parent, with staggered open/close animations and one
//! expanded branch per level.

mod macros;

pub mod animation;
pub mod error;
pub mod geometry;
pub mod host;
pub mod layout;
pub mod menu;
pub mod sequencer;
pub mod style;
pub mod tree;

#[cfg(test)]
mod testing;

pub use animation::{
    AnimationEvent, AnimationHandle, Animator, Easing, PropertyDeltas, Track, Tween,
};
pub use error::MenuError;
pub use geometry::{ArcSpan, Point, Rect, Size};
pub use host::{Container, ContainerError, Environment, Host, ViewId};
pub use menu::{Menu, MenuEvent, Transition};
pub use style::{ArcStyle, MenuStyle, MotionStyle, RadiusPolicy};
pub use tree::{MenuNode, NodeId, Status, Tree};
