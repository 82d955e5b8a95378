use crate::geometry::{Point, Rect, Size};
use derive_more::{Display, From, Into};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Opaque handle the host uses for one menu button's visual.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    Display,
    From,
    Into,
)]
#[display("view#{_0}")]
pub struct ViewId(usize);

crate::impl_id_newtype!(ViewId);

#[derive(Debug, Error)]
pub enum ContainerError {
    #[error("{0} is already attached to the container")]
    AlreadyAttached(ViewId),
    #[error("{0} is unknown to the container")]
    UnknownView(ViewId),
}

/// The shared content container every item is attached to while visible.
pub trait Container {
    /// Adds `view` with its top-left margin and size taken from `frame`.
    fn attach(&mut self, view: ViewId, frame: Rect) -> Result<(), ContainerError>;

    fn detach(&mut self, view: ViewId);

    fn is_attached(&self, view: ViewId) -> bool;

    /// Replaces the static layout margins of an attached view.
    fn set_frame(&mut self, view: ViewId, frame: Rect);

    /// Drops any translation, rotation, scale and alpha left over from an animation.
    fn reset_transform(&mut self, view: ViewId);
}

/// Queries about the hosting window.
pub trait Environment {
    fn measure(&self, view: ViewId) -> Size;

    /// Top-left corner of the view on screen, with window chrome already accounted for.
    fn origin_point(&self, view: ViewId) -> Point;
}

pub trait Host: Container + Environment {}

impl<T: Container + Environment> Host for T {}

/// Center of `view` on screen.
pub fn view_center<E: Environment + ?Sized>(env: &E, view: ViewId) -> Point {
    env.origin_point(view) + env.measure(view).half()
}
