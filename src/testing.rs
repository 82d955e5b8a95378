use crate::animation::{AnimationError, AnimationHandle, Animator, Tween};
use crate::geometry::{Point, Rect, Size};
use crate::host::{Container, ContainerError, Environment, ViewId};
use std::collections::{HashMap, HashSet};

pub const ITEM_SIZE: i32 = 48;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostCall {
    Attach(ViewId, Rect),
    Detach(ViewId),
    SetFrame(ViewId, Rect),
    ResetTransform(ViewId),
}

/// In-memory container that records every call made on it.
#[derive(Debug, Default)]
pub struct MockHost {
    pub calls: Vec<HostCall>,
    pub sizes: HashMap<ViewId, Size>,
    pub origins: HashMap<ViewId, Point>,
    attached: HashSet<ViewId>,
    frames: HashMap<ViewId, Rect>,
}

impl MockHost {
    pub fn with_button(view: ViewId, origin: Point, size: Size) -> Self {
        let mut host = Self::default();
        host.sizes.insert(view, size);
        host.origins.insert(view, origin);
        host
    }

    pub fn frame(&self, view: ViewId) -> Option<Rect> {
        self.frames.get(&view).copied()
    }

    pub fn resets(&self, view: ViewId) -> usize {
        self.calls
            .iter()
            .filter(|c| **c == HostCall::ResetTransform(view))
            .count()
    }

    pub fn attached_count(&self) -> usize {
        self.attached.len()
    }
}

impl Container for MockHost {
    fn attach(&mut self, view: ViewId, frame: Rect) -> Result<(), ContainerError> {
        if !self.attached.insert(view) {
            return Err(ContainerError::AlreadyAttached(view));
        }
        self.frames.insert(view, frame);
        self.calls.push(HostCall::Attach(view, frame));
        Ok(())
    }

    fn detach(&mut self, view: ViewId) {
        self.attached.remove(&view);
        self.calls.push(HostCall::Detach(view));
    }

    fn is_attached(&self, view: ViewId) -> bool {
        self.attached.contains(&view)
    }

    fn set_frame(&mut self, view: ViewId, frame: Rect) {
        self.frames.insert(view, frame);
        self.calls.push(HostCall::SetFrame(view, frame));
    }

    fn reset_transform(&mut self, view: ViewId) {
        self.calls.push(HostCall::ResetTransform(view));
    }
}

impl Environment for MockHost {
    fn measure(&self, view: ViewId) -> Size {
        self.sizes
            .get(&view)
            .copied()
            .unwrap_or(Size::square(ITEM_SIZE))
    }

    fn origin_point(&self, view: ViewId) -> Point {
        match self.frames.get(&view) {
            Some(frame) if self.attached.contains(&view) => frame.origin,
            _ => self.origins.get(&view).copied().unwrap_or_default(),
        }
    }
}

/// Animator whose tweens only end when a test says so.
#[derive(Debug, Default)]
pub struct ManualAnimator {
    pub started: Vec<(AnimationHandle, Tween)>,
    pub cancelled: Vec<AnimationHandle>,
    /// Refuse every tween once this many have been accepted.
    pub refuse_after: Option<usize>,
}

impl ManualAnimator {
    pub fn handles(&self) -> Vec<AnimationHandle> {
        self.started.iter().map(|&(h, _)| h).collect()
    }

    pub fn live(&self) -> Vec<AnimationHandle> {
        self.handles()
            .into_iter()
            .filter(|h| !self.cancelled.contains(h))
            .collect()
    }
}

impl Animator for ManualAnimator {
    fn animate(&mut self, tween: Tween) -> Result<AnimationHandle, AnimationError> {
        if self.refuse_after.is_some_and(|n| self.started.len() >= n) {
            return Err(AnimationError::Rejected {
                target: tween.target,
                reason: "engine is full".to_string(),
            });
        }
        let handle = AnimationHandle::new(self.started.len());
        self.started.push((handle, tween));
        Ok(handle)
    }

    fn cancel(&mut self, handle: AnimationHandle) {
        self.cancelled.push(handle);
    }
}
