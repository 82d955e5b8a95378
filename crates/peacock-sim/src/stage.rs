use crate::config::Label;
use peacock::{Container, ContainerError, Environment, Point, Rect, Size, ViewId};
use std::collections::HashMap;

/// Transient visual state left on a view by a running tween.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub translation_x: f64,
    pub translation_y: f64,
    pub rotation: f64,
    pub scale_x: f64,
    pub scale_y: f64,
    pub alpha: f64,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            translation_x: 0.0,
            translation_y: 0.0,
            rotation: 0.0,
            scale_x: 1.0,
            scale_y: 1.0,
            alpha: 1.0,
        }
    }
}

#[derive(Debug, Clone)]
struct Visual {
    label: Label,
    size: Size,
    /// Where the view sits when it is not in the container, i.e. the menu button.
    anchor: Option<Point>,
}

/// In-memory stand-in for a window's content container.
#[derive(Debug, Default)]
pub struct Stage {
    visuals: Vec<Visual>,
    frames: HashMap<ViewId, Rect>,
    transforms: HashMap<ViewId, Transform>,
}

impl Stage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_view(&mut self, label: Label, size: Size) -> ViewId {
        let view = ViewId::new(self.visuals.len());
        self.visuals.push(Visual {
            label,
            size,
            anchor: None,
        });
        view
    }

    /// Pins a view that lives outside the container at `origin`.
    pub fn anchor(&mut self, view: ViewId, origin: Point) {
        if let Some(visual) = self.visuals.get_mut(view.index()) {
            visual.anchor = Some(origin);
        }
    }

    pub fn label(&self, view: ViewId) -> Option<&Label> {
        self.visuals.get(view.index()).map(|v| &v.label)
    }

    pub fn frame(&self, view: ViewId) -> Option<Rect> {
        self.frames.get(&view).copied()
    }

    pub fn transform(&self, view: ViewId) -> Transform {
        self.transforms.get(&view).copied().unwrap_or_default()
    }

    pub fn apply(&mut self, view: ViewId, transform: Transform) {
        self.transforms.insert(view, transform);
    }

    pub fn attached(&self) -> usize {
        self.frames.len()
    }
}

impl Container for Stage {
    fn attach(&mut self, view: ViewId, frame: Rect) -> Result<(), ContainerError> {
        if view.index() >= self.visuals.len() {
            return Err(ContainerError::UnknownView(view));
        }
        if self.frames.contains_key(&view) {
            return Err(ContainerError::AlreadyAttached(view));
        }
        self.frames.insert(view, frame);
        Ok(())
    }

    fn detach(&mut self, view: ViewId) {
        self.frames.remove(&view);
        self.transforms.remove(&view);
    }

    fn is_attached(&self, view: ViewId) -> bool {
        self.frames.contains_key(&view)
    }

    fn set_frame(&mut self, view: ViewId, frame: Rect) {
        if let Some(current) = self.frames.get_mut(&view) {
            *current = frame;
        }
    }

    fn reset_transform(&mut self, view: ViewId) {
        self.transforms.remove(&view);
    }
}

impl Environment for Stage {
    fn measure(&self, view: ViewId) -> Size {
        self.visuals
            .get(view.index())
            .map(|v| v.size)
            .unwrap_or_default()
    }

    fn origin_point(&self, view: ViewId) -> Point {
        if let Some(frame) = self.frames.get(&view) {
            return frame.origin;
        }
        self.visuals
            .get(view.index())
            .and_then(|v| v.anchor)
            .unwrap_or_default()
    }
}
