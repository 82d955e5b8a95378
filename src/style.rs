use crate::animation::Easing;
use crate::geometry::ArcSpan;
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const DEFAULT_START_ANGLE: f64 = 180.0;
pub const DEFAULT_END_ANGLE: f64 = 360.0;
pub const DEFAULT_RADIUS: i32 = 250;
pub const DEFAULT_CHILD_PADDING: i32 = 5;
pub const DEFAULT_DURATION_MS: u64 = 500;
pub const LAG_BETWEEN_ITEMS_MS: u64 = 20;

/// How a node picks the distance between its center and its children's centers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RadiusPolicy {
    Fixed(i32),
    /// Just wide enough that neighbours keep `child_padding` apart. Without a
    /// `min_radius` the floor is half the button plus one item.
    Auto {
        min_radius: Option<i32>,
        child_padding: i32,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ArcStyle {
    pub start_angle: f64,
    pub end_angle: f64,
    /// Fixed radius; leave unset to size the ring from its items.
    pub radius: Option<i32>,
    pub min_radius: Option<i32>,
    pub child_padding: i32,
}

impl ArcStyle {
    pub fn span(&self) -> ArcSpan {
        ArcSpan::new(self.start_angle, self.end_angle)
    }

    pub fn radius_policy(&self) -> RadiusPolicy {
        match self.radius {
            Some(r) => RadiusPolicy::Fixed(r),
            None => RadiusPolicy::Auto {
                min_radius: self.min_radius,
                child_padding: self.child_padding,
            },
        }
    }
}

impl Default for ArcStyle {
    fn default() -> Self {
        Self {
            start_angle: DEFAULT_START_ANGLE,
            end_angle: DEFAULT_END_ANGLE,
            radius: Some(DEFAULT_RADIUS),
            min_radius: None,
            child_padding: DEFAULT_CHILD_PADDING,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct MotionStyle {
    /// Whether `toggle` animates; `false` snaps items in and out.
    pub animate: bool,
    pub duration_ms: u64,
    pub lag_ms: u64,
    pub open_easing: Easing,
    pub close_easing: Easing,
    pub hint_rotation: bool,
}

impl MotionStyle {
    pub fn duration(&self) -> Duration {
        Duration::from_millis(self.duration_ms)
    }

    /// Start delay of item `index` out of `count`: later items leave first.
    pub fn stagger(&self, count: usize, index: usize) -> Duration {
        Duration::from_millis(count.saturating_sub(index) as u64 * self.lag_ms)
    }
}

impl Default for MotionStyle {
    fn default() -> Self {
        Self {
            animate: true,
            duration_ms: DEFAULT_DURATION_MS,
            lag_ms: LAG_BETWEEN_ITEMS_MS,
            open_easing: Easing::Overshoot,
            close_easing: Easing::AccelerateDecelerate,
            hint_rotation: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct MenuStyle {
    pub arc: ArcStyle,
    pub motion: MotionStyle,
}
