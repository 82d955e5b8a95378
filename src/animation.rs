use crate::geometry::Point;
use crate::host::ViewId;
use derive_more::{Display, From, Into};
use serde::Serialize;
use serde_with::DeserializeFromStr;
use std::time::Duration;
use strum::{Display as StrumDisplay, EnumString};
use thiserror::Error;

/// Full double spin applied while items fly in or out.
pub const SPIN_DEGREES: f64 = 720.0;
pub const HINT_DEGREES: f64 = 45.0;
pub const HINT_DURATION: Duration = Duration::from_millis(100);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Display, From, Into)]
#[display("anim#{_0}")]
pub struct AnimationHandle(usize);

crate::impl_id_newtype!(AnimationHandle);

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    DeserializeFromStr,
    EnumString,
    StrumDisplay,
)]
#[strum(ascii_case_insensitive)]
#[serde(rename_all = "kebab-case")]
pub enum Easing {
    #[strum(serialize = "linear")]
    Linear,
    #[strum(serialize = "accelerate", serialize = "ease-in")]
    Accelerate,
    #[strum(serialize = "decelerate", serialize = "ease-out")]
    Decelerate,
    #[strum(
        serialize = "accelerate-decelerate",
        serialize = "accel-decel",
        serialize = "ease-in-out"
    )]
    AccelerateDecelerate,
    #[strum(serialize = "overshoot", serialize = "back")]
    Overshoot,
}

/// One animated property, interpolated from `from` to `to`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Track {
    pub from: f64,
    pub to: f64,
}

impl Track {
    pub const fn new(from: f64, to: f64) -> Self {
        Self { from, to }
    }

    pub const fn hold(value: f64) -> Self {
        Self::new(value, value)
    }

    pub fn at(&self, progress: f64) -> f64 {
        self.from + (self.to - self.from) * progress
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PropertyDeltas {
    pub translation_x: Track,
    pub translation_y: Track,
    pub rotation: Track,
    pub scale_x: Track,
    pub scale_y: Track,
    pub alpha: Track,
}

impl PropertyDeltas {
    /// Item placed at the parent's center flies out by `delta`, growing and fading in.
    pub fn opening(delta: Point) -> Self {
        Self {
            translation_x: Track::new(0.0, delta.x as f64),
            translation_y: Track::new(0.0, delta.y as f64),
            rotation: Track::new(0.0, SPIN_DEGREES),
            scale_x: Track::new(0.0, 1.0),
            scale_y: Track::new(0.0, 1.0),
            alpha: Track::new(0.0, 1.0),
        }
    }

    /// Item sitting on its frame flies back by `delta` toward the center, shrinking and fading out.
    pub fn closing(delta: Point) -> Self {
        Self {
            translation_x: Track::new(0.0, delta.x as f64),
            translation_y: Track::new(0.0, delta.y as f64),
            rotation: Track::new(0.0, -SPIN_DEGREES),
            scale_x: Track::new(1.0, 0.0),
            scale_y: Track::new(1.0, 0.0),
            alpha: Track::new(1.0, 0.0),
        }
    }

    /// Rotation-only flourish on the button that was toggled.
    pub fn hint(expanding: bool) -> Self {
        let rotation = if expanding {
            Track::new(0.0, HINT_DEGREES)
        } else {
            Track::new(HINT_DEGREES, 0.0)
        };
        Self {
            translation_x: Track::hold(0.0),
            translation_y: Track::hold(0.0),
            rotation,
            scale_x: Track::hold(1.0),
            scale_y: Track::hold(1.0),
            alpha: Track::hold(1.0),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tween {
    pub target: ViewId,
    pub deltas: PropertyDeltas,
    pub duration: Duration,
    pub delay: Duration,
    pub easing: Easing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, StrumDisplay)]
#[strum(serialize_all = "lowercase")]
pub enum AnimationEvent {
    Start,
    End,
    Cancel,
    Repeat,
}

impl AnimationEvent {
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::End | Self::Cancel)
    }
}

#[derive(Debug, Error)]
pub enum AnimationError {
    #[error("animation engine rejected tween for {target}: {reason}")]
    Rejected { target: ViewId, reason: String },
}

/// Frame-by-frame tween capability provided by the host.
///
/// Progress is reported back through [`crate::Menu::on_animation_event`] on the
/// same thread that drives the menu.
pub trait Animator {
    fn animate(&mut self, tween: Tween) -> Result<AnimationHandle, AnimationError>;

    /// Stops a running tween. The menu treats the handle as cancelled right away,
    /// so a later `Cancel` event for it is ignored.
    fn cancel(&mut self, handle: AnimationHandle);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_easing_deserialization() {
        let cases = vec![
            ("\"overshoot\"", Easing::Overshoot),
            ("\"OVERSHOOT\"", Easing::Overshoot),
            ("\"back\"", Easing::Overshoot),
            ("\"ease-in-out\"", Easing::AccelerateDecelerate),
            ("\"Accel-Decel\"", Easing::AccelerateDecelerate),
            ("\"ease-out\"", Easing::Decelerate),
            ("\"linear\"", Easing::Linear),
        ];

        for (json, expected) in cases {
            let deserialized: Easing = serde_json::from_str(json).unwrap();
            assert_eq!(deserialized, expected);
        }
        assert!(serde_json::from_str::<Easing>("\"bounce\"").is_err());
    }

    #[test]
    fn test_opening_and_closing_mirror() {
        let open = PropertyDeltas::opening(Point::new(120, -40));
        let close = PropertyDeltas::closing(Point::new(-120, 40));

        assert_eq!(open.translation_x.to, -close.translation_x.to);
        assert_eq!(open.rotation.to, SPIN_DEGREES);
        assert_eq!(close.rotation.to, -SPIN_DEGREES);
        assert_eq!((open.alpha.from, open.alpha.to), (0.0, 1.0));
        assert_eq!((close.scale_y.from, close.scale_y.to), (1.0, 0.0));
    }

    #[test]
    fn test_terminal_events() {
        assert!(AnimationEvent::End.is_terminal());
        assert!(AnimationEvent::Cancel.is_terminal());
        assert!(!AnimationEvent::Start.is_terminal());
        assert!(!AnimationEvent::Repeat.is_terminal());
        assert_eq!(Track::new(0.0, 10.0).at(0.25), 2.5);
    }
}
