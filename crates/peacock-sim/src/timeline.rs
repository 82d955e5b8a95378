use crate::stage::Transform;
use peacock::{AnimationEvent, AnimationHandle, Animator, Easing, PropertyDeltas, ViewId, Tween};
use peacock::animation::AnimationError;
use std::f64::consts::PI;
use std::time::Duration;

const OVERSHOOT_TENSION: f64 = 0.9;

/// Maps linear progress in `0..=1` onto the curve of `easing`.
pub fn ease(easing: Easing, t: f64) -> f64 {
    let t = t.clamp(0.0, 1.0);
    match easing {
        Easing::Linear => t,
        Easing::Accelerate => t * t,
        Easing::Decelerate => 1.0 - (1.0 - t) * (1.0 - t),
        Easing::AccelerateDecelerate => ((t + 1.0) * PI).cos() / 2.0 + 0.5,
        Easing::Overshoot => {
            let t = t - 1.0;
            t * t * ((OVERSHOOT_TENSION + 1.0) * t + OVERSHOOT_TENSION) + 1.0
        }
    }
}

fn sample(deltas: &PropertyDeltas, progress: f64) -> Transform {
    Transform {
        translation_x: deltas.translation_x.at(progress),
        translation_y: deltas.translation_y.at(progress),
        rotation: deltas.rotation.at(progress),
        scale_x: deltas.scale_x.at(progress),
        scale_y: deltas.scale_y.at(progress),
        alpha: deltas.alpha.at(progress),
    }
}

#[derive(Debug)]
struct Running {
    handle: AnimationHandle,
    tween: Tween,
    elapsed: Duration,
    started: bool,
}

/// Everything that happened during one step of the timeline.
#[derive(Debug, Default)]
pub struct Frame {
    pub samples: Vec<(ViewId, Transform)>,
    pub events: Vec<(AnimationHandle, AnimationEvent)>,
}

/// Frame-stepped tween engine. Nothing moves until [`Timeline::advance`] is called.
#[derive(Debug, Default)]
pub struct Timeline {
    next_handle: usize,
    running: Vec<Running>,
    /// Cancellations are reported with the next frame, as a real engine would.
    cancelled: Vec<AnimationHandle>,
}

impl Timeline {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_idle(&self) -> bool {
        self.running.is_empty() && self.cancelled.is_empty()
    }

    pub fn advance(&mut self, dt: Duration) -> Frame {
        let mut frame = Frame::default();
        frame.events.extend(
            self.cancelled
                .drain(..)
                .map(|handle| (handle, AnimationEvent::Cancel)),
        );

        for running in &mut self.running {
            running.elapsed += dt;
            let Some(active) = running.elapsed.checked_sub(running.tween.delay) else {
                continue;
            };
            if !running.started {
                running.started = true;
                frame.events.push((running.handle, AnimationEvent::Start));
            }

            let linear = if running.tween.duration.is_zero() {
                1.0
            } else {
                (active.as_secs_f64() / running.tween.duration.as_secs_f64()).min(1.0)
            };
            let eased = ease(running.tween.easing, linear);
            frame
                .samples
                .push((running.tween.target, sample(&running.tween.deltas, eased)));
            if linear >= 1.0 {
                frame.events.push((running.handle, AnimationEvent::End));
            }
        }

        self.running
            .retain(|r| !frame.events.contains(&(r.handle, AnimationEvent::End)));
        frame
    }
}

impl Animator for Timeline {
    fn animate(&mut self, tween: Tween) -> Result<AnimationHandle, AnimationError> {
        let handle = AnimationHandle::new(self.next_handle);
        self.next_handle += 1;
        self.running.push(Running {
            handle,
            tween,
            elapsed: Duration::ZERO,
            started: false,
        });
        Ok(handle)
    }

    fn cancel(&mut self, handle: AnimationHandle) {
        let before = self.running.len();
        self.running.retain(|r| r.handle != handle);
        if self.running.len() != before {
            self.cancelled.push(handle);
        }
    }
}
