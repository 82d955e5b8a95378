use serde::{Deserialize, Serialize};
use std::ops::{Add, Sub};

pub const FULL_CIRCLE: f64 = 360.0;

/// Largest half-step that still buys spacing; beyond a 180° step items can't get any closer.
const MAX_HALF_STEP: f64 = 90.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

impl Add for Point {
    type Output = Point;

    fn add(self, rhs: Point) -> Point {
        Point::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Point {
    type Output = Point;

    fn sub(self, rhs: Point) -> Point {
        Point::new(self.x - rhs.x, self.y - rhs.y)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Size {
    pub width: i32,
    pub height: i32,
}

impl Size {
    pub const fn new(width: i32, height: i32) -> Self {
        Self { width, height }
    }

    pub const fn square(side: i32) -> Self {
        Self::new(side, side)
    }

    pub const fn half(self) -> Point {
        Point::new(self.width / 2, self.height / 2)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Rect {
    pub origin: Point,
    pub size: Size,
}

impl Rect {
    pub const fn new(origin: Point, size: Size) -> Self {
        Self { origin, size }
    }

    /// The frame of an item of `size` whose center sits on `center`.
    ///
    /// Both the static layout and the animation deltas go through here, so the
    /// truncation of `size / 2` is identical on both paths.
    pub fn centered_at(center: Point, size: Size) -> Self {
        Self::new(center - size.half(), size)
    }

    pub fn center(&self) -> Point {
        self.origin + self.size.half()
    }
}

/// Angular span, in degrees, along which a node lays out its children.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ArcSpan {
    pub start: f64,
    pub end: f64,
}

impl ArcSpan {
    pub const fn new(start: f64, end: f64) -> Self {
        Self { start, end }
    }

    /// A zero-width arc is widened to a full turn starting at `start`.
    pub fn normalized(self) -> Self {
        if self.start == self.end {
            Self::new(self.start, self.end + FULL_CIRCLE)
        } else {
            self
        }
    }

    pub fn sweep(&self) -> f64 {
        self.end - self.start
    }

    pub fn is_full_circle(&self) -> bool {
        self.sweep().abs() >= FULL_CIRCLE
    }

    /// On a full circle the last slot would land on the first one, so the sweep is
    /// split `count` ways; an open arc uses both endpoints.
    pub fn divisor(&self, count: usize) -> usize {
        if self.is_full_circle() || count <= 1 {
            count
        } else {
            count - 1
        }
    }

    /// Angle of every slot, in degrees, for `count` items.
    pub fn angles(self, count: usize) -> Vec<f64> {
        let arc = self.normalized();
        let divisor = arc.divisor(count).max(1) as f64;
        let step = arc.sweep() / divisor;
        (0..count).map(|i| arc.start + i as f64 * step).collect()
    }
}

impl Default for ArcSpan {
    fn default() -> Self {
        Self::new(180.0, 360.0)
    }
}

/// Smallest radius at which `child_count` items of `child_size` spread over
/// `arc_degrees` keep `child_padding` between neighbours.
pub fn compute_radius(
    arc_degrees: f64,
    child_count: usize,
    child_size: i32,
    child_padding: i32,
    min_radius: i32,
) -> i32 {
    if child_count < 2 {
        return min_radius;
    }

    let span = if arc_degrees == 0.0 {
        FULL_CIRCLE
    } else {
        arc_degrees.abs()
    };
    let half_step = (span / (child_count - 1) as f64 / 2.0).min(MAX_HALF_STEP);
    let per_size = child_size + child_padding;

    let radius = ((per_size / 2) as f64 / half_step.to_radians().sin()) as i32;
    radius.max(min_radius)
}

/// Point on the circle of `radius` around `center` at `degrees`, truncated toward zero.
pub fn arc_point(center: Point, radius: i32, degrees: f64) -> Point {
    let theta = degrees.to_radians();
    let x = center.x as f64 + radius as f64 * theta.cos();
    let y = center.y as f64 + radius as f64 * theta.sin();
    Point::new(x as i32, y as i32)
}

pub fn compute_child_frame(center: Point, radius: i32, degrees: f64, size: Size) -> Rect {
    Rect::centered_at(arc_point(center, radius, degrees), size)
}

/// Top-left corner of every item, in order, laid out along `arc`.
pub fn calculate_item_positions(
    sizes: &[Size],
    center: Point,
    radius: i32,
    arc: ArcSpan,
) -> Vec<Point> {
    arc.angles(sizes.len())
        .into_iter()
        .zip(sizes)
        .map(|(angle, &size)| compute_child_frame(center, radius, angle, size).origin)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close_to(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_open_arc_uses_both_endpoints() {
        let arc = ArcSpan::new(180.0, 360.0);
        assert_eq!(arc.divisor(6), 5);

        let angles = arc.angles(6);
        let expected = [180.0, 216.0, 252.0, 288.0, 324.0, 360.0];
        assert_eq!(angles.len(), expected.len());
        for (a, e) in angles.iter().zip(expected) {
            assert!(close_to(*a, e), "{a} != {e}");
        }
    }

    #[test]
    fn test_full_circle_has_no_duplicate_point() {
        let arc = ArcSpan::new(0.0, 360.0);
        assert_eq!(arc.divisor(4), 4);

        let angles = arc.angles(4);
        for (a, e) in angles.iter().zip([0.0, 90.0, 180.0, 270.0]) {
            assert!(close_to(*a, e), "{a} != {e}");
        }
    }

    #[test]
    fn test_divisor_rule_over_counts() {
        for count in 2..12 {
            for (start, end) in [(0.0, 90.0), (180.0, 360.0), (-45.0, 200.0), (90.0, -90.0)] {
                let arc = ArcSpan::new(start, end);
                let step = (end - start) / (count - 1) as f64;
                for (i, a) in arc.angles(count).into_iter().enumerate() {
                    assert!(close_to(a, start + i as f64 * step));
                }
            }
            let full = ArcSpan::new(30.0, 390.0);
            let step = 360.0 / count as f64;
            for (i, a) in full.angles(count).into_iter().enumerate() {
                assert!(close_to(a, 30.0 + i as f64 * step));
            }
        }
    }

    #[test]
    fn test_zero_width_arc_is_widened() {
        let arc = ArcSpan::new(90.0, 90.0);
        assert_eq!(arc.normalized(), ArcSpan::new(90.0, 450.0));
        assert_eq!(arc.angles(3), vec![90.0, 210.0, 330.0]);
    }

    #[test]
    fn test_single_item_sits_at_start_angle() {
        let arc = ArcSpan::new(45.0, 135.0);
        assert_eq!(arc.angles(1), vec![45.0]);
        assert!(arc.angles(0).is_empty());
    }

    #[test]
    fn test_radius_floors_and_single_item() {
        assert_eq!(compute_radius(90.0, 0, 40, 5, 80), 80);
        assert_eq!(compute_radius(90.0, 1, 400, 5, 80), 80);
        assert_eq!(compute_radius(180.0, 2, 10, 0, 80), 80);
    }

    #[test]
    fn test_radius_chord_formula() {
        // 90° over 3 items: 45° step, 22.5° half step.
        let expected = (45 / 2) as f64 / 22.5f64.to_radians().sin();
        assert_eq!(compute_radius(90.0, 3, 40, 5, 0), expected as i32);
    }

    #[test]
    fn test_radius_monotonicity() {
        for count in 2..10 {
            let mut last = 0;
            for size in (0..200).step_by(7) {
                let r = compute_radius(120.0, count, size, 5, 30);
                assert!(r >= last);
                assert!(r >= 30);
                last = r;
            }

            let mut last = i32::MAX;
            for span in (5..=360).step_by(5) {
                let r = compute_radius(span as f64, count, 48, 5, 30);
                assert!(r <= last, "span {span} count {count}: {r} > {last}");
                assert!(r >= 30);
                last = r;
            }
        }
    }

    #[test]
    fn test_child_frame_truncates_like_positions() {
        let center = Point::new(500, 300);
        let size = Size::square(41);
        for angle in [0.0, 33.0, 127.5, 200.0, 359.0] {
            let frame = compute_child_frame(center, 250, angle, size);
            let point = arc_point(center, 250, angle);
            assert_eq!(frame.origin, point - Point::new(20, 20));
            assert_eq!(frame.center(), point);
        }
    }

    #[test]
    fn test_item_positions_center_on_arc() {
        let center = Point::new(400, 800);
        let sizes = [Size::square(60); 6];
        let positions = calculate_item_positions(&sizes, center, 250, ArcSpan::new(180.0, 360.0));

        assert_eq!(positions.len(), 6);
        assert_eq!(positions[0], Point::new(150 - 30, 800 - 30));
        // sin(2π) is a hair below zero, which truncation turns into one pixel up.
        assert_eq!(positions[5].x, 650 - 30);
        assert!((positions[5].y - (800 - 30)).abs() <= 1);
    }

    #[test]
    fn test_single_item_position_matches_child_frame() {
        let center = Point::new(120, 120);
        let size = Size::square(48);
        let radius = compute_radius(90.0, 1, 48, 5, 70);
        let positions = calculate_item_positions(&[size], center, radius, ArcSpan::new(0.0, 90.0));

        assert_eq!(radius, 70);
        assert_eq!(positions, vec![compute_child_frame(center, 70, 0.0, size).origin]);
    }
}
