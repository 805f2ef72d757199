pub mod easing;

use crate::pointer::Point;

/// Evaluates a quadratic Bézier curve at `position` in `[0, 1]`.
///
/// Used to bend an unconstrained inertia trajectory toward a
/// modifier-adjusted endpoint without a discontinuous jump: the raw target
/// acts as the control point, the adjusted target as the end point.
pub fn quadratic_curve_point(start: Point, control: Point, end: Point, position: f64) -> Point {
    fn axis(t: f64, p1: f64, p2: f64, p3: f64) -> f64 {
        let it = 1.0 - t;
        it * it * p1 + 2.0 * it * t * p2 + t * t * p3
    }

    Point::new(
        axis(position, start.x, control.x, end.x),
        axis(position, start.y, control.y, end.y),
    )
}
