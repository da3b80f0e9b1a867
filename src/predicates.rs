//! Geometric predicates used by all the constructions.
//!
//! Orientation and in-circle tests are exact: the orientation comes
//! from the robust kernel of `geo`, and the in-circle test from
//! Shewchuk's adaptive predicates (the `robust` crate). The
//! constructions ([`segments_intersect`], [`circumcenter`]) are plain
//! floating-point.
use geo::{
    kernels::{HasKernel, Kernel},
    line_intersection::{line_intersection, LineIntersection},
    Coordinate, GeoFloat, Line,
};

pub use geo::kernels::Orientation;

/// Result of the in-circle test.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InCircle {
    Inside,
    Outside,
    On,
}

/// Result of intersecting two closed line segments.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SegmentIntersection<T: GeoFloat> {
    None,
    Point(Coordinate<T>),
    Overlap(Line<T>),
}

/// Orientation of the triangle `(p, q, r)`.
///
/// `CounterClockwise` if `r` lies to the left of the directed line
/// `p → q`, `Clockwise` if it lies to the right.
#[inline]
pub fn orientation<T: GeoFloat>(p: Coordinate<T>, q: Coordinate<T>, r: Coordinate<T>) -> Orientation {
    <T as HasKernel>::Ker::orient2d(p, q, r)
}

/// Position of `d` relative to the circle through `a`, `b`, `c`.
///
/// The triangle `(a, b, c)` must be counter-clockwise.
pub fn in_circle<T: GeoFloat>(
    a: Coordinate<T>,
    b: Coordinate<T>,
    c: Coordinate<T>,
    d: Coordinate<T>,
) -> InCircle {
    let det = robust::incircle(
        robust_coord(a),
        robust_coord(b),
        robust_coord(c),
        robust_coord(d),
    );
    if det > 0. {
        InCircle::Inside
    } else if det < 0. {
        InCircle::Outside
    } else {
        InCircle::On
    }
}

#[inline]
fn robust_coord<T: GeoFloat>(c: Coordinate<T>) -> robust::Coord<f64> {
    // Float to f64 conversion never fails for the float types `geo`
    // supports.
    robust::Coord {
        x: c.x.to_f64().unwrap_or(f64::NAN),
        y: c.y.to_f64().unwrap_or(f64::NAN),
    }
}

/// Intersection of two closed segments.
pub fn segments_intersect<T: GeoFloat>(s1: Line<T>, s2: Line<T>) -> SegmentIntersection<T> {
    match line_intersection(s1, s2) {
        None => SegmentIntersection::None,
        Some(LineIntersection::SinglePoint { intersection, .. }) => {
            SegmentIntersection::Point(intersection)
        }
        Some(LineIntersection::Collinear { intersection }) => {
            if intersection.start == intersection.end {
                SegmentIntersection::Point(intersection.start)
            } else {
                SegmentIntersection::Overlap(intersection)
            }
        }
    }
}

/// Center of the circle through `a`, `b` and `c`.
///
/// The points must not be collinear.
pub fn circumcenter<T: GeoFloat>(a: Coordinate<T>, b: Coordinate<T>, c: Coordinate<T>) -> Coordinate<T> {
    let b = b - a;
    let c = c - a;
    let two = T::one() + T::one();
    let d = two * (b.x * c.y - b.y * c.x);
    let b2 = b.x * b.x + b.y * b.y;
    let c2 = c.x * c.x + c.y * c.y;
    Coordinate {
        x: a.x + (c.y * b2 - b.y * c2) / d,
        y: a.y + (b.x * c2 - c.x * b2) / d,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn orientation_signs() {
        let p = Coordinate { x: 0., y: 0. };
        let q = Coordinate { x: 1., y: 0. };
        assert_eq!(
            orientation(p, q, Coordinate { x: 0.5, y: 1. }),
            Orientation::CounterClockwise
        );
        assert_eq!(
            orientation(p, q, Coordinate { x: 0.5, y: -1. }),
            Orientation::Clockwise
        );
        assert_eq!(
            orientation(p, q, Coordinate { x: 3., y: 0. }),
            Orientation::Collinear
        );
    }

    #[test]
    fn in_circle_cases() {
        let a = Coordinate { x: 0., y: 0. };
        let b = Coordinate { x: 1., y: 0. };
        let c = Coordinate { x: 0., y: 1. };
        assert_eq!(in_circle(a, b, c, Coordinate { x: 0.5, y: 0.5 }), InCircle::Inside);
        assert_eq!(in_circle(a, b, c, Coordinate { x: 1., y: 1. }), InCircle::On);
        assert_eq!(in_circle(a, b, c, Coordinate { x: 2., y: 2. }), InCircle::Outside);
    }

    #[test]
    fn segment_intersection_kinds() {
        let s1 = Line::new(Coordinate { x: 0., y: 0. }, Coordinate { x: 2., y: 2. });
        let s2 = Line::new(Coordinate { x: 0., y: 2. }, Coordinate { x: 2., y: 0. });
        assert_eq!(
            segments_intersect(s1, s2),
            SegmentIntersection::Point(Coordinate { x: 1., y: 1. })
        );

        let s3 = Line::new(Coordinate { x: 1., y: 1. }, Coordinate { x: 3., y: 3. });
        assert_eq!(
            segments_intersect(s1, s3),
            SegmentIntersection::Overlap(Line::new(
                Coordinate { x: 1., y: 1. },
                Coordinate { x: 2., y: 2. }
            ))
        );

        let s4 = Line::new(Coordinate { x: 3., y: 0. }, Coordinate { x: 4., y: 0. });
        assert_eq!(segments_intersect(s1, s4), SegmentIntersection::None);
    }

    #[test]
    fn circumcenter_of_right_triangle() {
        let o = circumcenter(
            Coordinate { x: 0., y: 0. },
            Coordinate { x: 2., y: 0. },
            Coordinate { x: 0., y: 2. },
        );
        assert_relative_eq!(o.x, 1.);
        assert_relative_eq!(o.y, 1.);
    }
}
