//! Exact angular and ring tests on coordinates.
use std::cmp::Ordering;

use geo::{Coordinate, GeoFloat};
use itertools::Itertools;

use crate::predicates::{orientation, Orientation};

#[inline]
pub(crate) fn orientation_as_ordering(orientation: Orientation) -> Ordering {
    match orientation {
        Orientation::CounterClockwise => Ordering::Less,
        Orientation::Clockwise => Ordering::Greater,
        Orientation::Collinear => Ordering::Equal,
    }
}

/// Whether `c - o` and `d - o` point the same way. Only meaningful for
/// collinear `o`, `c`, `d`.
#[inline]
fn same_direction<T: GeoFloat>(o: Coordinate<T>, c: Coordinate<T>, d: Coordinate<T>) -> bool {
    c.x.partial_cmp(&o.x) == d.x.partial_cmp(&o.x) && c.y.partial_cmp(&o.y) == d.y.partial_cmp(&o.y)
}

/// Angular order of the directions `center → a` and `center → b`,
/// counter-clockwise starting from the positive x-axis (inclusive).
pub(crate) fn cmp_direction<T: GeoFloat>(
    center: Coordinate<T>,
    a: Coordinate<T>,
    b: Coordinate<T>,
) -> Ordering {
    let half = |p: Coordinate<T>| -> u8 {
        if p.y > center.y || (p.y == center.y && p.x > center.x) {
            0
        } else {
            1
        }
    };
    half(a)
        .cmp(&half(b))
        .then_with(|| orientation_as_ordering(orientation(center, a, b)))
}

/// Angular order of `center → a` and `center → b`, counter-clockwise
/// starting from the direction `center → base` (inclusive).
pub(crate) fn cmp_direction_from<T: GeoFloat>(
    center: Coordinate<T>,
    base: Coordinate<T>,
    a: Coordinate<T>,
    b: Coordinate<T>,
) -> Ordering {
    let half = |p: Coordinate<T>| -> u8 {
        match orientation(center, base, p) {
            Orientation::CounterClockwise => 0,
            Orientation::Collinear if same_direction(center, base, p) => 0,
            _ => 1,
        }
    };
    half(a)
        .cmp(&half(b))
        .then_with(|| orientation_as_ordering(orientation(center, a, b)))
}

/// Whether the direction `center → x` lies strictly inside the
/// counter-clockwise wedge from `center → from` to `center → to`. When
/// `from` and `to` point the same way the wedge is the full turn.
pub(crate) fn in_wedge<T: GeoFloat>(
    center: Coordinate<T>,
    from: Coordinate<T>,
    to: Coordinate<T>,
    x: Coordinate<T>,
) -> bool {
    if cmp_direction_from(center, from, x, from) == Ordering::Equal {
        return false;
    }
    if cmp_direction_from(center, from, to, from) == Ordering::Equal {
        return true;
    }
    cmp_direction_from(center, from, x, to) == Ordering::Less
}

/// Winding number of the closed ring around `p`. The ring must not
/// pass through `p`.
pub(crate) fn winding_number<T: GeoFloat>(p: Coordinate<T>, ring: &[Coordinate<T>]) -> i32 {
    ring.iter()
        .circular_tuple_windows()
        .map(|(a, b)| {
            if a.y <= p.y {
                if b.y > p.y && orientation(*a, *b, p) == Orientation::CounterClockwise {
                    return 1;
                }
            } else if b.y <= p.y && orientation(*a, *b, p) == Orientation::Clockwise {
                return -1;
            }
            0
        })
        .sum()
}
