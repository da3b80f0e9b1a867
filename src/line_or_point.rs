use std::cmp::Ordering;

use geo::{Coordinate, GeoFloat, Line};

use crate::{
    events::SweepPoint,
    predicates::{orientation, segments_intersect, Orientation, SegmentIntersection},
    utils::orientation_as_ordering,
};

/// Either a line segment or a point.
///
/// The coordinates are ordered (see [`SweepPoint`]) and a line
/// segment must have distinct points (use the `Point` variant if the
/// coordinates are the equal).
#[derive(Debug, Clone, Copy)]
pub enum LineOrPoint<T: GeoFloat> {
    Point(SweepPoint<T>),
    Line(SweepPoint<T>, SweepPoint<T>),
}

/// Convert from a [`Line`] ensuring end point ordering.
impl<T: GeoFloat> From<Line<T>> for LineOrPoint<T> {
    fn from(l: Line<T>) -> Self {
        let start: SweepPoint<T> = l.start.into();
        let end: SweepPoint<T> = l.end.into();
        match start.cmp(&end) {
            Ordering::Less => LineOrPoint::Line(start, end),
            Ordering::Greater => LineOrPoint::Line(end, start),
            Ordering::Equal => LineOrPoint::Point(start),
        }
    }
}

impl<T: GeoFloat> From<Coordinate<T>> for LineOrPoint<T> {
    fn from(c: Coordinate<T>) -> Self {
        LineOrPoint::Point(c.into())
    }
}

impl<T: GeoFloat> LineOrPoint<T> {
    #[inline]
    pub fn is_line(&self) -> bool {
        matches!(self, LineOrPoint::Line(_, _))
    }

    /// The geometry as a [`Line`]; a point becomes a degenerate line.
    #[inline]
    pub fn line(&self) -> Line<T> {
        match self {
            LineOrPoint::Line(p, q) => Line::new(p.coord(), q.coord()),
            LineOrPoint::Point(p) => Line::new(p.coord(), p.coord()),
        }
    }

    /// Lexicographically first coordinate of the geometry.
    #[inline]
    pub fn first(&self) -> SweepPoint<T> {
        match *self {
            LineOrPoint::Point(p) => p,
            LineOrPoint::Line(p, _) => p,
        }
    }

    /// Lexicographically last coordinate of the geometry.
    #[inline]
    pub fn last(&self) -> SweepPoint<T> {
        match *self {
            LineOrPoint::Point(p) => p,
            LineOrPoint::Line(_, q) => q,
        }
    }

    /// Intersect a line with self and return a point, a overlapping
    /// segment or `None`.
    ///
    /// The `other` argument must be a line variant (panics otherwise).
    pub fn intersect_line(&self, other: &Self) -> Option<Self> {
        assert!(other.is_line(), "tried to intersect with a point variant!");

        let line = other.line();
        match *self {
            LineOrPoint::Point(p) => {
                if orientation(line.start, p.coord(), line.end) == Orientation::Collinear {
                    let (ls, le) = (other.first(), other.last());
                    if p >= ls && p <= le {
                        Some(*self)
                    } else {
                        None
                    }
                } else {
                    None
                }
            }
            LineOrPoint::Line(_, _) => match segments_intersect(self.line(), line) {
                SegmentIntersection::None => None,
                SegmentIntersection::Point(c) => Some(c.into()),
                SegmentIntersection::Overlap(l) => Some(l.into()),
            },
        }
    }

    /// Order of two pieces in the sweep status, lower first.
    ///
    /// `self` and `other` are the input geometries the pieces lie on,
    /// and `start`, `other_start` the first points of the pieces. Only
    /// these enter the comparison, so the order of two active pieces
    /// does not change while they are in the status. The pieces must
    /// not cross between their starts and the sweep.
    ///
    /// A point is treated as an infinitesimal vertical segment; a line
    /// through it is greater.
    pub fn sweep_cmp(
        &self,
        start: SweepPoint<T>,
        other: &Self,
        other_start: SweepPoint<T>,
    ) -> Ordering {
        match (self, other) {
            (LineOrPoint::Point(p), LineOrPoint::Point(q)) => p.cmp(q),
            (LineOrPoint::Point(_), LineOrPoint::Line(_, _)) => {
                other.sweep_cmp(other_start, self, start).reverse()
            }
            (LineOrPoint::Line(p, q), LineOrPoint::Point(r)) => {
                orientation_as_ordering(orientation(p.coord(), q.coord(), r.coord()))
                    .then(Ordering::Greater)
            }
            (LineOrPoint::Line(p1, q1), LineOrPoint::Line(_, q2)) => {
                if start > other_start {
                    return other.sweep_cmp(other_start, self, start).reverse();
                }
                let side = |r: SweepPoint<T>| {
                    orientation_as_ordering(orientation(p1.coord(), q1.coord(), r.coord()))
                };
                // Compare where the later piece starts, then by where it
                // heads.
                if start == other_start {
                    side(*q2)
                } else {
                    side(other_start).then_with(|| side(*q2))
                }
            }
        }
    }
}
