//! Convex hulls of point sets.
//!
//! Both functions return the strict hull (no collinear boundary
//! points) counter-clockwise, starting at the lexicographically
//! smallest point. Duplicate points are ignored; fewer than three
//! distinct or all collinear points yield the distinct extreme points.
use std::cmp::Ordering;

use geo::{Coordinate, GeoFloat};
use log::trace;

use crate::{
    error::{Error, Result},
    events::{lex_cmp, EventQueue, SweepPoint},
    predicates::{orientation, Orientation},
    sweep::{SweepEngine, SweepHandler},
};

/// Andrew's monotone chain: the status is the pair of lower and upper
/// chains of the points swept so far.
struct MonotoneChain<T: GeoFloat> {
    lower: Vec<Coordinate<T>>,
    upper: Vec<Coordinate<T>>,
}

impl<T: GeoFloat> MonotoneChain<T> {
    fn push(chain: &mut Vec<Coordinate<T>>, c: Coordinate<T>, keep: Orientation) {
        while chain.len() >= 2 && orientation(chain[chain.len() - 2], chain[chain.len() - 1], c) != keep {
            chain.pop();
        }
        chain.push(c);
    }

    fn into_hull(self) -> Vec<Coordinate<T>> {
        let MonotoneChain { mut lower, upper } = self;
        if upper.len() > 2 {
            lower.extend(upper[1..upper.len() - 1].iter().rev());
        }
        lower
    }
}

impl<T: GeoFloat> SweepHandler<T> for MonotoneChain<T> {
    /// Index of the input point.
    type Event = usize;

    fn handle_event(&mut self, point: SweepPoint<T>, event: usize, _: &mut EventQueue<T, usize>) {
        let c = point.coord();
        if self.lower.last() == Some(&c) {
            trace!("skipping duplicate point #{}", event);
            return;
        }
        Self::push(&mut self.lower, c, Orientation::CounterClockwise);
        Self::push(&mut self.upper, c, Orientation::Clockwise);
    }
}

fn check_finite<T: GeoFloat>(points: &[Coordinate<T>]) -> Result<()> {
    match points
        .iter()
        .position(|p| !p.x.is_finite() || !p.y.is_finite())
    {
        Some(i) => Err(Error::invalid(format!("point {} is not finite", i))),
        None => Ok(()),
    }
}

/// Convex hull in O(n log n), by sweeping the points left to right.
pub fn convex_hull<T: GeoFloat>(points: &[Coordinate<T>]) -> Result<Vec<Coordinate<T>>> {
    check_finite(points)?;
    let mut queue = EventQueue::with_capacity(points.len());
    for (i, p) in points.iter().enumerate() {
        queue.push(SweepPoint::from(*p), i);
    }
    let handler = MonotoneChain {
        lower: Vec::new(),
        upper: Vec::new(),
    };
    Ok(SweepEngine::new(handler, queue).run().into_hull())
}

/// Convex hull in O(n³): a directed pair of points is a hull edge if
/// no point lies to its right and no collinear point lies beyond it.
pub fn slow_convex_hull<T: GeoFloat>(points: &[Coordinate<T>]) -> Result<Vec<Coordinate<T>>> {
    check_finite(points)?;
    let mut pts = points.to_vec();
    pts.sort_by(|a, b| lex_cmp(*a, *b));
    pts.dedup();
    if pts.len() < 3 {
        return Ok(pts);
    }

    let within = |p: Coordinate<T>, q: Coordinate<T>, r: Coordinate<T>| {
        let (lo, hi) = if lex_cmp(p, q) == Ordering::Less { (p, q) } else { (q, p) };
        lex_cmp(lo, r) != Ordering::Greater && lex_cmp(r, hi) != Ordering::Greater
    };
    let mut next = vec![None; pts.len()];
    for (i, &p) in pts.iter().enumerate() {
        for (j, &q) in pts.iter().enumerate() {
            if i == j {
                continue;
            }
            let valid = pts.iter().all(|&r| match orientation(p, q, r) {
                Orientation::Clockwise => false,
                Orientation::Collinear => within(p, q, r),
                Orientation::CounterClockwise => true,
            });
            if valid {
                next[i] = Some(j);
            }
        }
    }

    let mut hull = vec![pts[0]];
    let mut i = 0;
    while let Some(j) = next[i] {
        if j == 0 {
            return Ok(hull);
        }
        if hull.len() == pts.len() {
            break;
        }
        hull.push(pts[j]);
        i = j;
    }
    Err(Error::topology("hull edges do not close"))
}
