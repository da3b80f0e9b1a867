use std::{cmp::Ordering, collections::BinaryHeap, fmt::Debug};

use geo::{Coordinate, GeoFloat};
use log::warn;

/// A sweep event for sweep-line algorithms.
///
/// Carries an algorithm specific `payload`. The `seq` number is
/// assigned by the [`EventQueue`] and makes the ordering total even
/// among events with equal payloads.
#[derive(Debug, Clone)]
pub struct Event<T: GeoFloat, E> {
    pub point: SweepPoint<T>,
    pub payload: E,
    seq: usize,
}

impl<T: GeoFloat, E: Ord> PartialEq for Event<T, E> {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

/// Assert total equality
impl<T: GeoFloat, E: Ord> Eq for Event<T, E> {}

/// Ordering for use with a max-heap (`BinaryHeap`): the smallest
/// sweep point is the greatest event.
impl<T: GeoFloat, E: Ord> PartialOrd for Event<T, E> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<T: GeoFloat, E: Ord> Ord for Event<T, E> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.point
            .cmp(&other.point)
            .then_with(|| self.payload.cmp(&other.payload))
            .then_with(|| self.seq.cmp(&other.seq))
            .reverse()
    }
}

/// Priority queue of sweep events.
///
/// Events are popped in increasing sweep order. Once the sweep has
/// advanced to a point (see [`EventQueue::pop_at`]), events strictly
/// before it are refused.
#[derive(Debug)]
pub struct EventQueue<T: GeoFloat, E> {
    heap: BinaryHeap<Event<T, E>>,
    seq: usize,
    position: Option<SweepPoint<T>>,
}

impl<T: GeoFloat, E: Ord + Debug> EventQueue<T, E> {
    pub fn with_capacity(capacity: usize) -> Self {
        EventQueue {
            heap: BinaryHeap::with_capacity(capacity),
            seq: 0,
            position: None,
        }
    }

    /// Schedule an event. Returns `false` (and drops the event) if the
    /// point is behind the current sweep position.
    pub fn push(&mut self, point: SweepPoint<T>, payload: E) -> bool {
        if let Some(pos) = self.position {
            if point < pos {
                warn!(
                    "refusing event behind the sweep: {:?} at {:?} (sweep at {:?})",
                    payload, point, pos
                );
                return false;
            }
        }
        let seq = self.seq;
        self.seq += 1;
        self.heap.push(Event {
            point,
            payload,
            seq,
        });
        true
    }

    /// Peek the next point in the sweep.
    #[inline]
    pub fn peek_point(&self) -> Option<SweepPoint<T>> {
        self.heap.peek().map(|e| e.point)
    }

    /// Pop the next event if it is at `point`, advancing the sweep
    /// position to `point`.
    pub fn pop_at(&mut self, point: SweepPoint<T>) -> Option<E> {
        self.position = Some(point);
        match self.heap.peek() {
            Some(e) if e.point == point => self.heap.pop().map(|e| e.payload),
            _ => None,
        }
    }

    /// The point the sweep is currently at.
    #[inline]
    pub fn position(&self) -> Option<SweepPoint<T>> {
        self.position
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.heap.len()
    }
}

/// Wraps a [`Coordinate`] to support lexicographic ordering.
///
/// The ordering is by `x` and then by `y`. Implements `PartialOrd`,
/// `Ord` and `Eq` even though `Coordinate` doesn't implement these.
/// Only finite coordinates may be wrapped, which keeps the ordering
/// total.
#[derive(Debug, PartialEq, Clone, Copy)]
pub struct SweepPoint<T: GeoFloat>(Coordinate<T>);

impl<T: GeoFloat> SweepPoint<T> {
    /// The wrapped coordinate.
    #[inline]
    pub fn coord(&self) -> Coordinate<T> {
        self.0
    }
}

/// Implememnt lexicographic ordering by `x` and then by `y`
/// coordinate.
impl<T: GeoFloat> PartialOrd for SweepPoint<T> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        match self.0.x.partial_cmp(&other.0.x) {
            Some(Ordering::Equal) => self.0.y.partial_cmp(&other.0.y),
            o => o,
        }
    }
}

/// Derive `Ord` from `PartialOrd` and expect to not fail.
impl<T: GeoFloat> Ord for SweepPoint<T> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.partial_cmp(other).unwrap()
    }
}

/// We derive `Eq` manually to not require `T: Eq`.
impl<T: GeoFloat> Eq for SweepPoint<T> {}

/// Create from `Coordinate` while checking the components are finite.
impl<T: GeoFloat> From<Coordinate<T>> for SweepPoint<T> {
    fn from(pt: Coordinate<T>) -> Self {
        assert!(
            pt.x.is_finite(),
            "sweep point requires a finite x-coordinate"
        );
        assert!(
            pt.y.is_finite(),
            "sweep point requires a finite y-coordinate"
        );
        SweepPoint(pt)
    }
}

impl<T: GeoFloat> From<(T, T)> for SweepPoint<T> {
    fn from((x, y): (T, T)) -> Self {
        Coordinate { x, y }.into()
    }
}

/// Lexicographic comparison of two finite coordinates.
#[inline]
pub(crate) fn lex_cmp<T: GeoFloat>(a: Coordinate<T>, b: Coordinate<T>) -> Ordering {
    SweepPoint::from(a).cmp(&SweepPoint::from(b))
}
