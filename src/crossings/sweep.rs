use std::{cmp::Ordering, collections::BTreeSet, fmt::Debug};

use geo::GeoFloat;
use log::{debug, trace};
use slab::Slab;
use smallvec::SmallVec;

use crate::{
    active::{Access, Active},
    events::{EventQueue, SweepPoint},
    line_or_point::LineOrPoint::{self, *},
    sweep::SweepHandler,
};

/// A piece of an input segment generated during the sweep.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Segment<T: GeoFloat> {
    pub(crate) geom: LineOrPoint<T>,
    /// The input line the piece lies on.
    src: LineOrPoint<T>,
    key: usize,
    /// Unique over the sweep; slab keys are reused.
    id: usize,
    /// Index of the input segment.
    source: usize,
    overlapping: Option<usize>,
    is_overlapping: bool,
}

impl<T: GeoFloat> Segment<T> {
    /// Split a line segment into pieces at points of intersection.
    ///
    /// The segment is mutated in place such that ordering among
    /// active segments does not change. The extra geometries are
    /// returned.
    fn adjust_for_intersection(&mut self, intersection: LineOrPoint<T>) -> SplitSegments<T> {
        use SplitSegments::*;

        let (p, q) = match self.geom {
            Point(_) => panic!("attempt to adjust a point segment"),
            Line(p, q) => (p, q),
        };

        match intersection {
            Point(r) => {
                debug_assert!(
                    p <= r && r <= q,
                    "intersection point was not ordered within the line!"
                );
                if p == r || q == r {
                    Unchanged { overlap: false }
                } else {
                    self.geom = Line(p, r);
                    SplitOnce {
                        overlap: None,
                        right: Line(r, q),
                    }
                }
            }
            Line(r1, r2) => {
                debug_assert!(
                    p <= r1 && r2 <= q,
                    "overlapping segment was not ordered within the line!"
                );
                if p == r1 {
                    if r2 == q {
                        Unchanged { overlap: true }
                    } else {
                        self.geom = Line(p, r2);
                        SplitOnce {
                            overlap: Some(false),
                            right: Line(r2, q),
                        }
                    }
                } else if r2 == q {
                    self.geom = Line(p, r1);
                    SplitOnce {
                        overlap: Some(true),
                        right: Line(r1, q),
                    }
                } else {
                    self.geom = Line(p, r1);
                    SplitTwice { right: Line(r2, q) }
                }
            }
        }
    }
}

/// Equality based on key.
impl<T: GeoFloat> PartialEq for Segment<T> {
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key
    }
}

/// Ordering along the sweep line, made total by the key.
impl<T: GeoFloat> PartialOrd for Segment<T> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(
            self.src
                .sweep_cmp(self.geom.first(), &other.src, other.geom.first())
                .then_with(|| self.key.cmp(&other.key)),
        )
    }
}

/// Event type of the intersection sweep.
///
/// Right end points are ordered before left end points, so a piece
/// ending at a point has left the status before pieces starting there
/// enter it.
#[derive(Debug, PartialOrd, Ord, PartialEq, Eq, Clone, Copy)]
pub(crate) enum EventType {
    LineRight,
    LineLeft,
}

#[derive(Debug, PartialOrd, Ord, PartialEq, Eq, Clone, Copy)]
pub(crate) struct SegmentEvent {
    ty: EventType,
    key: usize,
    id: usize,
}

/// A maximal piece between two vertices, shared by all the input
/// segments in `sources`.
#[derive(Debug, Clone)]
pub(crate) struct Fragment<T: GeoFloat> {
    pub(crate) left: SweepPoint<T>,
    pub(crate) right: SweepPoint<T>,
    pub(crate) id: usize,
    pub(crate) sources: SmallVec<[usize; 2]>,
}

/// A sweep point where some piece starts or ends.
#[derive(Debug, Clone)]
pub(crate) struct Station<T: GeoFloat> {
    pub(crate) point: SweepPoint<T>,
    /// Id of the piece directly below the point.
    pub(crate) below: Option<usize>,
    /// Input segments through the point, sorted.
    pub(crate) sources: SmallVec<[usize; 4]>,
}

/// Bentley-Ottmann sweep that splits the input into fragments.
///
/// Detected intersections immediately split both segments, so the
/// active segments never cross and their order is static. The right
/// pieces re-enter the sweep as new segments. Intersections are always
/// computed between the input lines, so a pair of inputs meets in the
/// same point whichever of their pieces find it.
pub(crate) struct Crossings<T: GeoFloat> {
    sources: Vec<LineOrPoint<T>>,
    segments: Box<Slab<Segment<T>>>,
    active_segments: BTreeSet<Active<Segment<T>>>,
    query: usize,
    next_id: usize,
    touching: SmallVec<[usize; 4]>,
    pub(crate) fragments: Vec<Fragment<T>>,
    pub(crate) stations: Vec<Station<T>>,
}

impl<T: GeoFloat> Crossings<T> {
    /// Set up the sweep over `lines`, which must all be lines (not
    /// points).
    pub(crate) fn new(lines: &[LineOrPoint<T>]) -> (Self, EventQueue<T, SegmentEvent>) {
        let mut segments: Box<Slab<Segment<T>>> = Slab::with_capacity(lines.len() + 1).into();
        let origin = Point(SweepPoint::from((T::zero(), T::zero())));
        let query = segments.insert(Segment {
            geom: origin,
            src: origin,
            key: 0,
            id: usize::MAX,
            source: usize::MAX,
            overlapping: None,
            is_overlapping: false,
        });
        segments[query].key = query;

        let mut sweep = Crossings {
            sources: lines.to_vec(),
            segments,
            active_segments: Default::default(),
            query,
            next_id: 0,
            touching: SmallVec::new(),
            fragments: Vec::with_capacity(lines.len()),
            stations: Vec::with_capacity(2 * lines.len()),
        };
        let mut queue = EventQueue::with_capacity(2 * lines.len());
        for (source, geom) in lines.iter().enumerate() {
            debug_assert!(geom.is_line());
            sweep.create_segment(source, *geom, None, &mut queue);
        }
        (sweep, queue)
    }

    /// Create a segment, and schedule its events.
    ///
    /// If `parent` is given, its chain of overlapping segments is
    /// copied onto the new segment.
    fn create_segment(
        &mut self,
        source: usize,
        geom: LineOrPoint<T>,
        parent: Option<usize>,
        queue: &mut EventQueue<T, SegmentEvent>,
    ) -> usize {
        let segment_key = self.store(source, geom);
        let id = self.segments[segment_key].id;
        queue.push(
            geom.first(),
            SegmentEvent {
                ty: EventType::LineLeft,
                key: segment_key,
                id,
            },
        );
        queue.push(
            geom.last(),
            SegmentEvent {
                ty: EventType::LineRight,
                key: segment_key,
                id,
            },
        );

        if let Some(parent) = parent {
            let mut child = self.segments[parent].overlapping;
            let mut target_key = segment_key;

            while let Some(child_key) = child {
                let child_segment = self.segments[child_key];
                let new_key = self.store(child_segment.source, geom);
                self.segments[target_key].overlapping = Some(new_key);

                target_key = new_key;
                child = child_segment.overlapping;
            }
        }
        segment_key
    }

    fn store(&mut self, source: usize, geom: LineOrPoint<T>) -> usize {
        let id = self.next_id;
        self.next_id += 1;
        let entry = self.segments.vacant_entry();
        let key = entry.key();
        entry.insert(Segment {
            geom,
            src: self.sources[source],
            key,
            id,
            source,
            overlapping: None,
            is_overlapping: false,
        });
        key
    }

    /// Split the segment at `key` for an intersection, re-scheduling
    /// its right end and updating its overlap chain.
    fn adjust_for_intersection(
        &mut self,
        key: usize,
        intersection: LineOrPoint<T>,
        queue: &mut EventQueue<T, SegmentEvent>,
    ) -> SplitSegments<T> {
        let segment = &mut self.segments[key];
        debug!(
            "adjust_for_intersection: {:?}\n\twith: {:?}",
            segment, intersection
        );
        let adjust_output = segment.adjust_for_intersection(intersection);
        debug!("adjust_output: {:?}", adjust_output);
        let new_geom = segment.geom;
        let (id, mut child) = (segment.id, segment.overlapping);

        use SplitSegments::*;
        if matches!(adjust_output, SplitOnce { .. } | SplitTwice { .. }) {
            queue.push(
                new_geom.last(),
                SegmentEvent {
                    ty: EventType::LineRight,
                    key,
                    id,
                },
            );
        }

        while let Some(child_key) = child {
            let child_seg = &mut self.segments[child_key];
            child_seg.geom = new_geom;
            child = child_seg.overlapping;
        }
        adjust_output
    }

    /// Split the segment at `key` for an intersection and add the
    /// extra pieces. Returns the key of the piece that overlaps the
    /// intersection, if any.
    fn adjust_one_segment(
        &mut self,
        key: usize,
        intersection: LineOrPoint<T>,
        queue: &mut EventQueue<T, SegmentEvent>,
    ) -> Option<usize> {
        let source = self.segments[key].source;
        use SplitSegments::*;
        match self.adjust_for_intersection(key, intersection, queue) {
            Unchanged { overlap } => overlap.then(|| key),
            SplitOnce { overlap, right } => {
                let new_key = self.create_segment(source, right, Some(key), queue);
                match overlap {
                    Some(false) => Some(key),
                    Some(true) => Some(new_key),
                    None => None,
                }
            }
            SplitTwice { right } => {
                self.create_segment(source, right, Some(key), queue);
                let middle_key = self.create_segment(source, intersection, Some(key), queue);
                Some(middle_key)
            }
        }
    }

    /// The segment of a still valid event.
    ///
    /// Adjusted segments leave stale right end events behind, and
    /// removed keys may have been reused; both are skipped.
    fn segment_for_event(&self, point: SweepPoint<T>, event: &SegmentEvent) -> Option<Segment<T>> {
        let segment = match self.segments.get(event.key) {
            Some(s) if s.id == event.id => *s,
            _ => return None,
        };
        match event.ty {
            EventType::LineRight => {
                if segment.is_overlapping || segment.geom.last() != point {
                    return None;
                }
            }
            EventType::LineLeft => assert_eq!(segment.geom.first(), point),
        }
        Some(segment)
    }

    /// Chain the segment at `tgt_key`, detected as overlapping, behind
    /// the segment at `src_key`.
    fn chain_overlap(&mut self, src_key: usize, tgt_key: usize) {
        let mut segment = &mut self.segments[src_key];
        while let Some(ovlp_key) = segment.overlapping {
            segment = &mut self.segments[ovlp_key];
        }
        segment.overlapping = Some(tgt_key);
        self.segments[tgt_key].is_overlapping = true;
    }

    fn touch_chain(&mut self, key: usize) {
        let mut segment_key = Some(key);
        while let Some(key) = segment_key {
            let segment = &self.segments[key];
            self.touching.push(segment.source);
            segment_key = segment.overlapping;
        }
    }

    /// Where the pieces at `a` and `b` meet, at or after `floor`.
    ///
    /// The input lines of the pieces are intersected and the result is
    /// cut to the extent of both pieces.
    fn crossing(&self, a: usize, b: usize, floor: SweepPoint<T>) -> Option<LineOrPoint<T>> {
        let (a, b) = (&self.segments[a], &self.segments[b]);
        let lo = a.geom.first().max(b.geom.first());
        let hi = a.geom.last().min(b.geom.last());
        match a.src.intersect_line(&b.src)? {
            Point(r) if r < lo || r > hi => None,
            Point(r) if r >= floor => Some(Point(r)),
            // Behind the sweep: either a start both pieces share, or a
            // crossing missed to rounding, which is moved onto the sweep.
            Point(r) => (lo < r).then(|| {
                debug!("crossing at {:?} is behind the sweep at {:?}", r, floor);
                Point(floor)
            }),
            Line(r1, r2) => {
                let (lo, hi) = (r1.max(lo).max(floor), r2.min(hi));
                match lo.cmp(&hi) {
                    Ordering::Less => Some(Line(lo, hi)),
                    Ordering::Equal => Some(Point(lo)),
                    Ordering::Greater => None,
                }
            }
        }
    }

    fn handle_left(
        &mut self,
        point: SweepPoint<T>,
        key: usize,
        queue: &mut EventQueue<T, SegmentEvent>,
    ) {
        let prev = self.active_segments.prev_key(key, &self.segments);
        let next = self.active_segments.next_key(key, &self.segments);

        for adj_key in prev.into_iter().chain(next.into_iter()) {
            let segment = self.segments[key];
            let adj_segment = match self.segments.get(adj_key) {
                Some(s) => *s,
                // Already finished by a special right end below.
                None => continue,
            };
            let intersection = match self.crossing(key, adj_key, point) {
                Some(i) => i,
                None => continue,
            };
            debug!(
                "Found intersection:\n\tsegment1: {:?}\n\tsegment2: {:?}\n\tintersection: {:?}",
                segment, adj_segment, intersection
            );
            // 1. Split adj_segment, and extra splits to storage
            let adj_overlap_key = self.adjust_one_segment(adj_key, intersection, queue);

            // If adj_segment now ends at the start of this segment, it
            // must leave the status before this segment enters.
            let int_pt = intersection.first();
            if int_pt != self.segments[adj_key].geom.first() && int_pt == point {
                self.handle_right(point, adj_key, queue);
            }

            // 2. Split segment, adding extra segments as needed.
            let seg_overlap_key = self.adjust_one_segment(key, intersection, queue);

            assert_eq!(
                adj_overlap_key.is_some(),
                seg_overlap_key.is_some(),
                "one of the intersecting segments had an overlap, but not the other!"
            );
            if let (Some(adj_ovl_key), Some(tgt_key)) = (adj_overlap_key, seg_overlap_key) {
                self.chain_overlap(adj_ovl_key, tgt_key);
                if tgt_key == key {
                    // The whole segment now rides along an active one.
                    return;
                }
            }
        }

        // Safety: `self.segments` is a `Box` that is not de-allocated
        // until `self` is dropped.
        unsafe {
            self.active_segments.add_key(key, &self.segments);
        }
    }

    fn handle_right(
        &mut self,
        point: SweepPoint<T>,
        key: usize,
        queue: &mut EventQueue<T, SegmentEvent>,
    ) {
        self.touch_chain(key);
        let prev = self.active_segments.prev_key(key, &self.segments);
        let next = self.active_segments.next_key(key, &self.segments);
        self.active_segments.remove_key(key, &self.segments);

        let head = self.segments[key];
        let mut fragment = Fragment {
            left: head.geom.first(),
            right: head.geom.last(),
            id: head.id,
            sources: SmallVec::new(),
        };
        let mut segment_key = Some(key);
        while let Some(key) = segment_key {
            let segment = self.segments.remove(key);
            fragment.sources.push(segment.source);
            segment_key = segment.overlapping;
        }
        fragment.sources.sort_unstable();
        fragment.sources.dedup();
        trace!("fragment: {:?}", fragment);
        self.fragments.push(fragment);

        if let (Some(prev_key), Some(next_key)) = (prev, next) {
            if let Some(intersection) = self.crossing(prev_key, next_key, point) {
                let first = self
                    .adjust_one_segment(prev_key, intersection, queue)
                    .is_none();
                let second = self
                    .adjust_one_segment(next_key, intersection, queue)
                    .is_none();
                debug_assert!(first && second, "adjacent segments @ removal can't overlap!");
            }
        }
    }
}

impl<T: GeoFloat> SweepHandler<T> for Crossings<T> {
    type Event = SegmentEvent;

    fn handle_event(
        &mut self,
        point: SweepPoint<T>,
        event: SegmentEvent,
        queue: &mut EventQueue<T, SegmentEvent>,
    ) {
        trace!("handling event: {:?} at {:?}", event, point);
        let segment = match self.segment_for_event(point, &event) {
            Some(s) => s,
            None => return,
        };
        match event.ty {
            EventType::LineLeft => {
                self.touch_chain(segment.key);
                self.handle_left(point, segment.key, queue)
            }
            EventType::LineRight => self.handle_right(point, segment.key, queue),
        }
    }

    fn complete_point(&mut self, point: SweepPoint<T>, _queue: &mut EventQueue<T, SegmentEvent>) {
        if self.touching.is_empty() {
            return;
        }
        let query = &mut self.segments[self.query];
        query.geom = Point(point);
        query.src = Point(point);
        let below = self
            .active_segments
            .prev_key(self.query, &self.segments)
            .map(|key| self.segments[key].id);

        let mut sources = std::mem::take(&mut self.touching);
        sources.sort_unstable();
        sources.dedup();
        self.stations.push(Station {
            point,
            below,
            sources,
        });
    }
}

/// Stores the type of split and extra geometries from adjusting a
/// segment for intersection.
#[derive(Debug)]
enum SplitSegments<T: GeoFloat> {
    Unchanged {
        overlap: bool,
    },
    SplitOnce {
        overlap: Option<bool>,
        right: LineOrPoint<T>,
    },
    SplitTwice {
        right: LineOrPoint<T>,
    },
}

#[cfg(test)]
mod tests {
    use geo::{Coordinate, Line};

    use super::*;

    impl<T: GeoFloat> PartialEq for SplitSegments<T> {
        fn eq(&self, other: &Self) -> bool {
            fn same<T: GeoFloat>(a: &LineOrPoint<T>, b: &LineOrPoint<T>) -> bool {
                a.first() == b.first() && a.last() == b.last()
            }
            match (self, other) {
                (Self::Unchanged { overlap: l }, Self::Unchanged { overlap: r }) => l == r,
                (
                    Self::SplitOnce {
                        overlap: lo,
                        right: lr,
                    },
                    Self::SplitOnce {
                        overlap: ro,
                        right: rr,
                    },
                ) => lo == ro && same(lr, rr),
                (Self::SplitTwice { right: l }, Self::SplitTwice { right: r }) => same(l, r),
                _ => false,
            }
        }
    }

    fn segment(geom: LineOrPoint<f64>) -> Segment<f64> {
        Segment {
            geom,
            src: geom,
            key: 0,
            id: 0,
            source: 0,
            overlapping: None,
            is_overlapping: false,
        }
    }

    fn line(a: (f64, f64), b: (f64, f64)) -> LineOrPoint<f64> {
        Line::new(Coordinate::from(a), Coordinate::from(b)).into()
    }

    #[test]
    fn split_at_point() {
        let mut seg = segment(line((0., 0.), (10., 10.)));
        let out = seg.adjust_for_intersection(LineOrPoint::Point((5., 5.).into()));
        assert_eq!(
            out,
            SplitSegments::SplitOnce {
                overlap: None,
                right: line((5., 5.), (10., 10.)),
            }
        );
        assert_eq!(seg.geom.last(), (5., 5.).into());

        let out = seg.adjust_for_intersection(LineOrPoint::Point((5., 5.).into()));
        assert_eq!(out, SplitSegments::Unchanged { overlap: false });
    }

    #[test]
    fn split_at_overlap() {
        let mut seg = segment(line((0., 0.), (10., 10.)));
        let out = seg.adjust_for_intersection(line((2., 2.), (4., 4.)));
        assert_eq!(
            out,
            SplitSegments::SplitTwice {
                right: line((4., 4.), (10., 10.)),
            }
        );

        let mut seg = segment(line((0., 0.), (10., 10.)));
        let out = seg.adjust_for_intersection(line((0., 0.), (4., 4.)));
        assert_eq!(
            out,
            SplitSegments::SplitOnce {
                overlap: Some(false),
                right: line((4., 4.), (10., 10.)),
            }
        );

        let mut seg = segment(line((0., 0.), (10., 10.)));
        let out = seg.adjust_for_intersection(line((4., 4.), (10., 10.)));
        assert_eq!(
            out,
            SplitSegments::SplitOnce {
                overlap: Some(true),
                right: line((4., 4.), (10., 10.)),
            }
        );

        let mut seg = segment(line((0., 0.), (10., 10.)));
        let out = seg.adjust_for_intersection(line((0., 0.), (10., 10.)));
        assert_eq!(out, SplitSegments::Unchanged { overlap: true });
    }
}
