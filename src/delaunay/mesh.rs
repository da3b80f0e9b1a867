//! Randomized incremental construction over a symbolic frame.
//!
//! The mesh starts as the triangle `(p0, high, low)`: `p0` is the
//! lexicographically largest input point, `low` lies far to the right
//! and below everything else, `high` far to the left and above, and
//! `high` is further out than `low` is. Their coordinates are never
//! read: orientation and in-circle tests involving them are decided
//! from the lexicographic order of the real points.
use std::cmp::Ordering;

use geo::{Coordinate, GeoFloat};
use log::{debug, trace};
use rand::{seq::SliceRandom, Rng};

use crate::{
    dcel::{assemble, Dcel, FaceId, HalfEdgeId, VertexId},
    error::{Error, Result},
    events::lex_cmp,
    predicates::{in_circle, orientation, InCircle, Orientation},
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Site {
    Real,
    Low,
    High,
}

enum Location {
    /// Strictly inside the triangle bounded by the half-edge.
    Face(HalfEdgeId),
    /// On the interior of the half-edge.
    Edge(HalfEdgeId),
}

enum Step {
    Cross(HalfEdgeId),
    Found(Location),
}

pub(super) struct Builder<'r, T: GeoFloat, R: Rng> {
    dcel: Dcel<T>,
    num_real: usize,
    top: VertexId,
    last: FaceId,
    rng: &'r mut R,
}

impl<'r, T: GeoFloat, R: Rng> Builder<'r, T, R> {
    /// Set up the frame around `coords`, which must be distinct;
    /// `top` is the largest of them.
    pub(super) fn new(coords: &[Coordinate<T>], top: VertexId, rng: &'r mut R) -> Result<Self> {
        let mut dcel = Dcel::new();
        for &c in coords {
            dcel.create_vertex(c);
        }
        let anchor = coords[top.0];
        let low = dcel.create_vertex(anchor);
        let high = dcel.create_vertex(anchor);
        let last = dcel.add_face_from_ring(&[top, high, low])?;
        Ok(Builder {
            dcel,
            num_real: coords.len(),
            top,
            last,
            rng,
        })
    }

    /// Insert every real point but `top`, in random order, and strip
    /// the frame.
    pub(super) fn build(mut self) -> Result<Dcel<T>> {
        let mut order: Vec<_> = (0..self.num_real)
            .map(VertexId)
            .filter(|&v| v != self.top)
            .collect();
        order.shuffle(&mut *self.rng);
        for v in order {
            self.insert(v)?;
        }
        self.finish()
    }

    fn site(&self, v: VertexId) -> Site {
        match v.0.cmp(&self.num_real) {
            Ordering::Less => Site::Real,
            Ordering::Equal => Site::Low,
            Ordering::Greater => Site::High,
        }
    }

    fn on_frame(&self, v: VertexId) -> bool {
        v == self.top || self.site(v) != Site::Real
    }

    fn orient(&self, a: VertexId, b: VertexId, c: VertexId) -> Orientation {
        let mut t = [a, b, c];
        if t.iter().all(|&v| self.site(v) == Site::Real) {
            return orientation(self.dcel.coord(a), self.dcel.coord(b), self.dcel.coord(c));
        }
        // Rotate to (real, _, symbolic).
        while self.site(t[2]) == Site::Real || self.site(t[0]) != Site::Real {
            t.rotate_left(1);
        }
        let [i, j, s] = t;
        let ccw_if = |cond: bool| {
            if cond {
                Orientation::CounterClockwise
            } else {
                Orientation::Clockwise
            }
        };
        let lex = || lex_cmp(self.dcel.coord(j), self.dcel.coord(i));
        match (self.site(j), self.site(s)) {
            (Site::Real, Site::Low) => ccw_if(lex() == Ordering::Less),
            (Site::Real, Site::High) => ccw_if(lex() == Ordering::Greater),
            (Site::High, Site::Low) => Orientation::CounterClockwise,
            _ => Orientation::Clockwise,
        }
    }

    fn triangle(&self, e: HalfEdgeId) -> [HalfEdgeId; 3] {
        let e1 = self.dcel.next(e);
        [e, e1, self.dcel.next(e1)]
    }

    fn classify(&self, e: HalfEdgeId, r: VertexId) -> Step {
        let mut on = None;
        for h in self.triangle(e).iter().copied() {
            match self.orient(self.dcel.origin(h), self.dcel.dest(h), r) {
                Orientation::Clockwise => return Step::Cross(h),
                Orientation::Collinear => on = Some(h),
                Orientation::CounterClockwise => {}
            }
        }
        Step::Found(on.map_or(Location::Face(e), Location::Edge))
    }

    fn locate(&mut self, r: VertexId) -> Result<Location> {
        let start = self.dcel.face(self.last).outer.ok_or_else(|| {
            Error::topology(format!("walk starts in {} without boundary", self.last))
        })?;
        let mut e = self.triangle(start)[self.rng.gen_range(0..3usize)];
        let budget = 2 * self.dcel.num_faces();
        for _ in 0..budget {
            match self.classify(e, r) {
                Step::Found(loc) => return Ok(loc),
                Step::Cross(h) => {
                    let t = self.dcel.twin(h);
                    e = if self.rng.gen() {
                        self.dcel.next(t)
                    } else {
                        self.dcel.prev(t)
                    };
                }
            }
        }

        debug!("walk to {} exceeded {} steps, scanning", r, budget);
        for (_, face) in self.dcel.bounded_faces() {
            if let Some(Step::Found(loc)) = face.outer.map(|e| self.classify(e, r)) {
                return Ok(loc);
            }
        }
        Err(Error::topology(format!("no triangle contains {}", r)))
    }

    fn insert(&mut self, r: VertexId) -> Result<()> {
        match self.locate(r)? {
            Location::Face(e0) => {
                trace!("inserting {} into the face of {}", r, e0);
                let [_, e1, e2] = self.triangle(e0);
                let ar = self.dcel.extend_into_face(e0, r)?;
                let rb = self.dcel.split_face(self.dcel.twin(ar), e1)?;
                self.dcel.split_face(rb, e2)?;
                self.legalize(r, vec![e0, e1, e2])?;
            }
            Location::Edge(e) => {
                trace!("inserting {} on {}", r, e);
                let tw = self.dcel.twin(e);
                let (en, ep) = (self.dcel.next(e), self.dcel.prev(e));
                let (tn, tp) = (self.dcel.next(tw), self.dcel.prev(tw));
                let n = self.dcel.split_edge(e, r)?;
                self.dcel.split_face(n, ep)?;
                self.dcel.split_face(tw, tp)?;
                self.legalize(r, vec![en, ep, tn, tp])?;
            }
        }
        if let Some(h) = self.dcel.vertex(r).incident {
            self.last = self.dcel.face_of(h);
        }
        Ok(())
    }

    /// Flip illegal edges opposite to the new point `r` until none is
    /// left. Each edge on the stack has `r` in the triangle on its left.
    fn legalize(&mut self, r: VertexId, mut stack: Vec<HalfEdgeId>) -> Result<()> {
        while let Some(e) = stack.pop() {
            if self.is_legal(e) {
                continue;
            }
            let tw = self.dcel.twin(e);
            let (tn, tp) = (self.dcel.next(tw), self.dcel.prev(tw));
            trace!(
                "flipping {} – {} for {}",
                self.dcel.origin(e),
                self.dcel.dest(e),
                r
            );
            self.dcel.flip_edge(e)?;
            stack.push(tn);
            stack.push(tp);
        }
        Ok(())
    }

    /// Whether the edge `i → j` of triangle `(i, j, k)` stays, against
    /// the triangle `(j, i, l)` across it.
    fn is_legal(&self, e: HalfEdgeId) -> bool {
        let (i, j) = (self.dcel.origin(e), self.dcel.dest(e));
        if self.on_frame(i) && self.on_frame(j) {
            return true;
        }
        let k = self.dcel.origin(self.dcel.prev(e));
        let l = self.dcel.origin(self.dcel.prev(self.dcel.twin(e)));
        let encroached = if [i, j, k, l].iter().all(|&v| self.site(v) == Site::Real) {
            let c = |v| self.dcel.coord(v);
            match in_circle(c(i), c(j), c(k), c(l)) {
                InCircle::Inside => true,
                InCircle::Outside => false,
                // The diagonal through the smallest vertex stays.
                InCircle::On => k.min(l) < i.min(j),
            }
        } else {
            self.in_symbolic_circle([i, j, k], l)
        };
        // Both triangles after a flip must turn left.
        let convex = self.orient(k, i, l) == Orientation::CounterClockwise
            && self.orient(l, j, k) == Orientation::CounterClockwise;
        if encroached && !convex {
            debug!("keeping {} – {}: quadrilateral with {} and {} is not convex", i, j, k, l);
        }
        !(encroached && convex)
    }

    /// Whether `l` lies strictly inside the circle through the
    /// counter-clockwise triangle `t`, at least one of the four being
    /// symbolic.
    fn in_symbolic_circle(&self, mut t: [VertexId; 3], l: VertexId) -> bool {
        let symbolic = t.iter().filter(|&&v| self.site(v) != Site::Real).count();
        match symbolic {
            // A symbolic point is outside every circle through real ones.
            0 => false,
            1 => {
                while self.site(t[2]) == Site::Real {
                    t.rotate_left(1);
                }
                let [u, v, s] = t;
                // The circle degenerates to the half-plane left of u → v.
                match (self.site(l), self.site(s)) {
                    (Site::Real, _) => match self.orient(u, v, l) {
                        Orientation::CounterClockwise => true,
                        Orientation::Clockwise => false,
                        Orientation::Collinear => self.strictly_between(u, v, l),
                    },
                    (Site::Low, Site::High) => {
                        self.orient(u, v, l) == Orientation::CounterClockwise
                    }
                    _ => false,
                }
            }
            _ => {
                // A rotation of (low, u, high): the half-plane left of
                // low → u.
                while self.site(t[2]) != Site::High {
                    t.rotate_left(1);
                }
                self.site(l) == Site::Real
                    && self.orient(t[0], t[1], l) == Orientation::CounterClockwise
            }
        }
    }

    /// Whether the real point `r`, collinear with the real points `u`
    /// and `v`, lies strictly between them.
    fn strictly_between(&self, u: VertexId, v: VertexId, r: VertexId) -> bool {
        let (a, b) = (self.dcel.coord(u), self.dcel.coord(v));
        let (lo, hi) = match lex_cmp(a, b) {
            Ordering::Greater => (b, a),
            _ => (a, b),
        };
        let p = self.dcel.coord(r);
        lex_cmp(lo, p) == Ordering::Less && lex_cmp(p, hi) == Ordering::Less
    }

    fn finish(self) -> Result<Dcel<T>> {
        let real = |v: VertexId| v.0 < self.num_real;
        let edges: Vec<_> = self
            .dcel
            .edges()
            .map(|h| (self.dcel.origin(h), self.dcel.dest(h)))
            .filter(|&(u, v)| real(u) && real(v))
            .collect();
        let coords: Vec<_> = (0..self.num_real)
            .map(|v| self.dcel.coord(VertexId(v)))
            .collect();
        debug!(
            "triangulated {} points: {} edges",
            self.num_real,
            edges.len()
        );
        assemble(coords, &edges, &vec![None; self.num_real])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};

    fn c(x: f64, y: f64) -> Coordinate<f64> {
        Coordinate { x, y }
    }

    #[test]
    fn symbolic_orientation() {
        let mut rng = StdRng::seed_from_u64(0);
        let coords = [c(0., 0.), c(1., 0.), c(2., 1.)];
        let b = Builder::new(&coords, VertexId(2), &mut rng).unwrap();
        let (p, q, top) = (VertexId(0), VertexId(1), VertexId(2));
        let (low, high) = (VertexId(3), VertexId(4));

        assert_eq!(b.orient(top, high, low), Orientation::CounterClockwise);
        assert_eq!(b.orient(high, low, top), Orientation::CounterClockwise);
        assert_eq!(b.orient(top, low, high), Orientation::Clockwise);
        // (i, j, low) turns left iff j < i.
        assert_eq!(b.orient(top, q, low), Orientation::CounterClockwise);
        assert_eq!(b.orient(p, q, low), Orientation::Clockwise);
        assert_eq!(b.orient(p, q, high), Orientation::CounterClockwise);
        assert_eq!(b.orient(q, high, p), Orientation::CounterClockwise);
        assert_eq!(b.orient(q, p, high), Orientation::Clockwise);
        assert_eq!(b.orient(p, q, top), Orientation::CounterClockwise);
    }

    #[test]
    fn frame_edges_are_legal() {
        let mut rng = StdRng::seed_from_u64(0);
        let coords = [c(0., 0.), c(1., 0.), c(2., 1.)];
        let b = Builder::new(&coords, VertexId(2), &mut rng).unwrap();
        for e in b.dcel.edges() {
            assert!(b.is_legal(e));
        }
    }

    #[test]
    fn symbolic_circles() {
        let mut rng = StdRng::seed_from_u64(0);
        let coords = [c(0., 0.), c(2., 0.), c(1., 0.), c(3., 1.)];
        let b = Builder::new(&coords, VertexId(3), &mut rng).unwrap();
        let (p, q, mid, top) = (VertexId(0), VertexId(1), VertexId(2), VertexId(3));
        let (low, high) = (VertexId(4), VertexId(5));

        // Around a single symbolic point the circle is a half-plane.
        assert_eq!(b.orient(p, q, high), Orientation::CounterClockwise);
        assert!(b.in_symbolic_circle([p, q, high], top));
        assert!(b.in_symbolic_circle([q, high, p], mid));
        assert!(!b.in_symbolic_circle([p, q, high], low));
        assert_eq!(b.orient(q, p, low), Orientation::CounterClockwise);
        assert!(!b.in_symbolic_circle([q, p, low], top));
        assert!(!b.in_symbolic_circle([q, p, low], high));

        // Around both, it is the half-plane left of low → q.
        assert_eq!(b.orient(low, q, high), Orientation::CounterClockwise);
        assert!(b.in_symbolic_circle([low, q, high], p));
        assert!(b.in_symbolic_circle([high, low, q], mid));
        assert!(!b.in_symbolic_circle([q, high, low], top));

        // Real circles never contain a symbolic point.
        assert!(!b.in_symbolic_circle([p, q, top], low));
    }
}
