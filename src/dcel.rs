//! Doubly-connected edge list.
//!
//! Every edge is a pair of directed half-edges (twins). A half-edge
//! has its face on its left; following `next` walks a boundary cycle
//! of that face counter-clockwise (clockwise for the boundary of a
//! hole). A bounded face has one outer boundary cycle and any number of
//! hole cycles; the unbounded face, always [`UNBOUNDED_FACE`], only has
//! hole cycles.
//!
//! Records live in arenas addressed by dense typed indices, assigned in
//! creation order. Half-edges are allocated in twin pairs `(2k, 2k+1)`.
use std::{cmp::Ordering, fmt};

use geo::{Coordinate, GeoFloat};
use smallvec::SmallVec;

use crate::{
    error::{Error, Result},
    events::lex_cmp,
    predicates::{orientation, Orientation},
    utils::cmp_direction,
};

mod build;
mod ops;

pub(crate) use build::assemble;

macro_rules! idx {
    ($name:ident) => {
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name(pub usize);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), self.0)
            }
        }
    };
}

idx!(VertexId);
idx!(HalfEdgeId);
idx!(FaceId);

/// The unbounded face.
pub const UNBOUNDED_FACE: FaceId = FaceId(0);

impl HalfEdgeId {
    /// Index of the undirected edge this half-edge belongs to.
    #[inline]
    pub fn edge(self) -> usize {
        self.0 / 2
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Vertex<T: GeoFloat> {
    pub coord: Coordinate<T>,
    /// Some half-edge leaving this vertex; `None` while isolated.
    pub incident: Option<HalfEdgeId>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HalfEdge {
    pub origin: VertexId,
    pub twin: HalfEdgeId,
    pub next: HalfEdgeId,
    pub prev: HalfEdgeId,
    /// The face on the left.
    pub face: FaceId,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Face {
    /// A half-edge of the outer boundary; `None` for the unbounded face.
    pub outer: Option<HalfEdgeId>,
    /// One half-edge per hole boundary.
    pub inner: Vec<HalfEdgeId>,
}

#[derive(Clone, Debug)]
pub struct Dcel<T: GeoFloat> {
    vertices: Vec<Vertex<T>>,
    half_edges: Vec<HalfEdge>,
    faces: Vec<Face>,
}

impl<T: GeoFloat> Default for Dcel<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: GeoFloat> Dcel<T> {
    /// An empty mesh: just the unbounded face.
    pub fn new() -> Self {
        Dcel {
            vertices: Vec::new(),
            half_edges: Vec::new(),
            faces: vec![Face::default()],
        }
    }

    pub fn num_vertices(&self) -> usize {
        self.vertices.len()
    }
    pub fn num_half_edges(&self) -> usize {
        self.half_edges.len()
    }
    pub fn num_edges(&self) -> usize {
        self.half_edges.len() / 2
    }
    /// Number of faces, including the unbounded one.
    pub fn num_faces(&self) -> usize {
        self.faces.len()
    }

    pub fn vertex(&self, id: VertexId) -> &Vertex<T> {
        &self.vertices[id.0]
    }
    pub fn half_edge(&self, id: HalfEdgeId) -> &HalfEdge {
        &self.half_edges[id.0]
    }
    pub fn face(&self, id: FaceId) -> &Face {
        &self.faces[id.0]
    }

    #[inline]
    pub fn coord(&self, v: VertexId) -> Coordinate<T> {
        self.vertices[v.0].coord
    }
    #[inline]
    pub fn origin(&self, he: HalfEdgeId) -> VertexId {
        self.half_edges[he.0].origin
    }
    #[inline]
    pub fn dest(&self, he: HalfEdgeId) -> VertexId {
        self.origin(self.twin(he))
    }
    #[inline]
    pub fn twin(&self, he: HalfEdgeId) -> HalfEdgeId {
        self.half_edges[he.0].twin
    }
    #[inline]
    pub fn next(&self, he: HalfEdgeId) -> HalfEdgeId {
        self.half_edges[he.0].next
    }
    #[inline]
    pub fn prev(&self, he: HalfEdgeId) -> HalfEdgeId {
        self.half_edges[he.0].prev
    }
    #[inline]
    pub fn face_of(&self, he: HalfEdgeId) -> FaceId {
        self.half_edges[he.0].face
    }

    /// All vertices in creation order.
    pub fn vertices(&self) -> impl Iterator<Item = (VertexId, &Vertex<T>)> + Clone + '_ {
        self.vertices
            .iter()
            .enumerate()
            .map(|(i, v)| (VertexId(i), v))
    }

    /// All half-edges in creation order.
    pub fn half_edges(&self) -> impl Iterator<Item = (HalfEdgeId, &HalfEdge)> + Clone + '_ {
        self.half_edges
            .iter()
            .enumerate()
            .map(|(i, h)| (HalfEdgeId(i), h))
    }

    /// All faces in creation order, starting with the unbounded face.
    pub fn faces(&self) -> impl Iterator<Item = (FaceId, &Face)> + Clone + '_ {
        self.faces.iter().enumerate().map(|(i, f)| (FaceId(i), f))
    }

    /// Bounded faces only.
    pub fn bounded_faces(&self) -> impl Iterator<Item = (FaceId, &Face)> + Clone + '_ {
        self.faces().skip(1)
    }

    /// One half-edge per undirected edge: the lower id of each pair.
    pub fn edges(&self) -> impl Iterator<Item = HalfEdgeId> + Clone + '_ {
        (0..self.num_edges()).map(|e| HalfEdgeId(2 * e))
    }

    /// The boundary cycle starting at `he`, following `next`.
    pub fn face_cycle(&self, he: HalfEdgeId) -> FaceCycle<'_, T> {
        FaceCycle {
            dcel: self,
            start: he,
            current: Some(he),
        }
    }

    /// Half-edges leaving `v`, in clockwise order.
    pub fn outgoing(&self, v: VertexId) -> Outgoing<'_, T> {
        let start = self.vertices[v.0].incident;
        Outgoing {
            dcel: self,
            start,
            current: start,
        }
    }

    /// Origins of the outer boundary of a bounded face, counter-clockwise.
    pub fn face_vertices(&self, f: FaceId) -> Vec<VertexId> {
        match self.faces[f.0].outer {
            Some(he) => self.face_cycle(he).map(|h| self.origin(h)).collect(),
            None => Vec::new(),
        }
    }

    /// The half-edge `u → v`, if the edge exists.
    pub fn find_half_edge(&self, u: VertexId, v: VertexId) -> Option<HalfEdgeId> {
        self.outgoing(u).find(|&h| self.dest(h) == v)
    }

    pub(crate) fn cycle_coords(&self, he: HalfEdgeId) -> Vec<Coordinate<T>> {
        self.face_cycle(he).map(|h| self.coord(self.origin(h))).collect()
    }

    /// Whether the cycle through `he` is the outer boundary of a
    /// bounded face, i.e. it turns left at each visit of its
    /// lexicographically smallest vertex.
    pub(crate) fn is_outer_cycle(&self, he: HalfEdgeId) -> bool {
        let mut lowest: SmallVec<[HalfEdgeId; 2]> = SmallVec::new();
        for h in self.face_cycle(he) {
            let c = self.coord(self.origin(h));
            match lowest.first() {
                None => lowest.push(h),
                Some(&l) => match lex_cmp(c, self.coord(self.origin(l))) {
                    std::cmp::Ordering::Less => {
                        lowest.clear();
                        lowest.push(h);
                    }
                    std::cmp::Ordering::Equal => lowest.push(h),
                    std::cmp::Ordering::Greater => {}
                },
            }
        }
        lowest.iter().all(|&h| {
            let u = self.coord(self.origin(self.prev(h)));
            let v = self.coord(self.origin(h));
            let w = self.coord(self.dest(h));
            orientation(u, v, w) == Orientation::CounterClockwise
        })
    }

    /// Check every structural invariant of the mesh.
    pub fn validate(&self) -> Result<()> {
        let n = self.half_edges.len();
        if n % 2 != 0 {
            return Err(Error::topology("odd number of half-edges"));
        }
        for (id, h) in self.half_edges() {
            let ok = |cond: bool, what: &str| {
                if cond {
                    Ok(())
                } else {
                    Err(Error::topology(format!("{}: {}", id, what)))
                }
            };
            ok(h.twin.0 < n && h.next.0 < n && h.prev.0 < n, "dangling reference")?;
            ok(h.origin.0 < self.vertices.len(), "unknown origin")?;
            ok(h.face.0 < self.faces.len(), "unknown face")?;
            ok(h.twin != id && self.twin(h.twin) == id, "twin is not symmetric")?;
            ok(self.prev(h.next) == id && self.next(h.prev) == id, "next/prev mismatch")?;
            ok(self.origin(h.next) == self.dest(id), "next does not start at destination")?;
            ok(self.face_of(h.next) == h.face, "cycle changes face")?;
        }

        for (id, v) in self.vertices() {
            if let Some(h) = v.incident {
                if h.0 >= n || self.origin(h) != id {
                    return Err(Error::topology(format!("{}: bad incident half-edge", id)));
                }
            }
        }
        for (id, h) in self.half_edges() {
            if self.vertices[h.origin.0].incident.is_none() {
                return Err(Error::topology(format!(
                    "{}: origin {} is marked isolated",
                    id, h.origin
                )));
            }
        }

        // The edges leaving a vertex form one clockwise turn, with no
        // two in the same direction.
        let mut degree = vec![0; self.vertices.len()];
        for (_, h) in self.half_edges() {
            degree[h.origin.0] += 1;
        }
        for (id, v) in self.vertices() {
            let mut dirs: Vec<_> = self
                .outgoing(id)
                .map(|h| self.coord(self.dest(h)))
                .collect();
            if dirs.len() != degree[id.0] {
                return Err(Error::topology(format!("{}: star is not one cycle", id)));
            }
            if dirs.iter().any(|&d| d == v.coord) {
                return Err(Error::topology(format!("{}: zero-length edge", id)));
            }
            dirs.reverse();
            if let Some(start) =
                (0..dirs.len()).min_by(|&a, &b| cmp_direction(v.coord, dirs[a], dirs[b]))
            {
                dirs.rotate_left(start);
            }
            if dirs
                .windows(2)
                .any(|w| cmp_direction(v.coord, w[0], w[1]) != Ordering::Less)
            {
                return Err(Error::topology(format!(
                    "{}: outgoing edges overlap or are out of order",
                    id
                )));
            }
        }

        // Every cycle closes, and is referenced by exactly one face
        // record.
        let mut cycle = vec![usize::MAX; n];
        let mut num_cycles = 0;
        let mut total = 0;
        for start in 0..n {
            if cycle[start] != usize::MAX {
                continue;
            }
            let mut h = HalfEdgeId(start);
            loop {
                if cycle[h.0] != usize::MAX {
                    return Err(Error::topology(format!("{}: cycle does not close", h)));
                }
                cycle[h.0] = num_cycles;
                total += 1;
                h = self.next(h);
                if h.0 == start {
                    break;
                }
            }
            num_cycles += 1;
        }
        if total != n {
            return Err(Error::topology("boundary lengths do not add up"));
        }

        let mut referenced = vec![false; num_cycles];
        for (f, face) in self.faces() {
            if (f == UNBOUNDED_FACE) != face.outer.is_none() {
                return Err(Error::topology(format!("{}: bad outer boundary", f)));
            }
            for &h in face.outer.iter().chain(face.inner.iter()) {
                if h.0 >= n || self.face_of(h) != f {
                    return Err(Error::topology(format!("{}: boundary of another face", f)));
                }
                if std::mem::replace(&mut referenced[cycle[h.0]], true) {
                    return Err(Error::topology(format!("{}: cycle referenced twice", f)));
                }
            }
        }
        if referenced.iter().any(|r| !r) {
            return Err(Error::topology("boundary cycle not referenced by any face"));
        }
        Ok(())
    }

    fn alloc_pair(&mut self, u: VertexId, v: VertexId, face: FaceId) -> (HalfEdgeId, HalfEdgeId) {
        let h = HalfEdgeId(self.half_edges.len());
        let t = HalfEdgeId(h.0 + 1);
        self.half_edges.push(HalfEdge {
            origin: u,
            twin: t,
            next: t,
            prev: t,
            face,
        });
        self.half_edges.push(HalfEdge {
            origin: v,
            twin: h,
            next: h,
            prev: h,
            face,
        });
        (h, t)
    }

    #[inline]
    fn link(&mut self, a: HalfEdgeId, b: HalfEdgeId) {
        self.half_edges[a.0].next = b;
        self.half_edges[b.0].prev = a;
    }

    fn set_cycle_face(&mut self, he: HalfEdgeId, f: FaceId) {
        let mut h = he;
        loop {
            self.half_edges[h.0].face = f;
            h = self.next(h);
            if h == he {
                break;
            }
        }
    }

    fn new_face(&mut self, outer: HalfEdgeId) -> FaceId {
        let f = FaceId(self.faces.len());
        self.faces.push(Face {
            outer: Some(outer),
            inner: Vec::new(),
        });
        self.set_cycle_face(outer, f);
        f
    }
}

/// Iterator over a boundary cycle.
#[derive(Clone)]
pub struct FaceCycle<'a, T: GeoFloat> {
    dcel: &'a Dcel<T>,
    start: HalfEdgeId,
    current: Option<HalfEdgeId>,
}

impl<'a, T: GeoFloat> Iterator for FaceCycle<'a, T> {
    type Item = HalfEdgeId;

    fn next(&mut self) -> Option<HalfEdgeId> {
        let h = self.current?;
        let next = self.dcel.next(h);
        self.current = if next == self.start { None } else { Some(next) };
        Some(h)
    }
}

/// Iterator over the half-edges leaving a vertex.
#[derive(Clone)]
pub struct Outgoing<'a, T: GeoFloat> {
    dcel: &'a Dcel<T>,
    start: Option<HalfEdgeId>,
    current: Option<HalfEdgeId>,
}

impl<'a, T: GeoFloat> Iterator for Outgoing<'a, T> {
    type Item = HalfEdgeId;

    fn next(&mut self) -> Option<HalfEdgeId> {
        let h = self.current?;
        let next = self.dcel.next(self.dcel.twin(h));
        self.current = if Some(next) == self.start {
            None
        } else {
            Some(next)
        };
        Some(h)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    pub(super) fn square() -> (Dcel<f64>, [VertexId; 4]) {
        let mut dcel = Dcel::new();
        let vs = [
            dcel.create_vertex(Coordinate { x: 0., y: 0. }),
            dcel.create_vertex(Coordinate { x: 1., y: 0. }),
            dcel.create_vertex(Coordinate { x: 1., y: 1. }),
            dcel.create_vertex(Coordinate { x: 0., y: 1. }),
        ];
        (dcel, vs)
    }

    #[test]
    fn empty_mesh() {
        let dcel: Dcel<f64> = Dcel::new();
        assert_eq!(dcel.num_faces(), 1);
        assert_eq!(dcel.face(UNBOUNDED_FACE), &Face::default());
        dcel.validate().unwrap();
    }

    #[test]
    fn iterators_restart() {
        let (dcel, vs) = square();
        let it = dcel.vertices();
        assert_eq!(it.clone().count(), 4);
        assert_eq!(it.map(|(id, _)| id).collect::<Vec<_>>(), vs.to_vec());
        assert_eq!(dcel.outgoing(vs[0]).count(), 0);
    }

    #[test]
    fn validate_rejects_broken_links() {
        let (mut dcel, vs) = square();
        dcel.insert_edge(vs[0], vs[1]).unwrap();
        dcel.validate().unwrap();
        dcel.half_edges[0].next = HalfEdgeId(0);
        assert!(matches!(dcel.validate(), Err(Error::Topology(_))));
    }

    #[test]
    fn validate_rejects_duplicate_edges() {
        let (mut dcel, vs) = square();
        dcel.insert_edge(vs[0], vs[1]).unwrap();
        // A second 0 – 1 edge, closing a two-sided face with the first.
        let (h, t) = dcel.alloc_pair(vs[0], vs[1], UNBOUNDED_FACE);
        let (e, et) = (HalfEdgeId(0), HalfEdgeId(1));
        dcel.link(e, t);
        dcel.link(t, e);
        dcel.link(h, et);
        dcel.link(et, h);
        dcel.half_edges[et.0].face = UNBOUNDED_FACE;
        dcel.faces[UNBOUNDED_FACE.0].inner = vec![et];
        dcel.new_face(e);

        assert!(matches!(dcel.validate(), Err(Error::Topology(_))));
    }
}
