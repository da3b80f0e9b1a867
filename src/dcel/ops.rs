//! Incremental mesh mutations.
use std::collections::HashSet;

use geo::{Coordinate, GeoFloat, Line};
use log::{debug, trace};

use super::{Dcel, FaceId, HalfEdgeId, Vertex, VertexId, UNBOUNDED_FACE};
use crate::{
    error::{Error, Result},
    predicates::{segments_intersect, SegmentIntersection},
    utils::{in_wedge, winding_number},
};

impl<T: GeoFloat> Dcel<T> {
    /// Add an isolated vertex.
    pub fn create_vertex(&mut self, coord: Coordinate<T>) -> VertexId {
        let id = VertexId(self.vertices.len());
        self.vertices.push(Vertex {
            coord,
            incident: None,
        });
        id
    }

    /// Insert the edge `v1 – v2` and return the half-edge `v1 → v2`.
    ///
    /// The edge must not cross, overlap or touch any existing edge or
    /// vertex other than at its end points. Face records are updated:
    /// the edge may start a new hole component, dangle into a face,
    /// join two boundary cycles or split a face in two.
    pub fn insert_edge(&mut self, v1: VertexId, v2: VertexId) -> Result<HalfEdgeId> {
        if v1.0 >= self.vertices.len() || v2.0 >= self.vertices.len() {
            return Err(Error::invalid("unknown vertex"));
        }
        let (c1, c2) = (self.coord(v1), self.coord(v2));
        if v1 == v2 || c1 == c2 {
            return Err(Error::invalid(format!("zero-length edge {} – {}", v1, v2)));
        }
        if self.find_half_edge(v1, v2).is_some() {
            return Err(Error::topology(format!("edge {} – {} already exists", v1, v2)));
        }
        self.check_crossings(v1, v2)?;

        let e1 = self.wedge(v1, c2);
        let e2 = self.wedge(v2, c1);
        let face = match (e1, e2) {
            (Some(a), Some(b)) if self.face_of(a) != self.face_of(b) => {
                return Err(Error::topology(format!(
                    "edge {} – {} joins different faces",
                    v1, v2
                )))
            }
            (Some(a), _) => self.face_of(a),
            (None, Some(b)) => self.face_of(b),
            (None, None) => {
                let two = T::one() + T::one();
                self.locate_face(Coordinate {
                    x: (c1.x + c2.x) / two,
                    y: (c1.y + c2.y) / two,
                })
            }
        };
        let same_cycle = match (e1, e2) {
            (Some(a), Some(b)) => self.face_cycle(a).any(|h| h == b),
            _ => false,
        };

        let (h, t) = self.splice(v1, v2, e1, e2, face);
        match (e1, e2) {
            (None, None) => {
                debug!("edge {} – {} starts a component in {}", v1, v2, face);
                self.faces[face.0].inner.push(h);
            }
            (Some(_), Some(_)) if same_cycle => {
                self.finish_split(face, h, t)?;
            }
            (Some(_), Some(_)) => {
                trace!("edge {} – {} joins two cycles of {}", v1, v2, face);
                let merged: HashSet<_> = self.face_cycle(h).collect();
                let outer_merged = self.faces[face.0]
                    .outer
                    .map_or(false, |o| merged.contains(&o));
                let inner = &mut self.faces[face.0].inner;
                inner.retain(|x| !merged.contains(x));
                if !outer_merged {
                    inner.push(h);
                }
            }
            _ => {}
        }
        Ok(h)
    }

    /// Split a face by the chord `origin(he1) → origin(he2)`.
    ///
    /// Both half-edges must be on the same boundary cycle. Returns the
    /// new half-edge `origin(he1) → origin(he2)`. When the cycle is the
    /// outer boundary of a face without holes, the cycle through `he1`
    /// becomes the new face, and no geometry is consulted.
    pub fn split_face(&mut self, he1: HalfEdgeId, he2: HalfEdgeId) -> Result<HalfEdgeId> {
        let n = self.half_edges.len();
        if he1.0 >= n || he2.0 >= n {
            return Err(Error::invalid("unknown half-edge"));
        }
        let (v1, v2) = (self.origin(he1), self.origin(he2));
        if he1 == he2 || v1 == v2 {
            return Err(Error::topology(format!("chord {} – {} is a loop", v1, v2)));
        }
        if self.next(he1) == he2 || self.next(he2) == he1 {
            return Err(Error::topology(format!(
                "chord {} – {} duplicates a boundary edge",
                v1, v2
            )));
        }
        if !self.face_cycle(he1).any(|h| h == he2) {
            return Err(Error::topology(format!(
                "{} and {} are not on one boundary cycle",
                he1, he2
            )));
        }
        let face = self.face_of(he1);
        let (h, t) = self.splice(v1, v2, Some(he1), Some(he2), face);
        self.finish_split(face, h, t)?;
        Ok(h)
    }

    /// Insert the isolated vertex `v` with an edge from `origin(he)`,
    /// dangling into the face of `he` just before `he`. Returns the
    /// half-edge towards `v`.
    pub fn extend_into_face(&mut self, he: HalfEdgeId, v: VertexId) -> Result<HalfEdgeId> {
        if self.vertices[v.0].incident.is_some() {
            return Err(Error::topology(format!("{} is not isolated", v)));
        }
        let u = self.origin(he);
        let (h, _) = self.splice(u, v, Some(he), None, self.face_of(he));
        Ok(h)
    }

    /// Place the isolated vertex `v` on the edge of `he`, splitting it
    /// in two. `he` becomes `origin(he) → v`; returns the new half-edge
    /// `v → dest(he)`.
    pub fn split_edge(&mut self, he: HalfEdgeId, v: VertexId) -> Result<HalfEdgeId> {
        if self.vertices[v.0].incident.is_some() {
            return Err(Error::topology(format!("{} is not isolated", v)));
        }
        let tw = self.twin(he);
        let b = self.origin(tw);
        let (he_next, tw_prev) = (self.next(he), self.prev(tw));

        // he: a → v, tw: v → a; the new pair covers v – b.
        let (n, nt) = self.alloc_pair(v, b, self.face_of(he));
        self.half_edges[nt.0].face = self.face_of(tw);
        self.half_edges[tw.0].origin = v;

        if he_next == tw {
            // `he` was dangling at b.
            self.link(he, n);
            self.link(n, nt);
            self.link(nt, tw);
        } else {
            self.link(he, n);
            self.link(n, he_next);
            self.link(tw_prev, nt);
            self.link(nt, tw);
        }

        if self.vertices[b.0].incident == Some(tw) {
            self.vertices[b.0].incident = Some(nt);
        }
        self.vertices[v.0].incident = Some(n);
        Ok(n)
    }

    /// Flip the diagonal of the quadrilateral formed by the two
    /// triangles adjacent to `he`.
    ///
    /// With `he: i → j` in triangle `(i, j, k)` and its twin in
    /// `(j, i, l)`, afterwards `he: k → l` and `twin: l → k`.
    pub fn flip_edge(&mut self, he: HalfEdgeId) -> Result<()> {
        let tw = self.twin(he);
        let (en, ep) = (self.next(he), self.prev(he));
        let (tn, tp) = (self.next(tw), self.prev(tw));
        if self.next(en) != ep || self.next(tn) != tp {
            return Err(Error::topology(format!("{} is not between two triangles", he)));
        }
        let (f, g) = (self.face_of(he), self.face_of(tw));
        if f == g || f == UNBOUNDED_FACE || g == UNBOUNDED_FACE {
            return Err(Error::topology(format!("{} is not an interior edge", he)));
        }
        let (i, j) = (self.origin(he), self.origin(tw));
        let (k, l) = (self.origin(ep), self.origin(tp));

        self.half_edges[he.0].origin = k;
        self.half_edges[tw.0].origin = l;
        // he: k → l, tp: l → j, en: j → k
        self.link(he, tp);
        self.link(tp, en);
        self.link(en, he);
        // tw: l → k, ep: k → i, tn: i → l
        self.link(tw, ep);
        self.link(ep, tn);
        self.link(tn, tw);

        self.half_edges[tp.0].face = f;
        self.half_edges[ep.0].face = g;
        self.faces[f.0].outer = Some(he);
        self.faces[g.0].outer = Some(tw);

        if self.vertices[i.0].incident == Some(he) {
            self.vertices[i.0].incident = Some(tn);
        }
        if self.vertices[j.0].incident == Some(tw) {
            self.vertices[j.0].incident = Some(en);
        }
        Ok(())
    }

    /// Close the isolated vertices of `ring`, listed counter-clockwise,
    /// into a new bounded face. The orientation is not checked.
    pub fn add_face_from_ring(&mut self, ring: &[VertexId]) -> Result<FaceId> {
        if ring.len() < 3 {
            return Err(Error::invalid("a face needs at least three vertices"));
        }
        if ring.iter().any(|v| self.vertices[v.0].incident.is_some()) {
            return Err(Error::topology("ring vertices must be isolated"));
        }
        let pairs: Vec<_> = (0..ring.len())
            .map(|i| self.alloc_pair(ring[i], ring[(i + 1) % ring.len()], UNBOUNDED_FACE))
            .collect();
        for i in 0..pairs.len() {
            let (h, t) = pairs[i];
            let (hn, tn) = pairs[(i + 1) % pairs.len()];
            self.link(h, hn);
            self.link(tn, t);
            self.vertices[ring[i].0].incident = Some(h);
        }
        let outer = pairs[0].0;
        self.faces[UNBOUNDED_FACE.0].inner.push(pairs[0].1);
        Ok(self.new_face(outer))
    }

    /// The face containing `p`, which must not lie on an edge or vertex.
    pub fn locate_face(&self, p: Coordinate<T>) -> FaceId {
        let inside = |he: HalfEdgeId| winding_number(p, &self.cycle_coords(he)) != 0;
        self.bounded_faces()
            .find(|(_, face)| {
                face.outer.map_or(false, inside) && !face.inner.iter().any(|&h| inside(h))
            })
            .map_or(UNBOUNDED_FACE, |(f, _)| f)
    }

    /// The half-edge leaving `v` that precedes the direction towards
    /// `target` in counter-clockwise order, or `None` if `v` is isolated.
    fn wedge(&self, v: VertexId, target: Coordinate<T>) -> Option<HalfEdgeId> {
        let center = self.coord(v);
        let first = self.vertices[v.0].incident?;
        self.outgoing(v)
            .find(|&e| {
                let ccw = self.twin(self.prev(e));
                in_wedge(
                    center,
                    self.coord(self.dest(e)),
                    self.coord(self.dest(ccw)),
                    target,
                )
            })
            .or(Some(first))
    }

    /// Reject an edge `v1 – v2` that would cross the mesh.
    fn check_crossings(&self, v1: VertexId, v2: VertexId) -> Result<()> {
        let (c1, c2) = (self.coord(v1), self.coord(v2));
        let line = Line::new(c1, c2);
        for (v, vert) in self.vertices() {
            if v == v1 || v == v2 {
                continue;
            }
            if let SegmentIntersection::Point(_) =
                segments_intersect(line, Line::new(vert.coord, vert.coord))
            {
                return Err(Error::topology(format!(
                    "edge {} – {} passes through {}",
                    v1, v2, v
                )));
            }
        }
        for he in self.edges() {
            let (a, b) = (self.origin(he), self.dest(he));
            let other = Line::new(self.coord(a), self.coord(b));
            match segments_intersect(line, other) {
                SegmentIntersection::None => {}
                SegmentIntersection::Point(p) => {
                    let shared = [v1, v2].iter().any(|&v| (v == a || v == b) && self.coord(v) == p);
                    if !shared {
                        return Err(Error::topology(format!(
                            "edge {} – {} crosses {} – {}",
                            v1, v2, a, b
                        )));
                    }
                }
                SegmentIntersection::Overlap(_) => {
                    return Err(Error::topology(format!(
                        "edge {} – {} overlaps {} – {}",
                        v1, v2, a, b
                    )));
                }
            }
        }
        Ok(())
    }

    /// Create the pair `v1 → v2` / `v2 → v1` and link it in front of
    /// `e1` at `v1` and in front of `e2` at `v2` (`None` for an
    /// isolated end point). Face records are left to the caller.
    fn splice(
        &mut self,
        v1: VertexId,
        v2: VertexId,
        e1: Option<HalfEdgeId>,
        e2: Option<HalfEdgeId>,
        face: FaceId,
    ) -> (HalfEdgeId, HalfEdgeId) {
        let (h, t) = self.alloc_pair(v1, v2, face);
        match e1 {
            Some(e) => {
                let incoming = self.prev(e);
                self.link(incoming, h);
                self.link(t, e);
            }
            None => self.link(t, h),
        }
        match e2 {
            Some(e) => {
                let incoming = self.prev(e);
                self.link(incoming, t);
                self.link(h, e);
            }
            None => self.link(h, t),
        }
        if self.vertices[v1.0].incident.is_none() {
            self.vertices[v1.0].incident = Some(h);
        }
        if self.vertices[v2.0].incident.is_none() {
            self.vertices[v2.0].incident = Some(t);
        }
        (h, t)
    }

    /// Update face records after a chord `h`/`t` cut one boundary
    /// cycle of `face` in two.
    fn finish_split(&mut self, face: FaceId, h: HalfEdgeId, t: HalfEdgeId) -> Result<FaceId> {
        let h_cycle: HashSet<_> = self.face_cycle(h).collect();
        let t_cycle: HashSet<_> = self.face_cycle(t).collect();
        let was_outer = self.faces[face.0]
            .outer
            .map_or(false, |o| h_cycle.contains(&o) || t_cycle.contains(&o));

        let new_face = if was_outer {
            self.faces[face.0].outer = Some(h);
            self.new_face(t)
        } else {
            let (outer, rest) = match (self.is_outer_cycle(h), self.is_outer_cycle(t)) {
                (true, false) => (h, t),
                (false, true) => (t, h),
                _ => {
                    return Err(Error::topology(format!(
                        "cannot tell the new face of chord {} in {}",
                        h, face
                    )))
                }
            };
            let inner = &mut self.faces[face.0].inner;
            inner.retain(|x| !h_cycle.contains(x) && !t_cycle.contains(x));
            inner.push(rest);
            self.new_face(outer)
        };
        debug!("split {} off {}", new_face, face);

        // Move the holes now enclosed by the new face.
        if self.faces[face.0].inner.len() > usize::from(!was_outer) {
            let ring = self.cycle_coords(self.faces[new_face.0].outer.unwrap_or(t));
            let holes = std::mem::take(&mut self.faces[face.0].inner);
            let (moved, kept): (Vec<_>, Vec<_>) = holes.into_iter().partition(|&hole| {
                !h_cycle.contains(&hole)
                    && !t_cycle.contains(&hole)
                    && winding_number(self.coord(self.origin(hole)), &ring) != 0
            });
            self.faces[face.0].inner = kept;
            for hole in moved {
                self.set_cycle_face(hole, new_face);
                self.faces[new_face.0].inner.push(hole);
            }
        }
        Ok(new_face)
    }
}
