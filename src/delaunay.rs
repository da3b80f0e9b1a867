//! Delaunay triangulation by randomized incremental insertion.
//!
//! Points are inserted one at a time into a triangulation of a frame
//! enclosing all of them. Each insertion splits the triangle (or edge)
//! the point falls on and then flips edges until every triangle has an
//! empty circumcircle again. The insertion order comes from a caller
//! supplied [`Rng`], so a seeded generator gives reproducible meshes.
//!
//! Co-circular configurations are resolved by keeping the diagonal
//! through the vertex with the smallest id.
use geo::{Coordinate, GeoFloat};
use rand::Rng;

use crate::{
    dcel::{Dcel, HalfEdgeId, VertexId, UNBOUNDED_FACE},
    error::{Error, Result},
    events::lex_cmp,
    predicates::{in_circle, orientation, InCircle, Orientation},
};

mod mesh;

/// A Delaunay triangulation of a point set.
///
/// The mesh has one vertex per distinct input point, in order of first
/// occurrence. Every bounded face is a triangle; the unbounded face has
/// a single hole cycle running clockwise along the convex hull.
#[derive(Debug, Clone)]
pub struct Triangulation<T: GeoFloat> {
    dcel: Dcel<T>,
    site_vertex: Vec<VertexId>,
}

/// Triangulate `points`, inserting them in an order drawn from `rng`.
///
/// Duplicate points share the vertex of their first occurrence. Fails
/// with [`Error::InvalidInput`] on fewer than three or non-finite
/// points, and with [`Error::DegenerateInput`] when the distinct points
/// do not span a triangle.
pub fn triangulate<T, R>(points: &[Coordinate<T>], rng: &mut R) -> Result<Triangulation<T>>
where
    T: GeoFloat,
    R: Rng,
{
    if points.len() < 3 {
        return Err(Error::invalid(format!(
            "triangulation needs at least 3 points, got {}",
            points.len()
        )));
    }
    if let Some(i) = points
        .iter()
        .position(|p| !p.x.is_finite() || !p.y.is_finite())
    {
        return Err(Error::invalid(format!("point {} is not finite", i)));
    }

    // Representative (first) input index of every point.
    let mut order: Vec<usize> = (0..points.len()).collect();
    order.sort_by(|&a, &b| lex_cmp(points[a], points[b]).then(a.cmp(&b)));
    let mut first: Vec<usize> = (0..points.len()).collect();
    for w in order.windows(2) {
        if points[w[0]] == points[w[1]] {
            first[w[1]] = first[w[0]];
        }
    }

    let mut coords = Vec::new();
    let mut site_vertex = Vec::with_capacity(points.len());
    for i in 0..points.len() {
        if first[i] == i {
            coords.push(points[i]);
            site_vertex.push(VertexId(coords.len() - 1));
        } else {
            site_vertex.push(site_vertex[first[i]]);
        }
    }
    if coords.len() < 3 {
        return Err(Error::degenerate(format!(
            "only {} distinct points",
            coords.len()
        )));
    }
    let spans = coords[2..]
        .iter()
        .any(|&p| orientation(coords[0], coords[1], p) != Orientation::Collinear);
    if !spans {
        return Err(Error::degenerate("all points are collinear"));
    }

    let top = order
        .last()
        .map(|&i| site_vertex[i])
        .ok_or_else(|| Error::invalid("no points"))?;
    let dcel = mesh::Builder::new(&coords, top, rng)?.build()?;
    Ok(Triangulation { dcel, site_vertex })
}

impl<T: GeoFloat> Triangulation<T> {
    pub fn dcel(&self) -> &Dcel<T> {
        &self.dcel
    }

    pub fn into_dcel(self) -> Dcel<T> {
        self.dcel
    }

    /// The vertex of input point `i`.
    pub fn site_vertex(&self, i: usize) -> VertexId {
        self.site_vertex[i]
    }

    pub fn num_triangles(&self) -> usize {
        self.dcel.num_faces() - 1
    }

    /// Vertices of each triangle, counter-clockwise.
    pub fn triangles(&self) -> impl Iterator<Item = [VertexId; 3]> + '_ {
        self.dcel.bounded_faces().filter_map(move |(_, face)| {
            let e = face.outer?;
            let (e1, e2) = (self.dcel.next(e), self.dcel.prev(e));
            Some([
                self.dcel.origin(e),
                self.dcel.origin(e1),
                self.dcel.origin(e2),
            ])
        })
    }

    /// A half-edge on the convex hull, with the unbounded face on its
    /// left.
    pub fn hull_edge(&self) -> Option<HalfEdgeId> {
        self.dcel.face(UNBOUNDED_FACE).inner.first().copied()
    }

    /// Number of vertices on the hull boundary, including those in the
    /// interior of hull edges.
    pub fn hull_len(&self) -> usize {
        self.hull_edge()
            .map_or(0, |h| self.dcel.face_cycle(h).count())
    }

    /// Corners of the convex hull, counter-clockwise from the
    /// lexicographically smallest point. Points in the interior of hull
    /// edges are left out.
    pub fn convex_hull(&self) -> Vec<Coordinate<T>> {
        let mut boundary: Vec<_> = match self.hull_edge() {
            Some(h) => self
                .dcel
                .face_cycle(h)
                .map(|e| self.dcel.coord(self.dcel.origin(e)))
                .collect(),
            None => return Vec::new(),
        };
        boundary.reverse();
        let n = boundary.len();
        let mut hull: Vec<_> = (0..n)
            .filter(|&i| {
                orientation(boundary[(i + n - 1) % n], boundary[i], boundary[(i + 1) % n])
                    == Orientation::CounterClockwise
            })
            .map(|i| boundary[i])
            .collect();
        if let Some(start) = (0..hull.len()).min_by(|&a, &b| lex_cmp(hull[a], hull[b])) {
            hull.rotate_left(start);
        }
        hull
    }

    /// Whether no vertex lies strictly inside the circumcircle of any
    /// triangle. Quadratic; meant for checking.
    pub fn is_delaunay(&self) -> bool {
        self.triangles().all(|[a, b, c]| {
            let (pa, pb, pc) = (self.dcel.coord(a), self.dcel.coord(b), self.dcel.coord(c));
            self.dcel
                .vertices()
                .all(|(_, v)| in_circle(pa, pb, pc, v.coord) != InCircle::Inside)
        })
    }

    /// The triangle whose closure contains `p`, by linear scan.
    pub fn locate(&self, p: Coordinate<T>) -> Option<[VertexId; 3]> {
        self.triangles().find(|&[a, b, c]| {
            let corners = [a, b, c];
            (0..3).all(|i| {
                let (u, v) = (corners[i], corners[(i + 1) % 3]);
                orientation(self.dcel.coord(u), self.dcel.coord(v), p) != Orientation::Clockwise
            })
        })
    }
}

impl<T: GeoFloat> PartialEq for Triangulation<T> {
    /// Identical vertices, triangles and edge numbering.
    fn eq(&self, other: &Self) -> bool {
        self.site_vertex == other.site_vertex
            && self.dcel.num_half_edges() == other.dcel.num_half_edges()
            && self.dcel.vertices().eq(other.dcel.vertices())
            && self.dcel.half_edges().eq(other.dcel.half_edges())
            && self
                .dcel
                .faces()
                .map(|(_, f)| f)
                .eq(other.dcel.faces().map(|(_, f)| f))
    }
}
