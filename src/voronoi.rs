//! Voronoi diagram as the dual of a Delaunay triangulation.
//!
//! Every triangle contributes its circumcenter as a Voronoi vertex.
//! Every interior Delaunay edge becomes a finite Voronoi edge between
//! the circumcenters of its two triangles, and every hull edge becomes
//! a ray leaving its triangle's circumcenter outwards.
use geo::{Coordinate, GeoFloat};
use log::debug;

use crate::{
    dcel::{FaceId, HalfEdgeId, VertexId, UNBOUNDED_FACE},
    delaunay::Triangulation,
    predicates::circumcenter,
};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum VoronoiEdge<T: GeoFloat> {
    /// Between two Voronoi vertices.
    Finite {
        from: usize,
        to: usize,
        /// The sites the edge separates.
        sites: [VertexId; 2],
    },
    /// From a Voronoi vertex to infinity.
    Ray {
        from: usize,
        /// Outward normal of the hull edge between the two sites.
        direction: Coordinate<T>,
        sites: [VertexId; 2],
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VoronoiCell {
    pub site: VertexId,
    /// Voronoi vertices around the site, counter-clockwise. For an
    /// unbounded cell the chain runs from one ray to the other.
    pub vertices: Vec<usize>,
    pub unbounded: bool,
}

#[derive(Debug, Clone)]
pub struct Voronoi<T: GeoFloat> {
    vertices: Vec<Coordinate<T>>,
    edges: Vec<VoronoiEdge<T>>,
    cells: Vec<VoronoiCell>,
}

impl<T: GeoFloat> Voronoi<T> {
    pub fn new(triangulation: &Triangulation<T>) -> Self {
        let dcel = triangulation.dcel();
        // Bounded face `f` has Voronoi vertex `f - 1`.
        let index = |f: FaceId| f.0 - 1;

        let vertices: Vec<_> = dcel
            .bounded_faces()
            .filter_map(|(_, face)| face.outer)
            .map(|e| {
                let c = |h: HalfEdgeId| dcel.coord(dcel.origin(h));
                circumcenter(c(e), c(dcel.next(e)), c(dcel.prev(e)))
            })
            .collect();

        let edges: Vec<_> = dcel
            .edges()
            .map(|h| {
                let t = dcel.twin(h);
                let sites = [dcel.origin(h), dcel.dest(h)];
                let (f, g) = (dcel.face_of(h), dcel.face_of(t));
                if f != UNBOUNDED_FACE && g != UNBOUNDED_FACE {
                    return VoronoiEdge::Finite {
                        from: index(f),
                        to: index(g),
                        sites,
                    };
                }
                // The triangle is on the left of `inner`; outwards is
                // to its right.
                let inner = if f == UNBOUNDED_FACE { t } else { h };
                let a = dcel.coord(dcel.origin(inner));
                let b = dcel.coord(dcel.dest(inner));
                VoronoiEdge::Ray {
                    from: index(dcel.face_of(inner)),
                    direction: Coordinate {
                        x: b.y - a.y,
                        y: a.x - b.x,
                    },
                    sites,
                }
            })
            .collect();

        let cells: Vec<_> = dcel
            .vertices()
            .map(|(site, _)| {
                let mut faces: Vec<_> = dcel.outgoing(site).map(|h| dcel.face_of(h)).collect();
                faces.reverse();
                let unbounded = match faces.iter().position(|&f| f == UNBOUNDED_FACE) {
                    Some(p) => {
                        faces.rotate_left(p + 1);
                        faces.pop();
                        true
                    }
                    None => false,
                };
                VoronoiCell {
                    site,
                    vertices: faces.into_iter().map(index).collect(),
                    unbounded,
                }
            })
            .collect();

        debug!(
            "voronoi diagram: {} vertices, {} edges, {} cells",
            vertices.len(),
            edges.len(),
            cells.len()
        );
        Voronoi {
            vertices,
            edges,
            cells,
        }
    }

    /// Circumcenters, one per triangle in face order.
    pub fn vertices(&self) -> &[Coordinate<T>] {
        &self.vertices
    }

    /// One edge per Delaunay edge, in edge order.
    pub fn edges(&self) -> &[VoronoiEdge<T>] {
        &self.edges
    }

    /// One cell per triangulation vertex.
    pub fn cells(&self) -> &[VoronoiCell] {
        &self.cells
    }

    pub fn cell(&self, site: VertexId) -> &VoronoiCell {
        &self.cells[site.0]
    }
}

impl<T: GeoFloat> Triangulation<T> {
    pub fn voronoi(&self) -> Voronoi<T> {
        Voronoi::new(self)
    }
}
