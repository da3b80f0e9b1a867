//! Planar subdivisions and the plane-sweep / incremental algorithms
//! that build them.
//!
//! 1. [DCEL](#dcel)
//! 1. [Segment Arrangements](#segment-arrangements)
//! 1. [Delaunay and Voronoi](#delaunay-and-voronoi)
//! 1. [Convex Hulls](#convex-hulls)
//!
//! # DCEL
//!
//! A [`Dcel`] is a doubly-connected edge list: vertices, twin pairs of
//! half-edges and faces stored in arenas, addressed by typed indices
//! assigned in creation order. It supports incremental mutation
//! ([`Dcel::insert_edge`], [`Dcel::split_face`], [`Dcel::split_edge`],
//! [`Dcel::flip_edge`]) and a structural check ([`Dcel::validate`]).
//!
//! # Segment Arrangements
//!
//! This is an implementation of the [Bentley-Ottman] algorithm to
//! compute all intersections of a collection of line segments. It runs
//! on the generic [`SweepEngine`](sweep::SweepEngine) and produces
//! either the intersection points alone ([`find_intersections`]) or the
//! full subdivision ([`arrangement`]), with every maximal piece between
//! two intersections as one edge.
//!
//! Any type implementing the [`Crossable`] trait can be used as input;
//! the geo-type [`Line`] implements it.
//!
//! ```rust
//! use geo::Line;
//! use geo_subdivision::{arrangement, find_intersections};
//! let input = vec![
//!     Line::from([(1., 0.), (0., 1.)]),
//!     Line::from([(0., 0.5), (1., 0.5)]),
//!     Line::from([(0., 0.), (1., 1.)]),
//! ];
//! // All three meet at the center
//! let found = find_intersections(&input).unwrap();
//! assert_eq!(found.len(), 1);
//! assert_eq!(found[0].segments, vec![0, 1, 2]);
//!
//! let mesh = arrangement(&input).unwrap().into_dcel();
//! assert!(mesh.validate().is_ok());
//! assert_eq!(mesh.num_edges(), 6);
//! ```
//!
//! # Delaunay and Voronoi
//!
//! [`triangulate`] builds a Delaunay triangulation by randomized
//! incremental insertion, with the insertion order drawn from a caller
//! supplied random generator. The Voronoi diagram is derived from it
//! with [`Triangulation::voronoi`].
//!
//! ```rust
//! use geo::Coordinate;
//! use geo_subdivision::triangulate;
//! use rand::{rngs::StdRng, SeedableRng};
//! let points: Vec<Coordinate<f64>> =
//!     vec![(0., 0.).into(), (1., 0.).into(), (1., 1.).into(), (0., 1.).into()];
//! let t = triangulate(&points, &mut StdRng::seed_from_u64(0)).unwrap();
//! assert_eq!(t.num_triangles(), 2);
//! assert_eq!(t.voronoi().edges().len(), 5);
//! ```
//!
//! # Convex Hulls
//!
//! See [`convex_hull`], a monotone chain run on the sweep engine.
//!
//! [Bentley-Ottman]: //en.wikipedia.org/wiki/Bentley%E2%80%93Ottmann_algorithm
//! [`Line`]: geo::Line
pub mod error;
pub use error::{Error, Result};

mod events;
pub use events::{EventQueue, SweepPoint};

pub mod predicates;

mod line_or_point;

mod active;

pub mod sweep;

mod crossable;
pub use crossable::Crossable;

pub mod dcel;
pub use dcel::Dcel;

pub mod crossings;
pub use crossings::{arrangement, find_intersections, Arrangement, Intersection};

pub mod hull;
pub use hull::{convex_hull, slow_convex_hull};

pub mod delaunay;
pub use delaunay::{triangulate, Triangulation};

pub mod voronoi;
pub use voronoi::{Voronoi, VoronoiCell, VoronoiEdge};

#[cfg(test)]
#[path = "../benches/utils/random.rs"]
pub mod random;

pub(crate) mod utils;
