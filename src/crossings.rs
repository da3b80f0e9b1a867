//! Segment intersection by plane sweep.
//!
//! The [Bentley-Ottmann] sweep runs in O((n + k) log(n)) time, which
//! beats a brute-force search over all pairs of input segments when
//! the number of intersections k is small compared to n².
//!
//! [Bentley-Ottmann]: //en.wikipedia.org/wiki/Bentley%E2%80%93Ottmann_algorithm
use std::collections::{BTreeMap, HashMap};

use geo::{Coordinate, GeoFloat};
use log::debug;
use smallvec::SmallVec;

use crate::{
    dcel::{assemble, Dcel, HalfEdgeId, VertexId},
    error::{Error, Result},
    events::SweepPoint,
    line_or_point::LineOrPoint,
    sweep::SweepEngine,
    Crossable,
};

mod sweep;
use sweep::Crossings;

/// A point shared by at least two input segments.
#[derive(Debug, Clone, PartialEq)]
pub struct Intersection<T: GeoFloat> {
    pub point: Coordinate<T>,
    /// Indices of the input segments through the point, sorted.
    pub segments: Vec<usize>,
}

/// The planar subdivision induced by a set of segments.
///
/// Every intersection point and end point is a vertex of the mesh, and
/// every maximal piece between two vertices is an edge. Collinear
/// overlapping inputs share one edge.
#[derive(Debug, Clone)]
pub struct Arrangement<T: GeoFloat> {
    dcel: Dcel<T>,
    sources: Vec<SmallVec<[usize; 2]>>,
    intersections: Vec<Intersection<T>>,
}

impl<T: GeoFloat> Arrangement<T> {
    pub fn dcel(&self) -> &Dcel<T> {
        &self.dcel
    }

    pub fn into_dcel(self) -> Dcel<T> {
        self.dcel
    }

    /// Indices of the input segments covering the edge of `he`.
    pub fn sources(&self, he: HalfEdgeId) -> &[usize] {
        &self.sources[he.edge()]
    }

    /// Points shared by two or more input segments, in sweep order.
    pub fn intersections(&self) -> &[Intersection<T>] {
        &self.intersections
    }
}

/// Compute the arrangement of `segments`.
///
/// Fails with [`Error::InvalidInput`] on a zero-length or non-finite
/// segment.
pub fn arrangement<C, I>(segments: I) -> Result<Arrangement<C::Scalar>>
where
    C: Crossable,
    I: IntoIterator<Item = C>,
{
    let crossings = run::<C::Scalar, C, I>(segments)?;
    let stations = crossings.stations;

    let mut coords = Vec::with_capacity(stations.len());
    let mut vertex_of: BTreeMap<SweepPoint<C::Scalar>, VertexId> = BTreeMap::new();
    for station in &stations {
        vertex_of.entry(station.point).or_insert_with(|| {
            coords.push(station.point.coord());
            VertexId(coords.len() - 1)
        });
    }

    let mut edge_of_pair: BTreeMap<(VertexId, VertexId), usize> = BTreeMap::new();
    let mut edge_of_fragment: HashMap<usize, usize> = HashMap::new();
    let mut edges = Vec::with_capacity(crossings.fragments.len());
    let mut sources: Vec<SmallVec<[usize; 2]>> = Vec::with_capacity(crossings.fragments.len());
    for fragment in crossings.fragments {
        let (u, v) = match (vertex_of.get(&fragment.left), vertex_of.get(&fragment.right)) {
            (Some(&u), Some(&v)) => (u, v),
            _ => return Err(Error::topology("fragment ends at an unrecorded point")),
        };
        let edge = *edge_of_pair.entry((u, v)).or_insert_with(|| {
            edges.push((u, v));
            sources.push(SmallVec::new());
            edges.len() - 1
        });
        sources[edge].extend(fragment.sources);
        edge_of_fragment.insert(fragment.id, edge);
    }
    for s in &mut sources {
        s.sort_unstable();
        s.dedup();
    }

    let mut below = vec![None; coords.len()];
    for station in &stations {
        if let (Some(&v), Some(id)) = (vertex_of.get(&station.point), station.below) {
            below[v.0] = edge_of_fragment.get(&id).copied();
        }
    }

    let dcel = assemble(coords, &edges, &below)?;
    debug!(
        "arrangement: {} vertices, {} edges, {} faces",
        dcel.num_vertices(),
        dcel.num_edges(),
        dcel.num_faces()
    );
    Ok(Arrangement {
        dcel,
        sources,
        intersections: report(stations),
    })
}

/// Find the points shared by two or more of `segments`, in sweep
/// order, without building a mesh.
pub fn find_intersections<C, I>(segments: I) -> Result<Vec<Intersection<C::Scalar>>>
where
    C: Crossable,
    I: IntoIterator<Item = C>,
{
    Ok(report(run::<C::Scalar, C, I>(segments)?.stations))
}

fn report<T: GeoFloat>(stations: Vec<sweep::Station<T>>) -> Vec<Intersection<T>> {
    stations
        .into_iter()
        .filter(|s| s.sources.len() > 1)
        .map(|s| Intersection {
            point: s.point.coord(),
            segments: s.sources.into_vec(),
        })
        .collect()
}

fn run<T, C, I>(segments: I) -> Result<Crossings<T>>
where
    T: GeoFloat,
    C: Crossable<Scalar = T>,
    I: IntoIterator<Item = C>,
{
    let lines = segments
        .into_iter()
        .enumerate()
        .map(|(i, c)| {
            let line = c.line();
            let finite = [line.start, line.end]
                .iter()
                .all(|p| p.x.is_finite() && p.y.is_finite());
            if !finite {
                return Err(Error::invalid(format!("segment {} is not finite", i)));
            }
            let geom = LineOrPoint::from(line);
            if !geom.is_line() {
                return Err(Error::invalid(format!("segment {} has zero length", i)));
            }
            Ok(geom)
        })
        .collect::<Result<Vec<_>>>()?;

    let (handler, queue) = Crossings::new(&lines);
    Ok(SweepEngine::new(handler, queue).run())
}

#[cfg(test)]
mod tests {
    use geo::{
        line_intersection::{line_intersection, LineIntersection},
        Line, Rect,
    };
    use rand::{rngs::StdRng, SeedableRng};

    use super::*;
    use crate::{dcel::UNBOUNDED_FACE, random::*};

    fn init_log() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    fn lines(input: &[[(f64, f64); 2]]) -> Vec<Line<f64>> {
        input.iter().map(|&l| Line::from(l)).collect()
    }

    #[test]
    fn simple_cross() {
        init_log();
        let input = lines(&[[(0., 0.), (2., 2.)], [(0., 2.), (2., 0.)]]);
        let arr = arrangement(&input).unwrap();
        let dcel = arr.dcel();
        dcel.validate().unwrap();

        assert_eq!(dcel.num_vertices(), 5);
        assert_eq!(dcel.num_edges(), 4);
        assert_eq!(dcel.num_faces(), 1);
        assert_eq!(
            arr.intersections(),
            &[Intersection {
                point: Coordinate { x: 1., y: 1. },
                segments: vec![0, 1],
            }]
        );
        let center = dcel
            .vertices()
            .find(|(_, v)| v.coord == Coordinate { x: 1., y: 1. })
            .map(|(id, _)| id)
            .unwrap();
        assert_eq!(dcel.outgoing(center).count(), 4);
    }

    #[test]
    fn triangle_with_overlap_and_hole() {
        init_log();
        let input = lines(&[
            [(0., 0.), (10., 0.)],
            [(10., 0.), (5., 10.)],
            [(5., 10.), (0., 0.)],
            // Overlaps the bottom edge.
            [(2., 0.), (12., 0.)],
            // Floats inside the triangle.
            [(4., 3.), (6., 4.)],
        ]);
        let arr = arrangement(&input).unwrap();
        let dcel = arr.dcel();
        dcel.validate().unwrap();

        assert_eq!(dcel.num_faces(), 2);
        let triangle = dcel.bounded_faces().next().unwrap().0;
        assert_eq!(dcel.face(triangle).inner.len(), 1);
        assert_eq!(dcel.face(UNBOUNDED_FACE).inner.len(), 1);

        let shared: Vec<_> = dcel
            .edges()
            .filter(|&h| arr.sources(h).len() == 2)
            .collect();
        assert_eq!(shared.len(), 1);
        assert_eq!(arr.sources(shared[0]), &[0, 3]);

        // (2, 0) and (10, 0) are on both bottom segments.
        let points: Vec<_> = arr.intersections().iter().map(|i| i.point).collect();
        assert!(points.contains(&Coordinate { x: 2., y: 0. }));
        assert!(points.contains(&Coordinate { x: 10., y: 0. }));
    }

    #[test]
    fn endpoint_on_interior() {
        init_log();
        let input = lines(&[[(0., 0.), (4., 0.)], [(2., 0.), (2., 3.)], [(2., -3.), (2., 0.)]]);
        let found = find_intersections(&input).unwrap();
        assert_eq!(
            found,
            vec![Intersection {
                point: Coordinate { x: 2., y: 0. },
                segments: vec![0, 1, 2],
            }]
        );
        let arr = arrangement(&input).unwrap();
        arr.dcel().validate().unwrap();
        assert_eq!(arr.dcel().num_edges(), 4);
    }

    #[test]
    fn rejects_zero_length() {
        let input = lines(&[[(0., 0.), (1., 1.)], [(3., 3.), (3., 3.)]]);
        assert!(matches!(arrangement(&input), Err(Error::InvalidInput(_))));
    }

    /// Every pair of inputs meeting in a single point must be reported
    /// there, and no other pair may be.
    fn assert_matches_brute_force(input: &[Line<f64>], found: &[Intersection<f64>]) -> usize {
        let mut expected = 0;
        for i in 0..input.len() {
            for j in i + 1..input.len() {
                let p = match line_intersection(input[i], input[j]) {
                    Some(LineIntersection::SinglePoint { intersection, .. }) => intersection,
                    Some(LineIntersection::Collinear { .. }) => panic!("overlapping input"),
                    None => continue,
                };
                expected += 1;
                assert!(
                    found.iter().any(|x| {
                        x.segments.contains(&i)
                            && x.segments.contains(&j)
                            && (x.point.x - p.x).hypot(x.point.y - p.y) < 1e-9
                    }),
                    "segments {} and {} meet at {:?}",
                    i,
                    j,
                    p
                );
            }
        }
        let reported: usize = found
            .iter()
            .map(|i| i.segments.len() * (i.segments.len() - 1) / 2)
            .sum();
        assert_eq!(reported, expected);
        expected
    }

    #[test]
    fn matches_brute_force() {
        init_log();
        let mut rng = StdRng::seed_from_u64(42);
        let bbox = Rect::new([0., 0.], [1024., 1024.]);
        let input: Vec<_> = (0..64).map(|_| uniform_line(&mut rng, bbox)).collect();

        let found = find_intersections(&input).unwrap();
        let pairs = assert_matches_brute_force(&input, &found);

        let arr = arrangement(&input).unwrap();
        let dcel = arr.dcel();
        dcel.validate().unwrap();
        assert_eq!(dcel.num_vertices(), 2 * input.len() + found.len());
        assert_eq!(dcel.num_edges(), input.len() + 2 * pairs);
    }

    #[test]
    fn dense_random_segments() {
        init_log();
        let bbox = Rect::new([0., 0.], [100., 100.]);
        for seed in 0..6 {
            let mut rng = StdRng::seed_from_u64(seed);
            let input: Vec<_> = (0..120).map(|_| uniform_line(&mut rng, bbox)).collect();
            let found = find_intersections(&input).unwrap();
            assert_matches_brute_force(&input, &found);
            arrangement(&input).unwrap().dcel().validate().unwrap();
        }
    }

    #[test]
    fn star_with_overlaps() {
        init_log();
        let directions = [
            (4., 1.),
            (4., 3.),
            (3., 4.),
            (1., 4.),
            (-1., 4.),
            (-3., 4.),
            (-4., 3.),
            (-4., 1.),
        ];
        // Eight lines through (5, 5), then two overlapping pairs.
        let mut input: Vec<_> = directions
            .iter()
            .map(|&(dx, dy)| Line::from([(5. - dx, 5. - dy), (5. + dx, 5. + dy)]))
            .collect();
        input.extend(lines(&[
            [(0., 5.), (7., 5.)],
            [(1., 5.), (9., 5.)],
            [(5., 2.), (5., 8.)],
            [(5., 1.), (5., 9.)],
        ]));

        let found = find_intersections(&input).unwrap();
        let at = |x: f64, y: f64, segments: Vec<usize>| Intersection {
            point: Coordinate { x, y },
            segments,
        };
        assert_eq!(
            found,
            vec![
                at(1., 5., vec![8, 9]),
                at(5., 2., vec![10, 11]),
                at(5., 5., (0..12).collect()),
                at(5., 8., vec![10, 11]),
                at(7., 5., vec![8, 9]),
            ]
        );

        let arr = arrangement(&input).unwrap();
        let dcel = arr.dcel();
        dcel.validate().unwrap();
        assert_eq!(dcel.num_vertices(), 25);
        assert_eq!(dcel.num_edges(), 24);
        assert_eq!(dcel.num_faces(), 1);
        let center = dcel
            .vertices()
            .find(|(_, v)| v.coord == Coordinate { x: 5., y: 5. })
            .map(|(id, _)| id)
            .unwrap();
        assert_eq!(dcel.outgoing(center).count(), 20);
        let shared = dcel.edges().filter(|&h| arr.sources(h).len() == 2).count();
        assert_eq!(shared, 4);
    }

    #[test]
    fn many_segments_through_one_point() {
        init_log();
        fn gcd(a: i32, b: i32) -> i32 {
            if b == 0 {
                a.abs()
            } else {
                gcd(b, a % b)
            }
        }
        let input: Vec<_> = (1..6)
            .flat_map(|i| (-5..6).map(move |j| (i, j)))
            .filter(|&(i, j)| gcd(i, j) == 1)
            .map(|(i, j)| {
                let (x, y) = (i as f64, j as f64);
                Line::from([(-x, -y), (x, y)])
            })
            .collect();

        let found = find_intersections(&input).unwrap();
        assert_eq!(
            found,
            vec![Intersection {
                point: Coordinate { x: 0., y: 0. },
                segments: (0..input.len()).collect(),
            }]
        );
        let dcel = arrangement(&input).unwrap().into_dcel();
        dcel.validate().unwrap();
        assert_eq!(dcel.num_edges(), 2 * input.len());
    }
}
