//! Bulk construction of a mesh from a planar edge set.
use std::cmp::Ordering;

use geo::{Coordinate, GeoFloat};
use log::debug;

use super::{Dcel, Face, FaceId, HalfEdge, HalfEdgeId, Vertex, VertexId, UNBOUNDED_FACE};
use crate::{
    error::{Error, Result},
    events::lex_cmp,
    utils::cmp_direction,
};

/// Build a mesh from vertices and non-crossing edges.
///
/// Edge `i` becomes the half-edges `2i` (`edges[i].0 → edges[i].1`)
/// and `2i + 1`. `below[v]` names the edge directly below vertex `v`
/// (`None` if nothing is below); it decides which face a hole cycle
/// belongs to and is only consulted for the leftmost vertex of each
/// hole cycle. Below edges must not be vertical.
pub(crate) fn assemble<T: GeoFloat>(
    coords: Vec<Coordinate<T>>,
    edges: &[(VertexId, VertexId)],
    below: &[Option<usize>],
) -> Result<Dcel<T>> {
    let mut dcel = Dcel {
        vertices: coords
            .into_iter()
            .map(|coord| Vertex {
                coord,
                incident: None,
            })
            .collect(),
        half_edges: Vec::with_capacity(2 * edges.len()),
        faces: vec![Face::default()],
    };

    let mut star: Vec<Vec<HalfEdgeId>> = vec![Vec::new(); dcel.vertices.len()];
    for &(u, v) in edges {
        if u == v || dcel.coord(u) == dcel.coord(v) {
            return Err(Error::invalid(format!("zero-length edge {} – {}", u, v)));
        }
        let h = HalfEdgeId(dcel.half_edges.len());
        let t = HalfEdgeId(h.0 + 1);
        for &(origin, twin) in &[(u, t), (v, h)] {
            dcel.half_edges.push(HalfEdge {
                origin,
                twin,
                next: twin,
                prev: twin,
                face: UNBOUNDED_FACE,
            });
        }
        star[u.0].push(h);
        star[v.0].push(t);
    }

    // Around each vertex, the twin of an outgoing edge continues with
    // the next outgoing edge clockwise.
    for (v, out) in star.iter_mut().enumerate() {
        let center = dcel.vertices[v].coord;
        let dir = |h: &HalfEdgeId, d: &Dcel<T>| d.coord(d.dest(*h));
        out.sort_by(|a, b| cmp_direction(center, dir(a, &dcel), dir(b, &dcel)));
        if out.windows(2).any(|w| {
            cmp_direction(center, dir(&w[0], &dcel), dir(&w[1], &dcel)) == Ordering::Equal
        }) {
            return Err(Error::topology(format!("overlapping edges at {}", VertexId(v))));
        }
        let k = out.len();
        for i in 0..k {
            let tw = dcel.twin(out[i]);
            dcel.link(tw, out[(i + k - 1) % k]);
        }
        dcel.vertices[v].incident = out.first().copied();
    }

    // Boundary cycles, with their lowest half-edge (leftmost origin).
    let n = dcel.half_edges.len();
    let mut cycle_of = vec![usize::MAX; n];
    let mut lowest: Vec<HalfEdgeId> = Vec::new();
    for start in 0..n {
        if cycle_of[start] != usize::MAX {
            continue;
        }
        let id = lowest.len();
        let mut low = HalfEdgeId(start);
        for h in dcel.face_cycle(HalfEdgeId(start)) {
            cycle_of[h.0] = id;
            if lex_cmp(dcel.coord(dcel.origin(h)), dcel.coord(dcel.origin(low))) == Ordering::Less {
                low = h;
            }
        }
        lowest.push(low);
    }

    // Outer cycles get a face each, in discovery order.
    let mut face_of_cycle: Vec<Option<FaceId>> = vec![None; lowest.len()];
    for (c, &low) in lowest.iter().enumerate() {
        if dcel.is_outer_cycle(low) {
            face_of_cycle[c] = Some(dcel.new_face(low));
        }
    }

    // Hole cycles belong to the face above the edge below them.
    for c in 0..lowest.len() {
        if face_of_cycle[c].is_some() {
            continue;
        }
        let face = resolve_hole(&dcel, c, &lowest, &cycle_of, &face_of_cycle, below)?;
        dcel.set_cycle_face(lowest[c], face);
        dcel.faces[face.0].inner.push(lowest[c]);
    }
    debug!(
        "assembled mesh: {} vertices, {} edges, {} faces",
        dcel.num_vertices(),
        dcel.num_edges(),
        dcel.num_faces()
    );
    Ok(dcel)
}

fn resolve_hole<T: GeoFloat>(
    dcel: &Dcel<T>,
    cycle: usize,
    lowest: &[HalfEdgeId],
    cycle_of: &[usize],
    face_of_cycle: &[Option<FaceId>],
    below: &[Option<usize>],
) -> Result<FaceId> {
    let mut c = cycle;
    for _ in 0..lowest.len() {
        if let Some(f) = face_of_cycle[c] {
            return Ok(f);
        }
        let v = dcel.origin(lowest[c]);
        let e = match below.get(v.0).copied().flatten() {
            Some(e) => e,
            None => return Ok(UNBOUNDED_FACE),
        };
        // The half-edge running left to right has the region above it
        // on its left.
        let h = HalfEdgeId(2 * e);
        let up = if lex_cmp(dcel.coord(dcel.origin(h)), dcel.coord(dcel.dest(h))) == Ordering::Less {
            h
        } else {
            dcel.twin(h)
        };
        c = cycle_of[up.0];
    }
    Err(Error::topology("hole nesting does not terminate"))
}
