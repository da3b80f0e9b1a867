//! Random inputs shared by the benches and the unit tests: segments for
//! the arrangement, point clouds for the triangulation.
use std::f64::consts::PI;

use geo::{rotate::RotatePoint, Coordinate, Line, Rect};

use rand::Rng;
use rand_distr::Standard;

#[inline]
pub fn uniform_point<R: Rng>(rng: &mut R, bounds: Rect<f64>) -> Coordinate<f64> {
    let coords: [f64; 2] = rng.sample(Standard);
    let dims = bounds.max() - bounds.min();
    Coordinate {
        x: bounds.min().x + dims.x * coords[0],
        y: bounds.min().y + dims.y * coords[1],
    }
}

#[allow(dead_code)]
pub fn uniform_points<R: Rng>(rng: &mut R, bounds: Rect<f64>, n: usize) -> Vec<Coordinate<f64>> {
    (0..n).map(|_| uniform_point(rng, bounds)).collect()
}

/// `n` points at random angles on a circle; every one of them is a
/// hull corner and any four are nearly co-circular.
#[allow(dead_code)]
pub fn circle_points<R: Rng>(
    rng: &mut R,
    center: Coordinate<f64>,
    radius: f64,
    n: usize,
) -> Vec<Coordinate<f64>> {
    (0..n)
        .map(|_| {
            let angle = rng.sample::<f64, _>(Standard) * 2. * PI;
            Coordinate {
                x: center.x + radius * angle.cos(),
                y: center.y + radius * angle.sin(),
            }
        })
        .collect()
}

/// A `side × side` lattice filling `bounds`, each point moved by up to
/// `jitter` in both coordinates. No jitter gives the exact lattice,
/// full of collinear and co-circular points.
#[allow(dead_code)]
pub fn jittered_grid<R: Rng>(
    rng: &mut R,
    bounds: Rect<f64>,
    side: usize,
    jitter: f64,
) -> Vec<Coordinate<f64>> {
    let step = (bounds.max() - bounds.min()) / (side.max(2) - 1) as f64;
    let mut points = Vec::with_capacity(side * side);
    for i in 0..side {
        for j in 0..side {
            let mut shift = || {
                if jitter > 0. {
                    rng.gen_range(-jitter..jitter)
                } else {
                    0.
                }
            };
            points.push(Coordinate {
                x: bounds.min().x + step.x * i as f64 + shift(),
                y: bounds.min().y + step.y * j as f64 + shift(),
            });
        }
    }
    points
}

#[inline]
#[allow(dead_code)]
pub fn uniform_line<R: Rng>(rng: &mut R, bounds: Rect<f64>) -> Line<f64> {
    Line::new(uniform_point(rng, bounds), uniform_point(rng, bounds))
}

#[inline]
#[allow(dead_code)]
pub fn uniform_line_with_length<R: Rng>(rng: &mut R, bounds: Rect<f64>, length: f64) -> Line<f64> {
    let start = uniform_point(rng, bounds);
    let line = Line::new(start, start + (length, 0.).into());
    let angle = rng.sample::<f64, _>(Standard) * 2. * PI;
    line.rotate_around_point(angle, start.into())
}
