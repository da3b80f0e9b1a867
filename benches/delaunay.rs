use criterion::*;
use geo::{Coordinate, Rect};
use geo_subdivision::triangulate;
use rand::{rngs::StdRng, SeedableRng};

#[path = "utils/random.rs"]
mod random;
use random::*;

fn bench_clouds(
    c: &mut Criterion,
    name: &str,
    cloud: impl Fn(&mut StdRng, usize) -> Vec<Coordinate<f64>>,
) {
    let mut group = c.benchmark_group(name);
    for &n in &[256usize, 1024, 4096] {
        let points = cloud(&mut StdRng::seed_from_u64(n as u64), n);
        group.bench_with_input(BenchmarkId::from_parameter(n), &points, |b, points| {
            b.iter(|| {
                let t = triangulate(points, &mut StdRng::seed_from_u64(0)).unwrap();
                black_box(t.voronoi());
            })
        });
    }
    group.finish();
}

fn uniform(c: &mut Criterion) {
    let bbox: Rect<f64> = Rect::new([0., 0.], [1024., 1024.]);
    bench_clouds(c, "Delaunay - uniform random points", |rng, n| {
        uniform_points(rng, bbox, n)
    });
}

fn circle(c: &mut Criterion) {
    let center = Coordinate { x: 512., y: 512. };
    bench_clouds(c, "Delaunay - points on a circle", |rng, n| {
        circle_points(rng, center, 512., n)
    });
}

fn grid(c: &mut Criterion) {
    let bbox: Rect<f64> = Rect::new([0., 0.], [1024., 1024.]);
    bench_clouds(c, "Delaunay - exact grid", |rng, n| {
        jittered_grid(rng, bbox, (n as f64).sqrt() as usize, 0.)
    });
}

criterion_group!(delaunay, uniform, circle, grid);
criterion_main!(delaunay);
