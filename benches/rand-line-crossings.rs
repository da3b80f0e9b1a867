use criterion::*;
use geo::Rect;

const BBOX: [f64; 2] = [1024., 1024.];

#[path = "utils/random.rs"]
mod random;
#[path = "utils/crossings.rs"]
mod crossings;
use crossings::*;
use rand::thread_rng;
use random::*;

fn length_lc(c: &mut Criterion) {
    const NUM_LINES: usize = 1024;

    let bbox: Rect<f64> = Rect::new([0., 0.], BBOX);
    let line_len = BBOX[0] / 5.;

    let lines: Vec<_> = (0..NUM_LINES).map(|_| uniform_line_with_length(&mut thread_rng(), bbox, line_len)).collect();
    c.bench_function("Bentley-Ottman - short random lines", |b| {
        b.iter(|| black_box(count_bo(&lines)))
    });
    c.bench_function("Arrangement - short random lines", |b| {
        b.iter(|| black_box(count_edges(&lines)))
    });
    c.bench_function("Brute-Force - short random lines", |b| {
        b.iter(|| black_box(count_brute(&lines)))
    });
    c.bench_function("R-Tree - short random lines", |b| {
        b.iter(|| black_box(count_rtree(&lines)))
    });
}

fn uniform_lc(c: &mut Criterion) {
    const NUM_LINES: usize = 256;
    let bbox: Rect<f64> = Rect::new([0., 0.], BBOX);

    let lines: Vec<_> = (0..NUM_LINES).map(|_| uniform_line(&mut thread_rng(), bbox)).collect();
    c.bench_function("Bentley-Ottman - uniform random lines", |b| {
        b.iter(|| black_box(count_bo(&lines)))
    });
    c.bench_function("Brute-Force - uniform random lines", |b| {
        b.iter(|| black_box(count_brute(&lines)))
    });
}

criterion_group!(random, uniform_lc, length_lc);
criterion_main!(random);
