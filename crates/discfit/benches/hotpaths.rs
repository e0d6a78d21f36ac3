use criterion::{black_box, criterion_group, criterion_main, Criterion};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use discfit::{
    gaussian_ring_map, henyey_greenstein_map, score_annulus_band, score_ellipse_curve,
    score_residual, AnnulusBand, CurveSampling, EllipseCurve, GaussianRing, HenyeyGreensteinRing,
    Image,
};

fn noisy_ring(size: usize, seed: u64) -> (Image, GaussianRing) {
    let band = AnnulusBand::new(
        size as f64 * 0.3,
        4.0,
        35.0,
        20.0,
        size as f64 * 0.5,
        size as f64 * 0.5,
    )
    .expect("band");
    let ring = GaussianRing::new(band, 100.0, 2.0).expect("ring");
    let clean = gaussian_ring_map(&ring, size, size).expect("map");
    let mut rng = StdRng::seed_from_u64(seed);
    let img = Image::from_fn(size, size, |r, c| clean.get(r, c) + rng.gen_range(-5.0..5.0));
    (img, ring)
}

fn bench_curve_score(c: &mut Criterion) {
    let (img, ring) = noisy_ring(282, 7);
    let curve: EllipseCurve = ring.band.curve();
    let sampling = CurveSampling::default();
    c.bench_function("curve_score_282px_400s", |b| {
        b.iter(|| score_ellipse_curve(black_box(&curve), black_box(&img), &sampling))
    });
}

fn bench_band_score(c: &mut Criterion) {
    let (img, ring) = noisy_ring(282, 8);
    c.bench_function("band_score_282px", |b| {
        b.iter(|| score_annulus_band(black_box(&ring.band), black_box(&img)))
    });
}

fn bench_maps(c: &mut Criterion) {
    let (img, ring) = noisy_ring(128, 9);
    c.bench_function("gaussian_map_128px", |b| {
        b.iter(|| gaussian_ring_map(black_box(&ring), 128, 128))
    });

    let hg = HenyeyGreensteinRing::new(ring, 0.4).expect("hg ring");
    c.bench_function("hg_map_128px", |b| {
        b.iter(|| henyey_greenstein_map(black_box(&hg), 128, 128))
    });

    let map = gaussian_ring_map(&ring, 128, 128).expect("map");
    c.bench_function("residual_128px", |b| {
        b.iter(|| score_residual(black_box(&map), black_box(&img)))
    });
}

criterion_group!(hotpaths, bench_curve_score, bench_band_score, bench_maps);
criterion_main!(hotpaths);
