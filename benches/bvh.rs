//! BVH build and traversal throughput on a synthetic scattered-cube
//! scene, the only acceleration structure this crate ships.

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use radiance_core::accelerators::bvh::{Bvh, BvhBuildPrimitive};
use radiance_core::core::geometry::{Bounds3f, Point3f, Ray, Vector3f};
use radiance_core::core::rng::Rng;

const PRIMITIVE_COUNT: usize = 20_000;
const WORLD_EXTENT: f32 = 1_000.0;
const CUBE_HALF_SIZE: f32 = 0.5;

fn scattered_cubes(count: usize) -> Vec<BvhBuildPrimitive> {
    let mut rng = Rng::new(7, 0);
    (0..count)
        .map(|i| {
            let center = Point3f::new(
                (rng.uniform_float() - 0.5) * 2.0 * WORLD_EXTENT,
                (rng.uniform_float() - 0.5) * 2.0 * WORLD_EXTENT,
                (rng.uniform_float() - 0.5) * 2.0 * WORLD_EXTENT,
            );
            let half = Vector3f::new(CUBE_HALF_SIZE, CUBE_HALF_SIZE, CUBE_HALF_SIZE);
            BvhBuildPrimitive::new(i as u32, Bounds3f::new(center - half, center + half))
        })
        .collect()
}

fn build_benchmark(c: &mut Criterion) {
    c.bench_function("bvh_build_20k", |b| {
        b.iter(|| {
            let prims = scattered_cubes(PRIMITIVE_COUNT);
            black_box(Bvh::build(prims, 4));
        })
    });
}

fn intersect_benchmark(c: &mut Criterion) {
    let bvh = Bvh::build(scattered_cubes(PRIMITIVE_COUNT), 4);
    let mut rng = Rng::new(11, 0);
    c.bench_function("bvh_intersect_20k", |b| {
        b.iter(|| {
            let o = Point3f::new(
                (rng.uniform_float() - 0.5) * 2.0 * WORLD_EXTENT,
                (rng.uniform_float() - 0.5) * 2.0 * WORLD_EXTENT,
                (rng.uniform_float() - 0.5) * 2.0 * WORLD_EXTENT,
            );
            let mut ray = Ray::new(o, Vector3f::new(0.0, 0.0, 1.0));
            black_box(bvh.intersect(&mut ray, |_, _| true));
        })
    });
}

criterion_group!(benches, build_benchmark, intersect_benchmark);
criterion_main!(benches);
