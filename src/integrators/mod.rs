//! Light-transport integrators (spec section 4.3, "Integrator").
//!
//! A single strategy is in scope: unidirectional path tracing with
//! next-event estimation and multiple importance sampling against the
//! light importance tree (`lights::LightTree`). Bidirectional/Metropolis
//! strategies are out of scope (see the crate's design ledger); the
//! tile-parallel render driver here plays the role the teacher's
//! `BlockQueue`-fed `render_tile`/`render` pair plays for `BDPTIntegrator`,
//! adapted to `rayon` scoped row chunks since there is no HTTP tile
//! dispatcher in this core.

pub mod path;

pub use path::PathTracer;

use rayon::prelude::*;

use crate::cameras::PinholeCamera;
use crate::core::geometry::Spectrum;
use crate::core::rng::Rng;
use crate::core::scene::Scene;
use crate::samplers::Sampler;

/// Tunable knobs for a path-tracing render (spec section 4.3 plus the
/// ambient configuration layer SPEC_FULL.md adds in section 7).
#[derive(Debug, Copy, Clone)]
pub struct IntegratorSettings {
    /// Hard cap on the number of surface/medium bounces a path may take.
    pub max_bounces: u32,
    /// Bounces below this count are never subjected to Russian roulette.
    pub min_bounces_before_rr: u32,
    /// Whether next-event estimation runs at all; disabling it leaves
    /// unidirectional BSDF sampling as the only source of illumination,
    /// useful as a reference path for comparing against the NEE+MIS
    /// estimator in tests.
    pub enable_light_sampling: bool,
    /// Whether a hit on the back side of a one-sided (non-transmissive)
    /// BSDF flips the shading frame rather than returning black.
    pub enable_two_sided_shading: bool,
    /// Whether a sampled continuation direction whose geometric-normal
    /// hemisphere disagrees with its shading-normal hemisphere aborts
    /// the path (guards against light leaks through bump-mapped grazing
    /// geometry; spec section 4.3, "shading/geometric normal conflict").
    pub enable_consistency_checks: bool,
    /// Substituted for any radiance estimate that would otherwise carry
    /// a NaN or infinity (spec section 7, tier 1 recoverable numeric
    /// conditions).
    pub nan_sentinel: Spectrum,
    /// Per-channel clamp applied to every path's contribution before it
    /// is accumulated, bounding the variance a single firefly sample can
    /// contribute to a pixel.
    pub firefly_clamp: f32,
}

impl Default for IntegratorSettings {
    fn default() -> Self {
        IntegratorSettings {
            max_bounces: 64,
            min_bounces_before_rr: 2,
            enable_light_sampling: true,
            enable_two_sided_shading: true,
            enable_consistency_checks: true,
            nan_sentinel: Spectrum::default(),
            firefly_clamp: 100.0,
        }
    }
}

/// Accumulates per-pixel radiance sums so a render can resume/add more
/// samples without re-normalizing on every call (spec section 5, "a
/// tile's framebuffer slice is written by exactly one worker until the
/// tile completes").
pub struct Framebuffer {
    width: u32,
    height: u32,
    sums: Vec<Spectrum>,
    counts: Vec<u32>,
}

impl Framebuffer {
    pub fn new(width: u32, height: u32) -> Self {
        let n = (width as usize) * (height as usize);
        Framebuffer { width, height, sums: vec![Spectrum::default(); n], counts: vec![0; n] }
    }

    pub fn width(&self) -> u32 {
        self.width
    }
    pub fn height(&self) -> u32 {
        self.height
    }

    fn index(&self, x: u32, y: u32) -> usize {
        (y as usize) * (self.width as usize) + (x as usize)
    }

    pub fn accumulate(&mut self, x: u32, y: u32, value: Spectrum) {
        let i = self.index(x, y);
        self.sums[i] += value;
        self.counts[i] += 1;
    }

    /// The resolved average at `(x, y)`, or black if no sample ever
    /// landed there.
    pub fn pixel(&self, x: u32, y: u32) -> Spectrum {
        let i = self.index(x, y);
        if self.counts[i] == 0 {
            Spectrum::default()
        } else {
            self.sums[i] / self.counts[i] as f32
        }
    }

    /// Row-major resolved image, one `Spectrum` per pixel.
    pub fn resolve(&self) -> Vec<Spectrum> {
        self.sums
            .iter()
            .zip(self.counts.iter())
            .map(|(&sum, &count)| if count == 0 { Spectrum::default() } else { sum / count as f32 })
            .collect()
    }
}

/// Rows per tile handed to a single `rayon` task; large enough that
/// per-tile dispatch overhead is negligible next to path-tracing cost,
/// small enough that the work-stealing scheduler keeps all threads busy
/// on scenes with a very uneven cost distribution across the image.
const TILE_ROWS: u32 = 16;

/// Renders `scene` through `camera` at `spp` samples per pixel, driving
/// `spp` independent path-tracer evaluations per pixel and averaging
/// them (spec section 4.3, `render`). Tiles are disjoint row bands; each
/// is owned by exactly one `rayon` task for its entire lifetime, so no
/// pixel is ever written by two threads and no per-pixel locking is
/// needed (spec section 5, concurrency model).
pub fn render<S: Sampler + Default>(
    integrator: &PathTracer,
    scene: &Scene,
    camera: &PinholeCamera,
    resolution: (u32, u32),
    spp: u32,
) -> Framebuffer {
    let (width, height) = resolution;
    let mut framebuffer = Framebuffer::new(width, height);
    let n_tiles = (height + TILE_ROWS - 1) / TILE_ROWS;

    let tiles: Vec<(u32, Vec<Spectrum>)> = (0..n_tiles)
        .into_par_iter()
        .map(|tile_index| {
            let y0 = tile_index * TILE_ROWS;
            let y1 = (y0 + TILE_ROWS).min(height);
            let mut tile_pixels = Vec::with_capacity(((y1 - y0) * width) as usize);
            for y in y0..y1 {
                for x in 0..width {
                    let pixel_index = (y as u64) * (width as u64) + x as u64;
                    let mut sum = Spectrum::default();
                    for sample_index in 0..spp as u64 {
                        let mut sampler = S::default();
                        sampler.start_path(pixel_index, sample_index);
                        let mut rng = Rng::new(pixel_index, sample_index ^ 0x9e37_79b9_7f4a_7c15);
                        let jitter = sampler.next_2d();
                        let (ray, camera_weight) = camera.sample_ray((x, y), jitter, sampler.next_2d());
                        let radiance = integrator.li(scene, ray, camera.medium.clone(), &mut sampler, &mut rng);
                        sum += radiance * camera_weight;
                    }
                    tile_pixels.push(sum / spp.max(1) as f32);
                }
            }
            (y0, tile_pixels)
        })
        .collect();

    for (y0, tile_pixels) in tiles {
        for (i, value) in tile_pixels.into_iter().enumerate() {
            let x = (i as u32) % width;
            let y = y0 + (i as u32) / width;
            framebuffer.accumulate(x, y, value);
        }
    }
    framebuffer
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn framebuffer_averages_accumulated_samples() {
        let mut fb = Framebuffer::new(2, 2);
        fb.accumulate(0, 0, Spectrum::new(1.0, 1.0, 1.0));
        fb.accumulate(0, 0, Spectrum::new(3.0, 3.0, 3.0));
        let p = fb.pixel(0, 0);
        assert!((p.x - 2.0).abs() < 1e-6);
    }

    #[test]
    fn untouched_pixel_resolves_to_black() {
        let fb = Framebuffer::new(4, 4);
        assert_eq!(fb.pixel(3, 3), Spectrum::default());
    }
}
