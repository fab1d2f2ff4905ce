//! Pure-PRNG sampler (spec section 6, "uniform PRNG" strategy).

use crate::core::geometry::Point2f;
use crate::core::pbrt::Float;
use crate::core::rng::Rng;
use crate::samplers::Sampler;

/// PCG32-backed sampler with no stratification across bounces; each
/// draw is an independent uniform variate. `advance_path` is a no-op
/// since independence means there is no alignment to preserve.
#[derive(Debug, Copy, Clone)]
pub struct IndependentSampler {
    rng: Rng,
}

impl IndependentSampler {
    pub fn new(pixel_index: u64, sample_index: u64) -> Self {
        IndependentSampler { rng: Rng::new(pixel_index, sample_index) }
    }
}

/// Unseeded state for a render driver that is generic over `Sampler`;
/// every real path still calls `start_path` before drawing anything.
impl Default for IndependentSampler {
    fn default() -> Self {
        IndependentSampler { rng: Rng::default() }
    }
}

impl Sampler for IndependentSampler {
    fn start_path(&mut self, pixel_index: u64, sample_index: u64) {
        self.rng = Rng::new(pixel_index, sample_index);
    }
    fn advance_path(&mut self) {}
    fn next_1d(&mut self) -> Float {
        self.rng.uniform_float()
    }
    fn next_2d(&mut self) -> Point2f {
        Point2f { x: self.rng.uniform_float(), y: self.rng.uniform_float() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn draws_land_in_unit_interval() {
        let mut sampler = IndependentSampler::new(1, 0);
        for _ in 0..10_000 {
            let f = sampler.next_1d();
            assert!((0.0..1.0).contains(&f));
            let p = sampler.next_2d();
            assert!((0.0..1.0).contains(&p.x) && (0.0..1.0).contains(&p.y));
        }
    }

    #[test]
    fn distinct_pixels_diverge() {
        let mut a = IndependentSampler::new(1, 0);
        let mut b = IndependentSampler::new(2, 0);
        assert_ne!(a.next_1d(), b.next_1d());
    }
}
