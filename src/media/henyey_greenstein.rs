//! Henyey-Greenstein phase function with asymmetry parameter `g`
//! (spec section 4.2, "Phase functions"), after
//! `original_source/src/core/phasefunctions/HenyeyGreensteinPhaseFunction.cpp`.

use std::f32::consts::PI;

use crate::core::frame::Frame;
use crate::core::geometry::{vec3_dot_vec3f, Normal3f, Spectrum, Vector3f};
use crate::core::pbrt::{clamp_t, Float};
use crate::core::rng::Rng;
use crate::core::sampling::INV_4_PI;
use crate::media::PhaseFunction;

#[derive(Debug, Copy, Clone)]
pub struct HenyeyGreenstein {
    /// Asymmetry in `(-1, 1)`: positive values scatter forward, negative
    /// values scatter backward, `0` is isotropic.
    pub g: Float,
}

impl HenyeyGreenstein {
    fn phase(&self, cos_theta: Float) -> Float {
        let g = self.g;
        let term = 1.0 + g * g - 2.0 * g * cos_theta;
        INV_4_PI * (1.0 - g * g) / (term * term.max(1e-12).sqrt())
    }
}

impl PhaseFunction for HenyeyGreenstein {
    fn eval(&self, wi: &Vector3f, wo: &Vector3f) -> Spectrum {
        let v = self.phase(vec3_dot_vec3f(wi, wo));
        Spectrum::new(v, v, v)
    }

    fn sample(&self, wi: &Vector3f, rng: &mut Rng) -> Option<(Vector3f, Float)> {
        if self.g.abs() < 1e-3 {
            return crate::media::isotropic::Isotropic.sample(wi, rng);
        }
        let xi_x = rng.uniform_float();
        let xi_y = rng.uniform_float();
        let phi = xi_x * 2.0 * PI;
        let g = self.g;
        let sqr_term = (1.0 - g * g) / (1.0 + g * (xi_y * 2.0 - 1.0));
        let cos_theta = clamp_t((1.0 + g * g - sqr_term * sqr_term) / (2.0 * g), -1.0, 1.0);
        let sin_theta = (0.0_f32).max(1.0 - cos_theta * cos_theta).sqrt();
        let local = Vector3f::new(phi.cos() * sin_theta, phi.sin() * sin_theta, cos_theta);
        let frame = Frame::from_normal(Normal3f::new(wi.x, wi.y, wi.z));
        let wo = frame.to_world(&local);
        Some((wo, self.phase(cos_theta)))
    }

    fn pdf(&self, wi: &Vector3f, wo: &Vector3f) -> Float {
        self.phase(vec3_dot_vec3f(wi, wo))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn isotropic_limit_matches_uniform_sphere_pdf() {
        let hg = HenyeyGreenstein { g: 0.0 };
        let wi = Vector3f::new(0.0, 0.0, 1.0);
        let wo = Vector3f::new(0.0, 1.0, 0.0);
        assert!((hg.pdf(&wi, &wo) - crate::core::sampling::uniform_sphere_pdf()).abs() < 1e-6);
    }

    #[test]
    fn forward_scattering_peaks_along_incoming_direction() {
        let hg = HenyeyGreenstein { g: 0.8 };
        let wi = Vector3f::new(0.0, 0.0, 1.0);
        let forward = hg.pdf(&wi, &wi);
        let backward = hg.pdf(&wi, &-wi);
        assert!(forward > backward);
    }
}
