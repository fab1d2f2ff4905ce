//! Isotropic phase function: uniform scattering in all directions (spec
//! section 4.2, "Phase functions").

use crate::core::geometry::{Point2f, Spectrum, Vector3f};
use crate::core::pbrt::Float;
use crate::core::rng::Rng;
use crate::core::sampling::{uniform_sample_sphere, uniform_sphere_pdf, INV_4_PI};
use crate::media::PhaseFunction;

#[derive(Debug, Default, Copy, Clone)]
pub struct Isotropic;

impl PhaseFunction for Isotropic {
    fn eval(&self, _wi: &Vector3f, _wo: &Vector3f) -> Spectrum {
        Spectrum::new(INV_4_PI, INV_4_PI, INV_4_PI)
    }

    fn sample(&self, _wi: &Vector3f, rng: &mut Rng) -> Option<(Vector3f, Float)> {
        let u = Point2f { x: rng.uniform_float(), y: rng.uniform_float() };
        let wo = uniform_sample_sphere(u);
        Some((wo, uniform_sphere_pdf()))
    }

    fn pdf(&self, _wi: &Vector3f, _wo: &Vector3f) -> Float {
        uniform_sphere_pdf()
    }
}
