//! Oren-Nayar rough-diffuse reflectance (Shirley's qualitative
//! formulation, per spec section 4.2).

use serde::{Deserialize, Serialize};

use crate::bsdfs::ScatterModel;
use crate::core::frame::{abs_cos_theta, cos_phi, cos_theta, same_hemisphere, sin_phi, sin_theta, tan_theta};
use crate::core::geometry::Spectrum;
use crate::core::lobes::{self, Lobes};
use crate::core::pbrt::{clamp_t, Float};
use crate::core::rng::Rng;
use crate::core::sampling::{cosine_hemisphere_pdf, cosine_sample_hemisphere, uniform_hemisphere_pdf, uniform_sample_hemisphere, INV_PI};
use crate::core::scatter_event::SurfaceScatterEvent;

#[derive(Debug, Copy, Clone, Serialize, Deserialize)]
pub struct OrenNayar {
    pub albedo: Spectrum,
    pub roughness: Float,
}

impl OrenNayar {
    /// Mixing weight between the cosine-weighted and uniform hemisphere
    /// strategies used for sampling (spec section 4.2: "sampling uses a
    /// cosine/uniform hemisphere mixture with mixing weight
    /// `clamp(roughness, 0.01, 1)`").
    fn mixing_weight(&self) -> Float {
        clamp_t(self.roughness, 0.01, 1.0)
    }

    fn qualitative_term(&self, wi: &crate::core::geometry::Vector3f, wo: &crate::core::geometry::Vector3f) -> Float {
        let sigma2 = self.roughness * self.roughness;
        let a = 1.0 - sigma2 / (2.0 * (sigma2 + 0.33));
        let b = 0.45 * sigma2 / (sigma2 + 0.09);
        let sin_theta_i = sin_theta(wi);
        let sin_theta_o = sin_theta(wo);
        let max_cos = if sin_theta_i > 1e-4 && sin_theta_o > 1e-4 {
            let sin_phi_i = sin_phi(wi);
            let cos_phi_i = cos_phi(wi);
            let sin_phi_o = sin_phi(wo);
            let cos_phi_o = cos_phi(wo);
            (cos_phi_i * cos_phi_o + sin_phi_i * sin_phi_o).max(0.0)
        } else {
            0.0
        };
        let (sin_alpha, tan_beta) = if abs_cos_theta(wi) > abs_cos_theta(wo) {
            (sin_theta_o, sin_theta_i / abs_cos_theta(wi).max(1e-7))
        } else {
            (sin_theta_i, sin_theta_o / abs_cos_theta(wo).max(1e-7))
        };
        a + b * max_cos * sin_alpha * tan_beta
    }
}

impl ScatterModel for OrenNayar {
    fn eval(&self, event: &SurfaceScatterEvent) -> Spectrum {
        if !event.requested_lobes.intersects(lobes::DIFFUSE_REFLECTION)
            || !same_hemisphere(&event.wi, &event.wo)
            || cos_theta(&event.wi) <= 0.0
        {
            return Spectrum::default();
        }
        let term = self.qualitative_term(&event.wi, &event.wo);
        self.albedo * (INV_PI * term * abs_cos_theta(&event.wo))
    }

    fn sample(&self, event: &mut SurfaceScatterEvent, rng: &mut Rng) -> bool {
        if !event.requested_lobes.intersects(lobes::DIFFUSE_REFLECTION) || cos_theta(&event.wi) <= 0.0 {
            return false;
        }
        event.draw_direction_sample(rng);
        let w = self.mixing_weight();
        let use_uniform = event.u1d < w;
        let mut wo = if use_uniform {
            uniform_sample_hemisphere(&event.u)
        } else {
            cosine_sample_hemisphere(&event.u)
        };
        if event.wi.z < 0.0 {
            wo.z = -wo.z;
        }
        event.wo = wo;
        event.pdf = w * uniform_hemisphere_pdf() + (1.0 - w) * cosine_hemisphere_pdf(abs_cos_theta(&wo));
        event.sampled_lobe = lobes::DIFFUSE_REFLECTION;
        if event.pdf <= 0.0 {
            return false;
        }
        event.weight = self.eval(event) / event.pdf;
        tan_theta(&wo).is_finite() && !event.weight.has_nans() && event.weight.max_component().is_finite()
    }

    fn pdf(&self, event: &SurfaceScatterEvent) -> Float {
        if !event.requested_lobes.intersects(lobes::DIFFUSE_REFLECTION) || !same_hemisphere(&event.wi, &event.wo) {
            return 0.0;
        }
        let w = self.mixing_weight();
        w * uniform_hemisphere_pdf() + (1.0 - w) * cosine_hemisphere_pdf(abs_cos_theta(&event.wo))
    }

    fn lobes(&self) -> Lobes {
        lobes::DIFFUSE_REFLECTION
    }
}

trait HasNans {
    fn has_nans(&self) -> bool;
}
impl HasNans for Spectrum {
    fn has_nans(&self) -> bool {
        self.x.is_nan() || self.y.is_nan() || self.z.is_nan()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::frame::Frame;
    use crate::core::geometry::{Normal3f, Vector3f};

    #[test]
    fn eval_equals_weight_times_pdf_after_sample() {
        let bsdf = OrenNayar { albedo: Spectrum::new(0.5, 0.5, 0.5), roughness: 0.4 };
        let mut rng = Rng::new(3, 0);
        let frame = Frame::from_normal(Normal3f::new(0.0, 0.0, 1.0));
        let mut event = SurfaceScatterEvent::new(frame, Vector3f::new(0.2, 0.1, 0.97).normalize(), lobes::ALL);
        assert!(bsdf.sample(&mut event, &mut rng));
        let eval = bsdf.eval(&event);
        let predicted = event.weight * event.pdf;
        assert!((eval.x - predicted.x).abs() < 1e-3 * predicted.x.max(1.0));
    }
}
