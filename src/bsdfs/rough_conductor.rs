//! Rough conductor: microfacet reflection with complex-IOR Fresnel
//! (spec section 4.2).

use serde::{Deserialize, Serialize};

use crate::bsdfs::fresnel::conductor_reflectance;
use crate::bsdfs::microfacet::MicrofacetDistribution;
use crate::bsdfs::ScatterModel;
use crate::core::frame::{abs_cos_theta, cos_theta, same_hemisphere};
use crate::core::geometry::{reflect, vec3_dot_vec3f, Spectrum, Vector3f};
use crate::core::lobes::{self, Lobes};
use crate::core::pbrt::Float;
use crate::core::rng::Rng;
use crate::core::scatter_event::SurfaceScatterEvent;

#[derive(Debug, Copy, Clone, Serialize, Deserialize)]
pub struct RoughConductor {
    pub eta: Spectrum,
    pub k: Spectrum,
    pub distribution: MicrofacetDistribution,
}

impl RoughConductor {
    fn half_vector(wi: &Vector3f, wo: &Vector3f) -> Option<Vector3f> {
        let sum = *wi + *wo;
        if sum.length_squared() < 1e-12 {
            return None;
        }
        let wh = sum.normalize();
        Some(if wh.z < 0.0 { -wh } else { wh })
    }
}

impl ScatterModel for RoughConductor {
    fn eval(&self, event: &SurfaceScatterEvent) -> Spectrum {
        if !event.requested_lobes.intersects(lobes::GLOSSY_REFLECTION) || !same_hemisphere(&event.wi, &event.wo) {
            return Spectrum::default();
        }
        let cos_theta_i = cos_theta(&event.wi).abs();
        let cos_theta_o = cos_theta(&event.wo).abs();
        if cos_theta_i == 0.0 || cos_theta_o == 0.0 {
            return Spectrum::default();
        }
        let wh = match Self::half_vector(&event.wi, &event.wo) {
            Some(wh) => wh,
            None => return Spectrum::default(),
        };
        let f = conductor_reflectance(vec3_dot_vec3f(&event.wi, &wh), self.eta, self.k);
        let d = self.distribution.d(&wh);
        let g = self.distribution.g(&event.wi, &event.wo);
        f * (d * g / (4.0 * cos_theta_i * cos_theta_o) * abs_cos_theta(&event.wo))
    }

    fn sample(&self, event: &mut SurfaceScatterEvent, rng: &mut Rng) -> bool {
        if !event.requested_lobes.intersects(lobes::GLOSSY_REFLECTION) {
            return false;
        }
        let cos_theta_i = cos_theta(&event.wi);
        if cos_theta_i <= 0.0 {
            return false;
        }
        event.draw_direction_sample(rng);
        let sample_dist = self.distribution.widened_for_sampling(cos_theta_i);
        let wh = sample_dist.sample_wh(&event.wi, event.u);
        let wo = reflect(&event.wi, &wh);
        if !same_hemisphere(&event.wi, &wo) {
            return false;
        }
        event.wo = wo;
        event.sampled_lobe = lobes::GLOSSY_REFLECTION;
        event.pdf = self.pdf(event);
        if event.pdf <= 0.0 {
            return false;
        }
        event.weight = self.eval(event) / event.pdf;
        true
    }

    fn pdf(&self, event: &SurfaceScatterEvent) -> Float {
        if !event.requested_lobes.intersects(lobes::GLOSSY_REFLECTION) || !same_hemisphere(&event.wi, &event.wo) {
            return 0.0;
        }
        let wh = match Self::half_vector(&event.wi, &event.wo) {
            Some(wh) => wh,
            None => return 0.0,
        };
        let cos_theta_i = cos_theta(&event.wi);
        let sample_dist = self.distribution.widened_for_sampling(cos_theta_i);
        sample_dist.pdf(&event.wi, &wh) / (4.0 * vec3_dot_vec3f(&event.wo, &wh).abs())
    }

    fn lobes(&self) -> Lobes {
        lobes::GLOSSY_REFLECTION
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::frame::Frame;
    use crate::core::geometry::Normal3f;

    #[test]
    fn eval_equals_weight_times_pdf_after_sample() {
        let bsdf = RoughConductor {
            eta: Spectrum::new(0.2, 0.92, 1.1),
            k: Spectrum::new(3.91, 2.45, 2.14),
            distribution: MicrofacetDistribution::ggx(0.3),
        };
        let mut rng = Rng::new(6, 0);
        let frame = Frame::from_normal(Normal3f::new(0.0, 0.0, 1.0));
        let mut event = SurfaceScatterEvent::new(frame, Vector3f::new(0.1, 0.05, 0.99).normalize(), lobes::ALL);
        assert!(bsdf.sample(&mut event, &mut rng));
        let eval = bsdf.eval(&event);
        let predicted = event.weight * event.pdf;
        assert!((eval.x - predicted.x).abs() < 1e-3 * predicted.x.max(1.0));
    }
}
