//! Rough dielectric interface: microfacet reflection/refraction with a
//! configurable normal distribution (spec section 4.2).

use serde::{Deserialize, Serialize};

use crate::bsdfs::fresnel::dielectric_reflectance;
use crate::bsdfs::microfacet::MicrofacetDistribution;
use crate::bsdfs::ScatterModel;
use crate::core::frame::{abs_cos_theta, cos_theta, same_hemisphere};
use crate::core::geometry::{refract, vec3_dot_vec3f, Spectrum, Vector3f};
use crate::core::lobes::{self, Lobes};
use crate::core::pbrt::Float;
use crate::core::rng::Rng;
use crate::core::scatter_event::SurfaceScatterEvent;

#[derive(Debug, Copy, Clone, Serialize, Deserialize)]
pub struct RoughDielectric {
    pub ior: Float,
    pub distribution: MicrofacetDistribution,
}

impl RoughDielectric {
    fn half_vector_reflect(wi: &Vector3f, wo: &Vector3f) -> Vector3f {
        (*wi + *wo).normalize()
    }
    fn half_vector_refract(wi: &Vector3f, wo: &Vector3f, eta: Float) -> Vector3f {
        let h = *wi + *wo * eta;
        let h = if h.length_squared() < 1e-12 { Vector3f::new(0.0, 0.0, 1.0) } else { h.normalize() };
        if h.z < 0.0 {
            -h
        } else {
            h
        }
    }
}

impl ScatterModel for RoughDielectric {
    fn eval(&self, event: &SurfaceScatterEvent) -> Spectrum {
        let cos_theta_i = cos_theta(&event.wi);
        let cos_theta_o = cos_theta(&event.wo);
        if cos_theta_i == 0.0 || cos_theta_o == 0.0 {
            return Spectrum::default();
        }
        let reflect_event = same_hemisphere(&event.wi, &event.wo);
        if reflect_event {
            if !event.requested_lobes.intersects(lobes::GLOSSY_REFLECTION) {
                return Spectrum::default();
            }
            let wh = Self::half_vector_reflect(&event.wi, &event.wo);
            let wh = if wh.z < 0.0 { -wh } else { wh };
            let f = dielectric_reflectance(vec3_dot_vec3f(&event.wi, &wh), self.ior);
            let d = self.distribution.d(&wh);
            let g = self.distribution.g(&event.wi, &event.wo);
            let denom = 4.0 * cos_theta_i.abs() * cos_theta_o.abs();
            if denom <= 0.0 {
                return Spectrum::default();
            }
            Spectrum::new(1.0, 1.0, 1.0) * (f * d * g * abs_cos_theta(&event.wo) / denom)
        } else {
            if !event.requested_lobes.intersects(lobes::GLOSSY_TRANSMISSION) {
                return Spectrum::default();
            }
            let eta = if cos_theta_i > 0.0 { self.ior } else { 1.0 / self.ior };
            let wh = Self::half_vector_refract(&event.wi, &event.wo, eta);
            let f = dielectric_reflectance(vec3_dot_vec3f(&event.wi, &wh), self.ior);
            let d = self.distribution.d(&wh);
            let g = self.distribution.g(&event.wi, &event.wo);
            let sqrt_denom = vec3_dot_vec3f(&event.wi, &wh) + eta * vec3_dot_vec3f(&event.wo, &wh);
            if sqrt_denom.abs() < 1e-7 {
                return Spectrum::default();
            }
            let num = (1.0 - f) * d * g
                * (vec3_dot_vec3f(&event.wi, &wh) * vec3_dot_vec3f(&event.wo, &wh)).abs()
                * abs_cos_theta(&event.wo);
            let denom = cos_theta_i * cos_theta_o * sqrt_denom * sqrt_denom;
            Spectrum::new(1.0, 1.0, 1.0) * (num / denom).abs()
        }
    }

    fn sample(&self, event: &mut SurfaceScatterEvent, rng: &mut Rng) -> bool {
        let cos_theta_i = cos_theta(&event.wi);
        if cos_theta_i == 0.0 {
            return false;
        }
        event.draw_direction_sample(rng);
        let sample_dist = self.distribution.widened_for_sampling(cos_theta_i);
        let wi_for_sampling = if cos_theta_i < 0.0 { -event.wi } else { event.wi };
        let mut wh = sample_dist.sample_wh(&wi_for_sampling, event.u);
        if cos_theta_i < 0.0 {
            wh = -wh;
        }
        let f = dielectric_reflectance(vec3_dot_vec3f(&event.wi, &wh), self.ior);
        let wants_reflection = event.requested_lobes.intersects(lobes::GLOSSY_REFLECTION);
        let wants_transmission = event.requested_lobes.intersects(lobes::GLOSSY_TRANSMISSION);
        if !wants_reflection && !wants_transmission {
            return false;
        }
        let pick_reflection = if wants_reflection && wants_transmission {
            event.u1d < f
        } else {
            wants_reflection
        };
        if pick_reflection {
            let wo = crate::core::geometry::reflect(&event.wi, &wh);
            if !same_hemisphere(&event.wi, &wo) {
                return false;
            }
            event.wo = wo;
            event.sampled_lobe = lobes::GLOSSY_REFLECTION;
        } else {
            let eta = if cos_theta_i > 0.0 { 1.0 / self.ior } else { self.ior };
            let wo = match refract(&event.wi, &wh, eta) {
                Some(wo) => wo,
                None => return false,
            };
            if same_hemisphere(&event.wi, &wo) {
                return false;
            }
            event.wo = wo;
            event.sampled_lobe = lobes::GLOSSY_TRANSMISSION;
        }
        event.pdf = self.pdf(event);
        if event.pdf <= 0.0 || !event.pdf.is_finite() {
            return false;
        }
        event.weight = self.eval(event) / event.pdf;
        true
    }

    fn pdf(&self, event: &SurfaceScatterEvent) -> Float {
        let cos_theta_i = cos_theta(&event.wi);
        let cos_theta_o = cos_theta(&event.wo);
        if cos_theta_i == 0.0 || cos_theta_o == 0.0 {
            return 0.0;
        }
        let reflect_event = same_hemisphere(&event.wi, &event.wo);
        let f = if reflect_event {
            let wh = Self::half_vector_reflect(&event.wi, &event.wo);
            let wh = if wh.z < 0.0 { -wh } else { wh };
            dielectric_reflectance(vec3_dot_vec3f(&event.wi, &wh), self.ior)
        } else {
            let eta = if cos_theta_i > 0.0 { self.ior } else { 1.0 / self.ior };
            let wh = Self::half_vector_refract(&event.wi, &event.wo, eta);
            dielectric_reflectance(vec3_dot_vec3f(&event.wi, &wh), self.ior)
        };
        let sample_dist = self.distribution.widened_for_sampling(cos_theta_i);
        if reflect_event {
            if !event.requested_lobes.intersects(lobes::GLOSSY_REFLECTION) {
                return 0.0;
            }
            let wh = Self::half_vector_reflect(&event.wi, &event.wo);
            let wh = if wh.z < 0.0 { -wh } else { wh };
            let wi_for_sampling = if cos_theta_i < 0.0 { -event.wi } else { event.wi };
            let wh_for_sampling = if cos_theta_i < 0.0 { -wh } else { wh };
            let jacobian = 1.0 / (4.0 * vec3_dot_vec3f(&event.wo, &wh).abs());
            sample_dist.pdf(&wi_for_sampling, &wh_for_sampling) * jacobian * f
        } else {
            if !event.requested_lobes.intersects(lobes::GLOSSY_TRANSMISSION) {
                return 0.0;
            }
            let eta = if cos_theta_i > 0.0 { self.ior } else { 1.0 / self.ior };
            let wh = Self::half_vector_refract(&event.wi, &event.wo, eta);
            let wi_for_sampling = if cos_theta_i < 0.0 { -event.wi } else { event.wi };
            let wh_for_sampling = if cos_theta_i < 0.0 { -wh } else { wh };
            let sqrt_denom = vec3_dot_vec3f(&event.wi, &wh) + eta * vec3_dot_vec3f(&event.wo, &wh);
            let jacobian = (eta * eta * vec3_dot_vec3f(&event.wo, &wh)).abs() / (sqrt_denom * sqrt_denom);
            sample_dist.pdf(&wi_for_sampling, &wh_for_sampling) * jacobian * (1.0 - f)
        }
    }

    fn lobes(&self) -> Lobes {
        lobes::GLOSSY_REFLECTION | lobes::GLOSSY_TRANSMISSION
    }
}
