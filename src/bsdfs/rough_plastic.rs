//! Rough dielectric coat (microfacet) over a diffuse substrate (spec
//! section 4.2).

use serde::{Deserialize, Serialize};

use crate::bsdfs::fresnel::{dielectric_reflectance, diffuse_fresnel_reflectance};
use crate::bsdfs::microfacet::MicrofacetDistribution;
use crate::bsdfs::plastic::PLASTIC_FRESNEL_SAMPLES;
use crate::bsdfs::ScatterModel;
use crate::core::frame::{abs_cos_theta, cos_theta, same_hemisphere};
use crate::core::geometry::{reflect, vec3_dot_vec3f, Spectrum};
use crate::core::lobes::{self, Lobes};
use crate::core::pbrt::Float;
use crate::core::rng::Rng;
use crate::core::sampling::{cosine_hemisphere_pdf, cosine_sample_hemisphere, INV_PI};
use crate::core::scatter_event::SurfaceScatterEvent;

#[derive(Debug, Copy, Clone, Serialize, Deserialize)]
pub struct RoughPlastic {
    pub ior: Float,
    pub albedo: Spectrum,
    pub thickness: Float,
    pub sigma_a: Spectrum,
    pub distribution: MicrofacetDistribution,
    diffuse_fresnel: Float,
}

impl RoughPlastic {
    pub fn new(
        ior: Float,
        albedo: Spectrum,
        thickness: Float,
        sigma_a: Spectrum,
        distribution: MicrofacetDistribution,
    ) -> Self {
        let diffuse_fresnel = diffuse_fresnel_reflectance(1.0 / ior, PLASTIC_FRESNEL_SAMPLES);
        RoughPlastic { ior, albedo, thickness, sigma_a, distribution, diffuse_fresnel }
    }

    fn substrate_transmittance(&self, cos_theta: Float) -> Spectrum {
        if self.sigma_a.is_black() || self.thickness == 0.0 {
            return Spectrum::new(1.0, 1.0, 1.0);
        }
        let path = 2.0 * self.thickness / cos_theta.abs().max(1e-3);
        (self.sigma_a * -path).exp()
    }

    fn diffuse_term(&self, cos_theta_i: Float, cos_theta_o: Float) -> Spectrum {
        let fi = dielectric_reflectance(cos_theta_i, self.ior);
        let fo = dielectric_reflectance(cos_theta_o, self.ior);
        let substrate_weight = self.albedo * self.substrate_transmittance(cos_theta_o);
        let compensation = 1.0 - substrate_weight.avg() * self.diffuse_fresnel;
        substrate_weight * ((1.0 - fi) * (1.0 - fo) / compensation.max(1e-3))
    }

    fn half_vector(wi: &crate::core::geometry::Vector3f, wo: &crate::core::geometry::Vector3f) -> Option<crate::core::geometry::Vector3f> {
        let sum = *wi + *wo;
        if sum.length_squared() < 1e-12 {
            return None;
        }
        let wh = sum.normalize();
        Some(if wh.z < 0.0 { -wh } else { wh })
    }
}

impl ScatterModel for RoughPlastic {
    fn eval(&self, event: &SurfaceScatterEvent) -> Spectrum {
        if !same_hemisphere(&event.wi, &event.wo) || cos_theta(&event.wi) <= 0.0 {
            return Spectrum::default();
        }
        let mut result = Spectrum::default();
        if event.requested_lobes.intersects(lobes::GLOSSY_REFLECTION) {
            if let Some(wh) = Self::half_vector(&event.wi, &event.wo) {
                let f = dielectric_reflectance(vec3_dot_vec3f(&event.wi, &wh), self.ior);
                let d = self.distribution.d(&wh);
                let g = self.distribution.g(&event.wi, &event.wo);
                let denom = 4.0 * cos_theta(&event.wi).abs() * cos_theta(&event.wo).abs();
                if denom > 0.0 {
                    result += Spectrum::new(1.0, 1.0, 1.0) * (f * d * g / denom * abs_cos_theta(&event.wo));
                }
            }
        }
        if event.requested_lobes.intersects(lobes::DIFFUSE_REFLECTION) {
            result += self.diffuse_term(cos_theta(&event.wi), cos_theta(&event.wo)) * (INV_PI * abs_cos_theta(&event.wo));
        }
        result
    }

    fn sample(&self, event: &mut SurfaceScatterEvent, rng: &mut Rng) -> bool {
        let cos_theta_i = cos_theta(&event.wi);
        if cos_theta_i <= 0.0 {
            return false;
        }
        event.draw_direction_sample(rng);
        let fi = dielectric_reflectance(cos_theta_i, self.ior);
        let wants_glossy = event.requested_lobes.intersects(lobes::GLOSSY_REFLECTION);
        let wants_diffuse = event.requested_lobes.intersects(lobes::DIFFUSE_REFLECTION);
        if !wants_glossy && !wants_diffuse {
            return false;
        }
        let pick_glossy = if wants_glossy && wants_diffuse {
            event.u1d < fi
        } else {
            wants_glossy
        };
        if pick_glossy {
            let sample_dist = self.distribution.widened_for_sampling(cos_theta_i);
            let wh = sample_dist.sample_wh(&event.wi, event.u);
            let wo = reflect(&event.wi, &wh);
            if !same_hemisphere(&event.wi, &wo) {
                return false;
            }
            event.wo = wo;
            event.sampled_lobe = lobes::GLOSSY_REFLECTION;
        } else {
            let mut wo = cosine_sample_hemisphere(&event.u);
            wo.z = wo.z.abs();
            event.wo = wo;
            event.sampled_lobe = lobes::DIFFUSE_REFLECTION;
        }
        event.pdf = self.pdf(event);
        if event.pdf <= 0.0 {
            return false;
        }
        event.weight = self.eval(event) / event.pdf;
        true
    }

    fn pdf(&self, event: &SurfaceScatterEvent) -> Float {
        if !same_hemisphere(&event.wi, &event.wo) {
            return 0.0;
        }
        let cos_theta_i = cos_theta(&event.wi);
        let fi = dielectric_reflectance(cos_theta_i, self.ior);
        let wants_glossy = event.requested_lobes.intersects(lobes::GLOSSY_REFLECTION);
        let wants_diffuse = event.requested_lobes.intersects(lobes::DIFFUSE_REFLECTION);
        let mut pdf = 0.0;
        if wants_glossy {
            if let Some(wh) = Self::half_vector(&event.wi, &event.wo) {
                let sample_dist = self.distribution.widened_for_sampling(cos_theta_i);
                let glossy_pdf = sample_dist.pdf(&event.wi, &wh) / (4.0 * vec3_dot_vec3f(&event.wo, &wh).abs());
                pdf += if wants_diffuse { fi * glossy_pdf } else { glossy_pdf };
            }
        }
        if wants_diffuse {
            let cosine_pdf = cosine_hemisphere_pdf(abs_cos_theta(&event.wo));
            pdf += if wants_glossy { (1.0 - fi) * cosine_pdf } else { cosine_pdf };
        }
        pdf
    }

    fn lobes(&self) -> Lobes {
        lobes::GLOSSY_REFLECTION | lobes::DIFFUSE_REFLECTION
    }
}
