//! Rough dielectric coat (microfacet top interface) over an arbitrary
//! child BSDF (spec section 4.2). Same Snell-refraction delegation as
//! `SmoothCoat`, with a glossy rather than Dirac top reflection lobe.

use serde::{Deserialize, Serialize};

use crate::bsdfs::fresnel::dielectric_reflectance;
use crate::bsdfs::microfacet::MicrofacetDistribution;
use crate::bsdfs::{Bsdf, ScatterModel};
use crate::core::frame::{abs_cos_theta, cos_theta, same_hemisphere};
use crate::core::geometry::{reflect, refract, vec3_dot_vec3f, Spectrum, Vector3f};
use crate::core::lobes::{self, Lobes};
use crate::core::pbrt::Float;
use crate::core::rng::Rng;
use crate::core::scatter_event::SurfaceScatterEvent;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoughCoat {
    pub ior: Float,
    pub thickness: Float,
    pub sigma_a: Spectrum,
    pub distribution: MicrofacetDistribution,
    pub substrate: Box<Bsdf>,
}

impl RoughCoat {
    fn transmittance(&self, cos_theta_substrate: Float) -> Spectrum {
        if self.sigma_a.is_black() || self.thickness == 0.0 {
            return Spectrum::new(1.0, 1.0, 1.0);
        }
        let path = self.thickness / cos_theta_substrate.abs().max(1e-3);
        (self.sigma_a * -path).exp()
    }
    fn refract_in(&self, w: &Vector3f) -> Option<Vector3f> {
        let n = Vector3f::new(0.0, 0.0, cos_theta(w).signum());
        refract(w, &n, 1.0 / self.ior)
    }
    fn refract_out(&self, w_substrate: &Vector3f) -> Option<Vector3f> {
        let n = Vector3f::new(0.0, 0.0, cos_theta(w_substrate).signum());
        refract(w_substrate, &n, self.ior)
    }
    fn top_reflection(&self, event: &SurfaceScatterEvent) -> Spectrum {
        if !event.requested_lobes.intersects(lobes::GLOSSY_REFLECTION) {
            return Spectrum::default();
        }
        let sum = event.wi + event.wo;
        if sum.length_squared() < 1e-12 {
            return Spectrum::default();
        }
        let wh = sum.normalize();
        let wh = if wh.z < 0.0 { -wh } else { wh };
        let f = dielectric_reflectance(vec3_dot_vec3f(&event.wi, &wh), self.ior);
        let d = self.distribution.d(&wh);
        let g = self.distribution.g(&event.wi, &event.wo);
        let denom = 4.0 * cos_theta(&event.wi).abs() * cos_theta(&event.wo).abs();
        if denom <= 0.0 {
            return Spectrum::default();
        }
        Spectrum::new(1.0, 1.0, 1.0) * (f * d * g / denom * abs_cos_theta(&event.wo))
    }
}

impl ScatterModel for RoughCoat {
    fn eval(&self, event: &SurfaceScatterEvent) -> Spectrum {
        if cos_theta(&event.wi) <= 0.0 || !same_hemisphere(&event.wi, &event.wo) {
            return Spectrum::default();
        }
        let mut result = self.top_reflection(event);
        let substrate_lobes = event.requested_lobes & !lobes::SPECULAR & !lobes::GLOSSY_REFLECTION;
        if !substrate_lobes.is_empty() {
            if let (Some(wi_s), Some(wo_s)) = (self.refract_in(&event.wi), self.refract_in(&event.wo)) {
                let fi = dielectric_reflectance(cos_theta(&event.wi), self.ior);
                let fo = dielectric_reflectance(cos_theta(&event.wo), self.ior);
                let mut substrate_event = SurfaceScatterEvent::new(event.frame, wi_s, substrate_lobes);
                substrate_event.wo = wo_s;
                let substrate_eval = self.substrate.eval(&substrate_event);
                let transmittance = self.transmittance(abs_cos_theta(&wi_s)) * self.transmittance(abs_cos_theta(&wo_s));
                let jacobian = (abs_cos_theta(&wo_s) / abs_cos_theta(&event.wo).max(1e-6)) / (self.ior * self.ior);
                result += substrate_eval * ((1.0 - fi) * (1.0 - fo)) * transmittance * jacobian;
            }
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
        let wants_top = event.requested_lobes.intersects(lobes::GLOSSY_REFLECTION);
        let substrate_lobes = event.requested_lobes & !lobes::SPECULAR & !lobes::GLOSSY_REFLECTION;
        let wants_substrate = !substrate_lobes.is_empty();
        if !wants_top && !wants_substrate {
            return false;
        }
        let pick_top = if wants_top && wants_substrate {
            event.u1d < fi
        } else {
            wants_top
        };
        if pick_top {
            let sample_dist = self.distribution.widened_for_sampling(cos_theta_i);
            let wh = sample_dist.sample_wh(&event.wi, event.u);
            let wo = reflect(&event.wi, &wh);
            if !same_hemisphere(&event.wi, &wo) {
                return false;
            }
            event.wo = wo;
            event.sampled_lobe = lobes::GLOSSY_REFLECTION;
        } else {
            let wi_s = match self.refract_in(&event.wi) {
                Some(w) => w,
                None => return false,
            };
            let mut substrate_event = SurfaceScatterEvent::new(event.frame, wi_s, substrate_lobes);
            substrate_event.u = event.u;
            substrate_event.u1d = event.u1d;
            if !self.substrate.sample(&mut substrate_event, rng) {
                return false;
            }
            let wo = match self.refract_out(&substrate_event.wo) {
                Some(w) => w,
                None => return false,
            };
            event.wo = wo;
            event.sampled_lobe = substrate_event.sampled_lobe;
        }
        event.pdf = self.pdf(event);
        if event.pdf <= 0.0 {
            return false;
        }
        event.weight = self.eval(event) / event.pdf;
        true
    }

    fn pdf(&self, event: &SurfaceScatterEvent) -> Float {
        if cos_theta(&event.wi) <= 0.0 || !same_hemisphere(&event.wi, &event.wo) {
            return 0.0;
        }
        let cos_theta_i = cos_theta(&event.wi);
        let fi = dielectric_reflectance(cos_theta_i, self.ior);
        let wants_top = event.requested_lobes.intersects(lobes::GLOSSY_REFLECTION);
        let substrate_lobes = event.requested_lobes & !lobes::SPECULAR & !lobes::GLOSSY_REFLECTION;
        let wants_substrate = !substrate_lobes.is_empty();
        let mut pdf = 0.0;
        if wants_top {
            let sum = event.wi + event.wo;
            if sum.length_squared() > 1e-12 {
                let wh = sum.normalize();
                let wh = if wh.z < 0.0 { -wh } else { wh };
                let sample_dist = self.distribution.widened_for_sampling(cos_theta_i);
                let top_pdf = sample_dist.pdf(&event.wi, &wh) / (4.0 * vec3_dot_vec3f(&event.wo, &wh).abs());
                pdf += if wants_substrate { fi * top_pdf } else { top_pdf };
            }
        }
        if wants_substrate {
            if let (Some(wi_s), Some(wo_s)) = (self.refract_in(&event.wi), self.refract_in(&event.wo)) {
                let mut substrate_event = SurfaceScatterEvent::new(event.frame, wi_s, substrate_lobes);
                substrate_event.wo = wo_s;
                let substrate_pdf = self.substrate.pdf(&substrate_event);
                let jacobian = abs_cos_theta(&wo_s) / (abs_cos_theta(&event.wo).max(1e-6) * self.ior * self.ior);
                let weight = if wants_top { 1.0 - fi } else { 1.0 };
                pdf += weight * substrate_pdf * jacobian;
            }
        }
        pdf
    }

    fn lobes(&self) -> Lobes {
        lobes::GLOSSY_REFLECTION | self.substrate.lobes()
    }
}
