//! Smooth dielectric coat over a diffuse substrate (spec section 4.2).
//!
//! Internal reflection at the coat/substrate interface is compensated
//! with a pre-integrated diffuse Fresnel term computed once in
//! `prepare_for_render` (see `bsdfs::fresnel::diffuse_fresnel_reflectance`
//! and DESIGN.md open question 3).

use serde::{Deserialize, Serialize};

use crate::bsdfs::fresnel::{dielectric_reflectance, diffuse_fresnel_reflectance};
use crate::bsdfs::ScatterModel;
use crate::core::frame::{abs_cos_theta, cos_theta, same_hemisphere};
use crate::core::geometry::{Spectrum, Vector3f};
use crate::core::lobes::{self, Lobes};
use crate::core::pbrt::Float;
use crate::core::rng::Rng;
use crate::core::sampling::{cosine_hemisphere_pdf, cosine_sample_hemisphere, INV_PI};
use crate::core::scatter_event::SurfaceScatterEvent;

pub const PLASTIC_FRESNEL_SAMPLES: usize = 100_000;

#[derive(Debug, Copy, Clone, Serialize, Deserialize)]
pub struct Plastic {
    pub ior: Float,
    pub albedo: Spectrum,
    pub thickness: Float,
    pub sigma_a: Spectrum,
    diffuse_fresnel: Float,
}

impl Plastic {
    pub fn new(ior: Float, albedo: Spectrum, thickness: Float, sigma_a: Spectrum) -> Self {
        let diffuse_fresnel = diffuse_fresnel_reflectance(1.0 / ior, PLASTIC_FRESNEL_SAMPLES);
        Plastic { ior, albedo, thickness, sigma_a, diffuse_fresnel }
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
}

impl ScatterModel for Plastic {
    fn eval(&self, event: &SurfaceScatterEvent) -> Spectrum {
        if !event.requested_lobes.intersects(lobes::DIFFUSE_REFLECTION)
            || !same_hemisphere(&event.wi, &event.wo)
            || cos_theta(&event.wi) <= 0.0
        {
            return Spectrum::default();
        }
        self.diffuse_term(cos_theta(&event.wi), cos_theta(&event.wo)) * (INV_PI * abs_cos_theta(&event.wo))
    }

    fn sample(&self, event: &mut SurfaceScatterEvent, rng: &mut Rng) -> bool {
        let cos_theta_i = cos_theta(&event.wi);
        if cos_theta_i <= 0.0 {
            return false;
        }
        event.draw_direction_sample(rng);
        let fi = dielectric_reflectance(cos_theta_i, self.ior);
        let wants_specular = event.requested_lobes.intersects(lobes::SPECULAR_REFLECTION);
        let wants_diffuse = event.requested_lobes.intersects(lobes::DIFFUSE_REFLECTION);
        if !wants_specular && !wants_diffuse {
            return false;
        }
        let pick_specular = if wants_specular && wants_diffuse {
            event.u1d < fi
        } else {
            wants_specular
        };
        if pick_specular {
            event.wo = Vector3f::new(-event.wi.x, -event.wi.y, event.wi.z);
            event.sampled_lobe = lobes::SPECULAR_REFLECTION;
            event.pdf = if wants_diffuse { fi } else { 1.0 };
            event.weight = Spectrum::new(1.0, 1.0, 1.0);
        } else {
            let mut wo = cosine_sample_hemisphere(&event.u);
            wo.z = wo.z.abs();
            event.wo = wo;
            event.sampled_lobe = lobes::DIFFUSE_REFLECTION;
            let cosine_pdf = cosine_hemisphere_pdf(abs_cos_theta(&wo));
            event.pdf = if wants_specular { (1.0 - fi) * cosine_pdf } else { cosine_pdf };
            if event.pdf <= 0.0 {
                return false;
            }
            event.weight = self.eval(event) / event.pdf;
        }
        true
    }

    fn pdf(&self, event: &SurfaceScatterEvent) -> Float {
        if !event.requested_lobes.intersects(lobes::DIFFUSE_REFLECTION) || !same_hemisphere(&event.wi, &event.wo) {
            return 0.0;
        }
        let fi = dielectric_reflectance(cos_theta(&event.wi), self.ior);
        let weight = if event.requested_lobes.intersects(lobes::SPECULAR_REFLECTION) {
            1.0 - fi
        } else {
            1.0
        };
        weight * cosine_hemisphere_pdf(abs_cos_theta(&event.wo))
    }

    fn lobes(&self) -> Lobes {
        lobes::SPECULAR_REFLECTION | lobes::DIFFUSE_REFLECTION
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::frame::Frame;
    use crate::core::geometry::Normal3f;

    #[test]
    fn eval_equals_weight_times_pdf_for_diffuse_sample() {
        let bsdf = Plastic::new(1.5, Spectrum::new(0.5, 0.5, 0.5), 0.0, Spectrum::default());
        let mut rng = Rng::new(7, 0);
        let frame = Frame::from_normal(Normal3f::new(0.0, 0.0, 1.0));
        for _ in 0..50 {
            let mut event = SurfaceScatterEvent::new(frame, Vector3f::new(0.1, 0.05, 0.99).normalize(), lobes::DIFFUSE_REFLECTION);
            if bsdf.sample(&mut event, &mut rng) {
                let eval = bsdf.eval(&event);
                let predicted = event.weight * event.pdf;
                assert!((eval.x - predicted.x).abs() < 1e-3 * predicted.x.max(1.0));
            }
        }
    }
}
