//! Smooth dielectric coat over an arbitrary child BSDF (spec section
//! 4.2). Incoming/outgoing directions are Snell-refracted into the
//! substrate before delegation; the solid-angle Jacobian
//! `eta^2 * cosThetaT / cosThetaS` is applied to the returned value.

use serde::{Deserialize, Serialize};

use crate::bsdfs::fresnel::dielectric_reflectance;
use crate::bsdfs::{Bsdf, ScatterModel};
use crate::core::frame::{abs_cos_theta, cos_theta, same_hemisphere};
use crate::core::geometry::{refract, Spectrum, Vector3f};
use crate::core::lobes::{self, Lobes};
use crate::core::pbrt::Float;
use crate::core::rng::Rng;
use crate::core::scatter_event::SurfaceScatterEvent;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SmoothCoat {
    pub ior: Float,
    pub thickness: Float,
    pub sigma_a: Spectrum,
    pub substrate: Box<Bsdf>,
}

impl SmoothCoat {
    fn transmittance(&self, cos_theta_substrate: Float) -> Spectrum {
        if self.sigma_a.is_black() || self.thickness == 0.0 {
            return Spectrum::new(1.0, 1.0, 1.0);
        }
        let path = self.thickness / cos_theta_substrate.abs().max(1e-3);
        (self.sigma_a * -path).exp()
    }

    /// Refracts a coat-frame direction into the substrate; `None` means
    /// total internal reflection at the coat/substrate interface.
    fn refract_in(&self, w: &Vector3f) -> Option<Vector3f> {
        let cos_theta_i = cos_theta(w);
        let n = Vector3f::new(0.0, 0.0, cos_theta_i.signum());
        refract(w, &n, 1.0 / self.ior)
    }
    fn refract_out(&self, w_substrate: &Vector3f) -> Option<Vector3f> {
        let cos_theta_i = cos_theta(w_substrate);
        let n = Vector3f::new(0.0, 0.0, cos_theta_i.signum());
        refract(w_substrate, &n, self.ior)
    }
}

impl ScatterModel for SmoothCoat {
    fn eval(&self, event: &SurfaceScatterEvent) -> Spectrum {
        if cos_theta(&event.wi) <= 0.0 || !same_hemisphere(&event.wi, &event.wo) {
            return Spectrum::default();
        }
        let wi_s = match self.refract_in(&event.wi) {
            Some(w) => w,
            None => return Spectrum::default(),
        };
        let wo_s = match self.refract_in(&event.wo) {
            Some(w) => w,
            None => return Spectrum::default(),
        };
        let fi = dielectric_reflectance(cos_theta(&event.wi), self.ior);
        let fo = dielectric_reflectance(cos_theta(&event.wo), self.ior);
        let mut substrate_event = SurfaceScatterEvent::new(event.frame, wi_s, event.requested_lobes & !lobes::SPECULAR);
        substrate_event.wo = wo_s;
        let substrate_eval = self.substrate.eval(&substrate_event);
        let transmittance = self.transmittance(abs_cos_theta(&wi_s)) * self.transmittance(abs_cos_theta(&wo_s));
        let jacobian = (abs_cos_theta(&wo_s) / abs_cos_theta(&event.wo).max(1e-6)) / (self.ior * self.ior);
        substrate_eval * ((1.0 - fi) * (1.0 - fo)) * transmittance * jacobian
    }

    fn sample(&self, event: &mut SurfaceScatterEvent, rng: &mut Rng) -> bool {
        let cos_theta_i = cos_theta(&event.wi);
        if cos_theta_i <= 0.0 {
            return false;
        }
        event.draw_direction_sample(rng);
        let fi = dielectric_reflectance(cos_theta_i, self.ior);
        let wants_specular = event.requested_lobes.intersects(lobes::SPECULAR_REFLECTION);
        let wants_substrate = !(event.requested_lobes & !lobes::SPECULAR_REFLECTION).is_empty();
        if !wants_specular && !wants_substrate {
            return false;
        }
        let pick_specular = if wants_specular && wants_substrate {
            event.u1d < fi
        } else {
            wants_specular
        };
        if pick_specular {
            event.wo = Vector3f::new(-event.wi.x, -event.wi.y, event.wi.z);
            event.sampled_lobe = lobes::SPECULAR_REFLECTION;
            event.pdf = if wants_substrate { fi } else { 1.0 };
            event.weight = Spectrum::new(1.0, 1.0, 1.0);
            return true;
        }
        let wi_s = match self.refract_in(&event.wi) {
            Some(w) => w,
            None => return false,
        };
        let mut substrate_event = SurfaceScatterEvent::new(event.frame, wi_s, event.requested_lobes & !lobes::SPECULAR);
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
        let wi_s = match self.refract_in(&event.wi) {
            Some(w) => w,
            None => return 0.0,
        };
        let wo_s = match self.refract_in(&event.wo) {
            Some(w) => w,
            None => return 0.0,
        };
        let fi = dielectric_reflectance(cos_theta(&event.wi), self.ior);
        let mut substrate_event = SurfaceScatterEvent::new(event.frame, wi_s, event.requested_lobes & !lobes::SPECULAR);
        substrate_event.wo = wo_s;
        let substrate_pdf = self.substrate.pdf(&substrate_event);
        let jacobian = abs_cos_theta(&wo_s) / (abs_cos_theta(&event.wo).max(1e-6) * self.ior * self.ior);
        let weight = if event.requested_lobes.intersects(lobes::SPECULAR_REFLECTION) { 1.0 - fi } else { 1.0 };
        weight * substrate_pdf * jacobian
    }

    fn lobes(&self) -> Lobes {
        lobes::SPECULAR_REFLECTION | self.substrate.lobes()
    }
}
