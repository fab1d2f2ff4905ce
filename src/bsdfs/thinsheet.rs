//! Parallel-sided dielectric slab with an optional thin-film
//! spectral-interference term (spec section 4.2, "ThinSheet").
//!
//! Reflectance/transmittance are Dirac lobes, as for `Dielectric`; the
//! interference term modulates the RGB reflectance weight using the
//! three reference wavelengths the spec names (`{650, 510, 475}nm`)
//! rather than a full spectral integral (no spectral rendering in this
//! core, per spec section 1 non-goals).

use serde::{Deserialize, Serialize};

use crate::bsdfs::fresnel::dielectric_reflectance;
use crate::bsdfs::ScatterModel;
use crate::core::frame::cos_theta;
use crate::core::geometry::{Spectrum, Vector3f};
use crate::core::lobes::{self, Lobes};
use crate::core::pbrt::Float;
use crate::core::rng::Rng;
use crate::core::scatter_event::SurfaceScatterEvent;

const REFERENCE_WAVELENGTHS_NM: [Float; 3] = [650.0, 510.0, 475.0];

#[derive(Debug, Copy, Clone, Serialize, Deserialize)]
pub struct ThinSheet {
    pub ior: Float,
    pub thickness_nm: Float,
    pub enable_interference: bool,
}

impl ThinSheet {
    fn interference_weight(&self, cos_theta_t: Float) -> Spectrum {
        if !self.enable_interference {
            return Spectrum::new(1.0, 1.0, 1.0);
        }
        let phase = 4.0 * std::f32::consts::PI * self.ior * self.thickness_nm * cos_theta_t;
        let mut channels = [0.0_f32; 3];
        for (i, lambda) in REFERENCE_WAVELENGTHS_NM.iter().enumerate() {
            channels[i] = 0.5 + 0.5 * (phase / lambda).cos();
        }
        Spectrum::new(channels[0], channels[1], channels[2])
    }
}

impl ScatterModel for ThinSheet {
    fn eval(&self, _event: &SurfaceScatterEvent) -> Spectrum {
        Spectrum::default()
    }

    fn sample(&self, event: &mut SurfaceScatterEvent, rng: &mut Rng) -> bool {
        let cos_theta_i = cos_theta(&event.wi);
        if cos_theta_i == 0.0 {
            return false;
        }
        event.draw_direction_sample(rng);
        let sin2_theta_t = (1.0 - cos_theta_i * cos_theta_i) / (self.ior * self.ior);
        let cos_theta_t = (1.0 - sin2_theta_t.min(1.0)).max(0.0).sqrt();
        let f = dielectric_reflectance(cos_theta_i, self.ior);
        let wants_reflection = event.requested_lobes.intersects(lobes::SPECULAR_REFLECTION);
        let wants_transmission = event.requested_lobes.intersects(lobes::SPECULAR_TRANSMISSION);
        if !wants_reflection && !wants_transmission {
            return false;
        }
        let pick_reflection = if wants_reflection && wants_transmission {
            event.u1d < f
        } else {
            wants_reflection
        };
        if pick_reflection {
            if !wants_reflection {
                return false;
            }
            event.wo = Vector3f::new(-event.wi.x, -event.wi.y, event.wi.z);
            event.sampled_lobe = lobes::SPECULAR_REFLECTION;
            event.pdf = if wants_transmission { f } else { 1.0 };
            event.weight = self.interference_weight(cos_theta_t);
        } else {
            if !wants_transmission {
                return false;
            }
            event.wo = -event.wi;
            event.sampled_lobe = lobes::SPECULAR_TRANSMISSION;
            event.pdf = if wants_reflection { 1.0 - f } else { 1.0 };
            event.weight = Spectrum::new(1.0, 1.0, 1.0) * ((1.0 - f) / event.pdf);
        }
        true
    }

    fn pdf(&self, _event: &SurfaceScatterEvent) -> Float {
        0.0
    }

    fn lobes(&self) -> Lobes {
        lobes::SPECULAR_REFLECTION | lobes::SPECULAR_TRANSMISSION
    }
}
