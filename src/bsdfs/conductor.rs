//! Smooth conductor (mirror with complex-IOR Fresnel weighting; spec
//! section 4.2).

use serde::{Deserialize, Serialize};

use crate::bsdfs::fresnel::conductor_reflectance;
use crate::bsdfs::ScatterModel;
use crate::core::frame::cos_theta;
use crate::core::geometry::{Spectrum, Vector3f};
use crate::core::lobes::{self, Lobes};
use crate::core::pbrt::Float;
use crate::core::rng::Rng;
use crate::core::scatter_event::SurfaceScatterEvent;

#[derive(Debug, Copy, Clone, Serialize, Deserialize)]
pub struct Conductor {
    pub eta: Spectrum,
    pub k: Spectrum,
}

impl ScatterModel for Conductor {
    fn eval(&self, _event: &SurfaceScatterEvent) -> Spectrum {
        Spectrum::default()
    }

    fn sample(&self, event: &mut SurfaceScatterEvent, rng: &mut Rng) -> bool {
        if !event.requested_lobes.intersects(lobes::SPECULAR_REFLECTION) {
            return false;
        }
        let cos_theta_i = cos_theta(&event.wi);
        if cos_theta_i <= 0.0 {
            return false;
        }
        event.draw_direction_sample(rng);
        event.wo = Vector3f::new(-event.wi.x, -event.wi.y, event.wi.z);
        event.sampled_lobe = lobes::SPECULAR_REFLECTION;
        event.pdf = 1.0;
        event.weight = conductor_reflectance(cos_theta_i, self.eta, self.k);
        true
    }

    fn pdf(&self, _event: &SurfaceScatterEvent) -> Float {
        0.0
    }

    fn lobes(&self) -> Lobes {
        lobes::SPECULAR_REFLECTION
    }
}
