//! Diffuse transmission: a Lambertian lobe on the far side of the
//! surface instead of the near side (spec section 4.2).

use serde::{Deserialize, Serialize};

use crate::bsdfs::ScatterModel;
use crate::core::frame::{abs_cos_theta, cos_theta, same_hemisphere};
use crate::core::geometry::Spectrum;
use crate::core::lobes::{self, Lobes};
use crate::core::pbrt::Float;
use crate::core::rng::Rng;
use crate::core::sampling::{cosine_hemisphere_pdf, cosine_sample_hemisphere, INV_PI};
use crate::core::scatter_event::SurfaceScatterEvent;

#[derive(Debug, Copy, Clone, Serialize, Deserialize)]
pub struct DiffuseTransmission {
    pub albedo: Spectrum,
}

impl ScatterModel for DiffuseTransmission {
    fn eval(&self, event: &SurfaceScatterEvent) -> Spectrum {
        if !event.requested_lobes.intersects(lobes::DIFFUSE_TRANSMISSION)
            || same_hemisphere(&event.wi, &event.wo)
            || cos_theta(&event.wi) == 0.0
        {
            return Spectrum::default();
        }
        self.albedo * (INV_PI * abs_cos_theta(&event.wo))
    }

    fn sample(&self, event: &mut SurfaceScatterEvent, rng: &mut Rng) -> bool {
        if !event.requested_lobes.intersects(lobes::DIFFUSE_TRANSMISSION) || cos_theta(&event.wi) == 0.0 {
            return false;
        }
        event.draw_direction_sample(rng);
        let mut wo = cosine_sample_hemisphere(&event.u);
        if event.wi.z > 0.0 {
            wo.z = -wo.z;
        }
        event.wo = wo;
        event.pdf = cosine_hemisphere_pdf(abs_cos_theta(&wo));
        event.sampled_lobe = lobes::DIFFUSE_TRANSMISSION;
        if event.pdf <= 0.0 {
            return false;
        }
        event.weight = self.albedo;
        true
    }

    fn pdf(&self, event: &SurfaceScatterEvent) -> Float {
        if !event.requested_lobes.intersects(lobes::DIFFUSE_TRANSMISSION) || same_hemisphere(&event.wi, &event.wo) {
            return 0.0;
        }
        cosine_hemisphere_pdf(abs_cos_theta(&event.wo))
    }

    fn lobes(&self) -> Lobes {
        lobes::DIFFUSE_TRANSMISSION
    }
}
