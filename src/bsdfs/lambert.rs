//! Perfectly diffuse (Lambertian) reflection (spec section 4.2).

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
pub struct Lambert {
    pub albedo: Spectrum,
}

impl ScatterModel for Lambert {
    fn eval(&self, event: &SurfaceScatterEvent) -> Spectrum {
        if !event.requested_lobes.intersects(lobes::DIFFUSE_REFLECTION)
            || !same_hemisphere(&event.wi, &event.wo)
            || cos_theta(&event.wi) <= 0.0
        {
            return Spectrum::default();
        }
        self.albedo * (INV_PI * abs_cos_theta(&event.wo))
    }

    fn sample(&self, event: &mut SurfaceScatterEvent, rng: &mut Rng) -> bool {
        if !event.requested_lobes.intersects(lobes::DIFFUSE_REFLECTION) || cos_theta(&event.wi) <= 0.0 {
            return false;
        }
        event.draw_direction_sample(rng);
        let mut wo = cosine_sample_hemisphere(&event.u);
        if event.wi.z < 0.0 {
            wo.z = -wo.z;
        }
        event.wo = wo;
        event.pdf = cosine_hemisphere_pdf(abs_cos_theta(&wo));
        event.sampled_lobe = lobes::DIFFUSE_REFLECTION;
        if event.pdf <= 0.0 {
            return false;
        }
        event.weight = self.albedo;
        true
    }

    fn pdf(&self, event: &SurfaceScatterEvent) -> Float {
        if !event.requested_lobes.intersects(lobes::DIFFUSE_REFLECTION) || !same_hemisphere(&event.wi, &event.wo) {
            return 0.0;
        }
        cosine_hemisphere_pdf(abs_cos_theta(&event.wo))
    }

    fn lobes(&self) -> Lobes {
        lobes::DIFFUSE_REFLECTION
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::frame::Frame;
    use crate::core::geometry::{Normal3f, Vector3f};

    fn event_with_wi(wi_z: Float) -> SurfaceScatterEvent {
        let frame = Frame::from_normal(Normal3f::new(0.0, 0.0, 1.0));
        SurfaceScatterEvent::new(frame, Vector3f::new(0.0, 0.0, wi_z), lobes::ALL)
    }

    #[test]
    fn eval_equals_weight_times_pdf_after_sample() {
        let bsdf = Lambert { albedo: Spectrum::new(0.5, 0.5, 0.5) };
        let mut rng = Rng::new(1, 0);
        let mut event = event_with_wi(1.0);
        assert!(bsdf.sample(&mut event, &mut rng));
        let eval = bsdf.eval(&event);
        let predicted = event.weight * event.pdf;
        assert!((eval.x - predicted.x).abs() < 1e-4);
    }

    #[test]
    fn directional_hemispherical_reflectance_below_one() {
        let bsdf = Lambert { albedo: Spectrum::new(0.5, 0.5, 0.5) };
        let mut rng = Rng::new(2, 0);
        let n = 65_536;
        let mut sum = 0.0;
        let wi = Vector3f::new(0.0, 0.0, 1.0);
        for _ in 0..n {
            let frame = Frame::from_normal(Normal3f::new(0.0, 0.0, 1.0));
            let mut event = SurfaceScatterEvent::new(frame, wi, lobes::ALL);
            if bsdf.sample(&mut event, &mut rng) {
                sum += event.weight.avg();
            }
        }
        assert!(sum / n as Float <= 1.0 + 1e-3);
    }
}
