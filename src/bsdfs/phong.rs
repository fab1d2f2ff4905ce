//! Modified Phong glossy lobe around the mirror direction (spec section
//! 4.2).

use std::f32::consts::PI;

use serde::{Deserialize, Serialize};

use crate::bsdfs::ScatterModel;
use crate::core::frame::{abs_cos_theta, cos_theta, same_hemisphere};
use crate::core::geometry::{reflect, vec3_dot_vec3f, vec3_coordinate_system, Spectrum, Vector3f};
use crate::core::lobes::{self, Lobes};
use crate::core::pbrt::Float;
use crate::core::rng::Rng;
use crate::core::scatter_event::SurfaceScatterEvent;

#[derive(Debug, Copy, Clone, Serialize, Deserialize)]
pub struct Phong {
    pub albedo: Spectrum,
    pub exponent: Float,
}

impl Phong {
    fn mirror(&self, wi: &Vector3f) -> Vector3f {
        Vector3f::new(-wi.x, -wi.y, wi.z)
    }
}

impl ScatterModel for Phong {
    fn eval(&self, event: &SurfaceScatterEvent) -> Spectrum {
        if !event.requested_lobes.intersects(lobes::GLOSSY_REFLECTION)
            || !same_hemisphere(&event.wi, &event.wo)
            || cos_theta(&event.wi) <= 0.0
        {
            return Spectrum::default();
        }
        let r = reflect(&event.wi, &Vector3f::new(0.0, 0.0, event.wi.z.signum()));
        let cos_alpha = vec3_dot_vec3f(&r, &event.wo).max(0.0);
        let norm = (self.exponent + 2.0) / (2.0 * PI);
        self.albedo * (norm * cos_alpha.powf(self.exponent) * abs_cos_theta(&event.wo))
    }

    fn sample(&self, event: &mut SurfaceScatterEvent, rng: &mut Rng) -> bool {
        if !event.requested_lobes.intersects(lobes::GLOSSY_REFLECTION) || cos_theta(&event.wi) <= 0.0 {
            return false;
        }
        event.draw_direction_sample(rng);
        let cos_theta_l = event.u.x.powf(1.0 / (self.exponent + 1.0));
        let sin_theta_l = (0.0_f32).max(1.0 - cos_theta_l * cos_theta_l).sqrt();
        let phi = 2.0 * PI * event.u.y;
        let r = self.mirror(&event.wi);
        let mut t = Vector3f::default();
        let mut b = Vector3f::default();
        vec3_coordinate_system(&r, &mut t, &mut b);
        let wo = t * (sin_theta_l * phi.cos()) + b * (sin_theta_l * phi.sin()) + r * cos_theta_l;
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
        let r = reflect(&event.wi, &Vector3f::new(0.0, 0.0, event.wi.z.signum()));
        let cos_alpha = vec3_dot_vec3f(&r, &event.wo).max(0.0);
        (self.exponent + 1.0) / (2.0 * PI) * cos_alpha.powf(self.exponent)
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
        let bsdf = Phong { albedo: Spectrum::new(0.8, 0.8, 0.8), exponent: 20.0 };
        let mut rng = Rng::new(4, 0);
        let frame = Frame::from_normal(Normal3f::new(0.0, 0.0, 1.0));
        let mut event = SurfaceScatterEvent::new(frame, Vector3f::new(0.0, 0.0, 1.0), lobes::ALL);
        assert!(bsdf.sample(&mut event, &mut rng));
        let eval = bsdf.eval(&event);
        let predicted = event.weight * event.pdf;
        assert!((eval.x - predicted.x).abs() < 1e-3 * predicted.x.max(1.0));
    }
}
