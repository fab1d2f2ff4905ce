//! Linear blend of two child BSDFs (spec section 4.2, "Mixed(a, b,
//! ratio)").

use serde::{Deserialize, Serialize};

use crate::bsdfs::{Bsdf, ScatterModel};
use crate::core::geometry::Spectrum;
use crate::core::lobes::Lobes;
use crate::core::pbrt::Float;
use crate::core::rng::Rng;
use crate::core::sampling::power_heuristic;
use crate::core::scatter_event::SurfaceScatterEvent;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Mixed {
    pub child0: Box<Bsdf>,
    pub child1: Box<Bsdf>,
    /// Probability of sampling `child0`.
    pub ratio: Float,
}

impl ScatterModel for Mixed {
    fn eval(&self, event: &SurfaceScatterEvent) -> Spectrum {
        self.child0.eval(event) * self.ratio + self.child1.eval(event) * (1.0 - self.ratio)
    }

    fn sample(&self, event: &mut SurfaceScatterEvent, rng: &mut Rng) -> bool {
        event.draw_direction_sample(rng);
        let pick_zero = event.u1d < self.ratio;
        let sampled_ok = if pick_zero {
            self.child0.sample(event, rng)
        } else {
            self.child1.sample(event, rng)
        };
        if !sampled_ok {
            return false;
        }
        let pdf0 = self.child0.pdf(event);
        let pdf1 = self.child1.pdf(event);
        let combined_pdf = self.ratio * pdf0 + (1.0 - self.ratio) * pdf1;
        if event.sampled_lobe.is_specular() {
            // Dirac lobes keep their own probability mass; MIS against
            // the other child's (zero) density would be meaningless.
            event.weight = if pick_zero { event.weight * self.ratio } else { event.weight * (1.0 - self.ratio) };
            return true;
        }
        if combined_pdf <= 0.0 {
            return false;
        }
        let eval = self.eval(event);
        event.pdf = combined_pdf;
        event.weight = eval / combined_pdf;
        true
    }

    fn pdf(&self, event: &SurfaceScatterEvent) -> Float {
        self.ratio * self.child0.pdf(event) + (1.0 - self.ratio) * self.child1.pdf(event)
    }

    fn lobes(&self) -> Lobes {
        self.child0.lobes() | self.child1.lobes()
    }

    fn forward_weight(&self) -> Option<Spectrum> {
        let w0 = self.child0.forward_weight().unwrap_or_default() * self.ratio;
        let w1 = self.child1.forward_weight().unwrap_or_default() * (1.0 - self.ratio);
        let weight = w0 + w1;
        if weight.is_black() {
            None
        } else {
            Some(weight)
        }
    }
}

/// Power-heuristic MIS weight combining the two children's densities,
/// exposed for the integrator's light-sampling path where it needs to
/// weight a `Mixed` BSDF sample against an explicit light pdf as well.
pub fn mis_against(child_pdf: Float, other_pdf: Float) -> Float {
    power_heuristic(1, child_pdf, 1, other_pdf)
}
