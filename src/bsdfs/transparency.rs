//! Transparency: adds a Forward lobe of weight `1-opacity` to a child
//! BSDF (spec section 4.2, "Transparency(child, opacity)"). `opacity`
//! is the alpha-texture value already resolved at the hit point by the
//! caller (see `Bsdf::alpha`); the scatter model itself only ever sees
//! concrete per-query scalars, never textures.

use serde::{Deserialize, Serialize};

use crate::bsdfs::{Bsdf, ScatterModel};
use crate::core::geometry::Spectrum;
use crate::core::lobes::{self, Lobes};
use crate::core::pbrt::Float;
use crate::core::rng::Rng;
use crate::core::scatter_event::SurfaceScatterEvent;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transparency {
    pub child: Box<Bsdf>,
    pub opacity: Float,
}

impl ScatterModel for Transparency {
    fn eval(&self, event: &SurfaceScatterEvent) -> Spectrum {
        if !event.requested_lobes.intersects(self.child.lobes()) {
            return Spectrum::default();
        }
        self.child.eval(event) * self.opacity
    }

    fn sample(&self, event: &mut SurfaceScatterEvent, rng: &mut Rng) -> bool {
        event.draw_direction_sample(rng);
        let wants_forward = event.requested_lobes.intersects(lobes::FORWARD);
        let wants_child = event.requested_lobes.intersects(self.child.lobes());
        if !wants_forward && !wants_child {
            return false;
        }
        let pick_forward = if wants_forward && wants_child {
            event.u1d >= self.opacity
        } else {
            wants_forward
        };
        if pick_forward {
            event.wo = -event.wi;
            event.sampled_lobe = lobes::FORWARD;
            event.pdf = if wants_child { 1.0 - self.opacity } else { 1.0 };
            event.weight = Spectrum::new(1.0, 1.0, 1.0);
        } else {
            if !self.child.sample(event, rng) {
                return false;
            }
            let child_pdf = event.pdf;
            event.pdf = if wants_forward { self.opacity * child_pdf } else { child_pdf };
            if event.pdf <= 0.0 {
                return false;
            }
            event.weight = event.weight * (self.opacity * child_pdf / event.pdf);
        }
        true
    }

    fn pdf(&self, event: &SurfaceScatterEvent) -> Float {
        if !event.requested_lobes.intersects(self.child.lobes()) {
            return 0.0;
        }
        let weight = if event.requested_lobes.intersects(lobes::FORWARD) { self.opacity } else { 1.0 };
        weight * self.child.pdf(event)
    }

    fn lobes(&self) -> Lobes {
        lobes::FORWARD | self.child.lobes()
    }

    fn forward_weight(&self) -> Option<Spectrum> {
        let weight = Spectrum::new(1.0, 1.0, 1.0) * (1.0 - self.opacity);
        if weight.is_black() {
            None
        } else {
            Some(weight)
        }
    }
}
