//! Trivial Dirac-lobe scatter models: perfect mirror, null (passes
//! nothing), forward (transparent pass-through) and error (the
//! magenta-red fallback substituted for a BSDF that failed to resolve;
//! spec section 4.2 and section 7 tier 3).

use serde::{Deserialize, Serialize};

use crate::bsdfs::ScatterModel;
use crate::core::frame::cos_theta;
use crate::core::geometry::{Spectrum, Vector3f};
use crate::core::lobes::{self, Lobes};
use crate::core::pbrt::Float;
use crate::core::rng::Rng;
use crate::core::scatter_event::SurfaceScatterEvent;

#[derive(Debug, Copy, Clone, Serialize, Deserialize)]
pub struct Mirror {
    pub albedo: Spectrum,
}

impl ScatterModel for Mirror {
    fn eval(&self, _event: &SurfaceScatterEvent) -> Spectrum {
        Spectrum::default()
    }
    fn sample(&self, event: &mut SurfaceScatterEvent, rng: &mut Rng) -> bool {
        if !event.requested_lobes.intersects(lobes::SPECULAR_REFLECTION) || cos_theta(&event.wi) <= 0.0 {
            return false;
        }
        event.draw_direction_sample(rng);
        event.wo = Vector3f::new(-event.wi.x, -event.wi.y, event.wi.z);
        event.sampled_lobe = lobes::SPECULAR_REFLECTION;
        event.pdf = 1.0;
        event.weight = self.albedo;
        true
    }
    fn pdf(&self, _event: &SurfaceScatterEvent) -> Float {
        0.0
    }
    fn lobes(&self) -> Lobes {
        lobes::SPECULAR_REFLECTION
    }
}

#[derive(Debug, Copy, Clone, Serialize, Deserialize)]
pub struct Null;

impl ScatterModel for Null {
    fn eval(&self, _event: &SurfaceScatterEvent) -> Spectrum {
        Spectrum::default()
    }
    fn sample(&self, _event: &mut SurfaceScatterEvent, _rng: &mut Rng) -> bool {
        false
    }
    fn pdf(&self, _event: &SurfaceScatterEvent) -> Float {
        0.0
    }
    fn lobes(&self) -> Lobes {
        lobes::NONE
    }
}

/// Forward lobe: a special delta lobe producing `wo = -wi`, used as the
/// building block for `Transparency` (spec GLOSSARY "Forward lobe").
#[derive(Debug, Copy, Clone, Serialize, Deserialize)]
pub struct Forward;

impl ScatterModel for Forward {
    fn eval(&self, _event: &SurfaceScatterEvent) -> Spectrum {
        Spectrum::default()
    }
    fn sample(&self, event: &mut SurfaceScatterEvent, rng: &mut Rng) -> bool {
        if !event.requested_lobes.intersects(lobes::FORWARD) {
            return false;
        }
        event.draw_direction_sample(rng);
        event.wo = -event.wi;
        event.sampled_lobe = lobes::FORWARD;
        event.pdf = 1.0;
        event.weight = Spectrum::new(1.0, 1.0, 1.0);
        true
    }
    fn pdf(&self, _event: &SurfaceScatterEvent) -> Float {
        0.0
    }
    fn lobes(&self) -> Lobes {
        lobes::FORWARD
    }
    fn forward_weight(&self) -> Option<Spectrum> {
        Some(Spectrum::new(1.0, 1.0, 1.0))
    }
}

/// Substituted for a BSDF reference that failed to resolve (spec
/// section 7): renders as opaque magenta-red rather than crashing.
/// Behaves like a diffuse reflector so the render still completes.
#[derive(Debug, Copy, Clone, Serialize, Deserialize)]
pub struct ErrorBsdf {
    inner: crate::bsdfs::lambert::Lambert,
}

impl Default for ErrorBsdf {
    fn default() -> Self {
        ErrorBsdf { inner: crate::bsdfs::lambert::Lambert { albedo: Spectrum::new(1.0, 0.0, 1.0) } }
    }
}

impl ScatterModel for ErrorBsdf {
    fn eval(&self, event: &SurfaceScatterEvent) -> Spectrum {
        self.inner.eval(event)
    }
    fn sample(&self, event: &mut SurfaceScatterEvent, rng: &mut Rng) -> bool {
        self.inner.sample(event, rng)
    }
    fn pdf(&self, event: &SurfaceScatterEvent) -> Float {
        self.inner.pdf(event)
    }
    fn lobes(&self) -> Lobes {
        lobes::DIFFUSE_REFLECTION
    }
}
