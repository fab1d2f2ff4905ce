//! Participating media and phase functions (spec section 4.2, "Medium" /
//! "Phase functions").
//!
//! `Medium` and `PhaseFunction` are open families (spec section 9: the
//! scene graph stores them behind a shared handle and nothing else in
//! the core needs to exhaustively match on every kind), so both are
//! traits rather than tagged unions, unlike the closed BSDF family.

pub mod henyey_greenstein;
pub mod homogeneous;
pub mod isotropic;

pub use henyey_greenstein::HenyeyGreenstein;
pub use homogeneous::HomogeneousMedium;
pub use isotropic::Isotropic;

use crate::core::geometry::{Ray, Spectrum, Vector3f};
use crate::core::pbrt::Float;
use crate::core::rng::Rng;
use crate::core::scatter_event::{MediumScatterEvent, MediumState};

/// Contract matches BSDFs (eval/sample/pdf) but operates in world-space
/// spherical coordinates rather than a tangent frame (spec section 4.2).
pub trait PhaseFunction: Send + Sync {
    fn eval(&self, wi: &Vector3f, wo: &Vector3f) -> Spectrum;
    fn sample(&self, wi: &Vector3f, rng: &mut Rng) -> Option<(Vector3f, Float)>;
    fn pdf(&self, wi: &Vector3f, wo: &Vector3f) -> Float;
}

/// Participating-media distance sampling, transmittance and phase
/// scattering (spec section 3, component 6 "Medium").
pub trait Medium: Send + Sync {
    /// Samples a distance along the ray segment described by `event`.
    /// Populates `event.t`/`event.weight` and may advance `state`.
    /// Returns `false` when the ray escapes the medium without an
    /// interaction (the caller falls through to surface handling).
    fn sample_distance(&self, ray: &Ray, event: &mut MediumScatterEvent, state: &mut MediumState, rng: &mut Rng) -> bool;
    /// Whether the sampled distance was an absorption event (path
    /// terminates) rather than a scattering event.
    fn absorb(&self, event: &mut MediumScatterEvent, rng: &mut Rng) -> bool;
    /// Picks a phase-sampled continuation direction at `event.t`.
    fn scatter(&self, event: &mut MediumScatterEvent, rng: &mut Rng) -> bool;
    fn transmittance(&self, ray: &Ray, t: Float) -> Spectrum;
    fn phase_eval(&self, wi: &Vector3f, wo: &Vector3f) -> Spectrum;
    /// Solid-angle density of `wo` under the medium's phase function,
    /// used by the integrator's MIS weighting of a volumetric NEE
    /// contribution against a phase-sampled one (spec section 6,
    /// `phasePdf`).
    fn phase_pdf(&self, wi: &Vector3f, wo: &Vector3f) -> Float;
    /// Hint the integrator uses to decide analytic-exponential vs.
    /// ray-marched distance sampling (spec section 4.2).
    fn is_homogeneous(&self) -> bool;
}
