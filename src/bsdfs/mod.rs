//! Scatter models (spec section 4.2) and the `Bsdf` wrapper that binds a
//! concrete variant to its albedo/bump/alpha textures (spec section 3,
//! "BSDF").
//!
//! Scatter models are a closed family (spec section 9, "tagged union for
//! closed families"): every variant the spec names is listed in
//! `BsdfKind`, matching the teacher's enum-of-materials approach
//! (`materials::TransportMode`-style dispatch) rather than trait
//! objects, since no user-extensible BSDF plugin mechanism is in scope.

pub mod conductor;
pub mod dielectric;
pub mod diffuse_transmission;
pub mod fresnel;
pub mod hair;
pub mod lambert;
pub mod microfacet;
pub mod mirror;
pub mod mixed;
pub mod oren_nayar;
pub mod phong;
pub mod plastic;
pub mod rough_coat;
pub mod rough_conductor;
pub mod rough_dielectric;
pub mod rough_plastic;
pub mod smooth_coat;
pub mod thinsheet;
pub mod transparency;

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::core::geometry::Spectrum;
use crate::core::interaction::IntersectionInfo;
use crate::core::lobes::Lobes;
use crate::core::pbrt::Float;
use crate::core::rng::Rng;
use crate::core::scatter_event::SurfaceScatterEvent;
use crate::core::texture::Texture;

pub use conductor::Conductor;
pub use dielectric::Dielectric;
pub use diffuse_transmission::DiffuseTransmission;
pub use hair::Hair;
pub use lambert::Lambert;
pub use mirror::{ErrorBsdf, Forward, Mirror, Null};
pub use mixed::Mixed;
pub use oren_nayar::OrenNayar;
pub use phong::Phong;
pub use plastic::Plastic;
pub use rough_coat::RoughCoat;
pub use rough_conductor::RoughConductor;
pub use rough_dielectric::RoughDielectric;
pub use rough_plastic::RoughPlastic;
pub use smooth_coat::SmoothCoat;
pub use thinsheet::ThinSheet;
pub use transparency::Transparency;

/// Common contract every scatter model variant implements (spec section
/// 4.2): evaluate the scattered radiance density, importance-sample a
/// continuation direction, evaluate that sample's density, and report
/// the lobes the model can produce.
pub trait ScatterModel: Send + Sync {
    /// `f(wi, wo) * |cos(theta_o)|`, restricted to `event.requested_lobes`.
    fn eval(&self, event: &SurfaceScatterEvent) -> Spectrum;
    /// Draws `event.wo` and fills in `event.pdf`/`event.weight`/
    /// `event.sampled_lobe`. Returns `false` on a degenerate or rejected
    /// sample, in which case the caller must terminate the path.
    fn sample(&self, event: &mut SurfaceScatterEvent, rng: &mut Rng) -> bool;
    /// Solid-angle density of `event.wo` under `eval`'s model. Always `0`
    /// for Dirac (specular/forward) lobes -- their probability mass is
    /// only ever available through `sample`'s return.
    fn pdf(&self, event: &SurfaceScatterEvent) -> Float;
    fn lobes(&self) -> Lobes;
    /// Scalar transparency weight of the Forward lobe alone, or `None`
    /// for a model that carries no forward component. Lets the
    /// integrator's generalized shadow rays (spec section 4.3, "walk
    /// through purely forward surfaces without spawning a bounce")
    /// decide whether to skip through a hit without calling `sample`.
    fn forward_weight(&self) -> Option<Spectrum> {
        None
    }
    /// One-shot precomputation the spec names as `BSDF.prepareForRender()`
    /// (spec section 6). Most variants precompute eagerly in their own
    /// constructor instead (Plastic/RoughPlastic's diffuse-Fresnel
    /// integral; DESIGN.md's "prepareForRender" open question), so the
    /// default is a no-op; a variant overrides this only if it has work
    /// that must happen after construction but before the first `sample`/
    /// `eval` call. `Scene::prepare_for_render` calls this once per
    /// unique `Bsdf` in the scene.
    fn prepare_for_render(&self) {}
}

/// Closed union of every scatter model named in the spec. `Bsdf`
/// delegates to whichever variant is active.
#[derive(Clone, Serialize, Deserialize)]
pub enum BsdfKind {
    Lambert(Lambert),
    OrenNayar(OrenNayar),
    Phong(Phong),
    Dielectric(Dielectric),
    RoughDielectric(RoughDielectric),
    Conductor(Conductor),
    RoughConductor(RoughConductor),
    Plastic(Plastic),
    RoughPlastic(RoughPlastic),
    SmoothCoat(SmoothCoat),
    RoughCoat(RoughCoat),
    Mirror(Mirror),
    Mixed(Mixed),
    Transparency(Transparency),
    ThinSheet(ThinSheet),
    DiffuseTransmission(DiffuseTransmission),
    Hair(Hair),
    Null(Null),
    Forward(Forward),
    Error(ErrorBsdf),
}

macro_rules! dispatch {
    ($self:expr, $method:ident $(, $arg:expr)*) => {
        match $self {
            BsdfKind::Lambert(m) => m.$method($($arg),*),
            BsdfKind::OrenNayar(m) => m.$method($($arg),*),
            BsdfKind::Phong(m) => m.$method($($arg),*),
            BsdfKind::Dielectric(m) => m.$method($($arg),*),
            BsdfKind::RoughDielectric(m) => m.$method($($arg),*),
            BsdfKind::Conductor(m) => m.$method($($arg),*),
            BsdfKind::RoughConductor(m) => m.$method($($arg),*),
            BsdfKind::Plastic(m) => m.$method($($arg),*),
            BsdfKind::RoughPlastic(m) => m.$method($($arg),*),
            BsdfKind::SmoothCoat(m) => m.$method($($arg),*),
            BsdfKind::RoughCoat(m) => m.$method($($arg),*),
            BsdfKind::Mirror(m) => m.$method($($arg),*),
            BsdfKind::Mixed(m) => m.$method($($arg),*),
            BsdfKind::Transparency(m) => m.$method($($arg),*),
            BsdfKind::ThinSheet(m) => m.$method($($arg),*),
            BsdfKind::DiffuseTransmission(m) => m.$method($($arg),*),
            BsdfKind::Hair(m) => m.$method($($arg),*),
            BsdfKind::Null(m) => m.$method($($arg),*),
            BsdfKind::Forward(m) => m.$method($($arg),*),
            BsdfKind::Error(m) => m.$method($($arg),*),
        }
    };
}

impl ScatterModel for BsdfKind {
    fn eval(&self, event: &SurfaceScatterEvent) -> Spectrum {
        dispatch!(self, eval, event)
    }
    fn sample(&self, event: &mut SurfaceScatterEvent, rng: &mut Rng) -> bool {
        dispatch!(self, sample, event, rng)
    }
    fn pdf(&self, event: &SurfaceScatterEvent) -> Float {
        dispatch!(self, pdf, event)
    }
    fn lobes(&self) -> Lobes {
        dispatch!(self, lobes)
    }
    fn forward_weight(&self) -> Option<Spectrum> {
        dispatch!(self, forward_weight)
    }
    fn prepare_for_render(&self) {
        dispatch!(self, prepare_for_render)
    }
}

/// A BSDF as referenced by a primitive: a scatter-model variant plus its
/// optional albedo/bump/alpha textures (spec section 3). Primitives
/// share BSDFs through `Arc` (spec section 9, "Shared ownership of
/// BSDFs and textures"); the tree of `Box<Bsdf>` children inside
/// `Mixed`/`SmoothCoat`/`RoughCoat`/`Transparency` is owned and acyclic
/// by construction, so the spec's "no BSDF may reference itself"
/// invariant holds without an explicit runtime check.
#[derive(Clone, Serialize, Deserialize)]
pub struct Bsdf {
    pub kind: BsdfKind,
    #[serde(skip)]
    pub albedo: Option<Arc<dyn Texture<Spectrum>>>,
    #[serde(skip)]
    pub bump: Option<Arc<dyn Texture<Float>>>,
    #[serde(skip)]
    pub alpha: Option<Arc<dyn Texture<Float>>>,
}

impl Bsdf {
    pub fn new(kind: BsdfKind) -> Self {
        Bsdf { kind, albedo: None, bump: None, alpha: None }
    }

    pub fn with_albedo(mut self, albedo: Arc<dyn Texture<Spectrum>>) -> Self {
        self.albedo = Some(albedo);
        self
    }
    pub fn with_bump(mut self, bump: Arc<dyn Texture<Float>>) -> Self {
        self.bump = Some(bump);
        self
    }
    pub fn with_alpha(mut self, alpha: Arc<dyn Texture<Float>>) -> Self {
        self.alpha = Some(alpha);
        self
    }

    /// Resolved albedo at the hit point, or `None` if this BSDF has no
    /// albedo texture (the scatter model's own constant is authoritative
    /// in that case).
    pub fn albedo(&self, info: &IntersectionInfo) -> Option<Spectrum> {
        self.albedo.as_ref().map(|t| t.eval(info.uv))
    }
    pub fn bump(&self, info: &IntersectionInfo) -> Option<Float> {
        self.bump.as_ref().map(|t| t.eval(info.uv))
    }
    pub fn alpha(&self, info: &IntersectionInfo) -> Option<Float> {
        self.alpha.as_ref().map(|t| t.eval(info.uv))
    }

    /// Combined forward-transparency weight at `info`: the scatter
    /// model's own Forward-lobe weight (e.g. `Transparency`'s
    /// `1 - opacity`), further attenuated by an alpha-cutout texture if
    /// one is bound (spec section 4.3, generalized shadow rays). `None`
    /// means this hit fully blocks the ray.
    pub fn generalized_forward_weight(&self, info: &IntersectionInfo) -> Option<Spectrum> {
        let mut weight = self.kind.forward_weight()?;
        if let Some(alpha) = self.alpha(info) {
            weight = weight * (1.0 - alpha);
        }
        if weight.is_black() {
            return None;
        }
        Some(weight)
    }
}

impl ScatterModel for Bsdf {
    fn eval(&self, event: &SurfaceScatterEvent) -> Spectrum {
        self.kind.eval(event)
    }
    fn sample(&self, event: &mut SurfaceScatterEvent, rng: &mut Rng) -> bool {
        self.kind.sample(event, rng)
    }
    fn pdf(&self, event: &SurfaceScatterEvent) -> Float {
        self.kind.pdf(event)
    }
    fn lobes(&self) -> Lobes {
        self.kind.lobes()
    }
    fn forward_weight(&self) -> Option<Spectrum> {
        self.kind.forward_weight()
    }
    fn prepare_for_render(&self) {
        self.kind.prepare_for_render()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::frame::Frame;
    use crate::core::geometry::{Normal3f, Vector3f};
    use crate::core::lobes;

    #[test]
    fn bsdf_wrapper_delegates_to_kind() {
        let bsdf = Bsdf::new(BsdfKind::Lambert(Lambert { albedo: Spectrum::new(0.5, 0.5, 0.5) }));
        let mut rng = Rng::new(42, 0);
        let frame = Frame::from_normal(Normal3f::new(0.0, 0.0, 1.0));
        let mut event = SurfaceScatterEvent::new(frame, Vector3f::new(0.0, 0.0, 1.0), lobes::ALL);
        assert!(bsdf.sample(&mut event, &mut rng));
        assert!(event.pdf > 0.0);
        let eval = bsdf.eval(&event);
        assert!(eval.avg() > 0.0);
    }
}
