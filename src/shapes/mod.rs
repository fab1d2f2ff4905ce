//! Concrete geometric primitives (spec section 3, "Primitive"; section
//! 6, `Primitive` external interface).
//!
//! Shapes are a closed family in this core (mesh/OBJ ingestion is out of
//! scope, per the Non-goals), so `ShapeKind` is a tagged union like
//! `BsdfKind` rather than a trait object, and `Primitive` binds a shape
//! to its BSDF, optional emission texture and interior/exterior media.

pub mod disc;
pub mod infinite_sphere;
pub mod quad;
pub mod sphere;

pub use disc::Disc;
pub use infinite_sphere::InfiniteSphere;
pub use quad::Quad;
pub use sphere::Sphere;

use std::sync::Arc;

use crate::bsdfs::Bsdf;
use crate::core::geometry::{Bounds3f, Point2f, Point3f, Ray, Spectrum, Vector3f};
use crate::core::interaction::{IntersectionData, IntersectionInfo};
use crate::core::pbrt::Float;
use crate::media::Medium;

/// A direct-lighting sample drawn from a primitive's surface, in the
/// convention of spec section 6 `sampleDirect`: `d`/`dist` connect the
/// shading point to the sampled point, `weight` already divides out the
/// sampling pdf (`weight = Le * cos / pdf`, `pdf` in solid angle at `p`).
pub struct LightSample {
    pub d: Vector3f,
    pub dist: Float,
    pub weight: Spectrum,
    pub pdf: Float,
}

/// The contract every concrete shape satisfies (spec section 6,
/// `Primitive` operations minus the BSDF/medium bookkeeping that lives
/// on `Primitive` itself).
pub trait Shape: Send + Sync {
    /// Shrinks `ray.t_far` and returns the hit payload on success.
    fn intersect(&self, ray: &mut Ray) -> Option<IntersectionData>;
    fn intersect_p(&self, ray: &Ray) -> bool;
    fn intersection_info(&self, ray: &Ray, data: &IntersectionData) -> IntersectionInfo;
    fn world_bound(&self) -> Bounds3f;
    /// `None` tells the caller to build an arbitrary frame around `Ns`
    /// (spec section 6).
    fn tangent_space(&self, info: &IntersectionInfo) -> Option<(Vector3f, Vector3f)> {
        let _ = info;
        None
    }
    fn hit_backside(&self, data: &IntersectionData) -> bool {
        let _ = data;
        false
    }
    /// Surface area in world space, used to turn an area pdf into the
    /// solid-angle pdf `sampleDirect`/`directPdf` report.
    fn area(&self) -> Float;
    fn sample_direct(&self, p: &Point3f, u: Point2f) -> Option<LightSample>;
    fn direct_pdf(&self, data: &IntersectionData, info: &IntersectionInfo, p: &Point3f) -> Float;
    fn is_infinite(&self) -> bool {
        false
    }
}

macro_rules! dispatch_shape {
    ($self:expr, $method:ident($($arg:expr),*)) => {
        match $self {
            ShapeKind::Sphere(s) => s.$method($($arg),*),
            ShapeKind::Quad(s) => s.$method($($arg),*),
            ShapeKind::Disc(s) => s.$method($($arg),*),
            ShapeKind::InfiniteSphere(s) => s.$method($($arg),*),
        }
    };
}

pub enum ShapeKind {
    Sphere(Sphere),
    Quad(Quad),
    Disc(Disc),
    InfiniteSphere(InfiniteSphere),
}

impl Shape for ShapeKind {
    fn intersect(&self, ray: &mut Ray) -> Option<IntersectionData> {
        dispatch_shape!(self, intersect(ray))
    }
    fn intersect_p(&self, ray: &Ray) -> bool {
        dispatch_shape!(self, intersect_p(ray))
    }
    fn intersection_info(&self, ray: &Ray, data: &IntersectionData) -> IntersectionInfo {
        dispatch_shape!(self, intersection_info(ray, data))
    }
    fn world_bound(&self) -> Bounds3f {
        dispatch_shape!(self, world_bound())
    }
    fn tangent_space(&self, info: &IntersectionInfo) -> Option<(Vector3f, Vector3f)> {
        dispatch_shape!(self, tangent_space(info))
    }
    fn hit_backside(&self, data: &IntersectionData) -> bool {
        dispatch_shape!(self, hit_backside(data))
    }
    fn area(&self) -> Float {
        dispatch_shape!(self, area())
    }
    fn sample_direct(&self, p: &Point3f, u: Point2f) -> Option<LightSample> {
        dispatch_shape!(self, sample_direct(p, u))
    }
    fn direct_pdf(&self, data: &IntersectionData, info: &IntersectionInfo, p: &Point3f) -> Float {
        dispatch_shape!(self, direct_pdf(data, info, p))
    }
    fn is_infinite(&self) -> bool {
        dispatch_shape!(self, is_infinite())
    }
}

/// A piece of scene geometry bound to a BSDF, optional emission and
/// optional interior/exterior participating media (spec section 3,
/// "Primitive").
pub struct Primitive {
    pub shape: ShapeKind,
    pub bsdf: Arc<Bsdf>,
    pub emission: Option<Spectrum>,
    pub interior_medium: Option<Arc<dyn Medium>>,
    pub exterior_medium: Option<Arc<dyn Medium>>,
}

impl Primitive {
    pub fn new(shape: ShapeKind, bsdf: Arc<Bsdf>) -> Self {
        Primitive {
            shape,
            bsdf,
            emission: None,
            interior_medium: None,
            exterior_medium: None,
        }
    }

    pub fn with_emission(mut self, emission: Spectrum) -> Self {
        self.emission = Some(emission);
        self
    }

    pub fn with_interior_medium(mut self, medium: Arc<dyn Medium>) -> Self {
        self.interior_medium = Some(medium);
        self
    }

    pub fn world_bound(&self) -> Bounds3f {
        self.shape.world_bound()
    }

    pub fn intersect(&self, ray: &mut Ray) -> Option<IntersectionData> {
        self.shape.intersect(ray)
    }

    pub fn intersect_p(&self, ray: &Ray) -> bool {
        self.shape.intersect_p(ray)
    }

    pub fn intersection_info(&self, ray: &Ray, data: &IntersectionData) -> IntersectionInfo {
        self.shape.intersection_info(ray, data)
    }

    pub fn occluded(&self, ray: &Ray) -> bool {
        self.shape.intersect_p(ray)
    }

    pub fn tangent_space(&self, info: &IntersectionInfo) -> Option<(Vector3f, Vector3f)> {
        self.shape.tangent_space(info)
    }

    pub fn hit_backside(&self, data: &IntersectionData) -> bool {
        self.shape.hit_backside(data)
    }

    pub fn sample_direct(&self, p: &Point3f, u: Point2f) -> Option<LightSample> {
        self.shape.sample_direct(p, u)
    }

    pub fn direct_pdf(&self, data: &IntersectionData, info: &IntersectionInfo, p: &Point3f) -> Float {
        self.shape.direct_pdf(data, info, p)
    }

    pub fn eval_direct(&self, _data: &IntersectionData, _info: &IntersectionInfo) -> Spectrum {
        self.emission.unwrap_or_default()
    }

    pub fn emission_for_background(&self, _ray: &Ray) -> Spectrum {
        if self.shape.is_infinite() {
            self.emission.unwrap_or_default()
        } else {
            Spectrum::default()
        }
    }

    pub fn is_dirac(&self) -> bool {
        false
    }

    pub fn is_emissive(&self) -> bool {
        self.emission.is_some()
    }

    pub fn is_samplable(&self) -> bool {
        self.is_emissive() && !self.shape.is_infinite()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bsdfs::{BsdfKind, Lambert};

    fn lambert_bsdf() -> Arc<Bsdf> {
        Arc::new(Bsdf::new(BsdfKind::Lambert(Lambert { albedo: Spectrum::new(0.5, 0.5, 0.5) })))
    }

    #[test]
    fn non_emissive_primitive_is_not_samplable() {
        let p = Primitive::new(
            ShapeKind::Sphere(Sphere::new(Point3f::new(0.0, 0.0, 0.0), 1.0)),
            lambert_bsdf(),
        );
        assert!(!p.is_emissive());
        assert!(!p.is_samplable());
    }

    #[test]
    fn emissive_finite_primitive_is_samplable() {
        let p = Primitive::new(
            ShapeKind::Sphere(Sphere::new(Point3f::new(0.0, 0.0, 0.0), 1.0)),
            lambert_bsdf(),
        )
        .with_emission(Spectrum::new(10.0, 10.0, 10.0));
        assert!(p.is_samplable());
    }
}
