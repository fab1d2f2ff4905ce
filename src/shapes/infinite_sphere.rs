//! Infinite environment sphere: an emissive backdrop with no finite
//! geometry (spec section 3, "Primitive" — "infinite sphere"; section 6,
//! `emissionForBackground`).

use crate::core::geometry::{Bounds3f, Point2f, Point3f, Ray, Spectrum, Vector3f};
use crate::core::interaction::{IntersectionData, IntersectionInfo};
use crate::core::pbrt::Float;
use crate::core::sampling::{uniform_sample_sphere, uniform_sphere_pdf};
use crate::shapes::{LightSample, Shape};

#[derive(Debug, Default, Copy, Clone)]
pub struct InfiniteSphere;

impl Shape for InfiniteSphere {
    fn intersect(&self, _ray: &mut Ray) -> Option<IntersectionData> {
        None
    }

    fn intersect_p(&self, _ray: &Ray) -> bool {
        false
    }

    fn intersection_info(&self, ray: &Ray, _data: &IntersectionData) -> IntersectionInfo {
        IntersectionInfo {
            p: ray.position(ray.t_far),
            gnormal: crate::core::geometry::Normal3f::new(-ray.d.x, -ray.d.y, -ray.d.z),
            nnormal: crate::core::geometry::Normal3f::new(-ray.d.x, -ray.d.y, -ray.d.z),
            uv: Point2f::default(),
            w: -ray.d,
            epsilon: 0.0,
            primitive_index: 0,
            bsdf_index: None,
        }
    }

    fn world_bound(&self) -> Bounds3f {
        let inf = Vector3f::new(std::f32::INFINITY, std::f32::INFINITY, std::f32::INFINITY);
        Bounds3f::new(Point3f::default() - inf, Point3f::default() + inf)
    }

    fn area(&self) -> Float {
        0.0
    }

    fn sample_direct(&self, _p: &Point3f, u: Point2f) -> Option<LightSample> {
        let d = uniform_sample_sphere(u);
        Some(LightSample {
            d,
            dist: std::f32::INFINITY,
            weight: Spectrum::default(),
            pdf: uniform_sphere_pdf(),
        })
    }

    fn direct_pdf(&self, _data: &IntersectionData, _info: &IntersectionInfo, _p: &Point3f) -> Float {
        uniform_sphere_pdf()
    }

    fn is_infinite(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn infinite_sphere_never_reports_a_finite_hit() {
        let sky = InfiniteSphere;
        let mut ray = Ray::new(Point3f::default(), Vector3f::new(0.0, 0.0, 1.0));
        assert!(sky.intersect(&mut ray).is_none());
        assert!(!sky.intersect_p(&ray));
    }

    #[test]
    fn direct_sample_has_uniform_pdf() {
        let sky = InfiniteSphere;
        let sample = sky.sample_direct(&Point3f::default(), Point2f { x: 0.3, y: 0.7 }).unwrap();
        assert!((sample.pdf - uniform_sphere_pdf()).abs() < 1e-6);
        assert!(sample.dist.is_infinite());
    }
}
