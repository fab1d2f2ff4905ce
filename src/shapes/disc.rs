//! Flat circular disc primitive (spec section 3, "Primitive").

use std::f32::consts::PI;

use crate::core::geometry::{vec3_dot_vec3f, Bounds3f, Normal3f, Point2f, Point3f, Ray, Spectrum, Vector3f};
use crate::core::interaction::{IntersectionData, IntersectionInfo};
use crate::core::pbrt::Float;
use crate::shapes::{LightSample, Shape};

#[derive(Debug, Copy, Clone)]
pub struct Disc {
    pub center: Point3f,
    pub normal: Normal3f,
    pub radius: Float,
}

impl Disc {
    pub fn new(center: Point3f, normal: Normal3f, radius: Float) -> Self {
        Disc { center, normal, radius }
    }
}

impl Shape for Disc {
    fn intersect(&self, ray: &mut Ray) -> Option<IntersectionData> {
        let n = Vector3f::from(self.normal);
        let denom = vec3_dot_vec3f(&ray.d, &n);
        if denom.abs() < 1e-9 {
            return None;
        }
        let t = vec3_dot_vec3f(&(self.center - ray.o), &n) / denom;
        if t <= ray.t_near || t >= ray.t_far {
            return None;
        }
        let p = ray.position(t);
        if (p - self.center).length_squared() > self.radius * self.radius {
            return None;
        }
        ray.t_far = t;
        Some(IntersectionData::Disc)
    }

    fn intersect_p(&self, ray: &Ray) -> bool {
        let n = Vector3f::from(self.normal);
        let denom = vec3_dot_vec3f(&ray.d, &n);
        if denom.abs() < 1e-9 {
            return false;
        }
        let t = vec3_dot_vec3f(&(self.center - ray.o), &n) / denom;
        if t <= ray.t_near || t >= ray.t_far {
            return false;
        }
        (ray.position(t) - self.center).length_squared() <= self.radius * self.radius
    }

    fn intersection_info(&self, ray: &Ray, _data: &IntersectionData) -> IntersectionInfo {
        let p = ray.position(ray.t_far);
        IntersectionInfo {
            p,
            gnormal: self.normal,
            nnormal: self.normal,
            uv: Point2f::default(),
            w: -ray.d,
            epsilon: IntersectionInfo::offset_epsilon(ray.t_far, &p),
            primitive_index: 0,
            bsdf_index: None,
        }
    }

    fn world_bound(&self) -> Bounds3f {
        let r = Vector3f::new(self.radius, self.radius, self.radius);
        Bounds3f::new(self.center - r, self.center + r)
    }

    fn area(&self) -> Float {
        PI * self.radius * self.radius
    }

    fn sample_direct(&self, p: &Point3f, u: Point2f) -> Option<LightSample> {
        let mut t = Vector3f::default();
        let mut b = Vector3f::default();
        let n = Vector3f::from(self.normal);
        crate::core::geometry::vec3_coordinate_system(&n, &mut t, &mut b);
        let disc = crate::core::sampling::concentric_sample_disk(&u) * self.radius;
        let sample_p = self.center + t * disc.x + b * disc.y;
        let to_p = sample_p - *p;
        let dist2 = to_p.length_squared();
        if dist2 < 1e-12 {
            return None;
        }
        let dist = dist2.sqrt();
        let d = to_p * (1.0 / dist);
        let cos_theta = vec3_dot_vec3f(&-d, &n).abs();
        if cos_theta < 1e-6 {
            return None;
        }
        let pdf = dist2 / (cos_theta * self.area());
        Some(LightSample { d, dist, weight: Spectrum::default(), pdf })
    }

    fn direct_pdf(&self, _data: &IntersectionData, info: &IntersectionInfo, p: &Point3f) -> Float {
        let to_p = info.p - *p;
        let dist2 = to_p.length_squared();
        if dist2 < 1e-12 {
            return 0.0;
        }
        let d = to_p * (1.0 / dist2.sqrt());
        let cos_theta = vec3_dot_vec3f(&-d, &Vector3f::from(self.normal)).abs();
        if cos_theta < 1e-6 {
            return 0.0;
        }
        dist2 / (cos_theta * self.area())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ray_within_radius_hits_disc() {
        let disc = Disc::new(Point3f::new(0.0, 0.0, 5.0), Normal3f::new(0.0, 0.0, -1.0), 2.0);
        let mut ray = Ray::new(Point3f::default(), Vector3f::new(0.0, 0.0, 1.0));
        assert!(disc.intersect(&mut ray).is_some());
    }

    #[test]
    fn ray_past_radius_misses_disc() {
        let disc = Disc::new(Point3f::new(0.0, 0.0, 5.0), Normal3f::new(0.0, 0.0, -1.0), 0.1);
        let mut ray = Ray::new(Point3f::new(1.0, 0.0, 0.0), Vector3f::new(0.0, 0.0, 1.0));
        assert!(disc.intersect(&mut ray).is_none());
    }
}
