//! Analytic sphere primitive (spec section 3, "Primitive").

use std::f32::consts::PI;

use crate::core::geometry::{Bounds3f, Normal3f, Point2f, Point3f, Ray, Spectrum, Vector3f};
use crate::core::interaction::{IntersectionData, IntersectionInfo};
use crate::core::pbrt::{clamp_t, quadratic, Float};
use crate::shapes::{LightSample, Shape};

#[derive(Debug, Copy, Clone)]
pub struct Sphere {
    pub center: Point3f,
    pub radius: Float,
}

impl Sphere {
    pub fn new(center: Point3f, radius: Float) -> Self {
        Sphere { center, radius }
    }

    fn normal_at(&self, p: &Point3f) -> Normal3f {
        let n = (*p - self.center).normalize();
        Normal3f::new(n.x, n.y, n.z)
    }

    fn uv_at(&self, n: &Normal3f) -> Point2f {
        let theta = clamp_t(n.z, -1.0, 1.0).acos();
        let mut phi = n.y.atan2(n.x);
        if phi < 0.0 {
            phi += 2.0 * PI;
        }
        Point2f { x: phi / (2.0 * PI), y: theta / PI }
    }
}

impl Shape for Sphere {
    fn intersect(&self, ray: &mut Ray) -> Option<IntersectionData> {
        let oc = ray.o - self.center;
        let a = ray.d.length_squared();
        let b = 2.0 * (oc.x * ray.d.x + oc.y * ray.d.y + oc.z * ray.d.z);
        let c = oc.length_squared() - self.radius * self.radius;
        let (t0, t1) = quadratic(a, b, c)?;
        let t_hit = if t0 > ray.t_near {
            t0
        } else if t1 > ray.t_near {
            t1
        } else {
            return None;
        };
        if t_hit >= ray.t_far {
            return None;
        }
        ray.t_far = t_hit;
        Some(IntersectionData::Sphere)
    }

    fn intersect_p(&self, ray: &Ray) -> bool {
        let oc = ray.o - self.center;
        let a = ray.d.length_squared();
        let b = 2.0 * (oc.x * ray.d.x + oc.y * ray.d.y + oc.z * ray.d.z);
        let c = oc.length_squared() - self.radius * self.radius;
        match quadratic(a, b, c) {
            Some((t0, t1)) => {
                let t_hit = if t0 > ray.t_near {
                    t0
                } else {
                    t1
                };
                t_hit > ray.t_near && t_hit < ray.t_far
            }
            None => false,
        }
    }

    fn intersection_info(&self, ray: &Ray, _data: &IntersectionData) -> IntersectionInfo {
        let p = ray.position(ray.t_far);
        let n = self.normal_at(&p);
        let uv = self.uv_at(&n);
        IntersectionInfo {
            p,
            gnormal: n,
            nnormal: n,
            uv,
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
        4.0 * PI * self.radius * self.radius
    }

    fn sample_direct(&self, p: &Point3f, u: Point2f) -> Option<LightSample> {
        let to_center = self.center - *p;
        let dist_to_center2 = to_center.length_squared();
        if dist_to_center2 <= self.radius * self.radius {
            return None;
        }
        let dist_to_center = dist_to_center2.sqrt();
        let sin_theta_max2 = (self.radius * self.radius) / dist_to_center2;
        let cos_theta_max = (1.0 - sin_theta_max2).max(0.0).sqrt();
        let cos_theta = 1.0 - u.x * (1.0 - cos_theta_max);
        let sin_theta = (1.0 - cos_theta * cos_theta).max(0.0).sqrt();
        let phi = 2.0 * PI * u.y;
        let w = to_center.normalize();
        let mut t = Vector3f::default();
        let mut b = Vector3f::default();
        crate::core::geometry::vec3_coordinate_system(&w, &mut t, &mut b);
        let d = t * (phi.cos() * sin_theta) + b * (phi.sin() * sin_theta) + w * cos_theta;
        let ds = dist_to_center * cos_theta - (self.radius * self.radius - (dist_to_center * sin_theta).powi(2)).max(0.0).sqrt();
        let pdf = 1.0 / (2.0 * PI * (1.0 - cos_theta_max));
        Some(LightSample {
            d,
            dist: ds,
            weight: Spectrum::default(),
            pdf,
        })
    }

    fn direct_pdf(&self, _data: &IntersectionData, _info: &IntersectionInfo, p: &Point3f) -> Float {
        let dist_to_center2 = (self.center - *p).length_squared();
        if dist_to_center2 <= self.radius * self.radius {
            return 1.0 / self.area();
        }
        let sin_theta_max2 = (self.radius * self.radius) / dist_to_center2;
        let cos_theta_max = (1.0 - sin_theta_max2).max(0.0).sqrt();
        1.0 / (2.0 * PI * (1.0 - cos_theta_max))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ray_through_center_hits_near_side() {
        let sphere = Sphere::new(Point3f::new(0.0, 0.0, 5.0), 1.0);
        let mut ray = Ray::new(Point3f::default(), Vector3f::new(0.0, 0.0, 1.0));
        let data = sphere.intersect(&mut ray);
        assert!(data.is_some());
        assert!((ray.t_far - 4.0).abs() < 1e-4);
    }

    #[test]
    fn missed_ray_reports_no_hit() {
        let sphere = Sphere::new(Point3f::new(10.0, 0.0, 0.0), 1.0);
        let mut ray = Ray::new(Point3f::default(), Vector3f::new(0.0, 0.0, 1.0));
        assert!(sphere.intersect(&mut ray).is_none());
    }

    #[test]
    fn direct_sample_points_toward_sphere() {
        let sphere = Sphere::new(Point3f::new(0.0, 0.0, 5.0), 1.0);
        let p = Point3f::default();
        let u = Point2f { x: 0.25, y: 0.5 };
        let sample = sphere.sample_direct(&p, u).unwrap();
        assert!(sample.pdf > 0.0);
        assert!(sample.dist > 0.0);
    }
}
