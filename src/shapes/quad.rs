//! Axis-free parallelogram primitive: a point plus two edge vectors
//! (spec section 3, "Primitive").

use crate::core::geometry::{
    vec3_cross_vec3, vec3_dot_vec3f, Bounds3f, Normal3f, Point2f, Point3f, Ray, Spectrum, Vector3f,
};
use crate::core::interaction::{IntersectionData, IntersectionInfo};
use crate::core::pbrt::Float;
use crate::shapes::{LightSample, Shape};

#[derive(Debug, Copy, Clone)]
pub struct Quad {
    pub base: Point3f,
    pub edge0: Vector3f,
    pub edge1: Vector3f,
    normal: Normal3f,
    area: Float,
}

impl Quad {
    pub fn new(base: Point3f, edge0: Vector3f, edge1: Vector3f) -> Self {
        let cross = vec3_cross_vec3(&edge0, &edge1);
        let area = cross.length();
        let normal = Normal3f::new(cross.x / area, cross.y / area, cross.z / area);
        Quad { base, edge0, edge1, normal, area }
    }

    fn uv_from_hit(&self, p: &Point3f) -> Point2f {
        let rel = *p - self.base;
        let u = vec3_dot_vec3f(&rel, &self.edge0) / self.edge0.length_squared();
        let v = vec3_dot_vec3f(&rel, &self.edge1) / self.edge1.length_squared();
        Point2f { x: u, y: v }
    }
}

impl Shape for Quad {
    fn intersect(&self, ray: &mut Ray) -> Option<IntersectionData> {
        let denom = vec3_dot_vec3f(&ray.d, &Vector3f::from(self.normal));
        if denom.abs() < 1e-9 {
            return None;
        }
        let t = vec3_dot_vec3f(&(self.base - ray.o), &Vector3f::from(self.normal)) / denom;
        if t <= ray.t_near || t >= ray.t_far {
            return None;
        }
        let p = ray.position(t);
        let uv = self.uv_from_hit(&p);
        if !(0.0..=1.0).contains(&uv.x) || !(0.0..=1.0).contains(&uv.y) {
            return None;
        }
        ray.t_far = t;
        Some(IntersectionData::Quad { u: uv.x, v: uv.y })
    }

    fn intersect_p(&self, ray: &Ray) -> bool {
        let denom = vec3_dot_vec3f(&ray.d, &Vector3f::from(self.normal));
        if denom.abs() < 1e-9 {
            return false;
        }
        let t = vec3_dot_vec3f(&(self.base - ray.o), &Vector3f::from(self.normal)) / denom;
        if t <= ray.t_near || t >= ray.t_far {
            return false;
        }
        let uv = self.uv_from_hit(&ray.position(t));
        (0.0..=1.0).contains(&uv.x) && (0.0..=1.0).contains(&uv.y)
    }

    fn intersection_info(&self, ray: &Ray, data: &IntersectionData) -> IntersectionInfo {
        let (u, v) = match data {
            IntersectionData::Quad { u, v } => (*u, *v),
            _ => (0.0, 0.0),
        };
        let p = ray.position(ray.t_far);
        IntersectionInfo {
            p,
            gnormal: self.normal,
            nnormal: self.normal,
            uv: Point2f { x: u, y: v },
            w: -ray.d,
            epsilon: IntersectionInfo::offset_epsilon(ray.t_far, &p),
            primitive_index: 0,
            bsdf_index: None,
        }
    }

    fn world_bound(&self) -> Bounds3f {
        let corners = [
            self.base,
            self.base + self.edge0,
            self.base + self.edge1,
            self.base + self.edge0 + self.edge1,
        ];
        let mut bounds = Bounds3f::new(corners[0], corners[1]);
        bounds = crate::core::geometry::bnd3_union_pnt3f(&bounds, &corners[2]);
        bounds = crate::core::geometry::bnd3_union_pnt3f(&bounds, &corners[3]);
        bounds
    }

    fn area(&self) -> Float {
        self.area
    }

    fn sample_direct(&self, p: &Point3f, u: Point2f) -> Option<LightSample> {
        let sample_p = self.base + self.edge0 * u.x + self.edge1 * u.y;
        let to_p = sample_p - *p;
        let dist2 = to_p.length_squared();
        if dist2 < 1e-12 {
            return None;
        }
        let dist = dist2.sqrt();
        let d = to_p * (1.0 / dist);
        let cos_theta = vec3_dot_vec3f(&-d, &Vector3f::from(self.normal)).abs();
        if cos_theta < 1e-6 {
            return None;
        }
        let pdf = dist2 / (cos_theta * self.area);
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
        dist2 / (cos_theta * self.area)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn perpendicular_ray_hits_quad_center() {
        let quad = Quad::new(Point3f::new(-1.0, -1.0, 5.0), Vector3f::new(2.0, 0.0, 0.0), Vector3f::new(0.0, 2.0, 0.0));
        let mut ray = Ray::new(Point3f::default(), Vector3f::new(0.0, 0.0, 1.0));
        assert!(quad.intersect(&mut ray).is_some());
        assert!((ray.t_far - 5.0).abs() < 1e-4);
    }

    #[test]
    fn ray_outside_quad_extent_misses() {
        let quad = Quad::new(Point3f::new(-1.0, -1.0, 5.0), Vector3f::new(2.0, 0.0, 0.0), Vector3f::new(0.0, 2.0, 0.0));
        let mut ray = Ray::new(Point3f::new(10.0, 10.0, 0.0), Vector3f::new(0.0, 0.0, 1.0));
        assert!(quad.intersect(&mut ray).is_none());
    }
}
