//! Pinhole camera (spec section 6, "Camera").

use crate::cameras::LensSample;
use crate::core::geometry::{Point2f, Point3f, Ray, Spectrum, Vector3f};
use crate::core::pbrt::Float;
use crate::media::Medium;
use std::sync::Arc;

/// A distortion-free projective camera with no lens (zero aperture, so
/// `lens_sample` in `sample_ray` is accepted for interface symmetry with
/// a future thin-lens camera but never used).
pub struct PinholeCamera {
    position: Point3f,
    forward: Vector3f,
    right: Vector3f,
    up: Vector3f,
    tan_half_fov_y: Float,
    aspect: Float,
    resolution: (u32, u32),
    pub medium: Option<Arc<dyn Medium>>,
}

impl PinholeCamera {
    /// `fov_y_degrees` is the full vertical field of view; `world_up`
    /// need not be orthogonal to `look_at - position`, it is just used
    /// to build the camera's orthonormal basis (spec section 3, "world
    /// transform").
    pub fn new(position: Point3f, look_at: Point3f, world_up: Vector3f, fov_y_degrees: Float, resolution: (u32, u32)) -> Self {
        let forward = (look_at - position).normalize();
        let right = crate::core::geometry::vec3_cross_vec3(&forward, &world_up).normalize();
        let up = crate::core::geometry::vec3_cross_vec3(&right, &forward).normalize();
        let tan_half_fov_y = (fov_y_degrees.to_radians() * 0.5).tan();
        let aspect = resolution.0 as Float / resolution.1 as Float;
        PinholeCamera { position, forward, right, up, tan_half_fov_y, aspect, resolution, medium: None }
    }

    pub fn with_medium(mut self, medium: Arc<dyn Medium>) -> Self {
        self.medium = Some(medium);
        self
    }

    fn raster_to_direction(&self, raster: Point2f) -> Vector3f {
        let ndc_x = raster.x / self.resolution.0 as Float;
        let ndc_y = raster.y / self.resolution.1 as Float;
        let screen_x = (2.0 * ndc_x - 1.0) * self.tan_half_fov_y * self.aspect;
        let screen_y = (1.0 - 2.0 * ndc_y) * self.tan_half_fov_y;
        (self.right * screen_x + self.up * screen_y + self.forward).normalize()
    }

    /// Samples a primary ray through `pixel + jitter` (spec section 6,
    /// `sampleRay`). Throughput is constant for a pinhole camera since
    /// per-pixel samples are averaged directly rather than importance-
    /// weighted by a physical sensor response.
    pub fn sample_ray(&self, pixel: (u32, u32), jitter: Point2f, _lens_sample: Point2f) -> (Ray, Spectrum) {
        let raster = Point2f { x: pixel.0 as Float + jitter.x, y: pixel.1 as Float + jitter.y };
        let d = self.raster_to_direction(raster);
        let mut ray = Ray::new(self.position, d);
        ray.primary = true;
        (ray, Spectrum::new(1.0, 1.0, 1.0))
    }

    /// Projects `p` back onto the image plane for camera-connection
    /// algorithms (spec section 6, `sampleDirect`); `None` when `p` is
    /// behind the camera or outside the frustum.
    pub fn sample_direct(&self, p: &Point3f) -> Option<LensSample> {
        let to_p = *p - self.position;
        let depth = crate::core::geometry::vec3_dot_vec3f(&to_p, &self.forward);
        if depth <= 0.0 {
            return None;
        }
        let local_x = crate::core::geometry::vec3_dot_vec3f(&to_p, &self.right) / depth;
        let local_y = crate::core::geometry::vec3_dot_vec3f(&to_p, &self.up) / depth;
        let screen_x = local_x / (self.tan_half_fov_y * self.aspect);
        let screen_y = local_y / self.tan_half_fov_y;
        if !(-1.0..=1.0).contains(&screen_x) || !(-1.0..=1.0).contains(&screen_y) {
            return None;
        }
        let pixel = Point2f {
            x: (screen_x * 0.5 + 0.5) * self.resolution.0 as Float,
            y: (0.5 - screen_y * 0.5) * self.resolution.1 as Float,
        };
        let dist = to_p.length();
        Some(LensSample {
            pixel,
            d: to_p * (-1.0 / dist),
            dist,
            weight: Spectrum::default(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn center_pixel_points_down_forward_axis() {
        let camera = PinholeCamera::new(
            Point3f::new(0.0, 0.0, 0.0),
            Point3f::new(0.0, 0.0, 1.0),
            Vector3f::new(0.0, 1.0, 0.0),
            60.0,
            (256, 256),
        );
        let (ray, _) = camera.sample_ray((128, 128), Point2f { x: 0.0, y: 0.0 }, Point2f::default());
        assert!((ray.d.z - 1.0).abs() < 1e-3);
    }

    #[test]
    fn point_on_axis_projects_to_the_center_pixel() {
        let camera = PinholeCamera::new(
            Point3f::new(0.0, 0.0, 0.0),
            Point3f::new(0.0, 0.0, 1.0),
            Vector3f::new(0.0, 1.0, 0.0),
            60.0,
            (256, 256),
        );
        let sample = camera.sample_direct(&Point3f::new(0.0, 0.0, 5.0)).unwrap();
        assert!((sample.pixel.x - 128.0).abs() < 1.0);
        assert!((sample.pixel.y - 128.0).abs() < 1.0);
    }

    #[test]
    fn point_behind_camera_has_no_sample() {
        let camera = PinholeCamera::new(
            Point3f::new(0.0, 0.0, 0.0),
            Point3f::new(0.0, 0.0, 1.0),
            Vector3f::new(0.0, 1.0, 0.0),
            60.0,
            (256, 256),
        );
        assert!(camera.sample_direct(&Point3f::new(0.0, 0.0, -5.0)).is_none());
    }
}
