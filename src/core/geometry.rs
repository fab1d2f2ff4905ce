//! Vectors, points, normals, bounding boxes and rays.
//!
//! `Vector3f` also doubles as the RGB `Spectrum` type: this renderer does
//! not model a spectral distribution, only three RGB samples, so there is
//! no separate spectrum module (see DESIGN.md).

use std::ops::{Add, AddAssign, Div, DivAssign, Index, IndexMut, Mul, MulAssign, Neg, Sub};

use serde::{Deserialize, Serialize};

use crate::core::pbrt::{clamp_t, Float};

pub type Spectrum = Vector3f;

/// Rec. 709 relative luminance, used wherever a scalar "how bright is
/// this RGB value" estimate is needed (light power aggregation,
/// firefly clamping) rather than a per-channel one.
pub fn luminance(c: &Spectrum) -> Float {
    0.2126 * c.x + 0.7152 * c.y + 0.0722 * c.z
}

#[derive(Debug, Default, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vector2f {
    pub x: Float,
    pub y: Float,
}

#[derive(Debug, Default, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct Point2f {
    pub x: Float,
    pub y: Float,
}

#[derive(Debug, Copy, Clone)]
pub enum XYEnum {
    X,
    Y,
}

impl Index<XYEnum> for Point2f {
    type Output = Float;
    fn index(&self, i: XYEnum) -> &Float {
        match i {
            XYEnum::X => &self.x,
            XYEnum::Y => &self.y,
        }
    }
}

#[derive(Debug, Copy, Clone)]
pub enum XYZEnum {
    X,
    Y,
    Z,
}

impl_op_ex!(+ |a: &Point2f, b: &Vector2f| -> Point2f { Point2f { x: a.x + b.x, y: a.y + b.y } });
impl_op_ex!(-|a: &Point2f, b: &Point2f| -> Vector2f {
    Vector2f {
        x: a.x - b.x,
        y: a.y - b.y,
    }
});
impl_op_ex!(*|a: &Point2f, s: Float| -> Point2f {
    Point2f {
        x: a.x * s,
        y: a.y * s,
    }
});
impl_op_ex!(*|a: &Vector2f, s: Float| -> Vector2f {
    Vector2f {
        x: a.x * s,
        y: a.y * s,
    }
});

#[derive(Debug, Default, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vector3f {
    pub x: Float,
    pub y: Float,
    pub z: Float,
}

#[derive(Debug, Default, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct Point3f {
    pub x: Float,
    pub y: Float,
    pub z: Float,
}

#[derive(Debug, Default, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct Normal3f {
    pub x: Float,
    pub y: Float,
    pub z: Float,
}

impl Index<XYZEnum> for Vector3f {
    type Output = Float;
    fn index(&self, i: XYZEnum) -> &Float {
        match i {
            XYZEnum::X => &self.x,
            XYZEnum::Y => &self.y,
            XYZEnum::Z => &self.z,
        }
    }
}

impl Index<usize> for Vector3f {
    type Output = Float;
    fn index(&self, i: usize) -> &Float {
        match i {
            0 => &self.x,
            1 => &self.y,
            _ => &self.z,
        }
    }
}

macro_rules! vec3_impl {
    ($t:ty) => {
        impl $t {
            pub fn new(x: Float, y: Float, z: Float) -> Self {
                Self { x, y, z }
            }
            pub fn abs(&self) -> Self {
                Self {
                    x: self.x.abs(),
                    y: self.y.abs(),
                    z: self.z.abs(),
                }
            }
            pub fn max_component(&self) -> Float {
                self.x.max(self.y).max(self.z)
            }
            pub fn min_component(&self) -> Float {
                self.x.min(self.y).min(self.z)
            }
            pub fn max_dimension(&self) -> u8 {
                if self.x > self.y {
                    if self.x > self.z {
                        0
                    } else {
                        2
                    }
                } else if self.y > self.z {
                    1
                } else {
                    2
                }
            }
            pub fn has_nans(&self) -> bool {
                self.x.is_nan() || self.y.is_nan() || self.z.is_nan()
            }
        }
    };
}

vec3_impl!(Vector3f);
vec3_impl!(Point3f);
vec3_impl!(Normal3f);

impl Vector3f {
    pub fn length_squared(&self) -> Float {
        self.x * self.x + self.y * self.y + self.z * self.z
    }
    pub fn length(&self) -> Float {
        self.length_squared().sqrt()
    }
    pub fn normalize(&self) -> Vector3f {
        *self / self.length()
    }
    /// Average of the three RGB channels -- used wherever the spec calls
    /// for a scalar "average transparency" or similar reduction.
    pub fn avg(&self) -> Float {
        (self.x + self.y + self.z) / 3.0
    }
    pub fn is_black(&self) -> bool {
        self.x == 0.0 && self.y == 0.0 && self.z == 0.0
    }
    pub fn sqrt(&self) -> Vector3f {
        Vector3f::new(self.x.max(0.0).sqrt(), self.y.max(0.0).sqrt(), self.z.max(0.0).sqrt())
    }
    pub fn exp(&self) -> Vector3f {
        Vector3f::new(self.x.exp(), self.y.exp(), self.z.exp())
    }
    pub fn clamp(&self, low: Float, high: Float) -> Vector3f {
        Vector3f::new(
            clamp_t(self.x, low, high),
            clamp_t(self.y, low, high),
            clamp_t(self.z, low, high),
        )
    }
}

impl From<Point3f> for Vector3f {
    fn from(p: Point3f) -> Vector3f {
        Vector3f::new(p.x, p.y, p.z)
    }
}
impl From<Normal3f> for Vector3f {
    fn from(n: Normal3f) -> Vector3f {
        Vector3f::new(n.x, n.y, n.z)
    }
}
impl From<Vector3f> for Normal3f {
    fn from(v: Vector3f) -> Normal3f {
        Normal3f::new(v.x, v.y, v.z)
    }
}
impl From<Vector3f> for Point3f {
    fn from(v: Vector3f) -> Point3f {
        Point3f::new(v.x, v.y, v.z)
    }
}

impl_op_ex!(+ |a: &Vector3f, b: &Vector3f| -> Vector3f { Vector3f::new(a.x + b.x, a.y + b.y, a.z + b.z) });
impl_op_ex!(+= |a: &mut Vector3f, b: &Vector3f| { a.x += b.x; a.y += b.y; a.z += b.z; });
impl_op_ex!(-|a: &Vector3f, b: &Vector3f| -> Vector3f { Vector3f::new(a.x - b.x, a.y - b.y, a.z - b.z) });
impl_op_ex!(-|a: &Vector3f| -> Vector3f { Vector3f::new(-a.x, -a.y, -a.z) });
impl_op_ex!(*|a: &Vector3f, b: &Vector3f| -> Vector3f { Vector3f::new(a.x * b.x, a.y * b.y, a.z * b.z) });
impl_op_ex!(*|a: &Vector3f, s: Float| -> Vector3f { Vector3f::new(a.x * s, a.y * s, a.z * s) });
impl_op_ex!(*= |a: &mut Vector3f, s: Float| { a.x *= s; a.y *= s; a.z *= s; });
impl_op_ex!(/ |a: &Vector3f, s: Float| -> Vector3f { let inv = 1.0 / s; Vector3f::new(a.x * inv, a.y * inv, a.z * inv) });
impl_op_ex!(/ |a: &Vector3f, b: &Vector3f| -> Vector3f { Vector3f::new(a.x / b.x, a.y / b.y, a.z / b.z) });

impl_op_ex!(+ |a: &Point3f, b: &Vector3f| -> Point3f { Point3f::new(a.x + b.x, a.y + b.y, a.z + b.z) });
impl_op_ex!(+= |a: &mut Point3f, b: &Vector3f| { a.x += b.x; a.y += b.y; a.z += b.z; });
impl_op_ex!(-|a: &Point3f, b: &Point3f| -> Vector3f { Vector3f::new(a.x - b.x, a.y - b.y, a.z - b.z) });
impl_op_ex!(-|a: &Point3f, b: &Vector3f| -> Point3f { Point3f::new(a.x - b.x, a.y - b.y, a.z - b.z) });
impl_op_ex!(*|a: &Point3f, s: Float| -> Point3f { Point3f::new(a.x * s, a.y * s, a.z * s) });
impl_op_ex!(*= |a: &mut Point3f, s: Float| { a.x *= s; a.y *= s; a.z *= s; });

impl_op_ex!(-|a: &Normal3f| -> Normal3f { Normal3f::new(-a.x, -a.y, -a.z) });
impl_op_ex!(*= |a: &mut Normal3f, s: Float| { a.x *= s; a.y *= s; a.z *= s; });
impl_op_ex!(*|a: &Normal3f, s: Float| -> Normal3f { Normal3f::new(a.x * s, a.y * s, a.z * s) });
impl_op_ex!(+ |a: &Normal3f, b: &Normal3f| -> Normal3f { Normal3f::new(a.x + b.x, a.y + b.y, a.z + b.z) });

impl Normal3f {
    pub fn length_squared(&self) -> Float {
        self.x * self.x + self.y * self.y + self.z * self.z
    }
    pub fn length(&self) -> Float {
        self.length_squared().sqrt()
    }
    pub fn normalize(&self) -> Normal3f {
        let l = self.length();
        Normal3f::new(self.x / l, self.y / l, self.z / l)
    }
}

pub fn vec3_dot_vec3f(a: &Vector3f, b: &Vector3f) -> Float {
    a.x * b.x + a.y * b.y + a.z * b.z
}
pub fn vec3_abs_dot_vec3f(a: &Vector3f, b: &Vector3f) -> Float {
    vec3_dot_vec3f(a, b).abs()
}
pub fn vec3_dot_nrmf(a: &Vector3f, b: &Normal3f) -> Float {
    a.x * b.x + a.y * b.y + a.z * b.z
}
pub fn nrm_dot_vec3f(a: &Normal3f, b: &Vector3f) -> Float {
    a.x * b.x + a.y * b.y + a.z * b.z
}
pub fn nrm_dot_nrmf(a: &Normal3f, b: &Normal3f) -> Float {
    a.x * b.x + a.y * b.y + a.z * b.z
}
pub fn nrm_abs_dot_vec3f(a: &Normal3f, b: &Vector3f) -> Float {
    nrm_dot_vec3f(a, b).abs()
}
pub fn vec3_cross_vec3(a: &Vector3f, b: &Vector3f) -> Vector3f {
    Vector3f::new(
        a.y * b.z - a.z * b.y,
        a.z * b.x - a.x * b.z,
        a.x * b.y - a.y * b.x,
    )
}
pub fn nrm_cross_vec3(a: &Normal3f, b: &Vector3f) -> Vector3f {
    vec3_cross_vec3(&Vector3f::from(*a), b)
}
pub fn nrm_faceforward_vec3(n: &Normal3f, v: &Vector3f) -> Normal3f {
    if nrm_dot_vec3f(n, v) < 0.0 {
        -(*n)
    } else {
        *n
    }
}
pub fn vec3_faceforward_vec3(v: &Vector3f, n: &Vector3f) -> Vector3f {
    if vec3_dot_vec3f(v, n) < 0.0 {
        -(*v)
    } else {
        *v
    }
}
pub fn pnt3_distancef(p1: &Point3f, p2: &Point3f) -> Float {
    (*p1 - *p2).length()
}
pub fn pnt3_distance_squaredf(p1: &Point3f, p2: &Point3f) -> Float {
    (*p1 - *p2).length_squared()
}

/// Builds an arbitrary orthonormal basis around `v1` (Duff et al. 2017,
/// "Building an Orthonormal Basis, Revisited" -- branch-free version).
pub fn vec3_coordinate_system(v1: &Vector3f, v2: &mut Vector3f, v3: &mut Vector3f) {
    let sign = (1.0_f32).copysign(v1.z);
    let a = -1.0 / (sign + v1.z);
    let b = v1.x * v1.y * a;
    *v2 = Vector3f::new(1.0 + sign * v1.x * v1.x * a, sign * b, -sign * v1.x);
    *v3 = Vector3f::new(b, sign + v1.y * v1.y * a, -v1.y);
}

pub fn spherical_direction_vec3(
    sin_theta: Float,
    cos_theta: Float,
    phi: Float,
    x: &Vector3f,
    y: &Vector3f,
    z: &Vector3f,
) -> Vector3f {
    *x * (sin_theta * phi.cos()) + *y * (sin_theta * phi.sin()) + *z * cos_theta
}

pub fn reflect(wo: &Vector3f, n: &Vector3f) -> Vector3f {
    *n * (2.0 * vec3_dot_vec3f(wo, n)) - *wo
}

/// Snell-refracts `wi` (pointing away from the surface) through a local
/// normal `n` with relative index of refraction `eta = eta_i / eta_t`.
/// Returns `None` under total internal reflection.
pub fn refract(wi: &Vector3f, n: &Vector3f, eta: Float) -> Option<Vector3f> {
    let cos_theta_i = vec3_dot_vec3f(n, wi);
    let sin2_theta_i = (0.0_f32).max(1.0 - cos_theta_i * cos_theta_i);
    let sin2_theta_t = eta * eta * sin2_theta_i;
    if sin2_theta_t >= 1.0 {
        return None;
    }
    let cos_theta_t = (1.0 - sin2_theta_t).sqrt();
    Some(*wi * (-eta) + *n * (eta * cos_theta_i - cos_theta_t))
}

#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bounds3f {
    pub p_min: Point3f,
    pub p_max: Point3f,
}

impl Default for Bounds3f {
    fn default() -> Self {
        let min_num = std::f32::MIN;
        let max_num = std::f32::MAX;
        Bounds3f {
            p_min: Point3f::new(max_num, max_num, max_num),
            p_max: Point3f::new(min_num, min_num, min_num),
        }
    }
}

impl Bounds3f {
    pub fn new(p1: Point3f, p2: Point3f) -> Self {
        Bounds3f {
            p_min: Point3f::new(p1.x.min(p2.x), p1.y.min(p2.y), p1.z.min(p2.z)),
            p_max: Point3f::new(p1.x.max(p2.x), p1.y.max(p2.y), p1.z.max(p2.z)),
        }
    }
    pub fn diagonal(&self) -> Vector3f {
        self.p_max - self.p_min
    }
    pub fn surface_area(&self) -> Float {
        let d = self.diagonal();
        if d.x < 0.0 || d.y < 0.0 || d.z < 0.0 {
            return 0.0;
        }
        2.0 * (d.x * d.y + d.x * d.z + d.y * d.z)
    }
    pub fn maximum_extent(&self) -> u8 {
        self.diagonal().max_dimension()
    }
    pub fn centroid(&self) -> Point3f {
        self.p_min * 0.5 + (self.p_max * 0.5 - Point3f::default() * 0.5)
    }
    /// Position of `p` within the box, normalized to `[0,1]` per axis.
    pub fn offset(&self, p: &Point3f) -> Vector3f {
        let mut o = *p - self.p_min;
        if self.p_max.x > self.p_min.x {
            o.x /= self.p_max.x - self.p_min.x;
        }
        if self.p_max.y > self.p_min.y {
            o.y /= self.p_max.y - self.p_min.y;
        }
        if self.p_max.z > self.p_min.z {
            o.z /= self.p_max.z - self.p_min.z;
        }
        o
    }
    pub fn bounding_sphere(&self) -> (Point3f, Float) {
        let center = self.p_min + self.diagonal() * 0.5;
        let radius = if self.contains(&center) {
            pnt3_distancef(&center, &self.p_max)
        } else {
            0.0
        };
        (center, radius)
    }
    pub fn contains(&self, p: &Point3f) -> bool {
        p.x >= self.p_min.x
            && p.x <= self.p_max.x
            && p.y >= self.p_min.y
            && p.y <= self.p_max.y
            && p.z >= self.p_min.z
            && p.z <= self.p_max.z
    }
    /// Ray/slab intersection test used by the brute-force reference BVH
    /// check in the test suite; the hot accelerator path uses the
    /// SIMD-friendly form in `accelerators::bvh` instead.
    pub fn intersect_p(&self, ray: &Ray, inv_dir: &Vector3f) -> Option<(Float, Float)> {
        let mut t0 = ray.t_near;
        let mut t1 = ray.t_far;
        for axis in 0..3 {
            let (min_b, max_b, o, d) = match axis {
                0 => (self.p_min.x, self.p_max.x, ray.o.x, inv_dir.x),
                1 => (self.p_min.y, self.p_max.y, ray.o.y, inv_dir.y),
                _ => (self.p_min.z, self.p_max.z, ray.o.z, inv_dir.z),
            };
            let mut t_near = (min_b - o) * d;
            let mut t_far = (max_b - o) * d;
            if t_near > t_far {
                std::mem::swap(&mut t_near, &mut t_far);
            }
            t_far *= 1.0 + 2.0 * crate::core::pbrt::gamma(3);
            t0 = t0.max(t_near);
            t1 = t1.min(t_far);
            if t0 > t1 {
                return None;
            }
        }
        Some((t0, t1))
    }
}

pub fn bnd3_union_bnd3f(b1: &Bounds3f, b2: &Bounds3f) -> Bounds3f {
    Bounds3f {
        p_min: Point3f::new(
            b1.p_min.x.min(b2.p_min.x),
            b1.p_min.y.min(b2.p_min.y),
            b1.p_min.z.min(b2.p_min.z),
        ),
        p_max: Point3f::new(
            b1.p_max.x.max(b2.p_max.x),
            b1.p_max.y.max(b2.p_max.y),
            b1.p_max.z.max(b2.p_max.z),
        ),
    }
}
pub fn bnd3_union_pnt3f(b: &Bounds3f, p: &Point3f) -> Bounds3f {
    Bounds3f {
        p_min: Point3f::new(b.p_min.x.min(p.x), b.p_min.y.min(p.y), b.p_min.z.min(p.z)),
        p_max: Point3f::new(b.p_max.x.max(p.x), b.p_max.y.max(p.y), b.p_max.z.max(p.z)),
    }
}

/// A world-space ray. `primary` marks camera rays for direct-emission
/// bookkeeping in the integrator (see spec section 3 "Ray").
#[derive(Debug, Copy, Clone, Serialize, Deserialize)]
pub struct Ray {
    pub o: Point3f,
    pub d: Vector3f,
    pub t_near: Float,
    pub t_far: Float,
    pub primary: bool,
}

impl Ray {
    pub fn new(o: Point3f, d: Vector3f) -> Self {
        debug_assert!((d.length_squared() - 1.0).abs() < 1e-3, "Ray::d must be unit length");
        Ray {
            o,
            d,
            t_near: 0.0,
            t_far: std::f32::INFINITY,
            primary: false,
        }
    }
    pub fn segment(o: Point3f, d: Vector3f, t_near: Float, t_far: Float) -> Self {
        Ray {
            o,
            d,
            t_near,
            t_far,
            primary: false,
        }
    }
    pub fn position(&self, t: Float) -> Point3f {
        self.o + self.d * t
    }
    pub fn has_nans(&self) -> bool {
        self.o.has_nans() || self.d.has_nans() || self.t_near.is_nan() || self.t_far.is_nan()
    }
}
