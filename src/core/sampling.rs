//! Draw random samples from a chosen probability distribution.
//!
//! Adapted from the classic pbrt `sampling.h`/`.cpp` pair: piecewise-
//! constant 1D/2D distributions for importance-sampling textures used as
//! environment maps, plus the hemisphere/disk/cone/sphere warps the BSDF
//! and light-tree code build on.

use std::f32::consts::PI;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::core::geometry::{Point2f, Vector2f, Vector3f, XYEnum};
use crate::core::pbrt::clamp_t;
use crate::core::pbrt::Float;
use crate::core::rng::{Rng, FLOAT_ONE_MINUS_EPSILON};

pub const INV_PI: Float = std::f32::consts::FRAC_1_PI;
pub const INV_2_PI: Float = INV_PI * 0.5;
pub const INV_4_PI: Float = INV_PI * 0.25;
pub const PI_OVER_2: Float = std::f32::consts::FRAC_PI_2;
pub const PI_OVER_4: Float = std::f32::consts::FRAC_PI_4;

#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct Distribution1D {
    pub func: Vec<Float>,
    pub cdf: Vec<Float>,
    pub func_int: Float,
}

impl Distribution1D {
    pub fn new(f: Vec<Float>) -> Self {
        let n = f.len();
        let mut cdf: Vec<Float> = Vec::with_capacity(n + 1);
        cdf.push(0.0);
        for i in 1..=n {
            let previous = cdf[i - 1];
            cdf.push(previous + f[i - 1] / n as Float);
        }
        let func_int = cdf[n];
        if func_int == 0.0 {
            for (i, item) in cdf.iter_mut().enumerate().skip(1).take(n) {
                *item = i as Float / n as Float;
            }
        } else {
            for item in cdf.iter_mut().skip(1).take(n) {
                *item /= func_int;
            }
        }
        Distribution1D { func: f, cdf, func_int }
    }
    pub fn count(&self) -> usize {
        self.func.len()
    }
    fn find_interval(&self, u: Float) -> usize {
        let mut first = 0_usize;
        let mut len = self.cdf.len();
        while len > 0 {
            let half = len >> 1;
            let middle = first + half;
            if self.cdf[middle] <= u {
                first = middle + 1;
                len -= half + 1;
            } else {
                len = half;
            }
        }
        clamp_t(first as isize - 1, 0, self.cdf.len() as isize - 2) as usize
    }
    pub fn sample_continuous(&self, u: Float, pdf: Option<&mut Float>, off: Option<&mut usize>) -> Float {
        let offset = self.find_interval(u);
        if let Some(off_ref) = off {
            *off_ref = offset;
        }
        let mut du = u - self.cdf[offset];
        if (self.cdf[offset + 1] - self.cdf[offset]) > 0.0 {
            du /= self.cdf[offset + 1] - self.cdf[offset];
        }
        if let Some(value) = pdf {
            *value = if self.func_int > 0.0 {
                self.func[offset] / self.func_int
            } else {
                0.0
            };
        }
        (offset as Float + du) / self.count() as Float
    }
    pub fn sample_discrete(&self, u: Float, pdf: Option<&mut Float>) -> usize {
        let offset = self.find_interval(u);
        if let Some(value) = pdf {
            *value = if self.func_int > 0.0 {
                self.func[offset] / (self.func_int * self.func.len() as Float)
            } else {
                0.0
            };
        }
        offset
    }
    pub fn discrete_pdf(&self, index: usize) -> Float {
        debug_assert!(index < self.func.len());
        self.func[index] / (self.func_int * self.func.len() as Float)
    }
}

#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct Distribution2D {
    pub p_conditional_v: Vec<Arc<Distribution1D>>,
    pub p_marginal: Arc<Distribution1D>,
}

impl Distribution2D {
    pub fn new(func: Vec<Float>, nu: i32, nv: i32) -> Self {
        let mut p_conditional_v = Vec::with_capacity(nv as usize);
        for v in 0..nv {
            let f = func[(v * nu) as usize..((v + 1) * nu) as usize].to_vec();
            p_conditional_v.push(Arc::new(Distribution1D::new(f)));
        }
        let mut marginal_func = Vec::with_capacity(nv as usize);
        for v in 0..nv {
            marginal_func.push(p_conditional_v[v as usize].func_int);
        }
        let p_marginal = Arc::new(Distribution1D::new(marginal_func));
        Distribution2D { p_conditional_v, p_marginal }
    }
    pub fn sample_continuous(&self, u: Point2f, pdf: &mut Float) -> Point2f {
        let mut pdfs = [0.0 as Float; 2];
        let mut v = 0_usize;
        let d1 = self.p_marginal.sample_continuous(u[XYEnum::Y], Some(&mut pdfs[1]), Some(&mut v));
        let d0 = self.p_conditional_v[v].sample_continuous(u[XYEnum::X], Some(&mut pdfs[0]), None);
        *pdf = pdfs[0] * pdfs[1];
        Point2f { x: d0, y: d1 }
    }
    pub fn pdf(&self, p: Point2f) -> Float {
        let iu = clamp_t(
            (p[XYEnum::X] * self.p_conditional_v[0].count() as Float) as usize,
            0,
            self.p_conditional_v[0].count() - 1,
        );
        let iv = clamp_t(
            (p[XYEnum::Y] * self.p_marginal.count() as Float) as usize,
            0,
            self.p_marginal.count() - 1,
        );
        self.p_conditional_v[iv].func[iu] / self.p_marginal.func_int
    }
}

pub fn cosine_sample_hemisphere(u: &Point2f) -> Vector3f {
    let d = concentric_sample_disk(u);
    let z = (0.0 as Float).max(1.0 - d.x * d.x - d.y * d.y).sqrt();
    Vector3f { x: d.x, y: d.y, z }
}

pub fn cosine_hemisphere_pdf(cos_theta: Float) -> Float {
    cos_theta * INV_PI
}

/// Veach's power heuristic (exponent fixed at 2, per spec section 4.3).
pub fn power_heuristic(nf: u8, f_pdf: Float, ng: u8, g_pdf: Float) -> Float {
    let f = nf as Float * f_pdf;
    let g = ng as Float * g_pdf;
    if f == 0.0 && g == 0.0 {
        return 0.0;
    }
    (f * f) / (f * f + g * g)
}

pub fn uniform_sample_hemisphere(u: &Point2f) -> Vector3f {
    let z = u[XYEnum::X];
    let r = (0.0 as Float).max(1.0 - z * z).sqrt();
    let phi = 2.0 * PI * u[XYEnum::Y];
    Vector3f { x: r * phi.cos(), y: r * phi.sin(), z }
}
pub fn uniform_hemisphere_pdf() -> Float {
    INV_2_PI
}

pub fn uniform_sample_sphere(u: Point2f) -> Vector3f {
    let z = 1.0 - 2.0 * u[XYEnum::X];
    let r = (0.0 as Float).max(1.0 - z * z).sqrt();
    let phi = 2.0 * PI * u[XYEnum::Y];
    Vector3f { x: r * phi.cos(), y: r * phi.sin(), z }
}
pub fn uniform_sphere_pdf() -> Float {
    INV_4_PI
}

pub fn concentric_sample_disk(u: &Point2f) -> Point2f {
    let u_offset = Point2f { x: 2.0 * u.x - 1.0, y: 2.0 * u.y - 1.0 };
    if u_offset.x == 0.0 && u_offset.y == 0.0 {
        return Point2f::default();
    }
    let (r, theta) = if u_offset.x.abs() > u_offset.y.abs() {
        (u_offset.x, PI_OVER_4 * (u_offset.y / u_offset.x))
    } else {
        (u_offset.y, PI_OVER_2 - PI_OVER_4 * (u_offset.x / u_offset.y))
    };
    Point2f { x: theta.cos() * r, y: theta.sin() * r }
}

pub fn uniform_cone_pdf(cos_theta_max: Float) -> Float {
    1.0 / (2.0 * PI * (1.0 - cos_theta_max))
}

pub fn uniform_sample_cone(u: Point2f, cos_theta_max: Float) -> Vector3f {
    let cos_theta = (1.0 - u[XYEnum::X]) + u[XYEnum::X] * cos_theta_max;
    let sin_theta = (1.0 - cos_theta * cos_theta).sqrt();
    let phi = u[XYEnum::Y] * 2.0 * PI;
    Vector3f { x: phi.cos() * sin_theta, y: phi.sin() * sin_theta, z: cos_theta }
}

/// Uniform sampling of a triangle via the "sqrt trick" -- used when a
/// triangle-mesh primitive draws an emissive sample point.
pub fn uniform_sample_triangle(u: Point2f) -> Point2f {
    let su0 = u[XYEnum::X].sqrt();
    Point2f { x: 1.0 - su0, y: u[XYEnum::Y] * su0 }
}

pub fn shuffle<T>(samp: &mut [T], count: i32, n_dimensions: i32, rng: &mut Rng) {
    for i in 0..count {
        let other = i + rng.uniform_uint32_bounded((count - i) as u32) as i32;
        for j in 0..n_dimensions {
            samp.swap((n_dimensions * i + j) as usize, (n_dimensions * other + j) as usize);
        }
    }
}

pub fn stratified_sample_2d(samp: &mut [Point2f], nx: i32, ny: i32, rng: &mut Rng, jitter: bool) {
    let dx = 1.0 / nx as Float;
    let dy = 1.0 / ny as Float;
    let mut idx = 0;
    for y in 0..ny {
        for x in 0..nx {
            let jx = if jitter { rng.uniform_float() } else { 0.5 };
            let jy = if jitter { rng.uniform_float() } else { 0.5 };
            samp[idx].x = ((x as Float + jx) * dx).min(FLOAT_ONE_MINUS_EPSILON);
            samp[idx].y = ((y as Float + jy) * dy).min(FLOAT_ONE_MINUS_EPSILON);
            idx += 1;
        }
    }
}

#[allow(dead_code)]
fn unused(_: Vector2f) {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn distribution_1d_integrates_pdf_to_one() {
        let dist = Distribution1D::new(vec![1.0, 3.0, 1.0, 1.0]);
        let mut total = 0.0;
        let n = 10_000;
        for i in 0..n {
            let u = (i as Float + 0.5) / n as Float;
            let mut pdf = 0.0;
            dist.sample_continuous(u, Some(&mut pdf), None);
            total += 1.0 / (pdf * n as Float);
        }
        assert!((total - 1.0).abs() < 0.05);
    }

    #[test]
    fn power_heuristic_weights_sum_to_one_for_two_strategies() {
        let w1 = power_heuristic(1, 2.0, 1, 3.0);
        let w2 = power_heuristic(1, 3.0, 1, 2.0);
        assert!((w1 + w2 - 1.0).abs() < 1e-6);
    }
}
