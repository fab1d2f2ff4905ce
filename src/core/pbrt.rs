//! Scalar type alias and small numeric helpers shared across the crate.
//!
//! Everything in this renderer works in single precision; there is no
//! spectral rendering and no generic "Float" abstraction over f32/f64 as
//! in some PBR codebases -- `Float` is always `f32`.

pub type Float = f32;

pub const MACHINE_EPSILON: Float = std::f32::EPSILON * 0.5;
pub const ONE_MINUS_EPSILON: Float = 1.0 - std::f32::EPSILON;
pub const SHADOW_EPSILON: Float = 1e-4;

pub fn clamp_t<T: PartialOrd>(val: T, low: T, high: T) -> T {
    if val < low {
        low
    } else if val > high {
        high
    } else {
        val
    }
}

pub fn lerp(t: Float, a: Float, b: Float) -> Float {
    (1.0 - t) * a + t * b
}

pub fn radians(deg: Float) -> Float {
    (std::f32::consts::PI / 180.0) * deg
}

pub fn degrees(rad: Float) -> Float {
    (180.0 / std::f32::consts::PI) * rad
}

/// Conservative round-off error bound for a computation accumulating `n`
/// operations in single precision floating point (`gamma(n)` in pbrt).
pub fn gamma(n: i32) -> Float {
    (n as Float * MACHINE_EPSILON) / (1.0 - n as Float * MACHINE_EPSILON)
}

pub fn quadratic(a: Float, b: Float, c: Float) -> Option<(Float, Float)> {
    let discrim = b as f64 * b as f64 - 4.0 * a as f64 * c as f64;
    if discrim < 0.0 {
        return None;
    }
    let root_discrim = discrim.sqrt();
    let q = if b < 0.0 {
        -0.5 * (b as f64 - root_discrim)
    } else {
        -0.5 * (b as f64 + root_discrim)
    };
    let mut t0 = (q / a as f64) as Float;
    let mut t1 = (c as f64 / q) as Float;
    if t0 > t1 {
        std::mem::swap(&mut t0, &mut t1);
    }
    Some((t0, t1))
}

/// `eval = weight * pdf` invariant tolerance used by the BSDF property
/// tests (see the testable-properties checks in `tests/`).
pub const EVAL_WEIGHT_PDF_TOLERANCE: Float = 1e-4;
