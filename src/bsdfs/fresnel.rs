//! Fresnel reflectance for dielectric and conductor interfaces
//! (spec section 4.2, Dielectric/Conductor).

use crate::core::geometry::Spectrum;
use crate::core::pbrt::{clamp_t, lerp, Float};

/// Unpolarized Fresnel reflectance at a dielectric interface with
/// relative index of refraction `eta = eta_t / eta_i`.
pub fn dielectric_reflectance(cos_theta_i: Float, eta: Float) -> Float {
    let mut cos_theta_i = clamp_t(cos_theta_i, -1.0, 1.0);
    let (eta_i, eta_t) = if cos_theta_i > 0.0 {
        (1.0, eta)
    } else {
        cos_theta_i = cos_theta_i.abs();
        (eta, 1.0)
    };
    let sin_theta_i = (0.0_f32).max(1.0 - cos_theta_i * cos_theta_i).sqrt();
    let sin_theta_t = eta_i / eta_t * sin_theta_i;
    if sin_theta_t >= 1.0 {
        return 1.0;
    }
    let cos_theta_t = (0.0_f32).max(1.0 - sin_theta_t * sin_theta_t).sqrt();
    let r_parl =
        ((eta_t * cos_theta_i) - (eta_i * cos_theta_t)) / ((eta_t * cos_theta_i) + (eta_i * cos_theta_t));
    let r_perp =
        ((eta_i * cos_theta_i) - (eta_t * cos_theta_t)) / ((eta_i * cos_theta_i) + (eta_t * cos_theta_t));
    (r_parl * r_parl + r_perp * r_perp) / 2.0
}

/// Fresnel reflectance at the boundary between a dielectric and a
/// conductor with complex index of refraction `eta + i*k`.
pub fn conductor_reflectance(cos_theta_i: Float, eta: Spectrum, k: Spectrum) -> Spectrum {
    let cos_theta_i = clamp_t(cos_theta_i, -1.0, 1.0);
    let cos_theta_i2 = cos_theta_i * cos_theta_i;
    let sin_theta_i2 = 1.0 - cos_theta_i2;
    let eta2 = eta * eta;
    let eta_k2 = k * k;
    let t0 = eta2 - eta_k2 - Spectrum::new(sin_theta_i2, sin_theta_i2, sin_theta_i2);
    let a2_plus_b2 = (t0 * t0 + eta2 * eta_k2 * Spectrum::new(4.0, 4.0, 4.0)).sqrt();
    let t1 = a2_plus_b2 + Spectrum::new(cos_theta_i2, cos_theta_i2, cos_theta_i2);
    let a = ((a2_plus_b2 + t0) * 0.5).sqrt();
    let t2 = a * (2.0 * cos_theta_i);
    let rs = (t1 - t2) / (t1 + t2);
    let t3 = a2_plus_b2 * cos_theta_i2 + Spectrum::new(sin_theta_i2 * sin_theta_i2, sin_theta_i2 * sin_theta_i2, sin_theta_i2 * sin_theta_i2);
    let t4 = t2 * sin_theta_i2;
    let rp = rs * (t3 - t4) / (t3 + t4);
    (rp + rs) * 0.5
}

fn schlick_weight(cos_theta: Float) -> Float {
    let m = clamp_t(1.0 - cos_theta, 0.0, 1.0);
    (m * m) * (m * m) * m
}

/// Schlick's approximation, used by RoughCoat for a cheap grazing-angle
/// Fresnel term where the full formula is not worth the cost.
pub fn schlick_reflectance(r0: Float, cos_theta: Float) -> Float {
    lerp(schlick_weight(cos_theta), r0, 1.0)
}

/// Average (cosine-weighted hemispherical) dielectric Fresnel
/// reflectance, used by Plastic/RoughPlastic/SmoothCoat/RoughCoat to
/// account for internally-reflected light bouncing back out through the
/// coat (spec section 4.2, "internal reflection is accounted for by
/// pre-integrating the diffuse Fresnel term"). The spec's reference
/// implementation Monte-Carlo samples this integral at
/// `prepareForRender`; this crate instead uses a deterministic
/// stratified quadrature of the same integrand (see DESIGN.md open
/// question 3), which converges to the same value without needing an
/// RNG at construction time.
pub fn diffuse_fresnel_reflectance(eta: Float, samples: usize) -> Float {
    let mut sum = 0.0_f64;
    let n = samples.max(1);
    for i in 0..n {
        let cos_theta = (i as Float + 0.5) / n as Float;
        let fr = dielectric_reflectance(cos_theta, eta) as f64;
        sum += fr * cos_theta as f64 * 2.0;
    }
    (sum / n as f64) as Float
}

/// Complex indices of refraction for a handful of named conductors,
/// sampled at RGB wavelengths (`~611/549/466nm`); matches the presets
/// Tungsten-family renderers ship for Conductor/RoughConductor.
#[derive(Debug, Copy, Clone)]
pub struct ComplexIor {
    pub eta: Spectrum,
    pub k: Spectrum,
}

impl ComplexIor {
    pub fn named(name: &str) -> Option<ComplexIor> {
        use hexf::hexf32;
        match name.to_ascii_lowercase().as_str() {
            "gold" | "au" => Some(ComplexIor {
                eta: Spectrum::new(hexf32!("0x1.82p-1"), hexf32!("0x1.dap-2"), hexf32!("0x1.1cp-2")),
                k: Spectrum::new(hexf32!("0x1.ddp+1"), hexf32!("0x1.adp+1"), hexf32!("0x1.2cp+1")),
            }),
            "silver" | "ag" => Some(ComplexIor {
                eta: Spectrum::new(0.155_f32, 0.116, 0.138),
                k: Spectrum::new(4.82_f32, 3.12, 2.14),
            }),
            "copper" | "cu" => Some(ComplexIor {
                eta: Spectrum::new(0.2_f32, 0.92, 1.1),
                k: Spectrum::new(3.91_f32, 2.45, 2.14),
            }),
            "aluminium" | "aluminum" | "al" => Some(ComplexIor {
                eta: Spectrum::new(1.345_f32, 0.965, 0.617),
                k: Spectrum::new(7.47_f32, 6.40, 5.30),
            }),
            _ => None,
        }
    }
}
