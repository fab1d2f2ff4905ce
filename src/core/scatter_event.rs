//! Scattering queries passed to BSDFs, phase functions and media (spec
//! section 3, "Surface scatter event" / "Volume scatter event").

use crate::core::frame::Frame;
use crate::core::geometry::{Point2f, Spectrum, Vector3f};
use crate::core::lobes::Lobes;
use crate::core::pbrt::Float;
use crate::core::rng::Rng;

/// A local-frame scattering query at a surface point. `wi` points away
/// from the surface toward the previous path vertex (the light, in the
/// usual importance-transport formulation); `wo` points away from the
/// surface toward the next vertex. Both live in the tangent frame, so
/// hemisphere membership is read off the sign of `.z`.
pub struct SurfaceScatterEvent {
    pub frame: Frame,
    pub wi: Vector3f,
    pub wo: Vector3f,
    pub requested_lobes: Lobes,
    pub sampled_lobe: Lobes,
    pub flipped_frame: bool,
    pub weight: Spectrum,
    pub pdf: Float,
    pub u: Point2f,
    pub u1d: Float,
}

impl SurfaceScatterEvent {
    pub fn new(frame: Frame, wi: Vector3f, requested_lobes: Lobes) -> Self {
        SurfaceScatterEvent {
            frame,
            wi,
            wo: Vector3f::default(),
            requested_lobes,
            sampled_lobe: Lobes::default(),
            flipped_frame: false,
            weight: Spectrum::default(),
            pdf: 0.0,
            u: Point2f::default(),
            u1d: 0.0,
        }
    }

    pub fn draw_direction_sample(&mut self, rng: &mut Rng) {
        self.u = Point2f { x: rng.uniform_float(), y: rng.uniform_float() };
        self.u1d = rng.uniform_float();
    }
}

/// Distance-sampling state threaded through multi-bounce interactions
/// with a single medium so that Russian roulette inside
/// scattering-heavy media stays unbiased (spec section 3).
#[derive(Debug, Default, Copy, Clone)]
pub struct MediumState {
    pub bounce: u32,
    pub advanced: bool,
}

/// A volume scattering/distance-sampling query (spec section 3, "Volume
/// scatter event / medium sample").
pub struct MediumScatterEvent {
    pub t: Float,
    pub weight: Spectrum,
    pub wi: Vector3f,
    pub wo: Vector3f,
    pub pdf: Float,
}

impl Default for MediumScatterEvent {
    fn default() -> Self {
        MediumScatterEvent {
            t: 0.0,
            weight: Spectrum::new(1.0, 1.0, 1.0),
            wi: Vector3f::default(),
            wo: Vector3f::default(),
            pdf: 1.0,
        }
    }
}
