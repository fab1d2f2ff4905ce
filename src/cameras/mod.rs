//! Cameras (spec section 6, "Camera"). Only the pinhole model is in
//! scope; depth-of-field and physically-normalized importance belong to
//! a thin-lens/physical camera, which is out of scope here.

pub mod pinhole;

pub use pinhole::PinholeCamera;

use crate::core::geometry::{Point2f, Spectrum, Vector3f};
use crate::core::pbrt::Float;

/// Returned by `Camera::sample_direct` for camera-connection algorithms
/// (bidirectional path tracing, light tracing); the pure path tracer
/// this core implements never calls it, but the interface is kept
/// since it is part of the spec's external contract (spec section 6).
pub struct LensSample {
    pub pixel: Point2f,
    pub d: Vector3f,
    pub dist: Float,
    pub weight: Spectrum,
}
