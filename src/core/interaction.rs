//! Transient and realized intersection records (spec section 3).
//!
//! `IntersectionTemporary` is what BVH traversal fills in at a leaf: a
//! back-pointer to the primitive plus a small opaque, primitive-specific
//! payload. It is stack-allocated and deliberately capped at 64 bytes so
//! traversal never allocates. `IntersectionInfo` is the realized form a
//! primitive builds from it on demand, carrying everything the
//! integrator and BSDF need.

use crate::core::geometry::{Normal3f, Point2f, Point3f, Vector3f};
use crate::core::pbrt::Float;

/// Primitive-specific scratch data produced by `Primitive::intersect`.
/// Each variant must stay small; the enum as a whole is asserted below
/// to respect the 64-byte budget from the spec.
#[derive(Debug, Copy, Clone)]
pub enum IntersectionData {
    None,
    Sphere,
    Disc,
    InfiniteSphere,
    Quad { u: Float, v: Float },
    Triangle { triangle_index: u32, b1: Float, b2: Float },
}

impl Default for IntersectionData {
    fn default() -> Self {
        IntersectionData::None
    }
}

const _ASSERT_PAYLOAD_BUDGET: () = {
    assert!(std::mem::size_of::<IntersectionData>() <= 64);
};

/// The transient record filled in by BVH traversal; `primitive_index` is
/// an index into the scene's flat primitive array rather than a pointer,
/// so the whole struct stays `Copy` and stack-friendly.
#[derive(Debug, Default, Copy, Clone)]
pub struct IntersectionTemporary {
    pub primitive_index: Option<u32>,
    pub data: IntersectionData,
}

impl IntersectionTemporary {
    pub fn clear(&mut self) {
        self.primitive_index = None;
        self.data = IntersectionData::None;
    }
}

/// The realized hit record a primitive builds from its `IntersectionTemporary`
/// (spec section 3, "IntersectionInfo").
#[derive(Debug, Copy, Clone)]
pub struct IntersectionInfo {
    pub p: Point3f,
    pub gnormal: Normal3f,
    pub nnormal: Normal3f,
    pub uv: Point2f,
    pub w: Vector3f,
    /// Self-intersection avoidance offset; shadow/continuation rays
    /// should start at `t_near = epsilon`, not exactly `0`.
    pub epsilon: Float,
    pub primitive_index: u32,
    pub bsdf_index: Option<u32>,
}

impl IntersectionInfo {
    /// A conservative self-intersection epsilon proportional to the
    /// distance traveled, following pbrt's `gamma(n)` error-bound idiom.
    pub fn offset_epsilon(t_hit: Float, p: &Point3f) -> Float {
        let scale = p.x.abs().max(p.y.abs()).max(p.z.abs()).max(1.0);
        (t_hit * crate::core::pbrt::gamma(5) * scale).max(1e-5)
    }
}

/// A participating-medium interaction along a ray segment (spec section
/// 3, "Volume scatter event / medium sample").
#[derive(Debug, Copy, Clone)]
pub struct MediumInteraction {
    pub p: Point3f,
    pub wo: Vector3f,
    pub t: Float,
}
