//! Error handling design (spec section 7).
//!
//! Three tiers, deliberately not unified into one `Result` type:
//!
//! * Recoverable numeric conditions (NaNs, degenerate samples) are never
//!   propagated as errors -- they become `Vec3(0)` / `pdf = 0` /
//!   `sample = false` and the estimator silently drops the contribution.
//! * Programmer-error conditions use `debug_assert!`; they are asserted
//!   away in release builds per the spec's stated UB allowance.
//! * Resource-acquisition conditions (a texture that failed to load) are
//!   collected during `prepareForRender` and returned to the caller so
//!   the render can still complete with a fallback.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SetupDiagnostic {
    #[error("texture `{name}` could not be resolved and was replaced with the error texture: {reason}")]
    MissingTexture { name: String, reason: String },
    #[error("BSDF reference cycle rejected in `{name}`")]
    CyclicBsdf { name: String },
    #[error("BVH node with {count} primitives fell back to a midpoint split: SAH binning degenerated (all centroids coincide on the split axis)")]
    BvhDegenerate { count: usize },
}

/// Returned by `Scene::prepare_for_render`: a render that proceeds with
/// fallbacks rather than failing outright, plus the diagnostics that
/// explain what was substituted.
#[derive(Debug, Default)]
pub struct PrepareReport {
    pub diagnostics: Vec<SetupDiagnostic>,
}

impl PrepareReport {
    pub fn push(&mut self, diagnostic: SetupDiagnostic) {
        log::warn!("{diagnostic}");
        self.diagnostics.push(diagnostic);
    }
}
