//! Surface-coordinate textures (spec section 3, component 2 "Texture").
//!
//! A texture maps a surface `(u,v)` to either a scalar or an RGB value.
//! Mipmap generation, image decoding and distribution-based importance
//! sampling of environment textures are out of scope here (they belong
//! to the texture-decoding plumbing named as external in spec section
//! 1); what the core needs is the evaluation contract BSDFs and
//! emissive primitives consume.

use serde::{Deserialize, Serialize};

use crate::core::geometry::{Point2f, Spectrum};
use crate::core::pbrt::Float;

pub trait Texture<T>: Send + Sync {
    fn eval(&self, uv: Point2f) -> T;
}

#[derive(Debug, Copy, Clone, Serialize, Deserialize)]
pub struct ConstantTexture<T> {
    pub value: T,
}

impl<T> ConstantTexture<T> {
    pub fn new(value: T) -> Self {
        ConstantTexture { value }
    }
}

impl<T: Copy + Send + Sync> Texture<T> for ConstantTexture<T> {
    fn eval(&self, _uv: Point2f) -> T {
        self.value
    }
}

/// Two-color checkerboard, used by the "shadow through transparency"
/// and dielectric-sphere background end-to-end test scenes (spec
/// section 8).
#[derive(Debug, Copy, Clone, Serialize, Deserialize)]
pub struct CheckerboardTexture<T> {
    pub on: T,
    pub off: T,
    pub scale: Float,
}

impl<T: Copy + Send + Sync> Texture<T> for CheckerboardTexture<T> {
    fn eval(&self, uv: Point2f) -> T {
        let u = (uv.x * self.scale).floor() as i64;
        let v = (uv.y * self.scale).floor() as i64;
        if (u + v) % 2 == 0 {
            self.on
        } else {
            self.off
        }
    }
}

/// Substituted for any texture that failed resource acquisition (spec
/// section 7, tier 3 error handling): a constant magenta-red so a
/// broken texture reference is visually obvious but the render still
/// completes.
pub fn error_texture() -> ConstantTexture<Spectrum> {
    ConstantTexture::new(Spectrum::new(1.0, 0.0, 1.0))
}
