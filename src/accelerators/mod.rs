//! Acceleration structures over scene primitives (spec section 4.1).

pub mod bvh;

pub use bvh::{Bvh, BvhBuildPrimitive};
