//! Light sampling structures (spec section 4.4, "Light importance
//! tree").

pub mod light_tree;

pub use light_tree::LightTree;
