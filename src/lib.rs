#[macro_use]
extern crate impl_ops;

pub mod accelerators;
pub mod bsdfs;
pub mod cameras;
pub mod core;
pub mod integrators;
pub mod lights;
pub mod media;
pub mod samplers;
pub mod shapes;
