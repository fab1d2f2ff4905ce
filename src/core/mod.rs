pub mod error;
pub mod frame;
pub mod geometry;
pub mod interaction;
pub mod lobes;
pub mod pbrt;
pub mod rng;
pub mod sampling;
pub mod scatter_event;
pub mod scene;
pub mod texture;
