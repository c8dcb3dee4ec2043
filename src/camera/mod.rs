//! Orbit camera, perspective projection, and the GPU uniform block.

mod orbit;
mod projection;
mod uniform;

pub use orbit::{OrbitCamera, ViewTransforms, MIN_OFFSET};
pub use projection::Projection;
pub use uniform::DrawUniforms;
