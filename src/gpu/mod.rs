//! Rendering backend abstraction and its wgpu implementation.
//!
//! The core (geometry lifecycle, camera, engine) only ever talks to the
//! [`RenderBackend`] trait: opaque buffer/program handles, named uniforms,
//! indexed draws. [`WgpuBackend`] is the production implementation.

pub mod backend;
#[cfg(test)]
pub(crate) mod recording;
pub mod render_context;
mod wgpu_backend;

pub use backend::{BufferHandle, ProgramHandle, RenderBackend, UniformValue};
pub use render_context::{RenderContext, RenderContextError};
pub use wgpu_backend::WgpuBackend;

/// WGSL vertex stage shared by the basic and sectioning programs.
pub const BASIC_VERTEX_SHADER: &str = include_str!("shaders/basic.vert.wgsl");
/// WGSL fragment stage for opaque/translucent meshes.
pub const BASIC_FRAGMENT_SHADER: &str = include_str!("shaders/basic.frag.wgsl");
/// WGSL vertex stage for the sectioning program.
pub const SECTION_VERTEX_SHADER: &str = include_str!("shaders/section.vert.wgsl");
/// WGSL fragment stage that discards fragments past the sectioning plane.
pub const SECTION_FRAGMENT_SHADER: &str = include_str!("shaders/section.frag.wgsl");
