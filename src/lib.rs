// -- Lint policy ---------------------------------------------------------
// This is the single source of truth for crate-wide lints.

// Broad lint groups
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![deny(clippy::nursery)]
// Documentation
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(rustdoc::private_intra_doc_links)]
#![deny(rustdoc::bare_urls)]
// No panicking in library code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![deny(clippy::todo)]
#![deny(clippy::unimplemented)]
// No debug/print artifacts
#![deny(clippy::dbg_macro)]
#![deny(clippy::print_stdout)]
#![deny(clippy::print_stderr)]
// Import hygiene
#![deny(clippy::wildcard_imports)]
// Clone / pass-by-value hygiene
#![deny(clippy::needless_pass_by_value)]
#![deny(clippy::implicit_clone)]
// Unused / redundant code
#![deny(unused_results)]
#![deny(unused_qualifications)]
// Cast hygiene
#![deny(trivial_casts)]
#![deny(trivial_numeric_casts)]

//! Embeddable orbit-camera 3D model viewer built on wgpu.
//!
//! Mirador renders a set of triangle meshes and lets the user orbit, pan,
//! and zoom around them with mouse or touch gestures. A movable sectioning
//! plane exposes live cross-sections of the loaded model.
//!
//! # Key entry points
//!
//! - [`engine::RenderEngine`] - command execution and the dirty-flag render
//!   loop, generic over a [`gpu::RenderBackend`]
//! - [`camera::OrbitCamera`] - cumulative orbit angles, target, and offset
//!   distance resolved into view/projection matrices
//! - [`input::InputController`] - pointer/touch gesture state machine
//! - [`options::ViewerOptions`] - runtime configuration (camera
//!   sensitivities, colors), stored as TOML
//!
//! # Architecture
//!
//! Input events are normalized into [`input::InputEvent`] values and fed to
//! the engine, which converts them into [`engine::ViewerCommand`]s. Each
//! executed command mutates camera or geometry state and raises a dirty
//! flag; the next [`render`](engine::RenderEngine::render) call consumes
//! the flag, recomputes the view transforms, and issues one draw per scene
//! object. An idle viewer issues no draws. GPU work goes through the
//! [`gpu::RenderBackend`] trait; [`gpu::WgpuBackend`] is the production
//! implementation.

pub mod bounds;
pub mod camera;
pub mod engine;
pub mod error;
pub mod geometry;
pub mod gpu;
pub mod input;
pub mod options;
pub mod scene;
pub mod util;
#[cfg(feature = "viewer")]
pub mod viewer;

pub use engine::{RenderEngine, ViewerCommand};
pub use error::MiradorError;
pub use input::{InputEvent, PointerButton};
#[cfg(feature = "viewer")]
pub use viewer::Viewer;
