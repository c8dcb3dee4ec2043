//! Crate-level error types.

use std::fmt;

use crate::gpu::render_context::RenderContextError;

/// Shader stage that failed to compile.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShaderStage {
    /// The vertex stage.
    Vertex,
    /// The fragment stage.
    Fragment,
}

impl fmt::Display for ShaderStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Vertex => write!(f, "vertex"),
            Self::Fragment => write!(f, "fragment"),
        }
    }
}

/// Errors produced by the mirador crate.
#[derive(Debug)]
pub enum MiradorError {
    /// A shader stage failed to parse or validate. Fatal to that program;
    /// the engine falls back to a prior working program.
    ShaderCompile {
        /// Which stage was rejected.
        stage: ShaderStage,
        /// Full compiler diagnostic.
        log: String,
    },
    /// Vertex/normal/index data violated a geometry invariant. Rejected at
    /// construction; nothing is uploaded.
    InvalidGeometry(String),
    /// Bounding-volume computation over zero points.
    EmptyPointSet,
    /// A model or texture asset could not be fetched. Logged by callers;
    /// rendering continues without the asset.
    ResourceLoad(String),
    /// TOML options parsing/serialization failure.
    OptionsParse(String),
    /// GPU context initialization failure.
    Gpu(RenderContextError),
    /// The presentation surface was lost or is outdated. Recoverable:
    /// resize the backend and render again.
    SurfaceLost,
    /// Generic I/O failure.
    Io(std::io::Error),
    /// Viewer event-loop failure.
    Viewer(String),
}

impl fmt::Display for MiradorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ShaderCompile { stage, log } => {
                write!(f, "{stage} shader rejected: {log}")
            }
            Self::InvalidGeometry(msg) => {
                write!(f, "invalid geometry: {msg}")
            }
            Self::EmptyPointSet => {
                write!(f, "cannot compute bounds of an empty point set")
            }
            Self::ResourceLoad(msg) => {
                write!(f, "resource load error: {msg}")
            }
            Self::OptionsParse(msg) => {
                write!(f, "options parse error: {msg}")
            }
            Self::Gpu(e) => write!(f, "GPU error: {e}"),
            Self::SurfaceLost => {
                write!(f, "presentation surface lost or outdated")
            }
            Self::Io(e) => write!(f, "I/O error: {e}"),
            Self::Viewer(msg) => write!(f, "viewer error: {msg}"),
        }
    }
}

impl std::error::Error for MiradorError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Gpu(e) => Some(e),
            Self::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<RenderContextError> for MiradorError {
    fn from(e: RenderContextError) -> Self {
        Self::Gpu(e)
    }
}

impl From<std::io::Error> for MiradorError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}
