//! JSON model files for the standalone viewer.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::MiradorError;

/// Raw mesh data as stored in a model file or produced by the procedural
/// generators.
///
/// The index field accepts the legacy `faces` key used by older exports.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeshData {
    /// Vertex coordinates, stride 3.
    pub vertices: Vec<f32>,
    /// Per-vertex normals, stride 3.
    pub normals: Vec<f32>,
    /// Triangle-list indices.
    #[serde(alias = "faces")]
    pub indices: Vec<u32>,
    /// Optional embedded RGBA color.
    #[serde(default)]
    pub color: Option<[f32; 4]>,
}

/// Load a mesh from a JSON model file.
///
/// # Errors
///
/// Returns [`MiradorError::ResourceLoad`] if the file cannot be read or
/// parsed. Callers log the failure and keep rendering without the model.
pub fn load_mesh(path: &Path) -> Result<MeshData, MiradorError> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| MiradorError::ResourceLoad(format!("{}: {e}", path.display())))?;
    serde_json::from_str(&content)
        .map_err(|e| MiradorError::ResourceLoad(format!("{}: {e}", path.display())))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_a_model_with_the_faces_alias() {
        let json = r#"{
            "vertices": [0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0],
            "normals": [0.0, 0.0, 1.0, 0.0, 0.0, 1.0, 0.0, 0.0, 1.0],
            "faces": [0, 1, 2],
            "color": [0.1, 0.2, 0.3, 1.0]
        }"#;
        let mesh: MeshData = serde_json::from_str(json).unwrap();
        assert_eq!(mesh.indices, vec![0, 1, 2]);
        assert_eq!(mesh.color, Some([0.1, 0.2, 0.3, 1.0]));
    }

    #[test]
    fn color_is_optional() {
        let json = r#"{
            "vertices": [0.0, 0.0, 0.0],
            "normals": [0.0, 0.0, 1.0],
            "indices": []
        }"#;
        let mesh: MeshData = serde_json::from_str(json).unwrap();
        assert_eq!(mesh.color, None);
    }

    #[test]
    fn missing_file_is_a_resource_load_error() {
        let err = load_mesh(Path::new("does/not/exist.json")).unwrap_err();
        assert!(matches!(err, MiradorError::ResourceLoad(_)));
    }
}
